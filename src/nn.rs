//! Neural Network inference.

use std::{
    ops::RangeInclusive,
    path::Path,
    sync::Arc,
};

use tract_onnx::prelude::{
    tract_ndarray, Framework, Graph, InferenceModelExt, SimplePlan, TValue, TVec, Tensor,
    TypedFact, TypedOp,
};

use crate::image::{Color, ImageView};
use crate::resolution::Resolution;

type Model = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// A neural network that can be used for inference.
///
/// This is a cheaply [`Clone`]able handle to the underlying network
/// structures.
#[derive(Clone)]
pub struct NeuralNetwork(Arc<Model>);

impl NeuralNetwork {
    /// Loads and optimizes a pre-trained model from an ONNX file path.
    ///
    /// The path must have a `.onnx` extension. Returns an error if the file is
    /// missing or malformed, or if the network uses unimplemented operations.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Self::load_impl(path.as_ref())
    }

    fn load_impl(path: &Path) -> anyhow::Result<Self> {
        match path.extension() {
            Some(ext) if ext == "onnx" => {}
            _ => anyhow::bail!(
                "neural network file '{}' must have `.onnx` extension",
                path.display()
            ),
        }

        let model_data = std::fs::read(path)?;
        let graph = tract_onnx::onnx()
            .model_for_read(&mut &*model_data)?
            .into_optimized()?;
        let model = SimplePlan::new(graph)?;
        Ok(Self(Arc::new(model)))
    }

    /// Returns the number of input nodes of the network.
    pub fn num_inputs(&self) -> usize {
        self.0.model().inputs.len()
    }

    /// Returns the number of output nodes of the network.
    pub fn num_outputs(&self) -> usize {
        self.0.model().outputs.len()
    }

    /// Returns the tensor shape of the input node `id`.
    ///
    /// Returns an error if the network declares a symbolic shape for this
    /// input.
    pub fn input_shape(&self, id: usize) -> anyhow::Result<Vec<usize>> {
        let fact = self.0.model().input_fact(id)?;
        fact.shape
            .as_concrete()
            .map(|shape| shape.to_vec())
            .ok_or_else(|| anyhow::anyhow!("symbolic shape for network input #{id}"))
    }

    /// Returns the tensor shape of the output node `id`.
    ///
    /// Returns an error if the network declares a symbolic shape for this
    /// output.
    pub fn output_shape(&self, id: usize) -> anyhow::Result<Vec<usize>> {
        let fact = self.0.model().output_fact(id)?;
        fact.shape
            .as_concrete()
            .map(|shape| shape.to_vec())
            .ok_or_else(|| anyhow::anyhow!("symbolic shape for network output #{id}"))
    }

    /// Runs the network on a set of input tensors, returning the estimated
    /// [`Outputs`].
    ///
    /// Computation happens on the CPU.
    #[doc(alias = "infer")]
    pub fn estimate(&self, inputs: impl IntoIterator<Item = Tensor>) -> anyhow::Result<Outputs> {
        let inputs: TVec<TValue> = inputs
            .into_iter()
            .map(|t| TValue::from_const(Arc::new(t)))
            .collect();
        let outputs = self.0.run(inputs)?;
        Ok(Outputs { inner: outputs })
    }
}

/// The result of a neural network inference pass.
///
/// This is a list of tensors corresponding to the network's output nodes.
#[derive(Debug)]
pub struct Outputs {
    inner: TVec<TValue>,
}

impl Outputs {
    /// Returns the number of tensors in this inference output.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the shape of the output tensor at `index`.
    pub fn shape(&self, index: usize) -> &[usize] {
        self.inner[index].shape()
    }

    /// Returns the output tensor at `index` as a flat `f32` slice.
    pub fn as_slice(&self, index: usize) -> anyhow::Result<&[f32]> {
        Ok(self.inner[index].as_slice::<f32>()?)
    }
}

/// A convolutional neural network (CNN) that operates on image data.
///
/// The wrapper owns the full image-to-tensor preprocessing contract: the
/// input view is resized to the network's input resolution with bilinear
/// interpolation, pixel intensities are mapped with the configured
/// [`ColorMapper`], and the result is packaged as a single-item batch. The
/// whole transformation is pure; identical input pixels always produce the
/// identical input tensor.
#[derive(Clone)]
pub struct Cnn {
    nn: NeuralNetwork,
    input_res: Resolution,
    shape: CnnInputShape,
    color_map: ColorMapper,
}

impl Cnn {
    /// Creates a CNN wrapper from a [`NeuralNetwork`].
    ///
    /// The network must have exactly one input with a shape that matches the
    /// given [`CnnInputShape`].
    pub fn new(
        nn: NeuralNetwork,
        shape: CnnInputShape,
        color_map: ColorMapper,
    ) -> anyhow::Result<Self> {
        let input_res = Self::get_input_res(&nn, shape)?;
        Ok(Self {
            nn,
            input_res,
            shape,
            color_map,
        })
    }

    fn get_input_res(nn: &NeuralNetwork, shape: CnnInputShape) -> anyhow::Result<Resolution> {
        if nn.num_inputs() != 1 {
            anyhow::bail!(
                "CNN network has to take exactly 1 input, this one takes {}",
                nn.num_inputs(),
            );
        }

        let tensor_shape = nn.input_shape(0)?;
        let (w, h) = match (shape, &*tensor_shape) {
            (CnnInputShape::NCHW, [1, 3, h, w]) | (CnnInputShape::NHWC, [1, h, w, 3]) => (*w, *h),
            _ => {
                anyhow::bail!(
                    "invalid model input shape for {:?} CNN: {:?}",
                    shape,
                    tensor_shape,
                );
            }
        };

        let (w, h): (u32, u32) = (w.try_into()?, h.try_into()?);
        Ok(Resolution::new(w, h))
    }

    /// Returns the expected input image size.
    #[inline]
    pub fn input_resolution(&self) -> Resolution {
        self.input_res
    }

    /// Runs the network on an input image view, returning the estimated
    /// outputs.
    ///
    /// If the view's aspect ratio does not match the network's input aspect
    /// ratio, the image is stretched.
    pub fn estimate(&self, view: ImageView<'_>) -> anyhow::Result<Outputs> {
        anyhow::ensure!(!view.is_empty(), "cannot run inference on an empty view");

        let scaled = view.resize(self.input_res);
        let (h, w) = (
            self.input_res.height() as usize,
            self.input_res.width() as usize,
        );

        let tensor: Tensor = match self.shape {
            CnnInputShape::NCHW => {
                tract_ndarray::Array4::from_shape_fn((1, 3, h, w), |(_, c, y, x)| {
                    self.color_map.map(scaled.get(x as u32, y as u32))[c]
                })
                .into()
            }
            CnnInputShape::NHWC => {
                tract_ndarray::Array4::from_shape_fn((1, h, w, 3), |(_, y, x, c)| {
                    self.color_map.map(scaled.get(x as u32, y as u32))[c]
                })
                .into()
            }
        };

        self.nn.estimate([tensor])
    }
}

/// Describes in what order a CNN expects its input image data.
///
/// - `N` is the number of images, fixed at 1.
/// - `C` is the number of color channels, 3 for RGB inputs.
/// - `H` and `W` are the height and width of the input, respectively.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CnnInputShape {
    /// Shape is `[N, C, H, W]`.
    NCHW,
    /// Shape is `[N, H, W, C]`.
    NHWC,
}

/// Maps sRGB pixel values to the numeric range a network expects.
#[derive(Clone)]
pub struct ColorMapper {
    target_range: RangeInclusive<f32>,
}

impl ColorMapper {
    /// Creates a color mapper that uniformly maps 8-bit sRGB values to
    /// `target_range`.
    ///
    /// Note that this operates on *non-linear* sRGB colors, but maps them
    /// linearly to the target range.
    pub fn linear(target_range: RangeInclusive<f32>) -> Self {
        let start = *target_range.start();
        let end = *target_range.end();
        assert!(end > start);

        Self { target_range }
    }

    fn map(&self, color: Color) -> [f32; 3] {
        let start = *self.target_range.start();
        let end = *self.target_range.end();

        let adjust_range = (end - start) / 255.0;
        let rgb = [color.r(), color.g(), color.b()];
        rgb.map(|col| col as f32 * adjust_range + start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_mapper() {
        // The classifier's scale step: u8 intensities divided by 255.
        let mapper = ColorMapper::linear(0.0..=1.0);
        assert_eq!(mapper.map(Color::BLACK), [0.0, 0.0, 0.0]);
        assert_eq!(mapper.map(Color::WHITE), [1.0, 1.0, 1.0]);

        let mapper = ColorMapper::linear(-1.0..=1.0);
        assert_eq!(mapper.map(Color::BLACK), [-1.0, -1.0, -1.0]);
        assert_eq!(mapper.map(Color::WHITE), [1.0, 1.0, 1.0]);
    }
}
