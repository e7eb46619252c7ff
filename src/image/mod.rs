//! Image storage and manipulation.
//!
//! This module provides:
//!
//! - The [`Image`] type, an owned RGBA image used as the per-frame pixel
//!   buffer.
//! - [`ImageView`], a borrowed rectangular view into an [`Image`].
//! - A variety of [`draw`] functions to composite overlays onto a frame.

pub mod draw;
mod jpeg;

use std::{fmt, ops::Index};

use ::image::{imageops, ImageBuffer, Rgba, RgbaImage};
use embedded_graphics::{pixelcolor::raw::RawU32, prelude::PixelColor};

use crate::rect::Rect;
use crate::resolution::Resolution;

/// An 8-bit sRGB image with alpha channel.
#[derive(Clone)]
pub struct Image {
    buf: RgbaImage,
}

impl Image {
    /// Creates an empty image of a specified size.
    ///
    /// The image will start out black and fully transparent.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buf: ImageBuffer::new(width, height),
        }
    }

    /// Creates an [`Image`] from raw, preexisting RGBA pixel data.
    ///
    /// # Panics
    ///
    /// Panics if the length of `buf` is not exactly `width * height * 4`.
    pub fn from_rgba8(res: Resolution, buf: &[u8]) -> Self {
        let expected_size = res.num_pixels() as usize * 4;
        assert_eq!(
            expected_size,
            buf.len(),
            "incorrect buffer size {} for {} image (expected {} bytes)",
            buf.len(),
            res,
            expected_size,
        );

        Self {
            buf: ImageBuffer::from_vec(res.width(), res.height(), buf.to_vec())
                .expect("buffer size does not match image resolution"),
        }
    }

    /// Decodes a JFIF JPEG or Motion JPEG from a byte slice.
    pub fn decode_jpeg(data: &[u8]) -> anyhow::Result<Self> {
        jpeg::decode_jpeg(data)
    }

    /// Returns the width of this image, in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.buf.width()
    }

    /// Returns the height of this image, in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.buf.height()
    }

    /// Returns the size of this image.
    #[inline]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    /// Returns a [`Rect`] covering this image, positioned at `(0, 0)`.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_top_left(0, 0, self.width(), self.height())
    }

    /// Gets the image color at the given pixel coordinates.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this image.
    pub fn get(&self, x: u32, y: u32) -> Color {
        Color(self.buf[(x, y)].0)
    }

    /// Sets the image color at the given pixel coordinates.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this image.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.buf[(x, y)] = Rgba(color.0);
    }

    /// Creates a view of the area of this image covered by `rect`.
    ///
    /// The view is clipped against the image bounds, so the returned view may
    /// be smaller than `rect`, and may be empty.
    pub fn view(&self, rect: Rect) -> ImageView<'_> {
        let rect = rect
            .intersection(&self.rect())
            .unwrap_or_else(|| Rect::from_top_left(0, 0, 0, 0));
        ImageView { image: self, rect }
    }

    /// Mirrors the image along its vertical axis, in place.
    pub fn flip_horizontal_in_place(&mut self) {
        imageops::flip_horizontal_in_place(&mut self.buf);
    }

    /// Returns a copy of this image, resized to `res`.
    ///
    /// Uses bilinear interpolation; the image is stretched if the aspect
    /// ratios do not match.
    pub fn resize(&self, res: Resolution) -> Image {
        Image {
            buf: imageops::resize(
                &self.buf,
                res.width(),
                res.height(),
                imageops::FilterType::Triangle,
            ),
        }
    }

    /// Returns the raw, interleaved RGBA pixel data.
    #[inline]
    pub fn data(&self) -> &[u8] {
        self.buf.as_raw()
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} Image", self.width(), self.height())
    }
}

/// An immutable view of a rectangular section of an [`Image`].
///
/// Views are always fully contained in their underlying image.
#[derive(Clone, Copy)]
pub struct ImageView<'a> {
    image: &'a Image,
    rect: Rect,
}

impl<'a> ImageView<'a> {
    /// Returns the width of this view, in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.rect.width()
    }

    /// Returns the height of this view, in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.rect.height()
    }

    /// Returns whether this view covers zero pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rect.is_empty()
    }

    /// Returns the size of this view.
    ///
    /// # Panics
    ///
    /// Panics if the view is empty.
    #[inline]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    /// Copies the contents of this view into a new [`Image`].
    pub fn to_image(&self) -> Image {
        Image {
            buf: imageops::crop_imm(
                &self.image.buf,
                self.rect.x() as u32,
                self.rect.y() as u32,
                self.rect.width(),
                self.rect.height(),
            )
            .to_image(),
        }
    }

    /// Copies this view into a new [`Image`] of resolution `res`, stretching
    /// or shrinking as necessary (bilinear interpolation).
    pub fn resize(&self, res: Resolution) -> Image {
        self.to_image().resize(res)
    }
}

impl fmt::Debug for ImageView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} ImageView", self.width(), self.height())
    }
}

/// An 8-bit RGBA color.
///
/// Colors are always in the sRGB color space and use non-premultiplied alpha.
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct Color(pub(crate) [u8; 4]);

impl Color {
    /// Fully transparent black (all components are 0).
    pub const NULL: Self = Self([0, 0, 0, 0]);
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    pub const WHITE: Self = Self([255, 255, 255, 255]);
    pub const RED: Self = Self([255, 0, 0, 255]);
    pub const GREEN: Self = Self([0, 255, 0, 255]);
    pub const BLUE: Self = Self([0, 0, 255, 255]);

    #[inline]
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    #[inline]
    pub fn r(&self) -> u8 {
        self.0[0]
    }

    #[inline]
    pub fn g(&self) -> u8 {
        self.0[1]
    }

    #[inline]
    pub fn b(&self) -> u8 {
        self.0[2]
    }

    #[inline]
    pub fn a(&self) -> u8 {
        self.0[3]
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r(),
            self.g(),
            self.b(),
            self.a(),
        )
    }
}

impl Index<usize> for Color {
    type Output = u8;

    #[inline]
    fn index(&self, index: usize) -> &u8 {
        &self.0[index]
    }
}

impl PixelColor for Color {
    type Raw = RawU32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use Color as C;

    fn mkimage<const W: usize, const H: usize>(data: [[Color; W]; H]) -> Image {
        let data = data
            .into_iter()
            .flat_map(|row| row.into_iter())
            .flat_map(|col| col.0)
            .collect::<Vec<_>>();
        Image::from_rgba8(Resolution::new(W as u32, H as u32), &data)
    }

    #[test]
    fn view_is_clipped() {
        let image = mkimage([[C::RED, C::GREEN]]);

        let view = image.view(Rect::from_corners((1, 0), (2, 1)));
        assert_eq!(view.width(), 1);
        assert_eq!(view.height(), 1);
        assert_eq!(view.to_image().get(0, 0), C::GREEN);

        let view = image.view(Rect::from_corners((1, 0), (100, 100)));
        assert_eq!(view.width(), 1);
        assert_eq!(view.height(), 1);

        let view = image.view(Rect::from_corners((50, 50), (60, 60)));
        assert!(view.is_empty());
    }

    #[test]
    fn flip_horizontal() {
        let mut image = mkimage([[C::RED, C::GREEN]]);
        image.flip_horizontal_in_place();
        assert_eq!(image.get(0, 0), C::GREEN);
        assert_eq!(image.get(1, 0), C::RED);
    }

    #[test]
    fn resize_preserves_constant_images() {
        let image = mkimage([[C::WHITE, C::WHITE], [C::WHITE, C::WHITE]]);
        let resized = image.resize(Resolution::new(4, 4));
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(resized.get(x, y), C::WHITE);
            }
        }

        let image = Image::new(3, 3);
        let resized = image.resize(Resolution::new(2, 2));
        assert!(resized.data().iter().all(|&b| b == 0));
    }
}
