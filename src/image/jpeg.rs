//! JPEG decoding for webcam frames.

use anyhow::bail;
use jpeg_decoder::PixelFormat;

use super::Image;
use crate::resolution::Resolution;

pub(crate) fn decode_jpeg(data: &[u8]) -> anyhow::Result<Image> {
    let mut decoder = jpeg_decoder::Decoder::new(data);
    let pixels = decoder.decode()?;
    let info = decoder
        .info()
        .expect("decoder info unavailable after successful decode");
    let res = Resolution::new(u32::from(info.width), u32::from(info.height));

    let rgba = match info.pixel_format {
        PixelFormat::RGB24 => {
            let mut rgba = Vec::with_capacity(res.num_pixels() as usize * 4);
            for rgb in pixels.chunks_exact(3) {
                rgba.extend_from_slice(rgb);
                rgba.push(255);
            }
            rgba
        }
        PixelFormat::L8 => {
            let mut rgba = Vec::with_capacity(res.num_pixels() as usize * 4);
            for &lum in &pixels {
                rgba.extend_from_slice(&[lum, lum, lum, 255]);
            }
            rgba
        }
        fmt @ (PixelFormat::L16 | PixelFormat::CMYK32) => {
            bail!("unsupported JPEG pixel format {:?}", fmt)
        }
    };

    Ok(Image::from_rgba8(res, &rgba))
}
