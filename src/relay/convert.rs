//! Pixel format conversion to the display format
//!
//! Every conversion produces a fresh, tightly packed buffer; the source
//! frame keeps its obligation to travel back to the backend pool.

use bytes::BytesMut;

use crate::acquire::frame::{DisplayImage, Frame, FrameMetadata, PixelFormat};
use crate::error::Error;

/// True when `from` frames can be materialized as `to` display images.
pub fn is_convertible(from: PixelFormat, to: PixelFormat) -> bool {
    from == to || matches!(to, PixelFormat::Rgb24 | PixelFormat::Bgr24)
}

/// Produce a display-ready copy of `frame` in `target` format.
pub fn to_display(frame: &Frame, target: PixelFormat) -> Result<DisplayImage, Error> {
    convert(frame.data(), &frame.meta, target)
}

pub fn convert(
    src: &[u8],
    meta: &FrameMetadata,
    target: PixelFormat,
) -> Result<DisplayImage, Error> {
    let data = match (meta.format, target) {
        (from, to) if from == to => repack(src, meta),
        (PixelFormat::Rgb24, PixelFormat::Bgr24) | (PixelFormat::Bgr24, PixelFormat::Rgb24) => {
            swap_rb(src, meta)
        }
        (PixelFormat::Mono8, PixelFormat::Rgb24 | PixelFormat::Bgr24) => widen_mono(src, meta),
        (PixelFormat::Yuyv4, to @ (PixelFormat::Rgb24 | PixelFormat::Bgr24)) => {
            yuyv_to_packed(src, meta, to)
        }
        (from, to) => return Err(Error::UnsupportedFormat { from, to }),
    };
    Ok(DisplayImage {
        data,
        width: meta.width,
        height: meta.height,
        format: target,
    })
}

/// Image rows without any stride padding.
fn packed_rows<'a>(src: &'a [u8], meta: &FrameMetadata) -> impl Iterator<Item = &'a [u8]> + 'a {
    let stride = meta.stride as usize;
    let row_len = meta.width as usize * meta.format.bytes_per_pixel();
    (0..meta.height as usize).map(move |row| &src[row * stride..row * stride + row_len])
}

fn repack(src: &[u8], meta: &FrameMetadata) -> BytesMut {
    let mut out = out_buffer(meta, meta.format.bytes_per_pixel());
    for row in packed_rows(src, meta) {
        out.extend_from_slice(row);
    }
    out
}

fn swap_rb(src: &[u8], meta: &FrameMetadata) -> BytesMut {
    let mut out = out_buffer(meta, 3);
    for row in packed_rows(src, meta) {
        for px in row.chunks_exact(3) {
            out.extend_from_slice(&[px[2], px[1], px[0]]);
        }
    }
    out
}

fn widen_mono(src: &[u8], meta: &FrameMetadata) -> BytesMut {
    let mut out = out_buffer(meta, 3);
    for row in packed_rows(src, meta) {
        for &luma in row {
            out.extend_from_slice(&[luma, luma, luma]);
        }
    }
    out
}

/// BT.601 YUYV 4:2:2 to packed 24-bit color.
fn yuyv_to_packed(src: &[u8], meta: &FrameMetadata, target: PixelFormat) -> BytesMut {
    let mut out = out_buffer(meta, 3);
    for row in packed_rows(src, meta) {
        for px in row.chunks_exact(4) {
            let (u, v) = (px[1], px[3]);
            for luma in [px[0], px[2]] {
                let [b, g, r] = yuv_to_bgr(luma, u, v);
                match target {
                    PixelFormat::Bgr24 => out.extend_from_slice(&[b, g, r]),
                    _ => out.extend_from_slice(&[r, g, b]),
                }
            }
        }
    }
    out
}

fn out_buffer(meta: &FrameMetadata, bytes_per_pixel: usize) -> BytesMut {
    BytesMut::with_capacity(meta.width as usize * meta.height as usize * bytes_per_pixel)
}

fn yuv_to_bgr(y: u8, u: u8, v: u8) -> [u8; 3] {
    let y = f32::from(y);
    let u = f32::from(u) - 128.0;
    let v = f32::from(v) - 128.0;
    let r = y + 1.402 * v;
    let g = y - 0.344_136 * u - 0.714_136 * v;
    let b = y + 1.772 * u;
    [clamp(b), clamp(g), clamp(r)]
}

fn clamp(channel: f32) -> u8 {
    channel.round().clamp(0.0, 255.0) as u8
}
