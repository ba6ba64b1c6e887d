//! FPS label overlay
//!
//! Blits a small 5x7 bitmap font straight into the image buffer; the
//! character set covers exactly what the `FPS: 12.34` label needs.

use crate::acquire::frame::DisplayImage;

const GLYPH_WIDTH: usize = 5;
const GLYPH_HEIGHT: usize = 7;

/// Draw `text` in white at pixel position (`x`, `y`), magnified by `scale`.
/// Pixels falling outside the image are clipped, unknown characters advance
/// the pen without drawing.
pub fn draw_label(image: &mut DisplayImage, text: &str, x: usize, y: usize, scale: usize) {
    let bpp = image.format.bytes_per_pixel();
    let width = image.width as usize;
    let height = image.height as usize;
    let mut pen_x = x;

    for ch in text.chars() {
        if let Some(rows) = glyph(ch) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    for dy in 0..scale {
                        for dx in 0..scale {
                            let px = pen_x + col * scale + dx;
                            let py = y + row * scale + dy;
                            if px >= width || py >= height {
                                continue;
                            }
                            let at = (py * width + px) * bpp;
                            image.data[at..at + bpp].fill(0xff);
                        }
                    }
                }
            }
        }
        pen_x += (GLYPH_WIDTH + 1) * scale;
    }
}

fn glyph(ch: char) -> Option<[u8; GLYPH_HEIGHT]> {
    Some(match ch {
        '0' => [0x0e, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0e],
        '1' => [0x04, 0x0c, 0x04, 0x04, 0x04, 0x04, 0x0e],
        '2' => [0x0e, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1f],
        '3' => [0x1f, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0e],
        '4' => [0x02, 0x06, 0x0a, 0x12, 0x1f, 0x02, 0x02],
        '5' => [0x1f, 0x10, 0x1e, 0x01, 0x01, 0x11, 0x0e],
        '6' => [0x06, 0x08, 0x10, 0x1e, 0x11, 0x11, 0x0e],
        '7' => [0x1f, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0e, 0x11, 0x11, 0x0e, 0x11, 0x11, 0x0e],
        '9' => [0x0e, 0x11, 0x11, 0x0f, 0x01, 0x02, 0x0c],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0c, 0x0c],
        ':' => [0x00, 0x0c, 0x0c, 0x00, 0x0c, 0x0c, 0x00],
        'F' => [0x1f, 0x10, 0x10, 0x1e, 0x10, 0x10, 0x10],
        'P' => [0x1e, 0x11, 0x11, 0x1e, 0x10, 0x10, 0x10],
        'S' => [0x0f, 0x10, 0x10, 0x0e, 0x01, 0x01, 0x1e],
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::frame::PixelFormat;
    use bytes::BytesMut;

    fn blank(width: u32, height: u32) -> DisplayImage {
        DisplayImage {
            data: BytesMut::from(&vec![0u8; (width * height * 3) as usize][..]),
            width,
            height,
            format: PixelFormat::Bgr24,
        }
    }

    #[test]
    fn label_marks_pixels_white() {
        let mut image = blank(128, 32);
        draw_label(&mut image, "FPS: 29.97", 10, 10, 2);
        assert!(image.data.iter().any(|&b| b == 0xff));
    }

    #[test]
    fn clips_at_the_image_edge() {
        let mut image = blank(16, 8);
        draw_label(&mut image, "888888", 10, 4, 2);
        // Nothing to assert beyond not panicking and staying in bounds.
        assert_eq!(image.data.len(), 16 * 8 * 3);
    }

    #[test]
    fn spaces_draw_nothing() {
        let mut image = blank(64, 16);
        draw_label(&mut image, "   ", 0, 0, 1);
        assert!(image.data.iter().all(|&b| b == 0));
    }
}
