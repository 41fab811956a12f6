use glam::Vec2;
use pcd_core::pointcloud::point::Color;

use crate::frame::{buffer::PixelBufferReadGuard, FrameSnapshot, PixelBuffer, PixelFormat};

/// Reads 8-bit RGB out of a raw camera buffer.
pub struct PixelSampler;

impl PixelSampler {
    pub fn sample(normalized: Vec2, snapshot: &FrameSnapshot) -> Option<Color> {
        Self::sample_buffer(normalized, &snapshot.image)
    }

    /// Samples the pixel nearest to `normalized` (0..1 on both axes).
    ///
    /// The buffer stays read-locked only for the duration of the call.
    pub fn sample_buffer(normalized: Vec2, buffer: &PixelBuffer) -> Option<Color> {
        let (px, py) = pixel_index(normalized, buffer.width(), buffer.height())?;

        let planes = buffer.read();
        match buffer.format() {
            // video range is decoded with the full-range constants as well
            PixelFormat::PlanarYuv420(_) => sample_yuv420(&planes, px, py),
            PixelFormat::PackedBgra8 => sample_bgra8(&planes, px, py),
            PixelFormat::Other(_) => None,
        }
    }
}

fn pixel_index(normalized: Vec2, width: u32, height: u32) -> Option<(usize, usize)> {
    let px = (f64::from(normalized.x) * f64::from(width)).round();
    let py = (f64::from(normalized.y) * f64::from(height)).round();

    // NaN is never contained
    if !(0.0..f64::from(width)).contains(&px) || !(0.0..f64::from(height)).contains(&py) {
        return None;
    }

    Some((px as usize, py as usize))
}

fn sample_yuv420(planes: &PixelBufferReadGuard<'_>, px: usize, py: usize) -> Option<Color> {
    let luma = planes.plane(0)?.byte_at(px, py)?;

    // chroma is subsampled 2x2 and stored as interleaved Cb, Cr
    let chroma = planes.plane(1)?.bytes_at((px >> 1) * 2, py >> 1, 2)?;

    Some(ycbcr_to_rgb(luma, chroma[0], chroma[1]))
}

fn sample_bgra8(planes: &PixelBufferReadGuard<'_>, px: usize, py: usize) -> Option<Color> {
    let bgra = planes.plane(0)?.bytes_at(px * 4, py, 4)?;
    Some(Color::new(bgra[2], bgra[1], bgra[0]))
}

/// BT.601 conversion from video-range Y'CbCr to RGB.
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> Color {
    let y = f32::from(y) - 16.0;
    let u = f32::from(cb) - 128.0;
    let v = f32::from(cr) - 128.0;

    let r = 1.164 * y + 1.793 * v;
    let g = 1.164 * y - 0.213 * u - 0.533 * v;
    let b = 1.164 * y + 2.112 * u;

    Color::new(
        r.clamp(0.0, 255.0) as u8,
        g.clamp(0.0, 255.0) as u8,
        b.clamp(0.0, 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Plane, YuvRange};

    fn make_bgra(width: u32, height: u32, stride: usize) -> PixelBuffer {
        let mut data = vec![0u8; stride * height as usize];
        for y in 0..height as usize {
            for x in 0..width as usize {
                let offset = y * stride + x * 4;
                // B, G, R, A
                data[offset..offset + 4].copy_from_slice(&[x as u8, y as u8, 100 + x as u8, 7]);
            }
        }
        PixelBuffer::new(
            PixelFormat::PackedBgra8,
            width,
            height,
            vec![Plane::new(stride, data)],
        )
        .unwrap()
    }

    fn make_solid_yuv(range: YuvRange, y: u8, cb: u8, cr: u8) -> PixelBuffer {
        PixelBuffer::new(
            PixelFormat::PlanarYuv420(range),
            4,
            4,
            vec![
                Plane::new(4, vec![y; 16]),
                Plane::new(4, [cb, cr].repeat(4)),
            ],
        )
        .unwrap()
    }

    fn center_of(px: u32, py: u32, width: u32, height: u32) -> Vec2 {
        Vec2::new(px as f32 / width as f32, py as f32 / height as f32)
    }

    #[test]
    fn bgra_returns_rgb_and_drops_alpha() {
        let buffer = make_bgra(8, 6, 40);
        let color = PixelSampler::sample_buffer(center_of(3, 2, 8, 6), &buffer).unwrap();
        assert_eq!(color, Color::new(103, 2, 3));
    }

    #[test]
    fn bgra_honors_row_padding() {
        let buffer = make_bgra(3, 3, 64);
        let color = PixelSampler::sample_buffer(center_of(2, 2, 3, 3), &buffer).unwrap();
        assert_eq!(color, Color::new(102, 2, 2));
    }

    #[test]
    fn coordinates_are_rounded_to_the_nearest_pixel() {
        let buffer = make_bgra(8, 6, 32);
        // 0.3 * 8 = 2.4 -> 2, 0.45 * 6 = 2.7 -> 3
        let color = PixelSampler::sample_buffer(Vec2::new(0.3, 0.45), &buffer).unwrap();
        assert_eq!(color, Color::new(102, 3, 2));
    }

    #[test]
    fn out_of_bounds_pixels_are_skipped() {
        let buffer = make_bgra(8, 6, 32);
        for point in [
            Vec2::new(-0.1, 0.5),
            Vec2::new(0.5, -0.1),
            // rounds to exactly `width`
            Vec2::new(0.97, 0.5),
            Vec2::new(0.5, 1.0),
            Vec2::new(f32::NAN, 0.5),
        ] {
            assert_eq!(PixelSampler::sample_buffer(point, &buffer), None, "{point:?}");
        }
    }

    #[test]
    fn unknown_format_is_skipped() {
        let buffer = PixelBuffer::new(
            PixelFormat::Other(0x6632_3066),
            2,
            2,
            vec![Plane::new(8, vec![255; 16])],
        )
        .unwrap();
        assert_eq!(PixelSampler::sample_buffer(Vec2::new(0.5, 0.5), &buffer), None);
    }

    #[test]
    fn buffer_is_released_after_a_skip() {
        let buffer = PixelBuffer::new(PixelFormat::Other(0), 2, 2, Vec::new()).unwrap();
        assert_eq!(PixelSampler::sample_buffer(Vec2::new(0.5, 0.5), &buffer), None);
        // would deadlock if the read guard leaked
        drop(buffer.write());
    }

    #[test]
    fn yuv_reference_white_and_black() {
        // the BT.601 scale tops out just short of 255 before truncation
        let white = make_solid_yuv(YuvRange::Full, 235, 128, 128);
        assert_eq!(
            PixelSampler::sample_buffer(Vec2::new(0.5, 0.5), &white),
            Some(Color::new(254, 254, 254))
        );

        let black = make_solid_yuv(YuvRange::Full, 16, 128, 128);
        assert_eq!(
            PixelSampler::sample_buffer(Vec2::new(0.5, 0.5), &black),
            Some(Color::new(0, 0, 0))
        );
    }

    #[test]
    fn video_range_uses_the_same_constants() {
        let full = make_solid_yuv(YuvRange::Full, 120, 90, 200);
        let video = make_solid_yuv(YuvRange::Video, 120, 90, 200);
        let point = Vec2::new(0.25, 0.75);
        assert_eq!(
            PixelSampler::sample_buffer(point, &full),
            PixelSampler::sample_buffer(point, &video)
        );
    }

    #[test]
    fn yuv_channels_are_clamped() {
        // strong Cr pushes R past 255
        assert_eq!(ycbcr_to_rgb(235, 128, 255), Color::new(255, 187, 254));
        assert_eq!(ycbcr_to_rgb(0, 128, 128), Color::new(0, 0, 0));
    }

    #[test]
    fn yuv_reads_chroma_at_half_resolution() {
        let luma = vec![100u8; 16];
        // chroma plane is 2x2 pairs; make the bottom-right pair distinct
        let mut chroma = [128u8, 128].repeat(4);
        chroma[6] = 60;
        chroma[7] = 200;
        let buffer = PixelBuffer::new(
            PixelFormat::PlanarYuv420(YuvRange::Full),
            4,
            4,
            vec![Plane::new(4, luma), Plane::new(4, chroma)],
        )
        .unwrap();

        let top_left = PixelSampler::sample_buffer(center_of(1, 1, 4, 4), &buffer).unwrap();
        let bottom_right = PixelSampler::sample_buffer(center_of(3, 2, 4, 4), &buffer).unwrap();

        assert_eq!(top_left, ycbcr_to_rgb(100, 128, 128));
        assert_eq!(bottom_right, ycbcr_to_rgb(100, 60, 200));
    }
}
