//! Software rasterization on straight-alpha RGBA buffers.

use crate::tool::BlendMode;
use egui::{Color32, Pos2};
use image::{Rgba, RgbaImage, imageops};

/// Distance from `p` to the segment `a`-`b`
fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Stroke one segment with round caps.
///
/// Consecutive segments overlap in their caps, which gives round joins.
/// Coverage is antialiased over one pixel at the edge of the stroke.
pub fn stroke_segment(
    pixels: &mut RgbaImage,
    from: Pos2,
    to: Pos2,
    width: f32,
    color: Color32,
    mode: BlendMode,
) {
    let (w, h) = pixels.dimensions();
    if w == 0 || h == 0 || width <= 0.0 {
        return;
    }
    let radius = width / 2.0;
    let reach = radius + 1.0;

    let min_x = (from.x.min(to.x) - reach).floor().max(0.0) as u32;
    let min_y = (from.y.min(to.y) - reach).floor().max(0.0) as u32;
    let max_x = (from.x.max(to.x) + reach).ceil().min(w as f32) as u32;
    let max_y = (from.y.max(to.y) + reach).ceil().min(h as f32) as u32;

    let src = color.to_srgba_unmultiplied();

    for y in min_y..max_y {
        for x in min_x..max_x {
            let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
            let coverage = (radius + 0.5 - distance_to_segment(center, from, to)).clamp(0.0, 1.0);
            if coverage <= 0.0 {
                continue;
            }
            let dst = pixels.get_pixel_mut(x, y);
            match mode {
                BlendMode::SourceOver => source_over(dst, src, coverage),
                BlendMode::DestinationOut => destination_out(dst, src[3], coverage),
            }
        }
    }
}

/// Paint `src` over `dst` at the given coverage
pub fn source_over(dst: &mut Rgba<u8>, src: [u8; 4], coverage: f32) {
    let sa = src[3] as f32 / 255.0 * coverage;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    let mut out = [0u8; 4];
    for c in 0..3 {
        let value = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        out[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    *dst = Rgba(out);
}

/// Remove alpha from `dst` proportionally to the source alpha
pub fn destination_out(dst: &mut Rgba<u8>, src_alpha: u8, coverage: f32) {
    let sa = src_alpha as f32 / 255.0 * coverage;
    if sa <= 0.0 {
        return;
    }
    let out_a = (dst[3] as f32 * (1.0 - sa)).round() as u8;
    if out_a == 0 {
        *dst = Rgba([0, 0, 0, 0]);
    } else {
        dst[3] = out_a;
    }
}

/// Copy `src` into a new transparent buffer of the given size, anchored at the
/// top-left corner. Pixels outside the overlap are dropped or left empty.
pub fn reframe(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let mut out = RgbaImage::new(width, height);
    imageops::replace(&mut out, src, 0, 0);
    out
}

/// Background scaled to `width`×`height` with `drawing` composited over it
pub fn composite_over(background: &RgbaImage, drawing: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let mut out = if background.dimensions() == (width, height) {
        background.clone()
    } else {
        imageops::resize(background, width, height, imageops::FilterType::Triangle)
    };
    imageops::overlay(&mut out, drawing, 0, 0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];

    #[test]
    fn test_source_over_opaque_replaces() {
        let mut px = Rgba([0, 0, 255, 255]);
        source_over(&mut px, RED, 1.0);
        assert_eq!(px, Rgba(RED));
    }

    #[test]
    fn test_source_over_on_transparent_keeps_color() {
        let mut px = Rgba([0, 0, 0, 0]);
        source_over(&mut px, RED, 0.5);
        assert_eq!(px[0], 255);
        assert_eq!(px[3], 128);
    }

    #[test]
    fn test_destination_out_full_coverage_clears() {
        let mut px = Rgba([10, 20, 30, 255]);
        destination_out(&mut px, 255, 1.0);
        assert_eq!(px, Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_destination_out_partial_keeps_color() {
        let mut px = Rgba([10, 20, 30, 200]);
        destination_out(&mut px, 255, 0.5);
        assert_eq!(px, Rgba([10, 20, 30, 100]));
    }

    #[test]
    fn test_stroke_segment_covers_line_and_caps() {
        let mut pixels = RgbaImage::new(20, 20);
        stroke_segment(
            &mut pixels,
            Pos2::new(5.0, 10.0),
            Pos2::new(15.0, 10.0),
            4.0,
            Color32::RED,
            BlendMode::SourceOver,
        );
        // Inside the body
        assert_eq!(pixels.get_pixel(10, 9), &Rgba(RED));
        // Inside the round cap past the end point
        assert_eq!(pixels.get_pixel(15, 9), &Rgba(RED));
        // Far away
        assert_eq!(pixels.get_pixel(10, 2)[3], 0);
        assert_eq!(pixels.get_pixel(19, 19)[3], 0);
    }

    #[test]
    fn test_stroke_segment_clips_outside_points() {
        let mut pixels = RgbaImage::new(8, 8);
        stroke_segment(
            &mut pixels,
            Pos2::new(-20.0, 4.0),
            Pos2::new(40.0, 4.0),
            2.0,
            Color32::RED,
            BlendMode::SourceOver,
        );
        assert_eq!(pixels.get_pixel(0, 3), &Rgba(RED));
        assert_eq!(pixels.get_pixel(7, 3), &Rgba(RED));
    }

    #[test]
    fn test_reframe_keeps_overlap() {
        let mut src = RgbaImage::new(4, 4);
        src.put_pixel(1, 1, Rgba(RED));
        src.put_pixel(3, 3, Rgba(RED));

        let grown = reframe(&src, 6, 6);
        assert_eq!(grown.dimensions(), (6, 6));
        assert_eq!(grown.get_pixel(1, 1), &Rgba(RED));
        assert_eq!(grown.get_pixel(5, 5)[3], 0);

        let shrunk = reframe(&src, 2, 2);
        assert_eq!(shrunk.dimensions(), (2, 2));
        assert_eq!(shrunk.get_pixel(1, 1), &Rgba(RED));
    }

    #[test]
    fn test_composite_over_scales_background() {
        let background = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]));
        let mut drawing = RgbaImage::new(4, 4);
        drawing.put_pixel(0, 0, Rgba(RED));

        let out = composite_over(&background, &drawing, 4, 4);
        assert_eq!(out.dimensions(), (4, 4));
        assert_eq!(out.get_pixel(0, 0), &Rgba(RED));
        let corner = out.get_pixel(3, 3);
        assert_eq!(corner[0], 0);
        assert!(corner[2] >= 250 && corner[3] >= 250);
    }
}
