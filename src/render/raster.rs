use image::{Rgb, RgbImage};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

// ---------------------------------------------------------------------------
// Rotated blit
// ---------------------------------------------------------------------------

/// Draw `src` onto `dst` rotated counter-clockwise by `degrees`, so that the
/// source point `src_anchor` lands on `dst_anchor`.
///
/// Source pixels are bilinearly sampled and darken the destination
/// (per-channel minimum), which composites dark text over any background
/// without an alpha channel.
pub fn blit_rotated(
    dst: &mut RgbImage,
    src: &RgbImage,
    src_anchor: (f64, f64),
    dst_anchor: (f64, f64),
    degrees: f64,
) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (sw, sh) = (src.width() as f64, src.height() as f64);

    // Forward map of a source offset: +u → (cos, -sin), +v → (sin, cos).
    let forward = |u: f64, v: f64| {
        let (du, dv) = (u - src_anchor.0, v - src_anchor.1);
        (
            dst_anchor.0 + du * cos + dv * sin,
            dst_anchor.1 - du * sin + dv * cos,
        )
    };
    let corners = [forward(0.0, 0.0), forward(sw, 0.0), forward(0.0, sh), forward(sw, sh)];
    let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min).floor();
    let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max).ceil();
    let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min).floor();
    let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max).ceil();

    let x0 = min_x.max(0.0) as u32;
    let y0 = min_y.max(0.0) as u32;
    let x1 = (max_x.max(0.0) as u32).min(dst.width());
    let y1 = (max_y.max(0.0) as u32).min(dst.height());

    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f64 + 0.5 - dst_anchor.0;
            let dy = y as f64 + 0.5 - dst_anchor.1;
            let u = src_anchor.0 + dx * cos - dy * sin;
            let v = src_anchor.1 + dx * sin + dy * cos;
            let Some(sample) = sample_bilinear(src, u, v) else {
                continue;
            };
            let px = dst.get_pixel_mut(x, y);
            for ch in 0..3 {
                px.0[ch] = px.0[ch].min(sample[ch]);
            }
        }
    }
}

/// Sample at continuous coordinates (pixel centres at `i + 0.5`).
/// Outside the image the background shows through.
fn sample_bilinear(src: &RgbImage, u: f64, v: f64) -> Option<[u8; 3]> {
    let (w, h) = (src.width() as i64, src.height() as i64);
    let fx = u - 0.5;
    let fy = v - 0.5;
    if fx < -1.0 || fy < -1.0 || fx > w as f64 || fy > h as f64 {
        return None;
    }
    let ix = fx.floor() as i64;
    let iy = fy.floor() as i64;
    let tx = fx - ix as f64;
    let ty = fy - iy as f64;

    let at = |x: i64, y: i64| -> [f64; 3] {
        if x < 0 || y < 0 || x >= w || y >= h {
            let Rgb(b) = BACKGROUND;
            return [b[0] as f64, b[1] as f64, b[2] as f64];
        }
        let Rgb(p) = *src.get_pixel(x as u32, y as u32);
        [p[0] as f64, p[1] as f64, p[2] as f64]
    };

    let (a, b, c, d) = (at(ix, iy), at(ix + 1, iy), at(ix, iy + 1), at(ix + 1, iy + 1));
    let mut out = [0u8; 3];
    for ch in 0..3 {
        let top = a[ch] * (1.0 - tx) + b[ch] * tx;
        let bottom = c[ch] * (1.0 - tx) + d[ch] * tx;
        out[ch] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    Some(out)
}

// ---------------------------------------------------------------------------
// Tight crop
// ---------------------------------------------------------------------------

/// Bounding box `(x, y, w, h)` of everything that is not background.
pub fn content_bounds(img: &RgbImage) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, px) in img.enumerate_pixels() {
        if *px == BACKGROUND {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds.map(|(x0, y0, x1, y1)| (x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}

/// Crop to the drawn content plus `pad` pixels of background on every side.
/// An image with no content is returned unchanged.
pub fn crop_to_content(img: &RgbImage, pad: u32) -> RgbImage {
    let Some((x, y, w, h)) = content_bounds(img) else {
        return img.clone();
    };
    let inner = image::imageops::crop_imm(img, x, y, w, h).to_image();
    let mut out = RgbImage::from_pixel(w + 2 * pad, h + 2 * pad, BACKGROUND);
    image::imageops::replace(&mut out, &inner, pad as i64, pad as i64);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    #[test]
    fn crop_keeps_content_and_pads() {
        let mut img = RgbImage::from_pixel(100, 80, BACKGROUND);
        for x in 20..30 {
            for y in 40..45 {
                img.put_pixel(x, y, BLACK);
            }
        }
        assert_eq!(content_bounds(&img), Some((20, 40, 10, 5)));
        let out = crop_to_content(&img, 3);
        assert_eq!(out.dimensions(), (16, 11));
        assert_eq!(*out.get_pixel(3, 3), BLACK);
        assert_eq!(*out.get_pixel(2, 3), BACKGROUND);
        assert_eq!(*out.get_pixel(12, 7), BLACK);
        assert_eq!(*out.get_pixel(13, 7), BACKGROUND);
    }

    #[test]
    fn blank_image_is_not_cropped() {
        let img = RgbImage::from_pixel(7, 5, BACKGROUND);
        assert_eq!(content_bounds(&img), None);
        assert_eq!(crop_to_content(&img, 2).dimensions(), (7, 5));
    }

    #[test]
    fn zero_rotation_copies_in_place() {
        let mut src = RgbImage::from_pixel(4, 4, BACKGROUND);
        src.put_pixel(1, 2, BLACK);
        let mut dst = RgbImage::from_pixel(10, 10, BACKGROUND);
        blit_rotated(&mut dst, &src, (0.0, 0.0), (5.0, 3.0), 0.0);
        assert_eq!(*dst.get_pixel(6, 5), BLACK);
        assert_eq!(content_bounds(&dst), Some((6, 5, 1, 1)));
    }

    #[test]
    fn quarter_turn_reads_bottom_to_top() {
        // A horizontal bar rotated 90° counter-clockwise becomes vertical.
        let mut src = RgbImage::from_pixel(6, 2, BACKGROUND);
        for x in 0..6 {
            src.put_pixel(x, 0, BLACK);
            src.put_pixel(x, 1, BLACK);
        }
        let mut dst = RgbImage::from_pixel(20, 20, BACKGROUND);
        blit_rotated(&mut dst, &src, (3.0, 1.0), (10.0, 10.0), 90.0);
        let (_, _, w, h) = content_bounds(&dst).unwrap();
        assert!(h > w, "expected a vertical bar, got {w}×{h}");
        assert_eq!(*dst.get_pixel(10, 8), BLACK);
    }

    #[test]
    fn blit_never_lightens() {
        let src = RgbImage::from_pixel(3, 3, BACKGROUND);
        let mut dst = RgbImage::from_pixel(5, 5, Rgb([10, 20, 30]));
        blit_rotated(&mut dst, &src, (1.5, 1.5), (2.5, 2.5), 45.0);
        assert!(dst.pixels().all(|p| *p == Rgb([10, 20, 30])));
    }
}
