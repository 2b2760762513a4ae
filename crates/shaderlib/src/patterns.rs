use glam::{Vec2, Vec3};

use crate::noise::{fbm, simplex_noise_3d, FbmOptions};
use crate::{smoothstep, step};

/// Signed distance from `p` to a circle of `radius` around the origin.
pub fn sd_sphere(p: Vec2, radius: f32) -> f32 {
    p.length() - radius
}

/// Snaps aspect-corrected UVs to blocks of `size` screen pixels.
pub fn pixellation_pattern(uv: Vec2, size: f32, screen_width: f32) -> Vec2 {
    let pixel_size = size / screen_width;
    (uv / pixel_size).floor() * pixel_size
}

/// Sparse speckles: 1 where two warped noise lookups both exceed `density`.
pub fn speckled_noise_pattern(uv: Vec2, density: f32, warp_amount: Vec2) -> f32 {
    let options = FbmOptions::default();
    let warp = (Vec2::new(
        fbm((uv * 3.0).extend(0.0), &options),
        fbm((uv * 3.0 + 100.0).extend(0.0), &options),
    ) - 0.5)
        * 0.1;
    let warped = uv + warp;

    let first = simplex_noise_3d((warped * warp_amount.x).extend(0.0));
    let second = simplex_noise_3d(Vec3::from((warped * warp_amount.y + 50.0, 0.0)));
    step(density, first) * step(density, second)
}

/// 1 at the center of centered UVs, fading towards 0 past `smoothing`.
pub fn vignette_pattern(uv: Vec2, smoothing: f32, exponent: f32) -> f32 {
    let vignette = 1.0 - smoothstep(smoothing, 1.0, sd_sphere(uv, 0.0));
    vignette.powf(exponent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vignette_is_bright_in_the_middle_and_dark_at_the_edge() {
        assert_eq!(vignette_pattern(Vec2::ZERO, 0.45, 1.2), 1.0);
        assert_eq!(vignette_pattern(Vec2::new(1.0, 1.0), 0.45, 1.2), 0.0);
        let mid = vignette_pattern(Vec2::new(0.7, 0.0), 0.45, 1.2);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn pixellation_snaps_to_block_grid() {
        let snapped = pixellation_pattern(Vec2::new(0.123, 0.456), 20.0, 200.0);
        assert!((snapped.x - 0.1).abs() < 1e-6);
        assert!((snapped.y - 0.4).abs() < 1e-6);
    }

    #[test]
    fn speckles_are_binary_and_sparse() {
        let mut lit = 0;
        let mut total = 0;
        for x in 0..40 {
            for y in 0..40 {
                let uv = Vec2::new(x as f32 / 40.0, y as f32 / 40.0);
                let value = speckled_noise_pattern(uv, 0.75, Vec2::new(80.0, 120.0));
                assert!(value == 0.0 || value == 1.0);
                lit += value as u32;
                total += 1;
            }
        }
        assert!(lit < total / 4, "{lit} of {total} lit");
    }

    #[test]
    fn sd_sphere_is_signed() {
        assert_eq!(sd_sphere(Vec2::new(3.0, 4.0), 5.0), 0.0);
        assert!(sd_sphere(Vec2::ZERO, 1.0) < 0.0);
    }
}
