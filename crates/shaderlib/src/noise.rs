//! Simplex noise and the fractal layers built on top of it.

use glam::{Mat2, Vec2, Vec3, Vec4};

fn mod289_3(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn mod289_4(x: Vec4) -> Vec4 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn permute(x: Vec4) -> Vec4 {
    mod289_4((x * 34.0 + 1.0) * x)
}

fn taylor_inv_sqrt(r: Vec4) -> Vec4 {
    Vec4::splat(1.792_842_9) - r * 0.853_734_7
}

fn step3(edge: Vec3, x: Vec3) -> Vec3 {
    Vec3::select(x.cmplt(edge), Vec3::ZERO, Vec3::ONE)
}

/// 3D simplex noise in roughly `[-1, 1]`.
pub fn simplex_noise_3d(v: Vec3) -> f32 {
    const C_X: f32 = 1.0 / 6.0;
    const C_Y: f32 = 1.0 / 3.0;

    let i = (v + (v.x + v.y + v.z) * C_Y).floor();
    let x0 = v - i + (i.x + i.y + i.z) * C_X;

    let g = step3(Vec3::new(x0.y, x0.z, x0.x), x0);
    let l = Vec3::ONE - g;
    let l_zxy = Vec3::new(l.z, l.x, l.y);
    let i1 = g.min(l_zxy);
    let i2 = g.max(l_zxy);

    let x1 = x0 - i1 + C_X;
    let x2 = x0 - i2 + C_Y;
    let x3 = x0 - 0.5;

    let i = mod289_3(i);
    let p = permute(
        permute(
            permute(Vec4::splat(i.z) + Vec4::new(0.0, i1.z, i2.z, 1.0))
                + Vec4::splat(i.y)
                + Vec4::new(0.0, i1.y, i2.y, 1.0),
        ) + Vec4::splat(i.x)
            + Vec4::new(0.0, i1.x, i2.x, 1.0),
    );

    // Gradients: 7x7 points over a square, mapped onto an octahedron.
    let n = 1.0 / 7.0;
    let ns = Vec3::new(2.0 * n, 0.5 * n - 1.0, n);
    let j = p - 49.0 * (p * ns.z * ns.z).floor();
    let x_ = (j * ns.z).floor();
    let y_ = (j - 7.0 * x_).floor();
    let x = x_ * ns.x + ns.y;
    let y = y_ * ns.x + ns.y;
    let h = Vec4::ONE - x.abs() - y.abs();

    let b0 = Vec4::new(x.x, x.y, y.x, y.y);
    let b1 = Vec4::new(x.z, x.w, y.z, y.w);
    let s0 = b0.floor() * 2.0 + 1.0;
    let s1 = b1.floor() * 2.0 + 1.0;
    let sh = Vec4::select(h.cmple(Vec4::ZERO), Vec4::splat(-1.0), Vec4::ZERO);

    let a0 = Vec4::new(
        b0.x + s0.x * sh.x,
        b0.z + s0.z * sh.x,
        b0.y + s0.y * sh.y,
        b0.w + s0.w * sh.y,
    );
    let a1 = Vec4::new(
        b1.x + s1.x * sh.z,
        b1.z + s1.z * sh.z,
        b1.y + s1.y * sh.w,
        b1.w + s1.w * sh.w,
    );

    let p0 = Vec3::new(a0.x, a0.y, h.x);
    let p1 = Vec3::new(a0.z, a0.w, h.y);
    let p2 = Vec3::new(a1.x, a1.y, h.z);
    let p3 = Vec3::new(a1.z, a1.w, h.w);
    let norm = taylor_inv_sqrt(Vec4::new(p0.dot(p0), p1.dot(p1), p2.dot(p2), p3.dot(p3)));
    let p0 = p0 * norm.x;
    let p1 = p1 * norm.y;
    let p2 = p2 * norm.z;
    let p3 = p3 * norm.w;

    let m = (Vec4::splat(0.6) - Vec4::new(x0.dot(x0), x1.dot(x1), x2.dot(x2), x3.dot(x3)))
        .max(Vec4::ZERO);
    let m = m * m;
    42.0 * (m * m).dot(Vec4::new(p0.dot(x0), p1.dot(x1), p2.dot(x2), p3.dot(x3)))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FbmOptions {
    pub octaves: u32,
    pub frequency: f32,
    pub amplitude: f32,
    /// Frequency multiplier between octaves.
    pub lacunarity: f32,
    /// Amplitude multiplier between octaves.
    pub gain: f32,
}

impl Default for FbmOptions {
    fn default() -> Self {
        Self {
            octaves: 4,
            frequency: 1.0,
            amplitude: 1.0,
            lacunarity: 2.0,
            gain: 0.5,
        }
    }
}

fn accumulate_octaves(p: Vec3, options: &FbmOptions, shape: impl Fn(f32) -> f32) -> f32 {
    let mut value = 0.0;
    let mut amplitude = options.amplitude;
    let mut frequency = options.frequency;
    let mut max_value = 0.0;
    for _ in 0..options.octaves {
        value += shape(simplex_noise_3d(p * frequency)) * amplitude;
        max_value += amplitude;
        frequency *= options.lacunarity;
        amplitude *= options.gain;
    }
    if max_value == 0.0 {
        0.0
    } else {
        value / max_value
    }
}

/// Fractal Brownian motion normalized back to the simplex range.
pub fn fbm(p: Vec3, options: &FbmOptions) -> f32 {
    accumulate_octaves(p, options, |noise| noise)
}

/// FBM over `(1 - |n|)^2`, producing sharp ridges in `[0, 1]`.
pub fn ridged_fbm(p: Vec3, options: &FbmOptions) -> f32 {
    accumulate_octaves(p, options, |noise| {
        let ridge = 1.0 - noise.abs();
        ridge * ridge
    })
}

/// FBM sampled at a position displaced by three decorrelated FBM lookups.
pub fn domain_warped_fbm(p: Vec3, options: &FbmOptions, warp_strength: f32) -> f32 {
    let warp = Vec3::new(
        fbm(p, options),
        fbm(p + 100.0, options),
        fbm(p + 200.0, options),
    );
    fbm(p + warp * warp_strength, options)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpedFbmOptions {
    pub frequency: f32,
    pub offset1: f32,
    pub offset2: f32,
    pub oscillation1: f32,
    pub oscillation2: f32,
    pub contribution1: f32,
    pub contribution2: f32,
}

impl Default for WarpedFbmOptions {
    fn default() -> Self {
        Self {
            frequency: 25.0,
            offset1: 25.0,
            offset2: 75.0,
            oscillation1: 10.0,
            oscillation2: 3.0,
            contribution1: 0.2,
            contribution2: 0.1,
        }
    }
}

/// Two rounds of FBM coordinate warping, then one simplex lookup.
pub fn warped_fbm_coords(uv: Vec2, time: f32, options: &WarpedFbmOptions) -> f32 {
    let fbm_defaults = FbmOptions::default();

    let scaled = uv * options.oscillation1;
    let warp1 = (Vec2::new(
        fbm(scaled.extend(time), &fbm_defaults),
        fbm((scaled + options.offset1).extend(time), &fbm_defaults),
    ) - 0.5)
        * options.contribution1;
    let warped1 = uv + warp1;

    let scaled = warped1 * options.oscillation2;
    let warp2 = (Vec2::new(
        fbm(scaled.extend(time * 0.5), &fbm_defaults),
        fbm((scaled + options.offset2).extend(time * 0.5), &fbm_defaults),
    ) - 0.5)
        * options.contribution2;
    let warped2 = warped1 + warp2;

    simplex_noise_3d((warped2 * options.frequency).extend(time))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurbulenceOptions {
    pub count: u32,
    pub amplitude: f32,
    pub speed: f32,
    pub frequency: f32,
    /// Frequency growth per octave.
    pub exponent: f32,
}

impl Default for TurbulenceOptions {
    fn default() -> Self {
        Self {
            count: 10,
            amplitude: 0.7,
            speed: 0.3,
            frequency: 2.0,
            exponent: 1.4,
        }
    }
}

/// Layered, rotating sine offsets applied to `p`.
pub fn turbulence(p: Vec2, time: f32, options: &TurbulenceOptions) -> Vec2 {
    let step = Mat2::from_cols(Vec2::new(0.6, -0.8), Vec2::new(0.8, 0.6));
    let mut p = p;
    let mut rotation = step;
    let mut frequency = options.frequency;
    for i in 0..options.count {
        // Row-vector product: (p * rot).y == dot(p, rot[1]).
        let phase = frequency * p.dot(rotation.y_axis) + options.speed * time + i as f32;
        p += options.amplitude * rotation.x_axis * phase.sin() / frequency;
        rotation *= step;
        frequency *= options.exponent;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> impl Iterator<Item = Vec3> {
        (0..12).flat_map(|x| {
            (0..12).flat_map(move |y| {
                (0..4).map(move |z| Vec3::new(x as f32 * 0.37, y as f32 * 0.53, z as f32 * 1.1))
            })
        })
    }

    #[test]
    fn simplex_is_bounded_and_varies() {
        let samples: Vec<f32> = grid().map(simplex_noise_3d).collect();
        assert!(samples.iter().all(|n| n.is_finite() && n.abs() <= 1.05));
        let spread = samples.iter().cloned().fold(f32::MIN, f32::max)
            - samples.iter().cloned().fold(f32::MAX, f32::min);
        assert!(spread > 0.5, "noise looks flat: spread {spread}");
    }

    #[test]
    fn simplex_is_deterministic_and_continuous() {
        let p = Vec3::new(1.3, -2.7, 0.4);
        assert_eq!(simplex_noise_3d(p), simplex_noise_3d(p));
        let nudged = simplex_noise_3d(p + Vec3::splat(1e-4));
        assert!((simplex_noise_3d(p) - nudged).abs() < 1e-2);
    }

    #[test]
    fn fbm_variants_stay_in_range() {
        let options = FbmOptions::default();
        for p in grid() {
            assert!(fbm(p, &options).abs() <= 1.05);
            let ridged = ridged_fbm(p, &options);
            assert!((0.0..=1.0).contains(&ridged), "ridged {ridged}");
            assert!(domain_warped_fbm(p, &options, 0.1).abs() <= 1.05);
        }
    }

    #[test]
    fn fbm_without_octaves_is_zero() {
        let options = FbmOptions {
            octaves: 0,
            ..FbmOptions::default()
        };
        assert_eq!(fbm(Vec3::ONE, &options), 0.0);
    }

    #[test]
    fn single_octave_fbm_is_plain_noise() {
        let options = FbmOptions {
            octaves: 1,
            amplitude: 3.0,
            ..FbmOptions::default()
        };
        let p = Vec3::new(0.2, 0.9, 1.7);
        assert!((fbm(p, &options) - simplex_noise_3d(p)).abs() < 1e-6);
    }

    #[test]
    fn zero_amplitude_turbulence_is_identity() {
        let options = TurbulenceOptions {
            amplitude: 0.0,
            ..TurbulenceOptions::default()
        };
        let p = Vec2::new(0.25, -0.75);
        assert_eq!(turbulence(p, 3.0, &options), p);
        let moved = turbulence(p, 3.0, &TurbulenceOptions::default());
        assert!(moved.distance(p) > 0.0);
    }

    #[test]
    fn warped_coords_are_finite() {
        let options = WarpedFbmOptions::default();
        let n = warped_fbm_coords(Vec2::new(0.3, 0.6), 1.5, &options);
        assert!(n.is_finite() && n.abs() <= 1.05);
    }
}
