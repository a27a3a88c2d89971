//! # scene_layout
//!
//! Fixed target-position distributions and easing math for the particle
//! tree scene.
//!
//! Every visual element in the scene owns two or three *target* positions —
//! where it sits when the tree is assembled, where it flies when the scene
//! scatters, and (for photo cards) where it hangs in the viewing ring.
//! These targets are generated **once**, from the deterministic
//! distributions in this crate, and never change afterwards; the
//! choreographer only ever interpolates an element's current position
//! toward one of them.
//!
//! Layouts are seeded, so the same seed always produces the same scene.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ════════════════════════════════════════════════════════════════════════════
// Easing and interpolation
// ════════════════════════════════════════════════════════════════════════════

/// Cubic ease-out: fast start, gentle arrival.  `p` in 0–1.
pub fn ease_out_cubic(p: f32) -> f32 {
    let q = 1.0 - p.clamp(0.0, 1.0);
    1.0 - q * q * q
}

/// Linear interpolation between two scalars.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// First-order blend toward `target` at `rate` per second.
///
/// The step never overshoots: the blend fraction is capped at 1 even for
/// large `dt`, so a stalled frame lands on the target instead of past it.
pub fn damp(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * (rate * dt).min(1.0)
}

/// Vector form of [`damp`].
pub fn damp_vec3(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    current + (target - current) * (rate * dt).min(1.0)
}

// ════════════════════════════════════════════════════════════════════════════
// Cylindrical coordinates
// ════════════════════════════════════════════════════════════════════════════

/// A position expressed as (radius, angle, height) around the tree axis.
///
/// The construction animation scripts radius, angle and height separately
/// (a decaying corkscrew), so targets round-trip through this form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cylindrical {
    pub radius: f32,
    pub angle:  f32,
    pub height: f32,
}

impl Cylindrical {
    pub fn from_vec3(p: Vec3) -> Self {
        Cylindrical {
            radius: (p.x * p.x + p.z * p.z).sqrt(),
            angle:  p.z.atan2(p.x),
            height: p.y,
        }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(
            self.radius * self.angle.cos(),
            self.height,
            self.radius * self.angle.sin(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tree cone
// ════════════════════════════════════════════════════════════════════════════

/// Golden angle in radians — consecutive spiral points never stack.
const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Dimensions of the tree cone.  Heights run from `-height/2` (skirt) to
/// `+height/2` (apex) so the tree rotates about the world origin.
#[derive(Clone, Copy, Debug)]
pub struct TreeDims {
    pub height:      f32,
    pub base_radius: f32,
    pub top_radius:  f32,
}

impl Default for TreeDims {
    fn default() -> Self {
        TreeDims {
            height:      8.0,
            base_radius: 3.2,
            top_radius:  0.15,
        }
    }
}

impl TreeDims {
    /// Cone radius at normalized height `t` (0 = skirt, 1 = apex).
    pub fn radius_at(&self, t: f32) -> f32 {
        lerp(self.base_radius, self.top_radius, t.clamp(0.0, 1.0))
    }

    /// Normalized height of a point, 0 at the skirt, 1 at the apex.
    pub fn normalized_height(&self, p: Vec3) -> f32 {
        ((p.y + self.height * 0.5) / self.height).clamp(0.0, 1.0)
    }
}

/// Spiral of `n` points winding up the cone surface.
///
/// Point `i` sits at normalized height `i / (n-1)`, at the cone radius for
/// that height, at angle `i × golden-angle`.  `jitter` (0 = exact surface)
/// displaces each point radially and vertically by up to that many units,
/// which turns the bare spiral into a believable bough volume.
pub fn spiral_cone(n: usize, dims: TreeDims, jitter: f32, seed: u64) -> Vec<Vec3> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(n);
    let denom = (n.saturating_sub(1)).max(1) as f32;

    for i in 0..n {
        let t = i as f32 / denom;
        let radius = dims.radius_at(t) + rng.gen_range(-jitter..=jitter);
        let height = t * dims.height - dims.height * 0.5 + rng.gen_range(-jitter..=jitter);
        let angle = i as f32 * GOLDEN_ANGLE;
        out.push(Vec3::new(
            radius.max(0.0) * angle.cos(),
            height,
            radius.max(0.0) * angle.sin(),
        ));
    }
    out
}

/// `n` points hung on the cone surface at random heights and angles.
///
/// Unlike [`spiral_cone`] the heights are not evenly spaced; ornaments and
/// bulbs look placed, not printed.  `inset` pulls the points slightly
/// inside the surface so they nest between the boughs.
pub fn surface_hang(n: usize, dims: TreeDims, inset: f32, seed: u64) -> Vec<Vec3> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(n);

    for _ in 0..n {
        // Bias toward the lower half where there is more surface to hang on.
        let t: f32 = rng.gen::<f32>().powf(1.4);
        let radius = (dims.radius_at(t) - inset).max(0.05);
        let height = t * dims.height - dims.height * 0.5;
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        out.push(Vec3::new(radius * angle.cos(), height, radius * angle.sin()));
    }
    out
}

// ════════════════════════════════════════════════════════════════════════════
// Scatter cloud
// ════════════════════════════════════════════════════════════════════════════

/// `n` points filling a spherical cloud of the given outer `radius`.
///
/// Radii follow a cube-root law (uniform density in the ball) with a hollow
/// inner third, so the exploded scene reads as a cloud rather than a clump
/// in front of the camera.
pub fn scatter_cloud(n: usize, radius: f32, seed: u64) -> Vec<Vec3> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(n);

    for _ in 0..n {
        let dir = random_unit(&mut rng);
        let r = radius * lerp(0.35, 1.0, rng.gen::<f32>().cbrt());
        out.push(dir * r);
    }
    out
}

fn random_unit(rng: &mut StdRng) -> Vec3 {
    // Rejection-sample the unit ball, then normalize.
    loop {
        let v = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        let len = v.length();
        if len > 1e-4 && len <= 1.0 {
            return v / len;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Photo ring
// ════════════════════════════════════════════════════════════════════════════

/// `n` evenly spaced points on a horizontal ring — the photo viewing layout.
pub fn photo_ring(n: usize, radius: f32, height: f32) -> Vec<Vec3> {
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let angle = i as f32 / n.max(1) as f32 * std::f32::consts::TAU;
        out.push(Vec3::new(radius * angle.cos(), height, radius * angle.sin()));
    }
    out
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        // Out of range clamps rather than extrapolating
        assert_eq!(ease_out_cubic(1.7), 1.0);
        assert_eq!(ease_out_cubic(-0.3), 0.0);
    }

    #[test]
    fn ease_out_cubic_front_loaded() {
        // Ease-out covers more than half the distance by the halfway mark.
        assert!(ease_out_cubic(0.5) > 0.5);
    }

    #[test]
    fn damp_never_overshoots() {
        // Huge dt must land exactly on the target, not beyond it.
        assert_eq!(damp(0.0, 10.0, 4.0, 100.0), 10.0);
        let v = damp_vec3(Vec3::ZERO, Vec3::splat(3.0), 4.0, 100.0);
        assert_eq!(v, Vec3::splat(3.0));
    }

    #[test]
    fn damp_moves_toward_target() {
        let a = damp(0.0, 10.0, 2.0, 0.016);
        assert!(a > 0.0 && a < 10.0);
    }

    #[test]
    fn cylindrical_round_trip() {
        let p = Vec3::new(1.25, -2.0, 0.75);
        let c = Cylindrical::from_vec3(p);
        let q = c.to_vec3();
        assert!((p - q).length() < 1e-5);
    }

    #[test]
    fn spiral_cone_count_and_determinism() {
        let dims = TreeDims::default();
        let a = spiral_cone(500, dims, 0.3, 7);
        let b = spiral_cone(500, dims, 0.3, 7);
        assert_eq!(a.len(), 500);
        assert_eq!(a, b);
    }

    #[test]
    fn spiral_cone_narrows_toward_apex() {
        let dims = TreeDims::default();
        let pts = spiral_cone(1000, dims, 0.0, 1);
        let low = Cylindrical::from_vec3(pts[10]).radius;
        let high = Cylindrical::from_vec3(pts[990]).radius;
        assert!(high < low);
    }

    #[test]
    fn spiral_cone_spans_full_height() {
        let dims = TreeDims::default();
        let pts = spiral_cone(100, dims, 0.0, 1);
        assert!((pts[0].y + dims.height * 0.5).abs() < 1e-4);
        assert!((pts[99].y - dims.height * 0.5).abs() < 1e-4);
    }

    #[test]
    fn normalized_height_endpoints() {
        let dims = TreeDims::default();
        assert_eq!(dims.normalized_height(Vec3::new(0.0, -4.0, 0.0)), 0.0);
        assert_eq!(dims.normalized_height(Vec3::new(0.0, 4.0, 0.0)), 1.0);
    }

    #[test]
    fn surface_hang_inside_cone() {
        let dims = TreeDims::default();
        for p in surface_hang(200, dims, 0.1, 3) {
            let c = Cylindrical::from_vec3(p);
            let t = dims.normalized_height(p);
            assert!(c.radius <= dims.radius_at(t) + 1e-4);
        }
    }

    #[test]
    fn scatter_cloud_within_radius() {
        for p in scatter_cloud(500, 14.0, 11) {
            assert!(p.length() <= 14.0 + 1e-4);
            // Hollow core
            assert!(p.length() >= 14.0 * 0.35 - 1e-4);
        }
    }

    #[test]
    fn photo_ring_evenly_spaced() {
        let ring = photo_ring(6, 5.0, 1.0);
        assert_eq!(ring.len(), 6);
        for p in &ring {
            let c = Cylindrical::from_vec3(*p);
            assert!((c.radius - 5.0).abs() < 1e-4);
            assert!((c.height - 1.0).abs() < 1e-6);
        }
        // Adjacent gap is constant
        let d01 = (ring[0] - ring[1]).length();
        let d12 = (ring[1] - ring[2]).length();
        assert!((d01 - d12).abs() < 1e-4);
    }
}
