//! # scene_choreo
//!
//! The per-frame choreography engine.
//!
//! Given the current [`AppMode`], a monotonic time cursor, the hand control
//! position and four tunable scalars, [`Choreographer::tick`] produces the
//! authoritative position, scale and glow state for every element in the
//! scene, plus the group rotation and the focused-photo overlay.
//!
//! Element state lives in structure-of-arrays pools: flat parallel buffers
//! indexed by element id.  Target buffers are filled once at construction
//! and never change; each frame only `current_pos` and `construction`
//! move.  Inactive elements (density truncation) keep simulating so they
//! resume seamlessly when the density comes back up.
//!
//! Two regimes:
//!
//! * **Construction intro** — the first 4 s after mount, independent of
//!   mode.  Elements wait on a small orbit, then corkscrew down onto their
//!   tree position, bottom-up, scaling in from nothing.
//! * **Steady state** — every element lerps toward the active mode's
//!   target, snapping only across implausible distances.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hand_gesture::AppMode;
use scene_layout::{
    damp, damp_vec3, ease_out_cubic, lerp, photo_ring, scatter_cloud, spiral_cone, surface_hang,
    Cylindrical, TreeDims,
};

// ════════════════════════════════════════════════════════════════════════════
// Tuning constants
// ════════════════════════════════════════════════════════════════════════════

/// All scene feel lives here so the knobs stay in one place.
pub mod tuning {
    /// One-shot construction window, seconds from mount.
    pub const INTRO_DURATION: f32 = 4.0;
    /// Per-element travel time inside the intro.
    pub const INTRO_TRAVEL: f32 = 1.8;
    /// Highest start delay (apex elements); skirt elements start at 0.
    pub const INTRO_DELAY_SPREAD: f32 = INTRO_DURATION - INTRO_TRAVEL;
    /// Angle unwound during travel — the corkscrew.
    pub const INTRO_SPIN: f32 = std::f32::consts::TAU;
    /// Start radius = final radius + this.
    pub const INTRO_START_RADIUS_PAD: f32 = 6.0;
    /// Start height below the tree skirt.
    pub const INTRO_START_DROP: f32 = 1.5;
    /// Waiting elements circle on this radius...
    pub const WAIT_ORBIT_RADIUS: f32 = 0.45;
    /// ...at this rate (radians per second)...
    pub const WAIT_ORBIT_RATE: f32 = 0.8;
    /// ...phase-offset by normalized height times this.
    pub const WAIT_PHASE_SPREAD: f32 = 6.0;

    /// Per-element lerp gain toward the mode target, per second.
    pub const POSITION_GAIN: f32 = 3.0;
    /// Beyond this distance interpolation is replaced by placement.
    pub const SNAP_DISTANCE: f32 = 10.0;

    /// Group-rotation damping, per second.
    pub const ROTATION_DAMP: f32 = 3.0;
    /// Camera/group spin during the intro, radians per second.
    pub const INTRO_SPIN_RATE: f32 = 0.25;
    pub const TREE_AUTO_RATE: f32 = 0.12;
    pub const TREE_NUDGE: f32 = 0.3;
    pub const TREE_TILT: f32 = 0.15;
    pub const SCATTER_AUTO_RATE: f32 = 0.05;
    pub const SCATTER_GAIN: f32 = 1.2;
    pub const SCATTER_TILT: f32 = 0.45;
    /// Hard pitch clamp so hand tilt can never flip the scene.
    pub const TILT_CLAMP: f32 = 0.6;
    pub const ZOOM_AUTO_RATE: f32 = 0.08;

    /// Accent-tint blend rate between Tree (1.0) and the rest (0.0).
    pub const MODE_BLEND_RATE: f32 = 2.5;

    pub const CAMERA_DISTANCE: f32 = 16.0;
    /// Focused photo hangs this far in front of the camera.
    pub const FOCUS_DISTANCE: f32 = 6.0;
    pub const FOCUS_POS_RATE: f32 = 8.0;
    /// Entering zoom eases the card up...
    pub const FOCUS_ENTER_RATE: f32 = 4.0;
    /// ...leaving it drops faster.
    pub const FOCUS_EXIT_RATE: f32 = 9.0;
}

use tuning::*;

// ════════════════════════════════════════════════════════════════════════════
// Palettes — packed 0xAARRGGBB
// ════════════════════════════════════════════════════════════════════════════

pub const STARDUST_PALETTE: [u32; 4] = [0xFFFFF2C0, 0xFFFFE08A, 0xFFFFFFFF, 0xFFD9F0FF];
pub const ORNAMENT_PALETTE: [u32; 5] = [0xFFE03A3A, 0xFFD4AF37, 0xFF2E6FD0, 0xFF8E44AD, 0xFF2ECC71];
pub const BULB_PALETTE: [u32; 3] = [0xFFFFE9B8, 0xFFFFC96B, 0xFFFFF7E6];
pub const PHOTO_PALETTE: [u32; 4] = [0xFFB0C4DE, 0xFFDEB0C4, 0xFFC4DEB0, 0xFFDED2B0];

// ════════════════════════════════════════════════════════════════════════════
// Frame input
// ════════════════════════════════════════════════════════════════════════════

/// The four tunable scalars.  Pre-clamped by the caller; the engine trusts
/// them (documented contract, not enforced here).
#[derive(Clone, Copy, Debug)]
pub struct SceneParams {
    /// Fraction of each element pool that is active/drawn, 0–1.
    pub density:         f32,
    pub size_factor:     f32,
    pub breathing_speed: f32,
    pub star_brightness: f32,
}

impl Default for SceneParams {
    fn default() -> Self {
        SceneParams {
            density:         1.0,
            size_factor:     1.0,
            breathing_speed: 1.0,
            star_brightness: 1.0,
        }
    }
}

/// Everything the engine needs for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    /// Seconds since the previous frame.
    pub dt:          f32,
    /// Seconds since scene mount (monotonic).
    pub elapsed:     f32,
    pub mode:        AppMode,
    /// Hand control position in [-1,1]², (0,0) when no hand.
    pub hand:        (f32, f32),
    /// Number of photos currently in the controller's list.
    pub photo_count: usize,
    pub params:      SceneParams,
}

// ════════════════════════════════════════════════════════════════════════════
// Shader-style uniforms
// ════════════════════════════════════════════════════════════════════════════

/// Values the renderer feeds to every element uniformly.
#[derive(Clone, Copy, Debug, Default)]
pub struct Uniforms {
    pub time:            f32,
    pub star_brightness: f32,
    /// 1.0 in Tree mode, 0.0 otherwise, smoothly blended — fades the
    /// holiday accent tint in and out.
    pub mode_blend:      f32,
}

/// Per-element glow pulse, 0–1.
pub fn pulse(phase: f32, time: f32, breathing_speed: f32) -> f32 {
    0.5 + 0.5 * (phase + time * breathing_speed).sin()
}

// ════════════════════════════════════════════════════════════════════════════
// ElementPool — structure-of-arrays element state
// ════════════════════════════════════════════════════════════════════════════

/// One pool of like elements (stardust, ornaments, bulbs or photo cards).
///
/// Parallel buffers, indexed by element id.  `tree_pos`, `scatter_pos` and
/// `photo_pos` are fixed targets; `current_pos` and `construction` are the
/// only per-frame mutables.
pub struct ElementPool {
    tree_pos:    Vec<Vec3>,
    scatter_pos: Vec<Vec3>,
    photo_pos:   Option<Vec<Vec3>>,

    pub current_pos:  Vec<Vec3>,
    /// Construction scale factor, 0–1; 1 once the intro has finished.
    pub construction: Vec<f32>,

    // static per-element parameters, assigned once
    pub scale:      Vec<f32>,
    pub phase:      Vec<f32>,
    pub spin_speed: Vec<f32>,
    pub color:      Vec<u32>,

    // precomputed intro script inputs
    tree_cyl:     Vec<Cylindrical>,
    delay:        Vec<f32>,
    norm_height:  Vec<f32>,
    start_height: f32,

    active_len: usize,
}

impl ElementPool {
    /// Build a pool from its fixed target distributions.
    pub fn new(
        tree_pos: Vec<Vec3>,
        scatter_pos: Vec<Vec3>,
        photo_pos: Option<Vec<Vec3>>,
        dims: TreeDims,
        palette: &[u32],
        seed: u64,
    ) -> Self {
        let n = tree_pos.len();
        assert_eq!(scatter_pos.len(), n);
        if let Some(p) = &photo_pos {
            assert_eq!(p.len(), n);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut scale = Vec::with_capacity(n);
        let mut phase = Vec::with_capacity(n);
        let mut spin_speed = Vec::with_capacity(n);
        let mut color = Vec::with_capacity(n);
        let mut tree_cyl = Vec::with_capacity(n);
        let mut delay = Vec::with_capacity(n);
        let mut norm_height = Vec::with_capacity(n);

        for p in &tree_pos {
            let h = dims.normalized_height(*p);
            tree_cyl.push(Cylindrical::from_vec3(*p));
            norm_height.push(h);
            delay.push(h * INTRO_DELAY_SPREAD);
            scale.push(rng.gen_range(0.7..1.3));
            phase.push(rng.gen_range(0.0..std::f32::consts::TAU));
            spin_speed.push(rng.gen_range(0.3..1.6));
            color.push(palette[rng.gen_range(0..palette.len())]);
        }

        ElementPool {
            current_pos: tree_pos.clone(),
            construction: vec![0.0; n],
            tree_pos,
            scatter_pos,
            photo_pos,
            scale,
            phase,
            spin_speed,
            color,
            tree_cyl,
            delay,
            norm_height,
            start_height: -dims.height * 0.5 - INTRO_START_DROP,
            active_len: n,
        }
    }

    pub fn len(&self) -> usize {
        self.tree_pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree_pos.is_empty()
    }

    /// Elements actually drawn this frame.  Truncation, not destruction.
    pub fn active_len(&self) -> usize {
        self.active_len
    }

    pub fn set_active_fraction(&mut self, density: f32) {
        self.active_len = (self.len() as f32 * density) as usize;
    }

    pub fn set_active_count(&mut self, count: usize) {
        self.active_len = count.min(self.len());
    }

    /// Fixed target for `mode`.  Pools without a photo layout fall back to
    /// their scatter target in PhotoZoom (zoom is entered from Scatter, so
    /// the backdrop keeps its cloud).
    pub fn target(&self, mode: AppMode, i: usize) -> Vec3 {
        match mode {
            AppMode::Tree => self.tree_pos[i],
            AppMode::Scatter => self.scatter_pos[i],
            AppMode::PhotoZoom => match &self.photo_pos {
                Some(p) => p[i],
                None => self.scatter_pos[i],
            },
        }
    }

    /// Scripted intro transform for element `i` at `elapsed` seconds:
    /// returns (position, construction scale factor).
    ///
    /// Before its delay the element circles, invisible (factor 0).  During
    /// travel the radius and height ease from an oversized ring below the
    /// skirt onto the exact tree target while the angle unwinds one full
    /// turn.  From `delay + INTRO_TRAVEL` on, the result is bit-for-bit the
    /// stored tree position with factor exactly 1.
    pub fn intro_at(&self, i: usize, elapsed: f32) -> (Vec3, f32) {
        let delay = self.delay[i];
        let cyl = self.tree_cyl[i];
        let start_radius = cyl.radius + INTRO_START_RADIUS_PAD;

        if elapsed < delay {
            let phase = elapsed * WAIT_ORBIT_RATE + self.norm_height[i] * WAIT_PHASE_SPREAD;
            let center = Cylindrical {
                radius: start_radius,
                angle:  cyl.angle - INTRO_SPIN,
                height: self.start_height,
            }
            .to_vec3();
            let orbit = Vec3::new(phase.cos(), 0.0, phase.sin()) * WAIT_ORBIT_RADIUS;
            return (center + orbit, 0.0);
        }

        if elapsed >= delay + INTRO_TRAVEL {
            return (self.tree_pos[i], 1.0);
        }

        let e = ease_out_cubic((elapsed - delay) / INTRO_TRAVEL);
        let pos = Cylindrical {
            radius: lerp(start_radius, cyl.radius, e),
            angle:  cyl.angle - INTRO_SPIN * (1.0 - e),
            height: lerp(self.start_height, cyl.height, e),
        }
        .to_vec3();
        (pos, e)
    }

    /// Advance every element one frame.  All elements update, active or
    /// not, so density changes resume cleanly.
    pub fn tick(&mut self, mode: AppMode, dt: f32, elapsed: f32) {
        if elapsed < INTRO_DURATION {
            for i in 0..self.len() {
                let (pos, s) = self.intro_at(i, elapsed);
                self.current_pos[i] = pos;
                self.construction[i] = s;
            }
            return;
        }

        let blend = (POSITION_GAIN * dt).min(1.0);
        for i in 0..self.len() {
            self.construction[i] = 1.0;
            let target = self.target(mode, i);
            let delta = target - self.current_pos[i];
            if delta.length() > SNAP_DISTANCE {
                self.current_pos[i] = target;
            } else {
                self.current_pos[i] += delta * blend;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FocusOverlay — the camera-locked focused-photo billboard
// ════════════════════════════════════════════════════════════════════════════

/// The zoomed photo card, pinned a fixed distance in front of the camera.
///
/// Orientation never lerps (a flat card shows any latency); position does,
/// and the content scale runs to 0 when not zoomed and to 1 when zoomed,
/// with a sharper exit rate than entry.
#[derive(Clone, Copy, Debug)]
pub struct FocusOverlay {
    pub pos:   Vec3,
    pub scale: f32,
}

impl FocusOverlay {
    fn new(camera_eye: Vec3) -> Self {
        FocusOverlay {
            pos:   focus_anchor(camera_eye),
            scale: 0.0,
        }
    }

    fn tick(&mut self, camera_eye: Vec3, zoomed: bool, dt: f32) {
        self.pos = damp_vec3(self.pos, focus_anchor(camera_eye), FOCUS_POS_RATE, dt);
        let (target, rate) = if zoomed {
            (1.0, FOCUS_ENTER_RATE)
        } else {
            (0.0, FOCUS_EXIT_RATE)
        };
        self.scale = damp(self.scale, target, rate, dt);
    }
}

/// Point `FOCUS_DISTANCE` in front of the camera, toward the origin.
fn focus_anchor(camera_eye: Vec3) -> Vec3 {
    camera_eye + (-camera_eye).normalize_or_zero() * FOCUS_DISTANCE
}

// ════════════════════════════════════════════════════════════════════════════
// SceneConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
pub struct SceneConfig {
    pub dims:           TreeDims,
    pub stardust_count: usize,
    pub ornament_count: usize,
    pub bulb_count:     usize,
    /// Photo-card slots; the live photo list indexes into them.
    pub photo_capacity: usize,
    pub scatter_radius: f32,
    pub seed:           u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            dims:           TreeDims::default(),
            stardust_count: 12_000,
            ornament_count: 96,
            bulb_count:     140,
            photo_capacity: 64,
            scatter_radius: 14.0,
            seed:           0xC0FFEE,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Choreographer
// ════════════════════════════════════════════════════════════════════════════

pub struct Choreographer {
    pub dims:      TreeDims,
    pub stardust:  ElementPool,
    pub ornaments: ElementPool,
    pub bulbs:     ElementPool,
    pub photos:    ElementPool,

    /// Group rotation applied to everything except the focus overlay.
    pub yaw:   f32,
    pub pitch: f32,
    auto_angle: f32,

    pub uniforms: Uniforms,
    pub focus:    FocusOverlay,
}

impl Choreographer {
    pub fn new(cfg: SceneConfig) -> Self {
        let dims = cfg.dims;
        let seed = cfg.seed;

        let stardust = ElementPool::new(
            spiral_cone(cfg.stardust_count, dims, 0.35, seed),
            scatter_cloud(cfg.stardust_count, cfg.scatter_radius, seed ^ 1),
            None,
            dims,
            &STARDUST_PALETTE,
            seed ^ 2,
        );
        let ornaments = ElementPool::new(
            surface_hang(cfg.ornament_count, dims, 0.05, seed ^ 3),
            scatter_cloud(cfg.ornament_count, cfg.scatter_radius, seed ^ 4),
            None,
            dims,
            &ORNAMENT_PALETTE,
            seed ^ 5,
        );
        let bulbs = ElementPool::new(
            surface_hang(cfg.bulb_count, dims, 0.15, seed ^ 6),
            scatter_cloud(cfg.bulb_count, cfg.scatter_radius, seed ^ 7),
            None,
            dims,
            &BULB_PALETTE,
            seed ^ 8,
        );
        let photos = ElementPool::new(
            surface_hang(cfg.photo_capacity, dims, 0.0, seed ^ 9),
            scatter_cloud(cfg.photo_capacity, cfg.scatter_radius * 0.7, seed ^ 10),
            Some(photo_ring(cfg.photo_capacity, 5.0, 1.0)),
            dims,
            &PHOTO_PALETTE,
            seed ^ 11,
        );

        let eye = Self::camera_eye();
        Choreographer {
            dims,
            stardust,
            ornaments,
            bulbs,
            photos,
            yaw: 0.0,
            pitch: 0.0,
            auto_angle: 0.0,
            uniforms: Uniforms::default(),
            focus: FocusOverlay::new(eye),
        }
    }

    /// Fixed camera eye; the *group* rotates instead.
    pub fn camera_eye() -> Vec3 {
        Vec3::new(0.0, 1.2, CAMERA_DISTANCE)
    }

    /// Advance the whole scene one frame.
    pub fn tick(&mut self, input: &FrameInput) {
        let dt = input.dt;

        // ── uniforms ─────────────────────────────────────────────────────
        self.uniforms.time = input.elapsed;
        self.uniforms.star_brightness = input.params.star_brightness;
        let accent = if input.mode == AppMode::Tree { 1.0 } else { 0.0 };
        self.uniforms.mode_blend = damp(self.uniforms.mode_blend, accent, MODE_BLEND_RATE, dt);

        // ── group rotation ───────────────────────────────────────────────
        self.update_rotation(input);

        // ── element pools ────────────────────────────────────────────────
        self.stardust.tick(input.mode, dt, input.elapsed);
        self.ornaments.tick(input.mode, dt, input.elapsed);
        self.bulbs.tick(input.mode, dt, input.elapsed);
        self.photos.tick(input.mode, dt, input.elapsed);

        self.stardust.set_active_fraction(input.params.density);
        self.ornaments.set_active_fraction(input.params.density);
        self.bulbs.set_active_fraction(input.params.density);
        self.photos.set_active_count(input.photo_count);

        // ── focus overlay ────────────────────────────────────────────────
        let zoomed = input.mode == AppMode::PhotoZoom && input.photo_count > 0;
        self.focus.tick(Self::camera_eye(), zoomed, dt);
    }

    fn update_rotation(&mut self, input: &FrameInput) {
        let dt = input.dt;

        // Intro: auto-driven spin, hand ignored.
        if input.elapsed < INTRO_DURATION {
            self.auto_angle += INTRO_SPIN_RATE * dt;
            self.yaw = self.auto_angle;
            self.pitch = damp(self.pitch, 0.0, ROTATION_DAMP, dt);
            return;
        }

        let (auto_rate, gain, tilt) = match input.mode {
            AppMode::Tree => (TREE_AUTO_RATE, TREE_NUDGE, TREE_TILT),
            AppMode::Scatter => (SCATTER_AUTO_RATE, SCATTER_GAIN, SCATTER_TILT),
            AppMode::PhotoZoom => (ZOOM_AUTO_RATE, 0.0, 0.0),
        };

        self.auto_angle += auto_rate * dt;
        let yaw_target = self.auto_angle + input.hand.0 * gain;
        let pitch_target = (input.hand.1 * tilt).clamp(-TILT_CLAMP, TILT_CLAMP);
        self.yaw = damp(self.yaw, yaw_target, ROTATION_DAMP, dt);
        self.pitch = damp(self.pitch, pitch_target, ROTATION_DAMP, dt);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SceneConfig {
        SceneConfig {
            stardust_count: 200,
            ornament_count: 12,
            bulb_count: 12,
            photo_capacity: 8,
            ..SceneConfig::default()
        }
    }

    fn frame(mode: AppMode, dt: f32, elapsed: f32) -> FrameInput {
        FrameInput {
            dt,
            elapsed,
            mode,
            hand: (0.0, 0.0),
            photo_count: 3,
            params: SceneParams::default(),
        }
    }

    #[test]
    fn intro_scale_is_zero_at_mount() {
        let ch = Choreographer::new(small_config());
        for i in 0..ch.stardust.len() {
            let (_, s) = ch.stardust.intro_at(i, 0.0);
            assert_eq!(s, 0.0);
        }
    }

    #[test]
    fn intro_lands_exactly_on_tree_target() {
        let ch = Choreographer::new(small_config());
        let pool = &ch.stardust;
        for i in (0..pool.len()).step_by(17) {
            let done = pool.delay[i] + tuning::INTRO_TRAVEL;
            let (pos, s) = pool.intro_at(i, done);
            assert_eq!(s, 1.0);
            assert_eq!(pos, pool.tree_pos[i]);
            // And stays put afterwards.
            let (pos, s) = pool.intro_at(i, done + 0.5);
            assert_eq!(s, 1.0);
            assert_eq!(pos, pool.tree_pos[i]);
        }
    }

    #[test]
    fn intro_progress_is_eased_and_monotone() {
        let ch = Choreographer::new(small_config());
        let pool = &ch.stardust;
        let i = 0;
        let delay = pool.delay[i];
        let mut last = -1.0;
        for step in 0..=18 {
            let t = delay + tuning::INTRO_TRAVEL * step as f32 / 18.0;
            let (_, s) = pool.intro_at(i, t);
            assert!(s >= last, "construction factor went backwards");
            last = s;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn intro_delay_grows_with_height() {
        // Bottom-up assembly: apex elements wait longest.
        let ch = Choreographer::new(small_config());
        let pool = &ch.stardust;
        let lowest = pool.delay[0];
        let highest = pool.delay[pool.len() - 1];
        assert!(highest > lowest);
        assert!(highest <= tuning::INTRO_DELAY_SPREAD + 1e-5);
    }

    #[test]
    fn whole_intro_finishes_by_duration() {
        let mut ch = Choreographer::new(small_config());
        // One tick just past the window: every pool is steady at
        // construction 1 (the last intro frame already placed apex
        // elements on target).
        ch.tick(&frame(AppMode::Tree, 0.016, tuning::INTRO_DURATION + 0.001));
        for pool in [&ch.stardust, &ch.ornaments, &ch.bulbs, &ch.photos] {
            for i in 0..pool.len() {
                assert_eq!(pool.construction[i], 1.0);
            }
        }
    }

    #[test]
    fn density_truncates_active_count_exactly() {
        let mut pool = ElementPool::new(
            spiral_cone(12_000, TreeDims::default(), 0.3, 1),
            scatter_cloud(12_000, 14.0, 2),
            None,
            TreeDims::default(),
            &STARDUST_PALETTE,
            3,
        );
        pool.set_active_fraction(0.5);
        assert_eq!(pool.active_len(), 6_000);
        pool.set_active_fraction(0.0);
        assert_eq!(pool.active_len(), 0);
        pool.set_active_fraction(1.0);
        assert_eq!(pool.active_len(), 12_000);
    }

    #[test]
    fn inactive_elements_keep_simulating() {
        let mut ch = Choreographer::new(small_config());
        let mut input = frame(AppMode::Scatter, 0.016, 10.0);
        input.params.density = 0.1;
        for step in 0..60 {
            input.elapsed = 10.0 + step as f32 * 0.016;
            ch.tick(&input);
        }
        // The last (inactive) element converged to its scatter target too.
        let i = ch.stardust.len() - 1;
        assert!(i >= ch.stardust.active_len());
        let d = (ch.stardust.current_pos[i] - ch.stardust.scatter_pos[i]).length();
        assert!(d < 1.0, "inactive element stalled at distance {}", d);
    }

    #[test]
    fn steady_state_approach_is_monotone_across_mode_flips() {
        let mut ch = Choreographer::new(small_config());
        // Settle into steady state first.
        ch.tick(&frame(AppMode::Tree, 0.016, 5.0));

        let mut elapsed = 5.0;
        for flip in 0..6 {
            let mode = if flip % 2 == 0 { AppMode::Scatter } else { AppMode::Tree };
            for _ in 0..20 {
                let before: Vec<f32> = (0..ch.stardust.len())
                    .map(|i| (ch.stardust.target(mode, i) - ch.stardust.current_pos[i]).length())
                    .collect();
                elapsed += 0.016;
                ch.tick(&frame(mode, 0.016, elapsed));
                for i in 0..ch.stardust.len() {
                    let after =
                        (ch.stardust.target(mode, i) - ch.stardust.current_pos[i]).length();
                    if before[i] <= tuning::SNAP_DISTANCE {
                        assert!(
                            after <= before[i] + 1e-4,
                            "element {} moved away from its target",
                            i
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn distant_elements_snap_instead_of_sliding() {
        let mut ch = Choreographer::new(small_config());
        ch.tick(&frame(AppMode::Tree, 0.016, 5.0));
        // Teleport one element far away.
        ch.stardust.current_pos[0] = Vec3::splat(100.0);
        ch.tick(&frame(AppMode::Tree, 0.016, 5.016));
        assert_eq!(ch.stardust.current_pos[0], ch.stardust.target(AppMode::Tree, 0));
    }

    #[test]
    fn mode_blend_fades_between_tree_and_rest() {
        let mut ch = Choreographer::new(small_config());
        let mut elapsed = 5.0;
        for _ in 0..300 {
            elapsed += 0.016;
            ch.tick(&frame(AppMode::Tree, 0.016, elapsed));
        }
        assert!(ch.uniforms.mode_blend > 0.95);

        for _ in 0..10 {
            elapsed += 0.016;
            ch.tick(&frame(AppMode::Scatter, 0.016, elapsed));
        }
        let mid = ch.uniforms.mode_blend;
        assert!(mid < 0.95 && mid > 0.0, "blend should be mid-fade, was {}", mid);

        for _ in 0..300 {
            elapsed += 0.016;
            ch.tick(&frame(AppMode::Scatter, 0.016, elapsed));
        }
        assert!(ch.uniforms.mode_blend < 0.05);
    }

    #[test]
    fn focus_overlay_exit_is_sharper_than_entry() {
        let mut enter = FocusOverlay { pos: Vec3::ZERO, scale: 0.0 };
        enter.tick(Choreographer::camera_eye(), true, 0.016);
        let rise = enter.scale;

        let mut exit = FocusOverlay { pos: Vec3::ZERO, scale: 1.0 };
        exit.tick(Choreographer::camera_eye(), false, 0.016);
        let drop = 1.0 - exit.scale;

        assert!(rise > 0.0 && drop > 0.0);
        assert!(drop > rise);
    }

    #[test]
    fn focus_overlay_ignores_empty_photo_list() {
        let mut ch = Choreographer::new(small_config());
        let mut input = frame(AppMode::PhotoZoom, 0.016, 5.0);
        input.photo_count = 0;
        let mut elapsed = 5.0;
        for _ in 0..60 {
            elapsed += 0.016;
            input.elapsed = elapsed;
            ch.tick(&input);
        }
        assert!(ch.focus.scale < 0.01, "no photos, nothing to zoom");
    }

    #[test]
    fn hand_ignored_during_intro() {
        let mut a = Choreographer::new(small_config());
        let mut b = Choreographer::new(small_config());
        let mut fa = frame(AppMode::Tree, 0.016, 1.0);
        let mut fb = fa;
        fb.hand = (1.0, -1.0);
        a.tick(&fa);
        b.tick(&fb);
        assert_eq!(a.yaw, b.yaw);
        assert_eq!(a.pitch, b.pitch);

        // Post-intro the hand does steer.
        fa.elapsed = 5.0;
        fb.elapsed = 5.0;
        a.tick(&fa);
        b.tick(&fb);
        assert_ne!(a.yaw, b.yaw);
    }

    #[test]
    fn scatter_tilt_is_clamped() {
        let mut ch = Choreographer::new(small_config());
        let mut input = frame(AppMode::Scatter, 0.016, 5.0);
        input.hand = (0.0, 10.0); // far outside the documented range
        let mut elapsed = 5.0;
        for _ in 0..600 {
            elapsed += 0.016;
            input.elapsed = elapsed;
            ch.tick(&input);
        }
        assert!(ch.pitch.abs() <= tuning::TILT_CLAMP + 1e-4);
    }

    #[test]
    fn pulse_stays_in_unit_range() {
        for i in 0..100 {
            let v = pulse(i as f32 * 0.37, i as f32 * 0.11, 1.3);
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
