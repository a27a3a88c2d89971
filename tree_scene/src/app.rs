//! Top-level application state.
//!
//! `AppState` owns the mode, the debounced policy, the photo list and the
//! choreographer.  Tracker samples, manual overrides and photo clicks all
//! funnel into the same mode setter, which owns the photo-advance side
//! effect; the per-frame `tick` hands everything to the choreographer.

use std::sync::mpsc::{self, TryRecvError};
use std::time::Instant;

use hand_gesture::{classify, AppMode, ModePolicy};
use scene_choreo::{Choreographer, FrameInput, SceneConfig, SceneParams};

use crate::tracker::{spawn_tracker_source, TrackerSample};
use crate::visualizer::{UiEvent, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// Photo list
// ════════════════════════════════════════════════════════════════════════════

/// A photo in the user's ordered list: identity plus location.  The scene
/// never decodes the URL; cards render as placeholder quads keyed by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Photo {
    pub id:  u32,
    pub url: String,
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
pub struct AppConfig {
    pub scene:  SceneConfig,
    pub params: SceneParams,
    pub photos: Vec<Photo>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            scene:  SceneConfig::default(),
            params: SceneParams::default(),
            photos: (1..=6)
                .map(|i| Photo {
                    id:  i,
                    url: format!("assets/photo-{:02}.jpg", i),
                })
                .collect(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tunables
// ════════════════════════════════════════════════════════════════════════════

/// The four runtime-adjustable scalars.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tunable {
    Density,
    SizeFactor,
    BreathingSpeed,
    StarBrightness,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── mode machine ─────────────────────────────────────────────────────
    mode:   AppMode,
    policy: ModePolicy,

    // ── scene ────────────────────────────────────────────────────────────
    choreo: Choreographer,
    params: SceneParams,

    // ── photos ───────────────────────────────────────────────────────────
    photos:       Vec<Photo>,
    active_photo: usize,
    next_photo_id: u32,

    // ── hand control cell (single writer, single reader) ─────────────────
    hand:         (f32, f32),
    hand_visible: bool,

    // ── status message ───────────────────────────────────────────────────
    pub status: String,
}

impl AppState {
    pub fn new(cfg: AppConfig) -> Self {
        let next_photo_id = cfg.photos.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        AppState {
            mode:   AppMode::Tree,
            policy: ModePolicy::new(),
            choreo: Choreographer::new(cfg.scene),
            params: cfg.params,
            photos: cfg.photos,
            active_photo: 0,
            next_photo_id,
            hand: (0.0, 0.0),
            hand_visible: false,
            status: "Assembling tree…".to_string(),
        }
    }

    // ── mode setter — the single funnel ──────────────────────────────────

    /// Set the mode.  Gesture transitions, manual overrides and photo
    /// clicks all arrive here; entering PhotoZoom from a non-zoom mode
    /// advances the active photo circularly (no-op on an empty list).
    ///
    /// Manual callers bypass the debounce entirely — this never touches
    /// the policy's timestamp.
    pub fn set_mode(&mut self, next: AppMode) {
        if next == AppMode::PhotoZoom && self.mode != AppMode::PhotoZoom && !self.photos.is_empty()
        {
            self.active_photo = (self.active_photo + 1) % self.photos.len();
        }
        self.mode = next;
        self.status = match next {
            AppMode::Tree => "Tree — fist reassembles, open palm scatters".to_string(),
            AppMode::Scatter => "Scatter — pinch to view photos, fist for tree".to_string(),
            AppMode::PhotoZoom => match self.photos.get(self.active_photo) {
                Some(p) => format!("Photo {}/{} — {}", self.active_photo + 1, self.photos.len(), p.url),
                None => "Photo viewer — no photos yet (N adds one)".to_string(),
            },
        };
    }

    // ── tracker samples ──────────────────────────────────────────────────

    /// Consume one rate-limited tracker sample.  `now` is monotonic
    /// seconds, shared with the render clock.
    pub fn handle_sample(&mut self, sample: TrackerSample, now: f64) {
        match sample {
            TrackerSample::Hand(frame) => {
                let g = classify(&frame);
                self.hand = g.position;
                self.hand_visible = true;
                if let Some(next) = self.policy.propose(self.mode, &g, now) {
                    self.set_mode(next);
                }
            }
            // The previous hand position persists until the next
            // successful detection.
            TrackerSample::NoHand => self.hand_visible = false,
        }
    }

    // ── photo operations ─────────────────────────────────────────────────

    /// Click event from a photo card, keyed by photo id.  Clicking the
    /// already-focused card releases the zoom; any other card zooms it.
    pub fn photo_clicked(&mut self, id: u32) {
        let Some(idx) = self.photos.iter().position(|p| p.id == id) else {
            return;
        };
        if self.mode == AppMode::PhotoZoom {
            if self.active_photo == idx {
                self.set_mode(AppMode::Scatter);
            } else {
                self.active_photo = idx;
                self.set_mode(AppMode::PhotoZoom);
            }
            return;
        }
        // The setter owns the index advance; stage one slot behind so
        // entry lands on the clicked card.
        self.active_photo = (idx + self.photos.len() - 1) % self.photos.len();
        self.set_mode(AppMode::PhotoZoom);
    }

    /// Append a photo to the ordered list (capped by the scene's card
    /// capacity).
    pub fn add_photo(&mut self, url: String) {
        if self.photos.len() >= self.choreo.photos.len() {
            self.status = "Photo tray is full".to_string();
            return;
        }
        let id = self.next_photo_id;
        self.next_photo_id += 1;
        self.photos.push(Photo { id, url });
        self.status = format!("Added photo {} ({} total)", id, self.photos.len());
    }

    // ── tunables ─────────────────────────────────────────────────────────

    /// Adjust one tunable.  This is the clamping boundary; the engine
    /// trusts whatever it receives.
    pub fn tune(&mut self, which: Tunable, delta: f32) {
        let p = &mut self.params;
        match which {
            Tunable::Density => p.density = (p.density + delta).clamp(0.0, 1.0),
            Tunable::SizeFactor => p.size_factor = (p.size_factor + delta).clamp(0.2, 3.0),
            Tunable::BreathingSpeed => {
                p.breathing_speed = (p.breathing_speed + delta).clamp(0.0, 4.0)
            }
            Tunable::StarBrightness => {
                p.star_brightness = (p.star_brightness + delta).clamp(0.0, 2.0)
            }
        }
        self.status = format!(
            "density {:.2}  size {:.2}  breathing {:.2}  star {:.2}",
            p.density, p.size_factor, p.breathing_speed, p.star_brightness
        );
    }

    // ── per-frame tick ───────────────────────────────────────────────────

    pub fn tick(&mut self, dt: f32, elapsed: f32) {
        self.choreo.tick(&FrameInput {
            dt,
            elapsed,
            mode: self.mode,
            hand: self.hand,
            photo_count: self.photos.len(),
            params: self.params,
        });
    }

    // ── accessors for the render loop ────────────────────────────────────

    pub fn mode(&self) -> AppMode {
        self.mode
    }
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }
    pub fn active_photo(&self) -> usize {
        self.active_photo
    }
    pub fn hand(&self) -> (f32, f32) {
        self.hand
    }
    pub fn hand_visible(&self) -> bool {
        self.hand_visible
    }
    pub fn params(&self) -> &SceneParams {
        &self.params
    }
    pub fn choreo(&self) -> &Choreographer {
        &self.choreo
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the visualizer, the tracker source (simulation by default,
/// hardware with `--features leap`), and drives the event/render loop at
/// ~60 fps.  Tracker death is not fatal: the scene continues without hand
/// control.
pub fn run(cfg: AppConfig) -> Result<(), String> {
    // ── sim input channel (visualizer → tracker thread) ──────────────────
    let (sim_tx, sim_rx) = mpsc::channel();

    #[cfg(feature = "leap")]
    let tracker_rx = {
        // The window still reports sim snapshots; nobody listens in
        // hardware mode.
        drop(sim_rx);
        spawn_tracker_source(crate::tracker::LeapTrackerSource)
    };
    #[cfg(not(feature = "leap"))]
    let tracker_rx = spawn_tracker_source(crate::tracker::SimTrackerSource { rx: sim_rx });

    // ── visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(sim_tx)?;

    // ── app state ────────────────────────────────────────────────────────
    let mut app = AppState::new(cfg);

    let started = Instant::now();
    let mut last_frame = Instant::now();
    let mut tracker_alive = true;
    let mut events: Vec<UiEvent> = Vec::new();

    // ── main loop ────────────────────────────────────────────────────────
    while vis.is_open() {
        // 1. Poll window input → UiEvents + sim snapshot
        if !vis.poll_input(&mut events) {
            break;
        }
        for event in events.drain(..) {
            match event {
                UiEvent::Quit => return Ok(()),
                UiEvent::SetMode(mode) => app.set_mode(mode),
                UiEvent::PhotoClicked(id) => app.photo_clicked(id),
                UiEvent::AddPhoto => {
                    let url = format!("assets/photo-{:02}.jpg", app.photos().len() + 1);
                    app.add_photo(url);
                }
                UiEvent::Tune(which, delta) => app.tune(which, delta),
            }
        }

        // 2. Drain tracker samples (non-blocking, one reader)
        let now = started.elapsed().as_secs_f64();
        while tracker_alive {
            match tracker_rx.try_recv() {
                Ok(sample) => app.handle_sample(sample, now),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    eprintln!("[tracker] source ended — continuing without hand control");
                    tracker_alive = false;
                }
            }
        }

        // 3. Per-frame logic
        let dt = last_frame.elapsed().as_secs_f32().min(0.1);
        last_frame = Instant::now();
        app.tick(dt, now as f32);

        // 4. Render
        vis.render(&app);
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::poses;

    fn small_app() -> AppState {
        let cfg = AppConfig {
            scene: SceneConfig {
                stardust_count: 50,
                ornament_count: 4,
                bulb_count: 4,
                photo_capacity: 8,
                ..SceneConfig::default()
            },
            params: SceneParams::default(),
            photos: vec![
                Photo { id: 1, url: "a.jpg".into() },
                Photo { id: 2, url: "b.jpg".into() },
                Photo { id: 3, url: "c.jpg".into() },
            ],
        };
        AppState::new(cfg)
    }

    fn hand(frame: hand_gesture::HandFrame) -> TrackerSample {
        TrackerSample::Hand(frame)
    }

    #[test]
    fn starts_in_tree_mode() {
        let app = small_app();
        assert_eq!(app.mode(), AppMode::Tree);
        assert_eq!(app.active_photo(), 0);
    }

    #[test]
    fn pinch_from_scatter_zooms_and_advances_photo() {
        let mut app = small_app();
        app.set_mode(AppMode::Scatter);
        app.handle_sample(hand(poses::pinch_at(0.5, 0.5)), 10.0);
        assert_eq!(app.mode(), AppMode::PhotoZoom);
        assert_eq!(app.active_photo(), 1, "advanced by exactly one");
    }

    #[test]
    fn pinch_from_tree_does_nothing() {
        let mut app = small_app();
        app.handle_sample(hand(poses::pinch_at(0.5, 0.5)), 10.0);
        assert_eq!(app.mode(), AppMode::Tree);
        assert_eq!(app.active_photo(), 0);
    }

    #[test]
    fn manual_zoom_from_tree_advances_photo() {
        // Photo list [A,B,C], index 0: entering zoom shows B.
        let mut app = small_app();
        app.set_mode(AppMode::PhotoZoom);
        assert_eq!(app.active_photo(), 1);
        // Re-entering while zoomed must not advance again.
        app.set_mode(AppMode::PhotoZoom);
        assert_eq!(app.active_photo(), 1);
    }

    #[test]
    fn photo_advance_wraps_circularly() {
        let mut app = small_app();
        for expected in [1, 2, 0, 1] {
            app.set_mode(AppMode::PhotoZoom);
            assert_eq!(app.active_photo(), expected);
            app.set_mode(AppMode::Scatter);
        }
    }

    #[test]
    fn zoom_with_empty_photo_list_is_safe() {
        let mut app = AppState::new(AppConfig {
            photos: Vec::new(),
            scene: SceneConfig {
                stardust_count: 50,
                ornament_count: 4,
                bulb_count: 4,
                photo_capacity: 8,
                ..SceneConfig::default()
            },
            params: SceneParams::default(),
        });
        app.set_mode(AppMode::PhotoZoom);
        assert_eq!(app.mode(), AppMode::PhotoZoom);
        assert_eq!(app.active_photo(), 0);
        app.tick(0.016, 5.0); // no panic with nothing to focus
    }

    #[test]
    fn manual_override_bypasses_debounce() {
        let mut app = small_app();
        // Gesture transition at t=10 arms the debounce…
        app.handle_sample(hand(poses::open_at(0.5, 0.5)), 10.0);
        assert_eq!(app.mode(), AppMode::Scatter);
        // …but manual overrides ignore it entirely.
        app.set_mode(AppMode::Tree);
        app.set_mode(AppMode::Scatter);
        assert_eq!(app.mode(), AppMode::Scatter);
        // And the gesture window is still measured from t=10: a fist at
        // t=10.9 is accepted.
        app.handle_sample(hand(poses::fist_at(0.5, 0.5)), 10.9);
        assert_eq!(app.mode(), AppMode::Tree);
    }

    #[test]
    fn gesture_debounce_still_applies_between_samples() {
        let mut app = small_app();
        app.handle_sample(hand(poses::open_at(0.5, 0.5)), 10.0);
        assert_eq!(app.mode(), AppMode::Scatter);
        app.handle_sample(hand(poses::fist_at(0.5, 0.5)), 10.5);
        assert_eq!(app.mode(), AppMode::Scatter, "inside the window");
        app.handle_sample(hand(poses::fist_at(0.5, 0.5)), 10.81);
        assert_eq!(app.mode(), AppMode::Tree);
    }

    #[test]
    fn no_hand_keeps_last_position() {
        let mut app = small_app();
        app.handle_sample(hand(poses::open_at(0.25, 0.5)), 10.0);
        let held = app.hand();
        assert!(app.hand_visible());
        app.handle_sample(TrackerSample::NoHand, 10.1);
        assert_eq!(app.hand(), held);
        assert!(!app.hand_visible());
    }

    #[test]
    fn photo_click_zooms_that_photo() {
        let mut app = small_app();
        app.set_mode(AppMode::Scatter);
        app.photo_clicked(3);
        assert_eq!(app.mode(), AppMode::PhotoZoom);
        assert_eq!(app.active_photo(), 2);
        // Clicking the focused card releases the zoom.
        app.photo_clicked(3);
        assert_eq!(app.mode(), AppMode::Scatter);
        // Clicking an unknown id is ignored.
        app.photo_clicked(99);
        assert_eq!(app.mode(), AppMode::Scatter);
    }

    #[test]
    fn click_while_zoomed_switches_photo_without_advance() {
        let mut app = small_app();
        app.set_mode(AppMode::PhotoZoom); // now showing photo index 1
        app.photo_clicked(1);
        assert_eq!(app.mode(), AppMode::PhotoZoom);
        assert_eq!(app.active_photo(), 0);
    }

    #[test]
    fn add_photo_grows_list_until_capacity() {
        let mut app = small_app();
        app.add_photo("d.jpg".into());
        assert_eq!(app.photos().len(), 4);
        assert_eq!(app.photos().last().unwrap().id, 4);
        for i in 0..10 {
            app.add_photo(format!("x{}.jpg", i));
        }
        assert_eq!(app.photos().len(), 8, "capped at scene card capacity");
    }

    #[test]
    fn tune_clamps_at_the_boundary() {
        let mut app = small_app();
        app.tune(Tunable::Density, -5.0);
        assert_eq!(app.params().density, 0.0);
        app.tune(Tunable::Density, 0.25);
        assert_eq!(app.params().density, 0.25);
        app.tune(Tunable::StarBrightness, 99.0);
        assert_eq!(app.params().star_brightness, 2.0);
    }

    #[test]
    fn density_flows_into_active_counts() {
        let mut app = small_app();
        app.tune(Tunable::Density, -0.5); // 1.0 → 0.5
        app.tick(0.016, 5.0);
        assert_eq!(app.choreo().stardust.active_len(), 25);
        assert_eq!(app.choreo().photos.active_len(), 3, "photos follow the list, not density");
    }
}
