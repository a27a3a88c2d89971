//! Software-rendered visualizer using `minifb`.
//!
//! The scene is painter-sorted into a packed ARGB framebuffer: stardust as
//! glow points, ornaments as shaded quads, bulbs as haloed dots, photo
//! cards as labelled billboards, plus the apex star, the focused-photo
//! overlay, a hand cursor, a status bar and the key legend.
//!
//! The camera is fixed; the element *group* carries the rotation, so
//! projection is rotate-then-pinhole.  Photo cards are drawn screen-axis
//! aligned — the orientation lock is instantaneous by construction, only
//! their positions lerp.

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use glam::Vec3;
use hand_gesture::AppMode;
use scene_choreo::{pulse, Choreographer, ElementPool};

use crate::app::{AppState, Tunable};
use crate::tracker::{SimInput, SimPose};

use std::sync::mpsc::Sender;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W: usize = 960;
pub const WIN_H: usize = 640;
const STATUS_Y: usize = WIN_H - 36;
const FOCAL: f32 = WIN_H as f32 * 0.95;

const BG_TOP: u32 = 0xFF060A1C;
const BG_BOTTOM: u32 = 0xFF141B33;
const TEXT_BG: u32 = 0xFF0F1A38;
const ACCENT_GOLD: u32 = 0xFFFFD700;
const CARD_BORDER: u32 = 0xFFF0F0F0;
const HAND_COLOR: u32 = 0xFF7FE0FF;

// ════════════════════════════════════════════════════════════════════════════
// UiEvent — window input delivered to the controller
// ════════════════════════════════════════════════════════════════════════════

/// Discrete UI actions.  Manual mode buttons bypass the gesture pipeline
/// entirely; they are events, not poses.
#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent {
    Quit,
    SetMode(AppMode),
    PhotoClicked(u32),
    AddPhoto,
    Tune(Tunable, f32),
}

// ════════════════════════════════════════════════════════════════════════════
// Draw commands — collected, depth-sorted, then rasterized
// ════════════════════════════════════════════════════════════════════════════

enum DrawCmd {
    Dust { x: f32, y: f32, size: f32, color: u32 },
    Bulb { x: f32, y: f32, size: f32, color: u32 },
    Quad { x: f32, y: f32, size: f32, color: u32 },
    Card { id: u32, x: f32, y: f32, w: f32, h: f32, color: u32 },
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    sim_tx: Sender<SimInput>,

    /// Screen rects of the photo cards drawn last frame, for click tests.
    photo_rects: Vec<(u32, usize, usize, usize, usize)>,
    mouse_was_down: bool,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> Result<Self, String> {
        let mut window = Window::new(
            "Tree Scene — Gesture-Controlled Particle Tree",
            WIN_W,
            WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_TOP; WIN_W * WIN_H],
            sim_tx,
            photo_rects: Vec::new(),
            mouse_was_down: false,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Poll window input: push discrete [`UiEvent`]s and report the held
    /// pose + cursor to the simulation tracker.
    pub fn poll_input(&mut self, events: &mut Vec<UiEvent>) -> bool {
        if !self.window.is_open() {
            return false;
        }

        let one_shot = |w: &Window, k: Key| w.is_key_pressed(k, KeyRepeat::No);
        let held = |w: &Window, k: Key| w.is_key_pressed(k, KeyRepeat::Yes);

        if one_shot(&self.window, Key::Q) {
            events.push(UiEvent::Quit);
            return false;
        }

        // Manual mode buttons
        if one_shot(&self.window, Key::Key1) {
            events.push(UiEvent::SetMode(AppMode::Tree));
        }
        if one_shot(&self.window, Key::Key2) {
            events.push(UiEvent::SetMode(AppMode::Scatter));
        }
        if one_shot(&self.window, Key::Key3) {
            events.push(UiEvent::SetMode(AppMode::PhotoZoom));
        }
        if one_shot(&self.window, Key::N) {
            events.push(UiEvent::AddPhoto);
        }

        // Tunables (repeat while held)
        for (key, which, delta) in [
            (Key::Left, Tunable::Density, -0.05),
            (Key::Right, Tunable::Density, 0.05),
            (Key::Down, Tunable::SizeFactor, -0.1),
            (Key::Up, Tunable::SizeFactor, 0.1),
            (Key::LeftBracket, Tunable::BreathingSpeed, -0.1),
            (Key::RightBracket, Tunable::BreathingSpeed, 0.1),
            (Key::Minus, Tunable::StarBrightness, -0.1),
            (Key::Equal, Tunable::StarBrightness, 0.1),
        ] {
            if held(&self.window, key) {
                events.push(UiEvent::Tune(which, delta));
            }
        }

        // Mouse → cursor + photo clicks
        let (mx, my) = self
            .window
            .get_mouse_pos(MouseMode::Clamp)
            .unwrap_or((WIN_W as f32 * 0.5, WIN_H as f32 * 0.5));
        let down = self.window.get_mouse_down(MouseButton::Left);
        if down && !self.mouse_was_down {
            let (px, py) = (mx as usize, my as usize);
            if let Some((id, ..)) = self
                .photo_rects
                .iter()
                .find(|(_, x, y, w, h)| px >= *x && px < x + w && py >= *y && py < y + h)
            {
                events.push(UiEvent::PhotoClicked(*id));
            }
        }
        self.mouse_was_down = down;

        // Held pose → simulation tracker
        let pose = if self.window.is_key_down(Key::F) {
            Some(SimPose::Fist)
        } else if self.window.is_key_down(Key::O) {
            Some(SimPose::Open)
        } else if self.window.is_key_down(Key::P) {
            Some(SimPose::Pinch)
        } else {
            None
        };
        self.sim_tx
            .send(SimInput {
                pose,
                cursor: (mx / WIN_W as f32, my / WIN_H as f32),
            })
            .ok();

        true
    }

    // ── render ────────────────────────────────────────────────────────────

    /// Render one frame from the current app state.
    pub fn render(&mut self, app: &AppState) {
        self.clear_sky();
        self.photo_rects.clear();

        let ch = app.choreo();
        let u = ch.uniforms;
        let size_factor = app.params().size_factor;
        let breathing = app.params().breathing_speed;

        let mut cmds: Vec<(f32, DrawCmd)> = Vec::with_capacity(ch.stardust.active_len() + 300);

        // ── stardust ──────────────────────────────────────────────────────
        collect_pool(&mut cmds, &ch.stardust, ch, |i, x, y, persp| {
            let glow = pulse(ch.stardust.phase[i], u.time, breathing);
            let tinted = blend(ch.stardust.color[i], ACCENT_GOLD, u.mode_blend * 0.35);
            // Construction factor 0 renders black — materializing elements
            // fade up from nothing.
            let c = shade(tinted, (0.25 + 0.75 * glow) * ch.stardust.construction[i]);
            DrawCmd::Dust { x, y, size: (persp * 0.05 * size_factor).max(1.0), color: c }
        });

        // ── bulbs ─────────────────────────────────────────────────────────
        collect_pool(&mut cmds, &ch.bulbs, ch, |i, x, y, persp| {
            let glow = pulse(ch.bulbs.phase[i], u.time, breathing);
            let c = shade(ch.bulbs.color[i], (0.4 + 0.6 * glow) * ch.bulbs.construction[i]);
            let s = persp * 0.12 * size_factor * ch.bulbs.scale[i] * ch.bulbs.construction[i];
            DrawCmd::Bulb { x, y, size: s.max(1.0), color: c }
        });

        // ── ornaments ─────────────────────────────────────────────────────
        collect_pool(&mut cmds, &ch.ornaments, ch, |i, x, y, persp| {
            // Spin reads as a brightness wobble on the flat quad.
            let spin = (u.time * ch.ornaments.spin_speed[i] + ch.ornaments.phase[i]).sin();
            let c = shade(
                ch.ornaments.color[i],
                (0.65 + 0.3 * spin) * ch.ornaments.construction[i],
            );
            let s = persp * 0.3 * size_factor * ch.ornaments.scale[i] * ch.ornaments.construction[i];
            DrawCmd::Quad { x, y, size: s.max(1.0), color: c }
        });

        // ── photo cards ───────────────────────────────────────────────────
        let photos = app.photos();
        for i in 0..ch.photos.active_len().min(photos.len()) {
            if let Some((x, y, depth, persp)) =
                project(ch.photos.current_pos[i], ch.yaw, ch.pitch)
            {
                let s = persp * 0.8 * ch.photos.construction[i];
                if s >= 2.0 {
                    cmds.push((
                        depth,
                        DrawCmd::Card {
                            id: photos[i].id,
                            x,
                            y,
                            w: s,
                            h: s * 0.75,
                            color: ch.photos.color[i],
                        },
                    ));
                }
            }
        }

        // ── apex star ─────────────────────────────────────────────────────
        let apex = Vec3::new(0.0, ch.dims.height * 0.5 + 0.5, 0.0);
        if let Some((x, y, depth, persp)) = project(apex, ch.yaw, ch.pitch) {
            let tw = 0.75 + 0.25 * (u.time * 2.0).sin();
            let c = shade(ACCENT_GOLD, (u.star_brightness * tw).min(1.0));
            cmds.push((depth, DrawCmd::Bulb { x, y, size: persp * 0.3 * tw, color: c }));
        }

        // Painter sort, far to near.
        cmds.sort_unstable_by(|a, b| b.0.total_cmp(&a.0));
        for (_, cmd) in cmds {
            self.draw_cmd(cmd);
        }

        // ── focused-photo overlay (camera-locked, unrotated) ──────────────
        if ch.focus.scale > 0.01 && !photos.is_empty() {
            if let Some((x, y, _, persp)) = project(ch.focus.pos, 0.0, 0.0) {
                let photo = &photos[app.active_photo().min(photos.len() - 1)];
                let w = persp * 3.2 * ch.focus.scale;
                let h = w * 0.75;
                self.draw_card(x, y, w, h, 0xFF202840, Some(photo));
                let x0 = (x - w * 0.5).max(0.0) as usize;
                let y0 = (y - h * 0.5).max(0.0) as usize;
                self.photo_rects
                    .push((photo.id, x0, y0, w as usize, h as usize));
            }
        }

        // ── hand cursor ───────────────────────────────────────────────────
        if app.hand_visible() {
            let (hx, hy) = app.hand();
            let sx = (WIN_W as f32 * 0.5 * (1.0 + hx)) as isize;
            let sy = (WIN_H as f32 * 0.5 * (1.0 + hy)) as isize;
            self.draw_ring(sx, sy, 9, HAND_COLOR);
        }

        // ── status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y as isize, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
        let mode_label = match app.mode() {
            AppMode::Tree => "TREE",
            AppMode::Scatter => "SCATTER",
            AppMode::PhotoZoom => "PHOTO",
        };
        self.draw_label(mode_label, 10, STATUS_Y + 6, ACCENT_GOLD);
        self.draw_label(&app.status, 60, STATUS_Y + 6, 0xFFEEEEEE);

        // ── key legend ────────────────────────────────────────────────────
        self.draw_label(
            "f/o/p=pose  1/2/3=mode  arrows=density/size  [/]=breath  -/==star  n=photo  q=quit",
            10,
            WIN_H - 16,
            0xFF8890A8,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    fn clear_sky(&mut self) {
        for row in 0..WIN_H {
            let t = row as f32 / WIN_H as f32;
            let c = blend(BG_TOP, BG_BOTTOM, t);
            let line = &mut self.buf[row * WIN_W..(row + 1) * WIN_W];
            line.fill(c);
        }
    }

    fn draw_cmd(&mut self, cmd: DrawCmd) {
        match cmd {
            DrawCmd::Dust { x, y, size, color } => {
                let s = size as isize;
                self.fill_rect(
                    x as isize - s / 2,
                    y as isize - s / 2,
                    s.max(1) as usize,
                    s.max(1) as usize,
                    color,
                );
            }
            DrawCmd::Bulb { x, y, size, color } => {
                let s = (size as isize).max(2);
                // Halo first, core on top.
                self.fill_rect(
                    x as isize - s,
                    y as isize - s,
                    (s * 2) as usize,
                    (s * 2) as usize,
                    shade(color, 0.25),
                );
                self.fill_rect(
                    x as isize - s / 2,
                    y as isize - s / 2,
                    s as usize,
                    s as usize,
                    color,
                );
            }
            DrawCmd::Quad { x, y, size, color } => {
                let s = (size as isize).max(2);
                self.fill_rect(x as isize - s / 2, y as isize - s / 2, s as usize, s as usize, color);
                self.draw_border(x as isize - s / 2, y as isize - s / 2, s as usize, s as usize, shade(color, 0.5));
            }
            DrawCmd::Card { id, x, y, w, h, color } => {
                self.draw_card(x, y, w, h, color, None);
                let x0 = (x - w * 0.5).max(0.0) as usize;
                let y0 = (y - h * 0.5).max(0.0) as usize;
                self.photo_rects.push((id, x0, y0, w as usize, h as usize));
                let label = format!("{}", id);
                self.draw_label(&label, x0 + 4, y0 + 4, 0xFF101010);
            }
        }
    }

    /// A photo card: filled quad, light border, optional URL caption
    /// (focused overlay only).
    fn draw_card(&mut self, x: f32, y: f32, w: f32, h: f32, color: u32, photo: Option<&crate::app::Photo>) {
        let x0 = (x - w * 0.5) as isize;
        let y0 = (y - h * 0.5) as isize;
        self.fill_rect(x0, y0, w as usize, h as usize, color);
        self.draw_border(x0, y0, w as usize, h as usize, CARD_BORDER);
        if let Some(p) = photo {
            let cap_y = (y0 + h as isize - 12).max(0) as usize;
            self.draw_label(&p.url, (x0 + 6).max(0) as usize, cap_y, 0xFFDDDDDD);
        }
    }

    // ── primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: isize, y: isize, w: usize, h: usize, color: u32) {
        let x0 = x.max(0) as usize;
        let y0 = y.max(0) as usize;
        let x1 = ((x + w as isize).max(0) as usize).min(WIN_W);
        let y1 = ((y + h as isize).max(0) as usize).min(WIN_H);
        for row in y0..y1 {
            for col in x0..x1 {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: isize, y: isize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 {
            return;
        }
        for col in x..x + w as isize {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h as isize - 1, color);
        }
        for row in y..y + h as isize {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w as isize - 1, row, color);
        }
    }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < WIN_W && (y as usize) < WIN_H {
            self.buf[y as usize * WIN_W + x as usize] = color;
        }
    }

    fn draw_ring(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        let mut a = 0.0f32;
        while a < std::f32::consts::TAU {
            let x = cx + (a.cos() * r as f32) as isize;
            let y = cy + (a.sin() * r as f32) as isize;
            self.set_pixel(x, y, color);
            a += 0.08;
        }
    }

    /// Minimal bitmap font — 3×5 characters for labels.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.set_pixel((cx + col) as isize, (y + row) as isize, color);
                    }
                }
            }
            cx += 4; // 3 wide + 1 gap
            if cx + 4 > WIN_W {
                break;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Projection — group rotation, then pinhole
// ════════════════════════════════════════════════════════════════════════════

/// Rotate `p` by the group yaw/pitch, then project through the fixed
/// camera.  Returns (screen x, screen y, depth, perspective scale), or
/// None behind the near plane.
fn project(p: Vec3, yaw: f32, pitch: f32) -> Option<(f32, f32, f32, f32)> {
    let (sy, cy) = yaw.sin_cos();
    let r1 = Vec3::new(p.x * cy + p.z * sy, p.y, -p.x * sy + p.z * cy);
    let (sp, cp) = pitch.sin_cos();
    let r2 = Vec3::new(r1.x, r1.y * cp - r1.z * sp, r1.y * sp + r1.z * cp);

    let v = r2 - Choreographer::camera_eye();
    let depth = -v.z;
    if depth < 0.5 {
        return None;
    }
    let scale = FOCAL / depth;
    Some((
        WIN_W as f32 * 0.5 + v.x * scale,
        WIN_H as f32 * 0.5 - v.y * scale,
        depth,
        scale,
    ))
}

/// Project every active element of a pool and collect its draw command.
fn collect_pool<F>(cmds: &mut Vec<(f32, DrawCmd)>, pool: &ElementPool, ch: &Choreographer, mut f: F)
where
    F: FnMut(usize, f32, f32, f32) -> DrawCmd,
{
    for i in 0..pool.active_len() {
        if let Some((x, y, depth, persp)) = project(pool.current_pos[i], ch.yaw, ch.pitch) {
            if x < -40.0 || x > WIN_W as f32 + 40.0 || y < -40.0 || y > WIN_H as f32 + 40.0 {
                continue;
            }
            cmds.push((depth, f(i, x, y, persp)));
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '[' => [0b110, 0b100, 0b100, 0b100, 0b110],
        ']' => [0b011, 0b001, 0b001, 0b001, 0b011],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _ => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF;
    let br = (b >> 16) & 0xFF;
    let ag = (a >> 8) & 0xFF;
    let bg = (b >> 8) & 0xFF;
    let ab = a & 0xFF;
    let bb = b & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

/// Scale a color's RGB channels by `k` (0–1), alpha kept opaque.
fn shade(color: u32, k: f32) -> u32 {
    let k = k.clamp(0.0, 1.0);
    let r = (((color >> 16) & 0xFF) as f32 * k) as u32;
    let g = (((color >> 8) & 0xFF) as f32 * k) as u32;
    let b = ((color & 0xFF) as f32 * k) as u32;
    0xFF000000 | (r << 16) | (g << 8) | b
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
