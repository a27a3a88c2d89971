//! # tree_scene
//!
//! Gesture-controlled particle Christmas tree with three modes: the
//! assembled tree, a scattered particle cloud, and a zoomed photo viewer.
//! A four-second construction animation spirals the tree together once at
//! startup; afterwards hand gestures (or their keyboard simulation) drive
//! the mode machine and the hand position steers the scene rotation.
//!
//! ## Gesture → Mode mapping
//!
//! | Gesture | From | To |
//! |---|---|---|
//! | Fist | Scatter, PhotoZoom | Tree (reassemble) |
//! | Pinch | Scatter | PhotoZoom, next photo |
//! | Open palm | Tree, PhotoZoom | Scatter |
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: keyboard + mouse drive the tracker.
//! * `leap` — **Hardware mode**: polls a LeapMotion controller via LeapC
//!   and feeds real digit joints through the same classifier.
//!
//! ### Simulation controls
//!
//! | Input | Effect |
//! |---|---|
//! | hold `F` / `O` / `P` | fist / open / pinch pose at the mouse cursor |
//! | `1` / `2` / `3` | manual mode override: Tree / Scatter / PhotoZoom |
//! | `←` / `→` | density down / up |
//! | `↓` / `↑` | element size down / up |
//! | `[` / `]` | breathing speed down / up |
//! | `-` / `=` | star brightness down / up |
//! | `N` | add a placeholder photo |
//! | click a photo card | zoom that photo (click again to release) |
//! | `Q` | quit |

pub mod app;
pub mod tracker;
pub mod visualizer;
