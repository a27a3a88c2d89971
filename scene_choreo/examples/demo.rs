//! Drive the choreographer headless through the intro and a mode change,
//! printing a few element trajectories.

use hand_gesture::AppMode;
use scene_choreo::{Choreographer, FrameInput, SceneConfig, SceneParams};

fn main() {
    let mut ch = Choreographer::new(SceneConfig {
        stardust_count: 2_000,
        ..SceneConfig::default()
    });

    let dt = 1.0 / 60.0;
    let mut elapsed = 0.0;
    let mut mode = AppMode::Tree;

    for frame_no in 0..900 {
        if frame_no == 420 {
            mode = AppMode::Scatter;
            println!("--- switching to Scatter ---");
        }
        elapsed += dt;
        ch.tick(&FrameInput {
            dt,
            elapsed,
            mode,
            hand: (0.0, 0.0),
            photo_count: 4,
            params: SceneParams::default(),
        });

        if frame_no % 90 == 0 {
            let p = ch.stardust.current_pos[0];
            println!(
                "t={:5.2}s  mode={:?}  yaw={:5.2}  blend={:4.2}  el0=({:6.2},{:6.2},{:6.2}) x{:.2}",
                elapsed,
                mode,
                ch.yaw,
                ch.uniforms.mode_blend,
                p.x,
                p.y,
                p.z,
                ch.stardust.construction[0],
            );
        }
    }
}
