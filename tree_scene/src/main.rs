//! tree_scene — interactive entry point.

use std::io::{self, Write};

use scene_choreo::{SceneConfig, SceneParams};
use scene_layout::TreeDims;
use tree_scene::app::{run, AppConfig, Photo};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║      Tree Scene — Gesture-Controlled Particle Tree           ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hand tracking");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Keyboard simulation  (use --features leap for hardware)");
    println!();

    let cfg = if std::env::args().any(|a| a == "--quick") {
        println!("  Quick-start: 12000 stardust, 6 photos, full density\n");
        AppConfig::default()
    } else {
        configure_interactively()
    };

    println!();
    println!("  Opening visualizer window…");
    println!("  Hold F (fist) / O (open) / P (pinch) and move the mouse.");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn configure_interactively() -> AppConfig {
    let stardust: usize = {
        let n = read_line("  Stardust particles 1000–50000 (default 12000): ")
            .trim()
            .parse()
            .unwrap_or(12_000);
        n.clamp(1_000, 50_000)
    };

    let tree_height: f32 = {
        let h: f32 = read_line("  Tree height 4–16 (default 8): ")
            .trim()
            .parse()
            .unwrap_or(8.0);
        h.clamp(4.0, 16.0)
    };

    let photo_count: usize = {
        let n = read_line("  Photos 0–24 (default 6): ")
            .trim()
            .parse()
            .unwrap_or(6);
        n.min(24)
    };

    let density: f32 = {
        let d: f32 = read_line("  Density 0.0–1.0 (default 1.0): ")
            .trim()
            .parse()
            .unwrap_or(1.0);
        d.clamp(0.0, 1.0)
    };

    let photos = (1..=photo_count as u32)
        .map(|i| Photo {
            id:  i,
            url: format!("assets/photo-{:02}.jpg", i),
        })
        .collect();

    AppConfig {
        scene: SceneConfig {
            stardust_count: stardust,
            dims: TreeDims {
                height: tree_height,
                ..TreeDims::default()
            },
            ..SceneConfig::default()
        },
        params: SceneParams {
            density,
            ..SceneParams::default()
        },
        photos,
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
