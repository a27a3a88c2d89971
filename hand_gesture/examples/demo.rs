//! Run the canonical poses through the classifier and the mode policy.

use hand_gesture::{classify, poses, AppMode, ModePolicy};

fn main() {
    for (name, frame) in [
        ("open ", poses::open_at(0.5, 0.5)),
        ("fist ", poses::fist_at(0.5, 0.5)),
        ("pinch", poses::pinch_at(0.5, 0.5)),
    ] {
        let g = classify(&frame);
        println!(
            "{}  fist={:5}  open={:5}  pinch={:5}  pos=({:+.2}, {:+.2})",
            name, g.is_fist, g.is_open, g.is_pinching, g.position.0, g.position.1
        );
    }

    // Walk the mode graph: Tree → Scatter → PhotoZoom → Tree.
    let mut policy = ModePolicy::new();
    let mut mode = AppMode::Tree;
    let script = [
        (0.0, poses::open_at(0.5, 0.5)),
        (1.0, poses::pinch_at(0.5, 0.5)),
        (2.0, poses::fist_at(0.5, 0.5)),
    ];
    for (now, frame) in script {
        let g = classify(&frame);
        match policy.propose(mode, &g, now) {
            Some(next) => {
                println!("t={:.1}s  {:?} -> {:?}", now, mode, next);
                mode = next;
            }
            None => println!("t={:.1}s  {:?} (no change)", now, mode),
        }
    }
}
