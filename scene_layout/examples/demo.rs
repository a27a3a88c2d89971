//! Print a small sample of each target distribution.

use scene_layout::{photo_ring, scatter_cloud, spiral_cone, Cylindrical, TreeDims};

fn main() {
    let dims = TreeDims::default();

    println!("Tree spiral (first 8 of 200):");
    for p in spiral_cone(200, dims, 0.25, 42).iter().take(8) {
        let c = Cylindrical::from_vec3(*p);
        println!(
            "  r={:5.2}  angle={:6.2}  h={:6.2}",
            c.radius, c.angle, c.height
        );
    }

    println!("Scatter cloud (first 5 of 200):");
    for p in scatter_cloud(200, 14.0, 42).iter().take(5) {
        println!("  ({:6.2}, {:6.2}, {:6.2})  |r|={:5.2}", p.x, p.y, p.z, p.length());
    }

    println!("Photo ring (6 cards):");
    for p in photo_ring(6, 5.0, 1.0) {
        println!("  ({:6.2}, {:6.2}, {:6.2})", p.x, p.y, p.z);
    }
}
