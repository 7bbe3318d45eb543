//! Packs eight copies of an L-shaped bracket and logs the result.
//!
//! Usage:
//! ```text
//! cargo run --example pack
//! RUST_LOG=meshpack=debug cargo run --example pack   # progress lines
//! ```

use std::sync::Arc;

use meshpack::math::Point3;
use meshpack::{Mesh, PackError, PackModel};

const COPIES: usize = 8;
const STEPS: usize = 200_000;
const SEED: u64 = 1;

/// Two unit-thick slabs joined at a right angle.
fn bracket() -> Mesh {
    let mut mesh = Mesh::cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0));
    mesh.merge(&Mesh::cuboid(
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(1.0, 3.0, 1.0),
    ));
    mesh
}

fn main() -> Result<(), PackError> {
    // Default: WARN for everything, INFO for meshpack.
    // Override with RUST_LOG env var (e.g. RUST_LOG=meshpack=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("pack=info".parse().unwrap_or_default())
        .add_directive("meshpack=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut mesh = bracket();
    mesh.bi_unit_cube();

    let mut model = PackModel::new();
    model.add(Arc::new(mesh), COPIES);
    tracing::info!(
        volume = model.volume(),
        energy = model.energy(),
        "initial layout"
    );

    let packed = model.pack(STEPS, SEED)?;
    tracing::info!(
        volume = packed.volume(),
        overlaps = packed.overlapping_pairs(),
        triangles = packed.merged_mesh().len(),
        "packed"
    );
    for (i, item) in packed.items().iter().enumerate() {
        let t = item.transform().translation.vector;
        tracing::info!(
            item = i,
            x = t.x,
            y = t.y,
            z = t.z,
            angle = item.transform().rotation.angle(),
            "placement"
        );
    }
    Ok(())
}
