use anyhow::Result;
use tileworld_core::export::export_world;
use tileworld_core::{generate, GenerationParams, MapSizePreset};

fn main() -> Result<()> {
    let mut size = MapSizePreset::S256;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--size=128" => size = MapSizePreset::S128,
            "--size=256" => size = MapSizePreset::S256,
            "--size=512" => size = MapSizePreset::S512,
            _ => {}
        }
    }

    let params = GenerationParams {
        seed: 42,
        size,
        ..GenerationParams::default()
    };

    let world = generate(&params)?;

    let out_dir = format!(
        "exports/finished_seed{}_{}x{}",
        params.seed,
        world.width(),
        world.height()
    );
    export_world(&world, &out_dir)?;

    println!("exported: {out_dir}");
    println!("checksum: {}", world.checksum());
    Ok(())
}
