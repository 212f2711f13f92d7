//! # Tile Forge (Binary)
//!
//! Main executable entry point.

fn main() -> anyhow::Result<()> {
    tile_forge_app::run()
}
