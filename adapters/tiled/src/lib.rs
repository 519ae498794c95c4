#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Loads Tiled tilesets, maps and project files into Campaign Trail data.
//!
//! Tilesets (`.tsx`) become a [`campaign_trail_catalog::CatalogSource`], maps
//! (`.tmx`) become a [`campaign_trail_world::MapLayout`], and a TOML project
//! file ties tilesets, encounters and resolver settings together.

mod map;
mod project;
mod properties;
mod tileset;

pub use map::{TiledLayer, TiledMap};
pub use project::{Project, ProjectConfig, TilesetEntry, VoteRule};
pub use tileset::{Tileset, TilesetBundle};
