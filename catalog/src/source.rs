//! Declarative catalog source as produced by the authoring tool.
//!
//! The source mirrors what a tileset file declares and performs no
//! validation of its own; [`crate::TileCatalog::load`] is the only way to turn
//! it into lookup tables.

use serde::{Deserialize, Serialize};

/// Terrain entry spelling that marks a corner as outside the autotiling scheme.
pub const UNSET_TERRAIN: &str = "-1";

/// Complete tile definition list for one catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSource {
    /// Terrain class names in priority order. The first entry wins vote ties.
    #[serde(default)]
    pub terrain_classes: Vec<String>,
    /// Tile declarations in authoring order.
    #[serde(default)]
    pub tiles: Vec<TileSource>,
}

impl CatalogSource {
    /// Creates a source declaring the provided terrain classes and no tiles.
    #[must_use]
    pub fn new<I, S>(terrain_classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terrain_classes: terrain_classes.into_iter().map(Into::into).collect(),
            tiles: Vec::new(),
        }
    }

    /// Appends a tile declaration.
    #[must_use]
    pub fn with_tile(mut self, tile: TileSource) -> Self {
        self.tiles.push(tile);
        self
    }
}

/// Properties declared for a single tile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSource {
    /// Tile identifier, unique within the catalog.
    pub id: u32,
    /// Terrain class names in top-left, top-right, bottom-left, bottom-right
    /// order. Empty strings and [`UNSET_TERRAIN`] mark unset corners.
    pub terrain: Option<Vec<String>>,
    /// Connector code built from the letters `u`, `d`, `l`, `r`.
    pub connector: Option<String>,
    /// Character depicted by the tile.
    pub character: Option<String>,
    /// Encounter started when the tile is touched.
    pub encounter: Option<String>,
    /// Player formation slot number.
    pub player_slot: Option<i64>,
    /// Monster formation slot number.
    pub monster_slot: Option<i64>,
}

impl TileSource {
    /// Creates an empty declaration for the provided identifier.
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Declares the terrain corners by class name.
    #[must_use]
    pub fn terrain<S: Into<String>>(mut self, corners: [S; 4]) -> Self {
        self.terrain = Some(corners.into_iter().map(Into::into).collect());
        self
    }

    /// Declares the connector code.
    #[must_use]
    pub fn connector(mut self, code: impl Into<String>) -> Self {
        self.connector = Some(code.into());
        self
    }

    /// Declares the depicted character.
    #[must_use]
    pub fn character(mut self, name: impl Into<String>) -> Self {
        self.character = Some(name.into());
        self
    }

    /// Declares the encounter reference.
    #[must_use]
    pub fn encounter(mut self, id: impl Into<String>) -> Self {
        self.encounter = Some(id.into());
        self
    }

    /// Declares a player slot marker.
    #[must_use]
    pub fn player_slot(mut self, index: i64) -> Self {
        self.player_slot = Some(index);
        self
    }

    /// Declares a monster slot marker.
    #[must_use]
    pub fn monster_slot(mut self, index: i64) -> Self {
        self.monster_slot = Some(index);
        self
    }
}
