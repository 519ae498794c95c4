//! Tiled `.tsx` tileset parsing.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use campaign_trail_catalog::{CatalogSource, TileSource, UNSET_TERRAIN};
use campaign_trail_core::{CatalogDefect, LoadError, TileId};
use serde::Deserialize;
use tracing::debug;

use crate::properties::XmlProperties;

/// Tileset as declared in a `.tsx` file, with local tile ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tileset {
    name: String,
    terrain_classes: Vec<String>,
    tiles: Vec<TileSource>,
}

impl Tileset {
    /// Parses tileset XML.
    pub fn parse(xml: &str) -> Result<Self> {
        let raw: XmlTileset = quick_xml::de::from_str(xml).context("tileset is not valid XML")?;
        let terrain_classes: Vec<String> = raw
            .terraintypes
            .map(|types| types.terrains.into_iter().map(|terrain| terrain.name).collect())
            .unwrap_or_default();

        let mut tiles = Vec::with_capacity(raw.tiles.len());
        for tile in raw.tiles {
            tiles.push(
                convert_tile(tile, &terrain_classes)
                    .with_context(|| format!("tileset `{}`", raw.name))?,
            );
        }

        debug!(
            tileset = %raw.name,
            terrain_classes = terrain_classes.len(),
            tiles = tiles.len(),
            "tileset parsed"
        );
        Ok(Self {
            name: raw.name,
            terrain_classes,
            tiles,
        })
    }

    /// Reads and parses a `.tsx` file.
    pub fn load(path: &Path) -> Result<Self> {
        let xml = fs::read_to_string(path)
            .with_context(|| format!("failed to read tileset {}", path.display()))?;
        Self::parse(&xml).with_context(|| format!("failed to parse tileset {}", path.display()))
    }

    /// Name declared by the tileset.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Terrain class names in declaration order.
    #[must_use]
    pub fn terrain_classes(&self) -> &[String] {
        &self.terrain_classes
    }

    /// Tile declarations with local ids.
    #[must_use]
    pub fn tiles(&self) -> &[TileSource] {
        &self.tiles
    }

    /// Catalog source for this tileset alone, keyed by local id.
    #[must_use]
    pub fn to_catalog_source(&self) -> CatalogSource {
        CatalogSource {
            terrain_classes: self.terrain_classes.clone(),
            tiles: self.tiles.clone(),
        }
    }
}

/// Merges several tilesets into one catalog source keyed by global tile id.
#[derive(Clone, Debug, Default)]
pub struct TilesetBundle {
    source: CatalogSource,
}

impl TilesetBundle {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tileset whose tiles start at `firstgid`.
    ///
    /// Terrain classes are unified by name; the first tileset to mention a
    /// class decides its priority.
    pub fn add(&mut self, firstgid: u32, tileset: &Tileset) -> Result<()> {
        for class in tileset.terrain_classes() {
            if !self.source.terrain_classes.contains(class) {
                self.source.terrain_classes.push(class.clone());
            }
        }

        for tile in tileset.tiles() {
            let mut global = tile.clone();
            global.id = firstgid.checked_add(tile.id).with_context(|| {
                format!(
                    "tile {} of tileset `{}` overflows with firstgid {firstgid}",
                    tile.id,
                    tileset.name()
                )
            })?;
            self.source.tiles.push(global);
        }
        Ok(())
    }

    /// Catalog source accumulated so far.
    #[must_use]
    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// Consumes the bundle, yielding the merged catalog source.
    #[must_use]
    pub fn into_source(self) -> CatalogSource {
        self.source
    }
}

fn convert_tile(tile: XmlTile, terrain_classes: &[String]) -> Result<TileSource> {
    let mut source = TileSource::new(tile.id);

    if let Some(terrain) = tile.terrain.as_deref() {
        let mut corners = Vec::with_capacity(4);
        for entry in terrain.split(',') {
            let entry = entry.trim();
            if entry.is_empty() || entry == UNSET_TERRAIN {
                corners.push(UNSET_TERRAIN.to_owned());
                continue;
            }
            let name = entry
                .parse::<usize>()
                .ok()
                .and_then(|index| terrain_classes.get(index))
                .ok_or_else(|| CatalogDefect::UndefinedTerrainClass {
                    tile: TileId::new(tile.id),
                    class: entry.to_owned(),
                })
                .map_err(LoadError::from)
                .with_context(|| {
                    format!(
                        "terrain entry `{entry}` is not an index into the {} declared terrain types",
                        terrain_classes.len()
                    )
                })?;
            corners.push(name.clone());
        }
        source.terrain = Some(corners);
    }

    for property in tile.properties.unwrap_or_default().entries {
        let value = property.value;
        match property.name.as_str() {
            "c" => source.connector = Some(value),
            "character" => source.character = Some(value),
            "encounter" => source.encounter = Some(value),
            "player_slot" => source.player_slot = Some(slot_number(tile.id, "player_slot", &value)?),
            "monster_slot" => {
                source.monster_slot = Some(slot_number(tile.id, "monster_slot", &value)?);
            }
            other => debug!(tile = tile.id, property = other, "ignoring tile property"),
        }
    }

    Ok(source)
}

fn slot_number(tile: u32, property: &'static str, value: &str) -> Result<i64> {
    let number = value
        .trim()
        .parse()
        .map_err(|_| CatalogDefect::InvalidTagValue {
            tile: TileId::new(tile),
            property,
            value: value.to_owned(),
        })
        .map_err(LoadError::from)?;
    Ok(number)
}

#[derive(Debug, Deserialize)]
struct XmlTileset {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(default)]
    terraintypes: Option<XmlTerrainTypes>,
    #[serde(rename = "tile", default)]
    tiles: Vec<XmlTile>,
}

#[derive(Debug, Deserialize)]
struct XmlTerrainTypes {
    #[serde(rename = "terrain", default)]
    terrains: Vec<XmlTerrain>,
}

#[derive(Debug, Deserialize)]
struct XmlTerrain {
    #[serde(rename = "@name")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct XmlTile {
    #[serde(rename = "@id")]
    id: u32,
    #[serde(rename = "@terrain", default)]
    terrain: Option<String>,
    #[serde(default)]
    properties: Option<XmlProperties>,
}
