//! Tiled `.tmx` map parsing and layer compositing.

use std::{fs, io::Read, path::Path};

use anyhow::{bail, ensure, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use campaign_trail_catalog::TileCatalog;
use campaign_trail_core::{Tile, TileId};
use campaign_trail_world::MapLayout;
use flate2::read::{GzDecoder, ZlibDecoder};
use serde::Deserialize;
use tracing::debug;

use crate::properties::XmlProperties;

/// Bits Tiled stores in the top of a gid to flag flipped tiles.
const FLIP_FLAGS: u32 = 0xE000_0000;

/// Layer property marking a layer as holding sprites and slot markers.
const SPRITE_PROPERTY: &str = "sprite";

/// Tile layer of a map with flip flags already removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TiledLayer {
    name: String,
    sprite: bool,
    gids: Vec<u32>,
}

impl TiledLayer {
    /// Layer name as authored.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reports whether the layer feeds the marker layer.
    #[must_use]
    pub fn is_sprite(&self) -> bool {
        self.sprite
    }

    /// Global tile ids in row-major order. `0` denotes an empty cell.
    #[must_use]
    pub fn gids(&self) -> &[u32] {
        &self.gids
    }
}

/// Orthogonal tile map as declared in a `.tmx` file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TiledMap {
    columns: u32,
    rows: u32,
    layers: Vec<TiledLayer>,
}

impl TiledMap {
    /// Parses map XML.
    pub fn parse(xml: &str) -> Result<Self> {
        let raw: XmlMap = quick_xml::de::from_str(xml).context("map is not valid XML")?;
        let expected = usize::try_from(u64::from(raw.width) * u64::from(raw.height))
            .context("map dimensions overflow")?;

        for tileset in &raw.tilesets {
            debug!(
                firstgid = tileset.firstgid,
                source = tileset.source.as_deref().unwrap_or("<embedded>"),
                "map references tileset"
            );
        }

        let mut layers = Vec::with_capacity(raw.layers.len());
        for layer in raw.layers {
            ensure!(
                layer.width == raw.width && layer.height == raw.height,
                "layer `{}` is {}x{} but the map is {}x{}",
                layer.name,
                layer.width,
                layer.height,
                raw.width,
                raw.height
            );
            let gids = decode_data(&layer.data)
                .with_context(|| format!("failed to decode layer `{}`", layer.name))?;
            ensure!(
                gids.len() == expected,
                "layer `{}` holds {} tiles, expected {expected}",
                layer.name,
                gids.len()
            );
            let sprite = layer
                .properties
                .as_ref()
                .is_some_and(|properties| properties.contains(SPRITE_PROPERTY));
            layers.push(TiledLayer {
                name: layer.name,
                sprite,
                gids: gids.into_iter().map(|gid| gid & !FLIP_FLAGS).collect(),
            });
        }

        Ok(Self {
            columns: raw.width,
            rows: raw.height,
            layers,
        })
    }

    /// Reads and parses a `.tmx` file.
    pub fn load(path: &Path) -> Result<Self> {
        let xml = fs::read_to_string(path)
            .with_context(|| format!("failed to read map {}", path.display()))?;
        Self::parse(&xml).with_context(|| format!("failed to parse map {}", path.display()))
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Tile layers from bottom to top.
    #[must_use]
    pub fn layers(&self) -> &[TiledLayer] {
        &self.layers
    }

    /// Composites the layers into a map layout.
    ///
    /// Sprite layers fill the marker layer and every other layer fills the
    /// ground layer; in both cases the topmost non-empty tile wins. A ground
    /// tile whose terrain vector names one class at all four corners paints
    /// that class into its cell.
    pub fn layout(&self, catalog: &TileCatalog) -> Result<MapLayout> {
        let cells = usize::try_from(u64::from(self.columns) * u64::from(self.rows))
            .context("map dimensions overflow")?;
        let mut ground = vec![None; cells];
        let mut markers = vec![None; cells];

        for layer in &self.layers {
            let target = if layer.sprite {
                &mut markers
            } else {
                &mut ground
            };
            for (slot, gid) in target.iter_mut().zip(&layer.gids) {
                if *gid != 0 {
                    *slot = Some(TileId::new(*gid));
                }
            }
        }

        let terrain = ground
            .iter()
            .map(|tile: &Option<TileId>| {
                tile.and_then(|tile| catalog.lookup(tile))
                    .and_then(Tile::terrain)
                    .and_then(|vector| vector.uniform_class())
            })
            .collect();

        let layout = MapLayout::from_layers(self.columns, self.rows, ground, terrain, markers)?;
        Ok(layout)
    }
}

fn decode_data(data: &XmlData) -> Result<Vec<u32>> {
    match data.encoding.as_deref() {
        None => Ok(data.tiles.iter().map(|tile| tile.gid).collect()),
        Some("csv") => data
            .text
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                entry
                    .parse::<u32>()
                    .with_context(|| format!("csv entry `{entry}` is not a tile id"))
            })
            .collect(),
        Some("base64") => {
            let text = data.text.as_deref().unwrap_or_default().trim();
            let bytes = STANDARD
                .decode(text)
                .context("layer data is not valid base64")?;
            let bytes = decompress(data.compression.as_deref(), bytes)?;
            ensure!(
                bytes.len() % 4 == 0,
                "decoded layer data has {} bytes, not a multiple of 4",
                bytes.len()
            );
            Ok(bytes
                .chunks_exact(4)
                .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect())
        }
        Some(other) => bail!("unsupported layer encoding `{other}`"),
    }
}

fn decompress(compression: Option<&str>, bytes: Vec<u8>) -> Result<Vec<u8>> {
    let mut inflated = Vec::new();
    match compression {
        None => return Ok(bytes),
        Some("gzip") => {
            let _ = GzDecoder::new(bytes.as_slice())
                .read_to_end(&mut inflated)
                .context("layer data is not valid gzip")?;
        }
        Some("zlib") => {
            let _ = ZlibDecoder::new(bytes.as_slice())
                .read_to_end(&mut inflated)
                .context("layer data is not valid zlib")?;
        }
        Some(other) => bail!("unsupported layer compression `{other}`"),
    }
    Ok(inflated)
}

#[derive(Debug, Deserialize)]
struct XmlMap {
    #[serde(rename = "@width")]
    width: u32,
    #[serde(rename = "@height")]
    height: u32,
    #[serde(rename = "tileset", default)]
    tilesets: Vec<XmlTilesetRef>,
    #[serde(rename = "layer", default)]
    layers: Vec<XmlLayer>,
}

#[derive(Debug, Deserialize)]
struct XmlTilesetRef {
    #[serde(rename = "@firstgid")]
    firstgid: u32,
    #[serde(rename = "@source", default)]
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlLayer {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "@width")]
    width: u32,
    #[serde(rename = "@height")]
    height: u32,
    #[serde(default)]
    properties: Option<XmlProperties>,
    data: XmlData,
}

#[derive(Debug, Deserialize)]
struct XmlData {
    #[serde(rename = "@encoding", default)]
    encoding: Option<String>,
    #[serde(rename = "@compression", default)]
    compression: Option<String>,
    #[serde(rename = "$text", default)]
    text: Option<String>,
    #[serde(rename = "tile", default)]
    tiles: Vec<XmlDataTile>,
}

#[derive(Debug, Deserialize)]
struct XmlDataTile {
    #[serde(rename = "@gid", default)]
    gid: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_flags_are_masked() {
        let xml = r#"
            <map width="2" height="1">
              <layer name="Ground" width="2" height="1">
                <data encoding="csv">2147483651,5</data>
              </layer>
            </map>
        "#;
        let map = TiledMap::parse(xml).expect("map parses");
        assert_eq!(map.layers()[0].gids(), &[3, 5]);
    }

    #[test]
    fn unknown_compression_is_rejected() {
        assert!(decompress(Some("zstd"), vec![1, 2, 3]).is_err());
    }
}
