//! Single-line terrain layout strings for clipboard transfer.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use campaign_trail_catalog::TileCatalog;
use campaign_trail_core::{CellCoord, Command};
use campaign_trail_world::{query, MapInstance};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix segments; together they identify the snapshot format.
const SNAPSHOT_DOMAIN: &str = "trail";
const SNAPSHOT_VERSION: &str = "v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Painted terrain of a map, stored by class name so it survives catalog
/// reordering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TerrainLayoutSnapshot {
    columns: u32,
    rows: u32,
    palette: Vec<String>,
    cells: Vec<Option<usize>>,
}

impl TerrainLayoutSnapshot {
    /// Captures the painted classes of every cell in row-major order.
    pub(crate) fn capture(map: &MapInstance, catalog: &TileCatalog) -> Self {
        let (columns, rows) = query::dimensions(map);
        let palette = catalog
            .terrain_classes()
            .iter()
            .map(|class| class.name().to_owned())
            .collect();
        let cells = (0..rows)
            .flat_map(|row| (0..columns).map(move |column| CellCoord::new(column, row)))
            .map(|cell| query::terrain_at(map, cell).map(|class| class.index()))
            .collect();

        Self {
            columns,
            rows,
            palette,
            cells,
        }
    }

    /// Grid dimensions as `(columns, rows)`.
    pub(crate) const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Encodes the snapshot into a single-line string.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let payload = SerializableSnapshot {
            palette: self.palette.clone(),
            cells: self.cells.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(LayoutTransferError::Serialize)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{SNAPSHOT_DOMAIN}{FIELD_DELIMITER}{SNAPSHOT_VERSION}{FIELD_DELIMITER}{}x{}{FIELD_DELIMITER}{encoded}",
            self.columns, self.rows
        ))
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(LayoutTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        let decoded: SerializableSnapshot =
            serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

        let expected = usize::try_from(u64::from(columns) * u64::from(rows))
            .map_err(|_| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;
        if decoded.cells.len() != expected {
            return Err(LayoutTransferError::CellCountMismatch {
                expected,
                found: decoded.cells.len(),
            });
        }
        if let Some(entry) = decoded
            .cells
            .iter()
            .flatten()
            .find(|entry| **entry >= decoded.palette.len())
        {
            return Err(LayoutTransferError::UnknownPaletteEntry(*entry));
        }

        Ok(Self {
            columns,
            rows,
            palette: decoded.palette,
            cells: decoded.cells,
        })
    }

    /// Paint commands reproducing the snapshot on a map of the same size.
    ///
    /// Class names are matched against the provided catalog.
    pub(crate) fn paint_commands(
        &self,
        catalog: &TileCatalog,
    ) -> Result<Vec<Command>, LayoutTransferError> {
        let mut classes = Vec::with_capacity(self.palette.len());
        for name in &self.palette {
            classes.push(catalog.terrain_class_by_name(name));
        }

        let coords = (0..self.rows)
            .flat_map(|row| (0..self.columns).map(move |column| CellCoord::new(column, row)));
        let mut commands = Vec::new();
        for (cell, entry) in coords.zip(&self.cells) {
            let Some(entry) = entry else {
                continue;
            };
            let class = classes
                .get(*entry)
                .copied()
                .flatten()
                .ok_or_else(|| {
                    LayoutTransferError::UnknownTerrainClass(
                        self.palette.get(*entry).cloned().unwrap_or_default(),
                    )
                })?;
            commands.push(Command::PaintTerrain { cell, class });
        }
        Ok(commands)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct SerializableSnapshot {
    palette: Vec<String>,
    cells: Vec<Option<usize>>,
}

/// Errors that can occur while encoding or decoding layout transfer strings.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout payload was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    #[error("layout string is missing the prefix")]
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    #[error("layout string is missing the version")]
    MissingVersion,
    /// The encoded snapshot did not include grid dimensions.
    #[error("layout string is missing the grid dimensions")]
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    #[error("layout string is missing the payload")]
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded snapshot.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The payload lists a different number of cells than the grid holds.
    #[error("layout holds {found} cells, the grid needs {expected}")]
    CellCountMismatch {
        /// Cells implied by the dimensions.
        expected: usize,
        /// Cells present in the payload.
        found: usize,
    },
    /// A cell points past the end of the class palette.
    #[error("cell references palette entry {0} which does not exist")]
    UnknownPaletteEntry(usize),
    /// A palette class is not declared by the target catalog.
    #[error("terrain class '{0}' is not declared by the project")]
    UnknownTerrainClass(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse layout payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The snapshot could not be serialised.
    #[error("could not serialise layout payload: {0}")]
    Serialize(#[source] serde_json::Error),
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(LayoutTransferError::InvalidDimensions(
            dimensions.to_owned(),
        ));
    }

    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use campaign_trail_catalog::CatalogSource;
    use campaign_trail_core::TerrainClassId;

    use super::*;

    fn snapshot() -> TerrainLayoutSnapshot {
        TerrainLayoutSnapshot {
            columns: 3,
            rows: 2,
            palette: vec!["Interior".to_owned(), "Exterior".to_owned()],
            cells: vec![Some(1), Some(1), None, Some(0), None, Some(1)],
        }
    }

    fn encode_payload(payload: &SerializableSnapshot) -> String {
        STANDARD_NO_PAD.encode(serde_json::to_vec(payload).expect("payload serialises"))
    }

    #[test]
    fn round_trip_painted_layout() {
        let snapshot = snapshot();
        let encoded = snapshot.encode().expect("snapshot encodes");
        assert!(encoded.starts_with("trail:v1:3x2:"));

        let decoded = TerrainLayoutSnapshot::decode(&encoded).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn foreign_prefixes_are_rejected() {
        let encoded = snapshot().encode().expect("snapshot encodes");
        let foreign = encoded.replacen("trail", "maze", 1);
        assert!(matches!(
            TerrainLayoutSnapshot::decode(&foreign),
            Err(LayoutTransferError::InvalidPrefix(prefix)) if prefix == "maze"
        ));
        assert!(matches!(
            TerrainLayoutSnapshot::decode("   "),
            Err(LayoutTransferError::EmptyPayload)
        ));
    }

    #[test]
    fn cell_count_must_match_dimensions() {
        let payload = encode_payload(&SerializableSnapshot {
            palette: vec!["Interior".to_owned()],
            cells: vec![Some(0); 5],
        });
        assert!(matches!(
            TerrainLayoutSnapshot::decode(&format!("trail:v1:3x2:{payload}")),
            Err(LayoutTransferError::CellCountMismatch {
                expected: 6,
                found: 5
            })
        ));
    }

    #[test]
    fn palette_entries_must_exist() {
        let payload = encode_payload(&SerializableSnapshot {
            palette: vec!["Interior".to_owned()],
            cells: vec![Some(0), Some(2)],
        });
        assert!(matches!(
            TerrainLayoutSnapshot::decode(&format!("trail:v1:2x1:{payload}")),
            Err(LayoutTransferError::UnknownPaletteEntry(2))
        ));
    }

    #[test]
    fn paint_commands_follow_catalog_names() {
        // Reversed declaration order gives different ids for the same names.
        let catalog = TileCatalog::load(&CatalogSource::new(["Exterior", "Interior"]))
            .expect("catalog loads");
        let commands = snapshot()
            .paint_commands(&catalog)
            .expect("every class is declared");

        assert_eq!(commands.len(), 4, "unpainted cells produce no command");
        assert_eq!(
            commands[0],
            Command::PaintTerrain {
                cell: CellCoord::new(0, 0),
                class: TerrainClassId::new(0),
            }
        );
        assert_eq!(
            commands[2],
            Command::PaintTerrain {
                cell: CellCoord::new(0, 1),
                class: TerrainClassId::new(1),
            }
        );
    }

    #[test]
    fn undeclared_palette_classes_cannot_be_painted() {
        let catalog =
            TileCatalog::load(&CatalogSource::new(["Interior"])).expect("catalog loads");
        assert!(matches!(
            snapshot().paint_commands(&catalog),
            Err(LayoutTransferError::UnknownTerrainClass(name)) if name == "Exterior"
        ));
    }
}
