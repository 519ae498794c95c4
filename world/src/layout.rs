//! Authored map layers handed to [`crate::MapInstance::new`].

use campaign_trail_core::{CellCoord, LoadError, TerrainClassId, TileId};

/// Row-major ground, terrain and marker layers of an authored map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapLayout {
    columns: u32,
    rows: u32,
    ground: Vec<Option<TileId>>,
    terrain: Vec<Option<TerrainClassId>>,
    markers: Vec<Option<TileId>>,
}

impl MapLayout {
    /// Creates an empty layout with the provided dimensions.
    #[must_use]
    pub fn blank(columns: u32, rows: u32) -> Self {
        let cells = cell_count(columns, rows);
        Self {
            columns,
            rows,
            ground: vec![None; cells],
            terrain: vec![None; cells],
            markers: vec![None; cells],
        }
    }

    /// Assembles a layout from pre-built row-major layers.
    ///
    /// Every layer must hold exactly `columns * rows` entries.
    pub fn from_layers(
        columns: u32,
        rows: u32,
        ground: Vec<Option<TileId>>,
        terrain: Vec<Option<TerrainClassId>>,
        markers: Vec<Option<TileId>>,
    ) -> Result<Self, LoadError> {
        let expected = cell_count(columns, rows);
        for (name, found) in [
            ("ground", ground.len()),
            ("terrain", terrain.len()),
            ("marker", markers.len()),
        ] {
            if found != expected {
                return Err(LoadError::MalformedMap(format!(
                    "{name} layer holds {found} cells, a {columns}x{rows} map needs {expected}"
                )));
            }
        }

        Ok(Self {
            columns,
            rows,
            ground,
            terrain,
            markers,
        })
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

    /// Sets the ground tile of a cell. Returns `false` when out of bounds.
    pub fn set_ground(&mut self, cell: CellCoord, tile: Option<TileId>) -> bool {
        self.slot(cell).map(|index| self.ground[index] = tile).is_some()
    }

    /// Sets the painted class of a cell. Returns `false` when out of bounds.
    pub fn set_terrain(&mut self, cell: CellCoord, class: Option<TerrainClassId>) -> bool {
        self.slot(cell).map(|index| self.terrain[index] = class).is_some()
    }

    /// Sets the marker tile of a cell. Returns `false` when out of bounds.
    pub fn set_marker(&mut self, cell: CellCoord, tile: Option<TileId>) -> bool {
        self.slot(cell).map(|index| self.markers[index] = tile).is_some()
    }

    /// Ground layer in row-major order.
    #[must_use]
    pub fn ground(&self) -> &[Option<TileId>] {
        &self.ground
    }

    /// Painted terrain classes in row-major order.
    #[must_use]
    pub fn terrain(&self) -> &[Option<TerrainClassId>] {
        &self.terrain
    }

    /// Marker layer in row-major order.
    #[must_use]
    pub fn markers(&self) -> &[Option<TileId>] {
        &self.markers
    }

    pub(crate) fn into_layers(
        self,
    ) -> (
        Vec<Option<TileId>>,
        Vec<Option<TerrainClassId>>,
        Vec<Option<TileId>>,
    ) {
        (self.ground, self.terrain, self.markers)
    }

    fn slot(&self, cell: CellCoord) -> Option<usize> {
        cell_index(self.columns, self.rows, cell)
    }
}

pub(crate) fn cell_count(columns: u32, rows: u32) -> usize {
    usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0)
}

pub(crate) fn cell_index(columns: u32, rows: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() < columns && cell.row() < rows {
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(columns).ok()?;
        Some(row * width + column)
    } else {
        None
    }
}
