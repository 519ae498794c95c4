#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative map state for Campaign Trail.
//!
//! A [`MapInstance`] owns the live grid of one map. Every mutation goes through
//! [`apply`], which finishes all terrain re-resolution for a command before it
//! returns, so readers never observe a cell whose corners are only partially
//! settled. Catalog, resolver and registry are shared read-only through `Arc`
//! and may back any number of instances.

mod layout;

use std::sync::Arc;

use campaign_trail_catalog::TileCatalog;
use campaign_trail_core::{
    ActorId, CellCoord, Command, CornerSignature, Event, LoadError, MapError, TerrainClassId,
    TileId, TileTag,
};
use campaign_trail_system_encounters::EncounterRegistry;
use campaign_trail_system_terrain::{ResolveQueue, TerrainResolver};
use tracing::{debug, trace};

pub use layout::MapLayout;

use layout::cell_index;

/// Live grid of one map together with the shared read-only data it draws on.
#[derive(Debug)]
pub struct MapInstance {
    catalog: Arc<TileCatalog>,
    resolver: Arc<TerrainResolver>,
    registry: Arc<EncounterRegistry>,
    columns: u32,
    rows: u32,
    cells: Vec<MapCell>,
    actors: Vec<Actor>,
    next_actor: u32,
    queue: ResolveQueue,
}

impl MapInstance {
    /// Validates the layout against the shared data and resolves every
    /// painted cell.
    ///
    /// Fails with [`LoadError::DanglingEncounterReference`] when a placed tile
    /// references an unregistered encounter, and with
    /// [`LoadError::MalformedMap`] when a painted class is not declared.
    pub fn new(
        catalog: Arc<TileCatalog>,
        resolver: Arc<TerrainResolver>,
        registry: Arc<EncounterRegistry>,
        layout: MapLayout,
    ) -> Result<Self, LoadError> {
        let columns = layout.columns();
        let rows = layout.rows();
        let (ground, terrain, markers) = layout.into_layers();

        for tile in ground.iter().chain(markers.iter()).flatten() {
            if let Some(encounter) = catalog
                .lookup(*tile)
                .and_then(|declared| declared.tag())
                .and_then(TileTag::encounter)
            {
                if !registry.contains(encounter.as_str()) {
                    return Err(LoadError::DanglingEncounterReference {
                        tile: *tile,
                        encounter: encounter.clone(),
                    });
                }
            }
        }

        if let Some(class) = terrain
            .iter()
            .flatten()
            .find(|class| catalog.terrain_class(**class).is_none())
        {
            return Err(LoadError::MalformedMap(format!(
                "terrain class {} is not declared by the catalog",
                class.get()
            )));
        }

        let cells = ground
            .into_iter()
            .zip(terrain)
            .zip(markers)
            .map(|((ground, class), marker)| MapCell {
                ground,
                class,
                corners: None,
                marker,
            })
            .collect();

        let mut map = Self {
            catalog,
            resolver,
            registry,
            columns,
            rows,
            cells,
            actors: Vec::new(),
            next_actor: 0,
            queue: ResolveQueue::new(columns, rows),
        };

        let mut resolved = 0_usize;
        for index in 0..map.cells.len() {
            if let Some(cell) = map.coord(index) {
                if map.resolve_cell(cell).is_some() {
                    resolved += 1;
                }
            }
        }
        debug!(columns, rows, resolved, "map instance loaded");

        Ok(map)
    }

    fn cell(&self, cell: CellCoord) -> Option<&MapCell> {
        cell_index(self.columns, self.rows, cell).and_then(|index| self.cells.get(index))
    }

    fn cell_mut(&mut self, cell: CellCoord) -> Option<&mut MapCell> {
        cell_index(self.columns, self.rows, cell).and_then(|index| self.cells.get_mut(index))
    }

    fn coord(&self, index: usize) -> Option<CellCoord> {
        let width = usize::try_from(self.columns).ok().filter(|width| *width > 0)?;
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }

    fn class_at(&self, cell: CellCoord) -> Option<TerrainClassId> {
        self.cell(cell).and_then(|state| state.class)
    }

    /// Recomputes the corners of a painted cell and returns the newly
    /// selected tile if the ground tile changed.
    fn resolve_cell(&mut self, cell: CellCoord) -> Option<TileId> {
        if self.class_at(cell).is_none() {
            return None;
        }
        let signature = self
            .resolver
            .signature_at(cell, |neighbour| self.class_at(neighbour));
        let selected = self.resolver.resolve(&signature);

        let state = self.cell_mut(cell)?;
        state.corners = Some(signature);
        let tile = selected?;
        if state.ground == Some(tile) {
            return None;
        }
        state.ground = Some(tile);
        trace!(%cell, %tile, "terrain tile resolved");
        Some(tile)
    }

    fn propagate_from(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        self.queue.push_neighbourhood(cell);
        while let Some(next) = self.queue.pop() {
            if let Some(tile) = self.resolve_cell(next) {
                out_events.push(Event::TileResolved { cell: next, tile });
            }
        }
    }

    fn trigger_at(&self, cell: CellCoord) -> Option<(TileId, &TileTag)> {
        let state = self.cell(cell)?;
        [state.marker, state.ground]
            .into_iter()
            .flatten()
            .find_map(|tile| {
                self.catalog
                    .lookup(tile)
                    .and_then(|declared| declared.tag())
                    .filter(|tag| tag.is_trigger())
                    .map(|tag| (tile, tag))
            })
    }

    fn emit_trigger(&self, cell: CellCoord, out_events: &mut Vec<Event>) {
        if let Some((tile, tag)) = self.trigger_at(cell) {
            debug!(%cell, %tile, "trigger tile entered");
            out_events.push(Event::Triggered {
                cell,
                tag: tag.clone(),
                tile,
            });
        }
    }

    fn references_unknown_encounter(&self, tile: TileId) -> bool {
        self.catalog
            .lookup(tile)
            .and_then(|declared| declared.tag())
            .and_then(TileTag::encounter)
            .is_some_and(|encounter| !self.registry.contains(encounter.as_str()))
    }

    fn actor_mut(&mut self, actor: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|candidate| candidate.id == actor)
    }
}

/// Applies the provided command to the map, mutating state deterministically.
///
/// Invalid commands leave the map untouched and emit
/// [`Event::CommandRejected`].
pub fn apply(map: &mut MapInstance, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PaintTerrain { cell, class } => {
            if map.cell(cell).is_none() {
                reject(out_events, MapError::OutOfBounds);
                return;
            }
            if map.catalog.terrain_class(class).is_none() {
                reject(out_events, MapError::UnknownTerrainClass);
                return;
            }
            if let Some(state) = map.cell_mut(cell) {
                state.class = Some(class);
            }
            out_events.push(Event::TerrainPainted {
                cell,
                class: Some(class),
            });
            map.propagate_from(cell, out_events);
        }
        Command::EraseTerrain { cell } => {
            let Some(state) = map.cell_mut(cell) else {
                reject(out_events, MapError::OutOfBounds);
                return;
            };
            state.class = None;
            state.corners = None;
            out_events.push(Event::TerrainPainted { cell, class: None });
            map.propagate_from(cell, out_events);
        }
        Command::PlaceMarker { cell, tile } => {
            if map.cell(cell).is_none() {
                reject(out_events, MapError::OutOfBounds);
                return;
            }
            if tile.is_some_and(|tile| map.references_unknown_encounter(tile)) {
                reject(out_events, MapError::DanglingEncounter);
                return;
            }
            if let Some(state) = map.cell_mut(cell) {
                state.marker = tile;
            }
            out_events.push(Event::MarkerPlaced { cell, tile });
        }
        Command::SpawnActor { cell } => {
            if map.cell(cell).is_none() {
                reject(out_events, MapError::OutOfBounds);
                return;
            }
            let actor = ActorId::new(map.next_actor);
            map.next_actor = map.next_actor.saturating_add(1);
            map.actors.push(Actor { id: actor, cell });
            out_events.push(Event::ActorSpawned { actor, cell });
        }
        Command::StepActor { actor, direction } => {
            let columns = map.columns;
            let rows = map.rows;
            let Some(state) = map.actor_mut(actor) else {
                reject(out_events, MapError::UnknownActor);
                return;
            };
            let from = state.cell;
            let Some(to) = from
                .step(direction)
                .filter(|to| cell_index(columns, rows, *to).is_some())
            else {
                reject(out_events, MapError::OutOfBounds);
                return;
            };
            state.cell = to;
            out_events.push(Event::ActorMoved { actor, from, to });
            map.emit_trigger(to, out_events);
        }
        Command::ActorEntered { cell } => {
            if map.cell(cell).is_none() {
                reject(out_events, MapError::OutOfBounds);
                return;
            }
            map.emit_trigger(cell, out_events);
        }
    }
}

fn reject(out_events: &mut Vec<Event>, reason: MapError) {
    out_events.push(Event::CommandRejected { reason });
}

/// Query functions that provide read-only access to the map state.
pub mod query {
    use campaign_trail_core::{
        ActorId, CellCoord, CellRect, CellRectSize, CornerSignature, SlotIndex, SlotKind,
        SlotMarker, TerrainClassId, TileId, TileTag,
    };
    use sha2::{Digest, Sha256};

    use super::MapInstance;

    /// Width and height of the map in cells.
    #[must_use]
    pub fn dimensions(map: &MapInstance) -> (u32, u32) {
        (map.columns, map.rows)
    }

    /// Ground tile rendered at the cell, if any.
    #[must_use]
    pub fn tile_at(map: &MapInstance, cell: CellCoord) -> Option<TileId> {
        map.cell(cell).and_then(|state| state.ground)
    }

    /// Marker tile placed on the cell, if any.
    #[must_use]
    pub fn marker_at(map: &MapInstance, cell: CellCoord) -> Option<TileId> {
        map.cell(cell).and_then(|state| state.marker)
    }

    /// Terrain class painted onto the cell, if any.
    #[must_use]
    pub fn terrain_at(map: &MapInstance, cell: CellCoord) -> Option<TerrainClassId> {
        map.class_at(cell)
    }

    /// Settled corner classes of a painted cell.
    #[must_use]
    pub fn corners_at(map: &MapInstance, cell: CellCoord) -> Option<CornerSignature> {
        map.cell(cell).and_then(|state| state.corners)
    }

    /// Ground tiles in row-major order.
    #[must_use]
    pub fn ground_tiles(map: &MapInstance) -> Vec<Option<TileId>> {
        map.cells.iter().map(|state| state.ground).collect()
    }

    /// Slot markers found within the region, in row-major order.
    ///
    /// The marker layer is consulted before the ground layer. The region is
    /// clipped to the map first.
    #[must_use]
    pub fn slot_markers(map: &MapInstance, region: CellRect) -> Vec<SlotMarker> {
        region
            .clipped_to(map.columns, map.rows)
            .cells()
            .filter_map(|cell| {
                let state = map.cell(cell)?;
                [state.marker, state.ground]
                    .into_iter()
                    .flatten()
                    .find_map(|tile| {
                        map.catalog
                            .lookup(tile)
                            .and_then(|declared| declared.tag())
                            .and_then(TileTag::slot)
                    })
                    .map(|(kind, index)| SlotMarker { kind, index, cell })
            })
            .collect()
    }

    /// Cell where the player enters the map: the first player slot 1 marker.
    #[must_use]
    pub fn spawn_point(map: &MapInstance) -> Option<CellCoord> {
        let first = SlotIndex::new(1)?;
        let everything = CellRect::from_origin_and_size(
            CellCoord::new(0, 0),
            CellRectSize::new(map.columns, map.rows),
        );
        slot_markers(map, everything)
            .into_iter()
            .find(|marker| marker.kind == SlotKind::Player && marker.index == first)
            .map(|marker| marker.cell)
    }

    /// Cells whose marker or ground tile raises a trigger, in row-major order.
    #[must_use]
    pub fn trigger_cells(map: &MapInstance) -> Vec<(CellCoord, TileId)> {
        (0..map.cells.len())
            .filter_map(|index| map.coord(index))
            .filter_map(|cell| map.trigger_at(cell).map(|(tile, _)| (cell, tile)))
            .collect()
    }

    /// Cell currently occupied by the actor.
    #[must_use]
    pub fn actor_cell(map: &MapInstance, actor: ActorId) -> Option<CellCoord> {
        map.actors
            .iter()
            .find(|candidate| candidate.id == actor)
            .map(|candidate| candidate.cell)
    }

    /// Stable digest of the resolved grid for replay comparisons.
    #[must_use]
    pub fn fingerprint(map: &MapInstance) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(map.columns.to_le_bytes());
        hasher.update(map.rows.to_le_bytes());
        for state in &map.cells {
            hasher.update(encode_tile(state.ground).to_le_bytes());
            hasher.update(
                state
                    .class
                    .map_or(u32::MAX, |class| u32::from(class.get()))
                    .to_le_bytes(),
            );
            hasher.update(encode_tile(state.marker).to_le_bytes());
        }
        for actor in &map.actors {
            hasher.update(actor.id.get().to_le_bytes());
            hasher.update(actor.cell.column().to_le_bytes());
            hasher.update(actor.cell.row().to_le_bytes());
        }

        let digest = hasher.finalize();
        let mut bytes = [0_u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(bytes)
    }

    fn encode_tile(tile: Option<TileId>) -> u64 {
        tile.map_or(u64::MAX, |tile| u64::from(tile.get()))
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct MapCell {
    ground: Option<TileId>,
    class: Option<TerrainClassId>,
    corners: Option<CornerSignature>,
    marker: Option<TileId>,
}

#[derive(Clone, Copy, Debug)]
struct Actor {
    id: ActorId,
    cell: CellCoord,
}
