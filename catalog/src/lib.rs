#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Immutable tile catalog built from a declarative tileset source.
//!
//! The catalog is constructed once at startup and then shared read-only
//! (typically behind an `Arc`) by every map, resolver and registry. Loading
//! validates the whole source up front; a catalog value therefore never holds
//! a dangling terrain class reference, a duplicated tile id or an out-of-range
//! slot marker.

mod source;

use std::collections::{btree_map::Entry, BTreeMap, HashMap};

use campaign_trail_core::{
    CatalogDefect, Connector, EncounterId, LoadError, SlotIndex, SlotKind, TagKind,
    TerrainClass, TerrainClassId, TerrainVector, Tile, TileId, TileTag,
};
use tracing::debug;

pub use source::{CatalogSource, TileSource, UNSET_TERRAIN};

/// Read-only lookup from tile identifier to declared properties.
#[derive(Clone, Debug)]
pub struct TileCatalog {
    classes: Vec<TerrainClass>,
    class_names: HashMap<String, TerrainClassId>,
    tiles: BTreeMap<TileId, Tile>,
}

impl TileCatalog {
    /// Validates the source and builds the catalog.
    ///
    /// Fails with [`LoadError::MalformedCatalog`] describing the first defect
    /// found; no partially built catalog is returned.
    pub fn load(source: &CatalogSource) -> Result<Self, LoadError> {
        let mut classes = Vec::with_capacity(source.terrain_classes.len());
        let mut class_names = HashMap::with_capacity(source.terrain_classes.len());
        for (index, name) in source.terrain_classes.iter().enumerate() {
            let raw = u16::try_from(index)
                .map_err(|_| CatalogDefect::TooManyTerrainClasses(source.terrain_classes.len()))?;
            let id = TerrainClassId::new(raw);
            if class_names.insert(name.clone(), id).is_some() {
                return Err(CatalogDefect::DuplicateTerrainClass(name.clone()).into());
            }
            classes.push(TerrainClass::new(id, name.clone()));
        }

        let mut tiles = BTreeMap::new();
        for declaration in &source.tiles {
            let tile = build_tile(declaration, &class_names)?;
            match tiles.entry(tile.id()) {
                Entry::Occupied(_) => {
                    return Err(CatalogDefect::DuplicateTileId(tile.id()).into());
                }
                Entry::Vacant(slot) => {
                    let _ = slot.insert(tile);
                }
            }
        }

        let catalog = Self {
            classes,
            class_names,
            tiles,
        };
        debug!(
            terrain_classes = catalog.classes.len(),
            tiles = catalog.tiles.len(),
            terrain_tiles = catalog.terrain_tiles().count(),
            "tile catalog loaded"
        );
        Ok(catalog)
    }

    /// Looks up a declared tile. Undeclared ids denote blank tiles.
    #[must_use]
    pub fn lookup(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    /// Tiles carrying a tag of the requested kind, in ascending id order.
    pub fn tiles_with_tag(&self, kind: TagKind) -> impl Iterator<Item = &Tile> {
        self.tiles
            .values()
            .filter(move |tile| tile.tag().is_some_and(|tag| tag.is_kind(kind)))
    }

    /// Every declared tile in ascending id order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Tiles that participate in autotiling, in ascending id order.
    pub fn terrain_tiles(&self) -> impl Iterator<Item = (TileId, &TerrainVector)> {
        self.tiles
            .values()
            .filter_map(|tile| tile.terrain().map(|vector| (tile.id(), vector)))
    }

    /// Terrain classes in declaration (priority) order.
    #[must_use]
    pub fn terrain_classes(&self) -> &[TerrainClass] {
        &self.classes
    }

    /// Looks up a terrain class by identifier.
    #[must_use]
    pub fn terrain_class(&self, id: TerrainClassId) -> Option<&TerrainClass> {
        self.classes.get(id.index())
    }

    /// Looks up a terrain class identifier by its declared name.
    #[must_use]
    pub fn terrain_class_by_name(&self, name: &str) -> Option<TerrainClassId> {
        self.class_names.get(name).copied()
    }

    /// Lowest tile id declaring exactly the provided connector set.
    #[must_use]
    pub fn tile_for_connector(&self, connector: Connector) -> Option<TileId> {
        self.tiles
            .values()
            .find(|tile| tile.connector() == Some(connector))
            .map(Tile::id)
    }

    /// Encounter ids referenced by tiles, in ascending tile id order.
    pub fn encounter_references(&self) -> impl Iterator<Item = (TileId, &EncounterId)> {
        self.tiles.values().filter_map(|tile| {
            tile.tag()
                .and_then(TileTag::encounter)
                .map(|encounter| (tile.id(), encounter))
        })
    }

    /// Number of declared tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether the catalog declares no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

fn build_tile(
    declaration: &TileSource,
    class_names: &HashMap<String, TerrainClassId>,
) -> Result<Tile, CatalogDefect> {
    let id = TileId::new(declaration.id);
    let mut tile = Tile::new(id);

    if let Some(entries) = &declaration.terrain {
        tile = tile.with_terrain(parse_terrain(id, entries, class_names)?);
    }

    if let Some(code) = &declaration.connector {
        let connector =
            Connector::from_code(code).ok_or_else(|| CatalogDefect::InvalidConnector {
                tile: id,
                code: code.clone(),
            })?;
        tile = tile.with_connector(connector);
    }

    if let Some(tag) = parse_tag(id, declaration)? {
        tile = tile.with_tag(tag);
    }

    Ok(tile)
}

fn parse_terrain(
    tile: TileId,
    entries: &[String],
    class_names: &HashMap<String, TerrainClassId>,
) -> Result<TerrainVector, CatalogDefect> {
    if entries.len() != 4 {
        return Err(CatalogDefect::TerrainArity {
            tile,
            found: entries.len(),
        });
    }

    let mut corners = [None; 4];
    for (corner, entry) in corners.iter_mut().zip(entries) {
        let name = entry.trim();
        if name.is_empty() || name == UNSET_TERRAIN {
            continue;
        }
        let id = class_names
            .get(name)
            .copied()
            .ok_or_else(|| CatalogDefect::UndefinedTerrainClass {
                tile,
                class: name.to_owned(),
            })?;
        *corner = Some(id);
    }
    Ok(TerrainVector::new(corners))
}

fn parse_tag(tile: TileId, declaration: &TileSource) -> Result<Option<TileTag>, CatalogDefect> {
    let character = non_empty(tile, "character", declaration.character.as_deref())?;
    let encounter =
        non_empty(tile, "encounter", declaration.encounter.as_deref())?.map(EncounterId::new);
    let player = declaration
        .player_slot
        .map(|value| slot_index(tile, SlotKind::Player, value))
        .transpose()?;
    let monster = declaration
        .monster_slot
        .map(|value| slot_index(tile, SlotKind::Monster, value))
        .transpose()?;

    match (character, encounter, player, monster) {
        (None, None, None, None) => Ok(None),
        (Some(name), encounter, None, None) => Ok(Some(TileTag::Character { name, encounter })),
        (None, Some(id), None, None) => Ok(Some(TileTag::Encounter(id))),
        (None, None, Some(index), None) => Ok(Some(TileTag::PlayerSlot(index))),
        (None, None, None, Some(index)) => Ok(Some(TileTag::MonsterSlot(index))),
        _ => Err(CatalogDefect::ConflictingTags { tile }),
    }
}

fn non_empty(
    tile: TileId,
    property: &'static str,
    value: Option<&str>,
) -> Result<Option<String>, CatalogDefect> {
    match value.map(str::trim) {
        None => Ok(None),
        Some("") => Err(CatalogDefect::EmptyTagValue { tile, property }),
        Some(text) => Ok(Some(text.to_owned())),
    }
}

fn slot_index(tile: TileId, kind: SlotKind, value: i64) -> Result<SlotIndex, CatalogDefect> {
    u8::try_from(value)
        .ok()
        .and_then(SlotIndex::new)
        .ok_or(CatalogDefect::SlotOutOfRange { tile, kind, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_entries_are_not_part_of_the_vector() {
        let source = CatalogSource::new(["Interior", "Exterior"])
            .with_tile(TileSource::new(3).terrain(["Exterior", "-1", "", "Interior"]));
        let catalog = TileCatalog::load(&source).expect("catalog loads");
        let vector = catalog
            .lookup(TileId::new(3))
            .and_then(Tile::terrain)
            .copied()
            .expect("terrain vector");
        assert_eq!(
            vector.as_array(),
            [
                Some(TerrainClassId::new(1)),
                None,
                None,
                Some(TerrainClassId::new(0))
            ]
        );
    }

    #[test]
    fn fully_unset_vector_is_dropped() {
        let source =
            CatalogSource::new(["Interior"]).with_tile(TileSource::new(0).terrain(["-1"; 4]));
        let catalog = TileCatalog::load(&source).expect("catalog loads");
        assert_eq!(catalog.terrain_tiles().count(), 0);
    }

    #[test]
    fn slot_values_outside_u8_are_out_of_range() {
        let source = CatalogSource::new(Vec::<String>::new())
            .with_tile(TileSource::new(40).monster_slot(i64::from(u16::MAX)));
        assert_eq!(
            TileCatalog::load(&source).unwrap_err(),
            LoadError::MalformedCatalog(CatalogDefect::SlotOutOfRange {
                tile: TileId::new(40),
                kind: SlotKind::Monster,
                value: i64::from(u16::MAX),
            })
        );
    }
}
