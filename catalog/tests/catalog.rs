use campaign_trail_catalog::{CatalogSource, TileCatalog, TileSource};
use campaign_trail_core::{
    CatalogDefect, Connector, Direction, EncounterId, LoadError, SlotIndex, SlotKind, TagKind,
    TerrainClassId, TileId, TileTag,
};

fn basement_source() -> CatalogSource {
    CatalogSource::new(["Interior", "Exterior"])
        .with_tile(
            TileSource::new(0)
                .terrain(["Exterior", "Exterior", "Exterior", "Interior"])
                .connector(""),
        )
        .with_tile(TileSource::new(1).terrain(["Exterior", "Exterior", "Interior", "Interior"]))
        .with_tile(TileSource::new(9).terrain(["Interior"; 4]))
        .with_tile(TileSource::new(12).terrain(["Exterior"; 4]))
        .with_tile(TileSource::new(24).connector("lu"))
        .with_tile(TileSource::new(25).connector("u"))
}

fn sprites_source() -> CatalogSource {
    CatalogSource::default()
        .with_tile(TileSource::new(47).monster_slot(4))
        .with_tile(TileSource::new(0).character("Player"))
        .with_tile(
            TileSource::new(1)
                .character("Politician001")
                .encounter("P-easy-01"),
        )
        .with_tile(TileSource::new(41).player_slot(2))
        .with_tile(TileSource::new(40).player_slot(1))
        .with_tile(TileSource::new(44).monster_slot(1))
}

fn load_err(source: &CatalogSource) -> LoadError {
    match TileCatalog::load(source) {
        Ok(_) => panic!("catalog should have been rejected"),
        Err(error) => error,
    }
}

#[test]
fn every_terrain_vector_references_declared_classes() {
    let catalog = TileCatalog::load(&basement_source()).expect("catalog loads");
    let class_count = catalog.terrain_classes().len();

    for tile in catalog.tiles() {
        let looked_up = catalog.lookup(tile.id()).expect("declared tile resolves");
        if let Some(vector) = looked_up.terrain() {
            for class in vector.as_array().into_iter().flatten() {
                assert!(
                    class.index() < class_count,
                    "tile {} references class {class:?} outside the catalog",
                    tile.id(),
                );
            }
        }
    }
}

#[test]
fn basement_corner_tile_carries_declared_vector() {
    let catalog = TileCatalog::load(&basement_source()).expect("catalog loads");
    let interior = catalog
        .terrain_class_by_name("Interior")
        .expect("Interior declared");
    let exterior = catalog
        .terrain_class_by_name("Exterior")
        .expect("Exterior declared");
    assert_eq!(interior, TerrainClassId::new(0));
    assert_eq!(exterior, TerrainClassId::new(1));

    let tile = catalog.lookup(TileId::new(0)).expect("tile 0 declared");
    let vector = tile.terrain().expect("tile 0 participates in terrain");
    assert_eq!(
        vector.as_array(),
        [Some(exterior), Some(exterior), Some(exterior), Some(interior)]
    );
    assert_eq!(tile.connector(), Some(Connector::EMPTY));
}

#[test]
fn undeclared_ids_are_blank_not_errors() {
    let catalog = TileCatalog::load(&basement_source()).expect("catalog loads");
    assert!(catalog.lookup(TileId::new(2)).is_none());
    assert!(catalog.lookup(TileId::new(4_000)).is_none());
}

#[test]
fn duplicate_tile_ids_are_rejected() {
    let source = basement_source().with_tile(TileSource::new(9).terrain(["Interior"; 4]));
    assert_eq!(
        load_err(&source),
        LoadError::MalformedCatalog(CatalogDefect::DuplicateTileId(TileId::new(9)))
    );
}

#[test]
fn duplicate_terrain_class_names_are_rejected() {
    let source = CatalogSource::new(["Interior", "Interior"]);
    assert_eq!(
        load_err(&source),
        LoadError::MalformedCatalog(CatalogDefect::DuplicateTerrainClass(
            "Interior".to_owned()
        ))
    );
}

#[test]
fn undefined_terrain_class_is_rejected() {
    let source = CatalogSource::new(["Interior"])
        .with_tile(TileSource::new(5).terrain(["Interior", "Lava", "Interior", "Interior"]));
    assert_eq!(
        load_err(&source),
        LoadError::MalformedCatalog(CatalogDefect::UndefinedTerrainClass {
            tile: TileId::new(5),
            class: "Lava".to_owned(),
        })
    );
}

#[test]
fn terrain_vectors_need_four_entries() {
    let mut tile = TileSource::new(7);
    tile.terrain = Some(vec!["Interior".to_owned(); 3]);
    let source = CatalogSource::new(["Interior"]).with_tile(tile);
    assert_eq!(
        load_err(&source),
        LoadError::MalformedCatalog(CatalogDefect::TerrainArity {
            tile: TileId::new(7),
            found: 3,
        })
    );
}

#[test]
fn slot_indices_outside_formation_are_rejected() {
    for value in [0, 5, -1] {
        let source = CatalogSource::default().with_tile(TileSource::new(42).player_slot(value));
        assert_eq!(
            load_err(&source),
            LoadError::MalformedCatalog(CatalogDefect::SlotOutOfRange {
                tile: TileId::new(42),
                kind: SlotKind::Player,
                value,
            })
        );
    }
}

#[test]
fn conflicting_tags_are_rejected() {
    let source = CatalogSource::default().with_tile(
        TileSource::new(3)
            .character("Player")
            .player_slot(1),
    );
    assert_eq!(
        load_err(&source),
        LoadError::MalformedCatalog(CatalogDefect::ConflictingTags {
            tile: TileId::new(3),
        })
    );
}

#[test]
fn invalid_connector_codes_are_rejected() {
    let source = CatalogSource::default().with_tile(TileSource::new(30).connector("uq"));
    assert_eq!(
        load_err(&source),
        LoadError::MalformedCatalog(CatalogDefect::InvalidConnector {
            tile: TileId::new(30),
            code: "uq".to_owned(),
        })
    );
}

#[test]
fn empty_character_names_are_rejected() {
    let source = CatalogSource::default().with_tile(TileSource::new(2).character("  "));
    assert_eq!(
        load_err(&source),
        LoadError::MalformedCatalog(CatalogDefect::EmptyTagValue {
            tile: TileId::new(2),
            property: "character",
        })
    );
}

#[test]
fn tag_scans_are_in_ascending_id_order() {
    let catalog = TileCatalog::load(&sprites_source()).expect("catalog loads");

    let players: Vec<_> = catalog
        .tiles_with_tag(TagKind::PlayerSlot)
        .map(|tile| tile.id().get())
        .collect();
    assert_eq!(players, vec![40, 41]);

    let monsters: Vec<_> = catalog
        .tiles_with_tag(TagKind::MonsterSlot)
        .map(|tile| tile.id().get())
        .collect();
    assert_eq!(monsters, vec![44, 47]);

    let characters: Vec<_> = catalog
        .tiles_with_tag(TagKind::Character)
        .map(|tile| tile.id().get())
        .collect();
    assert_eq!(characters, vec![0, 1]);
}

#[test]
fn character_encounters_are_scanned_as_encounter_tags() {
    let catalog = TileCatalog::load(&sprites_source()).expect("catalog loads");

    let encounters: Vec<_> = catalog
        .tiles_with_tag(TagKind::Encounter)
        .map(|tile| tile.id())
        .collect();
    assert_eq!(encounters, vec![TileId::new(1)]);

    let references: Vec<_> = catalog.encounter_references().collect();
    assert_eq!(
        references,
        vec![(TileId::new(1), &EncounterId::new("P-easy-01"))]
    );

    let tag = catalog
        .lookup(TileId::new(1))
        .and_then(|tile| tile.tag())
        .cloned();
    assert_eq!(
        tag,
        Some(TileTag::Character {
            name: "Politician001".to_owned(),
            encounter: Some(EncounterId::new("P-easy-01")),
        })
    );
}

#[test]
fn connector_lookup_prefers_lowest_id() {
    let source = basement_source().with_tile(TileSource::new(60).connector("ul"));
    let catalog = TileCatalog::load(&source).expect("catalog loads");
    let up_left = Connector::EMPTY
        .with(Direction::North)
        .with(Direction::West);
    assert_eq!(catalog.tile_for_connector(up_left), Some(TileId::new(24)));
    assert_eq!(
        catalog.tile_for_connector(Connector::EMPTY.with(Direction::East)),
        None
    );
}

#[test]
fn catalog_source_deserializes_from_toml() {
    let text = r#"
        terrain_classes = ["Interior", "Exterior"]

        [[tiles]]
        id = 0
        terrain = ["Exterior", "Exterior", "Exterior", "Interior"]

        [[tiles]]
        id = 44
        monster_slot = 1
    "#;
    let source: CatalogSource = toml::from_str(text).expect("toml parses");
    let catalog = TileCatalog::load(&source).expect("catalog loads");
    assert_eq!(catalog.len(), 2);
    assert_eq!(
        catalog.lookup(TileId::new(44)).and_then(|tile| tile.tag()),
        Some(&TileTag::MonsterSlot(SlotIndex::new(1).expect("slot")))
    );
}
