#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Campaign Trail tile engine.
//!
//! This crate defines the vocabulary that connects the tile catalog, the pure
//! systems, and the authoritative map. Adapters submit [`Command`] values
//! describing desired map mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values (resolved
//! tiles, trigger hits) for the gameplay layer to react to. Encounter and
//! formation types live here so the combat boundary never needs to depend on
//! the map crate.

use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of formation slots available to each side of a battle.
pub const MAX_SLOTS: u8 = 4;

/// Identifier of a tile declared in a catalog.
///
/// Identifiers are sparse: a catalog may skip values, and an undeclared id
/// denotes a blank background tile rather than an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    /// Creates a new tile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a terrain class within its catalog.
///
/// Classes are numbered in declaration order, which doubles as the priority
/// order used to break corner-vote ties: a lower index wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerrainClassId(u16);

impl TerrainClassId {
    /// Creates a new terrain class identifier.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }

    /// Position of the class within the catalog's declaration list.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Named terrain category such as `Interior` or `Exterior`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerrainClass {
    id: TerrainClassId,
    name: String,
}

impl TerrainClass {
    /// Creates a terrain class with the provided identifier and name.
    #[must_use]
    pub fn new(id: TerrainClassId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Identifier assigned to the class at catalog load.
    #[must_use]
    pub const fn id(&self) -> TerrainClassId {
        self.id
    }

    /// Name declared by the authoring tool.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One of the four corners of a map cell.
///
/// Corners are always listed in the order used by Tiled terrain vectors:
/// top-left, top-right, bottom-left, bottom-right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Corner {
    /// Corner at the smallest column and row.
    TopLeft,
    /// Corner at the largest column and smallest row.
    TopRight,
    /// Corner at the smallest column and largest row.
    BottomLeft,
    /// Corner at the largest column and row.
    BottomRight,
}

impl Corner {
    /// Every corner in canonical vector order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Position of the corner inside a terrain vector or corner signature.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::TopLeft => 0,
            Self::TopRight => 1,
            Self::BottomLeft => 2,
            Self::BottomRight => 3,
        }
    }

    /// Column and row offsets of the four cells that share this corner,
    /// expressed relative to the cell that owns it.
    #[must_use]
    pub const fn sharing_offsets(self) -> [(i32, i32); 4] {
        match self {
            Self::TopLeft => [(-1, -1), (0, -1), (-1, 0), (0, 0)],
            Self::TopRight => [(0, -1), (1, -1), (0, 0), (1, 0)],
            Self::BottomLeft => [(-1, 0), (0, 0), (-1, 1), (0, 1)],
            Self::BottomRight => [(0, 0), (1, 0), (0, 1), (1, 1)],
        }
    }
}

/// Resolved terrain classes at the four corners of a cell.
///
/// The signature is the lookup key used to select a tile: a tile matches
/// exactly when its [`TerrainVector`] carries the same class at every corner,
/// compared position by position without rotation or reflection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CornerSignature([TerrainClassId; 4]);

impl CornerSignature {
    /// Creates a signature from the individual corner classes.
    #[must_use]
    pub const fn new(
        top_left: TerrainClassId,
        top_right: TerrainClassId,
        bottom_left: TerrainClassId,
        bottom_right: TerrainClassId,
    ) -> Self {
        Self([top_left, top_right, bottom_left, bottom_right])
    }

    /// Creates a signature where every corner carries the same class.
    #[must_use]
    pub const fn uniform(class: TerrainClassId) -> Self {
        Self([class; 4])
    }

    /// Creates a signature from an array laid out in [`Corner::ALL`] order.
    #[must_use]
    pub const fn from_array(corners: [TerrainClassId; 4]) -> Self {
        Self(corners)
    }

    /// Class resolved at the requested corner.
    #[must_use]
    pub const fn corner(&self, corner: Corner) -> TerrainClassId {
        self.0[corner.index()]
    }

    /// Corner classes in [`Corner::ALL`] order.
    #[must_use]
    pub const fn as_array(&self) -> [TerrainClassId; 4] {
        self.0
    }
}

/// Terrain corner vector declared by a catalog tile.
///
/// Individual entries may be unset when the authoring tool only assigned part
/// of the tile to the autotiling scheme. Unset entries never match a class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerrainVector([Option<TerrainClassId>; 4]);

impl TerrainVector {
    /// Creates a vector from entries laid out in [`Corner::ALL`] order.
    #[must_use]
    pub const fn new(corners: [Option<TerrainClassId>; 4]) -> Self {
        Self(corners)
    }

    /// Creates a fully assigned vector.
    #[must_use]
    pub const fn complete(
        top_left: TerrainClassId,
        top_right: TerrainClassId,
        bottom_left: TerrainClassId,
        bottom_right: TerrainClassId,
    ) -> Self {
        Self([
            Some(top_left),
            Some(top_right),
            Some(bottom_left),
            Some(bottom_right),
        ])
    }

    /// Class declared at the requested corner, if any.
    #[must_use]
    pub const fn corner(&self, corner: Corner) -> Option<TerrainClassId> {
        self.0[corner.index()]
    }

    /// Entries in [`Corner::ALL`] order.
    #[must_use]
    pub const fn as_array(&self) -> [Option<TerrainClassId>; 4] {
        self.0
    }

    /// Reports whether no corner carries a class.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// Returns the signature this vector matches exactly, if every corner is set.
    #[must_use]
    pub fn signature(&self) -> Option<CornerSignature> {
        let [a, b, c, d] = self.0;
        Some(CornerSignature::new(a?, b?, c?, d?))
    }

    /// Returns the class shared by all four corners, if there is one.
    #[must_use]
    pub fn uniform_class(&self) -> Option<TerrainClassId> {
        let first = self.0[0]?;
        self.0
            .iter()
            .all(|entry| *entry == Some(first))
            .then_some(first)
    }

    /// Counts the corners at which this vector disagrees with the signature.
    ///
    /// Unset entries always count as a mismatch.
    #[must_use]
    pub fn mismatches(&self, signature: &CornerSignature) -> u8 {
        let mut count = 0;
        for corner in Corner::ALL {
            if self.corner(corner) != Some(signature.corner(corner)) {
                count += 1;
            }
        }
        count
    }
}

/// Cardinal directions used for actor steps and connector codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in connector code order (`u`, `d`, `l`, `r`).
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    const fn bit(self) -> u8 {
        match self {
            Self::North => 0b0001,
            Self::South => 0b0010,
            Self::West => 0b0100,
            Self::East => 0b1000,
        }
    }

    const fn code(self) -> char {
        match self {
            Self::North => 'u',
            Self::South => 'd',
            Self::West => 'l',
            Self::East => 'r',
        }
    }

    const fn from_code(code: char) -> Option<Self> {
        match code {
            'u' => Some(Self::North),
            'd' => Some(Self::South),
            'l' => Some(Self::West),
            'r' => Some(Self::East),
            _ => None,
        }
    }
}

/// Set of sides a tile connects to, declared through the `c` property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connector(u8);

impl Connector {
    /// Connector that joins no side.
    pub const EMPTY: Connector = Connector(0);

    /// Parses a connector code made of the letters `u`, `d`, `l` and `r`.
    ///
    /// Letters may appear in any order but at most once. Returns `None` for
    /// any other character or a repeated letter.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let mut connector = Self::EMPTY;
        for letter in code.trim().chars() {
            let direction = Direction::from_code(letter)?;
            if connector.contains(direction) {
                return None;
            }
            connector = connector.with(direction);
        }
        Some(connector)
    }

    /// Returns a copy of the connector that also joins the provided side.
    #[must_use]
    pub const fn with(self, direction: Direction) -> Self {
        Self(self.0 | direction.bit())
    }

    /// Reports whether the connector joins the provided side.
    #[must_use]
    pub const fn contains(&self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Number of joined sides.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.0.count_ones()
    }

    /// Reports whether the connector joins no side.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Canonical code for the connector, letters in `udlr` order.
    #[must_use]
    pub fn code(&self) -> String {
        Direction::ALL
            .iter()
            .filter(|direction| self.contains(**direction))
            .map(|direction| direction.code())
            .collect()
    }
}

/// Formation position number, always within `1..=MAX_SLOTS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotIndex(u8);

impl SlotIndex {
    /// Creates a slot index, rejecting values outside `1..=MAX_SLOTS`.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= 1 && value <= MAX_SLOTS {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Retrieves the one-based slot number.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Side of a battle a slot marker seats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotKind {
    /// Slot reserved for a member of the player's party.
    Player,
    /// Slot reserved for a monster from the encounter roster.
    Monster,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "player_slot"),
            Self::Monster => write!(f, "monster_slot"),
        }
    }
}

/// Identifier of an encounter, e.g. `P-easy-01`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncounterId(String);

impl EncounterId {
    /// Creates a new encounter identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EncounterId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EncounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Discriminant of a [`TileTag`], used for catalog scans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// Tiles depicting a named character.
    Character,
    /// Tiles that carry an encounter reference, bare or on a character.
    Encounter,
    /// Player formation markers.
    PlayerSlot,
    /// Monster formation markers.
    MonsterSlot,
}

/// Semantic tag attached to a tile.
///
/// Tags are mutually exclusive; a character may additionally reference the
/// encounter it starts when touched.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileTag {
    /// Tile depicting a named character.
    Character {
        /// Character name declared by the tileset.
        name: String,
        /// Encounter triggered by touching the character, if any.
        encounter: Option<EncounterId>,
    },
    /// Bare encounter trigger.
    Encounter(EncounterId),
    /// Player formation marker.
    PlayerSlot(SlotIndex),
    /// Monster formation marker.
    MonsterSlot(SlotIndex),
}

impl TileTag {
    /// Reports whether the tag matches the provided kind.
    ///
    /// Characters that reference an encounter match both
    /// [`TagKind::Character`] and [`TagKind::Encounter`].
    #[must_use]
    pub fn is_kind(&self, kind: TagKind) -> bool {
        match (self, kind) {
            (Self::Character { .. }, TagKind::Character) => true,
            (Self::Character { encounter, .. }, TagKind::Encounter) => encounter.is_some(),
            (Self::Encounter(_), TagKind::Encounter) => true,
            (Self::PlayerSlot(_), TagKind::PlayerSlot) => true,
            (Self::MonsterSlot(_), TagKind::MonsterSlot) => true,
            _ => false,
        }
    }

    /// Encounter referenced by the tag, if any.
    #[must_use]
    pub fn encounter(&self) -> Option<&EncounterId> {
        match self {
            Self::Character { encounter, .. } => encounter.as_ref(),
            Self::Encounter(id) => Some(id),
            Self::PlayerSlot(_) | Self::MonsterSlot(_) => None,
        }
    }

    /// Slot side and number for formation markers.
    #[must_use]
    pub fn slot(&self) -> Option<(SlotKind, SlotIndex)> {
        match self {
            Self::PlayerSlot(index) => Some((SlotKind::Player, *index)),
            Self::MonsterSlot(index) => Some((SlotKind::Monster, *index)),
            Self::Character { .. } | Self::Encounter(_) => None,
        }
    }

    /// Reports whether entering a cell with this tag raises a trigger.
    #[must_use]
    pub fn is_trigger(&self) -> bool {
        matches!(self, Self::Character { .. } | Self::Encounter(_))
    }
}

/// Immutable tile definition held by a catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    id: TileId,
    terrain: Option<TerrainVector>,
    connector: Option<Connector>,
    tag: Option<TileTag>,
}

impl Tile {
    /// Creates an untagged tile with no terrain participation.
    #[must_use]
    pub const fn new(id: TileId) -> Self {
        Self {
            id,
            terrain: None,
            connector: None,
            tag: None,
        }
    }

    /// Attaches a terrain vector. Empty vectors are dropped.
    #[must_use]
    pub fn with_terrain(mut self, terrain: TerrainVector) -> Self {
        self.terrain = (!terrain.is_empty()).then_some(terrain);
        self
    }

    /// Attaches a connector code.
    #[must_use]
    pub const fn with_connector(mut self, connector: Connector) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Attaches a semantic tag.
    #[must_use]
    pub fn with_tag(mut self, tag: TileTag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Identifier of the tile.
    #[must_use]
    pub const fn id(&self) -> TileId {
        self.id
    }

    /// Terrain vector used for autotiling, if the tile participates.
    #[must_use]
    pub const fn terrain(&self) -> Option<&TerrainVector> {
        self.terrain.as_ref()
    }

    /// Connector code declared by the tile.
    #[must_use]
    pub const fn connector(&self) -> Option<Connector> {
        self.connector
    }

    /// Semantic tag declared by the tile.
    #[must_use]
    pub const fn tag(&self) -> Option<&TileTag> {
        self.tag.as_ref()
    }
}

/// Location of a single map cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Applies a signed offset, returning `None` when either axis would go
    /// negative or overflow. Upper bounds are left to the caller.
    #[must_use]
    pub fn offset(self, columns: i32, rows: i32) -> Option<CellCoord> {
        let column = self.column.checked_add_signed(columns)?;
        let row = self.row.checked_add_signed(rows)?;
        Some(CellCoord::new(column, row))
    }

    /// Neighbouring cell one step in the provided direction.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => self.offset(0, -1),
            Direction::East => self.offset(1, 0),
            Direction::South => self.offset(0, 1),
            Direction::West => self.offset(-1, 0),
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Reports whether the rectangle covers the provided cell.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        let column = cell.column() as u64;
        let row = cell.row() as u64;
        let left = self.origin.column() as u64;
        let top = self.origin.row() as u64;
        column >= left
            && row >= top
            && column < left + self.size.width() as u64
            && row < top + self.size.height() as u64
    }

    /// Part of the rectangle inside a `columns` x `rows` grid anchored at
    /// the origin. Empty when the two do not overlap.
    #[must_use]
    pub fn clipped_to(&self, columns: u32, rows: u32) -> Self {
        let left = self.origin.column().min(columns);
        let top = self.origin.row().min(rows);
        let right = self
            .origin
            .column()
            .saturating_add(self.size.width())
            .min(columns);
        let bottom = self
            .origin
            .row()
            .saturating_add(self.size.height())
            .min(rows);
        Self::from_origin_and_size(
            CellCoord::new(left, top),
            CellRectSize::new(right.saturating_sub(left), bottom.saturating_sub(top)),
        )
    }

    /// Cells covered by the rectangle in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let size = self.size;
        (0..size.height()).flat_map(move |dy| {
            (0..size.width()).filter_map(move |dx| {
                let column = origin.column().checked_add(dx)?;
                let row = origin.row().checked_add(dy)?;
                Some(CellCoord::new(column, row))
            })
        })
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Unique identifier assigned to a movable actor on a map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Difficulty tier of an encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Introductory encounters.
    Easy,
    /// Regular encounters.
    Normal,
    /// Demanding encounters.
    Hard,
    /// Set-piece encounters.
    Boss,
}

/// Monster archetype and level listed in an encounter roster.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonsterEntry {
    archetype: String,
    level: u32,
}

impl MonsterEntry {
    /// Creates a roster entry.
    #[must_use]
    pub fn new(archetype: impl Into<String>, level: u32) -> Self {
        Self {
            archetype: archetype.into(),
            level,
        }
    }

    /// Archetype the combat layer instantiates.
    #[must_use]
    pub fn archetype(&self) -> &str {
        &self.archetype
    }

    /// Level the monster is instantiated at.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }
}

/// Battle definition registered under an [`EncounterId`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterDefinition {
    difficulty: Difficulty,
    roster: Vec<MonsterEntry>,
    experience: u32,
    drops: Vec<String>,
}

impl EncounterDefinition {
    /// Creates a definition with the provided tier and ordered roster.
    #[must_use]
    pub fn new(difficulty: Difficulty, roster: Vec<MonsterEntry>) -> Self {
        Self {
            difficulty,
            roster,
            experience: 0,
            drops: Vec::new(),
        }
    }

    /// Attaches the rewards granted when the encounter is won.
    #[must_use]
    pub fn with_rewards(mut self, experience: u32, drops: Vec<String>) -> Self {
        self.experience = experience;
        self.drops = drops;
        self
    }

    /// Difficulty tier of the encounter.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Monsters in roster order.
    #[must_use]
    pub fn roster(&self) -> &[MonsterEntry] {
        &self.roster
    }

    /// Experience awarded on victory.
    #[must_use]
    pub const fn experience(&self) -> u32 {
        self.experience
    }

    /// Item drops awarded on victory.
    #[must_use]
    pub fn drops(&self) -> &[String] {
        &self.drops
    }
}

/// Member of the player's party seated in player slots.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyMember(String);

impl PartyMember {
    /// Creates a party member with the provided character name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Character name of the member.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Entity seated in a formation slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupant {
    /// Member of the player's party.
    Party(PartyMember),
    /// Monster drawn from the encounter roster.
    Monster(MonsterEntry),
}

/// Slot marker found on a map, as reported by the world's region query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotMarker {
    /// Side of the battle the marker seats.
    pub kind: SlotKind,
    /// Slot number declared by the marker tile.
    pub index: SlotIndex,
    /// Cell holding the marker tile.
    pub cell: CellCoord,
}

/// Single declared position within a [`Formation`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormationSlot {
    /// Side of the battle the slot belongs to.
    pub kind: SlotKind,
    /// Slot number declared by the marker tile.
    pub index: SlotIndex,
    /// Cell holding the marker tile.
    pub cell: CellCoord,
    /// Entity seated in the slot, if any.
    pub occupant: Option<Occupant>,
}

/// Transient mapping from slot positions to occupants for one battle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formation {
    slots: Vec<FormationSlot>,
}

impl Formation {
    /// Creates a formation, ordering slots by side then slot number.
    #[must_use]
    pub fn from_slots(mut slots: Vec<FormationSlot>) -> Self {
        slots.sort_by_key(|slot| (slot.kind, slot.index));
        Self { slots }
    }

    /// Iterator over every declared slot in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &FormationSlot> {
        self.slots.iter()
    }

    /// Looks up a declared slot.
    #[must_use]
    pub fn slot(&self, kind: SlotKind, index: SlotIndex) -> Option<&FormationSlot> {
        self.slots
            .iter()
            .find(|slot| slot.kind == kind && slot.index == index)
    }

    /// Occupant seated at the requested slot, if the slot exists and is taken.
    #[must_use]
    pub fn occupant(&self, kind: SlotKind, index: SlotIndex) -> Option<&Occupant> {
        self.slot(kind, index)
            .and_then(|slot| slot.occupant.as_ref())
    }

    /// Number of slots that seat an occupant.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.occupant.is_some())
            .count()
    }

    /// Number of declared slots, occupied or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Reports whether the formation declares no slots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Consumes the formation, yielding the underlying slots.
    #[must_use]
    pub fn into_vec(self) -> Vec<FormationSlot> {
        self.slots
    }
}

/// Commands that express all permissible map mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Assigns a terrain class to a cell and re-resolves the affected tiles.
    PaintTerrain {
        /// Cell receiving the class.
        cell: CellCoord,
        /// Class painted onto the cell.
        class: TerrainClassId,
    },
    /// Removes the terrain class from a cell. The cell keeps its last tile.
    EraseTerrain {
        /// Cell losing its class.
        cell: CellCoord,
    },
    /// Places or clears a tile on the marker layer.
    PlaceMarker {
        /// Cell receiving the marker.
        cell: CellCoord,
        /// Marker tile, or `None` to clear the cell.
        tile: Option<TileId>,
    },
    /// Places a new movable actor on the map.
    SpawnActor {
        /// Cell the actor starts in.
        cell: CellCoord,
    },
    /// Moves an actor a single cell in the provided direction.
    StepActor {
        /// Actor attempting to move.
        actor: ActorId,
        /// Direction of travel.
        direction: Direction,
    },
    /// Reports that an externally simulated actor entered a cell.
    ActorEntered {
        /// Cell that was entered.
        cell: CellCoord,
    },
}

/// Events broadcast by the map after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a cell's terrain class changed.
    TerrainPainted {
        /// Cell whose class changed.
        cell: CellCoord,
        /// Class now assigned, or `None` after an erase.
        class: Option<TerrainClassId>,
    },
    /// Announces that terrain resolution selected a new tile for a cell.
    TileResolved {
        /// Cell whose ground tile changed.
        cell: CellCoord,
        /// Tile now rendered at the cell.
        tile: TileId,
    },
    /// Confirms that the marker layer changed.
    MarkerPlaced {
        /// Cell whose marker changed.
        cell: CellCoord,
        /// Marker tile now present, if any.
        tile: Option<TileId>,
    },
    /// Confirms that an actor was placed on the map.
    ActorSpawned {
        /// Identifier allocated to the actor.
        actor: ActorId,
        /// Cell the actor occupies.
        cell: CellCoord,
    },
    /// Confirms that an actor moved between two cells.
    ActorMoved {
        /// Actor that moved.
        actor: ActorId,
        /// Cell occupied before the move.
        from: CellCoord,
        /// Cell occupied after the move.
        to: CellCoord,
    },
    /// Announces that an entered cell carries a trigger tile.
    Triggered {
        /// Cell that was entered.
        cell: CellCoord,
        /// Tag carried by the trigger tile.
        tag: TileTag,
        /// Trigger tile identifier.
        tile: TileId,
    },
    /// Reports that a command was rejected and left the map unchanged.
    CommandRejected {
        /// Specific reason the command failed.
        reason: MapError,
    },
}

/// Reasons a map command may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapError {
    /// The referenced cell lies outside the map.
    OutOfBounds,
    /// The painted class is not declared by the catalog.
    UnknownTerrainClass,
    /// No actor with the provided identifier exists.
    UnknownActor,
    /// The placed tile references an unregistered encounter.
    DanglingEncounter,
}

/// Specific defect found while validating a catalog source.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CatalogDefect {
    /// Two terrain classes share a name.
    #[error("terrain class `{0}` is declared more than once")]
    DuplicateTerrainClass(String),
    /// More terrain classes were declared than identifiers can address.
    #[error("{0} terrain classes declared, at most 65536 are supported")]
    TooManyTerrainClasses(usize),
    /// Two tiles share an identifier.
    #[error("tile {0} is declared more than once")]
    DuplicateTileId(TileId),
    /// A terrain vector names a class the catalog never declared.
    #[error("tile {tile} references undefined terrain class `{class}`")]
    UndefinedTerrainClass {
        /// Offending tile.
        tile: TileId,
        /// Class name as written in the source.
        class: String,
    },
    /// A terrain vector does not have exactly four entries.
    #[error("tile {tile} declares {found} terrain corners, expected 4")]
    TerrainArity {
        /// Offending tile.
        tile: TileId,
        /// Number of entries found.
        found: usize,
    },
    /// A slot marker value lies outside `1..=4`.
    #[error("tile {tile} declares {kind} {value}, expected 1..=4")]
    SlotOutOfRange {
        /// Offending tile.
        tile: TileId,
        /// Marker side.
        kind: SlotKind,
        /// Value as written in the source.
        value: i64,
    },
    /// A numeric tag value could not be read as a number.
    #[error("tile {tile} declares `{property}` as `{value}`, expected a number")]
    InvalidTagValue {
        /// Offending tile.
        tile: TileId,
        /// Property name.
        property: &'static str,
        /// Value as written in the source.
        value: String,
    },
    /// A string-valued tag was declared empty.
    #[error("tile {tile} declares an empty `{property}` value")]
    EmptyTagValue {
        /// Offending tile.
        tile: TileId,
        /// Property name.
        property: &'static str,
    },
    /// A tile declares more than one semantic tag.
    #[error("tile {tile} declares more than one semantic tag")]
    ConflictingTags {
        /// Offending tile.
        tile: TileId,
    },
    /// A connector code contains unknown or repeated letters.
    #[error("tile {tile} declares invalid connector code `{code}`")]
    InvalidConnector {
        /// Offending tile.
        tile: TileId,
        /// Code as written in the source.
        code: String,
    },
}

/// Load-time validation failures. No partially loaded data is ever used.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The catalog source failed validation.
    #[error("malformed catalog: {0}")]
    MalformedCatalog(#[from] CatalogDefect),
    /// An encounter identifier was registered twice.
    #[error("encounter `{0}` is already registered")]
    DuplicateEncounter(EncounterId),
    /// An encounter roster does not fit the available monster slots.
    #[error("encounter `{id}` lists {found} monsters, at most 4 fit a formation")]
    OversizedRoster {
        /// Offending encounter.
        id: EncounterId,
        /// Number of roster entries.
        found: usize,
    },
    /// A tile references an encounter that was never registered.
    #[error("tile {tile} references unregistered encounter `{encounter}`")]
    DanglingEncounterReference {
        /// Tile carrying the reference.
        tile: TileId,
        /// Missing encounter.
        encounter: EncounterId,
    },
    /// The map layout is inconsistent with its declared dimensions or catalog.
    #[error("malformed map: {0}")]
    MalformedMap(String),
}

/// Runtime failures raised while dispatching a triggered encounter.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The requested encounter is not registered.
    #[error("encounter `{0}` is not registered")]
    UnknownEncounter(EncounterId),
    /// The region does not declare enough slots for the occupants.
    #[error("region declares {available} {kind} markers but {required} occupants need seats")]
    InsufficientSlots {
        /// Side that ran out of slots.
        kind: SlotKind,
        /// Occupants that needed a seat.
        required: usize,
        /// Markers declared in the region.
        available: usize,
    },
    /// The region declares the same slot number twice for one side.
    #[error("{kind} {index} is declared more than once in the region")]
    DuplicateSlotIndex {
        /// Side with the duplicate.
        kind: SlotKind,
        /// Duplicated slot number.
        index: SlotIndex,
    },
}
