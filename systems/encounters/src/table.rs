use campaign_trail_core::{Difficulty, EncounterDefinition, MonsterEntry};
use serde::{Deserialize, Serialize};

/// Encounter declarations as authored in an encounter file.
///
/// In TOML every entry is an `[[encounter]]` table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterTable {
    /// Declarations in authoring order.
    #[serde(default, rename = "encounter")]
    pub encounters: Vec<EncounterSource>,
}

/// Single encounter declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterSource {
    /// Identifier referenced by tile `encounter` properties.
    pub id: String,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Monsters in roster order.
    #[serde(default)]
    pub monsters: Vec<MonsterEntry>,
    /// Experience awarded on victory.
    #[serde(default)]
    pub xp: u32,
    /// Items dropped on victory.
    #[serde(default)]
    pub drops: Vec<String>,
}

impl EncounterSource {
    /// Converts the declaration into a registry definition.
    #[must_use]
    pub fn definition(&self) -> EncounterDefinition {
        EncounterDefinition::new(self.difficulty, self.monsters.clone())
            .with_rewards(self.xp, self.drops.clone())
    }
}
