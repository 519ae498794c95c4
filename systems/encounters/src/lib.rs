#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Registry of battle definitions keyed by encounter identifier.
//!
//! The registry is filled once while loading and is read-only afterwards, so a
//! single instance can be shared by every simulated map.

mod table;

use std::collections::{btree_map::Entry, BTreeMap, BTreeSet};

use campaign_trail_catalog::TileCatalog;
use campaign_trail_core::{
    DispatchError, EncounterDefinition, EncounterId, LoadError, MAX_SLOTS,
};
use tracing::{debug, warn};

pub use table::{EncounterSource, EncounterTable};

/// Immutable lookup from encounter identifier to battle definition.
#[derive(Clone, Debug, Default)]
pub struct EncounterRegistry {
    definitions: BTreeMap<EncounterId, EncounterDefinition>,
}

impl EncounterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every declaration of the table in authoring order.
    pub fn from_table(table: &EncounterTable) -> Result<Self, LoadError> {
        let mut registry = Self::new();
        for source in &table.encounters {
            registry.register(EncounterId::new(source.id.as_str()), source.definition())?;
        }
        debug!(encounters = registry.len(), "encounter registry loaded");
        Ok(registry)
    }

    /// Adds a definition.
    ///
    /// An already registered id keeps its original definition.
    pub fn register(
        &mut self,
        id: EncounterId,
        definition: EncounterDefinition,
    ) -> Result<(), LoadError> {
        let found = definition.roster().len();
        if found > usize::from(MAX_SLOTS) {
            return Err(LoadError::OversizedRoster { id, found });
        }

        match self.definitions.entry(id) {
            Entry::Occupied(entry) => Err(LoadError::DuplicateEncounter(entry.key().clone())),
            Entry::Vacant(entry) => {
                let _ = entry.insert(definition);
                Ok(())
            }
        }
    }

    /// Looks up the definition registered under `id`.
    pub fn resolve(&self, id: &str) -> Result<&EncounterDefinition, DispatchError> {
        self.definitions
            .get(id)
            .ok_or_else(|| DispatchError::UnknownEncounter(EncounterId::new(id)))
    }

    /// Reports whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Checks that every encounter referenced by the catalog is registered.
    ///
    /// Registered encounters that no tile references are reported at warn
    /// level but are not an error.
    pub fn validate_catalog(&self, catalog: &TileCatalog) -> Result<(), LoadError> {
        let mut referenced = BTreeSet::new();
        for (tile, encounter) in catalog.encounter_references() {
            if !self.contains(encounter.as_str()) {
                return Err(LoadError::DanglingEncounterReference {
                    tile,
                    encounter: encounter.clone(),
                });
            }
            let _ = referenced.insert(encounter);
        }

        for id in self.definitions.keys() {
            if !referenced.contains(id) {
                warn!(encounter = %id, "encounter is not referenced by any tile");
            }
        }
        Ok(())
    }

    /// Registered definitions in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (&EncounterId, &EncounterDefinition)> {
        self.definitions.iter()
    }

    /// Number of registered encounters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Reports whether no encounter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
