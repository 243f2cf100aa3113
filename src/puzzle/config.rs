//! Puzzle instance: species, safety relationships and shuttle capacity

use crate::error::CompileError;
use crate::transport::Threat;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named group of individuals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    pub count: u32,
}

impl Species {
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// `predator` must never outnumber `prey` on a bank where prey is present
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub predator: String,
    pub prey: String,
}

impl Relationship {
    pub fn new(predator: impl Into<String>, prey: impl Into<String>) -> Self {
        Self {
            predator: predator.into(),
            prey: prey.into(),
        }
    }
}

/// A complete puzzle instance, in its boundary wire shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleConfig {
    pub species: Vec<Species>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(rename = "starshipCapacity")]
    pub capacity: u32,
}

impl PuzzleConfig {
    pub fn new(species: Vec<Species>, relationships: Vec<Relationship>, capacity: u32) -> Self {
        Self {
            species,
            relationships,
            capacity,
        }
    }

    /// Check every structural invariant
    pub fn validate(&self) -> Result<(), CompileError> {
        self.resolve_threats().map(|_| ())
    }

    /// Validates the config and maps relationships onto species indices
    pub fn resolve_threats(&self) -> Result<Vec<Threat>, CompileError> {
        if self.species.is_empty() {
            return Err(CompileError::NoSpecies);
        }
        if self.capacity == 0 {
            return Err(CompileError::ZeroCapacity);
        }

        let mut seen = HashSet::new();
        for species in &self.species {
            if !is_identifier(&species.name) {
                return Err(CompileError::InvalidName(species.name.clone()));
            }
            if !seen.insert(species.name.as_str()) {
                return Err(CompileError::DuplicateSpecies(species.name.clone()));
            }
        }

        let mut pairs = HashSet::new();
        let mut threats = Vec::with_capacity(self.relationships.len());
        for rel in &self.relationships {
            let predator = self
                .species_index(&rel.predator)
                .ok_or_else(|| CompileError::UnknownSpecies(rel.predator.clone()))?;
            let prey = self
                .species_index(&rel.prey)
                .ok_or_else(|| CompileError::UnknownSpecies(rel.prey.clone()))?;

            if predator == prey {
                return Err(CompileError::SelfRelationship(rel.predator.clone()));
            }
            if !pairs.insert((predator, prey)) {
                return Err(CompileError::DuplicateRelationship {
                    predator: rel.predator.clone(),
                    prey: rel.prey.clone(),
                });
            }
            threats.push(Threat { predator, prey });
        }

        Ok(threats)
    }

    pub fn species_index(&self, name: &str) -> Option<usize> {
        self.species.iter().position(|s| s.name == name)
    }

    pub fn species_names(&self) -> Vec<String> {
        self.species.iter().map(|s| s.name.clone()).collect()
    }

    pub fn initial_counts(&self) -> Vec<u32> {
        self.species.iter().map(|s| s.count).collect()
    }

    pub fn total_individuals(&self) -> u64 {
        self.species.iter().map(|s| s.count as u64).sum()
    }

    /// Number of distinct states: every start-bank count times two shuttle sides
    pub fn state_space_size(&self) -> u128 {
        self.species
            .iter()
            .fold(2u128, |acc, s| acc.saturating_mul(s.count as u128 + 1))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Letters, digits and underscores, not starting with a digit
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
