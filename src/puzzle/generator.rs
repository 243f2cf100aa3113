//! Random puzzle generation

use super::{PuzzleConfig, Relationship, Species};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

const NAME_LEN: usize = 5;
const MAX_RELATIONSHIP_ATTEMPTS: usize = 1000;

pub const DEFAULT_MIN_COUNT: u32 = 1;
pub const DEFAULT_MAX_COUNT: u32 = 4;

/// Size parameters for a generated puzzle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorParams {
    pub species: usize,
    /// Same count for every species; each count is drawn from
    /// `min_count..=max_count` when absent
    pub individuals: Option<u32>,
    pub min_count: u32,
    pub max_count: u32,
    pub relationships: usize,
    /// Derived from the population by `capacity_mode` when absent
    pub capacity: Option<u32>,
    pub capacity_mode: CapacityMode,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            species: 3,
            individuals: None,
            min_count: DEFAULT_MIN_COUNT,
            max_count: DEFAULT_MAX_COUNT,
            relationships: 2,
            capacity: None,
            capacity_mode: CapacityMode::Auto,
        }
    }
}

/// How to pick a capacity when none is given explicitly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityMode {
    Auto,
    Tight,
    Generous,
}

impl CapacityMode {
    pub fn capacity_for<R: Rng>(self, total_individuals: u32, rng: &mut R) -> u32 {
        match self {
            CapacityMode::Auto => {
                let low = (total_individuals / 4).max(1);
                let high = (total_individuals / 2).max(2);
                rng.gen_range(low..=high)
            }
            CapacityMode::Tight => (total_individuals / 6).max(1),
            CapacityMode::Generous => (total_individuals / 2).max(2),
        }
    }
}

/// Produces random `PuzzleConfig`s
pub struct ConfigGenerator<R: Rng = StdRng> {
    rng: R,
}

impl ConfigGenerator<StdRng> {
    /// Reproducible generator
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> ConfigGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Generate a puzzle. May return fewer relationships than requested.
    pub fn generate(&mut self, params: &GeneratorParams) -> PuzzleConfig {
        let species: Vec<Species> = (0..params.species)
            .map(|_| {
                let name = self.random_name();
                Species::new(name, self.species_count(params))
            })
            .collect();

        let capacity = match params.capacity {
            Some(capacity) => capacity,
            None => {
                let total: u64 = species.iter().map(|s| s.count as u64).sum();
                let total = u32::try_from(total).unwrap_or(u32::MAX);
                params.capacity_mode.capacity_for(total, &mut self.rng)
            }
        };

        let relationships = self.pick_relationships(&species, params.relationships);
        if relationships.len() < params.relationships {
            warn!(
                requested = params.relationships,
                generated = relationships.len(),
                "relationship attempt budget exhausted"
            );
        }

        debug!(
            species = species.len(),
            relationships = relationships.len(),
            capacity,
            "generated puzzle"
        );

        PuzzleConfig::new(species, relationships, capacity)
    }

    fn species_count(&mut self, params: &GeneratorParams) -> u32 {
        match params.individuals {
            Some(count) => count,
            None => {
                let high = params.max_count.max(params.min_count);
                self.rng.gen_range(params.min_count..=high)
            }
        }
    }

    fn random_name(&mut self) -> String {
        (0..NAME_LEN)
            .map(|_| char::from(b'a' + self.rng.gen_range(0..26u8)))
            .collect()
    }

    fn pick_relationships(&mut self, species: &[Species], wanted: usize) -> Vec<Relationship> {
        let n = species.len();
        let mut chosen = HashSet::new();
        let mut relationships = Vec::with_capacity(wanted);
        if n < 2 {
            return relationships;
        }

        let mut attempts = 0;
        while relationships.len() < wanted && attempts < MAX_RELATIONSHIP_ATTEMPTS {
            attempts += 1;
            let predator = self.rng.gen_range(0..n);
            let prey = self.rng.gen_range(0..n);
            if predator == prey || !chosen.insert((predator, prey)) {
                continue;
            }
            relationships.push(Relationship::new(
                species[predator].name.clone(),
                species[prey].name.clone(),
            ));
        }

        relationships
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(species: usize, relationships: usize) -> GeneratorParams {
        GeneratorParams {
            species,
            individuals: Some(2),
            relationships,
            capacity: Some(2),
            ..GeneratorParams::default()
        }
    }

    #[test]
    fn test_generates_requested_shape() {
        let mut generator = ConfigGenerator::from_seed(7);
        let config = generator.generate(&params(3, 2));

        assert_eq!(config.species.len(), 3);
        assert_eq!(config.relationships.len(), 2);
        assert_eq!(config.capacity, 2);
        for s in &config.species {
            assert_eq!(s.name.len(), 5);
            assert!(s.name.chars().all(|c| c.is_ascii_lowercase()));
            assert_eq!(s.count, 2);
        }
        for r in &config.relationships {
            assert_ne!(r.predator, r.prey);
        }
    }

    #[test]
    fn test_same_seed_same_puzzle() {
        let a = ConfigGenerator::from_seed(42).generate(&params(4, 3));
        let b = ConfigGenerator::from_seed(42).generate(&params(4, 3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_caps_relationships_at_available_pairs() {
        // only 2 ordered pairs exist between 2 species
        let config = ConfigGenerator::from_seed(1).generate(&params(2, 5));
        assert_eq!(config.relationships.len(), 2);

        let config = ConfigGenerator::from_seed(1).generate(&params(1, 3));
        assert!(config.relationships.is_empty());
    }

    #[test]
    fn test_relationship_pairs_are_distinct() {
        let config = ConfigGenerator::from_seed(3).generate(&params(4, 12));
        let unique: HashSet<_> = config.relationships.iter().collect();
        assert_eq!(unique.len(), config.relationships.len());
        assert_eq!(config.relationships.len(), 12);
    }

    #[test]
    fn test_capacity_modes() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(CapacityMode::Tight.capacity_for(12, &mut rng), 2);
        assert_eq!(CapacityMode::Tight.capacity_for(3, &mut rng), 1);
        assert_eq!(CapacityMode::Generous.capacity_for(12, &mut rng), 6);
        assert_eq!(CapacityMode::Generous.capacity_for(2, &mut rng), 2);
        for _ in 0..20 {
            let cap = CapacityMode::Auto.capacity_for(12, &mut rng);
            assert!((3..=6).contains(&cap));
        }
    }

    #[test]
    fn test_capacity_from_mode() {
        let params = GeneratorParams {
            species: 3,
            individuals: Some(4),
            relationships: 1,
            capacity_mode: CapacityMode::Generous,
            ..GeneratorParams::default()
        };
        let config = ConfigGenerator::from_seed(9).generate(&params);
        assert_eq!(config.capacity, 6);
        assert_eq!(config.species.len(), 3);
        assert_eq!(config.relationships.len(), 1);
    }

    #[test]
    fn test_random_counts_within_range() {
        let params = GeneratorParams {
            species: 6,
            min_count: 2,
            max_count: 5,
            ..GeneratorParams::default()
        };
        let config = ConfigGenerator::from_seed(11).generate(&params);
        assert_eq!(config.species.len(), 6);
        assert!(config.species.iter().all(|s| (2..=5).contains(&s.count)));
        assert_eq!(config, ConfigGenerator::from_seed(11).generate(&params));

        let total = config.total_individuals() as u32;
        assert!(config.capacity >= (total / 4).max(1));
        assert!(config.capacity <= (total / 2).max(2));
    }

    #[test]
    fn test_random_counts_vary() {
        let params = GeneratorParams {
            species: 20,
            ..GeneratorParams::default()
        };
        let config = ConfigGenerator::from_seed(5).generate(&params);
        let distinct: HashSet<u32> = config.species.iter().map(|s| s.count).collect();
        assert!(distinct.len() > 1);
        assert!(distinct.iter().all(|c| (DEFAULT_MIN_COUNT..=DEFAULT_MAX_COUNT).contains(c)));
    }
}
