//! Enumeration of legal shuttle moves

use crate::transport::Move;

/// Every legal move of a puzzle, in enumeration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSet {
    moves: Vec<Move>,
    species: usize,
    capacity: u32,
}

impl MoveSet {
    /// All vectors of length `species` with entries in `[0, capacity]` and a
    /// sum in `[1, capacity]`. The first species varies slowest.
    pub fn enumerate(species: usize, capacity: u32) -> Self {
        let mut moves = Vec::new();
        let mut prefix = Vec::with_capacity(species);
        Self::extend(species, capacity, &mut prefix, &mut moves);
        Self {
            moves,
            species,
            capacity,
        }
    }

    fn extend(species: usize, remaining: u32, prefix: &mut Vec<u32>, out: &mut Vec<Move>) {
        if prefix.len() == species {
            if prefix.iter().any(|&a| a > 0) {
                out.push(Move::new(prefix.clone()));
            }
            return;
        }
        for amount in 0..=remaining {
            prefix.push(amount);
            Self::extend(species, remaining - amount, prefix, out);
            prefix.pop();
        }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    pub fn species(&self) -> usize {
        self.species
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Whether `amounts` is a legal move for this puzzle
    pub fn is_legal(&self, amounts: &[u32]) -> bool {
        let total: u64 = amounts.iter().map(|&a| a as u64).sum();
        amounts.len() == self.species && total >= 1 && total <= self.capacity as u64
    }
}

impl<'a> IntoIterator for &'a MoveSet {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

/// Size of the move set without enumerating it: `C(species + capacity, species) - 1`.
/// Saturates at `usize::MAX`.
pub fn move_count(species: usize, capacity: u32) -> usize {
    let n = species as u128;
    let c = capacity as u128;
    let k = n.min(c);
    let mut binomial: u128 = 1;
    for i in 0..k {
        binomial = match binomial.checked_mul(n + c - i) {
            Some(v) => v / (i + 1),
            None => return usize::MAX,
        };
    }
    usize::try_from(binomial - 1).unwrap_or(usize::MAX)
}
