//! # Item Generation
//!
//! Loot rolls: how much gold a pickup is worth and which scrap of lore it reveals.

use crate::config;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lore shown when loot is picked up.
pub const LORE_MESSAGES: [&str; 3] = [
    "The blade whispers of betrayal.",
    "A journal entry: 'They sealed it behind the third door...'",
    "The gem pulses with forgotten sorrow.",
];

/// What a single loot pickup yields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootRoll {
    pub gold: u32,
    pub lore: String,
}

/// Table that loot pickups are rolled against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootTable {
    /// Inclusive minimum gold per pickup
    pub min_gold: u32,
    /// Inclusive maximum gold per pickup
    pub max_gold: u32,
    /// Messages drawn uniformly on pickup
    pub lore: Vec<String>,
}

impl LootTable {
    /// Creates the standard table.
    pub fn new() -> Self {
        Self {
            min_gold: config::GOLD_RANGE.0,
            max_gold: config::GOLD_RANGE.1,
            lore: LORE_MESSAGES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Rolls gold and a lore line.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use undercroft::LootTable;
    ///
    /// let mut rng = StdRng::seed_from_u64(3);
    /// let roll = LootTable::new().roll(&mut rng);
    /// assert!((1..=5).contains(&roll.gold));
    /// ```
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> LootRoll {
        let (lo, hi) = if self.min_gold <= self.max_gold {
            (self.min_gold, self.max_gold)
        } else {
            (self.max_gold, self.min_gold)
        };
        let gold = rng.gen_range(lo..=hi);
        let lore = if self.lore.is_empty() {
            String::new()
        } else {
            self.lore[rng.gen_range(0..self.lore.len())].clone()
        };
        LootRoll { gold, lore }
    }
}

impl Default for LootTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_rolls_stay_in_range() {
        let table = LootTable::new();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let roll = table.roll(&mut rng);
            assert!((1..=5).contains(&roll.gold));
            assert!(LORE_MESSAGES.contains(&roll.lore.as_str()));
        }
    }

    #[test]
    fn test_swapped_bounds_and_empty_lore() {
        let table = LootTable {
            min_gold: 4,
            max_gold: 2,
            lore: Vec::new(),
        };
        let mut rng = StdRng::seed_from_u64(1);
        let roll = table.roll(&mut rng);
        assert!((2..=4).contains(&roll.gold));
        assert!(roll.lore.is_empty());
    }
}
