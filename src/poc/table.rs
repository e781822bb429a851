use rustc_hash::FxHashMap;

use crate::ticks::{OrderflowError, Price};

/// Accumulated volume at one price, with the order it entered the day's table
#[derive(Debug, Clone, Copy)]
struct Level {
    inserted: u64,
    volume: u64,
}

/// Current POC: price, insertion order and volume
#[derive(Debug, Clone, Copy)]
struct Leader {
    price: Price,
    inserted: u64,
    volume: u64,
}

/// Price to accumulated volume for a single trading day, with a leader pointer.
///
/// The leader is the price with the most volume; among equal volumes the price
/// inserted earliest in the day wins. Volumes only grow and each update touches
/// one level, so comparing that level against the leader keeps updates O(1).
#[derive(Debug, Clone, Default)]
pub struct DailyPocTable {
    levels: FxHashMap<Price, Level>,
    next_insert: u64,
    leader: Option<Leader>,
}

impl DailyPocTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the table and start a new day from a single print
    pub fn seed(&mut self, price: Price, volume: u64) {
        self.levels.clear();
        self.levels.insert(price, Level { inserted: 0, volume });
        self.next_insert = 1;
        self.leader = Some(Leader { price, inserted: 0, volume });
    }

    /// Add volume at a price and return the current POC
    pub fn add(&mut self, price: Price, volume: u64) -> Result<Price, OrderflowError> {
        let next_insert = &mut self.next_insert;
        let level = self.levels.entry(price).or_insert_with(|| {
            let level = Level { inserted: *next_insert, volume: 0 };
            *next_insert += 1;
            level
        });
        level.volume = level.volume.checked_add(volume).ok_or_else(|| {
            OrderflowError::invalid(format!("accumulated volume at {} overflows", price))
        })?;
        let candidate = Leader { price, inserted: level.inserted, volume: level.volume };

        let takes_lead = match self.leader {
            None => true,
            Some(lead) => {
                candidate.volume > lead.volume
                    || (candidate.volume == lead.volume && candidate.inserted < lead.inserted)
            }
        };
        if takes_lead || self.leader.map(|lead| lead.price) == Some(price) {
            self.leader = Some(candidate);
        }

        Ok(self.leader.map(|lead| lead.price).unwrap_or(price))
    }

    pub fn poc(&self) -> Option<Price> {
        self.leader.map(|lead| lead.price)
    }

    pub fn volume_at(&self, price: Price) -> u64 {
        self.levels.get(&price).map(|level| level.volume).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn clear(&mut self) {
        self.levels.clear();
        self.next_insert = 0;
        self.leader = None;
    }
}
