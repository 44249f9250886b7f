//! RNG oracle for deterministic random rolls.
//!
//! Monster target picks, skill target picks and effect-application rolls all
//! draw from one [`RollStream`] per battle. Given the same battle seed and the
//! same sequence of commands, a battle replays identically.
use std::sync::Arc;

/// Deterministic random number source.
///
/// Implementations must produce the same value for the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a d100 (1-100 inclusive).
    fn roll_d100(&self, seed: u64) -> u32 {
        (self.next_u32(seed) % 100) + 1
    }

    /// Generate a random value in range [min, max] inclusive.
    fn range(&self, seed: u64, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let range = max - min + 1;
        min + (self.next_u32(seed) % range)
    }
}

/// PCG-XSH-RR generator: 64-bit state, 32-bit output.
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Derives a per-roll seed from the battle seed and a roll counter.
///
/// `context` separates independent rolls made for the same nonce
/// (e.g. `0` for target picks, `1` for effect chances).
pub fn compute_seed(battle_seed: u64, nonce: u64, context: u32) -> u64 {
    let mut hash = battle_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    // avalanche
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

const CONTEXT_PICK: u32 = 0;
const CONTEXT_CHANCE: u32 = 1;

/// Stateful stream of rolls over a stateless [`RngOracle`].
#[derive(Clone)]
pub struct RollStream {
    oracle: Arc<dyn RngOracle>,
    seed: u64,
    nonce: u64,
}

impl RollStream {
    pub fn new(oracle: Arc<dyn RngOracle>, seed: u64) -> Self {
        Self {
            oracle,
            seed,
            nonce: 0,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Arc::new(PcgRng), seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of rolls drawn so far.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    fn next_seed(&mut self, context: u32) -> u64 {
        let seed = compute_seed(self.seed, self.nonce, context);
        self.nonce += 1;
        seed
    }

    /// True with `percent`% probability. `0` never, `100` or more always;
    /// neither extreme consumes a roll.
    pub fn chance(&mut self, percent: u8) -> bool {
        match percent {
            0 => false,
            p if p >= 100 => true,
            p => {
                let seed = self.next_seed(CONTEXT_CHANCE);
                self.oracle.roll_d100(seed) <= u32::from(p)
            }
        }
    }

    /// Uniform index in `0..len`, or `None` when `len == 0`.
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let seed = self.next_seed(CONTEXT_PICK);
        let max = u32::try_from(len - 1).unwrap_or(u32::MAX);
        Some(self.oracle.range(seed, 0, max) as usize)
    }

    /// Up to `count` distinct indices from `0..len`, uniformly chosen
    /// (partial Fisher-Yates).
    pub fn choose_up_to(&mut self, len: usize, count: usize) -> Vec<usize> {
        let mut pool: Vec<usize> = (0..len).collect();
        let take = count.min(len);
        for i in 0..take {
            if let Some(offset) = self.pick_index(len - i) {
                pool.swap(i, i + offset);
            }
        }
        pool.truncate(take);
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RollStream::seeded(42);
        let mut b = RollStream::seeded(42);
        let left: Vec<_> = (0..16).filter_map(|_| a.pick_index(7)).collect();
        let right: Vec<_> = (0..16).filter_map(|_| b.pick_index(7)).collect();
        assert_eq!(left, right);
        assert!(left.iter().all(|&i| i < 7));
    }

    #[test]
    fn chance_extremes_do_not_roll() {
        let mut rolls = RollStream::seeded(7);
        assert!(!rolls.chance(0));
        assert!(rolls.chance(100));
        assert_eq!(rolls.nonce(), 0);
    }

    #[test]
    fn choose_up_to_returns_distinct_indices() {
        let mut rolls = RollStream::seeded(99);
        let mut picked = rolls.choose_up_to(5, 3);
        assert_eq!(picked.len(), 3);
        picked.sort_unstable();
        picked.dedup();
        assert_eq!(picked.len(), 3);
        assert!(picked.iter().all(|&i| i < 5));

        assert_eq!(rolls.choose_up_to(2, 10).len(), 2);
        assert!(rolls.choose_up_to(0, 3).is_empty());
    }
}
