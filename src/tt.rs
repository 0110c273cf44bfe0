//! Shared, lock-striped transposition table.
//!
//! Entries are grouped into 64-byte clusters of three so a probe touches
//! exactly one cache line. Concurrency needs no locks: each entry packs its
//! key fragment XORed with its payload into one atomic word and the payload
//! itself into a second. A writer updates both words independently; a reader
//! loads both and XORs them back together, and a reader racing a writer in
//! the middle of a store recovers a key fragment that doesn't match anything
//! live, so the torn read is simply treated as a miss — it can never be
//! mistaken for a different position's entry.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use crate::types::Move;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact = 0,
    Lower = 1,
    Upper = 2,
}

impl Bound {
    #[inline]
    const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            1 => Bound::Lower,
            2 => Bound::Upper,
            _ => Bound::Exact,
        }
    }
}

/// A decoded snapshot of a transposition entry, returned by `probe`.
#[derive(Clone, Copy, Debug)]
pub struct TtData {
    pub best_move: Move,
    pub score: i32,
    pub static_eval: i32,
    pub bound: Bound,
    pub depth: i32,
    pub generation: u8,
}

fn pack(data: &TtData) -> u64 {
    let mv = data.best_move.as_u16() as u64;
    let score = (data.score as i16 as u16) as u64;
    let eval = (data.static_eval as i16 as u16) as u64;
    let depth = (data.depth.clamp(0, 255)) as u64;
    let bound = data.bound as u64;
    let gen = (data.generation & 0xFC) as u64;
    mv | (score << 16) | (eval << 32) | (depth << 48) | ((bound | gen) << 56)
}

fn unpack(key_fragment: u32, data: u64) -> TtData {
    let mv = (data & 0xFFFF) as u16;
    let score = ((data >> 16) & 0xFFFF) as u16 as i16;
    let eval = ((data >> 32) & 0xFFFF) as u16 as i16;
    let depth = ((data >> 48) & 0xFF) as i32;
    let tag = ((data >> 56) & 0xFF) as u8;
    let _ = key_fragment;
    TtData {
        best_move: Move::from_u16(mv),
        score: score as i32,
        static_eval: eval as i32,
        bound: Bound::from_bits(tag),
        depth,
        generation: tag & 0xFC,
    }
}

/// One slot in a cluster. 16 bytes: two atomic words, no padding needed
/// beyond natural alignment.
struct AtomicEntry {
    key_xor_data: AtomicU64,
    data: AtomicU64,
}

impl AtomicEntry {
    const fn empty() -> Self {
        AtomicEntry {
            key_xor_data: AtomicU64::new(0),
            data: AtomicU64::new(0),
        }
    }

    fn load(&self) -> Option<(u32, TtData)> {
        let data = self.data.load(Ordering::Relaxed);
        let key_xor = self.key_xor_data.load(Ordering::Relaxed);
        let key_fragment = (key_xor ^ data) as u32;
        if data == 0 && key_xor == 0 {
            return None;
        }
        Some((key_fragment, unpack(key_fragment, data)))
    }

    fn store(&self, key_fragment: u32, data: &TtData) {
        let packed = pack(data);
        self.data.store(packed, Ordering::Relaxed);
        self.key_xor_data
            .store((key_fragment as u64) ^ packed, Ordering::Relaxed);
    }
}

/// Three entries, padded to exactly one 64-byte cache line.
#[repr(align(64))]
struct Cluster {
    entries: [AtomicEntry; 3],
    _padding: [u8; 16],
}

impl Cluster {
    const fn empty() -> Self {
        Cluster {
            entries: [AtomicEntry::empty(), AtomicEntry::empty(), AtomicEntry::empty()],
            _padding: [0; 16],
        }
    }
}

const _: () = assert!(std::mem::size_of::<Cluster>() == 64);

pub struct TranspositionTable {
    clusters: Vec<Cluster>,
    generation: AtomicU8,
}

impl TranspositionTable {
    /// Allocate a table of approximately `size_mb` megabytes, rounded down
    /// to a whole number of 64-byte clusters.
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        Self::try_new(size_mb).expect("transposition table allocation failed")
    }

    /// Fallible counterpart to [`new`](Self::new): reports allocation
    /// failure instead of aborting, so a caller resizing to an
    /// operator-supplied megabyte count can surface it as an error.
    pub fn try_new(size_mb: usize) -> Result<Self, std::collections::TryReserveError> {
        let bytes = size_mb.max(1) * 1024 * 1024;
        let cluster_count = (bytes / std::mem::size_of::<Cluster>()).max(1);
        let mut clusters = Vec::new();
        clusters.try_reserve_exact(cluster_count)?;
        clusters.resize_with(cluster_count, Cluster::empty);
        Ok(TranspositionTable {
            clusters,
            generation: AtomicU8::new(0),
        })
    }

    #[must_use]
    pub fn size_mb(&self) -> usize {
        (self.clusters.len() * std::mem::size_of::<Cluster>()) / (1024 * 1024)
    }

    #[inline]
    fn cluster_index(&self, hash: u64) -> usize {
        // High-bits multiply: folds the hash into `[0, clusters.len())`
        // without requiring a power-of-two table size.
        (((hash as u128) * (self.clusters.len() as u128)) >> 64) as usize
    }

    #[must_use]
    pub fn current_generation(&self) -> u8 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Advance the generation by 4 (the low two bits are reserved for the
    /// bound tag packed into the same byte), ageing every existing entry
    /// without clearing the table.
    pub fn new_search(&self) {
        self.generation.fetch_add(4, Ordering::Relaxed);
    }

    /// Clear every entry; used when the table is resized.
    pub fn clear(&mut self) {
        for cluster in &mut self.clusters {
            for entry in &mut cluster.entries {
                *entry.data.get_mut() = 0;
                *entry.key_xor_data.get_mut() = 0;
            }
        }
        self.generation.store(0, Ordering::Relaxed);
    }

    /// Issue a software prefetch for the cluster an upcoming hash will land
    /// in, to hide memory latency behind the move-ordering work done before
    /// the recursive probe.
    #[inline]
    pub fn prefetch(&self, hash: u64) {
        #[cfg(target_arch = "x86_64")]
        {
            use std::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};
            let idx = self.cluster_index(hash);
            let ptr = self.clusters.as_ptr().wrapping_add(idx).cast::<i8>();
            unsafe { _mm_prefetch(ptr, _MM_HINT_T0) };
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            let _ = hash;
        }
    }

    /// Probe for `hash`. Returns the decoded entry on a key-fragment match
    /// (a torn or absent slot reads as a miss, never as corrupted data). A
    /// hit from an older generation is re-tagged to the current generation
    /// before being returned, so a heavily-reused entry keeps looking fresh
    /// to the replacement-value formula in `store` instead of becoming an
    /// easy target for eviction purely because nothing touched it since the
    /// last `new_search`.
    #[must_use]
    pub fn probe(&self, hash: u64) -> Option<TtData> {
        let cluster = &self.clusters[self.cluster_index(hash)];
        let want = (hash >> 32) as u32;
        let generation = self.current_generation();
        for entry in &cluster.entries {
            if let Some((key_fragment, data)) = entry.load() {
                if key_fragment == want {
                    if data.generation != generation {
                        let refreshed = TtData {
                            generation,
                            ..data
                        };
                        entry.store(want, &refreshed);
                        return Some(refreshed);
                    }
                    return Some(data);
                }
            }
        }
        None
    }

    /// Store a result, subject to the depth-and-freshness replacement rule:
    /// a new entry only overwrites an existing one if
    /// `new_depth - (stale ? 4 : 0) > existing_depth - 4`.
    pub fn store(
        &self,
        hash: u64,
        best_move: Move,
        score: i32,
        static_eval: i32,
        bound: Bound,
        depth: i32,
    ) {
        let cluster = &self.clusters[self.cluster_index(hash)];
        let want = (hash >> 32) as u32;
        let generation = self.current_generation();
        let new = TtData {
            best_move,
            score,
            static_eval,
            bound,
            depth,
            generation,
        };

        let mut replace_idx = 0usize;
        let mut replace_value = i32::MAX;
        for (idx, entry) in cluster.entries.iter().enumerate() {
            match entry.load() {
                Some((key_fragment, existing)) if key_fragment == want => {
                    let stale = existing.generation != generation;
                    let incoming_value = depth - if stale { 4 } else { 0 };
                    if incoming_value > existing.depth - 4 {
                        entry.store(want, &new);
                    }
                    return;
                }
                Some((_, existing)) => {
                    let same_generation = existing.generation == generation;
                    let value = existing.depth - if same_generation { 8 } else { 0 };
                    if value < replace_value {
                        replace_value = value;
                        replace_idx = idx;
                    }
                }
                None => {
                    replace_idx = idx;
                    replace_value = i32::MIN;
                    break;
                }
            }
        }

        cluster.entries[replace_idx].store(want, &new);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Square;

    fn test_move() -> Move {
        Move::new(Square::from_algebraic("e2").unwrap(), Square::from_algebraic("e4").unwrap())
    }

    #[test]
    fn store_then_probe_round_trips() {
        let tt = TranspositionTable::new(1);
        let mv = test_move();
        tt.store(0xDEAD_BEEF_0000_0001, mv, 123, 45, Bound::Exact, 6);
        let data = tt.probe(0xDEAD_BEEF_0000_0001).expect("hit");
        assert_eq!(data.best_move, mv);
        assert_eq!(data.score, 123);
        assert_eq!(data.static_eval, 45);
        assert_eq!(data.depth, 6);
        assert_eq!(data.bound, Bound::Exact);
    }

    #[test]
    fn probe_miss_on_different_hash() {
        let tt = TranspositionTable::new(1);
        tt.store(1, test_move(), 1, 1, Bound::Exact, 1);
        assert!(tt.probe(2).is_none());
    }

    #[test]
    fn deeper_entry_replaces_shallower_same_key() {
        let tt = TranspositionTable::new(1);
        let hash = 0x1234_5678_9abc_def0;
        tt.store(hash, test_move(), 10, 10, Bound::Upper, 2);
        tt.store(hash, test_move(), 20, 20, Bound::Exact, 8);
        let data = tt.probe(hash).unwrap();
        assert_eq!(data.depth, 8);
        assert_eq!(data.score, 20);
    }

    #[test]
    fn new_search_ages_generation() {
        let tt = TranspositionTable::new(1);
        let before = tt.current_generation();
        tt.new_search();
        assert_eq!(tt.current_generation(), before.wrapping_add(4));
    }

    #[test]
    fn probe_refreshes_stale_generation() {
        let tt = TranspositionTable::new(1);
        let hash = 0x1234_5678_9abc_def0;
        tt.store(hash, test_move(), 10, 10, Bound::Exact, 4);
        tt.new_search();
        let hit = tt.probe(hash).expect("hit across generation boundary");
        assert_eq!(hit.generation, tt.current_generation());

        // The refresh must have been written back, not just returned.
        let second_hit = tt.probe(hash).expect("still present");
        assert_eq!(second_hit.generation, tt.current_generation());
    }

    #[test]
    fn size_mb_rounds_to_whole_clusters() {
        let tt = TranspositionTable::new(4);
        assert!(tt.size_mb() <= 4);
    }
}
