//! Lazy SMP coordinator: spin up `worker_count` threads, each running its own
//! iterative deepening over a cloned [`Position`] with worker-local move
//! ordering tables, all sharing one [`TranspositionTable`]. There is no
//! work-splitting or move partitioning — the shared table and each worker's
//! differing depth offset and move order are the entire coordination
//! mechanism, hence "lazy".

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use parking_lot::Mutex;

use crate::eval::PositionEvaluator;
use crate::position::Position;
use crate::tt::TranspositionTable;
use crate::types::Move;

use super::worker::Worker;
use super::{SearchInfo, SearchLimits, SearchResult, SearchState};

/// 32 MiB: deep recursion in negamax/quiescence plus the singular-extension
/// verification sub-search can nest far past the default thread stack.
const WORKER_STACK_SIZE: usize = 32 * 1024 * 1024;

struct WorkerOutcome {
    worker_id: usize,
    best_move: Option<Move>,
    score: i32,
    depth: u32,
    nodes: u64,
}

/// Helper threads search one ply deeper than the target on odd ids, and at
/// the target depth (but with their own move ordering tables, so a different
/// move order) on even ids — cheap diversity that still shares the table.
fn worker_depth_offset(worker_id: usize) -> i32 {
    match worker_id % 4 {
        1 | 3 => 1,
        _ => 0,
    }
}

pub struct Coordinator {
    tt: Arc<TranspositionTable>,
    evaluator: Arc<dyn PositionEvaluator>,
    stop: Arc<AtomicBool>,
    state: Arc<Mutex<SearchState>>,
}

impl Coordinator {
    #[must_use]
    pub fn new(tt: Arc<TranspositionTable>, evaluator: Arc<dyn PositionEvaluator>) -> Self {
        Coordinator {
            tt,
            evaluator,
            stop: Arc::new(AtomicBool::new(false)),
            state: Arc::new(Mutex::new(SearchState::Idle)),
        }
    }

    #[must_use]
    pub fn state(&self) -> SearchState {
        *self.state.lock()
    }

    /// Request that an in-progress search wind down as soon as workers next
    /// poll. Idempotent; harmless to call when nothing is searching.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
        let mut state = self.state.lock();
        if *state == SearchState::Searching {
            *state = SearchState::Stopping;
        }
    }

    /// Run a blocking search from `root` with `history` (prior game hashes,
    /// oldest first, NOT including `root` itself) used for repetition
    /// detection. `on_info` is called after every completed iteration of the
    /// main worker only — helper workers search silently.
    pub fn search(
        &self,
        root: &Position,
        history: Vec<u64>,
        limits: SearchLimits,
        worker_count: usize,
        mut on_info: impl FnMut(&SearchInfo) + Send + 'static,
    ) -> SearchResult {
        let worker_count = worker_count.max(1);
        self.stop.store(false, Ordering::Relaxed);
        *self.state.lock() = SearchState::Searching;

        self.tt.new_search();
        let start = Instant::now();
        let global_nodes = Arc::new(AtomicU64::new(0));
        let deadline = limits.deadline(start);

        let result = if worker_count == 1 {
            let mut worker = Worker::new(
                root.clone(),
                full_history(root, &history),
                Arc::clone(&self.tt),
                Arc::clone(&self.evaluator),
                Arc::clone(&self.stop),
                Arc::clone(&global_nodes),
                deadline,
                limits.nodes,
            );
            let (best_move, score) = worker.iterative_deepening(limits, start, &mut on_info);
            WorkerOutcome {
                worker_id: 0,
                best_move,
                score,
                depth: limits.depth.unwrap_or(0),
                nodes: worker.nodes,
            }
        } else {
            self.spawn_workers(root, &history, limits, worker_count, start, &global_nodes, on_info)
        };

        *self.state.lock() = SearchState::Completed;

        let ponder_move = result.best_move.and_then(|mv| ponder_from_tt(&self.tt, root, mv));

        SearchResult {
            best_move: result.best_move,
            ponder_move,
            score: result.score,
            depth: result.depth,
            nodes: global_nodes.load(Ordering::Relaxed),
        }
    }

    fn spawn_workers(
        &self,
        root: &Position,
        history: &[u64],
        limits: SearchLimits,
        worker_count: usize,
        start: Instant,
        global_nodes: &Arc<AtomicU64>,
        mut main_on_info: impl FnMut(&SearchInfo) + Send + 'static,
    ) -> WorkerOutcome {
        let deadline = limits.deadline(start);
        let mut handles = Vec::with_capacity(worker_count - 1);

        for worker_id in 1..worker_count {
            let pos = root.clone();
            let hist = full_history(root, history);
            let tt = Arc::clone(&self.tt);
            let evaluator = Arc::clone(&self.evaluator);
            let stop = Arc::clone(&self.stop);
            let nodes = Arc::clone(global_nodes);
            let depth_offset = worker_depth_offset(worker_id);
            let worker_limits = SearchLimits {
                depth: limits.depth.map(|d| ((d as i32) + depth_offset).max(1) as u32),
                ..limits
            };

            let handle = thread::Builder::new()
                .name(format!("search-worker-{worker_id}"))
                .stack_size(WORKER_STACK_SIZE)
                .spawn(move || {
                    let mut worker = Worker::new(
                        pos, hist, tt, evaluator, stop, nodes, deadline, worker_limits.nodes,
                    );
                    let (best_move, score) =
                        worker.iterative_deepening(worker_limits, start, |_| {});
                    WorkerOutcome {
                        worker_id,
                        best_move,
                        score,
                        depth: worker_limits.depth.unwrap_or(0),
                        nodes: worker.nodes,
                    }
                })
                .expect("failed to spawn search worker thread");
            handles.push(handle);
        }

        let main_pos = root.clone();
        let main_hist = full_history(root, history);
        let mut main_worker = Worker::new(
            main_pos,
            main_hist,
            Arc::clone(&self.tt),
            Arc::clone(&self.evaluator),
            Arc::clone(&self.stop),
            Arc::clone(global_nodes),
            deadline,
            limits.nodes,
        );
        let (main_best_move, main_score) =
            main_worker.iterative_deepening(limits, start, &mut main_on_info);
        self.stop.store(true, Ordering::Relaxed);

        let mut outcomes = vec![WorkerOutcome {
            worker_id: 0,
            best_move: main_best_move,
            score: main_score,
            depth: limits.depth.unwrap_or(0),
            nodes: main_worker.nodes,
        }];
        for handle in handles {
            if let Ok(outcome) = handle.join() {
                outcomes.push(outcome);
            }
        }

        let main_result = outcomes
            .iter()
            .position(|o| o.worker_id == 0 && o.best_move.is_some());
        let best_idx = main_result.or_else(|| {
            outcomes
                .iter()
                .enumerate()
                .filter(|(_, o)| o.best_move.is_some())
                .max_by_key(|(_, o)| o.depth)
                .map(|(idx, _)| idx)
        });

        match best_idx {
            Some(idx) => outcomes.swap_remove(idx),
            None => outcomes.swap_remove(0),
        }
    }
}

/// The worker's repetition-detection history must end with `root`'s own
/// hash; `history` as supplied by the caller holds everything strictly
/// before it.
fn full_history(root: &Position, history: &[u64]) -> Vec<u64> {
    let mut full = Vec::with_capacity(history.len() + 1);
    full.extend_from_slice(history);
    full.push(root.hash());
    full
}

fn ponder_from_tt(tt: &TranspositionTable, root: &Position, best_move: Move) -> Option<Move> {
    let mut pos = root.clone();
    pos.make_move(best_move);
    let entry = tt.probe(pos.hash())?;
    if entry.best_move.is_null() || !pos.is_legal_move(entry.best_move) {
        return None;
    }
    Some(entry.best_move)
}
