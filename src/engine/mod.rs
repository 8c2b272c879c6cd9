//! Instrumented sort engine.
//!
//! Every procedure mutates the shared sequence through a [`Stepper`], which is the
//! only place trace events are emitted and counters are bumped. Each emission is a
//! suspension point: the stepper honours pause/cancel before touching the sequence
//! and then sleeps for the paced delay.

mod distribution;
mod divide;
mod exchange;
mod heap;

use crate::model::{Algorithm, Outcome, Pacing, SortEvent, Statistics, TraceEvent};
use std::sync::{
    atomic::{AtomicBool, AtomicU32, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum EngineControl {
    /// Pause (true) or resume (false) the running sort
    Pause(bool),
    /// Cancel the sort entirely
    Cancel,
}

/// Raised at a suspension point once cancellation has been requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("sort run cancelled")]
pub struct Cancelled;

pub(crate) type StepResult = Result<(), Cancelled>;

/// Sequence handed back by the engine, sorted or as last mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub sequence: Vec<u32>,
    pub outcome: Outcome,
}

pub struct SortEngine {
    algorithm: Algorithm,
    pacing: Pacing,
    speed: Arc<AtomicU32>,
    stats: Arc<Statistics>,
}

impl SortEngine {
    pub fn new(
        algorithm: Algorithm,
        pacing: Pacing,
        speed: Arc<AtomicU32>,
        stats: Arc<Statistics>,
    ) -> Self {
        Self {
            algorithm,
            pacing,
            speed,
            stats,
        }
    }

    pub async fn run(
        self,
        sequence: Vec<u32>,
        event_tx: mpsc::UnboundedSender<SortEvent>,
        mut control_rx: mpsc::UnboundedReceiver<EngineControl>,
    ) -> RunOutcome {
        let paused = Arc::new(AtomicBool::new(false));
        let cancel = Arc::new(AtomicBool::new(false));

        // Control listener.
        let paused2 = paused.clone();
        let cancel2 = cancel.clone();
        let control_handle = tokio::spawn(async move {
            while let Some(msg) = control_rx.recv().await {
                match msg {
                    EngineControl::Pause(p) => paused2.store(p, Ordering::Relaxed),
                    EngineControl::Cancel => {
                        cancel2.store(true, Ordering::Relaxed);
                        break;
                    }
                }
            }
        });

        let mut stepper = Stepper {
            seq: sequence,
            stats: self.stats,
            pacing: self.pacing,
            speed: self.speed,
            paused,
            cancel,
            event_tx,
        };

        let res = run_algorithm(self.algorithm, &mut stepper).await;

        // Dropping a JoinHandle does not stop the task.
        control_handle.abort();

        let outcome = match res {
            Ok(()) => Outcome::Completed,
            Err(Cancelled) => Outcome::Cancelled,
        };
        tracing::debug!(algorithm = ?self.algorithm, ?outcome, "engine finished");
        RunOutcome {
            sequence: stepper.seq,
            outcome,
        }
    }
}

/// Dispatch to the procedure for `algorithm`.
pub(crate) async fn run_algorithm(algorithm: Algorithm, st: &mut Stepper) -> StepResult {
    match algorithm {
        Algorithm::Bubble => exchange::bubble_sort(st).await,
        Algorithm::Selection => exchange::selection_sort(st).await,
        Algorithm::Insertion => exchange::insertion_sort(st).await,
        Algorithm::Merge => divide::merge_sort(st).await,
        Algorithm::Quick => divide::quick_sort(st).await,
        Algorithm::Heap => heap::heap_sort(st).await,
        Algorithm::Counting => distribution::counting_sort(st).await,
        Algorithm::Radix => distribution::radix_sort(st).await,
    }
}

/// Block while paused; fail once cancelled.
pub(crate) async fn wait_if_paused_or_cancelled(
    paused: &AtomicBool,
    cancel: &AtomicBool,
) -> StepResult {
    while paused.load(Ordering::Relaxed) && !cancel.load(Ordering::Relaxed) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    if cancel.load(Ordering::Relaxed) {
        Err(Cancelled)
    } else {
        Ok(())
    }
}

/// Per-run step context shared by all procedures.
pub(crate) struct Stepper {
    pub(crate) seq: Vec<u32>,
    stats: Arc<Statistics>,
    pacing: Pacing,
    speed: Arc<AtomicU32>,
    paused: Arc<AtomicBool>,
    cancel: Arc<AtomicBool>,
    event_tx: mpsc::UnboundedSender<SortEvent>,
}

impl Stepper {
    pub(crate) fn len(&self) -> usize {
        self.seq.len()
    }

    async fn gate(&self) -> StepResult {
        wait_if_paused_or_cancelled(&self.paused, &self.cancel).await
    }

    async fn emit(&self, ev: TraceEvent) {
        let _ = self.event_tx.send(SortEvent::Trace(ev));
        let speed = self.speed.load(Ordering::Relaxed).max(1);
        let delay = self.pacing.base_delay(&ev) / speed;
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }
    }

    /// Counted comparison between slots `i` and `j`.
    pub(crate) async fn compare(&mut self, i: usize, j: usize) -> StepResult {
        assert!(i < self.seq.len() && j < self.seq.len(), "compare out of bounds");
        self.gate().await?;
        self.stats.add_comparison();
        self.emit(TraceEvent::Compare(i, j)).await;
        Ok(())
    }

    /// Counted exchange of slots `i` and `j`.
    pub(crate) async fn swap(&mut self, i: usize, j: usize) -> StepResult {
        self.gate().await?;
        self.seq.swap(i, j);
        self.stats.add_swap();
        self.emit(TraceEvent::Swap(i, j)).await;
        Ok(())
    }

    /// Write `value` into slot `i`; `counted` moves show up in the swap counter.
    pub(crate) async fn overwrite(&mut self, i: usize, value: u32, counted: bool) -> StepResult {
        self.gate().await?;
        self.seq[i] = value;
        if counted {
            self.stats.add_swap();
        }
        self.emit(TraceEvent::Overwrite(i, value)).await;
        Ok(())
    }

    pub(crate) async fn inspect(&mut self, i: usize) -> StepResult {
        assert!(i < self.seq.len(), "inspect out of bounds");
        self.gate().await?;
        self.emit(TraceEvent::Inspect(i)).await;
        Ok(())
    }

    pub(crate) async fn mark_sorted(&mut self, i: usize) -> StepResult {
        assert!(i < self.seq.len(), "mark_sorted out of bounds");
        self.gate().await?;
        self.emit(TraceEvent::RegionSorted(i)).await;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::generator::{generate, make_rng, VALUE_MAX, VALUE_MIN};
    use proptest::prelude::*;

    fn is_sorted(v: &[u32]) -> bool {
        v.windows(2).all(|w| w[0] <= w[1])
    }

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("runtime")
            .block_on(f)
    }

    /// Replay the trace on a copy of the input; it must land on the engine's result.
    fn replay(initial: &[u32], events: &[TraceEvent]) -> Vec<u32> {
        let mut mirror = initial.to_vec();
        for ev in events {
            match *ev {
                TraceEvent::Swap(i, j) => mirror.swap(i, j),
                TraceEvent::Overwrite(i, v) => mirror[i] = v,
                _ => {}
            }
        }
        mirror
    }

    #[tokio::test]
    async fn every_algorithm_sorts_a_generated_sequence() {
        let input = generate(60, &mut make_rng(Some(3)));
        let mut expected = input.clone();
        expected.sort_unstable();
        for algorithm in Algorithm::ALL {
            let (out, stats, events) = trace(algorithm, input.clone()).await;
            assert_eq!(out, expected, "{algorithm:?}");
            assert_eq!(replay(&input, &events), out, "{algorithm:?} trace replay");
            let compares = events
                .iter()
                .filter(|e| matches!(e, TraceEvent::Compare(..)))
                .count() as u64;
            assert_eq!(stats.comparisons, compares, "{algorithm:?}");
        }
    }

    #[tokio::test]
    async fn bubble_sort_worked_example() {
        let (out, stats, events) = trace(Algorithm::Bubble, vec![5, 3, 8, 1]).await;
        assert_eq!(out, vec![1, 3, 5, 8]);
        assert_eq!(stats.comparisons, 6);
        assert_eq!(stats.swaps, 4);

        // State after each pass, observed through the RegionSorted marks.
        let mut mirror = vec![5, 3, 8, 1];
        let mut passes = Vec::new();
        let mut swaps_per_pass = Vec::new();
        let mut swaps = 0;
        for ev in &events {
            match *ev {
                TraceEvent::Swap(i, j) => {
                    mirror.swap(i, j);
                    swaps += 1;
                }
                TraceEvent::RegionSorted(_) => {
                    passes.push(mirror.clone());
                    swaps_per_pass.push(std::mem::take(&mut swaps));
                }
                _ => {}
            }
        }
        assert_eq!(
            passes,
            vec![vec![3, 5, 1, 8], vec![3, 1, 5, 8], vec![1, 3, 5, 8]]
        );
        assert_eq!(swaps_per_pass, vec![2, 1, 1]);
    }

    #[tokio::test]
    async fn sorted_input_is_left_alone() {
        let input: Vec<u32> = (0..30).map(|i| 20 + i * 5).collect();
        for algorithm in Algorithm::ALL {
            let (out, stats, _) = trace(algorithm, input.clone()).await;
            assert_eq!(out, input, "{algorithm:?}");
            if algorithm.is_comparison_based() {
                assert!(stats.comparisons > 0, "{algorithm:?}");
            }
        }
        for algorithm in [Algorithm::Bubble, Algorithm::Selection, Algorithm::Insertion] {
            let (_, stats, _) = trace(algorithm, input.clone()).await;
            assert_eq!(stats.swaps, 0, "{algorithm:?}");
        }
    }

    #[tokio::test]
    async fn tiny_inputs_do_not_panic() {
        for algorithm in Algorithm::ALL {
            let (out, stats, _) = trace(algorithm, Vec::new()).await;
            assert!(out.is_empty());
            assert_eq!(stats.swaps, 0);
            let (out, _, _) = trace(algorithm, vec![42]).await;
            assert_eq!(out, vec![42]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pause_blocks_progress_until_resumed() {
        let (mut st, stats, _rx) = stepper(vec![9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
        st.paused.store(true, Ordering::Relaxed);
        let paused = st.paused.clone();

        let task = tokio::spawn(async move {
            let res = run_algorithm(Algorithm::Insertion, &mut st).await;
            (res, st.seq)
        });
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(stats.snapshot().comparisons, 0);

        paused.store(false, Ordering::Relaxed);
        let (res, seq) = task.await.unwrap();
        assert_eq!(res, Ok(()));
        assert_eq!(seq, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    fn compare_only_pacing() -> Pacing {
        Pacing {
            compare: Duration::from_millis(400),
            ..Pacing::instant()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn step_delay_is_base_divided_by_speed() {
        let (mut st, _, _rx) = stepper(vec![2, 1]);
        st.pacing = compare_only_pacing();

        let t0 = tokio::time::Instant::now();
        st.compare(0, 1).await.unwrap();
        let slow = t0.elapsed();
        assert!(slow >= Duration::from_millis(400) && slow < Duration::from_millis(410));

        st.speed.store(10, Ordering::Relaxed);
        let t0 = tokio::time::Instant::now();
        st.compare(0, 1).await.unwrap();
        let fast = t0.elapsed();
        assert!(fast >= Duration::from_millis(40) && fast < Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_applies_to_the_next_step() {
        let (mut st, _, mut rx) = stepper(vec![4, 3, 2, 1]);
        st.pacing = compare_only_pacing();
        let speed = st.speed.clone();
        let task = tokio::spawn(async move { run_algorithm(Algorithm::Selection, &mut st).await });

        let mut stamps = Vec::new();
        while let Some(ev) = rx.recv().await {
            if let SortEvent::Trace(TraceEvent::Compare(..)) = ev {
                stamps.push(tokio::time::Instant::now());
                if stamps.len() == 1 {
                    speed.store(10, Ordering::Relaxed);
                }
            }
        }
        assert_eq!(task.await.unwrap(), Ok(()));

        // The first delay was already running at speed 1 when the change landed.
        assert!(stamps.len() >= 3);
        assert!(stamps[1] - stamps[0] >= Duration::from_millis(400));
        let next = stamps[2] - stamps[1];
        assert!(next >= Duration::from_millis(40) && next < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn cancel_keeps_the_multiset() {
        let input = generate(40, &mut make_rng(Some(11)));
        let mut expected = input.clone();
        expected.sort_unstable();
        for algorithm in Algorithm::ALL {
            for stop_after in [1usize, 7, 50, 200] {
                let (mut st, _, mut rx) = stepper(input.clone());
                let cancel = cancel_flag(&st);
                let watcher = tokio::spawn(async move {
                    let mut seen = 0;
                    while let Some(ev) = rx.recv().await {
                        if matches!(ev, SortEvent::Trace(_)) {
                            seen += 1;
                            if seen == stop_after {
                                cancel.store(true, Ordering::Relaxed);
                            }
                        }
                    }
                });
                let _ = run_algorithm(algorithm, &mut st).await;
                let mut got = st.seq.clone();
                drop(st);
                watcher.await.unwrap();
                got.sort_unstable();
                assert_eq!(got, expected, "{algorithm:?} cancelled after {stop_after}");
            }
        }
    }

    proptest! {
        #[test]
        fn output_is_a_sorted_permutation(
            input in proptest::collection::vec(VALUE_MIN..VALUE_MAX, 0..64),
            which in 0usize..8,
        ) {
            let algorithm = Algorithm::ALL[which];
            let (out, _, _) = block_on(trace(algorithm, input.clone()));
            let mut expected = input;
            expected.sort_unstable();
            prop_assert!(is_sorted(&out));
            prop_assert_eq!(out, expected);
        }

        #[test]
        fn distribution_sorts_match_reference(
            input in proptest::collection::vec(VALUE_MIN..VALUE_MAX, 1..80),
        ) {
            let mut expected = input.clone();
            expected.sort();
            for algorithm in [Algorithm::Counting, Algorithm::Radix] {
                let (out, _, _) = block_on(trace(algorithm, input.clone()));
                prop_assert_eq!(&out, &expected);
            }
        }
    }
}
