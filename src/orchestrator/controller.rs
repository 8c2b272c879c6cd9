//! Run lifecycle controller.
//!
//! Owns start/pause/reset orchestration, the configuration lock and the elapsed-time
//! sampler, and emits events for presentation layers.

use crate::engine::{EngineControl, RunOutcome, SortEngine};
use crate::generator::{self, SIZE_MAX, SIZE_MIN};
use crate::model::{
    Algorithm, InfoEvent, Outcome, Pacing, RunConfig, RunResult, RunState, SortEvent,
    Statistics, StatsSnapshot,
};
use anyhow::Result;
use rand::rngs::StdRng;
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Duration, Instant};

/// Cadence of the elapsed-time sampler.
pub(crate) const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

pub(crate) const SPEED_MIN: u32 = 1;
pub(crate) const SPEED_MAX: u32 = 10;

/// Commands emitted by UI layers to drive the visualizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ControlCommand {
    Start,
    PauseToggle,
    Reset,
    Generate,
    SetAlgorithm(Algorithm),
    SetSpeed(u32),
    SetSize(usize),
    Quit,
}

/// Internal handle for a running sort task.
struct RunCtx {
    ctrl_tx: UnboundedSender<EngineControl>,
    handle: Option<JoinHandle<RunOutcome>>,
    sampler: JoinHandle<()>,
    started: Instant,
    initial: Vec<u32>,
}

pub(crate) struct Controller {
    algorithm: Algorithm,
    size: usize,
    pacing: Pacing,
    speed: Arc<AtomicU32>,
    stats: Arc<Statistics>,
    state: RunState,
    // Empty while a run owns the sequence.
    sequence: Vec<u32>,
    rng: StdRng,
    event_tx: UnboundedSender<SortEvent>,
    run: Option<RunCtx>,
}

impl Controller {
    pub(crate) fn new(cfg: &RunConfig, event_tx: UnboundedSender<SortEvent>) -> Self {
        let mut rng = generator::make_rng(cfg.seed);
        let size = cfg.size.clamp(SIZE_MIN, SIZE_MAX);
        let sequence = generator::generate(size, &mut rng);
        Self {
            algorithm: cfg.algorithm,
            size,
            pacing: cfg.pacing,
            speed: Arc::new(AtomicU32::new(cfg.speed.clamp(SPEED_MIN, SPEED_MAX))),
            stats: Arc::new(Statistics::default()),
            state: RunState::Idle,
            sequence,
            rng,
            event_tx,
            run: None,
        }
    }

    #[cfg(test)]
    /// Controller over a caller-provided sequence instead of a generated one.
    pub(crate) fn with_sequence(
        cfg: &RunConfig,
        sequence: Vec<u32>,
        event_tx: UnboundedSender<SortEvent>,
    ) -> Self {
        let mut ctl = Self::new(cfg, event_tx);
        ctl.size = sequence.len();
        ctl.sequence = sequence;
        ctl
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> RunState {
        self.state
    }

    #[cfg(test)]
    pub(crate) fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    #[cfg(test)]
    /// Last sequence handed back by the engine; empty while a run is active.
    pub(crate) fn sequence(&self) -> &[u32] {
        &self.sequence
    }

    #[cfg(test)]
    pub(crate) fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub(crate) fn speed(&self) -> u32 {
        self.speed.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    fn emit(&self, ev: SortEvent) {
        let _ = self.event_tx.send(ev);
    }

    fn set_state(&mut self, state: RunState) {
        if self.state != state {
            tracing::debug!(from = ?self.state, to = ?state, "run state");
        }
        self.state = state;
        self.emit(SortEvent::StateChanged(state));
    }

    /// Push the full current configuration to presentation layers.
    pub(crate) fn announce(&self) {
        self.emit(SortEvent::AlgorithmChanged(self.algorithm));
        self.emit(SortEvent::SpeedChanged(self.speed()));
        self.emit(SortEvent::SequenceReplaced(self.sequence.clone()));
        self.emit(SortEvent::StatsTick(self.stats.snapshot()));
        self.emit(SortEvent::StateChanged(self.state));
    }

    pub(crate) fn start(&mut self) {
        if self.state.is_active() {
            tracing::debug!("start ignored: run already active");
            return;
        }
        self.stats.reset();

        let initial = std::mem::take(&mut self.sequence);
        let (ctrl_tx, ctrl_rx) = tokio::sync::mpsc::unbounded_channel::<EngineControl>();
        let engine = SortEngine::new(
            self.algorithm,
            self.pacing,
            self.speed.clone(),
            self.stats.clone(),
        );
        let started = Instant::now();
        let sampler = spawn_sampler(self.stats.clone(), self.event_tx.clone(), started);

        self.emit(SortEvent::RunStarted {
            algorithm: self.algorithm,
            sequence: initial.clone(),
        });
        let event_tx = self.event_tx.clone();
        let seq = initial.clone();
        let handle = tokio::spawn(async move { engine.run(seq, event_tx, ctrl_rx).await });

        tracing::info!(algorithm = ?self.algorithm, size = initial.len(), "run started");
        self.run = Some(RunCtx {
            ctrl_tx,
            handle: Some(handle),
            sampler,
            started,
            initial,
        });
        self.set_state(RunState::Running);
    }

    pub(crate) fn pause_toggle(&mut self) {
        let next = match self.state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
            _ => {
                tracing::debug!(state = ?self.state, "pause ignored: no active run");
                return;
            }
        };
        if let Some(ctx) = &self.run {
            let _ = ctx
                .ctrl_tx
                .send(EngineControl::Pause(next == RunState::Paused));
        }
        self.set_state(next);
    }

    /// Cancel any active run, zero the statistics and return to Idle.
    ///
    /// The sequence keeps whatever order the cancelled run left it in.
    pub(crate) async fn reset(&mut self) {
        if let Some(mut ctx) = self.run.take() {
            let _ = ctx.ctrl_tx.send(EngineControl::Cancel);
            ctx.sampler.abort();
            if let Some(handle) = ctx.handle.take() {
                self.sequence = match handle.await {
                    Ok(outcome) => outcome.sequence,
                    Err(e) => self.recover_from(e, ctx.initial),
                };
            }
            tracing::info!("run cancelled");
        }
        self.stats.reset();
        self.set_state(RunState::Idle);
        self.emit(SortEvent::StatsTick(self.stats.snapshot()));
        self.emit(SortEvent::SequenceReplaced(self.sequence.clone()));
    }

    pub(crate) async fn set_algorithm(&mut self, algorithm: Algorithm) {
        if self.state.is_active() {
            tracing::debug!(?algorithm, "algorithm change ignored: run active");
            return;
        }
        self.algorithm = algorithm;
        self.emit(SortEvent::AlgorithmChanged(algorithm));
        self.reset().await;
    }

    /// Speed is read by the engine at every step, so it applies mid-run.
    pub(crate) fn set_speed(&mut self, speed: u32) {
        let speed = speed.clamp(SPEED_MIN, SPEED_MAX);
        self.speed.store(speed, Ordering::Relaxed);
        self.emit(SortEvent::SpeedChanged(speed));
    }

    pub(crate) fn set_size(&mut self, size: usize) {
        if self.state.is_active() {
            tracing::debug!(size, "size change ignored: run active");
            return;
        }
        self.size = size.clamp(SIZE_MIN, SIZE_MAX);
        self.generate();
    }

    /// Replace the sequence with a fresh random one of the current size.
    pub(crate) fn generate(&mut self) {
        if self.state.is_active() {
            tracing::debug!("generate ignored: run active");
            return;
        }
        self.sequence = generator::generate(self.size, &mut self.rng);
        self.stats.reset();
        self.set_state(RunState::Idle);
        self.emit(SortEvent::StatsTick(self.stats.snapshot()));
        self.emit(SortEvent::SequenceReplaced(self.sequence.clone()));
    }

    pub(crate) async fn apply(&mut self, cmd: ControlCommand) {
        match cmd {
            ControlCommand::Start => self.start(),
            ControlCommand::PauseToggle => self.pause_toggle(),
            ControlCommand::Reset => self.reset().await,
            ControlCommand::Generate => self.generate(),
            ControlCommand::SetAlgorithm(a) => self.set_algorithm(a).await,
            ControlCommand::SetSpeed(s) => self.set_speed(s),
            ControlCommand::SetSize(n) => self.set_size(n),
            // Quit is handled by the command loop.
            ControlCommand::Quit => {}
        }
    }

    /// Wait for the active run to finish on its own. Pending forever when idle.
    ///
    /// Cancel-safe: the join handle is only taken once it has resolved.
    pub(crate) async fn wait_for_run(&mut self) -> RunResult {
        let join_res = match self.run.as_mut().and_then(|ctx| ctx.handle.as_mut()) {
            Some(handle) => handle.await,
            None => return futures::future::pending().await,
        };
        let Some(ctx) = self.run.take() else {
            return futures::future::pending().await;
        };
        self.finish_run(ctx, join_res)
    }

    fn finish_run(&mut self, ctx: RunCtx, join_res: Result<RunOutcome, JoinError>) -> RunResult {
        ctx.sampler.abort();
        self.stats.set_elapsed(ctx.started.elapsed());

        let (sequence, outcome) = match join_res {
            Ok(run) => (run.sequence, run.outcome),
            Err(e) => (self.recover_from(e, ctx.initial.clone()), Outcome::Cancelled),
        };
        self.sequence = sequence;

        let result = RunResult {
            timestamp_utc: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "now".into()),
            algorithm: self.algorithm,
            size: ctx.initial.len(),
            initial: ctx.initial,
            sorted: self.sequence.clone(),
            stats: self.stats.snapshot(),
            outcome,
        };
        tracing::info!(
            algorithm = ?result.algorithm,
            comparisons = result.stats.comparisons,
            swaps = result.stats.swaps,
            elapsed_ms = result.stats.elapsed_ms,
            "run completed"
        );

        self.emit(SortEvent::StatsTick(result.stats));
        self.set_state(RunState::Completed);
        self.emit(SortEvent::RunCompleted {
            result: Box::new(result.clone()),
        });
        result
    }

    fn recover_from(&self, err: JoinError, initial: Vec<u32>) -> Vec<u32> {
        tracing::error!(error = %err, "sort task failed");
        self.emit(SortEvent::Info(InfoEvent::EngineFailed {
            reason: err.to_string(),
        }));
        initial
    }
}

/// Periodically publish elapsed time alongside the live counters.
fn spawn_sampler(
    stats: Arc<Statistics>,
    event_tx: UnboundedSender<SortEvent>,
    started: Instant,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(SAMPLE_INTERVAL);
        loop {
            tick.tick().await;
            stats.set_elapsed(started.elapsed());
            if event_tx.send(SortEvent::StatsTick(stats.snapshot())).is_err() {
                break;
            }
        }
    })
}

/// Dispatch UI commands and emit events back to presentation layers until quit.
pub(crate) async fn run_controller(
    cfg: &RunConfig,
    start_on_launch: bool,
    event_tx: UnboundedSender<SortEvent>,
    mut cmd_rx: UnboundedReceiver<ControlCommand>,
) -> Result<()> {
    let mut ctl = Controller::new(cfg, event_tx);
    ctl.announce();
    if start_on_launch {
        ctl.start();
    }

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(ControlCommand::Quit) | None => {
                        ctl.reset().await;
                        break;
                    }
                    Some(cmd) => ctl.apply(cmd).await,
                }
            }
            // Completion events are emitted by the controller itself.
            _ = ctl.wait_for_run() => {}
        }
    }
    Ok(())
}
