use crate::model::{Algorithm, Pacing, RunConfig, SortEvent};
use crate::orchestrator::Controller;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "sortviz",
    version,
    about = "Step-by-step sorting algorithm visualizer with optional TUI"
)]
pub struct Cli {
    /// Sorting algorithm to visualize
    #[arg(long, short, value_enum, default_value_t = Algorithm::Bubble)]
    pub algorithm: Algorithm,

    /// Number of bars (10-100)
    #[arg(long, short = 'n', default_value_t = 50)]
    pub size: usize,

    /// Animation speed multiplier (1-10); step delays are divided by it
    #[arg(long, default_value_t = 2)]
    pub speed: u32,

    /// Seed for the sequence generator, for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable step delays entirely
    #[arg(long)]
    pub instant: bool,

    /// Keep step delays in --text/--json mode (headless runs are instant by default)
    #[arg(long)]
    pub paced: bool,

    /// Base delay after a comparison or buffered write, before the speed divisor
    #[arg(long, default_value = "400ms")]
    pub compare_delay: humantime::Duration,

    /// Base delay after a swap, before the speed divisor
    #[arg(long, default_value = "600ms")]
    pub swap_delay: humantime::Duration,

    /// Run once and print a JSON result (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Run once and print a text summary (no TUI)
    #[arg(long)]
    pub text: bool,

    /// With --text, print every trace event as it happens
    #[arg(long)]
    pub trace: bool,

    /// Start sorting as soon as the TUI opens
    #[arg(long, default_value_t = false, action = clap::ArgAction::Set)]
    pub start_on_launch: bool,

    /// Log filter (e.g. info, debug, sortviz=trace); RUST_LOG takes precedence
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    pub fn is_headless(&self) -> bool {
        self.json || self.text || cfg!(not(feature = "tui"))
    }
}

pub async fn run(args: Cli) -> Result<()> {
    if args.json && args.text {
        return Err(anyhow::anyhow!("--json and --text are mutually exclusive."));
    }
    if args.trace && !args.text {
        return Err(anyhow::anyhow!(
            "--trace can only be used with --text. Use --text --trace together."
        ));
    }

    if !args.json && !args.text {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_headless(args).await;
        }
    }

    run_headless(args).await
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> RunConfig {
    let pacing = if args.instant || (args.is_headless() && !args.paced) {
        Pacing::instant()
    } else {
        let compare = Duration::from(args.compare_delay);
        Pacing {
            compare,
            swap: Duration::from(args.swap_delay),
            overwrite: compare,
            ..Pacing::default()
        }
    };
    RunConfig {
        algorithm: args.algorithm,
        size: args.size,
        speed: args.speed,
        seed: args.seed,
        pacing,
    }
}

/// Sort one generated sequence without a UI and print the result.
async fn run_headless(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let (out_tx, out_handle) = spawn_output_writer();
    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<SortEvent>();

    let print_trace = args.trace;
    let trace_tx = out_tx.clone();
    let printer = tokio::spawn(async move {
        while let Some(ev) = evt_rx.recv().await {
            match ev {
                SortEvent::Trace(t) if print_trace => {
                    let _ = trace_tx.send(OutputLine::Stdout(
                        crate::text_summary::format_trace_event(&t),
                    ));
                }
                SortEvent::Info(info) => {
                    let _ = trace_tx.send(OutputLine::Stderr(info.to_message()));
                }
                _ => {}
            }
        }
    });

    let mut ctl = Controller::new(&cfg, evt_tx);
    if args.text {
        let d = cfg.algorithm.descriptor();
        let _ = out_tx.send(OutputLine::Stderr(format!("== {} ==", d.name)));
    }
    ctl.start();
    let result = tokio::select! {
        r = ctl.wait_for_run() => r,
        _ = tokio::signal::ctrl_c() => {
            ctl.reset().await;
            anyhow::bail!("interrupted");
        }
    };
    drop(ctl);
    printer.await.context("trace printer task failed")?;

    if args.json {
        let out = serde_json::to_string_pretty(&result)?;
        let _ = out_tx.send(OutputLine::Stdout(out));
    } else {
        let summary = crate::text_summary::build_text_summary(&result);
        for line in summary.lines {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }

    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_map_to_config() {
        let args = Cli::parse_from(["sortviz"]);
        assert_eq!(args.algorithm, Algorithm::Bubble);
        assert_eq!(args.size, 50);
        assert!(!args.start_on_launch);
        let cfg = build_config(&args);
        assert_eq!(cfg.speed, 2);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn headless_runs_are_instant_unless_paced() {
        let args = Cli::parse_from(["sortviz", "--text", "-a", "radix", "--seed", "9"]);
        let cfg = build_config(&args);
        assert_eq!(cfg.algorithm, Algorithm::Radix);
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.pacing, Pacing::instant());

        let args = Cli::parse_from(["sortviz", "--json", "--paced"]);
        assert_eq!(build_config(&args).pacing, Pacing::default());
    }

    #[test]
    fn step_delays_parse_as_durations() {
        let args = Cli::parse_from(["sortviz", "--compare-delay", "1s", "--swap-delay", "250ms"]);
        let pacing = build_config(&args).pacing;
        assert_eq!(pacing.compare, Duration::from_secs(1));
        assert_eq!(pacing.overwrite, Duration::from_secs(1));
        assert_eq!(pacing.swap, Duration::from_millis(250));
        assert_eq!(pacing.inspect, Pacing::default().inspect);
    }

    #[tokio::test]
    async fn trace_requires_text_mode() {
        let args = Cli::parse_from(["sortviz", "--json", "--trace"]);
        assert!(run(args).await.is_err());
    }
}
