use crate::model::{Algorithm, Outcome, RunResult, RunState, SortEvent, StatsSnapshot, TraceEvent};
use ratatui::style::Color;

/// Transient highlight left on a bar by the most recent trace event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Compare,
    Swap,
    Write,
    Inspect,
}

impl Focus {
    pub fn color(self) -> Color {
        match self {
            Focus::Compare => Color::Yellow,
            Focus::Swap => Color::Red,
            Focus::Write => Color::Magenta,
            Focus::Inspect => Color::LightBlue,
        }
    }
}

pub const BAR_COLOR: Color = Color::Cyan;
pub const SORTED_COLOR: Color = Color::Green;

/// Mirror of the controller's sequence, rebuilt purely from `SortEvent`s.
pub struct UiState {
    pub tab: usize,
    pub run_state: RunState,
    pub algorithm: Algorithm,
    pub speed: u32,
    pub bars: Vec<u32>,
    pub sorted: Vec<bool>,
    pub focus: Vec<(usize, Focus)>,
    pub stats: StatsSnapshot,
    pub info: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tab: 0,
            run_state: RunState::Idle,
            algorithm: Algorithm::Bubble,
            speed: 1,
            bars: Vec::new(),
            sorted: Vec::new(),
            focus: Vec::new(),
            stats: StatsSnapshot::default(),
            info: String::new(),
        }
    }
}

impl UiState {
    fn replace_bars(&mut self, values: Vec<u32>) {
        self.sorted = vec![false; values.len()];
        self.bars = values;
        self.focus.clear();
    }

    fn apply_trace(&mut self, ev: TraceEvent) {
        self.focus.clear();
        let n = self.bars.len();
        match ev {
            TraceEvent::Compare(i, j) => {
                self.focus.push((i, Focus::Compare));
                if i != j {
                    self.focus.push((j, Focus::Compare));
                }
            }
            TraceEvent::Swap(i, j) => {
                if i < n && j < n {
                    self.bars.swap(i, j);
                }
                self.focus.push((i, Focus::Swap));
                self.focus.push((j, Focus::Swap));
            }
            TraceEvent::Overwrite(i, v) => {
                if let Some(slot) = self.bars.get_mut(i) {
                    *slot = v;
                }
                self.focus.push((i, Focus::Write));
            }
            TraceEvent::Inspect(i) => self.focus.push((i, Focus::Inspect)),
            TraceEvent::RegionSorted(i) => {
                if let Some(done) = self.sorted.get_mut(i) {
                    *done = true;
                }
            }
        }
    }

    pub fn apply_event(&mut self, ev: SortEvent) {
        match ev {
            SortEvent::RunStarted {
                algorithm,
                sequence,
            } => {
                self.algorithm = algorithm;
                self.replace_bars(sequence);
                self.info = format!("Sorting with {}", algorithm.descriptor().name);
            }
            SortEvent::Trace(t) => self.apply_trace(t),
            SortEvent::StatsTick(s) => self.stats = s,
            SortEvent::StateChanged(s) => {
                if s == RunState::Paused {
                    self.info = "Paused".into();
                } else if self.run_state == RunState::Paused && s == RunState::Running {
                    self.info = "Resumed".into();
                }
                self.run_state = s;
            }
            SortEvent::SequenceReplaced(seq) => self.replace_bars(seq),
            SortEvent::AlgorithmChanged(a) => {
                self.algorithm = a;
                self.info = format!("Selected {}", a.descriptor().name);
            }
            SortEvent::SpeedChanged(s) => self.speed = s,
            SortEvent::Info(info) => self.info = info.to_message(),
            SortEvent::RunCompleted { result } => self.complete(*result),
        }
    }

    fn complete(&mut self, result: RunResult) {
        self.bars = result.sorted.clone();
        let done = result.outcome == Outcome::Completed;
        self.sorted = vec![done; self.bars.len()];
        self.focus.clear();
        self.stats = result.stats;
        self.info = format!(
            "{} finished: {} comparisons, {} swaps in {} ms",
            result.algorithm.descriptor().name,
            result.stats.comparisons,
            result.stats.swaps,
            result.stats.elapsed_ms
        );
    }

    /// Color for bar `i`: a live highlight wins over the sorted mark.
    pub fn bar_color(&self, i: usize) -> Color {
        if let Some((_, f)) = self.focus.iter().find(|(idx, _)| *idx == i) {
            return f.color();
        }
        if self.sorted.get(i).copied().unwrap_or(false) {
            SORTED_COLOR
        } else {
            BAR_COLOR
        }
    }

    pub fn max_value(&self) -> u32 {
        self.bars.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_bars(values: &[u32]) -> UiState {
        let mut s = UiState::default();
        s.apply_event(SortEvent::SequenceReplaced(values.to_vec()));
        s
    }

    #[test]
    fn trace_events_mutate_the_mirror() {
        let mut s = with_bars(&[5, 3, 8, 1]);
        s.apply_event(SortEvent::Trace(TraceEvent::Compare(0, 1)));
        assert_eq!(s.bar_color(0), Color::Yellow);
        assert_eq!(s.bar_color(1), Color::Yellow);

        s.apply_event(SortEvent::Trace(TraceEvent::Swap(0, 1)));
        assert_eq!(s.bars, vec![3, 5, 8, 1]);
        assert_eq!(s.bar_color(0), Color::Red);

        s.apply_event(SortEvent::Trace(TraceEvent::Overwrite(3, 9)));
        assert_eq!(s.bars, vec![3, 5, 8, 9]);
        assert_eq!(s.bar_color(0), BAR_COLOR);

        s.apply_event(SortEvent::Trace(TraceEvent::RegionSorted(3)));
        assert_eq!(s.bar_color(3), SORTED_COLOR);
        assert_eq!(s.max_value(), 9);
    }

    #[test]
    fn out_of_range_indices_are_ignored() {
        let mut s = with_bars(&[1, 2]);
        s.apply_event(SortEvent::Trace(TraceEvent::Swap(0, 7)));
        s.apply_event(SortEvent::Trace(TraceEvent::Overwrite(9, 1)));
        s.apply_event(SortEvent::Trace(TraceEvent::RegionSorted(4)));
        assert_eq!(s.bars, vec![1, 2]);
    }

    #[test]
    fn completion_marks_everything_sorted() {
        let mut s = with_bars(&[3, 1, 2]);
        s.apply_event(SortEvent::RunCompleted {
            result: Box::new(RunResult {
                timestamp_utc: String::new(),
                algorithm: Algorithm::Quick,
                size: 3,
                initial: vec![3, 1, 2],
                sorted: vec![1, 2, 3],
                stats: StatsSnapshot {
                    comparisons: 3,
                    swaps: 2,
                    elapsed_ms: 5,
                },
                outcome: Outcome::Completed,
            }),
        });
        assert_eq!(s.bars, vec![1, 2, 3]);
        assert!(s.sorted.iter().all(|d| *d));
        assert_eq!(s.stats.swaps, 2);
        assert!(s.info.contains("Quick Sort finished"));
    }

    #[test]
    fn pause_and_resume_update_status() {
        let mut s = with_bars(&[1]);
        s.apply_event(SortEvent::StateChanged(RunState::Running));
        s.apply_event(SortEvent::StateChanged(RunState::Paused));
        assert_eq!(s.info, "Paused");
        s.apply_event(SortEvent::StateChanged(RunState::Running));
        assert_eq!(s.info, "Resumed");
        assert_eq!(s.run_state, RunState::Running);
    }
}
