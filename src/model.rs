use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Run configuration assembled from CLI arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub algorithm: Algorithm,
    pub size: usize,
    pub speed: u32,
    #[serde(default)]
    pub seed: Option<u64>,
    pub pacing: Pacing,
}

/// Base delay per trace event kind. The effective delay is `base / speed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacing {
    #[serde(with = "humantime_serde")]
    pub compare: Duration,
    #[serde(with = "humantime_serde")]
    pub swap: Duration,
    #[serde(with = "humantime_serde")]
    pub overwrite: Duration,
    #[serde(with = "humantime_serde")]
    pub inspect: Duration,
    #[serde(with = "humantime_serde")]
    pub sorted: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            compare: Duration::from_millis(400),
            swap: Duration::from_millis(600),
            overwrite: Duration::from_millis(400),
            inspect: Duration::from_millis(200),
            sorted: Duration::ZERO,
        }
    }
}

impl Pacing {
    /// Pacing with every delay zeroed; steps still yield to the runtime.
    pub fn instant() -> Self {
        Self {
            compare: Duration::ZERO,
            swap: Duration::ZERO,
            overwrite: Duration::ZERO,
            inspect: Duration::ZERO,
            sorted: Duration::ZERO,
        }
    }

    pub fn base_delay(&self, ev: &TraceEvent) -> Duration {
        match ev {
            TraceEvent::Compare(..) => self.compare,
            TraceEvent::Swap(..) => self.swap,
            TraceEvent::Overwrite(..) => self.overwrite,
            TraceEvent::Inspect(_) => self.inspect,
            TraceEvent::RegionSorted(_) => self.sorted,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Bubble,
    Selection,
    Insertion,
    Merge,
    Quick,
    Heap,
    Counting,
    Radix,
}

impl Algorithm {
    pub const ALL: [Algorithm; 8] = [
        Algorithm::Bubble,
        Algorithm::Selection,
        Algorithm::Insertion,
        Algorithm::Merge,
        Algorithm::Quick,
        Algorithm::Heap,
        Algorithm::Counting,
        Algorithm::Radix,
    ];

    /// Comparison sorts; counting and radix only tally keys.
    pub fn is_comparison_based(self) -> bool {
        !matches!(self, Algorithm::Counting | Algorithm::Radix)
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|a| *a == self).unwrap_or(0)
    }

    /// Next algorithm in menu order, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn descriptor(self) -> &'static AlgorithmDescriptor {
        &DESCRIPTORS[self.index()]
    }
}

/// Static reference card shown next to the bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlgorithmDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub best: &'static str,
    pub average: &'static str,
    pub worst: &'static str,
    pub space: &'static str,
}

static DESCRIPTORS: [AlgorithmDescriptor; 8] = [
    AlgorithmDescriptor {
        name: "Bubble Sort",
        description: "A simple sorting algorithm that repeatedly steps through the list, compares adjacent elements and swaps them if they are in the wrong order. The pass through the list is repeated until the list is sorted.",
        best: "O(n)",
        average: "O(n²)",
        worst: "O(n²)",
        space: "O(1)",
    },
    AlgorithmDescriptor {
        name: "Selection Sort",
        description: "A simple comparison-based sorting algorithm. It divides the list into a sorted and unsorted region. It repeatedly selects the smallest (or largest) element from the unsorted region and moves it to the end of the sorted region.",
        best: "O(n²)",
        average: "O(n²)",
        worst: "O(n²)",
        space: "O(1)",
    },
    AlgorithmDescriptor {
        name: "Insertion Sort",
        description: "A simple sorting algorithm that builds the final sorted array one item at a time. It iterates through the array, growing the sorted portion behind it. For each element, it finds the appropriate position in the sorted portion and inserts it there.",
        best: "O(n)",
        average: "O(n²)",
        worst: "O(n²)",
        space: "O(1)",
    },
    AlgorithmDescriptor {
        name: "Merge Sort",
        description: "A highly efficient, comparison-based, divide-and-conquer sorting algorithm. It divides the unsorted list into n sub-lists, each containing one element, and then repeatedly merges sub-lists to produce new sorted sub-lists until there is only one sub-list remaining.",
        best: "O(n log n)",
        average: "O(n log n)",
        worst: "O(n log n)",
        space: "O(n)",
    },
    AlgorithmDescriptor {
        name: "Quick Sort",
        description: "An efficient sorting algorithm that uses a divide-and-conquer approach. It works by selecting a 'pivot' element from the array and partitioning the other elements into two sub-arrays, according to whether they are less than or greater than the pivot.",
        best: "O(n log n)",
        average: "O(n log n)",
        worst: "O(n²)",
        space: "O(log n)",
    },
    AlgorithmDescriptor {
        name: "Heap Sort",
        description: "A comparison-based sorting algorithm that uses a binary heap data structure. It divides its input into a sorted and unsorted region, and iteratively shrinks the unsorted region by extracting the largest element and moving it to the sorted region.",
        best: "O(n log n)",
        average: "O(n log n)",
        worst: "O(n log n)",
        space: "O(1)",
    },
    AlgorithmDescriptor {
        name: "Counting Sort",
        description: "A non-comparison based sorting algorithm. It operates by counting the number of objects that possess distinct key values, and then applying prefix sum on those counts to determine the positions of each key value in the output sequence.",
        best: "O(n + k)",
        average: "O(n + k)",
        worst: "O(n + k)",
        space: "O(k)",
    },
    AlgorithmDescriptor {
        name: "Radix Sort",
        description: "A non-comparison based sorting algorithm that sorts data with integer keys by grouping the keys by individual digits which share the same significant position and value. It processes digits from least significant to most significant.",
        best: "O(nk)",
        average: "O(nk)",
        worst: "O(nk)",
        space: "O(n + k)",
    },
];

/// Lifecycle phase of the visualizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
}

impl RunState {
    /// Running or paused: configuration is locked.
    pub fn is_active(self) -> bool {
        matches!(self, RunState::Running | RunState::Paused)
    }
}

/// One abstract step reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceEvent {
    Compare(usize, usize),
    Swap(usize, usize),
    Overwrite(usize, u32),
    /// Highlight a slot without counting it.
    Inspect(usize),
    RegionSorted(usize),
}

/// Live counters. The engine owns the counters, the sampler owns `elapsed_ms`.
#[derive(Debug, Default)]
pub struct Statistics {
    comparisons: AtomicU64,
    swaps: AtomicU64,
    elapsed_ms: AtomicU64,
}

impl Statistics {
    pub fn add_comparison(&self) {
        self.comparisons.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_swap(&self) {
        self.swaps.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_elapsed(&self, elapsed: Duration) {
        self.elapsed_ms
            .store(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.comparisons.store(0, Ordering::Relaxed);
        self.swaps.store(0, Ordering::Relaxed);
        self.elapsed_ms.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            comparisons: self.comparisons.load(Ordering::Relaxed),
            swaps: self.swaps.load(Ordering::Relaxed),
            elapsed_ms: self.elapsed_ms.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub comparisons: u64,
    pub swaps: u64,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(default)]
    pub timestamp_utc: String,
    pub algorithm: Algorithm,
    pub size: usize,
    pub initial: Vec<u32>,
    pub sorted: Vec<u32>,
    pub stats: StatsSnapshot,
    pub outcome: Outcome,
}

/// Events sent from the controller to presentation layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SortEvent {
    RunStarted {
        algorithm: Algorithm,
        sequence: Vec<u32>,
    },
    Trace(TraceEvent),
    StatsTick(StatsSnapshot),
    StateChanged(RunState),
    SequenceReplaced(Vec<u32>),
    AlgorithmChanged(Algorithm),
    SpeedChanged(u32),
    Info(InfoEvent),
    RunCompleted {
        // Boxed: the result carries two copies of the sequence.
        result: Box<RunResult>,
    },
}

/// Structured info events consumed by UI/CLI layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InfoEvent {
    Message(String),
    /// Engine task ended abnormally; the pre-run sequence was restored.
    EngineFailed { reason: String },
}

impl InfoEvent {
    /// Render a human-readable message for UI/CLI layers.
    pub fn to_message(&self) -> String {
        match self {
            InfoEvent::Message(msg) => msg.clone(),
            InfoEvent::EngineFailed { reason } => {
                format!("Sort task failed: {reason}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_cycle_wraps() {
        assert_eq!(Algorithm::Radix.next(), Algorithm::Bubble);
        assert_eq!(Algorithm::Bubble.prev(), Algorithm::Radix);
        for a in Algorithm::ALL {
            assert_eq!(a.next().prev(), a);
        }
    }

    #[test]
    fn descriptors_line_up_with_algorithms() {
        assert_eq!(Algorithm::Quick.descriptor().name, "Quick Sort");
        assert_eq!(Algorithm::Quick.descriptor().worst, "O(n²)");
        assert_eq!(Algorithm::Counting.descriptor().space, "O(k)");
        assert_eq!(Algorithm::Radix.descriptor().name, "Radix Sort");
        assert!(Algorithm::Merge
            .descriptor()
            .description
            .starts_with("A highly efficient, comparison-based, divide-and-conquer"));
        assert!(Algorithm::Quick
            .descriptor()
            .description
            .contains("selecting a 'pivot' element"));
        assert!(Algorithm::Radix
            .descriptor()
            .description
            .ends_with("from least significant to most significant."));
    }

    #[test]
    fn statistics_start_at_zero_and_reset() {
        let stats = Statistics::default();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
        stats.add_comparison();
        stats.add_swap();
        stats.set_elapsed(Duration::from_millis(250));
        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                comparisons: 1,
                swaps: 1,
                elapsed_ms: 250
            }
        );
        stats.reset();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn pacing_roundtrips_with_humantime() {
        let json = serde_json::to_string(&Pacing::default()).unwrap();
        assert!(json.contains("\"400ms\""));
        let back: Pacing = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Pacing::default());
    }
}
