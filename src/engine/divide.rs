//! Divide-and-conquer sorts: top-down merge and Lomuto quicksort.

use super::{StepResult, Stepper};
use futures::future::{BoxFuture, FutureExt};

pub(crate) async fn merge_sort(st: &mut Stepper) -> StepResult {
    let n = st.len();
    if n < 2 {
        return Ok(());
    }
    merge_sort_range(st, 0, n - 1).await
}

fn merge_sort_range(st: &mut Stepper, left: usize, right: usize) -> BoxFuture<'_, StepResult> {
    async move {
        if left >= right {
            return Ok(());
        }
        let mid = (left + right) / 2;
        merge_sort_range(st, left, mid).await?;
        merge_sort_range(st, mid + 1, right).await?;
        merge(st, left, mid, right).await
    }
    .boxed()
}

/// Merge cursors: `i`/`j` index the buffered runs, `k` the next slot to write.
struct MergeCursor {
    i: usize,
    j: usize,
    k: usize,
}

async fn merge(st: &mut Stepper, left: usize, mid: usize, right: usize) -> StepResult {
    let lhs = st.seq[left..=mid].to_vec();
    let rhs = st.seq[mid + 1..=right].to_vec();
    let mut cur = MergeCursor { i: 0, j: 0, k: left };

    let res = merge_steps(st, &lhs, &rhs, mid, &mut cur).await;
    if res.is_err() {
        // Flush the unmerged tails so no value is lost on cancel.
        for &v in lhs[cur.i..].iter().chain(rhs[cur.j..].iter()) {
            st.seq[cur.k] = v;
            cur.k += 1;
        }
    }
    res
}

async fn merge_steps(
    st: &mut Stepper,
    lhs: &[u32],
    rhs: &[u32],
    mid: usize,
    cur: &mut MergeCursor,
) -> StepResult {
    while cur.i < lhs.len() && cur.j < rhs.len() {
        // The right head still sits in place: k never overtakes it.
        st.compare(cur.k, mid + 1 + cur.j).await?;
        if lhs[cur.i] <= rhs[cur.j] {
            st.overwrite(cur.k, lhs[cur.i], false).await?;
            cur.i += 1;
        } else {
            st.overwrite(cur.k, rhs[cur.j], true).await?;
            cur.j += 1;
        }
        cur.k += 1;
    }
    while cur.i < lhs.len() {
        st.overwrite(cur.k, lhs[cur.i], false).await?;
        cur.i += 1;
        cur.k += 1;
    }
    while cur.j < rhs.len() {
        st.overwrite(cur.k, rhs[cur.j], false).await?;
        cur.j += 1;
        cur.k += 1;
    }
    Ok(())
}

pub(crate) async fn quick_sort(st: &mut Stepper) -> StepResult {
    let n = st.len();
    if n < 2 {
        return Ok(());
    }
    quick_sort_range(st, 0, n - 1).await
}

fn quick_sort_range(st: &mut Stepper, low: usize, high: usize) -> BoxFuture<'_, StepResult> {
    async move {
        if low >= high {
            return Ok(());
        }
        let p = partition(st, low, high).await?;
        if p > low {
            quick_sort_range(st, low, p - 1).await?;
        }
        quick_sort_range(st, p + 1, high).await
    }
    .boxed()
}

/// Lomuto partition around `seq[high]`; returns the pivot's final slot.
async fn partition(st: &mut Stepper, low: usize, high: usize) -> Result<usize, super::Cancelled> {
    let pivot = st.seq[high];
    let mut store = low;
    for j in low..high {
        st.compare(j, high).await?;
        if st.seq[j] < pivot {
            if store != j {
                st.swap(store, j).await?;
            }
            store += 1;
        }
    }
    // Pivot placement moves two bars without counting as a swap.
    if store != high {
        let displaced = st.seq[store];
        st.overwrite(store, pivot, false).await?;
        if let Err(e) = st.overwrite(high, displaced, false).await {
            st.seq[high] = displaced;
            return Err(e);
        }
    }
    st.mark_sorted(store).await?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use crate::engine::testing::trace;
    use crate::model::{Algorithm, TraceEvent};

    #[tokio::test]
    async fn merge_counts_right_picks_as_swaps() {
        // [2,1]: one comparison, right element taken first.
        let (out, stats, events) = trace(Algorithm::Merge, vec![2, 1]).await;
        assert_eq!(out, vec![1, 2]);
        assert_eq!(stats.comparisons, 1);
        assert_eq!(stats.swaps, 1);
        assert_eq!(
            events,
            vec![
                TraceEvent::Compare(0, 1),
                TraceEvent::Overwrite(0, 1),
                TraceEvent::Overwrite(1, 2),
            ]
        );
    }

    #[tokio::test]
    async fn merge_left_wins_ties() {
        let (_, stats, _) = trace(Algorithm::Merge, vec![5, 5]).await;
        assert_eq!(stats.comparisons, 1);
        assert_eq!(stats.swaps, 0);
    }

    #[tokio::test]
    async fn quick_partitions_around_last_element() {
        let (out, stats, events) = trace(Algorithm::Quick, vec![3, 1, 2]).await;
        assert_eq!(out, vec![1, 2, 3]);
        // Pivot 2: 3 stays right, 1 swaps to the front, pivot lands at slot 1.
        assert_eq!(
            &events[..6],
            &[
                TraceEvent::Compare(0, 2),
                TraceEvent::Compare(1, 2),
                TraceEvent::Swap(0, 1),
                TraceEvent::Overwrite(1, 2),
                TraceEvent::Overwrite(2, 3),
                TraceEvent::RegionSorted(1),
            ]
        );
        assert_eq!(stats.comparisons, 2);
        // Only the in-loop exchange is counted.
        assert_eq!(stats.swaps, 1);
    }
}
