use super::{StepResult, Stepper};

pub(crate) async fn heap_sort(st: &mut Stepper) -> StepResult {
    let n = st.len();
    if n < 2 {
        return Ok(());
    }
    for i in (0..n / 2).rev() {
        sift_down(st, n, i).await?;
    }
    for end in (1..n).rev() {
        st.swap(0, end).await?;
        st.mark_sorted(end).await?;
        sift_down(st, end, 0).await?;
    }
    st.mark_sorted(0).await
}

/// Restore the max-heap property below `root` within the first `n` slots.
async fn sift_down(st: &mut Stepper, n: usize, mut root: usize) -> StepResult {
    loop {
        let mut largest = root;
        let left = 2 * root + 1;
        let right = 2 * root + 2;

        if left < n {
            st.compare(left, largest).await?;
            if st.seq[left] > st.seq[largest] {
                largest = left;
            }
        }
        if right < n {
            st.compare(right, largest).await?;
            if st.seq[right] > st.seq[largest] {
                largest = right;
            }
        }
        if largest == root {
            return Ok(());
        }
        st.swap(root, largest).await?;
        root = largest;
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::testing::trace;
    use crate::model::{Algorithm, TraceEvent};

    #[tokio::test]
    async fn heap_builds_then_extracts() {
        let (out, stats, events) = trace(Algorithm::Heap, vec![1, 3, 2]).await;
        assert_eq!(out, vec![1, 2, 3]);
        // Build: root 1 vs children 3 and 2, swap with 3.
        assert_eq!(
            &events[..3],
            &[
                TraceEvent::Compare(1, 0),
                TraceEvent::Compare(2, 1),
                TraceEvent::Swap(0, 1),
            ]
        );
        // Extraction of the last element marks slot 0 as sorted.
        assert_eq!(events.last(), Some(&TraceEvent::RegionSorted(0)));
        assert!(stats.swaps >= 3);
    }
}
