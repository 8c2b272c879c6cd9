//! Quadratic exchange sorts: bubble, selection, insertion.

use super::{StepResult, Stepper};

pub(crate) async fn bubble_sort(st: &mut Stepper) -> StepResult {
    let n = st.len();
    for pass in 0..n.saturating_sub(1) {
        for j in 0..n - pass - 1 {
            st.compare(j, j + 1).await?;
            // Strict: equal neighbours never move.
            if st.seq[j] > st.seq[j + 1] {
                st.swap(j, j + 1).await?;
            }
        }
        st.mark_sorted(n - pass - 1).await?;
    }
    Ok(())
}

pub(crate) async fn selection_sort(st: &mut Stepper) -> StepResult {
    let n = st.len();
    if n == 0 {
        return Ok(());
    }
    for i in 0..n - 1 {
        let mut min_idx = i;
        for j in i + 1..n {
            st.compare(j, min_idx).await?;
            if st.seq[j] < st.seq[min_idx] {
                min_idx = j;
            }
        }
        if min_idx != i {
            st.swap(i, min_idx).await?;
        }
        st.mark_sorted(i).await?;
    }
    st.mark_sorted(n - 1).await
}

pub(crate) async fn insertion_sort(st: &mut Stepper) -> StepResult {
    let n = st.len();
    if n == 0 {
        return Ok(());
    }
    st.mark_sorted(0).await?;
    for i in 1..n {
        let key = st.seq[i];
        st.inspect(i).await?;

        let mut hole = i;
        let shifted: StepResult = async {
            while hole > 0 {
                st.compare(hole - 1, hole).await?;
                if st.seq[hole - 1] > key {
                    let v = st.seq[hole - 1];
                    st.overwrite(hole, v, true).await?;
                    hole -= 1;
                } else {
                    break;
                }
            }
            Ok(())
        }
        .await;

        let placed = match shifted {
            Ok(()) => st.overwrite(hole, key, false).await,
            Err(c) => Err(c),
        };
        if let Err(c) = placed {
            // The key is held out of the sequence while shifting; put it back.
            st.seq[hole] = key;
            return Err(c);
        }
        st.mark_sorted(hole).await?;
    }
    Ok(())
}
