//! Non-comparison sorts: counting sort and LSD radix sort (base 10).
//!
//! Both tally every key with a counted `Compare(i, i)` so the comparison counter
//! tracks the input scans, scatter in reverse for stability, then copy the output
//! buffer back with counted overwrites.

use super::{StepResult, Stepper};

pub(crate) async fn counting_sort(st: &mut Stepper) -> StepResult {
    let n = st.len();
    let (Some(&min), Some(&max)) = (st.seq.iter().min(), st.seq.iter().max()) else {
        return Ok(());
    };
    let mut counts = vec![0usize; (max - min) as usize + 1];

    for i in 0..n {
        st.compare(i, i).await?;
        counts[(st.seq[i] - min) as usize] += 1;
    }
    for k in 1..counts.len() {
        counts[k] += counts[k - 1];
    }

    let mut output = vec![0u32; n];
    for i in (0..n).rev() {
        st.inspect(i).await?;
        let v = st.seq[i];
        let slot = &mut counts[(v - min) as usize];
        *slot -= 1;
        output[*slot] = v;
    }

    copy_back(st, &output, true).await
}

pub(crate) async fn radix_sort(st: &mut Stepper) -> StepResult {
    let Some(&max) = st.seq.iter().max() else {
        return Ok(());
    };
    let mut exp = 1u32;
    while max / exp > 0 {
        sort_by_digit(st, exp).await?;
        match exp.checked_mul(10) {
            Some(next) => exp = next,
            None => break,
        }
    }
    Ok(())
}

async fn sort_by_digit(st: &mut Stepper, exp: u32) -> StepResult {
    let n = st.len();
    let digit = |v: u32| ((v / exp) % 10) as usize;
    let mut counts = [0usize; 10];

    for i in 0..n {
        st.compare(i, i).await?;
        counts[digit(st.seq[i])] += 1;
    }
    for d in 1..10 {
        counts[d] += counts[d - 1];
    }

    let mut output = vec![0u32; n];
    for i in (0..n).rev() {
        st.inspect(i).await?;
        let v = st.seq[i];
        let slot = &mut counts[digit(v)];
        *slot -= 1;
        output[*slot] = v;
    }

    copy_back(st, &output, false).await
}

/// Copy `output` over the sequence, one counted overwrite per slot.
async fn copy_back(st: &mut Stepper, output: &[u32], mark_sorted: bool) -> StepResult {
    for (i, &v) in output.iter().enumerate() {
        let res = match st.overwrite(i, v, true).await {
            Ok(()) if mark_sorted => st.mark_sorted(i).await,
            other => other,
        };
        if let Err(c) = res {
            // Flush the pending tail so the sequence stays a permutation.
            st.seq[i..].copy_from_slice(&output[i..]);
            return Err(c);
        }
    }
    Ok(())
}
