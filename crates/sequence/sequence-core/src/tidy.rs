//! Gap filling and interpolation
//!
//! Functions for aligning a series to its nominal step and filling the
//! missing markers that alignment leaves behind.

use sequence_spi::{Result, Sequence};

/// Align a series to its nominal step.
///
/// - a point at or before the previous one, or closer than half a step,
///   replaces the earlier point;
/// - a gap that rounds to one step is rebased onto the grid;
/// - a gap that rounds to `k > 1` steps gets `k - 1` missing markers before
///   the point is placed on the grid.
pub fn tidy_up(sequence: &Sequence) -> Result<Sequence> {
    let step = sequence.step();
    if step <= 0 || sequence.len() < 2 {
        return Ok(sequence.clone());
    }

    let mut timestamps: Vec<i64> = Vec::with_capacity(sequence.len());
    let mut values: Vec<f64> = Vec::with_capacity(sequence.len());

    for (&t, &v) in sequence.timestamps().iter().zip(sequence.values()) {
        while let Some(&last) = timestamps.last() {
            if t <= last || (t - last) * 2 < step {
                timestamps.pop();
                values.pop();
            } else {
                break;
            }
        }

        match timestamps.last().copied() {
            None => {
                timestamps.push(t);
                values.push(v);
            }
            Some(last) => {
                let k = ((t - last) as f64 / step as f64).round().max(1.0) as i64;
                for j in 1..k {
                    timestamps.push(last + j * step);
                    values.push(f64::NAN);
                }
                timestamps.push(last + k * step);
                values.push(v);
            }
        }
    }

    Ok(Sequence::with_step(timestamps, values, step)?
        .named(sequence.name())
        .with_labels(sequence.labels().clone()))
}

/// Fill missing values by piecewise-linear interpolation against timestamps.
///
/// Leading and trailing gaps take the nearest defined value. A fully
/// defined series is returned unchanged, and so is a series with no
/// defined value at all.
pub fn sequence_interpolate(sequence: &Sequence) -> Sequence {
    if sequence.is_fully_defined() {
        return sequence.clone();
    }

    let values = sequence.values();
    let timestamps = sequence.timestamps();
    if values.iter().all(|v| v.is_nan()) {
        return sequence.clone();
    }

    let n = values.len();
    let mut prev = vec![None; n];
    let mut last_valid = None;
    for i in 0..n {
        if !values[i].is_nan() {
            last_valid = Some(i);
        }
        prev[i] = last_valid;
    }
    let mut next = vec![None; n];
    let mut next_valid = None;
    for i in (0..n).rev() {
        if !values[i].is_nan() {
            next_valid = Some(i);
        }
        next[i] = next_valid;
    }

    let filled: Vec<f64> = (0..n)
        .map(|i| {
            if !values[i].is_nan() {
                return values[i];
            }
            match (prev[i], next[i]) {
                (Some(p), Some(q)) => {
                    let span = (timestamps[q] - timestamps[p]) as f64;
                    let ratio = (timestamps[i] - timestamps[p]) as f64 / span;
                    values[p] + ratio * (values[q] - values[p])
                }
                (Some(p), None) => values[p],
                (None, Some(q)) => values[q],
                (None, None) => f64::NAN,
            }
        })
        .collect();

    // lengths are unchanged, so this cannot fail
    sequence.with_values(filled).unwrap_or_else(|_| sequence.clone())
}

/// Fill leading and trailing `NaN` runs with the nearest defined value.
pub fn trim_head_and_tail_nan(values: &[f64]) -> Vec<f64> {
    let mut result = values.to_vec();
    let first = match result.iter().position(|v| !v.is_nan()) {
        Some(i) => i,
        None => return result,
    };
    let last = result.iter().rposition(|v| !v.is_nan()).unwrap_or(first);

    let head = result[first];
    for v in result.iter_mut().take(first) {
        *v = head;
    }
    let tail = result[last];
    for v in result.iter_mut().skip(last + 1) {
        *v = tail;
    }
    result
}

/// Replace flagged points by their predecessor.
pub fn remove_spikes(values: &[f64], flags: &[bool]) -> Vec<f64> {
    let mut result = values.to_vec();
    for i in 1..result.len().min(flags.len()) {
        if flags[i] {
            result[i] = result[i - 1];
        }
    }
    result
}

/// Interpolate missing values (marked as NaN) by position.
pub fn interpolate_linear(data: &[f64]) -> Vec<f64> {
    let sequence = Sequence::from_values(0, 1, data.to_vec());
    sequence_interpolate(&sequence).values().to_vec()
}
