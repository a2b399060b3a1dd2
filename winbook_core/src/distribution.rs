//! Exact win-count distributions over a fixed remaining-game horizon.
//!
//! Games are modeled as independent Bernoulli trials. That independence is a
//! modeling simplification, not a statistical guarantee: real outcomes share
//! weather, injuries and motivation, but the per-game probabilities supplied
//! by the spread model carry no covariance information to exploit.

use crate::error::{check_probability, Result};

/// Above this many games the 2^N enumeration gives way to the O(N²)
/// convolution. Both paths produce identical distributions.
const BRUTE_FORCE_MAX_GAMES: usize = 16;

/// P(exactly k wins) for k = 0..=N given per-game win probabilities.
///
/// Probabilities outside [0, 1] are rejected, never clamped: silently
/// coercing here would mask a bug in whatever produced them.
pub fn exact_distribution(probs: &[f64]) -> Result<Vec<f64>> {
    for &p in probs {
        check_probability(p)?;
    }

    if probs.is_empty() {
        return Ok(vec![1.0]);
    }

    if probs.len() <= BRUTE_FORCE_MAX_GAMES {
        Ok(enumerate_outcomes(probs))
    } else {
        Ok(convolve_bernoulli(probs))
    }
}

/// Enumerate all 2^N win/loss outcomes, accumulating joint probability by
/// win count. Exact, but exponential; fine for the small horizons this tool
/// works with.
fn enumerate_outcomes(probs: &[f64]) -> Vec<f64> {
    let n = probs.len();
    let mut result = vec![0.0; n + 1];

    for mask in 0u32..(1u32 << n) {
        let mut joint = 1.0;
        for (i, &p) in probs.iter().enumerate() {
            if mask & (1 << i) != 0 {
                joint *= p;
            } else {
                joint *= 1.0 - p;
            }
        }
        result[mask.count_ones() as usize] += joint;
    }

    result
}

/// O(N²) dynamic-programming convolution of per-game Bernoulli distributions.
/// Mathematically equivalent to the enumeration.
fn convolve_bernoulli(probs: &[f64]) -> Vec<f64> {
    let mut dist = vec![1.0];

    for &p in probs {
        let mut next = vec![0.0; dist.len() + 1];
        for (k, &d) in dist.iter().enumerate() {
            next[k] += d * (1.0 - p);
            next[k + 1] += d * p;
        }
        dist = next;
    }

    dist
}

/// P(at least k wins) from an exact distribution.
///
/// `cumulative[0]` is 1.0 by construction and the sequence is non-increasing.
pub fn cumulative_from_exact(exact: &[f64]) -> Vec<f64> {
    let n = exact.len();
    let mut cumulative = vec![1.0; n];
    if n == 0 {
        return cumulative;
    }

    cumulative[n - 1] = exact[n - 1];
    for k in (1..n - 1).rev() {
        cumulative[k] = exact[k] + cumulative[k + 1];
    }

    cumulative
}
