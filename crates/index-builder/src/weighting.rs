//! Constituent weighting: raw weight computation per method, then an
//! iterative cap-and-renormalize pass so no single constituent ever holds
//! more than `max_weight_per_trader` of the index.

use smart_money_core::types::WeightingMethod;

#[derive(Debug, Clone, Copy)]
pub struct WeightInput {
    pub score: f64,
    pub sharpe: f64,
    pub volume: f64,
}

pub fn raw_weights(inputs: &[WeightInput], method: WeightingMethod) -> Vec<f64> {
    let n = inputs.len();
    if n == 0 {
        return Vec::new();
    }
    match method {
        WeightingMethod::Equal => vec![1.0 / n as f64; n],
        WeightingMethod::ScoreWeighted => {
            let total: f64 = inputs.iter().map(|i| i.score).sum();
            proportional(inputs.iter().map(|i| i.score), total, n)
        }
        WeightingMethod::SharpeWeighted => {
            let total: f64 = inputs.iter().map(|i| i.sharpe.max(0.0)).sum();
            proportional(inputs.iter().map(|i| i.sharpe.max(0.0)), total, n)
        }
        WeightingMethod::VolumeWeighted => {
            let total: f64 = inputs.iter().map(|i| i.volume).sum();
            proportional(inputs.iter().map(|i| i.volume), total, n)
        }
    }
}

fn proportional(values: impl Iterator<Item = f64>, total: f64, n: usize) -> Vec<f64> {
    if total <= 0.0 {
        return vec![1.0 / n as f64; n];
    }
    values.map(|v| v / total).collect()
}

/// Caps every weight at `cap` and redistributes the residual proportionally
/// among the remaining uncapped constituents, repeating until no weight
/// exceeds the cap (or a single constituent remains, which absorbs whatever
/// residual is left even if that means it alone holds the full weight).
pub fn cap_and_renormalize(weights: &mut [f64], cap: f64) {
    let n = weights.len();
    if n == 0 {
        return;
    }
    if cap * n as f64 < 1.0 - 1e-9 {
        // Cap is infeasible for this many constituents; fall back to equal
        // weights rather than loop forever.
        let equal = 1.0 / n as f64;
        weights.iter_mut().for_each(|w| *w = equal);
        return;
    }

    let mut locked = vec![false; n];
    loop {
        let locked_sum: f64 = (0..n).filter(|&i| locked[i]).map(|i| weights[i]).sum();
        let unlocked: Vec<usize> = (0..n).filter(|&i| !locked[i]).collect();
        if unlocked.is_empty() {
            break;
        }
        let unlocked_sum: f64 = unlocked.iter().map(|&i| weights[i]).sum();
        let residual = (1.0 - locked_sum).max(0.0);

        for &i in &unlocked {
            weights[i] = if unlocked_sum > 0.0 {
                weights[i] / unlocked_sum * residual
            } else {
                residual / unlocked.len() as f64
            };
        }

        let mut newly_locked = false;
        for &i in &unlocked {
            if weights[i] > cap + 1e-9 {
                weights[i] = cap;
                locked[i] = true;
                newly_locked = true;
            }
        }
        if !newly_locked {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_weighting_splits_evenly() {
        let inputs = vec![WeightInput { score: 10.0, sharpe: 1.0, volume: 100.0 }; 4];
        let weights = raw_weights(&inputs, WeightingMethod::Equal);
        assert!(weights.iter().all(|&w| (w - 0.25).abs() < 1e-9));
    }

    #[test]
    fn score_weighted_matches_share_of_total() {
        let inputs = vec![
            WeightInput { score: 300.0, sharpe: 0.0, volume: 0.0 },
            WeightInput { score: 100.0, sharpe: 0.0, volume: 0.0 },
        ];
        let weights = raw_weights(&inputs, WeightingMethod::ScoreWeighted);
        assert!((weights[0] - 0.75).abs() < 1e-9);
        assert!((weights[1] - 0.25).abs() < 1e-9);
    }

    #[test]
    fn negative_sharpe_is_floored_to_zero_before_weighting() {
        let inputs = vec![
            WeightInput { score: 0.0, sharpe: 5.0, volume: 0.0 },
            WeightInput { score: 0.0, sharpe: -3.0, volume: 0.0 },
        ];
        let weights = raw_weights(&inputs, WeightingMethod::SharpeWeighted);
        assert_eq!(weights[1], 0.0);
        assert_eq!(weights[0], 1.0);
    }

    #[test]
    fn cap_then_renormalize_converges_after_one_wallet_dominates() {
        // One score-1000 wallet against nine score-10 wallets, cap at 0.20.
        let mut weights = vec![0.917, 0.009, 0.009, 0.009, 0.009, 0.009, 0.009, 0.009, 0.009, 0.009];
        cap_and_renormalize(&mut weights, 0.20);

        assert!((weights[0] - 0.20).abs() < 1e-3);
        for &w in &weights[1..] {
            assert!((w - 0.0889).abs() < 1e-3);
        }
        let total: f64 = weights.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cap_and_renormalize_is_idempotent() {
        let mut weights = vec![0.917, 0.009, 0.009, 0.009, 0.009, 0.009, 0.009, 0.009, 0.009, 0.009];
        cap_and_renormalize(&mut weights, 0.20);
        let first_pass = weights.clone();
        cap_and_renormalize(&mut weights, 0.20);
        for (a, b) in first_pass.iter().zip(weights.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn infeasible_cap_falls_back_to_equal_weights() {
        let mut weights = vec![0.9, 0.05, 0.05];
        cap_and_renormalize(&mut weights, 0.1);
        for &w in &weights {
            assert!((w - 1.0 / 3.0).abs() < 1e-9);
        }
    }
}
