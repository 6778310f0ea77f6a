//! @acp:module "Convergence Diagnostics"
//! @acp:summary "Rank-normalized split-chain ESS and R-hat"
//! @acp:domain stats
//! @acp:layer core
//!
//! ## Algorithm
//!
//! Bulk ESS and R-hat follow Vehtari et al. (2021):
//! 1. Pool all draws and replace each by its (average) rank
//! 2. Map ranks to normal scores with `(r - 3/8) / (S + 1/4)`
//! 3. Split every chain in half so within-chain trends show up as
//!    between-chain variance
//! 4. ESS uses Geyer's initial monotone sequence over the combined
//!    autocorrelation; R-hat compares between- and within-chain variance
//!
//! Every function takes draws as one `Vec<f64>` per chain. Chains of
//! unequal length are truncated to the shortest.

/// Minimum draws per (split) chain for a finite estimate
const MIN_DRAWS: usize = 4;

/// Inverse of the standard normal CDF (Acklam's rational approximation,
/// relative error below 1.2e-9).
pub fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.02425;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

fn mean(x: &[f64]) -> f64 {
    x.iter().sum::<f64>() / x.len() as f64
}

/// Sample variance (n - 1 denominator)
fn variance(x: &[f64]) -> f64 {
    let m = mean(x);
    x.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (x.len() as f64 - 1.0)
}

fn median(x: &[f64]) -> f64 {
    let mut sorted = x.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

fn truncate(chains: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = chains.iter().map(Vec::len).min().unwrap_or(0);
    chains.iter().map(|c| c[..n].to_vec()).collect()
}

fn usable(chains: &[Vec<f64>]) -> bool {
    !chains.is_empty()
        && chains.iter().all(|c| c.len() >= MIN_DRAWS)
        && chains.iter().flatten().all(|v| v.is_finite())
}

fn is_constant(chains: &[Vec<f64>]) -> bool {
    let first = chains[0][0];
    chains.iter().flatten().all(|v| *v == first)
}

/// Split every chain into a first and second half, dropping the middle
/// draw of odd-length chains
pub fn split_chains(chains: &[Vec<f64>]) -> Vec<Vec<f64>> {
    chains
        .iter()
        .flat_map(|c| {
            let half = c.len() / 2;
            [c[..half].to_vec(), c[c.len() - half..].to_vec()]
        })
        .collect()
}

/// Replace draws by normal scores of their pooled average ranks
pub fn rank_normalize(chains: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let pooled: Vec<(usize, f64)> = chains.iter().flatten().copied().enumerate().collect();
    let s = pooled.len();
    let mut order: Vec<usize> = (0..s).collect();
    order.sort_by(|&a, &b| pooled[a].1.total_cmp(&pooled[b].1));

    let mut ranks = vec![0.0; s];
    let mut i = 0;
    while i < s {
        let mut j = i;
        while j + 1 < s && pooled[order[j + 1]].1 == pooled[order[i]].1 {
            j += 1;
        }
        // ties share the mean of their 1-based ranks
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for k in i..=j {
            ranks[order[k]] = rank;
        }
        i = j + 1;
    }

    let denom = s as f64 + 0.25;
    let mut offset = 0;
    chains
        .iter()
        .map(|c| {
            let z = ranks[offset..offset + c.len()]
                .iter()
                .map(|r| normal_quantile((r - 0.375) / denom))
                .collect();
            offset += c.len();
            z
        })
        .collect()
}

fn autocovariance(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    let m = mean(x);
    let centered: Vec<f64> = x.iter().map(|v| v - m).collect();
    (0..n)
        .map(|lag| {
            centered[..n - lag]
                .iter()
                .zip(&centered[lag..])
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n as f64
        })
        .collect()
}

/// Effective sample size of the draws as given (no splitting or ranking).
/// Returns NaN when there are too few draws, non-finite draws, or no variation.
pub fn ess(chains: &[Vec<f64>]) -> f64 {
    let chains = truncate(chains);
    if !usable(&chains) || is_constant(&chains) {
        return f64::NAN;
    }

    let m = chains.len();
    let n = chains[0].len();
    let nf = n as f64;

    let acov: Vec<Vec<f64>> = chains.iter().map(|c| autocovariance(c)).collect();
    let chain_means: Vec<f64> = chains.iter().map(|c| mean(c)).collect();
    let mean_var = acov.iter().map(|a| a[0] * nf / (nf - 1.0)).sum::<f64>() / m as f64;
    let mut var_plus = mean_var * (nf - 1.0) / nf;
    if m > 1 {
        var_plus += variance(&chain_means);
    }

    let mean_acov_at = |t: usize| acov.iter().map(|a| a[t]).sum::<f64>() / m as f64;

    let mut rho = vec![0.0; n];
    rho[0] = 1.0;
    let mut rho_even = 1.0;
    let mut rho_odd = 1.0 - (mean_var - mean_acov_at(1)) / var_plus;
    rho[1] = rho_odd;

    let mut t = 1;
    while t + 4 < n && rho_even + rho_odd > 0.0 {
        rho_even = 1.0 - (mean_var - mean_acov_at(t + 1)) / var_plus;
        rho_odd = 1.0 - (mean_var - mean_acov_at(t + 2)) / var_plus;
        if rho_even + rho_odd >= 0.0 {
            rho[t + 1] = rho_even;
            rho[t + 2] = rho_odd;
        }
        t += 2;
    }
    let max_t = t;
    if rho_even > 0.0 {
        rho[max_t + 1] = rho_even;
    }

    // initial monotone sequence
    let mut t = 1;
    while t + 3 <= max_t {
        if rho[t + 1] + rho[t + 2] > rho[t - 1] + rho[t] {
            rho[t + 1] = (rho[t - 1] + rho[t]) / 2.0;
            rho[t + 2] = rho[t + 1];
        }
        t += 2;
    }

    let draws = (m * n) as f64;
    let tau = -1.0 + 2.0 * rho[..max_t].iter().sum::<f64>() + rho[max_t + 1];
    let tau = tau.max(1.0 / draws.log10());
    draws / tau
}

/// Bulk effective sample size: ESS of the rank-normalized split chains
pub fn ess_bulk(chains: &[Vec<f64>]) -> f64 {
    let chains = truncate(chains);
    ess(&split_chains(&rank_normalize(&chains)))
}

/// Potential scale reduction of the chains as given
pub fn rhat_basic(chains: &[Vec<f64>]) -> f64 {
    let chains = truncate(chains);
    if chains.len() < 2 || !usable(&chains) || is_constant(&chains) {
        return f64::NAN;
    }
    let n = chains[0].len() as f64;
    let chain_means: Vec<f64> = chains.iter().map(|c| mean(c)).collect();
    let b = n * variance(&chain_means);
    let w = chains.iter().map(|c| variance(c)).sum::<f64>() / chains.len() as f64;
    let var_plus = (n - 1.0) / n * w + b / n;
    (var_plus / w).sqrt()
}

/// Rank-normalized split R-hat: the larger of the bulk and folded (tail) values
pub fn rhat(chains: &[Vec<f64>]) -> f64 {
    let chains = split_chains(&truncate(chains));
    if chains.is_empty() {
        return f64::NAN;
    }
    let pooled: Vec<f64> = chains.iter().flatten().copied().collect();
    if pooled.is_empty() {
        return f64::NAN;
    }
    let med = median(&pooled);
    let folded: Vec<Vec<f64>> = chains
        .iter()
        .map(|c| c.iter().map(|v| (v - med).abs()).collect())
        .collect();

    let bulk = rhat_basic(&rank_normalize(&chains));
    let tail = rhat_basic(&rank_normalize(&folded));
    bulk.max(tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rand_distr::StandardNormal;

    fn iid_chains(seed: u64, chains: usize, draws: usize) -> Vec<Vec<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..chains)
            .map(|_| (0..draws).map(|_| rng.sample(StandardNormal)).collect())
            .collect()
    }

    fn ar1_chains(seed: u64, chains: usize, draws: usize, phi: f64) -> Vec<Vec<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..chains)
            .map(|_| {
                let mut x = 0.0;
                (0..draws)
                    .map(|_| {
                        let e: f64 = rng.sample(StandardNormal);
                        x = phi * x + e;
                        x
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_normal_quantile() {
        assert!(normal_quantile(0.5).abs() < 1e-9);
        assert!((normal_quantile(0.975) - 1.959_963_985).abs() < 1e-6);
        assert!((normal_quantile(0.01) + 2.326_347_874).abs() < 1e-6);
        assert_eq!(normal_quantile(0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_rank_normalize_ties_and_symmetry() {
        let z = rank_normalize(&[vec![1.0, 2.0], vec![2.0, 3.0]]);
        assert_eq!(z[0][1], z[1][0]);
        assert!((z[0][0] + z[1][1]).abs() < 1e-9);
    }

    #[test]
    fn test_split_chains_drops_middle() {
        let split = split_chains(&[vec![1.0, 2.0, 3.0, 4.0, 5.0]]);
        assert_eq!(split, vec![vec![1.0, 2.0], vec![4.0, 5.0]]);
    }

    #[test]
    fn test_iid_ess_near_draw_count() {
        let chains = iid_chains(11, 4, 1000);
        let e = ess_bulk(&chains);
        assert!(e > 2800.0 && e < 5500.0, "ess_bulk = {}", e);
    }

    #[test]
    fn test_autocorrelated_ess_is_smaller() {
        let chains = ar1_chains(12, 4, 1000, 0.9);
        let e = ess_bulk(&chains);
        // theoretical ESS is N (1 - phi) / (1 + phi), about 210
        assert!(e > 80.0 && e < 500.0, "ess_bulk = {}", e);
    }

    #[test]
    fn test_rhat_mixed_and_stuck() {
        let mixed = iid_chains(13, 4, 500);
        let r = rhat(&mixed);
        assert!(r < 1.02, "rhat = {}", r);

        let mut stuck = iid_chains(14, 4, 500);
        for v in stuck[0].iter_mut() {
            *v += 5.0;
        }
        assert!(rhat(&stuck) > 1.1);
    }

    #[test]
    fn test_ess_of_linear_chain() {
        // autocorrelations 0.3, -0.14, -0.47: the first even/odd pair sums
        // below zero, so tau = -1 + 2 * (1 + 0.3) = 1.6
        let e = ess(&[vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]]);
        assert!((e - 3.75).abs() < 1e-12, "ess = {}", e);
    }

    #[test]
    fn test_ess_two_chains_with_offset_means() {
        // mean_var = 3.5, var_plus = 35/12 + 4.5 = 89/12
        // rho_1 = 129/178, rho_2 = 49/89, rho_3 = 75/178
        // lags 2 and 3 are kept, the scan stops at t = 3 and rho_2 is
        // carried into position 4
        let e = ess(&[
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            vec![4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
        ]);
        let tau = -1.0 + 2.0 * (1.0 + 129.0 / 178.0 + 49.0 / 89.0) + 49.0 / 89.0;
        assert!((e - 12.0 / tau).abs() < 1e-9, "ess = {}", e);
    }

    #[test]
    fn test_degenerate_inputs_are_nan() {
        assert!(ess(&[vec![1.0; 100], vec![1.0; 100]]).is_nan());
        assert!(ess_bulk(&[vec![0.0, 1.0]]).is_nan());
        assert!(rhat_basic(&[vec![1.0, 2.0, 3.0, 4.0]]).is_nan());
    }
}
