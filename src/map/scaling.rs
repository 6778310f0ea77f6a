//! @acp:module "BYM2 Scaling"
//! @acp:summary "Scaling factor for the ICAR component of a BYM2 model"
//! @acp:domain stats
//! @acp:layer core
//!
//! The ICAR precision `Q = D - A` is singular. It is perturbed by a tiny
//! multiple of the identity, inverted, and conditioned on the sum-to-zero
//! constraint; the scaling factor is the geometric mean of the resulting
//! marginal variances.

use super::adjacency::AdjacencyGraph;
use crate::error::{CaseStudyError, Result};

/// Row-major square matrix
struct Dense {
    n: usize,
    data: Vec<f64>,
}

impl Dense {
    fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    fn at(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    fn at_mut(&mut self, i: usize, j: usize) -> &mut f64 {
        &mut self.data[i * self.n + j]
    }
}

/// ICAR precision matrix of the graph
fn icar_precision(graph: &AdjacencyGraph) -> Dense {
    let n = graph.node_count();
    let mut q = Dense::zeros(n);
    for i in 0..n {
        let neighbours = graph.neighbours(i);
        *q.at_mut(i, i) = neighbours.len() as f64;
        for j in neighbours {
            *q.at_mut(i, j) = -1.0;
        }
    }
    q
}

/// Lower Cholesky factor; `None` if the matrix is not positive definite
fn cholesky(a: &Dense) -> Option<Dense> {
    let n = a.n;
    let mut l = Dense::zeros(n);
    for j in 0..n {
        let mut diag = a.at(j, j);
        for k in 0..j {
            diag -= l.at(j, k).powi(2);
        }
        if diag <= 0.0 {
            return None;
        }
        let d = diag.sqrt();
        *l.at_mut(j, j) = d;
        for i in j + 1..n {
            let mut s = a.at(i, j);
            for k in 0..j {
                s -= l.at(i, k) * l.at(j, k);
            }
            *l.at_mut(i, j) = s / d;
        }
    }
    Some(l)
}

/// Inverse of `L L^T`, one column at a time
fn cholesky_inverse(l: &Dense) -> Dense {
    let n = l.n;
    let mut inv = Dense::zeros(n);
    let mut y = vec![0.0; n];
    let mut x = vec![0.0; n];
    for col in 0..n {
        // L y = e_col
        for i in 0..n {
            let mut s = if i == col { 1.0 } else { 0.0 };
            for k in 0..i {
                s -= l.at(i, k) * y[k];
            }
            y[i] = s / l.at(i, i);
        }
        // L^T x = y
        for i in (0..n).rev() {
            let mut s = y[i];
            for k in i + 1..n {
                s -= l.at(k, i) * x[k];
            }
            x[i] = s / l.at(i, i);
        }
        for i in 0..n {
            *inv.at_mut(i, col) = x[i];
        }
    }
    inv
}

/// @acp:summary "Marginal variances of the sum-to-zero constrained ICAR"
pub fn icar_marginal_variances(graph: &AdjacencyGraph) -> Result<Vec<f64>> {
    let n = graph.node_count();
    if n < 2 {
        return Err(CaseStudyError::invalid("BYM2 needs at least two regions"));
    }
    let components = graph.component_count();
    if components != 1 {
        return Err(CaseStudyError::invalid(format!(
            "map has {} disconnected parts (islands: {:?}); connect them first",
            components,
            graph.islands()
        )));
    }

    let mut q = icar_precision(graph);
    let max_diag = (0..n).map(|i| q.at(i, i)).fold(0.0, f64::max);
    let jitter = max_diag * f64::EPSILON.sqrt();
    for i in 0..n {
        *q.at_mut(i, i) += jitter;
    }

    let l = cholesky(&q)
        .ok_or_else(|| CaseStudyError::invalid("perturbed ICAR precision is not positive definite"))?;
    let q_inv = cholesky_inverse(&l);

    // condition on sum(phi) = 0: Sigma - Sigma 1 1' Sigma / (1' Sigma 1)
    let w: Vec<f64> = (0..n).map(|i| (0..n).map(|j| q_inv.at(i, j)).sum()).collect();
    let total: f64 = w.iter().sum();
    Ok((0..n).map(|i| q_inv.at(i, i) - w[i] * w[i] / total).collect())
}

/// @acp:summary "Geometric mean of the constrained ICAR variances"
pub fn bym2_scaling_factor(graph: &AdjacencyGraph) -> Result<f64> {
    let variances = icar_marginal_variances(graph)?;
    let mean_log = variances.iter().map(|v| v.ln()).sum::<f64>() / variances.len() as f64;
    Ok(mean_log.exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(neighbours: &[Vec<usize>]) -> AdjacencyGraph {
        let ids = (0..neighbours.len()).map(|i| i.to_string()).collect();
        AdjacencyGraph::from_neighbours(ids, neighbours).unwrap()
    }

    #[test]
    fn test_pair_of_regions() {
        // generalized inverse of [[1, -1], [-1, 1]] has 1/4 on the diagonal
        let g = graph(&[vec![1], vec![0]]);
        let v = icar_marginal_variances(&g).unwrap();
        assert!((v[0] - 0.25).abs() < 1e-6, "{:?}", v);
        assert!((bym2_scaling_factor(&g).unwrap() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_four_cycle() {
        // eigenvalues 2, 2, 4 give trace 1/2 + 1/2 + 1/4 spread over 4 nodes
        let g = graph(&[vec![1, 3], vec![0, 2], vec![1, 3], vec![0, 2]]);
        let s = bym2_scaling_factor(&g).unwrap();
        assert!((s - 0.3125).abs() < 1e-6, "scaling factor = {}", s);
    }

    #[test]
    fn test_path_of_three() {
        // diagonal of the generalized inverse: 5/9, 2/9, 5/9
        let g = graph(&[vec![1], vec![0, 2], vec![1]]);
        let v = icar_marginal_variances(&g).unwrap();
        assert!((v[0] - 5.0 / 9.0).abs() < 1e-6, "{:?}", v);
        assert!((v[1] - 2.0 / 9.0).abs() < 1e-6, "{:?}", v);
        let expected = (5.0f64 / 9.0 * 5.0 / 9.0 * 2.0 / 9.0).cbrt();
        assert!((bym2_scaling_factor(&g).unwrap() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_disconnected_rejected() {
        let g = graph(&[vec![1], vec![0], vec![]]);
        let err = bym2_scaling_factor(&g).unwrap_err();
        assert!(err.to_string().contains("disconnected"), "{}", err);

        assert!(bym2_scaling_factor(&graph(&[vec![]])).is_err());
    }
}
