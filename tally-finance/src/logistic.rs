//! Multinomial logistic regression over sparse TF-IDF features.

use serde::{Deserialize, Serialize};

use crate::tfidf::SparseVector;

/// Optimizer settings for [`LogisticRegression::fit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    /// Inverse L2 regularization strength
    pub c: f64,
    pub learning_rate: f64,
    pub max_iterations: usize,
    /// Stop once the largest gradient component falls below this
    pub tolerance: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            learning_rate: 1.0,
            max_iterations: 500,
            tolerance: 1e-5,
        }
    }
}

/// One weight row and bias per class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    n_features: usize,
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl LogisticRegression {
    /// Full-batch gradient descent on the mean cross-entropy plus `||W||² / (2·C·n)`.
    ///
    /// `targets[i]` is a class index below `n_classes`.
    pub fn fit(
        samples: &[SparseVector],
        targets: &[usize],
        n_classes: usize,
        n_features: usize,
        params: &LogisticParams,
    ) -> Self {
        let mut model = Self {
            n_features,
            weights: vec![vec![0.0; n_features]; n_classes],
            bias: vec![0.0; n_classes],
        };
        if samples.is_empty() || n_classes < 2 {
            return model;
        }

        let n = samples.len() as f64;
        let l2 = 1.0 / (params.c * n);

        for _ in 0..params.max_iterations {
            let mut grad_w = vec![vec![0.0; n_features]; n_classes];
            let mut grad_b = vec![0.0; n_classes];

            for (x, &y) in samples.iter().zip(targets) {
                let probs = model.probabilities(x);
                for (k, p) in probs.iter().enumerate() {
                    let err = p - if k == y { 1.0 } else { 0.0 };
                    grad_b[k] += err / n;
                    for &(j, v) in x {
                        grad_w[k][j] += err * v / n;
                    }
                }
            }

            let mut max_grad: f64 = 0.0;
            for k in 0..n_classes {
                for j in 0..n_features {
                    let g = grad_w[k][j] + l2 * model.weights[k][j];
                    max_grad = max_grad.max(g.abs());
                    model.weights[k][j] -= params.learning_rate * g;
                }
                max_grad = max_grad.max(grad_b[k].abs());
                model.bias[k] -= params.learning_rate * grad_b[k];
            }

            if max_grad < params.tolerance {
                break;
            }
        }

        model
    }

    /// Softmax class probabilities.
    pub fn probabilities(&self, x: &SparseVector) -> Vec<f64> {
        let scores: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(w, b)| {
                b + x
                    .iter()
                    .filter(|(j, _)| *j < w.len())
                    .map(|&(j, v)| w[j] * v)
                    .sum::<f64>()
            })
            .collect();

        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        exps.into_iter().map(|e| e / total).collect()
    }

    /// Index of the most probable class; ties go to the lower index.
    pub fn predict(&self, x: &SparseVector) -> Option<usize> {
        let probs = self.probabilities(x);
        let mut best: Option<(usize, f64)> = None;
        for (k, p) in probs.into_iter().enumerate() {
            if best.is_none_or(|(_, bp)| p > bp) {
                best = Some((k, p));
            }
        }
        best.map(|(k, _)| k)
    }

    pub fn n_classes(&self) -> usize {
        self.bias.len()
    }

    pub(crate) fn is_consistent(&self, n_features: usize) -> bool {
        self.n_features == n_features
            && self.weights.len() == self.bias.len()
            && self.weights.iter().all(|w| w.len() == n_features)
    }
}
