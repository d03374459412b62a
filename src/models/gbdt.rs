//! Gradient-boosted decision trees for binary churn classification.
//!
//! An additive ensemble of depth-bounded regression trees fitted to the
//! logistic loss: each round fits a tree to the current probability
//! residuals and takes a Newton step per leaf. Tree building is exact greedy
//! and fully deterministic for a fixed seed, so retraining on identical data
//! reproduces the ensemble bit for bit.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// Boosting hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtConfig {
    /// Number of sequential trees
    pub n_trees: usize,
    /// Maximum depth per tree
    pub max_depth: usize,
    /// Shrinkage applied to every leaf value
    pub learning_rate: f64,
    /// Minimum rows on each side of a split
    pub min_samples_leaf: usize,
    /// Fraction of rows drawn (without replacement) per tree; 1.0 disables
    /// subsampling
    pub subsample: f64,
    /// Seed for row subsampling
    pub seed: u64,
}

impl Default for GbdtConfig {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 3,
            learning_rate: 0.1,
            min_samples_leaf: 1,
            subsample: 1.0,
            seed: 42,
        }
    }
}

/// Node in a flat-arena regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// One regression tree of the ensemble. Leaf values already carry the
/// learning-rate shrinkage.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn predict(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Fitted gradient-boosted ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    config: GbdtConfig,
    /// Prior log-odds of the positive class
    base_score: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedTrees {
    /// Fit the ensemble on a preprocessed feature matrix and 0/1 labels.
    pub fn fit(matrix: &[Vec<f64>], labels: &[u8], config: GbdtConfig) -> Result<Self> {
        if matrix.is_empty() {
            return Err(PipelineError::DataValidation(
                "cannot fit classifier on an empty feature matrix".to_string(),
            ));
        }
        if matrix.len() != labels.len() {
            return Err(PipelineError::DataValidation(format!(
                "feature matrix has {} rows but {} labels were given",
                matrix.len(),
                labels.len()
            )));
        }

        let positives = labels.iter().filter(|&&y| y == 1).count();
        if positives == 0 || positives == labels.len() {
            return Err(PipelineError::DataValidation(
                "labels contain a single class; both classes are required".to_string(),
            ));
        }

        let n = matrix.len();
        let prior = positives as f64 / n as f64;
        let base_score = (prior / (1.0 - prior)).ln();

        let mut scores = vec![base_score; n];
        let mut trees = Vec::with_capacity(config.n_trees);
        let mut rng = Lcg::new(config.seed);

        for _ in 0..config.n_trees {
            // Logistic-loss gradients and Hessians at the current scores
            let mut gradients = Vec::with_capacity(n);
            let mut hessians = Vec::with_capacity(n);
            for (score, &label) in scores.iter().zip(labels) {
                let p = sigmoid(*score);
                gradients.push(label as f64 - p);
                hessians.push(p * (1.0 - p));
            }

            let rows = sample_rows(n, config.subsample, &mut rng);
            let mut builder = TreeBuilder {
                matrix,
                gradients: &gradients,
                hessians: &hessians,
                config: &config,
                nodes: Vec::new(),
            };
            builder.build(rows, 0);
            let tree = RegressionTree { nodes: builder.nodes };

            for (score, row) in scores.iter_mut().zip(matrix) {
                *score += tree.predict(row);
            }
            trees.push(tree);
        }

        Ok(Self {
            config,
            base_score,
            trees,
        })
    }

    /// Churn probability per row, in input order, each strictly inside (0, 1).
    pub fn predict_probability(&self, matrix: &[Vec<f64>]) -> Vec<f64> {
        matrix
            .iter()
            .map(|row| {
                let margin: f64 =
                    self.base_score + self.trees.iter().map(|t| t.predict(row)).sum::<f64>();
                sigmoid(margin)
            })
            .collect()
    }

    /// Number of fitted trees.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn sigmoid(x: f64) -> f64 {
    // Clamp keeps the output strictly inside (0, 1)
    let x = x.clamp(-30.0, 30.0);
    1.0 / (1.0 + (-x).exp())
}

fn sample_rows(n: usize, subsample: f64, rng: &mut Lcg) -> Vec<usize> {
    let mut rows: Vec<usize> = (0..n).collect();
    if subsample >= 1.0 {
        return rows;
    }

    let take = ((n as f64 * subsample) as usize).max(1);
    // Partial Fisher-Yates: the first `take` slots end up uniformly drawn
    for i in 0..take {
        let j = i + (rng.next() as usize) % (n - i);
        rows.swap(i, j);
    }
    rows.truncate(take);
    rows.sort_unstable();
    rows
}

/// 64-bit LCG; deterministic across platforms, unlike library RNGs whose
/// streams can shift between versions.
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9e3779b97f4a7c15),
        }
    }

    fn next(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state >> 11
    }
}

struct TreeBuilder<'a> {
    matrix: &'a [Vec<f64>],
    gradients: &'a [f64],
    hessians: &'a [f64],
    config: &'a GbdtConfig,
    nodes: Vec<TreeNode>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl TreeBuilder<'_> {
    /// Grow a node for `rows`, returning its arena index.
    fn build(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        if depth >= self.config.max_depth || rows.len() < 2 * self.config.min_samples_leaf.max(1) {
            return self.push_leaf(&rows);
        }

        let Some(split) = self.find_best_split(&rows) else {
            return self.push_leaf(&rows);
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&i| self.matrix[i][split.feature] <= split.threshold);

        // Reserve the slot before recursing so child indices are stable
        let index = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { value: 0.0 });
        let left = self.build(left_rows, depth + 1);
        let right = self.build(right_rows, depth + 1);
        self.nodes[index] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        index
    }

    fn push_leaf(&mut self, rows: &[usize]) -> usize {
        let grad_sum: f64 = rows.iter().map(|&i| self.gradients[i]).sum();
        let hess_sum: f64 = rows.iter().map(|&i| self.hessians[i]).sum();
        // Newton step on the logistic loss, shrunk by the learning rate
        let value = self.config.learning_rate * grad_sum / (hess_sum + 1e-12);

        let index = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { value });
        index
    }

    fn find_best_split(&self, rows: &[usize]) -> Option<BestSplit> {
        let n_features = self.matrix[rows[0]].len();
        let min_leaf = self.config.min_samples_leaf.max(1);

        let total_grad: f64 = rows.iter().map(|&i| self.gradients[i]).sum();
        let total_hess: f64 = rows.iter().map(|&i| self.hessians[i]).sum();
        let parent_score = total_grad * total_grad / (total_hess + 1e-12);

        let mut best: Option<BestSplit> = None;

        for feature in 0..n_features {
            let mut ordered: Vec<usize> = rows.to_vec();
            ordered.sort_by(|&a, &b| {
                self.matrix[a][feature]
                    .partial_cmp(&self.matrix[b][feature])
                    .unwrap()
            });

            let mut left_grad = 0.0;
            let mut left_hess = 0.0;

            for pos in 0..ordered.len() - 1 {
                let i = ordered[pos];
                left_grad += self.gradients[i];
                left_hess += self.hessians[i];

                let here = self.matrix[i][feature];
                let next = self.matrix[ordered[pos + 1]][feature];
                if here == next {
                    continue;
                }
                if pos + 1 < min_leaf || ordered.len() - pos - 1 < min_leaf {
                    continue;
                }

                let right_grad = total_grad - left_grad;
                let right_hess = total_hess - left_hess;
                let gain = left_grad * left_grad / (left_hess + 1e-12)
                    + right_grad * right_grad / (right_hess + 1e-12)
                    - parent_score;

                if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(BestSplit {
                        feature,
                        threshold: (here + next) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two well-separated clusters on one feature.
    fn toy_data() -> (Vec<Vec<f64>>, Vec<u8>) {
        let mut matrix = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            matrix.push(vec![i as f64 * 0.1, 1.0]);
            labels.push(0);
        }
        for i in 0..20 {
            matrix.push(vec![5.0 + i as f64 * 0.1, 1.0]);
            labels.push(1);
        }
        (matrix, labels)
    }

    #[test]
    fn test_fit_separates_classes() {
        let (matrix, labels) = toy_data();
        let config = GbdtConfig {
            n_trees: 20,
            ..GbdtConfig::default()
        };
        let model = GradientBoostedTrees::fit(&matrix, &labels, config).unwrap();

        let probs = model.predict_probability(&matrix);
        assert_eq!(probs.len(), matrix.len());
        assert!(probs.iter().all(|p| *p > 0.0 && *p < 1.0));
        assert!(probs[..20].iter().all(|p| *p < 0.5));
        assert!(probs[20..].iter().all(|p| *p > 0.5));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (matrix, labels) = toy_data();
        let config = GbdtConfig {
            n_trees: 10,
            subsample: 0.8,
            ..GbdtConfig::default()
        };

        let a = GradientBoostedTrees::fit(&matrix, &labels, config.clone()).unwrap();
        let b = GradientBoostedTrees::fit(&matrix, &labels, config).unwrap();

        assert_eq!(a.predict_probability(&matrix), b.predict_probability(&matrix));
    }

    #[test]
    fn test_single_class_is_rejected() {
        let matrix = vec![vec![1.0], vec![2.0], vec![3.0]];
        let labels = vec![1, 1, 1];

        let err = GradientBoostedTrees::fit(&matrix, &labels, GbdtConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::DataValidation(_)));
    }

    #[test]
    fn test_mismatched_labels_are_rejected() {
        let matrix = vec![vec![1.0], vec![2.0]];
        let labels = vec![0, 1, 1];

        assert!(GradientBoostedTrees::fit(&matrix, &labels, GbdtConfig::default()).is_err());
    }

    #[test]
    fn test_tree_count_matches_config() {
        let (matrix, labels) = toy_data();
        let config = GbdtConfig {
            n_trees: 7,
            ..GbdtConfig::default()
        };
        let model = GradientBoostedTrees::fit(&matrix, &labels, config).unwrap();
        assert_eq!(model.n_trees(), 7);
    }

    #[test]
    fn test_serde_round_trip_preserves_predictions() {
        let (matrix, labels) = toy_data();
        let config = GbdtConfig {
            n_trees: 10,
            ..GbdtConfig::default()
        };
        let model = GradientBoostedTrees::fit(&matrix, &labels, config).unwrap();

        let bytes = bincode::serialize(&model).unwrap();
        let restored: GradientBoostedTrees = bincode::deserialize(&bytes).unwrap();

        assert_eq!(
            model.predict_probability(&matrix),
            restored.predict_probability(&matrix)
        );
    }

    #[test]
    fn test_sigmoid_bounds() {
        assert!(sigmoid(1000.0) < 1.0);
        assert!(sigmoid(-1000.0) > 0.0);
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
    }
}
