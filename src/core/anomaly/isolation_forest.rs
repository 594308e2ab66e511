//! Isolation Forest over a scalar feature.
//!
//! Anomalies are few and different, so random axis-aligned cuts isolate them in
//! fewer steps than the bulk of the population. The expected isolation depth over
//! an ensemble of randomly grown trees is turned into a score in (0, 1]:
//!
//! ```text
//! s(x) = 2 ^ ( -E[h(x)] / c(psi) )
//! ```
//!
//! where `psi` is the per-tree sub-sample size and `c(n)` the average path length of
//! an unsuccessful binary-search-tree lookup among `n` keys. Scores near 1 mark
//! anomalies; scores well below 0.5 mark dense, normal samples.
use ndarray::{Array1, ArrayView1, Zip};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::debug;

use super::AnomalyDetector;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Average path length of an unsuccessful search in a BST built from `n` keys.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Split {
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        size: usize,
    },
}

#[derive(Debug, Clone)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn grow<R: Rng>(values: &mut [f64], max_depth: usize, rng: &mut R) -> Self {
        let mut nodes = Vec::with_capacity(2 * values.len());
        Self::grow_node(values, 0, max_depth, rng, &mut nodes);
        Self { nodes }
    }

    fn grow_node<R: Rng>(
        values: &mut [f64],
        depth: usize,
        max_depth: usize,
        rng: &mut R,
        nodes: &mut Vec<Node>,
    ) -> usize {
        let id = nodes.len();
        nodes.push(Node::Leaf { size: values.len() });

        if depth >= max_depth || values.len() <= 1 {
            return id;
        }

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if min >= max {
            // Identical values cannot be separated
            return id;
        }

        let threshold = rng.random_range(min..max);
        let split = partition(values, threshold);
        let (left_values, right_values) = values.split_at_mut(split);

        let left = Self::grow_node(left_values, depth + 1, max_depth, rng, nodes);
        let right = Self::grow_node(right_values, depth + 1, max_depth, rng, nodes);
        nodes[id] = Node::Split {
            threshold,
            left,
            right,
        };
        id
    }

    /// Depth at which `x` lands plus the expected remaining depth of its leaf.
    fn path_length(&self, x: f64) -> f64 {
        let mut node = 0;
        let mut depth = 0usize;
        loop {
            match self.nodes[node] {
                Node::Split {
                    threshold,
                    left,
                    right,
                } => {
                    node = if x <= threshold { left } else { right };
                    depth += 1;
                }
                Node::Leaf { size } => return depth as f64 + average_path_length(size),
            }
        }
    }
}

/// Move values `<= threshold` to the front; returns the count moved.
fn partition(values: &mut [f64], threshold: f64) -> usize {
    let mut split = 0;
    for j in 0..values.len() {
        if values[j] <= threshold {
            values.swap(split, j);
            split += 1;
        }
    }
    split
}

/// Trees grown on one feature vector, ready to score samples.
#[derive(Debug, Clone)]
pub struct FittedForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
}

impl FittedForest {
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Anomaly score in (0, 1]; higher is more anomalous.
    pub fn score(&self, x: f64) -> f64 {
        let normalizer = average_path_length(self.sample_size);
        if normalizer == 0.0 || self.trees.is_empty() {
            return 0.5;
        }
        let total: f64 = self.trees.iter().map(|t| t.path_length(x)).sum();
        let mean = total / self.trees.len() as f64;
        2f64.powf(-mean / normalizer)
    }

    pub fn score_all(&self, features: &[f64]) -> Vec<f64> {
        let mut scores = Array1::<f64>::zeros(features.len());
        Zip::from(&mut scores)
            .and(ArrayView1::from(features))
            .par_for_each(|s, &x| *s = self.score(x));
        scores.to_vec()
    }
}

/// Isolation Forest configuration.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    n_estimators: usize,
    max_samples: usize,
    seed: u64,
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self::new()
    }
}

impl IsolationForest {
    /// 100 trees, 256 samples per tree, seed 0.
    pub fn new() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            seed: 0,
        }
    }

    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators.max(1);
        self
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Grow the ensemble. Each tree sees `min(max_samples, n)` samples drawn
    /// without replacement and is capped at depth `ceil(log2(sample_size))`.
    pub fn fit(&self, features: &[f64]) -> FittedForest {
        let n = features.len();
        let sample_size = self.max_samples.min(n);
        let max_depth = (sample_size.max(2) as f64).log2().ceil() as usize;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);

        let mut trees = Vec::with_capacity(self.n_estimators);
        if sample_size > 0 {
            let mut buf = vec![0.0_f64; sample_size];
            for _ in 0..self.n_estimators {
                let picks = index::sample(&mut rng, n, sample_size);
                for (slot, i) in buf.iter_mut().zip(picks.iter()) {
                    *slot = features[i];
                }
                trees.push(IsolationTree::grow(&mut buf, max_depth, &mut rng));
            }
        }

        debug!(
            "Grew {} isolation trees (sample_size={}, max_depth={}, seed={})",
            trees.len(),
            sample_size,
            max_depth,
            self.seed
        );
        FittedForest { trees, sample_size }
    }
}

impl AnomalyDetector for IsolationForest {
    fn name(&self) -> &'static str {
        "isolation-forest"
    }

    fn score_samples(&self, features: &[f64]) -> Vec<f64> {
        self.fit(features).score_all(features)
    }
}
