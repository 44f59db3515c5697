//! Isolation Forest over a single feature (Liu, Ting & Zhou, 2008).
//!
//! Trees are grown on subsamples drawn without replacement, splitting at a uniform random
//! threshold between the node's min and max until the height limit
//! `ceil(log2(sample_size))`. Scores follow scikit-learn's `score_samples` convention: the
//! negated anomaly score, so lower means more abnormal.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug)]
pub(crate) struct IsolationForest {
    trees: Vec<Node>,
    sample_size: usize,
}

impl IsolationForest {
    /// Grow `n_trees` trees on `data`.
    ///
    /// Each tree gets its own seed drawn from an `StdRng` seeded with `seed`, so the result is
    /// independent of how rayon schedules the work. Requires `2 <= sample_size <= data.len()`.
    pub(crate) fn fit(data: &[f64], n_trees: usize, sample_size: usize, seed: u64) -> Self {
        debug_assert!(sample_size >= 2 && sample_size <= data.len());
        let height_limit = (sample_size as f64).log2().ceil() as usize;

        let mut master = StdRng::seed_from_u64(seed);
        let seeds: Vec<u64> = (0..n_trees).map(|_| master.random()).collect();

        let trees = seeds
            .into_par_iter()
            .map(|tree_seed| {
                let mut rng = StdRng::seed_from_u64(tree_seed);
                let sample: Vec<f64> = index::sample(&mut rng, data.len(), sample_size)
                    .iter()
                    .map(|i| data[i])
                    .collect();
                grow(sample, 0, height_limit, &mut rng)
            })
            .collect();

        Self { trees, sample_size }
    }

    /// Negated anomaly score per value, in `[-1, 0)`.
    pub(crate) fn score_samples(&self, data: &[f64]) -> Vec<f64> {
        let norm = average_path_length(self.sample_size);
        let n_trees = self.trees.len() as f64;
        data.par_iter()
            .map(|&x| {
                let total: f64 = self.trees.iter().map(|t| path_length(t, x)).sum();
                -(2f64).powf(-(total / n_trees) / norm)
            })
            .collect()
    }
}

fn grow(values: Vec<f64>, depth: usize, height_limit: usize, rng: &mut StdRng) -> Node {
    if depth >= height_limit || values.len() <= 1 {
        return Node::Leaf { size: values.len() };
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min >= max {
        return Node::Leaf { size: values.len() };
    }

    // Interpolated rather than `min + (max - min) * u`, which overflows on wide spreads.
    let u: f64 = rng.random();
    let threshold = min * (1.0 - u) + max * u;
    let (left, right): (Vec<f64>, Vec<f64>) = values.into_iter().partition(|v| *v <= threshold);
    Node::Split {
        threshold,
        left: Box::new(grow(left, depth + 1, height_limit, rng)),
        right: Box::new(grow(right, depth + 1, height_limit, rng)),
    }
}

fn path_length(root: &Node, x: f64) -> f64 {
    let mut node = root;
    let mut depth = 0usize;
    loop {
        match node {
            Node::Leaf { size } => return depth as f64 + average_path_length(*size),
            Node::Split {
                threshold,
                left,
                right,
            } => {
                node = if x <= *threshold { left } else { right };
                depth += 1;
            }
        }
    }
}

/// Average path length of an unsuccessful BST search over `n` points, `c(n)`.
pub(crate) fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{average_path_length, IsolationForest};

    #[test]
    fn average_path_length_small_cases() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        // 2 * (ln 255 + gamma) - 2 * 255 / 256
        let c256 = average_path_length(256);
        assert!((c256 - 10.244770920119917).abs() < 1e-9);
    }

    #[test]
    fn isolated_point_scores_lowest() {
        let mut data: Vec<f64> = (0..63).map(|i| 5.0 + (i % 7) as f64 * 0.01).collect();
        data.push(500.0);
        let forest = IsolationForest::fit(&data, 50, 64, 7);
        let scores = forest.score_samples(&data);
        let (argmin, _) = scores
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        assert_eq!(argmin, 63);
        assert!(scores.iter().all(|s| (-1.0..0.0).contains(s)));
    }

    #[test]
    fn same_seed_same_scores() {
        let data: Vec<f64> = (0..40).map(|i| (i * i % 17) as f64).collect();
        let a = IsolationForest::fit(&data, 20, 32, 42).score_samples(&data);
        let b = IsolationForest::fit(&data, 20, 32, 42).score_samples(&data);
        assert_eq!(a, b);
    }
}
