use ndarray::parallel::prelude::*;
use ndarray::{Array2, ArrayView1, Axis};
use std::cmp::Ordering;

/// All-pairs cosine similarity over the rows of a dense representation.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    scores: Array2<f64>,
}

fn norm(row: ArrayView1<f64>) -> f64 {
    row.dot(&row).sqrt()
}

impl SimilarityMatrix {
    /// `dot(a, b) / (|a| |b|)`, 0 when either norm is zero. Rows are filled
    /// in parallel; the diagonal is exactly 1 for non-zero rows.
    pub fn build(reduced: &Array2<f64>) -> Self {
        let n = reduced.nrows();
        let norms: Vec<f64> = reduced.outer_iter().map(norm).collect();
        let mut scores = Array2::<f64>::zeros((n, n));

        scores
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(i, mut out)| {
                let a = reduced.row(i);
                for j in 0..n {
                    out[j] = if i == j {
                        if norms[i] > 0.0 { 1.0 } else { 0.0 }
                    } else if norms[i] == 0.0 || norms[j] == 0.0 {
                        0.0
                    } else {
                        (a.dot(&reduced.row(j)) / (norms[i] * norms[j])).clamp(-1.0, 1.0)
                    };
                }
            });

        Self { scores }
    }

    pub fn len(&self) -> usize {
        self.scores.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.nrows() == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.scores[[i, j]]
    }

    pub fn scores(&self) -> &Array2<f64> {
        &self.scores
    }

    /// Other rows ordered by descending score, ties by ascending index.
    /// The query row itself is never included.
    pub fn ranked_neighbors(&self, query: usize, count: usize) -> Vec<(usize, f64)> {
        let row = self.scores.row(query);
        let mut ranked: Vec<(usize, f64)> = row
            .iter()
            .copied()
            .enumerate()
            .filter(|&(j, _)| j != query)
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked.truncate(count);
        ranked
    }
}
