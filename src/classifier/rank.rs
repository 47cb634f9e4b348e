//! Feature importance ranking for a single prediction.

use std::cmp::Ordering;

use super::FeatureVector;
use crate::model::prediction::FeatureWeight;

/// Number of features reported with each prediction.
pub const DEFAULT_TOP_N: usize = 15;

struct Candidate {
    index: usize,
    weight: f64,
    count: f64,
    score: f64,
}

/// Rank the features present in `vector` by `|coefficient * count|`.
///
/// Only non-zero entries are candidates. Equal scores keep ascending feature
/// index order. At most `top_n` entries are returned; an all-zero vector
/// yields none.
pub fn rank(
    vector: &FeatureVector,
    coefficients: &[f64],
    feature_names: &[String],
    top_n: usize,
) -> Vec<FeatureWeight> {
    let mut candidates: Vec<Candidate> = vector
        .iter()
        .filter(|&(_, count)| count != 0.0)
        .filter_map(|(index, count)| {
            let (Some(&weight), Some(_)) = (coefficients.get(index), feature_names.get(index))
            else {
                tracing::debug!(index, "Feature index outside model range, skipping");
                return None;
            };
            Some(Candidate {
                index,
                weight,
                count,
                score: (weight * count).abs(),
            })
        })
        .collect();

    candidates.sort_by(|a, b| by_score_desc(a, b).then_with(|| a.index.cmp(&b.index)));
    candidates.truncate(top_n);

    candidates
        .into_iter()
        .map(|c| FeatureWeight {
            word: feature_names[c.index].clone(),
            weight: c.weight,
            count: c.count,
        })
        .collect()
}

fn by_score_desc(a: &Candidate, b: &Candidate) -> Ordering {
    b.score.total_cmp(&a.score)
}
