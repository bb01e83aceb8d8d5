use crate::domain::config::SimilarityConfig;
use crate::domain::errors::PredictionError;
use crate::domain::prediction::Neighbor;
use crate::domain::trip::{ReferenceSet, TripInput};
use std::cmp::Ordering;

/// Amount produced by the fallback together with the neighbors it used.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityEstimate {
    pub amount: f64,
    pub neighbors: Vec<Neighbor>,
}

/// Nearest-neighbor fallback over the labeled reference set.
///
/// Distances are scaled Euclidean over (days, miles, receipts). The `k`
/// closest examples are combined by inverse-distance weighting; an exact
/// match returns its observed amount unchanged.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityEstimator {
    config: SimilarityConfig,
}

impl SimilarityEstimator {
    pub fn new(config: SimilarityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    pub fn distance(&self, a: &TripInput, b: &TripInput) -> f64 {
        let days = (f64::from(a.days()) - f64::from(b.days())) * self.config.days_scale;
        let miles = (a.miles() - b.miles()) * self.config.miles_scale;
        let receipts = (a.receipts() - b.receipts()) * self.config.receipts_scale;
        days.hypot(miles).hypot(receipts)
    }

    /// The `k` closest examples, nearest first. Equal distances keep
    /// reference-set order.
    pub fn nearest(&self, input: &TripInput, examples: &ReferenceSet) -> Vec<Neighbor> {
        let mut scored: Vec<Neighbor> = examples
            .iter()
            .enumerate()
            .map(|(index, example)| Neighbor {
                index,
                distance: self.distance(input, &example.input),
                observed: example.observed,
            })
            .collect();

        let k = self.config.k.min(scored.len());
        if k < scored.len() {
            scored.select_nth_unstable_by(k, by_distance);
            scored.truncate(k);
        }
        scored.sort_by(by_distance);
        scored
    }

    pub fn estimate(
        &self,
        input: &TripInput,
        examples: &ReferenceSet,
    ) -> Result<SimilarityEstimate, PredictionError> {
        let neighbors = self.nearest(input, examples);
        let Some(closest) = neighbors.first() else {
            return Err(PredictionError::NoReferenceData);
        };

        let nearest = closest.observed;
        if closest.distance == 0.0 {
            return Ok(SimilarityEstimate {
                amount: nearest,
                neighbors,
            });
        }

        let (weighted, total_weight) = neighbors.iter().fold((0.0, 0.0), |(weighted, total), n| {
            let weight = 1.0 / (n.distance + self.config.epsilon);
            (weighted + weight * n.observed, total + weight)
        });

        // Infinite distances leave every weight at zero.
        let mean = weighted / total_weight;
        if !total_weight.is_normal() || !mean.is_finite() {
            return Ok(SimilarityEstimate {
                amount: nearest,
                neighbors,
            });
        }

        // Float summation can land a hair outside the neighbor range.
        let (low, high) = neighbors
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), n| {
                (low.min(n.observed), high.max(n.observed))
            });

        Ok(SimilarityEstimate {
            amount: mean.clamp(low, high),
            neighbors,
        })
    }
}

impl Default for SimilarityEstimator {
    fn default() -> Self {
        Self::new(SimilarityConfig::default())
    }
}

fn by_distance(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| a.index.cmp(&b.index))
}
