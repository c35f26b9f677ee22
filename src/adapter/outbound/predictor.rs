//! Deterministic baseline prediction generator.
//!
//! Each driver gets a composite score from two normalised factors:
//! - **Grid**: `(N - position + 1) / N`, so pole scores 1.0
//! - **Points**: constructor points divided by the best team's points
//!
//! Drivers are ranked by score (grid slot breaks ties). Win probability is a
//! softmax over scores scaled to 100; confidence drops the further a driver
//! is predicted from their grid slot.

use async_trait::async_trait;

use crate::domain::{Prediction, PredictionInputs, PredictionSet};
use crate::error::{Error, Result};
use crate::port::PredictionGenerator;

/// Confidence bounds in percent.
const MIN_CONFIDENCE: f64 = 70.0;
const MAX_CONFIDENCE: f64 = 99.0;

/// Factor weights for [`GridPredictor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictorWeights {
    pub grid: f64,
    pub points: f64,
    /// Softmax temperature inverse; higher concentrates win probability.
    pub sharpness: f64,
}

impl Default for PredictorWeights {
    fn default() -> Self {
        Self {
            grid: 0.7,
            points: 0.3,
            sharpness: 8.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GridPredictor {
    weights: PredictorWeights,
}

impl GridPredictor {
    #[must_use]
    pub const fn new(weights: PredictorWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub const fn weights(&self) -> &PredictorWeights {
        &self.weights
    }

    /// Composite score for every grid entry, in grid order.
    fn scores(&self, inputs: &PredictionInputs) -> Vec<f64> {
        let grid = inputs.qualifying();
        let n = grid.len() as f64;
        let best_points = grid
            .iter()
            .map(|entry| inputs.points_for(&entry.team))
            .fold(0.0_f64, f64::max);

        grid.iter()
            .map(|entry| {
                let grid_factor = (n - f64::from(entry.position) + 1.0) / n;
                let points_factor = if best_points > 0.0 {
                    inputs.points_for(&entry.team).max(0.0) / best_points
                } else {
                    0.0
                };
                self.weights.grid * grid_factor + self.weights.points * points_factor
            })
            .collect()
    }

    fn predict(&self, inputs: &PredictionInputs) -> Result<PredictionSet> {
        let grid = inputs.qualifying();
        if grid.is_empty() {
            return Err(Error::Unavailable {
                service: "grid predictor",
                reason: "no qualifying grid".into(),
            });
        }

        let scores = self.scores(inputs);
        let mut order: Vec<usize> = (0..grid.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .total_cmp(&scores[a])
                .then(grid[a].position.cmp(&grid[b].position))
        });

        let top = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exponents: Vec<f64> = scores
            .iter()
            .map(|score| ((score - top) * self.weights.sharpness).exp())
            .collect();
        let total: f64 = exponents.iter().sum();

        let n = grid.len() as f64;
        let mut predictions = Vec::with_capacity(grid.len());
        for (rank, &index) in order.iter().enumerate() {
            let entry = &grid[index];
            let predicted = rank as u32 + 1;
            let drift = f64::from(entry.position.abs_diff(predicted)) / n;
            let confidence =
                round1(MAX_CONFIDENCE - (MAX_CONFIDENCE - MIN_CONFIDENCE) * drift.min(1.0));
            let win_probability = round1(100.0 * exponents[index] / total).clamp(0.0, 100.0);

            predictions.push(Prediction::try_new(
                entry.driver.clone(),
                entry.team.clone(),
                entry.position,
                predicted,
                confidence,
                win_probability,
            )?);
        }

        Ok(PredictionSet::try_new(predictions)?)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[async_trait]
impl PredictionGenerator for GridPredictor {
    async fn generate(&self, inputs: &PredictionInputs) -> Result<PredictionSet> {
        self.predict(inputs)
    }

    fn name(&self) -> &'static str {
        "grid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QualifyingEntry;
    use std::collections::BTreeMap;

    fn inputs(points: &[(&str, f64)]) -> PredictionInputs {
        PredictionInputs::try_new(
            vec![
                QualifyingEntry::new("VER", "Red Bull", 1),
                QualifyingEntry::new("LEC", "Ferrari", 2),
                QualifyingEntry::new("NOR", "McLaren", 3),
                QualifyingEntry::new("ALB", "Williams", 4),
            ],
            points
                .iter()
                .map(|(team, pts)| ((*team).to_string(), *pts))
                .collect::<BTreeMap<_, _>>(),
        )
        .unwrap()
    }

    fn drivers(set: &PredictionSet) -> Vec<&str> {
        set.entries().iter().map(|p| p.driver().as_str()).collect()
    }

    #[tokio::test]
    async fn without_points_the_grid_order_holds() {
        let set = GridPredictor::default().generate(&inputs(&[])).await.unwrap();
        assert_eq!(drivers(&set), vec!["VER", "LEC", "NOR", "ALB"]);
        assert!(set.entries().iter().all(|p| p.confidence() == MAX_CONFIDENCE));
    }

    #[tokio::test]
    async fn constructor_points_lift_a_strong_team() {
        let set = GridPredictor::default()
            .generate(&inputs(&[("McLaren", 362.0), ("Red Bull", 362.0), ("Ferrari", 0.0)]))
            .await
            .unwrap();

        assert_eq!(drivers(&set), vec!["VER", "NOR", "LEC", "ALB"]);
        let nor = &set.entries()[1];
        assert_eq!(nor.qualifying_position(), 3);
        assert!(nor.confidence() < MAX_CONFIDENCE);
    }

    #[tokio::test]
    async fn win_probabilities_sum_to_about_one_hundred() {
        let set = GridPredictor::default()
            .generate(&inputs(&[("McLaren", 362.0), ("Williams", 54.0)]))
            .await
            .unwrap();

        let total: f64 = set.entries().iter().map(Prediction::win_probability).sum();
        assert!((total - 100.0).abs() < 0.5, "total was {total}");
        let leader = set.leader().unwrap().win_probability();
        assert!(set.entries().iter().all(|p| p.win_probability() <= leader));
    }

    #[tokio::test]
    async fn same_inputs_give_same_output() {
        let predictor = GridPredictor::default();
        let inputs = inputs(&[("Ferrari", 100.0)]);
        assert_eq!(
            predictor.generate(&inputs).await.unwrap(),
            predictor.generate(&inputs).await.unwrap()
        );
    }

    #[tokio::test]
    async fn empty_grid_is_unavailable() {
        let result = GridPredictor::default()
            .generate(&PredictionInputs::default())
            .await;
        assert!(matches!(result, Err(Error::Unavailable { .. })));
    }
}
