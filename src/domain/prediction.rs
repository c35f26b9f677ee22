//! Finishing-order predictions and the inputs they are generated from.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::DriverId;

/// Predicted result for one driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    driver: DriverId,
    team: String,
    qualifying_position: u32,
    predicted_position: u32,
    confidence: f64,
    win_probability: f64,
}

impl Prediction {
    /// Create a prediction, rejecting percentages outside `[0, 100]`.
    ///
    /// Positions are checked against the rest of the set by
    /// [`PredictionSet::try_new`].
    pub fn try_new(
        driver: impl Into<DriverId>,
        team: impl Into<String>,
        qualifying_position: u32,
        predicted_position: u32,
        confidence: f64,
        win_probability: f64,
    ) -> Result<Self, DomainError> {
        check_percent("confidence", confidence)?;
        check_percent("win probability", win_probability)?;
        Ok(Self {
            driver: driver.into(),
            team: team.into(),
            qualifying_position,
            predicted_position,
            confidence,
            win_probability,
        })
    }

    #[must_use]
    pub fn driver(&self) -> &DriverId {
        &self.driver
    }

    #[must_use]
    pub fn team(&self) -> &str {
        &self.team
    }

    #[must_use]
    pub const fn qualifying_position(&self) -> u32 {
        self.qualifying_position
    }

    #[must_use]
    pub const fn predicted_position(&self) -> u32 {
        self.predicted_position
    }

    #[must_use]
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }

    #[must_use]
    pub const fn win_probability(&self) -> f64 {
        self.win_probability
    }
}

fn check_percent(field: &'static str, value: f64) -> Result<(), DomainError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(DomainError::PercentOutOfRange { field, value })
    }
}

/// Check that `positions` is a permutation of `1..=len`.
fn check_permutation(
    field: &'static str,
    positions: impl Iterator<Item = u32>,
    len: usize,
) -> Result<(), DomainError> {
    let mut seen = HashSet::with_capacity(len);
    for position in positions {
        if position == 0 || position as usize > len {
            return Err(DomainError::PositionOutOfRange {
                field,
                position,
                len,
            });
        }
        if !seen.insert(position) {
            return Err(DomainError::DuplicatePosition { field, position });
        }
    }
    Ok(())
}

/// A complete predicted finishing order.
///
/// Both qualifying and predicted positions form a permutation of `1..=N`,
/// and entries are stored in ascending predicted position. The empty set is
/// valid and means "no predictions yet".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PredictionSet {
    entries: Vec<Prediction>,
}

impl PredictionSet {
    /// Validate and order a list of predictions.
    ///
    /// # Errors
    ///
    /// Returns a position error when either position column is not a
    /// permutation of `1..=N`.
    pub fn try_new(mut entries: Vec<Prediction>) -> Result<Self, DomainError> {
        let len = entries.len();
        check_permutation(
            "qualifying position",
            entries.iter().map(Prediction::qualifying_position),
            len,
        )?;
        check_permutation(
            "predicted position",
            entries.iter().map(Prediction::predicted_position),
            len,
        )?;
        entries.sort_by_key(Prediction::predicted_position);
        Ok(Self { entries })
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[Prediction] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry predicted to win, if any.
    #[must_use]
    pub fn leader(&self) -> Option<&Prediction> {
        self.entries.first()
    }
}

/// One slot of the qualifying grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifyingEntry {
    pub driver: DriverId,
    pub team: String,
    pub position: u32,
}

impl QualifyingEntry {
    pub fn new(driver: impl Into<DriverId>, team: impl Into<String>, position: u32) -> Self {
        Self {
            driver: driver.into(),
            team: team.into(),
            position,
        }
    }
}

/// Everything a prediction generator is given.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PredictionInputs {
    qualifying: Vec<QualifyingEntry>,
    team_points: BTreeMap<String, f64>,
}

impl PredictionInputs {
    /// Validate the grid (a permutation of `1..=N`) and order it by position.
    pub fn try_new(
        mut qualifying: Vec<QualifyingEntry>,
        team_points: BTreeMap<String, f64>,
    ) -> Result<Self, DomainError> {
        check_permutation(
            "grid position",
            qualifying.iter().map(|entry| entry.position),
            qualifying.len(),
        )?;
        qualifying.sort_by_key(|entry| entry.position);
        Ok(Self {
            qualifying,
            team_points,
        })
    }

    /// Same grid with a different points table.
    #[must_use]
    pub fn with_team_points(&self, team_points: BTreeMap<String, f64>) -> Self {
        Self {
            qualifying: self.qualifying.clone(),
            team_points,
        }
    }

    #[must_use]
    pub fn qualifying(&self) -> &[QualifyingEntry] {
        &self.qualifying
    }

    #[must_use]
    pub fn team_points(&self) -> &BTreeMap<String, f64> {
        &self.team_points
    }

    /// Points for `team`, zero when the team is not in the table.
    #[must_use]
    pub fn points_for(&self, team: &str) -> f64 {
        self.team_points.get(team).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(driver: &str, grid: u32, predicted: u32) -> Prediction {
        Prediction::try_new(driver, "Team", grid, predicted, 80.0, 10.0).unwrap()
    }

    #[test]
    fn percentages_are_bounded() {
        assert!(Prediction::try_new("VER", "Red Bull", 1, 1, 100.0, 0.0).is_ok());
        assert!(matches!(
            Prediction::try_new("VER", "Red Bull", 1, 1, 100.5, 0.0),
            Err(DomainError::PercentOutOfRange { field: "confidence", .. })
        ));
        assert!(Prediction::try_new("VER", "Red Bull", 1, 1, 50.0, -1.0).is_err());
        assert!(Prediction::try_new("VER", "Red Bull", 1, 1, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn set_is_sorted_by_predicted_position() {
        let set = PredictionSet::try_new(vec![
            prediction("NOR", 1, 2),
            prediction("VER", 2, 1),
            prediction("LEC", 3, 3),
        ])
        .unwrap();

        let order: Vec<&str> = set.entries().iter().map(|p| p.driver().as_str()).collect();
        assert_eq!(order, vec!["VER", "NOR", "LEC"]);
        assert_eq!(set.leader().unwrap().driver().as_str(), "VER");
    }

    #[test]
    fn set_rejects_gaps_and_duplicates() {
        let gap = PredictionSet::try_new(vec![prediction("VER", 1, 1), prediction("NOR", 2, 3)]);
        assert!(matches!(
            gap,
            Err(DomainError::PositionOutOfRange { position: 3, len: 2, .. })
        ));

        let duplicate =
            PredictionSet::try_new(vec![prediction("VER", 1, 1), prediction("NOR", 1, 2)]);
        assert!(matches!(
            duplicate,
            Err(DomainError::DuplicatePosition { position: 1, .. })
        ));
    }

    #[test]
    fn empty_set_is_valid() {
        let set = PredictionSet::try_new(Vec::new()).unwrap();
        assert!(set.is_empty());
        assert_eq!(set, PredictionSet::empty());
    }

    #[test]
    fn inputs_sort_grid_and_default_missing_points() {
        let inputs = PredictionInputs::try_new(
            vec![
                QualifyingEntry::new("NOR", "McLaren", 2),
                QualifyingEntry::new("VER", "Red Bull", 1),
            ],
            BTreeMap::from([("McLaren".to_string(), 400.0)]),
        )
        .unwrap();

        assert_eq!(inputs.qualifying()[0].driver.as_str(), "VER");
        assert_eq!(inputs.points_for("McLaren"), 400.0);
        assert_eq!(inputs.points_for("Red Bull"), 0.0);

        assert!(PredictionInputs::try_new(
            vec![QualifyingEntry::new("VER", "Red Bull", 2)],
            BTreeMap::new()
        )
        .is_err());
    }
}
