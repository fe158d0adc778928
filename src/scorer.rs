// src/scorer.rs
//
// Retraining step: rebuild a feedback-class scorer from the store's
// accumulated history.
//
// The model itself is deliberately simple — a majority-class table keyed by
// (location code, action) with a global-majority fallback — because the core
// only consumes the `fit -> predict` contract. What matters is the encoding
// discipline: location codes come from the same canonical sorted vocabulary
// the observation encoder uses, so training-time and inference-time codes
// cannot drift apart.

use std::collections::BTreeMap;

use crate::env::Vocab;
use crate::error::{CoreError, CoreResult};
use crate::store::StoreGateway;
use crate::types::TrainingRow;

/// Opaque scorer mapping (location, action) to a predicted feedback class.
#[derive(Debug, Clone)]
pub struct FeedbackModel {
    locations: Vocab,
    /// Majority feedback class per (location code, action).
    table: BTreeMap<(u32, usize), String>,
    /// Fallback for unseen (location, action) pairs.
    global_majority: String,
}

impl FeedbackModel {
    /// Fit from training rows.
    ///
    /// An empty training set is a configuration error and fails fatally; a
    /// row naming a location outside the canonical vocabulary is an encoding
    /// defect and also fails rather than being dropped.
    pub fn fit(rows: &[TrainingRow], locations: &Vocab) -> CoreResult<Self> {
        if rows.is_empty() {
            return Err(CoreError::invalid_argument(
                "training_rows",
                "training set is empty; the store holds no joined history",
            ));
        }

        let mut per_key: BTreeMap<(u32, usize), BTreeMap<&str, usize>> = BTreeMap::new();
        let mut global: BTreeMap<&str, usize> = BTreeMap::new();
        for row in rows {
            let code = locations
                .code(&row.place_name)
                .ok_or_else(|| CoreError::Encoding {
                    kind: "location",
                    label: row.place_name.clone(),
                })?;
            *per_key
                .entry((code, row.action))
                .or_default()
                .entry(row.feedback.as_str())
                .or_insert(0) += 1;
            *global.entry(row.feedback.as_str()).or_insert(0) += 1;
        }

        let table = per_key
            .into_iter()
            .map(|(key, counts)| (key, majority(&counts).to_string()))
            .collect();
        let global_majority = majority(&global).to_string();

        Ok(Self {
            locations: locations.clone(),
            table,
            global_majority,
        })
    }

    /// Fit from the store's full feedback × activities × actions join.
    pub fn fit_from_store<S: StoreGateway>(store: &S, locations: &Vocab) -> CoreResult<Self> {
        let rows = store.training_rows()?;
        Self::fit(&rows, locations)
    }

    /// Predicted feedback class for an encoded location and action.
    pub fn predict(&self, location_code: u32, action: usize) -> &str {
        self.table
            .get(&(location_code, action))
            .map(|s| s.as_str())
            .unwrap_or(&self.global_majority)
    }

    /// Predict for a location label, encoding it through the shared
    /// vocabulary first.
    pub fn predict_place(&self, place: &str, action: usize) -> CoreResult<&str> {
        let code = self
            .locations
            .code(place)
            .ok_or_else(|| CoreError::Encoding {
                kind: "location",
                label: place.to_string(),
            })?;
        Ok(self.predict(code, action))
    }
}

/// Deterministic majority: highest count, ties broken by label order.
fn majority<'a>(counts: &BTreeMap<&'a str, usize>) -> &'a str {
    counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        .map(|(label, _)| *label)
        .unwrap_or("No")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocab {
        Vocab::new(["Park", "Gym"].into_iter().map(String::from))
    }

    fn row(place: &str, feedback: &str, action: usize) -> TrainingRow {
        TrainingRow {
            place_name: place.into(),
            feedback: feedback.into(),
            reward: None,
            action,
        }
    }

    #[test]
    fn empty_training_set_is_fatal() {
        let err = FeedbackModel::fit(&[], &vocab()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument { .. }));
    }

    #[test]
    fn majority_class_per_key() {
        let rows = vec![
            row("Park", "Yes", 0),
            row("Park", "Yes", 0),
            row("Park", "No", 0),
            row("Park", "No", 1),
            row("Gym", "No", 0),
        ];
        let model = FeedbackModel::fit(&rows, &vocab()).unwrap();
        assert_eq!(model.predict_place("Park", 0).unwrap(), "Yes");
        assert_eq!(model.predict_place("Park", 1).unwrap(), "No");
        assert_eq!(model.predict_place("Gym", 0).unwrap(), "No");
    }

    #[test]
    fn unseen_pair_falls_back_to_global_majority() {
        let rows = vec![
            row("Park", "Yes", 0),
            row("Park", "Yes", 1),
            row("Gym", "No", 0),
        ];
        let model = FeedbackModel::fit(&rows, &vocab()).unwrap();
        assert_eq!(model.predict_place("Gym", 7).unwrap(), "Yes");
    }

    #[test]
    fn training_row_outside_vocabulary_fails() {
        let rows = vec![row("Atlantis", "Yes", 0)];
        let err = FeedbackModel::fit(&rows, &vocab()).unwrap_err();
        assert!(matches!(err, CoreError::Encoding { .. }));
    }

    #[test]
    fn encoding_is_shared_between_fit_and_predict() {
        // Same rows, vocabularies built from differently ordered label lists:
        // predictions must match because codes come from the canonical sort.
        let rows = vec![row("Park", "Yes", 0), row("Gym", "No", 0)];
        let a = FeedbackModel::fit(
            &rows,
            &Vocab::new(["Park", "Gym"].into_iter().map(String::from)),
        )
        .unwrap();
        let b = FeedbackModel::fit(
            &rows,
            &Vocab::new(["Gym", "Park"].into_iter().map(String::from)),
        )
        .unwrap();
        assert_eq!(
            a.predict_place("Park", 0).unwrap(),
            b.predict_place("Park", 0).unwrap()
        );
    }
}
