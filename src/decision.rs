// src/decision.rs
//
// Decision loop: binds one external request to one environment interaction.
//
// The loop owns nothing persistent. It borrows the session's environment,
// policy and (optionally) the retrained scorer for the duration of a call,
// which keeps all mutable state session-scoped — there are no process-wide
// singletons, and callers that share an environment across requests must
// serialize access themselves.

use crate::env::ActivityEnv;
use crate::error::{CoreError, CoreResult};
use crate::policy::Policy;
use crate::scorer::FeedbackModel;
use crate::store::StoreGateway;
use crate::types::{ActivityId, FeedbackRecord, MotionState};

use serde::{Deserialize, Serialize};

/// Result of a recommend-one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub activity_id: ActivityId,
    pub activity_name: String,
    /// Predicted feedback class from the retrained scorer, when one is
    /// attached.
    pub refinement: Option<String>,
}

/// Acknowledgment echo for record-feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackAck {
    pub activity_id: ActivityId,
    pub feedback: String,
    pub state: MotionState,
}

/// Orchestrator for recommend/feedback/suggest-plan cycles.
pub struct DecisionLoop<'a, S: StoreGateway, P: Policy> {
    env: &'a mut ActivityEnv<S>,
    policy: &'a mut P,
    model: Option<&'a FeedbackModel>,
    plan_horizon: usize,
}

impl<'a, S: StoreGateway, P: Policy> DecisionLoop<'a, S, P> {
    pub fn new(env: &'a mut ActivityEnv<S>, policy: &'a mut P, plan_horizon: usize) -> Self {
        Self {
            env,
            policy,
            model: None,
            plan_horizon,
        }
    }

    /// Attach a retrained scorer for refinement.
    pub fn with_model(mut self, model: &'a FeedbackModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Recommend one activity for a (place, state) pair.
    ///
    /// Re-anchors the environment to the caller's pair (an explicit override
    /// of the store-derived defaults), queries the policy once, and resolves
    /// the raw action modulo the activity count — the documented recovery
    /// policy for policy outputs outside the location's action space.
    pub fn recommend_one(&mut self, place: &str, state: &str) -> CoreResult<Recommendation> {
        let place = required("place_name", place)?;
        let state = MotionState::parse_or_still(required("state", state)?);

        let obs = self.env.anchor(state, place)?;
        let activities = self.env.activities();
        if activities.is_empty() {
            return Err(CoreError::EmptyActionSpace {
                location: place.to_string(),
            });
        }

        let raw = self.policy.select(&obs, activities.len());
        let action = raw % activities.len();
        let selected = activities[action].clone();

        self.env.store_mut().record_action(action, selected.id)?;

        let refinement = self
            .model
            .map(|m| m.predict(obs.location_code, action).to_string());

        Ok(Recommendation {
            activity_id: selected.id,
            activity_name: selected.name,
            refinement,
        })
    }

    /// Persist one raw feedback record verbatim.
    ///
    /// This is the ingestion point for user feedback arriving from outside
    /// an environment step: no reward derivation, no observation snapshot.
    /// All three fields are required; nothing is persisted on validation
    /// failure.
    pub fn record_feedback(
        &mut self,
        activity_id: Option<ActivityId>,
        feedback: Option<&str>,
        state: Option<&str>,
    ) -> CoreResult<FeedbackAck> {
        let activity_id = activity_id
            .ok_or_else(|| CoreError::invalid_argument("activity_id", "is required"))?;
        let feedback = required("feedback", feedback.unwrap_or(""))?.to_string();
        let state = MotionState::parse_or_still(required("state", state.unwrap_or(""))?);

        self.env.store_mut().record_feedback(&FeedbackRecord {
            state,
            activity_id,
            feedback: feedback.clone(),
            reward: None,
            observation: None,
        })?;

        Ok(FeedbackAck {
            activity_id,
            feedback,
            state,
        })
    }

    /// Suggest a plan of candidate activities for the next day.
    ///
    /// Queries the policy `plan_horizon` times against the *same* anchored
    /// observation — a set of independent candidates, not a simulated
    /// multi-step trajectory — and resolves each through the store's
    /// activities at the place.
    pub fn suggest_plan(&mut self, place: &str, state: &str) -> CoreResult<Vec<String>> {
        let place = required("place_name", place)?;
        let state = MotionState::parse_or_still(required("state", state)?);

        let obs = self.env.anchor(state, place)?;
        let activities = self.env.activities().to_vec();
        if activities.is_empty() {
            return Err(CoreError::EmptyActionSpace {
                location: place.to_string(),
            });
        }

        let mut plan = Vec::with_capacity(self.plan_horizon);
        for _ in 0..self.plan_horizon {
            let raw = self.policy.select(&obs, activities.len());
            let action = raw % activities.len();
            let id = activities[action].id;
            let name = self
                .env
                .store()
                .activity_name(id)?
                .ok_or_else(|| CoreError::not_found(format!("activity {}", id)))?;
            plan.push(name);
        }
        Ok(plan)
    }
}

fn required<'s>(field: &str, value: &'s str) -> CoreResult<&'s str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid_argument(field, "is required"));
    }
    Ok(trimmed)
}
