//! Onboarding questions and their ordering.
//!
//! Questions are asked by the bot in `step_order`. Reordering moves one
//! question and renumbers the whole list as `1..=n`, then sends an update for
//! each question whose step actually changed.

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::api::auth::MessageResponse;
use crate::api::{de_id, de_opt_id, path_segment};
use crate::http::{ApiError, ApiRequest};
use crate::session::SessionStore;

const QUESTIONS_PATH: &str = "/trainer/questions";

/// Embedded category of a question. The backend sends `{}` when the join
/// found nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryRef {
    #[serde(deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub step_order: u32,
    #[serde(default)]
    pub question_categories: Option<CategoryRef>,
}

impl Question {
    /// Category name for display.
    #[must_use]
    pub fn category_name(&self) -> &str {
        self.question_categories
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .unwrap_or("Uncategorized")
    }
}

/// Body of `POST /trainer/questions`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewQuestion {
    #[validate(length(min = 1, message = "Category is required"))]
    pub category_id: String,
    #[validate(length(min = 1, max = 1000, message = "Question text must be 1-1000 characters"))]
    pub question_text: String,
    #[validate(range(min = 1, message = "Step order starts at 1"))]
    pub step_order: u32,
}

/// Body of `PUT /trainer/questions/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
pub struct QuestionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 1000, message = "Question text must be 1-1000 characters"))]
    pub question_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Step order starts at 1"))]
    pub step_order: Option<u32>,
}

/// One renumbering produced by [`plan_reorder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepChange {
    pub question_id: String,
    pub from: u32,
    pub to: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    #[error("position {index} is out of range (have {len} questions)")]
    OutOfRange { index: usize, len: usize },
}

/// Questions in display order: by step, ties kept in listing order.
#[must_use]
pub fn display_order(questions: &[Question]) -> Vec<&Question> {
    let mut ordered: Vec<&Question> = questions.iter().collect();
    ordered.sort_by_key(|q| q.step_order);
    ordered
}

/// Step for a newly created question: one past the current maximum,
/// saturating at `u32::MAX`.
#[must_use]
pub fn next_step(questions: &[Question]) -> u32 {
    questions.iter().map(|q| q.step_order).max().unwrap_or(0).saturating_add(1)
}

/// Move the question at display position `from` to position `to` (both
/// zero-based) and renumber every question as `1..=n`.
///
/// Only questions whose step differs from the stored one are returned, so a
/// no-op move on a consistent list yields nothing.
///
/// # Errors
///
/// [`ReorderError::OutOfRange`] if either position is past the end.
pub fn plan_reorder(questions: &[Question], from: usize, to: usize) -> Result<Vec<StepChange>, ReorderError> {
    let len = questions.len();
    for index in [from, to] {
        if index >= len {
            return Err(ReorderError::OutOfRange { index, len });
        }
    }

    let mut ordered = display_order(questions);
    let moved = ordered.remove(from);
    ordered.insert(to, moved);

    Ok(ordered
        .into_iter()
        .zip(1u32..)
        .filter(|(question, step)| question.step_order != *step)
        .map(|(question, step)| StepChange {
            question_id: question.id.clone(),
            from: question.step_order,
            to: step,
        })
        .collect())
}

/// Result of [`QuestionApi::apply_reorder`].
#[derive(Debug, Default)]
pub struct ReorderOutcome {
    pub applied: Vec<StepChange>,
    pub failed: Vec<(StepChange, ApiError)>,
}

impl ReorderOutcome {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Onboarding question management for the signed-in trainer.
pub struct QuestionApi<'a> {
    session: &'a SessionStore,
}

impl<'a> QuestionApi<'a> {
    #[must_use]
    pub fn new(session: &'a SessionStore) -> Self {
        Self { session }
    }

    pub async fn list(&self) -> Result<Vec<Question>, ApiError> {
        self.session.send(ApiRequest::get(QUESTIONS_PATH)).await
    }

    pub async fn create(&self, question: &NewQuestion) -> Result<MessageResponse, ApiError> {
        question.validate()?;
        self.session
            .send(ApiRequest::post(QUESTIONS_PATH).with_json(question)?)
            .await
    }

    pub async fn update(&self, question_id: &str, update: &QuestionUpdate) -> Result<MessageResponse, ApiError> {
        let id = path_segment(question_id)?;
        update.validate()?;
        if update == &QuestionUpdate::default() {
            return Err(ApiError::Invalid("Nothing to update".to_string()));
        }
        self.session
            .send(ApiRequest::put(format!("{QUESTIONS_PATH}/{id}")).with_json(update)?)
            .await
    }

    pub async fn delete(&self, question_id: &str) -> Result<MessageResponse, ApiError> {
        let id = path_segment(question_id)?;
        self.session
            .send(ApiRequest::delete(format!("{QUESTIONS_PATH}/{id}")))
            .await
    }

    /// Send every planned step change at once.
    ///
    /// There is no rollback: changes that went through stay applied and
    /// failures are reported per question.
    pub async fn apply_reorder(&self, changes: Vec<StepChange>) -> ReorderOutcome {
        let results = join_all(changes.iter().map(|change| {
            let update = QuestionUpdate {
                question_text: None,
                step_order: Some(change.to),
            };
            async move { self.update(&change.question_id, &update).await }
        }))
        .await;

        let mut outcome = ReorderOutcome::default();
        for (change, result) in changes.into_iter().zip(results) {
            match result {
                Ok(_) => outcome.applied.push(change),
                Err(err) => {
                    log::warn!("Could not move question {}: {err}", change.question_id);
                    outcome.failed.push((change, err));
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, step: u32) -> Question {
        Question {
            id: id.into(),
            category_id: Some("c1".into()),
            question_text: format!("Question {id}"),
            step_order: step,
            question_categories: None,
        }
    }

    #[test]
    fn test_move_last_to_first() {
        let questions = vec![question("a", 1), question("b", 2), question("c", 3)];
        let changes = plan_reorder(&questions, 2, 0).unwrap();
        assert_eq!(
            changes,
            vec![
                StepChange { question_id: "c".into(), from: 3, to: 1 },
                StepChange { question_id: "a".into(), from: 1, to: 2 },
                StepChange { question_id: "b".into(), from: 2, to: 3 },
            ]
        );
    }

    #[test]
    fn test_adjacent_swap_touches_two() {
        let questions = vec![question("a", 1), question("b", 2), question("c", 3)];
        let changes = plan_reorder(&questions, 0, 1).unwrap();
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| c.question_id != "c"));
    }

    #[test]
    fn test_same_position_is_noop() {
        let questions = vec![question("a", 1), question("b", 2)];
        assert!(plan_reorder(&questions, 1, 1).unwrap().is_empty());
    }

    #[test]
    fn test_gaps_are_compacted() {
        let questions = vec![question("a", 2), question("b", 5)];
        let changes = plan_reorder(&questions, 0, 0).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].to, 1);
        assert_eq!(changes[1].to, 2);
    }

    #[test]
    fn test_listing_order_is_not_trusted() {
        let questions = vec![question("b", 2), question("a", 1)];
        let changes = plan_reorder(&questions, 0, 1).unwrap();
        assert_eq!(changes[0].question_id, "b");
        assert_eq!(changes[0].to, 1);
    }

    #[test]
    fn test_out_of_range() {
        let questions = vec![question("a", 1)];
        assert_eq!(
            plan_reorder(&questions, 0, 3),
            Err(ReorderError::OutOfRange { index: 3, len: 1 })
        );
        assert!(plan_reorder(&[], 0, 0).is_err());
    }

    #[test]
    fn test_next_step() {
        assert_eq!(next_step(&[]), 1);
        assert_eq!(next_step(&[question("a", 1), question("b", 4)]), 5);
    }

    #[test]
    fn test_next_step_saturates_at_max() {
        let questions = vec![question("a", 1), question("b", u32::MAX)];
        assert_eq!(next_step(&questions), u32::MAX);
    }

    #[test]
    fn test_question_with_empty_category_join() {
        let q: Question = serde_json::from_str(
            r#"{"id": "q1", "category_id": "c1", "question_text": "Age?", "step_order": 1, "question_categories": {}}"#,
        )
        .unwrap();
        assert_eq!(q.category_name(), "Uncategorized");
    }

    #[test]
    fn test_update_serializes_only_step() {
        let update = QuestionUpdate {
            question_text: None,
            step_order: Some(3),
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"step_order": 3})
        );
    }
}
