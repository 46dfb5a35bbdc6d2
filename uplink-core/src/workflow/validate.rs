use uplink_api::domain::{CompleteProjectPayload, ParticipantScoreInput};

use crate::scoring::{has_at_most_one_decimal, round1};
use crate::WorkflowError;

/// One row of the evaluation form: a selected participant and the score as
/// the user typed it.
#[derive(Debug, Clone)]
pub struct ScoreEntry {
    pub employee_id: i64,
    pub score: String,
}

impl ScoreEntry {
    pub fn new(employee_id: i64, score: impl Into<String>) -> Self {
        Self {
            employee_id,
            score: score.into(),
        }
    }
}

/// Validate a completion evaluation. Every selected participant needs a
/// present, finite, non-negative score with at most one decimal digit, and
/// the scores must sum to 10.0 within ±0.05 after rounding to one decimal.
/// Each stored score is itself rounded to one decimal.
pub fn validate_completion(entries: &[ScoreEntry]) -> Result<CompleteProjectPayload, WorkflowError> {
    if entries.is_empty() {
        return Err(WorkflowError::NoParticipants);
    }

    let mut participants = Vec::with_capacity(entries.len());
    let mut sum = 0.0;
    for entry in entries {
        let employee_id = entry.employee_id;
        let raw = entry.score.trim();
        if raw.is_empty() {
            return Err(WorkflowError::MissingScore { employee_id });
        }
        let score = match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => n,
            _ => return Err(WorkflowError::InvalidScore { employee_id }),
        };
        if score < 0.0 {
            return Err(WorkflowError::NegativeScore { employee_id });
        }
        if !has_at_most_one_decimal(score) {
            return Err(WorkflowError::TooPreciseScore { employee_id });
        }

        sum += score;
        participants.push(ParticipantScoreInput {
            employee_id,
            score: round1(score),
        });
    }

    let sum = round1(sum);
    if (sum - 10.0).abs() > 0.05 {
        return Err(WorkflowError::ScoreSumMismatch { sum });
    }

    Ok(CompleteProjectPayload { participants })
}

/// A cancel reason must be non-empty after trimming; the trimmed form is
/// what gets persisted.
pub fn validate_cancel_reason(raw: &str) -> Result<String, WorkflowError> {
    let reason = raw.trim();
    if reason.is_empty() {
        return Err(WorkflowError::EmptyCancelReason);
    }
    Ok(reason.to_string())
}

pub fn validate_update_content(raw: &str) -> Result<String, WorkflowError> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(WorkflowError::EmptyUpdateContent);
    }
    Ok(content.to_string())
}

/// Progress step is a whole-number 1-10 maturity score when present. The
/// value is checked as entered; "8.4" is rejected, not rounded to 8.
pub fn validate_progress_step(step: Option<f64>) -> Result<Option<i64>, WorkflowError> {
    match step {
        None => Ok(None),
        Some(s) if (1.0..=10.0).contains(&s) && s.fract() == 0.0 => Ok(Some(s as i64)),
        Some(_) => Err(WorkflowError::ProgressStepOutOfRange),
    }
}
