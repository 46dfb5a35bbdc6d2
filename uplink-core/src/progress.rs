//! Progress-log side channels. Some backend deployments never grew the
//! structured columns for evaluation scores and cancel reasons, so those are
//! also recorded as tagged log entries. The decoders here recover them, but
//! only as a last resort; the structured field always wins when present.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use uplink_api::domain::{ParticipantScore, Project, ProjectUpdate};

pub const TAG_ADMIN_ACK: &str = "[admin-ack]";
pub const TAG_EVALUATION: &str = "[evaluation]";
pub const TAG_CANCEL_REASON: &str = "[cancel-reason]";

fn tagged_payload<'a>(update: &'a ProjectUpdate, tag: &str) -> Option<&'a str> {
    update
        .content
        .find(tag)
        .map(|idx| update.content[idx + tag.len()..].trim())
}

/// Decode the most recent evaluation snapshot from the log. Entries are
/// ordered newest-last; the payload after the tag is a JSON array of
/// `{employee_id, employee_name?, score}` records.
pub fn evaluation_from_updates(updates: &[ProjectUpdate]) -> Vec<ParticipantScore> {
    #[derive(Deserialize)]
    struct RawScore {
        employee_id: Option<i64>,
        #[serde(default)]
        employee_name: Option<String>,
        #[serde(default)]
        score: Option<f64>,
    }

    for update in updates.iter().rev() {
        let Some(raw) = tagged_payload(update, TAG_EVALUATION) else {
            continue;
        };
        let Ok(parsed) = serde_json::from_str::<Vec<RawScore>>(raw) else {
            return Vec::new();
        };
        return parsed
            .into_iter()
            .filter_map(|r| {
                Some(ParticipantScore {
                    employee_id: r.employee_id?,
                    employee_name: r.employee_name,
                    score: r.score,
                })
            })
            .collect();
    }

    Vec::new()
}

/// Most recent cancel reason recorded in the log, if any.
pub fn cancel_reason_from_updates(updates: &[ProjectUpdate]) -> Option<String> {
    updates
        .iter()
        .rev()
        .find_map(|u| tagged_payload(u, TAG_CANCEL_REASON))
        .filter(|reason| !reason.is_empty())
        .map(|reason| reason.to_string())
}

/// Timestamp of the latest administrator acknowledgement entry.
pub fn last_ack_time(updates: &[ProjectUpdate]) -> Option<DateTime<Utc>> {
    updates
        .iter()
        .filter(|u| u.content.contains(TAG_ADMIN_ACK))
        .map(|u| u.created_at)
        .max()
}

/// The log entries meant for display. Tagged side-channel entries are shown
/// through their own cards instead, so they are hidden here to avoid
/// duplicate exposure.
pub fn visible_updates(updates: &[ProjectUpdate]) -> Vec<&ProjectUpdate> {
    updates
        .iter()
        .filter(|u| {
            !u.content.contains(TAG_ADMIN_ACK)
                && !u.content.contains(TAG_EVALUATION)
                && !u.content.contains(TAG_CANCEL_REASON)
        })
        .collect()
}

/// Whether an entry should be highlighted as unread: the project still
/// carries the unread flag and the entry was created or edited after the
/// last acknowledgement.
pub fn is_unread(
    update: &ProjectUpdate,
    has_unread_flag: bool,
    acknowledged_at: Option<DateTime<Utc>>,
) -> bool {
    has_unread_flag
        && acknowledged_at
            .map(|ack| update.last_touched_at() > ack)
            .unwrap_or(true)
}

/// Cancel reason as shown on the detail view: the structured field first,
/// the log side channel only when it is absent.
pub fn display_cancel_reason(project: &Project, updates: &[ProjectUpdate]) -> Option<String> {
    project
        .cancel_reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| r.to_string())
        .or_else(|| cancel_reason_from_updates(updates))
}

/// Participant scores as shown on the detail view; same precedence as
/// [`display_cancel_reason`].
pub fn participant_scores_with_fallback(
    project: &Project,
    updates: &[ProjectUpdate],
) -> Vec<ParticipantScore> {
    match project.participant_scores.as_deref() {
        Some(scores) if !scores.is_empty() => scores.to_vec(),
        _ => evaluation_from_updates(updates),
    }
}
