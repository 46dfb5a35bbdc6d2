use itertools::Itertools;
use serde::Serialize;
use uplink_api::domain::{AdminInfoPayload, Project};

use super::numeric::{parse_amount, round1};

/// In-progress form values for the admin block, kept as the raw strings the
/// user typed (possibly with thousands separators). A field that is `None`
/// or fails to parse falls through to the next source in the chain.
#[derive(Debug, Clone, Default)]
pub struct AdminFieldEdits {
    pub contract_amount: Option<String>,
    pub cost_material: Option<String>,
    pub cost_labor: Option<String>,
    pub cost_office: Option<String>,
    pub cost_progress: Option<String>,
    pub cost_other: Option<String>,
    pub sales_cost: Option<String>,
    pub project_period_days: Option<String>,
    pub difficulty: Option<String>,
    pub progress_step: Option<String>,
    pub participant_count: Option<String>,
    pub cost_other_note: Option<String>,
}

/// All derived scores for a project snapshot. `profit_rate_score` stays at
/// full precision; `contract_score` and `final_score` are rounded to one
/// decimal, half away from zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub cost_sum: f64,
    pub profit_amount: f64,
    pub profit_rate_score: f64,
    pub contract_score: f64,
    pub period_score: f64,
    pub difficulty_score: f64,
    pub progress_score: f64,
    pub participant_penalty: f64,
    pub final_score: f64,
}

/// Resolve one score component: pending edit, then persisted override, then
/// the loaded record, then zero.
fn resolve(edit: Option<&String>, override_value: Option<f64>, record: Option<f64>) -> f64 {
    edit.and_then(|s| parse_amount(s))
        .or(override_value)
        .or(record)
        .unwrap_or(0.0)
}

/// Distinct employee ids in the evaluation set; the normal source of the
/// participant penalty.
pub fn distinct_participant_count(project: &Project) -> usize {
    project
        .participant_scores
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|p| p.employee_id)
        .unique()
        .count()
}

/// Compute every derived score for a project. Pure and total: malformed or
/// missing input degrades to zero rather than failing, so rendering is never
/// blocked.
pub fn compute_scores(
    project: &Project,
    edits: &AdminFieldEdits,
    overrides: Option<&AdminInfoPayload>,
) -> ScoreBreakdown {
    let ov = |f: fn(&AdminInfoPayload) -> Option<f64>| overrides.and_then(f);

    let contract_amount = resolve(
        edits.contract_amount.as_ref(),
        ov(|o| o.contract_amount),
        project.contract_amount,
    );

    let cost_sum = resolve(
        edits.cost_material.as_ref(),
        ov(|o| o.cost_material),
        project.cost_material,
    ) + resolve(
        edits.cost_labor.as_ref(),
        ov(|o| o.cost_labor),
        project.cost_labor,
    ) + resolve(
        edits.cost_office.as_ref(),
        ov(|o| o.cost_office),
        project.cost_office,
    ) + resolve(
        edits.cost_progress.as_ref(),
        ov(|o| o.cost_progress),
        project.cost_progress,
    ) + resolve(
        edits.cost_other.as_ref(),
        ov(|o| o.cost_other),
        project.cost_other,
    ) + resolve(
        edits.sales_cost.as_ref(),
        ov(|o| o.sales_cost),
        project.sales_cost,
    );

    let profit_amount = contract_amount - cost_sum;
    let profit_rate_score = profit_amount / 1_000_000.0;

    let period_score = resolve(
        edits.project_period_days.as_ref(),
        ov(|o| o.project_period_days.map(|v| v as f64)),
        project.project_period_days.map(|v| v as f64),
    );
    let difficulty_score = resolve(
        edits.difficulty.as_ref(),
        ov(|o| o.difficulty),
        project.difficulty,
    );
    let progress_score = resolve(
        edits.progress_step.as_ref(),
        ov(|o| o.progress_step.map(|v| v as f64)),
        project.progress_step.map(|v| v as f64),
    );

    // The penalty is normally derived from the evaluation set; an explicit
    // edit, override or stored record takes precedence over the derivation.
    let participant_penalty = edits
        .participant_count
        .as_ref()
        .and_then(|s| parse_amount(s))
        .or(ov(|o| o.participant_count.map(|v| v as f64)))
        .or(project.participant_count.map(|v| v as f64))
        .unwrap_or_else(|| distinct_participant_count(project) as f64);

    let final_score = round1(
        period_score + difficulty_score + profit_rate_score + progress_score - participant_penalty,
    );

    ScoreBreakdown {
        cost_sum,
        profit_amount,
        profit_rate_score,
        contract_score: round1(contract_amount / 1_000_000.0),
        period_score,
        difficulty_score,
        progress_score,
        participant_penalty,
        final_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uplink_api::domain::ParticipantScore;

    fn project_with_admin_block() -> Project {
        Project {
            id: 1,
            name: "Harbor survey".to_string(),
            contract_amount: Some(100_000_000.0),
            cost_material: Some(10_000_000.0),
            cost_labor: Some(20_000_000.0),
            cost_office: Some(5_000_000.0),
            cost_progress: Some(3_000_000.0),
            cost_other: Some(1_000_000.0),
            sales_cost: Some(1_000_000.0),
            project_period_days: Some(90),
            difficulty: Some(5.0),
            progress_step: Some(8),
            participant_count: Some(3),
            ..Project::default()
        }
    }

    #[test]
    fn reference_scenario() {
        let project = project_with_admin_block();
        let scores = compute_scores(&project, &AdminFieldEdits::default(), None);

        assert_eq!(scores.cost_sum, 40_000_000.0);
        assert_eq!(scores.profit_amount, 60_000_000.0);
        assert_eq!(scores.profit_rate_score, 60.0);
        assert_eq!(scores.contract_score, 100.0);
        // 90 + 5 + 60 + 8 - 3
        assert_eq!(scores.final_score, 160.0);
    }

    #[test]
    fn empty_project_yields_zeroes() {
        let project = Project {
            id: 2,
            name: "Blank".to_string(),
            ..Project::default()
        };
        let scores = compute_scores(&project, &AdminFieldEdits::default(), None);

        assert_eq!(scores.cost_sum, 0.0);
        assert_eq!(scores.final_score, 0.0);
        assert_eq!(scores.participant_penalty, 0.0);
    }

    #[test]
    fn pending_edit_beats_override_beats_record() {
        let project = project_with_admin_block();
        let overrides = AdminInfoPayload {
            difficulty: Some(7.0),
            project_period_days: Some(30),
            ..AdminInfoPayload::default()
        };

        let edits = AdminFieldEdits {
            difficulty: Some("9".to_string()),
            ..AdminFieldEdits::default()
        };
        let scores = compute_scores(&project, &edits, Some(&overrides));

        assert_eq!(scores.difficulty_score, 9.0); // edit wins
        assert_eq!(scores.period_score, 30.0); // override beats record
        assert_eq!(scores.progress_score, 8.0); // record survives
    }

    #[test]
    fn unparseable_edit_falls_through() {
        let project = project_with_admin_block();
        let edits = AdminFieldEdits {
            difficulty: Some("".to_string()),
            progress_step: Some("abc".to_string()),
            ..AdminFieldEdits::default()
        };
        let scores = compute_scores(&project, &edits, None);

        assert_eq!(scores.difficulty_score, 5.0);
        assert_eq!(scores.progress_score, 8.0);
    }

    #[test]
    fn penalty_derives_from_distinct_participants_when_unset() {
        let mut project = project_with_admin_block();
        project.participant_count = None;
        project.participant_scores = Some(vec![
            ParticipantScore {
                employee_id: 1,
                employee_name: None,
                score: Some(3.5),
            },
            ParticipantScore {
                employee_id: 1,
                employee_name: None,
                score: Some(3.5),
            },
            ParticipantScore {
                employee_id: 2,
                employee_name: None,
                score: Some(3.0),
            },
        ]);

        let scores = compute_scores(&project, &AdminFieldEdits::default(), None);
        assert_eq!(scores.participant_penalty, 2.0);
    }

    #[test]
    fn final_score_is_order_independent() {
        let project = project_with_admin_block();
        let scores = compute_scores(&project, &AdminFieldEdits::default(), None);

        let components = [
            scores.period_score,
            scores.difficulty_score,
            scores.profit_rate_score,
            scores.progress_score,
            -scores.participant_penalty,
        ];
        let forward: f64 = components.iter().sum();
        let backward: f64 = components.iter().rev().sum();

        assert_eq!(round1(forward), scores.final_score);
        assert_eq!(round1(backward), scores.final_score);
    }

    #[test]
    fn thousands_separators_in_edits_parse() {
        let project = Project {
            id: 3,
            name: "Separator check".to_string(),
            ..Project::default()
        };
        let edits = AdminFieldEdits {
            contract_amount: Some("100,000,000".to_string()),
            cost_material: Some("40,000,000".to_string()),
            ..AdminFieldEdits::default()
        };
        let scores = compute_scores(&project, &edits, None);

        assert_eq!(scores.profit_amount, 60_000_000.0);
        assert_eq!(scores.profit_rate_score, 60.0);
    }
}
