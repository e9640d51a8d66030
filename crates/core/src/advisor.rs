//! Next-plan suggestion rules.
//!
//! Purely advisory: the engine never acts on a suggestion, it only
//! computes one from persisted data when asked, so a stale suggestion can
//! never corrupt timer state.

use crate::types::DbId;

/// Net study minutes at or above which a break is suggested before the
/// next plan.
pub const LONG_STUDY_BREAK_MINUTES: i64 = 60;

/// Break length suggested after a long stretch.
pub const SUGGESTED_BREAK_MINUTES: i64 = 10;

/// A not-yet-completed plan from the student's same-day list, in
/// priority order.
#[derive(Debug, Clone)]
pub struct CandidatePlan {
    pub plan_id: DbId,
    pub title: String,
    pub subject: Option<String>,
}

/// What to study next. `kind` is the wire discriminator.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NextPlanSuggestion {
    /// Every plan for the day is done.
    DailyComplete,
    /// The finished stretch ran long; rest before the next plan.
    BreakRecommended {
        rest_minutes: i64,
        next_plan_id: Option<DbId>,
    },
    /// Another remaining plan continues the same subject.
    SameSubject { plan_id: DbId, title: String },
    /// Highest-priority remaining plan.
    NextPriority { plan_id: DbId, title: String },
}

/// Pick a suggestion for what follows a just-finished activity.
///
/// Precedence: nothing left wins over everything; then the break rule
/// (fatigue beats topical continuity); then subject affinity; then plain
/// priority order.
pub fn suggest(
    completed_subject: Option<&str>,
    net_study_minutes: i64,
    remaining: &[CandidatePlan],
) -> NextPlanSuggestion {
    if remaining.is_empty() {
        return NextPlanSuggestion::DailyComplete;
    }

    if net_study_minutes >= LONG_STUDY_BREAK_MINUTES {
        return NextPlanSuggestion::BreakRecommended {
            rest_minutes: SUGGESTED_BREAK_MINUTES,
            next_plan_id: remaining.first().map(|p| p.plan_id),
        };
    }

    if let Some(subject) = completed_subject {
        if let Some(hit) = remaining
            .iter()
            .find(|p| p.subject.as_deref() == Some(subject))
        {
            return NextPlanSuggestion::SameSubject {
                plan_id: hit.plan_id,
                title: hit.title.clone(),
            };
        }
    }

    let first = &remaining[0];
    NextPlanSuggestion::NextPriority {
        plan_id: first.plan_id,
        title: first.title.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(id: DbId, title: &str, subject: Option<&str>) -> CandidatePlan {
        CandidatePlan {
            plan_id: id,
            title: title.to_string(),
            subject: subject.map(str::to_string),
        }
    }

    #[test]
    fn empty_day_is_daily_complete() {
        assert_eq!(
            suggest(Some("math"), 30, &[]),
            NextPlanSuggestion::DailyComplete
        );
    }

    #[test]
    fn daily_complete_beats_break() {
        // Even after a marathon, nothing remaining means the day is done.
        assert_eq!(suggest(None, 180, &[]), NextPlanSuggestion::DailyComplete);
    }

    #[test]
    fn long_stretch_recommends_break() {
        let remaining = [plan(11, "Algebra II ch. 4", Some("math"))];
        assert_eq!(
            suggest(Some("math"), LONG_STUDY_BREAK_MINUTES, &remaining),
            NextPlanSuggestion::BreakRecommended {
                rest_minutes: SUGGESTED_BREAK_MINUTES,
                next_plan_id: Some(11),
            }
        );
    }

    #[test]
    fn break_beats_same_subject() {
        let remaining = [plan(11, "Algebra II ch. 4", Some("math"))];
        let got = suggest(Some("math"), 95, &remaining);
        assert!(matches!(
            got,
            NextPlanSuggestion::BreakRecommended { .. }
        ));
    }

    #[test]
    fn just_under_threshold_does_not_break() {
        let remaining = [plan(11, "Algebra II ch. 4", Some("math"))];
        let got = suggest(Some("math"), LONG_STUDY_BREAK_MINUTES - 1, &remaining);
        assert!(matches!(got, NextPlanSuggestion::SameSubject { .. }));
    }

    #[test]
    fn same_subject_preferred_over_priority_order() {
        let remaining = [
            plan(21, "English vocab day 12", Some("english")),
            plan(22, "Geometry proofs", Some("math")),
        ];
        assert_eq!(
            suggest(Some("math"), 20, &remaining),
            NextPlanSuggestion::SameSubject {
                plan_id: 22,
                title: "Geometry proofs".to_string(),
            }
        );
    }

    #[test]
    fn falls_back_to_first_remaining() {
        let remaining = [
            plan(21, "English vocab day 12", Some("english")),
            plan(22, "Geometry proofs", Some("math")),
        ];
        assert_eq!(
            suggest(Some("science"), 20, &remaining),
            NextPlanSuggestion::NextPriority {
                plan_id: 21,
                title: "English vocab day 12".to_string(),
            }
        );
    }

    #[test]
    fn no_subject_falls_back_to_priority() {
        let remaining = [plan(21, "English vocab day 12", Some("english"))];
        assert!(matches!(
            suggest(None, 20, &remaining),
            NextPlanSuggestion::NextPriority { .. }
        ));
    }

    #[test]
    fn subjectless_candidates_never_match_affinity() {
        let remaining = [plan(21, "Reading log", None)];
        assert!(matches!(
            suggest(Some("math"), 20, &remaining),
            NextPlanSuggestion::NextPriority { .. }
        ));
    }

    #[test]
    fn suggestion_serializes_with_kind_tag() {
        let s = NextPlanSuggestion::SameSubject {
            plan_id: 5,
            title: "t".to_string(),
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["kind"], "same_subject");
        assert_eq!(json["plan_id"], 5);
    }
}
