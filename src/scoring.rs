use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::messages;
use crate::models::{AnnotatedAssignment, Assignment, ThreatLevel};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

pub fn hours_until_due(due_date: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (due_date - now).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// First matching band wins; anything 96h or further out is chill.
pub fn classify(assignment: &Assignment, now: DateTime<Utc>) -> ThreatLevel {
    if assignment.submitted {
        return ThreatLevel::Submitted;
    }

    let hours = hours_until_due(assignment.due_date, now);
    if hours < 0.0 {
        ThreatLevel::Dead
    } else if hours < 6.0 {
        ThreatLevel::Doomed
    } else if hours < 24.0 {
        ThreatLevel::Panic
    } else if hours < 96.0 {
        ThreatLevel::Nervous
    } else {
        ThreatLevel::Chill
    }
}

pub fn format_remaining(due_date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let hours = hours_until_due(due_date, now);
    if hours < 0.0 {
        "OVERDUE".to_string()
    } else if hours < 1.0 {
        format!("{}m left", (hours * 60.0).round() as i64)
    } else if hours < 24.0 {
        format!("{}h left", hours.round() as i64)
    } else {
        format!("{}d left", (hours / 24.0).round() as i64)
    }
}

/// Weighted sum of unsubmitted panic scores, capped at 100.
pub fn aggregate_panic_score(assignments: &[Assignment], now: DateTime<Utc>) -> u8 {
    let total: f64 = assignments
        .iter()
        .filter(|a| !a.submitted)
        .map(|a| f64::from(classify(a, now).panic_score()) * a.weight / 100.0)
        .sum();

    total.round().min(100.0) as u8
}

/// Highest panic score among unsubmitted items; the earliest entry wins ties.
pub fn most_urgent(assignments: &[Assignment], now: DateTime<Utc>) -> Option<&Assignment> {
    assignments
        .iter()
        .filter(|a| !a.submitted)
        .min_by_key(|a| Reverse(classify(a, now).panic_score()))
}

/// Like [`most_urgent`] but skips overdue work and breaks ties on the
/// earliest due date.
pub fn most_urgent_upcoming(
    assignments: &[Assignment],
    now: DateTime<Utc>,
) -> Option<&Assignment> {
    assignments
        .iter()
        .filter(|a| !a.submitted && a.due_date >= now)
        .min_by_key(|a| (Reverse(classify(a, now).panic_score()), a.due_date))
}

pub fn process_assignments<R: Rng + ?Sized>(
    assignments: &[Assignment],
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<AnnotatedAssignment> {
    assignments
        .iter()
        .map(|assignment| {
            let threat = classify(assignment, now);
            AnnotatedAssignment {
                assignment: assignment.clone(),
                threat,
                time_left: format_remaining(assignment.due_date, now),
                monkey_message: messages::pick_fallback_message(threat, rng).to_string(),
            }
        })
        .collect()
}

/// Dashboard order: most panic first, input order kept within a level.
pub fn sort_by_urgency(annotated: &mut [AnnotatedAssignment]) {
    annotated.sort_by_key(|a| Reverse(a.threat.panic_score()));
}

pub fn panic_badge_color(score: u8) -> &'static str {
    match score {
        90..=u8::MAX => "#7c3aed",
        70..=89 => "#f87171",
        40..=69 => "#fb923c",
        _ => "#4ade80",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source;
    use chrono::{Duration, TimeZone};
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 10, 9, 0, 0).unwrap()
    }

    fn sample(id: u64, weight: f64, due: Duration, submitted: bool) -> Assignment {
        Assignment {
            id,
            name: format!("Assignment {id}"),
            course: "CS 301".to_string(),
            description: None,
            due_date: now() + due,
            submitted,
            weight,
        }
    }

    #[test]
    fn submitted_wins_regardless_of_due_date() {
        for hours in [-500, -1, 0, 3, 30, 500] {
            let a = sample(1, 20.0, Duration::hours(hours), true);
            assert_eq!(classify(&a, now()), ThreatLevel::Submitted);
        }
    }

    #[test]
    fn band_boundaries_fall_into_the_calmer_band() {
        let cases = [
            (Duration::milliseconds(-1), ThreatLevel::Dead),
            (Duration::zero(), ThreatLevel::Doomed),
            (Duration::hours(6) - Duration::milliseconds(1), ThreatLevel::Doomed),
            (Duration::hours(6), ThreatLevel::Panic),
            (Duration::hours(24), ThreatLevel::Nervous),
            (Duration::hours(96), ThreatLevel::Chill),
            (Duration::hours(120), ThreatLevel::Chill),
            (Duration::days(40), ThreatLevel::Chill),
        ];
        for (offset, expected) in cases {
            let a = sample(1, 10.0, offset, false);
            assert_eq!(classify(&a, now()), expected, "offset {offset:?}");
        }
    }

    #[test]
    fn remaining_time_formats_by_magnitude() {
        assert_eq!(format_remaining(now() + Duration::minutes(30), now()), "30m left");
        assert_eq!(format_remaining(now() + Duration::hours(5), now()), "5h left");
        assert_eq!(format_remaining(now() + Duration::days(3), now()), "3d left");
        assert_eq!(format_remaining(now() - Duration::hours(1), now()), "OVERDUE");
    }

    #[test]
    fn remaining_time_boundaries_use_the_larger_unit() {
        assert_eq!(format_remaining(now() + Duration::hours(1), now()), "1h left");
        assert_eq!(format_remaining(now() + Duration::hours(24), now()), "1d left");
        assert_eq!(format_remaining(now(), now()), "0m left");
        assert_eq!(format_remaining(now() + Duration::minutes(90), now()), "2h left");
    }

    #[test]
    fn aggregate_is_zero_without_outstanding_work() {
        assert_eq!(aggregate_panic_score(&[], now()), 0);
        let all_done = vec![
            sample(1, 50.0, Duration::hours(-3), true),
            sample(2, 50.0, Duration::hours(2), true),
        ];
        assert_eq!(aggregate_panic_score(&all_done, now()), 0);
    }

    #[test]
    fn aggregate_is_capped_at_one_hundred() {
        let heavy = vec![
            sample(1, 90.0, Duration::hours(-3), false),
            sample(2, 90.0, Duration::hours(-1), false),
            sample(3, 500.0, Duration::hours(2), false),
        ];
        assert_eq!(aggregate_panic_score(&heavy, now()), 100);
    }

    #[test]
    fn aggregate_weights_each_level() {
        let fixture = source::fixture(now());
        // 90*10 + 40*25 + 40*30 + 100*15 over 100
        assert_eq!(aggregate_panic_score(&fixture, now()), 46);
    }

    #[test]
    fn fixture_urgency_picks() {
        let fixture = source::fixture(now());
        let urgent = most_urgent(&fixture, now()).unwrap();
        assert_eq!(urgent.name, "Biology Lab Report");
        assert_eq!(classify(urgent, now()).panic_score(), 100);

        let upcoming = most_urgent_upcoming(&fixture, now()).unwrap();
        assert_eq!(upcoming.name, "Math Homework 5");
        assert_eq!(classify(upcoming, now()), ThreatLevel::Doomed);
    }

    #[test]
    fn most_urgent_keeps_insertion_order_on_ties() {
        let items = vec![
            sample(1, 5.0, Duration::hours(50), false),
            sample(2, 5.0, Duration::hours(30), false),
        ];
        assert_eq!(most_urgent(&items, now()).unwrap().id, 1);
        assert_eq!(most_urgent_upcoming(&items, now()).unwrap().id, 2);
    }

    #[test]
    fn urgency_picks_are_empty_when_nothing_qualifies() {
        assert!(most_urgent(&[], now()).is_none());
        let only_overdue = vec![sample(1, 5.0, Duration::hours(-2), false)];
        assert!(most_urgent(&only_overdue, now()).is_some());
        assert!(most_urgent_upcoming(&only_overdue, now()).is_none());
    }

    #[test]
    fn processing_annotates_without_touching_input() {
        let fixture = source::fixture(now());
        let before = fixture.clone();
        let mut rng = Mcg128Xsl64::seed_from_u64(7);
        let mut annotated = process_assignments(&fixture, now(), &mut rng);
        assert_eq!(fixture, before);
        assert_eq!(annotated.len(), 5);
        assert_eq!(annotated[3].time_left, "OVERDUE");
        assert!(annotated.iter().all(|a| !a.monkey_message.is_empty()));

        sort_by_urgency(&mut annotated);
        let order: Vec<u64> = annotated.iter().map(|a| a.assignment.id).collect();
        assert_eq!(order, vec![4, 1, 2, 3, 5]);
    }

    #[test]
    fn badge_color_follows_score_bands() {
        assert_eq!(panic_badge_color(95), "#7c3aed");
        assert_eq!(panic_badge_color(70), "#f87171");
        assert_eq!(panic_badge_color(46), "#fb923c");
        assert_eq!(panic_badge_color(0), "#4ade80");
    }
}
