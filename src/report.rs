use std::fmt::Write;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::messages;
use crate::models::{AnnotatedAssignment, Assignment, ThreatLevel};
use crate::scoring;

#[derive(Debug, Clone, PartialEq)]
pub struct LevelSummary {
    pub level: ThreatLevel,
    pub count: usize,
    pub total_weight: f64,
}

pub fn summarize_by_level(annotated: &[AnnotatedAssignment]) -> Vec<LevelSummary> {
    let mut summaries: Vec<LevelSummary> = ThreatLevel::ALL
        .into_iter()
        .map(|level| {
            let matching = annotated.iter().filter(|a| a.threat == level);
            LevelSummary {
                level,
                count: matching.clone().count(),
                total_weight: matching.map(|a| a.assignment.weight).sum(),
            }
        })
        .filter(|summary| summary.count > 0)
        .collect();

    summaries.sort_by_key(|s| std::cmp::Reverse(s.level.panic_score()));
    summaries
}

pub fn build_report<R: Rng + ?Sized>(
    assignments: &[Assignment],
    now: DateTime<Utc>,
    rng: &mut R,
) -> String {
    let panic_score = scoring::aggregate_panic_score(assignments, now);
    let mut annotated = scoring::process_assignments(assignments, now, rng);
    scoring::sort_by_urgency(&mut annotated);
    let summaries = summarize_by_level(&annotated);

    let mut output = String::new();

    let _ = writeln!(output, "# Monkey Ranger Panic Report");
    let _ = writeln!(
        output,
        "Generated {} for {} assignments",
        now.format("%Y-%m-%d %H:%M UTC"),
        assignments.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "**Panic Score: {}%** (badge {})",
        panic_score,
        scoring::panic_badge_color(panic_score)
    );
    let _ = writeln!(output);

    let urgent = annotated.iter().find(|a| !a.assignment.submitted);
    let _ = writeln!(output, "## Monkey Says");
    match urgent {
        Some(a) => {
            let _ = writeln!(output, "> {}", a.monkey_message);
        }
        None => {
            let _ = writeln!(output, "> {}", messages::NO_UNSUBMITTED_MESSAGE);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Threat Mix");
    if summaries.is_empty() {
        let _ = writeln!(output, "No assignments loaded.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {} {} ({}): {} assignments ({:.0}% of grade)",
                summary.level.emoji(),
                summary.level.label(),
                summary.level.color(),
                summary.count,
                summary.total_weight
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Assignments");
    if annotated.is_empty() {
        let _ = writeln!(output, "Nothing to track.");
    } else {
        let _ = writeln!(output, "| | Assignment | Course | Time Left | Threat |");
        let _ = writeln!(output, "|---|---|---|---|---|");
        for a in annotated.iter() {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} |",
                a.threat.emoji(),
                a.assignment.name,
                a.assignment.course,
                a.time_left,
                a.threat.label()
            );
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "## Monkey Notes");
        for a in annotated.iter() {
            let _ = writeln!(output, "- {}: {}", a.assignment.name, a.monkey_message);
        }
    }

    output
}
