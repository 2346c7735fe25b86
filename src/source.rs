use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::error::PanicError;
use crate::models::{Assignment, AssignmentRecord};

#[derive(Debug)]
pub struct RejectedRecord {
    /// 1-based position of the record in the input.
    pub position: usize,
    pub error: PanicError,
}

#[derive(Debug, Default)]
pub struct LoadedAssignments {
    pub assignments: Vec<Assignment>,
    pub rejected: Vec<RejectedRecord>,
}

/// The shipped sample set, with due dates relative to `now`.
pub fn fixture(now: DateTime<Utc>) -> Vec<Assignment> {
    let assignments = vec![
        (
            1,
            "Math Homework 5",
            "MATH 101",
            "Complete 18 calculus problems on derivatives and related rates. Show full work and upload handwritten solutions as a single PDF.",
            Duration::hours(3),
            false,
            10.0,
        ),
        (
            2,
            "History Essay",
            "HIST 202",
            "Write a 4-page essay comparing two primary sources from the Civil War era with citations in Chicago style.",
            Duration::hours(26),
            false,
            25.0,
        ),
        (
            3,
            "CS Project Phase 1",
            "CS 301",
            "Build the first milestone of a web app with login, database schema, and API routes. Submit repo link plus architecture notes.",
            Duration::hours(72),
            false,
            30.0,
        ),
        (
            4,
            "Biology Lab Report",
            "BIO 110",
            "Formal lab report with hypothesis, methods, data table, graph, and conclusion for enzyme activity experiment. Include error analysis.",
            Duration::hours(-5),
            false,
            15.0,
        ),
        (
            5,
            "English Reading Quiz",
            "ENG 105",
            "10-question quiz on assigned reading chapters covering symbolism, tone, and author argument.",
            Duration::hours(120),
            true,
            5.0,
        ),
    ];

    assignments
        .into_iter()
        .map(
            |(id, name, course, description, due_in, submitted, weight)| Assignment {
                id,
                name: name.to_string(),
                course: course.to_string(),
                description: Some(description.to_string()),
                due_date: now + due_in,
                submitted,
                weight,
            },
        )
        .collect()
}

/// Validates records one by one; a bad record is rejected on its own.
pub fn validate_records<I>(records: I) -> LoadedAssignments
where
    I: IntoIterator<Item = Result<AssignmentRecord, PanicError>>,
{
    let mut loaded = LoadedAssignments::default();
    let mut seen_ids = HashSet::new();

    for (index, record) in records.into_iter().enumerate() {
        let position = index + 1;
        let result = record.and_then(Assignment::try_from).and_then(|assignment| {
            if seen_ids.insert(assignment.id) {
                Ok(assignment)
            } else {
                Err(PanicError::invalid(
                    "id",
                    format!("{} duplicates an earlier record", assignment.id),
                ))
            }
        });

        match result {
            Ok(assignment) => loaded.assignments.push(assignment),
            Err(error) => {
                let rejected = RejectedRecord { position, error };
                warn!(
                    position = rejected.position,
                    error = %rejected.error,
                    "rejecting assignment record"
                );
                loaded.rejected.push(rejected);
            }
        }
    }

    loaded
}

pub fn import_csv(csv_path: &Path) -> anyhow::Result<LoadedAssignments> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;

    let records = reader.deserialize::<AssignmentRecord>().map(|row| {
        row.map_err(|err| PanicError::invalid("row", err.to_string()))
    });

    Ok(validate_records(records))
}

pub fn import_json(json_path: &Path) -> anyhow::Result<LoadedAssignments> {
    let raw = std::fs::read_to_string(json_path)
        .with_context(|| format!("failed to read {}", json_path.display()))?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array", json_path.display()))?;

    let records = values.into_iter().map(|value| {
        serde_json::from_value::<AssignmentRecord>(value)
            .map_err(|err| PanicError::invalid("record", err.to_string()))
    });

    Ok(validate_records(records))
}
