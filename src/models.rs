use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PanicError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: u64,
    pub name: String,
    pub course: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub submitted: bool,
    pub weight: f64,
}

/// Raw shape read from CSV or JSON files, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub course: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "due_date")]
    pub due_date: Option<DateTime<Utc>>,
    pub submitted: Option<bool>,
    pub weight: Option<f64>,
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, PanicError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        _ => Err(PanicError::missing(field)),
    }
}

impl TryFrom<AssignmentRecord> for Assignment {
    type Error = PanicError;

    fn try_from(record: AssignmentRecord) -> Result<Self, Self::Error> {
        let id = record.id.ok_or_else(|| PanicError::missing("id"))?;
        let name = required_text(record.name, "name")?;
        let course = required_text(record.course, "course")?;
        let due_date = record.due_date.ok_or_else(|| PanicError::missing("dueDate"))?;
        let weight = record.weight.ok_or_else(|| PanicError::missing("weight"))?;

        if !weight.is_finite() {
            return Err(PanicError::invalid("weight", "must be a finite number"));
        }
        if weight < 0.0 {
            return Err(PanicError::invalid(
                "weight",
                format!("must not be negative (got {weight})"),
            ));
        }

        let description = record
            .description
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        Ok(Assignment {
            id,
            name,
            course,
            description,
            due_date,
            submitted: record.submitted.unwrap_or(false),
            weight,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    Submitted,
    Chill,
    Nervous,
    Panic,
    Doomed,
    Dead,
}

impl ThreatLevel {
    pub const ALL: [ThreatLevel; 6] = [
        ThreatLevel::Submitted,
        ThreatLevel::Chill,
        ThreatLevel::Nervous,
        ThreatLevel::Panic,
        ThreatLevel::Doomed,
        ThreatLevel::Dead,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ThreatLevel::Submitted => "submitted",
            ThreatLevel::Chill => "chill",
            ThreatLevel::Nervous => "nervous",
            ThreatLevel::Panic => "panic",
            ThreatLevel::Doomed => "doomed",
            ThreatLevel::Dead => "dead",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.key().eq_ignore_ascii_case(key))
    }

    pub fn label(self) -> &'static str {
        match self {
            ThreatLevel::Submitted => "Submitted",
            ThreatLevel::Chill => "Chill",
            ThreatLevel::Nervous => "Nervous",
            ThreatLevel::Panic => "PANIC",
            ThreatLevel::Doomed => "DOOMED",
            ThreatLevel::Dead => "RIP GPA",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            ThreatLevel::Submitted => "✅",
            ThreatLevel::Chill => "🟢",
            ThreatLevel::Nervous => "🟡",
            ThreatLevel::Panic => "🟠",
            ThreatLevel::Doomed => "🔴",
            ThreatLevel::Dead => "💀",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ThreatLevel::Submitted => "#4ade80",
            ThreatLevel::Chill => "#86efac",
            ThreatLevel::Nervous => "#fde68a",
            ThreatLevel::Panic => "#fb923c",
            ThreatLevel::Doomed => "#f87171",
            ThreatLevel::Dead => "#6b21a8",
        }
    }

    /// Urgency of this level on a 0-100 scale.
    pub fn panic_score(self) -> u8 {
        match self {
            ThreatLevel::Submitted => 0,
            ThreatLevel::Chill => 10,
            ThreatLevel::Nervous => 40,
            ThreatLevel::Panic => 70,
            ThreatLevel::Doomed => 90,
            ThreatLevel::Dead => 100,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedAssignment {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub threat: ThreatLevel,
    pub time_left: String,
    pub monkey_message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
    Nightmare,
}

impl DifficultyTier {
    pub fn key(self) -> &'static str {
        match self {
            DifficultyTier::Easy => "easy",
            DifficultyTier::Medium => "medium",
            DifficultyTier::Hard => "hard",
            DifficultyTier::Nightmare => "nightmare",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DifficultyTier::Easy => "Banana Easy",
            DifficultyTier::Medium => "Manageable Chaos",
            DifficultyTier::Hard => "Cooked Potential",
            DifficultyTier::Nightmare => "Academic Boss Fight",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingSource {
    Model,
    Local,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyRating {
    pub assignment_id: u64,
    pub assignment_name: String,
    pub score: u8,
    pub tier: DifficultyTier,
    pub label: String,
    pub roast: String,
    pub reason: Option<String>,
    pub source: RatingSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Model,
    Fallback,
    Prompt,
}

#[derive(Debug, Clone, Serialize)]
pub struct VentReply {
    pub text: String,
    pub source: ReplySource,
    /// User-facing notice, set when the reply fell back for a reason the user can fix.
    pub notice: Option<String>,
}
