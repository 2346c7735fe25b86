use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use tracing::warn;

use crate::error::PanicError;
use crate::gemini::{GenerationParams, TextGenerator, EMPTY_REPLY};
use crate::messages;
use crate::models::{Assignment, DifficultyRating, RatingSource, ReplySource, VentReply};
use crate::scoring;

const END_MARKER: &str = "<END>";

/// What the monkey knows about the student's situation when it speaks.
#[derive(Debug, Clone, PartialEq)]
pub struct PanicContext {
    pub panic_score: u8,
    pub urgent_name: String,
}

impl PanicContext {
    pub fn from_assignments(assignments: &[Assignment], now: DateTime<Utc>) -> Self {
        Self {
            panic_score: scoring::aggregate_panic_score(assignments, now),
            urgent_name: scoring::most_urgent(assignments, now)
                .map(|a| a.name.clone())
                .unwrap_or_else(|| "No urgent assignments".to_string()),
        }
    }
}

pub fn build_vent_prompt(context: &PanicContext, user_message: &str) -> String {
    format!(
        r#"CONTEXT:
- Panic Score: {score}%
- Most urgent assignment: "{urgent}"

USER MESSAGE: "{message}"

STYLE:
You are an unhinged academic monkey auditor.
You exaggerate everything.
You speak like the world is ending academically.
Use phrases like:
- "you are COOKED"
- "academic obituary"
- "GPA filing for divorce"
- "banana brain crisis"
- "emotional damage in 5 minutes"

Make it dramatic, theatrical, and savage.
DO NOT suggest self-harm.
Respond in 2-3 chaotic sentences.
End with a new line containing exactly: {END_MARKER}
"#,
        score = context.panic_score,
        urgent = context.urgent_name,
        message = user_message,
    )
}

pub fn build_difficulty_prompt(assignment: &Assignment, now: DateTime<Utc>) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "Rate how hard this university assignment is on a scale from 1 to 10."
    );
    let _ = writeln!(
        prompt,
        "Assignment: \"{}\" ({}), worth {}% of the grade, {}.",
        assignment.name,
        assignment.course,
        assignment.weight,
        scoring::format_remaining(assignment.due_date, now),
    );
    let _ = writeln!(
        prompt,
        "Description: {}",
        assignment.description.as_deref().unwrap_or("none given")
    );
    let _ = writeln!(
        prompt,
        r#"Reply with only a JSON object like {{"score": 7, "reason": "one short sentence"}}."#
    );
    prompt
}

fn strip_end_marker(reply: &str) -> String {
    reply.replace(END_MARKER, "").trim().to_string()
}

#[derive(Deserialize)]
struct ModelRating {
    score: f64,
    reason: Option<String>,
}

/// Pulls `{"score": n, "reason": "..."}` out of a free-text reply.
pub fn parse_model_rating(reply: &str) -> Result<(u8, Option<String>), PanicError> {
    let start = reply.find('{').ok_or_else(|| {
        PanicError::UpstreamUnavailable("rating reply carried no JSON object".to_string())
    })?;

    // Only the first object counts; anything after it is ignored.
    let rating: ModelRating = serde_json::Deserializer::from_str(&reply[start..])
        .into_iter::<ModelRating>()
        .next()
        .ok_or_else(|| PanicError::UpstreamUnavailable("empty rating reply".to_string()))?
        .map_err(|err| PanicError::UpstreamUnavailable(format!("unreadable rating: {err}")))?;
    if !rating.score.is_finite() {
        return Err(PanicError::UpstreamUnavailable(
            "rating score is not a number".to_string(),
        ));
    }

    let score = rating.score.round().clamp(1.0, 10.0) as u8;
    let reason = rating
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    Ok((score, reason))
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One user's conversation with the monkey. At most one request is outstanding at a time.
pub struct VentSession<G> {
    generator: Option<G>,
    params: GenerationParams,
    in_flight: AtomicBool,
    credential_notice_shown: AtomicBool,
}

impl<G: TextGenerator> VentSession<G> {
    /// `None` means no credential was available to build the generator.
    pub fn new(generator: Option<G>) -> Self {
        Self {
            generator,
            params: GenerationParams::default(),
            in_flight: AtomicBool::new(false),
            credential_notice_shown: AtomicBool::new(false),
        }
    }

    fn begin(&self) -> Result<InFlightGuard<'_>, PanicError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| PanicError::RequestInFlight)?;
        Ok(InFlightGuard(&self.in_flight))
    }

    async fn ask(&self, prompt: &str) -> Result<String, PanicError> {
        match &self.generator {
            Some(generator) => generator.generate(prompt, self.params).await,
            None => Err(PanicError::NoCredential),
        }
    }

    /// Returns a notice for a missing credential the first time it is hit, then stays quiet.
    fn notice_for(&self, err: &PanicError) -> Option<String> {
        match err {
            PanicError::NoCredential if !self.credential_notice_shown.swap(true, Ordering::AcqRel) => {
                Some(err.to_string())
            }
            _ => None,
        }
    }

    pub async fn vent<R: Rng + ?Sized>(
        &self,
        context: &PanicContext,
        input: &str,
        rng: &mut R,
    ) -> Result<VentReply, PanicError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(VentReply {
                text: messages::EMPTY_VENT_MESSAGE.to_string(),
                source: ReplySource::Prompt,
                notice: None,
            });
        }

        let _guard = self.begin()?;
        let prompt = build_vent_prompt(context, input);

        match self.ask(&prompt).await {
            Ok(reply) => {
                let text = strip_end_marker(&reply);
                Ok(VentReply {
                    text: if text.is_empty() { EMPTY_REPLY.to_string() } else { text },
                    source: ReplySource::Model,
                    notice: None,
                })
            }
            Err(err) => {
                warn!(error = %err, "vent fell back to local reply");
                Ok(VentReply {
                    text: messages::pick_vent_fallback(rng).to_string(),
                    source: ReplySource::Fallback,
                    notice: self.notice_for(&err),
                })
            }
        }
    }

    /// Rates the most urgent assignment that is not yet overdue.
    pub async fn rate_difficulty<R: Rng + ?Sized>(
        &self,
        assignments: &[Assignment],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Option<DifficultyRating>, PanicError> {
        let Some(target) = scoring::most_urgent_upcoming(assignments, now) else {
            return Ok(None);
        };

        let _guard = self.begin()?;
        let prompt = build_difficulty_prompt(target, now);

        let (score, reason, source) = match self
            .ask(&prompt)
            .await
            .and_then(|reply| parse_model_rating(&reply))
        {
            Ok((score, reason)) => (score, reason, RatingSource::Model),
            Err(err) => {
                warn!(error = %err, assignment = %target.name, "using local difficulty rating");
                (
                    messages::local_difficulty_fallback(target, now),
                    None,
                    RatingSource::Local,
                )
            }
        };

        let tier = messages::difficulty_tier(score);
        Ok(Some(DifficultyRating {
            assignment_id: target.id,
            assignment_name: target.name.clone(),
            score,
            tier,
            label: messages::difficulty_label(score).to_string(),
            roast: messages::difficulty_roast(target, score, reason.as_deref(), rng),
            reason,
            source,
        }))
    }
}
