use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{Assignment, DifficultyTier, ThreatLevel};
use crate::scoring;

pub const PROCESSING_PLACEHOLDER: &str = "Monkahh is processing your chaos...";

pub const NO_UNSUBMITTED_MESSAGE: &str =
    "Monkey sees no unsubmitted assignments. Monkey is suspicious. Did you drop out?";

pub const EMPTY_VENT_MESSAGE: &str = "Monkey needs you to actually type something first. 🐒";

const SUBMITTED_POOL: [&str; 6] = [
    "Monkahh sees you submitted. Monkahh is shook. Valid behavior, no cap.",
    "Submitted?? On time?? Monkahh is filing this under unexplained phenomena.",
    "Look at you, handing things in. Monkahh sheds one proud banana tear.",
    "Done and dusted. Monkahh will stop screaming about this one. For now.",
    "Turned in. Your GPA sends its regards and a small fruit basket.",
    "Monkahh checked twice. It really is submitted. Character development.",
];

const CHILL_POOL: [&str; 6] = [
    "You got time. Don't waste it, that's mid behavior. Monkahh is watching.",
    "Plenty of runway. Monkahh knows that is exactly how it starts.",
    "Chill for now. Future you is already drafting a complaint.",
    "Days left. Monkahh suggests starting while it is still a choice.",
    "The deadline is far away. So was every deadline you have ever missed.",
    "Relax, but like, productively. Monkahh is side-eyeing the couch.",
];

const NERVOUS_POOL: [&str; 6] = [
    "Monkahh is concerned no cap. Maybe start... thinking about starting?",
    "A few days left. Monkahh can hear the clock. Can you?",
    "This is the part where you open the document. Just open it.",
    "Monkahh is pacing. Monkahh does not pace for fun.",
    "Nervous energy detected. Please convert it into actual words.",
    "The deadline is getting closer and it has not blinked once.",
];

const PANIC_POOL: [&str; 6] = [
    "OOH OOH AH AH. Monkahh PANICKING ON YOUR BEHALF. YOU ARE COOKED.",
    "Under a day left. Monkahh has cancelled all banana breaks.",
    "This is not a drill. Monkahh repeats: THIS IS NOT A DRILL.",
    "Your GPA just texted Monkahh asking if you are okay. You are not.",
    "Tomorrow's problem is today's problem now. Move.",
    "Monkahh is hyperventilating into a paper bag. Start typing.",
];

const DOOMED_POOL: [&str; 6] = [
    "Less than 6 hours?! Monkahh is screaming into the void. Touch grass later, study NOW.",
    "Hours. You have HOURS. Monkahh is writing your academic obituary as we speak.",
    "Emotional damage incoming in real time. Close every other tab.",
    "Monkahh has seen this movie. It does not end well unless you start NOW.",
    "Your GPA is filing for divorce. There is still time to contest it.",
    "Banana brain crisis level: critical. Caffeinate and commit.",
];

const DEAD_POOL: [&str; 6] = [
    "OVERDUE. Your GPA is gone. Monkahh is at your funeral. It's giving tragedy.",
    "It is past due. Monkahh has lowered the flag to half mast.",
    "Deadline: deceased. Cause of death: vibes. Email your professor.",
    "Monkahh brought flowers. They are for your grade.",
    "Overdue and unbothered? Monkahh is bothered enough for both of you.",
    "Late submission is still a submission. Go beg for mercy. Politely.",
];

const VENT_POOL: [&str; 7] = [
    "Wow. Incredible strategy. MonkeyRanger is speechless. Have you tried... starting?",
    "MonkeyRanger hears you. MonkeyRanger also hears the deadline laughing at you. Both are loud.",
    "That is genuinely the most student thing MonkeyRanger has ever heard. Close Reddit. NOW.",
    "MonkeyRanger processes your excuse. MonkeyRanger rejects your excuse. Open the document.",
    "You know what's funny? Your due date. You know what's not funny? Your due date.",
    "MonkeyRanger has forwarded your concern to your GPA. Your GPA is crying.",
    "Bold strategy. Let's see if it pays off. (It won't. Open your laptop.)",
];

const EASY_ROASTS: [&str; 3] = [
    "\"{name}\" is Banana Easy. Monkahh could do it with one paw and no thumbs.",
    "\"{name}\"? That's a warm-up. If this one gets you, Monkahh is worried.",
    "Monkahh rates \"{name}\" as snack-sized. Eat it before it goes bad.",
];

const MEDIUM_ROASTS: [&str; 3] = [
    "\"{name}\" is Manageable Chaos. Doable, if you stop doom-scrolling.",
    "\"{name}\" needs a real sit-down. Not a vibe check, an actual sit-down.",
    "Monkahh sees \"{name}\" as mid difficulty with main-character deadline energy.",
];

const HARD_ROASTS: [&str; 3] = [
    "\"{name}\" has Cooked Potential. Monkahh is preheating the oven.",
    "\"{name}\" is heavy. Plan it in chunks or it will flatten you.",
    "Monkahh ran the numbers on \"{name}\". The numbers ran away.",
];

const NIGHTMARE_ROASTS: [&str; 3] = [
    "\"{name}\" is an Academic Boss Fight. Monkahh recommends full armor and snacks.",
    "\"{name}\" has phases. Like a raid boss. Start yesterday.",
    "Monkahh looked at \"{name}\" and had to lie down. Your turn to stand up.",
];

pub fn fallback_pool(level: ThreatLevel) -> &'static [&'static str] {
    match level {
        ThreatLevel::Submitted => &SUBMITTED_POOL,
        ThreatLevel::Chill => &CHILL_POOL,
        ThreatLevel::Nervous => &NERVOUS_POOL,
        ThreatLevel::Panic => &PANIC_POOL,
        ThreatLevel::Doomed => &DOOMED_POOL,
        ThreatLevel::Dead => &DEAD_POOL,
    }
}

pub fn vent_pool() -> &'static [&'static str] {
    &VENT_POOL
}

fn roast_pool(tier: DifficultyTier) -> &'static [&'static str] {
    match tier {
        DifficultyTier::Easy => &EASY_ROASTS,
        DifficultyTier::Medium => &MEDIUM_ROASTS,
        DifficultyTier::Hard => &HARD_ROASTS,
        DifficultyTier::Nightmare => &NIGHTMARE_ROASTS,
    }
}

fn pick<R: Rng + ?Sized>(pool: &'static [&'static str], rng: &mut R) -> &'static str {
    pool.choose(rng).copied().unwrap_or(PROCESSING_PLACEHOLDER)
}

/// Uniform pick from the level's pool.
pub fn pick_fallback_message<R: Rng + ?Sized>(level: ThreatLevel, rng: &mut R) -> &'static str {
    pick(fallback_pool(level), rng)
}

pub fn fallback_message_for_key<R: Rng + ?Sized>(key: &str, rng: &mut R) -> &'static str {
    match ThreatLevel::from_key(key) {
        Some(level) => pick_fallback_message(level, rng),
        None => PROCESSING_PLACEHOLDER,
    }
}

pub fn pick_vent_fallback<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    pick(vent_pool(), rng)
}

/// Deterministic 1-10 rating used when no model rating is available.
pub fn local_difficulty(weight: f64, panic_score: u8) -> u8 {
    let base = (weight / 5.0).ceil();
    let lift = (f64::from(panic_score) / 20.0).round();
    (base + lift).clamp(1.0, 10.0) as u8
}

pub fn local_difficulty_fallback(assignment: &Assignment, now: DateTime<Utc>) -> u8 {
    local_difficulty(assignment.weight, scoring::classify(assignment, now).panic_score())
}

pub fn difficulty_tier(score: u8) -> DifficultyTier {
    match score {
        0..=3 => DifficultyTier::Easy,
        4..=6 => DifficultyTier::Medium,
        7..=8 => DifficultyTier::Hard,
        _ => DifficultyTier::Nightmare,
    }
}

pub fn difficulty_label(score: u8) -> &'static str {
    difficulty_tier(score).label()
}

/// Picks a roast for the score's band, appending `reason` verbatim when present.
pub fn difficulty_roast<R: Rng + ?Sized>(
    assignment: &Assignment,
    score: u8,
    reason: Option<&str>,
    rng: &mut R,
) -> String {
    let template = pick(roast_pool(difficulty_tier(score)), rng);
    let mut roast = template.replace("{name}", &assignment.name);

    if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
        roast.push(' ');
        roast.push_str(reason);
    }

    roast
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 10, 9, 0, 0).unwrap()
    }

    fn assignment(weight: f64) -> Assignment {
        Assignment {
            id: 3,
            name: "CS Project Phase 1".to_string(),
            course: "CS 301".to_string(),
            description: None,
            due_date: now() + Duration::hours(72),
            submitted: false,
            weight,
        }
    }

    #[test]
    fn every_level_has_a_non_empty_message() {
        let mut rng = Mcg128Xsl64::seed_from_u64(1);
        for level in ThreatLevel::ALL {
            for _ in 0..20 {
                let message = pick_fallback_message(level, &mut rng);
                assert!(!message.is_empty());
                assert!(fallback_pool(level).contains(&message));
            }
        }
    }

    #[test]
    fn unknown_key_returns_placeholder() {
        let mut rng = Mcg128Xsl64::seed_from_u64(2);
        assert_eq!(fallback_message_for_key("vibing", &mut rng), PROCESSING_PLACEHOLDER);
        assert!(DOOMED_POOL.contains(&fallback_message_for_key("doomed", &mut rng)));
    }

    #[test]
    fn every_candidate_is_reachable() {
        let mut rng = Mcg128Xsl64::seed_from_u64(3);
        for level in ThreatLevel::ALL {
            let seen: HashSet<&str> = (0..600)
                .map(|_| pick_fallback_message(level, &mut rng))
                .collect();
            assert_eq!(seen.len(), fallback_pool(level).len(), "level {level:?}");
        }

        let seen: HashSet<&str> = (0..700).map(|_| pick_vent_fallback(&mut rng)).collect();
        assert_eq!(seen.len(), VENT_POOL.len());
    }

    #[test]
    fn selection_is_roughly_uniform() {
        let mut rng = Mcg128Xsl64::seed_from_u64(4);
        let draws = 6000;
        let mut counts = [0usize; 6];
        for _ in 0..draws {
            let message = pick_fallback_message(ThreatLevel::Panic, &mut rng);
            let index = PANIC_POOL.iter().position(|m| *m == message).unwrap();
            counts[index] += 1;
        }
        for count in counts {
            assert!((700..=1300).contains(&count), "counts {counts:?}");
        }
    }

    #[test]
    fn same_seed_same_pick() {
        let mut a = Mcg128Xsl64::seed_from_u64(99);
        let mut b = Mcg128Xsl64::seed_from_u64(99);
        assert_eq!(pick_vent_fallback(&mut a), pick_vent_fallback(&mut b));
    }

    #[test]
    fn local_difficulty_matches_formula() {
        // ceil(30/5)=6, round(40/20)=2
        assert_eq!(local_difficulty(30.0, 40), 8);
        // ceil(10/5)=2, round(90/20)=5 (4.5 rounds up)
        assert_eq!(local_difficulty(10.0, 90), 7);
        assert_eq!(local_difficulty(0.0, 0), 1);
        assert_eq!(local_difficulty(100.0, 100), 10);
        assert_eq!(local_difficulty(1e20, 90), 10);
        assert_eq!(local_difficulty(f64::MAX, 0), 10);
        // nervous at +72h: ceil(25/5)=5, round(40/20)=2
        assert_eq!(local_difficulty_fallback(&assignment(25.0), now()), 7);
    }

    #[test]
    fn local_difficulty_is_monotonic_and_bounded() {
        let panic_scores: Vec<u8> = ThreatLevel::ALL.iter().map(|l| l.panic_score()).collect();
        let mut weights: Vec<f64> = (0..=40).map(|w| f64::from(w) * 2.5).collect();
        weights.extend([150.0, 1e6, 1e20, f64::MAX]);

        for &score in &panic_scores {
            let mut previous = 0;
            for &weight in &weights {
                let rating = local_difficulty(weight, score);
                assert!((1..=10).contains(&rating));
                assert!(rating >= previous, "weight {weight} score {score}");
                previous = rating;
            }
        }

        for &weight in &weights {
            let mut previous = 0;
            for &score in &panic_scores {
                let rating = local_difficulty(weight, score);
                assert!(rating >= previous, "weight {weight} score {score}");
                previous = rating;
            }
        }
    }

    #[test]
    fn tiers_cover_the_scale() {
        let tiers: Vec<&str> = (1..=10).map(|s| difficulty_tier(s).key()).collect();
        assert_eq!(
            tiers,
            vec![
                "easy", "easy", "easy", "medium", "medium", "medium", "hard", "hard",
                "nightmare", "nightmare"
            ]
        );
        assert_eq!(difficulty_label(5), "Manageable Chaos");
        assert_eq!(difficulty_label(10), "Academic Boss Fight");
    }

    #[test]
    fn roast_names_the_assignment_and_appends_reason() {
        let mut rng = Mcg128Xsl64::seed_from_u64(5);
        let target = assignment(30.0);

        let roast = difficulty_roast(&target, 8, Some("Three moving parts due at once."), &mut rng);
        assert!(roast.contains("CS Project Phase 1"));
        assert!(roast.ends_with(" Three moving parts due at once."));

        let bare = difficulty_roast(&target, 2, Some("   "), &mut rng);
        assert!(!bare.ends_with(' '));
        assert!(EASY_ROASTS
            .iter()
            .any(|t| t.replace("{name}", &target.name) == bare));
    }
}
