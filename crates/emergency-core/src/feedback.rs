//! Post-incident feedback

use crate::incident::{now_seconds, timestamp_format};
use crate::{EmergencyError, Terminal};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Substituted when the user leaves the comment blank
pub const NO_COMMENTS: &str = "No comments";

/// Highest satisfaction score
pub const MAX_RATING: u8 = 5;

/// Satisfaction rating. Stored as an integer, or `null` when skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Option<u8>", into = "Option<u8>")]
pub enum Rating {
    Score(u8),
    Skipped,
}

impl Rating {
    /// Parse an answer: blank skips, otherwise an integer in 1..=5
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Some(Rating::Skipped);
        }
        match input.parse::<u8>() {
            Ok(score) if (1..=MAX_RATING).contains(&score) => Some(Rating::Score(score)),
            _ => None,
        }
    }
}

impl TryFrom<Option<u8>> for Rating {
    type Error = String;

    fn try_from(value: Option<u8>) -> Result<Self, Self::Error> {
        match value {
            None => Ok(Rating::Skipped),
            Some(score) if (1..=MAX_RATING).contains(&score) => Ok(Rating::Score(score)),
            Some(score) => Err(format!("rating {} outside 1..={}", score, MAX_RATING)),
        }
    }
}

impl From<Rating> for Option<u8> {
    fn from(rating: Rating) -> Self {
        match rating {
            Rating::Score(score) => Some(score),
            Rating::Skipped => None,
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Score(score) => write!(f, "{}/{}", score, MAX_RATING),
            Rating::Skipped => f.write_str("skipped"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    emergency_id: String,
    satisfaction_rating: Rating,
    comments: String,
    #[serde(with = "timestamp_format")]
    feedback_time: NaiveDateTime,
}

impl FeedbackRecord {
    pub fn new(emergency_id: impl Into<String>, rating: Rating, comments: &str) -> Self {
        let comments = comments.trim();
        Self {
            emergency_id: emergency_id.into(),
            satisfaction_rating: rating,
            comments: if comments.is_empty() {
                NO_COMMENTS.to_string()
            } else {
                comments.to_string()
            },
            feedback_time: now_seconds(),
        }
    }

    pub fn emergency_id(&self) -> &str {
        &self.emergency_id
    }

    pub fn rating(&self) -> Rating {
        self.satisfaction_rating
    }

    pub fn comments(&self) -> &str {
        &self.comments
    }

    pub fn feedback_time(&self) -> NaiveDateTime {
        self.feedback_time
    }
}

impl fmt::Display for FeedbackRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Feedback for {} [rating: {}, comments: \"{}\", at {}]",
            self.emergency_id,
            self.satisfaction_rating,
            self.comments,
            self.feedback_time.format(crate::DISPLAY_TIME_FORMAT)
        )
    }
}

/// Ask for a rating (re-prompting on invalid input) and a comment
pub fn prompt_feedback(
    term: &mut dyn Terminal,
    emergency_id: &str,
) -> Result<FeedbackRecord, EmergencyError> {
    term.println("\n--- Feedback ---");
    let rating = loop {
        let answer = term.prompt(&format!(
            "How was your experience? (1-{}, {} is excellent; Enter to skip): ",
            MAX_RATING, MAX_RATING
        ))?;
        match Rating::parse(&answer) {
            Some(rating) => break rating,
            None => term.println(&format!(
                "⚠️  Please enter a value between 1 and {}.",
                MAX_RATING
            )),
        }
    };
    let comments = term.prompt("Any additional comments? ")?;
    Ok(FeedbackRecord::new(emergency_id, rating, &comments))
}
