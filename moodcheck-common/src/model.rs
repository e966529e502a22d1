//! Emotion data model
//!
//! One `EmotionRecord` per student check-in. Records are written exactly once
//! by the submission pipeline and never updated or deleted.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Fixed emotion scale, most favorable first.
///
/// The dashboard always reports groups in this order regardless of counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Emotion {
    VeryGood,
    Good,
    Neutral,
    Bad,
    VeryBad,
}

impl Emotion {
    /// All emotions in display order
    pub const ALL: [Emotion; 5] = [
        Emotion::VeryGood,
        Emotion::Good,
        Emotion::Neutral,
        Emotion::Bad,
        Emotion::VeryBad,
    ];

    /// Persisted label (Korean, as entered by the original classroom tool)
    pub fn label(&self) -> &'static str {
        match self {
            Emotion::VeryGood => "매우 좋음",
            Emotion::Good => "좋음",
            Emotion::Neutral => "보통",
            Emotion::Bad => "안 좋음",
            Emotion::VeryBad => "매우 안 좋음",
        }
    }

    /// Display icon
    pub fn icon(&self) -> &'static str {
        match self {
            Emotion::VeryGood => "😊",
            Emotion::Good => "🙂",
            Emotion::Neutral => "😐",
            Emotion::Bad => "😔",
            Emotion::VeryBad => "😢",
        }
    }

    /// Icon + label as shown on the check-in form ("😊 매우 좋음")
    pub fn display(&self) -> String {
        format!("{} {}", self.icon(), self.label())
    }

    /// Fixed chart color for this emotion's dashboard group
    pub fn color(&self) -> &'static str {
        match self {
            Emotion::VeryGood => "#2ecc71",
            Emotion::Good => "#82e0aa",
            Emotion::Neutral => "#f4d03f",
            Emotion::Bad => "#e67e22",
            Emotion::VeryBad => "#e74c3c",
        }
    }

    /// Fallback color for labels that match no known emotion
    pub const DEFAULT_COLOR: &'static str = "#95a5a6";

    /// True for the two most favorable categories (positive-ratio numerator)
    pub fn is_positive(&self) -> bool {
        matches!(self, Emotion::VeryGood | Emotion::Good)
    }

    /// Parse a persisted label back into an emotion
    pub fn from_label(label: &str) -> Option<Emotion> {
        Emotion::ALL.iter().copied().find(|e| e.label() == label)
    }
}

impl From<Emotion> for String {
    fn from(e: Emotion) -> String {
        e.label().to_string()
    }
}

impl TryFrom<String> for Emotion {
    type Error = Error;

    fn try_from(s: String) -> Result<Emotion> {
        Emotion::from_label(&s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown emotion label: {}", s)))
    }
}

/// One persisted student check-in
///
/// `emotion` holds the raw persisted label. The writer only ever produces the
/// five known labels, but readers tolerate anything the store returns; the
/// dashboard assigns unrecognized labels a default color instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionRecord {
    /// Store-generated document id
    pub id: String,
    pub student_name: String,
    /// Persisted emotion label
    pub emotion: String,
    /// Icon + label string as shown at submission time
    pub emotion_icon: String,
    /// Public URL of the stored drawing
    pub drawing_url: String,
    /// Storage-internal object name ("drawings/{name}_{timestamp}.jpg")
    pub drawing_path: String,
    /// Submission date, "%Y-%m-%d"
    pub date: String,
    /// Submission time, "%H:%M:%S"
    pub time: String,
    pub created_at: DateTime<Utc>,
}

impl EmotionRecord {
    /// The known emotion behind the persisted label, if any
    pub fn known_emotion(&self) -> Option<Emotion> {
        Emotion::from_label(&self.emotion)
    }
}

/// A record about to be appended; the store assigns the id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmotionRecord {
    pub student_name: String,
    pub emotion: Emotion,
    pub emotion_icon: String,
    pub drawing_url: String,
    pub drawing_path: String,
    pub date: String,
    pub time: String,
    pub created_at: DateTime<Utc>,
}

impl NewEmotionRecord {
    /// Build a record from one shared submission timestamp.
    ///
    /// `date`, `time`, and `created_at` all derive from the same instant so a
    /// single record is internally consistent.
    pub fn new(
        student_name: String,
        emotion: Emotion,
        drawing_url: String,
        drawing_path: String,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            student_name,
            emotion,
            emotion_icon: emotion.display(),
            drawing_url,
            drawing_path,
            date: timestamp.format("%Y-%m-%d").to_string(),
            time: timestamp.format("%H:%M:%S").to_string(),
            created_at: timestamp.with_timezone(&Utc),
        }
    }

    /// Attach the store-generated id
    pub fn into_record(self, id: String) -> EmotionRecord {
        EmotionRecord {
            id,
            student_name: self.student_name,
            emotion: self.emotion.label().to_string(),
            emotion_icon: self.emotion_icon,
            drawing_url: self.drawing_url,
            drawing_path: self.drawing_path,
            date: self.date,
            time: self.time,
            created_at: self.created_at,
        }
    }
}

/// Storage object name for a drawing: `drawings/{name}_{YYYYmmdd_HHMMSS}.jpg`
///
/// Second-granularity names can collide when the same student submits twice
/// within one second; the original tool accepted that risk and so does this one.
pub fn artifact_name(student_name: &str, timestamp: DateTime<Local>) -> String {
    format!(
        "drawings/{}_{}.jpg",
        student_name,
        timestamp.format("%Y%m%d_%H%M%S")
    )
}
