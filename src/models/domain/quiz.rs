use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Quiz catalog entry. Content is owned by the CMS; this subsystem only reads
/// it to grade submissions.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub category: String,
    pub questions: Vec<QuizQuestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizQuestion {
    pub id: String,
    pub prompt: String,
    pub options: Vec<QuizOption>,
    pub order: i16,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizOption {
    pub id: String,
    pub text: String,
    pub correct: bool,
}

impl QuizQuestion {
    /// The authoritative correct option for this question, if one is defined.
    pub fn correct_option_id(&self) -> Option<&str> {
        self.options
            .iter()
            .find(|opt| opt.correct)
            .map(|opt| opt.id.as_str())
    }

    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|opt| opt.id == option_id)
    }
}
