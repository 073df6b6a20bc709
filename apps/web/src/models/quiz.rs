use serde::{Deserialize, Serialize};

/// A quiz question as the web tier holds it.
///
/// The API payload also carries `correct_answer`. It is intentionally not
/// modelled here: serde drops it on the way in, so the answer key is never
/// stored in a session or echoed back to the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub questions: Vec<QuizQuestion>,
}

/// Body of `POST /api/quiz/content/{id}/submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSubmission {
    pub answers: Vec<usize>,
    pub quiz_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
    Passed,
    Retry,
}

/// Paragraph highlights arrive either as bare indices or as `{paragraphIndex}` objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParagraphHighlight {
    Index(u32),
    Object {
        #[serde(rename = "paragraphIndex")]
        paragraph_index: u32,
    },
}

impl ParagraphHighlight {
    pub fn paragraph_index(&self) -> u32 {
        match self {
            ParagraphHighlight::Index(i) => *i,
            ParagraphHighlight::Object { paragraph_index } => *paragraph_index,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewHints {
    #[serde(default)]
    pub timestamps: Vec<String>,
    #[serde(default, rename = "articleHighlights", alias = "article_highlights")]
    pub article_highlights: Vec<ParagraphHighlight>,
    #[serde(default)]
    pub concepts: Vec<String>,
}

impl ReviewHints {
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty() && self.article_highlights.is_empty() && self.concepts.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSubmitResult {
    pub status: QuizStatus,
    #[serde(default)]
    pub correct_count: u32,
    #[serde(default)]
    pub wrong_count: u32,
    #[serde(default)]
    pub review_hints: Option<ReviewHints>,
    #[serde(default)]
    pub next_quiz_id: Option<String>,
    #[serde(default)]
    pub tech_score_change: Option<f64>,
    #[serde(default)]
    pub tech_score: Option<f64>,
    #[serde(default)]
    pub current_streak: Option<u32>,
    #[serde(default)]
    pub longest_streak: Option<u32>,
}

impl QuizSubmitResult {
    pub fn passed(&self) -> bool {
        self.status == QuizStatus::Passed
    }
}
