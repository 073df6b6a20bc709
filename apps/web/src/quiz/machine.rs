//! Quiz attempt state machine.
//!
//! ```text
//! Loading ──fetch ok──▶ Answering ──begin_submit──▶ Submitting ──ok──▶ Result
//!    │                      ▲                           │                 │
//!    │ fetch failed         └────── submit failed ──────┘                 │
//!    ▼                                                                     │
//! Unavailable           Loading (retry flag) ◀──────────── retry ─────────┘
//! ```
//!
//! Pure and synchronous: the session layer performs the network calls and
//! feeds their outcomes back in. Every transition checks the current phase, so
//! a second submit while one is in flight is rejected rather than queued.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::models::{Quiz, QuizQuestion, QuizStatus, QuizSubmission, QuizSubmitResult};
use crate::pages::notice::Notice;

/// Wire value for a question without a selected option.
pub const UNSET: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loading,
    Answering,
    Submitting,
    Result,
    /// Terminal: the quiz could not be fetched at all.
    Unavailable,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Loading => "loading",
            Phase::Answering => "answering",
            Phase::Submitting => "submitting",
            Phase::Result => "showing results",
            Phase::Unavailable => "unavailable",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    Original,
    Retry { quiz_id: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("quiz is {actual}, expected it to be {expected}")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("a submission is already in flight")]
    SubmissionInFlight,

    #[error("{} question(s) still unanswered", .unanswered.len())]
    Incomplete { unanswered: Vec<usize> },

    #[error("question {question} does not exist (quiz has {count})")]
    QuestionOutOfRange { question: usize, count: usize },

    #[error("option {option} does not exist for question {question} ({count} options)")]
    OptionOutOfRange {
        question: usize,
        option: usize,
        count: usize,
    },

    #[error("quiz already passed")]
    AlreadyPassed,

    #[error("quiz session closed")]
    Closed,
}

#[derive(Debug, Clone)]
pub struct QuizAttempt {
    content_id: String,
    phase: Phase,
    retry_requested: bool,
    quiz: Option<Quiz>,
    answers: Vec<Option<usize>>,
    /// Quiz id the next submission (or retry fetch) targets when resuming a retry chain.
    chained_quiz_id: Option<String>,
    result: Option<QuizSubmitResult>,
    notice: Option<Notice>,
}

impl QuizAttempt {
    pub fn new(content_id: impl Into<String>, retry: bool) -> Self {
        Self {
            content_id: content_id.into(),
            phase: Phase::Loading,
            retry_requested: retry,
            quiz: None,
            answers: Vec::new(),
            chained_quiz_id: None,
            result: None,
            notice: None,
        }
    }

    pub fn content_id(&self) -> &str {
        &self.content_id
    }

    pub fn load_request(&self) -> Result<LoadRequest, QuizError> {
        self.expect(Phase::Loading)?;
        if self.retry_requested {
            Ok(LoadRequest::Retry {
                quiz_id: self.chained_quiz_id.clone(),
            })
        } else {
            Ok(LoadRequest::Original)
        }
    }

    pub fn quiz_loaded(&mut self, request: &LoadRequest, quiz: Quiz) -> Result<(), QuizError> {
        self.expect(Phase::Loading)?;

        if quiz.questions.is_empty() {
            self.phase = Phase::Unavailable;
            self.notice = Some(Notice::warning("This quiz has no questions yet."));
            return Ok(());
        }

        self.chained_quiz_id = match request {
            LoadRequest::Retry { .. } => Some(quiz.id.clone()),
            LoadRequest::Original => None,
        };
        self.answers = vec![None; quiz.questions.len()];
        self.quiz = Some(quiz);
        self.phase = Phase::Answering;
        Ok(())
    }

    /// Records a failed fetch. Returns the fallback request to issue, if any:
    /// a missing retry quiz falls back to the original one.
    pub fn load_failed(&mut self, request: &LoadRequest) -> Result<Option<LoadRequest>, QuizError> {
        self.expect(Phase::Loading)?;
        match request {
            LoadRequest::Retry { .. } => {
                self.retry_requested = false;
                self.chained_quiz_id = None;
                self.notice = Some(Notice::warning(
                    "Retry quiz not available. Loading the original quiz instead.",
                ));
                Ok(Some(LoadRequest::Original))
            }
            LoadRequest::Original => {
                self.phase = Phase::Unavailable;
                self.notice = Some(Notice::warning("Unable to load quiz at this time."));
                Ok(None)
            }
        }
    }

    pub fn select(&mut self, question: usize, option: usize) -> Result<(), QuizError> {
        self.expect_answering()?;

        let questions = self.questions();
        let count = questions.len();
        let Some(q) = questions.get(question) else {
            return Err(QuizError::QuestionOutOfRange { question, count });
        };
        if option >= q.options.len() {
            return Err(QuizError::OptionOutOfRange {
                question,
                option,
                count: q.options.len(),
            });
        }

        self.answers[question] = Some(option);
        Ok(())
    }

    /// Moves to Submitting and returns the payload to send. Nothing is sent
    /// while any question is unanswered.
    pub fn begin_submit(&mut self) -> Result<QuizSubmission, QuizError> {
        self.expect_answering()?;

        let unanswered = self.unanswered();
        if !unanswered.is_empty() {
            return Err(QuizError::Incomplete { unanswered });
        }

        let quiz_id = self.target_quiz_id().ok_or(QuizError::WrongPhase {
            expected: Phase::Answering,
            actual: Phase::Loading,
        })?;

        let submission = QuizSubmission {
            answers: self.answers.iter().flatten().copied().collect(),
            quiz_id,
        };
        self.phase = Phase::Submitting;
        self.notice = None;
        Ok(submission)
    }

    pub fn submit_succeeded(&mut self, result: QuizSubmitResult) -> Result<(), QuizError> {
        self.expect(Phase::Submitting)?;
        if let Some(next) = &result.next_quiz_id {
            self.chained_quiz_id = Some(next.clone());
        }
        self.result = Some(result);
        self.phase = Phase::Result;
        Ok(())
    }

    /// A failed submission goes back to Answering with the selections intact.
    pub fn submit_failed(&mut self) -> Result<(), QuizError> {
        self.expect(Phase::Submitting)?;
        self.phase = Phase::Answering;
        self.notice = Some(Notice::warning(
            "Error submitting quiz. Your answers are saved, please try again.",
        ));
        Ok(())
    }

    /// Resets the answers and re-enters Loading with the retry flag set.
    pub fn retry(&mut self) -> Result<(), QuizError> {
        self.expect(Phase::Result)?;
        if self.result.as_ref().is_some_and(QuizSubmitResult::passed) {
            return Err(QuizError::AlreadyPassed);
        }
        self.quiz = None;
        self.answers.clear();
        self.result = None;
        self.notice = None;
        self.retry_requested = true;
        self.phase = Phase::Loading;
        Ok(())
    }

    pub fn view(&self) -> QuizView {
        let reveal = self.phase == Phase::Result;
        let questions = self
            .questions()
            .iter()
            .zip(self.answers.iter())
            .enumerate()
            .map(|(i, (q, answer))| QuestionView::new(i, q, *answer, reveal))
            .collect();

        QuizView {
            content_id: self.content_id.clone(),
            phase: self.phase,
            quiz_id: self.target_quiz_id(),
            questions,
            can_submit: self.phase == Phase::Answering && self.unanswered().is_empty(),
            result: self
                .result
                .as_ref()
                .map(|r| ResultView::new(r, self.questions().len())),
            notice: self.notice.clone(),
        }
    }

    fn questions(&self) -> &[QuizQuestion] {
        self.quiz.as_ref().map(|q| q.questions.as_slice()).unwrap_or(&[])
    }

    fn unanswered(&self) -> Vec<usize> {
        self.answers
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    fn target_quiz_id(&self) -> Option<String> {
        self.chained_quiz_id
            .clone()
            .or_else(|| self.quiz.as_ref().map(|q| q.id.clone()))
    }

    fn expect(&self, expected: Phase) -> Result<(), QuizError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(QuizError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    fn expect_answering(&self) -> Result<(), QuizError> {
        match self.phase {
            Phase::Answering => Ok(()),
            Phase::Submitting => Err(QuizError::SubmissionInFlight),
            actual => Err(QuizError::WrongPhase {
                expected: Phase::Answering,
                actual,
            }),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// View-model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct QuizView {
    pub content_id: String,
    pub phase: Phase,
    pub quiz_id: Option<String>,
    pub questions: Vec<QuestionView>,
    pub can_submit: bool,
    pub result: Option<ResultView>,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub number: usize,
    pub prompt: String,
    pub options: Vec<String>,
    /// Selected option index, or [`UNSET`].
    pub selected: i64,
    /// Only revealed once results are in.
    pub explanation: Option<String>,
}

impl QuestionView {
    fn new(index: usize, question: &QuizQuestion, answer: Option<usize>, reveal: bool) -> Self {
        Self {
            index,
            number: index + 1,
            prompt: question.prompt.clone(),
            options: question.options.clone(),
            selected: answer.map_or(UNSET, |a| a as i64),
            explanation: if reveal {
                question.explanation.clone()
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    Retry,
    ReviewContent,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub status: QuizStatus,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub total_questions: usize,
    pub tech_score_change: Option<String>,
    pub tech_score: Option<f64>,
    pub current_streak: Option<u32>,
    pub longest_streak: Option<u32>,
    pub review: Option<ReviewView>,
    pub next_action: NextAction,
}

impl ResultView {
    fn new(result: &QuizSubmitResult, total_questions: usize) -> Self {
        Self {
            status: result.status,
            correct_count: result.correct_count,
            wrong_count: result.wrong_count,
            total_questions,
            tech_score_change: result.tech_score_change.map(signed_delta),
            tech_score: result.tech_score,
            current_streak: result.current_streak,
            longest_streak: result.longest_streak,
            review: result
                .review_hints
                .as_ref()
                .filter(|h| !h.is_empty())
                .map(|h| ReviewView {
                    rewatch: h.timestamps.clone(),
                    reread: h
                        .article_highlights
                        .iter()
                        .map(|p| format!("Paragraph {}", p.paragraph_index() + 1))
                        .collect(),
                    concepts: h.concepts.clone(),
                }),
            next_action: if result.passed() {
                NextAction::ReviewContent
            } else {
                NextAction::Retry
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewView {
    pub rewatch: Vec<String>,
    pub reread: Vec<String>,
    pub concepts: Vec<String>,
}

fn signed_delta(delta: f64) -> String {
    if delta > 0.0 {
        format!("+{delta}")
    } else {
        format!("{delta}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quiz::ReviewHints;
    use crate::testing::{quiz_fixture, submit_result};

    fn answering(questions: usize) -> QuizAttempt {
        let mut attempt = QuizAttempt::new("c1", false);
        let request = attempt.load_request().unwrap();
        attempt
            .quiz_loaded(&request, quiz_fixture("q1", questions))
            .unwrap();
        attempt
    }

    fn answer_all(attempt: &mut QuizAttempt, answers: &[usize]) {
        for (q, a) in answers.iter().enumerate() {
            attempt.select(q, *a).unwrap();
        }
    }

    #[test]
    fn test_loaded_quiz_starts_with_unset_answers() {
        let attempt = answering(3);
        let view = attempt.view();
        assert_eq!(view.phase, Phase::Answering);
        assert!(view.questions.iter().all(|q| q.selected == UNSET));
        assert!(!view.can_submit);
        assert_eq!(view.quiz_id.as_deref(), Some("q1"));
    }

    #[test]
    fn test_submit_blocked_while_any_answer_unset() {
        let mut attempt = answering(3);
        attempt.select(0, 1).unwrap();
        attempt.select(2, 0).unwrap();

        let err = attempt.begin_submit().unwrap_err();
        assert_eq!(err, QuizError::Incomplete { unanswered: vec![1] });
        assert_eq!(attempt.view().phase, Phase::Answering);
    }

    #[test]
    fn test_second_submit_while_in_flight_rejected() {
        let mut attempt = answering(2);
        answer_all(&mut attempt, &[0, 1]);

        let submission = attempt.begin_submit().unwrap();
        assert_eq!(submission.answers, vec![0, 1]);
        assert_eq!(submission.quiz_id, "q1");

        assert_eq!(attempt.begin_submit(), Err(QuizError::SubmissionInFlight));
        assert_eq!(attempt.select(0, 0), Err(QuizError::SubmissionInFlight));
    }

    #[test]
    fn test_select_validates_ranges() {
        let mut attempt = answering(2);
        assert_eq!(
            attempt.select(5, 0),
            Err(QuizError::QuestionOutOfRange { question: 5, count: 2 })
        );
        assert_eq!(
            attempt.select(0, 9),
            Err(QuizError::OptionOutOfRange {
                question: 0,
                option: 9,
                count: 3
            })
        );
    }

    #[test]
    fn test_failed_submit_keeps_answers() {
        let mut attempt = answering(2);
        answer_all(&mut attempt, &[2, 1]);
        attempt.begin_submit().unwrap();
        attempt.submit_failed().unwrap();

        let view = attempt.view();
        assert_eq!(view.phase, Phase::Answering);
        assert!(view.can_submit);
        assert_eq!(view.questions[0].selected, 2);
        assert!(view.notice.is_some());
    }

    #[test]
    fn test_retry_requests_next_quiz_id() {
        let mut attempt = answering(2);
        answer_all(&mut attempt, &[0, 0]);
        attempt.begin_submit().unwrap();
        attempt
            .submit_succeeded(submit_result(QuizStatus::Retry, 1, 1, Some("q2")))
            .unwrap();

        attempt.retry().unwrap();
        assert_eq!(
            attempt.load_request().unwrap(),
            LoadRequest::Retry {
                quiz_id: Some("q2".to_string())
            }
        );
        assert!(attempt.view().questions.is_empty());
    }

    #[test]
    fn test_retry_chain_submits_against_retry_quiz() {
        let mut attempt = QuizAttempt::new("c1", true);
        let request = attempt.load_request().unwrap();
        assert_eq!(request, LoadRequest::Retry { quiz_id: None });
        attempt.quiz_loaded(&request, quiz_fixture("q7", 1)).unwrap();
        attempt.select(0, 0).unwrap();

        assert_eq!(attempt.begin_submit().unwrap().quiz_id, "q7");
    }

    #[test]
    fn test_missing_retry_quiz_falls_back_to_original() {
        let mut attempt = QuizAttempt::new("c1", true);
        let request = attempt.load_request().unwrap();
        let fallback = attempt.load_failed(&request).unwrap();
        assert_eq!(fallback, Some(LoadRequest::Original));

        attempt
            .quiz_loaded(&LoadRequest::Original, quiz_fixture("q1", 1))
            .unwrap();
        let view = attempt.view();
        assert_eq!(view.phase, Phase::Answering);
        assert_eq!(view.quiz_id.as_deref(), Some("q1"));
        assert!(view.notice.is_some());
    }

    #[test]
    fn test_failed_original_load_is_terminal_not_loading() {
        let mut attempt = QuizAttempt::new("c1", false);
        assert_eq!(attempt.load_failed(&LoadRequest::Original).unwrap(), None);
        assert_eq!(attempt.view().phase, Phase::Unavailable);
        assert!(attempt.begin_submit().is_err());
    }

    #[test]
    fn test_empty_quiz_is_unavailable() {
        let mut attempt = QuizAttempt::new("c1", false);
        attempt
            .quiz_loaded(&LoadRequest::Original, quiz_fixture("q1", 0))
            .unwrap();
        assert_eq!(attempt.view().phase, Phase::Unavailable);
    }

    #[test]
    fn test_passed_quiz_cannot_retry() {
        let mut attempt = answering(1);
        attempt.select(0, 0).unwrap();
        attempt.begin_submit().unwrap();
        attempt
            .submit_succeeded(submit_result(QuizStatus::Passed, 1, 0, None))
            .unwrap();

        assert_eq!(attempt.retry(), Err(QuizError::AlreadyPassed));
        let result = attempt.view().result.unwrap();
        assert_eq!(result.next_action, NextAction::ReviewContent);
    }

    #[test]
    fn test_result_view_formats_hints_and_delta() {
        let mut attempt = answering(2);
        answer_all(&mut attempt, &[0, 1]);
        attempt.begin_submit().unwrap();

        let mut result = submit_result(QuizStatus::Retry, 1, 1, Some("q2"));
        result.tech_score_change = Some(-2.0);
        result.review_hints = Some(ReviewHints {
            timestamps: vec!["02:15".to_string()],
            article_highlights: vec![crate::models::quiz::ParagraphHighlight::Index(0)],
            concepts: vec!["borrowing".to_string()],
        });
        attempt.submit_succeeded(result).unwrap();

        let view = attempt.view();
        let result = view.result.unwrap();
        assert_eq!(result.total_questions, 2);
        assert_eq!(result.tech_score_change.as_deref(), Some("-2"));
        let review = result.review.unwrap();
        assert_eq!(review.reread, vec!["Paragraph 1"]);
        assert_eq!(review.concepts, vec!["borrowing"]);
        assert!(view.questions[0].explanation.is_some());
    }

    #[test]
    fn test_explanations_hidden_before_results() {
        let attempt = answering(1);
        assert!(attempt.view().questions[0].explanation.is_none());
    }

    #[test]
    fn test_signed_delta() {
        assert_eq!(signed_delta(10.0), "+10");
        assert_eq!(signed_delta(0.0), "0");
        assert_eq!(signed_delta(-2.0), "-2");
    }
}
