// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Learning content records as served by the LearnMate API.
//!
//! These are snapshots: fields the client does not interpret are kept in
//! `extra` so a stored bundle round-trips whatever the server sent.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Scheme prefix for attachments materialized into the local store.
pub const OFFLINE_ATTACHMENT_SCHEME: &str = "offline://";

/// A subject (course) and its metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(default)]
    pub grade_level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

/// A single lesson within a subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub subject_id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub content: String,
    /// Location of the lesson's downloadable attachment, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    #[serde(default)]
    pub order_number: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub language: String,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_published: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub has_quiz: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_id: Option<i64>,
    /// Quizzes attached to the lesson, as listed by the lesson detail endpoint.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quizzes: Vec<QuizSummary>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_completed: Option<bool>,
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

impl Lesson {
    /// The quiz this lesson declares, if it has one.
    ///
    /// An explicit `has_quiz`/`quiz_id` pair wins; otherwise the first listed
    /// quiz is used.
    pub fn quiz_ref(&self) -> Option<i64> {
        self.quiz_id
            .filter(|_| self.has_quiz)
            .or_else(|| self.quizzes.first().map(|quiz| quiz.id))
    }

    /// Returns true if the lesson points at an attachment that can be downloaded.
    pub fn has_attachment(&self) -> bool {
        self.attachment_url().is_some_and(|url| !is_offline_ref(url))
    }

    /// Where the lesson's attachment lives: `content_url`, else the uploaded
    /// `content_file_url`.
    pub fn attachment_url(&self) -> Option<&str> {
        let uploaded = self.extra.get("content_file_url").and_then(Value::as_str);
        self.content_url
            .as_deref()
            .into_iter()
            .chain(uploaded)
            .find(|url| !url.trim().is_empty())
    }

    /// Local reference used once this lesson's attachment is stored offline.
    pub fn offline_attachment_ref(&self) -> String {
        format!("{OFFLINE_ATTACHMENT_SCHEME}lessons/{}/attachment", self.id)
    }
}

/// Returns true if `url` refers to locally materialized content.
pub fn is_offline_ref(url: &str) -> bool {
    url.starts_with(OFFLINE_ATTACHMENT_SCHEME)
}

/// A quiz as listed on its lesson, without questions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

/// Kind of question in a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
}

/// A selectable option of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: i64,
    pub option_text: String,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_correct: bool,
}

/// A quiz question, including its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    #[serde(default)]
    pub quiz_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub options: Vec<QuizOption>,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub order_number: i64,
}

/// A quiz attached to a lesson.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub lesson_id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub passing_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<i64>,
    #[serde(default)]
    pub max_attempts: i64,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

/// A learner's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub question_id: i64,
    pub student_answer: String,
}

/// Per-question grading returned after a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerFeedback {
    pub question_id: i64,
    #[serde(deserialize_with = "lenient::flag")]
    pub is_correct: bool,
    #[serde(default, deserialize_with = "lenient::number")]
    pub points_earned: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

/// Result of submitting a quiz attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizOutcome {
    #[serde(deserialize_with = "lenient::number")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_points: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub percentage: f64,
    pub passed: bool,
    #[serde(default)]
    pub feedback: Vec<AnswerFeedback>,
}

/// Lesson progress as reported by the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub is_completed: bool,
    /// Seconds spent on the lesson.
    pub time_spent: u64,
}

/// Decoders for values as the server's MySQL driver emits them: flags as
/// `0`/`1`, decimals as strings, and `null` for empty text columns.
mod lenient {
    use super::*;
    use serde::de::Error as _;

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        optional_flag(deserializer).map(Option::unwrap_or_default)
    }

    pub fn optional_flag<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<bool>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(b)),
            Value::Number(n) => Ok(Some(n.as_f64().is_some_and(|n| n != 0.0))),
            Value::String(s) => match s.trim() {
                "1" | "true" => Ok(Some(true)),
                "0" | "false" | "" => Ok(Some(false)),
                other => Err(D::Error::custom(format!("invalid flag '{other}'"))),
            },
            other => Err(D::Error::custom(format!("invalid flag {other}"))),
        }
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(0.0),
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| D::Error::custom(format!("invalid number {n}"))),
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid number '{s}'"))),
            other => Err(D::Error::custom(format!("invalid number {other}"))),
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod tests;
