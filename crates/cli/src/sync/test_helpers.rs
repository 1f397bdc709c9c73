// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync and offline tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use lm_core::{Lesson, ProgressUpdate, Quiz, QuizAnswer, QuizOutcome, Subject};

use super::remote::{RemoteApi, RemoteError, RemoteFuture};

/// A recorded remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchSubject(i64),
    FetchLessons(i64),
    FetchLesson(i64),
    FetchQuiz(i64),
    FetchAttachment(i64),
    StartAttempt(i64),
    SubmitQuiz {
        quiz_id: i64,
        attempt_id: i64,
        answers: Vec<QuizAnswer>,
    },
    UpdateProgress(i64, ProgressUpdate),
    Enroll(i64),
    Ping,
}

/// Operation names accepted by [`FakeRemote::fail`].
pub const FETCH_SUBJECT: &str = "fetch_subject";
pub const FETCH_LESSONS: &str = "fetch_lessons";
pub const FETCH_LESSON: &str = "fetch_lesson";
pub const FETCH_QUIZ: &str = "fetch_quiz";
pub const FETCH_ATTACHMENT: &str = "fetch_attachment";
pub const START_ATTEMPT: &str = "start_attempt";
pub const UPDATE_PROGRESS: &str = "update_progress";
pub const ENROLL: &str = "enroll";
pub const PING: &str = "ping";

/// In-memory remote with a call-order spy and injectable failures.
#[derive(Default)]
pub struct FakeRemote {
    calls: Mutex<Vec<Call>>,
    subjects: Mutex<HashMap<i64, Subject>>,
    lessons: Mutex<Vec<Lesson>>,
    quizzes: Mutex<HashMap<i64, Quiz>>,
    attachments: Mutex<HashMap<i64, Vec<u8>>>,
    /// Failing operations; `None` fails every target.
    failures: Mutex<HashSet<(&'static str, Option<i64>)>>,
    next_attempt: AtomicI64,
    subject_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        FakeRemote::default()
    }

    /// Register a subject and its lessons.
    pub fn with_subject(self, subject_id: i64, lessons: Vec<Lesson>) -> Self {
        self.subjects.lock().unwrap().insert(
            subject_id,
            Subject {
                id: subject_id,
                name: format!("Subject {subject_id}"),
                ..Subject::default()
            },
        );
        self.lessons.lock().unwrap().extend(lessons);
        self
    }

    pub fn with_quiz(self, quiz: Quiz) -> Self {
        self.quizzes.lock().unwrap().insert(quiz.id, quiz);
        self
    }

    pub fn with_attachment(self, lesson_id: i64, data: &[u8]) -> Self {
        self.attachments
            .lock()
            .unwrap()
            .insert(lesson_id, data.to_vec());
        self
    }

    /// Drop a lesson from its subject, as when the server deletes it.
    pub fn remove_lesson(&self, lesson_id: i64) {
        self.lessons.lock().unwrap().retain(|l| l.id != lesson_id);
    }

    /// Make every call of `op` fail.
    pub fn fail(&self, op: &'static str) {
        self.failures.lock().unwrap().insert((op, None));
    }

    /// Make `op` fail for one target id.
    pub fn fail_for(&self, op: &'static str, id: i64) {
        self.failures.lock().unwrap().insert((op, Some(id)));
    }

    pub fn recover(&self) {
        self.failures.lock().unwrap().clear();
    }

    /// Block `fetch_subject` until the returned notify is signalled.
    pub fn gate_subject(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.subject_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: &'static str, id: i64) -> Result<(), RemoteError> {
        let failures = self.failures.lock().unwrap();
        if failures.contains(&(op, None)) || failures.contains(&(op, Some(id))) {
            return Err(RemoteError::Network(format!("{op} {id} failed")));
        }
        Ok(())
    }

    fn not_found(what: &str, id: i64) -> RemoteError {
        RemoteError::Status {
            status: 404,
            message: format!("{what} {id} not found"),
        }
    }
}

/// A lesson belonging to `subject_id`.
pub fn lesson(id: i64, subject_id: i64) -> Lesson {
    Lesson {
        id,
        subject_id,
        title: format!("Lesson {id}"),
        content: format!("Content of lesson {id}"),
        order_number: id,
        is_published: true,
        ..Lesson::default()
    }
}

/// A lesson that declares quiz `quiz_id`.
pub fn lesson_with_quiz(id: i64, subject_id: i64, quiz_id: i64) -> Lesson {
    Lesson {
        has_quiz: true,
        quiz_id: Some(quiz_id),
        ..lesson(id, subject_id)
    }
}

/// A lesson with a downloadable attachment.
pub fn lesson_with_attachment(id: i64, subject_id: i64) -> Lesson {
    Lesson {
        content_url: Some(format!("https://cdn.example.com/lessons/{id}.pdf")),
        ..lesson(id, subject_id)
    }
}

pub fn quiz(id: i64, lesson_id: i64) -> Quiz {
    Quiz {
        id,
        lesson_id,
        title: format!("Quiz {id}"),
        passing_score: 70.0,
        max_attempts: 3,
        ..Quiz::default()
    }
}

impl RemoteApi for FakeRemote {
    fn fetch_subject(&self, subject_id: i64) -> RemoteFuture<'_, Subject> {
        Box::pin(async move {
            self.record(Call::FetchSubject(subject_id));
            let gate = self.subject_gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            self.check(FETCH_SUBJECT, subject_id)?;
            self.subjects
                .lock()
                .unwrap()
                .get(&subject_id)
                .cloned()
                .ok_or_else(|| Self::not_found("subject", subject_id))
        })
    }

    fn fetch_lessons_by_subject(&self, subject_id: i64) -> RemoteFuture<'_, Vec<Lesson>> {
        Box::pin(async move {
            self.record(Call::FetchLessons(subject_id));
            self.check(FETCH_LESSONS, subject_id)?;
            let mut lessons: Vec<Lesson> = self
                .lessons
                .lock()
                .unwrap()
                .iter()
                .filter(|l| l.subject_id == subject_id)
                .cloned()
                .collect();
            lessons.sort_by_key(|l| l.order_number);
            Ok(lessons)
        })
    }

    fn fetch_lesson(&self, lesson_id: i64) -> RemoteFuture<'_, Lesson> {
        Box::pin(async move {
            self.record(Call::FetchLesson(lesson_id));
            self.check(FETCH_LESSON, lesson_id)?;
            self.lessons
                .lock()
                .unwrap()
                .iter()
                .find(|l| l.id == lesson_id)
                .cloned()
                .ok_or_else(|| Self::not_found("lesson", lesson_id))
        })
    }

    fn fetch_quiz(&self, quiz_id: i64) -> RemoteFuture<'_, Quiz> {
        Box::pin(async move {
            self.record(Call::FetchQuiz(quiz_id));
            self.check(FETCH_QUIZ, quiz_id)?;
            self.quizzes
                .lock()
                .unwrap()
                .get(&quiz_id)
                .cloned()
                .ok_or_else(|| Self::not_found("quiz", quiz_id))
        })
    }

    fn fetch_attachment(&self, lesson_id: i64) -> RemoteFuture<'_, Vec<u8>> {
        Box::pin(async move {
            self.record(Call::FetchAttachment(lesson_id));
            self.check(FETCH_ATTACHMENT, lesson_id)?;
            self.attachments
                .lock()
                .unwrap()
                .get(&lesson_id)
                .cloned()
                .ok_or_else(|| Self::not_found("attachment", lesson_id))
        })
    }

    fn start_quiz_attempt(&self, quiz_id: i64) -> RemoteFuture<'_, i64> {
        Box::pin(async move {
            self.record(Call::StartAttempt(quiz_id));
            self.check(START_ATTEMPT, quiz_id)?;
            Ok(self.next_attempt.fetch_add(1, Ordering::SeqCst) + 1)
        })
    }

    fn submit_quiz(
        &self,
        quiz_id: i64,
        attempt_id: i64,
        answers: Vec<QuizAnswer>,
    ) -> RemoteFuture<'_, QuizOutcome> {
        Box::pin(async move {
            self.record(Call::SubmitQuiz {
                quiz_id,
                attempt_id,
                answers,
            });
            Ok(QuizOutcome {
                score: 1.0,
                total_points: 1.0,
                percentage: 100.0,
                passed: true,
                feedback: Vec::new(),
            })
        })
    }

    fn update_lesson_progress(
        &self,
        lesson_id: i64,
        update: ProgressUpdate,
    ) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.record(Call::UpdateProgress(lesson_id, update));
            self.check(UPDATE_PROGRESS, lesson_id)
        })
    }

    fn enroll_in_subject(&self, subject_id: i64) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.record(Call::Enroll(subject_id));
            self.check(ENROLL, subject_id)
        })
    }

    fn ping(&self) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.record(Call::Ping);
            self.check(PING, 0)
        })
    }
}
