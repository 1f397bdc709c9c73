// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Learner activity: progress, quiz answers and enrollment.
//!
//! Every command records a queued mutation first and only then tries to
//! deliver it, so nothing is lost when the server is unreachable.

use lm_core::{NewSyncItem, ProgressUpdate, QuizAnswer};

use crate::display::format_report;
use crate::error::{Error, Result};
use crate::sync::{RemoteApi, SyncReport};

use super::App;

pub async fn progress<R: RemoteApi + 'static>(
    app: &App<R>,
    lesson_id: i64,
    time_spent: u64,
    incomplete: bool,
) -> Result<()> {
    let update = ProgressUpdate {
        is_completed: !incomplete,
        time_spent,
    };
    let item = NewSyncItem::lesson_progress(lesson_id, update)?;
    record(app, item, &format!("progress for lesson {lesson_id}")).await
}

pub async fn submit<R: RemoteApi + 'static>(
    app: &App<R>,
    quiz_id: i64,
    answers: &[String],
) -> Result<()> {
    let answers = answers
        .iter()
        .map(|a| parse_answer(a))
        .collect::<Result<Vec<_>>>()?;
    let item = NewSyncItem::quiz_submit(quiz_id, answers)?;
    record(app, item, &format!("answers for quiz {quiz_id}")).await
}

pub async fn enroll<R: RemoteApi + 'static>(app: &App<R>, subject_id: i64) -> Result<()> {
    let item = NewSyncItem::enroll(subject_id);
    record(app, item, &format!("enrollment in subject {subject_id}")).await
}

async fn record<R: RemoteApi + 'static>(
    app: &App<R>,
    item: NewSyncItem,
    what: &str,
) -> Result<()> {
    let (id, report) = record_impl(app, item).await?;
    println!("Queued {what} (#{id})");
    match report {
        Some(report) => println!("{}", format_report(&report)),
        None => println!("Offline: will sync when the connection returns"),
    }
    Ok(())
}

/// Queue `item`, then drain once if online. Returns the item id and the
/// drain report, if a drain ran.
pub(crate) async fn record_impl<R: RemoteApi + 'static>(
    app: &App<R>,
    item: NewSyncItem,
) -> Result<(i64, Option<SyncReport>)> {
    let id = app.engine.queue().add(item).await?;
    if !app.is_online() {
        return Ok((id, None));
    }
    Ok((id, Some(app.engine.sync().await)))
}

/// Parse `QUESTION_ID=ANSWER`.
pub(crate) fn parse_answer(raw: &str) -> Result<QuizAnswer> {
    let invalid = || Error::InvalidAnswer(raw.to_string());
    let (question, answer) = raw.split_once('=').ok_or_else(invalid)?;
    let question_id = question.trim().parse().map_err(|_| invalid())?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(invalid());
    }
    Ok(QuizAnswer {
        question_id,
        student_answer: answer.to_string(),
    })
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
