// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use lm_core::content::is_offline_ref;
use lm_core::{Lesson, OfflineSubject, QuestionType, Quiz, StorageInfo, SyncQueueItem};

use crate::offline::{DownloadProgress, DownloadStatus};
use crate::sync::{SyncReport, SyncState, SyncStatus};

/// Maximum line width for wrapped text content (excluding 4-space indent).
const WRAP_WIDTH: usize = 96;

/// Wrap text at word boundaries if it's a single line.
///
/// - If content contains newlines: return as-is (preserve author formatting)
/// - If content is single line >width: wrap at word boundaries
/// - If content is single line <=width: return as-is
pub fn wrap_text(content: &str, width: usize) -> String {
    if content.contains('\n') || content.len() <= width {
        return content.to_string();
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    for word in content.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.len() + 1 + word.len() <= width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current_line));
            current_line = word.to_string();
        }
    }
    if !current_line.is_empty() {
        lines.push(current_line);
    }
    lines.join("\n")
}

fn indent(content: &str) -> String {
    content
        .lines()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Human-readable byte count.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.1} {unit}")
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// One-line summary of an offline subject.
pub fn format_bundle_line(bundle: &OfflineSubject) -> String {
    format!(
        "{}\t{}\t{}, {}\tdownloaded {}",
        bundle.id,
        bundle.subject.name,
        plural(bundle.lessons.len(), "lesson", "lessons"),
        plural(bundle.quizzes.len(), "quiz", "quizzes"),
        bundle.downloaded_at.format("%Y-%m-%d %H:%M"),
    )
}

/// An offline subject with its lesson outline.
pub fn format_bundle_details(bundle: &OfflineSubject) -> String {
    let mut out = format!("[{}] {}\n", bundle.id, bundle.subject.name);
    if !bundle.subject.description.is_empty() {
        out.push_str(&indent(&wrap_text(&bundle.subject.description, WRAP_WIDTH)));
        out.push('\n');
    }
    out.push_str(&format!(
        "Downloaded: {}\n",
        bundle.downloaded_at.format("%Y-%m-%d %H:%M")
    ));
    out.push_str("\nLessons:\n");
    for lesson in &bundle.lessons {
        let mut line = format!("  {}. [{}] {}", lesson.order_number, lesson.id, lesson.title);
        if let Some(quiz_id) = lesson.quiz_ref() {
            if bundle.quiz(quiz_id).is_some() {
                line.push_str(&format!(" (quiz {quiz_id})"));
            }
        }
        if lesson.content_url.as_deref().is_some_and(is_offline_ref) {
            line.push_str(" (attachment)");
        }
        out.push_str(&line);
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// Full lesson view.
pub fn format_lesson(lesson: &Lesson) -> String {
    let mut out = format!("[{}] {}\n", lesson.id, lesson.title);
    out.push_str(&format!(
        "Subject: {}  Order: {}\n",
        lesson.subject_id, lesson.order_number
    ));
    if let Some(url) = lesson.attachment_url() {
        if is_offline_ref(url) {
            out.push_str(&format!(
                "Attachment: stored offline (learnmate offline attachment {})\n",
                lesson.id
            ));
        } else {
            out.push_str(&format!("Attachment: {url}\n"));
        }
    }
    if let Some(quiz_id) = lesson.quiz_ref() {
        out.push_str(&format!("Quiz: {quiz_id}\n"));
    }
    if !lesson.content.is_empty() {
        out.push('\n');
        out.push_str(&indent(&wrap_text(&lesson.content, WRAP_WIDTH)));
    }
    out.trim_end().to_string()
}

fn question_type_label(question_type: QuestionType) -> &'static str {
    match question_type {
        QuestionType::MultipleChoice => "multiple choice",
        QuestionType::TrueFalse => "true/false",
        QuestionType::ShortAnswer => "short answer",
    }
}

/// Quiz view. Correct answers are never shown.
pub fn format_quiz(quiz: &Quiz) -> String {
    let mut out = format!("[{}] {}\n", quiz.id, quiz.title);
    out.push_str(&format!(
        "Lesson: {}  Passing score: {}%  Attempts: {}",
        quiz.lesson_id, quiz.passing_score, quiz.max_attempts
    ));
    if let Some(limit) = quiz.time_limit {
        out.push_str(&format!("  Time limit: {limit} min"));
    }
    out.push('\n');
    if !quiz.description.is_empty() {
        out.push_str(&indent(&wrap_text(&quiz.description, WRAP_WIDTH)));
        out.push('\n');
    }
    for question in &quiz.questions {
        out.push_str(&format!(
            "\nQ{} ({}, {}): {}\n",
            question.id,
            question_type_label(question.question_type),
            plural(question.points.max(0) as usize, "pt", "pts"),
            question.question_text
        ));
        for option in &question.options {
            out.push_str(&format!("    - {}\n", option.option_text));
        }
    }
    out.trim_end().to_string()
}

/// One line per pending mutation.
pub fn format_queue_item(item: &SyncQueueItem) -> String {
    format!(
        "#{}\t{}\t{} {}\tretries={}\t{}",
        item.id,
        item.kind,
        item.method.as_str(),
        item.endpoint,
        item.retries,
        item.created_at.format("%Y-%m-%d %H:%M:%S"),
    )
}

/// Storage usage summary.
pub fn format_storage(info: &StorageInfo) -> String {
    format!(
        "Offline subjects: {}\n\
         Lessons: {}\n\
         Quizzes: {}\n\
         Bundles: {}\n\
         Attachments: {}\n\
         Total: {}\n\
         Pending changes: {}\n\
         Cached responses: {}",
        info.offline_subjects,
        info.total_lessons,
        info.total_quizzes,
        format_bytes(info.bundle_bytes),
        format_bytes(info.attachment_bytes),
        format_bytes(info.total_bytes()),
        info.pending_mutations,
        info.cache_entries,
    )
}

/// Outcome of one drain.
pub fn format_report(report: &SyncReport) -> String {
    if !report.success {
        return format!("Sync did not complete, {} pending", report.pending);
    }
    let mut out = format!("Synced {}", plural(report.synced, "change", "changes"));
    if report.failed > 0 {
        out.push_str(&format!(", dropped {} after retries", report.failed));
    }
    out.push_str(&format!(", {} pending", report.pending));
    out
}

/// Progress line for a drain status update.
pub fn format_sync_status(status: &SyncStatus) -> String {
    let label = match (status.state, status.current, status.total) {
        (SyncState::Syncing, Some(current), Some(total)) => format!("syncing {current}/{total}"),
        (SyncState::Syncing, _, _) => "syncing".to_string(),
        (SyncState::Idle, _, _) => "idle".to_string(),
        (SyncState::Error, _, _) => "sync error".to_string(),
    };
    format!("[{:>3}%] {label}", status.progress)
}

/// Progress line for a download status update.
pub fn format_download_progress(progress: &DownloadProgress) -> String {
    let label = match progress.status {
        DownloadStatus::Error => format!(
            "error: {}",
            progress.error.as_deref().unwrap_or("download failed")
        ),
        _ => progress.current_step.clone().unwrap_or_default(),
    };
    format!("[{:>3}%] {label}", progress.progress)
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
