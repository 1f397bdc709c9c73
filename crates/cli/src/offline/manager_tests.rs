// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::sync::test_helpers::{
    lesson, lesson_with_attachment, lesson_with_quiz, quiz, Call, FakeRemote, FETCH_ATTACHMENT,
    FETCH_LESSON, FETCH_LESSONS, FETCH_QUIZ,
};
use lm_core::content::is_offline_ref;

fn manager(
    remote: FakeRemote,
    online: bool,
) -> (OfflineBundleManager<FakeRemote>, Arc<FakeRemote>) {
    let store = LocalStore::open_in_memory().unwrap();
    let remote = Arc::new(remote);
    let manager =
        OfflineBundleManager::new(store, Arc::clone(&remote), ConnectivityMonitor::new(online));
    (manager, remote)
}

fn three_lessons() -> FakeRemote {
    FakeRemote::new()
        .with_subject(
            7,
            vec![lesson(1, 7), lesson_with_quiz(2, 7, 99), lesson(3, 7)],
        )
        .with_quiz(quiz(99, 2))
}

fn drain(rx: &mut broadcast::Receiver<DownloadProgress>) -> Vec<DownloadProgress> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_download_subject_with_three_lessons() {
    let (manager, remote) = manager(three_lessons(), true);

    let bundle = manager.download_subject(7).await.unwrap();

    assert_eq!(bundle.id, 7);
    assert_eq!(bundle.lessons.len(), 3);
    assert_eq!(bundle.quizzes.len(), 1);
    assert_eq!(bundle.quizzes[0].id, 99);
    assert_eq!(remote.count(|c| matches!(c, Call::FetchQuiz(99))), 1);
    assert_eq!(remote.count(|c| matches!(c, Call::FetchLesson(_))), 3);
    assert!(manager.is_available_offline(7).await.unwrap());
    assert!(!manager.is_downloading(7));

    let stored = manager.get_offline_subject(7).await.unwrap().unwrap();
    assert_eq!(stored.lessons, bundle.lessons);
}

#[tokio::test]
async fn test_concurrent_download_is_rejected() {
    let remote = three_lessons();
    let gate = remote.gate_subject();
    let (manager, remote) = manager(remote, true);
    let manager = Arc::new(manager);

    let first = tokio::spawn({
        let manager = Arc::clone(&manager);
        async move { manager.download_subject(7).await }
    });
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(manager.is_downloading(7));

    let second = manager.download_subject(7).await;
    assert!(matches!(second, Err(DownloadError::AlreadyDownloading(7))));

    gate.notify_one();
    first.await.unwrap().unwrap();
    assert_eq!(remote.count(|c| matches!(c, Call::FetchSubject(7))), 1);
    assert!(!manager.is_downloading(7));
}

#[tokio::test]
async fn test_quiz_failures_do_not_abort_download() {
    let remote = three_lessons();
    remote.fail(FETCH_QUIZ);
    let (manager, _) = manager(remote, true);

    let bundle = manager.download_subject(7).await.unwrap();

    assert_eq!(bundle.lessons.len(), 3);
    assert!(bundle.quizzes.is_empty());
    assert!(manager.is_available_offline(7).await.unwrap());
}

#[tokio::test]
async fn test_lessons_list_failure_commits_nothing() {
    let remote = three_lessons();
    remote.fail(FETCH_LESSONS);
    let (manager, _) = manager(remote, true);
    let mut rx = manager.subscribe(7);

    let result = manager.download_subject(7).await;

    assert!(matches!(result, Err(DownloadError::Remote(_))));
    assert!(!manager.is_available_offline(7).await.unwrap());
    let last = drain(&mut rx).pop().unwrap();
    assert_eq!(last.status, DownloadStatus::Error);
    assert!(last.error.is_some());
}

#[tokio::test]
async fn test_lesson_failure_commits_nothing() {
    let remote = three_lessons();
    remote.fail_for(FETCH_LESSON, 3);
    let (manager, _) = manager(remote, true);

    assert!(manager.download_subject(7).await.is_err());
    assert!(manager.offline_lessons(7).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_offline_download_reports_error() {
    let (manager, remote) = manager(three_lessons(), false);
    let mut rx = manager.subscribe(7);

    let result = manager.download_subject(7).await;

    assert!(matches!(result, Err(DownloadError::Offline(7))));
    assert!(remote.calls().is_empty());
    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, DownloadStatus::Error);
    assert!(!manager.is_downloading(7));
}

#[tokio::test]
async fn test_progress_is_monotonic_and_completes() {
    let (manager, _) = manager(three_lessons(), true);
    let mut rx = manager.subscribe(7);

    manager.download_subject(7).await.unwrap();

    let events = drain(&mut rx);
    let percents: Vec<u8> = events.iter().map(|e| e.progress).collect();
    assert_eq!(percents, vec![0, 10, 20, 30, 46, 63, 80, 100]);
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(events.last().unwrap().status, DownloadStatus::Completed);
}

#[tokio::test]
async fn test_attachment_is_materialized() {
    let remote = FakeRemote::new()
        .with_subject(4, vec![lesson_with_attachment(10, 4), lesson(11, 4)])
        .with_attachment(10, b"%PDF-1.4");
    let (manager, remote) = manager(remote, true);

    let bundle = manager.download_subject(4).await.unwrap();

    let url = bundle.lesson(10).unwrap().content_url.clone().unwrap();
    assert!(is_offline_ref(&url));
    assert_eq!(
        manager.attachment(10).await.unwrap(),
        Some(b"%PDF-1.4".to_vec())
    );
    assert_eq!(remote.count(|c| matches!(c, Call::FetchAttachment(_))), 1);

    let lesson = manager.offline_lesson(10).await.unwrap().unwrap();
    assert_eq!(lesson.content_url, Some(url));
}

#[tokio::test]
async fn test_attachment_failure_keeps_remote_url() {
    let remote = FakeRemote::new()
        .with_subject(4, vec![lesson_with_attachment(10, 4)])
        .with_attachment(10, b"data");
    remote.fail(FETCH_ATTACHMENT);
    let (manager, _) = manager(remote, true);

    let bundle = manager.download_subject(4).await.unwrap();

    let url = bundle.lessons[0].content_url.as_deref().unwrap();
    assert!(url.starts_with("https://"));
    assert_eq!(manager.attachment(10).await.unwrap(), None);
}

#[tokio::test]
async fn test_remove_offline_subject() {
    let remote = FakeRemote::new()
        .with_subject(4, vec![lesson_with_attachment(10, 4)])
        .with_attachment(10, b"data");
    let (manager, _) = manager(remote, true);
    manager.download_subject(4).await.unwrap();

    assert!(manager.remove_offline_subject(4).await.unwrap());
    assert!(!manager.remove_offline_subject(4).await.unwrap());
    assert!(!manager.is_available_offline(4).await.unwrap());
    assert_eq!(manager.attachment(10).await.unwrap(), None);
    assert!(manager.offline_lesson(10).await.unwrap().is_none());
}

#[tokio::test]
async fn test_offline_lookups() {
    let (manager, _) = manager(three_lessons(), true);
    assert!(manager.offline_quiz(99).await.unwrap().is_none());

    manager.download_subject(7).await.unwrap();

    let ids: Vec<i64> = manager
        .offline_lessons(7)
        .await
        .unwrap()
        .iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(manager.offline_quiz(99).await.unwrap().unwrap().lesson_id, 2);
    assert!(manager.offline_lesson(42).await.unwrap().is_none());
}

#[tokio::test]
async fn test_redownload_drops_removed_lessons() {
    let (manager, remote) = manager(three_lessons(), true);
    manager.download_subject(7).await.unwrap();
    assert!(manager.offline_quiz(99).await.unwrap().is_some());

    remote.remove_lesson(2);
    let bundle = manager.download_subject(7).await.unwrap();
    assert_eq!(bundle.lessons.len(), 2);

    let ids: Vec<i64> = manager
        .offline_lessons(7)
        .await
        .unwrap()
        .iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(ids, vec![1, 3]);
    assert!(manager.offline_lesson(2).await.unwrap().is_none());
    assert!(manager.offline_quiz(99).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_and_storage_info() {
    let remote = three_lessons().with_subject(8, vec![lesson(20, 8)]);
    let (manager, _) = manager(remote, true);
    manager.download_subject(7).await.unwrap();
    manager.download_subject(8).await.unwrap();

    let listed: Vec<i64> = manager
        .list_offline_subjects()
        .await
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(listed.len(), 2);
    assert!(listed.contains(&7) && listed.contains(&8));

    let info = manager.storage_info().await.unwrap();
    assert_eq!(info.offline_subjects, 2);
    assert_eq!(info.total_lessons, 4);
    assert_eq!(info.total_quizzes, 1);
    assert!(info.bundle_bytes > 0);
}

#[test]
fn test_lesson_progress_spreads_across_lessons() {
    assert_eq!(lesson_progress(0, 1), 30);
    assert_eq!(lesson_progress(0, 4), 30);
    assert_eq!(lesson_progress(2, 4), 55);
    assert_eq!(lesson_progress(3, 4), 67);
    assert_eq!(lesson_progress(0, 0), 30);
}
