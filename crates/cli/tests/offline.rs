// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod common;
use common::*;

#[test]
fn offline_list_empty() {
    let temp = TempDir::new().unwrap();

    offline(&temp)
        .args(["offline", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No subjects available offline"));

    offline(&temp)
        .args(["offline", "list", "-o", "json"])
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn offline_storage_counts_pending_changes() {
    let temp = TempDir::new().unwrap();
    queue_progress(&temp, 42, 120);

    offline(&temp)
        .args(["offline", "storage"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Offline subjects: 0"))
        .stdout(predicate::str::contains("Pending changes: 1"));

    let output = offline(&temp)
        .args(["offline", "storage", "-o", "json"])
        .output()
        .unwrap();
    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["offline_subjects"], 0);
    assert_eq!(info["pending_mutations"], 1);
}

#[test]
fn download_while_offline_fails() {
    let temp = TempDir::new().unwrap();

    offline(&temp)
        .args(["download", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "cannot download subject 3 while offline",
        ))
        .stderr(predicate::str::contains("hint: reconnect"));
}

#[test]
fn lesson_not_downloaded_is_unavailable() {
    let temp = TempDir::new().unwrap();

    offline(&temp)
        .args(["lesson", "12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "lesson 12 is not available offline",
        ))
        .stderr(predicate::str::contains("learnmate download"));

    offline(&temp)
        .args(["quiz", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("quiz 4 is not available offline"));
}

#[test]
fn offline_show_and_remove_missing_subject() {
    let temp = TempDir::new().unwrap();

    offline(&temp)
        .args(["offline", "show", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("offline subject not found: 3"));

    offline(&temp)
        .args(["offline", "remove", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("offline subject not found: 3"));
}

const SUBJECT: &str = r#"{"success":true,"data":{"subject":{"id":4,"name":"Fractions","description":null,"grade_level":5,"lessons":[{"id":10,"title":"Halves","order_number":1}]}}}"#;

const LESSONS: &str = r#"{"success":true,"data":{"lessons":[{"id":10,"subject_id":4,"title":"Halves","content":"One of two equal parts","order_number":1,"language":"en","is_published":1,"quiz_count":0}]}}"#;

const LESSON: &str = r#"{"success":true,"data":{"lesson":{"id":10,"subject_id":4,"title":"Halves","content":"One of two equal parts","content_file_url":"https://res.cloudinary.com/demo/halves.pdf","content_file_name":"halves.pdf","order_number":1,"language":"en","is_published":1,"subject_name":"Fractions","grade_level":5,"quizzes":[]}}}"#;

const ATTACHMENT: &str = "%PDF-1.4 halves";

#[test]
fn offline_attachment_after_download() {
    let temp = TempDir::new().unwrap();
    let api_url = serve_api(&[
        ("/health", r#"{"status":"OK"}"#),
        ("/subjects/4", SUBJECT),
        ("/lessons/subject/4", LESSONS),
        ("/lessons/10", LESSON),
        ("/lessons/10/download", ATTACHMENT),
    ]);

    learnmate(&temp)
        .env("LEARNMATE_API_URL", &api_url)
        .args(["download", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Downloaded"));

    let file = temp.path().join("halves.pdf");
    offline(&temp)
        .args(["offline", "attachment", "10", "-f"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved attachment for lesson 10"));
    assert_eq!(std::fs::read(&file).unwrap(), ATTACHMENT.as_bytes());

    offline(&temp)
        .args(["offline", "attachment", "10"])
        .assert()
        .success()
        .stdout(ATTACHMENT);

    offline(&temp)
        .args(["lesson", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Attachment: stored offline"));
}

#[test]
fn offline_attachment_missing() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("missing.pdf");

    offline(&temp)
        .args(["offline", "attachment", "12", "-f"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "attachment 12 is not available offline",
        ));
    assert!(!file.exists());
}
