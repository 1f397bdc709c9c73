// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

pub use args::OutputArgs;

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

// Custom help template that groups commands into sections
const HELP_TEMPLATE: &str = "{about-with-newline}
{usage-heading} {usage}

{before-help}Options:
{options}{after-help}";

const COMMANDS_HELP: &str = "\
Offline Content:
  download    Download a subject for offline use
  offline     List, inspect and remove offline subjects and attachments
  lesson      Show a lesson
  quiz        Show a quiz

Learning Activity:
  progress    Record progress on a lesson
  submit      Submit quiz answers
  enroll      Enroll in a subject

Sync & Storage:
  queue       Inspect pending changes
  sync        Deliver pending changes to the server
  cache       Manage cached responses
  logout      Remove all local data
  completion  Generate shell completions";

const QUICKSTART_HELP: &str = "\
Get started:
  learnmate download 3             Make subject 3 available offline
  learnmate --offline lesson 12    Read a lesson without a connection
  learnmate progress 12 -t 300     Record 5 minutes on lesson 12
  learnmate sync                   Send queued changes now";

#[derive(Parser)]
#[command(name = "learnmate")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first client for the LearnMate e-learning platform")]
#[command(
    long_about = "Offline-first client for the LearnMate e-learning platform.\n\n\
    Download subjects for offline study, record progress and quiz answers while \
    disconnected, and sync them when the connection returns."
)]
#[command(help_template = HELP_TEMPLATE)]
#[command(before_help = COMMANDS_HELP)]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Directory holding the local database and config.toml
    #[arg(long, global = true, value_name = "path")]
    pub data_dir: Option<PathBuf>,

    /// Work without contacting the server
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    // ─────────────────────────────────────────────────────────────────────────
    // Offline content
    // ─────────────────────────────────────────────────────────────────────────
    /// Download a subject with its lessons, quizzes and attachments
    #[command(after_help = "Examples:\n  \
        learnmate download 3            Download subject 3\n  \
        learnmate download 3 -o json    Print the stored bundle as JSON")]
    Download {
        /// Subject ID
        subject: i64,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Manage subjects stored for offline use
    #[command(subcommand)]
    Offline(OfflineCommand),

    /// Show a lesson (from the server, or the offline copy when disconnected)
    Lesson {
        /// Lesson ID
        id: i64,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show a quiz (from the server, or the offline copy when disconnected)
    Quiz {
        /// Quiz ID
        id: i64,

        #[command(flatten)]
        output: OutputArgs,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Learning activity
    // ─────────────────────────────────────────────────────────────────────────
    /// Record time spent on a lesson (queued until delivered)
    #[command(after_help = "Examples:\n  \
        learnmate progress 12 -t 300                 Complete lesson 12 after 5 minutes\n  \
        learnmate progress 12 -t 60 --incomplete     Record time without completing")]
    Progress {
        /// Lesson ID
        lesson: i64,

        /// Seconds spent on the lesson
        #[arg(long, short = 't', default_value_t = 0)]
        time_spent: u64,

        /// Do not mark the lesson as completed
        #[arg(long)]
        incomplete: bool,
    },

    /// Submit answers to a quiz (queued until delivered)
    #[command(after_help = "Examples:\n  \
        learnmate submit 5 -a 1=B -a 2=true     Answer questions 1 and 2 of quiz 5")]
    Submit {
        /// Quiz ID
        quiz: i64,

        /// Answer as QUESTION_ID=ANSWER (repeatable)
        #[arg(long = "answer", short, required = true, value_name = "QID=ANSWER")]
        answers: Vec<String>,
    },

    /// Enroll in a subject (queued until delivered)
    Enroll {
        /// Subject ID
        subject: i64,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Sync & storage
    // ─────────────────────────────────────────────────────────────────────────
    /// Inspect changes waiting to be delivered
    #[command(subcommand)]
    Queue(QueueCommand),

    /// Deliver queued changes to the server
    #[command(after_help = "Examples:\n  \
        learnmate sync            Drain the queue once\n  \
        learnmate sync --watch    Keep syncing until interrupted")]
    Sync {
        /// Keep running, syncing periodically and on reconnect
        #[arg(long)]
        watch: bool,
    },

    /// Manage cached server responses
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Remove all local data and the stored token
    Logout,

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum OfflineCommand {
    /// List subjects available offline
    List {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show an offline subject and its lessons
    Show {
        /// Subject ID
        subject: i64,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Remove a subject from offline storage
    Remove {
        /// Subject ID
        subject: i64,
    },

    /// Show how much space offline data uses
    Storage {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Write a lesson's stored attachment to a file, or to stdout
    #[command(after_help = "Examples:\n  \
        learnmate offline attachment 12 -f fractions.pdf   Save lesson 12's file\n  \
        learnmate offline attachment 12 | less             Page through it")]
    Attachment {
        /// Lesson ID
        lesson: i64,

        /// File to write instead of stdout
        #[arg(long, short = 'f', value_name = "path")]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum QueueCommand {
    /// List pending changes, oldest first
    List {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print the number of pending changes
    Count,

    /// Discard every pending change
    Clear,
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// Delete expired entries
    Prune,

    /// Delete every entry
    Clear,
}
