// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! lmrs - Offline-first client library for the LearnMate e-learning platform.
//!
//! This crate provides the core functionality for the `learnmate` CLI:
//! whole-subject offline bundles, a durable queue of learner activity that
//! is delivered when the connection returns, and a read-through cache of
//! server content.
//!
//! # Main Components
//!
//! - [`sync::SyncEngine`] - Drains queued mutations to the server with bounded retries
//! - [`offline::OfflineBundleManager`] - Downloads subjects for offline use
//! - [`sync::ConnectivityMonitor`] - Shared online/offline status
//! - [`sync::RemoteApi`] - Server operations, implemented over HTTP by [`sync::HttpRemote`]
//! - [`Config`] - Client configuration (`config.toml`)
//! - [`Error`] - Error types for all operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use lmrs::commands;
//!
//! let app = commands::open(None, false).await?;
//! app.bundles.download_subject(3).await?;
//! app.engine.start();
//! ```

mod cli;
pub mod commands;
mod display;
mod env;

pub mod config;
pub mod error;
pub mod offline;
pub mod sync;

pub use cli::{
    CacheCommand, Cli, Command, OfflineCommand, OutputArgs, OutputFormat, QueueCommand,
};
pub use config::Config;
pub use error::{Error, Result};

use clap::CommandFactory;
use clap_complete::generate;

use commands::App;
use sync::RemoteApi;

/// Execute a CLI invocation. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    if let Command::Completion { shell } = cli.command {
        generate(shell, &mut Cli::command(), "learnmate", &mut std::io::stdout());
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let forced_offline = cli.offline || env::force_offline();
        let app = commands::open(cli.data_dir, forced_offline).await?;
        dispatch(&app, cli.command, forced_offline).await
    })
}

async fn dispatch<R: RemoteApi + 'static>(
    app: &App<R>,
    command: Command,
    forced_offline: bool,
) -> Result<()> {
    match command {
        Command::Download { subject, output } => {
            commands::content::download(app, subject, output.format).await
        }
        Command::Offline(cmd) => match cmd {
            OfflineCommand::List { output } => {
                commands::content::list_offline(app, output.format).await
            }
            OfflineCommand::Show { subject, output } => {
                commands::content::show_offline(app, subject, output.format).await
            }
            OfflineCommand::Remove { subject } => {
                commands::content::remove_offline(app, subject).await
            }
            OfflineCommand::Storage { output } => {
                commands::content::storage(app, output.format).await
            }
            OfflineCommand::Attachment { lesson, file } => {
                commands::content::save_attachment(app, lesson, file.as_deref()).await
            }
        },
        Command::Lesson { id, output } => commands::content::lesson(app, id, output.format).await,
        Command::Quiz { id, output } => commands::content::quiz(app, id, output.format).await,
        Command::Progress {
            lesson,
            time_spent,
            incomplete,
        } => commands::activity::progress(app, lesson, time_spent, incomplete).await,
        Command::Submit { quiz, answers } => {
            commands::activity::submit(app, quiz, &answers).await
        }
        Command::Enroll { subject } => commands::activity::enroll(app, subject).await,
        Command::Queue(cmd) => match cmd {
            QueueCommand::List { output } => commands::queue::list(app, output.format).await,
            QueueCommand::Count => commands::queue::count(app).await,
            QueueCommand::Clear => commands::queue::clear(app).await,
        },
        Command::Sync { watch: true } => commands::queue::watch(app, forced_offline).await,
        Command::Sync { watch: false } => commands::queue::sync(app).await,
        Command::Cache(cmd) => match cmd {
            CacheCommand::Prune => commands::maintenance::cache_prune(app).await,
            CacheCommand::Clear => commands::maintenance::cache_clear(app).await,
        },
        Command::Logout => commands::maintenance::logout(app).await,
        // Handled before the runtime starts
        Command::Completion { .. } => Ok(()),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
