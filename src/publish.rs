// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::error::PublishError;
use crate::progress::{ProgressEvent, SharedProgressReporter};

/// Where and how to publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    pub commit_message: String,
    pub remote: String,
    pub branch: String,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            commit_message: "Automated podcast update: Synced feed, added new episodes."
                .to_string(),
            remote: "origin".to_string(),
            branch: "main".to_string(),
        }
    }
}

/// Version control abstraction for testability
pub trait Publisher {
    /// Stage every change in the working tree, deletions included
    fn stage_all(&self) -> Result<(), PublishError>;

    /// Commit the staged changes
    fn commit(&self, message: &str) -> Result<(), PublishError>;

    /// Push `branch` to `remote`
    fn push(&self, remote: &str, branch: &str) -> Result<(), PublishError>;
}

/// Default publisher implementation shelling out to `git`
#[derive(Debug, Clone)]
pub struct GitPublisher {
    repo_dir: PathBuf,
    program: String,
}

impl GitPublisher {
    /// Create a publisher operating on the repository at `repo_dir`
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            program: "git".to_string(),
        }
    }

    /// Use a different executable instead of `git`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn run<I, S>(&self, args: I) -> Result<(), PublishError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args.into_iter().map(|arg| arg.as_ref().to_owned()).collect();
        let command = std::iter::once(self.program.clone())
            .chain(args.iter().map(|arg| arg.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ");

        debug!(%command, dir = %self.repo_dir.display(), "running");

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.repo_dir)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PublishError::CommandNotFound(self.program.clone())
                } else {
                    PublishError::SpawnFailed {
                        command: command.clone(),
                        source: e,
                    }
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stderr = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            return Err(PublishError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(())
    }
}

impl Publisher for GitPublisher {
    fn stage_all(&self) -> Result<(), PublishError> {
        self.run(["add", "-A"])
    }

    fn commit(&self, message: &str) -> Result<(), PublishError> {
        self.run(["commit", "-m", message])
    }

    fn push(&self, remote: &str, branch: &str) -> Result<(), PublishError> {
        self.run(["push", remote, branch])
    }
}

/// Stage, commit and push, stopping at the first failing step
///
/// Local state (feed file, moved media) is never touched here, so a
/// failure leaves everything ready for the next attempt.
pub fn publish_changes<P: Publisher + ?Sized>(
    publisher: &P,
    options: &PublishOptions,
    reporter: &SharedProgressReporter,
) -> Result<(), PublishError> {
    let result = (|| {
        reporter.report(ProgressEvent::PublishStep {
            description: "Staging all changes".to_string(),
        });
        publisher.stage_all()?;

        reporter.report(ProgressEvent::PublishStep {
            description: "Committing".to_string(),
        });
        publisher.commit(&options.commit_message)?;

        reporter.report(ProgressEvent::PublishStep {
            description: format!("Pushing to {}/{}", options.remote, options.branch),
        });
        publisher.push(&options.remote, &options.branch)
    })();

    match &result {
        Ok(()) => reporter.report(ProgressEvent::PublishCompleted),
        Err(e) => reporter.report(ProgressEvent::PublishFailed {
            error: e.to_string(),
        }),
    }

    result
}
