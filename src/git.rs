//! Changed-file detection through git.
//!
//! Committed changes come from `git diff --name-only --relative <base> <head>`,
//! uncommitted ones from `git diff --name-only --relative HEAD` plus untracked
//! files. `--relative` keeps every path relative to the project directory,
//! which is also how the dependency graph names modules.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

/// Error type for change detection.
#[derive(Debug, thiserror::Error)]
pub enum ChangeSetError {
    /// git could not be started.
    #[error("Failed to execute git {command}: {source}")]
    Spawn {
        /// The git subcommand line.
        command: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// git exited with a failure status.
    #[error("Error executing Git command `git {command}`: {stderr}")]
    CommandFailed {
        /// The git subcommand line.
        command: String,
        /// Captured stderr, or the exit status when stderr is empty.
        stderr: String,
    },
}

/// What to diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSetRequest {
    /// Base commit or branch.
    pub base: String,
    /// Head commit or branch.
    pub head: String,
    /// Directory git runs in; returned paths are relative to it.
    pub project_dir: PathBuf,
    /// Add uncommitted (staged, unstaged and untracked) changes.
    pub include_uncommitted: bool,
    /// Only report uncommitted changes; `base` and `head` are ignored.
    pub only_uncommitted: bool,
}

impl ChangeSetRequest {
    /// Committed changes between `base` and `HEAD`.
    pub fn new(base: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            head: "HEAD".to_string(),
            project_dir: project_dir.into(),
            include_uncommitted: false,
            only_uncommitted: false,
        }
    }

    /// Set the head reference.
    pub fn with_head(mut self, head: impl Into<String>) -> Self {
        self.head = head.into();
        self
    }

    /// Add uncommitted changes to the committed ones.
    pub fn with_uncommitted(mut self, include: bool) -> Self {
        self.include_uncommitted = include;
        self
    }

    /// Report only uncommitted changes.
    pub fn with_only_uncommitted(mut self, only: bool) -> Self {
        self.only_uncommitted = only;
        self
    }
}

/// Source of changed file paths.
pub trait ChangeSetProvider {
    /// Changed files for `request`, relative to its project directory,
    /// sorted and deduplicated.
    fn changed_files(&self, request: &ChangeSetRequest) -> Result<Vec<String>, ChangeSetError>;
}

/// [`ChangeSetProvider`] running the `git` executable.
#[derive(Debug, Clone)]
pub struct GitChangeSet {
    program: String,
}

impl Default for GitChangeSet {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl GitChangeSet {
    /// Use `git` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    fn run(&self, dir: &Path, args: &[&str]) -> Result<String, ChangeSetError> {
        let command = args.join(" ");
        debug!(dir = %dir.display(), command = %command, "Running git");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|source| ChangeSetError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ChangeSetError::CommandFailed {
                command,
                stderr: if stderr.is_empty() {
                    format!("git exited with {}", output.status)
                } else {
                    stderr
                },
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn committed(&self, request: &ChangeSetRequest) -> Result<Vec<String>, ChangeSetError> {
        let stdout = self.run(
            &request.project_dir,
            &[
                "diff",
                "--name-only",
                "--relative",
                request.base.as_str(),
                request.head.as_str(),
            ],
        )?;
        Ok(parse_name_list(&stdout))
    }

    fn uncommitted(&self, request: &ChangeSetRequest) -> Result<Vec<String>, ChangeSetError> {
        let tracked = self.run(&request.project_dir, &["diff", "--name-only", "--relative", "HEAD"])?;
        let untracked = self.run(
            &request.project_dir,
            &["ls-files", "--others", "--exclude-standard"],
        )?;

        let mut files = parse_name_list(&tracked);
        files.extend(parse_name_list(&untracked));
        Ok(files)
    }
}

impl ChangeSetProvider for GitChangeSet {
    fn changed_files(&self, request: &ChangeSetRequest) -> Result<Vec<String>, ChangeSetError> {
        let mut files: BTreeSet<String> = BTreeSet::new();

        if !request.only_uncommitted {
            files.extend(self.committed(request)?);
        }
        if request.include_uncommitted || request.only_uncommitted {
            files.extend(self.uncommitted(request)?);
        }

        Ok(files.into_iter().collect())
    }
}

/// Split `--name-only` output into paths, dropping blank lines.
pub fn parse_name_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}
