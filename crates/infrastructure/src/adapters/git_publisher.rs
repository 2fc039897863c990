//! Git publisher - Implements PublisherPort by shelling out to `git`
//!
//! Sequence per run: checkout branch, pull, stage every generated file of
//! the location, commit `<stem> Forecast Update`, push.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Output;

use application::error::ApplicationError;
use application::ports::PublisherPort;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Commit message for a location's update
#[must_use]
pub fn commit_message(file_stem: &str) -> String {
    format!("{file_stem} Forecast Update")
}

/// Publishes generated files to a git remote
#[derive(Debug, Clone)]
pub struct GitPublisher {
    repository: PathBuf,
    output_directory: PathBuf,
    remote: String,
    branch: String,
    program: String,
}

impl GitPublisher {
    /// Create a publisher for the working tree at `repository`
    pub fn new(
        repository: impl Into<PathBuf>,
        output_directory: impl Into<PathBuf>,
        remote: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            output_directory: output_directory.into(),
            remote: remote.into(),
            branch: branch.into(),
            program: "git".to_string(),
        }
    }

    /// Use another git executable
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Files in the output directory whose name starts with `file_stem`, sorted
    ///
    /// # Errors
    ///
    /// Returns `Publishing` if the directory cannot be read.
    pub async fn matching_files(&self, file_stem: &str) -> Result<Vec<PathBuf>, ApplicationError> {
        let mut entries = tokio::fs::read_dir(&self.output_directory)
            .await
            .map_err(|e| {
                ApplicationError::Publishing(format!("{}: {e}", self.output_directory.display()))
            })?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ApplicationError::Publishing(e.to_string()))?
        {
            let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
            if is_file && entry.file_name().to_string_lossy().starts_with(file_stem) {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    async fn run<I, S>(&self, args: I) -> Result<Output, ApplicationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let command_line = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ");
        debug!(command = %command_line, "Running git");

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.repository)
            .output()
            .await
            .map_err(|e| {
                ApplicationError::Publishing(format!("{} {command_line}: {e}", self.program))
            })?;

        if output.status.success() {
            Ok(output)
        } else {
            Err(ApplicationError::Publishing(format!(
                "{} {command_line} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }

    async fn has_staged_changes(&self) -> Result<bool, ApplicationError> {
        let status = Command::new(&self.program)
            .args(["diff", "--cached", "--quiet"])
            .current_dir(&self.repository)
            .status()
            .await
            .map_err(|e| ApplicationError::Publishing(e.to_string()))?;
        Ok(!status.success())
    }

    fn repository_path<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.repository).unwrap_or(path)
    }
}

#[async_trait]
impl PublisherPort for GitPublisher {
    #[instrument(skip(self), fields(remote = %self.remote, branch = %self.branch))]
    async fn publish(&self, file_stem: &str) -> Result<(), ApplicationError> {
        self.run(["checkout", self.branch.as_str()]).await?;
        self.run(["pull", self.remote.as_str(), self.branch.as_str()])
            .await?;

        let files = self.matching_files(file_stem).await?;
        if files.is_empty() {
            return Err(ApplicationError::Publishing(format!(
                "no generated files start with {file_stem}"
            )));
        }
        let mut add: Vec<OsString> = vec!["add".into(), "--".into()];
        add.extend(
            files
                .iter()
                .map(|f| self.repository_path(f).as_os_str().to_os_string()),
        );
        self.run(add).await?;

        if !self.has_staged_changes().await? {
            info!(files = files.len(), "Generated files unchanged, nothing to publish");
            return Ok(());
        }

        self.run(["commit", "-m", commit_message(file_stem).as_str()])
            .await?;
        self.run(["push", self.remote.as_str(), self.branch.as_str()])
            .await?;

        info!(files = files.len(), "Forecast published");
        Ok(())
    }
}
