//! Batch resolution engine.
//!
//! Processes target files strictly sequentially; within a file, hunks are
//! resolved one at a time in document order. That ordering is load-bearing:
//! interactive prompts must appear in hunk order, and a quit must stop
//! before any further provider calls are issued.
//!
//! The rewritten content is computed fully in memory and written once per
//! file, after the backup, so a target is always either fully original or
//! fully rewritten on disk.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::backup::BackupManager;
use crate::conflict::{ConflictParser, Resolution, ResolutionApplier};
use crate::errors::CoreError;
use crate::provider::ResolutionProvider;
use crate::session::{InteractiveSession, ReviewGate, ReviewPrompt, SessionState};

// ---------------------------------------------------------------------------
// Reports and events
// ---------------------------------------------------------------------------

/// Outcome of processing one target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Resolutions were applied and the file was rewritten.
    Resolved,
    /// The file parsed to zero hunks; nothing was written.
    NoConflicts,
    /// A file-scoped fault; the batch continued with the next file.
    Failed,
    /// The operator quit during review; the file was left unmodified.
    Aborted,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolved => write!(f, "resolved"),
            Self::NoConflicts => write!(f, "no_conflicts"),
            Self::Failed => write!(f, "failed"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Per-file result record.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
    /// Hunks found in the file (zero for unreadable files).
    pub hunks: usize,
    /// The fault message for `Failed` outcomes.
    pub error: Option<String>,
}

/// Result of one batch invocation.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// One report per processed file, in processing order. Shorter than
    /// `total` when the batch was aborted.
    pub files: Vec<FileReport>,
    /// Files actually rewritten.
    pub changed: usize,
    /// Files targeted.
    pub total: usize,
    /// Whether the operator quit mid-batch.
    pub aborted: bool,
}

/// Structured progress events; all formatting is the sink owner's job.
#[derive(Debug)]
pub enum ResolveEvent<'a> {
    FileStarted { path: &'a Path, hunks: usize },
    SuggestionRequested {
        path: &'a Path,
        hunk_index: usize,
        hunk_count: usize,
    },
    FileFinished(&'a FileReport),
}

/// Caller-owned sink for progress events.
pub trait EventSink {
    fn on_event(&self, event: &ResolveEvent<'_>);
}

/// Sink that drops every event; used by tests and headless callers.
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&self, _event: &ResolveEvent<'_>) {}
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Sequential file-by-file resolution driver.
pub struct ResolveEngine<'a, P: ResolutionProvider> {
    provider: &'a P,
    sink: &'a dyn EventSink,
}

impl<'a, P: ResolutionProvider> ResolveEngine<'a, P> {
    pub fn new(provider: &'a P, sink: &'a dyn EventSink) -> Self {
        Self { provider, sink }
    }

    /// Process a batch of target files. When `gate` is supplied, every
    /// hunk goes through interactive review.
    ///
    /// Per-file faults are converted into `Failed` reports and the batch
    /// continues; only an operator quit stops it, leaving the in-progress
    /// file unmodified and later files unprocessed.
    pub async fn run(
        &self,
        targets: &[PathBuf],
        mut gate: Option<&mut dyn ReviewGate>,
    ) -> BatchReport {
        info!(total = targets.len(), "starting resolution batch");
        let mut files = Vec::with_capacity(targets.len());
        let mut aborted = false;

        for path in targets {
            let report = self
                .resolve_file(path, gate.as_deref_mut())
                .await;
            self.sink.on_event(&ResolveEvent::FileFinished(&report));
            let stop = report.status == FileStatus::Aborted;
            files.push(report);
            if stop {
                aborted = true;
                break;
            }
        }

        let changed = files
            .iter()
            .filter(|f| f.status == FileStatus::Resolved)
            .count();
        info!(changed, total = targets.len(), aborted, "batch finished");
        BatchReport {
            files,
            changed,
            total: targets.len(),
            aborted,
        }
    }

    /// Process one file, converting file-scoped faults into a report.
    async fn resolve_file(&self, path: &Path, gate: Option<&mut (dyn ReviewGate + '_)>) -> FileReport {
        match self.try_resolve_file(path, gate).await {
            Ok(report) => report,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "file failed");
                FileReport {
                    path: path.to_path_buf(),
                    status: FileStatus::Failed,
                    hunks: 0,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn try_resolve_file(
        &self,
        path: &Path,
        mut gate: Option<&mut (dyn ReviewGate + '_)>,
    ) -> Result<FileReport, CoreError> {
        let content = std::fs::read_to_string(path)?;
        let parsed = ConflictParser::parse(&content);

        if parsed.hunks.is_empty() {
            debug!(path = %path.display(), "no conflicts");
            return Ok(FileReport {
                path: path.to_path_buf(),
                status: FileStatus::NoConflicts,
                hunks: 0,
                error: None,
            });
        }

        let hunk_count = parsed.hunks.len();
        self.sink.on_event(&ResolveEvent::FileStarted {
            path,
            hunks: hunk_count,
        });

        let mut resolutions = Vec::with_capacity(hunk_count);
        for (hunk_index, hunk) in parsed.hunks.iter().enumerate() {
            self.sink.on_event(&ResolveEvent::SuggestionRequested {
                path,
                hunk_index,
                hunk_count,
            });
            let suggestion = self.provider.resolve(hunk).await?;

            let resolution = match gate.as_mut() {
                None => Resolution::accepted(hunk_index, suggestion),
                Some(gate) => {
                    let prompt = ReviewPrompt {
                        file: path,
                        hunk_index,
                        hunk_count,
                        hunk,
                        suggestion: &suggestion,
                    };
                    match InteractiveSession::run(&mut **gate, &prompt) {
                        SessionState::Accepted => Resolution::accepted(hunk_index, suggestion),
                        SessionState::Remarked { skipped } => {
                            let disposition = if skipped {
                                crate::conflict::Disposition::Skipped
                            } else {
                                crate::conflict::Disposition::Remarked
                            };
                            Resolution::remarked(hunk_index, hunk, disposition)
                        }
                        SessionState::Aborted => {
                            // Discard everything computed for this file and
                            // halt the batch; the file stays untouched.
                            info!(path = %path.display(), "aborted by operator");
                            return Ok(FileReport {
                                path: path.to_path_buf(),
                                status: FileStatus::Aborted,
                                hunks: hunk_count,
                                error: None,
                            });
                        }
                        SessionState::Prompting => unreachable!(),
                    }
                }
            };
            resolutions.push(resolution);
        }

        let new_content = ResolutionApplier::apply(&parsed, &resolutions);
        BackupManager::ensure_backup(path)?;
        std::fs::write(path, new_content)?;

        info!(path = %path.display(), hunks = hunk_count, "file resolved");
        Ok(FileReport {
            path: path.to_path_buf(),
            status: FileStatus::Resolved,
            hunks: hunk_count,
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::fs;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::conflict::ConflictHunk;
    use crate::errors::ProviderError;
    use crate::session::ReviewCommand;

    /// Deterministic provider: returns a fixed reply, or fails after a
    /// configurable number of successes.
    struct StubProvider {
        reply: String,
        fail_after: Option<usize>,
        calls: Mutex<usize>,
    }

    impl StubProvider {
        fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                fail_after: None,
                calls: Mutex::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: String::new(),
                fail_after: Some(0),
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ResolutionProvider for StubProvider {
        async fn resolve(&self, _hunk: &ConflictHunk) -> Result<String, ProviderError> {
            let mut calls = self.calls.lock().unwrap();
            if let Some(limit) = self.fail_after {
                if *calls >= limit {
                    return Err(ProviderError::EmptyResponse);
                }
            }
            *calls += 1;
            Ok(self.reply.clone())
        }
    }

    struct ScriptedGate {
        commands: VecDeque<ReviewCommand>,
    }

    impl ScriptedGate {
        fn new(commands: impl IntoIterator<Item = ReviewCommand>) -> Self {
            Self {
                commands: commands.into_iter().collect(),
            }
        }
    }

    impl ReviewGate for ScriptedGate {
        fn review(&mut self, _prompt: &ReviewPrompt<'_>) -> ReviewCommand {
            self.commands.pop_front().unwrap_or(ReviewCommand::Quit)
        }
    }

    fn conflict_block(head: &str, incoming: &str) -> String {
        format!("<<<<<<< HEAD\n{head}\n=======\n{incoming}\n>>>>>>> theirs")
    }

    fn write_conflicted(dir: &Path, name: &str, hunks: usize) -> PathBuf {
        let mut content = String::from("top");
        for i in 0..hunks {
            content.push_str(&format!(
                "\n{}\nbetween{i}",
                conflict_block(&format!("ours{i}"), &format!("theirs{i}"))
            ));
        }
        let path = dir.join(name);
        fs::write(&path, &content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_example_scenario_non_interactive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.c");
        fs::write(
            &path,
            "header\n<<<<<<< HEAD\nfoo();\n=======\nbar();\n>>>>>>> theirs\nfooter",
        )
        .unwrap();

        let provider = StubProvider::replying("foo(); bar();");
        let engine = ResolveEngine::new(&provider, &NullSink);
        let report = engine.run(std::slice::from_ref(&path), None).await;

        assert_eq!(report.changed, 1);
        assert_eq!(report.total, 1);
        assert!(!report.aborted);
        assert_eq!(report.files[0].status, FileStatus::Resolved);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "header\nfoo(); bar();\nfooter"
        );
        // The backup holds the pre-edit content.
        let backup = BackupManager::backup_path(&path);
        assert!(fs::read_to_string(&backup).unwrap().contains("<<<<<<<"));
    }

    #[tokio::test]
    async fn test_no_conflicts_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.txt");
        fs::write(&path, "nothing to see\n").unwrap();

        let provider = StubProvider::replying("unused");
        let engine = ResolveEngine::new(&provider, &NullSink);
        let report = engine.run(std::slice::from_ref(&path), None).await;

        assert_eq!(report.changed, 0);
        assert_eq!(report.files[0].status, FileStatus::NoConflicts);
        assert_eq!(provider.call_count(), 0);
        assert!(!BackupManager::backup_path(&path).exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "nothing to see\n");
    }

    #[tokio::test]
    async fn test_provider_failure_continues_batch() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write_conflicted(dir.path(), "bad.rs", 1);
        let good = dir.path().join("good.rs");
        fs::write(
            &good,
            "x\n<<<<<<< HEAD\na\n=======\nb\n>>>>>>> theirs\ny",
        )
        .unwrap();

        let provider = StubProvider::failing();
        let engine = ResolveEngine::new(&provider, &NullSink);
        let report = engine.run(&[bad.clone(), good.clone()], None).await;

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.files[0].status, FileStatus::Failed);
        assert!(report.files[0]
            .error
            .as_deref()
            .unwrap()
            .contains("empty resolution"));
        assert_eq!(report.files[1].status, FileStatus::Failed);
        assert!(!report.aborted);
        // Neither file was touched.
        assert!(fs::read_to_string(&bad).unwrap().contains("<<<<<<<"));
        assert!(fs::read_to_string(&good).unwrap().contains("<<<<<<<"));
    }

    #[tokio::test]
    async fn test_unreadable_file_continues_batch() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.rs");
        let good = write_conflicted(dir.path(), "good.rs", 1);

        let provider = StubProvider::replying("R");
        let engine = ResolveEngine::new(&provider, &NullSink);
        let report = engine.run(&[missing, good], None).await;

        assert_eq!(report.files[0].status, FileStatus::Failed);
        assert_eq!(report.files[1].status, FileStatus::Resolved);
        assert_eq!(report.changed, 1);
        assert_eq!(report.total, 2);
    }

    #[tokio::test]
    async fn test_interactive_accept_and_reject() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_conflicted(dir.path(), "mix.rs", 2);

        let provider = StubProvider::replying("merged");
        let engine = ResolveEngine::new(&provider, &NullSink);
        let mut gate = ScriptedGate::new([ReviewCommand::Accept, ReviewCommand::Reject]);
        let report = engine
            .run(std::slice::from_ref(&path), Some(&mut gate))
            .await;

        assert_eq!(report.files[0].status, FileStatus::Resolved);
        let output = fs::read_to_string(&path).unwrap();
        // First hunk accepted, second re-emitted as a conflict.
        assert!(output.contains("merged"));
        assert!(output.contains("<<<<<<< OURS"));
        assert!(output.contains("ours1"));
        assert!(output.contains("theirs1"));

        // The remarked hunk is recoverable by re-parsing.
        let reparsed = ConflictParser::parse(&output);
        assert_eq!(reparsed.hunks.len(), 1);
        assert_eq!(reparsed.hunks[0].head_text, "ours1");
    }

    #[tokio::test]
    async fn test_abort_leaves_file_and_batch_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_conflicted(dir.path(), "first.rs", 3);
        let second = write_conflicted(dir.path(), "second.rs", 1);
        let original_first = fs::read_to_string(&first).unwrap();
        let original_second = fs::read_to_string(&second).unwrap();

        let provider = StubProvider::replying("merged");
        let engine = ResolveEngine::new(&provider, &NullSink);
        // Quit on the second of three hunks.
        let mut gate = ScriptedGate::new([ReviewCommand::Accept, ReviewCommand::Quit]);
        let report = engine.run(&[first.clone(), second.clone()], Some(&mut gate)).await;

        assert!(report.aborted);
        assert_eq!(report.changed, 0);
        assert_eq!(report.total, 2);
        // Only the aborted file appears in the reports.
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].status, FileStatus::Aborted);

        // Zero writes: content and backup state are pristine for both
        // the in-progress file and the never-reached one.
        assert_eq!(fs::read_to_string(&first).unwrap(), original_first);
        assert_eq!(fs::read_to_string(&second).unwrap(), original_second);
        assert!(!BackupManager::backup_path(&first).exists());
        assert!(!BackupManager::backup_path(&second).exists());
        // No provider call is issued after the quit.
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_skip_records_skipped_disposition_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_conflicted(dir.path(), "skip.rs", 1);

        let provider = StubProvider::replying("merged");
        let engine = ResolveEngine::new(&provider, &NullSink);
        let mut gate = ScriptedGate::new([ReviewCommand::Skip]);
        let report = engine
            .run(std::slice::from_ref(&path), Some(&mut gate))
            .await;

        // Skipping still rewrites the file (with the re-emitted block).
        assert_eq!(report.files[0].status, FileStatus::Resolved);
        let output = fs::read_to_string(&path).unwrap();
        assert!(output.contains("<<<<<<< OURS"));
    }

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        struct RecordingSink(Mutex<Vec<String>>);
        impl EventSink for RecordingSink {
            fn on_event(&self, event: &ResolveEvent<'_>) {
                let tag = match event {
                    ResolveEvent::FileStarted { hunks, .. } => format!("start:{hunks}"),
                    ResolveEvent::SuggestionRequested { hunk_index, .. } => {
                        format!("hunk:{hunk_index}")
                    }
                    ResolveEvent::FileFinished(report) => format!("done:{}", report.status),
                };
                self.0.lock().unwrap().push(tag);
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let path = write_conflicted(dir.path(), "ev.rs", 2);

        let provider = StubProvider::replying("R");
        let sink = RecordingSink(Mutex::new(Vec::new()));
        let engine = ResolveEngine::new(&provider, &sink);
        engine.run(std::slice::from_ref(&path), None).await;

        assert_eq!(
            sink.0.lock().unwrap().as_slice(),
            ["start:2", "hunk:0", "hunk:1", "done:resolved"]
        );
    }
}
