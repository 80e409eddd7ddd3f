//! Terminal-backed review gate and console progress reporting.

use std::sync::Mutex;
use std::time::Duration;

use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};

use mergeresolve_core::engine::{EventSink, FileStatus, ResolveEvent};
use mergeresolve_core::session::{ReviewCommand, ReviewGate, ReviewPrompt};

use crate::style;

// ---------------------------------------------------------------------------
// Review gate
// ---------------------------------------------------------------------------

/// Blocking terminal gate: renders both sides of the conflict plus the
/// suggestion, then reads one command.
pub struct TerminalGate;

impl ReviewGate for TerminalGate {
    fn review(&mut self, prompt: &ReviewPrompt<'_>) -> ReviewCommand {
        println!();
        println!(
            "{}",
            style::header(&format!(
                "{} — conflict {}/{}",
                prompt.file.display(),
                prompt.hunk_index + 1,
                prompt.hunk_count
            ))
        );
        println!();
        print_block(&style::ours_label(), &prompt.hunk.head_text);
        print_block(&style::theirs_label(), &prompt.hunk.incoming_text);
        print_block(&style::suggestion_label(), prompt.suggestion);

        let answer: Result<String, _> = Input::new()
            .with_prompt("Accept suggestion? [y]es/[n]o/[s]kip/[q]uit")
            .allow_empty(true)
            .interact_text();
        match answer {
            Ok(input) => ReviewCommand::from_input(&input),
            // A closed or non-interactive terminal counts as a quit.
            Err(_) => ReviewCommand::Quit,
        }
    }
}

fn print_block(label: &str, text: &str) {
    println!("{label}");
    if text.is_empty() {
        println!("  {}", style::dim("(empty)"));
    } else {
        for line in text.lines() {
            println!("  {line}");
        }
    }
    println!();
}

// ---------------------------------------------------------------------------
// Console sink
// ---------------------------------------------------------------------------

/// Renders engine events on the console. In non-interactive runs a spinner
/// covers each in-flight provider request; interactive runs skip it so the
/// prompt owns the terminal.
pub struct ConsoleSink {
    spinner: Mutex<Option<ProgressBar>>,
    interactive: bool,
}

impl ConsoleSink {
    pub fn new(interactive: bool) -> Self {
        Self {
            spinner: Mutex::new(None),
            interactive,
        }
    }

    fn clear_spinner(&self) {
        if let Some(spinner) = self.spinner.lock().unwrap().take() {
            spinner.finish_and_clear();
        }
    }
}

impl EventSink for ConsoleSink {
    fn on_event(&self, event: &ResolveEvent<'_>) {
        match event {
            ResolveEvent::FileStarted { path, hunks } => {
                self.clear_spinner();
                let plural = if *hunks == 1 { "" } else { "s" };
                println!(
                    "{}",
                    style::header(&format!("{} ({} conflict{plural})", path.display(), hunks))
                );
            }
            ResolveEvent::SuggestionRequested {
                hunk_index,
                hunk_count,
                ..
            } => {
                if self.interactive {
                    return;
                }
                self.clear_spinner();
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(
                    ProgressStyle::with_template("{spinner:.blue} {msg}")
                        .unwrap()
                        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
                );
                spinner.set_message(format!(
                    "Resolving conflict {}/{}...",
                    hunk_index + 1,
                    hunk_count
                ));
                spinner.enable_steady_tick(Duration::from_millis(100));
                *self.spinner.lock().unwrap() = Some(spinner);
            }
            ResolveEvent::FileFinished(report) => {
                self.clear_spinner();
                let path = report.path.display();
                match report.status {
                    FileStatus::Resolved => {
                        let plural = if report.hunks == 1 { "" } else { "s" };
                        println!(
                            "{}",
                            style::success(&format!(
                                "{path} — {} conflict{plural} resolved",
                                report.hunks
                            ))
                        );
                    }
                    FileStatus::NoConflicts => {
                        println!("{}", style::dim(&format!("{path} — no conflict markers")));
                    }
                    FileStatus::Failed => {
                        let detail = report.error.as_deref().unwrap_or("unknown error");
                        println!("{}", style::error(&format!("{path} — {detail}")));
                    }
                    FileStatus::Aborted => {
                        println!("{}", style::warn(&format!("{path} — aborted, file unchanged")));
                    }
                }
            }
        }
    }
}
