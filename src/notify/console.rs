use crate::decision::{Resolution, WindowHandle, WindowOutcome};
use crate::notify::{DecisionPrompt, Notification, Notifier, PromptRequest};
use std::io::BufRead;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Prints notifications to the terminal
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::VoteSubmitted { segment, upvote } => {
                let kind = if upvote { "upvote" } else { "report" };
                println!("[sponsorskip] {} submitted for {}", kind, segment);
            }
            Notification::VoteFailed { segment, reason } => {
                println!("[sponsorskip] failed to vote on {}: {}", segment, reason);
            }
        }
    }
}

/// Terminal prompt: `u` + Enter undoes the last skip, `r` + Enter reports it
pub struct ConsolePrompt {
    current: Arc<Mutex<Option<WindowHandle>>>,
}

impl ConsolePrompt {
    /// Create the prompt and start listening on stdin
    ///
    /// Input is read on a detached thread so a pending read never holds up
    /// shutdown.
    pub fn spawn() -> Arc<Self> {
        let prompt = Arc::new(Self {
            current: Arc::new(Mutex::new(None)),
        });

        let current = prompt.current.clone();
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                let handle = current.lock().unwrap_or_else(|p| p.into_inner()).clone();
                let Some(handle) = handle else {
                    continue;
                };

                let accepted = match line.trim() {
                    "u" | "undo" => handle.undo(),
                    "r" | "report" => handle.report(),
                    other => {
                        debug!("ignoring console input {:?}", other);
                        continue;
                    }
                };

                if !accepted {
                    println!("[sponsorskip] too late, the skip was already {}", settled(handle.outcome()));
                }
            }
        });

        prompt
    }
}

fn settled(outcome: WindowOutcome) -> &'static str {
    match outcome {
        WindowOutcome::Resolved(Resolution::Undo) => "undone",
        WindowOutcome::Resolved(Resolution::Report) => "reported",
        WindowOutcome::Resolved(Resolution::Expire) => "confirmed",
        WindowOutcome::Open | WindowOutcome::Cancelled => "closed",
    }
}

impl DecisionPrompt for ConsolePrompt {
    fn show(&self, request: PromptRequest) {
        println!(
            "[sponsorskip] skipped {} - type 'u' to undo or 'r' to report ({}s)",
            request.segment,
            request.deadline.as_secs()
        );
        *self.current.lock().unwrap_or_else(|p| p.into_inner()) = Some(request.handle);
    }
}
