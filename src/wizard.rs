//! The three-step journaling flow: pick a mood, answer the prompt, then review
//! the quote, optionally breathe, and save.
//!
//! Every pass from mood selection to save (or abandonment) is a session with
//! its own id. Quote fetches are spawned tagged with that id, and a completion
//! for any other session is dropped instead of being written into the draft.

use crate::breathing::{BreathPhase, BreathTick, BreathingTimer};
use crate::errors::{FetchError, WizardError};
use crate::journal_entry::{JournalEntry, Mood};
use crate::journal_state::Journal;
use crate::quote::{Quote, QuoteService};
use chrono::Local;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    SelectMood,
    AnswerPrompt,
    ReviewAndSave,
}

impl Step {
    pub fn number(self) -> u8 {
        match self {
            Step::SelectMood => 1,
            Step::AnswerPrompt => 2,
            Step::ReviewAndSave => 3,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::SelectMood => f.write_str("mood selection"),
            Step::AnswerPrompt => f.write_str("the prompt"),
            Step::ReviewAndSave => f.write_str("review"),
        }
    }
}

/// The in-progress entry. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub mood: Option<Mood>,
    pub answer: String,
    pub quote: Option<String>,
    pub author: Option<String>,
    pub awaiting_breathing_choice: bool,
}

/// Completion of a quote fetch, tagged with the session that issued it.
#[derive(Debug)]
pub struct QuoteResolved {
    pub session: u64,
    pub result: Result<Quote, FetchError>,
}

/// Receiving ends of the wizard's background work, drained by the event loop.
pub struct WizardEvents {
    pub quotes: mpsc::UnboundedReceiver<QuoteResolved>,
    pub breaths: mpsc::UnboundedReceiver<BreathTick>,
}

pub struct Wizard {
    step: Step,
    draft: Draft,
    session: u64,
    breathing: BreathingTimer,
    quotes: Arc<dyn QuoteService>,
    quote_tx: mpsc::UnboundedSender<QuoteResolved>,
    pending_fetch: Option<AbortHandle>,
    date_format: String,
}

impl Wizard {
    pub fn new(
        quotes: Arc<dyn QuoteService>,
        breath_interval: Duration,
        date_format: impl Into<String>,
    ) -> (Self, WizardEvents) {
        let (quote_tx, quote_rx) = mpsc::unbounded_channel();
        let (breathing, breath_rx) = BreathingTimer::new(breath_interval);
        let wizard = Wizard {
            step: Step::SelectMood,
            draft: Draft::default(),
            session: 0,
            breathing,
            quotes,
            quote_tx,
            pending_fetch: None,
            date_format: date_format.into(),
        };
        let events = WizardEvents {
            quotes: quote_rx,
            breaths: breath_rx,
        };
        (wizard, events)
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    #[cfg(test)]
    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn breathing_active(&self) -> bool {
        self.breathing.is_active()
    }

    pub fn breath_phase(&self) -> BreathPhase {
        self.breathing.phase()
    }

    /// Starts a new session with `mood`. Any session already in progress is
    /// abandoned first.
    pub fn select_mood(&mut self, mood: Mood) {
        if self.step != Step::SelectMood {
            self.abandon();
        }
        self.session += 1;
        self.draft = Draft {
            mood: Some(mood),
            ..Draft::default()
        };
        self.step = Step::AnswerPrompt;
        info!(session = self.session, %mood, "mood selected");
    }

    /// Stores the answer and fires the quote fetch. Blank text is refused
    /// without any side effect.
    pub fn submit_answer(&mut self, text: &str) -> Result<(), WizardError> {
        self.expect_step(Step::AnswerPrompt)?;
        if text.trim().is_empty() {
            debug!(session = self.session, "blank answer rejected");
            return Err(WizardError::BlankAnswer);
        }

        self.draft.answer = text.to_string();
        self.draft.awaiting_breathing_choice = true;
        self.step = Step::ReviewAndSave;
        self.spawn_quote_fetch();
        info!(session = self.session, chars = text.chars().count(), "answer submitted");
        Ok(())
    }

    fn spawn_quote_fetch(&mut self) {
        let session = self.session;
        let quotes = Arc::clone(&self.quotes);
        let tx = self.quote_tx.clone();
        let handle = tokio::spawn(async move {
            let result = quotes.fetch_random_quote().await;
            // The receiver only goes away on shutdown.
            let _ = tx.send(QuoteResolved { session, result });
        });
        self.pending_fetch = Some(handle.abort_handle());
    }

    /// Writes a fetch result into the draft if it belongs to the live session.
    /// Returns whether it was applied.
    pub fn apply_quote(&mut self, resolved: QuoteResolved) -> bool {
        if resolved.session != self.session || self.step != Step::ReviewAndSave {
            debug!(
                stale = resolved.session,
                current = self.session,
                "discarding quote for a finished session"
            );
            return false;
        }
        self.pending_fetch = None;

        let quote = match resolved.result {
            Ok(quote) => quote,
            Err(FetchError::Network(reason)) => {
                warn!(session = self.session, %reason, "quote service unreachable, using fallback");
                Quote::fallback()
            }
            Err(FetchError::Parse(reason)) => {
                warn!(session = self.session, %reason, "quote response unreadable, using fallback");
                Quote::fallback()
            }
        };
        self.draft.quote = Some(quote.quote);
        self.draft.author = Some(quote.author);
        true
    }

    /// Resolves the breathing prompt. Ignored once the choice has been made.
    pub fn choose_breathing(&mut self, breathe: bool) -> bool {
        if self.step != Step::ReviewAndSave || !self.draft.awaiting_breathing_choice {
            return false;
        }
        self.draft.awaiting_breathing_choice = false;
        if breathe {
            self.breathing.start();
        }
        info!(session = self.session, breathe, "breathing choice made");
        true
    }

    pub fn stop_breathing(&mut self) {
        self.breathing.stop();
    }

    pub fn on_breath_tick(&mut self, tick: BreathTick) -> Option<BreathPhase> {
        self.breathing.on_tick(tick)
    }

    /// Turns the draft into an entry, prepends it to `journal` and resets.
    pub fn save(&mut self, journal: &mut Journal) -> Result<(), WizardError> {
        self.expect_step(Step::ReviewAndSave)?;
        if self.draft.awaiting_breathing_choice {
            return Err(WizardError::BreathingChoicePending);
        }
        if self.breathing.is_active() {
            return Err(WizardError::BreathingActive);
        }
        let Some(mood) = self.draft.mood else {
            return Err(WizardError::OutOfStep {
                expected: Step::ReviewAndSave,
                actual: Step::SelectMood,
            });
        };

        let draft = std::mem::take(&mut self.draft);
        let entry = JournalEntry::new(
            mood,
            draft.answer,
            draft.quote.unwrap_or_default(),
            draft.author.unwrap_or_default(),
            Local::now().format(&self.date_format).to_string(),
        );
        info!(session = self.session, %mood, date = %entry.date, "entry saved");
        journal.add_entry(entry);
        self.reset();
        Ok(())
    }

    /// Drops the current session: stops breathing, cancels the fetch and
    /// returns to mood selection.
    pub fn abandon(&mut self) {
        if self.step != Step::SelectMood {
            info!(session = self.session, step = self.step.number(), "session abandoned");
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.breathing.stop();
        if let Some(fetch) = self.pending_fetch.take() {
            fetch.abort();
        }
        // Late completions must not match the next session.
        self.session += 1;
        self.draft = Draft::default();
        self.step = Step::SelectMood;
    }

    fn expect_step(&self, expected: Step) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::OutOfStep {
                expected,
                actual: self.step,
            })
        }
    }
}
