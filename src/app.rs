use crate::journal_entry::Mood;
use crate::journal_state::Journal;
use crate::ui::{self, UI};
use crate::wizard::{Wizard, WizardEvents};
use color_eyre::Result;
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    SelectMood(Mood),
    Type(char),
    Backspace,
    SubmitAnswer,
    ChooseBreathing(bool),
    StopBreathing,
    Save,
    Abandon,
    Quit,
}

pub struct App {
    pub journal: Journal,
    pub wizard: Wizard,
    pub input: String,
    /// Why the last intent was refused, if it was.
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(journal: Journal, wizard: Wizard) -> Self {
        App {
            journal,
            wizard,
            input: String::new(),
            status: None,
            should_quit: false,
        }
    }

    pub fn handle_intent(&mut self, intent: Intent) {
        debug!(?intent, "intent");
        self.status = None;
        match intent {
            Intent::SelectMood(mood) => {
                self.input.clear();
                self.wizard.select_mood(mood);
            }
            Intent::Type(c) => self.input.push(c),
            Intent::Backspace => {
                self.input.pop();
            }
            Intent::SubmitAnswer => match self.wizard.submit_answer(&self.input) {
                Ok(()) => self.input.clear(),
                Err(e) => self.status = Some(e.to_string()),
            },
            Intent::ChooseBreathing(breathe) => {
                self.wizard.choose_breathing(breathe);
            }
            Intent::StopBreathing => self.wizard.stop_breathing(),
            Intent::Save => {
                if let Err(e) = self.wizard.save(&mut self.journal) {
                    self.status = Some(e.to_string());
                }
            }
            Intent::Abandon => {
                self.input.clear();
                self.wizard.abandon();
            }
            Intent::Quit => self.should_quit = true,
        }
    }

    pub async fn run(mut self, ui: &mut UI, mut events: WizardEvents) -> Result<()> {
        let mut input = EventStream::new();
        info!(entries = self.journal.get_entries().len(), "journal ready");

        while !self.should_quit {
            ui.display(&self)?;

            tokio::select! {
                event = input.next() => match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if let Some(intent) = ui::intent_for_key(&self, key) {
                            self.handle_intent(intent);
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                Some(resolved) = events.quotes.recv() => {
                    self.wizard.apply_quote(resolved);
                }
                Some(tick) = events.breaths.recv() => {
                    self.wizard.on_breath_tick(tick);
                }
            }
        }

        self.wizard.abandon();
        info!("exiting");
        Ok(())
    }
}
