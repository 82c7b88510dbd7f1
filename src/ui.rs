use crate::app::{App, Intent};
use crate::journal_entry::{JournalEntry, Mood};
use crate::wizard::Step;
use color_eyre::Result;
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{stdout, Stdout};
use unicode_width::UnicodeWidthStr;

pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl UI {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(UI { terminal })
    }

    pub fn display(&mut self, app: &App) -> Result<()> {
        self.terminal.draw(|f| draw(f, app))?;
        Ok(())
    }
}

impl Drop for UI {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(9),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new("🌟 Daily Mood Tracker")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    draw_wizard(f, app, chunks[1]);
    draw_entries(f, app.journal.get_entries(), chunks[2]);

    let controls = Paragraph::new(controls_line(app))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);
    f.render_widget(controls, chunks[3]);
}

fn draw_wizard(f: &mut Frame, app: &App, area: Rect) {
    let wizard = &app.wizard;
    let step = wizard.step();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Step {} of 3", step.number()));

    let mut lines = Vec::new();
    match step {
        Step::SelectMood => {
            lines.push(Line::from("How are you feeling today?"));
            lines.push(Line::from(
                Mood::ALL
                    .iter()
                    .enumerate()
                    .map(|(i, mood)| Span::raw(format!("[{}] {} {}   ", i + 1, mood.emoji(), mood)))
                    .collect::<Vec<_>>(),
            ));
        }
        Step::AnswerPrompt => {
            if let Some(mood) = wizard.draft().mood {
                lines.push(Line::from(format!("Feeling {} {}", mood.emoji(), mood)));
            }
            lines.push(Line::from("Write something about your day..."));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("> {}", app.input),
                Style::default().add_modifier(Modifier::BOLD),
            )));
        }
        Step::ReviewAndSave => {
            let draft = wizard.draft();
            match draft.quote.as_deref() {
                Some(quote) => {
                    let mut spans = vec![Span::styled(
                        format!("“{}”", quote),
                        Style::default().add_modifier(Modifier::ITALIC),
                    )];
                    if let Some(author) = draft.author.as_deref().filter(|a| !a.is_empty()) {
                        spans.push(Span::raw(format!(" — {}", author)));
                    }
                    lines.push(Line::from(spans));
                }
                None => lines.push(Line::from("Finding a quote for you...")),
            }
            lines.push(Line::from(""));
            if draft.awaiting_breathing_choice {
                lines.push(Line::from("Would you like a short breathing exercise? (y/n)"));
            } else if wizard.breathing_active() {
                lines.push(Line::from(Span::styled(
                    wizard.breath_phase().to_string(),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )));
            } else {
                lines.push(Line::from("Ready to save your entry."));
            }
        }
    }

    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);

    if step == Step::AnswerPrompt {
        let prompt_row = if wizard.draft().mood.is_some() { 3 } else { 2 };
        if let Some(position) = answer_cursor(area, prompt_row, &app.input) {
            f.set_cursor_position(position);
        }
    }
}

/// Cursor just past the typed answer, or `None` once it runs off the panel.
fn answer_cursor(area: Rect, prompt_row: u16, input: &str) -> Option<(u16, u16)> {
    let column = u16::try_from(input.width())
        .unwrap_or(u16::MAX)
        .saturating_add(2);
    let inner_width = area.width.saturating_sub(2);
    (column < inner_width).then(|| {
        (
            area.x.saturating_add(1).saturating_add(column),
            area.y.saturating_add(1).saturating_add(prompt_row),
        )
    })
}

fn draw_entries(f: &mut Frame, entries: &[JournalEntry], area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Entries");

    if entries.is_empty() {
        let empty = Paragraph::new("No entries yet. Start today!")
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = entries.iter().map(entry_item).collect();
    f.render_widget(List::new(items).block(block), area);
}

fn entry_item(entry: &JournalEntry) -> ListItem<'static> {
    let mut quote = vec![Span::styled(
        format!("“{}”", entry.quote),
        Style::default().add_modifier(Modifier::ITALIC),
    )];
    if !entry.author.is_empty() {
        quote.push(Span::raw(format!(" — {}", entry.author)));
    }

    ListItem::new(vec![
        Line::from(quote),
        Line::from(Span::raw(entry.text.lines().next().unwrap_or("").to_string())),
        Line::from(Span::styled(
            format!("{} {} — {}", entry.mood.emoji(), entry.mood, entry.date),
            Style::default().fg(mood_color(entry.mood)),
        )),
        Line::from(""),
    ])
}

fn mood_color(mood: Mood) -> Color {
    match mood {
        Mood::Happy => Color::Green,
        Mood::Neutral => Color::Gray,
        Mood::Sad => Color::Blue,
    }
}

fn controls_line(app: &App) -> Line<'static> {
    let key = |k: &'static str| Span::styled(k, Style::default().add_modifier(Modifier::BOLD));
    let wizard = &app.wizard;
    match wizard.step() {
        Step::SelectMood => Line::from(vec![
            Span::raw("Press "),
            key("1-3"),
            Span::raw(" to pick a mood, "),
            key("q"),
            Span::raw(" to quit"),
        ]),
        Step::AnswerPrompt => Line::from(vec![
            key("Enter"),
            Span::raw(": continue, "),
            key("Esc"),
            Span::raw(": start over"),
        ]),
        Step::ReviewAndSave if wizard.draft().awaiting_breathing_choice => Line::from(vec![
            key("y"),
            Span::raw("/"),
            key("n"),
            Span::raw(": breathing exercise, "),
            key("Esc"),
            Span::raw(": start over"),
        ]),
        Step::ReviewAndSave if wizard.breathing_active() => Line::from(vec![
            key("x"),
            Span::raw(": stop breathing, "),
            key("Esc"),
            Span::raw(": start over"),
        ]),
        Step::ReviewAndSave => Line::from(vec![
            key("Enter"),
            Span::raw(": save entry, "),
            key("Esc"),
            Span::raw(": start over"),
        ]),
    }
}

/// Maps a key press to an intent for the current wizard state.
pub fn intent_for_key(app: &App, key: KeyEvent) -> Option<Intent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Intent::Quit);
    }
    // Other Ctrl/Alt chords are never typed or treated as shortcuts.
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        && matches!(key.code, KeyCode::Char(_))
    {
        return None;
    }

    let wizard = &app.wizard;
    match wizard.step() {
        Step::SelectMood => match key.code {
            KeyCode::Char('1') | KeyCode::Char('h') => Some(Intent::SelectMood(Mood::Happy)),
            KeyCode::Char('2') | KeyCode::Char('n') => Some(Intent::SelectMood(Mood::Neutral)),
            KeyCode::Char('3') | KeyCode::Char('s') => Some(Intent::SelectMood(Mood::Sad)),
            KeyCode::Char('q') => Some(Intent::Quit),
            _ => None,
        },
        Step::AnswerPrompt => match key.code {
            KeyCode::Enter => Some(Intent::SubmitAnswer),
            KeyCode::Backspace => Some(Intent::Backspace),
            KeyCode::Esc => Some(Intent::Abandon),
            KeyCode::Char(c) => Some(Intent::Type(c)),
            _ => None,
        },
        Step::ReviewAndSave => match key.code {
            KeyCode::Esc => Some(Intent::Abandon),
            KeyCode::Char('y') if wizard.draft().awaiting_breathing_choice => {
                Some(Intent::ChooseBreathing(true))
            }
            KeyCode::Char('n') if wizard.draft().awaiting_breathing_choice => {
                Some(Intent::ChooseBreathing(false))
            }
            KeyCode::Char('x') if wizard.breathing_active() => Some(Intent::StopBreathing),
            KeyCode::Enter | KeyCode::Char('s') => Some(Intent::Save),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn mood_keys_map_on_first_step() {
        let (app, _events, _store) = test_app();

        assert_eq!(
            intent_for_key(&app, press(KeyCode::Char('1'))),
            Some(Intent::SelectMood(Mood::Happy))
        );
        assert_eq!(
            intent_for_key(&app, press(KeyCode::Char('n'))),
            Some(Intent::SelectMood(Mood::Neutral))
        );
        assert_eq!(
            intent_for_key(&app, press(KeyCode::Char('3'))),
            Some(Intent::SelectMood(Mood::Sad))
        );
        assert_eq!(intent_for_key(&app, press(KeyCode::Char('q'))), Some(Intent::Quit));
        assert_eq!(intent_for_key(&app, press(KeyCode::Char('z'))), None);
        assert_eq!(intent_for_key(&app, press(KeyCode::Esc)), None);
    }

    #[tokio::test]
    async fn chorded_letters_are_not_typed() {
        let (mut app, _events, _store) = test_app();
        app.handle_intent(Intent::SelectMood(Mood::Happy));

        let ctrl_w = KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL);
        let alt_b = KeyEvent::new(KeyCode::Char('b'), KeyModifiers::ALT);
        assert_eq!(intent_for_key(&app, ctrl_w), None);
        assert_eq!(intent_for_key(&app, alt_b), None);

        let shifted = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(intent_for_key(&app, shifted), Some(Intent::Type('A')));
    }

    #[test]
    fn cursor_follows_answer_until_panel_edge() {
        let area = Rect::new(0, 0, 40, 9);

        assert_eq!(answer_cursor(area, 3, "hi"), Some((5, 4)));
        assert_eq!(answer_cursor(area, 3, &"x".repeat(35)), Some((38, 4)));
        assert_eq!(answer_cursor(area, 3, &"x".repeat(36)), None);
    }

    #[test]
    fn very_long_answer_hides_cursor() {
        let area = Rect::new(0, 0, u16::MAX, 9);
        let long = "x".repeat(usize::from(u16::MAX) + 10);

        assert_eq!(answer_cursor(area, 3, &long), None);
    }

    #[tokio::test]
    async fn letters_are_typed_while_answering() {
        let (mut app, _events, _store) = test_app();
        app.handle_intent(Intent::SelectMood(Mood::Happy));

        assert_eq!(
            intent_for_key(&app, press(KeyCode::Char('q'))),
            Some(Intent::Type('q'))
        );
        assert_eq!(intent_for_key(&app, press(KeyCode::Enter)), Some(Intent::SubmitAnswer));
        assert_eq!(intent_for_key(&app, press(KeyCode::Esc)), Some(Intent::Abandon));
    }

    #[tokio::test]
    async fn review_keys_follow_breathing_state() {
        let (mut app, _events, _store) = test_app();
        app.handle_intent(Intent::SelectMood(Mood::Happy));
        "calm".chars().for_each(|c| app.handle_intent(Intent::Type(c)));
        app.handle_intent(Intent::SubmitAnswer);

        assert_eq!(
            intent_for_key(&app, press(KeyCode::Char('y'))),
            Some(Intent::ChooseBreathing(true))
        );
        assert_eq!(intent_for_key(&app, press(KeyCode::Char('x'))), None);

        app.handle_intent(Intent::ChooseBreathing(true));

        assert_eq!(intent_for_key(&app, press(KeyCode::Char('y'))), None);
        assert_eq!(
            intent_for_key(&app, press(KeyCode::Char('x'))),
            Some(Intent::StopBreathing)
        );
    }

    #[tokio::test]
    async fn ctrl_c_quits_from_any_step() {
        let (mut app, _events, _store) = test_app();
        app.handle_intent(Intent::SelectMood(Mood::Sad));

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(intent_for_key(&app, ctrl_c), Some(Intent::Quit));
    }
}
