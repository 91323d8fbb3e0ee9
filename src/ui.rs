use crate::journal_entry::{day_string, MoodRecord};
use crate::journal_state::{JournalState, LoginFocus, Notice};
use crate::mood::MoodCategory;
use crate::text_field::TextField;
use color_eyre::Result;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{stdout, Stdout};

/// What the terminal produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Key(KeyEvent),
    Redraw,
    Closed,
}

/// Work the main loop has to do against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LoggedIn,
    Save,
    Reload,
    Quit,
}

pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    events: EventStream,
    history: ListState,
}

const NEUTRAL_BACKGROUND: Color = Color::Rgb(0xf0, 0xf0, 0xf0);

/// Background for a history row. Unknown tags get the neutral colour.
pub fn sentiment_color(sentiment: &str) -> Color {
    let Ok(mood) = sentiment.parse::<MoodCategory>() else {
        return NEUTRAL_BACKGROUND;
    };
    match mood {
        MoodCategory::Ecstatic => Color::Rgb(0xff, 0xe6, 0x6d),
        MoodCategory::Happy => Color::Rgb(0xd4, 0xf8, 0xd4),
        MoodCategory::Excited => Color::Rgb(0xc3, 0xe7, 0xff),
        MoodCategory::Calm => Color::Rgb(0xe3, 0xf2, 0xfd),
        MoodCategory::Grateful => Color::Rgb(0xff, 0xf3, 0xcd),
        MoodCategory::Proud => Color::Rgb(0xe0, 0xbb, 0xff),
        MoodCategory::InLove => Color::Rgb(0xff, 0xd6, 0xe7),
        MoodCategory::Hopeful => Color::Rgb(0xd1, 0xf2, 0xeb),
        MoodCategory::Stressed => Color::Rgb(0xff, 0xe0, 0xb2),
        MoodCategory::Anxious => Color::Rgb(0xff, 0xe4, 0xe1),
        MoodCategory::Angry => Color::Rgb(0xff, 0xcd, 0xd2),
        MoodCategory::Frustrated => Color::Rgb(0xff, 0xcc, 0x80),
        MoodCategory::Sad => Color::Rgb(0xf8, 0xd4, 0xd4),
        MoodCategory::Lonely => Color::Rgb(0xe1, 0xbe, 0xe7),
        MoodCategory::Tired => Color::Rgb(0xe0, 0xe0, 0xe0),
        MoodCategory::Bored => Color::Rgb(0xf0, 0xf4, 0xc3),
        MoodCategory::Confused => Color::Rgb(0xe6, 0xee, 0x9c),
        MoodCategory::Afraid => Color::Rgb(0xff, 0xec, 0xb3),
        MoodCategory::Neutral => NEUTRAL_BACKGROUND,
    }
}

fn title(text: &str) -> Paragraph<'_> {
    Paragraph::new(text)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
}

fn controls(pairs: &[(&'static str, &'static str)]) -> Paragraph<'static> {
    let mut spans = vec![Span::raw("Press ")];
    for (i, (key, what)) in pairs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(", "));
        }
        spans.push(Span::styled(*key, Style::default().add_modifier(Modifier::BOLD)));
        spans.push(Span::raw(format!(" to {what}")));
    }
    Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
}

/// Draws `field` inside a bordered box and places the terminal cursor
/// when focused.
fn render_field(
    f: &mut Frame,
    area: Rect,
    label: &str,
    placeholder: &str,
    field: &TextField,
    masked: bool,
    focused: bool,
) {
    let text = if field.is_empty() && !focused {
        Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray))
    } else if masked {
        Span::raw("*".repeat(field.value().chars().count()))
    } else {
        Span::raw(field.value().to_string())
    };

    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let input = Paragraph::new(Line::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(label.to_string()),
    );
    f.render_widget(input, area);

    if focused {
        f.set_cursor_position(cursor_position(area, field, masked));
    }
}

/// Where the terminal cursor sits inside a bordered input box.
fn cursor_position(area: Rect, field: &TextField, masked: bool) -> (u16, u16) {
    let column = if masked {
        // masked glyphs are one column each
        u16::try_from(field.cursor()).unwrap_or(u16::MAX)
    } else {
        field.cursor_column()
    };
    let x = area
        .x
        .saturating_add(1)
        .saturating_add(column)
        .min(area.right().saturating_sub(2));
    (x, area.y.saturating_add(1))
}

fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn history_item(record: &MoodRecord) -> ListItem<'_> {
    ListItem::new(vec![
        Line::from(Span::styled(
            format!("{} ({})", record.dt, record.user_id),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::raw(record.note.as_str())),
        Line::from(Span::styled(
            record.sentiment.as_str(),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
    ])
    .style(
        Style::default()
            .fg(Color::Black)
            .bg(sentiment_color(&record.sentiment)),
    )
}

fn draw_login(f: &mut Frame, state: &JournalState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.area());

    f.render_widget(title("Student Login"), chunks[0]);

    render_field(
        f,
        chunks[1],
        "Contract number",
        "Contract number (e.g. RE-71904/24)",
        &state.contract_number,
        false,
        state.login_focus == LoginFocus::ContractNumber,
    );
    render_field(
        f,
        chunks[2],
        "Password",
        "Password (demo only, not a real password)",
        &state.password,
        true,
        state.login_focus == LoginFocus::Password,
    );

    if let Some(error) = state.login_error() {
        let error = Paragraph::new(error)
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center);
        f.render_widget(error, chunks[3]);
    }

    f.render_widget(
        controls(&[("Tab", "switch field"), ("Enter", "log in"), ("Esc", "quit")]),
        chunks[5],
    );
}

fn draw_journal(f: &mut Frame, state: &JournalState, history: &mut ListState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.area());

    f.render_widget(title("Mood Journal"), chunks[0]);

    let owner = state.session().owner_id().unwrap_or_default();
    let header = Paragraph::new(vec![
        Line::from(format!("Logged in as: {owner}")),
        Line::from(format!("Selected Date: {}", day_string(state.selected_day()))),
    ])
    .alignment(Alignment::Center);
    f.render_widget(header, chunks[1]);

    let typing = state.notice().is_none() && !state.is_picking_date();
    render_field(
        f,
        chunks[2],
        "Note",
        "Write your note...",
        &state.note,
        false,
        typing,
    );

    let block = Block::default().borders(Borders::ALL).title("Mood History");
    if state.is_loading() {
        let loading = Paragraph::new("Loading...").block(block);
        f.render_widget(loading, chunks[3]);
    } else if state.get_entries().is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No moods yet.",
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        ))
        .block(block);
        f.render_widget(empty, chunks[3]);
    } else {
        let items: Vec<ListItem> = state.get_entries().iter().map(history_item).collect();
        let list = List::new(items)
            .block(block)
            .highlight_symbol("> ");
        f.render_stateful_widget(list, chunks[3], history);
    }

    f.render_widget(
        controls(&[
            ("Enter", "save"),
            ("Ctrl+D", "pick date"),
            ("Ctrl+R", "reload"),
            ("Up/Down", "scroll"),
            ("Esc", "quit"),
        ]),
        chunks[4],
    );

    if let Some(day) = state.picker_day() {
        draw_picker(f, &day_string(day));
    }
}

fn draw_picker(f: &mut Frame, day: &str) {
    let area = centered(44, 7, f.area());
    let body = Paragraph::new(vec![
        Line::from(Span::styled(
            day.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Left/Right: day  Up/Down: week"),
        Line::from("PgUp/PgDn: month  t: today"),
        Line::from("Enter: pick  Esc: cancel"),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title("Pick Date"));
    f.render_widget(Clear, area);
    f.render_widget(body, area);
}

fn draw_notice(f: &mut Frame, notice: &Notice) {
    let (heading, color) = match notice {
        Notice::Info(_) => ("Notice", Color::Green),
        Notice::Error(_) => ("Error", Color::Red),
    };
    let area = centered(60, 8, f.area());
    let body = Paragraph::new(notice.message())
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(heading)
                .title_bottom(Line::from("any key to close").centered()),
        );
    f.render_widget(Clear, area);
    f.render_widget(body, area);
}

impl UI {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(UI {
            terminal,
            events: EventStream::new(),
            history: ListState::default(),
        })
    }

    pub fn display(&mut self, state: &JournalState) -> Result<()> {
        let history = &mut self.history;
        self.terminal.draw(|f| {
            if state.session().is_logged_in() {
                draw_journal(f, state, history);
            } else {
                draw_login(f, state);
            }
            if let Some(notice) = state.notice() {
                draw_notice(f, notice);
            }
        })?;

        Ok(())
    }

    /// Waits for the next terminal event. Safe to drop while pending, so it
    /// can race store replies in `tokio::select!`.
    pub async fn next_input(&mut self) -> Result<Input> {
        let Some(event) = self.events.next().await else {
            return Ok(Input::Closed);
        };

        match event? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Input::Key(key)),
            _ => Ok(Input::Redraw),
        }
    }

    /// Applies `key` to `state`. Returns an action when the key needs the
    /// store.
    pub fn handle_key(&mut self, state: &mut JournalState, key: KeyEvent) -> Option<Action> {
        apply_key(state, &mut self.history, key)
    }
}

fn scroll_history(history: &mut ListState, len: usize, down: bool) {
    if len == 0 {
        history.select(None);
        return;
    }
    let next = match (history.selected(), down) {
        (None, _) => 0,
        (Some(i), true) => (i + 1).min(len - 1),
        (Some(i), false) => i.saturating_sub(1),
    };
    history.select(Some(next));
}

pub fn apply_key(state: &mut JournalState, history: &mut ListState, key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    if state.notice().is_some() {
        state.dismiss_notice();
        return None;
    }

    if !state.session().is_logged_in() {
        return apply_login_key(state, key);
    }

    if state.is_picking_date() {
        apply_picker_key(state, key);
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => Some(Action::Quit),
        KeyCode::Enter => Some(Action::Save),
        KeyCode::Char('d') if ctrl => {
            state.open_picker();
            None
        }
        KeyCode::Char('r') if ctrl => Some(Action::Reload),
        KeyCode::Up | KeyCode::Down => {
            scroll_history(history, state.get_entries().len(), key.code == KeyCode::Down);
            None
        }
        _ if ctrl => None,
        code => {
            edit_field(&mut state.note, code);
            None
        }
    }
}

fn edit_field(field: &mut TextField, code: KeyCode) {
    match code {
        KeyCode::Char(c) => field.insert(c),
        KeyCode::Backspace => field.backspace(),
        KeyCode::Delete => field.delete(),
        KeyCode::Left => field.left(),
        KeyCode::Right => field.right(),
        KeyCode::Home => field.home(),
        KeyCode::End => field.end(),
        _ => {}
    }
}

fn apply_login_key(state: &mut JournalState, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => Some(Action::Quit),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            state.toggle_login_focus();
            None
        }
        KeyCode::Enter => state.submit_login().then_some(Action::LoggedIn),
        code => {
            let field = match state.login_focus {
                LoginFocus::ContractNumber => &mut state.contract_number,
                LoginFocus::Password => &mut state.password,
            };
            edit_field(field, code);
            None
        }
    }
}

fn apply_picker_key(state: &mut JournalState, key: KeyEvent) {
    match key.code {
        KeyCode::Left => state.shift_days(-1),
        KeyCode::Right => state.shift_days(1),
        KeyCode::Up => state.shift_days(-7),
        KeyCode::Down => state.shift_days(7),
        KeyCode::PageUp => state.shift_months(-1),
        KeyCode::PageDown => state.shift_months(1),
        KeyCode::Char('t') => state.picker_today(),
        KeyCode::Enter => state.confirm_picker(),
        KeyCode::Esc => state.cancel_picker(),
        _ => {}
    }
}

impl Drop for UI {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
