use crate::calc::calendar::{month_grid, CalendarView, CalendarWindow, YearMonth};
use crate::data::labels::{
    bucket_label, duration_mode_label, format_days, half_day_label, leave_type_label,
};
use crate::data::{DurationMode, HalfDayPeriod, LeaveRequest, LeaveType};
use crate::draft::{Draft, DraftError, DraftGenerator};
use crate::mail::MailComposer;
use crate::wizard::{DraftRequest, DraftState, Step, Wizard, RESET_PROMPT};
use anyhow::Result;
use chrono::{Duration, Local, NaiveDate, NaiveTime, Timelike};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyModifiers};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, Wrap},
    Frame, Terminal,
};
use std::io::Stdout;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration as StdDuration;

// Stats section header style
const SECTION_BG: Color = Color::Rgb(40, 44, 52);

/// Left/Right on an hourly field moves the time by this much.
const TIME_STEP_MINUTES: i64 = 30;

type DraftResult = (u64, Result<Draft, DraftError>);

#[derive(Clone, Copy, Debug, PartialEq)]
enum DurationField {
    Mode,
    Period,
    Start,
    End,
}

/// Editable rows of the Duration step for the current mode.
fn duration_fields(mode: DurationMode) -> &'static [DurationField] {
    match mode {
        DurationMode::FullDay => &[DurationField::Mode],
        DurationMode::HalfDay => &[DurationField::Mode, DurationField::Period],
        DurationMode::Hourly => &[
            DurationField::Mode,
            DurationField::Start,
            DurationField::End,
        ],
    }
}

pub struct App {
    wizard: Wizard,
    window: CalendarWindow,
    view: CalendarView,
    today: NaiveDate,
    /// Day under the keyboard cursor on the Date step.
    cursor: NaiveDate,
    type_cursor: usize,
    field_cursor: usize,
    generator: Arc<dyn DraftGenerator>,
    mail: Box<dyn MailComposer>,
    draft_tx: Sender<DraftResult>,
    draft_rx: Receiver<DraftResult>,
    /// Reset confirmation modal is open.
    confirm_reset: bool,
    /// Bucket whose history is listed under the stats.
    history_bucket: Option<LeaveType>,
    /// Message for the status line. Cleared on next keypress.
    status: Option<(String, Color)>,
}

impl App {
    pub fn new(
        wizard: Wizard,
        window: CalendarWindow,
        today: NaiveDate,
        generator: Arc<dyn DraftGenerator>,
        mail: Box<dyn MailComposer>,
    ) -> Self {
        let (draft_tx, draft_rx) = channel();
        let view = CalendarView::starting_at(&window, today);
        let cursor = today.clamp(window.min_date(), window.max_date());
        App {
            wizard,
            window,
            view,
            today,
            cursor,
            type_cursor: 0,
            field_cursor: 0,
            generator,
            mail,
            draft_tx,
            draft_rx,
            confirm_reset: false,
            history_bucket: None,
            status: None,
        }
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    /// Moves "today" forward when the session runs past midnight.
    pub fn set_today(&mut self, today: NaiveDate) {
        if today != self.today {
            tracing::debug!(%today, "date rolled over");
            self.today = today;
        }
    }

    /// Hands finished drafts back to the wizard. Called once per frame.
    pub fn poll_drafts(&mut self) {
        while let Ok((ticket, result)) = self.draft_rx.try_recv() {
            self.wizard.resolve_draft(ticket, result);
        }
    }

    fn spawn_draft(&self, request: DraftRequest) {
        let tx = self.draft_tx.clone();
        let generator = Arc::clone(&self.generator);
        std::thread::spawn(move || {
            let result = generator.generate(&request.input);
            // The receiver is gone once the app has quit.
            let _ = tx.send((request.ticket, result));
        });
    }

    fn set_status(&mut self, msg: impl Into<String>, color: Color) {
        self.status = Some((msg.into(), color));
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        self.status = None;

        if self.confirm_reset {
            self.handle_reset_key(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('r') => {
                self.confirm_reset = true;
                return false;
            }
            KeyCode::Tab => {
                self.history_bucket = match self.history_bucket {
                    None => Some(LeaveType::Annual),
                    Some(LeaveType::Annual) => Some(LeaveType::Sick),
                    Some(LeaveType::Sick) => Some(LeaveType::Birthday),
                    Some(LeaveType::Birthday) => None,
                };
                return false;
            }
            _ => {}
        }

        match self.wizard.step() {
            Step::Type => self.handle_type_key(code),
            Step::Date => self.handle_date_key(code),
            Step::Duration => self.handle_duration_key(code),
            Step::Review => self.handle_review_key(code),
        }
        false
    }

    fn handle_reset_key(&mut self, code: KeyCode) {
        let accepted = match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
            _ => return,
        };
        self.confirm_reset = false;
        let mut answer = |_: &str| accepted;
        if self.wizard.reset_statistics(&mut answer) {
            self.set_status("Statistics reset", Color::Yellow);
        }
    }

    // ── Step handlers ─────────────────────────────────────────────────────────

    fn handle_type_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => {
                self.type_cursor = self.type_cursor.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.type_cursor + 1 < LeaveType::ALL.len() {
                    self.type_cursor += 1;
                }
            }
            KeyCode::Enter => {
                self.wizard.choose_leave_type(LeaveType::ALL[self.type_cursor]);
            }
            _ => {}
        }
    }

    fn handle_date_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left => self.move_cursor(-1),
            KeyCode::Right => self.move_cursor(1),
            KeyCode::Up => self.move_cursor(-7),
            KeyCode::Down => self.move_cursor(7),
            KeyCode::Char('[') => self.change_month(false),
            KeyCode::Char(']') => self.change_month(true),
            KeyCode::Enter => self.pick_cursor(false),
            KeyCode::Char(' ') => self.pick_cursor(true),
            KeyCode::Char('n') => {
                if !self.wizard.confirm_dates() {
                    self.set_status("Select at least one date first", Color::Yellow);
                }
            }
            _ => {}
        }
    }

    fn handle_duration_key(&mut self, code: KeyCode) {
        let fields = duration_fields(self.wizard.request().duration_mode);
        match code {
            KeyCode::Up => {
                self.field_cursor = self.field_cursor.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.field_cursor + 1 < fields.len() {
                    self.field_cursor += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => {
                if let Some(request) = self.wizard.request_review() {
                    self.spawn_draft(request);
                }
            }
            _ => {}
        }
    }

    fn handle_review_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('b') | KeyCode::Esc => {
                if !self.wizard.back() {
                    self.set_status("Draft is still being generated", Color::Yellow);
                }
            }
            KeyCode::Enter | KeyCode::Char('s') => self.submit(),
            _ => {}
        }
    }

    // ── Date step helpers ─────────────────────────────────────────────────────

    fn move_cursor(&mut self, days: i64) {
        let target = self.cursor + Duration::days(days);
        self.cursor = target.clamp(self.window.min_date(), self.window.max_date());
        let month = YearMonth::of(self.cursor);
        while self.view.month() < month && self.view.next_month(&self.window) {}
        while self.view.month() > month && self.view.prev_month(&self.window) {}
    }

    fn change_month(&mut self, forward: bool) {
        let moved = if forward {
            self.view.next_month(&self.window)
        } else {
            self.view.prev_month(&self.window)
        };
        if moved {
            self.cursor_to_view();
        }
    }

    /// Puts the cursor on the 1st of the visible month if it is elsewhere.
    fn cursor_to_view(&mut self) {
        if YearMonth::of(self.cursor) == self.view.month() {
            return;
        }
        if let Some(first) = self.view.month().first_day() {
            self.cursor = first.clamp(self.window.min_date(), self.window.max_date());
        }
    }

    fn pick_cursor(&mut self, multi: bool) {
        let cells = month_grid(
            &self.window,
            YearMonth::of(self.cursor),
            self.today,
            self.wizard.request().dates(),
        );
        let interactive = self.window.contains(self.cursor)
            && cells
                .iter()
                .flatten()
                .any(|c| c.date == self.cursor && c.is_interactive());
        if !interactive {
            let msg = format!("{} cannot be selected", self.cursor.format("%Y/%m/%d"));
            self.set_status(msg, Color::Yellow);
            return;
        }
        self.wizard.select_date(self.cursor, multi);
        self.view.follow_selection(self.wizard.request().dates());
        self.cursor_to_view();
    }

    // ── Duration step helpers ─────────────────────────────────────────────────

    fn adjust_field(&mut self, delta: i64) {
        let request = self.wizard.request();
        let mode = request.duration_mode;
        let period = request.half_day_period;
        let (start, end) = (request.start_time, request.end_time);

        let fields = duration_fields(mode);
        let field = fields[self.field_cursor.min(fields.len() - 1)];
        match field {
            DurationField::Mode => {
                let modes = DurationMode::ALL;
                let i = modes.iter().position(|m| *m == mode).unwrap_or(0) as i64;
                let next = (i + delta).rem_euclid(modes.len() as i64) as usize;
                self.wizard.set_duration_mode(modes[next]);
                self.field_cursor = 0;
            }
            DurationField::Period => {
                let flipped = match period {
                    HalfDayPeriod::Am => HalfDayPeriod::Pm,
                    HalfDayPeriod::Pm => HalfDayPeriod::Am,
                };
                self.wizard.set_half_day_period(flipped);
            }
            DurationField::Start => {
                self.wizard
                    .set_hours(shift_time(start, delta * TIME_STEP_MINUTES), end);
            }
            DurationField::End => {
                self.wizard
                    .set_hours(start, shift_time(end, delta * TIME_STEP_MINUTES));
            }
        }
    }

    // ── Review step helpers ───────────────────────────────────────────────────

    fn submit(&mut self) {
        if !self.wizard.can_submit() {
            return;
        }
        if let Some(submission) = self.wizard.submit(self.mail.as_ref()) {
            let msg = format!("Leave recorded: {} days", format_days(submission.days));
            self.set_status(msg, Color::Green);
            self.type_cursor = 0;
            self.field_cursor = 0;
            self.view = CalendarView::starting_at(&self.window, self.today);
            self.cursor = self
                .today
                .clamp(self.window.min_date(), self.window.max_date());
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    pub fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // step indicator
                Constraint::Min(14),   // step body + stats
                Constraint::Length(3), // status / help
            ])
            .split(f.area());

        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(44), Constraint::Length(40)])
            .split(chunks[1]);

        self.render_steps(f, chunks[0]);
        match self.wizard.step() {
            Step::Type => self.render_type(f, main[0]),
            Step::Date => self.render_date(f, main[0]),
            Step::Duration => self.render_duration(f, main[0]),
            Step::Review => self.render_review(f, main[0]),
        }
        self.render_stats(f, main[1]);
        self.render_status(f, chunks[2]);

        if self.confirm_reset {
            self.render_reset_modal(f);
        }
    }

    fn render_steps(&self, f: &mut Frame, area: Rect) {
        let current = self.wizard.step().number();
        let mut spans = Vec::new();
        for (i, step) in Step::ALL.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
            }
            let style = if step.number() == current {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else if step.number() < current {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(
                format!(" {} {} ", step.number(), step.title()),
                style,
            ));
        }
        let p = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title("Leave Request"));
        f.render_widget(p, area);
    }

    fn render_type(&self, f: &mut Frame, area: Rect) {
        let mut lines = vec![Line::from("Choose a leave type:"), Line::from("")];
        for (i, t) in LeaveType::ALL.iter().enumerate() {
            let (marker, style) = if i == self.type_cursor {
                ("> ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                ("  ", Style::default())
            };
            lines.push(Line::from(Span::styled(
                format!("{}{}", marker, leave_type_label(*t)),
                style,
            )));
        }
        let p = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Leave Type"));
        f.render_widget(p, area);
    }

    fn render_date(&self, f: &mut Frame, area: Rect) {
        let month = self.view.month();
        let request = self.wizard.request();
        let cells = month_grid(&self.window, month, self.today, request.dates());

        let prev = if self.view.can_prev(&self.window) { "<" } else { " " };
        let next = if self.view.can_next(&self.window) { ">" } else { " " };

        let mut lines: Vec<Line> = vec![
            Line::from(Span::styled(
                format!("{} {:^16} {}", prev, month.to_string(), next),
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )),
            Line::from("Su Mo Tu We Th Fr Sa"),
        ];

        for week in cells.chunks(7) {
            let mut spans = Vec::new();
            for cell in week {
                match cell {
                    Some(c) => {
                        let style = day_style(
                            c.is_selected,
                            c.date == self.cursor,
                            !c.is_interactive(),
                            c.holiday.is_some(),
                            c.is_weekend,
                        );
                        spans.push(Span::styled(format!("{:2}", c.day), style));
                        spans.push(Span::raw(" "));
                    }
                    None => spans.push(Span::raw("   ")),
                }
            }
            lines.push(Line::from(spans));
        }

        lines.push(Line::from(""));
        let holiday = self.window.holiday_label(self.cursor).unwrap_or("");
        lines.push(Line::from(vec![
            Span::raw(format!("{} ", self.cursor.format("%Y/%m/%d"))),
            Span::styled(holiday.to_string(), Style::default().fg(Color::Red)),
        ]));

        let selected = if request.dates().is_empty() {
            "(none)".to_string()
        } else {
            request.date_label()
        };
        lines.push(Line::from(format!(
            "Selected ({}): {}",
            request.dates().len(),
            selected
        )));

        let p = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Dates"));
        f.render_widget(p, area);
    }

    fn render_duration(&self, f: &mut Frame, area: Rect) {
        let request = self.wizard.request();
        let fields = duration_fields(request.duration_mode);
        let active = fields[self.field_cursor.min(fields.len() - 1)];

        let mut lines = Vec::new();
        for field in fields {
            let (label, value) = match field {
                DurationField::Mode => ("Mode", duration_mode_label(request.duration_mode).to_string()),
                DurationField::Period => ("Period", half_day_label(request.half_day_period).to_string()),
                DurationField::Start => ("Start", request.start_time.format("%H:%M").to_string()),
                DurationField::End => ("End", request.end_time.format("%H:%M").to_string()),
            };
            let style = if *field == active {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!("{:<8} < {} >", label, value),
                style,
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(format!(
            "Charged: {} day(s) for {} date(s)",
            format_days(self.wizard.days()),
            request.dates().len()
        )));

        let p = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Duration"));
        f.render_widget(p, area);
    }

    fn render_review(&self, f: &mut Frame, area: Rect) {
        let request = self.wizard.request();
        let mut lines = vec![
            Line::from(format!(
                "Type:     {}",
                request.leave_type.map(leave_type_label).unwrap_or("")
            )),
            Line::from(format!("Dates:    {}", request.date_label())),
            Line::from(format!("Duration: {}", describe_duration(request))),
            Line::from(format!("Days:     {}", format_days(self.wizard.days()))),
            Line::from(""),
        ];

        match self.wizard.draft_state() {
            Some(DraftState::Pending { .. }) | None => {
                lines.push(Line::from(Span::styled(
                    "Generating draft...",
                    Style::default().fg(Color::Yellow),
                )));
            }
            Some(DraftState::Failed(reason)) => {
                lines.push(Line::from(Span::styled(
                    format!("Draft generation failed: {}", reason),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from("Press b to go back and try again."));
            }
            Some(DraftState::Ready(draft)) => {
                lines.push(Line::from(format!("To:       {}", self.wizard.recipient())));
                lines.push(Line::from(Span::styled(
                    format!("Subject:  {}", draft.subject),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(""));
                for body_line in draft.body.lines() {
                    lines.push(Line::from(body_line.to_string()));
                }
            }
        }

        let p = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Review"));
        f.render_widget(p, area);
    }

    fn render_stats(&self, f: &mut Frame, area: Rect) {
        let ledger = self.wizard.ledger();
        let snapshot = ledger.snapshot();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // annual gauge
                Constraint::Length(6), // usage table
                Constraint::Min(0),    // history
            ])
            .split(area);

        // ── Annual remaining gauge ────────────────────────────────────────────
        let annual = snapshot.bucket(LeaveType::Annual);
        let ratio = remaining_ratio(annual.used, annual.total);
        let gauge_color = if annual.remaining() < 0.0 {
            Color::Red
        } else if ratio <= 0.25 {
            Color::Yellow
        } else {
            Color::Green
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Annual remaining"))
            .gauge_style(Style::default().fg(gauge_color))
            .ratio(ratio)
            .label(format!(
                "{} / {} days left",
                format_days(annual.remaining()),
                format_days(annual.total)
            ));
        f.render_widget(gauge, chunks[0]);

        // ── Usage per bucket ──────────────────────────────────────────────────
        let mut rows = vec![section_header("Used")];
        for t in LeaveType::ALL {
            let b = snapshot.bucket(t);
            let value = if t == LeaveType::Annual {
                format!("{} / {}", format_days(b.used), format_days(b.total))
            } else {
                format_days(b.used)
            };
            let cell = if b.used > b.total {
                colored(value, Color::Red)
            } else {
                plain(value)
            };
            rows.push(data_row(bucket_label(t), cell));
        }
        let table = Table::new(rows, [Constraint::Length(22), Constraint::Min(8)])
            .block(Block::default().borders(Borders::ALL).title("Statistics"));
        f.render_widget(table, chunks[1]);

        // ── History for the expanded bucket ───────────────────────────────────
        let (title, lines) = match self.history_bucket {
            Some(t) => {
                let entries = ledger.history_for(t);
                let lines: Vec<Line> = if entries.is_empty() {
                    vec![Line::from("  (no records)")]
                } else {
                    entries
                        .iter()
                        .map(|e| {
                            Line::from(format!(
                                "  {}  {}d",
                                e.date_label,
                                format_days(e.duration_days)
                            ))
                        })
                        .collect()
                };
                (format!("History: {}", bucket_label(t)), lines)
            }
            None => (
                format!("History ({})", snapshot.history.len()),
                vec![Line::from("  Tab to expand")],
            ),
        };
        let p = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(p, chunks[2]);
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let line = match &self.status {
            Some((msg, color)) => Line::from(Span::styled(
                msg.clone(),
                Style::default().fg(*color).add_modifier(Modifier::BOLD),
            )),
            None => {
                let help = match self.wizard.step() {
                    Step::Type => "Up/Down move  Enter choose",
                    Step::Date => "Arrows move  [/] month  Enter pick  Space multi  n next",
                    Step::Duration => "Up/Down field  Left/Right change  Enter review",
                    Step::Review => "Enter submit  b back",
                };
                Line::from(Span::styled(
                    format!("{}  |  Tab history  r reset  q quit", help),
                    Style::default().fg(Color::DarkGray),
                ))
            }
        };
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        f.render_widget(p, area);
    }

    fn render_reset_modal(&self, f: &mut Frame) {
        let area = centered_rect(50, 20, f.area());
        f.render_widget(Clear, area);
        let lines = vec![
            Line::from(RESET_PROMPT),
            Line::from(""),
            Line::from(Span::styled(
                "[y] yes   [n] no",
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ];
        let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title("Confirm"),
        );
        f.render_widget(p, area);
    }
}

// ── Row construction helpers ──────────────────────────────────────────────────

/// A section header row with a dark background and bold text.
fn section_header(title: &str) -> Row<'static> {
    Row::new(vec![
        Cell::from(title.to_string())
            .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Cell::from(""),
    ])
    .style(Style::default().bg(SECTION_BG))
}

/// A data row with a two-space indent on the metric label.
fn data_row(metric: impl Into<String>, value: Cell<'static>) -> Row<'static> {
    Row::new(vec![Cell::from(format!("  {}", metric.into())), value])
}

fn plain(s: impl Into<String>) -> Cell<'static> {
    Cell::from(s.into())
}

fn colored(s: impl Into<String>, color: Color) -> Cell<'static> {
    Cell::from(s.into()).style(Style::default().fg(color))
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup[1])[1]
}

// ── App event loop ────────────────────────────────────────────────────────────

pub fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.set_today(Local::now().date_naive());
        app.poll_drafts();
        terminal.draw(|f| app.render(f))?;
        if event::poll(StdDuration::from_millis(16))? {
            if let CEvent::Key(key) = event::read()? {
                if app.handle_key(key.code, key.modifiers) {
                    break;
                }
            }
        }
    }
    Ok(())
}

// ── Display helpers ───────────────────────────────────────────────────────────

/// Style for a day cell. Selection wins over everything; past days are
/// greyed out even when they fall on a holiday.
pub(crate) fn day_style(
    is_selected: bool,
    is_cursor: bool,
    is_past: bool,
    is_holiday: bool,
    is_weekend: bool,
) -> Style {
    let style = if is_selected {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else if is_past {
        Style::default().fg(Color::DarkGray)
    } else if is_holiday {
        Style::default().fg(Color::Red)
    } else if is_weekend {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default()
    };
    if is_cursor {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

/// Fill fraction for the remaining-days gauge. Overdraw shows as empty.
pub(crate) fn remaining_ratio(used: f64, total: f64) -> f64 {
    if total > 0.0 {
        ((total - used) / total).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Moves `t` by `minutes`, pinned to the same day.
pub(crate) fn shift_time(t: NaiveTime, minutes: i64) -> NaiveTime {
    let current = (t.hour() * 60 + t.minute()) as i64;
    let shifted = (current + minutes).clamp(0, 23 * 60 + 59);
    NaiveTime::from_hms_opt((shifted / 60) as u32, (shifted % 60) as u32, 0).unwrap_or(t)
}

fn describe_duration(request: &LeaveRequest) -> String {
    let mode = duration_mode_label(request.duration_mode);
    if let Some(period) = request.half_day_period_if_active() {
        return format!("{} {}", mode, half_day_label(period));
    }
    if let Some((start, end)) = request.hours_if_active() {
        return format!("{} {} ~ {}", mode, start.format("%H:%M"), end.format("%H:%M"));
    }
    mode.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::app_settings::AppSettings;
    use crate::data::HolidayTable;
    use crate::draft::{DraftInput, TemplateDraftGenerator};
    use ratatui::backend::TestBackend;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Mutex;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[derive(Clone, Default)]
    struct SharedMail(Rc<RefCell<Vec<Draft>>>);

    impl MailComposer for SharedMail {
        fn compose(&self, _recipient: &str, draft: &Draft) -> anyhow::Result<()> {
            self.0.borrow_mut().push(draft.clone());
            Ok(())
        }
    }

    struct FailingGenerator;

    impl DraftGenerator for FailingGenerator {
        fn generate(&self, _input: &DraftInput) -> Result<Draft, DraftError> {
            Err(DraftError::Timeout)
        }
    }

    /// Blocks until the test releases it.
    struct GatedGenerator(Mutex<Receiver<()>>);

    impl DraftGenerator for GatedGenerator {
        fn generate(&self, input: &DraftInput) -> Result<Draft, DraftError> {
            if let Ok(rx) = self.0.lock() {
                let _ = rx.recv();
            }
            TemplateDraftGenerator.generate(input)
        }
    }

    fn make_app(today: NaiveDate, generator: Arc<dyn DraftGenerator>, mail: SharedMail) -> App {
        App::new(
            Wizard::from_settings(&AppSettings::default()),
            CalendarWindow::standard(HolidayTable::builtin()),
            today,
            generator,
            Box::new(mail),
        )
    }

    fn template_app(today: NaiveDate) -> App {
        make_app(today, Arc::new(TemplateDraftGenerator), SharedMail::default())
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(code, KeyModifiers::empty())
    }

    fn wait_for_draft(app: &mut App) {
        for _ in 0..400 {
            app.poll_drafts();
            if !app.wizard.is_draft_pending() {
                return;
            }
            std::thread::sleep(StdDuration::from_millis(5));
        }
        panic!("draft never resolved");
    }

    /// Annual leave on `today` only, sitting on the Duration step.
    fn to_duration(app: &mut App) {
        press(app, KeyCode::Enter);
        press(app, KeyCode::Enter);
        press(app, KeyCode::Char('n'));
        assert_eq!(app.wizard.step(), Step::Duration);
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    // ── day_style tests ───────────────────────────────────────────────────────

    #[test]
    fn test_style_selected() {
        let s = day_style(true, false, false, false, false);
        assert_eq!(s, Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD));
    }

    #[test]
    fn test_style_past_beats_holiday() {
        let s = day_style(false, false, true, true, false);
        assert_eq!(s, Style::default().fg(Color::DarkGray));
    }

    #[test]
    fn test_style_holiday() {
        let s = day_style(false, false, false, true, true);
        assert_eq!(s, Style::default().fg(Color::Red));
    }

    #[test]
    fn test_style_weekend() {
        let s = day_style(false, false, false, false, true);
        assert_eq!(s, Style::default().add_modifier(Modifier::DIM));
    }

    #[test]
    fn test_style_cursor_reverses() {
        let s = day_style(false, true, false, false, false);
        assert_eq!(s, Style::default().add_modifier(Modifier::REVERSED));
    }

    // ── helper tests ──────────────────────────────────────────────────────────

    #[test]
    fn test_shift_time() {
        assert_eq!(shift_time(t(9, 0), 30), t(9, 30));
        assert_eq!(shift_time(t(9, 0), -30), t(8, 30));
        assert_eq!(shift_time(t(23, 45), 30), t(23, 59));
        assert_eq!(shift_time(t(0, 15), -30), t(0, 0));
    }

    #[test]
    fn test_remaining_ratio_shrinks_as_days_are_used() {
        assert_eq!(remaining_ratio(0.0, 12.0), 1.0);
        assert_eq!(remaining_ratio(3.0, 12.0), 0.75);
        assert_eq!(remaining_ratio(12.0, 12.0), 0.0);
        assert_eq!(remaining_ratio(15.0, 12.0), 0.0);
        assert_eq!(remaining_ratio(1.0, 0.0), 0.0);
        assert_eq!(remaining_ratio(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_duration_fields_per_mode() {
        assert_eq!(duration_fields(DurationMode::FullDay).len(), 1);
        assert_eq!(duration_fields(DurationMode::HalfDay)[1], DurationField::Period);
        assert_eq!(duration_fields(DurationMode::Hourly)[2], DurationField::End);
    }

    // ── handle_key tests ──────────────────────────────────────────────────────

    #[test]
    fn test_q_returns_true() {
        let mut app = template_app(d(2026, 1, 5));
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn test_ctrl_c_returns_true() {
        let mut app = template_app(d(2026, 1, 5));
        assert!(app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL));
    }

    #[test]
    fn test_type_selection_with_arrows() {
        let mut app = template_app(d(2026, 1, 5));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.wizard.step(), Step::Date);
        assert_eq!(app.wizard.request().leave_type, Some(LeaveType::Sick));
    }

    #[test]
    fn test_type_cursor_stays_in_range() {
        let mut app = template_app(d(2026, 1, 5));
        for _ in 0..5 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.type_cursor, 2);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.type_cursor, 0);
    }

    #[test]
    fn test_arrow_keys_move_cursor_and_view() {
        let mut app = template_app(d(2026, 1, 30));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.cursor, d(2026, 1, 31));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.cursor, d(2026, 2, 7));
        assert_eq!(app.view.month(), YearMonth::new(2026, 2).unwrap());
        press(&mut app, KeyCode::Up);
        assert_eq!(app.cursor, d(2026, 1, 31));
        assert_eq!(app.view.month(), YearMonth::new(2026, 1).unwrap());
    }

    #[test]
    fn test_cursor_clamped_to_window() {
        let mut app = template_app(d(2026, 12, 31));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.cursor, d(2026, 12, 31));
    }

    #[test]
    fn test_month_keys_respect_window() {
        let mut app = template_app(d(2025, 12, 3));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('['));
        assert_eq!(app.view.month(), YearMonth::new(2025, 12).unwrap());
        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.view.month(), YearMonth::new(2026, 1).unwrap());
        assert_eq!(app.cursor, d(2026, 1, 1));

        let mut app = template_app(d(2026, 12, 10));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.view.month(), YearMonth::new(2026, 12).unwrap());
    }

    #[test]
    fn test_past_date_cannot_be_picked() {
        let mut app = template_app(d(2026, 1, 5));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Enter);
        assert!(app.wizard.request().dates().is_empty());
        assert!(app.status.is_some());
    }

    #[test]
    fn test_enter_replaces_and_space_toggles() {
        let mut app = template_app(d(2026, 1, 5));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.wizard.request().dates(), &[d(2026, 1, 5), d(2026, 1, 6)]);

        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.wizard.request().dates(), &[d(2026, 1, 5)]);

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.wizard.request().dates(), &[d(2026, 1, 7)]);
    }

    #[test]
    fn test_n_blocked_without_dates() {
        let mut app = template_app(d(2026, 1, 5));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.wizard.step(), Step::Date);
        let (msg, _) = app.status.clone().unwrap();
        assert!(msg.contains("at least one date"));
    }

    #[test]
    fn test_duration_mode_and_period() {
        let mut app = template_app(d(2026, 1, 5));
        to_duration(&mut app);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.wizard.request().duration_mode, DurationMode::HalfDay);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.wizard.request().half_day_period, HalfDayPeriod::Pm);
        assert_eq!(app.wizard.days(), 0.5);
    }

    #[test]
    fn test_duration_mode_wraps_backwards() {
        let mut app = template_app(d(2026, 1, 5));
        to_duration(&mut app);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.wizard.request().duration_mode, DurationMode::Hourly);
    }

    #[test]
    fn test_hourly_time_adjustment() {
        let mut app = template_app(d(2026, 1, 5));
        to_duration(&mut app);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.wizard.request().start_time, t(9, 30));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.wizard.request().end_time, t(17, 30));
        assert_eq!(app.wizard.days(), 1.0);
    }

    #[test]
    fn test_full_flow_records_leave() {
        let mail = SharedMail::default();
        let mut app = make_app(d(2026, 1, 5), Arc::new(TemplateDraftGenerator), mail.clone());
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.wizard.step(), Step::Review);
        wait_for_draft(&mut app);
        assert!(app.wizard.can_submit());

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.wizard.step(), Step::Type);
        assert_eq!(app.wizard.ledger().bucket(LeaveType::Annual).used, 2.0);
        assert_eq!(app.wizard.ledger().history().len(), 1);
        let (msg, _) = app.status.clone().unwrap();
        assert_eq!(msg, "Leave recorded: 2 days");
        assert_eq!(mail.0.borrow().len(), 1);
    }

    #[test]
    fn test_failed_draft_blocks_submit_and_allows_back() {
        let mut app = make_app(d(2026, 1, 5), Arc::new(FailingGenerator), SharedMail::default());
        to_duration(&mut app);
        press(&mut app, KeyCode::Enter);
        wait_for_draft(&mut app);
        assert!(matches!(app.wizard.draft_state(), Some(DraftState::Failed(_))));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.wizard.step(), Step::Review);
        assert!(app.wizard.ledger().history().is_empty());

        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.wizard.step(), Step::Duration);
    }

    #[test]
    fn test_back_blocked_while_pending() {
        let (release, gate) = channel();
        let generator = Arc::new(GatedGenerator(Mutex::new(gate)));
        let mut app = make_app(d(2026, 1, 5), generator, SharedMail::default());
        to_duration(&mut app);
        press(&mut app, KeyCode::Enter);
        assert!(app.wizard.is_draft_pending());

        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.wizard.step(), Step::Review);
        assert!(app.status.is_some());

        release.send(()).unwrap();
        wait_for_draft(&mut app);
        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.wizard.step(), Step::Duration);
    }

    #[test]
    fn test_reset_modal() {
        let mut app = template_app(d(2026, 1, 5));
        to_duration(&mut app);
        press(&mut app, KeyCode::Enter);
        wait_for_draft(&mut app);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.wizard.ledger().history().len(), 1);

        press(&mut app, KeyCode::Char('r'));
        assert!(app.confirm_reset);
        assert!(!press(&mut app, KeyCode::Char('q')), "modal swallows q");
        press(&mut app, KeyCode::Char('n'));
        assert!(!app.confirm_reset);
        assert_eq!(app.wizard.ledger().history().len(), 1);

        press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.wizard.ledger().history().is_empty());
        assert_eq!(app.wizard.ledger().bucket(LeaveType::Annual).used, 0.0);
    }

    #[test]
    fn test_tab_cycles_history() {
        let mut app = template_app(d(2026, 1, 5));
        let mut seen = Vec::new();
        for _ in 0..4 {
            press(&mut app, KeyCode::Tab);
            seen.push(app.history_bucket);
        }
        assert_eq!(
            seen,
            vec![
                Some(LeaveType::Annual),
                Some(LeaveType::Sick),
                Some(LeaveType::Birthday),
                None
            ]
        );
    }

    #[test]
    fn test_date_rollover_blocks_yesterday() {
        let mut app = template_app(d(2026, 1, 5));
        press(&mut app, KeyCode::Enter);
        app.set_today(d(2026, 1, 6));

        press(&mut app, KeyCode::Enter);
        assert!(app.wizard.request().dates().is_empty());
        let (msg, _) = app.status.clone().unwrap();
        assert!(msg.contains("2026/01/05 cannot be selected"));

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.wizard.request().dates(), &[d(2026, 1, 6)]);
    }

    #[test]
    fn test_stats_follow_ledger_snapshot() {
        let mut app = template_app(d(2026, 1, 5));
        assert!(screen_text(&app).contains("12 / 12 days left"));

        to_duration(&mut app);
        press(&mut app, KeyCode::Enter);
        wait_for_draft(&mut app);
        press(&mut app, KeyCode::Enter);
        let text = screen_text(&app);
        assert!(text.contains("11 / 12 days left"));
        assert!(text.contains("History (1)"));
    }

    // ── render tests ──────────────────────────────────────────────────────────

    #[test]
    fn test_render_each_step() {
        let mut app = template_app(d(2026, 1, 5));
        assert!(screen_text(&app).contains("Leave Type"));

        press(&mut app, KeyCode::Enter);
        assert!(screen_text(&app).contains("January 2026"));

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('n'));
        assert!(screen_text(&app).contains("Charged: 1 day(s)"));

        press(&mut app, KeyCode::Enter);
        wait_for_draft(&mut app);
        assert!(screen_text(&app).contains("Subject:"));
    }

    #[test]
    fn test_render_reset_modal() {
        let mut app = template_app(d(2026, 1, 5));
        press(&mut app, KeyCode::Char('r'));
        assert!(screen_text(&app).contains("[y] yes"));
    }
}
