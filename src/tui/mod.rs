//! TUI module - Terminal workout screen with ratatui

use std::io::{Stdout, stdout};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use tracing::warn;

use crate::db::{Database, LoadBook};
use crate::engine::session::{parse_reps, parse_weight};
use crate::engine::{DayPlan, FinishedSession, PlannedExercise, RestTimer, SessionRecorder, SessionState};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// App state for TUI
pub struct App {
    db: Database,
    plan: DayPlan,
    loads: LoadBook,
    recorder: SessionRecorder,
    cursor: usize,
    reps: u32,
    weight: f64,
    /// Typed digits, applied with r (reps), w (weight) or on Enter
    entry: String,
    /// Finished session the database has not accepted yet
    unsaved: Option<FinishedSession>,
    timer: RestTimer,
    timer_tx: Sender<()>,
    timer_rx: Receiver<()>,
    status: String,
    quit_armed: bool,
    should_quit: bool,
}

impl App {
    pub fn new(db: Database, today: NaiveDate) -> Result<Self> {
        let plan = db.plan_for(today, today);
        let loads = db.get_loads()?;
        let recorder = SessionRecorder::new(&plan, &db.get_settings()?);
        let (timer_tx, timer_rx) = mpsc::channel();

        let mut app = Self {
            db,
            plan,
            loads,
            recorder,
            cursor: 0,
            reps: 0,
            weight: 0.0,
            entry: String::new(),
            unsaved: None,
            timer: RestTimer::new(),
            timer_tx,
            timer_rx,
            status: "s: start session".to_string(),
            quit_armed: false,
            should_quit: false,
        };
        app.reset_entry();
        Ok(app)
    }

    /// Run the TUI application. Needs a tokio runtime for the rest timer.
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal()?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn current(&self) -> Option<&PlannedExercise> {
        self.plan.exercises.get(self.cursor)
    }

    fn reset_entry(&mut self) {
        self.reps = self.current().map(|e| e.target_reps()).unwrap_or(0);
        self.weight = self.current().map(|e| e.suggested_weight).unwrap_or(0.0);
        self.entry.clear();
    }

    fn apply_reps_entry(&mut self) {
        if !self.entry.is_empty() {
            let target = self.current().map(|e| e.target_reps()).unwrap_or(0);
            self.reps = parse_reps(&self.entry, target);
            self.entry.clear();
        }
    }

    fn apply_weight_entry(&mut self) {
        if !self.entry.is_empty() {
            let suggested = self.current().map(|e| e.suggested_weight).unwrap_or(0.0);
            self.weight = parse_weight(&self.entry, suggested);
            self.entry.clear();
        }
    }

    fn move_cursor(&mut self, forward: bool) {
        let len = self.plan.exercises.len();
        if len == 0 {
            return;
        }
        self.cursor = if forward { (self.cursor + 1) % len } else { (self.cursor + len - 1) % len };
        self.reset_entry();
    }

    fn record(&mut self, struggled: bool) {
        self.apply_reps_entry();
        let Some(exercise) = self.current().cloned() else {
            return;
        };

        let result = self.recorder.record_set(
            exercise.name(),
            self.reps,
            exercise.target_reps(),
            self.weight,
            struggled,
        );

        match result {
            Ok(outcome) => {
                let tx = self.timer_tx.clone();
                self.timer.start(Duration::from_secs(u64::from(outcome.rest_secs)), move || {
                    let _ = tx.send(());
                });
                self.status = format!(
                    "{} set {}{} - rest {}s",
                    outcome.exercise,
                    outcome.set_number,
                    if outcome.failed { " (missed)" } else { "" },
                    outcome.rest_secs
                );
                if outcome.set_number >= exercise.spec.sets as usize {
                    self.move_cursor(true);
                }
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    /// Finish the session and save it. A failed save keeps the session for another F.
    fn finish(&mut self) {
        let finished = match self.unsaved.take() {
            Some(finished) => finished,
            None => match self.recorder.finish(&self.loads, Utc::now()) {
                Ok(finished) => {
                    self.timer.cancel();
                    finished
                }
                Err(e) => {
                    self.status = e.to_string();
                    return;
                }
            },
        };

        match self.db.commit_session(&finished) {
            Ok(_) => {
                self.status = format!("Saved {} sets. q: quit", finished.record.items.len());
                self.loads = finished.loads;
            }
            Err(e) => {
                warn!("Saving session failed: {:#}", e);
                self.status = format!("Save failed: {} - F: retry", e);
                self.unsaved = Some(finished);
            }
        }
    }

    fn quit(&mut self) {
        if self.unsaved.is_some() && !self.quit_armed {
            self.quit_armed = true;
            self.status = "Session not saved - F: retry, q: quit anyway".to_string();
            return;
        }
        self.should_quit = true;
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(4),
            ])
            .split(area);

        // Header
        let deload = if self.plan.deload_week { " | deload week" } else { "" };
        let header = Paragraph::new(format!(
            "liftlog - {} - {}{}",
            self.plan.date.format("%A %Y-%m-%d"),
            self.plan.mode.label(),
            deload
        ))
        .style(Style::default().fg(Color::Cyan).bold())
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        // Plan table
        let rows: Vec<Row> = self
            .plan
            .exercises
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let done = self.recorder.sets_recorded(e.name());
                let style = if i == self.cursor {
                    Style::default().fg(Color::Yellow).bold()
                } else if done >= e.spec.sets as usize {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default()
                };
                let weight = if e.suggested_weight > 0.0 {
                    format!("{:.1} lb", e.suggested_weight)
                } else {
                    "-".to_string()
                };
                Row::new(vec![
                    Cell::from(if i == self.cursor { ">" } else { " " }),
                    Cell::from(e.name().to_string()),
                    Cell::from(e.spec.kind.describe(e.spec.sets)),
                    Cell::from(weight),
                    Cell::from(format!("{}/{}", done, e.spec.sets)),
                ])
                .style(style)
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(2),
                Constraint::Min(26),
                Constraint::Length(8),
                Constraint::Length(10),
                Constraint::Length(6),
            ],
        )
        .header(Row::new(vec!["", "Exercise", "Target", "Weight", "Done"]).style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title("Today"));

        frame.render_widget(table, chunks[1]);

        // Footer
        let timer = match self.timer.remaining() {
            Some(left) => format!("Rest: {}s | ", left.as_secs() + 1),
            None => String::new(),
        };
        let keys = match self.recorder.state() {
            SessionState::NotStarted => "s: start | up/down: select | q: quit",
            SessionState::InProgress => {
                "enter: done | f: struggled | +/-: reps | 0-9 then r/w: set reps/weight | n: next | F: finish | q: quit"
            }
            SessionState::Finished => "q: quit",
        };
        let entry = if self.entry.is_empty() { String::new() } else { format!(" | Input: {}", self.entry) };
        let footer = Paragraph::new(format!(
            "{}Reps: {} | Weight: {:.1} lb{} | {}\n{}",
            timer, self.reps, self.weight, entry, self.status, keys
        ))
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[2]);
    }

    fn handle_events(&mut self) -> Result<()> {
        if self.timer_rx.try_recv().is_ok() {
            self.status = "Rest over - next set".to_string();
        }

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            self.handle_key(key.code);
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Char('s') => match self.recorder.start() {
                Ok(()) => self.status = "Session started".to_string(),
                Err(e) => self.status = e.to_string(),
            },
            KeyCode::Enter => self.record(false),
            KeyCode::Char('f') => self.record(true),
            KeyCode::Char('+') => self.reps += 1,
            KeyCode::Char('-') => self.reps = self.reps.saturating_sub(1),
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => self.entry.push(c),
            KeyCode::Backspace => {
                self.entry.pop();
            }
            KeyCode::Char('r') => self.apply_reps_entry(),
            KeyCode::Char('w') => self.apply_weight_entry(),
            KeyCode::Char('n') | KeyCode::Down => self.move_cursor(true),
            KeyCode::Up => self.move_cursor(false),
            KeyCode::Char('F') => self.finish(),
            _ => {}
        }
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
