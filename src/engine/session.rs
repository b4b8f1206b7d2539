//! Live workout recording: NotStarted -> InProgress -> Finished

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use super::planner::{DayPlan, Mode, PlannedExercise};
use super::progression::apply_progression;
use super::round_half;
use crate::db::{LoadBook, SessionItem, SessionRecord, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Finished,
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("session has not been started")]
    NotStarted,
    #[error("session is already in progress")]
    AlreadyStarted,
    #[error("session is already finished")]
    AlreadyFinished,
    #[error("{0} is not on today's plan")]
    NotInPlan(String),
}

/// Feedback for one recorded set
#[derive(Debug, Clone, PartialEq)]
pub struct SetOutcome {
    pub exercise: String,
    /// 1-based
    pub set_number: usize,
    pub failed: bool,
    /// Advisory rest before the next set
    pub rest_secs: u32,
}

/// Completed session plus the load records after progression
#[derive(Debug, Clone)]
pub struct FinishedSession {
    pub record: SessionRecord,
    pub loads: LoadBook,
}

/// Collects set outcomes for one planned day
pub struct SessionRecorder {
    state: SessionState,
    date: NaiveDate,
    mode: Mode,
    planned: Vec<PlannedExercise>,
    rest_secs_strength: u32,
    rest_secs_easy: u32,
    items: Vec<SessionItem>,
}

impl SessionRecorder {
    pub fn new(plan: &DayPlan, settings: &Settings) -> Self {
        Self {
            state: SessionState::NotStarted,
            date: plan.date,
            mode: plan.mode,
            planned: plan.exercises.clone(),
            rest_secs_strength: settings.rest_secs_strength,
            rest_secs_easy: settings.rest_secs_easy,
            items: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn items(&self) -> &[SessionItem] {
        &self.items
    }

    pub fn sets_recorded(&self, exercise: &str) -> usize {
        self.items.iter().filter(|i| i.exercise == exercise).count()
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::NotStarted => {
                debug!("Session started: {:?} on {}", self.mode, self.date);
                self.state = SessionState::InProgress;
                Ok(())
            }
            SessionState::InProgress => Err(SessionError::AlreadyStarted),
            SessionState::Finished => Err(SessionError::AlreadyFinished),
        }
    }

    /// Record one set. It fails when reps fall short or the lifter struggled.
    pub fn record_set(
        &mut self,
        exercise: &str,
        actual_reps: u32,
        target_reps: u32,
        weight_used: f64,
        struggled: bool,
    ) -> Result<SetOutcome, SessionError> {
        match self.state {
            SessionState::NotStarted => return Err(SessionError::NotStarted),
            SessionState::Finished => return Err(SessionError::AlreadyFinished),
            SessionState::InProgress => {}
        }

        let planned = self
            .planned
            .iter()
            .find(|e| e.name() == exercise)
            .ok_or_else(|| SessionError::NotInPlan(exercise.to_string()))?;
        let spec = &planned.spec;

        let rest_secs = if spec.kind.is_strength() && !spec.is_light {
            self.rest_secs_strength
        } else {
            self.rest_secs_easy
        };

        let failed = actual_reps < target_reps || struggled;
        let weight_used = if weight_used.is_finite() && weight_used >= 0.0 {
            round_half(weight_used)
        } else {
            warn!(
                "Unusable weight {} for {}, using suggested {}",
                weight_used, exercise, planned.suggested_weight
            );
            planned.suggested_weight
        };

        self.items.push(SessionItem {
            exercise: exercise.to_string(),
            actual_reps,
            target_reps,
            weight_used,
            failed,
        });

        Ok(SetOutcome {
            exercise: exercise.to_string(),
            set_number: self.sets_recorded(exercise),
            failed,
            rest_secs,
        })
    }

    /// Close the session and run progression on it. One-way: a second call errors.
    pub fn finish(&mut self, loads: &LoadBook, finished_at: DateTime<Utc>) -> Result<FinishedSession, SessionError> {
        match self.state {
            SessionState::NotStarted => return Err(SessionError::NotStarted),
            SessionState::Finished => return Err(SessionError::AlreadyFinished),
            SessionState::InProgress => {}
        }
        self.state = SessionState::Finished;

        let record = SessionRecord {
            id: None,
            date: self.date,
            finished_at,
            mode: self.mode,
            items: std::mem::take(&mut self.items),
        };
        let loads = apply_progression(&record, loads);

        debug!("Session finished with {} sets", record.items.len());
        Ok(FinishedSession { record, loads })
    }
}

/// Parse a rep entry, falling back to `fallback` on anything unusable
pub fn parse_reps(input: &str, fallback: u32) -> u32 {
    match input.trim().parse::<u32>() {
        Ok(reps) => reps,
        Err(_) => {
            warn!("Unusable rep entry {:?}, using {}", input, fallback);
            fallback
        }
    }
}

/// Parse a weight entry onto the 0.5 grid, falling back on anything unusable
pub fn parse_weight(input: &str, fallback: f64) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(weight) if weight.is_finite() && weight >= 0.0 => round_half(weight),
        _ => {
            warn!("Unusable weight entry {:?}, using {}", input, fallback);
            fallback
        }
    }
}
