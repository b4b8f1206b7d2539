//! Database module - SQLite keyed-document storage for profile, settings,
//! load records, group configuration and workout history

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::engine::planner::GROUP_KEYS;
use crate::engine::{DayPlan, FinishedSession, Mode, PlanInputs, plan_day, round_half};

const PROFILE: &str = "profile";
const SETTINGS: &str = "settings";
const LOADS: &str = "loads";
const GROUPS: &str = "groups";

const PROFILE_KEY: &str = "user";
const SETTINGS_KEY: &str = "app";

/// User profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub start_weight: Option<f64>,
    pub current_weight: Option<f64>,
    pub target_weight: Option<f64>,
    pub best_hang_secs: u32,
    pub start_date: Option<NaiveDate>,
    pub age: Option<u32>,
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub rest_secs_strength: u32,
    pub rest_secs_easy: u32,
    /// Every N-th program week is a deload week; 0 disables
    pub deload_interval_weeks: u32,
    pub program_start: Option<NaiveDate>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rest_secs_strength: 90,
            rest_secs_easy: 45,
            deload_interval_weeks: 6,
            program_start: None,
        }
    }
}

/// Working weight and fail streak for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadRecord {
    pub current_weight: f64,
    pub consecutive_fail_count: u32,
}

impl LoadRecord {
    pub fn starting(weight: f64) -> Self {
        Self {
            current_weight: round_half(weight.max(0.0)),
            consecutive_fail_count: 0,
        }
    }
}

/// Load records keyed by exercise name
pub type LoadBook = BTreeMap<String, LoadRecord>;

/// User override for one exercise inside a training group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfigEntry {
    pub enabled: bool,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
}

impl Default for GroupConfigEntry {
    fn default() -> Self {
        Self { enabled: true, sets: None, reps: None }
    }
}

/// group key -> exercise name -> override
pub type GroupConfig = BTreeMap<String, BTreeMap<String, GroupConfigEntry>>;

/// One recorded set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionItem {
    pub exercise: String,
    pub actual_reps: u32,
    pub target_reps: u32,
    pub weight_used: f64,
    pub failed: bool,
}

/// Finished workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(skip)]
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub finished_at: DateTime<Utc>,
    pub mode: Mode,
    pub items: Vec<SessionItem>,
}

impl SessionRecord {
    pub fn contains(&self, exercise: &str) -> bool {
        self.items.iter().any(|i| i.exercise == exercise)
    }
}

/// Body weight log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub date: NaiveDate,
    pub weight: f64,
}

/// Everything the planner reads, loaded in one go
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub profile: UserProfile,
    pub settings: Settings,
    pub groups: GroupConfig,
    pub loads: LoadBook,
    pub history: Vec<SessionRecord>,
}

impl Snapshot {
    pub fn inputs(&self) -> PlanInputs<'_> {
        PlanInputs {
            profile: &self.profile,
            settings: &self.settings,
            groups: &self.groups,
            loads: &self.loads,
            history: &self.history,
        }
    }
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("cannot open database {}", path))?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                key TEXT NOT NULL,
                body TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (collection, key)
            );
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                body TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS weight_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                weight REAL NOT NULL
            );",
        )?;
        Ok(())
    }

    fn get_doc<T: DeserializeOwned>(&self, collection: &str, key: &str) -> Result<Option<T>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND key = ?2",
                params![collection, key],
                |row| row.get(0),
            )
            .optional()?;

        match body {
            Some(body) => {
                let value = serde_json::from_str(&body)
                    .with_context(|| format!("corrupt document {}/{}", collection, key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn get_docs<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<(String, T)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, body FROM documents WHERE collection = ?1 ORDER BY key")?;

        let rows = stmt
            .query_map(params![collection], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut docs = Vec::with_capacity(rows.len());
        for (key, body) in rows {
            match serde_json::from_str(&body) {
                Ok(value) => docs.push((key, value)),
                Err(e) => warn!("Skipping corrupt document {}/{}: {}", collection, key, e),
            }
        }
        Ok(docs)
    }

    /// Upsert one document. Takes a bare connection so it runs inside transactions too.
    fn put_doc<T: Serialize>(conn: &Connection, collection: &str, key: &str, value: &T) -> Result<()> {
        let body = serde_json::to_string(value)?;
        conn.execute(
            "INSERT INTO documents (collection, key, body, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(collection, key) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
            params![collection, key, body, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Profile, or an empty one before first use
    pub fn get_profile(&self) -> Result<UserProfile> {
        Ok(self.get_doc(PROFILE, PROFILE_KEY)?.unwrap_or_default())
    }

    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        Self::put_doc(&self.conn, PROFILE, PROFILE_KEY, profile)
    }

    pub fn get_settings(&self) -> Result<Settings> {
        Ok(self.get_doc(SETTINGS, SETTINGS_KEY)?.unwrap_or_default())
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        Self::put_doc(&self.conn, SETTINGS, SETTINGS_KEY, settings)
    }

    pub fn get_loads(&self) -> Result<LoadBook> {
        Ok(self.get_docs(LOADS)?.into_iter().collect())
    }

    pub fn save_load(&self, exercise: &str, record: &LoadRecord) -> Result<()> {
        Self::put_doc(&self.conn, LOADS, exercise, record)
    }

    /// Group documents are keyed "group/exercise"
    pub fn get_group_config(&self) -> Result<GroupConfig> {
        let mut config = GroupConfig::new();
        for (key, entry) in self.get_docs::<GroupConfigEntry>(GROUPS)? {
            match key.split_once('/') {
                Some((group, exercise)) => {
                    config
                        .entry(group.to_string())
                        .or_default()
                        .insert(exercise.to_string(), entry);
                }
                None => warn!("Ignoring group document with malformed key {:?}", key),
            }
        }
        Ok(config)
    }

    pub fn set_group_entry(&self, group: &str, exercise: &str, entry: &GroupConfigEntry) -> Result<()> {
        if !GROUP_KEYS.contains(&group) {
            bail!("unknown group {:?}, expected one of {}", group, GROUP_KEYS.join(", "));
        }
        if exercise.trim().is_empty() {
            bail!("exercise name must not be empty");
        }
        Self::put_doc(&self.conn, GROUPS, &format!("{}/{}", group, exercise), entry)
    }

    /// Append a session record
    pub fn add_session(&self, session: &SessionRecord) -> Result<i64> {
        Self::insert_session(&self.conn, session)
    }

    fn insert_session(conn: &Connection, session: &SessionRecord) -> Result<i64> {
        conn.execute(
            "INSERT INTO sessions (date, body) VALUES (?1, ?2)",
            params![session.date.to_string(), serde_json::to_string(session)?],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// All sessions, oldest first
    pub fn get_sessions(&self) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare("SELECT id, body FROM sessions ORDER BY date, id")?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut sessions = Vec::with_capacity(rows.len());
        for (id, body) in rows {
            match serde_json::from_str::<SessionRecord>(&body) {
                Ok(mut session) => {
                    session.id = Some(id);
                    sessions.push(session);
                }
                Err(e) => warn!("Skipping corrupt session {}: {}", id, e),
            }
        }
        Ok(sessions)
    }

    /// Persist a finished workout: session append and load upserts in one transaction
    pub fn commit_session(&mut self, finished: &FinishedSession) -> Result<i64> {
        let tx = self.conn.transaction()?;
        let id = Self::insert_session(&tx, &finished.record)?;
        for (exercise, record) in &finished.loads {
            Self::put_doc(&tx, LOADS, exercise, record)?;
        }
        tx.commit()?;

        info!(
            "Committed session {} ({} sets, {} load records)",
            id,
            finished.record.items.len(),
            finished.loads.len()
        );
        Ok(id)
    }

    /// Log body weight; the first entry also becomes the start weight
    pub fn log_weight(&mut self, date: NaiveDate, weight: f64) -> Result<UserProfile> {
        if !weight.is_finite() || weight <= 0.0 {
            bail!("body weight must be a positive number, got {}", weight);
        }

        let mut profile = self.get_profile()?;
        profile.current_weight = Some(weight);
        if profile.start_weight.is_none() {
            profile.start_weight = Some(weight);
        }
        if profile.start_date.is_none() {
            profile.start_date = Some(date);
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO weight_log (date, weight) VALUES (?1, ?2)",
            params![date.to_string(), weight],
        )?;
        Self::put_doc(&tx, PROFILE, PROFILE_KEY, &profile)?;
        tx.commit()?;
        debug!("Logged body weight {} on {}", weight, date);
        Ok(profile)
    }

    /// Weight log, oldest first
    pub fn get_weight_log(&self) -> Result<Vec<WeightEntry>> {
        let mut stmt = self.conn.prepare("SELECT date, weight FROM weight_log ORDER BY date, id")?;

        let entries: Vec<WeightEntry> = stmt
            .query_map([], |row| {
                let date_str: String = row.get(0)?;
                Ok((date_str, row.get::<_, f64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter_map(|(date_str, weight)| match date_str.parse::<NaiveDate>() {
                Ok(date) => Some(WeightEntry { date, weight }),
                Err(e) => {
                    warn!("Skipping weight entry with bad date {:?}: {}", date_str, e);
                    None
                }
            })
            .collect();

        Ok(entries)
    }

    /// Record a hang; only a new best is kept
    pub fn log_hang_time(&self, secs: u32) -> Result<UserProfile> {
        let mut profile = self.get_profile()?;
        if secs > profile.best_hang_secs {
            info!("New best hang: {}s (was {}s)", secs, profile.best_hang_secs);
            profile.best_hang_secs = secs;
            self.save_profile(&profile)?;
        }
        Ok(profile)
    }

    /// Wipe all stored data
    pub fn factory_reset(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM documents", [])?;
        tx.execute("DELETE FROM sessions", [])?;
        tx.execute("DELETE FROM weight_log", [])?;
        tx.commit()?;
        warn!("Factory reset: all data deleted");
        Ok(())
    }

    /// Load everything the planner needs
    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            profile: self.get_profile()?,
            settings: self.get_settings()?,
            groups: self.get_group_config()?,
            loads: self.get_loads()?,
            history: self.get_sessions()?,
        })
    }

    /// Plan a day. A storage failure degrades to an empty rest day.
    pub fn plan_for(&self, date: NaiveDate, today: NaiveDate) -> DayPlan {
        match self.snapshot() {
            Ok(snapshot) => plan_day(&snapshot.inputs(), date, today),
            Err(e) => {
                warn!("Cannot load planner inputs, falling back to rest day: {:#}", e);
                DayPlan::rest(date)
            }
        }
    }
}
