//! liftlog - Personal strength training planner
//!
//! Weekday schedule, unlockable exercises and progressive overload with
//! automatic deloads.

pub mod db;
pub mod engine;
pub mod exercises;
pub mod tui;

pub use db::Database;
