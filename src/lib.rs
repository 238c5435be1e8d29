//! GLAM Usage Tracking Library
//!
//! A library for tracking media usage statistics of GLAM content categories
//! over time. Each run ingests one already-rendered report document from the
//! upstream statistics tool, persists it as an immutable timestamped snapshot
//! directory, and reports what changed against the previous capture and, at
//! month boundaries, against the earliest capture of the reference month.
//!
//! ## Architecture Overview
//!
//! - [`models`] - Core data structures: snapshots, media files, page usages,
//!   identity keys, and the persisted metadata record
//! - [`normalize`] - Locale-formatted number parsing shared by everything
//!   that reads counts from rendered text
//! - [`extract`] - Permissive extraction of summary counters and file/usage
//!   tables from a rendered report document
//! - [`store`] - Snapshot directory enumeration, loading with structured
//!   record preference, latest/earliest-in-month queries, and the append-only
//!   write side
//! - [`diff`] - Summary counter deltas plus file-level and usage-level set
//!   deltas between snapshots
//! - [`report`] - Deterministic comparison report rendering and the compact
//!   change label
//! - [`tracker`] - The per-capture orchestrator tying the pipeline together
//! - [`period`] - Reporting period arithmetic (previous month, month
//!   boundaries)
//! - [`config`] - Layered configuration (defaults, TOML file, environment)
//! - [`logging`] - Structured logging setup
//!
//! ## Main Entry Point
//!
//! The primary interface is [`UsageTracker`]:
//!
//! ```rust,no_run
//! use glam_usage::{CaptureParams, UsageTracker};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let tracker = UsageTracker::new();
//! let document = std::fs::read_to_string("report.html")?;
//! let params = CaptureParams::from_config();
//! let outcome = tracker.record_capture(&document, Path::new("reports"), &params)?;
//! println!("{} ({} usage changes)", outcome.directory.display(), outcome.usage_changes);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod diff;
pub mod extract;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod period;
pub mod report;
pub mod store;
pub mod timestamp;
pub mod tracker;

pub use models::*;
pub use tracker::{CaptureOutcome, CaptureParams, UsageTracker};
