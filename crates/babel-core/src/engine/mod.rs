//! # Engine Module
//!
//! The stateful machinery behind a single `obabel` job.
//!
//! ## Overview
//!
//! A job starts by taking the service's [`slot::JobSlot`]; only one job may hold
//! it at a time and a second request is refused on the spot rather than queued.
//! The [`launcher::ProcessLauncher`] then starts the child process and hands back
//! a [`launcher::ProcessHandle`] that streams standard-error chunks and finally
//! one completion event. A [`job::JobContext`] owns everything that only makes
//! sense while the slot is held (the abort flag, the optimisation log) and
//! releases the slot when it is consumed.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Executable resolution and service settings
//! - **Job Slot** ([`slot`]) - Single-capacity guard with abort support
//! - **Process Launching** ([`launcher`]) - Child process spawning and I/O collection
//! - **Job Context** ([`job`]) - Pending operation record and per-job state
//! - **Progress** ([`progress`]) - Events delivered to the caller of an operation
//! - **Error Handling** ([`error`]) - Engine-level error types

pub mod config;
pub mod error;
pub mod job;
pub mod launcher;
pub mod progress;
pub mod slot;
