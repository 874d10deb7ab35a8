//! # babelrun Core Library
//!
//! Job control for the Open Babel command-line converter (`obabel`). The library
//! runs the external tool as a single-flight background job: it assembles the
//! argument vector, streams an optional payload to the child's standard input,
//! collects standard output and standard error asynchronously, decides from the
//! tool's diagnostics whether the captured output is usable, and reports
//! incremental progress for geometry optimisations.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout so that the text protocols, the
//! concurrency machinery and the public entry points can be tested in isolation.
//!
//! - **[`core`]: The Foundation.** Stateless, synchronous pieces: the argument
//!   grammar of `obabel`, the listing parsers, the optimisation log scanner and
//!   the completion classifier.
//!
//! - **[`engine`]: The Logic Core.** The stateful machinery of a single job: the
//!   single-capacity [`engine::slot::JobSlot`], the asynchronous
//!   [`engine::launcher::ProcessLauncher`], the per-job context that owns the
//!   abort flag and the optimisation log, and the event channel a caller listens on.
//!
//! - **[`workflows`]: The Public API.** [`workflows::service::BabelService`] ties the
//!   engine and the core together behind the five operations (format discovery,
//!   file read, convert, force-field discovery, geometry optimisation).

pub mod core;
pub mod engine;
pub mod workflows;
