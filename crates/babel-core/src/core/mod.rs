//! # Core Module
//!
//! Stateless building blocks shared by every `obabel` job.
//!
//! - **Argument Grammar** ([`arguments`]) - Flag spelling, input-format inference and
//!   the coordinate-generation rule for line-notation formats
//! - **Listings** ([`listing`]) - Parsers for `-L formats read` and `-L forcefields`
//! - **Log Scanning** ([`scanner`]) - Extraction of step records from the minimiser log
//! - **Classification** ([`classifier`]) - Accept/reject decision for a finished process
//!
//! Nothing in this module spawns processes or holds state between calls; every
//! function takes the full text it needs and returns a value.

pub mod arguments;
pub mod classifier;
pub mod listing;
pub mod scanner;
