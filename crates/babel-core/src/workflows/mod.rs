//! # Workflows Module
//!
//! Public entry points of the library.
//!
//! ## Overview
//!
//! [`service::BabelService`] exposes the five `obabel` operations. Each call
//! either refuses immediately with [`crate::engine::error::EngineError::Busy`]
//! or starts a background job and returns a [`crate::engine::progress::JobHandle`]
//! through which progress and the final result arrive. A rejected job yields an
//! empty result; an aborted job yields nothing at all.
//!
//! ## Architecture
//!
//! - **Service** ([`service`]) - Operation façade, job driver and abort entry point

pub mod service;
