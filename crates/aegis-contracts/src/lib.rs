//! # aegis-contracts
//!
//! Shared types and contracts for the Aegis mediation pipeline.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate: only data definitions and error types.

pub mod error;
pub mod intent;
pub mod mediation;
pub mod plan;
pub mod policy;
pub mod refusal;
pub mod verify;
