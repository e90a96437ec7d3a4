//! # aegis-policy
//!
//! The allow-listed action policy for the Aegis mediation pipeline.
//!
//! ## Overview
//!
//! This crate provides [`PolicyIndex`], which implements the
//! [`ActionPolicy`](aegis_core::traits::ActionPolicy) trait. An index is
//! built from a policy document (JSON or TOML) listing every action a plan
//! may contain, with its risk level and reversibility. Actions not listed are
//! not allowed.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use aegis_policy::{PolicyIndex, PolicyStore};
//!
//! let store = PolicyStore::new(PolicyIndex::from_file(Path::new("allowed_actions.json"))?);
//! let snapshot = store.snapshot();
//! // Pass `&*snapshot` to `Mediator::mediate(...)`.
//! ```
//!
//! ## Snapshots
//!
//! An index is never mutated after construction. To change policy, build a
//! new index and install it with [`PolicyStore::replace`].

pub mod document;
pub mod index;
pub mod store;

pub use document::{PolicyDocument, SkippedEntry};
pub use index::PolicyIndex;
pub use store::PolicyStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
