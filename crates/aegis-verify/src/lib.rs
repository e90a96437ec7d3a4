//! # aegis-verify
//!
//! Plan verification for the Aegis mediation pipeline.
//!
//! This crate provides [`pipeline::VerifierPipeline`], which implements the
//! [`aegis_core::traits::Verifier`] trait. It runs an ordered set of
//! independent [`check::PlanCheck`]s over a built plan and collects their
//! findings into one report. Two checks are built in:
//!
//! 1. **Confirmation-for-risk**: WARN when a Medium/High risk step does not
//!    require confirmation.
//! 2. **Scope-must-be-bounded**: BLOCK when a step has no scope constraints.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use aegis_verify::pipeline::VerifierPipeline;
//!
//! let mut pipeline = VerifierPipeline::standard();
//! pipeline.register_fn("no-empty-notes", Box::new(|plan| {
//!     if plan.notes.is_none() {
//!         vec![Finding::warn("plan carries no notes")]
//!     } else {
//!         vec![]
//!     }
//! }));
//! ```

pub mod check;
pub mod checks;
pub mod pipeline;

pub use check::{CheckFn, FnCheck, PlanCheck};
pub use checks::{ConfirmationForRisk, ScopeMustBeBounded};
pub use pipeline::VerifierPipeline;

// ── Tests ─────────────────────────────────────────────────────────────────────
//
// End-to-end: policy document → mediator → decision, using the real
// policy index and pipeline.
