//! Diagnos Domain Layer
//!
//! This crate contains the value objects and trait interfaces of the Diagnos
//! cognitive diagnosis engine. It carries no infrastructure dependencies:
//! file formats, locking and numerics live in the store and engine crates.
//!
//! ## Key Concepts
//!
//! - **Q-matrix**: binary items x skills matrix, `(i, k) = 1` when item `i` requires skill `k`
//! - **Response vector**: one binary answer per item (1 = correct)
//! - **Skill pattern**: one binary mastery flag per skill
//! - **Latent class**: one of the `2^K` possible skill patterns
//! - **Item parameters**: DINA guess / no-slip probabilities per item
//!
//! ## Architecture
//!
//! - Pure data and validation only
//! - Shape and binarity are checked at construction, so downstream numeric
//!   code never sees malformed input
//! - Trait definitions for the Q-matrix store and the response log

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cohort;
pub mod error;
pub mod latent;
pub mod matrix;
pub mod params;
pub mod pattern;
pub mod qmatrix;
pub mod response;
pub mod traits;

// Re-exports for convenience
pub use cohort::CohortId;
pub use error::DiagnosisError;
pub use latent::LatentClassSpace;
pub use matrix::BinaryMatrix;
pub use params::ItemParameters;
pub use pattern::{hamming_distance, SkillPattern};
pub use qmatrix::{QMatrix, MAX_SKILLS};
pub use response::{ResponseMatrix, ResponseVector};
