//! tasklink Conflict - Field divergence detection and resolution
//!
//! Provides:
//! - Title and due-date divergence detection for a linked pair
//! - Timestamp-based resolution with the local side winning ties
//! - Fixed-direction strategies for users who treat one store as primary
//!
//! ## Modules
//!
//! - [`detector`] - Compares a local item with its remote task
//! - [`policy`] - Decides which side wins and what to write where
//! - [`error`] - Error types

pub mod detector;
pub mod error;
pub mod policy;

pub use detector::{ConflictDetector, DetectionResult, FieldConflict};
pub use error::ConflictError;
pub use policy::{ConflictPolicy, ConflictStrategy, DueUpdate, Resolution, Winner};
