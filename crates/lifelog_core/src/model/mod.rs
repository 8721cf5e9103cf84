//! Lifelog domain model and payload validation.
//!
//! # Responsibility
//! - Define the typed records exchanged with the remote journaling API.
//! - Validate untrusted JSON before it reaches services.
//!
//! # Invariants
//! - Every record leaving this module has passed structural and semantic checks.

pub mod lifelog;
pub mod validation;
