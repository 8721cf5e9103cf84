//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate API and ledger calls into use-case level APIs.
//! - Keep the CLI decoupled from transport and storage details.

pub mod lifelog_service;
pub mod processor;
