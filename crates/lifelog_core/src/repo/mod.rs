//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the processing-ledger contract used by orchestration code.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Duplicate prevention is enforced by the storage unique key, never by an
//!   in-memory set.
//! - Repository APIs return semantic errors (`Closed`, `Duplicate`) in
//!   addition to DB transport errors.

pub mod ledger_repo;
