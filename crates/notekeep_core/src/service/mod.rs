//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into owner-scoped use-case APIs.
//! - Keep façades (CLI, HTTP) decoupled from storage details.
//!
//! # Invariants
//! - Every note/tag operation takes an `AuthContext` and passes the gate in
//!   `auth` before touching storage.

pub mod auth;
pub mod error;
pub mod note_service;
pub mod tag_service;
pub mod user_service;
