//! Common types and utilities for the gradus type checker.
//!
//! This crate provides foundational types used across all gradus crates:
//! - Interned names (`Atom`, `Interner`)
//! - Checker limits and thresholds
//! - Diagnostic categories shared by the solver and the validator

// Name interning for type, method and variable names
pub mod interner;
pub use interner::{Atom, Interner};

// Centralized limits and thresholds
pub mod limits;

// Diagnostic categories
pub mod diagnostics;
pub use diagnostics::DiagnosticCategory;
