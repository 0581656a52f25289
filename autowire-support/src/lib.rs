//! # Autowire Support
//!
//! Shared helpers for the autowire crates.
//!
//! This crate provides:
//! - Rendering of resolution chains for error messages
//! - "Did you mean?" suggestions for misspelled type identifiers

pub mod rendering;
