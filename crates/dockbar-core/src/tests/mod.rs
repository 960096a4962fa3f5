//! Test module for dockbar-core
//!
//! This module contains tests for:
//! - The refresh transaction and its notifications
//! - Pin substitution and restoration
//! - Regrouping and index-ordered display
//! - Property-based checks of the ordering invariants
//! - Configuration loading, saving and pin editing

// Test modules use test-specific casts
#![allow(clippy::cast_possible_truncation)]

mod fixtures;
