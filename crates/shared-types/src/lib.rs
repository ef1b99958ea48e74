// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared types for the URL scan service
//!
//! This crate provides common types that are shared across multiple crates
//! in the URL scan workspace, avoiding circular dependencies.

pub mod scan_status;

pub use scan_status::ScanStatus;
