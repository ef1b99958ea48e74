// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! URL scan status types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome status of a URL scan as reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// URL is classified as safe
    Good,
    /// URL is classified as malicious or suspicious
    Bad,
    /// URL could not be classified
    Error,
}

impl ScanStatus {
    /// Check if the status represents a safe URL
    pub fn is_good(&self) -> bool {
        matches!(self, ScanStatus::Good)
    }

    /// Check if the status represents a malicious URL
    pub fn is_bad(&self) -> bool {
        matches!(self, ScanStatus::Bad)
    }

    /// Check if classification failed
    pub fn is_error(&self) -> bool {
        matches!(self, ScanStatus::Error)
    }

    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Good => "good",
            ScanStatus::Bad => "bad",
            ScanStatus::Error => "error",
        }
    }

    /// Get a default message for this status
    pub fn default_message(&self) -> &'static str {
        match self {
            ScanStatus::Good => "this URL is safe",
            ScanStatus::Bad => "this URL may pose a security risk",
            ScanStatus::Error => "unable to classify the URL",
        }
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
