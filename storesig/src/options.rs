// Copyright (c) Storesig Contributors.
// Licensed under the MIT License.

use time::OffsetDateTime;

/// Options for a decode call.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Instant used for certificate validity-window checks.
    ///
    /// Defaults to the current system time. Tests pin this to keep chain
    /// validation deterministic.
    pub validation_time: Option<OffsetDateTime>,
}
