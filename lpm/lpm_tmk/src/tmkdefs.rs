// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! TMK error definitions and result type alias.

use rtas_defs::RtasError;
use thiserror::Error;

/// Primary error type produced by TMK operations.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum TmkError {
    /// Returned when a second platform call channel is requested.
    #[error("the RTAS channel is already in use")]
    ChannelTaken,
    /// Returned when a platform call fails or cannot be marshalled.
    #[error("RTAS call failed")]
    Rtas(#[from] RtasError),
    /// Returned when the time of day did not move forward across a wait.
    #[error("time of day went from {before:#x} to {after:#x} across the wait")]
    TimeNotAdvanced {
        /// Packed stamp taken before the wait.
        before: u64,
        /// Packed stamp taken after the wait.
        after: u64,
    },
    /// Returned when the time of day advanced by less than the requested wait.
    #[error("time of day advanced {elapsed}s, expected at least {requested}s")]
    WaitTooShort {
        /// Seconds elapsed, modulo 64.
        elapsed: u64,
        /// Seconds requested.
        requested: u64,
    },
}

/// Result type alias for TMK operations using `TmkError`.
pub type TmkResult<T> = Result<T, TmkError>;
