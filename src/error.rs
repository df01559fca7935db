// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Domain failures checked before any write reaches the store.
/// Store-level failures stay `rusqlite::Error` and bubble up through anyhow.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("Account '{0}' not found")]
    AccountNotFound(String),

    #[error("Transaction {0} not found")]
    TransactionNotFound(i64),

    #[error("Balance history entry {0} not found")]
    SnapshotNotFound(i64),

    #[error("Not authorized to access this record")]
    Unauthorized,
}
