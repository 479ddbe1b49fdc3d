// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printwatch Store — durable `KeyValueStore` implementation on SQLite.

pub mod sqlite;

pub use sqlite::SqliteStore;
