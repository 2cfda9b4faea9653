// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! stampsort: content-addressed renaming and dated sorting for image collections
//!
//! Files are renamed to `<YYYYMMDD.HHMMSS>-<sha256>[-<tag>]<ext>` and then moved
//! into `<year>/<year>-<month>/<technique>` under a classification root.

pub mod classify;
pub mod config;
pub mod error;
pub mod hasher;
pub mod history;
pub mod naming;
pub mod pipeline;
pub mod walk;

pub use config::AppConfig;
pub use error::{Result, StampsortError};
