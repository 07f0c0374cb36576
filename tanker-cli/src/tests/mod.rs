//! Shared test harness modules for the tanker CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod dispatch_unit;
mod helpers;
