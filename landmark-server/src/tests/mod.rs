//! Unit tests for service configuration and error mapping.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected outcomes"
)]

use super::*;

mod api_error;
