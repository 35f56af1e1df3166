//! Shared test utilities for invoice-review integration tests.
//!
//! This module provides:
//! - `FakeBackend`, an `OrderBackend` that replays scripted HTTP answers and
//!   records every request it receives
//! - Builders for records and line items

pub mod builders;
pub mod fake_backend;

#[allow(unused_imports)]
pub use builders::*;
#[allow(unused_imports)]
pub use fake_backend::{Call, FakeBackend};
