//! Time abstractions
//!
//! - **[`clock`]**: wall-clock source for token expiry checks, with a
//!   controllable mock for tests
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use pca_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::at_unix(2_000);
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.unix_seconds(), 2_005);
//! ```

pub mod clock;

pub use clock::{Clock, MockClock, SystemClock};
