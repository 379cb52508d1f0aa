//! Structured logging setup.
//!
//! # Telemetry invariants
//!
//! - **No key material** may appear in any span attribute or log field. Log
//!   type URLs, key ids, and lengths instead.
//! - Log level is configurable via `CONSTKEY_LOG_LEVEL` (default: `info`).

pub mod init;

pub use init::init_telemetry;
