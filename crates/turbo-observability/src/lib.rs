//! Structured logging for TurboCommerce client controllers.
//!
//! This crate provides:
//! - `StructuredLogger` - Component-scoped structured logging
//! - `LogBuilder` - Fluent field builder
//! - `LogLevel` / `LogFormat` - Filtering and output format, deserializable from config
//!
//! Entries are emitted as `tracing` events, so whatever subscriber the host
//! installs (`tracing-subscriber` natively, `tracing-wasm` in the browser)
//! decides where they end up.

mod logging;

pub use logging::*;
