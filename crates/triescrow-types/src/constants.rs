//! System-wide constants for the triescrow custody engine.

/// Default custody unit label.
pub const DEFAULT_ASSET: &str = "ETH";

/// Default maximum decimal places of a deposit (wei precision).
pub const DEFAULT_AMOUNT_SCALE: u32 = 18;

/// Largest scale `rust_decimal` can represent.
pub const MAX_AMOUNT_SCALE: u32 = 28;

/// Default number of event records retained by the session sink.
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 10_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "triescrow";
