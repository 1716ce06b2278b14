// Library surface for the headless game core and integration tests.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod config;
pub mod events;
pub mod input;
pub mod judge;
pub mod runtime;
pub mod session;
pub mod target;
pub mod track;

/// Tick cadence of the animation loop; the indicator advances once per tick.
pub const TICK_RATE_MS: u64 = 16;
