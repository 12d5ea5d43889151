//! Start-up timing decisions, kept free of timers so they run on the host.

use crate::config::{SCAN_PERIOD_MS, STARTUP_DELAY_MS};

/// Total delay from power-up to the first scan and the module's own
/// start-of-day announcement.
pub fn startup_delay_ms(sod_delay_ms: u64) -> u64 {
    STARTUP_DELAY_MS.saturating_add(sod_delay_ms)
}

/// Whether the start-up hold-off is over.
pub fn startup_complete(elapsed_ms: u64, sod_delay_ms: u64) -> bool {
    elapsed_ms > startup_delay_ms(sod_delay_ms)
}

/// Scan ticks between consecutive start-of-day response messages.
///
/// `RESPONSE_DELAY` is in milliseconds; a response is paced no faster than
/// one message per scan.
pub fn sod_ticks_per_step(response_delay_ms: u8) -> u32 {
    (response_delay_ms as u64).div_ceil(SCAN_PERIOD_MS).max(1) as u32
}
