//! Logging utilities
//!
//! Thin facade over the `log` crate so engine code logs the same way in
//! `no_std` builds and in the browser client (which installs `console_log`).

#![allow(unused)]

/// Log an info message
#[inline(always)]
pub fn info(msg: &str) {
    ::log::info!(target: "gridlane", "{}", msg);
}

/// Log a warning message
#[inline(always)]
pub fn warn(msg: &str) {
    ::log::warn!(target: "gridlane", "{}", msg);
}

/// Log an error message
#[inline(always)]
pub fn error(msg: &str) {
    ::log::error!(target: "gridlane", "{}", msg);
}

/// Log a debug message with a label
#[inline(always)]
pub fn debug(label: &str, msg: &str) {
    ::log::debug!(target: "gridlane", "[{}] {}", label, msg);
}

/// Log an action being performed
#[inline(always)]
pub fn action(name: &str, details: &str) {
    ::log::info!(target: "gridlane", "ACTION {}: {}", name, details);
}

/// Log turn state summary
#[inline(always)]
pub fn turn_summary(phase: &str, cycle: u32, last_slot: u8, busy_until: u64, living: usize) {
    ::log::debug!(
        target: "gridlane",
        "[TURN] phase={} cycle={} slot={} busy_until={} living={}",
        phase,
        cycle,
        last_slot,
        busy_until,
        living
    );
}
