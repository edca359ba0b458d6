//! Integer Millisecond Clock Arithmetic
//!
//! Every clock quantity in the game is an integer count of milliseconds.
//! All operations are integer-only, so repeated ticks accumulate exactly.
//!
//! ## Format
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Millis = i64                                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  1 second  = 1_000                                          │
//! │  1 tick    =   100  (0.1 s at the 10 Hz driver cadence)     │
//! │  20 ticks  = 2_000  (exactly, no float drift)               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Signed so that "subtract, then test for `<= 0`" reads the same as the
//! rules describe it. Stored values are always clamped back to `>= 0`.

/// Milliseconds, stored as i64.
pub type Millis = i64;

/// Milliseconds per second (1000)
pub const MILLIS_PER_SECOND: Millis = 1_000;

/// Zero time
pub const MILLIS_ZERO: Millis = 0;

/// Default tick delta: 0.1 s
pub const TICK_DELTA: Millis = 100;

/// Convert whole seconds to milliseconds.
///
/// # Example
/// ```
/// use debate_clock::core::millis::{from_secs, MILLIS_PER_SECOND};
/// assert_eq!(from_secs(3), 3 * MILLIS_PER_SECOND);
/// ```
#[inline]
pub const fn from_secs(secs: u32) -> Millis {
    secs as Millis * MILLIS_PER_SECOND
}

/// Convert milliseconds to seconds for display/serialization.
///
/// # Warning
/// Only use for output. NEVER feed the result back into clock logic.
#[inline]
pub fn to_secs_f64(ms: Millis) -> f64 {
    ms as f64 / MILLIS_PER_SECOND as f64
}

/// Whole seconds for a countdown display: rounded up, never negative.
///
/// 9_001 ms shows as 10, 9_000 ms as 9, anything `<= 0` as 0.
#[inline]
pub fn ceil_secs(ms: Millis) -> u64 {
    if ms <= 0 {
        return 0;
    }
    ((ms + MILLIS_PER_SECOND - 1) / MILLIS_PER_SECOND) as u64
}

/// Subtract `delta` from `value`, reporting whether the result ran out.
///
/// Returns `(remaining, expired)` where `remaining` is clamped to `>= 0`
/// and `expired` is true when the unclamped result was `<= 0`.
#[inline]
pub fn countdown(value: Millis, delta: Millis) -> (Millis, bool) {
    let next = value.saturating_sub(delta);
    if next <= 0 {
        (MILLIS_ZERO, true)
    } else {
        (next, false)
    }
}

/// Format milliseconds as `M:SS` (rounded up), for logs and consoles.
pub fn format_clock(ms: Millis) -> String {
    let secs = ceil_secs(ms);
    format!("{}:{:02}", secs / 60, secs % 60)
}
