//! Connection ids.
//!
//! Every accepted connection gets a uid that is never reused while the
//! process runs, even when the same identity rejoins. Log lines and the
//! registry's stale-leave guard both key on it.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for one accepted connection.
pub type Uid = String;

/// Digits after the prefix are zero-padded to at least this many places.
const MIN_DIGITS: usize = 6;

/// Hands out `CC000000`, `CC000001`, ..., `CC00000Z`, `CC000010`, ...
///
/// The sequence is upper-case base36 and simply grows a seventh digit once
/// six are used up.
pub struct UidGenerator {
    prefix: &'static str,
    issued: AtomicU64,
}

impl UidGenerator {
    pub const fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            issued: AtomicU64::new(0),
        }
    }

    pub fn next(&self) -> Uid {
        let seq = self.issued.fetch_add(1, Ordering::Relaxed);
        format!("{}{:0>width$}", self.prefix, base36(seq), width = MIN_DIGITS)
    }
}

impl Default for UidGenerator {
    fn default() -> Self {
        Self::new("CC")
    }
}

/// Upper-case base36 digits of `n`, most significant first.
fn base36(mut n: u64) -> String {
    let mut digits = Vec::new();
    loop {
        let digit = char::from_digit((n % 36) as u32, 36).unwrap_or('0');
        digits.push(digit.to_ascii_uppercase());
        n /= 36;
        if n == 0 {
            break;
        }
    }
    digits.into_iter().rev().collect()
}
