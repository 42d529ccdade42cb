//! Connection handle generation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque handle of one live client connection.
///
/// Published to clients as `socketId` in presence snapshots.
pub type ConnectionId = String;

/// Generates unique connection handles.
///
/// Format: node prefix + 6-char base36 counter, e.g. `"R01AAAAAC"`.
/// Handles are never reused for the lifetime of the process.
pub struct ConnectionIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl ConnectionIdGenerator {
    /// Create a generator for the given node prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Generate the next handle.
    pub fn next(&self) -> ConnectionId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, base36_encode_6(n))
    }
}

/// Encode a number as a 6-character base36 string (wraps past 36^6).
fn base36_encode_6(mut n: u64) -> String {
    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut out = [b'A'; 6];

    for slot in out.iter_mut().rev() {
        *slot = CHARS[(n % 36) as usize];
        n /= 36;
    }

    out.iter().map(|&b| b as char).collect()
}
