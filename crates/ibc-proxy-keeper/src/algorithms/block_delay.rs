//! # Block Delay
//!
//! Converts a connection's time delay into the matching block delay.

/// Number of blocks covering `time_delay` at `expected_time_per_block`,
/// rounded up. An expected block time of zero disables block delays.
pub fn block_delay(time_delay: u64, expected_time_per_block: u64) -> u64 {
    if expected_time_per_block == 0 {
        return 0;
    }
    time_delay.div_ceil(expected_time_per_block)
}
