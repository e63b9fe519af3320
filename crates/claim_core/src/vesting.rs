use alloy_primitives::U256;

use crate::types::{CurveType, VestingRecord};

pub const SECONDS_PER_WEEK: u64 = 7 * 24 * 3600;

pub fn duration_seconds(duration_weeks: u16) -> u64 {
    u64::from(duration_weeks) * SECONDS_PER_WEEK
}

/// Seconds the schedule has been running at `as_of`. A pausing date freezes the
/// clock. Timestamps before the start date count as zero elapsed.
pub fn elapsed_seconds(record: &VestingRecord, as_of: u64) -> u64 {
    let until = if record.pausing_date > 0 {
        record.pausing_date
    } else {
        as_of
    };
    until.saturating_sub(record.start_date)
}

/// Amount of `record` unlocked at `as_of`, rounded down.
pub fn vested_amount(record: &VestingRecord, as_of: u64) -> u128 {
    let duration = duration_seconds(record.duration_weeks);
    let elapsed = elapsed_seconds(record, as_of);
    if elapsed >= duration {
        return record.amount;
    }

    // elapsed < duration here, so duration > 0 and the quotient stays below amount
    let amount = U256::from(record.amount);
    let elapsed = U256::from(elapsed);
    let duration = U256::from(duration);
    let vested = match record.curve {
        CurveType::Linear => amount * elapsed / duration,
        CurveType::Exponential => amount * elapsed * elapsed / (duration * duration),
    };
    vested.to::<u128>()
}

/// Vested tokens not claimed yet. Records claiming more than has vested report zero.
pub fn available(record: &VestingRecord, as_of: u64) -> u128 {
    vested_amount(record, as_of).saturating_sub(record.amount_claimed)
}
