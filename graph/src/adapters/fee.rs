//! Fee report adapter.

use super::{FeeData, FeeReportEntry};
use crate::services::raw::RawChannelFee;
use crate::utils::{ShortChannelID, msat, non_empty};

pub fn fee_report(raw: &RawChannelFee) -> FeeReportEntry {
    FeeReportEntry {
        channel_id: ShortChannelID(raw.chan_id),
        point: non_empty(&raw.channel_point),
        fee: FeeData {
            base: Some(msat(raw.base_fee_msat)),
            rate: Some(msat(raw.fee_per_mil)),
        },
    }
}
