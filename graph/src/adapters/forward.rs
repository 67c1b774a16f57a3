//! Adapter for `forwarding_history` events.

use super::{ChannelData, ForwardChannelData, ForwardData};
use crate::services::raw::RawForwardingEvent;
use crate::utils::{EntityKind, entity_key, from_unix_nanos};

fn side(chan_id: u64, amount: u64) -> ForwardChannelData {
    ForwardChannelData {
        amount,
        channel: ChannelData {
            id: chan_id.to_string(),
            ..Default::default()
        },
    }
}

/// lnd gives forwards no id of their own; the timestamp and the channel pair
/// identify one.
pub fn forwarding_history(raw: &RawForwardingEvent) -> ForwardData {
    let discriminator = format!(
        "{}:{}:{}",
        raw.timestamp_ns, raw.chan_id_in, raw.chan_id_out
    );

    ForwardData {
        key: entity_key(EntityKind::Forward, &discriminator),
        at: i64::try_from(raw.timestamp_ns)
            .ok()
            .and_then(from_unix_nanos),
        fee: raw.fee_msat,
        incoming: side(raw.chan_id_in, raw.amt_in_msat),
        outgoing: side(raw.chan_id_out, raw.amt_out_msat),
    }
}
