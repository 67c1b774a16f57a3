//! Field level gap filling between views of the same entity.
//!
//! `fill_gaps` copies a field from `other` only when `self` does not have it.
//! Nested groups are filled one level deep: a missing group is copied whole,
//! a present group only receives its missing fields.

use super::{
    ChannelAccounting, ChannelData, DescriptionData, FeeData, HtlcData, PartnerAccounting,
    PartnerData, PolicyData, RequestData, SecretData,
};

pub trait FillGaps {
    /// Copies every field absent on `self` from `other`.
    fn fill_gaps(&mut self, other: &Self);
}

/// Folds `sources` from highest to lowest precedence; the first source is the
/// base and each later one only fills what is still missing.
pub fn merge_in_order<'a, T, I>(sources: I) -> Option<T>
where
    T: FillGaps + Clone + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut sources = sources.into_iter();
    let mut merged = sources.next()?.clone();
    for source in sources {
        merged.fill_gaps(source);
    }
    Some(merged)
}

fn fill<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
    if target.is_none() {
        target.clone_from(source);
    }
}

fn fill_nested<T: FillGaps + Clone>(target: &mut Option<T>, source: &Option<T>) {
    if let Some(present) = target.as_mut() {
        if let Some(source) = source {
            present.fill_gaps(source);
        }
    } else {
        target.clone_from(source);
    }
}

impl FillGaps for FeeData {
    fn fill_gaps(&mut self, other: &Self) {
        fill(&mut self.base, &other.base);
        fill(&mut self.rate, &other.rate);
    }
}

impl FillGaps for HtlcData {
    fn fill_gaps(&mut self, other: &Self) {
        fill(&mut self.minimum, &other.minimum);
        fill(&mut self.maximum, &other.maximum);
        fill(&mut self.blocks_delta, &other.blocks_delta);
    }
}

impl FillGaps for PolicyData {
    fn fill_gaps(&mut self, other: &Self) {
        fill(&mut self.fee, &other.fee);
        fill(&mut self.htlc, &other.htlc);
        fill(&mut self.disabled, &other.disabled);
        fill(&mut self.updated_at, &other.updated_at);
    }
}

impl FillGaps for PartnerAccounting {
    fn fill_gaps(&mut self, other: &Self) {
        fill(&mut self.balance, &other.balance);
    }
}

impl FillGaps for PartnerData {
    fn fill_gaps(&mut self, other: &Self) {
        fill(&mut self.public_key, &other.public_key);
        fill_nested(&mut self.policy, &other.policy);
        fill_nested(&mut self.accounting, &other.accounting);
        fill(&mut self.initiator, &other.initiator);
    }
}

impl FillGaps for ChannelAccounting {
    fn fill_gaps(&mut self, other: &Self) {
        fill(&mut self.capacity, &other.capacity);
        fill(&mut self.sent, &other.sent);
        fill(&mut self.received, &other.received);
        fill(&mut self.unsettled, &other.unsettled);
    }
}

/// Partners, identity and the `known`/`mine`/`target` annotations are owned by
/// the stitcher and left untouched here.
impl FillGaps for ChannelData {
    fn fill_gaps(&mut self, other: &Self) {
        fill(&mut self.point, &other.point);
        fill(&mut self.opened_at, &other.opened_at);
        fill(&mut self.up_at, &other.up_at);
        fill(&mut self.updated_at, &other.updated_at);
        fill(&mut self.state, &other.state);
        fill(&mut self.exposure, &other.exposure);
        fill_nested(&mut self.accounting, &other.accounting);
    }
}

impl FillGaps for DescriptionData {
    fn fill_gaps(&mut self, other: &Self) {
        fill(&mut self.memo, &other.memo);
        fill(&mut self.hash, &other.hash);
    }
}

impl FillGaps for SecretData {
    fn fill_gaps(&mut self, other: &Self) {
        fill(&mut self.hash, &other.hash);
        fill(&mut self.preimage, &other.preimage);
    }
}

impl FillGaps for RequestData {
    fn fill_gaps(&mut self, other: &Self) {
        fill(&mut self.code, &other.code);
        fill(&mut self.amount, &other.amount);
        fill_nested(&mut self.description, &other.description);
        fill_nested(&mut self.secret, &other.secret);
        fill(&mut self.address, &other.address);
        fill(&mut self.destination, &other.destination);
        fill(&mut self.created_at, &other.created_at);
        fill(&mut self.expires_at, &other.expires_at);
        fill(&mut self.settled_at, &other.settled_at);
        fill(&mut self.paid, &other.paid);
        fill(&mut self.state, &other.state);
    }
}
