//! Payment purpose classification and the purpose filter.

use crate::adapters::PaymentPurpose;
use crate::services::raw::RawPayment;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Classifies a payment from the route of its last HTLC attempt.
///
/// Two hops over the same channel is a payment to ourselves, a single hop goes
/// straight to a peer, and a longer route that ends at the local node moves
/// liquidity between our own channels.
pub fn classify(payment: &RawPayment, local_public_key: &str) -> PaymentPurpose {
    let Some(route) = payment.last_route() else {
        return PaymentPurpose::Payment;
    };
    let hops = &route.hops;

    if hops.len() == 2 && hops[0].chan_id == hops[1].chan_id {
        return PaymentPurpose::SelfPayment;
    }
    if hops.len() == 1 {
        return PaymentPurpose::PeerToPeer;
    }
    if hops.len() > 1 && hops.last().is_some_and(|hop| hop.pub_key == local_public_key) {
        return PaymentPurpose::Rebalance;
    }
    PaymentPurpose::Payment
}

/// Which payments a pass keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PurposeFilter {
    #[default]
    All,
    Only(PaymentPurpose),
    Except(PaymentPurpose),
}

impl PurposeFilter {
    pub fn matches(&self, purpose: PaymentPurpose) -> bool {
        match self {
            PurposeFilter::All => true,
            PurposeFilter::Only(wanted) => *wanted == purpose,
            PurposeFilter::Except(unwanted) => *unwanted != purpose,
        }
    }
}

impl PaymentPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentPurpose::SelfPayment => "self-payment",
            PaymentPurpose::PeerToPeer => "peer-to-peer",
            PaymentPurpose::Rebalance => "rebalance",
            PaymentPurpose::Payment => "payment",
        }
    }
}

impl Display for PaymentPurpose {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentPurpose {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().as_str() {
            "self-payment" | "self" => Ok(PaymentPurpose::SelfPayment),
            "peer-to-peer" | "p2p" => Ok(PaymentPurpose::PeerToPeer),
            "rebalance" => Ok(PaymentPurpose::Rebalance),
            "payment" => Ok(PaymentPurpose::Payment),
            _ => Err(format!("Invalid payment purpose: {}", input)),
        }
    }
}

impl FromStr for PurposeFilter {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        if input.is_empty() || input.eq_ignore_ascii_case("all") {
            return Ok(PurposeFilter::All);
        }
        match input.strip_prefix('!') {
            Some(negated) => Ok(PurposeFilter::Except(negated.parse()?)),
            None => Ok(PurposeFilter::Only(input.parse()?)),
        }
    }
}
