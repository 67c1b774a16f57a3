//! Read-only views over stitched records.
//!
//! Amounts come back as [`Satoshis`], fee rates as [`Rate`]. Fields that only
//! exist on a resolved variant (a known channel, the local node) return a
//! `ModelError` when read on the other variant.

pub mod channel;
pub mod forward;
pub mod invoice;
pub mod node;
pub mod payment;
pub mod satoshis;

pub use channel::{Channel, Fee, FeeUpdate, Htlc, Partner, Policy};
pub use forward::{Forward, ForwardChannel, ForwardsGroup};
pub use invoice::Invoice;
pub use node::Node;
pub use payment::{Hop, Payment, Request};
pub use satoshis::{BlocksDelta, Rate, Satoshis};
