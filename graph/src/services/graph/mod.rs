//! Channel and node resolution shared by every reconciliation pass.
//!
//! A pass hands over the channel ids and node keys its primary records
//! reference. [`fetch::resolve`] looks each of them up once, follows our own
//! channels to the local channel list, [`adapt::adapt`] normalizes the
//! answers, and [`transform::transform_channel`] turns a channel stub into a
//! known or unknown channel record.

pub mod adapt;
pub mod fetch;
pub mod transform;
