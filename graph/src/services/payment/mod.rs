//! Outgoing payments, reconciled against everything the node knows about the
//! requests, channels and nodes they touched.
//!
//! A pass runs [`fetch::fetch`] to take the snapshot and resolve lookups,
//! [`adapt::adapt`] to normalize it, and [`transform::transform`] to stitch
//! each payment into a self-contained record.

pub mod adapt;
pub mod fetch;
pub mod purpose;
pub mod transform;

use crate::errors::LightningError;
use crate::models::Payment;
use crate::services::node_manager::LightningClient;
use purpose::PurposeFilter;
use transform::PaymentRecord;

/// Runs one reconciliation pass and returns the stitched records.
pub async fn data<C: LightningClient + ?Sized>(
    client: &C,
    filter: PurposeFilter,
    limit: Option<usize>,
) -> Result<Vec<PaymentRecord>, LightningError> {
    let raw = fetch::fetch(client, filter, limit).await?;
    let adapted = adapt::adapt(&raw);

    Ok(adapted
        .payments
        .iter()
        .map(|payment| transform::transform(payment, &adapted))
        .collect())
}

pub fn model(records: Vec<PaymentRecord>) -> Vec<Payment> {
    records.into_iter().map(Payment::new).collect()
}

pub async fn all<C: LightningClient + ?Sized>(
    client: &C,
    filter: PurposeFilter,
    limit: Option<usize>,
) -> Result<Vec<Payment>, LightningError> {
    Ok(model(data(client, filter, limit).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FeeData, PaymentPurpose};
    use crate::errors::ModelError;
    use crate::services::fixture::FixtureClient;
    use crate::services::raw::{
        RawChannelEdge, RawChannelFee, RawFeeReport, RawGetInfo, RawHop, RawHtlcAttempt,
        RawInvoice, RawInvoiceState, RawLightningNode, RawLocalChannel, RawNodeInfo, RawPayReq,
        RawPayment, RawPaymentStatus, RawPaymentsPage, RawRoute, RawRoutingPolicy,
    };
    use crate::services::payment::transform::RequestResolution;
    use crate::utils::{EntityKind, entity_key};
    use std::collections::HashMap;

    const LOCAL: &str = "02local";
    const ALICE: &str = "03alice";
    const BOB: &str = "03bob";

    fn payment(hash: &str, request: &str, created: i64, hops: &[(u64, &str)]) -> RawPayment {
        RawPayment {
            payment_hash: hash.into(),
            payment_request: request.into(),
            value_msat: 10_000,
            fee_msat: 5,
            status: RawPaymentStatus::Succeeded,
            creation_time_ns: created,
            htlcs: vec![RawHtlcAttempt {
                route: Some(RawRoute {
                    hops: hops
                        .iter()
                        .map(|(chan_id, pub_key)| RawHop {
                            chan_id: *chan_id,
                            pub_key: pub_key.to_string(),
                            amt_to_forward_msat: 10_000,
                            ..Default::default()
                        })
                        .collect(),
                }),
            }],
            ..Default::default()
        }
    }

    fn page(payments: Vec<RawPayment>, last_index_offset: u64) -> RawPaymentsPage {
        RawPaymentsPage {
            payments,
            last_index_offset,
        }
    }

    fn node(public_key: &str, alias: &str) -> RawNodeInfo {
        RawNodeInfo {
            node: Some(RawLightningNode {
                pub_key: public_key.into(),
                alias: alias.into(),
                ..Default::default()
            }),
        }
    }

    fn routing_policy(base: i64, rate: i64) -> Option<RawRoutingPolicy> {
        Some(RawRoutingPolicy {
            time_lock_delta: 40,
            min_htlc: 1_000,
            fee_base_msat: base,
            fee_rate_milli_msat: rate,
            ..Default::default()
        })
    }

    fn edge(channel_id: u64, node1: &str, node2: &str) -> RawChannelEdge {
        RawChannelEdge {
            channel_id,
            chan_point: format!("{channel_id:064x}:0"),
            node1_pub: node1.into(),
            node2_pub: node2.into(),
            capacity: 1_000_000,
            node1_policy: routing_policy(1_000, 1),
            node2_policy: routing_policy(0, 94),
            ..Default::default()
        }
    }

    fn local_info() -> RawGetInfo {
        RawGetInfo {
            identity_pubkey: LOCAL.into(),
            alias: "me".into(),
            version: "0.17.0-beta".into(),
            ..Default::default()
        }
    }

    /// Three payments over two channel ids, one of them unresolvable, and two
    /// peers that are not the local node.
    fn public_fixture() -> FixtureClient {
        FixtureClient {
            get_info: local_info(),
            pages: HashMap::from([
                (
                    0,
                    page(
                        vec![
                            payment("h2", "lnbc1", 2, &[(100, ALICE), (200, BOB)]),
                            payment("h1", "lnbc1", 3, &[(100, ALICE), (200, BOB)]),
                        ],
                        2,
                    ),
                ),
                (2, page(vec![payment("h3", "", 1, &[(100, ALICE)])], 3)),
            ]),
            pay_reqs: HashMap::from([(
                "lnbc1".to_string(),
                RawPayReq {
                    destination: BOB.into(),
                    payment_hash: "h1".into(),
                    num_msat: 10_000,
                    description: "coffee".into(),
                    ..Default::default()
                },
            )]),
            channels: HashMap::from([(100, edge(100, ALICE, BOB))]),
            nodes: HashMap::from([
                (ALICE.to_string(), node(ALICE, "alice")),
                (BOB.to_string(), node(BOB, "bob")),
            ]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_each_lookup_runs_once_per_key() {
        let client = public_fixture();
        let records = data(&client, PurposeFilter::All, None).await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(client.max_calls_per_key(), 1);
        assert_eq!(client.calls("get_chan_info"), 2);
        assert_eq!(client.calls("get_node_info"), 2);
        assert_eq!(client.calls("decode_pay_req"), 1);
        assert_eq!(client.calls("lookup_invoice"), 3);
        assert_eq!(client.calls("list_channels"), 0);
        assert_eq!(client.calls("list_payments"), 3);
    }

    #[tokio::test]
    async fn test_end_to_end_records() {
        let client = public_fixture();
        let payments = all(&client, PurposeFilter::All, None).await.unwrap();

        let hashes: Vec<&str> = payments.iter().map(|payment| payment.hash()).collect();
        assert_eq!(hashes, ["h1", "h2", "h3"]);

        let first = &payments[0];
        assert_eq!(first.purpose(), PaymentPurpose::Payment);
        let request = first.request();
        assert_eq!(request.resolution(), RequestResolution::Decoded);
        assert_eq!(request.key(), entity_key(EntityKind::Request, "lnbc1"));
        assert_eq!(request.memo(), Some("coffee"));
        assert_eq!(request.destination(), Some(BOB));
        assert_eq!(request.key(), payments[1].request().key());

        let hops = first.hops();
        let known = hops[0].channel();
        assert!(known.known());
        assert_eq!(known.target(), Some(ALICE));
        assert_eq!(known.mine(), Ok(false));
        assert_eq!(
            known.accounting().unwrap_err(),
            ModelError::NotYourChannel("100".into())
        );
        let partners = known.partners().unwrap();
        assert_eq!(partners[0].node().alias(), Some("alice"));
        assert_eq!(partners[1].node().network(), "");
        assert!(partners[1].node().implementation().is_err());

        let unknown = hops[1].channel();
        assert!(!unknown.known());
        assert_eq!(unknown.key(), entity_key(EntityKind::Channel, "200"));
        assert_eq!(unknown.target(), Some(BOB));
        assert_eq!(
            unknown.accounting().unwrap_err(),
            ModelError::UnknownChannel("200".into())
        );
        assert_eq!(hops[1].peer().alias(), Some("bob"));
        assert_eq!(
            payments[1].hops()[1].channel().key(),
            unknown.key()
        );

        let direct = &payments[2];
        assert_eq!(direct.purpose(), PaymentPurpose::PeerToPeer);
        assert_eq!(direct.request().resolution(), RequestResolution::Unresolved);
        assert_eq!(direct.request().key(), entity_key(EntityKind::Request, ""));
    }

    #[tokio::test]
    async fn test_invoices_resolve_requests_and_undecodable_ones_degrade() {
        let decoded = |destination: &str, hash: &str| RawPayReq {
            destination: destination.into(),
            payment_hash: hash.into(),
            num_msat: 10_000,
            ..Default::default()
        };
        let client = FixtureClient {
            get_info: local_info(),
            pages: HashMap::from([(
                0,
                page(
                    vec![
                        payment("h1", "", 3, &[]),
                        payment("h2", "lnbc-garbled", 2, &[]),
                        payment("h3", "lnbc-shop", 1, &[]),
                    ],
                    3,
                ),
            )]),
            invoices: HashMap::from([(
                "h1".to_string(),
                RawInvoice {
                    memo: "refund".into(),
                    r_hash: "h1".into(),
                    value_msat: 10_000,
                    amt_paid_msat: 10_000,
                    payment_request: "lnbc-refund".into(),
                    state: RawInvoiceState::Settled,
                    ..Default::default()
                },
            )]),
            pay_reqs: HashMap::from([
                ("lnbc-refund".to_string(), decoded("03dest", "h1")),
                ("lnbc-shop".to_string(), decoded("03shop", "h3")),
            ]),
            ..Default::default()
        };

        let records = data(&client, PurposeFilter::All, None).await.unwrap();
        assert_eq!(client.calls("decode_pay_req"), 3);
        assert_eq!(client.calls("lookup_invoice"), 3);
        assert_eq!(client.max_calls_per_key(), 1);

        let invoice = &records[0].request;
        assert_eq!(invoice.resolution, RequestResolution::Invoice);
        assert_eq!(invoice.key, entity_key(EntityKind::Invoice, "h1"));
        assert_eq!(invoice.data.code.as_deref(), Some("lnbc-refund"));
        assert_eq!(invoice.data.destination.as_deref(), Some("03dest"));
        assert_eq!(invoice.data.paid, Some(10_000));

        let garbled = &records[1].request;
        assert_eq!(garbled.resolution, RequestResolution::Unresolved);
        assert_eq!(garbled.key, entity_key(EntityKind::Request, "lnbc-garbled"));
        assert_eq!(garbled.data.destination, None);

        let shop = &records[2].request;
        assert_eq!(shop.resolution, RequestResolution::Decoded);
        assert_eq!(shop.data.destination.as_deref(), Some("03shop"));
    }

    #[tokio::test]
    async fn test_pagination_stops_when_offset_does_not_advance() {
        let client = FixtureClient {
            get_info: local_info(),
            pages: HashMap::from([
                (0, page(vec![payment("h1", "", 1, &[])], 5)),
                (5, page(vec![payment("h2", "", 2, &[])], 5)),
            ]),
            ..Default::default()
        };

        let records = data(&client, PurposeFilter::All, None).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(client.calls("list_payments"), 2);
    }

    #[tokio::test]
    async fn test_filter_and_limit_apply_after_pagination() {
        let client = public_fixture();
        let direct = data(&client, "p2p".parse().unwrap(), None).await.unwrap();
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0].hash, "h3");

        let client = public_fixture();
        let newest = data(&client, PurposeFilter::All, Some(1)).await.unwrap();
        assert_eq!(newest.len(), 1);
        assert_eq!(newest[0].hash, "h1");
        assert_eq!(client.calls("list_payments"), 3);
        assert_eq!(client.calls("lookup_invoice"), 1);
    }

    #[tokio::test]
    async fn test_node_info_failure_is_fatal() {
        let mut client = public_fixture();
        client.nodes.remove(BOB);

        let result = data(&client, PurposeFilter::All, None).await;
        assert!(matches!(result, Err(LightningError::GetNodeInfoError(_))));
    }

    #[tokio::test]
    async fn test_own_channels_are_enriched() {
        let local_channel = |chan_id: u64, local_balance: i64| RawLocalChannel {
            active: true,
            remote_pubkey: ALICE.into(),
            chan_id,
            capacity: 1_000_000,
            local_balance,
            remote_balance: 1_000_000 - local_balance,
            total_satoshis_sent: 42,
            initiator: true,
            ..Default::default()
        };
        let client = FixtureClient {
            get_info: local_info(),
            fee_report: RawFeeReport {
                channel_fees: vec![RawChannelFee {
                    chan_id: 100,
                    base_fee_msat: 0,
                    fee_per_mil: 250,
                    ..Default::default()
                }],
            },
            pages: HashMap::from([(
                0,
                page(
                    vec![payment("h1", "", 1, &[(100, ALICE), (101, LOCAL)])],
                    1,
                ),
            )]),
            channels: HashMap::from([
                (100, edge(100, ALICE, LOCAL)),
                (101, edge(101, LOCAL, ALICE)),
            ]),
            nodes: HashMap::from([
                (ALICE.to_string(), node(ALICE, "alice")),
                (LOCAL.to_string(), node(LOCAL, "me")),
            ]),
            local_channels: HashMap::from([(
                ALICE.to_string(),
                vec![local_channel(100, 600_000), local_channel(101, 300_000)],
            )]),
            ..Default::default()
        };

        let payments = all(&client, PurposeFilter::All, None).await.unwrap();
        assert_eq!(client.calls("list_channels"), 1);
        assert_eq!(client.max_calls_per_key(), 1);

        let payment = &payments[0];
        assert_eq!(payment.purpose(), PaymentPurpose::Rebalance);

        let hops = payment.hops();
        let channel = hops[0].channel();
        assert_eq!(channel.mine(), Ok(true));
        assert_eq!(channel.target(), Some(ALICE));

        let accounting = channel.accounting().unwrap();
        assert_eq!(accounting.capacity.unwrap().satoshis(), 1_000_000);
        assert_eq!(accounting.sent.unwrap().satoshis(), 42);

        let myself = channel.myself().unwrap();
        assert!(myself.node().myself());
        assert_eq!(myself.node().version(), Ok("0.17.0-beta"));
        assert_eq!(myself.balance().unwrap().satoshis(), 600_000);
        assert_eq!(
            myself.policy().unwrap().fee().to_data(),
            Some(FeeData {
                base: Some(0),
                rate: Some(250),
            })
        );

        let partner = channel.partner().unwrap();
        assert_eq!(partner.node().alias(), Some("alice"));
        assert_eq!(partner.balance().unwrap().satoshis(), 400_000);
        assert_eq!(partner.policy().unwrap().fee().rate.unwrap().parts_per_million(), 1);

        let other = hops[1].channel();
        assert_eq!(other.myself().unwrap().balance().unwrap().satoshis(), 300_000);
        assert!(hops[1].peer().myself());
    }
}
