//! Manages the connection to a Lightning node and exposes its RPC surface.
//!
//! `LightningClient` is the collaborator contract the reconciliation pass is
//! written against: one method per RPC, each returning the raw response shape
//! from `services::raw`. `LndNode` implements it over lnd's gRPC interface.

use crate::{
    errors::LightningError,
    services::raw::{
        NewInvoice, PolicyUpdate, RawAddedInvoice, RawChain, RawChannelEdge, RawChannelFee,
        RawFeeReport, RawForwardingEvent, RawForwardsPage, RawGetInfo, RawHop, RawHtlcAttempt,
        RawInvoice, RawInvoiceState, RawInvoicesPage, RawLightningNode, RawLocalChannel,
        RawNodeInfo, RawPayReq, RawPayment, RawPaymentStatus, RawPaymentsPage, RawRoute,
        RawRoutingPolicy,
    },
    utils::NodeId,
};

use async_trait::async_trait;
use bitcoin::{Network, secp256k1::PublicKey};
use chrono::Utc;
use std::{convert::TryFrom, str::FromStr};
use tokio::sync::Mutex;
use tonic_lnd::{
    Client,
    lnrpc::{
        self, ChanInfoRequest, ChannelPoint, FeeReportRequest, ForwardingHistoryRequest,
        GetInfoRequest, ListChannelsRequest, ListInvoiceRequest, ListPaymentsRequest,
        NodeInfoRequest, PayReqString, PaymentHash, PolicyUpdateRequest, channel_point::FundingTxid, invoice::InvoiceState,
        payment::PaymentStatus, policy_update_request::Scope,
    },
};

/// Page size requested from the paginated history RPCs.
const PAGE_SIZE: u32 = 10_000;

#[derive(Debug, Clone)]
pub struct LndConnection {
    pub id: NodeId,
    pub address: String,
    pub macaroon: String,
    pub cert: String,
}

pub struct LndNode {
    pub client: Mutex<Client>,
}

impl LndNode {
    pub async fn new(connection: LndConnection) -> Result<Self, LightningError> {
        let mut client =
            tonic_lnd::connect(connection.address, connection.cert, connection.macaroon)
                .await
                .map_err(|err| LightningError::ConnectionError(err.to_string()))?;

        let info = client
            .lightning()
            .get_info(GetInfoRequest {})
            .await
            .map_err(|err| LightningError::GetInfoError(err.to_string()))?
            .into_inner();

        let public_key = PublicKey::from_str(&info.identity_pubkey)
            .map_err(|err| LightningError::GetInfoError(err.to_string()))?
            .to_string();
        connection.id.validate(&public_key, &info.alias)?;

        let network = {
            if info.chains.is_empty() {
                return Err(LightningError::GetInfoError(
                    "node is not connected to any chain".to_string(),
                ));
            } else if info.chains.len() > 1 {
                return Err(LightningError::GetInfoError(format!(
                    "node is connected to more than one chain: {:?}",
                    info.chains.iter().map(|c| c.chain.to_string()).collect::<Vec<_>>()
                )));
            }

            Network::from_str(match info.chains[0].network.as_str() {
                "mainnet" => "bitcoin",
                x => x,
            })
            .map_err(|e| LightningError::GetInfoError(e.to_string()))?
        };

        tracing::info!("Connected to LND node {} ({}) on {}", info.alias, public_key, network);

        Ok(Self {
            client: Mutex::new(client),
        })
    }

    /// Clones the lightning stub so calls can run concurrently without holding the lock.
    async fn get_lightning_stub(&self) -> tonic_lnd::LightningClient {
        let mut client = self.client.lock().await;
        client.lightning().clone()
    }
}

/// Unified interface over the node RPCs the reconciliation pass needs.
#[async_trait]
pub trait LightningClient: Send + Sync {
    /// Local identity and platform snapshot.
    async fn get_info(&self) -> Result<RawGetInfo, LightningError>;
    /// One page of payments starting after `index_offset`.
    async fn list_payments(&self, index_offset: u64) -> Result<RawPaymentsPage, LightningError>;
    /// Fee policy currently applied to each local channel.
    async fn fee_report(&self) -> Result<RawFeeReport, LightningError>;
    /// Decodes an encoded payment request.
    async fn decode_pay_req(&self, pay_req: &str) -> Result<RawPayReq, LightningError>;
    /// Looks up an invoice held by this node by its hex payment hash.
    async fn lookup_invoice(&self, r_hash_str: &str) -> Result<RawInvoice, LightningError>;
    /// Channel gossip for a numeric channel id.
    async fn get_chan_info(&self, chan_id: u64) -> Result<RawChannelEdge, LightningError>;
    /// Public information about a node.
    async fn get_node_info(&self, pub_key: &str) -> Result<RawNodeInfo, LightningError>;
    /// Local channels shared with the given remote public key.
    async fn list_channels(&self, peer: &str) -> Result<Vec<RawLocalChannel>, LightningError>;
    /// Updates the local policy of a single channel.
    async fn update_channel_policy(&self, update: &PolicyUpdate) -> Result<(), LightningError>;
    /// One page of invoices issued by this node, oldest first, after `index_offset`.
    async fn list_invoices(&self, index_offset: u64) -> Result<RawInvoicesPage, LightningError>;
    /// Issues a new invoice.
    async fn add_invoice(&self, invoice: &NewInvoice) -> Result<RawAddedInvoice, LightningError>;
    /// One page of forwarding events newer than `start_time` (unix seconds).
    async fn forwarding_history(
        &self,
        index_offset: u32,
        start_time: u64,
    ) -> Result<RawForwardsPage, LightningError>;
}

#[async_trait]
impl LightningClient for LndNode {
    async fn get_info(&self) -> Result<RawGetInfo, LightningError> {
        let mut lightning_stub = self.get_lightning_stub().await;
        let info = lightning_stub
            .get_info(GetInfoRequest {})
            .await
            .map_err(|err| LightningError::GetInfoError(err.to_string()))?
            .into_inner();

        Ok(RawGetInfo {
            identity_pubkey: info.identity_pubkey,
            alias: info.alias,
            color: info.color,
            version: info.version,
            chains: info
                .chains
                .into_iter()
                .map(|chain| RawChain {
                    chain: chain.chain,
                    network: chain.network,
                })
                .collect(),
        })
    }

    async fn list_payments(&self, index_offset: u64) -> Result<RawPaymentsPage, LightningError> {
        let mut lightning_stub = self.get_lightning_stub().await;
        let response = lightning_stub
            .list_payments(ListPaymentsRequest {
                include_incomplete: true,
                index_offset,
                ..Default::default()
            })
            .await
            .map_err(|err| {
                tracing::error!("list_payments RPC failed: {}", err);
                LightningError::ListPaymentsError(err.to_string())
            })?
            .into_inner();

        Ok(RawPaymentsPage {
            payments: response.payments.into_iter().map(raw_payment).collect(),
            last_index_offset: response.last_index_offset,
        })
    }

    async fn fee_report(&self) -> Result<RawFeeReport, LightningError> {
        let mut lightning_stub = self.get_lightning_stub().await;
        let response = lightning_stub
            .fee_report(FeeReportRequest {})
            .await
            .map_err(|err| LightningError::FeeReportError(err.to_string()))?
            .into_inner();

        Ok(RawFeeReport {
            channel_fees: response
                .channel_fees
                .into_iter()
                .map(|fee| RawChannelFee {
                    chan_id: fee.chan_id,
                    channel_point: fee.channel_point,
                    base_fee_msat: fee.base_fee_msat,
                    fee_per_mil: fee.fee_per_mil,
                })
                .collect(),
        })
    }

    async fn decode_pay_req(&self, pay_req: &str) -> Result<RawPayReq, LightningError> {
        let mut lightning_stub = self.get_lightning_stub().await;
        let decoded = lightning_stub
            .decode_pay_req(PayReqString {
                pay_req: pay_req.to_string(),
            })
            .await
            .map_err(|err| LightningError::DecodePayReqError(err.to_string()))?
            .into_inner();

        Ok(RawPayReq {
            destination: decoded.destination,
            payment_hash: decoded.payment_hash,
            num_msat: decoded.num_msat,
            timestamp: decoded.timestamp,
            expiry: decoded.expiry,
            description: decoded.description,
            description_hash: decoded.description_hash,
            payment_addr: hex::encode(decoded.payment_addr),
        })
    }

    async fn lookup_invoice(&self, r_hash_str: &str) -> Result<RawInvoice, LightningError> {
        let mut lightning_stub = self.get_lightning_stub().await;
        let invoice = lightning_stub
            .lookup_invoice(PaymentHash {
                r_hash_str: r_hash_str.to_string(),
                ..Default::default()
            })
            .await
            .map_err(|err| LightningError::LookupInvoiceError(err.to_string()))?
            .into_inner();

        Ok(raw_invoice(invoice))
    }

    async fn get_chan_info(&self, chan_id: u64) -> Result<RawChannelEdge, LightningError> {
        let mut lightning_stub = self.get_lightning_stub().await;
        let edge = lightning_stub
            .get_chan_info(ChanInfoRequest {
                chan_id,
                ..Default::default()
            })
            .await
            .map_err(|err| LightningError::GetChanInfoError(err.to_string()))?
            .into_inner();

        Ok(RawChannelEdge {
            channel_id: edge.channel_id,
            chan_point: edge.chan_point,
            last_update: edge.last_update,
            node1_pub: edge.node1_pub,
            node2_pub: edge.node2_pub,
            capacity: edge.capacity,
            node1_policy: edge.node1_policy.map(raw_routing_policy),
            node2_policy: edge.node2_policy.map(raw_routing_policy),
        })
    }

    async fn get_node_info(&self, pub_key: &str) -> Result<RawNodeInfo, LightningError> {
        let mut lightning_stub = self.get_lightning_stub().await;
        let node_info = lightning_stub
            .get_node_info(NodeInfoRequest {
                pub_key: pub_key.to_string(),
                include_channels: false,
            })
            .await
            .map_err(|err| LightningError::GetNodeInfoError(err.to_string()))?
            .into_inner();

        Ok(RawNodeInfo {
            node: node_info.node.map(|node| RawLightningNode {
                pub_key: node.pub_key,
                alias: node.alias,
                color: node.color,
            }),
        })
    }

    async fn list_channels(&self, peer: &str) -> Result<Vec<RawLocalChannel>, LightningError> {
        let peer = hex::decode(peer)
            .map_err(|err| LightningError::Parse(format!("Invalid peer pubkey {}: {}", peer, err)))?;

        let mut lightning_stub = self.get_lightning_stub().await;
        let response = lightning_stub
            .list_channels(ListChannelsRequest {
                peer,
                ..Default::default()
            })
            .await
            .map_err(|err| LightningError::ListChannelsError(err.to_string()))?
            .into_inner();

        Ok(response
            .channels
            .into_iter()
            .map(|channel| RawLocalChannel {
                active: channel.active,
                remote_pubkey: channel.remote_pubkey,
                channel_point: channel.channel_point,
                chan_id: channel.chan_id,
                capacity: channel.capacity,
                local_balance: channel.local_balance,
                remote_balance: channel.remote_balance,
                unsettled_balance: channel.unsettled_balance,
                total_satoshis_sent: channel.total_satoshis_sent,
                total_satoshis_received: channel.total_satoshis_received,
                private: channel.private,
                initiator: channel.initiator,
                lifetime: channel.lifetime,
                uptime: channel.uptime,
            })
            .collect())
    }

    async fn update_channel_policy(&self, update: &PolicyUpdate) -> Result<(), LightningError> {
        let (txid, output_index) = parse_channel_point(&update.channel_point)?;

        let mut lightning_stub = self.get_lightning_stub().await;
        let response = lightning_stub
            .update_channel_policy(PolicyUpdateRequest {
                scope: Some(Scope::ChanPoint(ChannelPoint {
                    funding_txid: Some(FundingTxid::FundingTxidStr(txid)),
                    output_index,
                })),
                base_fee_msat: update.base_fee_msat,
                fee_rate_ppm: update.fee_rate_ppm,
                time_lock_delta: update.time_lock_delta,
                min_htlc_msat: update.min_htlc_msat.unwrap_or_default(),
                min_htlc_msat_specified: update.min_htlc_msat.is_some(),
                max_htlc_msat: update.max_htlc_msat.unwrap_or_default(),
                ..Default::default()
            })
            .await
            .map_err(|err| LightningError::UpdatePolicyError(err.to_string()))?
            .into_inner();

        if let Some(failed) = response.failed_updates.first() {
            return Err(LightningError::UpdatePolicyError(format!(
                "{}: {}",
                update.channel_point, failed.update_error
            )));
        }

        tracing::info!("Updated policy for channel {}", update.channel_point);
        Ok(())
    }

    async fn list_invoices(&self, index_offset: u64) -> Result<RawInvoicesPage, LightningError> {
        let mut lightning_stub = self.get_lightning_stub().await;
        let response = lightning_stub
            .list_invoices(ListInvoiceRequest {
                index_offset,
                num_max_invoices: u64::from(PAGE_SIZE),
                ..Default::default()
            })
            .await
            .map_err(|err| {
                tracing::error!("list_invoices RPC failed: {}", err);
                LightningError::ListInvoicesError(err.to_string())
            })?
            .into_inner();

        Ok(RawInvoicesPage {
            invoices: response.invoices.into_iter().map(raw_invoice).collect(),
            last_index_offset: response.last_index_offset,
        })
    }

    async fn add_invoice(&self, invoice: &NewInvoice) -> Result<RawAddedInvoice, LightningError> {
        let value_msat = i64::try_from(invoice.value_msat).map_err(|_| {
            LightningError::ValidationError(format!("Amount too large: {}", invoice.value_msat))
        })?;

        let mut lightning_stub = self.get_lightning_stub().await;
        let added = lightning_stub
            .add_invoice(lnrpc::Invoice {
                memo: invoice.memo.clone(),
                value_msat,
                ..Default::default()
            })
            .await
            .map_err(|err| LightningError::AddInvoiceError(err.to_string()))?
            .into_inner();

        tracing::info!("Added invoice {}", hex::encode(&added.r_hash));
        Ok(RawAddedInvoice {
            r_hash: hex::encode(added.r_hash),
            payment_request: added.payment_request,
        })
    }

    async fn forwarding_history(
        &self,
        index_offset: u32,
        start_time: u64,
    ) -> Result<RawForwardsPage, LightningError> {
        // lnd only honours start_time when end_time is set as well.
        let end_time = u64::try_from(Utc::now().timestamp()).unwrap_or_default();

        let mut lightning_stub = self.get_lightning_stub().await;
        let response = lightning_stub
            .forwarding_history(ForwardingHistoryRequest {
                start_time,
                end_time,
                index_offset,
                num_max_events: PAGE_SIZE,
            })
            .await
            .map_err(|err| {
                tracing::error!("forwarding_history RPC failed: {}", err);
                LightningError::ForwardingHistoryError(err.to_string())
            })?
            .into_inner();

        Ok(RawForwardsPage {
            forwarding_events: response
                .forwarding_events
                .into_iter()
                .map(|event| RawForwardingEvent {
                    chan_id_in: event.chan_id_in,
                    chan_id_out: event.chan_id_out,
                    amt_in_msat: event.amt_in_msat,
                    amt_out_msat: event.amt_out_msat,
                    fee_msat: event.fee_msat,
                    timestamp_ns: event.timestamp_ns,
                })
                .collect(),
            last_offset_index: response.last_offset_index,
        })
    }
}

fn raw_invoice(invoice: lnrpc::Invoice) -> RawInvoice {
    let state = match InvoiceState::try_from(invoice.state).unwrap_or(InvoiceState::Open) {
        InvoiceState::Open => RawInvoiceState::Open,
        InvoiceState::Settled => RawInvoiceState::Settled,
        InvoiceState::Canceled => RawInvoiceState::Canceled,
        InvoiceState::Accepted => RawInvoiceState::Accepted,
    };

    RawInvoice {
        memo: invoice.memo,
        r_preimage: hex::encode(invoice.r_preimage),
        r_hash: hex::encode(invoice.r_hash),
        value_msat: invoice.value_msat,
        creation_date: invoice.creation_date,
        settle_date: invoice.settle_date,
        payment_request: invoice.payment_request,
        description_hash: hex::encode(invoice.description_hash),
        expiry: invoice.expiry,
        amt_paid_msat: invoice.amt_paid_msat,
        state,
        payment_addr: hex::encode(invoice.payment_addr),
    }
}

fn raw_payment(payment: lnrpc::Payment) -> RawPayment {
    let status = match PaymentStatus::try_from(payment.status).unwrap_or(PaymentStatus::Unknown) {
        PaymentStatus::Unknown => RawPaymentStatus::Unknown,
        PaymentStatus::InFlight => RawPaymentStatus::InFlight,
        PaymentStatus::Succeeded => RawPaymentStatus::Succeeded,
        PaymentStatus::Failed => RawPaymentStatus::Failed,
    };

    RawPayment {
        payment_hash: payment.payment_hash,
        payment_preimage: payment.payment_preimage,
        value_msat: payment.value_msat,
        fee_msat: payment.fee_msat,
        payment_request: payment.payment_request,
        status,
        creation_time_ns: payment.creation_time_ns,
        htlcs: payment
            .htlcs
            .into_iter()
            .map(|htlc| RawHtlcAttempt {
                route: htlc.route.map(|route| RawRoute {
                    hops: route
                        .hops
                        .into_iter()
                        .map(|hop| RawHop {
                            chan_id: hop.chan_id,
                            amt_to_forward_msat: hop.amt_to_forward_msat,
                            fee_msat: hop.fee_msat,
                            pub_key: hop.pub_key,
                        })
                        .collect(),
                }),
            })
            .collect(),
    }
}

fn raw_routing_policy(policy: lnrpc::RoutingPolicy) -> RawRoutingPolicy {
    RawRoutingPolicy {
        time_lock_delta: policy.time_lock_delta,
        min_htlc: policy.min_htlc,
        fee_base_msat: policy.fee_base_msat,
        fee_rate_milli_msat: policy.fee_rate_milli_msat,
        disabled: policy.disabled,
        max_htlc_msat: policy.max_htlc_msat,
        last_update: policy.last_update,
    }
}

/// Splits a `txid:index` channel point.
pub fn parse_channel_point(channel_point: &str) -> Result<(String, u32), LightningError> {
    let mut parts = channel_point.split(':');
    let txid = parts
        .next()
        .filter(|txid| !txid.is_empty())
        .ok_or_else(|| LightningError::ValidationError("Missing txid".into()))?;
    let vout = parts
        .next()
        .ok_or_else(|| LightningError::ValidationError("Missing vout".into()))?
        .parse::<u32>()
        .map_err(|err| LightningError::ValidationError(format!("Invalid vout: {err}")))?;

    bitcoin::Txid::from_str(txid)
        .map_err(|err| LightningError::ValidationError(format!("Invalid txid: {err}")))?;

    Ok((txid.to_string(), vout))
}
