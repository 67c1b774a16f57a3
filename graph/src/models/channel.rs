//! Channel views and the policy update a local channel accepts.

use super::node::Node;
use super::satoshis::{BlocksDelta, Rate, Satoshis};
use crate::adapters::{FeeData, HtlcData, PolicyData};
use crate::errors::{ModelError, OperationError};
use crate::services::node_manager::LightningClient;
use crate::services::graph::transform::{ChannelRecord, KnownChannel, PartnerRecord};
use crate::services::raw::PolicyUpdate;
use crate::utils::{ChannelState, Exposure, ShortChannelID};
use chrono::{DateTime, Utc};

/// Routing fee charged by one side of a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fee {
    pub base: Option<Satoshis>,
    pub rate: Option<Rate>,
}

impl Fee {
    pub fn from_data(data: &FeeData) -> Self {
        Self {
            base: data.base.map(Satoshis::from_millisatoshis),
            rate: data.rate.map(Rate::from_parts_per_million),
        }
    }

    /// `None` when neither component is known, as opposed to a zero fee.
    pub fn to_data(&self) -> Option<FeeData> {
        if self.base.is_none() && self.rate.is_none() {
            return None;
        }
        Some(FeeData {
            base: self.base.map(|base| base.millisatoshis()),
            rate: self.rate.map(|rate| rate.parts_per_million()),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Htlc {
    pub minimum: Option<Satoshis>,
    pub maximum: Option<Satoshis>,
    pub blocks_delta: Option<BlocksDelta>,
}

impl Htlc {
    fn from_data(data: &HtlcData) -> Self {
        Self {
            minimum: data.minimum.map(Satoshis::from_millisatoshis),
            maximum: data.maximum.map(Satoshis::from_millisatoshis),
            blocks_delta: data.blocks_delta.map(BlocksDelta::new),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Policy<'a> {
    data: &'a PolicyData,
}

impl<'a> Policy<'a> {
    pub fn fee(&self) -> Fee {
        self.data.fee.as_ref().map(Fee::from_data).unwrap_or_default()
    }

    pub fn htlc(&self) -> Htlc {
        self.data.htlc.as_ref().map(Htlc::from_data).unwrap_or_default()
    }

    pub fn disabled(&self) -> Option<bool> {
        self.data.disabled
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.data.updated_at
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelAccounting {
    pub capacity: Option<Satoshis>,
    pub sent: Option<Satoshis>,
    pub received: Option<Satoshis>,
    pub unsettled: Option<Satoshis>,
}

/// One side of a known channel.
#[derive(Debug, Clone, Copy)]
pub struct Partner<'a> {
    channel_id: ShortChannelID,
    record: &'a PartnerRecord,
}

impl<'a> Partner<'a> {
    pub fn node(&self) -> Node<'a> {
        Node::new(&self.record.node)
    }

    pub fn policy(&self) -> Result<Policy<'a>, ModelError> {
        self.record
            .policy
            .as_ref()
            .map(|data| Policy { data })
            .ok_or_else(|| ModelError::MissingPolicy(self.channel_id.to_string()))
    }

    pub fn balance(&self) -> Option<Satoshis> {
        self.record
            .accounting
            .as_ref()
            .and_then(|accounting| accounting.balance)
            .map(Satoshis::from_millisatoshis)
    }

    pub fn initiator(&self) -> Option<bool> {
        self.record.initiator
    }
}

/// What the local node wants its side of a channel to charge. Absent parts
/// keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeUpdate {
    pub base: Option<Satoshis>,
    pub rate: Option<Rate>,
}

/// Read-only view of a channel a payment went through.
#[derive(Debug, Clone, Copy)]
pub struct Channel<'a> {
    record: &'a ChannelRecord,
}

impl<'a> Channel<'a> {
    pub fn new(record: &'a ChannelRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &'a ChannelRecord {
        self.record
    }

    pub fn key(&self) -> &'a str {
        self.record.key()
    }

    pub fn id(&self) -> String {
        match self.record {
            ChannelRecord::Known(channel) => channel.id.to_string(),
            ChannelRecord::Unknown(channel) => channel.id.clone(),
        }
    }

    pub fn known(&self) -> bool {
        matches!(self.record, ChannelRecord::Known(_))
    }

    /// Public key of the node the hop routed towards.
    pub fn target(&self) -> Option<&'a str> {
        match self.record {
            ChannelRecord::Known(channel) => channel.target.as_deref(),
            ChannelRecord::Unknown(channel) => channel.target.as_deref(),
        }
    }

    fn known_channel(&self) -> Result<&'a KnownChannel, ModelError> {
        match self.record {
            ChannelRecord::Known(channel) => Ok(&**channel),
            ChannelRecord::Unknown(channel) => Err(ModelError::UnknownChannel(channel.id.clone())),
        }
    }

    fn my_channel(&self) -> Result<&'a KnownChannel, ModelError> {
        let channel = self.known_channel()?;
        if !channel.mine {
            return Err(ModelError::NotYourChannel(channel.id.to_string()));
        }
        Ok(channel)
    }

    pub fn mine(&self) -> Result<bool, ModelError> {
        Ok(self.known_channel()?.mine)
    }

    pub fn point(&self) -> Result<Option<&'a str>, ModelError> {
        Ok(self.known_channel()?.point.as_deref())
    }

    pub fn opened_at(&self) -> Result<Option<DateTime<Utc>>, ModelError> {
        Ok(self.known_channel()?.opened_at)
    }

    pub fn up_at(&self) -> Result<Option<DateTime<Utc>>, ModelError> {
        Ok(self.known_channel()?.up_at)
    }

    pub fn updated_at(&self) -> Result<Option<DateTime<Utc>>, ModelError> {
        Ok(self.known_channel()?.updated_at)
    }

    pub fn state(&self) -> Result<Option<ChannelState>, ModelError> {
        Ok(self.known_channel()?.state)
    }

    pub fn exposure(&self) -> Result<Option<Exposure>, ModelError> {
        Ok(self.known_channel()?.exposure)
    }

    /// Channel totals; only the local node knows them.
    pub fn accounting(&self) -> Result<ChannelAccounting, ModelError> {
        let channel = self.my_channel()?;
        let accounting = channel.accounting.clone().unwrap_or_default();
        Ok(ChannelAccounting {
            capacity: accounting.capacity.map(Satoshis::from_millisatoshis),
            sent: accounting.sent.map(Satoshis::from_millisatoshis),
            received: accounting.received.map(Satoshis::from_millisatoshis),
            unsettled: accounting.unsettled.map(Satoshis::from_millisatoshis),
        })
    }

    pub fn partners(&self) -> Result<Vec<Partner<'a>>, ModelError> {
        let channel = self.known_channel()?;
        Ok(channel
            .partners
            .iter()
            .map(|record| Partner {
                channel_id: channel.id,
                record,
            })
            .collect())
    }

    /// The local node's side of one of its own channels.
    pub fn myself(&self) -> Result<Partner<'a>, ModelError> {
        let channel = self.my_channel()?;
        channel
            .partners
            .iter()
            .find(|partner| partner.node.is_local())
            .map(|record| Partner {
                channel_id: channel.id,
                record,
            })
            .ok_or_else(|| ModelError::NotYourChannel(channel.id.to_string()))
    }

    /// The remote side of one of the local node's channels.
    pub fn partner(&self) -> Result<Partner<'a>, ModelError> {
        let channel = self.my_channel()?;
        channel
            .partners
            .iter()
            .find(|partner| !partner.node.is_local())
            .map(|record| Partner {
                channel_id: channel.id,
                record,
            })
            .ok_or_else(|| ModelError::NotYourChannel(channel.id.to_string()))
    }

    /// Builds the policy change for the local side, keeping every value the
    /// update does not mention.
    pub fn fee_policy_update(&self, update: FeeUpdate) -> Result<PolicyUpdate, ModelError> {
        let channel = self.my_channel()?;
        let policy = self.myself()?.policy()?;
        let channel_point = channel
            .point
            .clone()
            .ok_or_else(|| ModelError::MissingPolicy(channel.id.to_string()))?;

        let fee = policy.fee();
        let htlc = policy.htlc();
        let base = update.base.or(fee.base).unwrap_or_default();
        let rate = update.rate.or(fee.rate).unwrap_or_default();
        let blocks_delta = htlc
            .blocks_delta
            .ok_or_else(|| ModelError::MissingPolicy(channel.id.to_string()))?;

        Ok(PolicyUpdate {
            channel_point,
            base_fee_msat: i64::try_from(base.millisatoshis()).unwrap_or(i64::MAX),
            fee_rate_ppm: u32::try_from(rate.parts_per_million()).unwrap_or(u32::MAX),
            time_lock_delta: blocks_delta.blocks(),
            min_htlc_msat: htlc.minimum.map(|minimum| minimum.millisatoshis()),
            max_htlc_msat: htlc.maximum.map(|maximum| maximum.millisatoshis()),
        })
    }

    /// Sends a fee change for the local side of this channel to the node.
    pub async fn update_fee<C: LightningClient + ?Sized>(
        &self,
        client: &C,
        update: FeeUpdate,
    ) -> Result<(), OperationError> {
        let policy_update = self.fee_policy_update(update)?;
        client.update_channel_policy(&policy_update).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        ChainData, ChannelAccounting as AccountingData, LightningData, NodeData,
        PartnerAccounting, PlatformData,
    };
    use crate::errors::LightningError;
    use crate::services::fixture::FixtureClient;
    use crate::services::graph::transform::{LocalNode, NodeRecord, RemoteNode, UnknownChannel};

    fn chain() -> ChainData {
        ChainData {
            blockchain: "bitcoin".into(),
            network: "mainnet".into(),
        }
    }

    fn local_partner(policy: Option<PolicyData>) -> PartnerRecord {
        PartnerRecord {
            node: NodeRecord::Local(LocalNode {
                key: "local".into(),
                node: NodeData {
                    public_key: "02aa".into(),
                    ..Default::default()
                },
                platform: PlatformData {
                    chain: chain(),
                    lightning: LightningData {
                        implementation: "lnd".into(),
                        version: "0.17.0-beta".into(),
                    },
                },
            }),
            policy,
            accounting: Some(PartnerAccounting {
                balance: Some(600_000),
            }),
            initiator: Some(true),
        }
    }

    fn remote_partner() -> PartnerRecord {
        PartnerRecord {
            node: NodeRecord::Remote(RemoteNode {
                key: "remote".into(),
                node: NodeData {
                    public_key: "03bb".into(),
                    ..Default::default()
                },
                chain: chain(),
            }),
            policy: None,
            accounting: None,
            initiator: None,
        }
    }

    fn my_policy() -> PolicyData {
        PolicyData {
            fee: Some(FeeData {
                base: Some(1_000),
                rate: Some(1),
            }),
            htlc: Some(HtlcData {
                minimum: Some(1_000),
                maximum: Some(990_000_000),
                blocks_delta: Some(40),
            }),
            disabled: Some(false),
            updated_at: None,
        }
    }

    fn known(mine: bool, partners: Vec<PartnerRecord>) -> ChannelRecord {
        ChannelRecord::Known(Box::new(KnownChannel {
            key: "key".into(),
            id: ShortChannelID(7),
            point: Some(
                "8d7b6f2b9dd6bd2f3fdb7a8e6e6c7e0b3b7d5d8f5f0a1c2b3d4e5f60718293a4:1".into(),
            ),
            mine,
            target: Some("03bb".into()),
            opened_at: None,
            up_at: None,
            updated_at: None,
            state: Some(ChannelState::Active),
            exposure: Some(Exposure::Public),
            accounting: Some(AccountingData {
                capacity: Some(1_000_000_000),
                ..Default::default()
            }),
            partners,
        }))
    }

    #[test]
    fn test_unknown_channel_reads_are_guarded() {
        let record = ChannelRecord::Unknown(UnknownChannel {
            key: "key".into(),
            id: "42".into(),
            target: Some("03bb".into()),
        });
        let channel = Channel::new(&record);
        let unknown = ModelError::UnknownChannel("42".into());

        assert!(!channel.known());
        assert_eq!(channel.id(), "42");
        assert_eq!(channel.target(), Some("03bb"));
        assert_eq!(channel.accounting().unwrap_err(), unknown);
        assert_eq!(channel.partners().unwrap_err(), unknown);
        assert_eq!(channel.myself().unwrap_err(), unknown);
        assert_eq!(channel.point().unwrap_err(), unknown);
        assert_eq!(
            channel.fee_policy_update(FeeUpdate::default()).unwrap_err(),
            unknown
        );
    }

    #[test]
    fn test_accounting_needs_my_channel() {
        let record = known(false, vec![remote_partner(), remote_partner()]);
        let channel = Channel::new(&record);
        assert_eq!(
            channel.accounting().unwrap_err(),
            ModelError::NotYourChannel("7".into())
        );

        let record = known(true, vec![remote_partner(), local_partner(Some(my_policy()))]);
        let channel = Channel::new(&record);
        let accounting = channel.accounting().unwrap();
        assert_eq!(accounting.capacity.unwrap().satoshis(), 1_000_000);
        assert_eq!(channel.myself().unwrap().balance().unwrap().satoshis(), 600);
        assert_eq!(channel.partner().unwrap().node().public_key(), "03bb");
        assert!(channel.partner().unwrap().policy().is_err());
    }

    #[test]
    fn test_fee_to_data_distinguishes_missing_from_zero() {
        assert_eq!(Fee::default().to_data(), None);
        let zero = Fee {
            base: Some(Satoshis::default()),
            rate: None,
        };
        assert_eq!(
            zero.to_data(),
            Some(FeeData {
                base: Some(0),
                rate: None,
            })
        );
    }

    #[tokio::test]
    async fn test_update_fee_keeps_unchanged_values() {
        let record = known(true, vec![remote_partner(), local_partner(Some(my_policy()))]);
        let channel = Channel::new(&record);
        let client = FixtureClient::default();

        channel
            .update_fee(
                &client,
                FeeUpdate {
                    base: None,
                    rate: Some(Rate::from_parts_per_million(250)),
                },
            )
            .await
            .unwrap();

        let updates = client.policy_updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].base_fee_msat, 1_000);
        assert_eq!(updates[0].fee_rate_ppm, 250);
        assert_eq!(updates[0].time_lock_delta, 40);
        assert_eq!(updates[0].max_htlc_msat, Some(990_000_000));
    }

    #[tokio::test]
    async fn test_update_fee_errors() {
        let client = FixtureClient::default();

        let record = known(true, vec![remote_partner(), local_partner(None)]);
        let result = Channel::new(&record)
            .update_fee(&client, FeeUpdate::default())
            .await;
        assert!(matches!(
            result,
            Err(OperationError::Model(ModelError::MissingPolicy(_)))
        ));

        let failing = FixtureClient {
            failed_policy_update: Some("fee rate too high".into()),
            ..Default::default()
        };
        let record = known(true, vec![remote_partner(), local_partner(Some(my_policy()))]);
        let result = Channel::new(&record)
            .update_fee(&failing, FeeUpdate::default())
            .await;
        assert!(matches!(
            result,
            Err(OperationError::Lightning(LightningError::UpdatePolicyError(_)))
        ));
        assert!(client.policy_updates().is_empty());
    }
}
