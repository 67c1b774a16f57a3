//! Adapter for `decode_pay_req` results.

use super::{DescriptionData, RequestData, SecretData};
use crate::services::raw::RawPayReq;
use crate::utils::{from_unix_seconds, msat, non_empty, shift_seconds};

/// `code` is the encoded request the decode was issued for.
pub fn decode_pay_req(raw: &RawPayReq, code: &str) -> RequestData {
    let created_at = from_unix_seconds(raw.timestamp);
    let expires_at = created_at.and_then(|created_at| shift_seconds(created_at, raw.expiry));

    RequestData {
        code: non_empty(code),
        amount: Some(msat(raw.num_msat)),
        description: Some(DescriptionData {
            memo: non_empty(&raw.description),
            hash: non_empty(&raw.description_hash),
        }),
        secret: Some(SecretData {
            hash: non_empty(&raw.payment_hash),
            preimage: None,
        }),
        address: non_empty(&raw.payment_addr),
        destination: non_empty(&raw.destination),
        created_at,
        expires_at,
        settled_at: None,
        paid: None,
        state: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pay_req() {
        let raw = RawPayReq {
            destination: "02aa".into(),
            payment_hash: "ff".into(),
            num_msat: 150_000,
            timestamp: 1_676_000_000,
            expiry: 3_600,
            description: "Read: Satoshi".into(),
            ..Default::default()
        };

        let request = decode_pay_req(&raw, "lnbc1500n1");
        assert_eq!(request.code.as_deref(), Some("lnbc1500n1"));
        assert_eq!(request.amount, Some(150_000));
        assert_eq!(
            request.expires_at.unwrap().timestamp(),
            1_676_000_000 + 3_600
        );
        assert_eq!(request.description.unwrap().hash, None);
        assert_eq!(request.secret.unwrap().hash.as_deref(), Some("ff"));
    }
}
