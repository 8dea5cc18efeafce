//! Normalization of chain-native envelopes into stored fields.
//!
//! Decode failures are logged and leave the corresponding field unset rather
//! than failing the item — partial data is preferred to losing it.

use tracing::warn;

use txnflow_core::hex;
use txnflow_core::NormalizedFields;
use txnflow_rpc::{EthReceipt, EthTransaction};

/// Build the normalized field set from a transaction envelope and, when the
/// transaction is mined, its receipt.
///
/// Addresses pass through untouched; `value` becomes a decimal string,
/// `block_number` and `gas_used` become 64-bit integers. `gas_used` comes
/// from the receipt only, so it stays unset for pending transactions.
pub fn normalize(tx: &EthTransaction, receipt: Option<&EthReceipt>) -> NormalizedFields {
    let mut fields = NormalizedFields {
        from_address: Some(tx.from.clone()),
        to_address: tx.to.clone(),
        ..Default::default()
    };

    match hex::hex_to_decimal(&tx.value) {
        Ok(value) => fields.value = Some(value),
        Err(e) => warn!(hash = %tx.hash, raw = %tx.value, error = %e, "value left unset"),
    }

    if let Some(raw) = &tx.block_number {
        match hex::hex_to_i64(raw) {
            Ok(number) => fields.block_number = Some(number),
            Err(e) => warn!(hash = %tx.hash, raw = %raw, error = %e, "block number left unset"),
        }
    }

    if let Some(receipt) = receipt {
        match hex::hex_to_i64(&receipt.gas_used) {
            Ok(gas) => fields.gas_used = Some(gas),
            Err(e) => {
                warn!(hash = %tx.hash, raw = %receipt.gas_used, error = %e, "gas used left unset")
            }
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(value: &str, block_number: Option<&str>) -> EthTransaction {
        EthTransaction {
            hash: "0xaaa".into(),
            from: "0x1111111111111111111111111111111111111111".into(),
            to: Some("0x2222222222222222222222222222222222222222".into()),
            value: value.into(),
            gas: "0x5208".into(),
            gas_price: Some("0x3b9aca00".into()),
            input: "0x".into(),
            nonce: "0x1".into(),
            block_hash: block_number.map(|_| "0xbbb".into()),
            block_number: block_number.map(String::from),
            transaction_index: block_number.map(|_| "0x0".into()),
        }
    }

    fn receipt(gas_used: &str) -> EthReceipt {
        EthReceipt {
            transaction_hash: "0xaaa".into(),
            block_hash: "0xbbb".into(),
            block_number: "0x12a05f2".into(),
            gas_used: gas_used.into(),
            cumulative_gas_used: "0xa410".into(),
            status: "0x1".into(),
        }
    }

    #[test]
    fn full_envelope_normalizes_all_fields() {
        let tx = envelope("0x14d1120d7b160000", Some("0x12a05f2"));
        let fields = normalize(&tx, Some(&receipt("0x5208")));

        assert_eq!(fields.from_address.as_deref(), Some(tx.from.as_str()));
        assert_eq!(fields.value.as_deref(), Some("1500000000000000000"));
        assert_eq!(fields.block_number, Some(19_531_250));
        assert_eq!(fields.gas_used, Some(21_000));
    }

    #[test]
    fn missing_receipt_leaves_gas_unset() {
        let tx = envelope("0x0", Some("0x10"));
        let fields = normalize(&tx, None);
        assert!(fields.gas_used.is_none());
        assert_eq!(fields.block_number, Some(16));
    }

    #[test]
    fn pending_transaction_has_no_block_number() {
        let tx = envelope("0x1", None);
        let fields = normalize(&tx, None);
        assert!(fields.block_number.is_none());
        assert_eq!(fields.value.as_deref(), Some("1"));
    }

    #[test]
    fn malformed_value_degrades_to_unset() {
        let tx = envelope("0xnotanumber", Some("0x10"));
        let fields = normalize(&tx, Some(&receipt("0x5208")));

        // The bad field is dropped; everything else survives
        assert!(fields.value.is_none());
        assert_eq!(fields.block_number, Some(16));
        assert_eq!(fields.gas_used, Some(21_000));
    }

    #[test]
    fn contract_creation_has_no_to_address() {
        let mut tx = envelope("0x0", Some("0x10"));
        tx.to = None;
        let fields = normalize(&tx, None);
        assert!(fields.to_address.is_none());
        assert!(fields.from_address.is_some());
    }
}
