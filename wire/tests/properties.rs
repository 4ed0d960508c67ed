//! Property tests for the codec and validator (spec §8, properties 1-2).

use proptest::prelude::*;
use procem_wire::{decode, encode, validate, RawRecord, RecordType, Value};

fn arb_value_and_type() -> impl Strategy<Value = (serde_json::Value, RecordType)> {
    prop_oneof![
        any::<i32>().prop_map(|v| (serde_json::json!(f64::from(v) + 0.5), RecordType::Double)),
        any::<i64>().prop_map(|v| (serde_json::json!(v), RecordType::Long)),
        any::<bool>().prop_map(|v| (serde_json::json!(v), RecordType::Boolean)),
    ]
}

fn arb_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Za-z0-9]{1,8}", 1..=10)
        .prop_map(|segments| segments.into_iter().map(|s| format!("/{s}")).collect())
}

fn arb_raw() -> impl Strategy<Value = RawRecord> {
    (
        "[a-zA-Z0-9 ]{1,40}",
        arb_path(),
        arb_value_and_type(),
        any::<i64>(),
        "[a-zA-Z%]{0,8}",
        any::<i64>(),
        any::<bool>(),
    )
        .prop_map(|(name, path, (v, rtype), ts, unit, id, secret)| RawRecord {
            name,
            path,
            v,
            ts,
            unit,
            rtype,
            id,
            secret,
        })
}

proptest! {
    #[test]
    fn valid_records_round_trip_through_codec(raw in arb_raw()) {
        let record = validate(raw).expect("arbitrary raw record should satisfy the constraint table");
        let encoded = encode(&record);
        let decoded = decode(&encoded);
        prop_assert_eq!(decoded, vec![record]);
    }

    #[test]
    fn decode_never_panics_on_arbitrary_bytes(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode(&bytes);
    }
}

#[test]
fn value_type_mismatch_is_rejected() {
    let raw = RawRecord {
        name: "n".into(),
        path: "/a".into(),
        v: serde_json::json!("not-a-number"),
        ts: 0,
        unit: "u".into(),
        rtype: RecordType::Double,
        id: 1,
        secret: false,
    };
    assert!(validate(raw).is_err());
}

#[test]
fn bool_value_carries_through() {
    let raw = RawRecord {
        name: "n".into(),
        path: "/a".into(),
        v: serde_json::json!(true),
        ts: 0,
        unit: "u".into(),
        rtype: RecordType::Boolean,
        id: 1,
        secret: false,
    };
    let record = validate(raw).expect("valid");
    assert_eq!(record.value, Value::Bool(true));
}
