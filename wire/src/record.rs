//! The measurement record and its wire representation.
//!
//! A [`Record`] is the validated, in-memory form of one measurement. The
//! wire form ([`RawRecord`]) keeps the `v` field as an untyped JSON value so
//! that it can be checked against `type` during validation rather than
//! trusting a tagged enum deserialize, which would accept e.g. a JSON number
//! for a `boolean`-typed record.

use serde::{Deserialize, Serialize};

/// The three value shapes a measurement can carry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Double(f64),
    Long(i64),
    Bool(bool),
}

impl Value {
    #[must_use]
    pub fn type_tag(self) -> RecordType {
        match self {
            Value::Double(_) => RecordType::Double,
            Value::Long(_) => RecordType::Long,
            Value::Bool(_) => RecordType::Boolean,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Double(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// `type` as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Double,
    Long,
    Boolean,
}

/// The wire shape of a measurement, before type-checking `v` against `type`.
///
/// Deserializing this never fails on a mismatched `v`/`type` pair -- it only
/// fails on structurally malformed JSON. [`RawRecord::validate`] does the
/// semantic check.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawRecord {
    pub name: String,
    pub path: String,
    pub v: serde_json::Value,
    pub ts: i64,
    pub unit: String,
    #[serde(rename = "type")]
    pub rtype: RecordType,
    pub id: i64,
    #[serde(default)]
    pub secret: bool,
}

/// A validated measurement record. See spec §3 for field constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub path: String,
    pub value: Value,
    pub ts: i64,
    pub unit: String,
    pub id: i64,
    pub secret: bool,
}

impl Record {
    #[must_use]
    pub fn rtype(&self) -> RecordType {
        self.value.type_tag()
    }

    #[must_use]
    pub fn to_raw(&self) -> RawRecord {
        let v = match self.value {
            Value::Double(f) => serde_json::json!(f),
            Value::Long(l) => serde_json::json!(l),
            Value::Bool(b) => serde_json::json!(b),
        };
        RawRecord {
            name: self.name.clone(),
            path: self.path.clone(),
            v,
            ts: self.ts,
            unit: self.unit.clone(),
            rtype: self.rtype(),
            id: self.id,
            secret: self.secret,
        }
    }
}

/// The ticket record shape used by the uploader: drops `id` and `secret`.
#[derive(Debug, Clone, Serialize)]
pub struct TicketRecord {
    pub name: String,
    pub path: String,
    pub v: serde_json::Value,
    pub ts: i64,
    pub unit: String,
    #[serde(rename = "type")]
    pub rtype: RecordType,
}

impl From<&Record> for TicketRecord {
    fn from(r: &Record) -> Self {
        let v = match r.value {
            Value::Double(f) => serde_json::json!(f),
            Value::Long(l) => serde_json::json!(l),
            Value::Bool(b) => serde_json::json!(b),
        };
        TicketRecord {
            name: r.name.clone(),
            path: r.path.clone(),
            v,
            ts: r.ts,
            unit: r.unit.clone(),
            rtype: r.rtype(),
        }
    }
}
