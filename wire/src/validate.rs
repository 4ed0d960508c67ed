//! Field validation for [`RawRecord`] -> [`Record`], per spec §3.

use std::sync::OnceLock;

use regex::Regex;

use crate::record::{RawRecord, Record, RecordType, Value};

const MAX_NAME_CHARS: usize = 100;
const MAX_PATH_CHARS: usize = 1000;
const MAX_UNIT_CHARS: usize = 10;

fn path_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(/[A-Za-z0-9]+){1,10}$").expect("static pattern is valid"))
}

/// Why a raw record failed validation. Carried only for logging; callers
/// should drop the record and continue, per spec §4.1/§7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must be 1..=100 chars")]
    NameLength,
    #[error("path must be <=1000 chars and match (/[A-Za-z0-9]+){{1,10}}")]
    PathShape,
    #[error("value does not match declared type")]
    ValueTypeMismatch,
    #[error("unit must be <=10 chars")]
    UnitLength,
}

/// Validates a single raw record against the spec §3 constraint table.
pub fn validate(raw: RawRecord) -> Result<Record, ValidationError> {
    let name_len = raw.name.chars().count();
    if name_len == 0 || name_len > MAX_NAME_CHARS {
        return Err(ValidationError::NameLength);
    }

    if raw.path.chars().count() > MAX_PATH_CHARS || !path_pattern().is_match(&raw.path) {
        return Err(ValidationError::PathShape);
    }

    if raw.unit.chars().count() > MAX_UNIT_CHARS {
        return Err(ValidationError::UnitLength);
    }

    let value = match raw.rtype {
        RecordType::Double => raw
            .v
            .as_f64()
            .filter(|_| raw.v.is_number() && !raw.v.is_i64() && !raw.v.is_u64())
            .map(Value::Double)
            .ok_or(ValidationError::ValueTypeMismatch)?,
        RecordType::Long => raw
            .v
            .as_i64()
            .map(Value::Long)
            .ok_or(ValidationError::ValueTypeMismatch)?,
        RecordType::Boolean => raw
            .v
            .as_bool()
            .map(Value::Bool)
            .ok_or(ValidationError::ValueTypeMismatch)?,
    };

    Ok(Record {
        name: raw.name,
        path: raw.path,
        value,
        ts: raw.ts,
        unit: raw.unit,
        id: raw.id,
        secret: raw.secret,
    })
}
