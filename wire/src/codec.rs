//! Line-delimited JSON wire codec for measurement datagrams. See spec §4.1.

use tracing::{debug, warn};

use crate::record::{RawRecord, Record};
use crate::validate::validate;

/// Conservative bound on a single UDP datagram payload. Matches the
/// original's empirically-derived `UDP_MAX_SIZE` in
/// `adapters/common_utils.py` (8000 bytes, comfortably under the ~8192-byte
/// ceiling most stacks tolerate without fragmentation).
pub const MAX_DATAGRAM_BYTES: usize = 8_000;

/// Encodes a single record as one compact JSON line with a trailing `\n`.
#[must_use]
pub fn encode(record: &Record) -> Vec<u8> {
    let mut buf = serde_json::to_vec(&record.to_raw()).expect("Record always serializes");
    buf.push(b'\n');
    buf
}

/// Parses a datagram of one-or-more newline-delimited JSON objects.
///
/// Each line is decoded and validated independently; a malformed or
/// rejected line is logged and dropped without aborting the rest of the
/// datagram, per spec §4.1.
#[must_use]
pub fn decode(datagram: &[u8]) -> Vec<Record> {
    let text = match std::str::from_utf8(datagram) {
        Ok(t) => t,
        Err(err) => {
            warn!(%err, "datagram was not valid utf-8");
            return Vec::new();
        }
    };

    let mut validated = Vec::new();
    let mut total = 0usize;
    for line in text.split_terminator('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        total += 1;

        match serde_json::from_str::<RawRecord>(line) {
            Ok(raw) => match validate(raw) {
                Ok(rec) => validated.push(rec),
                Err(err) => warn!(%err, line, "dropping record that failed validation"),
            },
            Err(err) => warn!(%err, line, "dropping unparseable line"),
        }
    }

    if total != validated.len() {
        debug!(
            validated = validated.len(),
            total, "datagram contained invalid packets"
        );
    }

    validated
}

/// Packs records into one or more datagrams, each no larger than
/// [`MAX_DATAGRAM_BYTES`]. A single record that itself encodes larger than
/// the bound is still emitted alone (callers cannot split a record further).
#[must_use]
pub fn chunk_into_datagrams(records: &[Record]) -> Vec<Vec<u8>> {
    let mut datagrams = Vec::new();
    let mut current = Vec::new();

    for record in records {
        let encoded = encode(record);
        if !current.is_empty() && current.len() + encoded.len() > MAX_DATAGRAM_BYTES {
            datagrams.push(std::mem::take(&mut current));
        }
        current.extend_from_slice(&encoded);
    }
    if !current.is_empty() {
        datagrams.push(current);
    }
    datagrams
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;

    fn sample() -> Record {
        Record {
            name: "p".into(),
            path: "/a".into(),
            value: Value::Double(1.5),
            ts: 10,
            unit: "u".into(),
            id: 1,
            secret: false,
        }
    }

    #[test]
    fn round_trip() {
        let rec = sample();
        let bytes = encode(&rec);
        assert!(bytes.ends_with(b"\n"));
        let decoded = decode(&bytes);
        assert_eq!(decoded, vec![rec]);
    }

    #[test]
    fn multi_line_datagram_decodes_independently() {
        let mut datagram = encode(&sample());
        datagram.extend_from_slice(b"{not json\n");
        let mut second = sample();
        second.id = 2;
        datagram.extend_from_slice(&encode(&second));

        let decoded = decode(&datagram);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].id, 1);
        assert_eq!(decoded[1].id, 2);
    }

    #[test]
    fn bad_path_is_dropped_but_rest_survives() {
        let mut bad = sample();
        bad.path = "no-leading-slash".into();
        let mut datagram = serde_json::to_vec(&bad.to_raw()).unwrap();
        datagram.push(b'\n');
        datagram.extend_from_slice(&encode(&sample()));

        let decoded = decode(&datagram);
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn chunking_respects_bound() {
        let records: Vec<Record> = (0..2000)
            .map(|i| {
                let mut r = sample();
                r.id = i;
                r
            })
            .collect();
        let datagrams = chunk_into_datagrams(&records);
        assert!(datagrams.len() > 1);
        for d in &datagrams {
            assert!(d.len() <= MAX_DATAGRAM_BYTES || d.iter().filter(|&&b| b == b'\n').count() == 1);
        }
    }
}
