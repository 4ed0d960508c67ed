//! Measurement record types, the line-delimited JSON wire codec, and the
//! strict per-field validator shared by every Procem hub component.

pub mod codec;
pub mod record;
pub mod validate;

pub use codec::{chunk_into_datagrams, decode, encode, MAX_DATAGRAM_BYTES};
pub use record::{RawRecord, Record, RecordType, TicketRecord, Value};
pub use validate::{validate, ValidationError};
