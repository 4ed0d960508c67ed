//! Standalone consumer for `hub::fanout`'s TCP bridge: a small TCP server
//! that accepts the bridge's persistent connection, decodes each line as
//! a fan-out item, and periodically prints per-id statistics. Ported from
//! `python_poc/tcp_demo.py` and `python_poc/tcp_utils.py`'s server half.

pub mod server;
pub mod stats;
