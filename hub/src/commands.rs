//! Runtime command surface read from the router's stdin. See spec §6
//! "Known runtime commands" and SPEC_FULL.md §18.
//!
//! Parsing is a pure function ([`parse`]) so the grammar is unit-testable
//! without driving real stdin; [`run`] wires the parsed commands to the
//! only two atomic-snapshot publishers in the process, [`FlagsHandle`] and
//! [`FanoutIdsHandle`] (spec §9 "Runtime feature flags" / "Global
//! singletons").

use std::sync::Arc;

use procem_store::Store;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::info;

use crate::fanout_ids::FanoutIdsHandle;
use crate::flags::FlagsHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    DbStore(bool),
    IotTicket(bool),
    BatteryDemoOn,
    BatteryDemoOff,
    BatteryDemoAdd(Vec<i64>),
    BatteryDemoRemove(Vec<i64>),
    Quit,
}

/// Parses one command line. Returns `None` for anything that isn't a
/// recognised command; unrecognised input is ignored rather than treated
/// as an error, matching a long-running operator console.
#[must_use]
pub fn parse(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return Some(Command::Quit);
    }

    let mut parts = line.split_whitespace();
    match parts.next()? {
        "list" => Some(Command::List),
        "db-store" => parse_on_off(parts.next()?).map(Command::DbStore),
        "iot-ticket" => parse_on_off(parts.next()?).map(Command::IotTicket),
        "battery-demo" => match parts.next()? {
            "on" => Some(Command::BatteryDemoOn),
            "off" => Some(Command::BatteryDemoOff),
            "add" => Some(Command::BatteryDemoAdd(parse_ids(parts))),
            "remove" => Some(Command::BatteryDemoRemove(parse_ids(parts))),
            _ => None,
        },
        _ => None,
    }
}

fn parse_on_off(word: &str) -> Option<bool> {
    match word {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

fn parse_ids<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<i64> {
    parts.filter_map(|p| p.parse::<i64>().ok()).collect()
}

/// Applies one parsed command. Returns `true` if the caller should stop
/// reading further commands (i.e. `Quit` was received).
fn apply(command: Command, flags: &FlagsHandle, fanout_ids: &FanoutIdsHandle, store: &Store) -> bool {
    match command {
        Command::List => {
            let snapshot = flags.snapshot();
            info!(
                db_storage_on = snapshot.db_storage_on,
                iotticket_send_on = snapshot.iotticket_send_on,
                battery_demo_on = snapshot.battery_demo_on,
                fanout_ids = ?fanout_ids.snapshot(),
                tracked_ids = ?store.get_ids(),
                "router status"
            );
        }
        Command::DbStore(on) => {
            flags.set_db_storage(on);
            info!(on, "db-store toggled");
        }
        Command::IotTicket(on) => {
            flags.set_iotticket_send(on);
            info!(on, "iot-ticket toggled");
        }
        Command::BatteryDemoOn => {
            flags.set_battery_demo(true);
            info!("battery-demo enabled");
        }
        Command::BatteryDemoOff => {
            flags.set_battery_demo(false);
            info!("battery-demo disabled");
        }
        Command::BatteryDemoAdd(ids) => {
            fanout_ids.add(&ids);
            info!(?ids, "battery-demo ids added");
        }
        Command::BatteryDemoRemove(ids) => {
            fanout_ids.remove(&ids);
            info!(?ids, "battery-demo ids removed");
        }
        Command::Quit => return true,
    }
    false
}

/// Reads commands from `reader` until `Quit` (an empty line) or EOF,
/// applying each to `flags`/`fanout_ids`, then signals shutdown on
/// `shutdown_tx`.
pub async fn run(
    reader: impl tokio::io::AsyncRead + Unpin,
    flags: FlagsHandle,
    fanout_ids: FanoutIdsHandle,
    store: Arc<Store>,
    shutdown_tx: watch::Sender<bool>,
) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("command stdin closed, shutting down");
                break;
            }
            Err(err) => {
                tracing::warn!(%err, "error reading command stdin");
                break;
            }
        };

        let Some(command) = parse(&line) else {
            continue;
        };
        if apply(command, &flags, &fanout_ids, &store) {
            info!("quit command received, shutting down");
            break;
        }
    }

    let _ = shutdown_tx.send(true);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list() {
        assert_eq!(parse("list"), Some(Command::List));
    }

    #[test]
    fn parses_db_store_toggle() {
        assert_eq!(parse("db-store on"), Some(Command::DbStore(true)));
        assert_eq!(parse("db-store off"), Some(Command::DbStore(false)));
    }

    #[test]
    fn parses_iot_ticket_toggle() {
        assert_eq!(parse("iot-ticket on"), Some(Command::IotTicket(true)));
    }

    #[test]
    fn parses_battery_demo_add_and_remove() {
        assert_eq!(
            parse("battery-demo add 1 2 3"),
            Some(Command::BatteryDemoAdd(vec![1, 2, 3]))
        );
        assert_eq!(
            parse("battery-demo remove 4"),
            Some(Command::BatteryDemoRemove(vec![4]))
        );
    }

    #[test]
    fn empty_line_is_quit() {
        assert_eq!(parse(""), Some(Command::Quit));
        assert_eq!(parse("   "), Some(Command::Quit));
    }

    #[test]
    fn unknown_command_is_none() {
        assert_eq!(parse("frobnicate"), None);
        assert_eq!(parse("db-store sideways"), None);
    }

    #[tokio::test]
    async fn run_applies_commands_then_quits_on_empty_line() {
        let flags = FlagsHandle::new(crate::flags::FeatureFlags {
            db_storage_on: true,
            iotticket_send_on: true,
            battery_demo_on: false,
        });
        let fanout_ids = FanoutIdsHandle::new(&[]);
        let store = Arc::new(Store::new(10));
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let input = "db-store off\nbattery-demo add 5\n\n";
        run(input.as_bytes(), flags.clone(), fanout_ids.clone(), store, shutdown_tx).await;

        assert!(!flags.snapshot().db_storage_on);
        assert!(fanout_ids.snapshot().contains(&5));
        shutdown_rx.changed().await.unwrap();
        assert!(*shutdown_rx.borrow());
    }
}
