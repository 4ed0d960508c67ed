//! Validator fan-out stage. Consumes the main queue, decodes and validates
//! each datagram, and distributes the results to the storage, upload, and
//! TCP fan-out queues according to the current feature-flag snapshot. See
//! spec §4.5.

use std::sync::Arc;

use bytes::Bytes;
use procem_store::Store;
use procem_wire::codec;
use tokio::sync::mpsc;
use tracing::info;

use crate::fanout_ids::FanoutIdsHandle;
use crate::flags::FlagsHandle;
use crate::types::{FanoutItem, StorageBatch, UploadItem};

pub struct ValidatorConfig {
    pub device_id: String,
}

impl ValidatorConfig {
    #[must_use]
    pub fn new(device_id: String) -> Self {
        ValidatorConfig { device_id }
    }
}

/// Runs the validator loop until a `None` (shutdown) sentinel arrives on
/// `main_rx`, at which point it propagates `None` to every downstream
/// queue and returns.
pub async fn run(
    config: ValidatorConfig,
    store: Arc<Store>,
    flags: FlagsHandle,
    fanout_ids: FanoutIdsHandle,
    mut main_rx: mpsc::Receiver<Option<Bytes>>,
    storage_tx: mpsc::Sender<Option<StorageBatch>>,
    upload_tx: mpsc::Sender<Option<UploadItem>>,
    fanout_tx: mpsc::Sender<Option<FanoutItem>>,
) {
    while let Some(item) = main_rx.recv().await {
        let Some(datagram) = item else { break };

        let records = codec::decode(&datagram);
        if records.is_empty() {
            continue;
        }

        let snapshot = flags.snapshot();

        if snapshot.db_storage_on {
            let _ = storage_tx
                .send(Some(StorageBatch {
                    device_id: config.device_id.clone(),
                    records: records.clone(),
                }))
                .await;
        }

        if snapshot.iotticket_send_on {
            for record in &records {
                let _ = upload_tx
                    .send(Some(UploadItem {
                        device_id: config.device_id.clone(),
                        record: record.clone(),
                        cycle: 0,
                    }))
                    .await;
            }
        }

        let fanout_snapshot = fanout_ids.snapshot();
        for record in &records {
            store.add_value(record.id, record.value, record.ts);

            if snapshot.battery_demo_on && fanout_snapshot.contains(&record.id) {
                let _ = fanout_tx
                    .send(Some(FanoutItem {
                        id: record.id,
                        v: record.value,
                        ts: record.ts,
                    }))
                    .await;
            }
        }
    }

    info!("validator shutting down, propagating shutdown to downstream queues");
    let _ = storage_tx.send(None).await;
    let _ = upload_tx.send(None).await;
    let _ = fanout_tx.send(None).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::FeatureFlags;
    use procem_wire::encode;
    use procem_wire::{Record, Value};

    fn sample(id: i64) -> Record {
        Record {
            name: "p".into(),
            path: "/a".into(),
            value: Value::Double(1.5),
            ts: 10,
            unit: "u".into(),
            id,
            secret: false,
        }
    }

    #[tokio::test]
    async fn happy_path_reaches_storage_upload_and_store() {
        let store = Arc::new(Store::new(10));
        let flags = FlagsHandle::new(FeatureFlags {
            db_storage_on: true,
            iotticket_send_on: true,
            battery_demo_on: false,
        });
        let fanout_ids = FanoutIdsHandle::new(&[]);

        let (main_tx, main_rx) = mpsc::channel(8);
        let (storage_tx, mut storage_rx) = mpsc::channel(8);
        let (upload_tx, mut upload_rx) = mpsc::channel(8);
        let (fanout_tx, mut fanout_rx) = mpsc::channel(8);

        let task = tokio::spawn(run(
            ValidatorConfig::new("dev-1".into()),
            store.clone(),
            flags,
            fanout_ids,
            main_rx,
            storage_tx,
            upload_tx,
            fanout_tx,
        ));

        main_tx
            .send(Some(Bytes::from(encode(&sample(1)))))
            .await
            .unwrap();
        main_tx.send(None).await.unwrap();
        drop(main_tx);

        let batch = storage_rx.recv().await.unwrap().expect("storage batch");
        assert_eq!(batch.records.len(), 1);
        assert!(storage_rx.recv().await.unwrap().is_none());

        let item = upload_rx.recv().await.unwrap().expect("upload item");
        assert_eq!(item.record.id, 1);
        assert_eq!(item.cycle, 0);
        assert!(upload_rx.recv().await.unwrap().is_none());

        assert!(fanout_rx.recv().await.unwrap().is_none());
        assert_eq!(store.get_value(1).unwrap().v, Value::Double(1.5));

        task.await.unwrap();
    }

    #[tokio::test]
    async fn fanout_only_fires_for_configured_ids_when_flag_on() {
        let store = Arc::new(Store::new(10));
        let flags = FlagsHandle::new(FeatureFlags {
            db_storage_on: false,
            iotticket_send_on: false,
            battery_demo_on: true,
        });
        let fanout_ids = FanoutIdsHandle::new(&[1]);

        let (main_tx, main_rx) = mpsc::channel(8);
        let (storage_tx, mut storage_rx) = mpsc::channel(8);
        let (upload_tx, mut upload_rx) = mpsc::channel(8);
        let (fanout_tx, mut fanout_rx) = mpsc::channel(8);

        let task = tokio::spawn(run(
            ValidatorConfig::new("dev-1".into()),
            store,
            flags,
            fanout_ids,
            main_rx,
            storage_tx,
            upload_tx,
            fanout_tx,
        ));

        let mut datagram = encode(&sample(1));
        datagram.extend_from_slice(&encode(&sample(2)));
        main_tx.send(Some(Bytes::from(datagram))).await.unwrap();
        main_tx.send(None).await.unwrap();
        drop(main_tx);

        let fanned = fanout_rx.recv().await.unwrap().expect("fanout item");
        assert_eq!(fanned.id, 1);
        assert!(fanout_rx.recv().await.unwrap().is_none());

        assert!(storage_rx.recv().await.unwrap().is_none());
        assert!(upload_rx.recv().await.unwrap().is_none());

        task.await.unwrap();
    }
}
