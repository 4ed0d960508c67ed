//! The router binary: wires the ingress listener, validator fan-out,
//! rolling file writer, IoT-Ticket uploader, fan-out TCP bridge,
//! latest-value query responder and the runtime command parser together.
//! See spec §2 SYSTEM OVERVIEW and §5 CONCURRENCY & RESOURCE MODEL.

use std::sync::Arc;

use clap::Parser;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use procem_hub::commands;
use procem_hub::config::Config;
use procem_hub::dayfile;
use procem_hub::fanout::{self, FanoutConfig};
use procem_hub::fanout_ids::FanoutIdsHandle;
use procem_hub::flags::{FeatureFlags, FlagsHandle};
use procem_hub::query;
use procem_hub::router;
use procem_hub::types::{FanoutItem, QueryItem, StorageBatch, UploadItem};
use procem_hub::uploader::{IotTicketClient, ReqwestIotTicketClient, UploaderConfig};
use procem_hub::validator::{self, ValidatorConfig};
use procem_store::Store;

#[derive(Parser, Debug)]
#[command(about = "Real-time telemetry router for the Procem research microgrid")]
struct Args {
    /// Path to the JSON configuration file.
    config_path: std::path::PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = match Config::load(&args.config_path) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "failed to load configuration, exiting");
            std::process::exit(1);
        }
    };

    info!(deviceid = %config.deviceid, listen_addr = %config.listen_addr, "router starting");

    let socket = match router::bind(config.listen_addr).await {
        Ok(socket) => socket,
        Err(err) => {
            error!(%err, "failed to bind router ingress socket, exiting");
            std::process::exit(1);
        }
    };

    let flags = FlagsHandle::new(FeatureFlags::from_config(&config));
    let fanout_ids = FanoutIdsHandle::new(&config.ids_for_battery);
    let store = Arc::new(Store::new(config.store_capacity));

    // Queue capacities per spec §5: "main >= max(dbQueue, uploadQueue)".
    let main_capacity = config.db_queue_size.max(config.iotticket_queue_size);
    let (main_tx, main_rx) = mpsc::channel::<Option<bytes::Bytes>>(main_capacity);
    let (query_tx, query_rx) = mpsc::channel::<QueryItem>(config.db_queue_size);
    let (storage_tx, storage_rx) = mpsc::channel::<Option<StorageBatch>>(config.db_queue_size);
    let (upload_tx, upload_rx) = mpsc::channel::<Option<UploadItem>>(config.iotticket_queue_size);
    let (fanout_tx, fanout_rx) = mpsc::channel::<Option<FanoutItem>>(config.iotticket_queue_size);
    let recycle_tx = upload_tx.clone();

    let dayfile_task = tokio::spawn(dayfile::run(config.day_log_dir.clone(), storage_rx, || {
        chrono::Local::now().date_naive()
    }));

    let client: Arc<dyn IotTicketClient> = Arc::new(ReqwestIotTicketClient::new(
        config.baseurl.clone(),
        config.username.clone(),
        config.password.clone(),
    ));
    let uploader_task = tokio::spawn(procem_hub::uploader::run(
        UploaderConfig::from_config(&config),
        client,
        upload_rx,
        recycle_tx,
    ));

    let fanout_task = tokio::spawn(fanout::run(FanoutConfig::new(config.fanout_addr), fanout_rx));

    let query_task = tokio::spawn(query::run(
        Arc::clone(&socket),
        Arc::clone(&store),
        config.present_value_count,
        query_rx,
    ));

    let validator_task = tokio::spawn(validator::run(
        ValidatorConfig::new(config.deviceid.clone()),
        Arc::clone(&store),
        flags.clone(),
        fanout_ids.clone(),
        main_rx,
        storage_tx,
        upload_tx,
        fanout_tx,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx_for_signal = shutdown_tx.clone();
    let router_task = tokio::spawn(router::run(
        Arc::clone(&socket),
        main_tx.clone(),
        query_tx,
        config.udp_confirmation_on,
        shutdown_rx,
    ));

    let commands_task = tokio::spawn(commands::run(
        tokio::io::stdin(),
        flags,
        fanout_ids,
        Arc::clone(&store),
        shutdown_tx,
    ));

    tokio::select! {
        _ = commands_task => {
            info!("command stream finished");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("received interrupt");
            let _ = shutdown_tx_for_signal.send(true);
        }
    }

    let _ = router_task.await;

    // The nil sentinel is the canonical shutdown signal (spec §5
    // "Cancellation"): the validator fans it out to every downstream queue
    // once it arrives on the main queue.
    let _ = main_tx.send(None).await;
    drop(main_tx);

    let _ = validator_task.await;
    let _ = dayfile_task.await;
    let _ = uploader_task.await;
    let _ = fanout_task.await;
    let _ = query_task.await;

    info!("router stopped");
}
