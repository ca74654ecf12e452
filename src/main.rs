use std::sync::Arc;

use anyhow::Result;
use resmon::{
    config::Config,
    protocol::{ConfigData, Request, Response},
    recorder::SystemRecorder,
    sampler::SystemSampler,
    socket::{handle_client, RequestHandler, SocketServer},
    store::SampleStore,
};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

struct DaemonState {
    recorder: SystemRecorder,
    config: RwLock<Config>,
}

#[async_trait::async_trait]
impl RequestHandler for DaemonState {
    async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Ping => Response::Pong,

            Request::GetStatus => match self.recorder.refresh().await {
                Ok(snapshot) => Response::Status { data: snapshot },
                Err(e) => Response::Error {
                    message: e.to_string(),
                },
            },

            Request::Configure { params } => {
                match self.recorder.configure(params.interval_seconds).await {
                    Ok(()) => {
                        let mut config = self.config.write().await;
                        config.recording.interval_seconds = params.interval_seconds;
                        if let Err(e) = config.save(&Config::config_path()) {
                            warn!("failed to persist config: {e}");
                        }
                        Response::Ok
                    }
                    Err(e) => Response::Error {
                        message: e.to_string(),
                    },
                }
            }

            Request::StartRecording => {
                self.recorder.start().await;
                info!("recording started");
                Response::Ok
            }

            Request::StopRecording => {
                let summary = self.recorder.stop().await;
                info!(
                    "recording stopped: {} samples over {}s",
                    summary.samples_recorded, summary.elapsed_seconds
                );
                Response::Stopped { data: summary }
            }

            Request::GetConfig => {
                let config = self.config.read().await;
                Response::Config {
                    data: ConfigData {
                        interval_seconds: config.recording.interval_seconds,
                        storage_path: config.storage.path.display().to_string(),
                        recording: self.recorder.is_recording().await,
                    },
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    info!("resmon daemon starting...");

    // Load configuration
    let config_path = Config::config_path();
    let config = if config_path.exists() {
        Config::load(&config_path).unwrap_or_else(|e| {
            warn!("failed to load config: {e}, using defaults");
            Config::default()
        })
    } else {
        info!("no config file found, using defaults");
        Config::default()
    };
    config.validate()?;

    // Open the sample store before anything can start recording
    let store = SampleStore::open(&config.storage.path)?;
    info!(
        "store ready at {:?} with {} recorded samples",
        store.path(),
        store.count()?
    );

    let recorder = SystemRecorder::new(
        SystemSampler::new(),
        store,
        config.recording.interval_seconds,
    )?;

    let socket_path = SocketServer::socket_path();
    let server = SocketServer::bind(&socket_path).await?;
    let broadcast_tx = server.broadcast_sender();

    // Push every tick's snapshot to connected clients
    let mut status_rx = recorder.subscribe();
    let forward_tx = broadcast_tx.clone();
    tokio::spawn(async move {
        while status_rx.changed().await.is_ok() {
            let snapshot = status_rx.borrow_and_update().clone();
            if let Some(data) = snapshot {
                if let Ok(json) = serde_json::to_string(&Response::Status { data }) {
                    let _ = forward_tx.send(json);
                }
            }
        }
    });

    let state = Arc::new(DaemonState {
        recorder,
        config: RwLock::new(config),
    });

    info!("daemon ready, listening for connections...");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                let summary = state.recorder.stop().await;
                if summary.samples_recorded > 0 {
                    info!(
                        "recording stopped: {} samples over {}s",
                        summary.samples_recorded, summary.elapsed_seconds
                    );
                }
                break;
            }
            result = server.accept() => match result {
                Ok(stream) => {
                    let state = Arc::clone(&state);
                    let broadcast_rx = broadcast_tx.subscribe();
                    tokio::spawn(async move {
                        handle_client(stream, broadcast_rx, state).await;
                    });
                }
                Err(e) => error!("failed to accept connection: {e}"),
            },
        }
    }

    Ok(())
}
