//! Application state and initialization
//!
//! This module wires the database, repository and view-models together.
//! Everything is constructed explicitly here and handed down.

use crate::config::{StoreConfig, STORE_CONFIG_FILE_NAME};
use crate::database::NoteDatabase;
use crate::error::{AppError, Result};
use crate::repository::NoteRepository;
use crate::services::NoteViewModel;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. Calling this again after a
/// subscriber is installed does nothing.
pub fn init_tracing() {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notekeeper=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_ok() {
        tracing::info!("Logging initialized");
    }
}

/// Central application state holding the opened store
#[derive(Clone)]
pub struct AppState {
    pub app_data_dir: PathBuf,
    pub config: StoreConfig,
    pub db: Arc<NoteDatabase>,
    pub repository: NoteRepository,
}

impl AppState {
    /// Application setup - called once on startup
    pub async fn initialize(app_data_dir: PathBuf) -> Result<Self> {
        tracing::info!("Initializing application");
        tracing::info!("App data directory: {:?}", app_data_dir);

        tokio::fs::create_dir_all(&app_data_dir).await.map_err(|e| {
            AppError::Generic(format!("Failed to create app data dir: {}", e))
        })?;

        let config = StoreConfig::load(&app_data_dir.join(STORE_CONFIG_FILE_NAME)).await?;
        let db = Arc::new(NoteDatabase::open(&config).await?);
        let repository = NoteRepository::new(Arc::clone(&db));

        tracing::info!("Application initialized successfully");

        Ok(Self {
            app_data_dir,
            config,
            db,
            repository,
        })
    }

    /// A fresh view-model for a screen; dropping it cancels its pending writes
    pub fn view_model(&self) -> NoteViewModel {
        NoteViewModel::new(self.repository.clone())
    }

    pub async fn shutdown(&self) {
        self.db.close().await;
    }
}
