//! RepCoach - Sales Coaching Backend
//!
//! This library provides the backend for the sales rep coaching dashboard.
//! It handles:
//! - KPI threshold classification and performance scoring
//! - Rule-based coaching recommendations
//! - SQLite storage of users, reports, KPI history and recommendations
//! - Report exports

pub mod commands;
pub mod db;
pub mod export;
pub mod metrics;
pub mod models;
pub mod recommendations;

use std::path::PathBuf;
use std::sync::Mutex;

use db::Database;
use metrics::Thresholds;

/// Application state shared by all commands
pub struct AppState {
    pub db: Mutex<Option<Database>>,
    pub thresholds: Thresholds,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            db: Mutex::new(None),
            thresholds: Thresholds::default(),
        }
    }
}

impl AppState {
    /// State backed by an initialized database
    pub fn with_database(database: Database, thresholds: Thresholds) -> Self {
        Self {
            db: Mutex::new(Some(database)),
            thresholds,
        }
    }
}

/// Error type for commands
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Database error: {0}")]
    Database(#[from] db::DbError),

    #[error("Configuration error: {0}")]
    Config(#[from] metrics::ConfigError),

    #[error("Database not initialized")]
    NotInitialized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Report not found: {0}")]
    ReportNotFound(String),

    #[error("Recommendation not found: {0}")]
    RecommendationNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    InvalidTransition(#[from] recommendations::InvalidTransition),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Errors cross the serialization boundary as plain messages
impl serde::Serialize for CommandError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

// ============================================================================
// Application Setup
// ============================================================================

/// Startup options resolved from the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub db_path: Option<PathBuf>,
    pub thresholds_path: Option<PathBuf>,
    pub verbose: bool,
}

/// Initialize logging
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Open the database and load thresholds
pub fn run(options: &RunOptions) -> Result<AppState, CommandError> {
    init_logging(options.verbose);

    tracing::info!("Starting RepCoach backend");

    let thresholds = match &options.thresholds_path {
        Some(path) => Thresholds::load(path)?,
        None => Thresholds::default(),
    };

    let db_path = options.db_path.clone().unwrap_or_else(db::default_db_path);
    tracing::info!("Database path: {:?}", db_path);

    // Create database directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CommandError::Internal(format!("Failed to create database directory: {}", e))
            })?;
        }
    }

    let database = Database::new(db_path)?;
    database.initialize()?;
    tracing::info!("Database initialized successfully at {:?}", database.path());

    Ok(AppState::with_database(database, thresholds))
}
