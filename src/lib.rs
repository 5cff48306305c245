pub mod box_office;
pub mod config;
pub mod controllers;
pub mod error;
pub mod ids;
pub mod middleware;
pub mod models;
pub mod seed;
pub mod services;
pub mod venue;

use axum::{routing::get, Router};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::trace::TraceLayer;

use crate::box_office::BoxOffice;
use crate::error::{AppError, EngineError};
use crate::models::UserDirectory;
use crate::venue::Venue;

// Shared state для всего приложения
pub struct AppState {
    office: Mutex<BoxOffice>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(config: config::Config) -> Result<Arc<Self>, EngineError> {
        let venue = Venue::new(
            config.venue.name.clone(),
            config.venue.rows,
            config.venue.cols,
            config.show_defaults(),
        );
        let mut office = BoxOffice::new(venue, UserDirectory::new(), config.volume_discount());

        if config.features.seed_demo_data {
            seed::seed_demo_data(&mut office, chrono::Local::now().naive_local())?;
        }

        Ok(Arc::new(Self {
            office: Mutex::new(office),
            config,
        }))
    }

    /// Эксклюзивный доступ к движку. Каждая операция выполняется под этой
    /// блокировкой целиком, поэтому блокировку не держат через `.await`.
    pub fn lock(&self) -> Result<MutexGuard<'_, BoxOffice>, AppError> {
        self.office
            .lock()
            .map_err(|_| AppError::Internal("box office state poisoned".to_string()))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Box Office API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        // Mount the routes from the controllers module
        .nest("/api", controllers::routes())
        // Pass the application state to the router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
