//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum: el pool de conexiones y los servicios
//! de workflow ya armados.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::notification_repository::NotificationRepository;
use crate::services::maintenance_service::MaintenanceService;
use crate::services::notification_service::{NotificationService, NotificationSink};
use crate::services::tada_service::TadaService;
use crate::services::trip_service::TripService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub trips: Arc<TripService>,
    pub tada: Arc<TadaService>,
    pub maintenance: Arc<MaintenanceService>,
    pub notifications: Arc<NotificationService>,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        let notifications = Arc::new(NotificationService::new(NotificationRepository::new(
            pool.clone(),
        )));
        let sink: Arc<dyn NotificationSink> = notifications.clone();

        Self {
            trips: Arc::new(TripService::new(pool.clone(), sink.clone())),
            tada: Arc::new(TadaService::new(pool.clone(), sink.clone())),
            maintenance: Arc::new(MaintenanceService::new(pool.clone(), sink)),
            notifications,
            pool,
            config,
        }
    }
}
