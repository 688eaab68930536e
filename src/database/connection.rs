//! Conexión a PostgreSQL
//!
//! Este módulo maneja la conexión a la base de datos PostgreSQL.

use anyhow::Result;
use sqlx::PgPool;

use crate::config::database::DatabaseConfig;

/// Conexión compartida a la base de datos
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        let pool = config.create_pool().await?;

        // Verificar que la conexión funciona antes de arrancar el server
        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn new_default() -> Result<Self> {
        Self::new(DatabaseConfig::default()).await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Ejecutar las migraciones pendientes
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}
