//! Repositorio de usuarios
//!
//! Solo lecturas: el motor consulta perfiles (departamento, nombre)
//! dentro de las transacciones de workflow; la gestión de usuarios es
//! externa.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::user::User;
use crate::utils::errors::AppError;

pub struct UserRepository;

impl UserRepository {
    /// Cargar un perfil dentro de una transacción de workflow, para
    /// defaults que dependen del perfil (departamento del solicitante)
    /// y para los snapshots del atajo autogestionado.
    pub async fn find_by_id_tx(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(user)
    }
}
