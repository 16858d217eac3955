// src/db/directory_repo.rs
//
// Fronteira de leitura do diretório (usuários, clínicas, pets).
// Nenhuma escrita acontece aqui: essas tabelas pertencem a outros serviços.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::directory::{Clinic, Pet, User},
};

#[derive(Clone)]
pub struct DirectoryRepository {
    pool: PgPool,
}

impl DirectoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_clinic_by_id(&self, id: Uuid) -> Result<Option<Clinic>, AppError> {
        let clinic = sqlx::query_as::<_, Clinic>(
            "SELECT * FROM clinics WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(clinic)
    }

    /// Busca um pet ativo. A checagem de posse fica no serviço, que sabe
    /// distinguir "não existe" de "não é seu".
    pub async fn find_active_pet(&self, id: Uuid) -> Result<Option<Pet>, AppError> {
        let pet = sqlx::query_as::<_, Pet>("SELECT * FROM pets WHERE id = $1 AND is_active = TRUE")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(pet)
    }
}
