// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{AvailabilityRepository, DirectoryRepository, SlotRepository},
    services::{AgendaService, AvailabilityService, BookingService},
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub directory_repo: DirectoryRepository,
    pub availability_service: AvailabilityService,
    pub booking_service: BookingService,
    pub agenda_service: AgendaService,
}

impl AppState {
    // Carrega as configurações e monta o gráfico de dependências.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let directory_repo = DirectoryRepository::new(db_pool.clone());
        let slot_repo = SlotRepository::new(db_pool.clone());
        let availability_repo = AvailabilityRepository::new(db_pool.clone());

        let availability_service = AvailabilityService::new(
            availability_repo,
            slot_repo.clone(),
            directory_repo.clone(),
        );
        let booking_service = BookingService::new(slot_repo.clone(), directory_repo.clone());
        let agenda_service = AgendaService::new(slot_repo);

        Ok(Self {
            db_pool,
            jwt_secret,
            directory_repo,
            availability_service,
            booking_service,
            agenda_service,
        })
    }
}
