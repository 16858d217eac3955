// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Janelas de disponibilidade (veterinário)
    let availability_routes = Router::new()
        .route(
            "/",
            post(handlers::availability::create_availability)
                .get(handlers::availability::list_availability),
        )
        .route("/{id}", delete(handlers::availability::delete_availability));

    // Ciclo de vida dos turnos + oferta para o cliente
    let slot_routes = Router::new()
        .route("/", post(handlers::slots::create_manual_slot))
        .route("/open", get(handlers::agenda::open_slots))
        .route("/open/dates", get(handlers::agenda::open_dates))
        .route("/mine", get(handlers::agenda::my_slots))
        .route("/{id}/claim", post(handlers::slots::claim_slot))
        .route("/{id}/release", post(handlers::slots::release_slot))
        .route("/{id}/start", post(handlers::slots::start_attention))
        .route("/{id}/complete", post(handlers::slots::complete_slot))
        .route("/{id}/no-show", post(handlers::slots::mark_no_show))
        .route("/{id}/cancel", post(handlers::slots::admin_cancel_slot));

    // Agenda do veterinário
    let agenda_routes = Router::new()
        .route("/", get(handlers::agenda::vet_agenda))
        .route("/events", get(handlers::agenda::vet_events));

    // Agenda da clínica (administração)
    let clinic_routes = Router::new()
        .route("/agenda", get(handlers::agenda::clinic_agenda))
        .route("/agenda/events", get(handlers::agenda::clinic_events));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest(
            "/api/availability",
            availability_routes.layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                auth_guard,
            )),
        )
        .nest(
            "/api/slots",
            slot_routes.layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                auth_guard,
            )),
        )
        .nest(
            "/api/agenda",
            agenda_routes.layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                auth_guard,
            )),
        )
        .nest(
            "/api/clinic",
            clinic_routes.layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                auth_guard,
            )),
        )
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
