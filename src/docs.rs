// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Availability ---
        handlers::availability::create_availability,
        handlers::availability::list_availability,
        handlers::availability::delete_availability,

        // --- Slots ---
        handlers::slots::claim_slot,
        handlers::slots::release_slot,
        handlers::slots::start_attention,
        handlers::slots::complete_slot,
        handlers::slots::mark_no_show,
        handlers::slots::admin_cancel_slot,
        handlers::slots::create_manual_slot,

        // --- Agenda ---
        handlers::agenda::open_slots,
        handlers::agenda::open_dates,
        handlers::agenda::my_slots,
        handlers::agenda::vet_agenda,
        handlers::agenda::vet_events,
        handlers::agenda::clinic_agenda,
        handlers::agenda::clinic_events,
    ),
    components(
        schemas(
            // --- Slots ---
            models::slot::Slot,
            models::slot::SlotStatus,

            // --- Availability ---
            models::availability::AvailabilityWindow,

            // --- Agenda ---
            models::agenda::AgendaEntry,
            models::agenda::AgendaSummary,
            models::agenda::ClientSlots,
            models::agenda::CalendarEvent,
            models::agenda::CalendarEventProps,

            // --- Diretório ---
            models::directory::UserRole,

            // --- Payloads / respostas ---
            handlers::availability::CreateAvailabilityPayload,
            handlers::availability::AvailabilityCreated,
            handlers::availability::AvailabilityDeleted,
            handlers::slots::ClaimSlotPayload,
            handlers::slots::AdminCancelPayload,
            handlers::slots::AdminCancelResponse,
            handlers::slots::CreateManualSlotPayload,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "availability", description = "Janelas de disponibilidade dos veterinários"),
        (name = "slots", description = "Ciclo de vida dos turnos"),
        (name = "agenda", description = "Listagens e calendários"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
