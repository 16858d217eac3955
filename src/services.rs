pub mod agenda_service;
pub use agenda_service::AgendaService;
pub mod availability_service;
pub use availability_service::AvailabilityService;
pub mod booking_service;
pub use booking_service::BookingService;
