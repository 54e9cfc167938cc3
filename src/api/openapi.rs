//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, appointments, auth, availability, health, payments, shops};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Trimline API",
        version = "1.0.0",
        description = "Barber Shop Booking Platform REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Trimline Team", email = "contact@trimline.app")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::register,
        auth::me,
        // Shops & catalog
        shops::list_shops,
        shops::get_shop,
        shops::create_shop,
        shops::list_barbers,
        shops::create_barber,
        shops::update_barber,
        shops::list_services,
        shops::create_service,
        shops::delete_service,
        // Availability
        availability::list_rules,
        availability::create_rule,
        availability::delete_rule,
        availability::get_slots,
        // Appointments
        appointments::create_appointment,
        appointments::get_appointment,
        appointments::my_appointments,
        appointments::barber_appointments,
        appointments::cancel_appointment,
        appointments::complete_appointment,
        appointments::mark_no_show,
        // Payments
        payments::create_payment_intent,
        payments::webhook,
        // Admin
        admin::run_no_show_sweep,
        admin::get_no_show_flag,
        admin::reset_no_show_flag,
    ),
    components(schemas(
        crate::error::ErrorResponse,
        health::HealthResponse,
        auth::LoginRequest,
        auth::LoginResponse,
        appointments::CancelRequest,
        payments::WebhookEvent,
        payments::WebhookData,
        payments::WebhookObject,
        crate::models::shop::Shop,
        crate::models::shop::CreateShop,
        crate::models::barber::Barber,
        crate::models::barber::CreateBarber,
        crate::models::barber::UpdateBarber,
        crate::models::service::Service,
        crate::models::service::CreateService,
        crate::models::availability::AvailabilityRule,
        crate::models::availability::CreateAvailabilityRule,
        crate::models::availability::RuleKind,
        crate::models::appointment::Appointment,
        crate::models::appointment::AppointmentStatus,
        crate::models::appointment::CreateAppointment,
        crate::models::payment::Payment,
        crate::models::payment::PaymentStatus,
        crate::models::payment::PaymentIntentResponse,
        crate::models::no_show::NoShowFlag,
        crate::models::user::User,
        crate::models::user::CreateUser,
        crate::models::user::Role,
        crate::services::availability::DaySlots,
        crate::services::availability::Slot,
        crate::services::lifecycle::SweepReport,
        crate::services::lifecycle::SweepDetail,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Authentication"),
        (name = "shops", description = "Shop management"),
        (name = "barbers", description = "Barber management"),
        (name = "services", description = "Service catalog"),
        (name = "availability", description = "Availability rules and bookable slots"),
        (name = "appointments", description = "Booking and lifecycle"),
        (name = "payments", description = "Deposits and gateway callbacks"),
        (name = "admin", description = "Administrative operations")
    )
)]
pub struct ApiDoc;

/// Router serving the Swagger UI and the OpenAPI document
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
