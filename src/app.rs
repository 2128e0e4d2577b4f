use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/register", get(handlers::register_page).post(handlers::register))
        .route("/auth/callback", get(handlers::auth_callback))
        .route("/logout", post(handlers::logout))
        .route("/dashboard", get(handlers::dashboard))
        .route("/dashboard/habits", post(handlers::create_habit))
        .route("/dashboard/habits/:id/complete", post(handlers::complete_habit))
        .route("/dashboard/habits/:id/uncomplete", post(handlers::uncomplete_habit))
        .route("/dashboard/habits/:id/archive", post(handlers::archive_habit))
        .route("/dashboard/habits/:id/unarchive", post(handlers::unarchive_habit))
        .route("/dashboard/habits/:id/delete", post(handlers::delete_habit))
        .route("/dashboard/habits/:id/evolve", post(handlers::evolve_habit))
        .route("/api/dashboard", get(handlers::api_dashboard))
        .route("/api/habits/:id/calendar", get(handlers::api_calendar))
        .route("/api/habits/:id/stats", get(handlers::api_stats))
        .route("/api/habits/:id/toggle", post(handlers::api_toggle))
        .with_state(state)
}
