use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/session", get(handlers::get_session))
        .route("/api/signup", post(handlers::signup))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route("/api/board", get(handlers::get_board))
        .route("/api/habits", post(handlers::add_habit))
        .route("/api/habits/:name", delete(handlers::delete_habit))
        .route("/api/toggle", post(handlers::toggle_day))
        .route("/api/month", post(handlers::set_month))
        .with_state(state)
}
