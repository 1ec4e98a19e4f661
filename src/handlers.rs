use crate::errors::AppError;
use crate::models::{
    AddHabitRequest, BoardResponse, CredentialsRequest, MonthRequest, SessionResponse, ToggleRequest,
};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};

pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let tracker = state.tracker.lock().await;
    Json(tracker.session_view())
}

pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut tracker = state.tracker.lock().await;
    tracker.signup(&payload.username, &payload.password).await?;
    Ok(Json(tracker.session_view()))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut tracker = state.tracker.lock().await;
    tracker.login(&payload.username, &payload.password).await?;
    Ok(Json(tracker.session_view()))
}

pub async fn logout(State(state): State<AppState>) -> Json<SessionResponse> {
    let mut tracker = state.tracker.lock().await;
    tracker.logout().await;
    Json(tracker.session_view())
}

pub async fn get_board(State(state): State<AppState>) -> Json<BoardResponse> {
    let tracker = state.tracker.lock().await;
    Json(tracker.board())
}

pub async fn add_habit(
    State(state): State<AppState>,
    Json(payload): Json<AddHabitRequest>,
) -> Json<BoardResponse> {
    let mut tracker = state.tracker.lock().await;
    tracker.add_habit(&payload.name).await;
    Json(tracker.board())
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<BoardResponse> {
    let mut tracker = state.tracker.lock().await;
    tracker.delete_habit(&name).await;
    Json(tracker.board())
}

pub async fn toggle_day(
    State(state): State<AppState>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<BoardResponse>, AppError> {
    let mut tracker = state.tracker.lock().await;
    if !tracker.record().contains(&payload.habit) {
        return Err(AppError::bad_request(format!("unknown habit '{}'", payload.habit)));
    }
    if !tracker.is_valid_day(payload.day) {
        return Err(AppError::bad_request("day is outside the selected month"));
    }

    tracker.toggle_day(&payload.habit, payload.day).await;
    Ok(Json(tracker.board()))
}

pub async fn set_month(
    State(state): State<AppState>,
    Json(payload): Json<MonthRequest>,
) -> Result<Json<BoardResponse>, AppError> {
    let mut tracker = state.tracker.lock().await;
    match (payload.month, payload.step) {
        (Some(month), None) => {
            if !tracker.set_month(month) {
                return Err(AppError::bad_request("month must be between 0 and 11"));
            }
        }
        (None, Some(step)) => tracker.step_month(step),
        _ => return Err(AppError::bad_request("provide exactly one of 'month' or 'step'")),
    }
    Ok(Json(tracker.board()))
}
