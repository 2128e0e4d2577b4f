use crate::backend::BackendError;
use crate::dashboard::ActionError;
use crate::tracker::TrackerError;
use axum::http::StatusCode;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Sign in to continue".to_string(),
        }
    }

    /// Generic message for a backend call that did not go through.
    pub fn failed(action: &str) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: failure_message(action),
        }
    }

    pub fn from_action(action: &str, err: ActionError) -> Self {
        match err {
            ActionError::Invalid(err) => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: err.to_string(),
            },
            ActionError::UnknownHabit(id) => Self::not_found(format!("Habit {id} was not found")),
            ActionError::Tracker(TrackerError::InFlight(_)) => Self {
                status: StatusCode::CONFLICT,
                message: "This habit is already being updated".to_string(),
            },
            ActionError::Tracker(TrackerError::Backend(err)) | ActionError::Backend(err) => {
                Self::from_backend(action, err)
            }
        }
    }

    pub fn from_backend(action: &str, err: BackendError) -> Self {
        if err.is_unauthorized() {
            return Self::unauthorized();
        }
        Self::failed(action)
    }
}

pub fn failure_message(action: &str) -> String {
    format!("Failed to {action}. Please try again.")
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
