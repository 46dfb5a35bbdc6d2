use thiserror::Error;
use uplink_api::ApiError;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("no participants selected")]
    NoParticipants,
    #[error("participant {employee_id} has no score")]
    MissingScore { employee_id: i64 },
    #[error("participant {employee_id} score is not a number")]
    InvalidScore { employee_id: i64 },
    #[error("participant {employee_id} score must be zero or greater")]
    NegativeScore { employee_id: i64 },
    #[error("participant {employee_id} score must use at most one decimal place")]
    TooPreciseScore { employee_id: i64 },
    #[error("scores must sum to 10.0, got {sum}")]
    ScoreSumMismatch { sum: f64 },
    #[error("cancel reason must not be empty")]
    EmptyCancelReason,
    #[error("update content must not be empty")]
    EmptyUpdateContent,
    #[error("project name must not be empty")]
    EmptyProjectName,
    #[error("progress step must be a whole number between 1 and 10")]
    ProgressStepOutOfRange,
    #[error("{action} is only allowed while the project is in progress")]
    NotInProgress { action: &'static str },
    #[error("reopen is only allowed for completed or canceled projects")]
    NotReopenable,
    #[error("reopen discards evaluation and cancellation data and must be confirmed")]
    ConfirmationRequired,
    #[error("only the project creator or an administrator may do this")]
    NotPermitted,
    #[error("administrator privileges required")]
    AdminOnly,
    #[error("another request for this project is still in flight")]
    RequestInFlight,
    #[error(transparent)]
    Api(#[from] ApiError),
}
