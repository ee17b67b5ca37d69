use thiserror::Error;

/// Rejected request input. Raised before any store access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name required")]
    NameRequired,

    #[error("Title required")]
    TitleRequired,

    #[error("Invalid title")]
    InvalidTitle,

    #[error("Invalid completed")]
    InvalidCompleted,

    #[error("No fields to update")]
    NoFieldsToUpdate,

    /// A route was hit without its identifier segment (`userId`, `taskId`).
    #[error("Missing {0}")]
    MissingId(&'static str),
}
