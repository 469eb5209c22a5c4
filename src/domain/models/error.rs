/// Input problems caught before any network call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in the {0} field.")]
    MissingField(String),

    #[error("{0} is not a field of this tool. Run `toolgate tools` to see its fields.")]
    UnknownField(String),

    #[error("The {0} field must be a whole number.")]
    InvalidNumber(String),

    #[error("'{value}' is not a valid option for {field}. Choose one of: {options}")]
    InvalidChoice {
        field: String,
        value: String,
        options: String,
    },

    #[error("Your input contains prohibited words. Please revise the {0} field and try again.")]
    Prohibited(String),

    #[error("Please upload a file first.")]
    MissingFile,

    #[error("Unsupported file type {mime}. Accepted types: {accepted}")]
    UnsupportedFileType { mime: String, accepted: String },
}

/// Failures of a gated action, surfaced to the user as notices.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unable to reach the server: {0}")]
    Network(String),

    #[error("{message}")]
    Server { status: u16, message: String },
}

pub const GENERIC_FAILURE: &str = "Something went wrong, please try again later.";
