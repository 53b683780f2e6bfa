use gym::ConstructionError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("environment id must not be empty")]
    EmptyId,
    #[error("environment id {0:?} must not contain whitespace")]
    MalformedId(String),
    #[error("environment {0} is already registered")]
    AlreadyRegistered(String),
    #[error("invalid parameter for environment {id}: {reason}")]
    InvalidParameter { id: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MakeError {
    #[error("no registered environment with id {id}{}", suggestion_suffix(.similar))]
    UnknownEnvironment { id: String, similar: Vec<String> },
    #[error("failed to construct environment {id}: {source}")]
    Construction {
        id: String,
        #[source]
        source: ConstructionError,
    },
}

fn suggestion_suffix(similar: &[String]) -> String {
    if similar.is_empty() {
        String::new()
    } else {
        format!(" (registered versions: {})", similar.join(", "))
    }
}
