use std::path::PathBuf;

/// Errors raised by the scoring and recommendation engine.
#[derive(thiserror::Error, Debug)]
pub enum MatchError {
    #[error("malformed skill ontology: {0}")]
    MalformedOntology(String),
    #[error("malformed sport catalog: {0}")]
    MalformedCatalog(String),
    #[error("malformed questionnaire: {0}")]
    MalformedQuestionnaire(String),
    #[error("unknown skill: {0}")]
    UnknownSkill(String),
    #[error("unknown sport: {0}")]
    UnknownSport(String),
    #[error("unknown question: {0}")]
    UnknownQuestion(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Embedding provider failures are passed through untouched.
    #[error(transparent)]
    Embedding(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, MatchError>;

impl MatchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MatchError::Io {
            path: path.into(),
            source,
        }
    }
}
