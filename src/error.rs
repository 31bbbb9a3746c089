#[derive(thiserror::Error, Debug)]
pub enum TransitError {
    #[error("Could not automatically determine the mode of line {0}, supply one explicitly")]
    UnclassifiableLine(String),
    #[error("Station {name} not found (suggestions: {suggestions:?})")]
    UnknownStation {
        name: String,
        suggestions: Vec<String>,
    },
    #[error("No path from {origin} to {target}")]
    NoPathFound { origin: String, target: String },
    #[error("Invalid disruption: {0}")]
    InvalidDisruptionShape(String),
    #[error("Operation out of order: {0}")]
    PreconditionViolation(String),
    #[error("Malformed topology: {0}")]
    MalformedTopology(String),
    #[error("Bad configuration: {0}")]
    Config(String),
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("Bad line file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl TransitError {
    pub fn unknown_station(name: &str) -> TransitError {
        TransitError::UnknownStation {
            name: String::from(name),
            suggestions: vec![],
        }
    }
}
