/// Errors raised by the screening engine, policy loading and screening storage.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid screening policy: {0}")]
    InvalidPolicy(String),
    #[error("screening policy schema mismatch at {path}: {message}")]
    PolicySchema { path: String, message: String },
    #[error("failed to read screening policy {path}: {source}", path = path.display())]
    PolicyRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write screening file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read screening file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
}

pub type ScreeningResult<T> = std::result::Result<T, ScreeningError>;
