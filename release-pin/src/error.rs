use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Failed to replace manifest: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Release API error: {0}")]
    Api(String),

    #[error("Invalid project configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
