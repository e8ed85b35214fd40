use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlantCareError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error in {store}: {message}")]
    Storage { store: String, message: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl PlantCareError {
    pub fn is_validation(&self) -> bool {
        matches!(self, PlantCareError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, PlantCareError>;
