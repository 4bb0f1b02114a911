use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Failed to read snapshot at {path:?}.")]
	ReadSnapshot { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse snapshot at {path:?}.")]
	ParseSnapshot { path: PathBuf, source: serde_json::Error },
}
