mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Postgres, Preview, Query, Security, Service, Snapshot, Storage, StorageBackend,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	match cfg.storage.backend {
		StorageBackend::Postgres => {
			let Some(postgres) = cfg.storage.postgres.as_ref() else {
				return Err(Error::Validation {
					message: "storage.postgres is required when storage.backend is postgres."
						.to_string(),
				});
			};

			if postgres.dsn.trim().is_empty() {
				return Err(Error::Validation {
					message: "storage.postgres.dsn must be non-empty.".to_string(),
				});
			}
			if postgres.pool_max_conns == 0 {
				return Err(Error::Validation {
					message: "storage.postgres.pool_max_conns must be greater than zero."
						.to_string(),
				});
			}
		},
		StorageBackend::Snapshot => {
			let Some(snapshot) = cfg.storage.snapshot.as_ref() else {
				return Err(Error::Validation {
					message: "storage.snapshot is required when storage.backend is snapshot."
						.to_string(),
				});
			};

			if snapshot.path.trim().is_empty() {
				return Err(Error::Validation {
					message: "storage.snapshot.path must be non-empty.".to_string(),
				});
			}
		},
	}

	if cfg.query.default_post_types.is_empty() {
		return Err(Error::Validation {
			message: "query.default_post_types must contain at least one post type.".to_string(),
		});
	}
	if cfg.query.default_post_types.iter().any(|post_type| post_type.trim().is_empty()) {
		return Err(Error::Validation {
			message: "query.default_post_types must not contain blank entries.".to_string(),
		});
	}
	if cfg.query.search_limit_floor == 0 {
		return Err(Error::Validation {
			message: "query.search_limit_floor must be greater than zero.".to_string(),
		});
	}

	if let Some(max) = cfg.query.max_page_size
		&& max == 0
	{
		return Err(Error::Validation {
			message: "query.max_page_size must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();

	if cfg.service.log_level.is_empty() {
		cfg.service.log_level = "info".to_string();
	}

	for post_type in &mut cfg.query.default_post_types {
		*post_type = post_type.trim().to_string();
	}
}
