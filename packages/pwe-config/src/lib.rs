mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Generator, GeneratorMode, History, LlmProviderConfig, Postgres, Ranking, Service,
	Similarity, Storage, StorageBackend,
};

use std::{fs, path::Path};

/// Largest category list the top-strategies endpoint may return.
pub const MAX_TOP_N: u32 = 3;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } =>
			Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

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
	if cfg.service.max_prompt_chars == 0 {
		return Err(Error::Validation {
			message: "service.max_prompt_chars must be greater than zero.".to_string(),
		});
	}

	validate_storage(cfg)?;
	validate_generator(cfg)?;

	let threshold = cfg.similarity.threshold;

	if !threshold.is_finite() {
		return Err(Error::Validation {
			message: "similarity.threshold must be a finite number.".to_string(),
		});
	}
	if threshold <= 0.0 || threshold > 1.0 {
		return Err(Error::Validation {
			message: "similarity.threshold must be greater than 0.0 and at most 1.0.".to_string(),
		});
	}

	validate_ranking(cfg)?;

	if cfg.history.default_limit == 0 {
		return Err(Error::Validation {
			message: "history.default_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.history.default_limit > cfg.history.max_limit {
		return Err(Error::Validation {
			message: "history.default_limit must not exceed history.max_limit.".to_string(),
		});
	}

	Ok(())
}

fn validate_storage(cfg: &Config) -> Result<()> {
	if cfg.storage.backend != StorageBackend::Postgres {
		return Ok(());
	}

	let Some(postgres) = cfg.storage.postgres.as_ref() else {
		return Err(Error::Validation {
			message: "storage.postgres is required when storage.backend is postgres.".to_string(),
		});
	};

	if postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if postgres.acquire_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.acquire_timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn validate_generator(cfg: &Config) -> Result<()> {
	if cfg.generator.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "generator.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.generator.mode != GeneratorMode::Model {
		return Ok(());
	}

	let Some(model) = cfg.generator.model.as_ref() else {
		return Err(Error::Validation {
			message: "generator.model is required when generator.mode is model.".to_string(),
		});
	};

	for (label, value) in [
		("generator.model.api_base", &model.api_base),
		("generator.model.api_key", &model.api_key),
		("generator.model.model", &model.model),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if !model.temperature.is_finite() || model.temperature < 0.0 {
		return Err(Error::Validation {
			message: "generator.model.temperature must be a finite number, zero or greater."
				.to_string(),
		});
	}
	if model.max_tokens == 0 {
		return Err(Error::Validation {
			message: "generator.model.max_tokens must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn validate_ranking(cfg: &Config) -> Result<()> {
	let ranking = &cfg.ranking;

	for (label, weight) in [
		("ranking.success_weight", ranking.success_weight),
		("ranking.earnings_weight", ranking.earnings_weight),
		("ranking.recency_weight", ranking.recency_weight),
	] {
		if !weight.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if weight < 0.0 {
			return Err(Error::Validation { message: format!("{label} must be zero or greater.") });
		}
	}

	if ranking.success_weight + ranking.earnings_weight + ranking.recency_weight <= 0.0 {
		return Err(Error::Validation {
			message: "ranking weights must sum to a positive number.".to_string(),
		});
	}
	if !ranking.recency_half_life_days.is_finite() || ranking.recency_half_life_days <= 0.0 {
		return Err(Error::Validation {
			message: "ranking.recency_half_life_days must be a finite number greater than zero."
				.to_string(),
		});
	}
	if ranking.top_n == 0 || ranking.top_n > MAX_TOP_N {
		return Err(Error::Validation {
			message: format!("ranking.top_n must be between 1 and {MAX_TOP_N}."),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if let Some(model) = cfg.generator.model.as_mut() {
		model.api_base = model.api_base.trim_end_matches('/').to_string();
	}
	if cfg
		.generator
		.model
		.as_ref()
		.map(|model| model.api_key.trim().is_empty() && model.model.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.generator.model = None;
	}
}
