use crate::config::Config;
use anyhow::{anyhow, Result};

pub const MAX_TITLE_LENGTH: usize = 500;
pub const MAX_RECOMMENDATIONS: usize = 100;

pub fn validate_config(config: &Config) -> Result<()> {
    if config.reduction.n_components == 0 {
        return Err(anyhow!("reduction.n_components must be positive"));
    }

    if !config.features.collection_weight.is_finite() || config.features.collection_weight < 0.0 {
        return Err(anyhow!("features.collection_weight must be a non-negative number"));
    }

    if config.recommendation.default_count == 0 || config.recommendation.default_count > MAX_RECOMMENDATIONS {
        return Err(anyhow!(
            "recommendation.default_count must be between 1 and {}",
            MAX_RECOMMENDATIONS
        ));
    }

    if config.data.movies_path.trim().is_empty() {
        return Err(anyhow!("data.movies_path cannot be empty"));
    }

    Ok(())
}

pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(anyhow!("Movie title cannot be empty"));
    }

    if title.len() > MAX_TITLE_LENGTH {
        return Err(anyhow!("Movie title too long (max {} characters)", MAX_TITLE_LENGTH));
    }

    Ok(())
}

pub fn validate_count(count: usize) -> Result<()> {
    if count == 0 {
        return Err(anyhow!("Number of recommendations must be positive"));
    }

    if count > MAX_RECOMMENDATIONS {
        return Err(anyhow!("Too many recommendations requested (max {})", MAX_RECOMMENDATIONS));
    }

    Ok(())
}
