use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub features: FeatureConfig,
    pub reduction: ReductionConfig,
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// CSV file with one movie per row.
    pub movies_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Multiplier applied to the collection one-hot block.
    pub collection_weight: f64,
    /// One-hot the "no collection" bucket as its own category.
    pub include_empty_collection: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReductionConfig {
    pub n_components: usize,
    pub oversamples: usize,
    pub power_iterations: usize,
    pub random_seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Fall back to the first title containing the query.
    Fuzzy,
    /// Only exact titles resolve; substring hits become suggestions.
    Exact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    pub default_count: usize,
    pub match_policy: MatchPolicy,
    pub max_suggestions: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            collection_weight: 2.0,
            include_empty_collection: false,
        }
    }
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            n_components: 2000,
            oversamples: 10,
            power_iterations: 5,
            random_seed: 42,
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            default_count: 5,
            match_policy: MatchPolicy::Fuzzy,
            max_suggestions: 5,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: num_cpus::get(),
            },
            data: DataConfig {
                movies_path: "movies_metadata.csv".to_string(),
            },
            features: FeatureConfig::default(),
            reduction: ReductionConfig::default(),
            recommendation: RecommendationConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let defaults = config::Config::try_from(&Config::default())?;
        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("MOVIEREC")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        crate::utils::validation::validate_config(&config)?;
        Ok(config)
    }

    /// Loads `path` when it exists, otherwise the defaults.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::info!("Config file {} not found, using default configuration", path);
            Ok(Self::default())
        }
    }
}
