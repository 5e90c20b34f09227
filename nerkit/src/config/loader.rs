//! Layered configuration loading.
//!
//! Defaults come first. Files, the environment and custom providers are
//! merged on top in call order, so the last source to set a key wins.

use std::path::{Path, PathBuf};

use figment::{
    Figment, Provider,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use tracing::debug;

use super::{ConfigError, DEFAULT_CONFIG_FILES, ENV_PREFIX, NerConfig, Result, validation};

/// File formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Toml,
    Yaml,
    Json,
}

impl FileFormat {
    /// Extensions tried in the user configuration directory, in order.
    const EXTENSIONS: [&'static str; 4] = ["toml", "yaml", "yml", "json"];

    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(FileFormat::Toml),
            "yaml" | "yml" => Some(FileFormat::Yaml),
            "json" => Some(FileFormat::Json),
            _ => None,
        }
    }

    fn merge_into(self, figment: Figment, path: &Path) -> Figment {
        match self {
            FileFormat::Toml => figment.merge(Toml::file(path)),
            FileFormat::Yaml => figment.merge(Yaml::file(path)),
            FileFormat::Json => figment.merge(Json::file(path)),
        }
    }
}

/// Builds a [`NerConfig`] from layered sources.
///
/// ```no_run
/// use nerkit::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .load_default_files()
///     .load_env()
///     .extract()?;
/// # Ok::<(), nerkit::config::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    figment: Figment,
    sources: Vec<String>,
}

impl ConfigLoader {
    /// Loader holding only the default configuration.
    pub fn new() -> Self {
        Self {
            figment: Figment::from(Serialized::defaults(NerConfig::default())),
            sources: vec!["defaults".to_string()],
        }
    }

    /// Names of the merged sources, oldest first.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Merge a TOML, YAML or JSON file, picked by extension.
    ///
    /// Missing files and unknown extensions are errors and leave the loader
    /// unchanged.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path).ok_or_else(|| {
            ConfigError::FileLoadError(format!("Unsupported file format: {}", path.display()))
        })?;
        if !path.is_file() {
            return Err(ConfigError::FileLoadError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        self.layer(path.display().to_string(), |figment| {
            format.merge_into(figment, path)
        });
        Ok(self)
    }

    /// Merge the first existing file of [`DEFAULT_CONFIG_FILES`], then the
    /// first `config.*` of the user configuration directory.
    pub fn load_default_files(&mut self) -> &mut Self {
        let local = DEFAULT_CONFIG_FILES.iter().map(PathBuf::from);
        if self.load_first_existing(local).is_none() {
            debug!("No configuration file in the working directory");
        }

        if let Some(dirs) = directories::ProjectDirs::from("org", "nerkit", "nerkit") {
            let config_dir = dirs.config_dir();
            let candidates = FileFormat::EXTENSIONS
                .iter()
                .map(|ext| config_dir.join(format!("config.{}", ext)));
            self.load_first_existing(candidates);
        }

        self
    }

    /// Merge `NERKIT_*` environment variables.
    ///
    /// Nested keys are separated by a double underscore, e.g.
    /// `NERKIT_MATCHING__THRESHOLD=0.9`.
    pub fn load_env(&mut self) -> &mut Self {
        self.layer(format!("{}* environment", ENV_PREFIX), |figment| {
            figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
        });
        self
    }

    /// Merge any figment provider.
    pub fn merge<T: Provider>(&mut self, provider: T) -> &mut Self {
        let name = provider.metadata().name.to_string();
        self.layer(name, |figment| figment.merge(provider));
        self
    }

    /// Extract and validate the configuration.
    pub fn extract(&self) -> Result<NerConfig> {
        let config: NerConfig = self
            .figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        validation::validate_config(&config)?;

        debug!(sources = ?self.sources, "Configuration extracted");
        Ok(config)
    }

    fn load_first_existing<I>(&mut self, candidates: I) -> Option<PathBuf>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        candidates
            .into_iter()
            .filter(|path| path.is_file())
            .find(|path| self.load_file(path).is_ok())
    }

    fn layer(&mut self, source: String, apply: impl FnOnce(Figment) -> Figment) {
        self.figment = apply(std::mem::take(&mut self.figment));
        debug!(source = %source, "Configuration source merged");
        self.sources.push(source);
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
