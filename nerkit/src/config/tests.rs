#[cfg(test)]
mod tests {
    use crate::config::{
        ConfigBuilder, ConfigLoader, LogFormat, LogLevel, MatchingConfig, NerConfig, validation,
    };
    use figment::providers::Serialized;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_default_config() {
        let config = NerConfig::default();
        assert_eq!(config.matching.threshold, 0.8);
        assert!(config.matching.normalize);
        assert!(!config.matching.use_collator);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.logging.stdout);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_threshold(0.9)
            .with_normalization(false)
            .with_log_level(LogLevel::Debug)
            .with_log_file("/tmp/nerkit.log")
            .with_stdout(false)
            .build()
            .unwrap();

        assert_eq!(config.matching.threshold, 0.9);
        assert!(!config.matching.normalize);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/nerkit.log")));
        assert!(!config.logging.stdout);
    }

    #[test]
    fn test_presets() {
        let development = ConfigBuilder::development().build().unwrap();
        assert_eq!(development.logging.level, LogLevel::Debug);

        let testing = ConfigBuilder::testing().build().unwrap();
        assert_eq!(testing.logging.format, LogFormat::Compact);

        let production = ConfigBuilder::production().build().unwrap();
        assert_eq!(production.logging.format, LogFormat::Json);
        assert_eq!(ConfigBuilder::defaults().build().unwrap(), production);
    }

    #[test]
    fn test_validation() {
        assert!(ConfigBuilder::new().with_threshold(1.2).build().is_err());
        assert!(ConfigBuilder::new().with_threshold(-0.1).build().is_err());
        assert!(ConfigBuilder::new().with_threshold(f64::NAN).build().is_err());
        assert!(ConfigBuilder::new().with_threshold(0.0).build().is_ok());
        assert!(ConfigBuilder::new().with_log_file("").build().is_err());

        let config = NerConfig {
            matching: MatchingConfig {
                threshold: 2.0,
                ..MatchingConfig::default()
            },
            ..NerConfig::default()
        };
        assert!(validation::validate_config(&config).is_err());
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nerkit.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[matching]\nthreshold = 0.7\nuse_collator = true\n").unwrap();
        writeln!(file, "[logging]\nlevel = \"warn\"\nformat = \"json\"").unwrap();

        let mut loader = ConfigLoader::new();
        loader.load_file(&path).unwrap();
        let config = loader.extract().unwrap();

        assert_eq!(config.matching.threshold, 0.7);
        assert!(config.matching.use_collator);
        // unspecified keys keep their defaults
        assert!(config.matching.normalize);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_yaml_and_json_files() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("config.yaml");
        std::fs::write(&yaml, "matching:\n  threshold: 0.6\n").unwrap();
        let json = dir.path().join("config.json");
        std::fs::write(&json, r#"{"matching": {"normalize": false}}"#).unwrap();

        let mut loader = ConfigLoader::new();
        loader.load_file(&yaml).unwrap().load_file(&json).unwrap();
        let config = loader.extract().unwrap();
        assert_eq!(config.matching.threshold, 0.6);
        assert!(!config.matching.normalize);
    }

    #[test]
    fn test_load_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = ConfigLoader::new();
        assert!(loader.load_file(dir.path().join("missing.toml")).is_err());

        let ini = dir.path().join("config.ini");
        std::fs::write(&ini, "threshold=1").unwrap();
        assert!(loader.load_file(&ini).is_err());

        // a failed load leaves the loader usable
        assert_eq!(loader.extract().unwrap(), NerConfig::default());
    }

    #[test]
    fn test_invalid_values_fail_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nerkit.toml");
        std::fs::write(&path, "[matching]\nthreshold = 3.0\n").unwrap();

        let mut loader = ConfigLoader::new();
        loader.load_file(&path).unwrap();
        assert!(loader.extract().is_err());

        let mut loader = ConfigLoader::new();
        loader.merge(Serialized::default("logging.level", "loud"));
        assert!(loader.extract().is_err());
    }

    #[test]
    fn test_sources_record_merge_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nerkit.json");
        std::fs::write(&path, r#"{"matching": {"threshold": 0.7}}"#).unwrap();

        let mut loader = ConfigLoader::new();
        loader.load_file(&path).unwrap();
        assert!(loader.load_file(dir.path().join("absent.yaml")).is_err());
        loader.load_env();

        let sources = loader.sources();
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0], "defaults");
        assert_eq!(sources[1], path.display().to_string());
        assert_eq!(sources[2], "NERKIT_* environment");
    }

    #[test]
    fn test_merge_custom_provider() {
        let mut loader = ConfigLoader::default();
        loader.merge(Serialized::default("matching.threshold", 0.95));
        let config = loader.extract().unwrap();
        assert_eq!(config.matching.threshold, 0.95);
    }

    #[test]
    fn test_load_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("NERKIT_MATCHING__THRESHOLD", "0.65");
            jail.set_env("NERKIT_LOGGING__LEVEL", "error");

            let mut loader = ConfigLoader::new();
            loader.load_env();
            let config = loader.extract().map_err(|e| e.to_string())?;
            assert_eq!(config.matching.threshold, 0.65);
            assert_eq!(config.logging.level, LogLevel::Error);
            Ok(())
        });
    }

    #[test]
    fn test_load_default_files() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("nerkit.toml", "[matching]\nthreshold = 0.5\n")?;

            let mut loader = ConfigLoader::new();
            loader.load_default_files();
            let config = loader.extract().map_err(|e| e.to_string())?;
            assert_eq!(config.matching.threshold, 0.5);
            Ok(())
        });
    }
}
