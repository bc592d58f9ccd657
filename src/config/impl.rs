use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;
use tracing::warn;

use super::{AppConfig, FinalDocumentConfig, GradingConfig, RubricConfig, WorkflowConfig};

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // 内置默认值，保证没有配置文件时也能启动
            .set_default("app.system_name", "SETUKPA")?
            .set_default("app.environment", "development")?
            .set_default("app.log_level", "info")?
            .set_default("database.url", "setukpa.db")?
            .set_default("database.pool_size", 8)?
            .set_default("database.timeout", 10)?
            .set_default("storage.backend", "sea_orm")?
            .set_default("grading.rubric.content_max", 30.0)?
            .set_default("grading.rubric.structure_max", 25.0)?
            .set_default("grading.rubric.language_max", 20.0)?
            .set_default("grading.rubric.format_max", 25.0)?
            .set_default(
                "workflow.default_chapters",
                vec!["BAB I PENDAHULUAN", "BAB II PEMBAHASAN"],
            )?
            .set_default(
                "workflow.final_document.allowed_extensions",
                vec!["pdf", "docx"],
            )?
            .set_default("workflow.final_document.max_size", 20 * 1024 * 1024)?
            .set_default("notifications.enabled", true)?
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // 最后加载环境变量覆盖
            .add_source(
                Environment::with_prefix("SETUKPA")
                    .separator("__")
                    .try_parsing(true),
            );

        // 支持从环境变量加载
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("storage.backend", std::env::var("STORAGE_BACKEND").ok())?;

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;
        app_config.grading.rubric.check()?;

        Ok(app_config)
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }
}

impl RubricConfig {
    /// 四个维度满分之和
    pub fn total(&self) -> f64 {
        self.content_max + self.structure_max + self.language_max + self.format_max
    }

    /// 校验满分配置；约定总分为 100，不满足时只记录警告
    pub fn check(&self) -> Result<(), ConfigError> {
        let maxes = [
            ("content_max", self.content_max),
            ("structure_max", self.structure_max),
            ("language_max", self.language_max),
            ("format_max", self.format_max),
        ];
        for (name, max) in maxes {
            if !max.is_finite() || max < 0.0 {
                return Err(ConfigError::Message(format!(
                    "grading.rubric.{name} must be a non-negative number, got {max}"
                )));
            }
        }
        if (self.total() - 100.0).abs() > f64::EPSILON {
            warn!(
                "Rubric maxima sum to {} instead of the conventional 100",
                self.total()
            );
        }
        Ok(())
    }
}

impl Default for RubricConfig {
    fn default() -> Self {
        Self {
            content_max: 30.0,
            structure_max: 25.0,
            language_max: 20.0,
            format_max: 25.0,
        }
    }
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            rubric: RubricConfig::default(),
        }
    }
}

impl Default for FinalDocumentConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: vec!["pdf".into(), "docx".into()],
            max_size: 20 * 1024 * 1024,
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            default_chapters: vec!["BAB I PENDAHULUAN".into(), "BAB II PEMBAHASAN".into()],
            final_document: FinalDocumentConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rubric_sums_to_hundred() {
        let rubric = RubricConfig::default();
        assert_eq!(rubric.total(), 100.0);
        assert!(rubric.check().is_ok());
    }

    #[test]
    fn test_negative_rubric_max_rejected() {
        let rubric = RubricConfig {
            language_max: -1.0,
            ..RubricConfig::default()
        };
        assert!(rubric.check().is_err());
    }

    #[test]
    fn test_load_uses_builtin_defaults() {
        let config = AppConfig::load().expect("defaults should load");
        assert_eq!(config.grading, GradingConfig::default());
        assert!(!config.workflow.default_chapters.is_empty());
        assert!(
            config
                .workflow
                .final_document
                .allowed_extensions
                .contains(&"pdf".to_string())
        );
    }
}
