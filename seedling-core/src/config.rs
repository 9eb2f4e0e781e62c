//! 容器配置
//!
//! 容器唯一的配置面是扫描根命名空间，另外提供扫描方式、失败策略和日志配置。
//! 配置可以来自代码、TOML 文件或环境变量：
//!
//! ```toml
//! base-package = "app_demo::components"
//! recursive-scan = true
//! fail-fast = true
//!
//! [logging]
//! level = "debug"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ContainerError, ContainerResult};
use crate::logging::LoggingConfig;

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ContainerConfig {
    /// 扫描的根命名空间（模块路径）；为空时只使用显式注册的 Bean
    pub base_package: Option<String>,

    /// 是否扫描子模块
    pub recursive_scan: bool,

    /// 单例构造失败时是否中止启动
    pub fail_fast: bool,

    pub logging: LoggingConfig,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            base_package: None,
            recursive_scan: true,
            fail_fast: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl ContainerConfig {
    /// 以扫描根命名空间创建配置
    pub fn new(base_package: impl Into<String>) -> Self {
        Self {
            base_package: Some(base_package.into()),
            ..Self::default()
        }
    }

    /// 从 TOML 文本解析
    pub fn from_toml_str(content: &str) -> ContainerResult<Self> {
        toml::from_str(content).map_err(|e| ContainerError::Config(e.to_string()))
    }

    /// 从 TOML 文件加载
    pub fn from_file(path: impl AsRef<Path>) -> ContainerResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ContainerError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        tracing::debug!("Loaded container configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// 应用环境变量覆盖
    ///
    /// - `SEEDLING_BASE_PACKAGE`
    /// - `SEEDLING_RECURSIVE_SCAN`
    /// - `SEEDLING_FAIL_FAST`
    pub fn with_env_overrides(self) -> ContainerResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> ContainerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_package) = lookup("SEEDLING_BASE_PACKAGE") {
            self.base_package = Some(base_package);
        }

        if let Some(value) = lookup("SEEDLING_RECURSIVE_SCAN") {
            self.recursive_scan = parse_bool("SEEDLING_RECURSIVE_SCAN", &value)?;
        }

        if let Some(value) = lookup("SEEDLING_FAIL_FAST") {
            self.fail_fast = parse_bool("SEEDLING_FAIL_FAST", &value)?;
        }

        self.logging = self.logging.with_env_overrides();
        Ok(self)
    }

    pub fn base_package(mut self, base_package: impl Into<String>) -> Self {
        self.base_package = Some(base_package.into());
        self
    }

    pub fn recursive_scan(mut self, recursive: bool) -> Self {
        self.recursive_scan = recursive;
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

fn parse_bool(key: &str, value: &str) -> ContainerResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ContainerError::Config(format!(
            "Invalid boolean value '{}' for {}",
            value, key
        ))),
    }
}
