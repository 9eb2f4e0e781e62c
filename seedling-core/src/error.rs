//! 统一的错误处理类型
//!
//! 容器内部统一使用 [`ContainerError`] / [`ContainerResult`]，
//! 用户代码（生命周期回调、后置处理器）可以直接使用 `anyhow`，
//! `anyhow::Error` 会通过 `?` 自动转换为 [`ContainerError::Other`]。

use thiserror::Error;

pub use anyhow::Result;

/// 容器操作的结果类型
pub type ContainerResult<T> = std::result::Result<T, ContainerError>;

/// 容器错误
#[derive(Debug, Error)]
pub enum ContainerError {
    /// 扫描命名空间语法非法（启动期致命错误）
    #[error("Invalid scan namespace '{0}'")]
    InvalidNamespace(String),

    /// 扫描命名空间下没有任何已注册的组件模块（启动期致命错误）
    #[error("Scan namespace '{0}' does not resolve to any component module")]
    UnresolvedNamespace(String),

    /// 两个组件声明了相同的 Bean 名称
    #[error("Bean name '{name}' is declared by both '{existing}' and '{duplicate}'")]
    DuplicateBeanName {
        name: String,
        existing: String,
        duplicate: String,
    },

    /// 无法识别的作用域声明
    #[error("Invalid scope '{0}', expected 'singleton' or 'prototype'")]
    InvalidScope(String),

    /// 按名称查找的 Bean 未注册
    #[error("Bean '{0}' not found")]
    BeanNotFound(String),

    /// 注入字段引用的 Bean 未注册
    #[error("Bean '{bean}' requires bean '{dependency}' for field '{field}', which is not registered")]
    UnresolvedDependency {
        bean: String,
        field: String,
        dependency: String,
    },

    /// 检测到循环依赖
    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    /// Bean 构造流水线中的任一步骤失败
    #[error("Failed to create bean '{name}': {source}")]
    BeanCreationFailed {
        name: String,
        #[source]
        source: Box<ContainerError>,
    },

    /// 单例在启动阶段构造失败，缓存中不存在该实例
    #[error("Singleton bean '{name}' is unavailable: {reason}")]
    SingletonUnavailable { name: String, reason: String },

    /// Bean 的实际类型与请求的类型不一致
    #[error("Bean '{name}' is not of type '{expected}'")]
    TypeMismatch { name: String, expected: &'static str },

    /// 后置处理器实例化失败（扫描阶段，可恢复）
    #[error("Failed to create bean post processor '{type_name}': {reason}")]
    ProcessorCreationFailed {
        type_name: &'static str,
        reason: String,
    },

    /// 配置文件或环境变量格式错误
    #[error("Configuration error: {0}")]
    Config(String),

    /// 日志系统初始化失败
    #[error("Failed to initialize logging: {0}")]
    LoggingInitFailed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ContainerError {
    /// 包装某个 Bean 的构造错误
    ///
    /// 依赖缺失、循环依赖和不可用单例保持原样向上传播，
    /// 其余错误包装为 [`ContainerError::BeanCreationFailed`]。
    pub fn creation_failed(name: impl Into<String>, source: ContainerError) -> Self {
        match source {
            ContainerError::UnresolvedDependency { .. }
            | ContainerError::CircularDependency(_)
            | ContainerError::SingletonUnavailable { .. } => source,
            other => ContainerError::BeanCreationFailed {
                name: name.into(),
                source: Box::new(other),
            },
        }
    }

    /// 是否为名称查找未命中
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContainerError::BeanNotFound(_))
    }

    /// 是否为 Bean 构造失败（区别于名称未注册）
    pub fn is_creation_failure(&self) -> bool {
        matches!(
            self,
            ContainerError::BeanCreationFailed { .. }
                | ContainerError::SingletonUnavailable { .. }
                | ContainerError::UnresolvedDependency { .. }
                | ContainerError::CircularDependency(_)
        )
    }

    /// 是否为启动期的配置错误
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ContainerError::InvalidNamespace(_)
                | ContainerError::UnresolvedNamespace(_)
                | ContainerError::DuplicateBeanName { .. }
                | ContainerError::Config(_)
        )
    }
}
