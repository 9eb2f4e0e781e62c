// seedling-core: 最小化的控制反转容器
//
// 提供：
// - 组件自注册与命名空间扫描
// - 按字段名注入依赖
// - 单例和原型作用域
// - 生命周期回调（BeanNameAware / InitializingBean）
// - BeanPostProcessor 扩展点与代理装饰

// 让 derive 宏生成的 `::seedling_core::...` 路径在本 crate 内也能解析
extern crate self as seedling_core;

pub mod bean;
pub mod bean_post_processor;
pub mod component;
pub mod config;
pub mod context;
pub mod error;
pub mod injector;
pub mod lifecycle;
pub mod logging;
pub mod proxy;
pub mod registry;
pub mod scanner;
pub mod scope;
pub mod utils;

// 重新导出常用类型
pub use bean::{downcast_bean, BeanDefinition, BeanInstance, BeanRef, Dependency, FunctionFactory, InstanceFactory};
pub use bean_post_processor::{BeanPostProcessor, PostProcessorChain, PostProcessorFactory};
pub use component::{Component, ComponentRegistration};
pub use config::ContainerConfig;
pub use context::{ApplicationContext, ApplicationContextBuilder, Container, ContainerExt, ContextState};
pub use error::{ContainerError, ContainerResult, Result};
pub use injector::{DependencyInjector, Injection};
pub use lifecycle::{BeanNameAware, InitializingBean, LifecycleManager};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use proxy::{decorate, JoinPoint, LoggingInterceptor, MethodInterceptor, ProxyTarget};
pub use registry::BeanDefinitionRegistry;
pub use scanner::{ComponentScanner, ScanResult, SkippedCandidate};
pub use scope::Scope;

// 导出 inventory，供宏使用
pub use inventory;

/// Prelude 模块，包含常用的 traits 和类型
pub mod prelude {
    pub use crate::bean::{downcast_bean, BeanDefinition, BeanInstance, BeanRef, Dependency, FunctionFactory};
    pub use crate::bean_post_processor::BeanPostProcessor;
    pub use crate::component::Component;
    pub use crate::config::ContainerConfig;
    pub use crate::context::{ApplicationContext, Container, ContainerExt};
    pub use crate::error::{ContainerError, ContainerResult, Result};
    pub use crate::injector::Injection;
    pub use crate::lifecycle::{BeanNameAware, InitializingBean};
    pub use crate::logging::{LogFormat, LogLevel, LoggingConfig};
    pub use crate::proxy::{decorate, JoinPoint, LoggingInterceptor, MethodInterceptor, ProxyTarget};
    pub use crate::scope::Scope;
    pub use crate::utils;
    // Re-export anyhow for convenience
    pub use anyhow::{anyhow, Context};
}
