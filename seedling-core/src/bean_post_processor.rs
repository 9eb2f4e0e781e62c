//! BeanPostProcessor - Bean 工厂扩展机制
//!
//! 提供在 Bean 初始化前后进行自定义处理的钩子，类似 Spring 的 BeanPostProcessor

use std::fmt;
use std::sync::Arc;

use crate::bean::BeanInstance;
use crate::error::ContainerResult;
use crate::utils::naming;

/// BeanPostProcessor 工厂函数类型
pub type PostProcessorFactory = fn() -> ContainerResult<Arc<dyn BeanPostProcessor>>;

/// BeanPostProcessor trait
///
/// 在 Bean 初始化的不同阶段提供钩子，允许自定义修改 Bean 实例
///
/// 使用场景：
/// - 代理创建
/// - Bean 包装
/// - 初始化前修改字段
///
/// 前置钩子收到的是具体类型的实例（`downcast_mut::<T>()`），
/// 后置钩子收到的是已发布的负载（`Arc<T>` 或 `Arc<dyn Capability>`）。
///
/// 扫描到的组件只要实现了本 trait，就会被实例化并加入处理器链，
/// 不会注册为普通 Bean。
///
/// # 示例
///
/// ```ignore
/// use seedling_core::prelude::*;
/// use seedling_core_macros::Component;
///
/// #[derive(Component)]
/// pub struct LoggingBeanPostProcessor;
///
/// impl BeanPostProcessor for LoggingBeanPostProcessor {
///     fn post_process_before_initialization(
///         &self,
///         bean: BeanInstance,
///         bean_name: &str,
///     ) -> ContainerResult<BeanInstance> {
///         tracing::info!("Before initialization: {}", bean_name);
///         Ok(bean)
///     }
/// }
/// ```
pub trait BeanPostProcessor: Send + Sync {
    /// 在 Bean 初始化回调（init）之前调用
    ///
    /// 返回处理后的 Bean 实例（可以是原始 Bean，也可以是替换后的对象）
    fn post_process_before_initialization(
        &self,
        bean: BeanInstance,
        _bean_name: &str,
    ) -> ContainerResult<BeanInstance> {
        Ok(bean)
    }

    /// 在 Bean 初始化回调（init）之后调用
    ///
    /// 典型用途是用代理替换已发布的能力接口，参见 [`crate::proxy::decorate`]
    fn post_process_after_initialization(
        &self,
        bean: BeanInstance,
        _bean_name: &str,
    ) -> ContainerResult<BeanInstance> {
        Ok(bean)
    }

    /// 获取处理器的名称（用于日志和调试），默认为类型名
    fn name(&self) -> &str {
        naming::short_type_name(std::any::type_name::<Self>())
    }
}

/// 有序的处理器链，顺序即发现顺序，只追加
#[derive(Clone, Default)]
pub struct PostProcessorChain {
    processors: Vec<Arc<dyn BeanPostProcessor>>,
}

impl PostProcessorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加处理器
    pub fn push(&mut self, processor: Arc<dyn BeanPostProcessor>) {
        tracing::debug!(
            "Registered bean post processor '{}' at position {}",
            processor.name(),
            self.processors.len()
        );
        self.processors.push(processor);
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// 处理器名称，按执行顺序
    pub fn names(&self) -> Vec<String> {
        self.processors.iter().map(|p| p.name().to_string()).collect()
    }

    /// 依次执行前置钩子，每个钩子的返回值作为下一个钩子的输入
    pub fn apply_before(&self, mut bean: BeanInstance, bean_name: &str) -> ContainerResult<BeanInstance> {
        for processor in &self.processors {
            tracing::trace!(
                "Applying '{}' before initialization of '{}'",
                processor.name(),
                bean_name
            );
            bean = processor.post_process_before_initialization(bean, bean_name)?;
        }
        Ok(bean)
    }

    /// 依次执行后置钩子
    pub fn apply_after(&self, mut bean: BeanInstance, bean_name: &str) -> ContainerResult<BeanInstance> {
        for processor in &self.processors {
            tracing::trace!(
                "Applying '{}' after initialization of '{}'",
                processor.name(),
                bean_name
            );
            bean = processor.post_process_after_initialization(bean, bean_name)?;
        }
        Ok(bean)
    }
}

impl fmt::Debug for PostProcessorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
