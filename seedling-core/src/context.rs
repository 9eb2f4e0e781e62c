use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::bean::{downcast_bean, BeanDefinition, BeanRef};
use crate::bean_post_processor::{BeanPostProcessor, PostProcessorChain};
use crate::component::Component;
use crate::config::ContainerConfig;
use crate::error::{ContainerError, ContainerResult};
use crate::injector::DependencyInjector;
use crate::lifecycle::LifecycleManager;
use crate::registry::BeanDefinitionRegistry;
use crate::scanner::{ComponentScanner, SkippedCandidate};
use crate::utils::dependency::CreationStack;
use crate::Scope;

/// 容器 trait - 定义依赖注入容器的查询接口
pub trait Container: Send + Sync {
    /// 通过名称获取 Bean
    fn get_bean(&self, name: &str) -> ContainerResult<BeanRef>;

    /// 检查是否包含指定名称的 Bean
    fn contains_bean(&self, name: &str) -> bool;

    /// 获取所有 Bean 的名称（注册顺序）
    fn get_bean_names(&self) -> Vec<String>;
}

/// 类型化查询
pub trait ContainerExt: Container {
    /// 通过名称获取 Bean 并转换为 `Arc<T>`
    ///
    /// `T` 可以是具体类型或暴露的能力接口（`dyn Trait + Send + Sync`）
    fn get_bean_as<T>(&self, name: &str) -> ContainerResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let bean = self.get_bean(name)?;
        downcast_bean::<T>(&bean).ok_or_else(|| ContainerError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<T>(),
        })
    }
}

impl<C: Container + ?Sized> ContainerExt for C {}

/// 容器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// 扫描组件，填充注册表和处理器链
    Scanning,

    /// 预实例化单例
    Instantiating,

    /// 就绪，只读
    Ready,
}

/// 应用上下文 - Container 的默认实现
///
/// 持有注册表、处理器链和单例缓存。构造时完成扫描和单例预实例化，
/// 之后不再修改注册表，也不会延迟创建单例。
pub struct ApplicationContext {
    config: ContainerConfig,

    /// Bean 定义注册表
    registry: BeanDefinitionRegistry,

    /// 后置处理器链（发现顺序）
    post_processors: PostProcessorChain,

    /// 单例缓存
    singletons: RwLock<HashMap<String, BeanRef>>,

    /// 构造失败的单例（fail_fast = false 时）
    failed_singletons: RwLock<HashMap<String, String>>,

    /// 扫描时跳过的组件
    skipped: Vec<SkippedCandidate>,

    state: RwLock<ContextState>,
}

impl ApplicationContext {
    /// 按配置创建并启动容器
    pub fn new(config: ContainerConfig) -> ContainerResult<Arc<Self>> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> ApplicationContextBuilder {
        ApplicationContextBuilder::new()
    }

    fn empty(config: ContainerConfig) -> Self {
        Self {
            config,
            registry: BeanDefinitionRegistry::new(),
            post_processors: PostProcessorChain::new(),
            singletons: RwLock::new(HashMap::new()),
            failed_singletons: RwLock::new(HashMap::new()),
            skipped: Vec::new(),
            state: RwLock::new(ContextState::Scanning),
        }
    }

    /// 当前状态
    pub fn state(&self) -> ContextState {
        *self.state.read()
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Bean 定义数量
    pub fn bean_definition_count(&self) -> usize {
        self.registry.len()
    }

    /// 后置处理器名称，按执行顺序
    pub fn post_processor_names(&self) -> Vec<String> {
        self.post_processors.names()
    }

    /// Bean 的作用域
    pub fn scope_of(&self, name: &str) -> Option<Scope> {
        self.registry.get(name).map(|definition| definition.scope)
    }

    /// 扫描时被跳过的组件
    pub fn skipped_components(&self) -> &[SkippedCandidate] {
        &self.skipped
    }

    /// 启动阶段构造失败的单例及原因
    pub fn failed_singletons(&self) -> HashMap<String, String> {
        self.failed_singletons.read().clone()
    }

    fn transition(&self, next: ContextState) {
        let mut state = self.state.write();
        tracing::debug!("Application context state: {:?} -> {:?}", *state, next);
        *state = next;
    }

    /// 扫描阶段：扫描命名空间，再追加显式注册的定义和处理器
    fn populate(
        &mut self,
        definitions: Vec<BeanDefinition>,
        post_processors: Vec<Arc<dyn BeanPostProcessor>>,
    ) -> ContainerResult<()> {
        if let Some(base_package) = &self.config.base_package {
            let scan = ComponentScanner::new(base_package)?
                .recursive(self.config.recursive_scan)
                .scan()?;

            self.registry = scan.registry;
            self.post_processors = scan.post_processors;
            self.skipped = scan.skipped;
        } else {
            tracing::debug!("No base package configured, skipping component scan");
        }

        for definition in definitions {
            self.registry.register(definition)?;
        }

        for processor in post_processors {
            self.post_processors.push(processor);
        }

        Ok(())
    }

    /// 预实例化阶段：按注册顺序创建所有单例
    fn preinstantiate_singletons(&self) -> ContainerResult<()> {
        let singletons: Vec<&BeanDefinition> = self
            .registry
            .iter()
            .filter(|definition| definition.scope == Scope::Singleton)
            .collect();

        tracing::info!("Pre-instantiating {} singleton bean(s)", singletons.len());

        for definition in singletons {
            let name = definition.name.as_str();

            // 可能已作为其他单例的依赖被创建
            if self.singletons.read().contains_key(name) || self.failed_singletons.read().contains_key(name) {
                continue;
            }

            let mut stack = CreationStack::new();
            if let Err(e) = self.instantiate_singleton(definition, &mut stack) {
                if self.config.fail_fast {
                    tracing::error!("Failed to instantiate singleton '{}': {}", name, e);
                    return Err(e);
                }
                tracing::warn!("Singleton '{}' is unavailable: {}", name, e);
            }
        }

        Ok(())
    }

    fn resolve(&self, name: &str, stack: &mut CreationStack) -> ContainerResult<BeanRef> {
        let definition = self
            .registry
            .get(name)
            .ok_or_else(|| ContainerError::BeanNotFound(name.to_string()))?;

        match definition.scope {
            Scope::Prototype => self.create(definition, stack),
            Scope::Singleton => {
                let cached = self.singletons.read().get(name).cloned();
                if let Some(bean) = cached {
                    return Ok(bean);
                }

                let failed = self.failed_singletons.read().get(name).cloned();
                if let Some(reason) = failed {
                    return Err(ContainerError::SingletonUnavailable {
                        name: name.to_string(),
                        reason,
                    });
                }

                if self.state() == ContextState::Ready {
                    return Err(ContainerError::SingletonUnavailable {
                        name: name.to_string(),
                        reason: "singleton was not instantiated during startup".to_string(),
                    });
                }

                self.instantiate_singleton(definition, stack)
            }
        }
    }

    fn instantiate_singleton(&self, definition: &BeanDefinition, stack: &mut CreationStack) -> ContainerResult<BeanRef> {
        match self.create(definition, stack) {
            Ok(bean) => {
                self.singletons
                    .write()
                    .insert(definition.name.clone(), Arc::clone(&bean));
                tracing::debug!("Singleton '{}' cached", definition.name);
                Ok(bean)
            }
            Err(e) => {
                if !self.config.fail_fast {
                    self.failed_singletons
                        .write()
                        .insert(definition.name.clone(), e.to_string());
                }
                Err(e)
            }
        }
    }

    /// 运行一次完整的构造流水线
    fn create(&self, definition: &BeanDefinition, stack: &mut CreationStack) -> ContainerResult<BeanRef> {
        let name = definition.name.as_str();

        stack.enter(name).map_err(|cycle| {
            tracing::error!("Circular dependency detected: {}", cycle);
            ContainerError::CircularDependency(cycle)
        })?;

        tracing::debug!("Creating bean '{}' (scope: {}, depth: {})", name, definition.scope, stack.depth());

        let result = DependencyInjector
            .inject(definition, |dependency| self.resolve(dependency, stack))
            .map_err(|e| ContainerError::creation_failed(name, e))
            .and_then(|injection| LifecycleManager::new(&self.post_processors).construct(definition, injection));

        stack.exit(name);
        result
    }
}

impl Container for ApplicationContext {
    fn get_bean(&self, name: &str) -> ContainerResult<BeanRef> {
        let mut stack = CreationStack::new();
        self.resolve(name, &mut stack).inspect_err(|e| {
            if e.is_not_found() {
                tracing::debug!("Bean '{}' not found", name);
            }
        })
    }

    fn contains_bean(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    fn get_bean_names(&self) -> Vec<String> {
        self.registry.names()
    }
}

impl fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("state", &self.state())
            .field("beans", &self.registry.names())
            .field("post_processors", &self.post_processors)
            .field("singletons", &self.singletons.read().len())
            .finish()
    }
}

impl Drop for ApplicationContext {
    fn drop(&mut self) {
        tracing::debug!(
            "Closing application context, releasing {} singleton(s)",
            self.singletons.get_mut().len()
        );
    }
}

/// ApplicationContext 构建器
#[derive(Default)]
pub struct ApplicationContextBuilder {
    config: ContainerConfig,
    definitions: Vec<BeanDefinition>,
    post_processors: Vec<Arc<dyn BeanPostProcessor>>,
}

impl ApplicationContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 整体替换配置
    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 扫描的根命名空间
    pub fn base_package(mut self, base_package: impl Into<String>) -> Self {
        self.config.base_package = Some(base_package.into());
        self
    }

    pub fn recursive_scan(mut self, recursive: bool) -> Self {
        self.config.recursive_scan = recursive;
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.config.fail_fast = fail_fast;
        self
    }

    /// 显式注册 Bean 定义，排在扫描结果之后
    pub fn register(mut self, definition: BeanDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// 显式注册组件（无需位于扫描命名空间内）
    pub fn register_component<C: Component>(self) -> ContainerResult<Self> {
        let definition = C::definition()?;
        Ok(self.register(definition))
    }

    /// 显式追加后置处理器，排在扫描发现的处理器之后
    pub fn add_post_processor(mut self, processor: Arc<dyn BeanPostProcessor>) -> Self {
        self.post_processors.push(processor);
        self
    }

    /// 扫描、注册并预实例化单例
    pub fn build(self) -> ContainerResult<Arc<ApplicationContext>> {
        tracing::info!("Starting application context");

        let mut context = ApplicationContext::empty(self.config);
        context.populate(self.definitions, self.post_processors)?;

        context.transition(ContextState::Instantiating);
        context.preinstantiate_singletons()?;
        context.transition(ContextState::Ready);

        tracing::info!(
            "Application context ready: {} bean definition(s), {} post processor(s)",
            context.bean_definition_count(),
            context.post_processors.len()
        );

        Ok(Arc::new(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::{BeanInstance, Dependency, FunctionFactory};
    use crate::injector::Injection;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct A;

    #[derive(Debug)]
    struct B {
        a: Arc<A>,
    }

    fn a() -> BeanDefinition {
        BeanDefinition::new("a", FunctionFactory::new(|_: &mut Injection| Ok(A)))
    }

    fn b(scope: Scope) -> BeanDefinition {
        BeanDefinition::new(
            "b",
            FunctionFactory::new(|injection: &mut Injection| {
                Ok(B {
                    a: injection.take::<A>("a")?,
                })
            }),
        )
        .with_scope(scope)
        .with_dependency(Dependency::by_field("a"))
    }

    fn needs(name: &'static str, dependency: &'static str) -> BeanDefinition {
        BeanDefinition::new(name, FunctionFactory::new(|_: &mut Injection| Ok(())))
            .with_dependency(Dependency::named(dependency, dependency))
    }

    struct Exploding;

    impl BeanPostProcessor for Exploding {
        fn post_process_after_initialization(
            &self,
            bean: BeanInstance,
            bean_name: &str,
        ) -> ContainerResult<BeanInstance> {
            if bean_name == "fragile" {
                return Err(anyhow::anyhow!("cannot wrap {}", bean_name).into());
            }
            Ok(bean)
        }
    }

    #[test]
    fn test_singleton_injection_identity() {
        let context = ApplicationContext::builder()
            .register(a())
            .register(b(Scope::Singleton))
            .build()
            .unwrap();

        assert_eq!(context.state(), ContextState::Ready);
        assert_eq!(context.get_bean_names(), vec!["a", "b"]);

        let first = context.get_bean("b").unwrap();
        let second = context.get_bean("b").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let b = context.get_bean_as::<B>("b").unwrap();
        let a = context.get_bean_as::<A>("a").unwrap();
        assert!(Arc::ptr_eq(&b.a, &a));
    }

    #[test]
    fn test_prototype_creates_new_instances() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);

        let context = ApplicationContext::builder()
            .register(
                BeanDefinition::new(
                    "p",
                    FunctionFactory::new(move |_: &mut Injection| {
                        Ok(counter.fetch_add(1, Ordering::SeqCst))
                    }),
                )
                .with_scope(Scope::Prototype),
            )
            .build()
            .unwrap();

        // 原型不参与预实例化
        assert_eq!(created.load(Ordering::SeqCst), 0);

        let first = context.get_bean_as::<usize>("p").unwrap();
        let second = context.get_bean_as::<usize>("p").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!((*first, *second), (0, 1));
        assert_eq!(context.scope_of("p"), Some(Scope::Prototype));
    }

    #[test]
    fn test_not_found_is_distinct() {
        let context = ApplicationContext::builder().register(a()).build().unwrap();

        let err = context.get_bean("doesNotExist").unwrap_err();
        assert!(err.is_not_found());
        assert!(!context.contains_bean("doesNotExist"));

        let err = context.get_bean_as::<B>("a").unwrap_err();
        assert!(matches!(err, ContainerError::TypeMismatch { .. }));
    }

    #[test]
    fn test_unresolved_dependency_aborts_startup() {
        let err = ApplicationContext::builder()
            .register(b(Scope::Singleton))
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            ContainerError::UnresolvedDependency { ref bean, ref dependency, .. }
                if bean == "b" && dependency == "a"
        ));
    }

    #[test]
    fn test_cycle_fails_fast() {
        let err = ApplicationContext::builder()
            .register(needs("x", "y"))
            .register(needs("y", "x"))
            .build()
            .unwrap_err();

        match err {
            ContainerError::CircularDependency(cycle) => assert_eq!(cycle, "x -> y -> x"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_prototype_cycle_detected_on_lookup() {
        let context = ApplicationContext::builder()
            .register(needs("x", "x").with_scope(Scope::Prototype))
            .build()
            .unwrap();

        let err = context.get_bean("x").unwrap_err();
        assert!(matches!(err, ContainerError::CircularDependency(ref c) if c == "x -> x"));
    }

    #[test]
    fn test_failed_singleton_without_fail_fast() {
        let context = ApplicationContext::builder()
            .fail_fast(false)
            .register(a())
            .register(BeanDefinition::new(
                "fragile",
                FunctionFactory::new(|_: &mut Injection| Ok(String::from("fragile"))),
            ))
            .add_post_processor(Arc::new(Exploding))
            .build()
            .unwrap();

        assert!(context.get_bean("a").is_ok());

        let err = context.get_bean("fragile").unwrap_err();
        assert!(err.is_creation_failure());
        assert!(!err.is_not_found());
        assert!(matches!(err, ContainerError::SingletonUnavailable { ref reason, .. } if reason.contains("cannot wrap")));
        assert!(context.failed_singletons().contains_key("fragile"));
    }

    #[test]
    fn test_failed_singleton_with_fail_fast() {
        let err = ApplicationContext::builder()
            .register(BeanDefinition::new(
                "fragile",
                FunctionFactory::new(|_: &mut Injection| Ok(1_u8)),
            ))
            .add_post_processor(Arc::new(Exploding))
            .build()
            .unwrap_err();

        assert!(matches!(err, ContainerError::BeanCreationFailed { ref name, .. } if name == "fragile"));
    }

    #[test]
    fn test_duplicate_explicit_registration() {
        let err = ApplicationContext::builder()
            .register(a())
            .register(a())
            .build()
            .unwrap_err();

        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_empty_context_is_ready() {
        let context = ApplicationContext::new(ContainerConfig::default()).unwrap();
        assert_eq!(context.state(), ContextState::Ready);
        assert_eq!(context.bean_definition_count(), 0);
        assert!(context.post_processor_names().is_empty());
    }
}
