use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::injector::Injection;
use crate::lifecycle::{BeanNameAware, InitializingBean};
use crate::utils::naming;
use crate::{ContainerResult, Scope};

/// 已发布的 Bean，可在多个调用方之间共享
///
/// 内部负载为 `Arc<T>`（具体类型）或 `Arc<dyn Capability>`（暴露的能力接口），
/// 使用 [`downcast_bean`] 取出。
pub type BeanRef = Arc<dyn Any + Send + Sync>;

/// 构造中的 Bean，由生命周期流水线独占持有，可被修改或替换
pub type BeanInstance = Box<dyn Any + Send + Sync>;

/// 从已发布的 Bean 中取出类型化句柄
///
/// `T` 可以是具体类型，也可以是 `dyn Trait + Send + Sync`。
pub fn downcast_bean<T>(bean: &BeanRef) -> Option<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    bean.downcast_ref::<Arc<T>>().cloned()
}

/// 字段级依赖：字段标识符 → 需要注入的 Bean 名称
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// 字段标识符
    pub field: String,

    /// 注入的 Bean 名称
    pub bean_name: String,
}

impl Dependency {
    /// 按字段名绑定（`order_service` → `orderService`）
    pub fn by_field(field: impl Into<String>) -> Self {
        let field = field.into();
        let bean_name = naming::field_to_bean_name(&field);
        Self { field, bean_name }
    }

    /// 显式指定 Bean 名称
    pub fn named(field: impl Into<String>, bean_name: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            bean_name: bean_name.into(),
        }
    }
}

/// 实例工厂 - 无参构造 Bean 实例并完成字段赋值
pub trait InstanceFactory: Send + Sync {
    /// 创建 Bean 实例，`injection` 中是已解析的依赖
    fn create(&self, injection: &mut Injection) -> ContainerResult<BeanInstance>;

    /// 获取 Bean 的类型 ID
    fn instance_type_id(&self) -> TypeId;

    /// 获取 Bean 的类型名称
    fn type_name(&self) -> &'static str;
}

/// 知晓自身 Bean 名称的回调
pub type AwareCallback = Box<dyn Fn(&mut dyn Any, &str) + Send + Sync>;

/// 初始化回调（InitializingBean / 自定义 init 方法）
pub type InitCallback = Box<dyn Fn(&mut dyn Any) -> ContainerResult<()> + Send + Sync>;

/// 发布函数：把构造完成的具体实例转换为共享负载
pub type Publisher = Box<dyn Fn(BeanInstance) -> BeanInstance + Send + Sync>;

/// Bean 定义 - 描述如何创建和管理 Bean
pub struct BeanDefinition {
    /// Bean 的名称
    pub name: String,

    /// Bean 的作用域
    pub scope: Scope,

    /// 实例工厂
    pub factory: Box<dyn InstanceFactory>,

    /// 需要注入的字段
    pub dependencies: Vec<Dependency>,

    /// BeanNameAware 回调
    pub aware_callback: Option<AwareCallback>,

    /// 初始化回调
    pub init_callback: Option<InitCallback>,

    /// 发布函数
    pub publisher: Publisher,

    /// 声明位置（模块路径），用于诊断
    pub source: Option<&'static str>,
}

impl BeanDefinition {
    /// 创建新的 Bean 定义，默认发布为 `Arc<T>`
    pub fn new<T, F>(name: impl Into<String>, factory: FunctionFactory<T, F>) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&mut Injection) -> ContainerResult<T> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            scope: Scope::default(),
            factory: Box::new(factory),
            dependencies: Vec::new(),
            aware_callback: None,
            init_callback: None,
            publisher: publish_as::<T, T>(|bean| bean),
            source: None,
        }
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// 设置依赖列表
    pub fn with_dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// 追加一个依赖
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// 声明实例实现了 [`BeanNameAware`]
    pub fn with_bean_name_aware<T>(mut self) -> Self
    where
        T: BeanNameAware + Any,
    {
        self.aware_callback = Some(Box::new(|bean: &mut dyn Any, name: &str| {
            if let Some(typed) = bean.downcast_mut::<T>() {
                typed.set_bean_name(name);
            }
        }));
        self
    }

    /// 声明实例实现了 [`InitializingBean`]
    pub fn with_initializing_bean<T>(self) -> Self
    where
        T: InitializingBean + Any,
    {
        self.with_init_method::<T>(T::after_properties_set)
    }

    /// 设置自定义初始化方法
    pub fn with_init_method<T>(mut self, init_fn: fn(&mut T) -> ContainerResult<()>) -> Self
    where
        T: Any,
    {
        self.init_callback = Some(Box::new(move |bean: &mut dyn Any| {
            match bean.downcast_mut::<T>() {
                Some(typed) => init_fn(typed),
                None => Ok(()),
            }
        }));
        self
    }

    /// 初始化完成后以能力接口 `U` 发布实例
    ///
    /// ```ignore
    /// definition.exposed_as(|bean: Arc<GreeterImpl>| -> Arc<dyn Greeter + Send + Sync> { bean })
    /// ```
    pub fn exposed_as<T, U>(mut self, cast: fn(Arc<T>) -> Arc<U>) -> Self
    where
        T: Any + Send + Sync,
        U: ?Sized + Send + Sync + 'static,
    {
        self.publisher = publish_as::<T, U>(cast);
        self
    }

    /// 记录声明位置
    pub fn declared_in(mut self, source: &'static str) -> Self {
        self.source = Some(source);
        self
    }

    /// 实例的具体类型名称
    pub fn type_name(&self) -> &'static str {
        self.factory.type_name()
    }

    /// 实例的具体类型 ID
    pub fn instance_type_id(&self) -> TypeId {
        self.factory.instance_type_id()
    }
}

fn publish_as<T, U>(cast: fn(Arc<T>) -> Arc<U>) -> Publisher
where
    T: Any + Send + Sync,
    U: ?Sized + Send + Sync + 'static,
{
    Box::new(move |instance: BeanInstance| -> BeanInstance {
        match instance.downcast::<T>() {
            Ok(concrete) => Box::new(cast(Arc::from(concrete))),
            // 实例已被前置处理器替换为其他类型，按原样发布
            Err(replaced) => replaced,
        }
    })
}

impl fmt::Debug for BeanDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanDefinition")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("dependencies", &self.dependencies)
            .field("type_name", &self.factory.type_name())
            .field("aware", &self.aware_callback.is_some())
            .field("init", &self.init_callback.is_some())
            .field("source", &self.source)
            .finish()
    }
}

/// 简单的函数工厂实现
pub struct FunctionFactory<T, F>
where
    T: Any + Send + Sync,
    F: Fn(&mut Injection) -> ContainerResult<T> + Send + Sync,
{
    factory_fn: F,
    _phantom: PhantomData<fn() -> T>,
}

impl<T, F> FunctionFactory<T, F>
where
    T: Any + Send + Sync,
    F: Fn(&mut Injection) -> ContainerResult<T> + Send + Sync,
{
    pub fn new(factory_fn: F) -> Self {
        Self {
            factory_fn,
            _phantom: PhantomData,
        }
    }
}

impl<T, F> InstanceFactory for FunctionFactory<T, F>
where
    T: Any + Send + Sync,
    F: Fn(&mut Injection) -> ContainerResult<T> + Send + Sync,
{
    fn create(&self, injection: &mut Injection) -> ContainerResult<BeanInstance> {
        let instance = (self.factory_fn)(injection)?;
        Ok(Box::new(instance))
    }

    fn instance_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}
