use std::sync::Arc;

use crate::bean::{BeanDefinition, Dependency, FunctionFactory};
use crate::bean_post_processor::{BeanPostProcessor, PostProcessorFactory};
use crate::injector::Injection;
use crate::{ContainerResult, Scope};

/// 组件注册记录 - 用于inventory收集
///
/// `#[derive(Component)]` 为每个组件提交一条记录，扫描器按模块路径过滤
pub struct ComponentRegistration {
    pub bean_name: &'static str,
    pub type_name: &'static str,
    pub module_path: &'static str,
    pub file: &'static str,
    pub line: u32,
    pub definition: fn() -> ContainerResult<BeanDefinition>,
    /// 类型实现了 [`BeanPostProcessor`] 时返回处理器工厂
    pub post_processor: fn() -> Option<PostProcessorFactory>,
}

inventory::collect!(ComponentRegistration);

impl ComponentRegistration {
    /// 当前进程中所有已提交的组件（顺序未定义）
    pub fn all() -> Vec<&'static ComponentRegistration> {
        inventory::iter::<ComponentRegistration>.into_iter().collect()
    }

    /// 声明位置排序键
    pub fn declaration_key(&self) -> (&'static str, &'static str, u32) {
        (self.module_path, self.file, self.line)
    }
}

/// Component trait - 用于标记可以自动注册到容器的组件
///
/// 通过 #[derive(Component)] 宏自动实现
///
/// # 示例
///
/// ```ignore
/// use seedling_core::prelude::*;
/// use seedling_core_macros::Component;
/// use std::sync::Arc;
///
/// #[derive(Component)]
/// #[component("userService")]
/// #[scope("prototype")]
/// struct UserService {
///     #[autowired]
///     order_service: Arc<OrderService>,
/// }
/// ```
pub trait Component: Sized + Send + Sync + 'static {
    /// 获取 Bean 名称
    fn bean_name() -> &'static str;

    /// 声明的作用域，扫描时解析
    fn declared_scope() -> &'static str {
        Scope::Singleton.as_str()
    }

    /// 需要注入的字段
    fn dependencies() -> Vec<Dependency> {
        Vec::new()
    }

    /// 无参构造并完成字段赋值
    fn instantiate(injection: &mut Injection) -> ContainerResult<Self>;

    /// 追加生命周期能力（aware / init / expose）
    fn configure(definition: BeanDefinition) -> BeanDefinition {
        definition
    }

    /// 构建 Bean 定义
    ///
    /// 作用域声明非法时返回 [`crate::ContainerError::InvalidScope`]
    fn definition() -> ContainerResult<BeanDefinition> {
        let scope: Scope = Self::declared_scope().parse()?;

        let definition = BeanDefinition::new(Self::bean_name(), FunctionFactory::new(Self::instantiate))
            .with_scope(scope)
            .with_dependencies(Self::dependencies());

        Ok(Self::configure(definition))
    }
}

/// 以无参构造创建处理器实例，处理器不参与依赖注入
pub fn create_post_processor<T>() -> ContainerResult<Arc<dyn BeanPostProcessor>>
where
    T: Component + BeanPostProcessor,
{
    let mut injection = Injection::empty(T::bean_name());
    let processor: Arc<dyn BeanPostProcessor> = Arc::new(T::instantiate(&mut injection)?);
    Ok(processor)
}

/// 编译期识别组件是否实现了 [`BeanPostProcessor`]
///
/// 派生宏对具体类型调用 `(&Capability::<T>::new()).post_processor_factory()`：
/// 实现了该 trait 的类型匹配 [`PostProcessorCapability`]，其余类型经自动引用后
/// 落到 [`PlainComponent`]。两个 trait 都需要在调用处引入。
#[doc(hidden)]
pub mod detect {
    use std::marker::PhantomData;

    use super::*;

    pub struct Capability<T>(PhantomData<T>);

    impl<T> Capability<T> {
        pub const fn new() -> Self {
            Capability(PhantomData)
        }
    }

    pub trait PostProcessorCapability {
        fn post_processor_factory(&self) -> Option<PostProcessorFactory>;
    }

    impl<T: Component + BeanPostProcessor> PostProcessorCapability for Capability<T> {
        fn post_processor_factory(&self) -> Option<PostProcessorFactory> {
            let create: PostProcessorFactory = create_post_processor::<T>;
            Some(create)
        }
    }

    pub trait PlainComponent {
        fn post_processor_factory(&self) -> Option<PostProcessorFactory>;
    }

    impl<T> PlainComponent for &Capability<T> {
        fn post_processor_factory(&self) -> Option<PostProcessorFactory> {
            None
        }
    }
}
