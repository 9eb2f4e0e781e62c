//! Bean 生命周期
//!
//! 单个 Bean 的构造流水线：
//!
//! 1. 无参构造并完成字段赋值
//! 2. [`BeanNameAware`] 回调
//! 3. 处理器链的前置钩子
//! 4. [`InitializingBean`] / 自定义初始化方法
//! 5. 发布为共享负载
//! 6. 处理器链的后置钩子

use std::any::Any;
use std::sync::Arc;

use crate::bean::{BeanDefinition, BeanRef};
use crate::bean_post_processor::PostProcessorChain;
use crate::error::{ContainerError, ContainerResult};
use crate::injector::Injection;

/// 知晓自身 Bean 名称
pub trait BeanNameAware {
    /// 在依赖注入之后、前置钩子之前调用
    fn set_bean_name(&mut self, name: &str);
}

/// 初始化回调
/// 类似 Spring 的 InitializingBean
pub trait InitializingBean {
    /// 在前置钩子之后、后置钩子之前调用
    fn after_properties_set(&mut self) -> ContainerResult<()>;
}

/// 生命周期管理器
pub struct LifecycleManager<'a> {
    post_processors: &'a PostProcessorChain,
}

impl<'a> LifecycleManager<'a> {
    pub fn new(post_processors: &'a PostProcessorChain) -> Self {
        Self { post_processors }
    }

    /// 执行完整的构造流水线
    ///
    /// 任一步骤失败都会中止构造，错误经 [`ContainerError::creation_failed`] 包装，
    /// 不会产生半初始化的实例。
    pub fn construct(&self, definition: &BeanDefinition, mut injection: Injection) -> ContainerResult<BeanRef> {
        let name = definition.name.as_str();
        self.run(definition, &mut injection)
            .map_err(|e| ContainerError::creation_failed(name, e))
    }

    fn run(&self, definition: &BeanDefinition, injection: &mut Injection) -> ContainerResult<BeanRef> {
        let name = definition.name.as_str();

        tracing::trace!("Instantiating bean '{}' ({})", name, definition.type_name());
        let mut instance = definition.factory.create(injection)?;

        if let Some(aware) = &definition.aware_callback {
            tracing::trace!("Invoking BeanNameAware on '{}'", name);
            aware(&mut *instance, name);
        }

        instance = self.post_processors.apply_before(instance, name)?;

        if let Some(init) = &definition.init_callback {
            let current: &dyn Any = &*instance;
            if Any::type_id(current) == definition.instance_type_id() {
                tracing::trace!("Invoking initialization callback on '{}'", name);
                init(&mut *instance)?;
            } else {
                tracing::debug!(
                    "Bean '{}' was replaced before initialization, skipping init callback",
                    name
                );
            }
        }

        let published = (definition.publisher)(instance);
        let finished = self.post_processors.apply_after(published, name)?;

        tracing::trace!("Bean '{}' completed its lifecycle", name);
        Ok(Arc::from(finished))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::{downcast_bean, BeanInstance, FunctionFactory};
    use crate::bean_post_processor::BeanPostProcessor;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Tracked {
        name: String,
        steps: Vec<String>,
    }

    impl BeanNameAware for Tracked {
        fn set_bean_name(&mut self, name: &str) {
            self.name = name.to_string();
            self.steps.push("aware".to_string());
        }
    }

    impl InitializingBean for Tracked {
        fn after_properties_set(&mut self) -> ContainerResult<()> {
            self.steps.push("init".to_string());
            Ok(())
        }
    }

    struct StepRecorder {
        after: Arc<Mutex<Vec<String>>>,
    }

    impl BeanPostProcessor for StepRecorder {
        fn post_process_before_initialization(
            &self,
            mut bean: BeanInstance,
            _bean_name: &str,
        ) -> ContainerResult<BeanInstance> {
            if let Some(tracked) = bean.downcast_mut::<Tracked>() {
                tracked.steps.push("before".to_string());
            }
            Ok(bean)
        }

        fn post_process_after_initialization(
            &self,
            bean: BeanInstance,
            _bean_name: &str,
        ) -> ContainerResult<BeanInstance> {
            if let Some(tracked) = bean.downcast_ref::<Arc<Tracked>>() {
                self.after.lock().extend(tracked.steps.iter().cloned());
            }
            Ok(bean)
        }
    }

    struct Replacing;

    impl BeanPostProcessor for Replacing {
        fn post_process_before_initialization(
            &self,
            _bean: BeanInstance,
            _bean_name: &str,
        ) -> ContainerResult<BeanInstance> {
            Ok(Box::new(Arc::new(String::from("replacement"))))
        }
    }

    struct Failing;

    impl BeanPostProcessor for Failing {
        fn post_process_before_initialization(
            &self,
            _bean: BeanInstance,
            bean_name: &str,
        ) -> ContainerResult<BeanInstance> {
            Err(anyhow::anyhow!("rejected {}", bean_name).into())
        }
    }

    fn tracked_definition() -> BeanDefinition {
        BeanDefinition::new(
            "tracked",
            FunctionFactory::new(|_: &mut Injection| Ok(Tracked::default())),
        )
        .with_bean_name_aware::<Tracked>()
        .with_initializing_bean::<Tracked>()
    }

    #[test]
    fn test_pipeline_order() {
        let after = Arc::new(Mutex::new(Vec::new()));
        let mut chain = PostProcessorChain::new();
        chain.push(Arc::new(StepRecorder { after: after.clone() }));

        let bean = LifecycleManager::new(&chain)
            .construct(&tracked_definition(), Injection::empty("tracked"))
            .unwrap();

        let tracked = downcast_bean::<Tracked>(&bean).unwrap();
        assert_eq!(tracked.name, "tracked");
        assert_eq!(tracked.steps, vec!["aware", "before", "init"]);
        assert_eq!(*after.lock(), vec!["aware", "before", "init"]);
    }

    #[test]
    fn test_init_skipped_for_replaced_instance() {
        let mut chain = PostProcessorChain::new();
        chain.push(Arc::new(Replacing));

        let bean = LifecycleManager::new(&chain)
            .construct(&tracked_definition(), Injection::empty("tracked"))
            .unwrap();

        assert!(downcast_bean::<Tracked>(&bean).is_none());
        assert_eq!(*downcast_bean::<String>(&bean).unwrap(), "replacement");
    }

    #[test]
    fn test_hook_failure_aborts_construction() {
        let mut chain = PostProcessorChain::new();
        chain.push(Arc::new(Failing));

        let err = LifecycleManager::new(&chain)
            .construct(&tracked_definition(), Injection::empty("tracked"))
            .unwrap_err();

        assert!(matches!(err, ContainerError::BeanCreationFailed { ref name, .. } if name == "tracked"));
        assert!(err.to_string().contains("rejected tracked"));
    }
}
