//! 依赖注入器
//!
//! 依赖以声明式列表的形式挂在 [`BeanDefinition`] 上，每一项给出字段标识符和要绑定的
//! Bean 名称。注入器逐项按名称查找（不按字段类型），把结果收集到 [`Injection`]，
//! 再由实例工厂在无参构造时赋值到对应字段。

use std::collections::HashMap;
use std::sync::Arc;

use crate::bean::{downcast_bean, BeanDefinition, BeanRef};
use crate::error::{ContainerError, ContainerResult};

/// 已解析的依赖：字段标识符 → Bean
#[derive(Debug)]
pub struct Injection {
    bean_name: String,
    values: HashMap<String, (String, BeanRef)>,
}

impl Injection {
    /// 不含任何依赖的注入（无参构造）
    pub fn empty(bean_name: impl Into<String>) -> Self {
        Self {
            bean_name: bean_name.into(),
            values: HashMap::new(),
        }
    }

    /// 正在构造的 Bean 名称
    pub fn bean_name(&self) -> &str {
        &self.bean_name
    }

    /// 记录字段对应的 Bean
    pub fn insert(&mut self, field: impl Into<String>, dependency: impl Into<String>, bean: BeanRef) {
        self.values.insert(field.into(), (dependency.into(), bean));
    }

    /// 取出字段的依赖并转换为 `Arc<T>`
    ///
    /// `T` 可以是具体类型，也可以是 `dyn Trait + Send + Sync`。
    pub fn take<T>(&mut self, field: &str) -> ContainerResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let (dependency, bean) = self.values.remove(field).ok_or_else(|| {
            ContainerError::Other(anyhow::anyhow!(
                "Field '{}' of bean '{}' was not resolved before instantiation",
                field,
                self.bean_name
            ))
        })?;

        downcast_bean::<T>(&bean).ok_or(ContainerError::TypeMismatch {
            name: dependency,
            expected: std::any::type_name::<T>(),
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 依赖注入器
#[derive(Debug, Default, Clone, Copy)]
pub struct DependencyInjector;

impl DependencyInjector {
    /// 解析定义上的全部依赖
    ///
    /// `lookup` 通常是容器的 `get_bean`。依赖名称未注册时返回
    /// [`ContainerError::UnresolvedDependency`]，中止当前 Bean 的构造。
    pub fn inject<L>(&self, definition: &BeanDefinition, mut lookup: L) -> ContainerResult<Injection>
    where
        L: FnMut(&str) -> ContainerResult<BeanRef>,
    {
        let mut injection = Injection::empty(definition.name.clone());

        for dependency in &definition.dependencies {
            tracing::trace!(
                "Injecting '{}' into field '{}' of bean '{}'",
                dependency.bean_name,
                dependency.field,
                definition.name
            );

            let bean = lookup(&dependency.bean_name).map_err(|e| match e {
                ContainerError::BeanNotFound(ref missing) if *missing == dependency.bean_name => {
                    tracing::error!(
                        "Bean '{}' requires unknown bean '{}' (field '{}')",
                        definition.name,
                        dependency.bean_name,
                        dependency.field
                    );
                    ContainerError::UnresolvedDependency {
                        bean: definition.name.clone(),
                        field: dependency.field.clone(),
                        dependency: dependency.bean_name.clone(),
                    }
                }
                other => other,
            })?;

            injection.insert(dependency.field.clone(), dependency.bean_name.clone(), bean);
        }

        Ok(injection)
    }
}
