//! Bean 定义注册表
//!
//! 名称 → [`BeanDefinition`] 的映射，保留插入顺序，
//! 启动阶段的单例预实例化按照该顺序进行。

use std::collections::HashMap;

use crate::bean::BeanDefinition;
use crate::error::{ContainerError, ContainerResult};

/// Bean 定义注册表
#[derive(Debug, Default)]
pub struct BeanDefinitionRegistry {
    definitions: Vec<BeanDefinition>,
    index: HashMap<String, usize>,
}

impl BeanDefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册 Bean 定义
    ///
    /// 名称已存在时返回 [`ContainerError::DuplicateBeanName`]，不会覆盖已有定义。
    pub fn register(&mut self, definition: BeanDefinition) -> ContainerResult<()> {
        tracing::trace!(
            "Attempting to register bean: name='{}', type='{}', scope={}",
            definition.name,
            definition.type_name(),
            definition.scope
        );

        if let Some(&existing) = self.index.get(&definition.name) {
            let existing = &self.definitions[existing];
            tracing::warn!(
                "Bean '{}' already declared by '{}', rejecting '{}'",
                definition.name,
                existing.type_name(),
                definition.type_name()
            );
            return Err(ContainerError::DuplicateBeanName {
                name: definition.name.clone(),
                existing: existing.type_name().to_string(),
                duplicate: definition.type_name().to_string(),
            });
        }

        tracing::debug!("Bean definition registered successfully: '{}'", definition.name);
        self.index.insert(definition.name.clone(), self.definitions.len());
        self.definitions.push(definition);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&BeanDefinition> {
        self.index.get(name).map(|&idx| &self.definitions[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// 按注册顺序返回所有 Bean 名称
    pub fn names(&self) -> Vec<String> {
        self.definitions.iter().map(|d| d.name.clone()).collect()
    }

    /// 按注册顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &BeanDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::FunctionFactory;
    use crate::injector::Injection;
    use crate::Scope;

    struct Alpha;
    struct Beta;

    fn alpha(name: &str) -> BeanDefinition {
        BeanDefinition::new(name, FunctionFactory::new(|_: &mut Injection| Ok(Alpha)))
    }

    #[test]
    fn test_register_preserves_insertion_order() {
        let mut registry = BeanDefinitionRegistry::new();
        registry.register(alpha("zeta")).unwrap();
        registry.register(alpha("alpha")).unwrap();
        registry
            .register(alpha("mid").with_scope(Scope::Prototype))
            .unwrap();

        assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get("mid").unwrap().scope, Scope::Prototype);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut registry = BeanDefinitionRegistry::new();
        registry.register(alpha("shared")).unwrap();

        let duplicate =
            BeanDefinition::new("shared", FunctionFactory::new(|_: &mut Injection| Ok(Beta)));
        let err = registry.register(duplicate).unwrap_err();

        match err {
            ContainerError::DuplicateBeanName {
                name,
                existing,
                duplicate,
            } => {
                assert_eq!(name, "shared");
                assert!(existing.ends_with("Alpha"));
                assert!(duplicate.ends_with("Beta"));
            }
            other => panic!("unexpected error: {other}"),
        }

        // 原定义保持不变
        assert!(registry.get("shared").unwrap().type_name().ends_with("Alpha"));
        assert_eq!(registry.len(), 1);
    }
}
