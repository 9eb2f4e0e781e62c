//! 组件扫描
//!
//! 组件在进程初始化时通过 `inventory` 自注册，扫描器只需按模块路径过滤这张表，
//! 不依赖文件系统。被识别为后置处理器的组件立即实例化并加入处理器链，
//! 其余组件生成 [`BeanDefinition`](crate::BeanDefinition) 放入注册表。

use crate::bean_post_processor::PostProcessorChain;
use crate::component::ComponentRegistration;
use crate::error::{ContainerError, ContainerResult};
use crate::registry::BeanDefinitionRegistry;
use crate::utils::naming;

/// 被跳过的候选组件
#[derive(Debug)]
pub struct SkippedCandidate {
    pub type_name: &'static str,
    pub module_path: &'static str,
    pub error: ContainerError,
}

/// 扫描结果
#[derive(Debug, Default)]
pub struct ScanResult {
    pub registry: BeanDefinitionRegistry,
    pub post_processors: PostProcessorChain,
    pub skipped: Vec<SkippedCandidate>,
}

/// 组件扫描器
#[derive(Debug, Clone)]
pub struct ComponentScanner {
    namespace: String,
    recursive: bool,
}

impl ComponentScanner {
    /// 创建扫描器，命名空间使用 Rust 模块路径（`app::services`，也接受 `app.services`）
    pub fn new(namespace: &str) -> ContainerResult<Self> {
        let namespace = normalize_namespace(namespace)?;
        Ok(Self {
            namespace,
            recursive: true,
        })
    }

    /// 是否扫描子模块，默认 `true`
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// 模块路径是否位于扫描范围内
    pub fn matches(&self, module_path: &str) -> bool {
        if module_path == self.namespace {
            return true;
        }

        self.recursive
            && module_path
                .strip_prefix(self.namespace.as_str())
                .is_some_and(|rest| rest.starts_with("::"))
    }

    /// 扫描当前进程中已注册的全部组件
    pub fn scan(&self) -> ContainerResult<ScanResult> {
        self.scan_candidates(ComponentRegistration::all())
    }

    /// 扫描给定的候选组件
    pub fn scan_candidates<'a, I>(&self, candidates: I) -> ContainerResult<ScanResult>
    where
        I: IntoIterator<Item = &'a ComponentRegistration>,
    {
        tracing::info!(
            "Starting component scan in '{}' (recursive: {})",
            self.namespace,
            self.recursive
        );

        let mut candidates: Vec<&ComponentRegistration> = candidates
            .into_iter()
            .filter(|candidate| self.matches(candidate.module_path))
            .collect();

        if candidates.is_empty() {
            tracing::error!("Scan namespace '{}' contains no components", self.namespace);
            return Err(ContainerError::UnresolvedNamespace(self.namespace.clone()));
        }

        // 按声明位置排序，决定注册顺序与处理器顺序
        candidates.sort_by_key(|candidate| candidate.declaration_key());

        let total = candidates.len();
        tracing::info!("Found {} component(s) to process", total);

        let mut result = ScanResult::default();

        for (idx, candidate) in candidates.into_iter().enumerate() {
            tracing::debug!(
                "Processing component [{}/{}]: '{}' ({})",
                idx + 1,
                total,
                candidate.bean_name,
                candidate.type_name
            );

            if let Some(create) = (candidate.post_processor)() {
                match create() {
                    Ok(instance) => result.post_processors.push(instance),
                    Err(e) => {
                        let error = ContainerError::ProcessorCreationFailed {
                            type_name: candidate.type_name,
                            reason: e.to_string(),
                        };
                        skip(&mut result, candidate, error);
                    }
                }
                continue;
            }

            match (candidate.definition)() {
                Ok(definition) => result
                    .registry
                    .register(definition.declared_in(candidate.module_path))?,
                Err(e) => skip(&mut result, candidate, e),
            }
        }

        tracing::info!(
            "Component scan completed: {} bean definition(s), {} post processor(s), {} skipped",
            result.registry.len(),
            result.post_processors.len(),
            result.skipped.len()
        );

        Ok(result)
    }
}

fn skip(result: &mut ScanResult, candidate: &ComponentRegistration, error: ContainerError) {
    tracing::error!(
        "Skipping component '{}' ({}): {}",
        candidate.bean_name,
        candidate.type_name,
        error
    );
    result.skipped.push(SkippedCandidate {
        type_name: candidate.type_name,
        module_path: candidate.module_path,
        error,
    });
}

fn normalize_namespace(raw: &str) -> ContainerResult<String> {
    let normalized = raw.trim().replace('.', "::");

    if normalized.is_empty() || !normalized.split("::").all(naming::is_identifier) {
        return Err(ContainerError::InvalidNamespace(raw.to_string()));
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::{BeanDefinition, FunctionFactory};
    use crate::bean_post_processor::{BeanPostProcessor, PostProcessorFactory};
    use crate::injector::Injection;
    use std::sync::Arc;

    struct Alpha;
    struct Beta;
    struct Tracer;

    impl BeanPostProcessor for Tracer {
        fn name(&self) -> &str {
            "tracer"
        }
    }

    fn no_processor() -> Option<PostProcessorFactory> {
        None
    }

    fn tracer_processor() -> Option<PostProcessorFactory> {
        let create: PostProcessorFactory = || {
            let processor: Arc<dyn BeanPostProcessor> = Arc::new(Tracer);
            Ok(processor)
        };
        Some(create)
    }

    fn failing_processor() -> Option<PostProcessorFactory> {
        let create: PostProcessorFactory = || Err(ContainerError::Other(anyhow::anyhow!("no default construction")));
        Some(create)
    }

    fn alpha() -> ContainerResult<BeanDefinition> {
        Ok(BeanDefinition::new("alpha", FunctionFactory::new(|_: &mut Injection| Ok(Alpha))))
    }

    fn beta() -> ContainerResult<BeanDefinition> {
        Ok(BeanDefinition::new("beta", FunctionFactory::new(|_: &mut Injection| Ok(Beta))))
    }

    fn broken() -> ContainerResult<BeanDefinition> {
        Err(ContainerError::InvalidScope("session".to_string()))
    }

    fn tracer() -> ContainerResult<BeanDefinition> {
        Ok(BeanDefinition::new("tracer", FunctionFactory::new(|_: &mut Injection| Ok(Tracer))))
    }

    const fn candidate(
        bean_name: &'static str,
        module_path: &'static str,
        line: u32,
        definition: fn() -> ContainerResult<BeanDefinition>,
    ) -> ComponentRegistration {
        ComponentRegistration {
            bean_name,
            type_name: bean_name,
            module_path,
            file: "src/app.rs",
            line,
            definition,
            post_processor: no_processor,
        }
    }

    static BETA: ComponentRegistration = candidate("beta", "app::services", 20, beta);
    static ALPHA: ComponentRegistration = candidate("alpha", "app::services", 10, alpha);
    static NESTED: ComponentRegistration =
        candidate("nested", "app::services::inner", 1, alpha);
    static OTHER: ComponentRegistration = candidate("other", "app::servicesx", 1, beta);
    static BROKEN: ComponentRegistration = candidate("broken", "app::services", 30, broken);
    static TRACER: ComponentRegistration = ComponentRegistration {
        post_processor: tracer_processor,
        ..candidate("tracer", "app::services", 40, tracer)
    };

    #[test]
    fn test_invalid_namespace() {
        assert!(matches!(ComponentScanner::new(""), Err(ContainerError::InvalidNamespace(_))));
        assert!(matches!(ComponentScanner::new("app::"), Err(ContainerError::InvalidNamespace(_))));
        assert!(matches!(
            ComponentScanner::new("my-app::services"),
            Err(ContainerError::InvalidNamespace(_))
        ));
        assert_eq!(ComponentScanner::new("app.services").unwrap().namespace(), "app::services");
    }

    #[test]
    fn test_matches_respects_module_boundaries() {
        let scanner = ComponentScanner::new("app::services").unwrap();
        assert!(scanner.matches("app::services"));
        assert!(scanner.matches("app::services::inner"));
        assert!(!scanner.matches("app::servicesx"));
        assert!(!scanner.matches("app"));

        let flat = scanner.recursive(false);
        assert!(flat.matches("app::services"));
        assert!(!flat.matches("app::services::inner"));
    }

    #[test]
    fn test_scan_sorts_by_declaration_and_splits_processors() {
        let scanner = ComponentScanner::new("app::services").unwrap().recursive(false);
        let result = scanner
            .scan_candidates([&BETA, &TRACER, &ALPHA, &OTHER, &BROKEN, &NESTED])
            .unwrap();

        assert_eq!(result.registry.names(), vec!["alpha", "beta"]);
        assert_eq!(result.post_processors.names(), vec!["tracer"]);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].type_name, "broken");
        assert!(matches!(result.skipped[0].error, ContainerError::InvalidScope(_)));
        assert_eq!(result.registry.get("alpha").unwrap().source, Some("app::services"));
    }

    #[test]
    fn test_processor_creation_failure_is_skipped() {
        static FAILING: ComponentRegistration = ComponentRegistration {
            post_processor: failing_processor,
            ..candidate("failing", "app::services", 60, tracer)
        };

        let scanner = ComponentScanner::new("app::services").unwrap();
        let result = scanner.scan_candidates([&ALPHA, &FAILING]).unwrap();

        assert_eq!(result.registry.names(), vec!["alpha"]);
        assert!(result.post_processors.is_empty());
        assert!(matches!(
            result.skipped[0].error,
            ContainerError::ProcessorCreationFailed { type_name: "failing", .. }
        ));
    }

    #[test]
    fn test_unresolved_namespace() {
        let scanner = ComponentScanner::new("app::missing").unwrap();
        let err = scanner.scan_candidates([&ALPHA, &BETA]).unwrap_err();
        assert!(matches!(err, ContainerError::UnresolvedNamespace(ref ns) if ns == "app::missing"));
    }

    #[test]
    fn test_duplicate_names_abort_scan() {
        static ALPHA_AGAIN: ComponentRegistration =
            candidate("alpha", "app::services", 50, alpha);

        let scanner = ComponentScanner::new("app").unwrap();
        let err = scanner.scan_candidates([&ALPHA, &ALPHA_AGAIN]).unwrap_err();
        assert!(matches!(err, ContainerError::DuplicateBeanName { .. }));
    }
}
