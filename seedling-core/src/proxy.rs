//! 代理支持
//!
//! Rust 没有运行时动态代理，这里用显式的装饰器代替：代理类型实现与目标相同的
//! 能力接口，持有目标的 `Arc`，在转发调用前后执行拦截器。后置处理器通过
//! [`decorate`] 把已发布的能力接口替换为代理。
//!
//! ```ignore
//! struct UserApiProxy(ProxyTarget<dyn UserApi + Send + Sync>);
//!
//! impl UserApi for UserApiProxy {
//!     fn find_user(&self, id: u64) -> String {
//!         self.0.invoke("find_user", |target| target.find_user(id))
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::bean::BeanInstance;

/// 连接点信息
///
/// 包含方法调用时的上下文信息
#[derive(Clone)]
pub struct JoinPoint {
    /// 目标类型名称
    pub target_type: &'static str,

    /// 方法名称
    pub method_name: &'static str,

    /// 调用时间戳
    pub timestamp: Instant,
}

impl JoinPoint {
    pub fn new(target_type: &'static str, method_name: &'static str) -> Self {
        Self {
            target_type,
            method_name,
            timestamp: Instant::now(),
        }
    }

    /// 获取完整的方法签名
    pub fn signature(&self) -> String {
        format!("{}::{}", self.target_type, self.method_name)
    }

    /// 自调用开始经过的时间
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

impl fmt::Debug for JoinPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinPoint")
            .field("signature", &self.signature())
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

impl fmt::Display for JoinPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature())
    }
}

/// 方法拦截器
pub trait MethodInterceptor: Send + Sync {
    /// 目标方法执行前
    fn before(&self, _join_point: &JoinPoint) {}

    /// 目标方法返回后
    fn after_returning(&self, _join_point: &JoinPoint) {}

    fn name(&self) -> &str {
        "MethodInterceptor"
    }
}

/// 记录方法进入和返回的拦截器
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingInterceptor;

impl MethodInterceptor for LoggingInterceptor {
    fn before(&self, join_point: &JoinPoint) {
        tracing::info!("→ Entering {}", join_point);
    }

    fn after_returning(&self, join_point: &JoinPoint) {
        tracing::info!("← Exiting {} ({:?})", join_point, join_point.elapsed());
    }

    fn name(&self) -> &str {
        "LoggingInterceptor"
    }
}

/// 代理目标：持有被代理对象和拦截器列表
pub struct ProxyTarget<T: ?Sized> {
    target: Arc<T>,
    target_type: &'static str,
    interceptors: Vec<Arc<dyn MethodInterceptor>>,
}

impl<T: ?Sized> ProxyTarget<T> {
    pub fn new(target: Arc<T>) -> Self {
        Self {
            target,
            target_type: std::any::type_name::<T>(),
            interceptors: Vec::new(),
        }
    }

    /// 追加拦截器
    pub fn with_interceptor(mut self, interceptor: Arc<dyn MethodInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// 被代理对象
    pub fn target(&self) -> &Arc<T> {
        &self.target
    }

    /// 拦截一次方法调用
    ///
    /// `before` 按注册顺序执行，`after_returning` 按相反顺序执行
    pub fn invoke<R>(&self, method: &'static str, call: impl FnOnce(&T) -> R) -> R {
        let join_point = JoinPoint::new(self.target_type, method);

        for interceptor in &self.interceptors {
            interceptor.before(&join_point);
        }

        let result = call(&self.target);

        for interceptor in self.interceptors.iter().rev() {
            interceptor.after_returning(&join_point);
        }

        result
    }
}

impl<T: ?Sized> Clone for ProxyTarget<T> {
    fn clone(&self) -> Self {
        Self {
            target: Arc::clone(&self.target),
            target_type: self.target_type,
            interceptors: self.interceptors.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for ProxyTarget<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyTarget")
            .field("target_type", &self.target_type)
            .field(
                "interceptors",
                &self.interceptors.iter().map(|i| i.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// 用代理替换已发布的 `Arc<T>` 负载
///
/// 负载不是 `Arc<T>` 时原样返回，因此可以在后置钩子中对所有 Bean 调用。
pub fn decorate<T, F>(bean: BeanInstance, wrap: F) -> BeanInstance
where
    T: ?Sized + Send + Sync + 'static,
    F: FnOnce(Arc<T>) -> Arc<T>,
{
    match bean.downcast::<Arc<T>>() {
        Ok(target) => {
            tracing::debug!("Decorating {} with a proxy", std::any::type_name::<T>());
            let proxy: Arc<T> = wrap(*target);
            Box::new(proxy)
        }
        Err(other) => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    trait Counter: Send + Sync {
        fn next(&self, step: usize) -> usize;
    }

    #[derive(Default)]
    struct SimpleCounter {
        value: AtomicUsize,
    }

    impl Counter for SimpleCounter {
        fn next(&self, step: usize) -> usize {
            self.value.fetch_add(step, Ordering::SeqCst) + step
        }
    }

    struct CounterProxy(ProxyTarget<dyn Counter>);

    impl Counter for CounterProxy {
        fn next(&self, step: usize) -> usize {
            self.0.invoke("next", |target| target.next(step))
        }
    }

    struct Recording {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl MethodInterceptor for Recording {
        fn before(&self, join_point: &JoinPoint) {
            self.log.lock().push(format!("before:{}:{}", self.label, join_point.method_name));
        }

        fn after_returning(&self, join_point: &JoinPoint) {
            self.log.lock().push(format!("after:{}:{}", self.label, join_point.method_name));
        }
    }

    #[test]
    fn test_invoke_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let target: Arc<dyn Counter> = Arc::new(SimpleCounter::default());
        let proxy = CounterProxy(
            ProxyTarget::new(target)
                .with_interceptor(Arc::new(Recording { label: "outer", log: log.clone() }))
                .with_interceptor(Arc::new(Recording { label: "inner", log: log.clone() })),
        );

        assert_eq!(proxy.next(2), 2);
        assert_eq!(
            *log.lock(),
            vec!["before:outer:next", "before:inner:next", "after:inner:next", "after:outer:next"]
        );
    }

    #[test]
    fn test_decorate_replaces_matching_payload() {
        let target: Arc<dyn Counter> = Arc::new(SimpleCounter::default());
        let bean: BeanInstance = Box::new(Arc::clone(&target));

        let decorated = decorate::<dyn Counter, _>(bean, |inner| {
            Arc::new(CounterProxy(ProxyTarget::new(inner).with_interceptor(Arc::new(LoggingInterceptor))))
        });

        let proxy: Arc<dyn Counter> = *decorated.downcast::<Arc<dyn Counter>>().unwrap();
        assert!(!Arc::ptr_eq(&proxy, &target));

        // 代理与目标共享状态
        assert_eq!(proxy.next(1), 1);
        assert_eq!(target.next(1), 2);
    }

    #[test]
    fn test_decorate_ignores_other_payloads() {
        let bean: BeanInstance = Box::new(Arc::new(7_u32));
        let untouched = decorate::<dyn Counter, _>(bean, |inner| inner);

        assert!(!untouched.is::<Arc<dyn Counter>>());
        assert_eq!(**untouched.downcast::<Arc<u32>>().unwrap(), 7);
    }
}
