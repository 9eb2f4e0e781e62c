use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use seedling_core::prelude::*;
use seedling_core_macros::Component;

// ==================== 能力接口 ====================

/// 用户接口 - 以能力形式发布，调用方只依赖 trait
pub trait UserApi: Send + Sync {
    fn find_user(&self, id: u64) -> String;
}

// ==================== 业务服务 ====================

/// 订单服务 - 单例
#[derive(Component, Debug)]
pub struct OrderService {
    placed: AtomicUsize,
}

impl OrderService {
    fn place_order(&self, item: &str) -> usize {
        let number = self.placed.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!("Order #{} placed for {}", number, item);
        number
    }
}

/// 用户服务 - 原型，每次获取都是新实例
#[derive(Component, Debug)]
#[scope("prototype")]
#[aware]
#[init]
pub struct UserService {
    #[autowired]
    order_service: Arc<OrderService>,

    bean_name: String,
    name: String,
}

impl BeanNameAware for UserService {
    fn set_bean_name(&mut self, name: &str) {
        self.bean_name = name.to_string();
    }
}

impl InitializingBean for UserService {
    fn after_properties_set(&mut self) -> ContainerResult<()> {
        if self.name.is_empty() {
            return Err(anyhow!("{} has no name", self.bean_name).into());
        }
        tracing::info!("{} ready as '{}'", self.bean_name, self.name);
        Ok(())
    }
}

impl UserService {
    fn checkout(&self, item: &str) -> String {
        let number = self.order_service.place_order(item);
        format!("[{}] order #{} for {}", self.name, number, item)
    }
}

/// REST 风格的用户接口实现
#[derive(Component)]
#[component("userApi")]
#[expose(dyn UserApi + Send + Sync)]
pub struct RestUserApi {
    #[autowired]
    order_service: Arc<OrderService>,
}

impl UserApi for RestUserApi {
    fn find_user(&self, id: u64) -> String {
        self.order_service.place_order("profile-lookup");
        format!("user-{}", id)
    }
}

// ==================== 后置处理器 ====================

static NAMES: AtomicUsize = AtomicUsize::new(0);

/// 初始化前为 UserService 分配名称
#[derive(Component)]
pub struct NameProcessor;

impl BeanPostProcessor for NameProcessor {
    fn post_process_before_initialization(
        &self,
        mut bean: BeanInstance,
        _bean_name: &str,
    ) -> ContainerResult<BeanInstance> {
        if let Some(user_service) = bean.downcast_mut::<UserService>() {
            let id = NAMES.fetch_add(1, Ordering::SeqCst) + 1;
            user_service.name = format!("session-{}", id);
        }
        Ok(bean)
    }
}

/// 记录每个 Bean 的构造
#[derive(Component)]
pub struct AuditProcessor;

impl BeanPostProcessor for AuditProcessor {
    fn post_process_after_initialization(
        &self,
        bean: BeanInstance,
        bean_name: &str,
    ) -> ContainerResult<BeanInstance> {
        tracing::info!("Bean '{}' constructed", bean_name);
        Ok(bean)
    }
}

struct UserApiProxy(ProxyTarget<dyn UserApi + Send + Sync>);

impl UserApi for UserApiProxy {
    fn find_user(&self, id: u64) -> String {
        self.0.invoke("find_user", |target| target.find_user(id))
    }
}

/// 为 UserApi 包装日志代理
#[derive(Component)]
pub struct UserApiProxyProcessor;

impl BeanPostProcessor for UserApiProxyProcessor {
    fn post_process_after_initialization(
        &self,
        bean: BeanInstance,
        _bean_name: &str,
    ) -> ContainerResult<BeanInstance> {
        Ok(decorate::<dyn UserApi + Send + Sync, _>(bean, |target| {
            let proxy = ProxyTarget::new(target).with_interceptor(Arc::new(LoggingInterceptor));
            Arc::new(UserApiProxy(proxy))
        }))
    }
}

// ==================== 主程序 ====================

fn load_config() -> anyhow::Result<ContainerConfig> {
    let config_paths = ["demos/app-demo/application.toml", "application.toml"];

    let config = match config_paths.iter().find(|path| Path::new(path).exists()) {
        Some(path) => ContainerConfig::from_file(path)?,
        None => ContainerConfig::new(module_path!()),
    };

    Ok(config.with_env_overrides()?)
}

fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    config.logging.init()?;

    let context = ApplicationContext::new(config).context("failed to start container")?;

    tracing::info!("Beans: {:?}", context.get_bean_names());
    tracing::info!("Post processors: {:?}", context.post_processor_names());

    // 单例：两次获取是同一实例
    let orders = context.get_bean_as::<OrderService>("orderService")?;
    let again = context.get_bean_as::<OrderService>("orderService")?;
    tracing::info!("orderService is shared: {}", Arc::ptr_eq(&orders, &again));

    // 原型：每次获取都会重新执行生命周期
    for item in ["keyboard", "monitor"] {
        let user_service = context.get_bean_as::<UserService>("userService")?;
        tracing::info!("{}", user_service.checkout(item));
    }

    // 通过能力接口获取代理后的 Bean
    let user_api = context.get_bean_as::<dyn UserApi + Send + Sync>("userApi")?;
    tracing::info!("Found {}", user_api.find_user(42));

    match context.get_bean("paymentService") {
        Ok(_) => tracing::warn!("paymentService should not exist"),
        Err(e) => tracing::info!("Expected lookup failure: {}", e),
    }

    Ok(())
}
