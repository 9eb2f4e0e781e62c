mod attribute_helpers;
mod component_impl;

use proc_macro::TokenStream;
use proc_macro_error::proc_macro_error;

/// Component派生宏
///
/// 用法：
/// ```ignore
/// #[derive(Component)]
/// #[component("userService")]          // 可选：指定bean名称（简写形式）
/// // 或
/// #[component(name = "userService")]   // 可选：指定bean名称（完整形式）
/// #[scope("prototype")]                // 可选：指定作用域 (singleton/prototype)
/// #[aware]                             // 可选：实现了 BeanNameAware
/// #[init]                              // 可选：实现了 InitializingBean
/// #[init("custom_init")]               // 可选：自定义初始化方法名
/// #[expose(dyn UserApi + Send + Sync)] // 可选：以能力接口发布
/// pub struct UserService {
///     #[autowired]                     // 注入名为 orderService 的 bean（字段名转 camelCase）
///     order_service: Arc<OrderService>,
///
///     #[autowired("auditLog")]         // 显式指定 bean 名称
///     audit: Arc<dyn Audit + Send + Sync>,
///
///     #[autowired("legacy_repo")]      // 需要按字段原名绑定时，显式写出该名称
///     legacy_repo: Arc<LegacyRepo>,
///
///     name: String,                    // 其余字段使用 Default::default()
/// }
/// ```
///
/// 类型若同时实现了 `BeanPostProcessor`，扫描时会被实例化并加入处理器链，
/// 而不是注册为普通 Bean。处理器通过无参构造创建，不能包含 `#[autowired]` 字段。
#[proc_macro_derive(Component, attributes(component, scope, autowired, aware, init, expose))]
#[proc_macro_error]
pub fn derive_component(input: TokenStream) -> TokenStream {
    component_impl::derive_component_impl(input)
}
