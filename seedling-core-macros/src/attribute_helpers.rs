use proc_macro_error::abort;
use syn::parse::{Parse, ParseStream};
use syn::{Attribute, LitStr, Meta, Token, Type};

/// 解析 #[component(...)] 的参数
///
/// 支持 `"name"` 和 `name = "name"` 两种形式
struct ComponentArgs {
    name: LitStr,
}

impl Parse for ComponentArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            return Ok(ComponentArgs { name: input.parse()? });
        }

        let key: syn::Ident = input.parse()?;
        if key != "name" {
            return Err(syn::Error::new(key.span(), "expected `name = \"...\"`"));
        }
        input.parse::<Token![=]>()?;

        Ok(ComponentArgs { name: input.parse()? })
    }
}

fn find<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|attr| attr.path().is_ident(name))
}

/// 属性是否存在
pub(crate) fn has_attr(attrs: &[Attribute], name: &str) -> bool {
    find(attrs, name).is_some()
}

/// 解析 `#[name("value")]`，不带参数时返回 None
fn get_optional_str(attrs: &[Attribute], name: &str) -> Option<LitStr> {
    let attr = find(attrs, name)?;

    match &attr.meta {
        Meta::Path(_) => None,
        Meta::List(_) => match attr.parse_args::<LitStr>() {
            Ok(value) => Some(value),
            Err(e) => abort!(e.span(), "#[{}] expects a string literal", name),
        },
        Meta::NameValue(_) => abort!(attr, "use #[{}(\"...\")] instead", name),
    }
}

/// 从 #[component("name")] 或 #[component(name = "name")] 中提取 bean 名称
pub(crate) fn get_bean_name(attrs: &[Attribute]) -> Option<String> {
    let attr = find(attrs, "component")?;

    if matches!(attr.meta, Meta::Path(_)) {
        return None;
    }

    match attr.parse_args::<ComponentArgs>() {
        Ok(args) if args.name.value().is_empty() => {
            abort!(args.name.span(), "bean name must not be empty")
        }
        Ok(args) => Some(args.name.value()),
        Err(e) => abort!(e.span(), "invalid #[component] arguments: {}", e),
    }
}

/// 从 #[scope("prototype")] 中提取作用域声明
///
/// 只做语法检查，取值在扫描时校验
pub(crate) fn get_scope(attrs: &[Attribute]) -> Option<String> {
    get_optional_str(attrs, "scope").map(|scope| scope.value())
}

/// 初始化回调形式
pub(crate) enum InitKind {
    /// #[init]：实现了 InitializingBean
    InitializingBean,
    /// #[init("method")]：自定义方法
    Method(syn::Ident),
}

pub(crate) fn get_init(attrs: &[Attribute]) -> Option<InitKind> {
    if !has_attr(attrs, "init") {
        return None;
    }

    match get_optional_str(attrs, "init") {
        None => Some(InitKind::InitializingBean),
        Some(method) => match method.parse::<syn::Ident>() {
            Ok(ident) => Some(InitKind::Method(ident)),
            Err(_) => abort!(method.span(), "'{}' is not a valid method name", method.value()),
        },
    }
}

/// 从 #[expose(dyn Trait + Send + Sync)] 中提取暴露的能力接口
pub(crate) fn get_expose(attrs: &[Attribute]) -> Option<Type> {
    let attr = find(attrs, "expose")?;

    match attr.parse_args::<Type>() {
        Ok(ty) => Some(ty),
        Err(e) => abort!(e.span(), "#[expose] expects a type, e.g. #[expose(dyn Greeter + Send + Sync)]"),
    }
}

/// 从 #[autowired] 或 #[autowired("beanName")] 中提取 bean 名称
pub(crate) fn get_autowired_bean_name(attrs: &[Attribute]) -> Option<String> {
    get_optional_str(attrs, "autowired").map(|name| name.value())
}

/// 类型名转换为 camelCase 的默认 bean 名称
pub(crate) fn to_camel_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}
