use proc_macro::TokenStream;
use proc_macro_error::abort;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Field, Fields, Ident, LitStr};

use crate::attribute_helpers::{
    get_autowired_bean_name, get_bean_name, get_expose, get_init, get_scope, has_attr,
    to_camel_case, InitKind,
};

pub(crate) fn derive_component_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    // inventory 中的注册记录需要具体类型
    if !input.generics.params.is_empty() {
        abort!(input.generics, "#[derive(Component)] does not support generic types");
    }

    // 默认使用类型名的 camelCase 形式，例如: UserService -> userService
    let bean_name = get_bean_name(&input.attrs).unwrap_or_else(|| to_camel_case(&name.to_string()));

    let fields: Vec<&Field> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => abort!(
                name,
                "#[derive(Component)] requires named fields";
                help = "field injection binds by field name"
            ),
        },
        _ => abort!(name, "#[derive(Component)] can only be used on structs"),
    };
    let is_unit = matches!(&input.data, Data::Struct(data) if matches!(data.fields, Fields::Unit));

    // 依赖列表和字段赋值
    let mut dependencies = Vec::new();
    let mut field_inits = Vec::new();

    for field in &fields {
        let ident = match &field.ident {
            Some(ident) => ident,
            None => continue,
        };
        let field_key = LitStr::new(&ident.to_string(), ident.span());

        if has_attr(&field.attrs, "autowired") {
            let dependency = match get_autowired_bean_name(&field.attrs) {
                Some(bean) => quote! { ::seedling_core::Dependency::named(#field_key, #bean) },
                None => quote! { ::seedling_core::Dependency::by_field(#field_key) },
            };
            dependencies.push(dependency);
            field_inits.push(quote! { #ident: injection.take(#field_key)? });
        } else {
            field_inits.push(quote! { #ident: ::std::default::Default::default() });
        }
    }

    let construct = if is_unit {
        quote! { Self }
    } else {
        quote! { Self { #(#field_inits),* } }
    };

    let injection_ident = if dependencies.is_empty() {
        quote! { _injection }
    } else {
        quote! { injection }
    };

    let scope_impl = get_scope(&input.attrs).map(|scope| {
        quote! {
            fn declared_scope() -> &'static str {
                #scope
            }
        }
    });

    let configure_chain = generate_configure_chain(&input.attrs);
    let post_processor = generate_post_processor_detection(name);

    let expanded = quote! {
        impl ::seedling_core::Component for #name {
            fn bean_name() -> &'static str {
                #bean_name
            }

            #scope_impl

            fn dependencies() -> ::std::vec::Vec<::seedling_core::Dependency> {
                ::std::vec![#(#dependencies),*]
            }

            fn instantiate(
                #injection_ident: &mut ::seedling_core::Injection,
            ) -> ::seedling_core::ContainerResult<Self> {
                ::std::result::Result::Ok(#construct)
            }

            fn configure(
                definition: ::seedling_core::BeanDefinition,
            ) -> ::seedling_core::BeanDefinition {
                definition #configure_chain
            }
        }

        // 自动向inventory注册Component
        ::seedling_core::inventory::submit! {
            ::seedling_core::ComponentRegistration {
                bean_name: #bean_name,
                type_name: ::std::concat!(::std::module_path!(), "::", ::std::stringify!(#name)),
                module_path: ::std::module_path!(),
                file: ::std::file!(),
                line: ::std::line!(),
                definition: <#name as ::seedling_core::Component>::definition,
                post_processor: #post_processor,
            }
        }
    };

    TokenStream::from(expanded)
}

/// 生命周期能力（aware / init / expose）对应的 BeanDefinition 构建链
fn generate_configure_chain(attrs: &[Attribute]) -> proc_macro2::TokenStream {
    let aware = has_attr(attrs, "aware").then(|| {
        quote! { .with_bean_name_aware::<Self>() }
    });

    let init = get_init(attrs).map(|init| match init {
        InitKind::InitializingBean => quote! { .with_initializing_bean::<Self>() },
        InitKind::Method(method) => quote! { .with_init_method::<Self>(Self::#method) },
    });

    let expose = get_expose(attrs).map(|ty| {
        quote! {
            .exposed_as::<Self, #ty>(|bean: ::std::sync::Arc<Self>| -> ::std::sync::Arc<#ty> { bean })
        }
    });

    quote! { #aware #init #expose }
}

/// 识别类型是否实现了 BeanPostProcessor
///
/// 具体类型上的方法解析在编译期选择处理器工厂或 `None`
fn generate_post_processor_detection(name: &Ident) -> proc_macro2::TokenStream {
    quote! {
        || {
            #[allow(unused_imports)]
            use ::seedling_core::component::detect::{
                PlainComponent as _, PostProcessorCapability as _,
            };
            (&::seedling_core::component::detect::Capability::<#name>::new()).post_processor_factory()
        }
    }
}
