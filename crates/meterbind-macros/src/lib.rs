//! meterbind 过程宏入口。
//!
//! # 设计意图（Why）
//! - Rust 没有运行期反射，无法在运行时枚举结构体字段及其标签；
//!   `#[derive(Blueprint)]` 在编译期把字段声明展开为逐字段的绑定调用。
//! - 标签值原样写入生成代码，解析推迟到绑定期，使所有标签错误都以 `BindError` 呈现，
//!   与运行期蓝图的行为保持一致。
//!
//! # 字段分类（How）
//! - `#[meter(skip)]`：不参与绑定，取 `Default::default()`；
//! - `#[meter(nested)]` 或带 `attrs`：子树，递归绑定；
//! - 带 `id` / `buckets`：叶子；
//! - 无标注且类型末段为八种叶子类型名之一：叶子（绑定时报告缺少 `id`）；
//! - 其他无标注字段：类型实现 `Blueprint` 时作为子树递归绑定，否则取 `Default::default()`。

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, Field, Fields, LitStr, Type, ext::IdentExt, parse_macro_input,
    spanned::Spanned,
};

const LEAF_TYPES: [&str; 8] = [
    "I64Counter",
    "I64UpDownCounter",
    "I64Gauge",
    "I64Histogram",
    "F64Counter",
    "F64UpDownCounter",
    "F64Gauge",
    "F64Histogram",
];

/// 为结构体生成 `meterbind::Blueprint` 实现。
///
/// # 语义说明（What）
/// - **输入**：具名字段结构体或单元结构体，允许泛型；
/// - **输出**：`Blueprint::bind_fields`，按字段声明顺序绑定；
/// - **编译期诊断**：枚举、联合体、元组结构体，未知或重复的 `meter` 键，
///   非字符串标签值，以及同时声明为叶子与子树的字段。
#[proc_macro_derive(Blueprint, attributes(meter))]
pub fn derive_blueprint(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_blueprint(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

fn expand_blueprint(input: DeriveInput) -> Result<proc_macro2::TokenStream, Error> {
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(data) => {
            return Err(Error::new(
                data.enum_token.span(),
                "Blueprint can only be derived for structs with named fields",
            ));
        }
        Data::Union(data) => {
            return Err(Error::new(
                data.union_token.span(),
                "Blueprint can only be derived for structs with named fields",
            ));
        }
    };

    let body = match fields {
        Fields::Named(named) => {
            let inits = named
                .named
                .iter()
                .map(field_initializer)
                .collect::<Result<Vec<_>, _>>()?;
            quote! { Self { #(#inits,)* } }
        }
        Fields::Unit => quote! { Self },
        Fields::Unnamed(unnamed) => {
            return Err(Error::new(
                unnamed.span(),
                "Blueprint fields need names; tuple structs are not supported",
            ));
        }
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::meterbind::Blueprint for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn bind_fields(
                cx: &::meterbind::BindContext<'_>,
            ) -> ::core::result::Result<Self, ::meterbind::BindError> {
                ::core::result::Result::Ok(#body)
            }
        }
    })
}

/// 单个字段上的 `#[meter(...)]` 标注。
#[derive(Default)]
struct MeterArgs {
    id: Option<LitStr>,
    buckets: Option<LitStr>,
    attrs: Option<LitStr>,
    nested: Option<Span>,
    skip: Option<Span>,
    annotated: bool,
}

impl MeterArgs {
    fn parse(field: &Field) -> Result<Self, Error> {
        let mut args = MeterArgs::default();
        for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("meter")) {
            args.annotated = true;
            attr.parse_nested_meta(|meta| {
                let span = meta.path.span();
                if meta.path.is_ident("id") {
                    set_once(&mut args.id, meta.value()?.parse()?, span, "id")
                } else if meta.path.is_ident("buckets") {
                    set_once(&mut args.buckets, meta.value()?.parse()?, span, "buckets")
                } else if meta.path.is_ident("attrs") {
                    set_once(&mut args.attrs, meta.value()?.parse()?, span, "attrs")
                } else if meta.path.is_ident("nested") {
                    set_once(&mut args.nested, span, span, "nested")
                } else if meta.path.is_ident("skip") {
                    set_once(&mut args.skip, span, span, "skip")
                } else {
                    Err(meta.error(
                        "unknown meter key; expected `id`, `buckets`, `attrs`, `nested` or `skip`",
                    ))
                }
            })?;
        }
        Ok(args)
    }

    fn is_leaf(&self) -> bool {
        self.id.is_some() || self.buckets.is_some()
    }

    fn is_subtree(&self) -> bool {
        self.nested.is_some() || self.attrs.is_some()
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, span: Span, key: &str) -> Result<(), Error> {
    if slot.is_some() {
        return Err(Error::new(span, format!("duplicate meter key `{key}`")));
    }
    *slot = Some(value);
    Ok(())
}

fn is_leaf_type(ty: &Type) -> bool {
    match ty {
        Type::Path(path) if path.qself.is_none() => path
            .path
            .segments
            .last()
            .is_some_and(|segment| LEAF_TYPES.iter().any(|name| segment.ident == name)),
        Type::Group(group) => is_leaf_type(&group.elem),
        Type::Paren(paren) => is_leaf_type(&paren.elem),
        _ => false,
    }
}

fn field_initializer(field: &Field) -> Result<proc_macro2::TokenStream, Error> {
    let Some(ident) = &field.ident else {
        return Err(Error::new(field.span(), "Blueprint fields need names"));
    };
    let name = ident.unraw().to_string();
    let args = MeterArgs::parse(field)?;

    if args.skip.is_some() {
        return Ok(quote! { #ident: ::core::default::Default::default() });
    }

    if args.is_leaf() && args.is_subtree() {
        let span = args.nested.unwrap_or_else(|| ident.span());
        return Err(Error::new(
            span,
            "a meter field is either an instrument (`id`, `buckets`) or a subtree (`nested`, `attrs`), not both",
        ));
    }

    if args.is_subtree() {
        let tags = tag_pairs(&[("attrs", args.attrs.as_ref())]);
        return Ok(quote! {
            #ident: cx.subtree(&::meterbind::FieldMeta::new(#name, &[#(#tags),*]))?
        });
    }

    if args.is_leaf() || (!args.annotated && is_leaf_type(&field.ty)) {
        let tags = tag_pairs(&[("id", args.id.as_ref()), ("buckets", args.buckets.as_ref())]);
        return Ok(quote! {
            #ident: cx.leaf(&::meterbind::FieldMeta::new(#name, &[#(#tags),*]))?
        });
    }

    if args.annotated {
        // 只写了 `#[meter()]`，无法判断意图。
        return Err(Error::new(
            ident.span(),
            "empty meter attribute; add `id`, `nested`, `attrs` or `skip`",
        ));
    }

    // 未标注字段：实现 `Blueprint` 的类型作为子树，其余取默认值。
    let ty = &field.ty;
    Ok(quote! {
        #ident: {
            #[allow(unused_imports)]
            use ::meterbind::__private::{BindAsDefault as _, BindAsSubtree as _};
            (&&::meterbind::__private::FieldSlot::<#ty>::new())
                .bind_slot(cx, &::meterbind::FieldMeta::new(#name, &[]))?
        }
    })
}

fn tag_pairs(tags: &[(&str, Option<&LitStr>)]) -> Vec<proc_macro2::TokenStream> {
    tags.iter()
        .filter_map(|(key, value)| value.map(|value| quote! { (#key, #value) }))
        .collect()
}
