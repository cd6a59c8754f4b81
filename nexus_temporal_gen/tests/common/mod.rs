//! Generation helpers and accessors to inspect generated code.

#![allow(dead_code)]

pub use nexus_temporal_test_proto::descriptor::{field_type, FileDescriptorProto};
pub use nexus_temporal_test_proto::*;

use nexus_temporal_gen::{GenerateError, Generator, GeneratorConfig, RenderedFile};
use quote::ToTokens;

pub fn generate(files: &[FileDescriptorProto]) -> Result<Vec<RenderedFile>, GenerateError> {
    generate_with(GeneratorConfig::default(), files)
}

/// Generates every file in `files`, with the well-known files they import
/// added to the request.
pub fn generate_with(
    config: GeneratorConfig,
    files: &[FileDescriptorProto],
) -> Result<Vec<RenderedFile>, GenerateError> {
    Generator::new(config).generate(&proto_files(files), &targets(files))
}

pub fn targets(files: &[FileDescriptorProto]) -> Vec<String> {
    files
        .iter()
        .map(|file| file.name.clone().unwrap_or_default())
        .collect()
}

pub fn parse(file: &RenderedFile) -> syn::File {
    syn::parse_file(&file.content)
        .unwrap_or_else(|err| panic!("{} does not parse: {err}\n{}", file.path, file.content))
}

/// Items of the top-level module `name`.
pub fn module<'a>(file: &'a syn::File, name: &str) -> &'a [syn::Item] {
    file.items
        .iter()
        .find_map(|item| match item {
            syn::Item::Mod(module) if module.ident == name => {
                module.content.as_ref().map(|(_, items)| items.as_slice())
            }
            _ => None,
        })
        .unwrap_or_else(|| panic!("module {name} not found"))
}

pub fn inherent_methods<'a>(items: &'a [syn::Item], ty: &str) -> Vec<&'a syn::ImplItemFn> {
    items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Impl(imp) if imp.trait_.is_none() && tokens(&imp.self_ty) == ty => {
                Some(imp)
            }
            _ => None,
        })
        .flat_map(|imp| {
            imp.items.iter().filter_map(|item| match item {
                syn::ImplItem::Fn(method) => Some(method),
                _ => None,
            })
        })
        .collect()
}

pub fn trait_methods<'a>(items: &'a [syn::Item], name: &str) -> Vec<&'a syn::TraitItemFn> {
    items
        .iter()
        .find_map(|item| match item {
            syn::Item::Trait(tr) if tr.ident == name => Some(tr),
            _ => None,
        })
        .unwrap_or_else(|| panic!("trait {name} not found"))
        .items
        .iter()
        .filter_map(|item| match item {
            syn::TraitItem::Fn(method) => Some(method),
            _ => None,
        })
        .collect()
}

pub fn function<'a>(items: &'a [syn::Item], name: &str) -> &'a syn::ItemFn {
    items
        .iter()
        .find_map(|item| match item {
            syn::Item::Fn(func) if func.sig.ident == name => Some(func),
            _ => None,
        })
        .unwrap_or_else(|| panic!("function {name} not found"))
}

pub fn constant<'a>(items: &'a [syn::Item], name: &str) -> &'a syn::ItemConst {
    items
        .iter()
        .find_map(|item| match item {
            syn::Item::Const(constant) if constant.ident == name => Some(constant),
            _ => None,
        })
        .unwrap_or_else(|| panic!("constant {name} not found"))
}

/// Token text without whitespace, for comparisons that ignore formatting.
pub fn tokens<T: ToTokens>(node: &T) -> String {
    node.to_token_stream()
        .to_string()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

pub fn param_names(sig: &syn::Signature) -> Vec<String> {
    sig.inputs
        .iter()
        .map(|arg| match arg {
            syn::FnArg::Receiver(_) => "self".to_string(),
            syn::FnArg::Typed(pat) => tokens(&pat.pat),
        })
        .collect()
}

pub fn return_type(sig: &syn::Signature) -> String {
    match &sig.output {
        syn::ReturnType::Default => String::new(),
        syn::ReturnType::Type(_, ty) => tokens(ty),
    }
}

pub fn has_attr(attrs: &[syn::Attribute], path: &str) -> bool {
    attrs.iter().any(|attr| tokens(attr.path()) == path)
}

/// Doc lines attached to an item, without the leading space.
pub fn docs(attrs: &[syn::Attribute]) -> Vec<String> {
    attrs
        .iter()
        .filter_map(|attr| match &attr.meta {
            syn::Meta::NameValue(nv) if nv.path.is_ident("doc") => match &nv.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(text),
                    ..
                }) => Some(text.value().trim_start().to_string()),
                _ => None,
            },
            _ => None,
        })
        .collect()
}
