use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::Ident;

use crate::classify::Cell;
use crate::naming::{type_path, ModulePath, OperationNames, ServiceNames};
use crate::service::{OperationModel, ServiceModel, TypeRef};

/// Everything the renderers need to know about one service.
pub struct ServiceSignature<'a> {
    pub model: &'a ServiceModel,
    pub names: &'a ServiceNames,
    pub operations: Vec<OperationSignature<'a>>,
}

/// One record per operation, shared by the client and handler renderers.
pub struct OperationSignature<'a> {
    /// Declared name, used as the operation name on the wire
    pub name: &'a str,
    pub accessor: &'a Ident,
    pub deferred: &'a Ident,
    pub verbatim: bool,
    pub cell: &'static Cell,
    /// Input type, or `NoValue`
    pub input: TokenStream2,
    /// Output type, or `NoValue`
    pub output: TokenStream2,
    pub docs: &'a [String],
    pub deprecated: bool,
}

impl<'a> ServiceSignature<'a> {
    pub fn new(
        model: &'a ServiceModel,
        names: &'a ServiceNames,
        from: &ModulePath,
        runtime: &syn::Path,
    ) -> Self {
        let operations = model
            .operations
            .iter()
            .zip(&names.operations)
            .map(|(op, op_names)| OperationSignature::new(op, op_names, from, runtime))
            .collect();
        Self {
            model,
            names,
            operations,
        }
    }
}

impl<'a> OperationSignature<'a> {
    fn new(
        model: &'a OperationModel,
        names: &'a OperationNames,
        from: &ModulePath,
        runtime: &syn::Path,
    ) -> Self {
        Self {
            name: &model.name,
            accessor: &names.accessor,
            deferred: &names.deferred,
            verbatim: names.verbatim,
            cell: model.cell(),
            input: payload_type(from, model.input.as_ref(), runtime),
            output: payload_type(from, model.output.as_ref(), runtime),
            docs: &model.docs,
            deprecated: model.deprecated,
        }
    }

    /// Runtime descriptor type returned by the handler accessor.
    pub fn descriptor(&self, runtime: &syn::Path) -> TokenStream2 {
        let descriptor = format_ident!("{}", self.cell.descriptor.type_name());
        let input = &self.input;
        let output = &self.output;
        quote!(#runtime::#descriptor<#input, #output>)
    }
}

fn payload_type(from: &ModulePath, ty: Option<&TypeRef>, runtime: &syn::Path) -> TokenStream2 {
    match ty {
        Some(ty) => type_path(from, ty),
        None => quote!(#runtime::NoValue),
    }
}

/// `#[doc]` attributes from protobuf comments, or `fallback` when there are none.
pub fn doc_attrs(docs: &[String], fallback: &str) -> TokenStream2 {
    if docs.is_empty() {
        let line = format!(" {fallback}");
        return quote!(#[doc = #line]);
    }
    let lines = docs.iter().map(|line| {
        if line.is_empty() {
            String::new()
        } else {
            format!(" {line}")
        }
    });
    quote!(#(#[doc = #lines])*)
}

/// Lint allowance for a name built from a declared protobuf identifier.
pub fn allow_verbatim(verbatim: bool, lint: &str) -> TokenStream2 {
    if !verbatim {
        return TokenStream2::new();
    }
    let lint = format_ident!("{}", lint);
    quote!(#[allow(#lint)])
}

/// `pub const <SERVICE>_SERVICE_NAME: &str = "<full.Name>";`
pub fn render_service_const(service: &ServiceSignature) -> TokenStream2 {
    let service_const = &service.names.service_const;
    let full_name = service.model.full_name();
    let doc = format!(" Fully qualified name of the `{}` service.", service.model.name);
    let allow = allow_verbatim(service.names.verbatim, "non_upper_case_globals");
    quote! {
        #[doc = #doc]
        #allow
        pub const #service_const: &str = #full_name;
    }
}
