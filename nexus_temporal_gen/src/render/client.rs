use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::Ident;

use super::codegen::{allow_verbatim, doc_attrs, OperationSignature, ServiceSignature};

/// Render the client struct with a direct and a deferred method per operation
pub fn render_client(service: &ServiceSignature, runtime: &syn::Path) -> TokenStream2 {
    let client_name = &service.names.client;
    let service_const = &service.names.service_const;
    let docs = doc_attrs(
        &service.model.docs,
        &format!("Client for the `{}` Nexus service.", service.model.full_name()),
    );
    let allow = allow_verbatim(service.names.verbatim, "non_camel_case_types");

    let methods: Vec<_> = service
        .operations
        .iter()
        .map(|op| render_client_methods(op, service_const, runtime))
        .collect();

    quote! {
        #docs
        #allow
        #[derive(Debug, Clone)]
        pub struct #client_name {
            endpoint: ::std::string::String,
        }

        impl #client_name {
            /// Creates a client calling the service through the Nexus endpoint `endpoint`.
            pub fn new(endpoint: impl ::core::convert::Into<::std::string::String>) -> Self {
                Self {
                    endpoint: endpoint.into(),
                }
            }

            /// Name of the Nexus endpoint operations are sent to.
            pub fn endpoint(&self) -> &str {
                &self.endpoint
            }

            #(#methods)*
        }
    }
}

/// Direct method awaiting the result, and its deferred twin returning a handle
fn render_client_methods(
    op: &OperationSignature,
    service_const: &Ident,
    runtime: &syn::Path,
) -> TokenStream2 {
    let op_name = op.name;
    let accessor = op.accessor;
    let deferred = op.deferred;
    let input_ty = &op.input;
    let handle_ty = &op.output;

    let (param, arg, request_input) = if op.cell.takes_input {
        (quote!(input: #input_ty,), quote!(input,), quote!(input))
    } else {
        (quote!(), quote!(), quote!(()))
    };
    let output_ty = if op.cell.returns_output {
        op.output.clone()
    } else {
        quote!(())
    };

    let direct_docs = doc_attrs(
        op.docs,
        &format!("Starts the `{op_name}` operation and waits for its result."),
    );
    let deferred_doc = format!(
        " Starts the `{op_name}` operation and returns a handle to its eventual result."
    );
    let (deprecated, allow_deprecated) = if op.deprecated {
        (quote!(#[deprecated]), quote!(#[allow(deprecated)]))
    } else {
        (quote!(), quote!())
    };
    let allow = allow_verbatim(op.verbatim, "non_snake_case");

    quote! {
        #direct_docs
        #deprecated
        #allow_deprecated
        #allow
        pub async fn #accessor<C>(
            &self,
            ctx: &C,
            #param
            options: #runtime::OperationOptions,
        ) -> ::core::result::Result<#output_ty, #runtime::OperationError>
        where
            C: #runtime::CallerContext,
        {
            self.#deferred(ctx, #arg options).await
        }

        #[doc = #deferred_doc]
        #deprecated
        #allow
        pub fn #deferred<C>(
            &self,
            ctx: &C,
            #param
            options: #runtime::OperationOptions,
        ) -> #runtime::OperationHandle<#handle_ty>
        where
            C: #runtime::CallerContext,
        {
            ctx.start_operation::<#input_ty, #handle_ty>(#runtime::OperationRequest {
                endpoint: ::core::clone::Clone::clone(&self.endpoint),
                service: #service_const,
                operation: #op_name,
                input: #request_input,
                options,
            })
        }
    }
}
