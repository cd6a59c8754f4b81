use proc_macro2::TokenStream as TokenStream2;
use quote::quote;

use super::codegen::{allow_verbatim, doc_attrs, ServiceSignature};

/// Render the handler trait with one descriptor accessor per operation
pub fn render_handler_trait(service: &ServiceSignature, runtime: &syn::Path) -> TokenStream2 {
    let handler_name = &service.names.handler;
    let full_name = service.model.full_name();
    let docs = doc_attrs(
        &service.model.docs,
        &format!("Operations of the `{full_name}` Nexus service, implemented by a worker."),
    );
    let allow = allow_verbatim(service.names.verbatim, "non_camel_case_types");

    let accessors = service.operations.iter().map(|op| {
        let accessor = op.accessor;
        let descriptor = op.descriptor(runtime);
        let docs = doc_attrs(
            op.docs,
            &format!("Descriptor of the `{}` operation, registered under `name`.", op.name),
        );
        let allow = allow_verbatim(op.verbatim, "non_snake_case");
        quote! {
            #docs
            #allow
            fn #accessor(&self, name: &str) -> #descriptor;
        }
    });

    quote! {
        #docs
        #allow
        pub trait #handler_name: ::core::marker::Send + ::core::marker::Sync + 'static {
            #(#accessors)*
        }
    }
}

/// Render the function registering a handler's operations with a registry.
///
/// `prefix` is the path from the function's module to the bindings module,
/// empty when both live in the same module.
pub fn render_register_fn(
    service: &ServiceSignature,
    runtime: &syn::Path,
    prefix: &TokenStream2,
) -> TokenStream2 {
    let register_fn = &service.names.register_fn;
    let handler_name = &service.names.handler;
    let service_const = &service.names.service_const;
    let doc = format!(
        " Registers the operations of `handler` as the `{}` service, in declaration order.",
        service.model.full_name()
    );
    let allow = allow_verbatim(service.names.verbatim, "non_snake_case");

    let adds: Vec<_> = service
        .operations
        .iter()
        .map(|op| {
            let accessor = op.accessor;
            let op_name = op.name;
            quote! {
                service.add_operation(handler.#accessor(#op_name))?;
            }
        })
        .collect();
    let (binding, unused) = if adds.is_empty() {
        (quote!(service), quote!(let _ = handler;))
    } else {
        (quote!(mut service), TokenStream2::new())
    };

    quote! {
        #[doc = #doc]
        #allow
        pub fn #register_fn<R, H>(
            registry: &mut R,
            handler: &H,
        ) -> ::core::result::Result<(), #runtime::RegistrationError>
        where
            R: #runtime::ServiceRegistry + ?Sized,
            H: #prefix #handler_name + ?Sized,
        {
            #unused
            let #binding = #runtime::Service::new(#prefix #service_const);
            #(#adds)*
            registry.register_service(service)
        }
    }
}
