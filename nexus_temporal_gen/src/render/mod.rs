pub mod client;
pub mod codegen;
pub mod server;

use proc_macro2::TokenStream as TokenStream2;
use quote::quote;

use crate::config::GeneratorConfig;
use crate::naming::FileNames;
use crate::service::FileModel;

use codegen::{render_service_const, ServiceSignature};

/// Token streams for the output files of one input file.
pub struct RenderedModules {
    pub bindings: TokenStream2,
    /// Registration module, only with the split layout
    pub register: Option<TokenStream2>,
}

/// Main entry point for rendering a file.
/// Per service this emits the name constant, the client, the handler trait
/// and the registration function.
pub fn render_file(
    model: &FileModel,
    names: &FileNames,
    config: &GeneratorConfig,
) -> RenderedModules {
    let runtime = &config.runtime_crate;
    let services: Vec<_> = model
        .services
        .iter()
        .zip(&names.services)
        .map(|(service, service_names)| {
            ServiceSignature::new(service, service_names, &names.module_path, runtime)
        })
        .collect();

    let split = names.register_module.is_some();
    let items = services.iter().map(|service| {
        let constant = render_service_const(service);
        let client = client::render_client(service, runtime);
        let handler = server::render_handler_trait(service, runtime);
        let register = if split {
            TokenStream2::new()
        } else {
            server::render_register_fn(service, runtime, &TokenStream2::new())
        };
        quote! {
            #constant
            #client
            #handler
            #register
        }
    });

    let module = &names.module;
    let module_doc = format!(" Nexus bindings for the services of `{}`.", model.path);
    let bindings = quote! {
        #[doc = #module_doc]
        pub mod #module {
            #(#items)*
        }
    };

    let register = names.register_module.as_ref().map(|(register_module, _)| {
        let prefix = quote!(super::#module::);
        let functions = services
            .iter()
            .map(|service| server::render_register_fn(service, runtime, &prefix));
        let doc = format!(" Registration functions for the services of `{}`.", model.path);
        quote! {
            #[doc = #doc]
            pub mod #register_module {
                #(#functions)*
            }
        }
    });

    RenderedModules { bindings, register }
}
