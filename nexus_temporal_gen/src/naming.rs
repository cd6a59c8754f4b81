//! Rust identifiers for everything the generator emits.
//!
//! Case conversion uses `heck`, as `prost-build` does for the message types
//! the bindings refer to, so `FooBar` here is `FooBar` there.
//!
//! Every identifier is recorded in a [`NamingContext`] under its owner and
//! role. When two candidates meet in one scope, each entity involved falls
//! back to names built from its declared protobuf identifier.

use std::collections::BTreeMap;
use std::fmt;

use heck::{ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::Ident;

use crate::config::Layout;
use crate::error::GenerateError;
use crate::service::{FileModel, ServiceModel, TypeRef};

const RAW_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers.
const SUFFIX_KEYWORDS: &[&str] = &["crate", "self", "Self", "super"];

/// Makes `name` usable as a Rust identifier.
///
/// Characters outside `[A-Za-z0-9_]` become `_`, a leading digit gets a `_`
/// prefix, keywords are escaped as `r#kw` or `kw_`.
pub fn sanitize(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if ident == "_" {
        ident.push('_');
    }

    if RAW_KEYWORDS.contains(&ident.as_str()) {
        ident.insert_str(0, "r#");
    } else if SUFFIX_KEYWORDS.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

/// Builds an identifier from a sanitized name, honoring the `r#` prefix.
pub fn ident(name: &str) -> Ident {
    match name.strip_prefix("r#") {
        Some(raw) => Ident::new_raw(raw, Span::call_site()),
        None => Ident::new(name, Span::call_site()),
    }
}

fn unraw(name: &str) -> &str {
    name.strip_prefix("r#").unwrap_or(name)
}

/// What an identifier is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Module,
    RegisterModule,
    ServiceNameConst,
    ClientType,
    HandlerInterface,
    RegisterFunc,
    OperationAccessor,
    DeferredAccessor,
}

/// Namespace in which identifiers must be unique.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    /// Module of the protobuf package, where the generated modules live
    Package(String),
    /// Inside the generated bindings module
    File,
    /// Client impl and handler trait of one service
    Service(String),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Package(package) if package.is_empty() => f.write_str("the root package"),
            Scope::Package(package) => write!(f, "package {package}"),
            Scope::File => f.write_str("the bindings module"),
            Scope::Service(service) => write!(f, "the members of service {service}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NameKey {
    pub service: Option<String>,
    pub operation: Option<String>,
    pub role: Role,
}

impl NameKey {
    pub fn file(role: Role) -> Self {
        Self {
            service: None,
            operation: None,
            role,
        }
    }

    pub fn service(service: &str, role: Role) -> Self {
        Self {
            service: Some(service.to_string()),
            operation: None,
            role,
        }
    }

    pub fn operation(service: &str, operation: &str, role: Role) -> Self {
        Self {
            service: Some(service.to_string()),
            operation: Some(operation.to_string()),
            role,
        }
    }
}

impl fmt::Display for NameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.service, &self.operation) {
            (Some(service), Some(operation)) => write!(f, "{service}.{operation} {:?}", self.role),
            (Some(service), None) => write!(f, "{service} {:?}", self.role),
            _ => write!(f, "{:?}", self.role),
        }
    }
}

/// Identifier bookkeeping for one output file.
#[derive(Debug, Clone)]
pub struct NamingContext {
    file: String,
    chosen: BTreeMap<NameKey, String>,
    claimed: BTreeMap<Scope, BTreeMap<String, String>>,
}

impl NamingContext {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            chosen: BTreeMap::new(),
            claimed: BTreeMap::new(),
        }
    }

    /// Reserves `name` in `scope` for `owner`.
    pub fn claim(&mut self, scope: &Scope, name: &str, owner: &str) -> Result<(), GenerateError> {
        let claimed = self.claimed.entry(scope.clone()).or_default();
        if let Some(existing) = claimed.get(unraw(name)) {
            return Err(GenerateError::NamingCollision {
                file: self.file.clone(),
                scope: scope.to_string(),
                ident: unraw(name).to_string(),
                owner: owner.to_string(),
                existing: existing.clone(),
            });
        }
        claimed.insert(unraw(name).to_string(), owner.to_string());
        Ok(())
    }

    /// Claims `name` and records it as the choice for `key`.
    pub fn assign(
        &mut self,
        scope: &Scope,
        key: NameKey,
        name: String,
        owner: &str,
    ) -> Result<Ident, GenerateError> {
        self.claim(scope, &name, owner)?;
        Ok(self.record(key, name))
    }

    fn record(&mut self, key: NameKey, name: String) -> Ident {
        let ident = ident(&name);
        self.chosen.insert(key, name);
        ident
    }

    /// Every identifier chosen so far, in key order.
    pub fn chosen(&self) -> impl Iterator<Item = (&NameKey, &str)> {
        self.chosen.iter().map(|(key, name)| (key, name.as_str()))
    }
}

/// Absolute module path, as a list of sanitized segments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModulePath(pub Vec<String>);

impl ModulePath {
    /// Module prost generates for a protobuf package.
    pub fn package(package: &str) -> Self {
        Self(
            package
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(|segment| sanitize(&segment.to_snake_case()))
                .collect(),
        )
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }
}

/// Path of a message type as seen from the module `from`.
///
/// Well-known types map to `prost-types`; everything else is reached through
/// `super::` the way `prost-build` links sibling packages.
pub fn type_path(from: &ModulePath, ty: &TypeRef) -> TokenStream {
    let (parents, name) = match ty.path.split_last() {
        Some((name, parents)) => (parents, name),
        None => (&[][..], &ty.package),
    };
    let type_ident = ident(&sanitize(&name.to_upper_camel_case()));
    let nested = parents
        .iter()
        .map(|parent| ident(&sanitize(&parent.to_snake_case())));

    if ty.package == "google.protobuf" {
        return quote!(::prost_types:: #(#nested ::)* #type_ident);
    }

    let target = ModulePath::package(&ty.package);
    let common = from
        .0
        .iter()
        .zip(&target.0)
        .take_while(|(a, b)| a == b)
        .count();
    let supers = (common..from.0.len()).map(|_| quote!(super));
    let down = target.0[common..].iter().map(|segment| ident(segment));

    quote!(#(#supers ::)* #(#down ::)* #(#nested ::)* #type_ident)
}

/// Names chosen for one operation.
#[derive(Debug, Clone)]
pub struct OperationNames {
    pub accessor: Ident,
    pub deferred: Ident,
    /// Falls back to the declared identifier, which may not be snake case
    pub verbatim: bool,
}

/// Names chosen for one service.
#[derive(Debug, Clone)]
pub struct ServiceNames {
    pub service_const: Ident,
    pub client: Ident,
    pub handler: Ident,
    pub register_fn: Ident,
    pub verbatim: bool,
    pub operations: Vec<OperationNames>,
}

/// Names chosen for one output file.
#[derive(Debug, Clone)]
pub struct FileNames {
    pub module: Ident,
    pub module_path: ModulePath,
    /// Only with [`Layout::Split`]
    pub register_module: Option<(Ident, ModulePath)>,
    pub services: Vec<ServiceNames>,
}

/// File stem of a `.proto` path: `example` for `example/v1/example.proto`.
pub fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.strip_suffix(".proto").unwrap_or(name)
}

/// Module names for a file: `<stem>_nexus_temporal` and its `_register` twin.
pub fn module_names(path: &str) -> (String, String) {
    let stem = file_stem(path).to_snake_case();
    let module = sanitize(&format!("{stem}_nexus_temporal"));
    let register = sanitize(&format!("{stem}_nexus_temporal_register"));
    (module, register)
}

struct Entity<'a, const N: usize> {
    owner: String,
    candidates: [(NameKey, String); N],
    verbatim: [(NameKey, String); N],
    reserved: &'a [&'a str],
}

/// Decides between candidate and verbatim names for a group of entities
/// sharing one scope, then claims the result.
fn settle<const N: usize>(
    ctx: &mut NamingContext,
    scope: &Scope,
    entities: Vec<Entity<'_, N>>,
) -> Result<Vec<([Ident; N], bool)>, GenerateError> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for entity in &entities {
        for (_, name) in &entity.candidates {
            *counts.entry(unraw(name).to_string()).or_default() += 1;
        }
    }

    let mut settled = Vec::with_capacity(entities.len());
    for entity in entities {
        let collides = entity.candidates.iter().any(|(_, name)| {
            counts.get(unraw(name)).copied().unwrap_or(0) > 1
                || entity.reserved.contains(&unraw(name))
        });
        let names = if collides {
            log::debug!(
                "{}: {} falls back to its declared name in {scope}",
                ctx.file,
                entity.owner
            );
            entity.verbatim
        } else {
            entity.candidates
        };

        for (_, name) in &names {
            ctx.claim(scope, name, &entity.owner)?;
        }
        let idents = names.map(|(key, name)| ctx.record(key, name));
        settled.push((idents, collides));
    }
    Ok(settled)
}

/// Chooses every identifier of a classified file.
pub fn resolve_file(
    ctx: &mut NamingContext,
    model: &FileModel,
    layout: Layout,
) -> Result<FileNames, GenerateError> {
    let package_scope = Scope::Package(model.package.clone());
    let package_path = ModulePath::package(&model.package);

    let (module, register_module) = module_names(&model.path);
    let module_path = package_path.child(&module);
    let module = ctx.assign(
        &package_scope,
        NameKey::file(Role::Module),
        module,
        &format!("bindings of {}", model.path),
    )?;
    let register_module = match layout {
        Layout::Single => None,
        Layout::Split => {
            let path = package_path.child(&register_module);
            let ident = ctx.assign(
                &package_scope,
                NameKey::file(Role::RegisterModule),
                register_module,
                &format!("registration of {}", model.path),
            )?;
            Some((ident, path))
        }
    };

    let entities = model.services.iter().map(service_entity).collect();
    let settled = settle(ctx, &Scope::File, entities)?;

    let mut services = Vec::with_capacity(model.services.len());
    for (service, (idents, verbatim)) in model.services.iter().zip(settled) {
        let [service_const, client, handler, register_fn] = idents;
        services.push(ServiceNames {
            service_const,
            client,
            handler,
            register_fn,
            verbatim,
            operations: resolve_operations(ctx, service)?,
        });
    }

    Ok(FileNames {
        module,
        module_path,
        register_module,
        services,
    })
}

/// Client methods every generated client already has.
const CLIENT_RESERVED: &[&str] = &["new", "endpoint"];

fn service_entity(service: &ServiceModel) -> Entity<'static, 4> {
    let name = &service.name;
    let camel = name.to_upper_camel_case();
    let key = |role| NameKey::service(name, role);
    Entity {
        owner: format!("service {name}"),
        candidates: [
            (key(Role::ServiceNameConst), sanitize(&format!("{}_SERVICE_NAME", name.to_shouty_snake_case()))),
            (key(Role::ClientType), sanitize(&format!("{camel}NexusClient"))),
            (key(Role::HandlerInterface), sanitize(&format!("{camel}NexusServiceHandler"))),
            (
                key(Role::RegisterFunc),
                sanitize(&format!("register_{}_nexus_service_handler", name.to_snake_case())),
            ),
        ],
        verbatim: [
            (key(Role::ServiceNameConst), sanitize(&format!("{name}_SERVICE_NAME"))),
            (key(Role::ClientType), sanitize(&format!("{name}NexusClient"))),
            (key(Role::HandlerInterface), sanitize(&format!("{name}NexusServiceHandler"))),
            (
                key(Role::RegisterFunc),
                sanitize(&format!("register_{name}_nexus_service_handler")),
            ),
        ],
        reserved: &[],
    }
}

fn resolve_operations(
    ctx: &mut NamingContext,
    service: &ServiceModel,
) -> Result<Vec<OperationNames>, GenerateError> {
    let scope = Scope::Service(service.name.clone());
    for reserved in CLIENT_RESERVED {
        ctx.claim(&scope, reserved, &format!("client method {reserved}"))?;
    }

    let entities = service
        .operations
        .iter()
        .map(|operation| {
            let name = &operation.name;
            let snake = name.to_snake_case();
            let key = |role| NameKey::operation(&service.name, name, role);
            Entity {
                owner: format!("operation {}.{name}", service.name),
                candidates: [
                    (key(Role::OperationAccessor), sanitize(&snake)),
                    (key(Role::DeferredAccessor), sanitize(&format!("{snake}_async"))),
                ],
                verbatim: [
                    (key(Role::OperationAccessor), sanitize(name)),
                    (key(Role::DeferredAccessor), sanitize(&format!("{name}_async"))),
                ],
                reserved: CLIENT_RESERVED,
            }
        })
        .collect();

    Ok(settle(ctx, &scope, entities)?
        .into_iter()
        .map(|([accessor, deferred], verbatim)| OperationNames {
            accessor,
            deferred,
            verbatim,
        })
        .collect())
}
