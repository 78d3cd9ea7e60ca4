#![deny(missing_docs)]

//! # Contracts
//!
//! The declarative half of an endpoint: its routes, the platform capabilities
//! and external modules it imports, and the events it publishes or listens for.
//!
//! Contract files carry a top-level `contract:` mapping:
//!
//! ```yaml
//! contract:
//!   routes:
//!     "GET /hello": list
//!   imports:
//!     platform: [logger]
//!     external: [serde_json]
//!   publishes: []
//!   subscribes: []
//! ```

use crate::error::{AppError, AppResult};
use indexmap::{IndexMap, IndexSet};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Import expectations of a handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractImports {
    /// Platform capability names (e.g. `logger`).
    pub platform: IndexSet<String>,
    /// Third-party module names (e.g. `serde_json`).
    pub external: IndexSet<String>,
}

/// A normalized contract. Every collection is present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contract {
    /// Route key (`"METHOD /path"`) to handler function name, in declaration order.
    pub routes: IndexMap<String, String>,
    /// Expected imports.
    pub imports: ContractImports,
    /// Events the handler emits.
    pub publishes: IndexSet<String>,
    /// Events the handler listens for.
    pub subscribes: IndexSet<String>,
}

impl Contract {
    /// An empty contract, the starting point of the builder methods.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route.
    pub fn with_route(mut self, key: impl Into<String>, function: impl Into<String>) -> Self {
        self.routes.insert(key.into(), function.into());
        self
    }

    /// Adds a platform capability import.
    pub fn with_platform_import(mut self, name: impl Into<String>) -> Self {
        self.imports.platform.insert(name.into());
        self
    }

    /// Adds an external module import.
    pub fn with_external_import(mut self, name: impl Into<String>) -> Self {
        self.imports.external.insert(name.into());
        self
    }

    /// Adds a published event.
    pub fn publishing(mut self, event: impl Into<String>) -> Self {
        self.publishes.insert(event.into());
        self
    }

    /// Adds a subscribed event.
    pub fn subscribing(mut self, event: impl Into<String>) -> Self {
        self.subscribes.insert(event.into());
        self
    }

    /// Returns true when any route maps to `function`.
    pub fn declares_function(&self, function: &str) -> bool {
        self.routes.values().any(|f| f == function)
    }
}

/// HTTP methods a route may bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `PATCH`
    Patch,
}

impl HttpMethod {
    /// Case-insensitive lookup; `None` for methods the binder does not register.
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            _ => None,
        }
    }

    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `"METHOD /path"` route key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteKey {
    /// HTTP method as written.
    pub method: String,
    /// Path, possibly with `:param` segments.
    pub path: String,
}

impl RouteKey {
    /// Splits a route key on its first space.
    ///
    /// ```
    /// use trellis_core::contract::RouteKey;
    ///
    /// let key = RouteKey::parse("GET /todos/:id").unwrap();
    /// assert_eq!(key.method, "GET");
    /// assert_eq!(key.path, "/todos/:id");
    /// assert!(RouteKey::parse("/hello").is_err());
    /// ```
    pub fn parse(key: &str) -> Result<Self, String> {
        let (method, path) = key
            .trim()
            .split_once(' ')
            .ok_or_else(|| "expected \"METHOD /path\"".to_string())?;
        let method = method.trim();
        let path = path.trim();

        if method.is_empty() {
            return Err("missing HTTP method".into());
        }
        if path.is_empty() {
            return Err("missing path".into());
        }

        Ok(Self {
            method: method.to_string(),
            path: path.to_string(),
        })
    }

    /// The method as a supported [`HttpMethod`], if it is one.
    pub fn http_method(&self) -> Option<HttpMethod> {
        HttpMethod::parse(&self.method)
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

#[derive(Deserialize)]
struct ContractDocument {
    contract: Option<RawContract>,
}

#[derive(Deserialize, Default)]
struct RawContract {
    routes: Option<RouteMap>,
    imports: Option<RawImports>,
    publishes: Option<Vec<String>>,
    subscribes: Option<Vec<String>>,
}

/// Route table that rejects a key declared twice instead of keeping the last.
#[derive(Default)]
struct RouteMap(IndexMap<String, String>);

impl<'de> Deserialize<'de> for RouteMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RouteMapVisitor;

        impl<'de> Visitor<'de> for RouteMapVisitor {
            type Value = RouteMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of \"METHOD /path\" to function name")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(RouteMap::default())
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut routes = IndexMap::new();
                while let Some((key, function)) = access.next_entry::<String, String>()? {
                    if routes.contains_key(&key) {
                        return Err(de::Error::custom(format!(
                            "duplicate route key \"{}\"",
                            key
                        )));
                    }
                    routes.insert(key, function);
                }
                Ok(RouteMap(routes))
            }
        }

        deserializer.deserialize_map(RouteMapVisitor)
    }
}

#[derive(Deserialize, Default)]
struct RawImports {
    platform: Option<Vec<String>>,
    external: Option<Vec<String>>,
}

impl From<RawContract> for Contract {
    fn from(raw: RawContract) -> Self {
        let imports = raw.imports.unwrap_or_default();
        Contract {
            routes: raw.routes.unwrap_or_default().0,
            imports: ContractImports {
                platform: imports.platform.unwrap_or_default().into_iter().collect(),
                external: imports.external.unwrap_or_default().into_iter().collect(),
            },
            publishes: raw.publishes.unwrap_or_default().into_iter().collect(),
            subscribes: raw.subscribes.unwrap_or_default().into_iter().collect(),
        }
    }
}

/// Parses contract text. `is_json` selects the JSON reader, otherwise YAML.
pub fn parse_contract(content: &str, is_json: bool) -> AppResult<Contract> {
    let document: ContractDocument = if is_json {
        serde_json::from_str(content).map_err(|e| AppError::ContractLoad(e.to_string()))?
    } else {
        serde_yaml::from_str(content).map_err(|e| AppError::ContractLoad(e.to_string()))?
    };

    let raw = document
        .contract
        .ok_or_else(|| AppError::ContractLoad("missing `contract` declaration".into()))?;

    Ok(raw.into())
}

/// Loads and normalizes the contract at `path`.
pub fn load_contract(path: &Path) -> AppResult<Contract> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::ContractLoad(format!("cannot read {:?}: {}", path, e)))?;
    let is_json = path.extension().is_some_and(|ext| ext == "json");

    let contract = parse_contract(&content, is_json).map_err(|e| match e {
        AppError::ContractLoad(msg) => AppError::ContractLoad(format!("{:?}: {}", path, msg)),
        other => other,
    })?;

    debug!(
        path = ?path,
        routes = contract.routes.len(),
        publishes = contract.publishes.len(),
        subscribes = contract.subscribes.len(),
        "contract loaded"
    );
    Ok(contract)
}
