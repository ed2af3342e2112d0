//! Process-wide driver registry.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use super::conn::Conn;
use super::postgres::PgDriver;
use super::{Driver, SquintDriver};
use crate::builder::Builder;
use crate::error::{SquintError, SquintResult};

type Registry = RwLock<HashMap<String, Arc<dyn Driver>>>;

fn registry() -> &'static Registry {
    static DRIVERS: OnceLock<Registry> = OnceLock::new();
    DRIVERS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Built-in providers usable as a `register_with` target without registering
/// them first.
fn builtin(target: &str) -> Option<Arc<dyn Driver>> {
    match target {
        "postgres" | "postgresql" => Some(Arc::new(PgDriver)),
        _ => None,
    }
}

/// Register `driver` under `name`. Names are unique for the life of the
/// process.
pub fn register(name: &str, driver: Arc<dyn Driver>) -> SquintResult<()> {
    let mut drivers = registry().write().unwrap_or_else(PoisonError::into_inner);
    if drivers.contains_key(name) {
        tracing::warn!(target: "squint.driver", name, "driver already registered");
        return Err(SquintError::registry(format!(
            "driver {name:?} is already registered"
        )));
    }
    drivers.insert(name.to_string(), driver);
    Ok(())
}

/// Options for [`register_with`].
#[derive(Default)]
pub struct RegisterOptions {
    /// Registered name. Defaults to `"squint-" + target`.
    pub name: Option<String>,
    /// Builder for every connection. Defaults to `Builder::new()`.
    pub builder: Option<Arc<Builder>>,
    /// Provider to wrap, instead of looking `target` up.
    pub to_driver: Option<Arc<dyn Driver>>,
}

impl RegisterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn builder(mut self, builder: impl Into<Arc<Builder>>) -> Self {
        self.builder = Some(builder.into());
        self
    }

    pub fn to_driver(mut self, driver: Arc<dyn Driver>) -> Self {
        self.to_driver = Some(driver);
        self
    }
}

/// Register a builder-backed version of the `target` provider and return the
/// name it was registered under.
///
/// `target` is a registered driver name or a built-in provider
/// (`"postgres"`), unless `opts.to_driver` supplies the provider directly.
pub fn register_with(target: &str, opts: RegisterOptions) -> SquintResult<String> {
    let inner = match opts.to_driver {
        Some(driver) => driver,
        None => match lookup(target).or_else(|| builtin(target)) {
            Some(driver) => driver,
            None => {
                tracing::warn!(target: "squint.driver", target_driver = target, "unknown driver target");
                return Err(SquintError::registry(format!(
                    "unknown driver target {target:?}"
                )));
            }
        },
    };

    let name = opts.name.unwrap_or_else(|| format!("squint-{target}"));
    let builder = opts.builder.unwrap_or_default();
    register(&name, Arc::new(SquintDriver::wrap(inner, builder)))?;
    Ok(name)
}

/// The driver registered under `name`.
pub fn lookup(name: &str) -> Option<Arc<dyn Driver>> {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
}

/// Registered driver names, sorted.
pub fn drivers() -> Vec<String> {
    let mut names: Vec<String> = registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .keys()
        .cloned()
        .collect();
    names.sort();
    names
}

/// Open a connection through the driver registered under `name`.
pub async fn open(name: &str, dsn: &str) -> SquintResult<Box<dyn Conn>> {
    let driver = lookup(name)
        .ok_or_else(|| SquintError::registry(format!("no driver registered as {name:?}")))?;
    driver.open(dsn).await
}
