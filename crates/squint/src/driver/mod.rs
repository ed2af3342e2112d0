//! Driver shim: squint building at the connection boundary.
//!
//! A provider exposes connections through the [`Driver`], [`Conn`] and
//! [`Stmt`] traits, taking SQL text plus positional [`Value`] arguments.
//! [`SquintDriver::wrap`] turns any provider into one whose connections treat
//! the SQL text and arguments as builder fragments, so plain
//! `conn.execute("... WHERE id IN", &[ids])` calls get squint expansion:
//!
//! ```ignore
//! use squint::driver::{self, PgDriver, RegisterOptions};
//! use squint::{Builder, Opt, Placeholder, Value};
//!
//! let builder = Builder::new().option(Opt::Placeholder(Placeholder::Dollar));
//! driver::register_with("postgres", RegisterOptions::new().builder(builder))?;
//!
//! let conn = driver::open("squint-postgres", "postgres://localhost/app").await?;
//! let ids = Value::from(vec![Value::from(1), Value::from(2)]);
//! let rows = conn.query("SELECT * FROM users WHERE id IN", &[ids]).await?;
//! ```
//!
//! Argument lists ([`Value::Array`]) are passed to the builder as sequences, so
//! they expand after `IN` and are inlined elsewhere.

mod conn;
mod postgres;
mod registry;
mod stmt;


use std::sync::Arc;

use async_trait::async_trait;

use crate::builder::Builder;
use crate::error::SquintResult;
use crate::value::Value;

pub use conn::{Conn, SquintConn};
pub use postgres::{PgConn, PgDriver, PgStmt};
pub use registry::{RegisterOptions, drivers, lookup, open, register, register_with};
pub use stmt::{DeferredStmt, Stmt};

/// An execution provider.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Open a new connection.
    async fn open(&self, dsn: &str) -> SquintResult<Box<dyn Conn>>;
}

/// A driver whose connections run every query through a [`Builder`].
pub struct SquintDriver {
    inner: Arc<dyn Driver>,
    builder: Arc<Builder>,
}

impl SquintDriver {
    pub fn wrap(driver: Arc<dyn Driver>, builder: impl Into<Arc<Builder>>) -> Self {
        Self {
            inner: driver,
            builder: builder.into(),
        }
    }

    pub fn builder(&self) -> &Builder {
        &self.builder
    }
}

#[async_trait]
impl Driver for SquintDriver {
    async fn open(&self, dsn: &str) -> SquintResult<Box<dyn Conn>> {
        let conn = self.inner.open(dsn).await?;
        Ok(Box::new(SquintConn::new(
            Arc::from(conn),
            Arc::clone(&self.builder),
        )))
    }
}

/// Rewrite `sql` + `args` through the builder: the text is the first fragment,
/// each argument follows it.
pub(crate) fn rebuild(builder: &Builder, sql: &str, args: &[Value]) -> (String, Vec<Value>) {
    let mut fragments = Vec::with_capacity(args.len() + 1);
    fragments.push(crate::Fragment::Sql(sql.to_string()));
    fragments.extend(args.iter().cloned().map(argument));
    builder.build(fragments)
}

fn argument(value: Value) -> crate::Fragment {
    match value {
        Value::Array(items) => crate::Fragment::Seq(items.into_iter().map(argument).collect()),
        v => crate::Fragment::Value(v),
    }
}
