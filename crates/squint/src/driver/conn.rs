use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use tokio_postgres::Row;

use super::rebuild;
use super::stmt::{DeferredStmt, Stmt};
use crate::builder::Builder;
use crate::error::SquintResult;
use crate::value::Value;

/// A provider connection taking positional arguments.
#[async_trait]
pub trait Conn: Send + Sync {
    async fn execute(&self, sql: &str, args: &[Value]) -> SquintResult<u64>;

    async fn query(&self, sql: &str, args: &[Value]) -> SquintResult<Vec<Row>>;

    async fn prepare(&self, sql: &str) -> SquintResult<Box<dyn Stmt>>;

    async fn ping(&self) -> SquintResult<()>;

    async fn close(&self) -> SquintResult<()>;
}

/// Matches provider-native numbered placeholders (`$1`).
fn native_placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\d+").expect("invalid built-in placeholder regex"))
}

/// Connection returned by a [`SquintDriver`](super::SquintDriver).
pub struct SquintConn {
    inner: Arc<dyn Conn>,
    builder: Arc<Builder>,
}

impl SquintConn {
    pub fn new(inner: Arc<dyn Conn>, builder: Arc<Builder>) -> Self {
        Self { inner, builder }
    }
}

#[async_trait]
impl Conn for SquintConn {
    async fn execute(&self, sql: &str, args: &[Value]) -> SquintResult<u64> {
        let (sql, binds) = rebuild(&self.builder, sql, args);
        self.inner.execute(&sql, &binds).await
    }

    async fn query(&self, sql: &str, args: &[Value]) -> SquintResult<Vec<Row>> {
        let (sql, binds) = rebuild(&self.builder, sql, args);
        self.inner.query(&sql, &binds).await
    }

    /// Text that already carries native placeholders is prepared as is.
    /// Anything else can only be built once the arguments are known, so the
    /// statement is built and prepared again on every execution.
    async fn prepare(&self, sql: &str) -> SquintResult<Box<dyn Stmt>> {
        if native_placeholder_re().is_match(sql) {
            return self.inner.prepare(sql).await;
        }
        tracing::debug!(target: "squint.driver", sql, "deferring prepare until execution");
        Ok(Box::new(DeferredStmt::new(
            Arc::clone(&self.inner),
            Arc::clone(&self.builder),
            sql,
        )))
    }

    async fn ping(&self) -> SquintResult<()> {
        self.inner.ping().await
    }

    async fn close(&self) -> SquintResult<()> {
        self.inner.close().await
    }
}
