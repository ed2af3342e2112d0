use std::sync::Arc;

use async_trait::async_trait;
use tokio_postgres::Row;

use super::conn::Conn;
use super::rebuild;
use crate::builder::Builder;
use crate::error::SquintResult;
use crate::value::Value;

/// A prepared statement.
#[async_trait]
pub trait Stmt: Send + Sync {
    async fn execute(&self, args: &[Value]) -> SquintResult<u64>;

    async fn query(&self, args: &[Value]) -> SquintResult<Vec<Row>>;

    /// Expected argument count, or `None` to skip the arity check.
    fn num_input(&self) -> Option<usize>;
}

/// A statement whose SQL is built from its arguments on each execution.
pub struct DeferredStmt {
    conn: Arc<dyn Conn>,
    builder: Arc<Builder>,
    sql: String,
}

impl DeferredStmt {
    pub(crate) fn new(conn: Arc<dyn Conn>, builder: Arc<Builder>, sql: &str) -> Self {
        Self {
            conn,
            builder,
            sql: sql.to_string(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    async fn prepare(&self, args: &[Value]) -> SquintResult<(Box<dyn Stmt>, Vec<Value>)> {
        let (sql, binds) = rebuild(&self.builder, &self.sql, args);
        let stmt = self.conn.prepare(&sql).await?;
        Ok((stmt, binds))
    }
}

#[async_trait]
impl Stmt for DeferredStmt {
    async fn execute(&self, args: &[Value]) -> SquintResult<u64> {
        let (stmt, binds) = self.prepare(args).await?;
        stmt.execute(&binds).await
    }

    async fn query(&self, args: &[Value]) -> SquintResult<Vec<Row>> {
        let (stmt, binds) = self.prepare(args).await?;
        stmt.query(&binds).await
    }

    fn num_input(&self) -> Option<usize> {
        None
    }
}
