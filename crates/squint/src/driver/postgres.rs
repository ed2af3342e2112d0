//! The tokio-postgres provider.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tokio_postgres::{Client, NoTls, Row, Statement};

use super::conn::Conn;
use super::stmt::Stmt;
use super::Driver;
use crate::bridge::params_ref;
use crate::error::{SquintError, SquintResult};
use crate::value::Value;

/// Opens plain (non-TLS) tokio-postgres connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgDriver;

#[async_trait]
impl Driver for PgDriver {
    async fn open(&self, dsn: &str) -> SquintResult<Box<dyn Conn>> {
        let (client, connection) = tokio_postgres::connect(dsn, NoTls)
            .await
            .map_err(|e| SquintError::Connection(e.to_string()))?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(target: "squint.driver", error = %e, "connection error");
            }
        });
        Ok(Box::new(PgConn::new(client)))
    }
}

/// A tokio-postgres connection.
///
/// `close` drops the client; statements prepared from it keep the socket open
/// until they are dropped too.
pub struct PgConn {
    client: RwLock<Option<Arc<Client>>>,
}

impl PgConn {
    pub fn new(client: Client) -> Self {
        Self {
            client: RwLock::new(Some(Arc::new(client))),
        }
    }

    fn client(&self) -> SquintResult<Arc<Client>> {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| SquintError::Connection("connection is closed".to_string()))
    }
}

#[async_trait]
impl Conn for PgConn {
    async fn execute(&self, sql: &str, args: &[Value]) -> SquintResult<u64> {
        let client = self.client()?;
        client
            .execute(sql, &params_ref(args))
            .await
            .map_err(SquintError::from_db_error)
    }

    async fn query(&self, sql: &str, args: &[Value]) -> SquintResult<Vec<Row>> {
        let client = self.client()?;
        client
            .query(sql, &params_ref(args))
            .await
            .map_err(SquintError::from_db_error)
    }

    async fn prepare(&self, sql: &str) -> SquintResult<Box<dyn Stmt>> {
        let client = self.client()?;
        let statement = client
            .prepare(sql)
            .await
            .map_err(SquintError::from_db_error)?;
        Ok(Box::new(PgStmt { client, statement }))
    }

    async fn ping(&self) -> SquintResult<()> {
        let client = self.client()?;
        client
            .simple_query("SELECT 1")
            .await
            .map(|_| ())
            .map_err(SquintError::from_db_error)
    }

    async fn close(&self) -> SquintResult<()> {
        self.client
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}

/// A server-side prepared statement.
pub struct PgStmt {
    client: Arc<Client>,
    statement: Statement,
}

#[async_trait]
impl Stmt for PgStmt {
    async fn execute(&self, args: &[Value]) -> SquintResult<u64> {
        self.client
            .execute(&self.statement, &params_ref(args))
            .await
            .map_err(SquintError::from_db_error)
    }

    async fn query(&self, args: &[Value]) -> SquintResult<Vec<Row>> {
        self.client
            .query(&self.statement, &params_ref(args))
            .await
            .map_err(SquintError::from_db_error)
    }

    fn num_input(&self) -> Option<usize> {
        Some(self.statement.params().len())
    }
}
