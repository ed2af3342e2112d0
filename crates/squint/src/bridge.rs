//! Execution bridge: a [`Builder`] bound to a database handle.
//!
//! Every call builds SQL and binds from its fragments, then forwards them to
//! the target's own execute / query API. Use [`Placeholder::Dollar`] for
//! Postgres targets.
//!
//! # Example
//!
//! ```ignore
//! use squint::{Builder, Db, Opt, Placeholder, frags};
//!
//! let b = Builder::new().option(Opt::Placeholder(Placeholder::Dollar));
//! let mut db = Db::connect("postgres://localhost/app", b).await?;
//!
//! let users: Vec<User> = db.select(frags!["SELECT * FROM users WHERE", filter]).await?;
//!
//! let tx = db.begin().await?;
//! tx.execute(frags!["UPDATE users SET", changes, "WHERE id =", id]).await?;
//! tx.commit().await?;
//! ```
//!
//! [`Placeholder::Dollar`]: crate::Placeholder::Dollar

use std::ops::Deref;
use std::sync::Arc;

use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Row, Transaction};

use crate::builder::Builder;
use crate::client::GenericClient;
use crate::error::{SquintError, SquintResult};
use crate::fragment::Fragment;
use crate::row::FromRow;
use crate::value::Value;

/// Parameter refs compatible with `tokio-postgres`.
pub(crate) fn params_ref(binds: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    binds.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

/// A builder paired with a client or transaction.
pub struct Bridge<C> {
    builder: Arc<Builder>,
    target: C,
}

impl<C: GenericClient> Bridge<C> {
    pub fn new(builder: Arc<Builder>, target: C) -> Self {
        Self { builder, target }
    }

    pub fn builder(&self) -> &Builder {
        &self.builder
    }

    pub fn target(&self) -> &C {
        &self.target
    }

    pub fn into_inner(self) -> C {
        self.target
    }

    fn compile(&self, fragments: impl IntoIterator<Item = Fragment>) -> (String, Vec<Value>) {
        let (sql, binds) = self.builder.build(fragments);
        tracing::debug!(target: "squint.bridge", sql = %sql, binds = binds.len(), "forwarding query");
        (sql, binds)
    }

    /// Execute a statement and return the number of affected rows.
    pub async fn execute(&self, fragments: impl IntoIterator<Item = Fragment>) -> SquintResult<u64> {
        let (sql, binds) = self.compile(fragments);
        self.target.execute(&sql, &params_ref(&binds)).await
    }

    pub async fn query(&self, fragments: impl IntoIterator<Item = Fragment>) -> SquintResult<Vec<Row>> {
        let (sql, binds) = self.compile(fragments);
        self.target.query(&sql, &params_ref(&binds)).await
    }

    /// First row, or [`SquintError::NotFound`].
    pub async fn query_one(&self, fragments: impl IntoIterator<Item = Fragment>) -> SquintResult<Row> {
        let (sql, binds) = self.compile(fragments);
        self.target.query_one(&sql, &params_ref(&binds)).await
    }

    pub async fn query_opt(
        &self,
        fragments: impl IntoIterator<Item = Fragment>,
    ) -> SquintResult<Option<Row>> {
        let (sql, binds) = self.compile(fragments);
        self.target.query_opt(&sql, &params_ref(&binds)).await
    }

    /// Scan the first row into `T`.
    pub async fn get<T: FromRow>(&self, fragments: impl IntoIterator<Item = Fragment>) -> SquintResult<T> {
        let row = self.query_one(fragments).await?;
        T::from_row(&row)
    }

    /// Scan every row into `T`.
    pub async fn select<T: FromRow>(
        &self,
        fragments: impl IntoIterator<Item = Fragment>,
    ) -> SquintResult<Vec<T>> {
        let rows = self.query(fragments).await?;
        rows.iter().map(T::from_row).collect()
    }
}

/// A bridged `tokio_postgres::Client`.
pub struct Db {
    bridge: Bridge<Client>,
}

impl Db {
    pub fn new(client: Client, builder: Builder) -> Self {
        Self::with_shared(client, Arc::new(builder))
    }

    pub fn with_shared(client: Client, builder: Arc<Builder>) -> Self {
        Self {
            bridge: Bridge::new(builder, client),
        }
    }

    /// Connect without TLS and drive the connection on a spawned task.
    pub async fn connect(dsn: &str, builder: Builder) -> SquintResult<Self> {
        let (client, connection) = tokio_postgres::connect(dsn, NoTls)
            .await
            .map_err(|e| SquintError::Connection(e.to_string()))?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(target: "squint.bridge", error = %e, "connection error");
            }
        });
        Ok(Self::new(client, builder))
    }

    /// Start a transaction that shares this db's builder.
    pub async fn begin(&mut self) -> SquintResult<Tx<'_>> {
        let builder = Arc::clone(&self.bridge.builder);
        let tx = self
            .bridge
            .target
            .transaction()
            .await
            .map_err(SquintError::from_db_error)?;
        Ok(Tx {
            bridge: Bridge::new(builder, tx),
        })
    }

    pub fn into_inner(self) -> Client {
        self.bridge.target
    }
}

impl Deref for Db {
    type Target = Bridge<Client>;

    fn deref(&self) -> &Self::Target {
        &self.bridge
    }
}

/// A bridged transaction. Dropping it without committing rolls back.
pub struct Tx<'a> {
    bridge: Bridge<Transaction<'a>>,
}

impl Tx<'_> {
    pub async fn commit(self) -> SquintResult<()> {
        self.bridge
            .target
            .commit()
            .await
            .map_err(SquintError::from_db_error)
    }

    pub async fn rollback(self) -> SquintResult<()> {
        self.bridge
            .target
            .rollback()
            .await
            .map_err(SquintError::from_db_error)
    }
}

impl<'a> Deref for Tx<'a> {
    type Target = Bridge<Transaction<'a>>;

    fn deref(&self) -> &Self::Target {
        &self.bridge
    }
}
