//! # squint
//!
//! Build SQL text and bind lists from a mix of SQL fragments and Rust values.
//!
//! ## Features
//!
//! - **SQL stays SQL**: strings are appended verbatim, everything else binds
//! - **Context aware**: records and maps expand into `INSERT` column lists,
//!   `SET` assignments or `AND`-joined conditions depending on the SQL so far
//! - **IN lists**: a sequence after `IN` becomes `( ?, ?, ? )`, or `( NULL )`
//!   when empty
//! - **Empty-value policy**: keep, omit or null-out zero values, globally or
//!   per field
//! - **Any placeholder style**: `?`, `$1`, `:1`, `@p1` or your own
//! - **Adapters**: an execution bridge over tokio-postgres clients and
//!   transactions, and a driver shim that builds at the connection boundary
//!
//! ## Example
//!
//! ```
//! use squint::{Builder, Record, Value, build};
//!
//! #[derive(Record)]
//! struct User {
//!     pub id: i64,
//!     #[squint(db = "user_name")]
//!     pub name: String,
//!     #[squint(db = "omitempty")]
//!     pub email: String,
//! }
//!
//! let user = User { id: 7, name: "ann".into(), email: String::new() };
//! let (sql, binds) = build!(Builder::new(), "INSERT INTO users", user);
//!
//! assert_eq!(sql, "INSERT INTO users ( id, user_name ) VALUES ( ?, ? )");
//! assert_eq!(binds, vec![Value::Int(7), Value::from("ann")]);
//! ```

// Derive output names `::squint::...`, which must also resolve inside this crate.
extern crate self as squint;

pub mod bridge;
pub mod builder;
pub mod client;
pub mod driver;
pub mod error;
pub mod fragment;
pub mod options;
pub mod row;
pub mod value;

mod macros;

pub use bridge::{Bridge, Db, Tx};
pub use builder::Builder;
pub use client::GenericClient;
pub use error::{SquintError, SquintResult};
pub use fragment::{
    Bind, Condition, Field, FieldKind, Fragment, MapEntry, Record, ToFragment, bind, when,
};
pub use options::{EmptyFn, EmptyMode, Opt, Options, Placeholder};
pub use row::{FromRow, RowExt};
pub use value::{Json, Value, Valuer};

#[cfg(feature = "derive")]
pub use squint_derive::{FromRow, Record};
