//! The SQL builder.
//!
//! A [`Builder`] turns an ordered list of fragments into SQL text plus a
//! matching list of binds. Plain strings are SQL, everything else binds, and
//! records or maps expand according to what the SQL so far ends with:
//!
//! - after `INSERT ... INTO table`: `( a, b ) VALUES ( ?, ? )`
//! - after `SET`: `a = ?, b = ?`
//! - anywhere else: `a = ? AND b = ?`
//!
//! A sequence right after `IN` becomes `( ?, ?, ? )`.
//!
//! # Example
//!
//! ```
//! use squint::{Builder, build, when};
//!
//! let b = Builder::new();
//! let ids = vec![1, 2, 3];
//! let name: Option<&str> = None;
//!
//! let (sql, binds) = build!(
//!     b,
//!     "SELECT * FROM users WHERE id IN",
//!     ids,
//!     when!(name.is_some(), "AND name =", name),
//! );
//! assert_eq!(sql, "SELECT * FROM users WHERE id IN ( ?, ?, ? )");
//! assert_eq!(binds.len(), 3);
//! ```

mod buffer;
mod context;
mod query;
mod sift;

#[cfg(test)]
mod tests;

use tracing::Level;

use crate::fragment::{Condition, Fragment};
use crate::options::{Opt, Options};
use crate::value::Value;
use query::Query;

/// Builds SQL text and bind lists.
///
/// `build` takes `&self` and works on a per-call copy of the options, so a
/// configured builder can be shared freely (for example behind an `Arc`).
#[derive(Debug, Clone, Default)]
pub struct Builder {
    opt: Options,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(opt: Options) -> Self {
        Self { opt }
    }

    /// Apply a directive, consuming and returning the builder.
    #[must_use]
    pub fn option(mut self, opt: Opt) -> Self {
        self.opt.apply(&opt);
        self
    }

    /// Apply a directive in place.
    pub fn set_option(&mut self, opt: Opt) -> &mut Self {
        self.opt.apply(&opt);
        self
    }

    pub fn options(&self) -> &Options {
        &self.opt
    }

    /// Compile `fragments` into SQL text and binds.
    pub fn build(&self, fragments: impl IntoIterator<Item = Fragment>) -> (String, Vec<Value>) {
        let mut q = Query::new(self.opt.clone());
        for f in fragments {
            q.add(f);
        }
        log_query(&q);
        q.finish()
    }

    /// See [`when`](crate::when).
    pub fn when(&self, flag: bool, fragments: impl IntoIterator<Item = Fragment>) -> Condition {
        crate::fragment::when(flag, fragments)
    }

    /// Whether `fragment` would contribute anything.
    ///
    /// Records and maps are sifted with the current options: `false` means every
    /// field would be dropped (all omitted or excluded). Every other fragment
    /// counts as having values.
    pub fn has_values(&self, fragment: &Fragment) -> bool {
        match fragment {
            Fragment::Record(_) | Fragment::Map(_) => {
                !sift::sift(fragment, &self.opt, false).is_empty()
            }
            _ => true,
        }
    }
}

fn log_query(q: &Query) {
    /// Dispatch a tracing event at a runtime-determined level.
    macro_rules! emit_at_level {
        ($level:expr, $($field:tt)*) => {
            match $level {
                Level::ERROR => tracing::error!($($field)*),
                Level::WARN  => tracing::warn!($($field)*),
                Level::INFO  => tracing::info!($($field)*),
                Level::DEBUG => tracing::debug!($($field)*),
                Level::TRACE => tracing::trace!($($field)*),
            }
        };
    }

    let opt = q.options();
    if opt.log_query {
        emit_at_level!(opt.log_level, target: "squint.sql", sql = %q.sql(), "SQL");
    }
    if opt.log_binds {
        emit_at_level!(opt.log_level, target: "squint.sql", binds = ?q.binds(), "BINDS");
    }
}
