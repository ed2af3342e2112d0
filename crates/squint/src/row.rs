//! Row mapping traits

use crate::error::{SquintError, SquintResult};
pub use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Trait for converting a database row into a Rust value.
///
/// Usually derived; column names follow the same `#[squint(db = "...")]`
/// attribute a [`Record`](crate::Record) uses, so one struct can be written
/// and read back.
///
/// ```ignore
/// use squint::FromRow;
///
/// #[derive(FromRow)]
/// struct User {
///     id: i64,
///     #[squint(db = "user_name")]
///     name: String,
///     email: Option<String>,
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> SquintResult<Self>;
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning SquintError::Decode on failure
    fn try_get_column<T>(&self, column: &str) -> SquintResult<T>
    where
        T: for<'a> FromSql<'a>;

    /// Positional variant of [`RowExt::try_get_column`].
    fn try_get_index<T>(&self, idx: usize) -> SquintResult<T>
    where
        T: for<'a> FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> SquintResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| SquintError::decode(column, e.to_string()))
    }

    fn try_get_index<T>(&self, idx: usize) -> SquintResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(idx)
            .map_err(|e| SquintError::decode(format!("#{idx}"), e.to_string()))
    }
}

// Tuples read columns by position: `select::<(i64, String)>`.
macro_rules! impl_from_row_for_tuple {
    ($($t:ident : $idx:tt),+) => {
        impl<$($t),+> FromRow for ($($t,)+)
        where
            $($t: for<'a> FromSql<'a>),+
        {
            fn from_row(row: &Row) -> SquintResult<Self> {
                Ok(($(row.try_get_index::<$t>($idx)?,)+))
            }
        }
    };
}

impl_from_row_for_tuple!(A: 0);
impl_from_row_for_tuple!(A: 0, B: 1);
impl_from_row_for_tuple!(A: 0, B: 1, C: 2);
impl_from_row_for_tuple!(A: 0, B: 1, C: 2, D: 3);
