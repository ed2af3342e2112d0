/// Convert a list of expressions into `Vec<Fragment>`.
///
/// Each argument is borrowed and converted with
/// [`ToFragment`](crate::ToFragment), so values stay usable afterwards.
///
/// ```
/// use squint::{Fragment, frags};
///
/// let ids = vec![1, 2];
/// let bits = frags!["SELECT * FROM t WHERE id IN", ids];
/// assert!(matches!(bits[0], Fragment::Sql(_)));
/// assert!(matches!(bits[1], Fragment::Seq(_)));
/// ```
#[macro_export]
macro_rules! frags {
    ($($bit:expr),* $(,)?) => {{
        let fragments: ::std::vec::Vec<$crate::Fragment> =
            ::std::vec![$($crate::ToFragment::to_fragment(&$bit)),*];
        fragments
    }};
}

/// Build SQL and binds from a builder and a list of fragments.
///
/// `build!(b, a, b, c)` is `b.build(frags![a, b, c])`.
///
/// ```
/// use squint::{Builder, Value, bind, build};
///
/// let (sql, binds) = build!(Builder::new(), "hello", bind("world"));
/// assert_eq!(sql, "hello ?");
/// assert_eq!(binds, vec![Value::from("world")]);
/// ```
#[macro_export]
macro_rules! build {
    ($builder:expr $(, $bit:expr)* $(,)?) => {
        $builder.build($crate::frags![$($bit),*])
    };
}

/// Conditional group: `when!(flag, a, b)` is `when(flag, frags![a, b])`.
#[macro_export]
macro_rules! when {
    ($flag:expr $(, $bit:expr)* $(,)?) => {
        $crate::when($flag, $crate::frags![$($bit),*])
    };
}
