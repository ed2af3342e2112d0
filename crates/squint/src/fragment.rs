//! The fragment model: everything a build call accepts.
//!
//! A build takes an ordered list of [`Fragment`]s. Most callers never name the
//! enum directly: [`ToFragment`] is implemented for string types (SQL text),
//! scalars and other [`Valuer`]s (binds), `Option`, slices and vectors, maps,
//! [`Condition`]s, [`Opt`] directives and `#[derive(Record)]` types, and the
//! [`frags!`](crate::frags) / [`build!`](crate::build) macros do the
//! conversion.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::options::Opt;
use crate::value::{Json, Value, Valuer};

#[derive(Debug, Clone)]
pub enum Fragment {
    /// Literal SQL text, appended verbatim.
    Sql(String),
    /// A single bind.
    Value(Value),
    /// An optional fragment; `None` binds `NULL`.
    Nullable(Option<Box<Fragment>>),
    /// A sequence: an IN list, a multi-row insert, or fragments added in order.
    Seq(Vec<Fragment>),
    /// The fields of a record type, in declaration order.
    Record(Vec<Field>),
    /// Keyed entries; sorted by key when expanded.
    Map(Vec<MapEntry>),
    Group(Condition),
    Directive(Opt),
}

impl Fragment {
    /// Flattens this fragment into a single bind value. Used for IN-list
    /// elements, which always bind positionally. Records, maps, groups and
    /// directives have no value of their own and become `NULL`; callers
    /// expand those first.
    pub fn into_value(self) -> Value {
        match self {
            Fragment::Sql(s) => Value::Text(s),
            Fragment::Value(v) => v,
            Fragment::Nullable(None) => Value::Null,
            Fragment::Nullable(Some(inner)) => inner.into_value(),
            Fragment::Seq(items) => {
                let mut values = Vec::with_capacity(items.len());
                push_values(items, &mut values);
                Value::Array(values)
            }
            Fragment::Record(_) | Fragment::Map(_) | Fragment::Group(_) | Fragment::Directive(_) => {
                Value::Null
            }
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Fragment::Record(_))
    }
}

/// Nested list elements: true groups are spliced in, everything without a
/// single value is dropped.
fn push_values(items: Vec<Fragment>, out: &mut Vec<Value>) {
    for item in items {
        match item {
            Fragment::Group(cond) if cond.flag => push_values(cond.fragments, out),
            Fragment::Group(_) | Fragment::Directive(_) | Fragment::Record(_) | Fragment::Map(_) => {}
            other => out.push(other.into_value()),
        }
    }
}

/// Conversion into a [`Fragment`].
pub trait ToFragment {
    fn to_fragment(&self) -> Fragment;
}

impl ToFragment for Fragment {
    fn to_fragment(&self) -> Fragment {
        self.clone()
    }
}

impl ToFragment for str {
    fn to_fragment(&self) -> Fragment {
        Fragment::Sql(self.to_owned())
    }
}

impl ToFragment for String {
    fn to_fragment(&self) -> Fragment {
        Fragment::Sql(self.clone())
    }
}

impl<T: ToFragment + ?Sized> ToFragment for &T {
    fn to_fragment(&self) -> Fragment {
        (**self).to_fragment()
    }
}

impl<T: ToFragment + ?Sized> ToFragment for Box<T> {
    fn to_fragment(&self) -> Fragment {
        (**self).to_fragment()
    }
}

impl<T: ToFragment> ToFragment for Option<T> {
    fn to_fragment(&self) -> Fragment {
        Fragment::Nullable(self.as_ref().map(|v| Box::new(v.to_fragment())))
    }
}

impl<T: ToFragment> ToFragment for [T] {
    fn to_fragment(&self) -> Fragment {
        Fragment::Seq(self.iter().map(ToFragment::to_fragment).collect())
    }
}

impl<T: ToFragment, const N: usize> ToFragment for [T; N] {
    fn to_fragment(&self) -> Fragment {
        self.as_slice().to_fragment()
    }
}

impl<T: ToFragment> ToFragment for Vec<T> {
    fn to_fragment(&self) -> Fragment {
        self.as_slice().to_fragment()
    }
}

/// One entry of a [`Fragment::Map`].
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: String,
    pub value: Value,
    /// Emptiness of the source value, see [`Valuer::is_zero`].
    pub zero: bool,
}

impl MapEntry {
    pub fn new(key: impl Into<String>, value: &(impl Valuer + ?Sized)) -> Self {
        Self {
            key: key.into(),
            value: value.value(),
            zero: value.is_zero(),
        }
    }
}

impl<K: AsRef<str>, V: Valuer, S: BuildHasher> ToFragment for HashMap<K, V, S> {
    fn to_fragment(&self) -> Fragment {
        Fragment::Map(self.iter().map(|(k, v)| MapEntry::new(k.as_ref(), v)).collect())
    }
}

impl<K: AsRef<str>, V: Valuer> ToFragment for BTreeMap<K, V> {
    fn to_fragment(&self) -> Fragment {
        Fragment::Map(self.iter().map(|(k, v)| MapEntry::new(k.as_ref(), v)).collect())
    }
}

impl ToFragment for Opt {
    fn to_fragment(&self) -> Fragment {
        Fragment::Directive(self.clone())
    }
}

/// Implements [`ToFragment`] for types that always bind as one value.
///
/// Use it for your own [`Valuer`] types so they can be passed to
/// [`build!`](crate::build) directly:
///
/// ```
/// use squint::{Value, Valuer, impl_to_fragment_for_valuer};
///
/// struct Cents(i64);
///
/// impl Valuer for Cents {
///     fn value(&self) -> Value {
///         Value::Int(self.0)
///     }
/// }
///
/// impl_to_fragment_for_valuer!(Cents);
///
/// let (sql, binds) = squint::build!(squint::Builder::new(), "SET price =", Cents(250));
/// assert_eq!(sql, "SET price = ?");
/// assert_eq!(binds, vec![Value::Int(250)]);
/// ```
#[macro_export]
macro_rules! impl_to_fragment_for_valuer {
    ($($t:ty),+ $(,)?) => {
        $(
            impl $crate::ToFragment for $t {
                fn to_fragment(&self) -> $crate::Fragment {
                    $crate::Fragment::Value($crate::Valuer::value(self))
                }
            }
        )+
    };
}

impl_to_fragment_for_valuer!(
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    char,
    Value,
    DateTime<Utc>,
    NaiveDateTime,
    Uuid,
    serde_json::Value,
    bytes::Bytes,
);

impl<T: serde::Serialize> ToFragment for Json<T> {
    fn to_fragment(&self) -> Fragment {
        Fragment::Value(self.value())
    }
}

/// Forces a value to bind, even text that would otherwise be SQL.
///
/// `build!(b, "hello", Bind("world"))` yields `hello ?` with `"world"` bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Bind<T>(pub T);

pub fn bind<T: Valuer>(value: T) -> Bind<T> {
    Bind(value)
}

impl<T: Valuer> Valuer for Bind<T> {
    fn value(&self) -> Value {
        self.0.value()
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl<T: Valuer> ToFragment for Bind<T> {
    fn to_fragment(&self) -> Fragment {
        Fragment::Value(self.0.value())
    }
}

/// A group of fragments that is only emitted when its flag is set.
#[derive(Debug, Clone)]
pub struct Condition {
    pub flag: bool,
    pub fragments: Vec<Fragment>,
}

impl ToFragment for Condition {
    fn to_fragment(&self) -> Fragment {
        Fragment::Group(self.clone())
    }
}

/// Wraps `fragments` in a [`Condition`]. See also [`when!`](crate::when).
pub fn when(flag: bool, fragments: impl IntoIterator<Item = Fragment>) -> Condition {
    Condition {
        flag,
        fragments: fragments.into_iter().collect(),
    }
}

/// Types whose fields expand into columns.
///
/// Usually derived:
///
/// ```
/// use squint::Record;
///
/// #[derive(Record)]
/// struct Person {
///     pub id: i64,
///     #[squint(db = "name,omitempty")]
///     pub full_name: String,
///     #[squint(db = "-")]
///     pub cache: String,
/// }
///
/// let fields = Person { id: 1, full_name: "Ann".into(), cache: String::new() }.fields();
/// assert_eq!(fields.len(), 3);
/// assert_eq!(fields[1].tag("db"), Some("name,omitempty"));
/// ```
pub trait Record {
    fn fields(&self) -> Vec<Field>;
}

/// One field of a [`Record`].
#[derive(Debug, Clone)]
pub struct Field {
    /// Rust field name.
    pub name: &'static str,
    /// `(key, value)` attribute pairs, e.g. `("db", "name,omitempty")`.
    pub tags: &'static [(&'static str, &'static str)],
    pub kind: FieldKind,
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    /// A bound column. `zero` is the emptiness of the source value.
    Value { value: Value, zero: bool },
    /// A flattened record, spliced into the parent's columns.
    Embedded(Vec<Field>),
    /// A field that is not visible outside its type; never a column.
    Hidden,
}

impl Field {
    /// A column holding `value`; emptiness is judged on the bound value.
    pub fn value(
        name: &'static str,
        tags: &'static [(&'static str, &'static str)],
        value: Value,
    ) -> Self {
        let zero = value.is_zero();
        Self {
            name,
            tags,
            kind: FieldKind::Value { value, zero },
        }
    }

    /// A column converted from `source`, keeping its own notion of
    /// emptiness (`Some(0)` is not empty).
    pub fn valuer(
        name: &'static str,
        tags: &'static [(&'static str, &'static str)],
        source: &(impl Valuer + ?Sized),
    ) -> Self {
        Self {
            name,
            tags,
            kind: FieldKind::Value {
                value: source.value(),
                zero: source.is_zero(),
            },
        }
    }

    pub fn embedded(
        name: &'static str,
        tags: &'static [(&'static str, &'static str)],
        fields: Vec<Field>,
    ) -> Self {
        Self {
            name,
            tags,
            kind: FieldKind::Embedded(fields),
        }
    }

    pub fn hidden(name: &'static str) -> Self {
        Self {
            name,
            tags: &[],
            kind: FieldKind::Hidden,
        }
    }

    /// The raw attribute value for `key`, if any.
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}
