//! Expands records and maps into `(column, value)` pairs, applying tag
//! directives and the empty-value policy.

use crate::fragment::{Field, FieldKind, Fragment, MapEntry};
use crate::options::{EmptyMode, Options};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Column {
    pub(crate) name: String,
    pub(crate) value: Value,
}

/// Sift a record or map into columns. Anything else has no columns.
///
/// `keep_all` keeps every column regardless of the omit policy; multi-row
/// inserts need every row to have the same shape.
pub(crate) fn sift(fragment: &Fragment, opt: &Options, keep_all: bool) -> Vec<Column> {
    match fragment {
        Fragment::Record(fields) => {
            let mut cols = Vec::with_capacity(fields.len());
            sift_fields(fields, opt, keep_all, &mut cols);
            cols
        }
        Fragment::Map(entries) => sift_map(entries, opt, keep_all),
        _ => Vec::new(),
    }
}

fn sift_map(entries: &[MapEntry], opt: &Options, keep_all: bool) -> Vec<Column> {
    let mut cols: Vec<Column> = entries
        .iter()
        .filter_map(|entry| {
            check_value(&entry.value, entry.zero, None, opt, keep_all).map(|value| Column {
                name: entry.key.clone(),
                value,
            })
        })
        .collect();
    cols.sort_by(|a, b| a.name.cmp(&b.name));
    cols
}

fn sift_fields(fields: &[Field], opt: &Options, keep_all: bool, out: &mut Vec<Column>) {
    for field in fields {
        let tag = FieldTag::read(field, opt);
        if tag.skip {
            continue;
        }
        match &field.kind {
            FieldKind::Hidden => {}
            FieldKind::Embedded(inner) => sift_fields(inner, opt, keep_all, out),
            FieldKind::Value { value, zero } => {
                if let Some(value) = check_value(value, *zero, tag.mode, opt, keep_all) {
                    out.push(Column {
                        name: tag.name.unwrap_or(field.name).to_string(),
                        value,
                    });
                }
            }
        }
    }
}

/// Parsed `#[squint(<tag> = "...")]` value.
#[derive(Debug, Default, PartialEq)]
struct FieldTag {
    name: Option<&'static str>,
    mode: Option<EmptyMode>,
    skip: bool,
}

impl FieldTag {
    fn read(field: &Field, opt: &Options) -> Self {
        if opt.tag.is_empty() {
            return Self::default();
        }
        match field.tag(&opt.tag) {
            Some(raw) => Self::parse(raw),
            None => Self::default(),
        }
    }

    fn parse(raw: &'static str) -> Self {
        let mut tag = Self::default();
        for token in raw.split(',').map(str::trim) {
            if token.is_empty() {
                continue;
            }
            if token == "-" {
                tag.skip = true;
            } else if let Some(mode) = EmptyMode::from_token(token) {
                tag.mode = Some(mode);
            } else {
                tag.name = Some(token);
            }
        }
        tag
    }
}

/// Decide whether a sifted value is kept, and what gets bound.
pub(crate) fn check_value(
    value: &Value,
    zero: bool,
    field_mode: Option<EmptyMode>,
    opt: &Options,
    keep_all: bool,
) -> Option<Value> {
    if !zero {
        return Some(value.clone());
    }

    if field_mode.is_none()
        && let Some(f) = &opt.empty_fn
    {
        let (out, keep) = f(value);
        return (keep || keep_all).then_some(out);
    }

    match field_mode.unwrap_or(opt.empty) {
        EmptyMode::Omit if !keep_all => None,
        EmptyMode::Null => Some(Value::Null),
        EmptyMode::Omit | EmptyMode::Keep => Some(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<Field> {
        vec![
            Field::value("ID", &[], Value::Int(7)),
            Field::value("Name", &[("db", "name,omitempty")], Value::Text(String::new())),
            Field::value("Skip", &[("db", "-")], Value::Int(1)),
            Field::hidden("secret"),
            Field::embedded(
                "Audit",
                &[],
                vec![Field::value("Who", &[("db", "who,nullempty")], Value::Text(String::new()))],
            ),
        ]
    }

    fn names(cols: &[Column]) -> Vec<&str> {
        cols.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn record_tags_and_embedding() {
        let cols = sift(&Fragment::Record(fields()), &Options::new(), false);
        assert_eq!(names(&cols), vec!["ID", "who"]);
        assert_eq!(cols[1].value, Value::Null);
    }

    #[test]
    fn keep_all_overrides_omit() {
        let cols = sift(&Fragment::Record(fields()), &Options::new(), true);
        assert_eq!(names(&cols), vec!["ID", "name", "who"]);
    }

    #[test]
    fn empty_tag_disables_tag_reading() {
        let cols = sift(&Fragment::Record(fields()), &Options::new().tag(""), false);
        assert_eq!(names(&cols), vec!["ID", "Name", "Skip", "Who"]);
    }

    #[test]
    fn map_entries_are_sorted() {
        let map = Fragment::Map(vec![
            MapEntry::new("zeta", &1),
            MapEntry::new("alpha", &2),
            MapEntry::new("mid", &0),
        ]);
        let cols = sift(&map, &Options::new().omit_empty(), false);
        assert_eq!(names(&cols), vec!["alpha", "zeta"]);
    }

    #[test]
    fn non_records_have_no_columns() {
        assert!(sift(&Fragment::Sql("x".into()), &Options::new(), false).is_empty());
    }

    #[test]
    fn check_value_modes() {
        let opt = Options::new();
        let zero = Value::Int(0);
        assert_eq!(check_value(&Value::Int(3), false, Some(EmptyMode::Omit), &opt, false), Some(Value::Int(3)));
        assert_eq!(check_value(&zero, true, Some(EmptyMode::Omit), &opt, false), None);
        assert_eq!(check_value(&zero, true, Some(EmptyMode::Omit), &opt, true), Some(zero.clone()));
        assert_eq!(check_value(&zero, true, Some(EmptyMode::Null), &opt, false), Some(Value::Null));
        assert_eq!(check_value(&zero, true, None, &opt, false), Some(zero.clone()));
    }

    #[test]
    fn present_option_is_never_empty() {
        let opt = Options::new().null_empty();
        let zero = Value::Int(0);
        assert_eq!(check_value(&zero, false, Some(EmptyMode::Omit), &opt, false), Some(zero.clone()));
        assert_eq!(check_value(&zero, false, None, &opt, false), Some(zero.clone()));

        let map = Fragment::Map(vec![MapEntry::new("age", &Some(0)), MapEntry::new("nick", &None::<&str>)]);
        let cols = sift(&map, &Options::new().omit_empty(), false);
        assert_eq!(cols, vec![Column { name: "age".into(), value: Value::Int(0) }]);
    }

    #[test]
    fn empty_fn_only_without_field_mode() {
        let opt = Options::new().empty_fn(|_| (Value::Text("beer".into()), false));
        let zero = Value::Int(0);
        assert_eq!(check_value(&zero, true, None, &opt, false), None);
        assert_eq!(check_value(&zero, true, None, &opt, true), Some(Value::Text("beer".into())));
        assert_eq!(check_value(&zero, true, Some(EmptyMode::Keep), &opt, false), Some(zero.clone()));
    }

    #[test]
    fn tag_tokens() {
        assert_eq!(
            FieldTag::parse("name,nullempty"),
            FieldTag { name: Some("name"), mode: Some(EmptyMode::Null), skip: false }
        );
        assert!(FieldTag::parse("-").skip);
        assert_eq!(FieldTag::parse(",keepempty").name, None);
    }
}
