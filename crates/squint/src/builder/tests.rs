use std::collections::{BTreeMap, HashMap};

use super::*;
use crate::fragment::{Field, Record, ToFragment, bind};
use crate::options::{EmptyMode, Placeholder};
use crate::{build, frags, when};

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn check(b: &Builder, want_sql: &str, want_binds: Vec<Value>, fragments: Vec<Fragment>) {
    let (sql, binds) = b.build(fragments);
    assert_eq!(sql, want_sql);
    assert_eq!(binds, want_binds);
}

struct Row {
    id: i64,
    size: &'static str,
    rating: i64,
}

impl Record for Row {
    fn fields(&self) -> Vec<Field> {
        vec![
            Field::value("ID", &[], Value::Int(self.id)),
            Field::value("Size", &[], text(self.size)),
            Field::value("Rating", &[("db", "omitempty")], Value::Int(self.rating)),
        ]
    }
}

impl ToFragment for Row {
    fn to_fragment(&self) -> Fragment {
        Fragment::Record(self.fields())
    }
}

#[derive(Default)]
struct Rec {
    name: String,
    num: i64,
    flag: bool,
}

impl Record for Rec {
    fn fields(&self) -> Vec<Field> {
        vec![
            Field::value("Name", &[], text(&self.name)),
            Field::value("Num", &[], Value::Int(self.num)),
            Field::value("Flag", &[], Value::Bool(self.flag)),
        ]
    }
}

impl ToFragment for Rec {
    fn to_fragment(&self) -> Fragment {
        Fragment::Record(self.fields())
    }
}

#[test]
fn basic_text_and_binds() {
    let b = Builder::new();
    check(&b, "", vec![], frags![]);
    check(&b, "foo", vec![], frags!["foo"]);
    check(&b, "hello world", vec![], frags!["hello", "world"]);
    check(&b, "hello world", vec![], frags!["hello ", "world"]);
    check(&b, "hello ?", vec![text("world")], frags!["hello", bind("world")]);
    check(&b, "SELECT ?", vec![Value::Bool(true)], frags!["SELECT", true]);
    check(
        &b,
        "SELECT IFNULL( ?, ? )",
        vec![Value::Int(10), Value::Bool(false)],
        frags!["SELECT IFNULL(", 10, false, ")"],
    );
}

#[test]
fn options_bind_or_recurse() {
    let b = Builder::new();
    let world = String::from("world");
    check(&b, "hello ?", vec![text("world")], frags!["hello", Some(&world)]);
    check(&b, "SELECT ?", vec![Value::Bool(true)], frags!["SELECT", Some(true)]);
    check(&b, "a = ?", vec![Value::Null], frags!["a =", None::<i32>]);
    check(
        &b,
        "IN ( ?, ? )",
        vec![Value::Int(1), Value::Int(10)],
        frags!["IN", Some([1, 10])],
    );

    let mut h = HashMap::new();
    h.insert("id", 10);
    check(&b, "WHERE id = ?", vec![Value::Int(10)], frags!["WHERE", Some(&h)]);
}

#[test]
fn record_where_clause() {
    let fields = vec![
        Field::value("ID", &[], Value::Int(10)),
        Field::value("Name", &[("db", "name")], text("Frank")),
        Field::value("Secret", &[("db", "-")], Value::Bool(true)),
        Field::hidden("wealth"),
        Field::value("Status", &[], Value::Array(vec![Value::Int(2), Value::Int(4)])),
    ];
    check(
        &Builder::new(),
        "SELECT * FROM users WHERE ID = ? AND name = ? AND Status IN ( ?, ? )",
        vec![Value::Int(10), text("Frank"), Value::Int(2), Value::Int(4)],
        vec!["SELECT * FROM users WHERE".to_fragment(), Fragment::Record(fields)],
    );
}

#[test]
fn embedded_records() {
    let person = || {
        vec![
            Field::value("First", &[], text("Frank")),
            Field::value("Last", &[], text("Gallagher")),
        ]
    };

    let embed = vec![
        Field::value("ID", &[], Value::Int(10)),
        Field::embedded("person", &[], person()),
    ];
    check(
        &Builder::new(),
        "WHERE ID = ? AND First = ? AND Last = ?",
        vec![Value::Int(10), text("Frank"), text("Gallagher")],
        vec!["WHERE".to_fragment(), Fragment::Record(embed)],
    );

    let skipped = vec![
        Field::value("ID", &[], Value::Int(10)),
        Field::embedded("person", &[("db", "-")], person()),
    ];
    check(
        &Builder::new(),
        "WHERE ID = ?",
        vec![Value::Int(10)],
        vec!["WHERE".to_fragment(), Fragment::Record(skipped)],
    );
}

#[test]
fn map_where_clause_with_list() {
    let mut h: HashMap<&str, Value> = HashMap::new();
    h.insert("rating", Value::from(vec![Value::Int(4), Value::Int(5)]));
    h.insert("active", Value::Bool(true));
    check(
        &Builder::new(),
        "SELECT * FROM flavors WHERE active = ? AND rating IN ( ?, ? )",
        vec![Value::Bool(true), Value::Int(4), Value::Int(5)],
        frags!["SELECT * FROM flavors WHERE", h],
    );
}

#[test]
fn map_order_is_independent_of_insertion() {
    let b = Builder::new();
    let mut a = HashMap::new();
    a.insert("b", 2);
    a.insert("a", 1);
    a.insert("c", 3);
    let mut z = BTreeMap::new();
    z.insert("c", 3);
    z.insert("a", 1);
    z.insert("b", 2);

    let left = build!(b, "WHERE", a);
    let right = build!(b, "WHERE", z);
    assert_eq!(left, right);
    assert_eq!(left.0, "WHERE a = ? AND b = ? AND c = ?");
}

#[test]
fn in_lists() {
    let b = Builder::new();
    check(&b, "IN ( NULL )", vec![], frags!["IN", Vec::<i32>::new()]);
    check(
        &b,
        "WHERE id IN ( ?, ?, ? )",
        vec![Value::Int(10), Value::Int(20), Value::Int(30)],
        frags!["WHERE id IN", vec![10, 20, 30]],
    );
    check(
        &b,
        "WHERE id IN ( ?, ? )",
        vec![Value::Int(1), Value::Int(2)],
        frags!["WHERE id IN", [1, 2]],
    );
    check(
        &b,
        "WHERE name in ( ?, ? )",
        vec![text("a"), text("b")],
        frags!["WHERE name in", ["a", "b"]],
    );
}

#[test]
fn groups_and_directives_inside_in_lists() {
    let b = Builder::new();
    check(
        &b,
        "WHERE id IN ( ? )",
        vec![Value::Int(2)],
        frags!["WHERE id IN", [when!(false, 1), when!(true, 2)]],
    );
    check(&b, "WHERE id IN ( NULL )", vec![], frags!["WHERE id IN", [when!(false, 1)]]);
    check(
        &b,
        "WHERE id IN ( ?, ? )",
        vec![Value::Int(3), Value::Int(4)],
        frags!["WHERE id IN", [Some(when!(true, 3, 4))]],
    );
    check(
        &b,
        "WHERE id IN ( $1, $2 )",
        vec![Value::Int(7), Value::Int(8)],
        frags![
            "WHERE id IN",
            vec![
                Opt::Placeholder(Placeholder::Dollar).to_fragment(),
                7_i32.to_fragment(),
                8_i32.to_fragment(),
            ]
        ],
    );
}

#[test]
fn sequences_outside_in_are_inlined() {
    check(
        &Builder::new(),
        "SELECT * FROM t JOIN u ON a = ?",
        vec![Value::Int(1)],
        frags!["SELECT * FROM t JOIN", vec!["u ON a ="], 1],
    );
}

#[test]
fn insert_record_and_map() {
    let b = Builder::new();
    let mut h: BTreeMap<&str, Value> = BTreeMap::new();
    h.insert("id", Value::Int(10));
    h.insert("size", text("large"));

    check(
        &b,
        "INSERT IGNORE INTO junk ( id, size ) VALUES ( ?, ? )",
        vec![Value::Int(10), text("large")],
        frags!["INSERT IGNORE INTO junk", h],
    );
    check(
        &b,
        "INSERT INTO junk SET id = ?, size = ?",
        vec![Value::Int(10), text("large")],
        frags!["INSERT INTO junk SET", h],
    );
    check(
        &b,
        "INSERT INTO junk ( ID, Size ) VALUES ( ?, ? )",
        vec![Value::Int(5), text("small")],
        frags!["INSERT INTO junk", Row { id: 5, size: "small", rating: 0 }],
    );
}

#[test]
fn multi_row_insert_keeps_all_columns() {
    let rows = vec![
        Row { id: 1, size: "small", rating: 0 },
        Row { id: 2, size: "medium", rating: 1 },
    ];
    check(
        &Builder::new(),
        "INSERT INTO junk ( ID, Size, Rating ) VALUES ( ?, ?, ? ), ( ?, ?, ? )",
        vec![
            Value::Int(1),
            text("small"),
            Value::Int(0),
            Value::Int(2),
            text("medium"),
            Value::Int(1),
        ],
        frags!["INSERT INTO junk", rows],
    );
}

#[test]
fn multi_row_insert_skips_rows_without_columns() {
    let rows = vec![
        Row { id: 1, size: "small", rating: 0 }.to_fragment(),
        5_i32.to_fragment(),
        Row { id: 2, size: "medium", rating: 1 }.to_fragment(),
    ];
    let (sql, binds) = Builder::new().build(frags!["INSERT INTO junk", rows]);
    assert_eq!(sql, "INSERT INTO junk ( ID, Size, Rating ) VALUES ( ?, ?, ? ), ( ?, ?, ? )");
    assert_eq!(binds.len(), 6);
}

#[test]
fn insert_with_no_columns_emits_nothing() {
    let b = Builder::new().option(Opt::OmitEmpty);
    check(&b, "INSERT INTO junk", vec![], frags!["INSERT INTO junk", Rec::default()]);
    check(&b, "INSERT INTO junk", vec![], frags!["INSERT INTO junk", Vec::<Row>::new()]);
}

#[test]
fn set_clause() {
    let b = Builder::new();
    let mut h = BTreeMap::new();
    h.insert("is_active", Value::Bool(false));
    h.insert("status", text("retired"));
    check(
        &b,
        "UPDATE table SET is_active = ?, status = ? WHERE id = ?",
        vec![Value::Bool(false), text("retired"), Value::Int(10)],
        frags!["UPDATE table SET", h, "WHERE id =", 10],
    );

    let rec = vec![
        Field::value("Active", &[("db", "is_active")], Value::Bool(false)),
        Field::value("Status", &[("db", "status")], text("retired")),
    ];
    check(
        &b,
        "UPDATE table SET is_active = ?, status = ? WHERE id = ?",
        vec![Value::Bool(false), text("retired"), Value::Int(10)],
        vec![
            "UPDATE table SET".to_fragment(),
            Fragment::Record(rec),
            "WHERE id =".to_fragment(),
            10_i32.to_fragment(),
        ],
    );
}

#[test]
fn has_values_by_policy() {
    let empty_person = vec![
        Field::value("Name", &[], text("")),
        Field::value("Age", &[], Value::Int(0)),
    ];
    let mut name = HashMap::new();
    name.insert("name", "");
    let mut nothing = HashMap::new();
    nothing.insert("foo", None::<bool>);
    let empties = [
        name.to_fragment(),
        nothing.to_fragment(),
        Fragment::Record(empty_person),
    ];
    let no_keys = HashMap::<String, i32>::new().to_fragment();

    for (opt, expect) in [(Opt::KeepEmpty, true), (Opt::OmitEmpty, false), (Opt::NullEmpty, true)] {
        let b = Builder::new().option(opt);
        for f in &empties {
            assert_eq!(b.has_values(f), expect);
        }
        assert!(!b.has_values(&no_keys));
    }

    let b = Builder::new().option(Opt::OmitEmpty);
    let mut age = HashMap::new();
    age.insert("age", 10);
    assert!(b.has_values(&"hello".to_fragment()));
    assert!(b.has_values(&age.to_fragment()));
    assert!(b.has_values(&Fragment::Record(vec![
        Field::value("Name", &[], text("Frank")),
        Field::value("Age", &[], Value::Int(0)),
    ])));
}

#[test]
fn conditional_groups() {
    let b = Builder::new();
    check(&b, "foo", vec![], frags!["foo", b.when(false, frags!["bar"])]);
    check(&b, "foo bar", vec![], frags!["foo", b.when(true, frags!["bar"])]);
    check(&b, "SELECT ?", vec![Value::Int(20)], frags!["SELECT", when!(false, 10), 20]);
    check(
        &b,
        "SELECT ?, ?",
        vec![Value::Int(10), Value::Int(20)],
        frags!["SELECT", when!(true, 10), 20],
    );
    check(
        &b,
        "a",
        vec![],
        frags!["a", when!(false, "b", when!(true, "c"))],
    );
}

#[test]
fn empty_policies_after_set() {
    let rec = Rec::default();

    let keep = Builder::new().option(Opt::KeepEmpty);
    check(
        &keep,
        "SET Name = ?, Num = ?, Flag = ?",
        vec![text(""), Value::Int(0), Value::Bool(false)],
        frags!["SET", rec],
    );

    let omit = Builder::new().option(Opt::OmitEmpty);
    check(&omit, "SET", vec![], frags!["SET", rec]);

    let null = Builder::new().option(Opt::NullEmpty);
    check(
        &null,
        "SET Name = ?, Num = ?, Flag = ?",
        vec![Value::Null, Value::Null, Value::Null],
        frags!["SET", rec],
    );
}

#[test]
fn field_tags_beat_builder_policy() {
    let rec = Fragment::Record(vec![
        Field::value("Name", &[("db", "omitempty")], text("")),
        Field::value("Num", &[("db", "nullempty")], Value::Int(0)),
        Field::value("Flag", &[("db", "keepempty")], Value::Bool(false)),
    ]);

    let mut b = Builder::new();
    for opt in [Opt::KeepEmpty, Opt::OmitEmpty, Opt::NullEmpty] {
        b.set_option(opt);
        check(
            &b,
            "SET Num = ?, Flag = ?",
            vec![Value::Null, Value::Bool(false)],
            vec!["SET".to_fragment(), rec.clone()],
        );
    }
}

#[test]
fn custom_empty_fn() {
    let mut b = Builder::new().option(Opt::empty_fn(|_| (text("beer"), true)));
    assert!(b.options().empty_fn.is_some());
    check(
        &b,
        "SELECT Name = ? AND Num = ? AND Flag = ?",
        vec![text("beer"), text("beer"), text("beer")],
        frags!["SELECT", Rec::default()],
    );

    b.set_option(Opt::empty_fn(|v| match v {
        Value::Text(_) => (v.clone(), false),
        _ => (v.clone(), true),
    }));
    check(
        &b,
        "SELECT Num = ? AND Flag = ?",
        vec![Value::Int(0), Value::Bool(false)],
        frags!["SELECT", Rec::default()],
    );

    b.set_option(Opt::DefaultEmpty);
    assert!(b.options().empty_fn.is_none());
    assert_eq!(b.options().empty, EmptyMode::Keep);
    check(
        &b,
        "SELECT Name = ? AND Num = ? AND Flag = ?",
        vec![text(""), Value::Int(0), Value::Bool(false)],
        frags!["SELECT", Rec::default()],
    );
}

#[test]
fn inline_directives_do_not_leak() {
    let b = Builder::new();
    let rec = Rec::default();
    check(&b, "SET", vec![], frags![Opt::OmitEmpty, "SET", rec]);
    check(
        &b,
        "SET Name = ?, Num = ?, Flag = ?",
        vec![text(""), Value::Int(0), Value::Bool(false)],
        frags!["SET", rec],
    );
    assert_eq!(b.options().empty, EmptyMode::Keep);
}

#[test]
fn custom_tag_key() {
    let rec = Fragment::Record(vec![
        Field::value("Name", &[("db", "db_name"), ("sql", "sql_name")], text("x")),
    ]);
    let b = Builder::new().option(Opt::tag("sql"));
    check(&b, "WHERE sql_name = ?", vec![text("x")], vec!["WHERE".to_fragment(), rec.clone()]);
    let b = Builder::new().option(Opt::tag(""));
    check(&b, "WHERE Name = ?", vec![text("x")], vec!["WHERE".to_fragment(), rec]);
}

#[test]
fn dollar_placeholders_number_across_clauses() {
    let b = Builder::new().option(Opt::Placeholder(Placeholder::Dollar));
    let mut h = BTreeMap::new();
    h.insert("a", Value::Int(1));
    h.insert("b", Value::from(vec![Value::Int(2), Value::Int(3)]));
    let (sql, binds) = build!(b, "SELECT * FROM t WHERE", h, "LIMIT", 10);
    assert_eq!(sql, "SELECT * FROM t WHERE a = $1 AND b IN ( $2, $3 ) LIMIT $4");
    assert_eq!(binds.len(), 4);
}

#[test]
fn every_placeholder_style_matches_bind_count() {
    let styles = [
        Placeholder::Question,
        Placeholder::Dollar,
        Placeholder::Colon,
        Placeholder::AtP,
        Placeholder::custom(|n| format!("{{{n}}}")),
    ];
    for style in styles {
        let marker = style.render(1);
        let b = Builder::new().option(Opt::Placeholder(style));
        let rows = vec![
            Row { id: 1, size: "s", rating: 0 },
            Row { id: 2, size: "m", rating: 3 },
        ];
        let (sql, binds) = build!(b, "INSERT INTO junk", rows, "ON CONFLICT DO NOTHING");
        assert_eq!(binds.len(), 6);
        assert!(sql.contains(&marker));
        let count = if marker == "?" {
            sql.matches('?').count()
        } else {
            (1..=binds.len())
                .filter(|n| sql.contains(&b.options().placeholder.render(*n)))
                .count()
        };
        assert_eq!(count, binds.len());
    }
}

#[test]
fn inline_placeholder_directive() {
    let b = Builder::new();
    let (sql, _) = build!(b, Opt::Placeholder(Placeholder::AtP), "SELECT", 1, 2);
    assert_eq!(sql, "SELECT @p1, @p2");
    let (sql, _) = build!(b, "SELECT", 1);
    assert_eq!(sql, "SELECT ?");
}
