use super::buffer::SqlBuf;
use super::context::SqlContext;
use super::sift::{Column, sift};
use crate::fragment::Fragment;
use crate::options::Options;
use crate::value::Value;

/// State of a single build call.
///
/// Owns a private copy of the builder's options so inline directives never
/// leak past the call.
pub(crate) struct Query {
    opt: Options,
    sql: SqlBuf,
    binds: Vec<Value>,
}

impl Query {
    pub(crate) fn new(opt: Options) -> Self {
        Self {
            opt,
            sql: SqlBuf::new(),
            binds: Vec::new(),
        }
    }

    pub(crate) fn options(&self) -> &Options {
        &self.opt
    }

    pub(crate) fn sql(&self) -> &str {
        self.sql.as_str()
    }

    pub(crate) fn binds(&self) -> &[Value] {
        &self.binds
    }

    pub(crate) fn finish(self) -> (String, Vec<Value>) {
        (self.sql.into_string(), self.binds)
    }

    pub(crate) fn add(&mut self, fragment: Fragment) {
        match fragment {
            Fragment::Value(v) => self.bind(v),
            Fragment::Group(cond) => {
                if cond.flag {
                    for f in cond.fragments {
                        self.add(f);
                    }
                }
            }
            Fragment::Directive(opt) => self.opt.apply(&opt),
            Fragment::Sql(s) => self.sql.push(&s),
            Fragment::Nullable(None) => self.bind(Value::Null),
            Fragment::Nullable(Some(inner)) => match *inner {
                Fragment::Sql(s) => self.bind(Value::Text(s)),
                other => self.add(other),
            },
            Fragment::Seq(items) => self.add_seq(items),
            record @ (Fragment::Record(_) | Fragment::Map(_)) => self.add_columns(&record),
        }
    }

    fn context(&self) -> SqlContext {
        SqlContext::detect(self.sql.as_str())
    }

    fn bind(&mut self, value: Value) {
        self.binds.push(value);
        let token = self.opt.placeholder.render(self.binds.len());
        self.sql.push_bind(&token);
    }

    fn bind_all(&mut self, cols: Vec<Column>) {
        for col in cols {
            self.bind(col.value);
        }
    }

    fn add_seq(&mut self, items: Vec<Fragment>) {
        match self.context() {
            SqlContext::In => self.add_in_list(items),
            SqlContext::Insert if items.first().is_some_and(Fragment::is_record) => {
                self.add_rows(items);
            }
            _ => {
                for f in items {
                    self.add(f);
                }
            }
        }
    }

    fn add_in_list(&mut self, items: Vec<Fragment>) {
        self.sql.push("(");
        let before = self.binds.len();
        self.add_in_items(items);
        if self.binds.len() == before {
            self.sql.push("NULL");
        }
        self.sql.push(")");
    }

    /// One bind per element. Groups and directives keep their meaning inside
    /// the list; records and maps have no single value and are skipped.
    fn add_in_items(&mut self, items: Vec<Fragment>) {
        for item in items {
            match item {
                Fragment::Group(cond) => {
                    if cond.flag {
                        self.add_in_items(cond.fragments);
                    }
                }
                Fragment::Directive(opt) => self.opt.apply(&opt),
                Fragment::Nullable(Some(inner))
                    if matches!(
                        *inner,
                        Fragment::Group(_) | Fragment::Directive(_) | Fragment::Record(_) | Fragment::Map(_)
                    ) =>
                {
                    self.add_in_items(vec![*inner]);
                }
                Fragment::Record(_) | Fragment::Map(_) => {
                    tracing::warn!(target: "squint.sql", "record or map inside an IN list skipped");
                }
                other => self.bind(other.into_value()),
            }
        }
    }

    /// Multi-row insert. Every row keeps all of its columns so the row shapes
    /// line up; column names come from the first row.
    fn add_rows(&mut self, rows: Vec<Fragment>) {
        let mut rows = rows.iter();
        let Some(first) = rows.next() else {
            return;
        };
        let cols = sift(first, &self.opt, true);
        if cols.is_empty() {
            return;
        }
        self.push_values_head(&cols);
        self.bind_all(cols);
        self.sql.push(")");

        for row in rows {
            let cols = sift(row, &self.opt, true);
            if cols.is_empty() {
                continue;
            }
            self.sql.push(",");
            self.sql.push("(");
            self.bind_all(cols);
            self.sql.push(")");
        }
    }

    fn push_values_head(&mut self, cols: &[Column]) {
        let names: Vec<&str> = cols.iter().map(|c| c.name.as_str()).collect();
        self.sql.push(&format!("( {} ) VALUES (", names.join(", ")));
    }

    fn add_columns(&mut self, fragment: &Fragment) {
        let cols = sift(fragment, &self.opt, false);
        match self.context() {
            SqlContext::Insert => {
                if !cols.is_empty() {
                    self.push_values_head(&cols);
                    self.bind_all(cols);
                    self.sql.push(")");
                }
            }
            SqlContext::Set => {
                for (i, col) in cols.into_iter().enumerate() {
                    if i > 0 {
                        self.sql.push(",");
                    }
                    self.sql.push(&format!("{} =", col.name));
                    self.bind(col.value);
                }
            }
            SqlContext::Base | SqlContext::In => {
                for (i, col) in cols.into_iter().enumerate() {
                    if i > 0 {
                        self.sql.push("AND");
                    }
                    match col.value {
                        Value::Array(items) => {
                            self.sql.push(&format!("{} IN", col.name));
                            self.add_in_list(items.into_iter().map(Fragment::Value).collect());
                        }
                        value => {
                            self.sql.push(&format!("{} =", col.name));
                            self.bind(value);
                        }
                    }
                }
            }
        }
    }
}
