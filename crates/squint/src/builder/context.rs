use std::sync::OnceLock;

use regex::Regex;

/// Where the next fragment lands, judged from the SQL emitted so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SqlContext {
    Base,
    /// Right after `INSERT [modifiers] INTO table`.
    Insert,
    /// Right after `SET`.
    Set,
    /// Right after `IN`.
    In,
}

fn insert_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(INSERT|REPLACE)\s+(?:\w+\s+)*INTO\s+\S+\s*$")
            .expect("invalid built-in insert regex")
    })
}

fn set_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bSET\s*$").expect("invalid built-in set regex"))
}

fn in_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bIN\s*$").expect("invalid built-in in regex"))
}

impl SqlContext {
    pub(crate) fn detect(sql: &str) -> Self {
        if insert_re().is_match(sql) {
            Self::Insert
        } else if set_re().is_match(sql) {
            Self::Set
        } else if in_re().is_match(sql) {
            Self::In
        } else {
            Self::Base
        }
    }
}
