//! Builder configuration and inline option directives.

use std::fmt;
use std::sync::Arc;

use tracing::Level;

use crate::value::Value;

/// What to do with a zero value found while expanding a record or map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyMode {
    /// Bind the zero value as is.
    #[default]
    Keep,
    /// Drop the column.
    Omit,
    /// Bind `NULL` instead.
    Null,
}

impl EmptyMode {
    /// Parses a per-field tag token (`keepempty`, `omitempty`, `nullempty`).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "keepempty" => Some(Self::Keep),
            "omitempty" => Some(Self::Omit),
            "nullempty" => Some(Self::Null),
            _ => None,
        }
    }
}

/// Custom empty-value handler: receives a zero value and returns the value to
/// bind plus whether to keep the column at all.
pub type EmptyFn = Arc<dyn Fn(&Value) -> (Value, bool) + Send + Sync>;

/// Placeholder style used for every bind in a build.
#[derive(Clone, Default)]
pub enum Placeholder {
    /// `?`
    #[default]
    Question,
    /// `$1`, `$2`, ...
    Dollar,
    /// `:1`, `:2`, ...
    Colon,
    /// `@p1`, `@p2`, ...
    AtP,
    /// Any renderer taking the 1-based bind position.
    Custom(Arc<dyn Fn(usize) -> String + Send + Sync>),
}

impl Placeholder {
    pub fn custom(f: impl Fn(usize) -> String + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Render the placeholder for the bind at `position` (1-based).
    pub fn render(&self, position: usize) -> String {
        match self {
            Placeholder::Question => "?".to_string(),
            Placeholder::Dollar => format!("${position}"),
            Placeholder::Colon => format!(":{position}"),
            Placeholder::AtP => format!("@p{position}"),
            Placeholder::Custom(f) => f(position),
        }
    }
}

impl fmt::Debug for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Question => f.write_str("Question"),
            Placeholder::Dollar => f.write_str("Dollar"),
            Placeholder::Colon => f.write_str("Colon"),
            Placeholder::AtP => f.write_str("AtP"),
            Placeholder::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Configuration for a [`Builder`](crate::Builder).
///
/// Every `build` call works on its own copy, so inline [`Opt`] directives only
/// affect the call they appear in.
///
/// ```
/// use squint::{Options, Placeholder};
///
/// let opts = Options::new()
///     .tag("sql")
///     .omit_empty()
///     .placeholder(Placeholder::Dollar)
///     .log(true);
/// assert_eq!(opts.tag, "sql");
/// ```
#[derive(Clone)]
pub struct Options {
    /// Attribute key holding column names and empty-value tokens.
    /// An empty tag disables tag reading.
    pub tag: String,
    /// Default empty-value policy.
    pub empty: EmptyMode,
    /// Custom empty-value handler, consulted before `empty` for fields
    /// without their own policy.
    pub empty_fn: Option<EmptyFn>,
    pub placeholder: Placeholder,
    /// Log the built SQL text.
    pub log_query: bool,
    /// Log the bind list.
    pub log_binds: bool,
    /// Level for the two log channels above.
    pub log_level: Level,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tag: "db".to_string(),
            empty: EmptyMode::Keep,
            empty_fn: None,
            placeholder: Placeholder::Question,
            log_query: false,
            log_binds: false,
            log_level: Level::INFO,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("tag", &self.tag)
            .field("empty", &self.empty)
            .field("empty_fn", &self.empty_fn.as_ref().map(|_| ".."))
            .field("placeholder", &self.placeholder)
            .field("log_query", &self.log_query)
            .field("log_binds", &self.log_binds)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn keep_empty(self) -> Self {
        self.empty_mode(EmptyMode::Keep)
    }

    pub fn omit_empty(self) -> Self {
        self.empty_mode(EmptyMode::Omit)
    }

    pub fn null_empty(self) -> Self {
        self.empty_mode(EmptyMode::Null)
    }

    /// Set the default empty-value policy. Clears any custom handler.
    pub fn empty_mode(mut self, mode: EmptyMode) -> Self {
        self.empty = mode;
        self.empty_fn = None;
        self
    }

    pub fn empty_fn(
        mut self,
        f: impl Fn(&Value) -> (Value, bool) + Send + Sync + 'static,
    ) -> Self {
        self.empty_fn = Some(Arc::new(f));
        self
    }

    /// Back to the stock policy: keep zero values, no custom handler.
    pub fn default_empty(self) -> Self {
        self.empty_mode(EmptyMode::Keep)
    }

    pub fn placeholder(mut self, placeholder: Placeholder) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Toggle both log channels.
    pub fn log(mut self, on: bool) -> Self {
        self.log_query = on;
        self.log_binds = on;
        self
    }

    pub fn log_query(mut self, on: bool) -> Self {
        self.log_query = on;
        self
    }

    pub fn log_binds(mut self, on: bool) -> Self {
        self.log_binds = on;
        self
    }

    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Apply one directive in place.
    pub fn apply(&mut self, opt: &Opt) {
        match opt {
            Opt::Tag(tag) => self.tag.clone_from(tag),
            Opt::KeepEmpty => self.set_mode(EmptyMode::Keep),
            Opt::OmitEmpty => self.set_mode(EmptyMode::Omit),
            Opt::NullEmpty => self.set_mode(EmptyMode::Null),
            Opt::EmptyFn(f) => self.empty_fn = Some(Arc::clone(f)),
            Opt::DefaultEmpty => self.set_mode(EmptyMode::Keep),
            Opt::Placeholder(p) => self.placeholder = p.clone(),
            Opt::Log(on) => {
                self.log_query = *on;
                self.log_binds = *on;
            }
            Opt::LogQuery(on) => self.log_query = *on,
            Opt::LogBinds(on) => self.log_binds = *on,
            Opt::LogLevel(level) => self.log_level = *level,
        }
    }

    fn set_mode(&mut self, mode: EmptyMode) {
        self.empty = mode;
        self.empty_fn = None;
    }
}

/// A configuration change. Applied to a builder with
/// [`Builder::option`](crate::Builder::option), or passed inline among the
/// fragments of one build.
#[derive(Clone)]
pub enum Opt {
    Tag(String),
    KeepEmpty,
    OmitEmpty,
    NullEmpty,
    EmptyFn(EmptyFn),
    /// Reset the empty-value policy to keep with no custom handler.
    DefaultEmpty,
    Placeholder(Placeholder),
    Log(bool),
    LogQuery(bool),
    LogBinds(bool),
    LogLevel(Level),
}

impl Opt {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag(tag.into())
    }

    pub fn empty_fn(f: impl Fn(&Value) -> (Value, bool) + Send + Sync + 'static) -> Self {
        Self::EmptyFn(Arc::new(f))
    }
}

impl fmt::Debug for Opt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opt::Tag(tag) => f.debug_tuple("Tag").field(tag).finish(),
            Opt::KeepEmpty => f.write_str("KeepEmpty"),
            Opt::OmitEmpty => f.write_str("OmitEmpty"),
            Opt::NullEmpty => f.write_str("NullEmpty"),
            Opt::EmptyFn(_) => f.write_str("EmptyFn(..)"),
            Opt::DefaultEmpty => f.write_str("DefaultEmpty"),
            Opt::Placeholder(p) => f.debug_tuple("Placeholder").field(p).finish(),
            Opt::Log(on) => f.debug_tuple("Log").field(on).finish(),
            Opt::LogQuery(on) => f.debug_tuple("LogQuery").field(on).finish(),
            Opt::LogBinds(on) => f.debug_tuple("LogBinds").field(on).finish(),
            Opt::LogLevel(level) => f.debug_tuple("LogLevel").field(level).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_styles() {
        assert_eq!(Placeholder::Question.render(3), "?");
        assert_eq!(Placeholder::Dollar.render(3), "$3");
        assert_eq!(Placeholder::Colon.render(1), ":1");
        assert_eq!(Placeholder::AtP.render(12), "@p12");
        assert_eq!(Placeholder::custom(|n| format!("#{n}")).render(2), "#2");
    }

    #[test]
    fn mode_directive_clears_handler() {
        let mut opts = Options::new().empty_fn(|v| (v.clone(), true));
        assert!(opts.empty_fn.is_some());

        opts.apply(&Opt::NullEmpty);
        assert_eq!(opts.empty, EmptyMode::Null);
        assert!(opts.empty_fn.is_none());

        opts.apply(&Opt::empty_fn(|_| (Value::Null, false)));
        opts.apply(&Opt::DefaultEmpty);
        assert_eq!(opts.empty, EmptyMode::Keep);
        assert!(opts.empty_fn.is_none());
    }

    #[test]
    fn log_toggles_both_channels() {
        let mut opts = Options::new();
        opts.apply(&Opt::Log(true));
        assert!(opts.log_query && opts.log_binds);
        opts.apply(&Opt::LogBinds(false));
        assert!(opts.log_query && !opts.log_binds);
    }
}
