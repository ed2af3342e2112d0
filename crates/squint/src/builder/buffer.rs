/// Accumulates SQL text, joining pieces with single spaces.
///
/// Consecutive placeholders are comma-separated so that `( ?, ?, ? )` falls out
/// of pushing three binds between two parens.
#[derive(Debug, Default)]
pub(crate) struct SqlBuf {
    text: String,
    after_bind: bool,
}

impl SqlBuf {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append literal SQL.
    pub(crate) fn push(&mut self, sql: &str) {
        if sql.is_empty() {
            return;
        }
        self.join(sql);
        self.after_bind = false;
    }

    /// Append a rendered placeholder.
    pub(crate) fn push_bind(&mut self, token: &str) {
        if self.after_bind {
            self.text.push_str(", ");
            self.text.push_str(token);
        } else {
            self.join(token);
        }
        self.after_bind = true;
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.text
    }

    pub(crate) fn into_string(self) -> String {
        self.text
    }

    fn join(&mut self, sql: &str) {
        let spaced = match (self.text.chars().next_back(), sql.chars().next()) {
            (Some(last), Some(first)) => {
                first != ',' && !first.is_whitespace() && !last.is_whitespace()
            }
            _ => false,
        };
        if spaced {
            self.text.push(' ');
        }
        self.text.push_str(sql);
    }
}
