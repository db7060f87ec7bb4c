//! Selector classification for locator strategies.
//!
//! Candidate strings come in three shapes:
//!
//! - path expressions (XPath), marked by a leading `//`, `(/` or `./`
//! - the `tag:contains('text')` pseudo-selector, which no browser supports
//!   natively and is rewritten into `//tag[contains(text(), 'text')]`
//! - everything else, treated as a CSS selector

use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed locator strategy
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Selector {
    /// CSS selector (e.g., "input[type='time']")
    Css(String),
    /// XPath expression
    XPath(String),
    /// Text pseudo-selector resolved into a path expression at query time
    ContainsText {
        /// Element tag, `*` when the pseudo-selector had none
        tag: String,
        /// Literal text the element must contain
        text: String,
        /// The raw candidate as written
        raw: String,
    },
}

impl Selector {
    /// Classify a raw candidate string
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_path_expression(trimmed) {
            return Self::XPath(trimmed.to_string());
        }
        if let Some((tag, text)) = parse_contains(trimmed) {
            return Self::ContainsText {
                tag,
                text,
                raw: trimmed.to_string(),
            };
        }
        Self::Css(trimmed.to_string())
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Whether this selector is evaluated as a path expression
    #[must_use]
    pub const fn is_path(&self) -> bool {
        !matches!(self, Self::Css(_))
    }

    /// The expression handed to the browser: CSS text for `Css`, XPath otherwise
    #[must_use]
    pub fn source(&self) -> String {
        match self {
            Self::Css(s) | Self::XPath(s) => s.clone(),
            Self::ContainsText { tag, text, .. } => {
                format!("//{tag}[contains(text(), {})]", xpath_literal(text))
            }
        }
    }

    /// The candidate string as it was written
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Css(s) | Self::XPath(s) => s,
            Self::ContainsText { raw, .. } => raw,
        }
    }

    /// JavaScript expression evaluating to the number of matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        let source = js_string(&self.source());
        if self.is_path() {
            format!(
                "document.evaluate({source}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength"
            )
        } else {
            format!("document.querySelectorAll({source}).length")
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw())
    }
}

impl From<&str> for Selector {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl TryFrom<String> for Selector {
    type Error = crate::SlotCheckError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        if raw.trim().is_empty() {
            return Err(crate::SlotCheckError::config("empty selector"));
        }
        Ok(Self::parse(&raw))
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.raw().to_string()
    }
}

fn is_path_expression(s: &str) -> bool {
    s.starts_with("//") || s.starts_with("(/") || s.starts_with("./")
}

/// Split `tag:contains('text')` into `(tag, text)`
fn parse_contains(s: &str) -> Option<(String, String)> {
    let start = s.find(":contains(")?;
    let tag = &s[..start];
    let arg = s[start + ":contains(".len()..].strip_suffix(')')?;

    let quote = arg.chars().next()?;
    if quote != '\'' && quote != '"' {
        return None;
    }
    let text = arg.strip_prefix(quote)?.strip_suffix(quote)?;

    if !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return None;
    }
    let tag = if tag.is_empty() { "*" } else { tag };
    Some((tag.to_string(), text.to_string()))
}

/// Quote text as an XPath 1.0 string literal
fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{text}'");
    }
    if !text.contains('"') {
        return format!("\"{text}\"");
    }
    let parts: Vec<String> = text.split('\'').map(|p| format!("'{p}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// Quote text as a JavaScript string literal
pub(crate) fn js_string(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}
