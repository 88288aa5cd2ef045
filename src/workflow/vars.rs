//! Placeholder substitution for workflow documents and commands
//!
//! Two token styles are recognized:
//! - `<<name>>`: expanded over the raw document text before parsing
//! - `{{name}}`: expanded per command just before execution
//!
//! Both passes are literal and single-scan: replacement values are never
//! rescanned for further tokens, and tokens with no binding stay in the
//! text untouched.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static DOCUMENT_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<<([A-Za-z0-9_.\-]+)>>").unwrap());

static COMMAND_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z0-9_.\-]+)\}\}").unwrap());

/// Which token syntax a substitution pass scans for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStyle {
    /// `<<name>>`, applied document-wide before the YAML parse
    Document,
    /// `{{name}}`, applied to each command string at execution time
    Command,
}

impl TokenStyle {
    fn regex(&self) -> &'static Regex {
        match self {
            TokenStyle::Document => &DOCUMENT_TOKEN_REGEX,
            TokenStyle::Command => &COMMAND_TOKEN_REGEX,
        }
    }
}

/// Expand every bound token in `input`, leaving unbound tokens verbatim.
///
/// The scan walks the input once left to right, so a replacement value that
/// happens to contain token syntax is copied through as plain text.
pub fn substitute(input: &str, vars: &HashMap<String, String>, style: TokenStyle) -> String {
    let regex = style.regex();
    let mut result = String::with_capacity(input.len());
    let mut last_end = 0;

    for cap in regex.captures_iter(input) {
        let token = cap.get(0).unwrap();
        let name = cap.get(1).unwrap().as_str();

        result.push_str(&input[last_end..token.start()]);
        match vars.get(name) {
            Some(value) => result.push_str(value),
            None => result.push_str(token.as_str()),
        }
        last_end = token.end();
    }

    result.push_str(&input[last_end..]);
    result
}

/// Merge override bindings on top of workflow defaults. Overrides win.
pub fn merge_vars(
    overrides: &HashMap<String, String>,
    defaults: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
