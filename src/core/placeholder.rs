//! Placeholder substitution
//!
//! Configuration values may embed tokens such as `[[PIPELINE_NAME]]`. A
//! [`TokenContext`] maps each token to its replacement and the [`Substitute`]
//! trait walks strings and nested structures, replacing every known token in a
//! single left-to-right pass. Tokens missing from the context are left as-is
//! so that deferred tokens survive an early pass.

use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::LazyLock;

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[[^\[\]]*\]\]").expect("token pattern is valid"));

/// Wrap an identifier in token brackets: `NAME` -> `[[NAME]]`
pub fn token(name: &str) -> String {
    format!("[[{}]]", name)
}

/// Return every bracketed token left in `text`, in order of appearance
pub fn find_tokens(text: &str) -> Vec<String> {
    TOKEN_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Flat token -> replacement mapping
///
/// Layers are applied with [`TokenContext::layer`]; on key collision the
/// later layer wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenContext {
    tokens: BTreeMap<String, String>,
}

impl TokenContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single token, replacing any previous value
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        self.tokens.insert(token.into(), value.into());
    }

    /// Apply a layer of tokens on top of the current ones
    pub fn layer<I, K, V>(&mut self, layer: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in layer {
            self.insert(key, value);
        }
    }

    /// Builder-style variant of [`TokenContext::layer`]
    pub fn with_layer<I, K, V>(mut self, layer: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.layer(layer);
        self
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.tokens.get(token).map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tokens.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Prepare a resolver over this context
    pub fn resolver(&self) -> PlaceholderResolver<'_> {
        PlaceholderResolver::new(self)
    }

    /// Resolve `value` against this context
    pub fn resolve<T: Substitute>(&self, value: &T) -> T {
        value.substitute(&self.resolver())
    }
}

/// Single-pass substitution over a borrowed [`TokenContext`]
///
/// Replacement values are inserted verbatim and never rescanned, so a value
/// that itself contains a token is not expanded further.
#[derive(Debug)]
pub struct PlaceholderResolver<'a> {
    context: &'a TokenContext,
    /// Longest tokens first so that overlapping keys match greedily
    ordered: Vec<(&'a str, &'a str)>,
}

impl<'a> PlaceholderResolver<'a> {
    pub fn new(context: &'a TokenContext) -> Self {
        let mut ordered: Vec<(&str, &str)> = context
            .tokens
            .iter()
            .filter(|(k, _)| !k.is_empty())
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
        Self { context, ordered }
    }

    pub fn context(&self) -> &TokenContext {
        self.context
    }

    /// Replace every known token in `text`
    pub fn resolve_str(&self, text: &str) -> String {
        if self.ordered.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(ch) = rest.chars().next() {
            match self.ordered.iter().find(|(key, _)| rest.starts_with(key)) {
                Some((key, value)) => {
                    out.push_str(value);
                    rest = &rest[key.len()..];
                }
                None => {
                    out.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
            }
        }
        out
    }
}

/// Structural substitution: strings are rewritten, containers recurse
/// preserving shape (and map keys)
pub trait Substitute: Sized {
    fn substitute(&self, resolver: &PlaceholderResolver<'_>) -> Self;
}

/// Resolve `value` against `context`
pub fn resolve<T: Substitute>(value: &T, context: &TokenContext) -> T {
    context.resolve(value)
}

impl Substitute for String {
    fn substitute(&self, resolver: &PlaceholderResolver<'_>) -> Self {
        resolver.resolve_str(self)
    }
}

impl Substitute for PathBuf {
    fn substitute(&self, resolver: &PlaceholderResolver<'_>) -> Self {
        PathBuf::from(resolver.resolve_str(&self.to_string_lossy()))
    }
}

impl<T: Substitute> Substitute for Option<T> {
    fn substitute(&self, resolver: &PlaceholderResolver<'_>) -> Self {
        self.as_ref().map(|v| v.substitute(resolver))
    }
}

impl<T: Substitute> Substitute for Vec<T> {
    fn substitute(&self, resolver: &PlaceholderResolver<'_>) -> Self {
        self.iter().map(|v| v.substitute(resolver)).collect()
    }
}

impl<K: Clone + Ord, T: Substitute> Substitute for BTreeMap<K, T> {
    fn substitute(&self, resolver: &PlaceholderResolver<'_>) -> Self {
        self.iter()
            .map(|(k, v)| (k.clone(), v.substitute(resolver)))
            .collect()
    }
}

impl<K: Clone + Eq + std::hash::Hash, T: Substitute> Substitute for HashMap<K, T> {
    fn substitute(&self, resolver: &PlaceholderResolver<'_>) -> Self {
        self.iter()
            .map(|(k, v)| (k.clone(), v.substitute(resolver)))
            .collect()
    }
}

impl Substitute for Value {
    fn substitute(&self, resolver: &PlaceholderResolver<'_>) -> Self {
        match self {
            Value::String(s) => Value::String(resolver.resolve_str(s)),
            Value::Array(items) => Value::Array(items.substitute(resolver)),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.substitute(resolver)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}
