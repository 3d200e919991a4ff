//! Transformation token parsing.
//!
//! Each raw token is one transformation request in the compact form
//! `name:key=value,key=value,...` — for example
//! `smartSize:width=200,height=100,poi=120,80,crop=close`.
//!
//! Parsing never fails. Anything malformed degrades to missing keys and
//! is caught later by per-operation validation, so a garbled token can
//! never take the whole request down on its own.
//!
//! Values may themselves contain commas (`poi=120,80`): a comma segment
//! without `=` is treated as a continuation of the preceding value and
//! re-joined. A bare segment with nothing before it contributes nothing
//! and is silently dropped.

use serde::Serialize;
use std::collections::BTreeMap;

/// One parsed transformation request: a name plus its raw parameters.
///
/// Immutable once built. Duplicate names in a request are allowed and
/// each becomes an independent pipeline stage, applied in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformationDescriptor {
    pub name: String,
    pub parameters: BTreeMap<String, String>,
}

impl TransformationDescriptor {
    /// Raw string value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }
}

/// The ordered sequence of descriptors derived from one request.
pub type Chain = Vec<TransformationDescriptor>;

/// Parse one raw transformation token.
pub fn parse_transformation(raw: &str) -> TransformationDescriptor {
    let (name, params) = match raw.split_once(':') {
        Some((name, params)) => (name, params),
        None => (raw, ""),
    };

    let mut parameters = BTreeMap::new();
    let mut last_key: Option<String> = None;

    for segment in params.split(',') {
        match segment.split_once('=') {
            Some((key, value)) => {
                parameters.insert(key.to_string(), value.to_string());
                last_key = Some(key.to_string());
            }
            None => {
                // Continuation of the previous value (e.g. the y half of
                // poi=120,80); with no previous key it is dropped.
                if !segment.is_empty()
                    && let Some(value) = last_key.as_ref().and_then(|k| parameters.get_mut(k))
                {
                    value.push(',');
                    value.push_str(segment);
                }
            }
        }
    }

    TransformationDescriptor {
        name: name.to_string(),
        parameters,
    }
}

/// Parse an ordered list of raw tokens into a chain.
pub fn parse_chain<I, S>(raw: I) -> Chain
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .map(|token| parse_transformation(token.as_ref()))
        .collect()
}
