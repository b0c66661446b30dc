//! Conversion of author-supplied check arguments into typed values.
//!
//! Question authors type arguments into free-text form fields, so every raw
//! value arrives loosely typed. The declared [`ParamType`] of each parameter
//! decides how it is coerced before the check sees it.

use std::collections::BTreeMap;

use graphchecker_types::{GraderError, Result};

use crate::catalog::{ParamSpec, ParamType};
use crate::preprocess::Preprocess;

/// A converted argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument<G> {
    Integer(i64),
    StringList(Vec<String>),
    Graph(G),
    /// Value of an undeclared-conversion type, passed through unchanged.
    Raw(serde_json::Value),
}

/// Typed arguments handed to a check, keyed by parameter name.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments<G> {
    values: BTreeMap<String, Argument<G>>,
}

impl<G> Default for Arguments<G> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

fn type_error(param: &str, expected: &str, value: impl ToString) -> GraderError {
    GraderError::ArgumentType {
        param: param.to_string(),
        expected: expected.to_string(),
        value: value.to_string(),
    }
}

impl<G> Arguments<G> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Argument<G>) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Argument<G>> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn require(&self, name: &str) -> Result<&Argument<G>> {
        self.values.get(name).ok_or_else(|| GraderError::MissingArgument {
            param: name.to_string(),
        })
    }

    pub fn integer(&self, name: &str) -> Result<i64> {
        match self.require(name)? {
            Argument::Integer(i) => Ok(*i),
            Argument::Raw(v) => parse_integer(name, v),
            _ => Err(type_error(name, "integer", "a non-integer argument")),
        }
    }

    pub fn string_list(&self, name: &str) -> Result<&[String]> {
        match self.require(name)? {
            Argument::StringList(items) => Ok(items),
            _ => Err(type_error(name, "string_list", "a non-list argument")),
        }
    }

    pub fn graph(&self, name: &str) -> Result<&G> {
        match self.require(name)? {
            Argument::Graph(g) => Ok(g),
            _ => Err(type_error(name, "graph", "a non-graph argument")),
        }
    }

    /// A pass-through argument that holds a JSON string.
    pub fn text(&self, name: &str) -> Result<&str> {
        match self.require(name)? {
            Argument::Raw(serde_json::Value::String(s)) => Ok(s),
            Argument::Raw(other) => Err(type_error(name, "string", other)),
            _ => Err(type_error(name, "string", "a converted argument")),
        }
    }

    pub fn raw(&self, name: &str) -> Result<&serde_json::Value> {
        match self.require(name)? {
            Argument::Raw(v) => Ok(v),
            _ => Err(type_error(name, "raw value", "a converted argument")),
        }
    }
}

/// Parse a raw value as a base-10 integer.
pub fn parse_integer(param: &str, value: &serde_json::Value) -> Result<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().ok_or_else(|| type_error(param, "integer", n)),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| type_error(param, "integer", value)),
        other => Err(type_error(param, "integer", other)),
    }
}

/// Split a free-text list, trying newline, then comma, then space.
///
/// The first delimiter that produces more than one element wins; otherwise
/// the input is a single-element list.
pub fn split_string_list(raw: &str) -> Vec<String> {
    let mut items: Vec<&str> = raw.split('\n').collect();
    if items.len() == 1 {
        items = items[0].split(',').collect();
    }
    if items.len() == 1 {
        items = items[0].split(' ').collect();
    }
    items.into_iter().map(String::from).collect()
}

fn convert_one<G>(
    spec: &ParamSpec,
    value: &serde_json::Value,
    preprocessor: &dyn Preprocess<G>,
) -> Result<Argument<G>> {
    let name = spec.param.as_str();
    match &spec.param_type {
        ParamType::Integer => parse_integer(name, value).map(Argument::Integer),
        ParamType::StringList => match value {
            serde_json::Value::String(s) => Ok(Argument::StringList(split_string_list(s))),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => Ok(s.clone()),
                    other => Err(type_error(name, "string_list", other)),
                })
                .collect::<Result<Vec<_>>>()
                .map(Argument::StringList),
            other => Err(type_error(name, "string_list", other)),
        },
        ParamType::Graph => match value {
            serde_json::Value::String(s) => preprocessor.preprocess(s).map(Argument::Graph),
            serde_json::Value::Object(_) => preprocessor
                .preprocess(&value.to_string())
                .map(Argument::Graph),
            other => Err(type_error(name, "graph", other)),
        },
        ParamType::Other(_) => Ok(Argument::Raw(value.clone())),
    }
}

/// Convert every raw argument according to its declared parameter type.
///
/// Arguments not declared in `params` are rejected with
/// [`GraderError::ArgumentSchema`]. Declared parameters that were not
/// supplied are simply absent from the result.
pub fn convert<G>(
    raw: &BTreeMap<String, serde_json::Value>,
    params: &[ParamSpec],
    preprocessor: &dyn Preprocess<G>,
) -> Result<Arguments<G>> {
    let mut converted = Arguments::new();
    for (name, value) in raw {
        let spec = params
            .iter()
            .find(|p| &p.param == name)
            .ok_or_else(|| GraderError::ArgumentSchema {
                param: name.clone(),
            })?;
        converted.insert(name.clone(), convert_one(spec, value, preprocessor)?);
    }
    Ok(converted)
}
