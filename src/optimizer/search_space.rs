//! Grid search space definition for hyperparameters

use crate::error::{CurveError, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

use super::grid::Combinations;

/// A single candidate value for a hyperparameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Explicit "no value" (e.g. unlimited depth)
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    /// Get as float (integers are widened)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Get as non-negative integer (integral floats are accepted)
    pub fn as_usize(&self) -> Option<usize> {
        match self {
            ParamValue::Int(v) if *v >= 0 => Some(*v as usize),
            ParamValue::Float(v) if *v >= 0.0 && v.fract() == 0.0 => Some(*v as usize),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ParamValue::None)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::None => write!(f, "none"),
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ParamValue::None, Into::into)
    }
}

/// Ordered mapping from hyperparameter name to its candidate values.
///
/// Declaration order is significant: it fixes the enumeration order of
/// [`SearchSpace::combinations`] and therefore tie-breaking during model
/// selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSpace {
    params: Vec<(String, Vec<ParamValue>)>,
}

impl SearchSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter with its candidate values.
    /// Re-adding an existing name replaces its candidates in place.
    pub fn add<V: Into<ParamValue>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let name = name.into();
        let values: Vec<ParamValue> = values.into_iter().map(Into::into).collect();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = values,
            None => self.params.push((name, values)),
        }
        self
    }

    /// Load a search space from a JSON object, keeping key order
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let space: SearchSpace = serde_json::from_str(text)?;
        space.validate()?;
        Ok(space)
    }

    /// Every parameter must have at least one candidate
    pub fn validate(&self) -> Result<()> {
        if let Some((name, _)) = self.params.iter().find(|(_, values)| values.is_empty()) {
            return Err(CurveError::InvalidParameter {
                name: name.clone(),
                value: "[]".to_string(),
                reason: "candidate list must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Lazily enumerate the full Cartesian product
    pub fn combinations(&self) -> Result<Combinations<'_>> {
        self.validate()?;
        Combinations::new(self)
    }

    /// Number of configurations in the grid (product of list lengths)
    pub fn n_combinations(&self) -> usize {
        self.params.iter().map(|(_, v)| v.len()).product()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(n, _)| n.as_str())
    }

    pub(crate) fn params(&self) -> &[(String, Vec<ParamValue>)] {
        &self.params
    }
}

impl Serialize for SearchSpace {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.params.len()))?;
        for (name, values) in &self.params {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SearchSpace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SpaceVisitor;

        impl<'de> Visitor<'de> for SpaceVisitor {
            type Value = SearchSpace;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from parameter name to a list of candidate values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<SearchSpace, A::Error> {
                let mut params: Vec<(String, Vec<ParamValue>)> = Vec::new();
                while let Some((name, values)) = access.next_entry::<String, Vec<ParamValue>>()? {
                    if params.iter().any(|(n, _)| *n == name) {
                        return Err(serde::de::Error::custom(format!("duplicate parameter '{}'", name)));
                    }
                    params.push((name, values));
                }
                Ok(SearchSpace { params })
            }
        }

        deserializer.deserialize_map(SpaceVisitor)
    }
}

/// One point of the grid: exactly one value per parameter, in space order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    values: Vec<(String, ParamValue)>,
}

impl Configuration {
    pub fn new(values: Vec<(String, ParamValue)>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        write!(f, "}}")
    }
}
