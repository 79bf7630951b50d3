//! Signature inspection.
//!
//! Methods declare their parameter table up front (required names, keyword
//! names with defaults, variadic capture) instead of being introspected, so
//! every check here is a pure read of that table.

use crate::error::{ConfigReason, ConfigurationError};
use crate::method::MethodDescriptor;
use crate::value::Value;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Signature {
    required: Vec<String>,
    keywords: Vec<(String, Value)>,
    var_positional: bool,
    var_keyword: bool,
}

impl Signature {
    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn keywords(&self) -> &[(String, Value)] {
        &self.keywords
    }

    pub fn keyword_names(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|(name, _)| name.as_str())
    }

    pub fn default_for(&self, name: &str) -> Option<&Value> {
        self.keywords
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, default)| default)
    }

    pub fn has_var_positional(&self) -> bool {
        self.var_positional
    }

    pub fn has_var_keyword(&self) -> bool {
        self.var_keyword
    }

    /// Whether `count` positional arguments fit this signature.
    pub fn accepts_positional(&self, count: usize) -> bool {
        if self.var_positional {
            count >= self.required.len()
        } else {
            count == self.required.len()
        }
    }

    pub(crate) fn push_required(&mut self, name: String) {
        self.required.push(name);
    }

    pub(crate) fn push_keyword(&mut self, name: String, default: Value) {
        if let Some(slot) = self.keywords.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = default;
        } else {
            self.keywords.push((name, default));
        }
    }

    pub(crate) fn set_var_positional(&mut self) {
        self.var_positional = true;
    }

    pub(crate) fn set_var_keyword(&mut self) {
        self.var_keyword = true;
    }
}

/// Parameter classes of a method.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification<'a> {
    pub required: &'a [String],
    pub keyword_defaults: &'a [(String, Value)],
    pub has_var_positional: bool,
    pub has_var_keyword: bool,
}

pub fn classify(method: &MethodDescriptor) -> Classification<'_> {
    let sig = method.signature();
    Classification {
        required: sig.required(),
        keyword_defaults: sig.keywords(),
        has_var_positional: sig.has_var_positional(),
        has_var_keyword: sig.has_var_keyword(),
    }
}

/// A constructor takes keyword parameters with defaults and nothing else.
pub fn check_constructor_shape(method: &MethodDescriptor) -> Result<(), ConfigurationError> {
    let shape = classify(method);
    let detail = if !shape.required.is_empty() {
        Some(format!(
            "has positional parameters {}",
            shape.required.join(", ")
        ))
    } else if shape.has_var_positional {
        Some("has variadic positional parameters".to_string())
    } else if shape.has_var_keyword {
        Some("has variadic keyword parameters".to_string())
    } else {
        None
    };
    match detail {
        Some(detail) => Err(ConfigurationError::new(
            method.owner(),
            ConfigReason::BadConstructorShape { detail },
        )),
        None => Ok(()),
    }
}

/// A finalizer takes no parameters at all.
pub fn check_finalizer_shape(method: &MethodDescriptor) -> Result<(), ConfigurationError> {
    let shape = classify(method);
    if shape.required.is_empty()
        && shape.keyword_defaults.is_empty()
        && !shape.has_var_positional
        && !shape.has_var_keyword
    {
        return Ok(());
    }
    Err(ConfigurationError::new(
        method.owner(),
        ConfigReason::BadFinalizerShape {
            detail: "has parameters".to_string(),
        },
    ))
}
