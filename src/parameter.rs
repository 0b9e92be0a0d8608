//! Search-space definitions and typed parameter access.
//!
//! Every parameter has a name, a type, and bounds. A [`SearchSpace`]
//! collects them; the study validates each sampled or enqueued assignment
//! against the space before a trial is created, so an out-of-range value
//! surfaces as [`Error::ParameterConstraint`] and never reaches an
//! objective.
//!
//! # Example
//!
//! ```
//! use hyperstudy::parameter::{BoolParam, CategoricalParam, FloatParam, IntParam, SearchSpace};
//!
//! let lr = FloatParam::new("learning_rate", 1e-4, 1e-1).log_scale();
//! let units = IntParam::new("n_units", 32, 512).step(32);
//! let optimizer = CategoricalParam::new("optimizer", ["sgd", "adam"]);
//! let dropout = BoolParam::new("dropout");
//!
//! let space = SearchSpace::new()
//!     .with(&lr)
//!     .with(&units)
//!     .with(&optimizer)
//!     .with(&dropout);
//! assert_eq!(space.len(), 4);
//! assert!(space.validate().is_ok());
//! ```

use core::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::distribution::{
    CategoricalDistribution, Distribution, FloatDistribution, IntDistribution,
};
use crate::error::{Error, Result};
use crate::param::{ParamValue, Params};

/// A named parameter with a typed value.
pub trait Parameter: Debug {
    /// The typed value read back from a trial.
    type Value;

    /// The parameter name used as the key in [`Params`].
    fn name(&self) -> &str;

    /// Returns the distribution that this parameter samples from.
    fn distribution(&self) -> Distribution;

    /// Converts a raw [`ParamValue`] into the typed value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterConstraint`] if the variant doesn't match
    /// what this parameter expects.
    fn cast_param_value(&self, param_value: &ParamValue) -> Result<Self::Value>;

    /// Looks this parameter up in an assignment and casts it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterConstraint`] if the parameter is missing or
    /// has the wrong type.
    fn get(&self, params: &Params) -> Result<Self::Value> {
        let value = params
            .get(self.name())
            .ok_or_else(|| Error::ParameterConstraint {
                name: self.name().to_string(),
                reason: "missing from the assignment".to_string(),
            })?;
        self.cast_param_value(value)
    }
}

fn type_mismatch(name: &str, expected: &str, got: &ParamValue) -> Error {
    Error::ParameterConstraint {
        name: name.to_string(),
        reason: format!("expected a {expected} value, got {}", got.kind()),
    }
}

/// A floating-point parameter with optional log-scale and step size.
#[derive(Clone, Debug)]
pub struct FloatParam {
    name: String,
    low: f64,
    high: f64,
    log_scale: bool,
    step: Option<f64>,
}

impl FloatParam {
    /// Creates a new float parameter with the given bounds (inclusive).
    #[must_use]
    pub fn new(name: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            name: name.into(),
            low,
            high,
            log_scale: false,
            step: None,
        }
    }

    /// Enables log-scale sampling.
    #[must_use]
    pub fn log_scale(mut self) -> Self {
        self.log_scale = true;
        self
    }

    /// Sets a step size for discretized sampling.
    #[must_use]
    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }
}

impl Parameter for FloatParam {
    type Value = f64;

    fn name(&self) -> &str {
        &self.name
    }

    fn distribution(&self) -> Distribution {
        Distribution::Float(FloatDistribution {
            low: self.low,
            high: self.high,
            log_scale: self.log_scale,
            step: self.step,
        })
    }

    fn cast_param_value(&self, param_value: &ParamValue) -> Result<f64> {
        param_value
            .as_f64()
            .ok_or_else(|| type_mismatch(&self.name, "float", param_value))
    }
}

/// An integer parameter with optional log-scale and step size.
#[derive(Clone, Debug)]
pub struct IntParam {
    name: String,
    low: i64,
    high: i64,
    log_scale: bool,
    step: Option<i64>,
}

impl IntParam {
    /// Creates a new integer parameter with the given bounds (inclusive).
    #[must_use]
    pub fn new(name: impl Into<String>, low: i64, high: i64) -> Self {
        Self {
            name: name.into(),
            low,
            high,
            log_scale: false,
            step: None,
        }
    }

    /// Enables log-scale sampling.
    #[must_use]
    pub fn log_scale(mut self) -> Self {
        self.log_scale = true;
        self
    }

    /// Sets a step size for discretized sampling.
    #[must_use]
    pub fn step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }
}

impl Parameter for IntParam {
    type Value = i64;

    fn name(&self) -> &str {
        &self.name
    }

    fn distribution(&self) -> Distribution {
        Distribution::Int(IntDistribution {
            low: self.low,
            high: self.high,
            log_scale: self.log_scale,
            step: self.step,
        })
    }

    fn cast_param_value(&self, param_value: &ParamValue) -> Result<i64> {
        param_value
            .as_i64()
            .ok_or_else(|| type_mismatch(&self.name, "int", param_value))
    }
}

/// A categorical parameter that selects one label from a list of choices.
#[derive(Clone, Debug)]
pub struct CategoricalParam {
    name: String,
    choices: Vec<String>,
}

impl CategoricalParam {
    /// Creates a new categorical parameter.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }
}

impl Parameter for CategoricalParam {
    type Value = String;

    fn name(&self) -> &str {
        &self.name
    }

    fn distribution(&self) -> Distribution {
        Distribution::Categorical(CategoricalDistribution {
            choices: self.choices.clone(),
        })
    }

    fn cast_param_value(&self, param_value: &ParamValue) -> Result<String> {
        param_value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| type_mismatch(&self.name, "categorical", param_value))
    }
}

/// A boolean parameter.
#[derive(Clone, Debug)]
pub struct BoolParam {
    name: String,
}

impl BoolParam {
    /// Creates a new boolean parameter.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Parameter for BoolParam {
    type Value = bool;

    fn name(&self) -> &str {
        &self.name
    }

    fn distribution(&self) -> Distribution {
        Distribution::Bool
    }

    fn cast_param_value(&self, param_value: &ParamValue) -> Result<bool> {
        param_value
            .as_bool()
            .ok_or_else(|| type_mismatch(&self.name, "bool", param_value))
    }
}

/// The declared parameter space of a study.
///
/// Parameters keep their declaration order, which is the order samplers see
/// them in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSpace {
    params: Vec<(String, Distribution)>,
}

impl SearchSpace {
    /// Creates an empty search space.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, replacing any earlier parameter with the same name.
    #[must_use]
    pub fn with<P: Parameter>(mut self, param: &P) -> Self {
        self.insert(param.name().to_string(), param.distribution());
        self
    }

    /// Adds a raw distribution under `name`.
    pub fn insert(&mut self, name: impl Into<String>, distribution: Distribution) {
        let name = name.into();
        if let Some(slot) = self.params.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = distribution;
        } else {
            self.params.push((name, distribution));
        }
    }

    /// Returns the distribution registered for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Distribution> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    /// Iterates over `(name, distribution)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Distribution)> {
        self.params.iter().map(|(n, d)| (n.as_str(), d))
    }

    /// Number of declared parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if no parameter is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Validates every distribution in the space.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found.
    pub fn validate(&self) -> Result<()> {
        self.params.iter().try_for_each(|(_, d)| d.validate())
    }

    /// Checks a complete assignment against the space.
    ///
    /// Every declared parameter must be present with an admissible value,
    /// and no undeclared parameter may appear.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterConstraint`] for the first violation.
    pub fn check(&self, params: &Params) -> Result<()> {
        for (name, dist) in &self.params {
            let value = params
                .get(name)
                .ok_or_else(|| Error::ParameterConstraint {
                    name: name.clone(),
                    reason: "missing from the assignment".to_string(),
                })?;
            dist.check(name, value)?;
        }
        if let Some(extra) = params.keys().find(|k| self.get(k).is_none()) {
            return Err(Error::ParameterConstraint {
                name: extra.clone(),
                reason: "not declared in the search space".to_string(),
            });
        }
        Ok(())
    }
}
