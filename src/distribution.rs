//! Parameter distribution types.
//!
//! A [`Distribution`] describes the admissible values of one parameter:
//! its type, bounds, and discretization. The study checks every sampled or
//! enqueued value against its distribution before a trial is created.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::param::ParamValue;

/// Distribution for floating-point parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatDistribution {
    /// Lower bound (inclusive).
    pub low: f64,
    /// Upper bound (inclusive).
    pub high: f64,
    /// Whether to sample in log space.
    pub log_scale: bool,
    /// Optional step size for discretization.
    pub step: Option<f64>,
}

/// Distribution for integer parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntDistribution {
    /// Lower bound (inclusive).
    pub low: i64,
    /// Upper bound (inclusive).
    pub high: i64,
    /// Whether to sample in log space.
    pub log_scale: bool,
    /// Optional step size for discretization.
    pub step: Option<i64>,
}

/// Distribution for categorical parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoricalDistribution {
    /// The admissible labels.
    pub choices: Vec<String>,
}

/// Enum wrapping all parameter distribution types.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Distribution {
    /// A floating-point distribution.
    Float(FloatDistribution),
    /// An integer distribution.
    Int(IntDistribution),
    /// A categorical distribution.
    Categorical(CategoricalDistribution),
    /// A boolean parameter.
    Bool,
}

/// Relative tolerance used when checking float step alignment.
const STEP_TOLERANCE: f64 = 1e-9;

impl Distribution {
    /// Validates the distribution configuration itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`], [`Error::InvalidLogBounds`],
    /// [`Error::InvalidStep`], or [`Error::EmptyChoices`].
    #[allow(clippy::cast_precision_loss)]
    pub fn validate(&self) -> Result<()> {
        match self {
            Distribution::Float(d) => {
                if !d.low.is_finite() || !d.high.is_finite() || d.low > d.high {
                    return Err(Error::InvalidBounds {
                        low: d.low,
                        high: d.high,
                    });
                }
                if d.log_scale && d.low <= 0.0 {
                    return Err(Error::InvalidLogBounds);
                }
                if let Some(step) = d.step
                    && (!step.is_finite() || step <= 0.0)
                {
                    return Err(Error::InvalidStep);
                }
            }
            Distribution::Int(d) => {
                if d.low > d.high {
                    return Err(Error::InvalidBounds {
                        low: d.low as f64,
                        high: d.high as f64,
                    });
                }
                if d.log_scale && d.low < 1 {
                    return Err(Error::InvalidLogBounds);
                }
                if let Some(step) = d.step
                    && step <= 0
                {
                    return Err(Error::InvalidStep);
                }
            }
            Distribution::Categorical(d) => {
                if d.choices.is_empty() {
                    return Err(Error::EmptyChoices);
                }
            }
            Distribution::Bool => {}
        }
        Ok(())
    }

    /// Checks that `value` has the right type and lies inside this distribution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterConstraint`] naming `name` when the value
    /// has the wrong type, is out of bounds, or is off the step grid.
    pub fn check(&self, name: &str, value: &ParamValue) -> Result<()> {
        let violation = |reason: String| Error::ParameterConstraint {
            name: name.to_string(),
            reason,
        };

        match (self, value) {
            (Distribution::Float(d), ParamValue::Float(v)) => {
                if !v.is_finite() || *v < d.low || *v > d.high {
                    return Err(violation(format!(
                        "{v} is outside [{}, {}]",
                        d.low, d.high
                    )));
                }
                if let Some(step) = d.step {
                    let k = (v - d.low) / step;
                    if (k - k.round()).abs() > STEP_TOLERANCE * k.abs().max(1.0) {
                        return Err(violation(format!("{v} is not on the step-{step} grid")));
                    }
                }
                Ok(())
            }
            (Distribution::Int(d), ParamValue::Int(v)) => {
                if *v < d.low || *v > d.high {
                    return Err(violation(format!(
                        "{v} is outside [{}, {}]",
                        d.low, d.high
                    )));
                }
                if let Some(step) = d.step
                    && (i128::from(*v) - i128::from(d.low)) % i128::from(step) != 0
                {
                    return Err(violation(format!("{v} is not on the step-{step} grid")));
                }
                Ok(())
            }
            (Distribution::Categorical(d), ParamValue::Categorical(v)) => {
                if d.choices.iter().any(|c| c == v) {
                    Ok(())
                } else {
                    Err(violation(format!("'{v}' is not one of {:?}", d.choices)))
                }
            }
            (Distribution::Bool, ParamValue::Bool(_)) => Ok(()),
            (dist, value) => Err(violation(format!(
                "expected a {} value, got {}",
                dist.kind(),
                value.kind()
            ))),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Distribution::Float(_) => "float",
            Distribution::Int(_) => "int",
            Distribution::Categorical(_) => "categorical",
            Distribution::Bool => "bool",
        }
    }
}
