//! Trial records and their lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::param::{ParamValue, Params};
use crate::parameter::Parameter;
use crate::types::TrialState;

/// A trial represents a single parameter assignment and its evolving result.
///
/// A trial starts [`Running`](TrialState::Running) with an empty report
/// history and no values. It then takes exactly one terminal transition:
/// [`complete`](Self::complete), [`prune`](Self::prune),
/// [`fail`](Self::fail), or [`abandon`](Self::abandon). Once terminal, every
/// mutating call returns [`Error::InvalidState`].
///
/// The study stores trials in an arena and hands out clones as snapshots,
/// so a `Trial` value you hold is a point-in-time copy.
///
/// # Examples
///
/// ```
/// use hyperstudy::{Params, Trial, TrialState};
///
/// let mut trial = Trial::new(0, Params::new());
/// trial.report(1, 0.5).unwrap();
/// trial.report(2, 0.4).unwrap();
/// trial.complete(vec![0.35], 1).unwrap();
///
/// assert_eq!(trial.state(), TrialState::Complete);
/// assert_eq!(trial.values(), Some(&[0.35][..]));
/// assert!(trial.report(3, 0.3).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    id: u64,
    params: Params,
    state: TrialState,
    #[serde(with = "non_finite::values")]
    values: Option<Vec<f64>>,
    #[serde(with = "non_finite::reports")]
    intermediate_reports: Vec<(u64, f64)>,
    created_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fail_reason: Option<String>,
}

impl Trial {
    /// Creates a new running trial with the given id and parameters.
    #[must_use]
    pub fn new(id: u64, params: Params) -> Self {
        Self {
            id,
            params,
            state: TrialState::Running,
            values: None,
            intermediate_reports: Vec::new(),
            created_at: Utc::now(),
            finished_at: None,
            fail_reason: None,
        }
    }

    /// Returns the unique ID of this trial.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the current state of this trial.
    #[must_use]
    pub fn state(&self) -> TrialState {
        self.state
    }

    /// Returns the parameter assignment.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns the raw value of one parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Returns the typed value of `param`, if it is part of this trial.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterConstraint`] if the parameter is missing
    /// or was stored with a different type.
    pub fn get<P: Parameter>(&self, param: &P) -> Result<P::Value> {
        param.get(&self.params)
    }

    /// Returns the final objective values, present only when complete.
    #[must_use]
    pub fn values(&self) -> Option<&[f64]> {
        self.values.as_deref()
    }

    /// Returns the first objective value, present only when complete.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.values.as_ref().and_then(|v| v.first().copied())
    }

    /// Returns all `(step, value)` reports in the order they were made.
    #[must_use]
    pub fn intermediate_reports(&self) -> &[(u64, f64)] {
        &self.intermediate_reports
    }

    /// Returns the value reported at exactly `step`, if any.
    #[must_use]
    pub fn report_at(&self, step: u64) -> Option<f64> {
        self.intermediate_reports
            .binary_search_by_key(&step, |&(s, _)| s)
            .ok()
            .map(|i| self.intermediate_reports[i].1)
    }

    /// Returns the most recent report step.
    #[must_use]
    pub fn last_step(&self) -> Option<u64> {
        self.intermediate_reports.last().map(|&(s, _)| s)
    }

    /// When the trial was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the trial reached a terminal state.
    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// The reason passed to [`fail`](Self::fail).
    #[must_use]
    pub fn fail_reason(&self) -> Option<&str> {
        self.fail_reason.as_deref()
    }

    /// Wall-clock duration of a finished trial.
    #[must_use]
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.created_at)
    }

    fn require_running(&self, operation: &'static str) -> Result<()> {
        if self.state == TrialState::Running {
            Ok(())
        } else {
            Err(Error::InvalidState {
                trial_id: self.id,
                state: self.state,
                operation,
            })
        }
    }

    fn finish(&mut self, state: TrialState) {
        self.state = state;
        self.finished_at = Some(Utc::now());
    }

    /// Appends an intermediate `(step, value)` report.
    ///
    /// Returns the updated report history.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] if the trial is not running.
    /// - [`Error::NonMonotonicStep`] if `step` does not exceed the last step.
    /// - [`Error::InvalidValue`] if `value` is NaN.
    pub fn report(&mut self, step: u64, value: f64) -> Result<&[(u64, f64)]> {
        self.require_running("report")?;
        if let Some(last_step) = self.last_step()
            && step <= last_step
        {
            return Err(Error::NonMonotonicStep {
                trial_id: self.id,
                step,
                last_step,
            });
        }
        if value.is_nan() {
            return Err(Error::InvalidValue(value));
        }
        self.intermediate_reports.push((step, value));
        Ok(&self.intermediate_reports)
    }

    /// Records the final objective values and marks the trial complete.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] if the trial is not running.
    /// - [`Error::ValueCountMismatch`] if `values.len() != n_objectives`.
    /// - [`Error::InvalidValue`] if any value is NaN.
    pub fn complete(&mut self, values: Vec<f64>, n_objectives: usize) -> Result<()> {
        self.require_running("complete")?;
        if values.len() != n_objectives {
            return Err(Error::ValueCountMismatch {
                expected: n_objectives,
                got: values.len(),
            });
        }
        if let Some(&nan) = values.iter().find(|v| v.is_nan()) {
            return Err(Error::InvalidValue(nan));
        }
        self.values = Some(values);
        self.finish(TrialState::Complete);
        Ok(())
    }

    /// Marks the trial pruned. No final values are recorded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the trial is not running.
    pub fn prune(&mut self) -> Result<()> {
        self.require_running("prune")?;
        self.finish(TrialState::Pruned);
        Ok(())
    }

    /// Marks the trial failed, recording why the objective errored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the trial is not running.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        self.require_running("fail")?;
        self.fail_reason = Some(reason.into());
        self.finish(TrialState::Failed);
        Ok(())
    }

    /// Marks a trial that was still running at shutdown.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the trial is not running.
    pub fn abandon(&mut self) -> Result<()> {
        self.require_running("abandon")?;
        self.finish(TrialState::Abandoned);
        Ok(())
    }
}

/// JSON has no literal for infinities or NaN, so these encode them as the
/// strings `"inf"`, `"-inf"` and `"NaN"`. Finite numbers stay plain numbers.
mod non_finite {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Number {
        Finite(f64),
        Tagged(String),
    }

    impl From<f64> for Number {
        fn from(value: f64) -> Self {
            if value.is_finite() {
                Number::Finite(value)
            } else if value.is_nan() {
                Number::Tagged("NaN".to_string())
            } else if value > 0.0 {
                Number::Tagged("inf".to_string())
            } else {
                Number::Tagged("-inf".to_string())
            }
        }
    }

    impl Number {
        fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
            match self {
                Number::Finite(v) => Ok(v),
                Number::Tagged(tag) => match tag.as_str() {
                    "inf" => Ok(f64::INFINITY),
                    "-inf" => Ok(f64::NEG_INFINITY),
                    "NaN" => Ok(f64::NAN),
                    other => Err(E::custom(format!("invalid number '{other}'"))),
                },
            }
        }
    }

    pub(super) mod values {
        use super::{Deserialize, Deserializer, Number, Serialize, Serializer};

        #[allow(clippy::ref_option)]
        pub(crate) fn serialize<S: Serializer>(
            values: &Option<Vec<f64>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            values
                .as_ref()
                .map(|vs| vs.iter().map(|&v| Number::from(v)).collect::<Vec<_>>())
                .serialize(serializer)
        }

        pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Vec<f64>>, D::Error> {
            Option::<Vec<Number>>::deserialize(deserializer)?
                .map(|vs| vs.into_iter().map(Number::into_f64).collect())
                .transpose()
        }
    }

    pub(super) mod reports {
        use super::{Deserialize, Deserializer, Number, Serialize, Serializer};

        pub(crate) fn serialize<S: Serializer>(
            reports: &[(u64, f64)],
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            reports
                .iter()
                .map(|&(step, v)| (step, Number::from(v)))
                .collect::<Vec<_>>()
                .serialize(serializer)
        }

        pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<(u64, f64)>, D::Error> {
            Vec::<(u64, Number)>::deserialize(deserializer)?
                .into_iter()
                .map(|(step, v)| v.into_f64().map(|v| (step, v)))
                .collect()
        }
    }
}
