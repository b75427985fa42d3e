//! # Crystal Scenarios
//!
//! A scenario is what the caller hands to the crystallizer: a name, tags, a
//! pure function from run index to envelope, and the invariants its result
//! must satisfy. Scenarios are assembled with [`CrystalScenarioBuilder`] and
//! are read-only afterwards.

use serde_json::Value;

use crate::dispatch::Envelope;
use crate::invariant::{Invariant, InvariantError};

type EnvelopeGenerator = dyn Fn(u32) -> Envelope + Send + Sync;

/// Caller-supplied description of one crystallizable interaction.
pub struct CrystalScenario {
    name: String,
    description: String,
    tags: Vec<String>,
    envelope_generator: Box<EnvelopeGenerator>,
    invariants: Vec<Invariant>,
    result_validation: Option<Invariant>,
}

impl CrystalScenario {
    /// Start building a scenario named `name` whose run `i` sends
    /// `envelope_generator(i)`.
    pub fn builder<F>(name: impl Into<String>, envelope_generator: F) -> CrystalScenarioBuilder
    where
        F: Fn(u32) -> Envelope + Send + Sync + 'static,
    {
        CrystalScenarioBuilder {
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            envelope_generator: Box::new(envelope_generator),
            invariants: Vec::new(),
            result_validation: None,
        }
    }

    /// Scenario name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Scenario tags, in insertion order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// The envelope for run `run_index`.
    pub fn envelope(&self, run_index: u32) -> Envelope {
        (self.envelope_generator)(run_index)
    }

    /// Scenario invariants followed by the result validator, if any.
    pub fn checks(&self) -> impl Iterator<Item = &Invariant> {
        self.invariants.iter().chain(self.result_validation.as_ref())
    }
}

impl std::fmt::Debug for CrystalScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrystalScenario")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("invariants", &self.invariants)
            .field("validates_result", &self.result_validation.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`CrystalScenario`].
pub struct CrystalScenarioBuilder {
    name: String,
    description: String,
    tags: Vec<String>,
    envelope_generator: Box<EnvelopeGenerator>,
    invariants: Vec<Invariant>,
    result_validation: Option<Invariant>,
}

impl CrystalScenarioBuilder {
    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append one tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Append several tags.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Add an invariant, evaluated after the built-in ones.
    pub fn invariant(mut self, invariant: Invariant) -> Self {
        self.invariants.push(invariant);
        self
    }

    /// Validate the reference result; recorded as `INV-CUSTOM-RESULT`.
    ///
    /// Calling this twice replaces the earlier validator.
    pub fn validate_result<F>(mut self, validate: F) -> Self
    where
        F: Fn(&Value) -> Result<bool, InvariantError> + Send + Sync + 'static,
    {
        self.result_validation = Some(Invariant::result_validation(validate));
        self
    }

    /// Finish.
    pub fn build(self) -> CrystalScenario {
        CrystalScenario {
            name: self.name,
            description: self.description,
            tags: self.tags,
            envelope_generator: self.envelope_generator,
            invariants: self.invariants,
            result_validation: self.result_validation,
        }
    }
}
