//! # Crystallizer
//!
//! Drives a scenario through `N` determinism runs and `M` performance runs
//! and seals the outcome into a [`ProofCrystal`].
//!
//! ## Algorithm
//!
//! 1. Determinism runs `0..N`: fresh dispatcher, dispatch
//!    `envelope(i)`, record input/output/trace hashes, trace, result and
//!    duration.
//! 2. Prove determinism from the `N` hash triples.
//! 3. Performance runs `N..N+M`: fresh dispatcher, record duration only.
//!    Profile the `M` durations.
//! 4. Replay run 0's trace through a [`ChainBuilder`].
//! 5. Build and verify the causality matrix over that chain.
//! 6. Evaluate built-in, scenario, and result-validation invariants against
//!    run 0, each in isolation.
//! 7. Decide the verdict (invariants, then causality, then determinism, then
//!    the result's own `ok` flag).
//! 8. Seal every field with `crystalHash`.
//!
//! Runs are strictly sequential. Every duration and timestamp is read from
//! the injected clock, so the same clock sequence, registry, and scenario
//! always produce the same `crystalHash`.
//!
//! A dispatch error aborts the call; invariant failures never do.

use std::sync::Arc;

use serde_json::Value;

use crystal_core::{hash_object, hash_str, Clock, TraceRecord};
use crystal_crypto::ChainBuilder;
use crystal_stats::{profile, StatsError};

use crate::causality::{self, CausalityVerdict};
use crate::crystal::{CrystalBody, ProofCrystal, Verdict, PROTOCOL_VERSION};
use crate::determinism::{prove, DeterminismFingerprint, RunHashes};
use crate::dispatch::{outcome, Dispatcher, Envelope, HandlerRegistry};
use crate::error::CrystallizeError;
use crate::invariant::{builtin_invariants, InvariantCheck};
use crate::scenario::CrystalScenario;

/// Default number of determinism runs.
pub const DEFAULT_DETERMINISM_RUNS: u32 = 3;
/// Default number of performance runs.
pub const DEFAULT_PERFORMANCE_RUNS: u32 = 100;

/// Long-lived crystallizer configuration.
pub struct CrystallizerConfig<R> {
    /// Source of every timestamp and duration.
    pub clock: Arc<dyn Clock>,
    /// Builds one isolated dispatcher per run.
    pub registry: R,
    /// Runs compared for determinism. Fewer than two is never proven.
    pub determinism_runs: u32,
    /// Runs timed for the performance profile.
    pub performance_runs: u32,
    /// Tags placed before every scenario's own tags.
    pub default_tags: Vec<String>,
}

impl<R> CrystallizerConfig<R> {
    /// Configuration with default run counts and no default tags.
    pub fn new(clock: Arc<dyn Clock>, registry: R) -> Self {
        Self {
            clock,
            registry,
            determinism_runs: DEFAULT_DETERMINISM_RUNS,
            performance_runs: DEFAULT_PERFORMANCE_RUNS,
            default_tags: Vec::new(),
        }
    }

    /// Override the determinism run count.
    pub fn with_determinism_runs(mut self, runs: u32) -> Self {
        self.determinism_runs = runs;
        self
    }

    /// Override the performance run count.
    pub fn with_performance_runs(mut self, runs: u32) -> Self {
        self.performance_runs = runs;
        self
    }

    /// Set the default tags.
    pub fn with_default_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Per-call overrides of [`CrystallizerConfig`] run counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrystallizeOptions {
    pub determinism_runs: Option<u32>,
    pub performance_runs: Option<u32>,
}

/// One captured determinism run.
#[derive(Debug)]
struct RunRecord {
    hashes: RunHashes,
    trace: Vec<TraceRecord>,
    result: Value,
}

/// Produces proof crystals for scenarios against one handler registry.
pub struct Crystallizer<R> {
    config: CrystallizerConfig<R>,
}

impl<R: HandlerRegistry> Crystallizer<R> {
    pub fn new(config: CrystallizerConfig<R>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CrystallizerConfig<R> {
        &self.config
    }

    /// Crystallize `scenario`.
    ///
    /// # Errors
    ///
    /// - [`CrystallizeError::NoReferenceRun`] when zero determinism runs are
    ///   requested.
    /// - [`CrystallizeError::Profile`] when zero performance runs are
    ///   requested.
    /// - [`CrystallizeError::Dispatch`] when any run fails to dispatch.
    /// - [`CrystallizeError::Canonicalization`] / [`CrystallizeError::Chain`]
    ///   when an envelope, result, or trace cannot be hashed.
    pub fn crystallize(
        &self,
        scenario: &CrystalScenario,
        options: Option<&CrystallizeOptions>,
    ) -> Result<ProofCrystal, CrystallizeError> {
        let determinism_runs = options
            .and_then(|o| o.determinism_runs)
            .unwrap_or(self.config.determinism_runs);
        let performance_runs = options
            .and_then(|o| o.performance_runs)
            .unwrap_or(self.config.performance_runs);

        if determinism_runs == 0 {
            return Err(CrystallizeError::NoReferenceRun);
        }
        if performance_runs == 0 {
            return Err(CrystallizeError::Profile(StatsError::EmptySample));
        }

        let started_at = self.config.clock.now_ms();
        tracing::debug!(
            scenario = %scenario.name(),
            determinism_runs,
            performance_runs,
            "crystallizing scenario"
        );

        // 1-2. Determinism.
        let mut runs = Vec::with_capacity(determinism_runs as usize);
        for run_index in 0..determinism_runs {
            runs.push(self.determinism_run(scenario, run_index)?);
        }
        let hashes: Vec<RunHashes> = runs.iter().map(|r| r.hashes.clone()).collect();
        let determinism_fingerprint = prove(&hashes);

        // 3. Performance.
        let mut durations = Vec::with_capacity(performance_runs as usize);
        for offset in 0..performance_runs {
            let run_index = determinism_runs.saturating_add(offset);
            durations.push(self.performance_run(scenario, run_index)?);
        }
        let performance_profile = profile(&durations)?;

        // 4. Chain the reference trace.
        let reference = runs
            .into_iter()
            .next()
            .ok_or(CrystallizeError::NoReferenceRun)?;
        let mut chain = ChainBuilder::new(Arc::clone(&self.config.clock));
        for record in &reference.trace {
            chain.append(&record.event_type, record)?;
        }
        let merkle_root = chain.compute_root();
        let merkle_nodes = chain.into_nodes();

        // 5. Causality.
        let causality_matrix = causality::build_matrix(&merkle_nodes);
        let causality_verdict = causality::verify(&merkle_nodes, &causality_matrix);

        // 6. Invariants.
        let invariants = evaluate_invariants(scenario, &reference.result, &reference.trace);

        // 7. Verdict.
        let (verdict, contamination_reason) = decide_verdict(
            &invariants,
            &causality_verdict,
            &determinism_fingerprint,
            &reference.result,
        );

        // 8. Seal.
        let tags = self
            .config
            .default_tags
            .iter()
            .chain(scenario.tags())
            .cloned()
            .collect();
        let body = CrystalBody {
            crystal_id: crystal_id(started_at, scenario.name()),
            protocol_version: PROTOCOL_VERSION.to_string(),
            crystallized_at: self.config.clock.now_ms(),
            scenario_name: scenario.name().to_string(),
            description: scenario.description().to_string(),
            tags,
            merkle_nodes,
            merkle_root,
            causality_matrix,
            causality_verdict,
            determinism_fingerprint,
            performance_profile,
            invariants,
            verdict,
            contamination_reason,
        };
        let crystal = ProofCrystal::seal(body)?;

        match crystal.contamination_reason() {
            None => tracing::info!(
                crystal_id = %crystal.crystal_id(),
                scenario = %crystal.scenario_name(),
                crystal_hash = %crystal.crystal_hash(),
                "scenario crystallized"
            ),
            Some(reason) => tracing::warn!(
                crystal_id = %crystal.crystal_id(),
                scenario = %crystal.scenario_name(),
                reason = %reason,
                "scenario contaminated"
            ),
        }

        Ok(crystal)
    }

    fn determinism_run(
        &self,
        scenario: &CrystalScenario,
        run_index: u32,
    ) -> Result<RunRecord, CrystallizeError> {
        let mut dispatcher = self.config.registry.dispatcher(Arc::clone(&self.config.clock));
        let envelope = scenario.envelope(run_index);
        let (result, duration_ms) = self.timed_dispatch(&mut dispatcher, &envelope, run_index)?;
        let trace = dispatcher.trace();

        let hashes = RunHashes {
            input_hash: hash_object(&envelope)?,
            output_hash: hash_object(&result)?,
            trace_hash: hash_object(&trace)?,
        };
        tracing::debug!(
            run_index,
            duration_ms,
            events = trace.len(),
            output_hash = %hashes.output_hash,
            "determinism run complete"
        );

        Ok(RunRecord {
            hashes,
            trace,
            result,
        })
    }

    fn performance_run(
        &self,
        scenario: &CrystalScenario,
        run_index: u32,
    ) -> Result<f64, CrystallizeError> {
        let mut dispatcher = self.config.registry.dispatcher(Arc::clone(&self.config.clock));
        let envelope = scenario.envelope(run_index);
        let (_, duration_ms) = self.timed_dispatch(&mut dispatcher, &envelope, run_index)?;
        Ok(duration_ms)
    }

    fn timed_dispatch<D: Dispatcher>(
        &self,
        dispatcher: &mut D,
        envelope: &Envelope,
        run_index: u32,
    ) -> Result<(Value, f64), CrystallizeError> {
        let start = self.config.clock.now_ms();
        let result = dispatcher
            .dispatch(envelope)
            .map_err(|source| CrystallizeError::Dispatch { run_index, source })?;
        let elapsed = self.config.clock.now_ms().saturating_sub(start);
        Ok((result, elapsed as f64))
    }
}

impl<R> std::fmt::Debug for Crystallizer<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crystallizer")
            .field("determinism_runs", &self.config.determinism_runs)
            .field("performance_runs", &self.config.performance_runs)
            .field("default_tags", &self.config.default_tags)
            .finish_non_exhaustive()
    }
}

fn evaluate_invariants(
    scenario: &CrystalScenario,
    result: &Value,
    trace: &[TraceRecord],
) -> Vec<InvariantCheck> {
    let builtins = builtin_invariants();
    builtins
        .iter()
        .chain(scenario.checks())
        .map(|inv| inv.evaluate(result, trace))
        .collect()
}

/// First failing check, in priority order, decides the verdict.
pub(crate) fn decide_verdict(
    invariants: &[InvariantCheck],
    causality: &CausalityVerdict,
    determinism: &DeterminismFingerprint,
    result: &Value,
) -> (Verdict, Option<String>) {
    let reason = if invariants.iter().any(InvariantCheck::failed) {
        Some("Invariant(s) failed".to_string())
    } else if !causality.valid {
        Some(format!("Causality violations: {}", causality.violations.len()))
    } else if !determinism.proven {
        Some("Non-deterministic execution detected".to_string())
    } else if outcome::is_err(result) {
        Some("Execution failed".to_string())
    } else {
        None
    };

    match reason {
        None => (Verdict::Crystallized, None),
        Some(reason) => (Verdict::Contaminated, Some(reason)),
    }
}

/// `crystal-<start ms in base 36>-<12 hex of the scenario name hash>`.
fn crystal_id(started_at: u64, scenario_name: &str) -> String {
    let name_hash = hash_str(scenario_name);
    format!("crystal-{}-{}", to_base36(started_at), &name_hash[..12])
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut reversed = String::new();
    while n > 0 {
        reversed.push(char::from(DIGITS[(n % 36) as usize]));
        n /= 36;
    }
    reversed.chars().rev().collect()
}
