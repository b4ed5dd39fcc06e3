use tracing::{debug, trace, warn};

use crate::bindings::ProviderBinding;
use crate::vendor::api::{CandidateOutcome, OpArg, OpName, ProviderFault, ProviderValue};
use crate::vendor::providers::SensorProvider;

/// Fault code used when a candidate answers with data of the wrong shape.
const FAULT_SHAPE_MISMATCH: i32 = -1;

/// What a whole probe run produced for one binding.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// A candidate answered with a value of the expected shape.
    Found { op: OpName, value: ProviderValue },
    /// Every candidate was tried without an acceptable answer. If any
    /// candidate faulted along the way the last fault is kept for
    /// diagnostics.
    Exhausted { last_fault: Option<ProviderFault> },
}

/// Walk the binding's candidates in order and return the first value of
/// the expected shape. Unsupported and faulting candidates both advance
/// to the next name; candidate order is the whole priority scheme, there
/// is no scoring.
#[tracing::instrument(skip_all, fields(category = %binding.category))]
pub fn probe_binding(provider: &dyn SensorProvider, binding: &ProviderBinding) -> ProbeOutcome {
    let mut last_fault = None;

    for op in &binding.candidates {
        trace!("Trying candidate '{}'.", op);
        match provider.invoke(*op, OpArg::None) {
            CandidateOutcome::Found(value) => {
                if value.category() != binding.category {
                    warn!(
                        "Candidate '{}' answered with {} data, expected {}. Skipping.",
                        op,
                        value.category(),
                        binding.category
                    );
                    last_fault = Some(ProviderFault::new(
                        FAULT_SHAPE_MISMATCH,
                        format!("'{}' returned {} data", op, value.category()),
                    ));
                    continue;
                }
                debug!("Candidate '{}' answered.", op);
                return ProbeOutcome::Found { op: *op, value };
            }
            CandidateOutcome::NotSupported => {
                trace!("Candidate '{}' is not supported on this release.", op);
            }
            CandidateOutcome::Failed(fault) => {
                warn!("Candidate '{}' failed. Error: {}", op, fault);
                last_fault = Some(fault);
            }
        }
    }

    trace!("Probe exhausted after {} candidate(s).", binding.candidates.len());
    ProbeOutcome::Exhausted { last_fault }
}
