use crate::{Error, Result, Transform};
use serde::{Deserialize, Serialize};
use splicer_core::decoder::InstructionSequence;
use tracing::info;

/// Effect of one transform on a method body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub transform: String,
    pub before: usize,
    pub after: usize,
}

impl StepReport {
    /// Instructions added by the step.
    pub fn inserted(&self) -> usize {
        self.after.saturating_sub(self.before)
    }
}

/// Effect of a full pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    pub steps: Vec<StepReport>,
}

/// Trait for running a sequence of transforms on a method body.
pub trait Pass {
    fn run(
        &self,
        body: &InstructionSequence,
        passes: &[Box<dyn Transform>],
    ) -> Result<(InstructionSequence, PassReport)>;
}

/// Default implementation of the Pass trait.
///
/// Transforms run in order, each on the previous one's output. The first failure
/// aborts the pass and nothing is returned.
pub struct DefaultPass;

impl Pass for DefaultPass {
    fn run(
        &self,
        body: &InstructionSequence,
        passes: &[Box<dyn Transform>],
    ) -> Result<(InstructionSequence, PassReport)> {
        let mut current = body.clone();
        let mut report = PassReport::default();

        for pass in passes {
            let next = pass.apply(&current).map_err(|source| Error::Pass {
                name: pass.name(),
                source: Box::new(source),
            })?;

            let step = StepReport {
                transform: pass.name().to_string(),
                before: current.len(),
                after: next.len(),
            };
            info!("{:>14} +{}", pass.name(), step.inserted());

            report.steps.push(step);
            current = next;
        }
        Ok((current, report))
    }
}
