//! # Signer Module
//!
//! The three-stage hashing chain:
//!
//! ```text
//! items -> single-hash -> multi-hash -> combine-results -> signature
//! ```
//!
//! ## Example
//! ```rust,ignore
//! use signer_pipeline::core::signer::SignerConfig;
//!
//! let signer = SignerConfig::new()
//!     .slow_latency(Duration::from_millis(10))
//!     .build()?;
//! let signature = signer.sign([0, 1, 1, 2, 3, 5, 8])?;
//! ```

mod config;

pub use config::SignerConfig;

use crate::core::digest::{ContentionProbe, DigestAlgorithm, ProbeStats};
use crate::core::gate::SerializationGate;
use crate::core::pipeline::Pipeline;
use crate::core::stage::{CombineResultsStage, MultiHashStage, SingleHashStage, SlotPool};
use crate::error::PipelineError;
use crate::events::{null_sender, EventSender, StageReport};
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of one signing run
#[derive(Debug, Clone, Serialize)]
pub struct SignatureReport {
    /// Identifier of the pipeline run
    pub run_id: Uuid,
    /// The combined result
    pub signature: String,
    /// Number of items signed
    pub items_in: usize,
    /// One report per stage
    pub stages: Vec<StageReport>,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Slow-call contention, if probing was enabled
    pub probe: Option<ProbeStats>,
}

/// A ready-to-run signer chain
pub struct SignerPipeline {
    pipeline: Pipeline<String, String>,
    probe: Option<Arc<ContentionProbe<Arc<dyn DigestAlgorithm>>>>,
}

impl SignerPipeline {
    /// Create a configuration builder
    pub fn builder() -> SignerConfig {
        SignerConfig::new()
    }

    /// Assemble the chain from explicit primitives
    pub fn new(
        fast: Arc<dyn DigestAlgorithm>,
        slow: Arc<dyn DigestAlgorithm>,
        gate: Arc<SerializationGate>,
        slots: SlotPool,
    ) -> Self {
        let single = SingleHashStage::new(Arc::clone(&fast), slow, gate).with_slots(slots.clone());
        let multi = MultiHashStage::new(fast).with_slots(slots);

        let pipeline = Pipeline::builder(single)
            .then(multi)
            .then(CombineResultsStage::new())
            .build();

        Self {
            pipeline,
            probe: None,
        }
    }

    /// The underlying stage chain
    pub fn pipeline(&self) -> &Pipeline<String, String> {
        &self.pipeline
    }

    /// Contention counters for the slow primitive, if probing was enabled
    pub fn probe_stats(&self) -> Option<ProbeStats> {
        self.probe.as_ref().map(|probe| probe.stats())
    }

    /// Sign `items` and return the combined result
    pub fn sign<T: Display>(
        &self,
        items: impl IntoIterator<Item = T>,
    ) -> Result<String, PipelineError> {
        Ok(self.sign_with_events(items, &null_sender())?.signature)
    }

    /// Sign `items` with event reporting
    pub fn sign_with_events<T: Display>(
        &self,
        items: impl IntoIterator<Item = T>,
        events: &EventSender,
    ) -> Result<SignatureReport, PipelineError> {
        let items = items.into_iter().map(|item| item.to_string());
        let result = self.pipeline.run_with_events(items, events)?;

        let actual = result.outputs.len();
        let signature = match <[String; 1]>::try_from(result.outputs) {
            Ok([signature]) => signature,
            Err(_) => {
                return Err(PipelineError::UnexpectedOutputCount {
                    expected: 1,
                    actual,
                })
            }
        };

        Ok(SignatureReport {
            run_id: result.run_id,
            signature,
            items_in: result.items_in,
            stages: result.stages,
            duration_ms: result.duration_ms,
            probe: self.probe_stats(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::digest::FnDigest;

    const FIBONACCI_SIGNATURE: &str = "1173136728138862632818075107442090076184424490584241521304_\
        1696913515191343735512658979631549563179965036907783101867_\
        27225454331033649287118297354036464389062965355426795162684_\
        29568666068035183841425683795340791879727309630931025356555_\
        3994492081516972096677631278379039212655368881548151736_\
        4958044192186797981418233587017209679042592862002427381542_\
        4958044192186797981418233587017209679042592862002427381542";

    #[test]
    fn signs_reference_sequence() {
        let signer = SignerConfig::new()
            .gate(Arc::new(SerializationGate::new()))
            .build()
            .unwrap();

        let signature = signer.sign([0, 1, 1, 2, 3, 5, 8]).unwrap();

        assert_eq!(signature, FIBONACCI_SIGNATURE);
    }

    #[test]
    fn stand_in_primitives_follow_the_documented_shape() {
        let signer = SignerPipeline::new(
            Arc::new(FnDigest::new(|x| format!("F({x})"))),
            Arc::new(FnDigest::new(|x| format!("S({x})"))),
            Arc::new(SerializationGate::new()),
            SlotPool::global(),
        );

        let signature = signer.sign(["0"]).unwrap();

        assert_eq!(
            signature,
            "F(0F(0)~F(S(0)))F(1F(0)~F(S(0)))F(2F(0)~F(S(0)))\
             F(3F(0)~F(S(0)))F(4F(0)~F(S(0)))F(5F(0)~F(S(0)))"
        );
    }

    #[test]
    fn empty_input_signs_to_empty_string() {
        let signer = SignerConfig::new().build().unwrap();
        let report = signer
            .sign_with_events(Vec::<u32>::new(), &null_sender())
            .unwrap();

        assert_eq!(report.signature, "");
        assert_eq!(report.items_in, 0);
        assert_eq!(report.stages.len(), 3);
    }

    #[test]
    fn report_includes_probe_stats_when_enabled() {
        let signer = SignerConfig::new()
            .probe_slow(true)
            .gate(Arc::new(SerializationGate::new()))
            .build()
            .unwrap();

        let report = signer.sign_with_events(0..10, &null_sender()).unwrap();

        let stats = report.probe.unwrap();
        assert_eq!(stats.calls, 10);
        assert_eq!(stats.peak_concurrency, 1);
    }

    #[test]
    fn stage_names_are_in_chain_order() {
        let signer = SignerConfig::new().build().unwrap();
        assert_eq!(
            signer.pipeline().stage_names(),
            [
                SingleHashStage::NAME,
                MultiHashStage::NAME,
                CombineResultsStage::NAME
            ]
        );
    }
}
