//! Terminal aggregation stage.

use super::Stage;
use crate::core::queue::{QueueReceiver, QueueSender};
use tracing::debug;

/// Joins the sorted results
pub const COMBINE_SEPARATOR: &str = "_";

/// Collects every item, sorts byte-wise, and emits them `_`-joined as one item.
///
/// Nothing is sent until the input is closed. An empty input still
/// produces one item: the empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombineResultsStage;

impl CombineResultsStage {
    pub const NAME: &'static str = "combine-results";

    pub fn new() -> Self {
        Self
    }

    /// Canonical combination of a set of results, independent of their order
    pub fn combine(mut items: Vec<String>) -> String {
        items.sort_unstable();
        items.join(COMBINE_SEPARATOR)
    }
}

impl Stage<String, String> for CombineResultsStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&self, input: QueueReceiver<String>, output: QueueSender<String>) {
        let items: Vec<String> = input.into_iter().collect();
        debug!(items = items.len(), "combining results");
        output.send(Self::combine(items));
    }
}
