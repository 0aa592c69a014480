//! Variant deletion: drop a clause that is a renaming of a retained one.

use super::{ForwardSimplificationEngine, ForwardSimplificationPerformer, SimplificationEnv};
use crate::index::{IndexKind, IndexManager};
use crate::statistics::Statistics;

#[derive(Debug, Default)]
pub struct VariantDeletion {
    attached: bool,
}

impl ForwardSimplificationEngine for VariantDeletion {
    fn name(&self) -> &str {
        "VariantDeletion"
    }

    fn attach(&mut self, indexes: &mut IndexManager) {
        indexes.request(IndexKind::Variants);
        self.attached = true;
    }

    fn detach(&mut self, indexes: &mut IndexManager) {
        indexes.release(IndexKind::Variants);
        self.attached = false;
    }

    fn perform(
        &mut self,
        clause: usize,
        env: &SimplificationEnv<'_>,
        statistics: &mut Statistics,
        performer: &mut dyn ForwardSimplificationPerformer,
    ) {
        assert!(self.attached, "VariantDeletion used before attach");
        let Some(index) = env.indexes.variants() else {
            return;
        };
        if let Some(existing) = index.find_variant(env.store.get(clause)) {
            if existing != clause && performer.will_perform(existing) {
                statistics.variants_deleted += 1;
                performer.perform(&[existing], None);
            }
        }
    }
}
