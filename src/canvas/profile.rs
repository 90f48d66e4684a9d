use super::items::{remove_by_id, update_rated};
use super::relations::prune_references;
use super::CanvasSession;
use crate::entity::{CustomerGain, CustomerJob, CustomerPain, ItemId, ItemKind, Rating};

impl CanvasSession {
    pub fn add_job(
        &mut self,
        content: String,
        priority: Rating,
        is_ai_generated: bool,
    ) -> CustomerJob {
        let job = CustomerJob::new(content, priority, is_ai_generated);
        self.canvas.customer_jobs.push(job.clone());
        tracing::debug!(id = %job.id, "job added");
        self.touch();
        job
    }

    pub fn update_job(&mut self, id: &ItemId, content: String, priority: Rating) -> bool {
        let changed = update_rated(&mut self.canvas.customer_jobs, id, content, priority);
        if changed {
            self.touch();
        }
        changed
    }

    /// Remove a job and every service link pointing at it.
    pub fn delete_job(&mut self, id: &ItemId) -> bool {
        self.delete_profile_item(ItemKind::Job, id)
    }

    /// Replace the job list with `jobs`, in that order.
    pub fn reorder_jobs(&mut self, jobs: Vec<CustomerJob>) {
        self.canvas.customer_jobs = jobs;
        self.touch();
    }

    pub fn add_pain(
        &mut self,
        content: String,
        severity: Rating,
        is_ai_generated: bool,
    ) -> CustomerPain {
        let pain = CustomerPain::new(content, severity, is_ai_generated);
        self.canvas.customer_pains.push(pain.clone());
        tracing::debug!(id = %pain.id, "pain added");
        self.touch();
        pain
    }

    pub fn update_pain(&mut self, id: &ItemId, content: String, severity: Rating) -> bool {
        let changed = update_rated(&mut self.canvas.customer_pains, id, content, severity);
        if changed {
            self.touch();
        }
        changed
    }

    /// Remove a pain and every reliever link pointing at it.
    pub fn delete_pain(&mut self, id: &ItemId) -> bool {
        self.delete_profile_item(ItemKind::Pain, id)
    }

    pub fn reorder_pains(&mut self, pains: Vec<CustomerPain>) {
        self.canvas.customer_pains = pains;
        self.touch();
    }

    pub fn add_gain(
        &mut self,
        content: String,
        importance: Rating,
        is_ai_generated: bool,
    ) -> CustomerGain {
        let gain = CustomerGain::new(content, importance, is_ai_generated);
        self.canvas.customer_gains.push(gain.clone());
        tracing::debug!(id = %gain.id, "gain added");
        self.touch();
        gain
    }

    pub fn update_gain(&mut self, id: &ItemId, content: String, importance: Rating) -> bool {
        let changed = update_rated(&mut self.canvas.customer_gains, id, content, importance);
        if changed {
            self.touch();
        }
        changed
    }

    /// Remove a gain and every creator link pointing at it.
    pub fn delete_gain(&mut self, id: &ItemId) -> bool {
        self.delete_profile_item(ItemKind::Gain, id)
    }

    pub fn reorder_gains(&mut self, gains: Vec<CustomerGain>) {
        self.canvas.customer_gains = gains;
        self.touch();
    }

    /// Add a profile item of the given kind. Value map kinds are ignored.
    pub fn add_rated(
        &mut self,
        kind: ItemKind,
        content: String,
        rating: Rating,
        is_ai_generated: bool,
    ) -> Option<ItemId> {
        match kind {
            ItemKind::Job => Some(self.add_job(content, rating, is_ai_generated).id),
            ItemKind::Pain => Some(self.add_pain(content, rating, is_ai_generated).id),
            ItemKind::Gain => Some(self.add_gain(content, rating, is_ai_generated).id),
            _ => None,
        }
    }

    fn delete_profile_item(&mut self, kind: ItemKind, id: &ItemId) -> bool {
        let removed = match kind {
            ItemKind::Job => remove_by_id(&mut self.canvas.customer_jobs, id),
            ItemKind::Pain => remove_by_id(&mut self.canvas.customer_pains, id),
            ItemKind::Gain => remove_by_id(&mut self.canvas.customer_gains, id),
            _ => false,
        };
        if !removed {
            return false;
        }

        let pruned = prune_references(&mut self.canvas, kind, id);
        tracing::debug!(%kind, %id, pruned, "profile item deleted");
        self.touch();
        true
    }
}
