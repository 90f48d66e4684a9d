use super::items::{remove_by_id, update_linked};
use super::CanvasSession;
use crate::entity::{GainCreator, ItemId, PainReliever, ProductService};

impl CanvasSession {
    pub fn add_service(
        &mut self,
        content: String,
        related_job_ids: Vec<ItemId>,
        is_ai_generated: bool,
    ) -> ProductService {
        let service = ProductService::new(content, related_job_ids, is_ai_generated);
        self.canvas.product_services.push(service.clone());
        tracing::debug!(id = %service.id, "service added");
        self.touch();
        service
    }

    pub fn update_service(
        &mut self,
        id: &ItemId,
        content: String,
        related_job_ids: Vec<ItemId>,
    ) -> bool {
        let changed =
            update_linked(&mut self.canvas.product_services, id, content, related_job_ids);
        if changed {
            self.touch();
        }
        changed
    }

    pub fn delete_service(&mut self, id: &ItemId) -> bool {
        let removed = remove_by_id(&mut self.canvas.product_services, id);
        if removed {
            self.touch();
        }
        removed
    }

    pub fn reorder_services(&mut self, services: Vec<ProductService>) {
        self.canvas.product_services = services;
        self.touch();
    }

    pub fn add_reliever(
        &mut self,
        content: String,
        related_pain_ids: Vec<ItemId>,
        is_ai_generated: bool,
    ) -> PainReliever {
        let reliever = PainReliever::new(content, related_pain_ids, is_ai_generated);
        self.canvas.pain_relievers.push(reliever.clone());
        tracing::debug!(id = %reliever.id, "reliever added");
        self.touch();
        reliever
    }

    pub fn update_reliever(
        &mut self,
        id: &ItemId,
        content: String,
        related_pain_ids: Vec<ItemId>,
    ) -> bool {
        let changed = update_linked(&mut self.canvas.pain_relievers, id, content, related_pain_ids);
        if changed {
            self.touch();
        }
        changed
    }

    pub fn delete_reliever(&mut self, id: &ItemId) -> bool {
        let removed = remove_by_id(&mut self.canvas.pain_relievers, id);
        if removed {
            self.touch();
        }
        removed
    }

    pub fn reorder_relievers(&mut self, relievers: Vec<PainReliever>) {
        self.canvas.pain_relievers = relievers;
        self.touch();
    }

    pub fn add_creator(
        &mut self,
        content: String,
        related_gain_ids: Vec<ItemId>,
        is_ai_generated: bool,
    ) -> GainCreator {
        let creator = GainCreator::new(content, related_gain_ids, is_ai_generated);
        self.canvas.gain_creators.push(creator.clone());
        tracing::debug!(id = %creator.id, "creator added");
        self.touch();
        creator
    }

    pub fn update_creator(
        &mut self,
        id: &ItemId,
        content: String,
        related_gain_ids: Vec<ItemId>,
    ) -> bool {
        let changed = update_linked(&mut self.canvas.gain_creators, id, content, related_gain_ids);
        if changed {
            self.touch();
        }
        changed
    }

    pub fn delete_creator(&mut self, id: &ItemId) -> bool {
        let removed = remove_by_id(&mut self.canvas.gain_creators, id);
        if removed {
            self.touch();
        }
        removed
    }

    pub fn reorder_creators(&mut self, creators: Vec<GainCreator>) {
        self.canvas.gain_creators = creators;
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use crate::canvas::CanvasSession;
    use crate::entity::{ItemId, Rating};

    #[test]
    fn test_service_lifecycle() {
        let mut session = CanvasSession::new("s1");
        let job = session.add_job("Book a flight".to_string(), Rating::High, false);
        let service = session.add_service("Fare search".to_string(), vec![job.id.clone()], false);
        assert!(!session.is_saved());

        assert!(session.update_service(&service.id, "Fare alerts".to_string(), Vec::new()));
        let stored = &session.canvas().product_services[0];
        assert_eq!(stored.content, "Fare alerts");
        assert!(stored.related_job_ids.is_empty());

        assert!(session.delete_service(&service.id));
        assert!(session.canvas().product_services.is_empty());
        // Deleting a service leaves the job alone
        assert_eq!(session.canvas().customer_jobs.len(), 1);
    }

    #[test]
    fn test_related_ids_are_not_validated() {
        let mut session = CanvasSession::new("s1");
        let creator = session.add_creator("Rewards".to_string(), vec![ItemId::from("nope")], true);
        assert_eq!(session.canvas().gain_creators[0].related_gain_ids, vec![ItemId::from("nope")]);
        assert!(creator.is_ai_generated);
    }

    #[test]
    fn test_unknown_value_map_ids_are_ignored() {
        let mut session = CanvasSession::new("s1");
        let missing = ItemId::from("missing");
        assert!(!session.update_reliever(&missing, "x".to_string(), Vec::new()));
        assert!(!session.delete_creator(&missing));
        assert!(session.is_saved());
    }

    #[test]
    fn test_reorder_relievers() {
        let mut session = CanvasSession::new("s1");
        let a = session.add_reliever("a".to_string(), Vec::new(), false);
        let b = session.add_reliever("b".to_string(), Vec::new(), false);
        session.reorder_relievers(vec![b.clone(), a.clone()]);
        assert_eq!(session.canvas().pain_relievers, vec![b, a]);
    }
}
