// src/db/lead_repo.rs

use uuid::Uuid;

use crate::models::crm::Lead;

// Coleção de leads em memória. A ordem de inserção é preservada em todas as leituras.
#[derive(Debug, Clone, Default)]
pub struct LeadRepository {
    leads: Vec<Lead>,
}

impl LeadRepository {
    pub fn new(leads: Vec<Lead>) -> Self {
        Self { leads }
    }

    pub fn list(&self) -> &[Lead] {
        &self.leads
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    pub fn contains(&self, lead_id: Uuid) -> bool {
        self.leads.iter().any(|l| l.id == lead_id)
    }

    pub fn find(&self, lead_id: Uuid) -> Option<&Lead> {
        self.leads.iter().find(|l| l.id == lead_id)
    }

    pub fn find_mut(&mut self, lead_id: Uuid) -> Option<&mut Lead> {
        self.leads.iter_mut().find(|l| l.id == lead_id)
    }

    /// Filtra pelo `stage.id`. Etapa desconhecida só devolve vazio.
    pub fn by_stage(&self, stage_id: &str) -> Vec<&Lead> {
        self.leads.iter().filter(|l| l.stage.id == stage_id).collect()
    }

    /// Adiciona ao fim da coleção.
    pub fn insert(&mut self, lead: Lead) -> &Lead {
        self.leads.push(lead);
        &self.leads[self.leads.len() - 1]
    }

    pub fn remove(&mut self, lead_id: Uuid) -> Option<Lead> {
        let index = self.leads.iter().position(|l| l.id == lead_id)?;
        Some(self.leads.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::models::{crm::NewLead, pipeline::PipelineStage};

    fn lead(name: &str, stage: &str) -> Lead {
        NewLead::new(name, "", Decimal::from(100), stage, Uuid::nil()).into_lead(
            Uuid::new_v4(),
            PipelineStage::new(stage, stage, "#000", 1),
            Utc::now(),
        )
    }

    #[test]
    fn insert_and_remove_keep_order() {
        let mut repo = LeadRepository::default();
        assert!(repo.is_empty());

        let first = repo.insert(lead("Ana", "new")).id;
        let second = repo.insert(lead("Bia", "proposal")).id;
        let third = repo.insert(lead("Caio", "new")).id;

        let names: Vec<&str> = repo.by_stage("new").iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Caio"]);

        assert_eq!(repo.remove(second).map(|l| l.name), Some("Bia".to_string()));
        assert!(repo.remove(second).is_none());

        let ids: Vec<Uuid> = repo.list().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![first, third]);
        assert_eq!(repo.len(), 2);
        assert!(!repo.is_empty());
    }
}
