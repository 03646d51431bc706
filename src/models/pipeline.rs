// src/models/pipeline.rs

use serde::{Deserialize, Serialize};

// ---
// Etapa do funil (coluna do quadro kanban)
// ---
// Lista estática por conta. O `id` é um slug ("new", "proposal"...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStage {
    pub id: String,
    pub name: String,
    // Só visual, nenhuma regra depende disso
    pub color: String,
    pub order: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_closed_won: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_closed_lost: Option<bool>,
}

impl PipelineStage {
    pub fn new(id: &str, name: &str, color: &str, order: i32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            order,
            is_closed_won: None,
            is_closed_lost: None,
        }
    }

    pub fn closed_won(mut self) -> Self {
        self.is_closed_won = Some(true);
        self
    }

    pub fn closed_lost(mut self) -> Self {
        self.is_closed_lost = Some(true);
        self
    }

    /// Etapa de ganho. Sem a flag, vale o id legado "won".
    pub fn is_won(&self) -> bool {
        self.is_closed_won.unwrap_or(self.id == "won")
    }

    /// Etapa de perda. Sem a flag, vale o id legado "lost".
    pub fn is_lost(&self) -> bool {
        self.is_closed_lost.unwrap_or(self.id == "lost")
    }

    /// Etapa final (ganho ou perdido). Fica fora das classificações "ativas".
    /// Única regra de etapa terminal usada pelo funil e pelas métricas.
    pub fn is_terminal(&self) -> bool {
        self.is_won() || self.is_lost()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_flags() {
        let open = PipelineStage::new("new", "Novo Lead", "#000", 1);
        let won = PipelineStage::new("won", "Ganho", "#0f0", 5).closed_won();
        let lost = PipelineStage::new("lost", "Perdido", "#f00", 6).closed_lost();

        assert!(!open.is_terminal());
        assert!(won.is_won() && won.is_terminal());
        assert!(lost.is_lost() && lost.is_terminal());
    }

    #[test]
    fn legacy_ids_count_only_without_flags() {
        let legacy_won = PipelineStage::new("won", "Ganho", "#0f0", 5);
        let legacy_lost = PipelineStage::new("lost", "Perdido", "#f00", 6);
        let mut not_won = PipelineStage::new("won", "Ganho?", "#0f0", 7);
        not_won.is_closed_won = Some(false);

        assert!(legacy_won.is_won() && legacy_won.is_terminal());
        assert!(legacy_lost.is_lost() && legacy_lost.is_terminal());
        assert!(!not_won.is_won() && !not_won.is_terminal());
    }

    #[test]
    fn omits_absent_flags_when_serialized() {
        let stage = PipelineStage::new("new", "Novo Lead", "#000", 1);
        let json = serde_json::to_value(&stage).unwrap();

        assert_eq!(json["order"], 1);
        assert!(json.get("isClosedWon").is_none());
    }
}
