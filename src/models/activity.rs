// src/models/activity.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::metadata::Metadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Created,
    StageChanged,
    MessageSent,
    MessageReceived,
    CallMade,
    NoteAdded,
    FieldUpdated,
}

// ---
// Atividade (linha do histórico do lead)
// ---
// Só cresce: nunca é editada nem apagada.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,
    pub lead_id: Uuid,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

// O que o chamador informa; id, lead e horário são do store.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub activity_type: ActivityType,
    pub description: String,
    pub user_id: Uuid,
    pub metadata: Option<Metadata>,
}

impl NewActivity {
    pub fn new(activity_type: ActivityType, description: &str, user_id: Uuid) -> Self {
        Self {
            activity_type,
            description: description.to_string(),
            user_id,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Histórico do mais recente para o mais antigo, sem reordenar a fatia recebida.
/// Empate no horário: a inserida por último vem primeiro.
pub fn timeline(activities: &[Activity]) -> Vec<&Activity> {
    let mut sorted: Vec<&Activity> = activities.iter().rev().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn activity(kind: ActivityType, at: DateTime<Utc>) -> Activity {
        Activity {
            id: Uuid::new_v4(),
            lead_id: Uuid::nil(),
            activity_type: kind,
            description: String::new(),
            timestamp: at,
            user_id: Uuid::nil(),
            metadata: None,
        }
    }

    #[test]
    fn timeline_is_most_recent_first() {
        let now = Utc::now();
        let activities = vec![
            activity(ActivityType::Created, now - Duration::days(3)),
            activity(ActivityType::StageChanged, now - Duration::hours(1)),
            activity(ActivityType::MessageReceived, now - Duration::hours(2)),
        ];

        let kinds: Vec<ActivityType> = timeline(&activities)
            .iter()
            .map(|a| a.activity_type)
            .collect();

        assert_eq!(
            kinds,
            vec![
                ActivityType::StageChanged,
                ActivityType::MessageReceived,
                ActivityType::Created
            ]
        );
    }

    #[test]
    fn type_serializes_as_snake_case() {
        let json = serde_json::to_value(ActivityType::StageChanged).unwrap();
        assert_eq!(json, "stage_changed");
    }
}
