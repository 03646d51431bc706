// src/models/crm.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::models::{
    activity::Activity,
    conversation::{Contact, ContactChannel, Conversation},
    pipeline::PipelineStage,
};

// --- ENUMS ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Brl,
    Usd,
    Eur,
}

// De onde o lead veio
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadSource {
    Whatsapp,
    Instagram,
    #[default]
    Website,
    Referral,
    Phone,
    Email,
    Social,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

// Rótulo manual de "temperatura". O hot/cold calculado fica no dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Temperature {
    Cold,
    Warm,
    Hot,
}

// Mapeia o tipo do campo personalizado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Select,
    Boolean,
    Textarea,
}

// --- DEFINIÇÕES (O Molde) ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    pub id: String,   // Ex: "budget"
    pub name: String, // Ex: "Orçamento"
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,

    // Só faz sentido para Select
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub order: i32,
}

// --- VALOR (O Dado) ---

// A ordem importa para o serde: "2024-05-01" vira Date, qualquer outra string vira Text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldValue {
    pub field_id: String,
    pub value: FieldValue,
}

impl CustomFieldValue {
    pub fn new(field_id: &str, value: FieldValue) -> Self {
        Self {
            field_id: field_id.to_string(),
            value,
        }
    }
}

// --- LEAD ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,

    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,

    pub value: Decimal,
    pub currency: Currency,

    // Cópia da etapa atual; a identidade é `stage.id`
    pub stage: PipelineStage,
    pub source: LeadSource,
    pub assigned_to: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_interaction: Option<DateTime<Utc>>,
    pub follow_up_date: Option<DateTime<Utc>>,

    // Conjunto: sem repetição, ordem de inserção
    pub tags: Vec<String>,
    pub custom_fields: Vec<CustomFieldValue>,
    pub contacts: Vec<Contact>,
    pub conversations: Vec<Conversation>,
    pub activities: Vec<Activity>,

    pub priority: Option<Priority>,
    pub temperature: Option<Temperature>,
}

impl Lead {
    /// Atualiza `updated_at`. Nunca deixa ficar antes de `created_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    pub fn custom_field(&self, field_id: &str) -> Option<&FieldValue> {
        self.custom_fields
            .iter()
            .find(|cf| cf.field_id == field_id)
            .map(|cf| &cf.value)
    }

    /// Um valor por campo: substitui o anterior inteiro, não faz merge.
    pub fn put_custom_field(&mut self, value: CustomFieldValue) {
        match self
            .custom_fields
            .iter_mut()
            .find(|cf| cf.field_id == value.field_id)
        {
            Some(existing) => *existing = value,
            None => self.custom_fields.push(value),
        }
    }

    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    pub fn conversation_mut(&mut self, conversation_id: Uuid) -> Option<&mut Conversation> {
        self.conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
    }

    pub fn has_unread(&self) -> bool {
        self.conversations.iter().any(|c| c.unread_count > 0)
    }

    pub fn has_channel(&self, channel: ContactChannel) -> bool {
        self.contacts.iter().any(|c| c.channel == channel)
    }

    /// Busca da tela de contatos: nome, e-mail ou empresa, sem caixa.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self.email.to_lowercase().contains(&term)
            || self
                .company
                .as_ref()
                .is_some_and(|c| c.to_lowercase().contains(&term))
    }

    /// Merge raso do patch. `stage` já vem resolvida pelo store (ou `None`).
    pub fn apply(&mut self, update: LeadUpdate, stage: Option<PipelineStage>, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(company) = update.company {
            self.company = company;
        }
        if let Some(value) = update.value {
            self.value = value;
        }
        if let Some(currency) = update.currency {
            self.currency = currency;
        }
        if let Some(source) = update.source {
            self.source = source;
        }
        if let Some(assigned_to) = update.assigned_to {
            self.assigned_to = assigned_to;
        }
        if let Some(stage) = stage {
            self.stage = stage;
        }
        if let Some(at) = update.last_interaction {
            self.last_interaction = at;
        }
        if let Some(at) = update.follow_up_date {
            self.follow_up_date = at;
        }
        if let Some(tags) = update.tags {
            self.tags = dedup_tags(tags);
        }
        if let Some(custom_fields) = update.custom_fields {
            self.custom_fields = custom_fields;
        }
        if let Some(contacts) = update.contacts {
            self.contacts = contacts;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(temperature) = update.temperature {
            self.temperature = temperature;
        }
        self.touch(now);
    }
}

pub(crate) fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !unique.contains(&tag) {
            unique.push(tag);
        }
    }
    unique
}

// E-mail é opcional (lead só de WhatsApp/telefone). Quando vem, o domínio
// precisa ser válido; a parte local aceita acentos ("joão@empresa.com").
fn validate_optional_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Ok(());
    }
    let valid = match email.rsplit_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !local.chars().any(char::is_whitespace)
                && format!("contato@{}", domain).validate_email()
        }
        None => false,
    };
    if !valid {
        let mut err = ValidationError::new("email");
        err.message = Some("invalid_email".into());
        return Err(err);
    }
    Ok(())
}

// `null` no JSON vira `Some(None)` (limpar); campo ausente fica `None` (manter)
fn clearable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("negative_value");
        err.message = Some("O valor não pode ser negativo".into());
        return Err(err);
    }
    Ok(())
}

// --- PAYLOADS ---

// Tudo do Lead menos id/createdAt/updatedAt (quem gera é o store)
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,

    #[serde(default)]
    #[validate(custom(function = "validate_optional_email"))]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub company: Option<String>,

    #[validate(custom(function = "validate_non_negative"))]
    pub value: Decimal,
    #[serde(default)]
    pub currency: Currency,

    pub stage_id: String,
    #[serde(default)]
    pub source: LeadSource,
    pub assigned_to: Uuid,

    pub last_interaction: Option<DateTime<Utc>>,
    pub follow_up_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldValue>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub conversations: Vec<Conversation>,
    #[serde(default)]
    pub activities: Vec<Activity>,

    pub priority: Option<Priority>,
    pub temperature: Option<Temperature>,
}

impl NewLead {
    pub fn new(name: &str, email: &str, value: Decimal, stage_id: &str, assigned_to: Uuid) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            value,
            stage_id: stage_id.to_string(),
            assigned_to,
            ..Default::default()
        }
    }

    /// Monta o Lead final. Conversas e atividades passam a apontar para o novo id.
    pub(crate) fn into_lead(self, id: Uuid, stage: PipelineStage, now: DateTime<Utc>) -> Lead {
        let conversations = self
            .conversations
            .into_iter()
            .map(|mut c| {
                c.lead_id = id;
                for m in c.messages.iter_mut() {
                    m.conversation_id = c.id;
                }
                c
            })
            .collect();
        let activities = self
            .activities
            .into_iter()
            .map(|mut a| {
                a.lead_id = id;
                a
            })
            .collect();

        Lead {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            company: self.company,
            value: self.value,
            currency: self.currency,
            stage,
            source: self.source,
            assigned_to: self.assigned_to,
            created_at: now,
            updated_at: now,
            last_interaction: self.last_interaction,
            follow_up_date: self.follow_up_date,
            tags: dedup_tags(self.tags),
            custom_fields: self.custom_fields,
            contacts: self.contacts,
            conversations,
            activities,
            priority: self.priority,
            temperature: self.temperature,
        }
    }
}

// Patch parcial: só os campos `Some` são aplicados.
// Nos opcionais do lead, `Some(None)` limpa o valor.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LeadUpdate {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_optional_email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub company: Option<Option<String>>,
    #[validate(custom(function = "validate_non_negative"))]
    pub value: Option<Decimal>,
    pub currency: Option<Currency>,
    pub source: Option<LeadSource>,
    pub assigned_to: Option<Uuid>,
    pub stage_id: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub last_interaction: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "clearable")]
    pub follow_up_date: Option<Option<DateTime<Utc>>>,
    pub tags: Option<Vec<String>>,
    pub custom_fields: Option<Vec<CustomFieldValue>>,
    pub contacts: Option<Vec<Contact>>,
    #[serde(default, deserialize_with = "clearable")]
    pub priority: Option<Option<Priority>>,
    #[serde(default, deserialize_with = "clearable")]
    pub temperature: Option<Option<Temperature>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_lead() -> Lead {
        let stage = PipelineStage::new("new", "Novo Lead", "#000", 1);
        NewLead {
            company: Some("Consultoria Santos".into()),
            tags: vec!["vip".into(), "vip".into(), "2024".into()],
            ..NewLead::new("Pedro Santos", "pedro@consultoria.com", Decimal::from(25000), "new", Uuid::nil())
        }
        .into_lead(Uuid::new_v4(), stage, Utc::now())
    }

    #[test]
    fn into_lead_sets_equal_timestamps_and_dedups_tags() {
        let lead = sample_lead();
        assert_eq!(lead.created_at, lead.updated_at);
        assert_eq!(lead.tags, vec!["vip".to_string(), "2024".to_string()]);
    }

    #[test]
    fn touch_never_goes_before_creation() {
        let mut lead = sample_lead();
        let created = lead.created_at;
        lead.touch(created - Duration::hours(1));
        assert_eq!(lead.updated_at, created);
    }

    #[test]
    fn custom_field_is_replaced_not_merged() {
        let mut lead = sample_lead();
        lead.put_custom_field(CustomFieldValue::new("budget", FieldValue::Number(1000.0)));
        lead.put_custom_field(CustomFieldValue::new("budget", FieldValue::Number(2500.0)));

        assert_eq!(lead.custom_fields.len(), 1);
        assert_eq!(lead.custom_field("budget"), Some(&FieldValue::Number(2500.0)));
    }

    #[test]
    fn search_ignores_case_and_checks_company() {
        let lead = sample_lead();
        assert!(lead.matches_search("PEDRO"));
        assert!(lead.matches_search("consultoria.com"));
        assert!(lead.matches_search("santos"));
        assert!(!lead.matches_search("maria"));
    }

    #[test]
    fn tags_behave_like_a_set() {
        let mut lead = sample_lead();
        assert!(!lead.add_tag("vip"));
        assert!(lead.add_tag("enterprise"));
        assert!(lead.remove_tag("vip"));
        assert!(!lead.remove_tag("vip"));
        assert_eq!(lead.tags, vec!["2024".to_string(), "enterprise".to_string()]);
    }

    #[test]
    fn rejects_negative_value_and_bad_email() {
        let payload = NewLead::new("X", "not-an-email", Decimal::from(-1), "new", Uuid::nil());
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("value"));
    }

    #[test]
    fn email_is_optional_and_accepts_accented_local_part() {
        let no_email = NewLead::new("Carlos Ferreira", "", Decimal::from(100), "new", Uuid::nil());
        let accented = NewLead::new("João", "joão@teste.com", Decimal::from(100), "new", Uuid::nil());
        let no_domain = NewLead::new("João", "joão@", Decimal::from(100), "new", Uuid::nil());

        assert!(no_email.validate().is_ok());
        assert!(accented.validate().is_ok());
        assert!(no_domain.validate().is_err());
    }

    #[test]
    fn patch_null_clears_and_missing_keeps() {
        let mut lead = sample_lead();
        lead.follow_up_date = Some(Utc::now());
        lead.priority = Some(Priority::High);

        let update: LeadUpdate =
            serde_json::from_str(r#"{"company": null, "followUpDate": null}"#).unwrap();
        assert_eq!(update.company, Some(None));
        assert_eq!(update.priority, None);

        lead.apply(update, None, Utc::now());
        assert_eq!(lead.company, None);
        assert_eq!(lead.follow_up_date, None);
        assert_eq!(lead.priority, Some(Priority::High));
    }

    #[test]
    fn field_value_untagged_parsing() {
        let date: FieldValue = serde_json::from_str(r#""2024-05-01""#).unwrap();
        let text: FieldValue = serde_json::from_str(r#""CEO""#).unwrap();
        let number: FieldValue = serde_json::from_str("50000").unwrap();

        assert_eq!(date, FieldValue::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()));
        assert_eq!(text, FieldValue::Text("CEO".into()));
        assert_eq!(number, FieldValue::Number(50000.0));
    }
}
