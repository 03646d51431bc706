// src/services/crm_service.rs

// O "store" do CRM: única fonte da verdade para leads e configuração da conta.
// Toda leitura e escrita passa por aqui. IDs desconhecidos não são erro:
// as mutações viram no-op e devolvem `false`/`None`.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{AccountRepository, LeadRepository},
    models::{
        activity::{self, Activity, ActivityType, NewActivity},
        conversation::{ContactChannel, Message, MessageSender, MessageStatus},
        crm::{CustomField, CustomFieldValue, Lead, LeadUpdate, NewLead},
        pipeline::PipelineStage,
        settings::{Account, Integration},
        user::User,
    },
    services::custom_field_service::CustomFieldService,
};

#[derive(Debug, Clone)]
pub struct CrmService {
    leads: LeadRepository,
    account: AccountRepository,
    custom_fields: CustomFieldService,
    // Guardamos só o id: a leitura sempre resolve o lead atual, nunca uma cópia velha
    selected_lead: Option<Uuid>,
}

impl CrmService {
    pub fn new(leads: LeadRepository, account: AccountRepository) -> Self {
        Self {
            leads,
            account,
            custom_fields: CustomFieldService::new(),
            selected_lead: None,
        }
    }

    // =========================================================================
    //  1. CONFIGURAÇÃO DA CONTA (somente leitura)
    // =========================================================================

    pub fn account(&self) -> &Account {
        self.account.account()
    }

    pub fn pipeline_stages(&self) -> &[PipelineStage] {
        self.account.stages()
    }

    pub fn custom_fields(&self) -> &[CustomField] {
        self.account.custom_fields()
    }

    pub fn integrations(&self) -> &[Integration] {
        self.account.integrations()
    }

    pub fn connected_integrations(&self) -> Vec<&Integration> {
        self.integrations().iter().filter(|i| i.is_connected()).collect()
    }

    pub fn users(&self) -> &[User] {
        self.account.users()
    }

    pub fn find_user(&self, user_id: Uuid) -> Option<&User> {
        self.account.find_user(user_id)
    }

    // =========================================================================
    //  2. LEITURAS DE LEADS
    // =========================================================================

    /// Snapshot na ordem de inserção.
    pub fn list_leads(&self) -> &[Lead] {
        self.leads.list()
    }

    pub fn get_lead(&self, lead_id: Uuid) -> Option<&Lead> {
        self.leads.find(lead_id)
    }

    pub fn leads_by_stage(&self, stage_id: &str) -> Vec<&Lead> {
        self.leads.by_stage(stage_id)
    }

    pub fn total_value_by_stage(&self, stage_id: &str) -> Decimal {
        self.leads.by_stage(stage_id).iter().map(|l| l.value).sum()
    }

    pub fn total_pipeline_value(&self) -> Decimal {
        self.leads.list().iter().map(|l| l.value).sum()
    }

    pub fn lead_count(&self) -> usize {
        self.leads.len()
    }

    /// Busca por nome, e-mail ou empresa. Termo vazio devolve todos.
    pub fn search_leads(&self, term: &str) -> Vec<&Lead> {
        let term = term.trim();
        self.leads
            .list()
            .iter()
            .filter(|l| term.is_empty() || l.matches_search(term))
            .collect()
    }

    pub fn leads_with_channel(&self, channel: ContactChannel) -> Vec<&Lead> {
        self.leads
            .list()
            .iter()
            .filter(|l| l.has_channel(channel))
            .collect()
    }

    /// Histórico do lead, mais recente primeiro. Vazio se o lead não existe.
    pub fn activity_timeline(&self, lead_id: Uuid) -> Vec<&Activity> {
        self.leads
            .find(lead_id)
            .map(|l| activity::timeline(&l.activities))
            .unwrap_or_default()
    }

    // =========================================================================
    //  3. SELEÇÃO (lead aberto no detalhe)
    // =========================================================================

    pub fn selected_lead(&self) -> Option<&Lead> {
        self.selected_lead.and_then(|id| self.leads.find(id))
    }

    /// Abre (ou fecha, com `None`) o lead. Id desconhecido limpa a seleção.
    pub fn set_selected_lead(&mut self, lead_id: Option<Uuid>) -> Option<&Lead> {
        self.selected_lead = lead_id.filter(|id| self.leads.contains(*id));
        self.selected_lead()
    }

    // =========================================================================
    //  4. MUTAÇÕES DE LEADS
    // =========================================================================

    /// Cria o lead: gera id novo, e `createdAt == updatedAt == agora`.
    pub fn add_lead(&mut self, mut payload: NewLead) -> Result<&Lead, AppError> {
        if let Err(errors) = payload.validate() {
            tracing::warn!("Lead rejeitado na validação: {}", errors);
            return Err(errors.into());
        }

        let stage = self
            .account
            .find_stage(&payload.stage_id)
            .cloned()
            .ok_or_else(|| AppError::StageNotFound(payload.stage_id.clone()))?;

        payload.custom_fields = self
            .custom_fields
            .validate_all(self.account.custom_fields(), std::mem::take(&mut payload.custom_fields))?;

        let mut id = Uuid::new_v4();
        while self.leads.contains(id) {
            id = Uuid::new_v4();
        }

        let lead = payload.into_lead(id, stage, Utc::now());
        tracing::info!("Lead criado: {} ({}) na etapa '{}'", lead.name, lead.id, lead.stage.id);

        Ok(self.leads.insert(lead))
    }

    /// Troca a etapa. Qualquer etapa pode ir para qualquer outra (sem regra de ordem).
    /// Etapa ou lead desconhecido: nada muda.
    pub fn move_lead_to_stage(&mut self, lead_id: Uuid, stage_id: &str) -> bool {
        let Some(stage) = self.account.find_stage(stage_id) else {
            tracing::warn!("Etapa '{}' não existe; lead {} não foi movido", stage_id, lead_id);
            return false;
        };

        let Some(lead) = self.leads.find_mut(lead_id) else {
            tracing::debug!("Lead {} não encontrado para mover", lead_id);
            return false;
        };

        let from = std::mem::replace(&mut lead.stage, stage.clone());
        lead.touch(Utc::now());
        tracing::info!("Lead {} movido: '{}' -> '{}'", lead_id, from.id, stage_id);
        true
    }

    /// Merge raso do patch e `updatedAt` novo. `Ok(false)` se o lead não existe.
    pub fn update_lead(&mut self, lead_id: Uuid, mut update: LeadUpdate) -> Result<bool, AppError> {
        if let Err(errors) = update.validate() {
            tracing::warn!("Atualização do lead {} rejeitada na validação: {}", lead_id, errors);
            return Err(errors.into());
        }

        if !self.leads.contains(lead_id) {
            tracing::debug!("Lead {} não encontrado para atualizar", lead_id);
            return Ok(false);
        }

        // Etapa desconhecida no patch é ignorada, igual ao move
        let stage = match update.stage_id.as_deref() {
            Some(stage_id) => {
                let found = self.account.find_stage(stage_id).cloned();
                if found.is_none() {
                    tracing::warn!("Etapa '{}' ignorada na atualização do lead {}", stage_id, lead_id);
                }
                found
            }
            None => None,
        };

        if let Some(values) = update.custom_fields.take() {
            let values = self
                .custom_fields
                .validate_all(self.account.custom_fields(), values)
                .inspect_err(|e| {
                    tracing::warn!("Campos personalizados do lead {} rejeitados: {}", lead_id, e)
                })?;
            update.custom_fields = Some(values);
        }

        let Some(lead) = self.leads.find_mut(lead_id) else {
            return Ok(false);
        };
        lead.apply(update, stage, Utc::now());
        tracing::info!("Lead {} atualizado", lead_id);

        Ok(true)
    }

    /// Remove o lead; se era o selecionado, a seleção é limpa.
    pub fn delete_lead(&mut self, lead_id: Uuid) -> bool {
        let Some(removed) = self.leads.remove(lead_id) else {
            tracing::debug!("Lead {} não encontrado para remover", lead_id);
            return false;
        };

        if self.selected_lead == Some(lead_id) {
            self.selected_lead = None;
        }
        tracing::info!("Lead removido: {} ({})", removed.name, lead_id);
        true
    }

    /// Grava um campo personalizado (substitui o valor anterior inteiro).
    pub fn set_custom_field_value(
        &mut self,
        lead_id: Uuid,
        value: CustomFieldValue,
    ) -> Result<bool, AppError> {
        if !self.leads.contains(lead_id) {
            return Ok(false);
        }

        let value = self
            .custom_fields
            .validate_value(self.account.custom_fields(), value)?;

        let Some(lead) = self.leads.find_mut(lead_id) else {
            return Ok(false);
        };
        lead.put_custom_field(value);
        lead.touch(Utc::now());
        Ok(true)
    }

    pub fn add_tag(&mut self, lead_id: Uuid, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        let Some(lead) = self.leads.find_mut(lead_id) else {
            return false;
        };
        if !lead.add_tag(tag) {
            return false;
        }
        lead.touch(Utc::now());
        true
    }

    pub fn remove_tag(&mut self, lead_id: Uuid, tag: &str) -> bool {
        let Some(lead) = self.leads.find_mut(lead_id) else {
            return false;
        };
        if !lead.remove_tag(tag) {
            return false;
        }
        lead.touch(Utc::now());
        true
    }

    /// Acrescenta uma linha no histórico (nunca edita as anteriores).
    pub fn add_activity(&mut self, lead_id: Uuid, new: NewActivity) -> Option<&Activity> {
        let lead = self.leads.find_mut(lead_id)?;
        let now = Utc::now();

        lead.activities.push(Activity {
            id: Uuid::new_v4(),
            lead_id,
            activity_type: new.activity_type,
            description: new.description,
            timestamp: now,
            user_id: new.user_id,
            metadata: new.metadata,
        });
        lead.touch(now);

        lead.activities.last()
    }

    // =========================================================================
    //  5. CONVERSAS
    // =========================================================================

    /// Mensagem do operador. Entra como `sent` e registra `message_sent`.
    pub fn send_message(
        &mut self,
        lead_id: Uuid,
        conversation_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<Option<&Message>, AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::EmptyMessage);
        }
        Ok(self.push_message(lead_id, conversation_id, user_id, content, MessageSender::User))
    }

    /// Mensagem que chegou do lead. Conta como não lida.
    pub fn receive_message(
        &mut self,
        lead_id: Uuid,
        conversation_id: Uuid,
        content: &str,
    ) -> Result<Option<&Message>, AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::EmptyMessage);
        }
        let Some(owner) = self.leads.find(lead_id).map(|l| l.assigned_to) else {
            return Ok(None);
        };
        Ok(self.push_message(lead_id, conversation_id, owner, content, MessageSender::Lead))
    }

    fn push_message(
        &mut self,
        lead_id: Uuid,
        conversation_id: Uuid,
        user_id: Uuid,
        content: &str,
        sender: MessageSender,
    ) -> Option<&Message> {
        let lead = self.leads.find_mut(lead_id)?;
        let channel = lead
            .conversations
            .iter()
            .find(|c| c.id == conversation_id)
            .map(|c| c.channel)?;
        let now = Utc::now();

        let (activity_type, description) = match sender {
            MessageSender::User => (ActivityType::MessageSent, format!("Mensagem enviada via {}", channel_label(channel))),
            MessageSender::Lead => (ActivityType::MessageReceived, format!("Mensagem recebida via {}", channel_label(channel))),
        };
        lead.activities.push(Activity {
            id: Uuid::new_v4(),
            lead_id,
            activity_type,
            description,
            timestamp: now,
            user_id,
            metadata: None,
        });
        lead.last_interaction = Some(now);
        lead.touch(now);

        let conversation = lead.conversation_mut(conversation_id)?;
        Some(conversation.push_message(content, sender, now))
    }

    /// Zera os não lidos e marca as mensagens do lead como lidas.
    pub fn mark_conversation_read(&mut self, lead_id: Uuid, conversation_id: Uuid) -> bool {
        let Some(lead) = self.leads.find_mut(lead_id) else {
            return false;
        };
        let Some(conversation) = lead.conversation_mut(conversation_id) else {
            return false;
        };
        conversation.mark_read();
        lead.touch(Utc::now());
        true
    }

    /// sent -> delivered -> read. Regressão é ignorada e devolve `false`.
    pub fn advance_message_status(
        &mut self,
        lead_id: Uuid,
        conversation_id: Uuid,
        message_id: Uuid,
        status: MessageStatus,
    ) -> bool {
        let Some(lead) = self.leads.find_mut(lead_id) else {
            return false;
        };
        let advanced = lead
            .conversation_mut(conversation_id)
            .and_then(|c| c.message_mut(message_id))
            .is_some_and(|m| m.advance_status(status));

        if advanced {
            lead.touch(Utc::now());
        }
        advanced
    }
}

fn channel_label(channel: ContactChannel) -> &'static str {
    match channel {
        ContactChannel::Whatsapp => "WhatsApp",
        ContactChannel::Instagram => "Instagram",
        ContactChannel::Phone => "Telefone",
        ContactChannel::Email => "E-mail",
    }
}
