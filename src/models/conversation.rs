// src/models/conversation.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- ENUMS ---

// Canal de contato / conversa (WhatsApp, Instagram, telefone, e-mail)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactChannel {
    Whatsapp,
    Instagram,
    Phone,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Archived,
    Pending,
}

// Quem escreveu: o operador ("user") ou o próprio lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    User,
    Lead,
}

// A ordem das variantes É a ordem de entrega: sent < delivered < read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    Audio,
    Document,
}

// --- CONTATO ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub channel: ContactChannel,
    pub value: String,
    pub verified: bool,
    pub primary: bool,
}

// --- MENSAGEM ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub sender: MessageSender,
    pub status: MessageStatus,
    #[serde(rename = "type")]
    pub message_type: MessageType,
}

impl Message {
    /// Avança o status de entrega. Nunca regride (read -> sent não existe).
    /// Retorna `true` só se o status mudou.
    pub fn advance_status(&mut self, next: MessageStatus) -> bool {
        if next <= self.status {
            return false;
        }
        self.status = next;
        true
    }
}

// --- CONVERSA ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub channel: ContactChannel,
    pub messages: Vec<Message>,
    pub status: ConversationStatus,
    pub unread_count: u32,
}

impl Conversation {
    pub fn new(lead_id: Uuid, channel: ContactChannel) -> Self {
        Self {
            id: Uuid::new_v4(),
            lead_id,
            channel,
            messages: Vec::new(),
            status: ConversationStatus::Active,
            unread_count: 0,
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn message_mut(&mut self, message_id: Uuid) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == message_id)
    }

    /// Adiciona uma mensagem nova ao fim da conversa e devolve a referência.
    pub fn push_message(
        &mut self,
        content: &str,
        sender: MessageSender,
        timestamp: DateTime<Utc>,
    ) -> &Message {
        let status = match sender {
            MessageSender::User => MessageStatus::Sent,
            // Se chegou até nós, já foi entregue
            MessageSender::Lead => MessageStatus::Delivered,
        };

        if sender == MessageSender::Lead {
            self.unread_count += 1;
        }

        self.messages.push(Message {
            id: Uuid::new_v4(),
            conversation_id: self.id,
            content: content.to_string(),
            timestamp,
            sender,
            status,
            message_type: MessageType::Text,
        });

        // Acabamos de inserir, então `last()` existe
        &self.messages[self.messages.len() - 1]
    }

    /// Zera o contador e marca como lidas as mensagens do lead.
    pub fn mark_read(&mut self) {
        self.unread_count = 0;
        for message in self.messages.iter_mut().filter(|m| m.sender == MessageSender::Lead) {
            message.advance_status(MessageStatus::Read);
        }
    }
}
