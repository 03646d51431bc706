// src/db/seed.rs

// Dados de demonstração. Tudo é relativo a `now`, então "há 2h" continua
// valendo a cada execução.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    activity::{Activity, ActivityType},
    conversation::{
        Contact, ContactChannel, Conversation, ConversationStatus, Message, MessageSender,
        MessageStatus, MessageType,
    },
    crm::{Currency, CustomField, FieldType, Lead, LeadSource, Priority, Temperature},
    metadata::Metadata,
    pipeline::PipelineStage,
    settings::{Account, AccountSettings, Integration, IntegrationStatus, Language},
    user::{User, UserRole},
};

pub struct SeedData {
    pub account: Account,
    pub users: Vec<User>,
    pub leads: Vec<Lead>,
}

pub fn default_pipeline_stages() -> Vec<PipelineStage> {
    vec![
        PipelineStage::new("new", "Novo Lead", "hsl(197, 92%, 58%)", 1),
        PipelineStage::new("qualifying", "Qualificando", "hsl(38, 92%, 58%)", 2),
        PipelineStage::new("proposal", "Proposta", "hsl(277, 78%, 58%)", 3),
        PipelineStage::new("closing", "Fechamento", "hsl(142, 76%, 45%)", 4).closed_won(),
    ]
}

pub fn demo_users() -> Vec<User> {
    vec![
        user(1, "Carlos Silva", "carlos@empresa.com", "👨‍💼", UserRole::Manager),
        user(2, "Ana Santos", "ana@empresa.com", "👩‍💼", UserRole::Sales),
        user(3, "Pedro Oliveira", "pedro@empresa.com", "👨‍💻", UserRole::Sales),
    ]
}

// IDs fixos para os usuários, assim `assignedTo` é previsível nos testes
pub fn user_id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn user(n: u128, name: &str, email: &str, avatar: &str, role: UserRole) -> User {
    User {
        id: user_id(n),
        name: name.to_string(),
        email: email.to_string(),
        avatar: Some(avatar.to_string()),
        role,
    }
}

pub fn demo_custom_fields() -> Vec<CustomField> {
    vec![
        CustomField {
            id: "budget".into(),
            name: "Orçamento".into(),
            field_type: FieldType::Number,
            required: false,
            options: None,
            order: 1,
        },
        CustomField {
            id: "timeline".into(),
            name: "Prazo de Decisão".into(),
            field_type: FieldType::Date,
            required: false,
            options: None,
            order: 2,
        },
        CustomField {
            id: "decision_maker".into(),
            name: "Decisor".into(),
            field_type: FieldType::Select,
            required: false,
            options: Some(
                ["CEO", "CTO", "Gerente", "Analista", "Outro"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
            order: 3,
        },
        CustomField {
            id: "pain_point".into(),
            name: "Principal Dor".into(),
            field_type: FieldType::Textarea,
            required: false,
            options: None,
            order: 4,
        },
    ]
}

pub fn demo_integrations(now: DateTime<Utc>) -> Vec<Integration> {
    let mut whatsapp = Metadata::new();
    whatsapp.insert("phoneNumber".into(), "+55 11 99999-0000".into());
    whatsapp.insert("businessName".into(), "CRM Pro".into());

    let mut instagram = Metadata::new();
    instagram.insert("accountName".into(), "@crmpro_oficial".into());

    vec![
        Integration {
            id: "whatsapp_integration".into(),
            name: "WhatsApp Business".into(),
            channel: ContactChannel::Whatsapp,
            status: IntegrationStatus::Connected,
            last_sync: Some(now - Duration::minutes(5)),
            config: whatsapp,
        },
        Integration {
            id: "instagram_integration".into(),
            name: "Instagram Business".into(),
            channel: ContactChannel::Instagram,
            status: IntegrationStatus::Connected,
            last_sync: Some(now - Duration::minutes(10)),
            config: instagram,
        },
        Integration {
            id: "phone_integration".into(),
            name: "Sistema de Telefonia".into(),
            channel: ContactChannel::Phone,
            status: IntegrationStatus::Disconnected,
            last_sync: None,
            config: Metadata::new(),
        },
    ]
}

pub fn demo_account(now: DateTime<Utc>) -> Account {
    Account {
        id: "account_1".into(),
        name: "CRM Pro Empresa".into(),
        domain: "crmpro.com".into(),
        pipeline: default_pipeline_stages(),
        custom_fields: demo_custom_fields(),
        integrations: demo_integrations(now),
        settings: AccountSettings {
            currency: Currency::Brl,
            timezone: "America/Sao_Paulo".into(),
            language: Language::Pt,
            date_format: "DD/MM/YYYY".into(),
        },
    }
}

fn demo_messages(conversation_id: Uuid, now: DateTime<Utc>) -> Vec<Message> {
    let script = [
        (120, MessageSender::Lead, MessageStatus::Read, "Olá! Vi vocês no Instagram e fiquei interessado nos seus produtos."),
        (90, MessageSender::User, MessageStatus::Read, "Olá! Que ótimo que você nos encontrou! Como podemos te ajudar?"),
        (60, MessageSender::Lead, MessageStatus::Read, "Preciso de uma solução para gestão da minha equipe de vendas."),
        (30, MessageSender::User, MessageStatus::Delivered, "Perfeito! Temos exatamente o que você precisa. Posso te enviar uma proposta personalizada?"),
    ];

    script
        .iter()
        .map(|(minutes_ago, sender, status, content)| Message {
            id: Uuid::new_v4(),
            conversation_id,
            content: content.to_string(),
            timestamp: now - Duration::minutes(*minutes_ago),
            sender: *sender,
            status: *status,
            message_type: MessageType::Text,
        })
        .collect()
}

fn demo_conversation(lead_id: Uuid, channel: ContactChannel, unread_count: u32, now: DateTime<Utc>) -> Conversation {
    let id = Uuid::new_v4();
    Conversation {
        id,
        lead_id,
        channel,
        messages: demo_messages(id, now),
        status: ConversationStatus::Active,
        unread_count,
    }
}

fn demo_activities(lead_id: Uuid, now: DateTime<Utc>) -> Vec<Activity> {
    let seller = user_id(2);
    let entries = [
        (ActivityType::Created, "Lead criado", Duration::days(3)),
        (ActivityType::MessageReceived, "Mensagem recebida via WhatsApp", Duration::hours(2)),
        (ActivityType::StageChanged, "Movido para Qualificando", Duration::hours(1)),
    ];

    entries
        .iter()
        .map(|(kind, description, ago)| Activity {
            id: Uuid::new_v4(),
            lead_id,
            activity_type: *kind,
            description: description.to_string(),
            timestamp: now - *ago,
            user_id: seller,
            metadata: None,
        })
        .collect()
}

fn contacts(phone: &str, email: &str, extra: Option<(ContactChannel, &str)>) -> Vec<Contact> {
    let mut list = Vec::new();
    if !phone.is_empty() {
        list.push(Contact {
            id: Uuid::new_v4(),
            channel: ContactChannel::Phone,
            value: phone.to_string(),
            verified: true,
            primary: true,
        });
    }
    list.push(Contact {
        id: Uuid::new_v4(),
        channel: ContactChannel::Email,
        value: email.to_string(),
        verified: false,
        primary: phone.is_empty(),
    });
    if let Some((channel, value)) = extra {
        list.push(Contact {
            id: Uuid::new_v4(),
            channel,
            value: value.to_string(),
            verified: true,
            primary: false,
        });
    }
    list
}

struct LeadSeed<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    value: i64,
    stage: usize,
    source: LeadSource,
    assigned_to: u128,
    created_ago: Duration,
    updated_ago: Duration,
    last_interaction_ago: Duration,
    // Positivo = no futuro, negativo = atrasado
    follow_up_in: Duration,
    tags: &'a [&'a str],
    priority: Priority,
    temperature: Temperature,
    extra_contact: Option<(ContactChannel, &'a str)>,
    conversation: Option<(ContactChannel, u32)>,
}

pub fn demo_leads(now: DateTime<Utc>) -> Vec<Lead> {
    let stages = default_pipeline_stages();
    let seeds = [
        LeadSeed {
            name: "João Silva",
            email: "joao@empresa.com",
            phone: "+55 11 99999-9999",
            value: 15000,
            stage: 1,
            source: LeadSource::Whatsapp,
            assigned_to: 2,
            created_ago: Duration::days(3),
            updated_ago: Duration::hours(1),
            last_interaction_ago: Duration::hours(2),
            follow_up_in: Duration::days(1),
            tags: &["enterprise", "high-priority"],
            priority: Priority::High,
            temperature: Temperature::Hot,
            extra_contact: Some((ContactChannel::Whatsapp, "+55 11 99999-9999")),
            conversation: Some((ContactChannel::Whatsapp, 0)),
        },
        LeadSeed {
            name: "Maria Oliveira",
            email: "maria@startup.com",
            phone: "+55 11 88888-8888",
            value: 8500,
            stage: 0,
            source: LeadSource::Instagram,
            assigned_to: 3,
            created_ago: Duration::days(1),
            updated_ago: Duration::minutes(30),
            last_interaction_ago: Duration::minutes(30),
            follow_up_in: Duration::hours(2),
            tags: &["startup", "medium-priority"],
            priority: Priority::Medium,
            temperature: Temperature::Warm,
            extra_contact: Some((ContactChannel::Instagram, "@maria.startup")),
            conversation: Some((ContactChannel::Instagram, 2)),
        },
        LeadSeed {
            name: "Pedro Santos",
            email: "pedro@consultoria.com",
            phone: "+55 11 77777-7777",
            value: 25000,
            stage: 2,
            source: LeadSource::Referral,
            assigned_to: 2,
            created_ago: Duration::days(7),
            updated_ago: Duration::hours(2),
            last_interaction_ago: Duration::hours(4),
            follow_up_in: -Duration::days(1),
            tags: &["enterprise", "hot-lead"],
            priority: Priority::Urgent,
            temperature: Temperature::Hot,
            extra_contact: None,
            conversation: None,
        },
        LeadSeed {
            name: "Ana Costa",
            email: "ana@ecommerce.com",
            phone: "+55 11 66666-6666",
            value: 12000,
            stage: 3,
            source: LeadSource::Website,
            assigned_to: 1,
            created_ago: Duration::days(14),
            updated_ago: Duration::hours(1),
            last_interaction_ago: Duration::hours(1),
            follow_up_in: Duration::days(7),
            tags: &["ecommerce", "ready-to-close"],
            priority: Priority::High,
            temperature: Temperature::Hot,
            extra_contact: None,
            conversation: None,
        },
        // Lead frio para mostrar os alertas
        LeadSeed {
            name: "Carlos Ferreira",
            email: "carlos@email.com",
            phone: "",
            value: 3000,
            stage: 0,
            source: LeadSource::Whatsapp,
            assigned_to: 2,
            created_ago: Duration::days(16),
            updated_ago: Duration::days(5),
            last_interaction_ago: Duration::days(5),
            follow_up_in: -Duration::days(2),
            tags: &[],
            priority: Priority::Low,
            temperature: Temperature::Cold,
            extra_contact: None,
            conversation: None,
        },
    ];

    seeds
        .iter()
        .map(|s| {
            let id = Uuid::new_v4();
            Lead {
                id,
                name: s.name.to_string(),
                email: s.email.to_string(),
                phone: s.phone.to_string(),
                company: None,
                value: Decimal::from(s.value),
                currency: Currency::Brl,
                stage: stages[s.stage].clone(),
                source: s.source,
                assigned_to: user_id(s.assigned_to),
                created_at: now - s.created_ago,
                updated_at: now - s.updated_ago,
                last_interaction: Some(now - s.last_interaction_ago),
                follow_up_date: Some(now + s.follow_up_in),
                tags: s.tags.iter().map(|t| t.to_string()).collect(),
                custom_fields: Vec::new(),
                contacts: contacts(s.phone, s.email, s.extra_contact),
                conversations: s
                    .conversation
                    .map(|(channel, unread)| vec![demo_conversation(id, channel, unread, now)])
                    .unwrap_or_default(),
                activities: demo_activities(id, now),
                priority: Some(s.priority),
                temperature: Some(s.temperature),
            }
        })
        .collect()
}

pub fn demo(now: DateTime<Utc>) -> SeedData {
    SeedData {
        account: demo_account(now),
        users: demo_users(),
        leads: demo_leads(now),
    }
}
