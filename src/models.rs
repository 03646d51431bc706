pub mod activity;
pub mod conversation;
pub mod crm;
pub mod dashboard;
pub mod metadata;
pub mod pipeline;
pub mod settings;
pub mod user;

pub use activity::{Activity, ActivityType, NewActivity};
pub use conversation::{
    Contact, ContactChannel, Conversation, ConversationStatus, Message, MessageSender,
    MessageStatus, MessageType,
};
pub use crm::{
    Currency, CustomField, CustomFieldValue, FieldType, FieldValue, Lead, LeadSource, LeadUpdate,
    NewLead, Priority, Temperature,
};
pub use dashboard::{DashboardSummary, StageMetrics};
pub use metadata::{Metadata, MetadataValue};
pub use pipeline::PipelineStage;
pub use settings::{Account, AccountSettings, Integration, IntegrationStatus, Language};
pub use user::{User, UserRole};
