pub mod crm_service;
pub use crm_service::CrmService;
pub mod custom_field_service;
pub use custom_field_service::CustomFieldService;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
