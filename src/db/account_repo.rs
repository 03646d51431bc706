// src/db/account_repo.rs

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        crm::CustomField,
        pipeline::PipelineStage,
        settings::{Account, Integration},
        user::User,
    },
};

// Configuração da conta (funil, campos, integrações) + usuários.
// Estático durante a execução: nada aqui é criado/apagado em runtime.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    account: Account,
    users: Vec<User>,
}

impl AccountRepository {
    /// Valida o funil (ids e `order` únicos) e guarda as etapas já ordenadas.
    pub fn new(mut account: Account, users: Vec<User>) -> Result<Self, AppError> {
        if account.pipeline.is_empty() {
            return Err(AppError::InvalidPipeline("o funil não tem etapas".into()));
        }

        let mut ids = HashSet::new();
        let mut orders = HashSet::new();
        for stage in &account.pipeline {
            if !ids.insert(stage.id.as_str()) {
                return Err(AppError::InvalidPipeline(format!(
                    "etapa duplicada: '{}'",
                    stage.id
                )));
            }
            if !orders.insert(stage.order) {
                return Err(AppError::InvalidPipeline(format!(
                    "ordem {} repetida na etapa '{}'",
                    stage.order, stage.id
                )));
            }
        }

        account.pipeline.sort_by_key(|s| s.order);
        account.custom_fields.sort_by_key(|f| f.order);

        Ok(Self { account, users })
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Etapas na ordem de exibição.
    pub fn stages(&self) -> &[PipelineStage] {
        &self.account.pipeline
    }

    pub fn find_stage(&self, stage_id: &str) -> Option<&PipelineStage> {
        self.account.pipeline.iter().find(|s| s.id == stage_id)
    }

    pub fn custom_fields(&self) -> &[CustomField] {
        &self.account.custom_fields
    }

    pub fn integrations(&self) -> &[Integration] {
        &self.account.integrations
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find_user(&self, user_id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }
}
