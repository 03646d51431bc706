// src/common/error.rs

use std::collections::HashMap;

use thiserror::Error;

// Erros do modelo de pipeline.
// IDs desconhecidos NÃO viram erro: move/update/delete são no-op e
// devolvem `false`/`None`. Aqui só entra validação de entrada e configuração.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Etapa do funil não encontrada: {0}")]
    StageNotFound(String),

    #[error("Campo personalizado não encontrado: {0}")]
    CustomFieldNotFound(String),

    // Mapa: id do campo -> código do erro ("required", "invalid_number", ...)
    #[error("Campos personalizados inválidos")]
    CustomFieldValidation(HashMap<String, String>),

    #[error("Mensagem vazia")]
    EmptyMessage,

    #[error("Funil inválido: {0}")]
    InvalidPipeline(String),

    #[error("Configuração inválida: {0}")]
    Config(String),
}

impl AppError {
    /// Código estável para o frontend traduzir (mesma ideia do i18n da API).
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::StageNotFound(_) => "stage_not_found",
            AppError::CustomFieldNotFound(_) => "custom_field_not_found",
            AppError::CustomFieldValidation(_) => "custom_field_invalid",
            AppError::EmptyMessage => "empty_message",
            AppError::InvalidPipeline(_) => "invalid_pipeline",
            AppError::Config(_) => "invalid_config",
        }
    }

    /// Detalhes por campo, no formato "details" das respostas de erro.
    pub fn details(&self) -> HashMap<String, Vec<String>> {
        let mut details = HashMap::new();
        match self {
            AppError::ValidationError(errors) => {
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
            }
            AppError::CustomFieldValidation(errors) => {
                for (field, code) in errors {
                    details.insert(field.clone(), vec![code.clone()]);
                }
            }
            _ => {}
        }
        details
    }
}
