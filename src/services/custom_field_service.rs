// src/services/custom_field_service.rs

use std::collections::HashMap;

use crate::{
    common::error::AppError,
    models::crm::{CustomField, CustomFieldValue, FieldType, FieldValue},
};

// --- MOTOR DE VALIDAÇÃO ---
// Confere os valores de um lead contra o molde de campos da conta.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomFieldService;

impl CustomFieldService {
    pub fn new() -> Self {
        Self
    }

    /// Valida um único valor (edição de um campo). Devolve o valor normalizado:
    /// campos de texto aceitam uma data e guardam como texto "YYYY-MM-DD".
    pub fn validate_value(
        &self,
        definitions: &[CustomField],
        value: CustomFieldValue,
    ) -> Result<CustomFieldValue, AppError> {
        let def = definitions
            .iter()
            .find(|d| d.id == value.field_id)
            .ok_or_else(|| AppError::CustomFieldNotFound(value.field_id.clone()))?;

        match check(def, value.value) {
            Ok(normalized) => Ok(CustomFieldValue {
                field_id: value.field_id,
                value: normalized,
            }),
            Err(code) => {
                let mut errors = HashMap::new();
                errors.insert(def.id.clone(), code.to_string());
                Err(AppError::CustomFieldValidation(errors))
            }
        }
    }

    /// Valida a lista inteira (criação ou substituição completa):
    /// obrigatórios presentes, um valor por campo, tipos corretos.
    pub fn validate_all(
        &self,
        definitions: &[CustomField],
        values: Vec<CustomFieldValue>,
    ) -> Result<Vec<CustomFieldValue>, AppError> {
        // Mapa de erros: id do campo -> código do erro
        let mut errors: HashMap<String, String> = HashMap::new();
        let mut normalized: Vec<CustomFieldValue> = Vec::with_capacity(values.len());

        for value in values {
            let Some(def) = definitions.iter().find(|d| d.id == value.field_id) else {
                return Err(AppError::CustomFieldNotFound(value.field_id));
            };

            if normalized.iter().any(|v| v.field_id == value.field_id) {
                errors.insert(value.field_id.clone(), "duplicated".to_string());
                continue;
            }

            match check(def, value.value) {
                Ok(v) => normalized.push(CustomFieldValue {
                    field_id: value.field_id,
                    value: v,
                }),
                Err(code) => {
                    errors.insert(value.field_id, code.to_string());
                }
            }
        }

        for def in definitions.iter().filter(|d| d.required) {
            let present = normalized.iter().any(|v| v.field_id == def.id);
            if !present && !errors.contains_key(&def.id) {
                // Usamos CÓDIGO, não frase
                errors.insert(def.id.clone(), "required".to_string());
            }
        }

        if !errors.is_empty() {
            return Err(AppError::CustomFieldValidation(errors));
        }

        Ok(normalized)
    }
}

fn check(def: &CustomField, value: FieldValue) -> Result<FieldValue, &'static str> {
    match (def.field_type, value) {
        (FieldType::Number, v @ FieldValue::Number(n)) if n.is_finite() => Ok(v),
        (FieldType::Number, _) => Err("invalid_number"),

        (FieldType::Boolean, v @ FieldValue::Bool(_)) => Ok(v),
        (FieldType::Boolean, _) => Err("invalid_boolean"),

        (FieldType::Date, v @ FieldValue::Date(_)) => Ok(v),
        (FieldType::Date, _) => Err("invalid_date_format"), // Espera YYYY-MM-DD

        (FieldType::Select, value) => {
            let text = as_text(value).ok_or("invalid_text")?;
            let allowed = def
                .options
                .as_ref()
                .is_some_and(|opts| opts.iter().any(|o| *o == text));
            if allowed {
                Ok(FieldValue::Text(text))
            } else {
                Err("invalid_option")
            }
        }

        (FieldType::Text | FieldType::Textarea, value) => {
            as_text(value).map(FieldValue::Text).ok_or("invalid_text")
        }
    }
}

fn as_text(value: FieldValue) -> Option<String> {
    match value {
        FieldValue::Text(s) => Some(s),
        FieldValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        _ => None,
    }
}
