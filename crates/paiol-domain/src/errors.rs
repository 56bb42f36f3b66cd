// errors.rs
use thiserror::Error;

/// Error personalizado del dominio para la operación de dragado de arena
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Error de validación: {0}")]
    Validacao(String),

    #[error("Error de serialización: {0}")]
    Serializacao(String),
}

// Implementación de conversión desde serde_json::Error a DomainError
impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Serializacao(e.to_string())
    }
}
