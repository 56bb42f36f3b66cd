//! Sesión de dragagem: el período de trabajo de un equipo sobre un paiol.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::DomainError;

/// Sesión de dragagem.
///
/// `data_fim = None` mientras la sesión está activa. A lo sumo una sesión
/// abierta por paiol; ese límite lo impone la máquina de estados, no el
/// almacenamiento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dragagem {
    pub id: Uuid,
    pub paiol_id: Uuid,
    pub dragador_id: Uuid,
    pub ajudante_id: Option<Uuid>,
    pub data_inicio: DateTime<Utc>,
    pub data_fim: Option<DateTime<Utc>>,
}

impl Dragagem {
    pub fn nova(paiol_id: Uuid, dragador_id: Uuid, ajudante_id: Option<Uuid>, data_inicio: DateTime<Utc>) -> Self {
        Self { id: Uuid::new_v4(),
               paiol_id,
               dragador_id,
               ajudante_id,
               data_inicio,
               data_fim: None }
    }

    pub fn ativa(&self) -> bool {
        self.data_fim.is_none()
    }

    /// Cierra la sesión. Cerrarla dispara (vía repositorio, en la misma
    /// operación atómica) el pase del paiol a CHEIO.
    pub fn encerrar(&mut self, data_fim: DateTime<Utc>) -> Result<(), DomainError> {
        if self.data_fim.is_some() {
            return Err(DomainError::Validacao("dragagem já encerrada".to_string()));
        }
        if data_fim < self.data_inicio {
            return Err(DomainError::Validacao("data_fim anterior ao início da dragagem".to_string()));
        }
        self.data_fim = Some(data_fim);
        Ok(())
    }
}
