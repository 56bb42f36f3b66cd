//! Status operativo del paiol y su historial de transiciones.
//!
//! Rol en el motor:
//! - `StatusPaiol` define el contrato observable del ciclo de vida de un
//!   paiol; la máquina de estados (paiol-core) valida los cambios.
//! - `TransicaoStatus` es el registro append-only de cada cambio ejecutado y
//!   la columna vertebral del timeline derivado.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::DomainError;
use std::fmt;

/// Estado operativo de un paiol.
///
/// Las transiciones válidas son estrictamente adyacentes:
/// - `Vazio` -> `Dragando`
/// - `Dragando` -> `Cheio`
/// - `Cheio` -> `Retirando`
/// - `Retirando` -> `Vazio`
///
/// No se permiten saltos, reversiones ni auto-transiciones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusPaiol {
    /// El paiol está vacío, listo para una nueva dragagem.
    Vazio,
    /// Hay una dragagem activa depositando material.
    Dragando,
    /// La dragagem terminó; el paiol espera cubagem/retiradas.
    Cheio,
    /// Los clientes están retirando material.
    Retirando,
}

impl StatusPaiol {
    /// Único estado destino permitido desde `self`.
    pub fn proximo(&self) -> StatusPaiol {
        match self {
            StatusPaiol::Vazio => StatusPaiol::Dragando,
            StatusPaiol::Dragando => StatusPaiol::Cheio,
            StatusPaiol::Cheio => StatusPaiol::Retirando,
            StatusPaiol::Retirando => StatusPaiol::Vazio,
        }
    }

    /// Representación estable en mayúsculas (la misma que persiste la DB).
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusPaiol::Vazio => "VAZIO",
            StatusPaiol::Dragando => "DRAGANDO",
            StatusPaiol::Cheio => "CHEIO",
            StatusPaiol::Retirando => "RETIRANDO",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "VAZIO" => Ok(StatusPaiol::Vazio),
            "DRAGANDO" => Ok(StatusPaiol::Dragando),
            "CHEIO" => Ok(StatusPaiol::Cheio),
            "RETIRANDO" => Ok(StatusPaiol::Retirando),
            other => Err(DomainError::Validacao(format!("status de paiol desconocido: {other}"))),
        }
    }
}

impl fmt::Display for StatusPaiol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registro de una transición ejecutada. Una fila por transición, append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransicaoStatus {
    pub id: Uuid,
    pub paiol_id: Uuid,
    /// `None` únicamente para el registro inicial de un paiol recién creado.
    pub status_anterior: Option<StatusPaiol>,
    pub status_novo: StatusPaiol,
    pub data: DateTime<Utc>,
    pub observacoes: Option<String>,
}

impl TransicaoStatus {
    pub fn nova(paiol_id: Uuid,
                status_anterior: Option<StatusPaiol>,
                status_novo: StatusPaiol,
                data: DateTime<Utc>,
                observacoes: Option<String>)
                -> Self {
        Self { id: Uuid::new_v4(),
               paiol_id,
               status_anterior,
               status_novo,
               data,
               observacoes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adyacencia_cubre_el_ciclo_completo() {
        let mut s = StatusPaiol::Vazio;
        for esperado in [StatusPaiol::Dragando, StatusPaiol::Cheio, StatusPaiol::Retirando, StatusPaiol::Vazio] {
            s = s.proximo();
            assert_eq!(s, esperado);
        }
    }

    #[test]
    fn parse_es_inverso_de_as_str() {
        for s in [StatusPaiol::Vazio, StatusPaiol::Dragando, StatusPaiol::Cheio, StatusPaiol::Retirando] {
            assert_eq!(StatusPaiol::parse(s.as_str()).unwrap(), s);
        }
        assert!(StatusPaiol::parse("LLENO").is_err());
    }
}
