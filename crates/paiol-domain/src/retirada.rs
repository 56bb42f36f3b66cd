use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::volume::pode_retirar;
use crate::DomainError;
use std::fmt;

/// Situación de cobro de una retirada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusPagamento {
    Pago,
    Pendente,
}

impl StatusPagamento {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusPagamento::Pago => "PAGO",
            StatusPagamento::Pendente => "PENDENTE",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "PAGO" => Ok(StatusPagamento::Pago),
            "PENDENTE" => Ok(StatusPagamento::Pendente),
            other => Err(DomainError::Validacao(format!("status de pagamento desconocido: {other}"))),
        }
    }
}

impl fmt::Display for StatusPagamento {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Retirada de material por un cliente.
///
/// No existe tope contra el volumen restante: el sobregiro se registra y se
/// muestra, nunca se bloquea. `valor_total` se deriva del precio unitario
/// cuando éste se informa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Retirada {
    pub id: Uuid,
    pub paiol_id: Uuid,
    pub cliente_id: Uuid,
    pub volume_retirado: f64,
    pub valor_unitario: Option<f64>,
    pub valor_total: Option<f64>,
    pub status_pagamento: StatusPagamento,
    pub tem_frete: bool,
    pub data_retirada: DateTime<Utc>,
}

impl Retirada {
    pub fn nova(paiol_id: Uuid,
                cliente_id: Uuid,
                volume_retirado: f64,
                valor_unitario: Option<f64>,
                status_pagamento: StatusPagamento,
                tem_frete: bool,
                data_retirada: DateTime<Utc>)
                -> Result<Self, DomainError> {
        if !pode_retirar(volume_retirado) {
            return Err(DomainError::Validacao("volume retirado deve ser positivo".to_string()));
        }
        if let Some(v) = valor_unitario {
            if v <= 0.0 {
                return Err(DomainError::Validacao("valor unitário deve ser positivo".to_string()));
            }
        }
        Ok(Retirada { id: Uuid::new_v4(),
                      paiol_id,
                      cliente_id,
                      volume_retirado,
                      valor_unitario,
                      valor_total: valor_unitario.map(|v| v * volume_retirado),
                      status_pagamento,
                      tem_frete,
                      data_retirada })
    }
}
