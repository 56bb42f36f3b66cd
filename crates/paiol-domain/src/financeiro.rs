//! Registros monetarios con alcance de dragagem: pagos al personal y gastos
//! de insumos. Participan del timeline pero no tienen reglas de ciclo de vida
//! propias más allá de pertenecer a exactamente una dragagem.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::equipe::TipoPessoa;
use crate::DomainError;
use std::fmt;

/// Naturaleza del pago a un miembro del equipo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TipoPagamento {
    Adiantamento,
    PagamentoFinal,
}

impl TipoPagamento {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipoPagamento::Adiantamento => "ADIANTAMENTO",
            TipoPagamento::PagamentoFinal => "PAGAMENTO_FINAL",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "ADIANTAMENTO" => Ok(TipoPagamento::Adiantamento),
            "PAGAMENTO_FINAL" => Ok(TipoPagamento::PagamentoFinal),
            other => Err(DomainError::Validacao(format!("tipo de pagamento desconocido: {other}"))),
        }
    }

    /// Texto de presentación (timeline).
    pub fn rotulo(&self) -> &'static str {
        match self {
            TipoPagamento::Adiantamento => "Adiantamento",
            TipoPagamento::PagamentoFinal => "Pagamento Final",
        }
    }
}

impl fmt::Display for TipoPagamento {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pago (adelanto o saldo final) a un dragador o ajudante.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagamentoPessoal {
    pub id: Uuid,
    pub dragagem_id: Uuid,
    pub tipo_pessoa: TipoPessoa,
    pub pessoa_id: Uuid,
    pub tipo_pagamento: TipoPagamento,
    pub valor: f64,
    pub data_pagamento: DateTime<Utc>,
}

impl PagamentoPessoal {
    pub fn novo(dragagem_id: Uuid,
                tipo_pessoa: TipoPessoa,
                pessoa_id: Uuid,
                tipo_pagamento: TipoPagamento,
                valor: f64,
                data_pagamento: DateTime<Utc>)
                -> Result<Self, DomainError> {
        if valor <= 0.0 {
            return Err(DomainError::Validacao("valor do pagamento deve ser positivo".to_string()));
        }
        Ok(Self { id: Uuid::new_v4(),
                  dragagem_id,
                  tipo_pessoa,
                  pessoa_id,
                  tipo_pagamento,
                  valor,
                  data_pagamento })
    }
}

/// Gasto de insumo (combustible, repuestos, etc.) de una dragagem.
/// `valor_total` se deriva de cantidad × valor unitario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GastoInsumo {
    pub id: Uuid,
    pub dragagem_id: Uuid,
    pub tipo_insumo: String,
    pub categoria: String,
    pub quantidade: f64,
    pub unidade: String,
    pub valor_unitario: f64,
    pub valor_total: f64,
    pub data_gasto: DateTime<Utc>,
}

impl GastoInsumo {
    pub fn novo(dragagem_id: Uuid,
                tipo_insumo: &str,
                categoria: &str,
                quantidade: f64,
                unidade: &str,
                valor_unitario: f64,
                data_gasto: DateTime<Utc>)
                -> Result<Self, DomainError> {
        if tipo_insumo.trim().is_empty() {
            return Err(DomainError::Validacao("tipo de insumo é obrigatório".to_string()));
        }
        if quantidade <= 0.0 || valor_unitario <= 0.0 {
            return Err(DomainError::Validacao("quantidade e valor unitário devem ser positivos".to_string()));
        }
        Ok(Self { id: Uuid::new_v4(),
                  dragagem_id,
                  tipo_insumo: tipo_insumo.trim().to_string(),
                  categoria: categoria.trim().to_string(),
                  quantidade,
                  unidade: unidade.trim().to_string(),
                  valor_unitario,
                  valor_total: quantidade * valor_unitario,
                  data_gasto })
    }
}
