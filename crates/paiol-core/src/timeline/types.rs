//! Evento normalizado del timeline y estructura `EventoTimeline`.
//!
//! Rol en el motor:
//! - Los seis orígenes heterogéneos (transiciones, inicio/fin de dragagem,
//!   cubagens, retiradas, pagos, gastos) se normalizan a esta única forma.
//! - `DetalheEvento` es una unión etiquetada con una variante por tipo de
//!   evento: los consumidores hacen pattern-matching exhaustivo en lugar de
//!   sondear claves opcionales de un mapa.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use paiol_domain::{StatusPagamento, StatusPaiol, TipoPagamento, TipoPessoa};

use std::fmt;

/// Tipos de evento soportados por el timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TipoEvento {
    Transicao,
    DragagemInicio,
    DragagemFim,
    Cubagem,
    Retirada,
    Pagamento,
    GastoInsumo,
}

impl TipoEvento {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipoEvento::Transicao => "TRANSICAO",
            TipoEvento::DragagemInicio => "DRAGAGEM_INICIO",
            TipoEvento::DragagemFim => "DRAGAGEM_FIM",
            TipoEvento::Cubagem => "CUBAGEM",
            TipoEvento::Retirada => "RETIRADA",
            TipoEvento::Pagamento => "PAGAMENTO",
            TipoEvento::GastoInsumo => "GASTO_INSUMO",
        }
    }
}

impl fmt::Display for TipoEvento {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detalle tipado del evento, una variante por `TipoEvento`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipo", content = "dados")]
pub enum DetalheEvento {
    Transicao {
        status_anterior: Option<StatusPaiol>,
        status_novo: StatusPaiol,
    },
    DragagemInicio {
        dragador: String,
        ajudante: Option<String>,
    },
    DragagemFim {
        dragador: String,
        ajudante: Option<String>,
    },
    Cubagem {
        medida_inferior: f64,
        medida_superior: f64,
        perimetro: f64,
        volume_normal: f64,
        volume_reduzido: f64,
    },
    Retirada {
        cliente: String,
        volume: f64,
        status_pagamento: StatusPagamento,
        tem_frete: bool,
    },
    Pagamento {
        beneficiario: String,
        tipo_pessoa: TipoPessoa,
        tipo_pagamento: TipoPagamento,
    },
    GastoInsumo {
        insumo: String,
        categoria: String,
        quantidade: f64,
        unidade: String,
        valor_unitario: f64,
    },
}

/// Evento normalizado del timeline de un paiol. Serializable tal cual hacia
/// la capa de presentación.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventoTimeline {
    /// Id estable derivado del registro de origen (`{tipo}-{uuid}`); una
    /// dragagem produce dos ids distintos (inicio y fin).
    pub id: String,
    pub data: DateTime<Utc>,
    pub tipo: TipoEvento,
    pub titulo: String,
    pub descricao: String,
    pub detalhe: DetalheEvento,
    /// Valor monetario del evento, si tiene uno.
    pub valor: Option<f64>,
    /// Status del paiol más relevante para este evento (filtro por status).
    pub status_associado: Option<StatusPaiol>,
    /// Sesión de origen, cuando el evento pertenece a una dragagem.
    pub dragagem_id: Option<Uuid>,
    pub observacoes: Option<String>,
    /// Derivado de los fechamentos del paiol al momento de montar.
    pub ciclo: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detalhe_serializa_con_tag_por_tipo() {
        let detalhe = DetalheEvento::Transicao { status_anterior: Some(StatusPaiol::Vazio),
                                                 status_novo: StatusPaiol::Dragando };
        let v = serde_json::to_value(&detalhe).unwrap();
        assert_eq!(v,
                   json!({"tipo": "Transicao",
                          "dados": {"status_anterior": "Vazio", "status_novo": "Dragando"}}));
        let de_vuelta: DetalheEvento = serde_json::from_value(v).unwrap();
        assert_eq!(de_vuelta, detalhe);
    }
}
