//! Filtro y orden del timeline.
//!
//! El filtro es un valor inmutable que el llamador arma y pasa a `montar`;
//! no hay estado mutable compartido entre componentes de UI. Todos los
//! criterios son opcionales y se combinan con AND.
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use paiol_domain::StatusPaiol;

use super::types::{EventoTimeline, TipoEvento};

/// Dirección de orden por timestamp. Descendente por defecto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ordenacao {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiltroTimeline {
    /// Inicio inclusivo del rango.
    pub data_inicio: Option<DateTime<Utc>>,
    /// Fin inclusivo; se extiende al final del día de la fecha dada.
    pub data_fim: Option<DateTime<Utc>>,
    /// Número exacto de ciclo.
    pub ciclo: Option<u32>,
    /// Conjunto de tipos admitidos; `None` admite todos.
    pub tipos: Option<Vec<TipoEvento>>,
    pub status_associado: Option<StatusPaiol>,
    /// Conservar sólo eventos con valor monetario definido y positivo.
    pub com_valor: bool,
    pub ordem: Ordenacao,
}

impl FiltroTimeline {
    fn admite(&self, evento: &EventoTimeline, fim: Option<DateTime<Utc>>) -> bool {
        if let Some(inicio) = self.data_inicio {
            if evento.data < inicio {
                return false;
            }
        }
        if let Some(fim) = fim {
            if evento.data > fim {
                return false;
            }
        }
        if let Some(ciclo) = self.ciclo {
            if evento.ciclo != ciclo {
                return false;
            }
        }
        if let Some(tipos) = &self.tipos {
            if !tipos.contains(&evento.tipo) {
                return false;
            }
        }
        if let Some(status) = self.status_associado {
            if evento.status_associado != Some(status) {
                return false;
            }
        }
        if self.com_valor && !evento.valor.map(|v| v > 0.0).unwrap_or(false) {
            return false;
        }
        true
    }
}

/// Aplica filtro y orden. El orden es estable: eventos con el mismo
/// timestamp conservan su orden relativo original.
pub fn aplicar(eventos: Vec<EventoTimeline>, filtro: &FiltroTimeline) -> Vec<EventoTimeline> {
    let fim = filtro.data_fim.map(fim_do_dia);
    let mut filtrados: Vec<EventoTimeline> = eventos.into_iter()
                                                    .filter(|e| filtro.admite(e, fim))
                                                    .collect();
    match filtro.ordem {
        Ordenacao::Asc => filtrados.sort_by(|a, b| a.data.cmp(&b.data)),
        Ordenacao::Desc => filtrados.sort_by(|a, b| b.data.cmp(&a.data)),
    }
    filtrados
}

fn fim_do_dia(t: DateTime<Utc>) -> DateTime<Utc> {
    t.date_naive()
     .and_hms_milli_opt(23, 59, 59, 999)
     .map(|n| Utc.from_utc_datetime(&n))
     .unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn data_fim_se_extiende_al_final_del_dia() {
        let t = Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap();
        let fim = fim_do_dia(t);
        assert_eq!(fim, Utc.with_ymd_and_hms(2024, 5, 10, 23, 59, 59).unwrap() + chrono::Duration::milliseconds(999));
    }
}
