//! Situación de volumen del ciclo corriente de un paiol.
//!
//! Feed de display independiente del timeline: capacidad medida (volumen
//! reducido de la última cubagem del ciclo abierto) contra las retiradas
//! atribuidas a ese mismo ciclo. El sobregiro se muestra, no se bloquea.
use uuid::Uuid;

use paiol_domain::volume::{situacao_retiradas, SituacaoVolume};

use crate::ciclo::AtribuidorCiclo;
use crate::errors::CoreError;
use crate::repo::PaiolRepository;

/// Situación del ciclo abierto de un paiol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SituacaoPaiol {
    /// Ciclo abierto (derivado de los fechamentos, no del contador).
    pub ciclo: u32,
    /// Volumen reducido de la cubagem vigente.
    pub capacidade: f64,
    pub situacao: SituacaoVolume,
}

/// `None` cuando el ciclo abierto todavía no tiene cubagem registrada.
pub fn situacao_do_paiol<R: PaiolRepository>(repo: &R, paiol_id: Uuid) -> Result<Option<SituacaoPaiol>, CoreError> {
    let _paiol = repo.paiol(paiol_id)?;
    let fechamentos = repo.fechamentos(paiol_id)?;
    let atribuidor = AtribuidorCiclo::new(fechamentos.iter().map(|f| f.data_fechamento).collect());
    let ciclo_aberto = atribuidor.total_ciclos();

    let cubagem_vigente = repo.cubagens(paiol_id)?
                              .into_iter()
                              .filter(|c| atribuidor.ciclo_de(c.data_medicao()) == ciclo_aberto)
                              .max_by_key(|c| c.data_medicao());
    let capacidade = match cubagem_vigente {
        Some(c) => c.volume_reduzido(),
        None => return Ok(None),
    };

    let volumes: Vec<f64> = repo.retiradas(paiol_id)?
                                .into_iter()
                                .filter(|r| atribuidor.ciclo_de(r.data_retirada) == ciclo_aberto)
                                .map(|r| r.volume_retirado)
                                .collect();

    Ok(Some(SituacaoPaiol { ciclo: ciclo_aberto,
                            capacidade,
                            situacao: situacao_retiradas(capacidade, &volumes) }))
}
