//! Errores del core.
//!
//! Taxonomía:
//! - Validación (`TransicaoInvalida`, `Dominio`, `CubagemDuplicada`): el
//!   llamador corrige la entrada y reenvía; nunca se reintenta solo.
//! - No encontrado (`PaiolNaoEncontrado`, `DragagemNaoEncontrada`,
//!   `SemDragagemAtiva`): duro para lookups directos; dentro del timeline la
//!   resolución de referencias cruzadas degrada a un placeholder en vez de
//!   fallar (ver `timeline::montador`).
//! - Transporte (`Transporte`): el almacenamiento remoto no respondió;
//!   condición reintentable que burbujea sin modificar.

use paiol_domain::{DomainError, StatusPaiol};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Violación puntual detectada al validar una transición de status.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErroTransicao {
    #[error("transition not allowed: {de} -> {para}")]
    NaoPermitida { de: StatusPaiol, para: StatusPaiol },
    #[error("a dragador is required to start a dragagem")]
    DragadorObrigatorio,
    #[error("paiol already has an open dragagem")]
    DragagemAberta,
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid transition: {}", juntar(.0))]
    TransicaoInvalida(Vec<ErroTransicao>),
    #[error(transparent)]
    Dominio(#[from] DomainError),
    #[error("paiol not found: {0}")]
    PaiolNaoEncontrado(Uuid),
    #[error("dragagem not found: {0}")]
    DragagemNaoEncontrada(Uuid),
    #[error("no open dragagem for paiol {0}")]
    SemDragagemAtiva(Uuid),
    #[error("cubagem already registered for dragagem {0}")]
    CubagemDuplicada(Uuid),
    #[error("transport: {0}")]
    Transporte(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl CoreError {
    /// Sólo los fallos de transporte son reintentables; la política de retry
    /// (si existe) pertenece al colaborador externo, no al core.
    pub fn retryable(&self) -> bool {
        matches!(self, CoreError::Transporte(_))
    }
}

fn juntar(erros: &[ErroTransicao]) -> String {
    erros.iter()
         .map(|e| e.to_string())
         .collect::<Vec<_>>()
         .join("; ")
}
