use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::StatusPaiol;
use crate::DomainError;
use std::fmt;

/// Un paiol (pozo de almacenamiento de arena dragada).
///
/// Invariantes:
/// - `nome` y `localizacao` no vacíos.
/// - `ciclo_atual >= 1`; el contador es informativo, el número autoritativo
///   de ciclo de cualquier instante se deriva de los fechamentos.
/// - Nunca se elimina físicamente; `desativar` apaga el flag `ativo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paiol {
    id: Uuid,
    nome: String,
    localizacao: String,
    status: StatusPaiol,
    ciclo_atual: u32,
    criado_em: DateTime<Utc>,
    ativo: bool,
}

impl Paiol {
    /// Crea un paiol nuevo: vacío, ciclo 1, activo.
    pub fn novo(nome: &str, localizacao: &str) -> Result<Self, DomainError> {
        let nome = nome.trim();
        let localizacao = localizacao.trim();
        if nome.is_empty() {
            return Err(DomainError::Validacao("nome do paiol é obrigatório".to_string()));
        }
        if localizacao.is_empty() {
            return Err(DomainError::Validacao("localização do paiol é obrigatória".to_string()));
        }
        Ok(Paiol { id: Uuid::new_v4(),
                   nome: nome.to_string(),
                   localizacao: localizacao.to_string(),
                   status: StatusPaiol::Vazio,
                   ciclo_atual: 1,
                   criado_em: Utc::now(),
                   ativo: true })
    }

    /// Rehidrata un paiol desde el almacenamiento. No revalida los campos:
    /// la fila ya pasó por `novo` al crearse.
    pub fn reconstruir(id: Uuid,
                       nome: String,
                       localizacao: String,
                       status: StatusPaiol,
                       ciclo_atual: u32,
                       criado_em: DateTime<Utc>,
                       ativo: bool)
                       -> Self {
        Paiol { id, nome, localizacao, status, ciclo_atual, criado_em, ativo }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn nome(&self) -> &str { &self.nome }
    pub fn localizacao(&self) -> &str { &self.localizacao }
    pub fn status(&self) -> StatusPaiol { self.status }
    pub fn ciclo_atual(&self) -> u32 { self.ciclo_atual }
    pub fn criado_em(&self) -> DateTime<Utc> { self.criado_em }
    pub fn ativo(&self) -> bool { self.ativo }

    /// Aplica el status ya validado por la máquina de estados.
    pub fn marcar_status(&mut self, status: StatusPaiol) {
        self.status = status;
    }

    /// Incrementa el contador informativo al cerrar un ciclo.
    pub fn incrementar_ciclo(&mut self) {
        self.ciclo_atual += 1;
    }

    /// Baja lógica; el historial del paiol sigue siendo consultable.
    pub fn desativar(&mut self) {
        self.ativo = false;
    }
}

impl fmt::Display for Paiol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<paiol {} [{}] ciclo {}>", self.nome, self.status, self.ciclo_atual)
    }
}
