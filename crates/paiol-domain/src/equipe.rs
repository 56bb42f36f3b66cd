//! Personas involucradas en la operación: equipo de dragagem y clientes.
//! El CRUD de estas entidades vive fuera del motor; aquí sólo importan como
//! destino de referencias cruzadas (nombres en el timeline, beneficiarios de
//! pagos).
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::DomainError;
use std::fmt;

/// Operador líder de una dragagem. Obligatorio para iniciarla.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dragador {
    pub id: Uuid,
    pub nome: String,
    pub ativo: bool,
}

impl Dragador {
    pub fn novo(nome: &str) -> Result<Self, DomainError> {
        Ok(Self { id: Uuid::new_v4(), nome: nome_valido(nome)?, ativo: true })
    }
}

/// Auxiliar opcional de la dragagem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ajudante {
    pub id: Uuid,
    pub nome: String,
    pub ativo: bool,
}

impl Ajudante {
    pub fn novo(nome: &str) -> Result<Self, DomainError> {
        Ok(Self { id: Uuid::new_v4(), nome: nome_valido(nome)?, ativo: true })
    }
}

/// Cliente que retira material del paiol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cliente {
    pub id: Uuid,
    pub nome: String,
    pub ativo: bool,
}

impl Cliente {
    pub fn novo(nome: &str) -> Result<Self, DomainError> {
        Ok(Self { id: Uuid::new_v4(), nome: nome_valido(nome)?, ativo: true })
    }
}

fn nome_valido(nome: &str) -> Result<String, DomainError> {
    let nome = nome.trim();
    if nome.is_empty() {
        return Err(DomainError::Validacao("nome é obrigatório".to_string()));
    }
    Ok(nome.to_string())
}

/// Discriminador del beneficiario de un `PagamentoPessoal`: la referencia
/// `pessoa_id` apunta a la tabla de dragadores o a la de ajudantes según
/// este valor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TipoPessoa {
    Dragador,
    Ajudante,
}

impl TipoPessoa {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipoPessoa::Dragador => "DRAGADOR",
            TipoPessoa::Ajudante => "AJUDANTE",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "DRAGADOR" => Ok(TipoPessoa::Dragador),
            "AJUDANTE" => Ok(TipoPessoa::Ajudante),
            other => Err(DomainError::Validacao(format!("tipo de pessoa desconocido: {other}"))),
        }
    }
}

impl fmt::Display for TipoPessoa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
