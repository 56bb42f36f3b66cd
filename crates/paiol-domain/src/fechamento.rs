use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cierre de ciclo de un paiol. Append-only.
///
/// Es el único mecanismo de frontera entre ciclos: N fechamentos implican
/// N+1 ciclos. No existe registro explícito de inicio/fin de ciclo; el
/// número de ciclo de cualquier instante se deriva contando fechamentos
/// estrictamente anteriores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fechamento {
    pub id: Uuid,
    pub paiol_id: Uuid,
    pub data_fechamento: DateTime<Utc>,
}

impl Fechamento {
    pub fn novo(paiol_id: Uuid, data_fechamento: DateTime<Utc>) -> Self {
        Self { id: Uuid::new_v4(), paiol_id, data_fechamento }
    }
}
