//! Atribución de ciclos a partir de los fechamentos de un paiol.
//!
//! El número de ciclo de un instante `t` es `1 + #{fechamentos < t}`. La
//! lista se toma como snapshot una sola vez por agregación y se consulta por
//! búsqueda binaria: una misma instancia responde por los seis orígenes de
//! eventos del timeline, en vez de una consulta por evento.
use chrono::{DateTime, Utc};

/// Atribuidor de ciclos para un paiol.
#[derive(Debug, Clone)]
pub struct AtribuidorCiclo {
    fechamentos: Vec<DateTime<Utc>>,
}

impl AtribuidorCiclo {
    /// Toma el snapshot de fechamentos y lo ordena una única vez.
    pub fn new(mut fechamentos: Vec<DateTime<Utc>>) -> Self {
        fechamentos.sort_unstable();
        Self { fechamentos }
    }

    /// Ciclo del instante `t`.
    ///
    /// Comparación estricta `<`: un timestamp exactamente igual a un
    /// fechamento pertenece al ciclo que ese fechamento cierra.
    pub fn ciclo_de(&self, t: DateTime<Utc>) -> u32 {
        self.fechamentos.partition_point(|f| *f < t) as u32 + 1
    }

    /// Cantidad de ciclos hasta ahora (el último siempre está abierto).
    pub fn total_ciclos(&self) -> u32 {
        self.fechamentos.len() as u32 + 1
    }
}
