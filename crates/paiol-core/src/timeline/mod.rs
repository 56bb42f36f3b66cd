pub mod filtro;
pub mod montador;
pub mod types;

pub use filtro::{FiltroTimeline, Ordenacao};
pub use montador::MontadorTimeline;
pub use types::{DetalheEvento, EventoTimeline, TipoEvento};
