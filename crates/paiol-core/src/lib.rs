//! paiol-core: máquina de estados, atribución de ciclos y timeline del paiol
pub mod ciclo;
pub mod errors;
pub mod maquina;
pub mod repo;
pub mod timeline;
pub mod volume;

pub use ciclo::AtribuidorCiclo;
pub use errors::{CoreError, ErroTransicao};
pub use maquina::{validar_transicao, EquipeDragagem, MaquinaStatus};
pub use repo::{InMemoryPaiolRepository, PaiolRepository};
pub use timeline::{DetalheEvento, EventoTimeline, FiltroTimeline, MontadorTimeline, Ordenacao, TipoEvento};
pub use volume::{situacao_do_paiol, SituacaoPaiol};
