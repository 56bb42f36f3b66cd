// paiol-domain library entry point
pub mod cubagem;
pub mod dragagem;
pub mod equipe;
pub mod errors;
pub mod fechamento;
pub mod financeiro;
pub mod paiol;
pub mod retirada;
pub mod status;
pub mod volume;

pub use cubagem::Cubagem;
pub use dragagem::Dragagem;
pub use equipe::{Ajudante, Cliente, Dragador, TipoPessoa};
pub use errors::DomainError;
pub use fechamento::Fechamento;
pub use financeiro::{GastoInsumo, PagamentoPessoal, TipoPagamento};
pub use paiol::Paiol;
pub use retirada::{Retirada, StatusPagamento};
pub use status::{StatusPaiol, TransicaoStatus};
pub use volume::{AvisoCubagem, SituacaoVolume, VolumeCalculado};
