//! Máquina de estados del paiol.
//!
//! Valida y ejecuta las transiciones permitidas (adyacencia estricta
//! VAZIO -> DRAGANDO -> CHEIO -> RETIRANDO -> VAZIO), registra cada
//! transición ejecutada como fila append-only y mantiene el status del paiol
//! a través del repositorio inyectado.
//!
//! Las operaciones que combinan transición con otra escritura (alta de
//! dragagem, cierre de dragagem, fechamento de ciclo) se delegan al
//! repositorio como UNA operación; la máquina sólo decide si son admisibles.
//! Ninguna transición fallida se reintenta: el llamador corrige y reenvía.
use chrono::Utc;
use uuid::Uuid;

use paiol_domain::{Cubagem, Dragagem, Fechamento, GastoInsumo, PagamentoPessoal, Retirada, StatusPagamento,
                   StatusPaiol, TipoPagamento, TipoPessoa, TransicaoStatus};
use paiol_domain::volume::AvisoCubagem;

use crate::errors::{CoreError, ErroTransicao};
use crate::repo::PaiolRepository;

/// Referencias del equipo exigidas por la transición VAZIO -> DRAGANDO.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EquipeDragagem {
    pub dragador_id: Option<Uuid>,
    pub ajudante_id: Option<Uuid>,
}

/// Valida una transición sin ejecutarla.
///
/// Devuelve la lista completa de violaciones (no corta en la primera) para
/// que el llamador pueda mostrarlas todas de una vez.
pub fn validar_transicao(atual: StatusPaiol,
                         novo: StatusPaiol,
                         equipe: &EquipeDragagem)
                         -> Result<(), Vec<ErroTransicao>> {
    let mut erros = Vec::new();
    if atual.proximo() != novo {
        erros.push(ErroTransicao::NaoPermitida { de: atual, para: novo });
    }
    if atual == StatusPaiol::Vazio && novo == StatusPaiol::Dragando && equipe.dragador_id.is_none() {
        erros.push(ErroTransicao::DragadorObrigatorio);
    }
    if erros.is_empty() {
        Ok(())
    } else {
        Err(erros)
    }
}

/// Ejecutor de transiciones sobre un repositorio.
pub struct MaquinaStatus<R: PaiolRepository> {
    repo: R,
}

impl<R: PaiolRepository> MaquinaStatus<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn repo_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    pub fn into_repo(self) -> R {
        self.repo
    }

    /// Ejecuta una transición genérica: valida el borde y escribe la fila de
    /// transición + el nuevo status. No crea registros colaterales; para el
    /// alta de sesión usar `iniciar_dragagem`, para el cierre
    /// `encerrar_dragagem`, para el fin de ciclo `concluir_ciclo`.
    pub fn aplicar(&mut self,
                   paiol_id: Uuid,
                   status_novo: StatusPaiol,
                   equipe: EquipeDragagem,
                   observacoes: Option<String>)
                   -> Result<TransicaoStatus, CoreError> {
        let paiol = self.repo.paiol(paiol_id)?;
        validar_transicao(paiol.status(), status_novo, &equipe).map_err(CoreError::TransicaoInvalida)?;
        let transicao =
            TransicaoStatus::nova(paiol_id, Some(paiol.status()), status_novo, Utc::now(), observacoes);
        self.repo.aplicar_transicao(transicao)
    }

    /// VAZIO -> DRAGANDO con alta de sesión. Rechaza una segunda sesión
    /// abierta para el mismo paiol.
    pub fn iniciar_dragagem(&mut self,
                            paiol_id: Uuid,
                            equipe: EquipeDragagem,
                            observacoes: Option<String>)
                            -> Result<Dragagem, CoreError> {
        let paiol = self.repo.paiol(paiol_id)?;
        validar_transicao(paiol.status(), StatusPaiol::Dragando, &equipe).map_err(CoreError::TransicaoInvalida)?;
        let dragador_id = match equipe.dragador_id {
            Some(id) => id,
            None => return Err(CoreError::TransicaoInvalida(vec![ErroTransicao::DragadorObrigatorio])),
        };
        if self.repo.dragagens(paiol_id)?.iter().any(|d| d.ativa()) {
            return Err(CoreError::TransicaoInvalida(vec![ErroTransicao::DragagemAberta]));
        }
        let agora = Utc::now();
        let dragagem = Dragagem::nova(paiol_id, dragador_id, equipe.ajudante_id, agora);
        let transicao = TransicaoStatus::nova(paiol_id,
                                              Some(paiol.status()),
                                              StatusPaiol::Dragando,
                                              agora,
                                              observacoes);
        self.repo.iniciar_dragagem(dragagem, transicao)
    }

    /// DRAGANDO -> CHEIO cerrando la sesión activa. Cierre de `data_fim` y
    /// cambio de status viajan en la misma operación del repositorio.
    pub fn encerrar_dragagem(&mut self,
                             paiol_id: Uuid,
                             observacoes: Option<String>)
                             -> Result<Dragagem, CoreError> {
        let paiol = self.repo.paiol(paiol_id)?;
        validar_transicao(paiol.status(), StatusPaiol::Cheio, &EquipeDragagem::default())
            .map_err(CoreError::TransicaoInvalida)?;
        let ativa = self.repo
                        .dragagens(paiol_id)?
                        .into_iter()
                        .find(|d| d.ativa())
                        .ok_or(CoreError::SemDragagemAtiva(paiol_id))?;
        let agora = Utc::now();
        let transicao =
            TransicaoStatus::nova(paiol_id, Some(paiol.status()), StatusPaiol::Cheio, agora, observacoes);
        self.repo.encerrar_dragagem(ativa.id, agora, transicao)
    }

    /// CHEIO -> RETIRANDO.
    pub fn iniciar_retirada(&mut self,
                            paiol_id: Uuid,
                            observacoes: Option<String>)
                            -> Result<TransicaoStatus, CoreError> {
        self.aplicar(paiol_id, StatusPaiol::Retirando, EquipeDragagem::default(), observacoes)
    }

    /// RETIRANDO -> VAZIO con fechamento de ciclo: el fechamento, la
    /// transición y el incremento de `ciclo_atual` son una sola operación.
    pub fn concluir_ciclo(&mut self,
                          paiol_id: Uuid,
                          observacoes: Option<String>)
                          -> Result<Fechamento, CoreError> {
        let paiol = self.repo.paiol(paiol_id)?;
        validar_transicao(paiol.status(), StatusPaiol::Vazio, &EquipeDragagem::default())
            .map_err(CoreError::TransicaoInvalida)?;
        let agora = Utc::now();
        let fechamento = Fechamento::novo(paiol_id, agora);
        let transicao =
            TransicaoStatus::nova(paiol_id, Some(paiol.status()), StatusPaiol::Vazio, agora, observacoes);
        self.repo.registrar_fechamento(fechamento, transicao)
    }

    /// Registra la cubagem de una dragagem derivando el volumen por el
    /// modelo cilíndrico. Los avisos devueltos son consultivos.
    pub fn registrar_cubagem(&mut self,
                             dragagem_id: Uuid,
                             medida_inferior: f64,
                             medida_superior: f64,
                             perimetro: f64,
                             volume_reduzido: f64)
                             -> Result<(Cubagem, Vec<AvisoCubagem>), CoreError> {
        let (cubagem, avisos) = Cubagem::nova(dragagem_id,
                                              medida_inferior,
                                              medida_superior,
                                              perimetro,
                                              volume_reduzido,
                                              Utc::now())?;
        let cubagem = self.repo.registrar_cubagem(cubagem)?;
        Ok((cubagem, avisos))
    }

    /// Registra una retirada. El sobregiro del volumen disponible es un
    /// estado válido: aquí no hay tope contra el saldo.
    pub fn registrar_retirada(&mut self,
                              paiol_id: Uuid,
                              cliente_id: Uuid,
                              volume_retirado: f64,
                              valor_unitario: Option<f64>,
                              status_pagamento: StatusPagamento,
                              tem_frete: bool)
                              -> Result<Retirada, CoreError> {
        let retirada = Retirada::nova(paiol_id,
                                      cliente_id,
                                      volume_retirado,
                                      valor_unitario,
                                      status_pagamento,
                                      tem_frete,
                                      Utc::now())?;
        self.repo.registrar_retirada(retirada)
    }

    pub fn registrar_pagamento(&mut self,
                               dragagem_id: Uuid,
                               tipo_pessoa: TipoPessoa,
                               pessoa_id: Uuid,
                               tipo_pagamento: TipoPagamento,
                               valor: f64)
                               -> Result<PagamentoPessoal, CoreError> {
        let pagamento =
            PagamentoPessoal::novo(dragagem_id, tipo_pessoa, pessoa_id, tipo_pagamento, valor, Utc::now())?;
        self.repo.registrar_pagamento(pagamento)
    }

    pub fn registrar_gasto(&mut self,
                           dragagem_id: Uuid,
                           tipo_insumo: &str,
                           categoria: &str,
                           quantidade: f64,
                           unidade: &str,
                           valor_unitario: f64)
                           -> Result<GastoInsumo, CoreError> {
        let gasto =
            GastoInsumo::novo(dragagem_id, tipo_insumo, categoria, quantidade, unidade, valor_unitario, Utc::now())?;
        self.repo.registrar_gasto(gasto)
    }
}
