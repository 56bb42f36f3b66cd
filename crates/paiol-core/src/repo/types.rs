//! Repositorio explícito del motor: una interfaz por tipo de registro.
//!
//! Sustituye el acceso ambiente a un handle global de base remota: el motor
//! recibe el repositorio inyectado y es testeable con el backend in-memory.
//!
//! Contratos:
//! - Las lecturas son snapshots independientes; el montador del timeline lee
//!   cada origen una sola vez por llamada.
//! - Las escrituras compuestas (`iniciar_dragagem`, `encerrar_dragagem`,
//!   `registrar_fechamento`) son UNA operación del repositorio: la
//!   implementación Postgres las ejecuta en una única transacción, nunca
//!   como dos escrituras secuenciales del cliente.
//! - Los fallos de transporte se devuelven como `CoreError::Transporte`.
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use paiol_domain::{Ajudante, Cliente, Cubagem, Dragador, Dragagem, Fechamento, GastoInsumo, PagamentoPessoal,
                   Paiol, Retirada, TransicaoStatus};

use crate::errors::CoreError;

pub trait PaiolRepository {
    // -- lecturas ---------------------------------------------------------
    fn paiol(&self, id: Uuid) -> Result<Paiol, CoreError>;
    fn paiois(&self) -> Result<Vec<Paiol>, CoreError>;
    fn transicoes(&self, paiol_id: Uuid) -> Result<Vec<TransicaoStatus>, CoreError>;
    fn dragagens(&self, paiol_id: Uuid) -> Result<Vec<Dragagem>, CoreError>;
    fn cubagens(&self, paiol_id: Uuid) -> Result<Vec<Cubagem>, CoreError>;
    fn retiradas(&self, paiol_id: Uuid) -> Result<Vec<Retirada>, CoreError>;
    fn pagamentos(&self, paiol_id: Uuid) -> Result<Vec<PagamentoPessoal>, CoreError>;
    fn gastos(&self, paiol_id: Uuid) -> Result<Vec<GastoInsumo>, CoreError>;
    fn fechamentos(&self, paiol_id: Uuid) -> Result<Vec<Fechamento>, CoreError>;

    /// Resolución de nombres en lote: una consulta por conjunto de ids
    /// distintos, no una por registro. Ids ausentes simplemente no aparecen
    /// en el mapa.
    fn nomes_dragadores(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, CoreError>;
    fn nomes_ajudantes(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, CoreError>;
    fn nomes_clientes(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, CoreError>;

    // -- escrituras -------------------------------------------------------
    fn criar_paiol(&mut self, paiol: Paiol) -> Result<Paiol, CoreError>;
    fn desativar_paiol(&mut self, id: Uuid) -> Result<(), CoreError>;

    /// Inserta la transición y actualiza el status del paiol, atómicamente.
    fn aplicar_transicao(&mut self, transicao: TransicaoStatus) -> Result<TransicaoStatus, CoreError>;

    /// Alta de sesión + transición VAZIO->DRAGANDO en una operación.
    fn iniciar_dragagem(&mut self, dragagem: Dragagem, transicao: TransicaoStatus) -> Result<Dragagem, CoreError>;

    /// Cierra la sesión (`data_fim`) y pasa el paiol a CHEIO en una
    /// operación; un fallo parcial no puede dejar la sesión cerrada con el
    /// paiol todavía DRAGANDO ni al revés.
    fn encerrar_dragagem(&mut self,
                         dragagem_id: Uuid,
                         data_fim: DateTime<Utc>,
                         transicao: TransicaoStatus)
                         -> Result<Dragagem, CoreError>;

    /// Fechamento + transición RETIRANDO->VAZIO + incremento de
    /// `ciclo_atual`, en una operación.
    fn registrar_fechamento(&mut self,
                            fechamento: Fechamento,
                            transicao: TransicaoStatus)
                            -> Result<Fechamento, CoreError>;

    /// Exactamente una cubagem por dragagem; la segunda se rechaza con
    /// `CubagemDuplicada`.
    fn registrar_cubagem(&mut self, cubagem: Cubagem) -> Result<Cubagem, CoreError>;
    fn registrar_retirada(&mut self, retirada: Retirada) -> Result<Retirada, CoreError>;
    fn registrar_pagamento(&mut self, pagamento: PagamentoPessoal) -> Result<PagamentoPessoal, CoreError>;
    fn registrar_gasto(&mut self, gasto: GastoInsumo) -> Result<GastoInsumo, CoreError>;
}

/// Backend in-memory para tests y demos. Las operaciones compuestas son
/// trivialmente atómicas dentro del proceso.
#[derive(Default)]
pub struct InMemoryPaiolRepository {
    paiois: HashMap<Uuid, Paiol>,
    transicoes: Vec<TransicaoStatus>,
    dragagens: Vec<Dragagem>,
    cubagens: Vec<Cubagem>,
    retiradas: Vec<Retirada>,
    pagamentos: Vec<PagamentoPessoal>,
    gastos: Vec<GastoInsumo>,
    fechamentos: Vec<Fechamento>,
    dragadores: HashMap<Uuid, Dragador>,
    ajudantes: HashMap<Uuid, Ajudante>,
    clientes: HashMap<Uuid, Cliente>,
}

impl InMemoryPaiolRepository {
    pub fn new() -> Self {
        Self::default()
    }

    // Altas de catálogo para armar escenarios.
    pub fn inserir_dragador(&mut self, dragador: Dragador) {
        self.dragadores.insert(dragador.id, dragador);
    }
    pub fn inserir_ajudante(&mut self, ajudante: Ajudante) {
        self.ajudantes.insert(ajudante.id, ajudante);
    }
    pub fn inserir_cliente(&mut self, cliente: Cliente) {
        self.clientes.insert(cliente.id, cliente);
    }

    // Siembra directa de registros con timestamps controlados, sin pasar por
    // la máquina de estados. Sólo para armar escenarios de test/demo.
    pub fn inserir_dragagem(&mut self, dragagem: Dragagem) {
        self.dragagens.push(dragagem);
    }
    pub fn inserir_cubagem(&mut self, cubagem: Cubagem) {
        self.cubagens.push(cubagem);
    }
    pub fn inserir_retirada(&mut self, retirada: Retirada) {
        self.retiradas.push(retirada);
    }
    pub fn inserir_pagamento(&mut self, pagamento: PagamentoPessoal) {
        self.pagamentos.push(pagamento);
    }
    pub fn inserir_gasto(&mut self, gasto: GastoInsumo) {
        self.gastos.push(gasto);
    }
    pub fn inserir_fechamento(&mut self, fechamento: Fechamento) {
        self.fechamentos.push(fechamento);
    }
    pub fn inserir_transicao(&mut self, transicao: TransicaoStatus) {
        self.transicoes.push(transicao);
    }

    fn dragagem_ids(&self, paiol_id: Uuid) -> HashSet<Uuid> {
        self.dragagens
            .iter()
            .filter(|d| d.paiol_id == paiol_id)
            .map(|d| d.id)
            .collect()
    }
}

impl PaiolRepository for InMemoryPaiolRepository {
    fn paiol(&self, id: Uuid) -> Result<Paiol, CoreError> {
        self.paiois
            .get(&id)
            .cloned()
            .ok_or(CoreError::PaiolNaoEncontrado(id))
    }

    fn paiois(&self) -> Result<Vec<Paiol>, CoreError> {
        let mut todos: Vec<Paiol> = self.paiois.values().cloned().collect();
        todos.sort_by_key(|p| p.criado_em());
        Ok(todos)
    }

    fn transicoes(&self, paiol_id: Uuid) -> Result<Vec<TransicaoStatus>, CoreError> {
        Ok(self.transicoes
               .iter()
               .filter(|t| t.paiol_id == paiol_id)
               .cloned()
               .collect())
    }

    fn dragagens(&self, paiol_id: Uuid) -> Result<Vec<Dragagem>, CoreError> {
        Ok(self.dragagens
               .iter()
               .filter(|d| d.paiol_id == paiol_id)
               .cloned()
               .collect())
    }

    fn cubagens(&self, paiol_id: Uuid) -> Result<Vec<Cubagem>, CoreError> {
        let ids = self.dragagem_ids(paiol_id);
        Ok(self.cubagens
               .iter()
               .filter(|c| ids.contains(&c.dragagem_id()))
               .cloned()
               .collect())
    }

    fn retiradas(&self, paiol_id: Uuid) -> Result<Vec<Retirada>, CoreError> {
        Ok(self.retiradas
               .iter()
               .filter(|r| r.paiol_id == paiol_id)
               .cloned()
               .collect())
    }

    fn pagamentos(&self, paiol_id: Uuid) -> Result<Vec<PagamentoPessoal>, CoreError> {
        let ids = self.dragagem_ids(paiol_id);
        Ok(self.pagamentos
               .iter()
               .filter(|p| ids.contains(&p.dragagem_id))
               .cloned()
               .collect())
    }

    fn gastos(&self, paiol_id: Uuid) -> Result<Vec<GastoInsumo>, CoreError> {
        let ids = self.dragagem_ids(paiol_id);
        Ok(self.gastos
               .iter()
               .filter(|g| ids.contains(&g.dragagem_id))
               .cloned()
               .collect())
    }

    fn fechamentos(&self, paiol_id: Uuid) -> Result<Vec<Fechamento>, CoreError> {
        Ok(self.fechamentos
               .iter()
               .filter(|f| f.paiol_id == paiol_id)
               .cloned()
               .collect())
    }

    fn nomes_dragadores(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, CoreError> {
        Ok(ids.iter()
              .filter_map(|id| self.dragadores.get(id).map(|d| (*id, d.nome.clone())))
              .collect())
    }

    fn nomes_ajudantes(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, CoreError> {
        Ok(ids.iter()
              .filter_map(|id| self.ajudantes.get(id).map(|a| (*id, a.nome.clone())))
              .collect())
    }

    fn nomes_clientes(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, CoreError> {
        Ok(ids.iter()
              .filter_map(|id| self.clientes.get(id).map(|c| (*id, c.nome.clone())))
              .collect())
    }

    fn criar_paiol(&mut self, paiol: Paiol) -> Result<Paiol, CoreError> {
        self.paiois.insert(paiol.id(), paiol.clone());
        Ok(paiol)
    }

    fn desativar_paiol(&mut self, id: Uuid) -> Result<(), CoreError> {
        let paiol = self.paiois
                        .get_mut(&id)
                        .ok_or(CoreError::PaiolNaoEncontrado(id))?;
        paiol.desativar();
        Ok(())
    }

    fn aplicar_transicao(&mut self, transicao: TransicaoStatus) -> Result<TransicaoStatus, CoreError> {
        let paiol = self.paiois
                        .get_mut(&transicao.paiol_id)
                        .ok_or(CoreError::PaiolNaoEncontrado(transicao.paiol_id))?;
        paiol.marcar_status(transicao.status_novo);
        self.transicoes.push(transicao.clone());
        Ok(transicao)
    }

    fn iniciar_dragagem(&mut self, dragagem: Dragagem, transicao: TransicaoStatus) -> Result<Dragagem, CoreError> {
        let paiol = self.paiois
                        .get_mut(&transicao.paiol_id)
                        .ok_or(CoreError::PaiolNaoEncontrado(transicao.paiol_id))?;
        paiol.marcar_status(transicao.status_novo);
        self.transicoes.push(transicao);
        self.dragagens.push(dragagem.clone());
        Ok(dragagem)
    }

    fn encerrar_dragagem(&mut self,
                         dragagem_id: Uuid,
                         data_fim: DateTime<Utc>,
                         transicao: TransicaoStatus)
                         -> Result<Dragagem, CoreError> {
        let dragagem = self.dragagens
                           .iter_mut()
                           .find(|d| d.id == dragagem_id)
                           .ok_or(CoreError::DragagemNaoEncontrada(dragagem_id))?;
        dragagem.encerrar(data_fim)?;
        let dragagem = dragagem.clone();
        let paiol = self.paiois
                        .get_mut(&transicao.paiol_id)
                        .ok_or(CoreError::PaiolNaoEncontrado(transicao.paiol_id))?;
        paiol.marcar_status(transicao.status_novo);
        self.transicoes.push(transicao);
        Ok(dragagem)
    }

    fn registrar_fechamento(&mut self,
                            fechamento: Fechamento,
                            transicao: TransicaoStatus)
                            -> Result<Fechamento, CoreError> {
        let paiol = self.paiois
                        .get_mut(&transicao.paiol_id)
                        .ok_or(CoreError::PaiolNaoEncontrado(transicao.paiol_id))?;
        paiol.marcar_status(transicao.status_novo);
        paiol.incrementar_ciclo();
        self.transicoes.push(transicao);
        self.fechamentos.push(fechamento.clone());
        Ok(fechamento)
    }

    fn registrar_cubagem(&mut self, cubagem: Cubagem) -> Result<Cubagem, CoreError> {
        if !self.dragagens.iter().any(|d| d.id == cubagem.dragagem_id()) {
            return Err(CoreError::DragagemNaoEncontrada(cubagem.dragagem_id()));
        }
        if self.cubagens
               .iter()
               .any(|c| c.dragagem_id() == cubagem.dragagem_id())
        {
            return Err(CoreError::CubagemDuplicada(cubagem.dragagem_id()));
        }
        self.cubagens.push(cubagem.clone());
        Ok(cubagem)
    }

    fn registrar_retirada(&mut self, retirada: Retirada) -> Result<Retirada, CoreError> {
        if !self.paiois.contains_key(&retirada.paiol_id) {
            return Err(CoreError::PaiolNaoEncontrado(retirada.paiol_id));
        }
        self.retiradas.push(retirada.clone());
        Ok(retirada)
    }

    fn registrar_pagamento(&mut self, pagamento: PagamentoPessoal) -> Result<PagamentoPessoal, CoreError> {
        if !self.dragagens.iter().any(|d| d.id == pagamento.dragagem_id) {
            return Err(CoreError::DragagemNaoEncontrada(pagamento.dragagem_id));
        }
        self.pagamentos.push(pagamento.clone());
        Ok(pagamento)
    }

    fn registrar_gasto(&mut self, gasto: GastoInsumo) -> Result<GastoInsumo, CoreError> {
        if !self.dragagens.iter().any(|d| d.id == gasto.dragagem_id) {
            return Err(CoreError::DragagemNaoEncontrada(gasto.dragagem_id));
        }
        self.gastos.push(gasto.clone());
        Ok(gasto)
    }
}
