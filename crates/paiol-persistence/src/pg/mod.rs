//! Implementación Postgres (Diesel) del `PaiolRepository` del core.
//!
//! Objetivo del módulo:
//! - Paridad 1:1 con el backend in-memory del core: mismas semánticas de
//!   lectura (snapshots ordenados) y de escritura.
//! - Las operaciones compuestas del contrato (alta de dragagem, cierre de
//!   dragagem, fechamento de ciclo) se ejecutan dentro de UNA transacción
//!   Diesel: un fallo parcial nunca deja la sesión cerrada con el paiol
//!   todavía DRAGANDO, ni un fechamento sin su transición.
//! - Manejo básico de errores transitorios: reintento con backoff acotado en
//!   lecturas y escrituras.
//! - El mapeo dominio <-> filas queda completamente aislado de `paiol-core`.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use log::{debug, warn};
use std::collections::HashMap;
use uuid::Uuid;

use paiol_core::{CoreError, PaiolRepository};
use paiol_domain::{Ajudante, Cliente, Cubagem, Dragador, Dragagem, Fechamento, GastoInsumo, PagamentoPessoal,
                   Paiol, Retirada, StatusPagamento, StatusPaiol, TipoPagamento, TipoPessoa, TransicaoStatus};

use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;
use crate::schema::{ajudantes, clientes, cubagens, dragadores, dragagens, fechamentos, gastos_insumo,
                    pagamentos_pessoal, paiois, retiradas, transicoes_status};

/// Pool r2d2 de conexiones Postgres. Al construirlo se corren las
/// migraciones pendientes una sola vez.
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones: permite inyectar un pool real o
/// simular en tests sin acoplar a r2d2.
pub trait ConnectionProvider: Send + Sync + 'static {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError>;
}

/// Provider respaldado por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

/// Retry con backoff pequeño (hasta 3 intentos) para errores transitorios.
/// No altera semántica de negocio; sólo repite la unidad de trabajo.
fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if e.transitoria() && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("error transitorio (intento {}): {:?} -> durmiendo {}ms", attempts + 1, e, delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

// ---------------------------------------------------------------------------
// Filas Diesel (Queryable para lecturas, Insertable para altas)
// ---------------------------------------------------------------------------

#[derive(Queryable, Debug)]
pub struct PaiolRow {
    pub id: Uuid,
    pub nome: String,
    pub localizacao: String,
    pub status: String,
    pub ciclo_atual: i32,
    pub criado_em: DateTime<Utc>,
    pub ativo: bool,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = paiois)]
pub struct NewPaiolRow<'a> {
    pub id: Uuid,
    pub nome: &'a str,
    pub localizacao: &'a str,
    pub status: &'a str,
    pub ciclo_atual: i32,
    pub criado_em: DateTime<Utc>,
    pub ativo: bool,
}

#[derive(Queryable, Debug)]
pub struct TransicaoRow {
    pub id: Uuid,
    pub paiol_id: Uuid,
    pub status_anterior: Option<String>,
    pub status_novo: String,
    pub data: DateTime<Utc>,
    pub observacoes: Option<String>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = transicoes_status)]
pub struct NewTransicaoRow<'a> {
    pub id: Uuid,
    pub paiol_id: Uuid,
    pub status_anterior: Option<&'a str>,
    pub status_novo: &'a str,
    pub data: DateTime<Utc>,
    pub observacoes: Option<&'a str>,
}

#[derive(Queryable, Debug)]
pub struct DragagemRow {
    pub id: Uuid,
    pub paiol_id: Uuid,
    pub dragador_id: Uuid,
    pub ajudante_id: Option<Uuid>,
    pub data_inicio: DateTime<Utc>,
    pub data_fim: Option<DateTime<Utc>>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = dragagens)]
pub struct NewDragagemRow {
    pub id: Uuid,
    pub paiol_id: Uuid,
    pub dragador_id: Uuid,
    pub ajudante_id: Option<Uuid>,
    pub data_inicio: DateTime<Utc>,
    pub data_fim: Option<DateTime<Utc>>,
}

#[derive(Queryable, Debug)]
pub struct CubagemRow {
    pub id: Uuid,
    pub dragagem_id: Uuid,
    pub medida_inferior: f64,
    pub medida_superior: f64,
    pub perimetro: f64,
    pub volume_normal: f64,
    pub volume_reduzido: f64,
    pub data_medicao: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = cubagens)]
pub struct NewCubagemRow {
    pub id: Uuid,
    pub dragagem_id: Uuid,
    pub medida_inferior: f64,
    pub medida_superior: f64,
    pub perimetro: f64,
    pub volume_normal: f64,
    pub volume_reduzido: f64,
    pub data_medicao: DateTime<Utc>,
}

#[derive(Queryable, Debug)]
pub struct RetiradaRow {
    pub id: Uuid,
    pub paiol_id: Uuid,
    pub cliente_id: Uuid,
    pub volume_retirado: f64,
    pub valor_unitario: Option<f64>,
    pub valor_total: Option<f64>,
    pub status_pagamento: String,
    pub tem_frete: bool,
    pub data_retirada: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = retiradas)]
pub struct NewRetiradaRow<'a> {
    pub id: Uuid,
    pub paiol_id: Uuid,
    pub cliente_id: Uuid,
    pub volume_retirado: f64,
    pub valor_unitario: Option<f64>,
    pub valor_total: Option<f64>,
    pub status_pagamento: &'a str,
    pub tem_frete: bool,
    pub data_retirada: DateTime<Utc>,
}

#[derive(Queryable, Debug)]
pub struct FechamentoRow {
    pub id: Uuid,
    pub paiol_id: Uuid,
    pub data_fechamento: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = fechamentos)]
pub struct NewFechamentoRow {
    pub id: Uuid,
    pub paiol_id: Uuid,
    pub data_fechamento: DateTime<Utc>,
}

#[derive(Queryable, Debug)]
pub struct PagamentoRow {
    pub id: Uuid,
    pub dragagem_id: Uuid,
    pub tipo_pessoa: String,
    pub pessoa_id: Uuid,
    pub tipo_pagamento: String,
    pub valor: f64,
    pub data_pagamento: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = pagamentos_pessoal)]
pub struct NewPagamentoRow<'a> {
    pub id: Uuid,
    pub dragagem_id: Uuid,
    pub tipo_pessoa: &'a str,
    pub pessoa_id: Uuid,
    pub tipo_pagamento: &'a str,
    pub valor: f64,
    pub data_pagamento: DateTime<Utc>,
}

#[derive(Queryable, Debug)]
pub struct GastoRow {
    pub id: Uuid,
    pub dragagem_id: Uuid,
    pub tipo_insumo: String,
    pub categoria: String,
    pub quantidade: f64,
    pub unidade: String,
    pub valor_unitario: f64,
    pub valor_total: f64,
    pub data_gasto: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = gastos_insumo)]
pub struct NewGastoRow<'a> {
    pub id: Uuid,
    pub dragagem_id: Uuid,
    pub tipo_insumo: &'a str,
    pub categoria: &'a str,
    pub quantidade: f64,
    pub unidade: &'a str,
    pub valor_unitario: f64,
    pub valor_total: f64,
    pub data_gasto: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Mapeo fila -> dominio
// ---------------------------------------------------------------------------

fn parse_status(s: &str) -> Result<StatusPaiol, PersistenceError> {
    StatusPaiol::parse(s).map_err(|e| PersistenceError::Unknown(e.to_string()))
}

fn paiol_de_row(row: PaiolRow) -> Result<Paiol, PersistenceError> {
    let status = parse_status(&row.status)?;
    Ok(Paiol::reconstruir(row.id,
                          row.nome,
                          row.localizacao,
                          status,
                          row.ciclo_atual.max(1) as u32,
                          row.criado_em,
                          row.ativo))
}

fn transicao_de_row(row: TransicaoRow) -> Result<TransicaoStatus, PersistenceError> {
    let status_anterior = row.status_anterior.as_deref().map(parse_status).transpose()?;
    Ok(TransicaoStatus { id: row.id,
                         paiol_id: row.paiol_id,
                         status_anterior,
                         status_novo: parse_status(&row.status_novo)?,
                         data: row.data,
                         observacoes: row.observacoes })
}

fn dragagem_de_row(row: DragagemRow) -> Dragagem {
    Dragagem { id: row.id,
               paiol_id: row.paiol_id,
               dragador_id: row.dragador_id,
               ajudante_id: row.ajudante_id,
               data_inicio: row.data_inicio,
               data_fim: row.data_fim }
}

fn cubagem_de_row(row: CubagemRow) -> Cubagem {
    Cubagem::reconstruir(row.id,
                         row.dragagem_id,
                         row.medida_inferior,
                         row.medida_superior,
                         row.perimetro,
                         row.volume_normal,
                         row.volume_reduzido,
                         row.data_medicao)
}

fn retirada_de_row(row: RetiradaRow) -> Result<Retirada, PersistenceError> {
    let status_pagamento = StatusPagamento::parse(&row.status_pagamento)
        .map_err(|e| PersistenceError::Unknown(e.to_string()))?;
    Ok(Retirada { id: row.id,
                  paiol_id: row.paiol_id,
                  cliente_id: row.cliente_id,
                  volume_retirado: row.volume_retirado,
                  valor_unitario: row.valor_unitario,
                  valor_total: row.valor_total,
                  status_pagamento,
                  tem_frete: row.tem_frete,
                  data_retirada: row.data_retirada })
}

fn pagamento_de_row(row: PagamentoRow) -> Result<PagamentoPessoal, PersistenceError> {
    let tipo_pessoa =
        TipoPessoa::parse(&row.tipo_pessoa).map_err(|e| PersistenceError::Unknown(e.to_string()))?;
    let tipo_pagamento =
        TipoPagamento::parse(&row.tipo_pagamento).map_err(|e| PersistenceError::Unknown(e.to_string()))?;
    Ok(PagamentoPessoal { id: row.id,
                          dragagem_id: row.dragagem_id,
                          tipo_pessoa,
                          pessoa_id: row.pessoa_id,
                          tipo_pagamento,
                          valor: row.valor,
                          data_pagamento: row.data_pagamento })
}

fn gasto_de_row(row: GastoRow) -> GastoInsumo {
    GastoInsumo { id: row.id,
                  dragagem_id: row.dragagem_id,
                  tipo_insumo: row.tipo_insumo,
                  categoria: row.categoria,
                  quantidade: row.quantidade,
                  unidade: row.unidade,
                  valor_unitario: row.valor_unitario,
                  valor_total: row.valor_total,
                  data_gasto: row.data_gasto }
}

/// Fallos de persistencia sin traducción específica burbujean como
/// transporte (reintentable para el llamador del core).
fn transporte(e: PersistenceError) -> CoreError {
    CoreError::Transporte(e.to_string())
}

// ---------------------------------------------------------------------------
// Repositorio
// ---------------------------------------------------------------------------

/// Implementación Postgres del `PaiolRepository`.
pub struct PgPaiolRepository<P: ConnectionProvider> {
    pub provider: P,
}

impl<P: ConnectionProvider> PgPaiolRepository<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    // Altas de catálogo (fuera del contrato del core).
    pub fn inserir_dragador(&mut self, dragador: &Dragador) -> Result<(), CoreError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            diesel::insert_into(dragadores::table)
                .values((dragadores::id.eq(dragador.id),
                         dragadores::nome.eq(&dragador.nome),
                         dragadores::ativo.eq(dragador.ativo)))
                .execute(&mut conn)
                .map_err(PersistenceError::from)?;
            Ok(())
        }).map_err(transporte)
    }

    pub fn inserir_ajudante(&mut self, ajudante: &Ajudante) -> Result<(), CoreError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            diesel::insert_into(ajudantes::table)
                .values((ajudantes::id.eq(ajudante.id),
                         ajudantes::nome.eq(&ajudante.nome),
                         ajudantes::ativo.eq(ajudante.ativo)))
                .execute(&mut conn)
                .map_err(PersistenceError::from)?;
            Ok(())
        }).map_err(transporte)
    }

    pub fn inserir_cliente(&mut self, cliente: &Cliente) -> Result<(), CoreError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            diesel::insert_into(clientes::table)
                .values((clientes::id.eq(cliente.id),
                         clientes::nome.eq(&cliente.nome),
                         clientes::ativo.eq(cliente.ativo)))
                .execute(&mut conn)
                .map_err(PersistenceError::from)?;
            Ok(())
        }).map_err(transporte)
    }

    fn transicao_tx(tx: &mut PgConnection, t: &TransicaoStatus) -> Result<(), PersistenceError> {
        diesel::insert_into(transicoes_status::table)
            .values(NewTransicaoRow { id: t.id,
                                      paiol_id: t.paiol_id,
                                      status_anterior: t.status_anterior.map(|s| s.as_str()),
                                      status_novo: t.status_novo.as_str(),
                                      data: t.data,
                                      observacoes: t.observacoes.as_deref() })
            .execute(tx)?;
        Ok(())
    }

    fn marcar_status_tx(tx: &mut PgConnection, paiol_id: Uuid, status: StatusPaiol) -> Result<(), PersistenceError> {
        let n = diesel::update(paiois::table.find(paiol_id))
            .set(paiois::status.eq(status.as_str()))
            .execute(tx)?;
        if n == 0 {
            return Err(PersistenceError::NotFound);
        }
        Ok(())
    }
}

impl<P: ConnectionProvider> PaiolRepository for PgPaiolRepository<P> {
    fn paiol(&self, id: Uuid) -> Result<Paiol, CoreError> {
        let row: Option<PaiolRow> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            paiois::table.find(id)
                         .first::<PaiolRow>(&mut conn)
                         .optional()
                         .map_err(PersistenceError::from)
        }).map_err(transporte)?;
        match row {
            Some(row) => paiol_de_row(row).map_err(transporte),
            None => Err(CoreError::PaiolNaoEncontrado(id)),
        }
    }

    fn paiois(&self) -> Result<Vec<Paiol>, CoreError> {
        let rows: Vec<PaiolRow> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            paiois::table.order(paiois::criado_em.asc())
                         .load(&mut conn)
                         .map_err(PersistenceError::from)
        }).map_err(transporte)?;
        rows.into_iter()
            .map(|r| paiol_de_row(r).map_err(transporte))
            .collect()
    }

    fn transicoes(&self, paiol_id: Uuid) -> Result<Vec<TransicaoStatus>, CoreError> {
        let rows: Vec<TransicaoRow> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            transicoes_status::table.filter(transicoes_status::paiol_id.eq(paiol_id))
                                    .order(transicoes_status::data.asc())
                                    .load(&mut conn)
                                    .map_err(PersistenceError::from)
        }).map_err(transporte)?;
        rows.into_iter()
            .map(|r| transicao_de_row(r).map_err(transporte))
            .collect()
    }

    fn dragagens(&self, paiol_id: Uuid) -> Result<Vec<Dragagem>, CoreError> {
        let rows: Vec<DragagemRow> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            dragagens::table.filter(dragagens::paiol_id.eq(paiol_id))
                            .order(dragagens::data_inicio.asc())
                            .load(&mut conn)
                            .map_err(PersistenceError::from)
        }).map_err(transporte)?;
        Ok(rows.into_iter().map(dragagem_de_row).collect())
    }

    fn cubagens(&self, paiol_id: Uuid) -> Result<Vec<Cubagem>, CoreError> {
        let rows: Vec<CubagemRow> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            cubagens::table.inner_join(dragagens::table)
                           .filter(dragagens::paiol_id.eq(paiol_id))
                           .select(cubagens::all_columns)
                           .order(cubagens::data_medicao.asc())
                           .load(&mut conn)
                           .map_err(PersistenceError::from)
        }).map_err(transporte)?;
        Ok(rows.into_iter().map(cubagem_de_row).collect())
    }

    fn retiradas(&self, paiol_id: Uuid) -> Result<Vec<Retirada>, CoreError> {
        let rows: Vec<RetiradaRow> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            retiradas::table.filter(retiradas::paiol_id.eq(paiol_id))
                            .order(retiradas::data_retirada.asc())
                            .load(&mut conn)
                            .map_err(PersistenceError::from)
        }).map_err(transporte)?;
        rows.into_iter()
            .map(|r| retirada_de_row(r).map_err(transporte))
            .collect()
    }

    fn pagamentos(&self, paiol_id: Uuid) -> Result<Vec<PagamentoPessoal>, CoreError> {
        let rows: Vec<PagamentoRow> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            pagamentos_pessoal::table.inner_join(dragagens::table)
                                     .filter(dragagens::paiol_id.eq(paiol_id))
                                     .select(pagamentos_pessoal::all_columns)
                                     .order(pagamentos_pessoal::data_pagamento.asc())
                                     .load(&mut conn)
                                     .map_err(PersistenceError::from)
        }).map_err(transporte)?;
        rows.into_iter()
            .map(|r| pagamento_de_row(r).map_err(transporte))
            .collect()
    }

    fn gastos(&self, paiol_id: Uuid) -> Result<Vec<GastoInsumo>, CoreError> {
        let rows: Vec<GastoRow> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            gastos_insumo::table.inner_join(dragagens::table)
                                .filter(dragagens::paiol_id.eq(paiol_id))
                                .select(gastos_insumo::all_columns)
                                .order(gastos_insumo::data_gasto.asc())
                                .load(&mut conn)
                                .map_err(PersistenceError::from)
        }).map_err(transporte)?;
        Ok(rows.into_iter().map(gasto_de_row).collect())
    }

    fn fechamentos(&self, paiol_id: Uuid) -> Result<Vec<Fechamento>, CoreError> {
        let rows: Vec<FechamentoRow> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            fechamentos::table.filter(fechamentos::paiol_id.eq(paiol_id))
                              .order(fechamentos::data_fechamento.asc())
                              .load(&mut conn)
                              .map_err(PersistenceError::from)
        }).map_err(transporte)?;
        Ok(rows.into_iter()
               .map(|r| Fechamento { id: r.id, paiol_id: r.paiol_id, data_fechamento: r.data_fechamento })
               .collect())
    }

    fn nomes_dragadores(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, CoreError> {
        let pares: Vec<(Uuid, String)> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            dragadores::table.filter(dragadores::id.eq_any(ids.to_vec()))
                             .select((dragadores::id, dragadores::nome))
                             .load(&mut conn)
                             .map_err(PersistenceError::from)
        }).map_err(transporte)?;
        Ok(pares.into_iter().collect())
    }

    fn nomes_ajudantes(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, CoreError> {
        let pares: Vec<(Uuid, String)> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            ajudantes::table.filter(ajudantes::id.eq_any(ids.to_vec()))
                            .select((ajudantes::id, ajudantes::nome))
                            .load(&mut conn)
                            .map_err(PersistenceError::from)
        }).map_err(transporte)?;
        Ok(pares.into_iter().collect())
    }

    fn nomes_clientes(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, CoreError> {
        let pares: Vec<(Uuid, String)> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            clientes::table.filter(clientes::id.eq_any(ids.to_vec()))
                           .select((clientes::id, clientes::nome))
                           .load(&mut conn)
                           .map_err(PersistenceError::from)
        }).map_err(transporte)?;
        Ok(pares.into_iter().collect())
    }

    fn criar_paiol(&mut self, paiol: Paiol) -> Result<Paiol, CoreError> {
        debug!("criar_paiol:start id={}", paiol.id());
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            diesel::insert_into(paiois::table)
                .values(NewPaiolRow { id: paiol.id(),
                                      nome: paiol.nome(),
                                      localizacao: paiol.localizacao(),
                                      status: paiol.status().as_str(),
                                      ciclo_atual: paiol.ciclo_atual() as i32,
                                      criado_em: paiol.criado_em(),
                                      ativo: paiol.ativo() })
                .execute(&mut conn)
                .map_err(PersistenceError::from)?;
            Ok(())
        }).map_err(transporte)?;
        debug!("criar_paiol:done id={}", paiol.id());
        Ok(paiol)
    }

    fn desativar_paiol(&mut self, id: Uuid) -> Result<(), CoreError> {
        let n = with_retry(|| {
            let mut conn = self.provider.connection()?;
            diesel::update(paiois::table.find(id))
                .set(paiois::ativo.eq(false))
                .execute(&mut conn)
                .map_err(PersistenceError::from)
        }).map_err(transporte)?;
        if n == 0 {
            return Err(CoreError::PaiolNaoEncontrado(id));
        }
        Ok(())
    }

    fn aplicar_transicao(&mut self, transicao: TransicaoStatus) -> Result<TransicaoStatus, CoreError> {
        debug!("aplicar_transicao:start paiol={} novo={}", transicao.paiol_id, transicao.status_novo);
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction().read_write().run(|tx| {
                Self::marcar_status_tx(tx, transicao.paiol_id, transicao.status_novo)?;
                Self::transicao_tx(tx, &transicao)
            })
        }).map_err(|e| match e {
              PersistenceError::NotFound => CoreError::PaiolNaoEncontrado(transicao.paiol_id),
              other => transporte(other),
          })?;
        debug!("aplicar_transicao:done paiol={}", transicao.paiol_id);
        Ok(transicao)
    }

    fn iniciar_dragagem(&mut self, dragagem: Dragagem, transicao: TransicaoStatus) -> Result<Dragagem, CoreError> {
        debug!("iniciar_dragagem:start paiol={}", dragagem.paiol_id);
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction().read_write().run(|tx| {
                Self::marcar_status_tx(tx, transicao.paiol_id, transicao.status_novo)?;
                diesel::insert_into(dragagens::table)
                    .values(NewDragagemRow { id: dragagem.id,
                                             paiol_id: dragagem.paiol_id,
                                             dragador_id: dragagem.dragador_id,
                                             ajudante_id: dragagem.ajudante_id,
                                             data_inicio: dragagem.data_inicio,
                                             data_fim: dragagem.data_fim })
                    .execute(tx)?;
                Self::transicao_tx(tx, &transicao)
            })
        }).map_err(|e| match e {
              PersistenceError::NotFound => CoreError::PaiolNaoEncontrado(transicao.paiol_id),
              other => transporte(other),
          })?;
        debug!("iniciar_dragagem:done dragagem={}", dragagem.id);
        Ok(dragagem)
    }

    fn encerrar_dragagem(&mut self,
                         dragagem_id: Uuid,
                         data_fim: DateTime<Utc>,
                         transicao: TransicaoStatus)
                         -> Result<Dragagem, CoreError> {
        debug!("encerrar_dragagem:start dragagem={}", dragagem_id);
        let row = with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction().read_write().run(|tx| {
                let row: DragagemRow = dragagens::table.find(dragagem_id)
                                                       .first(tx)
                                                       .optional()?
                                                       .ok_or(PersistenceError::NotFound)?;
                if row.data_fim.is_some() {
                    return Err(PersistenceError::CheckViolation("dragagem já encerrada".into()));
                }
                diesel::update(dragagens::table.find(dragagem_id))
                    .set(dragagens::data_fim.eq(Some(data_fim)))
                    .execute(tx)?;
                Self::marcar_status_tx(tx, transicao.paiol_id, transicao.status_novo)?;
                Self::transicao_tx(tx, &transicao)?;
                Ok(DragagemRow { data_fim: Some(data_fim), ..row })
            })
        }).map_err(|e| match e {
              PersistenceError::NotFound => CoreError::DragagemNaoEncontrada(dragagem_id),
              PersistenceError::CheckViolation(m) => {
                  CoreError::Dominio(paiol_domain::DomainError::Validacao(m))
              }
              other => transporte(other),
          })?;
        debug!("encerrar_dragagem:done dragagem={}", dragagem_id);
        Ok(dragagem_de_row(row))
    }

    fn registrar_fechamento(&mut self,
                            fechamento: Fechamento,
                            transicao: TransicaoStatus)
                            -> Result<Fechamento, CoreError> {
        debug!("registrar_fechamento:start paiol={}", fechamento.paiol_id);
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction().read_write().run(|tx| {
                let n = diesel::update(paiois::table.find(transicao.paiol_id))
                    .set((paiois::status.eq(transicao.status_novo.as_str()),
                          paiois::ciclo_atual.eq(paiois::ciclo_atual + 1)))
                    .execute(tx)?;
                if n == 0 {
                    return Err(PersistenceError::NotFound);
                }
                diesel::insert_into(fechamentos::table)
                    .values(NewFechamentoRow { id: fechamento.id,
                                               paiol_id: fechamento.paiol_id,
                                               data_fechamento: fechamento.data_fechamento })
                    .execute(tx)?;
                Self::transicao_tx(tx, &transicao)
            })
        }).map_err(|e| match e {
              PersistenceError::NotFound => CoreError::PaiolNaoEncontrado(transicao.paiol_id),
              other => transporte(other),
          })?;
        debug!("registrar_fechamento:done paiol={}", fechamento.paiol_id);
        Ok(fechamento)
    }

    fn registrar_cubagem(&mut self, cubagem: Cubagem) -> Result<Cubagem, CoreError> {
        let dragagem_id = cubagem.dragagem_id();
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction().read_write().run(|tx| {
                let existe: i64 = dragagens::table.filter(dragagens::id.eq(dragagem_id))
                                                  .count()
                                                  .get_result(tx)?;
                if existe == 0 {
                    return Err(PersistenceError::NotFound);
                }
                diesel::insert_into(cubagens::table)
                    .values(NewCubagemRow { id: cubagem.id(),
                                            dragagem_id,
                                            medida_inferior: cubagem.medida_inferior(),
                                            medida_superior: cubagem.medida_superior(),
                                            perimetro: cubagem.perimetro(),
                                            volume_normal: cubagem.volume_normal(),
                                            volume_reduzido: cubagem.volume_reduzido(),
                                            data_medicao: cubagem.data_medicao() })
                    .execute(tx)?;
                Ok(())
            })
        }).map_err(|e| match e {
              PersistenceError::NotFound => CoreError::DragagemNaoEncontrada(dragagem_id),
              PersistenceError::UniqueViolation(_) => CoreError::CubagemDuplicada(dragagem_id),
              other => transporte(other),
          })?;
        Ok(cubagem)
    }

    fn registrar_retirada(&mut self, retirada: Retirada) -> Result<Retirada, CoreError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            diesel::insert_into(retiradas::table)
                .values(NewRetiradaRow { id: retirada.id,
                                         paiol_id: retirada.paiol_id,
                                         cliente_id: retirada.cliente_id,
                                         volume_retirado: retirada.volume_retirado,
                                         valor_unitario: retirada.valor_unitario,
                                         valor_total: retirada.valor_total,
                                         status_pagamento: retirada.status_pagamento.as_str(),
                                         tem_frete: retirada.tem_frete,
                                         data_retirada: retirada.data_retirada })
                .execute(&mut conn)
                .map_err(PersistenceError::from)?;
            Ok(())
        }).map_err(|e| match e {
              PersistenceError::ForeignKeyViolation(_) => CoreError::PaiolNaoEncontrado(retirada.paiol_id),
              other => transporte(other),
          })?;
        Ok(retirada)
    }

    fn registrar_pagamento(&mut self, pagamento: PagamentoPessoal) -> Result<PagamentoPessoal, CoreError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            diesel::insert_into(pagamentos_pessoal::table)
                .values(NewPagamentoRow { id: pagamento.id,
                                          dragagem_id: pagamento.dragagem_id,
                                          tipo_pessoa: pagamento.tipo_pessoa.as_str(),
                                          pessoa_id: pagamento.pessoa_id,
                                          tipo_pagamento: pagamento.tipo_pagamento.as_str(),
                                          valor: pagamento.valor,
                                          data_pagamento: pagamento.data_pagamento })
                .execute(&mut conn)
                .map_err(PersistenceError::from)?;
            Ok(())
        }).map_err(|e| match e {
              PersistenceError::ForeignKeyViolation(_) => CoreError::DragagemNaoEncontrada(pagamento.dragagem_id),
              other => transporte(other),
          })?;
        Ok(pagamento)
    }

    fn registrar_gasto(&mut self, gasto: GastoInsumo) -> Result<GastoInsumo, CoreError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            diesel::insert_into(gastos_insumo::table)
                .values(NewGastoRow { id: gasto.id,
                                      dragagem_id: gasto.dragagem_id,
                                      tipo_insumo: &gasto.tipo_insumo,
                                      categoria: &gasto.categoria,
                                      quantidade: gasto.quantidade,
                                      unidade: &gasto.unidade,
                                      valor_unitario: gasto.valor_unitario,
                                      valor_total: gasto.valor_total,
                                      data_gasto: gasto.data_gasto })
                .execute(&mut conn)
                .map_err(PersistenceError::from)?;
            Ok(())
        }).map_err(|e| match e {
              PersistenceError::ForeignKeyViolation(_) => CoreError::DragagemNaoEncontrada(gasto.dragagem_id),
              other => transporte(other),
          })?;
        Ok(gasto)
    }
}

/// Construye un pool Postgres r2d2; valida tamaños y corre migraciones tras
/// el primer checkout.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let validated_min = if min_size == 0 { 1 } else { min_size };
    let validated_max = if max_size == 0 { 1 } else { max_size };
    let final_min = validated_min.min(validated_max);
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().min_idle(Some(final_min))
                                    .max_size(validated_max)
                                    .build(manager)
                                    .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    {
        let mut conn = pool.get()
                           .map_err(|e| PersistenceError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}

/// Helper de desarrollo: `.env` + `DbConfig` + pool migrado.
pub fn build_dev_pool_from_env() -> Result<PgPool, PersistenceError> {
    crate::config::init_dotenv();
    let cfg = crate::config::DbConfig::from_env();
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}
