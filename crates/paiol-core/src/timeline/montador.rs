//! Montador del timeline: agrega los seis orígenes de eventos de un paiol en
//! una única secuencia normalizada, atribuida a ciclos y filtrable.
//!
//! Contratos:
//! - Los fechamentos se leen UNA vez por llamada y alimentan un
//!   `AtribuidorCiclo` compartido por todos los eventos (búsqueda binaria,
//!   no una consulta por evento).
//! - Los nombres referenciados (dragador, ajudante, cliente) se resuelven en
//!   lote, una consulta por conjunto de ids distintos.
//! - Una referencia que no resuelve degrada a un placeholder; nunca hace
//!   fallar la agregación completa.
//! - Cualquier subconjunto de orígenes puede estar vacío.
//! - El resultado es función pura de los registros subyacentes: dos llamadas
//!   sin escrituras intermedias devuelven lo mismo.
use std::collections::HashMap;
use uuid::Uuid;

use paiol_domain::{Cubagem, Dragagem, GastoInsumo, PagamentoPessoal, Retirada, StatusPaiol, TipoPessoa,
                   TransicaoStatus};

use crate::ciclo::AtribuidorCiclo;
use crate::errors::CoreError;
use crate::repo::PaiolRepository;

use super::filtro::{self, FiltroTimeline};
use super::types::{DetalheEvento, EventoTimeline, TipoEvento};

const DRAGADOR_NAO_ENCONTRADO: &str = "Dragador não encontrado";
const AJUDANTE_NAO_ENCONTRADO: &str = "Ajudante não encontrado";
const CLIENTE_NAO_ENCONTRADO: &str = "Cliente não encontrado";

pub struct MontadorTimeline<'a, R: PaiolRepository> {
    repo: &'a R,
}

impl<'a, R: PaiolRepository> MontadorTimeline<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Monta el timeline completo del paiol y aplica el filtro.
    /// Paiol inexistente es error duro; referencias cruzadas ausentes no.
    pub fn montar(&self, paiol_id: Uuid, filtro: &FiltroTimeline) -> Result<Vec<EventoTimeline>, CoreError> {
        let _paiol = self.repo.paiol(paiol_id)?;

        let fechamentos = self.repo.fechamentos(paiol_id)?;
        let atribuidor = AtribuidorCiclo::new(fechamentos.iter().map(|f| f.data_fechamento).collect());

        let transicoes = self.repo.transicoes(paiol_id)?;
        let dragagens = self.repo.dragagens(paiol_id)?;
        let cubagens = self.repo.cubagens(paiol_id)?;
        let retiradas = self.repo.retiradas(paiol_id)?;
        let pagamentos = self.repo.pagamentos(paiol_id)?;
        let gastos = self.repo.gastos(paiol_id)?;

        let nomes = self.resolver_nomes(&dragagens, &pagamentos, &retiradas)?;

        let mut eventos = Vec::new();
        for t in &transicoes {
            eventos.push(evento_transicao(t, &atribuidor));
        }
        for d in &dragagens {
            eventos.push(evento_dragagem_inicio(d, &nomes, &atribuidor));
            if let Some(ev) = evento_dragagem_fim(d, &nomes, &atribuidor) {
                eventos.push(ev);
            }
        }
        for c in &cubagens {
            eventos.push(evento_cubagem(c, &atribuidor));
        }
        for r in &retiradas {
            eventos.push(evento_retirada(r, &nomes, &atribuidor));
        }
        for p in &pagamentos {
            eventos.push(evento_pagamento(p, &nomes, &atribuidor));
        }
        for g in &gastos {
            eventos.push(evento_gasto(g, &atribuidor));
        }

        Ok(filtro::aplicar(eventos, filtro))
    }

    /// Una consulta por conjunto de ids distintos, no una por registro.
    fn resolver_nomes(&self,
                      dragagens: &[Dragagem],
                      pagamentos: &[PagamentoPessoal],
                      retiradas: &[Retirada])
                      -> Result<Nomes, CoreError> {
        let mut ids_dragadores: Vec<Uuid> = dragagens.iter().map(|d| d.dragador_id).collect();
        let mut ids_ajudantes: Vec<Uuid> = dragagens.iter().filter_map(|d| d.ajudante_id).collect();
        for p in pagamentos {
            match p.tipo_pessoa {
                TipoPessoa::Dragador => ids_dragadores.push(p.pessoa_id),
                TipoPessoa::Ajudante => ids_ajudantes.push(p.pessoa_id),
            }
        }
        let mut ids_clientes: Vec<Uuid> = retiradas.iter().map(|r| r.cliente_id).collect();
        ids_dragadores.sort_unstable();
        ids_dragadores.dedup();
        ids_ajudantes.sort_unstable();
        ids_ajudantes.dedup();
        ids_clientes.sort_unstable();
        ids_clientes.dedup();

        Ok(Nomes { dragadores: self.repo.nomes_dragadores(&ids_dragadores)?,
                   ajudantes: self.repo.nomes_ajudantes(&ids_ajudantes)?,
                   clientes: self.repo.nomes_clientes(&ids_clientes)? })
    }
}

struct Nomes {
    dragadores: HashMap<Uuid, String>,
    ajudantes: HashMap<Uuid, String>,
    clientes: HashMap<Uuid, String>,
}

impl Nomes {
    fn dragador(&self, id: Uuid) -> String {
        self.dragadores
            .get(&id)
            .cloned()
            .unwrap_or_else(|| DRAGADOR_NAO_ENCONTRADO.to_string())
    }
    fn ajudante(&self, id: Uuid) -> String {
        self.ajudantes
            .get(&id)
            .cloned()
            .unwrap_or_else(|| AJUDANTE_NAO_ENCONTRADO.to_string())
    }
    fn cliente(&self, id: Uuid) -> String {
        self.clientes
            .get(&id)
            .cloned()
            .unwrap_or_else(|| CLIENTE_NAO_ENCONTRADO.to_string())
    }
    fn pessoa(&self, tipo: TipoPessoa, id: Uuid) -> String {
        match tipo {
            TipoPessoa::Dragador => self.dragador(id),
            TipoPessoa::Ajudante => self.ajudante(id),
        }
    }
}

fn evento_transicao(t: &TransicaoStatus, atribuidor: &AtribuidorCiclo) -> EventoTimeline {
    let anterior = t.status_anterior
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string());
    EventoTimeline { id: format!("transicao-{}", t.id),
                     data: t.data,
                     tipo: TipoEvento::Transicao,
                     titulo: "Mudança de Status".to_string(),
                     descricao: format!("{} -> {}", anterior, t.status_novo),
                     detalhe: DetalheEvento::Transicao { status_anterior: t.status_anterior,
                                                         status_novo: t.status_novo },
                     valor: None,
                     status_associado: Some(t.status_novo),
                     dragagem_id: None,
                     observacoes: t.observacoes.clone(),
                     ciclo: atribuidor.ciclo_de(t.data) }
}

fn evento_dragagem_inicio(d: &Dragagem, nomes: &Nomes, atribuidor: &AtribuidorCiclo) -> EventoTimeline {
    let dragador = nomes.dragador(d.dragador_id);
    let ajudante = d.ajudante_id.map(|id| nomes.ajudante(id));
    let descricao = match &ajudante {
        Some(a) => format!("Dragador: {dragador}, Ajudante: {a}"),
        None => format!("Dragador: {dragador}"),
    };
    EventoTimeline { id: format!("dragagem-inicio-{}", d.id),
                     data: d.data_inicio,
                     tipo: TipoEvento::DragagemInicio,
                     titulo: "Início de Dragagem".to_string(),
                     descricao,
                     detalhe: DetalheEvento::DragagemInicio { dragador, ajudante },
                     valor: None,
                     status_associado: Some(StatusPaiol::Dragando),
                     dragagem_id: Some(d.id),
                     observacoes: None,
                     ciclo: atribuidor.ciclo_de(d.data_inicio) }
}

/// El fin de la dragagem es un evento separado, en el timestamp de cierre.
fn evento_dragagem_fim(d: &Dragagem, nomes: &Nomes, atribuidor: &AtribuidorCiclo) -> Option<EventoTimeline> {
    let data_fim = d.data_fim?;
    let dragador = nomes.dragador(d.dragador_id);
    let ajudante = d.ajudante_id.map(|id| nomes.ajudante(id));
    Some(EventoTimeline { id: format!("dragagem-fim-{}", d.id),
                          data: data_fim,
                          tipo: TipoEvento::DragagemFim,
                          titulo: "Fim de Dragagem".to_string(),
                          descricao: format!("Dragador: {dragador}"),
                          detalhe: DetalheEvento::DragagemFim { dragador, ajudante },
                          valor: None,
                          status_associado: Some(StatusPaiol::Cheio),
                          dragagem_id: Some(d.id),
                          observacoes: None,
                          ciclo: atribuidor.ciclo_de(data_fim) })
}

fn evento_cubagem(c: &Cubagem, atribuidor: &AtribuidorCiclo) -> EventoTimeline {
    EventoTimeline { id: format!("cubagem-{}", c.id()),
                     data: c.data_medicao(),
                     tipo: TipoEvento::Cubagem,
                     titulo: "Cubagem Registrada".to_string(),
                     descricao: format!("Volume normal: {:.2} m³, reduzido: {:.2} m³",
                                        c.volume_normal(),
                                        c.volume_reduzido()),
                     detalhe: DetalheEvento::Cubagem { medida_inferior: c.medida_inferior(),
                                                       medida_superior: c.medida_superior(),
                                                       perimetro: c.perimetro(),
                                                       volume_normal: c.volume_normal(),
                                                       volume_reduzido: c.volume_reduzido() },
                     valor: None,
                     status_associado: Some(StatusPaiol::Cheio),
                     dragagem_id: Some(c.dragagem_id()),
                     observacoes: None,
                     ciclo: atribuidor.ciclo_de(c.data_medicao()) }
}

fn evento_retirada(r: &Retirada, nomes: &Nomes, atribuidor: &AtribuidorCiclo) -> EventoTimeline {
    let cliente = nomes.cliente(r.cliente_id);
    EventoTimeline { id: format!("retirada-{}", r.id),
                     data: r.data_retirada,
                     tipo: TipoEvento::Retirada,
                     titulo: "Retirada de Areia".to_string(),
                     descricao: format!("Cliente: {cliente}, volume: {:.2} m³", r.volume_retirado),
                     detalhe: DetalheEvento::Retirada { cliente,
                                                        volume: r.volume_retirado,
                                                        status_pagamento: r.status_pagamento,
                                                        tem_frete: r.tem_frete },
                     valor: r.valor_total,
                     status_associado: Some(StatusPaiol::Retirando),
                     dragagem_id: None,
                     observacoes: None,
                     ciclo: atribuidor.ciclo_de(r.data_retirada) }
}

fn evento_pagamento(p: &PagamentoPessoal, nomes: &Nomes, atribuidor: &AtribuidorCiclo) -> EventoTimeline {
    let beneficiario = nomes.pessoa(p.tipo_pessoa, p.pessoa_id);
    EventoTimeline { id: format!("pagamento-{}", p.id),
                     data: p.data_pagamento,
                     tipo: TipoEvento::Pagamento,
                     titulo: "Pagamento de Pessoal".to_string(),
                     descricao: format!("{} para {beneficiario}", p.tipo_pagamento.rotulo()),
                     detalhe: DetalheEvento::Pagamento { beneficiario,
                                                         tipo_pessoa: p.tipo_pessoa,
                                                         tipo_pagamento: p.tipo_pagamento },
                     valor: Some(p.valor),
                     status_associado: Some(StatusPaiol::Dragando),
                     dragagem_id: Some(p.dragagem_id),
                     observacoes: None,
                     ciclo: atribuidor.ciclo_de(p.data_pagamento) }
}

fn evento_gasto(g: &GastoInsumo, atribuidor: &AtribuidorCiclo) -> EventoTimeline {
    EventoTimeline { id: format!("gasto-{}", g.id),
                     data: g.data_gasto,
                     tipo: TipoEvento::GastoInsumo,
                     titulo: "Gasto com Insumo".to_string(),
                     descricao: format!("{} ({}): {:.2} {}", g.tipo_insumo, g.categoria, g.quantidade, g.unidade),
                     detalhe: DetalheEvento::GastoInsumo { insumo: g.tipo_insumo.clone(),
                                                           categoria: g.categoria.clone(),
                                                           quantidade: g.quantidade,
                                                           unidade: g.unidade.clone(),
                                                           valor_unitario: g.valor_unitario },
                     valor: Some(g.valor_total),
                     status_associado: Some(StatusPaiol::Dragando),
                     dragagem_id: Some(g.dragagem_id),
                     observacoes: None,
                     ciclo: atribuidor.ciclo_de(g.data_gasto) }
}
