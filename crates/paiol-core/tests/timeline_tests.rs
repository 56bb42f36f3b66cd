use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use paiol_core::{situacao_do_paiol, CoreError, FiltroTimeline, InMemoryPaiolRepository, MontadorTimeline,
                 Ordenacao, PaiolRepository, TipoEvento};
use paiol_domain::{Cliente, Cubagem, Dragador, Dragagem, Fechamento, PagamentoPessoal, Paiol, Retirada,
                   StatusPagamento, StatusPaiol, TipoPagamento, TipoPessoa, TransicaoStatus};

fn ts(dia: u32, hora: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, dia, hora, 0, 0).unwrap()
}

struct Cenario {
    repo: InMemoryPaiolRepository,
    paiol_id: Uuid,
    dragagem_id: Uuid,
    cliente_id: Uuid,
}

/// Una dragagem iniciada en T0, cubagem en T1 y dos retiradas en T2 y T3,
/// sin fechamentos.
fn cenario_base() -> Cenario {
    let mut repo = InMemoryPaiolRepository::new();
    let paiol = Paiol::novo("Paiol Norte", "Margem esquerda").unwrap();
    let paiol_id = paiol.id();
    repo.criar_paiol(paiol).unwrap();

    let dragador = Dragador::novo("João").unwrap();
    let cliente = Cliente::novo("Construtora Rio Claro").unwrap();
    let (dragador_id, cliente_id) = (dragador.id, cliente.id);
    repo.inserir_dragador(dragador);
    repo.inserir_cliente(cliente);

    let dragagem = Dragagem::nova(paiol_id, dragador_id, None, ts(1, 8));
    let dragagem_id = dragagem.id;
    repo.inserir_dragagem(dragagem);

    let (cubagem, _) = Cubagem::nova(dragagem_id, 2.0, 3.0, 31.4159, 167.0, ts(2, 9)).unwrap();
    repo.inserir_cubagem(cubagem);

    for (dia, volume) in [(3, 40.0), (4, 70.0)] {
        repo.inserir_retirada(Retirada::nova(paiol_id,
                                             cliente_id,
                                             volume,
                                             Some(30.0),
                                             StatusPagamento::Pendente,
                                             false,
                                             ts(dia, 10)).unwrap());
    }

    Cenario { repo, paiol_id, dragagem_id, cliente_id }
}

#[test]
fn cuatro_eventos_ciclo_1_orden_descendente_por_defecto() {
    let c = cenario_base();
    let montador = MontadorTimeline::new(&c.repo);
    let eventos = montador.montar(c.paiol_id, &FiltroTimeline::default()).unwrap();

    assert_eq!(eventos.len(), 4);
    assert!(eventos.iter().all(|e| e.ciclo == 1));
    let datas: Vec<DateTime<Utc>> = eventos.iter().map(|e| e.data).collect();
    assert_eq!(datas, vec![ts(4, 10), ts(3, 10), ts(2, 9), ts(1, 8)]);
    assert_eq!(eventos[3].tipo, TipoEvento::DragagemInicio);
    assert_eq!(eventos[2].tipo, TipoEvento::Cubagem);
}

#[test]
fn com_valor_conserva_solo_las_retiradas() {
    let c = cenario_base();
    let montador = MontadorTimeline::new(&c.repo);
    let filtro = FiltroTimeline { com_valor: true, ..Default::default() };
    let eventos = montador.montar(c.paiol_id, &filtro).unwrap();

    assert_eq!(eventos.len(), 2);
    assert!(eventos.iter().all(|e| e.tipo == TipoEvento::Retirada));
    assert!(eventos.iter().all(|e| e.valor.unwrap() > 0.0));
}

#[test]
fn montar_es_idempotente_sin_escrituras_intermedias() {
    let c = cenario_base();
    let montador = MontadorTimeline::new(&c.repo);
    let filtro = FiltroTimeline::default();
    let primera = montador.montar(c.paiol_id, &filtro).unwrap();
    let segunda = montador.montar(c.paiol_id, &filtro).unwrap();
    assert_eq!(primera, segunda);
}

#[test]
fn paiol_inexistente_es_error_duro() {
    let c = cenario_base();
    let montador = MontadorTimeline::new(&c.repo);
    let otro = Uuid::new_v4();
    let res = montador.montar(otro, &FiltroTimeline::default());
    assert!(matches!(res, Err(CoreError::PaiolNaoEncontrado(id)) if id == otro));
}

#[test]
fn todos_los_origenes_vacios_da_timeline_vacio() {
    let mut repo = InMemoryPaiolRepository::new();
    let paiol = Paiol::novo("Paiol Sul", "Margem direita").unwrap();
    let paiol_id = paiol.id();
    repo.criar_paiol(paiol).unwrap();
    let montador = MontadorTimeline::new(&repo);
    assert!(montador.montar(paiol_id, &FiltroTimeline::default()).unwrap().is_empty());
}

#[test]
fn orden_ascendente_y_rango_de_fechas_inclusivo() {
    let c = cenario_base();
    let montador = MontadorTimeline::new(&c.repo);
    // data_fim a las 00:00 del día 3: se extiende al final del día, la
    // retirada de las 10:00 del día 3 queda incluida
    let filtro = FiltroTimeline { data_inicio: Some(ts(2, 0)),
                                  data_fim: Some(Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap()),
                                  ordem: Ordenacao::Asc,
                                  ..Default::default() };
    let eventos = montador.montar(c.paiol_id, &filtro).unwrap();
    let datas: Vec<DateTime<Utc>> = eventos.iter().map(|e| e.data).collect();
    assert_eq!(datas, vec![ts(2, 9), ts(3, 10)]);
}

#[test]
fn filtro_por_tipos_y_por_status_asociado() {
    let c = cenario_base();
    let montador = MontadorTimeline::new(&c.repo);

    let filtro = FiltroTimeline { tipos: Some(vec![TipoEvento::Cubagem, TipoEvento::DragagemInicio]),
                                  ..Default::default() };
    let eventos = montador.montar(c.paiol_id, &filtro).unwrap();
    assert_eq!(eventos.len(), 2);

    let filtro = FiltroTimeline { status_associado: Some(StatusPaiol::Retirando), ..Default::default() };
    let eventos = montador.montar(c.paiol_id, &filtro).unwrap();
    assert_eq!(eventos.len(), 2);
    assert!(eventos.iter().all(|e| e.tipo == TipoEvento::Retirada));
}

#[test]
fn fechamento_particiona_los_ciclos_y_el_filtro_por_ciclo_responde() {
    let mut c = cenario_base();
    // fechamento entre la cubagem (día 2) y las retiradas (días 3 y 4)
    c.repo.inserir_fechamento(Fechamento::novo(c.paiol_id, ts(2, 12)));
    let montador = MontadorTimeline::new(&c.repo);

    let eventos = montador.montar(c.paiol_id, &FiltroTimeline::default()).unwrap();
    let ciclos: Vec<u32> = eventos.iter().map(|e| e.ciclo).collect();
    // desc: retirada d4 (ciclo 2), retirada d3 (ciclo 2), cubagem d2 (1), inicio d1 (1)
    assert_eq!(ciclos, vec![2, 2, 1, 1]);

    let filtro = FiltroTimeline { ciclo: Some(1), ..Default::default() };
    let solo_ciclo_1 = montador.montar(c.paiol_id, &filtro).unwrap();
    assert_eq!(solo_ciclo_1.len(), 2);
    assert!(solo_ciclo_1.iter().all(|e| e.ciclo == 1));
}

#[test]
fn timestamps_iguales_conservan_el_orden_relativo() {
    let mut c = cenario_base();
    // dos retiradas más en el mismo instante, volúmenes distintos para
    // distinguirlas
    for volume in [5.0, 6.0] {
        c.repo.inserir_retirada(Retirada::nova(c.paiol_id,
                                               c.cliente_id,
                                               volume,
                                               None,
                                               StatusPagamento::Pago,
                                               false,
                                               ts(10, 10)).unwrap());
    }
    let montador = MontadorTimeline::new(&c.repo);

    for ordem in [Ordenacao::Asc, Ordenacao::Desc] {
        let filtro = FiltroTimeline { ordem, ..Default::default() };
        let eventos = montador.montar(c.paiol_id, &filtro).unwrap();
        let empatados: Vec<f64> = eventos.iter()
                                         .filter(|e| e.data == ts(10, 10))
                                         .map(|e| match &e.detalhe {
                                             paiol_core::DetalheEvento::Retirada { volume, .. } => *volume,
                                             _ => panic!("esperaba retirada"),
                                         })
                                         .collect();
        assert_eq!(empatados, vec![5.0, 6.0], "orden {ordem:?} debe ser estable");
    }
}

#[test]
fn referencias_ausentes_degradan_a_placeholder() {
    let mut c = cenario_base();
    // pago a una persona que no existe en el catálogo y retirada de un
    // cliente desconocido: la agregación no falla
    c.repo.inserir_pagamento(PagamentoPessoal::novo(c.dragagem_id,
                                                    TipoPessoa::Dragador,
                                                    Uuid::new_v4(),
                                                    TipoPagamento::Adiantamento,
                                                    500.0,
                                                    ts(5, 9)).unwrap());
    c.repo.inserir_retirada(Retirada::nova(c.paiol_id,
                                           Uuid::new_v4(),
                                           10.0,
                                           None,
                                           StatusPagamento::Pendente,
                                           false,
                                           ts(6, 9)).unwrap());
    let montador = MontadorTimeline::new(&c.repo);
    let eventos = montador.montar(c.paiol_id, &FiltroTimeline::default()).unwrap();

    let pagamento = eventos.iter().find(|e| e.tipo == TipoEvento::Pagamento).unwrap();
    match &pagamento.detalhe {
        paiol_core::DetalheEvento::Pagamento { beneficiario, .. } => {
            assert_eq!(beneficiario, "Dragador não encontrado");
        }
        _ => panic!("esperaba pagamento"),
    }
    let retirada_fantasma = eventos.iter()
                                   .find(|e| e.tipo == TipoEvento::Retirada && e.data == ts(6, 9))
                                   .unwrap();
    match &retirada_fantasma.detalhe {
        paiol_core::DetalheEvento::Retirada { cliente, .. } => {
            assert_eq!(cliente, "Cliente não encontrado");
        }
        _ => panic!("esperaba retirada"),
    }
}

#[test]
fn pagamento_y_gasto_llevan_valor_y_ciclo() {
    let mut c = cenario_base();
    let dragador_id = c.repo.dragagens(c.paiol_id).unwrap()[0].dragador_id;
    c.repo.inserir_pagamento(PagamentoPessoal::novo(c.dragagem_id,
                                                    TipoPessoa::Dragador,
                                                    dragador_id,
                                                    TipoPagamento::PagamentoFinal,
                                                    1200.0,
                                                    ts(5, 14)).unwrap());
    let montador = MontadorTimeline::new(&c.repo);
    let filtro = FiltroTimeline { tipos: Some(vec![TipoEvento::Pagamento]), ..Default::default() };
    let eventos = montador.montar(c.paiol_id, &filtro).unwrap();
    assert_eq!(eventos.len(), 1);
    assert_eq!(eventos[0].valor, Some(1200.0));
    assert_eq!(eventos[0].ciclo, 1);
    assert_eq!(eventos[0].dragagem_id, Some(c.dragagem_id));
    match &eventos[0].detalhe {
        paiol_core::DetalheEvento::Pagamento { beneficiario, .. } => assert_eq!(beneficiario, "João"),
        _ => panic!("esperaba pagamento"),
    }
}

#[test]
fn situacao_del_ciclo_abierto_con_sobregiro() {
    let c = cenario_base();
    let situacao = situacao_do_paiol(&c.repo, c.paiol_id).unwrap().unwrap();
    assert_eq!(situacao.ciclo, 1);
    assert_eq!(situacao.capacidade, 167.0);
    assert_eq!(situacao.situacao.retirado, 110.0);
    assert_eq!(situacao.situacao.disponivel, 57.0);

    // sin cubagem en el ciclo abierto no hay situación
    let mut repo = InMemoryPaiolRepository::new();
    let paiol = Paiol::novo("Paiol Sul", "Margem direita").unwrap();
    let paiol_id = paiol.id();
    repo.criar_paiol(paiol).unwrap();
    assert!(situacao_do_paiol(&repo, paiol_id).unwrap().is_none());
}

#[test]
fn situacao_ignora_retiradas_de_ciclos_cerrados() {
    let mut c = cenario_base();
    // se cierra el ciclo después de todo lo sembrado y se mide de nuevo
    c.repo.inserir_fechamento(Fechamento::novo(c.paiol_id, ts(8, 0)));
    let dragagem = Dragagem::nova(c.paiol_id, Uuid::new_v4(), None, ts(9, 8));
    let dragagem_id = dragagem.id;
    c.repo.inserir_dragagem(dragagem);
    let (cubagem, _) = Cubagem::nova(dragagem_id, 2.0, 2.5, 30.0, 140.0, ts(10, 9)).unwrap();
    c.repo.inserir_cubagem(cubagem);
    c.repo.inserir_retirada(Retirada::nova(c.paiol_id,
                                           c.cliente_id,
                                           20.0,
                                           None,
                                           StatusPagamento::Pago,
                                           false,
                                           ts(11, 10)).unwrap());

    let situacao = situacao_do_paiol(&c.repo, c.paiol_id).unwrap().unwrap();
    assert_eq!(situacao.ciclo, 2);
    assert_eq!(situacao.capacidade, 140.0);
    // las retiradas del ciclo 1 (110 m³) no cuentan
    assert_eq!(situacao.situacao.retirado, 20.0);
    assert_eq!(situacao.situacao.disponivel, 120.0);
}

#[test]
fn una_transicion_sembrada_lleva_su_status_nuevo_como_asociado() {
    let mut c = cenario_base();
    c.repo.inserir_transicao(TransicaoStatus::nova(c.paiol_id,
                                                   None,
                                                   StatusPaiol::Vazio,
                                                   ts(1, 7),
                                                   Some("criação do paiol".to_string())));
    let montador = MontadorTimeline::new(&c.repo);
    let filtro = FiltroTimeline { tipos: Some(vec![TipoEvento::Transicao]), ..Default::default() };
    let eventos = montador.montar(c.paiol_id, &filtro).unwrap();
    assert_eq!(eventos.len(), 1);
    assert_eq!(eventos[0].status_associado, Some(StatusPaiol::Vazio));
    assert_eq!(eventos[0].observacoes.as_deref(), Some("criação do paiol"));
    assert_eq!(eventos[0].descricao, "- -> VAZIO");
}
