use chrono::Utc;
use uuid::Uuid;

use paiol_core::{validar_transicao, CoreError, EquipeDragagem, ErroTransicao, FiltroTimeline, InMemoryPaiolRepository,
                 MaquinaStatus, MontadorTimeline, PaiolRepository, TipoEvento};
use paiol_domain::{Cliente, Dragador, Dragagem, Paiol, StatusPagamento, StatusPaiol};

const TODOS: [StatusPaiol; 4] =
    [StatusPaiol::Vazio, StatusPaiol::Dragando, StatusPaiol::Cheio, StatusPaiol::Retirando];

fn repo_con_paiol() -> (InMemoryPaiolRepository, Uuid) {
    let mut repo = InMemoryPaiolRepository::new();
    let paiol = Paiol::novo("Paiol Norte", "Margem esquerda").unwrap();
    let id = paiol.id();
    repo.criar_paiol(paiol).unwrap();
    (repo, id)
}

fn equipe_completa(repo: &mut InMemoryPaiolRepository) -> EquipeDragagem {
    let dragador = Dragador::novo("João").unwrap();
    let equipe = EquipeDragagem { dragador_id: Some(dragador.id), ajudante_id: None };
    repo.inserir_dragador(dragador);
    equipe
}

#[test]
fn solo_los_cuatro_pares_adyacentes_son_validos() {
    // Con dragador presente, la única causa de rechazo es la adyacencia.
    let equipe = EquipeDragagem { dragador_id: Some(Uuid::new_v4()), ajudante_id: None };
    let mut validas = 0;
    for de in TODOS {
        for para in TODOS {
            let res = validar_transicao(de, para, &equipe);
            if de.proximo() == para {
                assert!(res.is_ok(), "{de} -> {para} debería ser válida");
                validas += 1;
            } else {
                let erros = res.expect_err("par no adyacente debe fallar");
                // el error nombra ambos estados del par intentado
                assert!(erros.iter().any(|e| matches!(e,
                        ErroTransicao::NaoPermitida { de: d, para: p } if *d == de && *p == para)),
                        "{de} -> {para} debería reportar NaoPermitida");
            }
        }
    }
    assert_eq!(validas, 4);
}

#[test]
fn vazio_a_dragando_exige_dragador() {
    let sin_equipe = EquipeDragagem::default();
    let erros = validar_transicao(StatusPaiol::Vazio, StatusPaiol::Dragando, &sin_equipe).unwrap_err();
    assert!(erros.contains(&ErroTransicao::DragadorObrigatorio));

    let con_dragador = EquipeDragagem { dragador_id: Some(Uuid::new_v4()), ajudante_id: None };
    assert!(validar_transicao(StatusPaiol::Vazio, StatusPaiol::Dragando, &con_dragador).is_ok());
}

#[test]
fn aplicar_sobre_paiol_inexistente_es_error_duro() {
    let (repo, _) = repo_con_paiol();
    let mut maquina = MaquinaStatus::new(repo);
    let otro = Uuid::new_v4();
    let res = maquina.aplicar(otro, StatusPaiol::Dragando, EquipeDragagem::default(), None);
    assert!(matches!(res, Err(CoreError::PaiolNaoEncontrado(id)) if id == otro));
}

#[test]
fn transicion_invalida_no_escribe_historial() {
    let (repo, paiol_id) = repo_con_paiol();
    let mut maquina = MaquinaStatus::new(repo);
    let res = maquina.aplicar(paiol_id, StatusPaiol::Cheio, EquipeDragagem::default(), None);
    assert!(matches!(res, Err(CoreError::TransicaoInvalida(_))));
    assert!(maquina.repo().transicoes(paiol_id).unwrap().is_empty());
    assert_eq!(maquina.repo().paiol(paiol_id).unwrap().status(), StatusPaiol::Vazio);
}

#[test]
fn iniciar_dragagem_crea_sesion_y_transicion_en_una_operacion() {
    let (mut repo, paiol_id) = repo_con_paiol();
    let equipe = equipe_completa(&mut repo);
    let mut maquina = MaquinaStatus::new(repo);

    let dragagem = maquina.iniciar_dragagem(paiol_id, equipe, Some("início do ciclo".to_string())).unwrap();
    assert!(dragagem.ativa());
    assert_eq!(maquina.repo().paiol(paiol_id).unwrap().status(), StatusPaiol::Dragando);

    let transicoes = maquina.repo().transicoes(paiol_id).unwrap();
    assert_eq!(transicoes.len(), 1);
    assert_eq!(transicoes[0].status_anterior, Some(StatusPaiol::Vazio));
    assert_eq!(transicoes[0].status_novo, StatusPaiol::Dragando);
}

#[test]
fn segunda_sesion_abierta_rechazada() {
    let (mut repo, paiol_id) = repo_con_paiol();
    let equipe = equipe_completa(&mut repo);
    // sesión abierta huérfana sembrada directamente: el paiol sigue VAZIO
    repo.inserir_dragagem(Dragagem::nova(paiol_id, Uuid::new_v4(), None, Utc::now()));
    let mut maquina = MaquinaStatus::new(repo);

    let res = maquina.iniciar_dragagem(paiol_id, equipe, None);
    match res {
        Err(CoreError::TransicaoInvalida(erros)) => {
            assert!(erros.contains(&ErroTransicao::DragagemAberta));
        }
        other => panic!("esperaba DragagemAberta, obtuve {other:?}"),
    }
}

#[test]
fn encerrar_dragagem_cierra_sesion_y_marca_cheio() {
    let (mut repo, paiol_id) = repo_con_paiol();
    let equipe = equipe_completa(&mut repo);
    let mut maquina = MaquinaStatus::new(repo);

    maquina.iniciar_dragagem(paiol_id, equipe, None).unwrap();
    let dragagem = maquina.encerrar_dragagem(paiol_id, None).unwrap();
    assert!(!dragagem.ativa());
    assert_eq!(maquina.repo().paiol(paiol_id).unwrap().status(), StatusPaiol::Cheio);
}

#[test]
fn encerrar_sin_sesion_activa_falla() {
    let (mut repo, paiol_id) = repo_con_paiol();
    // status DRAGANDO sembrado sin sesión correspondiente
    let mut paiol = repo.paiol(paiol_id).unwrap();
    paiol.marcar_status(StatusPaiol::Dragando);
    repo.criar_paiol(paiol).unwrap();
    let mut maquina = MaquinaStatus::new(repo);

    let res = maquina.encerrar_dragagem(paiol_id, None);
    assert!(matches!(res, Err(CoreError::SemDragagemAtiva(id)) if id == paiol_id));
}

#[test]
fn ciclo_de_vida_completo_incrementa_ciclo_y_registra_fechamento() {
    let (mut repo, paiol_id) = repo_con_paiol();
    let equipe = equipe_completa(&mut repo);
    let mut maquina = MaquinaStatus::new(repo);

    maquina.iniciar_dragagem(paiol_id, equipe, None).unwrap();
    maquina.encerrar_dragagem(paiol_id, None).unwrap();
    maquina.iniciar_retirada(paiol_id, None).unwrap();
    let fechamento = maquina.concluir_ciclo(paiol_id, Some("ciclo concluído".to_string())).unwrap();

    let paiol = maquina.repo().paiol(paiol_id).unwrap();
    assert_eq!(paiol.status(), StatusPaiol::Vazio);
    assert_eq!(paiol.ciclo_atual(), 2);

    let fechamentos = maquina.repo().fechamentos(paiol_id).unwrap();
    assert_eq!(fechamentos.len(), 1);
    assert_eq!(fechamentos[0].id, fechamento.id);

    // cuatro transiciones registradas, en orden de ejecución
    let transicoes = maquina.repo().transicoes(paiol_id).unwrap();
    let pares: Vec<(Option<StatusPaiol>, StatusPaiol)> =
        transicoes.iter().map(|t| (t.status_anterior, t.status_novo)).collect();
    assert_eq!(pares,
               vec![(Some(StatusPaiol::Vazio), StatusPaiol::Dragando),
                    (Some(StatusPaiol::Dragando), StatusPaiol::Cheio),
                    (Some(StatusPaiol::Cheio), StatusPaiol::Retirando),
                    (Some(StatusPaiol::Retirando), StatusPaiol::Vazio)]);
}

#[test]
fn transicion_aplicada_reaparece_en_el_timeline() {
    let (mut repo, paiol_id) = repo_con_paiol();
    let equipe = equipe_completa(&mut repo);
    let mut maquina = MaquinaStatus::new(repo);

    let transicao = maquina.iniciar_dragagem(paiol_id, equipe, None)
                           .map(|_| maquina.repo().transicoes(paiol_id).unwrap().remove(0))
                           .unwrap();

    let montador = MontadorTimeline::new(maquina.repo());
    let eventos = montador.montar(paiol_id, &FiltroTimeline::default()).unwrap();
    let evento = eventos.iter()
                        .find(|e| e.tipo == TipoEvento::Transicao)
                        .expect("el timeline debe contener la transición aplicada");
    assert_eq!(evento.data, transicao.data);
    assert!(matches!(&evento.detalhe,
            paiol_core::DetalheEvento::Transicao { status_anterior: Some(StatusPaiol::Vazio),
                                                   status_novo: StatusPaiol::Dragando }));
}

#[test]
fn cubagem_duplicada_rechazada() {
    let (mut repo, paiol_id) = repo_con_paiol();
    let equipe = equipe_completa(&mut repo);
    let mut maquina = MaquinaStatus::new(repo);

    let dragagem = maquina.iniciar_dragagem(paiol_id, equipe, None).unwrap();
    maquina.encerrar_dragagem(paiol_id, None).unwrap();

    let (cubagem, _) = maquina.registrar_cubagem(dragagem.id, 2.0, 3.0, 31.4159, 167.0).unwrap();
    assert!(cubagem.volume_normal() > 0.0);

    let res = maquina.registrar_cubagem(dragagem.id, 2.0, 3.0, 31.4159, 160.0);
    assert!(matches!(res, Err(CoreError::CubagemDuplicada(id)) if id == dragagem.id));
}

#[test]
fn retirada_con_sobregiro_siempre_procede() {
    let (mut repo, paiol_id) = repo_con_paiol();
    let cliente = Cliente::novo("Construtora Rio Claro").unwrap();
    let cliente_id = cliente.id;
    repo.inserir_cliente(cliente);
    let mut maquina = MaquinaStatus::new(repo);

    // muy por encima de cualquier capacidad medida: se registra igual
    let r = maquina.registrar_retirada(paiol_id, cliente_id, 9999.0, Some(30.0), StatusPagamento::Pendente, false)
                   .unwrap();
    assert_eq!(r.valor_total, Some(9999.0 * 30.0));

    let res = maquina.registrar_retirada(paiol_id, cliente_id, 0.0, None, StatusPagamento::Pendente, false);
    assert!(matches!(res, Err(CoreError::Dominio(_))));
}
