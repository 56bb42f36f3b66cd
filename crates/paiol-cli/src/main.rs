use uuid::Uuid;

use paiol_core::{situacao_do_paiol, EquipeDragagem, FiltroTimeline, InMemoryPaiolRepository, MaquinaStatus,
                 MontadorTimeline, Ordenacao, PaiolRepository, TipoEvento};
use paiol_domain::{Cliente, Dragador, StatusPagamento, StatusPaiol};

fn main() {
    // Cargar .env si existe para obtener DATABASE_URL
    let _ = dotenvy::dotenv();
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("demo") => demo(),
        Some("timeline") => {
            // `paiol timeline --paiol <UUID> [--ciclo <N>] [--tipo <T>] [--asc]`
            let mut paiol: Option<Uuid> = None;
            let mut filtro = FiltroTimeline::default();
            let mut tipos: Vec<TipoEvento> = Vec::new();
            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--paiol" => {
                        i += 1;
                        if i < args.len() { paiol = Uuid::parse_str(&args[i]).ok(); }
                    }
                    "--ciclo" => {
                        i += 1;
                        if i < args.len() { filtro.ciclo = args[i].parse::<u32>().ok(); }
                    }
                    "--tipo" => {
                        i += 1;
                        if i < args.len() {
                            match parse_tipo(&args[i]) {
                                Some(t) => tipos.push(t),
                                None => {
                                    eprintln!("[paiol timeline] tipo de evento desconocido: {}", args[i]);
                                    std::process::exit(2);
                                }
                            }
                        }
                    }
                    "--com-valor" => filtro.com_valor = true,
                    "--asc" => filtro.ordem = Ordenacao::Asc,
                    _ => {}
                }
                i += 1;
            }
            if !tipos.is_empty() {
                filtro.tipos = Some(tipos);
            }
            let Some(paiol_id) = paiol else {
                eprintln!("[paiol timeline] falta --paiol <UUID>");
                std::process::exit(2);
            };
            // Requiere backend persistente: los datos viven en Postgres.
            if std::env::var("DATABASE_URL").is_err() {
                eprintln!("[paiol timeline] requiere DATABASE_URL para operar contra backend persistente");
                std::process::exit(4);
            }
            let pool = match paiol_persistence::build_dev_pool_from_env() {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("[paiol timeline] pool error: {e}");
                    std::process::exit(5);
                }
            };
            let repo = paiol_persistence::PgPaiolRepository::new(paiol_persistence::PoolProvider { pool });
            let montador = MontadorTimeline::new(&repo);
            match montador.montar(paiol_id, &filtro) {
                Ok(eventos) => {
                    imprimir_timeline(&eventos);
                    std::process::exit(0);
                }
                Err(e) => {
                    eprintln!("[paiol timeline] error: {e}");
                    std::process::exit(4);
                }
            }
        }
        _ => {
            eprintln!("uso: paiol demo");
            eprintln!("     paiol timeline --paiol <UUID> [--ciclo <N>] [--tipo <TIPO>]... [--com-valor] [--asc]");
            std::process::exit(2);
        }
    }
}

fn parse_tipo(s: &str) -> Option<TipoEvento> {
    match s.to_uppercase().as_str() {
        "TRANSICAO" => Some(TipoEvento::Transicao),
        "DRAGAGEM_INICIO" => Some(TipoEvento::DragagemInicio),
        "DRAGAGEM_FIM" => Some(TipoEvento::DragagemFim),
        "CUBAGEM" => Some(TipoEvento::Cubagem),
        "RETIRADA" => Some(TipoEvento::Retirada),
        "PAGAMENTO" => Some(TipoEvento::Pagamento),
        "GASTO_INSUMO" => Some(TipoEvento::GastoInsumo),
        _ => None,
    }
}

fn imprimir_timeline(eventos: &[paiol_core::EventoTimeline]) {
    for e in eventos {
        let valor = e.valor.map(|v| format!(" R$ {v:.2}")).unwrap_or_default();
        println!("[ciclo {}] {} {:<15} {} - {}{}",
                 e.ciclo,
                 e.data.format("%Y-%m-%d %H:%M"),
                 e.tipo.to_string(),
                 e.titulo,
                 e.descricao,
                 valor);
    }
    println!("({} eventos)", eventos.len());
}

/// Escenario completo in-memory: ciclo de vida de un paiol de punta a punta.
fn demo() {
    let mut repo = InMemoryPaiolRepository::new();
    let dragador = Dragador::novo("João da Draga").unwrap();
    let cliente = Cliente::novo("Construtora Rio Claro").unwrap();
    let equipe = EquipeDragagem { dragador_id: Some(dragador.id), ajudante_id: None };
    let cliente_id = cliente.id;
    repo.inserir_dragador(dragador);
    repo.inserir_cliente(cliente);

    let paiol = paiol_domain::Paiol::novo("Paiol Norte", "Margem esquerda do rio").unwrap();
    let paiol_id = paiol.id();
    repo.criar_paiol(paiol).unwrap();

    let mut maquina = MaquinaStatus::new(repo);
    let dragagem = maquina.iniciar_dragagem(paiol_id, equipe, Some("início do ciclo".into())).unwrap();
    maquina.registrar_gasto(dragagem.id, "Diesel", "Combustível", 40.0, "L", 5.5).unwrap();
    maquina.encerrar_dragagem(paiol_id, None).unwrap();

    let (cubagem, avisos) = maquina.registrar_cubagem(dragagem.id, 2.0, 3.0, 31.4159, 167.0).unwrap();
    for aviso in &avisos {
        println!("aviso de cubagem: {aviso}");
    }
    println!("cubagem: volume normal {:.2} m³, reduzido {:.2} m³",
             cubagem.volume_normal(),
             cubagem.volume_reduzido());

    maquina.iniciar_retirada(paiol_id, None).unwrap();
    maquina.registrar_retirada(paiol_id, cliente_id, 90.0, Some(30.0), StatusPagamento::Pago, false)
           .unwrap();
    // sobregiro deliberado: se registra y se muestra, no se bloquea
    maquina.registrar_retirada(paiol_id, cliente_id, 100.0, Some(30.0), StatusPagamento::Pendente, true)
           .unwrap();

    if let Some(situacao) = situacao_do_paiol(maquina.repo(), paiol_id).unwrap() {
        println!("situación ciclo {}: retirado {:.1} m³, disponible {:.1} m³ ({:.0}% utilizado)",
                 situacao.ciclo,
                 situacao.situacao.retirado,
                 situacao.situacao.disponivel,
                 situacao.situacao.percentual_utilizado);
    }

    maquina.concluir_ciclo(paiol_id, Some("ciclo concluído".into())).unwrap();
    let repo = maquina.into_repo();
    let paiol = repo.paiol(paiol_id).unwrap();
    assert_eq!(paiol.status(), StatusPaiol::Vazio);
    println!("paiol tras el ciclo: {paiol}");

    let montador = MontadorTimeline::new(&repo);
    let eventos = montador.montar(paiol_id, &FiltroTimeline::default()).unwrap();
    imprimir_timeline(&eventos);
}
