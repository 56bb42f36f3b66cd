//! Integración contra Postgres real. Se omite silenciosamente cuando no hay
//! `DATABASE_URL` en el entorno (mismo criterio que el resto de la suite).

mod test_support;

use paiol_core::{EquipeDragagem, FiltroTimeline, MaquinaStatus, MontadorTimeline, PaiolRepository, TipoEvento};
use paiol_domain::{Cliente, Dragador, Paiol, StatusPagamento, StatusPaiol};
use paiol_persistence::{PgPaiolRepository, PoolProvider};
use test_support::with_pool;

#[test]
fn ciclo_de_vida_completo_sobre_postgres() {
    let resultado = with_pool(|pool| {
        let provider = PoolProvider { pool: pool.clone() };
        let mut repo = PgPaiolRepository::new(provider);

        let dragador = Dragador::novo("João").unwrap();
        let cliente = Cliente::novo("Construtora Rio Claro").unwrap();
        repo.inserir_dragador(&dragador).unwrap();
        repo.inserir_cliente(&cliente).unwrap();

        let paiol = Paiol::novo("Paiol PG", "Margem esquerda").unwrap();
        let paiol_id = paiol.id();
        repo.criar_paiol(paiol).unwrap();

        let mut maquina = MaquinaStatus::new(repo);
        let equipe = EquipeDragagem { dragador_id: Some(dragador.id), ajudante_id: None };
        let dragagem = maquina.iniciar_dragagem(paiol_id, equipe, None).unwrap();
        maquina.encerrar_dragagem(paiol_id, None).unwrap();
        maquina.registrar_cubagem(dragagem.id, 2.0, 3.0, 31.4159, 167.0).unwrap();
        maquina.iniciar_retirada(paiol_id, None).unwrap();
        maquina.registrar_retirada(paiol_id, cliente.id, 40.0, Some(30.0), StatusPagamento::Pendente, false)
               .unwrap();
        maquina.concluir_ciclo(paiol_id, None).unwrap();

        let repo = maquina.into_repo();
        let paiol = repo.paiol(paiol_id).unwrap();
        assert_eq!(paiol.status(), StatusPaiol::Vazio);
        assert_eq!(paiol.ciclo_atual(), 2);

        let montador = MontadorTimeline::new(&repo);
        let eventos = montador.montar(paiol_id, &FiltroTimeline::default()).unwrap();
        // 4 transiciones + inicio + fin + cubagem + retirada
        assert_eq!(eventos.len(), 8);
        assert_eq!(eventos.iter().filter(|e| e.tipo == TipoEvento::Transicao).count(), 4);
        assert!(eventos.iter().any(|e| e.tipo == TipoEvento::Retirada));

        // todo lo anterior al fechamento queda en ciclo 1
        assert!(eventos.iter()
                       .filter(|e| e.tipo != TipoEvento::Transicao)
                       .all(|e| e.ciclo == 1));
    });
    if resultado.is_none() {
        eprintln!("Saltando test de integración: DATABASE_URL no definido");
    }
}
