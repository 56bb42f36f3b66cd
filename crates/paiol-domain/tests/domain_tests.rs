use chrono::Utc;
use paiol_domain::{Cubagem, GastoInsumo, Paiol, Retirada, StatusPagamento, StatusPaiol};
use uuid::Uuid;

#[test]
fn paiol_nuevo_comienza_vacio_en_ciclo_1() {
    let p = Paiol::novo("Paiol Norte", "Margem esquerda").unwrap();
    assert_eq!(p.status(), StatusPaiol::Vazio);
    assert_eq!(p.ciclo_atual(), 1);
    assert!(p.ativo());
}

#[test]
fn paiol_sin_nombre_rechazado() {
    assert!(Paiol::novo("   ", "Margem esquerda").is_err());
    assert!(Paiol::novo("Paiol Sul", "").is_err());
}

#[test]
fn desativar_es_baja_logica() {
    let mut p = Paiol::novo("Paiol Norte", "Margem esquerda").unwrap();
    p.desativar();
    assert!(!p.ativo());
    // el resto del registro permanece consultable
    assert_eq!(p.nome(), "Paiol Norte");
}

#[test]
fn cubagem_deriva_volume_normal_y_mantiene_reduzido_manual() {
    let (c, avisos) = Cubagem::nova(Uuid::new_v4(), 2.0, 3.0, 31.4159, 167.0, Utc::now()).unwrap();
    assert!((c.volume_normal() - 196.35).abs() < 2e-2);
    assert_eq!(c.volume_reduzido(), 167.0);
    assert!(avisos.is_empty());
}

#[test]
fn cubagem_con_reduzido_no_positivo_rechazada() {
    assert!(Cubagem::nova(Uuid::new_v4(), 2.0, 3.0, 31.4159, 0.0, Utc::now()).is_err());
}

#[test]
fn ajuste_manual_del_reduzido_valida_positivo() {
    let (mut c, _) = Cubagem::nova(Uuid::new_v4(), 2.0, 3.0, 31.4159, 167.0, Utc::now()).unwrap();
    assert!(c.ajustar_volume_reduzido(-5.0).is_err());
    c.ajustar_volume_reduzido(150.0).unwrap();
    assert_eq!(c.volume_reduzido(), 150.0);
}

#[test]
fn retirada_deriva_valor_total_del_precio_unitario() {
    let r = Retirada::nova(Uuid::new_v4(),
                           Uuid::new_v4(),
                           12.0,
                           Some(35.0),
                           StatusPagamento::Pendente,
                           true,
                           Utc::now()).unwrap();
    assert_eq!(r.valor_total, Some(420.0));

    // sin precio unitario no hay valor total
    let r = Retirada::nova(Uuid::new_v4(),
                           Uuid::new_v4(),
                           12.0,
                           None,
                           StatusPagamento::Pago,
                           false,
                           Utc::now()).unwrap();
    assert_eq!(r.valor_total, None);
}

#[test]
fn retirada_con_volume_no_positivo_rechazada() {
    let r = Retirada::nova(Uuid::new_v4(),
                           Uuid::new_v4(),
                           0.0,
                           None,
                           StatusPagamento::Pendente,
                           false,
                           Utc::now());
    assert!(r.is_err());
}

#[test]
fn gasto_insumo_deriva_valor_total() {
    let g = GastoInsumo::novo(Uuid::new_v4(), "Diesel", "Combustível", 40.0, "L", 5.5, Utc::now()).unwrap();
    assert_eq!(g.valor_total, 220.0);
    assert!(GastoInsumo::novo(Uuid::new_v4(), "Diesel", "Combustível", 0.0, "L", 5.5, Utc::now()).is_err());
}
