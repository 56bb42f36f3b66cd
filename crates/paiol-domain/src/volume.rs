//! Contabilidad de volumen: modelo cilíndrico y saldo de retiradas.
//!
//! Dos responsabilidades puras, sin IO:
//! - Derivar el volumen geométrico de una cubagem a partir de las medidas
//!   físicas (`calcular_volume`).
//! - Conciliar la capacidad medida contra las retiradas acumuladas
//!   (`situacao_retiradas`), incluyendo el sobregiro deliberado.
use serde::{Deserialize, Serialize};

use crate::DomainError;
use std::f64::consts::PI;
use std::fmt;

/// Umbral de conicidad: diferencia entre medidas superior a este porcentaje
/// de la mayor dispara el aviso `ConicidadeAlta`.
pub const LIMITE_CONICIDADE: f64 = 0.5;

/// Perímetros por debajo de este valor (en metros) se consideran
/// implausibles para un paiol real.
pub const PERIMETRO_MINIMO_PLAUSIVEL: f64 = 10.0;

/// Resultado del cálculo geométrico. Los avisos son consultivos: nunca
/// bloquean el registro de la cubagem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeCalculado {
    pub raio: f64,
    pub altura: f64,
    pub area_base: f64,
    pub volume_normal: f64,
    pub avisos: Vec<AvisoCubagem>,
}

/// Aviso no bloqueante sobre medidas sospechosas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AvisoCubagem {
    /// `|inferior - superior|` excede `LIMITE_CONICIDADE` de la mayor.
    ConicidadeAlta { medida_inferior: f64, medida_superior: f64 },
    /// Perímetro menor que `PERIMETRO_MINIMO_PLAUSIVEL`.
    PerimetroPequeno { perimetro: f64 },
}

impl fmt::Display for AvisoCubagem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvisoCubagem::ConicidadeAlta { medida_inferior, medida_superior } => {
                write!(f,
                       "diferença grande entre medidas: inferior {medida_inferior:.2} m, superior {medida_superior:.2} m")
            }
            AvisoCubagem::PerimetroPequeno { perimetro } => {
                write!(f, "perímetro implausivelmente pequeno: {perimetro:.2} m")
            }
        }
    }
}

/// Modelo de cilindro:
/// `raio = perimetro / 2π`, `altura = (inferior + superior) / 2`,
/// `area_base = π·raio²`, `volume_normal = altura·area_base`.
///
/// Toda medida debe ser `> 0`; de lo contrario no se intenta ningún cálculo.
/// El volumen reducido NO se deriva aquí: lo ingresa el operador y sólo se
/// valida como positivo (ver `Cubagem`).
pub fn calcular_volume(medida_inferior: f64,
                       medida_superior: f64,
                       perimetro: f64)
                       -> Result<VolumeCalculado, DomainError> {
    if medida_inferior <= 0.0 || medida_superior <= 0.0 || perimetro <= 0.0 {
        return Err(DomainError::Validacao("todas as medidas da cubagem devem ser positivas".to_string()));
    }

    let raio = perimetro / (2.0 * PI);
    let altura = (medida_inferior + medida_superior) / 2.0;
    let area_base = PI * raio * raio;
    let volume_normal = altura * area_base;

    let mut avisos = Vec::new();
    let maior = medida_inferior.max(medida_superior);
    if (medida_inferior - medida_superior).abs() > LIMITE_CONICIDADE * maior {
        avisos.push(AvisoCubagem::ConicidadeAlta { medida_inferior, medida_superior });
    }
    if perimetro < PERIMETRO_MINIMO_PLAUSIVEL {
        avisos.push(AvisoCubagem::PerimetroPequeno { perimetro });
    }

    Ok(VolumeCalculado { raio, altura, area_base, volume_normal, avisos })
}

/// Saldo de retiradas contra una capacidad medida.
///
/// `disponivel` puede ser negativo: el sobregiro es un estado válido que se
/// muestra, nunca un error. `percentual_utilizado` puede superar 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SituacaoVolume {
    pub retirado: f64,
    pub disponivel: f64,
    pub percentual_utilizado: f64,
}

pub fn situacao_retiradas(capacidade: f64, volumes_retirados: &[f64]) -> SituacaoVolume {
    let retirado: f64 = volumes_retirados.iter().sum();
    let percentual_utilizado = if capacidade > 0.0 { retirado / capacidade * 100.0 } else { 0.0 };
    SituacaoVolume { retirado,
                     disponivel: capacidade - retirado,
                     percentual_utilizado }
}

/// Una retirada procede siempre que el volumen pedido sea positivo,
/// independiente del saldo restante.
pub fn pode_retirar(volume: f64) -> bool {
    volume > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cilindro_con_perimetro_2pi_radio_5() {
        // perimetro = 2π·5 => raio 5, altura (2+3)/2 = 2.5
        let v = calcular_volume(2.0, 3.0, 31.4159).unwrap();
        assert!((v.raio - 5.0).abs() < 1e-4);
        assert!((v.altura - 2.5).abs() < 1e-12);
        assert!((v.area_base - 78.54).abs() < 1e-2);
        assert!((v.volume_normal - 196.35).abs() < 2e-2);
    }

    #[test]
    fn medidas_no_positivas_rechazadas_sin_calcular() {
        for (i, s, p) in [(0.0, 3.0, 31.4), (2.0, -1.0, 31.4), (2.0, 3.0, 0.0)] {
            assert!(calcular_volume(i, s, p).is_err());
        }
    }

    #[test]
    fn aviso_de_conicidade_alta() {
        // |1 - 3| = 2 > 0.5 * 3
        let v = calcular_volume(1.0, 3.0, 40.0).unwrap();
        assert!(v.avisos
                 .iter()
                 .any(|a| matches!(a, AvisoCubagem::ConicidadeAlta { .. })));
    }

    #[test]
    fn aviso_de_perimetro_pequeno() {
        let v = calcular_volume(2.0, 2.5, 9.9).unwrap();
        assert!(v.avisos
                 .iter()
                 .any(|a| matches!(a, AvisoCubagem::PerimetroPequeno { .. })));
        // un perímetro normal no genera el aviso
        let v = calcular_volume(2.0, 2.5, 35.0).unwrap();
        assert!(v.avisos.is_empty());
    }

    #[test]
    fn sobregiro_es_estado_valido() {
        let s = situacao_retiradas(100.0, &[40.0, 70.0]);
        assert_eq!(s.retirado, 110.0);
        assert_eq!(s.disponivel, -10.0);
        assert!((s.percentual_utilizado - 110.0).abs() < 1e-12);
        // nuevas retiradas positivas siguen permitidas
        assert!(pode_retirar(5.0));
        assert!(!pode_retirar(0.0));
        assert!(!pode_retirar(-1.0));
    }
}
