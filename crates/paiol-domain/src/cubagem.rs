use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::volume::{calcular_volume, AvisoCubagem};
use crate::DomainError;

/// Medición volumétrica de una dragagem. Exactamente una por dragagem (1:1).
///
/// Inmutable una vez calculada, con una única excepción: el ajuste manual de
/// `volume_reduzido` vía `ajustar_volume_reduzido`. El volumen reducido es
/// una cifra operativa ingresada por el operador (nominalmente ~85% del
/// normal) y jamás se deriva automáticamente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cubagem {
    id: Uuid,
    dragagem_id: Uuid,
    medida_inferior: f64,
    medida_superior: f64,
    perimetro: f64,
    volume_normal: f64,
    volume_reduzido: f64,
    data_medicao: DateTime<Utc>,
}

impl Cubagem {
    /// Construye la cubagem derivando `volume_normal` del modelo cilíndrico.
    /// Devuelve también los avisos consultivos de las medidas.
    pub fn nova(dragagem_id: Uuid,
                medida_inferior: f64,
                medida_superior: f64,
                perimetro: f64,
                volume_reduzido: f64,
                data_medicao: DateTime<Utc>)
                -> Result<(Self, Vec<AvisoCubagem>), DomainError> {
        let calculo = calcular_volume(medida_inferior, medida_superior, perimetro)?;
        if volume_reduzido <= 0.0 {
            return Err(DomainError::Validacao("volume reduzido deve ser positivo".to_string()));
        }
        let cubagem = Cubagem { id: Uuid::new_v4(),
                                dragagem_id,
                                medida_inferior,
                                medida_superior,
                                perimetro,
                                volume_normal: calculo.volume_normal,
                                volume_reduzido,
                                data_medicao };
        Ok((cubagem, calculo.avisos))
    }

    /// Rehidratación desde el almacenamiento (los valores ya fueron validados
    /// al registrar).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruir(id: Uuid,
                       dragagem_id: Uuid,
                       medida_inferior: f64,
                       medida_superior: f64,
                       perimetro: f64,
                       volume_normal: f64,
                       volume_reduzido: f64,
                       data_medicao: DateTime<Utc>)
                       -> Self {
        Cubagem { id,
                  dragagem_id,
                  medida_inferior,
                  medida_superior,
                  perimetro,
                  volume_normal,
                  volume_reduzido,
                  data_medicao }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn dragagem_id(&self) -> Uuid { self.dragagem_id }
    pub fn medida_inferior(&self) -> f64 { self.medida_inferior }
    pub fn medida_superior(&self) -> f64 { self.medida_superior }
    pub fn perimetro(&self) -> f64 { self.perimetro }
    pub fn volume_normal(&self) -> f64 { self.volume_normal }
    pub fn volume_reduzido(&self) -> f64 { self.volume_reduzido }
    pub fn data_medicao(&self) -> DateTime<Utc> { self.data_medicao }

    /// Ajuste manual del volumen reducido (política del operador).
    pub fn ajustar_volume_reduzido(&mut self, novo_volume: f64) -> Result<(), DomainError> {
        if novo_volume <= 0.0 {
            return Err(DomainError::Validacao("volume reduzido deve ser positivo".to_string()));
        }
        self.volume_reduzido = novo_volume;
        Ok(())
    }
}
