//! Configuración de conexión desde variables de entorno.
//! Convención `DATABASE_URL` más tamaños opcionales de pool
//! (`DATABASE_POOL_MIN` / `DATABASE_POOL_MAX`).

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;

// El .env se carga una sola vez, perezosamente.
static DOTENV: Lazy<()> = Lazy::new(|| {
    let _ = dotenv();
});

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV);
        let url = env::var("DATABASE_URL").expect("DATABASE_URL no definido");
        let min_connections = env::var("DATABASE_POOL_MIN").ok().and_then(|v| v.parse().ok()).unwrap_or(1);
        let max_connections = env::var("DATABASE_POOL_MAX").ok().and_then(|v| v.parse().ok()).unwrap_or(8);
        Self { url, min_connections, max_connections }
    }
}

/// Forzar la carga temprana del .env desde aplicaciones externas.
pub fn init_dotenv() {
    Lazy::force(&DOTENV);
}
