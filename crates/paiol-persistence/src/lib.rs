//! paiol-persistence
//!
//! Implementación Postgres (Diesel) del `PaiolRepository` de paiol-core,
//! con paridad 1:1 respecto al backend in-memory.
//!
//! Módulos:
//! - `pg`: repositorio sobre Postgres, pool r2d2 y retry de transitorios.
//! - `migrations`: runner embebido de migraciones Diesel.
//! - `config`: carga de configuración desde .env.
//! - `schema`: tablas Diesel declaradas para compilar queries.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pg;
pub mod schema;

pub use config::init_dotenv;
pub use error::PersistenceError;
pub use pg::{build_dev_pool_from_env, build_pool, ConnectionProvider, PgPaiolRepository, PgPool, PoolProvider};
