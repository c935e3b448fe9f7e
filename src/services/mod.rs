//! Services module
//!
//! Este módulo contiene la lógica de negocio: validación de submissions,
//! detección de transiciones de daño, resolución de custodia y ensamblado
//! del análisis. Todo es puro y determinista sobre historiales ya cargados.

pub mod attribution_assembler;
pub mod custody_resolver;
pub mod damage_detector;
pub mod ingestion_validator;

pub use attribution_assembler::assemble;
pub use custody_resolver::{resolve, status_for};
pub use damage_detector::detect_damage_events;
