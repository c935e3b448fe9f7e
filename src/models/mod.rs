//! Modelos del sistema
//!
//! Este módulo contiene el checklist de inspección, los registros que se
//! anexan a los historiales y los modelos derivados del análisis de daños.

pub mod checklist;
pub mod custody;
pub mod damage;
pub mod inspection;
