//! Modelo de CustodyWindow
//!
//! Ventana de posesión de un trailer por parte de un cliente (movimiento),
//! mapea a la tabla `asset_locations`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Movimiento validado, listo para anexar al historial
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustodyWindow {
    pub vin: String,
    pub customer: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub start_location: String,
    pub end_location: String,
}

/// Ventana de custodia almacenada. Invariante: `end_time >= start_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CustodyWindow {
    pub id: i64,
    pub vin: String,
    pub customer: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub start_location: String,
    pub end_location: String,
}

impl NewCustodyWindow {
    pub fn into_window(self, id: i64) -> CustodyWindow {
        CustodyWindow {
            id,
            vin: self.vin,
            customer: self.customer,
            start_time: self.start_time,
            end_time: self.end_time,
            start_location: self.start_location,
            end_location: self.end_location,
        }
    }
}
