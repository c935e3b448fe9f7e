//! Atribución de daños en trailers
//!
//! Registra inspecciones y movimientos de custodia por VIN y atribuye cada
//! daño detectado a los clientes que tenían el trailer cuando ocurrió.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
