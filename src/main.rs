use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use trailer_damage_attribution::config::database::DatabaseConfig;
use trailer_damage_attribution::config::environment::{EnvironmentConfig, StoreBackend};
use trailer_damage_attribution::database;
use trailer_damage_attribution::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    let level = if config.is_development() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("🚛 Trailer Damage Attribution API");
    info!("=================================");

    // Inicializar historiales
    let app_state = match config.store_backend {
        StoreBackend::Postgres => {
            let db_config = DatabaseConfig::from_environment(&config)?;
            let pool = match database::create_pool(&db_config).await {
                Ok(pool) => pool,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(anyhow::anyhow!("Error de base de datos: {}", e));
                }
            };
            database::run_migrations(&pool).await?;
            info!("✅ Historiales en PostgreSQL");
            AppState::with_postgres(config.clone(), pool)
        }
        StoreBackend::Memory => {
            info!("⚠️ Sin DATABASE_URL: historiales en memoria (se pierden al reiniciar)");
            AppState::in_memory(config.clone())
        }
    };

    let app = create_router(app_state);
    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("   GET  /checklist - Checklist de inspección");
    info!("   POST /add_inspection - Registrar inspección");
    info!("   POST /add_location - Registrar movimiento de custodia");
    info!("   GET  /analyze/:vin - Atribución de daños de un VIN");
    info!("   POST /analyze - Atribución de daños para varios VINs");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Servidor terminó con error: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
