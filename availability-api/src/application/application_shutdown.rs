use super::ApplicationStateToClose;
use std::sync::Arc;

pub async fn close(state: ApplicationStateToClose) {
    if let Some(rabbitmq_events_service) = state.rabbitmq_events_service {
        tracing::info!("closing rabbitmq events service");
        match Arc::try_unwrap(rabbitmq_events_service) {
            Ok(rabbitmq_events_service) => rabbitmq_events_service.close().await,
            Err(_) => tracing::error!("cannot close rabbitmq events service"),
        }
    }

    if let Some(db_client) = state.db_client {
        tracing::info!("closing connection with database");
        db_client.shutdown().await;
    }
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("starting shutdown");
}
