//! Plain HTTP listener with graceful, time-bounded shutdown.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use super::lifecycle::serve_with_shutdown;
use super::shutdown::{shutdown_deadline, shutdown_token};
use super::{ServerError, ServerResult};
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Starts an HTTP server with graceful shutdown.
///
/// After a shutdown signal the listener stops accepting connections and
/// in-flight requests get [`ServerConfig::shutdown_timeout`] to finish.
pub async fn serve_http(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    if let Err(validation_error) = server_config.validate() {
        let error = ServerError::invalid_config(&validation_error);
        log_failure(&error);
        return Err(error);
    }

    let server_addr = server_config.server_addr();
    let listener = match TcpListener::bind(server_addr).await {
        Ok(listener) => listener,
        Err(source) => {
            let error = ServerError::bind_error(server_addr, source);
            log_failure(&error);
            return Err(error);
        }
    };

    let shutdown_timeout = server_config.shutdown_timeout();
    serve_with_shutdown(&server_config, || {
        serve_until_drained(listener, app, shutdown_timeout)
    })
    .await
    .map_err(ServerError::Runtime)
}

async fn serve_until_drained(
    listener: TcpListener,
    app: Router,
    shutdown_timeout: Duration,
) -> io::Result<()> {
    let token = shutdown_token();

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(token.clone().cancelled_owned())
    .into_future();

    tokio::select! {
        result = server => result,
        () = shutdown_deadline(token, shutdown_timeout) => {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                timeout_secs = shutdown_timeout.as_secs(),
                "Shutdown timeout elapsed, dropping open connections"
            );
            Ok(())
        }
    }
}

fn log_failure(error: &ServerError) {
    tracing::error!(
        target: TRACING_TARGET_SERVER_STARTUP,
        error = %error,
        error_code = error.error_code(),
        recoverable = error.is_recoverable(),
        suggestion = error.suggestion(),
        "Server failed"
    );
}
