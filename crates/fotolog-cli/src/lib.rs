use fotolog_core::{AppError, ErrorMetadata, LogFormat, LogLevel};

/// Initialize tracing for CLI binaries.
///
/// `RUST_LOG` overrides the default `info` filter. Logs go to stderr so
/// command output on stdout stays parseable.
pub fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

/// Level a failed command is logged at. Errors that carry no `AppError` are
/// unexpected and logged as errors.
pub fn failure_level(err: &anyhow::Error) -> LogLevel {
    err.downcast_ref::<AppError>()
        .map_or(LogLevel::Error, |app| app.log_level())
}

/// Log a failed command at the level its error asks for.
pub fn log_failure(err: &anyhow::Error) {
    let error_type = err
        .downcast_ref::<AppError>()
        .map_or("Internal", |app| app.error_type());

    match failure_level(err) {
        LogLevel::Debug => tracing::debug!(error_type, error = ?err, "Command failed"),
        LogLevel::Warn => tracing::warn!(error_type, error = ?err, "Command failed"),
        LogLevel::Error => tracing::error!(error_type, error = ?err, "Command failed"),
    }
}

/// JSON body describing a failed command.
///
/// Sensitive errors only show their client message unless `verbose` is set.
pub fn error_report(err: &anyhow::Error, verbose: bool) -> serde_json::Value {
    match err.downcast_ref::<AppError>() {
        Some(app) => {
            let details = if verbose || !app.is_sensitive() {
                Some(app.detailed_message())
            } else {
                None
            };
            serde_json::json!({
                "success": false,
                "error_code": app.error_code(),
                "message": app.client_message(),
                "recoverable": app.is_recoverable(),
                "suggested_action": app.suggested_action(),
                "details": details,
            })
        }
        None => serde_json::json!({
            "success": false,
            "error_code": "INTERNAL_ERROR",
            "message": format!("{:#}", err),
        }),
    }
}
