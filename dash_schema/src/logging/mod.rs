//! Global logging module for the dashboard core
//!
//! Provides a thread-safe global logging service, coded events and a
//! per-thread execution context that tags every event emitted while a
//! dashboard execution is being reduced.

pub mod codes;
pub mod config;
pub mod events;
#[macro_use]
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{
    ConsoleLogger, Logger, LoggingService, MemoryLogger, MultiLogger, StructuredLogger,
};

#[cfg(feature = "log-facade")]
pub use service::LogFacadeLogger;

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static EXECUTION_CONTEXT: RefCell<Option<String>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from the runtime preferences.
///
/// `host` receives every event alongside the backend the preferences select;
/// `min_level` overrides the configured level when given.
pub fn init_global_logging(
    host: Option<Arc<dyn Logger>>,
    min_level: Option<LogLevel>,
) -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let min_level = min_level.unwrap_or_else(config::get_min_log_level);
    let logging_service = Arc::new(LoggingService::with_preferences(
        &config::runtime_preferences(),
        min_level,
        host,
    ));
    init_global_logging_with_service(logging_service.clone())?;

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with custom service (host binaries and tests)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER.set(service).map_err(|_| {
        if let Some(existing) = try_get_global_logger() {
            existing.log_error(
                codes::system::INITIALIZATION_FAILURE,
                "Global logger already initialized",
            );
        }
        "Global logger already initialized".to_string()
    })
}

/// Safe access to global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// Whether debug events would reach the logger at all
pub fn debug_enabled() -> bool {
    try_get_global_logger()
        .map(|logger| logger.should_log(LogLevel::Debug))
        .unwrap_or(false)
}

// ============================================================================
// EXECUTION CONTEXT MANAGEMENT
// ============================================================================

pub fn set_execution_context(execution_id: &str) {
    EXECUTION_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(execution_id.to_string());
    });
}

pub fn clear_execution_context() {
    EXECUTION_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Execute function with execution context, restoring the previous one after
pub fn with_execution_context<F, R>(execution_id: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = get_current_execution_context();
    set_execution_context(execution_id);
    let result = f();
    match previous {
        Some(id) => set_execution_context(&id),
        None => clear_execution_context(),
    }
    result
}

pub fn get_current_execution_context() -> Option<String> {
    EXECUTION_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

fn finish_event(mut event: LogEvent, context: Vec<(&str, &str)>) -> LogEvent {
    let max_length = config::get_max_log_message_length();
    if event.message.len() > max_length {
        let mut cut = max_length;
        while !event.message.is_char_boundary(cut) {
            cut -= 1;
        }
        event.message.truncate(cut);
    }

    for (key, value) in context {
        event = event.with_context(key, value);
    }

    if let Some(execution_id) = get_current_execution_context() {
        event = event.with_context("execution_id", &execution_id);
    }

    event
}

fn dispatch(event: LogEvent) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Log error with context (used by log_error! macro)
pub fn log_error_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch(finish_event(LogEvent::error(code, message), context));
}

/// Log success with context (used by log_success! macro)
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch(finish_event(LogEvent::success(code, message), context));
}

/// Log info with context (used by log_info! macro)
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(finish_event(LogEvent::info(message), context));
}

/// Log warning with context (used by log_warning! macro)
pub fn log_warning_with_context(code: Option<Code>, message: &str, context: Vec<(&str, &str)>) {
    let event = match code {
        Some(code) => LogEvent::warning_with_code(code, message),
        None => LogEvent::warning(message),
    };
    dispatch(finish_event(event, context));
}

/// Log debug with context (used by log_debug! macro)
pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(finish_event(LogEvent::debug(message), context));
}
