//! MCP Logger Trait
//!
//! High-level trait for implementing `logging/setLevel` handling and
//! `notifications/message` emission, mirroring the `McpNotification`/
//! `McpCompletion` pattern: metadata lives on the protocol-level
//! `LoggerDefinition`, behavior is added here.

use async_trait::async_trait;
use serde_json::Value;

use mcp_protocol::McpResult;
use mcp_protocol::logging::{LoggerDefinition, LoggingLevel, LoggingMessageNotification};

/// High-level trait for a server-side logger channel.
///
/// A registered logger owns one named logging channel: it tracks its current
/// threshold level and emits `notifications/message` for anything at or
/// above it.
#[async_trait]
pub trait McpLogger: LoggerDefinition + Send + Sync {
    /// Emit a log message, honoring the current threshold.
    ///
    /// Returns `Ok(None)` (not an error) when `data_level` is below the
    /// logger's current threshold — filtering out a message is routine,
    /// not a failure.
    async fn emit(&self, data_level: LoggingLevel, data: Value) -> McpResult<Option<LoggingMessageNotification>>;

    /// Update the logger's threshold level in response to `logging/setLevel`.
    async fn set_level(&self, level: LoggingLevel) -> McpResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_protocol::logging::{HasLogFormat, HasLogLevel, HasLogTransport, HasLoggingMetadata};
    use std::sync::atomic::{AtomicU8, Ordering};
    use std::sync::Mutex;

    struct TestLogger {
        threshold: AtomicU8,
        last_data: Mutex<Option<Value>>,
    }

    fn level_from_priority(p: u8) -> LoggingLevel {
        [
            LoggingLevel::Debug,
            LoggingLevel::Info,
            LoggingLevel::Notice,
            LoggingLevel::Warning,
            LoggingLevel::Error,
            LoggingLevel::Critical,
            LoggingLevel::Alert,
            LoggingLevel::Emergency,
        ][p as usize]
    }

    impl HasLoggingMetadata for TestLogger {
        fn method(&self) -> &str {
            "notifications/message"
        }
    }

    impl HasLogLevel for TestLogger {
        fn level(&self) -> LoggingLevel {
            level_from_priority(self.threshold.load(Ordering::SeqCst))
        }
    }

    impl HasLogFormat for TestLogger {
        fn data(&self) -> &Value {
            // Only used by the default `format_message`; tests don't exercise it.
            static NULL: Value = Value::Null;
            &NULL
        }
    }

    impl HasLogTransport for TestLogger {}

    #[async_trait]
    impl McpLogger for TestLogger {
        async fn emit(&self, data_level: LoggingLevel, data: Value) -> McpResult<Option<LoggingMessageNotification>> {
            if !data_level.should_log(self.level()) {
                return Ok(None);
            }
            *self.last_data.lock().unwrap() = Some(data.clone());
            Ok(Some(LoggingMessageNotification::new(data_level, data)))
        }

        async fn set_level(&self, level: LoggingLevel) -> McpResult<()> {
            self.threshold.store(level.priority(), Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn below_threshold_is_filtered_not_errored() {
        let logger = TestLogger {
            threshold: AtomicU8::new(LoggingLevel::Warning.priority()),
            last_data: Mutex::new(None),
        };

        let result = logger.emit(LoggingLevel::Debug, serde_json::json!("hi")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn at_or_above_threshold_emits() {
        let logger = TestLogger {
            threshold: AtomicU8::new(LoggingLevel::Warning.priority()),
            last_data: Mutex::new(None),
        };

        let result = logger.emit(LoggingLevel::Error, serde_json::json!("uh oh")).await.unwrap();
        assert!(result.is_some());
    }

    #[tokio::test]
    async fn set_level_changes_threshold() {
        let logger = TestLogger {
            threshold: AtomicU8::new(LoggingLevel::Error.priority()),
            last_data: Mutex::new(None),
        };

        logger.set_level(LoggingLevel::Debug).await.unwrap();
        let result = logger.emit(LoggingLevel::Debug, serde_json::json!("now visible")).await.unwrap();
        assert!(result.is_some());
    }
}
