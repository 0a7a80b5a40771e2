//! Folio Observability
//!
//! 提供统一的日志初始化和 span 工具。

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;

pub use config::LoggingConfig;
pub use error::{ObservabilityError, Result};
pub use logging::{create_request_span, create_session_span, new_request_id, LogManager};

/// 便捷导入模块
pub mod prelude {
    //! 常用类型的便捷导入

    pub use crate::{LogManager, LoggingConfig, Result};

    pub use tracing::{debug, error, info, instrument, trace, warn, Span};
}
