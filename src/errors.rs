//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_attendance_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum AttendanceError {
            $($variant(String),)*
        }

        impl AttendanceError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(AttendanceError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(AttendanceError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(AttendanceError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl AttendanceError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        AttendanceError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_attendance_errors! {
    Validation("A001", "Validation Error"),
    NotFound("A002", "Resource Not Found"),
    DuplicateSession("A003", "Duplicate Session"),
    InvalidSessionTransition("A004", "Invalid Session Transition"),
    UnauthorizedCollector("A005", "Unauthorized Collector"),
    InvalidRecordState("A006", "Invalid Record State"),
    DatabaseConfig("A101", "Database Configuration Error"),
    DatabaseConnection("A102", "Database Connection Error"),
    DatabaseOperation("A103", "Database Operation Error"),
    Serialization("A104", "Serialization Error"),
    DateParse("A105", "Date Parse Error"),
    EventPublish("A106", "Event Publish Error"),
    Config("A107", "Configuration Error"),
}

impl AttendanceError {
    /// 状态机守卫失败，消息中包含当前状态与尝试的转换
    pub fn transition<C: fmt::Display, A: fmt::Display>(current: C, attempted: A) -> Self {
        AttendanceError::InvalidSessionTransition(format!(
            "cannot {attempted} a session in state '{current}'"
        ))
    }

    /// 是否为领域错误（调用方输入或状态导致，而非基础设施故障）
    pub fn is_domain_error(&self) -> bool {
        self.code().starts_with("A0")
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for AttendanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for AttendanceError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for AttendanceError {
    fn from(err: sea_orm::DbErr) -> Self {
        AttendanceError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for AttendanceError {
    fn from(err: serde_json::Error) -> Self {
        AttendanceError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for AttendanceError {
    fn from(err: chrono::ParseError) -> Self {
        AttendanceError::DateParse(err.to_string())
    }
}

impl From<config::ConfigError> for AttendanceError {
    fn from(err: config::ConfigError) -> Self {
        AttendanceError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AttendanceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AttendanceError::validation("test").code(), "A001");
        assert_eq!(AttendanceError::duplicate_session("test").code(), "A003");
        assert_eq!(AttendanceError::unauthorized_collector("test").code(), "A005");
        assert_eq!(AttendanceError::database_operation("test").code(), "A103");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            AttendanceError::invalid_record_state("test").error_type(),
            "Invalid Record State"
        );
        assert_eq!(
            AttendanceError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_transition_message_names_both_states() {
        let err = AttendanceError::transition("pending", "approve");
        assert!(matches!(err, AttendanceError::InvalidSessionTransition(_)));
        assert!(err.message().contains("pending"));
        assert!(err.message().contains("approve"));
    }

    #[test]
    fn test_domain_error_classification() {
        assert!(AttendanceError::not_found("x").is_domain_error());
        assert!(!AttendanceError::database_connection("x").is_domain_error());
    }

    #[test]
    fn test_format_simple() {
        let err = AttendanceError::validation("reason must not be blank");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("reason must not be blank"));
    }
}
