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
macro_rules! define_escola_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum EscolaError {
            $($variant(String),)*
        }

        impl EscolaError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(EscolaError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(EscolaError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(EscolaError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl EscolaError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        EscolaError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_escola_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    FileOperation("E006", "File Operation Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    StoragePluginNotFound("E010", "Storage Plugin Not Found"),
    DateParse("E011", "Date Parse Error"),
    Authentication("E012", "Authentication Error"),
    Authorization("E013", "Authorization Error"),
    BusinessRule("E014", "Business Rule Violation"),
    Conflict("E015", "Resource Conflict"),
}

impl EscolaError {
    /// 是否为唯一约束冲突（不同数据库的报错文本不同）
    pub fn is_unique_violation(&self) -> bool {
        let msg = self.message();
        msg.contains("UNIQUE constraint failed")
            || msg.contains("duplicate key value")
            || msg.contains("Duplicate entry")
    }

    /// 是否为外键约束冲突
    pub fn is_foreign_key_violation(&self) -> bool {
        let msg = self.message();
        msg.contains("FOREIGN KEY constraint failed")
            || msg.contains("violates foreign key constraint")
            || msg.contains("a foreign key constraint fails")
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for EscolaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for EscolaError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for EscolaError {
    fn from(err: sea_orm::DbErr) -> Self {
        EscolaError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for EscolaError {
    fn from(err: std::io::Error) -> Self {
        EscolaError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for EscolaError {
    fn from(err: serde_json::Error) -> Self {
        EscolaError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for EscolaError {
    fn from(err: chrono::ParseError) -> Self {
        EscolaError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EscolaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(EscolaError::cache_connection("test").code(), "E001");
        assert_eq!(EscolaError::database_config("test").code(), "E003");
        assert_eq!(EscolaError::validation("test").code(), "E007");
        assert_eq!(EscolaError::authentication("test").code(), "E012");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            EscolaError::cache_connection("test").error_type(),
            "Cache Connection Error"
        );
        assert_eq!(
            EscolaError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = EscolaError::validation("Invalid input");
        assert_eq!(err.message(), "Invalid input");
    }

    #[test]
    fn test_business_errors() {
        let err = EscolaError::business_rule("Insufficient atoms");
        assert_eq!(err.code(), "E014");
        assert_eq!(err.error_type(), "Business Rule Violation");
        assert_eq!(EscolaError::conflict("dup").code(), "E015");
    }

    #[test]
    fn test_constraint_detection() {
        let sqlite = EscolaError::database_operation(
            "创建课程失败: UNIQUE constraint failed: courses.school_id, courses.name",
        );
        assert!(sqlite.is_unique_violation());
        assert!(!sqlite.is_foreign_key_violation());

        let postgres = EscolaError::database_operation(
            "insert or update on table \"students\" violates foreign key constraint",
        );
        assert!(postgres.is_foreign_key_violation());
    }

    #[test]
    fn test_format_simple() {
        let err = EscolaError::validation("Invalid URL");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("Invalid URL"));
    }
}
