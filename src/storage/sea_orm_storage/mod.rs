//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。
//! 每个子模块为 `SeaOrmStorage` 实现一个业务域的存储 trait。

mod assignments;
mod avatars;
mod catalog;
mod dashboard;
mod files;
mod gamification;
mod people;
mod profiles;
mod schools;
mod store;
mod system;
mod tenancy;

use crate::config::AppConfig;
use crate::entity::prelude::Students;
use crate::errors::{EscolaError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, QuerySelect, Select};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        Self::migrate(&db).await?;
        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// 内存 SQLite，单连接，已执行迁移（测试用）
    pub async fn in_memory() -> Result<Self> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| EscolaError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .foreign_keys(true);

        // 内存库随连接销毁，保持唯一连接常驻
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opt)
            .await
            .map_err(|e| EscolaError::database_connection(format!("SQLite 连接失败: {e}")))?;

        let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
        Self::migrate(&db).await?;
        Ok(Self { db })
    }

    async fn migrate(db: &DatabaseConnection) -> Result<()> {
        Migrator::up(db, None)
            .await
            .map_err(|e| EscolaError::database_operation(format!("数据库迁移失败: {e}")))
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| EscolaError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| EscolaError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| EscolaError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(EscolaError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// 事务内锁定学生行后再读余额（SELECT ... FOR UPDATE）
///
/// SQLite 不支持行锁，写事务本身串行，语句中不带锁子句。
pub(crate) fn student_for_update(id: i64) -> Select<Students> {
    Students::find_by_id(id).lock_exclusive()
}

/// 数据库错误统一转换，附带操作描述
pub(crate) fn db_err(action: &'static str) -> impl Fn(sea_orm::DbErr) -> EscolaError {
    move |e| EscolaError::database_operation(format!("{action}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_student_read_locks_row_on_server_databases() {
        let postgres = student_for_update(7).build(DbBackend::Postgres).to_string();
        assert!(postgres.ends_with("FOR UPDATE"), "{postgres}");

        let mysql = student_for_update(7).build(DbBackend::MySql).to_string();
        assert!(mysql.ends_with("FOR UPDATE"), "{mysql}");

        let sqlite = student_for_update(7).build(DbBackend::Sqlite).to_string();
        assert!(!sqlite.contains("FOR UPDATE"), "{sqlite}");
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! 存储测试公用的数据准备函数

    use super::SeaOrmStorage;
    use crate::models::{
        people::{
            entities::{NewLogin, Student},
            requests::CreateStudentRequest,
        },
        profiles::{
            entities::{Profile, ProfileStatus, UserType},
            requests::NewProfile,
        },
        schools::{entities::School, requests::CreateSchoolRequest},
    };
    use crate::storage::{PeopleStorage, ProfileStorage, SchoolStorage};

    pub async fn storage() -> SeaOrmStorage {
        SeaOrmStorage::in_memory().await.expect("in-memory storage")
    }

    pub async fn school(storage: &SeaOrmStorage, name: &str) -> School {
        storage
            .create_school(CreateSchoolRequest {
                name: name.to_string(),
                cnpj: None,
                email: None,
                phone: None,
                address: None,
                city: None,
                state: None,
                logo_url: None,
                director_id: None,
                owner_id: None,
            })
            .await
            .expect("create school")
    }

    pub async fn profile(
        storage: &SeaOrmStorage,
        email: &str,
        user_type: UserType,
        school_id: Option<i64>,
    ) -> Profile {
        storage
            .create_profile(NewProfile {
                email: email.to_string(),
                password_hash: "hash".to_string(),
                full_name: "Conta Teste".to_string(),
                user_type,
                status: ProfileStatus::Active,
                school_id,
                avatar_url: None,
            })
            .await
            .expect("create profile")
    }

    pub async fn student(storage: &SeaOrmStorage, school_id: i64, registration: &str) -> Student {
        storage
            .create_student(
                NewLogin {
                    email: format!("{registration}@aluno.test"),
                    password_hash: "hash".to_string(),
                    full_name: format!("Aluno {registration}"),
                    school_id,
                },
                CreateStudentRequest {
                    school_id: Some(school_id),
                    full_name: format!("Aluno {registration}"),
                    email: format!("{registration}@aluno.test"),
                    password: None,
                    registration: registration.to_string(),
                    birth_date: None,
                    class_id: None,
                    guardian_id: None,
                },
            )
            .await
            .expect("create student")
    }
}
