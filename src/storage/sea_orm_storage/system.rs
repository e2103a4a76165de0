use super::SeaOrmStorage;
use crate::errors::{EscolaError, Result};
use crate::storage::SystemStorage;

#[async_trait::async_trait]
impl SystemStorage for SeaOrmStorage {
    async fn ping(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| EscolaError::database_connection(format!("数据库不可用: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use crate::storage::SystemStorage;

    #[actix_web::test]
    async fn test_ping_in_memory_database() {
        let storage = test_support::storage().await;
        assert!(storage.ping().await.is_ok());
    }
}
