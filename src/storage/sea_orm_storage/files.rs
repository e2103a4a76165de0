//! 文件存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::files::{ActiveModel, Entity as Files};
use crate::errors::Result;
use crate::models::files::entities::File;
use crate::storage::FileStorage;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

#[async_trait::async_trait]
impl FileStorage for SeaOrmStorage {
    /// 写入文件记录（文件内容已落盘）
    async fn upload_file(
        &self,
        token: &str,
        file_name: &str,
        file_size: i64,
        file_type: &str,
        uploaded_by: i64,
    ) -> Result<File> {
        let model = ActiveModel {
            token: Set(token.to_string()),
            original_name: Set(file_name.to_string()),
            file_size: Set(file_size),
            file_type: Set(file_type.to_string()),
            uploaded_by: Set(uploaded_by),
            uploaded_at: Set(chrono::Utc::now().timestamp()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_err("上传文件记录失败"))?;

        Ok(result.into_file())
    }

    async fn get_file_by_token(&self, token: &str) -> Result<Option<File>> {
        let result = Files::find_by_id(token.to_string())
            .one(&self.db)
            .await
            .map_err(db_err("查询文件失败"))?;

        Ok(result.map(|m| m.into_file()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use crate::storage::{FileStorage, ProfileStorage};
    use crate::models::profiles::{
        entities::{ProfileStatus, UserType},
        requests::NewProfile,
    };

    #[actix_web::test]
    async fn test_upload_and_fetch_file_record() {
        let storage = test_support::storage().await;
        let owner = storage
            .create_profile(NewProfile {
                email: "uploader@escola.test".to_string(),
                password_hash: "hash".to_string(),
                full_name: "Uploader".to_string(),
                user_type: UserType::Admin,
                status: ProfileStatus::Active,
                school_id: None,
                avatar_url: None,
            })
            .await
            .unwrap();

        let file = storage
            .upload_file("abc-123", "boletim.pdf", 2048, "application/pdf", owner.id)
            .await
            .unwrap();
        assert_eq!(file.token, "abc-123");

        let fetched = storage.get_file_by_token("abc-123").await.unwrap().unwrap();
        assert_eq!(fetched.original_name, "boletim.pdf");
        assert_eq!(fetched.file_size, 2048);
        assert!(storage.get_file_by_token("missing").await.unwrap().is_none());
    }
}
