//! 账户存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::profiles::{ActiveModel, Column, Entity as Profiles};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    profiles::{
        entities::Profile,
        requests::{NewProfile, ProfileChanges, ProfileListQuery},
        responses::ProfileListResponse,
    },
};
use crate::storage::ProfileStorage;
use crate::utils::like_contains;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

impl NewProfile {
    pub(crate) fn into_active(self, now: i64) -> ActiveModel {
        ActiveModel {
            email: Set(self.email),
            password_hash: Set(self.password_hash),
            full_name: Set(self.full_name),
            user_type: Set(self.user_type.to_string()),
            status: Set(self.status.to_string()),
            school_id: Set(self.school_id),
            avatar_url: Set(self.avatar_url),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl ProfileStorage for SeaOrmStorage {
    async fn create_profile(&self, profile: NewProfile) -> Result<Profile> {
        let now = chrono::Utc::now().timestamp();
        let result = profile
            .into_active(now)
            .insert(&self.db)
            .await
            .map_err(db_err("创建账户失败"))?;

        Ok(result.into_profile())
    }

    async fn get_profile_by_id(&self, id: i64) -> Result<Option<Profile>> {
        let result = Profiles::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询账户失败"))?;

        Ok(result.map(|m| m.into_profile()))
    }

    async fn get_profile_by_email(&self, email: &str) -> Result<Option<Profile>> {
        let result = Profiles::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err("查询账户失败"))?;

        Ok(result.map(|m| m.into_profile()))
    }

    async fn list_profiles(&self, query: ProfileListQuery) -> Result<ProfileListResponse> {
        let mut select = Profiles::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(
                Condition::any()
                    .add(Column::Email.like(like_contains(search.trim())))
                    .add(Column::FullName.like(like_contains(search.trim()))),
            );
        }

        if let Some(user_type) = query.user_type {
            select = select.filter(Column::UserType.eq(user_type.to_string()));
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        if let Some(school_id) = query.school_id {
            select = select.filter(Column::SchoolId.eq(school_id));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, query.size);
        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(db_err("查询账户总数失败"))?;
        let profiles = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(db_err("查询账户列表失败"))?;

        Ok(ProfileListResponse {
            items: profiles.into_iter().map(|m| m.into_profile()).collect(),
            pagination: PaginationInfo::new(
                query.page,
                query.size,
                counts.number_of_items,
                counts.number_of_pages,
            ),
        })
    }

    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> Result<Option<Profile>> {
        let Some(existing) = Profiles::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询账户失败"))?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(email) = changes.email {
            model.email = Set(email);
        }
        if let Some(password_hash) = changes.password_hash {
            model.password_hash = Set(password_hash);
        }
        if let Some(full_name) = changes.full_name {
            model.full_name = Set(full_name);
        }
        if let Some(user_type) = changes.user_type {
            model.user_type = Set(user_type.to_string());
        }
        if let Some(status) = changes.status {
            model.status = Set(status.to_string());
        }
        if let Some(school_id) = changes.school_id {
            model.school_id = Set(Some(school_id));
        }
        if let Some(avatar_url) = changes.avatar_url {
            model.avatar_url = Set(Some(avatar_url));
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_err("更新账户失败"))?;

        Ok(Some(updated.into_profile()))
    }

    async fn delete_profile(&self, id: i64) -> Result<bool> {
        let result = Profiles::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除账户失败"))?;

        Ok(result.rows_affected > 0)
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Profiles::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err("更新最后登录时间失败"))?;

        Ok(result.rows_affected > 0)
    }

    async fn count_profiles(&self) -> Result<u64> {
        Profiles::find()
            .count(&self.db)
            .await
            .map_err(db_err("统计账户失败"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use super::*;
    use crate::models::profiles::entities::{ProfileStatus, UserType};
    use crate::storage::SchoolStorage;

    fn new_profile(email: &str, user_type: UserType) -> NewProfile {
        NewProfile {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            full_name: "Maria Souza".to_string(),
            user_type,
            status: ProfileStatus::Active,
            school_id: None,
            avatar_url: None,
        }
    }

    #[actix_web::test]
    async fn test_create_profile_produces_row() {
        let storage = test_support::storage().await;
        let created = storage
            .create_profile(new_profile("maria@escola.test", UserType::Teacher))
            .await
            .unwrap();

        let fetched = storage
            .get_profile_by_email("maria@escola.test")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.user_type, UserType::Teacher);
        assert_eq!(fetched.status, ProfileStatus::Active);
        assert!(fetched.last_login.is_none());
        assert_eq!(storage.count_profiles().await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn test_duplicate_email_is_unique_violation() {
        let storage = test_support::storage().await;
        storage
            .create_profile(new_profile("dup@escola.test", UserType::Admin))
            .await
            .unwrap();
        let err = storage
            .create_profile(new_profile("dup@escola.test", UserType::Admin))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[actix_web::test]
    async fn test_list_filters_and_search() {
        let storage = test_support::storage().await;
        storage
            .create_profile(new_profile("a@escola.test", UserType::Teacher))
            .await
            .unwrap();
        storage
            .create_profile(new_profile("b@escola.test", UserType::Guardian))
            .await
            .unwrap();
        storage
            .create_profile(new_profile("c_x@escola.test", UserType::Guardian))
            .await
            .unwrap();

        let guardians = storage
            .list_profiles(ProfileListQuery {
                page: 1,
                size: 10,
                user_type: Some(UserType::Guardian),
                status: None,
                school_id: None,
                search: None,
            })
            .await
            .unwrap();
        assert_eq!(guardians.pagination.total, 2);

        // 下划线按字面匹配
        let searched = storage
            .list_profiles(ProfileListQuery {
                page: 1,
                size: 10,
                user_type: None,
                status: None,
                school_id: None,
                search: Some("c_x".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(searched.items.len(), 1);
        assert_eq!(searched.items[0].email, "c_x@escola.test");
    }

    #[actix_web::test]
    async fn test_school_reference_must_exist() {
        let storage = test_support::storage().await;
        let err = storage
            .create_profile(NewProfile {
                school_id: Some(999_999),
                ..new_profile("ghost@escola.test", UserType::Admin)
            })
            .await
            .unwrap_err();
        assert!(err.is_foreign_key_violation(), "{err}");

        let created = storage
            .create_profile(new_profile("gestor@escola.test", UserType::Admin))
            .await
            .unwrap();
        let err = storage
            .update_profile(
                created.id,
                ProfileChanges {
                    school_id: Some(999_999),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_foreign_key_violation(), "{err}");

        // 管理员账户不随学校删除，归属置空
        let school = test_support::school(&storage, "Escola Horizonte").await;
        storage
            .update_profile(
                created.id,
                ProfileChanges {
                    school_id: Some(school.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(storage.delete_school(school.id).await.unwrap(), Some(vec![]));
        let orphan = storage.get_profile_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(orphan.school_id, None);
    }

    #[actix_web::test]
    async fn test_update_and_delete_profile() {
        let storage = test_support::storage().await;
        let created = storage
            .create_profile(new_profile("upd@escola.test", UserType::Teacher))
            .await
            .unwrap();

        let updated = storage
            .update_profile(
                created.id,
                ProfileChanges {
                    full_name: Some("Novo Nome".to_string()),
                    status: Some(ProfileStatus::Suspended),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.full_name, "Novo Nome");
        assert!(!updated.is_active());

        assert!(storage.update_last_login(created.id).await.unwrap());
        assert!(storage.delete_profile(created.id).await.unwrap());
        assert!(!storage.delete_profile(created.id).await.unwrap());
        assert!(
            storage
                .update_profile(created.id, ProfileChanges::default())
                .await
                .unwrap()
                .is_none()
        );
    }
}
