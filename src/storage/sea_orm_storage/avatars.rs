//! 头像存储操作

use super::{SeaOrmStorage, db_err, student_for_update};
use crate::entity::avatars;
use crate::entity::prelude::Avatars;
use crate::errors::Result;
use crate::models::{
    Rejection,
    avatars::{
        entities::Avatar,
        requests::{CreateAvatarRequest, UpdateAvatarRequest},
    },
    people::entities::Student,
};
use crate::storage::AvatarStorage;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

#[async_trait::async_trait]
impl AvatarStorage for SeaOrmStorage {
    async fn create_avatar(&self, req: CreateAvatarRequest) -> Result<Avatar> {
        let now = chrono::Utc::now().timestamp();
        let model = avatars::ActiveModel {
            name: Set(req.name),
            image_url: Set(req.image_url),
            required_xp: Set(req.required_xp),
            active: Set(req.active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err("创建头像失败"))?;

        Ok(model.into_avatar())
    }

    async fn get_avatar_by_id(&self, id: i64) -> Result<Option<Avatar>> {
        let result = Avatars::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询头像失败"))?;
        Ok(result.map(|m| m.into_avatar()))
    }

    async fn list_avatars(&self, include_inactive: bool) -> Result<Vec<Avatar>> {
        let mut select = Avatars::find();
        if !include_inactive {
            select = select.filter(avatars::Column::Active.eq(true));
        }
        let items = select
            .order_by_asc(avatars::Column::RequiredXp)
            .order_by_asc(avatars::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err("查询头像列表失败"))?;
        Ok(items.into_iter().map(|m| m.into_avatar()).collect())
    }

    async fn update_avatar(&self, id: i64, update: UpdateAvatarRequest) -> Result<Option<Avatar>> {
        let Some(existing) = Avatars::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询头像失败"))?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(image_url) = update.image_url {
            model.image_url = Set(image_url);
        }
        if let Some(required_xp) = update.required_xp {
            model.required_xp = Set(required_xp);
        }
        if let Some(active) = update.active {
            model.active = Set(active);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_err("更新头像失败"))?;
        Ok(Some(updated.into_avatar()))
    }

    async fn delete_avatar(&self, id: i64) -> Result<bool> {
        let result = Avatars::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除头像失败"))?;
        Ok(result.rows_affected > 0)
    }

    async fn count_avatars(&self) -> Result<u64> {
        Avatars::find()
            .count(&self.db)
            .await
            .map_err(db_err("统计头像失败"))
    }

    async fn equip_avatar(
        &self,
        student_id: i64,
        avatar_id: i64,
    ) -> Result<std::result::Result<Student, Rejection>> {
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let Some(student) = student_for_update(student_id)
            .one(&txn)
            .await
            .map_err(db_err("查询学生失败"))?
        else {
            return Ok(Err(Rejection::StudentNotFound(student_id)));
        };

        let avatar = Avatars::find_by_id(avatar_id)
            .one(&txn)
            .await
            .map_err(db_err("查询头像失败"))?
            .filter(|a| a.active);
        let Some(avatar) = avatar else {
            return Ok(Err(Rejection::AvatarUnavailable));
        };
        if student.xp < avatar.required_xp {
            return Ok(Err(Rejection::AvatarLocked {
                required_xp: avatar.required_xp,
                xp: student.xp,
            }));
        }

        let mut model = student.into_active_model();
        model.avatar_id = Set(Some(avatar.id));
        model.updated_at = Set(chrono::Utc::now().timestamp());
        let updated = model
            .update(&txn)
            .await
            .map_err(db_err("装备头像失败"))?;
        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(Ok(updated.into_student()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use super::*;

    fn avatar(name: &str, required_xp: i64, active: bool) -> CreateAvatarRequest {
        CreateAvatarRequest {
            name: name.to_string(),
            image_url: format!("/avatars/{name}.png"),
            required_xp,
            active,
        }
    }

    #[actix_web::test]
    async fn test_list_hides_inactive_avatars() {
        let storage = test_support::storage().await;
        storage.create_avatar(avatar("coruja", 0, true)).await.unwrap();
        storage.create_avatar(avatar("fantasma", 0, false)).await.unwrap();

        assert_eq!(storage.list_avatars(false).await.unwrap().len(), 1);
        assert_eq!(storage.list_avatars(true).await.unwrap().len(), 2);
        assert_eq!(storage.count_avatars().await.unwrap(), 2);
    }

    #[actix_web::test]
    async fn test_equip_requires_xp_and_active_avatar() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Avatar").await;
        let student = test_support::student(&storage, school.id, "V-1").await;
        let free = storage.create_avatar(avatar("gato", 0, true)).await.unwrap();
        let locked = storage.create_avatar(avatar("dragao", 500, true)).await.unwrap();
        let hidden = storage.create_avatar(avatar("antigo", 0, false)).await.unwrap();

        assert_eq!(
            storage
                .equip_avatar(student.id, locked.id)
                .await
                .unwrap()
                .unwrap_err(),
            Rejection::AvatarLocked {
                required_xp: 500,
                xp: 0
            }
        );
        assert_eq!(
            storage
                .equip_avatar(student.id, hidden.id)
                .await
                .unwrap()
                .unwrap_err(),
            Rejection::AvatarUnavailable
        );

        let equipped = storage
            .equip_avatar(student.id, free.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(equipped.avatar_id, Some(free.id));
    }
}
