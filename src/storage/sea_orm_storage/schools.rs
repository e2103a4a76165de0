//! 学校存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::prelude::{Guardians, Profiles, Schools, StoreOrders, Students, Teachers};
use crate::entity::{
    economia_config, guardians, profiles, schools, store_orders, students, teachers,
};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    gamification::entities::EconomyConfig,
    profiles::entities::UserType,
    schools::{
        entities::School,
        requests::{CreateSchoolRequest, SchoolListQuery, UpdateSchoolRequest},
        responses::SchoolListResponse,
    },
};
use crate::storage::SchoolStorage;
use crate::utils::like_contains;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

#[async_trait::async_trait]
impl SchoolStorage for SeaOrmStorage {
    async fn create_school(&self, req: CreateSchoolRequest) -> Result<School> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let school = schools::ActiveModel {
            name: Set(req.name),
            cnpj: Set(req.cnpj),
            email: Set(req.email),
            phone: Set(req.phone),
            address: Set(req.address),
            city: Set(req.city),
            state: Set(req.state),
            logo_url: Set(req.logo_url),
            director_id: Set(req.director_id),
            owner_id: Set(req.owner_id),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("创建学校失败"))?;

        // 默认经济配置
        economia_config::ActiveModel {
            school_id: Set(school.id),
            xp_per_atom: Set(EconomyConfig::DEFAULT_XP_PER_ATOM),
            store_enabled: Set(true),
            max_order_items: Set(EconomyConfig::DEFAULT_MAX_ORDER_ITEMS),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("创建经济配置失败"))?;

        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(school.into_school())
    }

    async fn get_school_by_id(&self, id: i64) -> Result<Option<School>> {
        let result = Schools::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询学校失败"))?;

        Ok(result.map(|m| m.into_school()))
    }

    async fn list_schools(&self, query: SchoolListQuery) -> Result<SchoolListResponse> {
        let mut select = Schools::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(
                Condition::any()
                    .add(schools::Column::Name.like(like_contains(search)))
                    .add(schools::Column::City.like(like_contains(search)))
                    .add(schools::Column::Cnpj.like(like_contains(search))),
            );
        }

        let paginator = select
            .order_by_asc(schools::Column::Name)
            .paginate(&self.db, query.size);
        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(db_err("查询学校总数失败"))?;
        let items = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(db_err("查询学校列表失败"))?;

        Ok(SchoolListResponse {
            items: items.into_iter().map(|m| m.into_school()).collect(),
            pagination: PaginationInfo::new(
                query.page,
                query.size,
                counts.number_of_items,
                counts.number_of_pages,
            ),
        })
    }

    async fn update_school(&self, id: i64, update: UpdateSchoolRequest) -> Result<Option<School>> {
        let Some(existing) = Schools::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询学校失败"))?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(cnpj) = update.cnpj {
            model.cnpj = Set(Some(cnpj));
        }
        if let Some(email) = update.email {
            model.email = Set(Some(email));
        }
        if let Some(phone) = update.phone {
            model.phone = Set(Some(phone));
        }
        if let Some(address) = update.address {
            model.address = Set(Some(address));
        }
        if let Some(city) = update.city {
            model.city = Set(Some(city));
        }
        if let Some(state) = update.state {
            model.state = Set(Some(state));
        }
        if let Some(logo_url) = update.logo_url {
            model.logo_url = Set(Some(logo_url));
        }
        if let Some(director_id) = update.director_id {
            model.director_id = Set(Some(director_id));
        }
        if let Some(owner_id) = update.owner_id {
            model.owner_id = Set(Some(owner_id));
        }
        if let Some(active) = update.active {
            model.active = Set(active);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_err("更新学校失败"))?;

        Ok(Some(updated.into_school()))
    }

    /// 删除学校及其所有成员账户，学校范围内的数据由外键级联删除
    async fn delete_school(&self, id: i64) -> Result<Option<Vec<i64>>> {
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let mut member_ids: Vec<i64> = Profiles::find()
            .select_only()
            .column(profiles::Column::Id)
            .filter(profiles::Column::SchoolId.eq(id))
            .filter(profiles::Column::UserType.ne(UserType::Admin.to_string()))
            .into_tuple::<i64>()
            .all(&txn)
            .await
            .map_err(db_err("查询学校账户失败"))?;

        let teacher_ids: Vec<i64> = Teachers::find()
            .select_only()
            .column(teachers::Column::ProfileId)
            .filter(teachers::Column::SchoolId.eq(id))
            .into_tuple::<i64>()
            .all(&txn)
            .await
            .map_err(db_err("查询学校教师失败"))?;
        let student_ids: Vec<i64> = Students::find()
            .select_only()
            .column(students::Column::ProfileId)
            .filter(students::Column::SchoolId.eq(id))
            .into_tuple::<i64>()
            .all(&txn)
            .await
            .map_err(db_err("查询学校学生失败"))?;
        let guardian_ids: Vec<i64> = Guardians::find()
            .select_only()
            .column(guardians::Column::ProfileId)
            .filter(guardians::Column::SchoolId.eq(id))
            .into_tuple::<i64>()
            .all(&txn)
            .await
            .map_err(db_err("查询学校监护人失败"))?;

        member_ids.extend(teacher_ids);
        member_ids.extend(student_ids);
        member_ids.extend(guardian_ids);
        member_ids.sort_unstable();
        member_ids.dedup();

        // 订单明细限制删除商品，先清掉本校订单（明细与交付随之级联）
        StoreOrders::delete_many()
            .filter(store_orders::Column::SchoolId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err("删除学校订单失败"))?;

        let result = Schools::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err("删除学校失败"))?;
        if result.rows_affected == 0 {
            return Ok(None);
        }

        if !member_ids.is_empty() {
            Profiles::delete_many()
                .filter(profiles::Column::Id.is_in(member_ids.clone()))
                .exec(&txn)
                .await
                .map_err(db_err("删除学校账户失败"))?;
        }

        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(Some(member_ids))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use super::*;
    use crate::storage::{GamificationStorage, ProfileStorage};

    #[actix_web::test]
    async fn test_create_school_writes_default_economy() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Aurora").await;
        assert!(school.active);

        let economy = storage.get_economy_config(school.id).await.unwrap();
        assert_eq!(economy.school_id, school.id);
        assert_eq!(economy.xp_per_atom, EconomyConfig::DEFAULT_XP_PER_ATOM);
        assert!(economy.store_enabled);
    }

    #[actix_web::test]
    async fn test_duplicate_school_name_rejected() {
        let storage = test_support::storage().await;
        test_support::school(&storage, "Escola Única").await;
        let err = storage
            .create_school(CreateSchoolRequest {
                name: "Escola Única".to_string(),
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
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[actix_web::test]
    async fn test_update_and_search_schools() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Norte").await;
        test_support::school(&storage, "Colégio Sul").await;

        let updated = storage
            .update_school(
                school.id,
                UpdateSchoolRequest {
                    city: Some("Recife".to_string()),
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.city.as_deref(), Some("Recife"));
        assert!(!updated.active);

        let found = storage
            .list_schools(SchoolListQuery {
                page: 1,
                size: 10,
                search: Some("recife".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(found.pagination.total, 1);
        assert_eq!(found.items[0].id, school.id);
    }

    #[actix_web::test]
    async fn test_delete_school_removes_member_profiles() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Fechada").await;
        let student = test_support::student(&storage, school.id, "0001").await;

        let removed = storage.delete_school(school.id).await.unwrap().unwrap();
        assert_eq!(removed, vec![student.profile_id]);
        assert!(storage.get_school_by_id(school.id).await.unwrap().is_none());
        assert!(
            storage
                .get_profile_by_id(student.profile_id)
                .await
                .unwrap()
                .is_none()
        );
        assert!(storage.delete_school(school.id).await.unwrap().is_none());
    }
}
