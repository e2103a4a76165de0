//! 学校归属查询

use super::{SeaOrmStorage, db_err};
use crate::entity::prelude::{Guardians, Profiles, Schools, Students, Teachers};
use crate::entity::{guardians, profiles, schools, students, teachers};
use crate::errors::Result;
use crate::models::profiles::entities::UserType;
use crate::storage::SchoolLookup;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

#[async_trait::async_trait]
impl SchoolLookup for SeaOrmStorage {
    async fn school_id_by_director(&self, profile_id: i64) -> Result<Option<i64>> {
        Schools::find()
            .select_only()
            .column(schools::Column::Id)
            .filter(schools::Column::DirectorId.eq(profile_id))
            .order_by_asc(schools::Column::Id)
            .into_tuple::<i64>()
            .one(&self.db)
            .await
            .map_err(db_err("按校长查询学校失败"))
    }

    async fn school_id_by_owner(&self, profile_id: i64) -> Result<Option<i64>> {
        Schools::find()
            .select_only()
            .column(schools::Column::Id)
            .filter(schools::Column::OwnerId.eq(profile_id))
            .order_by_asc(schools::Column::Id)
            .into_tuple::<i64>()
            .one(&self.db)
            .await
            .map_err(db_err("按所有者查询学校失败"))
    }

    async fn direct_school_id(&self, profile_id: i64) -> Result<Option<i64>> {
        let school_id = Profiles::find_by_id(profile_id)
            .select_only()
            .column(profiles::Column::SchoolId)
            .into_tuple::<Option<i64>>()
            .one(&self.db)
            .await
            .map_err(db_err("查询账户学校失败"))?;

        Ok(school_id.flatten())
    }

    async fn school_id_by_role(
        &self,
        user_type: UserType,
        profile_id: i64,
    ) -> Result<Option<i64>> {
        let lookup = match user_type {
            UserType::Teacher => {
                Teachers::find()
                    .select_only()
                    .column(teachers::Column::SchoolId)
                    .filter(teachers::Column::ProfileId.eq(profile_id))
                    .into_tuple::<i64>()
                    .one(&self.db)
                    .await
            }
            UserType::Student => {
                Students::find()
                    .select_only()
                    .column(students::Column::SchoolId)
                    .filter(students::Column::ProfileId.eq(profile_id))
                    .into_tuple::<i64>()
                    .one(&self.db)
                    .await
            }
            UserType::Guardian => {
                Guardians::find()
                    .select_only()
                    .column(guardians::Column::SchoolId)
                    .filter(guardians::Column::ProfileId.eq(profile_id))
                    .into_tuple::<i64>()
                    .one(&self.db)
                    .await
            }
            // 管理员与学校账户没有角色表
            UserType::Admin | UserType::School => return Ok(None),
        };

        lookup.map_err(db_err("按角色表查询学校失败"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use crate::models::profiles::{
        entities::{ProfileStatus, UserType},
        requests::NewProfile,
    };
    use crate::models::schools::requests::UpdateSchoolRequest;
    use crate::storage::{ProfileStorage, SchoolLookup, SchoolStorage};

    #[actix_web::test]
    async fn test_lookups_against_database() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Central").await;
        let student = test_support::student(&storage, school.id, "2024001").await;

        let director = storage
            .create_profile(NewProfile {
                email: "diretor@escola.test".to_string(),
                password_hash: "hash".to_string(),
                full_name: "Diretor".to_string(),
                user_type: UserType::School,
                status: ProfileStatus::Active,
                school_id: None,
                avatar_url: None,
            })
            .await
            .unwrap();
        storage
            .update_school(
                school.id,
                UpdateSchoolRequest {
                    director_id: Some(director.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            storage.school_id_by_director(director.id).await.unwrap(),
            Some(school.id)
        );
        assert_eq!(storage.school_id_by_owner(director.id).await.unwrap(), None);
        assert_eq!(storage.direct_school_id(director.id).await.unwrap(), None);
        assert_eq!(
            storage.direct_school_id(student.profile_id).await.unwrap(),
            Some(school.id)
        );
        assert_eq!(
            storage
                .school_id_by_role(UserType::Student, student.profile_id)
                .await
                .unwrap(),
            Some(school.id)
        );
        assert_eq!(
            storage
                .school_id_by_role(UserType::Teacher, student.profile_id)
                .await
                .unwrap(),
            None
        );
    }
}
