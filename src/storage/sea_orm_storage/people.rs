//! 人员存储操作：教师、学生、监护人
//!
//! 每个人员都对应一个登录账户。创建时账户与人员行在同一事务内写入，
//! 删除人员即删除账户，人员行由外键级联删除。

use super::{SeaOrmStorage, db_err};
use crate::entity::prelude::{Guardians, Profiles, Students, Teachers};
use crate::entity::{guardians, profiles, students, teachers};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    people::{
        entities::{Guardian, NewLogin, Student, Teacher},
        requests::{
            CreateGuardianRequest, CreateStudentRequest, CreateTeacherRequest, PeopleListQuery,
            UpdateGuardianRequest, UpdateStudentRequest, UpdateTeacherRequest,
        },
        responses::{GuardianListResponse, StudentListResponse, TeacherListResponse},
    },
    profiles::{
        entities::{ProfileStatus, UserType},
        requests::NewProfile,
    },
};
use crate::storage::PeopleStorage;
use crate::utils::like_contains;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

/// 写入人员的登录账户
async fn insert_login<C: ConnectionTrait>(
    db: &C,
    login: NewLogin,
    user_type: UserType,
    now: i64,
) -> Result<profiles::Model> {
    NewProfile {
        email: login.email,
        password_hash: login.password_hash,
        full_name: login.full_name,
        user_type,
        status: ProfileStatus::Active,
        school_id: Some(login.school_id),
        avatar_url: None,
    }
    .into_active(now)
    .insert(db)
    .await
    .map_err(db_err("创建登录账户失败"))
}

/// 人员姓名或邮箱变更时同步到登录账户
async fn sync_login<C: ConnectionTrait>(
    db: &C,
    profile_id: i64,
    email: Option<&String>,
    full_name: Option<&String>,
    now: i64,
) -> Result<()> {
    if email.is_none() && full_name.is_none() {
        return Ok(());
    }
    let Some(profile) = Profiles::find_by_id(profile_id)
        .one(db)
        .await
        .map_err(db_err("查询登录账户失败"))?
    else {
        return Ok(());
    };

    let mut model = profile.into_active_model();
    if let Some(email) = email {
        model.email = Set(email.clone());
    }
    if let Some(full_name) = full_name {
        model.full_name = Set(full_name.clone());
    }
    model.updated_at = Set(now);
    model
        .update(db)
        .await
        .map_err(db_err("同步登录账户失败"))?;
    Ok(())
}

impl SeaOrmStorage {
    /// 删除人员的登录账户；账户不存在时返回 false
    async fn delete_login(&self, profile_id: Option<i64>) -> Result<bool> {
        let Some(profile_id) = profile_id else {
            return Ok(false);
        };
        let result = Profiles::delete_by_id(profile_id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除登录账户失败"))?;
        Ok(result.rows_affected > 0)
    }
}

#[async_trait::async_trait]
impl PeopleStorage for SeaOrmStorage {
    // ==================== 教师 ====================

    async fn create_teacher(&self, login: NewLogin, req: CreateTeacherRequest) -> Result<Teacher> {
        let now = chrono::Utc::now().timestamp();
        let school_id = login.school_id;
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let profile = insert_login(&txn, login, UserType::Teacher, now).await?;
        let teacher = teachers::ActiveModel {
            school_id: Set(school_id),
            profile_id: Set(profile.id),
            full_name: Set(req.full_name),
            email: Set(req.email),
            phone: Set(req.phone),
            specialization: Set(req.specialization),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("创建教师失败"))?;

        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(teacher.into_teacher())
    }

    async fn get_teacher_by_id(&self, id: i64) -> Result<Option<Teacher>> {
        let result = Teachers::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询教师失败"))?;
        Ok(result.map(|m| m.into_teacher()))
    }

    async fn get_teacher_by_profile_id(&self, profile_id: i64) -> Result<Option<Teacher>> {
        let result = Teachers::find()
            .filter(teachers::Column::ProfileId.eq(profile_id))
            .one(&self.db)
            .await
            .map_err(db_err("查询教师失败"))?;
        Ok(result.map(|m| m.into_teacher()))
    }

    async fn list_teachers(&self, query: PeopleListQuery) -> Result<TeacherListResponse> {
        let mut select = Teachers::find();
        if let Some(school_id) = query.school_id {
            select = select.filter(teachers::Column::SchoolId.eq(school_id));
        }
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(
                Condition::any()
                    .add(teachers::Column::FullName.like(like_contains(search)))
                    .add(teachers::Column::Email.like(like_contains(search))),
            );
        }

        let paginator = select
            .order_by_asc(teachers::Column::FullName)
            .paginate(&self.db, query.size);
        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(db_err("查询教师总数失败"))?;
        let items = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(db_err("查询教师列表失败"))?;

        Ok(TeacherListResponse {
            items: items.into_iter().map(|m| m.into_teacher()).collect(),
            pagination: PaginationInfo::new(
                query.page,
                query.size,
                counts.number_of_items,
                counts.number_of_pages,
            ),
        })
    }

    async fn update_teacher(
        &self,
        id: i64,
        update: UpdateTeacherRequest,
    ) -> Result<Option<Teacher>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let Some(existing) = Teachers::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err("查询教师失败"))?
        else {
            return Ok(None);
        };

        sync_login(
            &txn,
            existing.profile_id,
            update.email.as_ref(),
            update.full_name.as_ref(),
            now,
        )
        .await?;

        let mut model = existing.into_active_model();
        if let Some(full_name) = update.full_name {
            model.full_name = Set(full_name);
        }
        if let Some(email) = update.email {
            model.email = Set(email);
        }
        if let Some(phone) = update.phone {
            model.phone = Set(Some(phone));
        }
        if let Some(specialization) = update.specialization {
            model.specialization = Set(Some(specialization));
        }
        model.updated_at = Set(now);

        let updated = model.update(&txn).await.map_err(db_err("更新教师失败"))?;
        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(Some(updated.into_teacher()))
    }

    async fn delete_teacher(&self, id: i64) -> Result<bool> {
        let profile_id = self.get_teacher_by_id(id).await?.map(|t| t.profile_id);
        self.delete_login(profile_id).await
    }

    // ==================== 学生 ====================

    async fn create_student(&self, login: NewLogin, req: CreateStudentRequest) -> Result<Student> {
        let now = chrono::Utc::now().timestamp();
        let school_id = login.school_id;
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let profile = insert_login(&txn, login, UserType::Student, now).await?;
        let student = students::ActiveModel {
            school_id: Set(school_id),
            profile_id: Set(profile.id),
            class_id: Set(req.class_id),
            guardian_id: Set(req.guardian_id),
            full_name: Set(req.full_name),
            registration: Set(req.registration),
            birth_date: Set(req.birth_date),
            xp: Set(0),
            atoms: Set(0),
            avatar_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("创建学生失败"))?;

        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(student.into_student())
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>> {
        let result = Students::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询学生失败"))?;
        Ok(result.map(|m| m.into_student()))
    }

    async fn get_student_by_profile_id(&self, profile_id: i64) -> Result<Option<Student>> {
        let result = Students::find()
            .filter(students::Column::ProfileId.eq(profile_id))
            .one(&self.db)
            .await
            .map_err(db_err("查询学生失败"))?;
        Ok(result.map(|m| m.into_student()))
    }

    async fn list_students(&self, query: PeopleListQuery) -> Result<StudentListResponse> {
        let mut select = Students::find();
        if let Some(school_id) = query.school_id {
            select = select.filter(students::Column::SchoolId.eq(school_id));
        }
        if let Some(class_id) = query.class_id {
            select = select.filter(students::Column::ClassId.eq(class_id));
        }
        if let Some(guardian_id) = query.guardian_id {
            select = select.filter(students::Column::GuardianId.eq(guardian_id));
        }
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(
                Condition::any()
                    .add(students::Column::FullName.like(like_contains(search)))
                    .add(students::Column::Registration.like(like_contains(search))),
            );
        }

        let paginator = select
            .order_by_asc(students::Column::FullName)
            .paginate(&self.db, query.size);
        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(db_err("查询学生总数失败"))?;
        let items = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(db_err("查询学生列表失败"))?;

        Ok(StudentListResponse {
            items: items.into_iter().map(|m| m.into_student()).collect(),
            pagination: PaginationInfo::new(
                query.page,
                query.size,
                counts.number_of_items,
                counts.number_of_pages,
            ),
        })
    }

    async fn list_students_by_guardian(&self, guardian_id: i64) -> Result<Vec<Student>> {
        let items = Students::find()
            .filter(students::Column::GuardianId.eq(guardian_id))
            .order_by_asc(students::Column::FullName)
            .all(&self.db)
            .await
            .map_err(db_err("查询监护学生失败"))?;
        Ok(items.into_iter().map(|m| m.into_student()).collect())
    }

    async fn update_student(
        &self,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let Some(existing) = Students::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err("查询学生失败"))?
        else {
            return Ok(None);
        };

        sync_login(
            &txn,
            existing.profile_id,
            update.email.as_ref(),
            update.full_name.as_ref(),
            now,
        )
        .await?;

        let mut model = existing.into_active_model();
        if let Some(full_name) = update.full_name {
            model.full_name = Set(full_name);
        }
        if let Some(registration) = update.registration {
            model.registration = Set(registration);
        }
        if let Some(birth_date) = update.birth_date {
            model.birth_date = Set(Some(birth_date));
        }
        if let Some(class_id) = update.class_id {
            model.class_id = Set(Some(class_id));
        }
        if let Some(guardian_id) = update.guardian_id {
            model.guardian_id = Set(Some(guardian_id));
        }
        model.updated_at = Set(now);

        let updated = model.update(&txn).await.map_err(db_err("更新学生失败"))?;
        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(Some(updated.into_student()))
    }

    async fn delete_student(&self, id: i64) -> Result<bool> {
        let profile_id = self.get_student_by_id(id).await?.map(|s| s.profile_id);
        self.delete_login(profile_id).await
    }

    // ==================== 监护人 ====================

    async fn create_guardian(
        &self,
        login: NewLogin,
        req: CreateGuardianRequest,
    ) -> Result<Guardian> {
        let now = chrono::Utc::now().timestamp();
        let school_id = login.school_id;
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let profile = insert_login(&txn, login, UserType::Guardian, now).await?;
        let guardian = guardians::ActiveModel {
            school_id: Set(school_id),
            profile_id: Set(profile.id),
            full_name: Set(req.full_name),
            email: Set(req.email),
            phone: Set(req.phone),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("创建监护人失败"))?;

        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(guardian.into_guardian())
    }

    async fn get_guardian_by_id(&self, id: i64) -> Result<Option<Guardian>> {
        let result = Guardians::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询监护人失败"))?;
        Ok(result.map(|m| m.into_guardian()))
    }

    async fn get_guardian_by_profile_id(&self, profile_id: i64) -> Result<Option<Guardian>> {
        let result = Guardians::find()
            .filter(guardians::Column::ProfileId.eq(profile_id))
            .one(&self.db)
            .await
            .map_err(db_err("查询监护人失败"))?;
        Ok(result.map(|m| m.into_guardian()))
    }

    async fn list_guardians(&self, query: PeopleListQuery) -> Result<GuardianListResponse> {
        let mut select = Guardians::find();
        if let Some(school_id) = query.school_id {
            select = select.filter(guardians::Column::SchoolId.eq(school_id));
        }
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(
                Condition::any()
                    .add(guardians::Column::FullName.like(like_contains(search)))
                    .add(guardians::Column::Email.like(like_contains(search))),
            );
        }

        let paginator = select
            .order_by_asc(guardians::Column::FullName)
            .paginate(&self.db, query.size);
        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(db_err("查询监护人总数失败"))?;
        let items = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(db_err("查询监护人列表失败"))?;

        Ok(GuardianListResponse {
            items: items.into_iter().map(|m| m.into_guardian()).collect(),
            pagination: PaginationInfo::new(
                query.page,
                query.size,
                counts.number_of_items,
                counts.number_of_pages,
            ),
        })
    }

    async fn update_guardian(
        &self,
        id: i64,
        update: UpdateGuardianRequest,
    ) -> Result<Option<Guardian>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let Some(existing) = Guardians::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err("查询监护人失败"))?
        else {
            return Ok(None);
        };

        sync_login(
            &txn,
            existing.profile_id,
            update.email.as_ref(),
            update.full_name.as_ref(),
            now,
        )
        .await?;

        let mut model = existing.into_active_model();
        if let Some(full_name) = update.full_name {
            model.full_name = Set(full_name);
        }
        if let Some(email) = update.email {
            model.email = Set(email);
        }
        if let Some(phone) = update.phone {
            model.phone = Set(Some(phone));
        }
        model.updated_at = Set(now);

        let updated = model
            .update(&txn)
            .await
            .map_err(db_err("更新监护人失败"))?;
        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(Some(updated.into_guardian()))
    }

    async fn delete_guardian(&self, id: i64) -> Result<bool> {
        let profile_id = self.get_guardian_by_id(id).await?.map(|g| g.profile_id);
        self.delete_login(profile_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use super::*;
    use crate::storage::ProfileStorage;

    fn login(email: &str, school_id: i64) -> NewLogin {
        NewLogin {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            full_name: "Pessoa".to_string(),
            school_id,
        }
    }

    #[actix_web::test]
    async fn test_create_teacher_produces_profile_and_row() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Pessoas").await;

        let teacher = storage
            .create_teacher(
                login("prof@escola.test", school.id),
                CreateTeacherRequest {
                    school_id: Some(school.id),
                    full_name: "Prof. Ana".to_string(),
                    email: "prof@escola.test".to_string(),
                    password: None,
                    phone: None,
                    specialization: Some("Física".to_string()),
                },
            )
            .await
            .unwrap();

        let profile = storage
            .get_profile_by_id(teacher.profile_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.user_type, UserType::Teacher);
        assert_eq!(profile.school_id, Some(school.id));
        assert_eq!(
            storage
                .get_teacher_by_profile_id(profile.id)
                .await
                .unwrap()
                .map(|t| t.id),
            Some(teacher.id)
        );
    }

    #[actix_web::test]
    async fn test_failed_person_insert_rolls_back_profile() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Rollback").await;
        test_support::student(&storage, school.id, "R-1").await;
        let before = storage.count_profiles().await.unwrap();

        // 同校重复学号导致学生行写入失败
        let err = storage
            .create_student(
                login("outro@aluno.test", school.id),
                CreateStudentRequest {
                    school_id: Some(school.id),
                    full_name: "Outro".to_string(),
                    email: "outro@aluno.test".to_string(),
                    password: None,
                    registration: "R-1".to_string(),
                    birth_date: None,
                    class_id: None,
                    guardian_id: None,
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(storage.count_profiles().await.unwrap(), before);
        assert!(
            storage
                .get_profile_by_email("outro@aluno.test")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[actix_web::test]
    async fn test_guardian_children_and_email_sync() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Família").await;
        let guardian = storage
            .create_guardian(
                login("mae@familia.test", school.id),
                CreateGuardianRequest {
                    school_id: Some(school.id),
                    full_name: "Mãe".to_string(),
                    email: "mae@familia.test".to_string(),
                    password: None,
                    phone: None,
                },
            )
            .await
            .unwrap();
        let child = test_support::student(&storage, school.id, "F-1").await;
        test_support::student(&storage, school.id, "F-2").await;

        let linked = storage
            .update_student(
                child.id,
                UpdateStudentRequest {
                    guardian_id: Some(guardian.id),
                    email: Some("filho@familia.test".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(linked.guardian_id, Some(guardian.id));

        let children = storage.list_students_by_guardian(guardian.id).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, child.id);

        let profile = storage
            .get_profile_by_id(child.profile_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.email, "filho@familia.test");
    }

    #[actix_web::test]
    async fn test_delete_student_removes_profile_and_row() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Saída").await;
        let student = test_support::student(&storage, school.id, "S-9").await;

        assert!(storage.delete_student(student.id).await.unwrap());
        assert!(storage.get_student_by_id(student.id).await.unwrap().is_none());
        assert!(
            storage
                .get_profile_by_id(student.profile_id)
                .await
                .unwrap()
                .is_none()
        );
        assert!(!storage.delete_student(student.id).await.unwrap());
    }
}
