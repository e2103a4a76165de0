//! 教学目录存储操作：课程、科目、班级

use super::{SeaOrmStorage, db_err};
use crate::entity::prelude::{Classes, Courses, Subjects};
use crate::entity::{classes, courses, subjects};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    catalog::{
        entities::{Class, Course, Subject},
        requests::{
            CatalogListQuery, CreateClassRequest, CreateCourseRequest, CreateSubjectRequest,
            UpdateClassRequest, UpdateCourseRequest, UpdateSubjectRequest,
        },
        responses::{ClassListResponse, CourseListResponse, SubjectListResponse},
    },
};
use crate::storage::CatalogStorage;
use crate::utils::like_contains;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

#[async_trait::async_trait]
impl CatalogStorage for SeaOrmStorage {
    // ==================== 课程 ====================

    async fn create_course(&self, school_id: i64, req: CreateCourseRequest) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();
        let model = courses::ActiveModel {
            school_id: Set(school_id),
            name: Set(req.name),
            description: Set(req.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err("创建课程失败"))?;

        Ok(model.into_course())
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询课程失败"))?;
        Ok(result.map(|m| m.into_course()))
    }

    async fn list_courses(&self, query: CatalogListQuery) -> Result<CourseListResponse> {
        let mut select = Courses::find();
        if let Some(school_id) = query.school_id {
            select = select.filter(courses::Column::SchoolId.eq(school_id));
        }
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(courses::Column::Name.like(like_contains(search)));
        }

        let paginator = select
            .order_by_asc(courses::Column::Name)
            .paginate(&self.db, query.size);
        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(db_err("查询课程总数失败"))?;
        let items = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(db_err("查询课程列表失败"))?;

        Ok(CourseListResponse {
            items: items.into_iter().map(|m| m.into_course()).collect(),
            pagination: PaginationInfo::new(
                query.page,
                query.size,
                counts.number_of_items,
                counts.number_of_pages,
            ),
        })
    }

    async fn update_course(
        &self,
        id: i64,
        update: UpdateCourseRequest,
    ) -> Result<Option<Course>> {
        let Some(existing) = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询课程失败"))?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_err("更新课程失败"))?;
        Ok(Some(updated.into_course()))
    }

    async fn delete_course(&self, id: i64) -> Result<bool> {
        let result = Courses::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除课程失败"))?;
        Ok(result.rows_affected > 0)
    }

    // ==================== 科目 ====================

    async fn create_subject(&self, school_id: i64, req: CreateSubjectRequest) -> Result<Subject> {
        let now = chrono::Utc::now().timestamp();
        let model = subjects::ActiveModel {
            school_id: Set(school_id),
            course_id: Set(req.course_id),
            name: Set(req.name),
            workload_hours: Set(req.workload_hours),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err("创建科目失败"))?;

        Ok(model.into_subject())
    }

    async fn get_subject_by_id(&self, id: i64) -> Result<Option<Subject>> {
        let result = Subjects::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询科目失败"))?;
        Ok(result.map(|m| m.into_subject()))
    }

    async fn list_subjects(&self, query: CatalogListQuery) -> Result<SubjectListResponse> {
        let mut select = Subjects::find();
        if let Some(school_id) = query.school_id {
            select = select.filter(subjects::Column::SchoolId.eq(school_id));
        }
        if let Some(course_id) = query.course_id {
            select = select.filter(subjects::Column::CourseId.eq(course_id));
        }
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(subjects::Column::Name.like(like_contains(search)));
        }

        let paginator = select
            .order_by_asc(subjects::Column::Name)
            .paginate(&self.db, query.size);
        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(db_err("查询科目总数失败"))?;
        let items = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(db_err("查询科目列表失败"))?;

        Ok(SubjectListResponse {
            items: items.into_iter().map(|m| m.into_subject()).collect(),
            pagination: PaginationInfo::new(
                query.page,
                query.size,
                counts.number_of_items,
                counts.number_of_pages,
            ),
        })
    }

    async fn update_subject(
        &self,
        id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>> {
        let Some(existing) = Subjects::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询科目失败"))?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(course_id) = update.course_id {
            model.course_id = Set(Some(course_id));
        }
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(workload_hours) = update.workload_hours {
            model.workload_hours = Set(Some(workload_hours));
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_err("更新科目失败"))?;
        Ok(Some(updated.into_subject()))
    }

    async fn delete_subject(&self, id: i64) -> Result<bool> {
        let result = Subjects::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除科目失败"))?;
        Ok(result.rows_affected > 0)
    }

    // ==================== 班级 ====================

    async fn create_class(&self, school_id: i64, req: CreateClassRequest) -> Result<Class> {
        let now = chrono::Utc::now().timestamp();
        let model = classes::ActiveModel {
            school_id: Set(school_id),
            course_id: Set(req.course_id),
            name: Set(req.name),
            school_year: Set(req.school_year),
            shift: Set(req.shift.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err("创建班级失败"))?;

        Ok(model.into_class())
    }

    async fn get_class_by_id(&self, id: i64) -> Result<Option<Class>> {
        let result = Classes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询班级失败"))?;
        Ok(result.map(|m| m.into_class()))
    }

    async fn list_classes(&self, query: CatalogListQuery) -> Result<ClassListResponse> {
        let mut select = Classes::find();
        if let Some(school_id) = query.school_id {
            select = select.filter(classes::Column::SchoolId.eq(school_id));
        }
        if let Some(course_id) = query.course_id {
            select = select.filter(classes::Column::CourseId.eq(course_id));
        }
        if let Some(school_year) = query.school_year {
            select = select.filter(classes::Column::SchoolYear.eq(school_year));
        }
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(classes::Column::Name.like(like_contains(search)));
        }

        let paginator = select
            .order_by_desc(classes::Column::SchoolYear)
            .order_by_asc(classes::Column::Name)
            .paginate(&self.db, query.size);
        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(db_err("查询班级总数失败"))?;
        let items = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(db_err("查询班级列表失败"))?;

        Ok(ClassListResponse {
            items: items.into_iter().map(|m| m.into_class()).collect(),
            pagination: PaginationInfo::new(
                query.page,
                query.size,
                counts.number_of_items,
                counts.number_of_pages,
            ),
        })
    }

    async fn update_class(&self, id: i64, update: UpdateClassRequest) -> Result<Option<Class>> {
        let Some(existing) = Classes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询班级失败"))?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(course_id) = update.course_id {
            model.course_id = Set(Some(course_id));
        }
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(school_year) = update.school_year {
            model.school_year = Set(school_year);
        }
        if let Some(shift) = update.shift {
            model.shift = Set(shift.to_string());
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_err("更新班级失败"))?;
        Ok(Some(updated.into_class()))
    }

    async fn delete_class(&self, id: i64) -> Result<bool> {
        let result = Classes::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除班级失败"))?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use super::*;
    use crate::models::catalog::entities::ClassShift;

    fn list_all(school_id: i64) -> CatalogListQuery {
        CatalogListQuery {
            page: 1,
            size: 20,
            school_id: Some(school_id),
            search: None,
            course_id: None,
            school_year: None,
        }
    }

    #[actix_web::test]
    async fn test_course_form_produces_row() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Catálogo").await;

        let course = storage
            .create_course(
                school.id,
                CreateCourseRequest {
                    school_id: None,
                    name: "Ensino Médio".to_string(),
                    description: Some("Três anos".to_string()),
                },
            )
            .await
            .unwrap();

        let fetched = storage.get_course_by_id(course.id).await.unwrap().unwrap();
        assert_eq!(fetched.school_id, school.id);
        assert_eq!(fetched.name, "Ensino Médio");

        // 同校同名课程冲突
        let err = storage
            .create_course(
                school.id,
                CreateCourseRequest {
                    school_id: None,
                    name: "Ensino Médio".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[actix_web::test]
    async fn test_class_filters_and_update() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Turmas").await;
        let other = test_support::school(&storage, "Outra Escola").await;

        for (name, year) in [("1A", 2024), ("1B", 2024), ("2A", 2025)] {
            storage
                .create_class(
                    school.id,
                    CreateClassRequest {
                        school_id: None,
                        course_id: None,
                        name: name.to_string(),
                        school_year: year,
                        shift: ClassShift::Morning,
                    },
                )
                .await
                .unwrap();
        }
        storage
            .create_class(
                other.id,
                CreateClassRequest {
                    school_id: None,
                    course_id: None,
                    name: "1A".to_string(),
                    school_year: 2024,
                    shift: ClassShift::Evening,
                },
            )
            .await
            .unwrap();

        let mut query = list_all(school.id);
        query.school_year = Some(2024);
        let listed = storage.list_classes(query).await.unwrap();
        assert_eq!(listed.pagination.total, 2);
        assert!(listed.items.iter().all(|c| c.school_id == school.id));

        let target = listed.items[0].id;
        let updated = storage
            .update_class(
                target,
                UpdateClassRequest {
                    shift: Some(ClassShift::FullDay),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.shift, ClassShift::FullDay);

        assert!(storage.delete_class(target).await.unwrap());
        assert_eq!(
            storage.list_classes(list_all(school.id)).await.unwrap().pagination.total,
            2
        );
    }

    #[actix_web::test]
    async fn test_deleting_course_detaches_subjects() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Disciplinas").await;
        let course = storage
            .create_course(
                school.id,
                CreateCourseRequest {
                    school_id: None,
                    name: "Fundamental".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();
        let subject = storage
            .create_subject(
                school.id,
                CreateSubjectRequest {
                    school_id: None,
                    course_id: Some(course.id),
                    name: "Matemática".to_string(),
                    workload_hours: Some(80),
                },
            )
            .await
            .unwrap();

        assert!(storage.delete_course(course.id).await.unwrap());
        let subject = storage.get_subject_by_id(subject.id).await.unwrap().unwrap();
        assert_eq!(subject.course_id, None);
        assert_eq!(subject.workload_hours, Some(80));
    }
}
