//! 任课关系存储操作

use std::collections::HashMap;

use super::{SeaOrmStorage, db_err};
use crate::entity::prelude::{Classes, Subjects, TeacherClassSubjects, Teachers};
use crate::entity::{classes, subjects, teacher_class_subjects, teachers};
use crate::errors::Result;
use crate::models::assignments::{
    entities::{Assignment, AssignmentDetail},
    requests::CreateAssignmentRequest,
};
use crate::storage::AssignmentStorage;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

#[async_trait::async_trait]
impl AssignmentStorage for SeaOrmStorage {
    async fn create_assignment(
        &self,
        school_id: i64,
        req: CreateAssignmentRequest,
    ) -> Result<Assignment> {
        let model = teacher_class_subjects::ActiveModel {
            school_id: Set(school_id),
            teacher_id: Set(req.teacher_id),
            class_id: Set(req.class_id),
            subject_id: Set(req.subject_id),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err("创建任课关系失败"))?;

        Ok(model.into_assignment())
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        let result = TeacherClassSubjects::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询任课关系失败"))?;
        Ok(result.map(|m| m.into_assignment()))
    }

    async fn list_assignments(
        &self,
        school_id: Option<i64>,
        teacher_id: Option<i64>,
        class_id: Option<i64>,
    ) -> Result<Vec<AssignmentDetail>> {
        let mut select = TeacherClassSubjects::find();
        if let Some(school_id) = school_id {
            select = select.filter(teacher_class_subjects::Column::SchoolId.eq(school_id));
        }
        if let Some(teacher_id) = teacher_id {
            select = select.filter(teacher_class_subjects::Column::TeacherId.eq(teacher_id));
        }
        if let Some(class_id) = class_id {
            select = select.filter(teacher_class_subjects::Column::ClassId.eq(class_id));
        }

        let rows = select
            .order_by_asc(teacher_class_subjects::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("查询任课关系列表失败"))?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        // 批量取名称
        let teacher_ids: Vec<i64> = rows.iter().map(|r| r.teacher_id).collect();
        let class_ids: Vec<i64> = rows.iter().map(|r| r.class_id).collect();
        let subject_ids: Vec<i64> = rows.iter().map(|r| r.subject_id).collect();

        let teacher_names: HashMap<i64, String> = Teachers::find()
            .select_only()
            .column(teachers::Column::Id)
            .column(teachers::Column::FullName)
            .filter(teachers::Column::Id.is_in(teacher_ids))
            .into_tuple::<(i64, String)>()
            .all(&self.db)
            .await
            .map_err(db_err("查询教师姓名失败"))?
            .into_iter()
            .collect();
        let class_names: HashMap<i64, String> = Classes::find()
            .select_only()
            .column(classes::Column::Id)
            .column(classes::Column::Name)
            .filter(classes::Column::Id.is_in(class_ids))
            .into_tuple::<(i64, String)>()
            .all(&self.db)
            .await
            .map_err(db_err("查询班级名称失败"))?
            .into_iter()
            .collect();
        let subject_names: HashMap<i64, String> = Subjects::find()
            .select_only()
            .column(subjects::Column::Id)
            .column(subjects::Column::Name)
            .filter(subjects::Column::Id.is_in(subject_ids))
            .into_tuple::<(i64, String)>()
            .all(&self.db)
            .await
            .map_err(db_err("查询科目名称失败"))?
            .into_iter()
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| AssignmentDetail {
                teacher_name: teacher_names.get(&row.teacher_id).cloned().unwrap_or_default(),
                class_name: class_names.get(&row.class_id).cloned().unwrap_or_default(),
                subject_name: subject_names.get(&row.subject_id).cloned().unwrap_or_default(),
                assignment: row.into_assignment(),
            })
            .collect())
    }

    async fn delete_assignment(&self, id: i64) -> Result<bool> {
        let result = TeacherClassSubjects::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除任课关系失败"))?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use super::*;
    use crate::models::{
        catalog::{
            entities::ClassShift,
            requests::{CreateClassRequest, CreateSubjectRequest},
        },
        people::{entities::NewLogin, requests::CreateTeacherRequest},
    };
    use crate::storage::{CatalogStorage, PeopleStorage};

    #[actix_web::test]
    async fn test_assignment_detail_and_duplicate() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Vínculos").await;
        let teacher = storage
            .create_teacher(
                NewLogin {
                    email: "joao@escola.test".to_string(),
                    password_hash: "hash".to_string(),
                    full_name: "João".to_string(),
                    school_id: school.id,
                },
                CreateTeacherRequest {
                    school_id: Some(school.id),
                    full_name: "João".to_string(),
                    email: "joao@escola.test".to_string(),
                    password: None,
                    phone: None,
                    specialization: None,
                },
            )
            .await
            .unwrap();
        let class = storage
            .create_class(
                school.id,
                CreateClassRequest {
                    school_id: None,
                    course_id: None,
                    name: "3B".to_string(),
                    school_year: 2025,
                    shift: ClassShift::Afternoon,
                },
            )
            .await
            .unwrap();
        let subject = storage
            .create_subject(
                school.id,
                CreateSubjectRequest {
                    school_id: None,
                    course_id: None,
                    name: "História".to_string(),
                    workload_hours: None,
                },
            )
            .await
            .unwrap();

        let req = CreateAssignmentRequest {
            teacher_id: teacher.id,
            class_id: class.id,
            subject_id: subject.id,
        };
        let created = storage
            .create_assignment(school.id, req.clone())
            .await
            .unwrap();
        let err = storage.create_assignment(school.id, req).await.unwrap_err();
        assert!(err.is_unique_violation());

        let listed = storage
            .list_assignments(Some(school.id), Some(teacher.id), None)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].assignment.id, created.id);
        assert_eq!(listed[0].teacher_name, "João");
        assert_eq!(listed[0].class_name, "3B");
        assert_eq!(listed[0].subject_name, "História");

        assert!(storage.delete_assignment(created.id).await.unwrap());
        assert!(
            storage
                .list_assignments(Some(school.id), None, None)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
