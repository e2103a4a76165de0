//! 面板统计

use super::{SeaOrmStorage, db_err};
use crate::entity::prelude::{
    Classes, Courses, Guardians, Profiles, Schools, StoreOrders, Students, Subjects, Teachers,
};
use crate::entity::{
    classes, courses, guardians, profiles, store_orders, students, subjects, teachers,
};
use crate::errors::Result;
use crate::models::{
    dashboard::responses::{AdminDashboard, LeaderboardEntry, SchoolDashboard, UserTypeCount},
    profiles::entities::UserType,
    store::entities::OrderStatus,
};
use crate::storage::DashboardStorage;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

const TOP_STUDENTS: u64 = 5;

#[async_trait::async_trait]
impl DashboardStorage for SeaOrmStorage {
    async fn admin_overview(&self) -> Result<AdminDashboard> {
        let schools = Schools::find()
            .count(&self.db)
            .await
            .map_err(db_err("统计学校失败"))?;
        let profiles = Profiles::find()
            .count(&self.db)
            .await
            .map_err(db_err("统计账户失败"))?;

        let mut profiles_by_type = Vec::with_capacity(UserType::all().len());
        for user_type in UserType::all() {
            let count = Profiles::find()
                .filter(profiles::Column::UserType.eq(user_type.as_str()))
                .count(&self.db)
                .await
                .map_err(db_err("统计账户失败"))?;
            profiles_by_type.push(UserTypeCount {
                user_type: user_type.to_string(),
                count: count as i64,
            });
        }

        let students = Students::find()
            .count(&self.db)
            .await
            .map_err(db_err("统计学生失败"))?;
        let pending_orders = StoreOrders::find()
            .filter(store_orders::Column::Status.eq(OrderStatus::Pending.as_str()))
            .count(&self.db)
            .await
            .map_err(db_err("统计订单失败"))?;

        Ok(AdminDashboard {
            schools: schools as i64,
            profiles: profiles as i64,
            profiles_by_type,
            students: students as i64,
            pending_orders: pending_orders as i64,
        })
    }

    async fn school_overview(&self, school_id: i64) -> Result<SchoolDashboard> {
        let courses = Courses::find()
            .filter(courses::Column::SchoolId.eq(school_id))
            .count(&self.db)
            .await
            .map_err(db_err("统计课程失败"))?;
        let classes = Classes::find()
            .filter(classes::Column::SchoolId.eq(school_id))
            .count(&self.db)
            .await
            .map_err(db_err("统计班级失败"))?;
        let subjects = Subjects::find()
            .filter(subjects::Column::SchoolId.eq(school_id))
            .count(&self.db)
            .await
            .map_err(db_err("统计科目失败"))?;
        let teachers = Teachers::find()
            .filter(teachers::Column::SchoolId.eq(school_id))
            .count(&self.db)
            .await
            .map_err(db_err("统计教师失败"))?;
        let guardians = Guardians::find()
            .filter(guardians::Column::SchoolId.eq(school_id))
            .count(&self.db)
            .await
            .map_err(db_err("统计监护人失败"))?;
        let pending_orders = StoreOrders::find()
            .filter(store_orders::Column::SchoolId.eq(school_id))
            .filter(store_orders::Column::Status.eq(OrderStatus::Pending.as_str()))
            .count(&self.db)
            .await
            .map_err(db_err("统计订单失败"))?;

        let balances: Vec<i64> = Students::find()
            .select_only()
            .column(students::Column::Atoms)
            .filter(students::Column::SchoolId.eq(school_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err("统计学生失败"))?;

        let top_students = self
            .leaderboard(Some(school_id), None, TOP_STUDENTS)
            .await?;

        Ok(SchoolDashboard {
            school_id,
            courses: courses as i64,
            classes: classes as i64,
            subjects: subjects as i64,
            teachers: teachers as i64,
            students: balances.len() as i64,
            guardians: guardians as i64,
            pending_orders: pending_orders as i64,
            atoms_in_circulation: balances.iter().sum(),
            top_students,
        })
    }

    async fn leaderboard(
        &self,
        school_id: Option<i64>,
        class_id: Option<i64>,
        limit: u64,
    ) -> Result<Vec<LeaderboardEntry>> {
        let mut select = Students::find();
        if let Some(school_id) = school_id {
            select = select.filter(students::Column::SchoolId.eq(school_id));
        }
        if let Some(class_id) = class_id {
            select = select.filter(students::Column::ClassId.eq(class_id));
        }

        let rows = select
            .order_by_desc(students::Column::Xp)
            .order_by_asc(students::Column::FullName)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err("查询排行榜失败"))?;

        Ok(rows
            .into_iter()
            .map(|s| LeaderboardEntry {
                student_id: s.id,
                full_name: s.full_name,
                class_id: s.class_id,
                xp: s.xp,
                atoms: s.atoms,
            })
            .collect())
    }

    async fn count_students_in_classes(&self, class_ids: &[i64]) -> Result<u64> {
        if class_ids.is_empty() {
            return Ok(0);
        }
        Students::find()
            .filter(students::Column::ClassId.is_in(class_ids.iter().copied()))
            .count(&self.db)
            .await
            .map_err(db_err("统计学生失败"))
    }

    async fn count_pending_orders_of_student(&self, student_id: i64) -> Result<u64> {
        StoreOrders::find()
            .filter(store_orders::Column::StudentId.eq(student_id))
            .filter(store_orders::Column::Status.eq(OrderStatus::Pending.as_str()))
            .count(&self.db)
            .await
            .map_err(db_err("统计订单失败"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use super::*;
    use crate::storage::GamificationStorage;

    #[actix_web::test]
    async fn test_school_overview_counts_only_own_school() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Painel").await;
        let other = test_support::school(&storage, "Escola Vizinha").await;
        let a = test_support::student(&storage, school.id, "P-1").await;
        test_support::student(&storage, school.id, "P-2").await;
        test_support::student(&storage, other.id, "P-3").await;
        storage
            .adjust_atoms(a.id, 12, "bonus".to_string(), 1)
            .await
            .unwrap()
            .unwrap();

        let overview = storage.school_overview(school.id).await.unwrap();
        assert_eq!(overview.students, 2);
        assert_eq!(overview.atoms_in_circulation, 12);
        assert_eq!(overview.top_students.len(), 2);
        assert_eq!(overview.pending_orders, 0);
    }

    #[actix_web::test]
    async fn test_admin_overview_groups_profiles_by_type() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Admin").await;
        test_support::student(&storage, school.id, "A-1").await;

        let overview = storage.admin_overview().await.unwrap();
        assert_eq!(overview.schools, 1);
        assert_eq!(overview.students, 1);
        assert_eq!(overview.profiles_by_type.len(), UserType::all().len());
        let students = overview
            .profiles_by_type
            .iter()
            .find(|c| c.user_type == UserType::Student.as_str())
            .unwrap();
        assert_eq!(students.count, 1);
    }

    #[actix_web::test]
    async fn test_count_students_in_no_classes_is_zero() {
        let storage = test_support::storage().await;
        assert_eq!(storage.count_students_in_classes(&[]).await.unwrap(), 0);
    }
}
