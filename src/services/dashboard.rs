//! 按角色汇总的首页面板

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use crate::models::{
    ApiResponse, ErrorCode,
    dashboard::responses::{
        ChildSummary, Dashboard, GuardianDashboard, StudentDashboard, TeacherDashboard,
    },
    profiles::entities::{Profile, UserType},
    store::requests::OrderListQuery,
};
use crate::services::{
    current_profile, or_internal,
    people::own_student,
    reject,
    tenancy::{ScopeDenied, caller_school},
};
use crate::storage::Storage;

define_service!(DashboardService);

const RECENT_TRANSACTIONS: u64 = 10;
const RECENT_ORDERS: u64 = 5;

impl DashboardService {
    pub async fn get_dashboard(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let storage = self.get_storage(request)?;

        let dashboard = match profile.user_type {
            UserType::Admin => Dashboard::Admin(or_internal(
                "Failed to build admin dashboard",
                storage.admin_overview().await,
            )?),
            UserType::School => {
                let school_id = caller_school(request, &profile)
                    .await?
                    .ok_or_else(|| ScopeDenied::NoSchool.into_error())?;
                Dashboard::School(or_internal(
                    "Failed to build school dashboard",
                    storage.school_overview(school_id).await,
                )?)
            }
            UserType::Teacher => {
                Dashboard::Teacher(teacher_dashboard(&*storage, &profile).await?)
            }
            UserType::Student => {
                Dashboard::Student(student_dashboard(&*storage, &profile).await?)
            }
            UserType::Guardian => {
                Dashboard::Guardian(guardian_dashboard(&*storage, &profile).await?)
            }
        };

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            dashboard,
            "Dashboard retrieved successfully",
        )))
    }
}

async fn teacher_dashboard(
    storage: &dyn Storage,
    profile: &Profile,
) -> ActixResult<TeacherDashboard> {
    let teacher = or_internal(
        "Failed to retrieve teacher",
        storage.get_teacher_by_profile_id(profile.id).await,
    )?
    .ok_or_else(|| {
        reject(
            StatusCode::NOT_FOUND,
            ErrorCode::TeacherNotFound,
            "Teacher not found",
        )
    })?;

    let assignments = or_internal(
        "Failed to retrieve assignments",
        storage
            .list_assignments(Some(teacher.school_id), Some(teacher.id), None)
            .await,
    )?;
    let mut class_ids: Vec<i64> = assignments.iter().map(|a| a.assignment.class_id).collect();
    class_ids.sort_unstable();
    class_ids.dedup();
    let student_count = or_internal(
        "Failed to count students",
        storage.count_students_in_classes(&class_ids).await,
    )?;

    Ok(TeacherDashboard {
        teacher_id: teacher.id,
        assignments,
        student_count: student_count as i64,
    })
}

async fn student_dashboard(
    storage: &dyn Storage,
    profile: &Profile,
) -> ActixResult<StudentDashboard> {
    let student = own_student(storage, profile).await?;

    let avatar = match student.avatar_id {
        Some(id) => or_internal("Failed to retrieve avatar", storage.get_avatar_by_id(id).await)?,
        None => None,
    };
    let class = match student.class_id {
        Some(id) => or_internal("Failed to retrieve class", storage.get_class_by_id(id).await)?,
        None => None,
    };
    let transactions = or_internal(
        "Failed to retrieve atom transactions",
        storage
            .list_atom_transactions(student.id, 1, RECENT_TRANSACTIONS)
            .await,
    )?;
    let orders = or_internal(
        "Failed to retrieve orders",
        storage
            .list_orders(OrderListQuery {
                page: 1,
                size: RECENT_ORDERS,
                student_ids: Some(vec![student.id]),
                ..Default::default()
            })
            .await,
    )?;

    Ok(StudentDashboard {
        student,
        avatar,
        class,
        recent_transactions: transactions.items,
        recent_orders: orders.items,
    })
}

async fn guardian_dashboard(
    storage: &dyn Storage,
    profile: &Profile,
) -> ActixResult<GuardianDashboard> {
    let guardian = or_internal(
        "Failed to retrieve guardian",
        storage.get_guardian_by_profile_id(profile.id).await,
    )?
    .ok_or_else(|| {
        reject(
            StatusCode::NOT_FOUND,
            ErrorCode::GuardianNotFound,
            "Guardian not found",
        )
    })?;

    let students = or_internal(
        "Failed to retrieve students",
        storage.list_students_by_guardian(guardian.id).await,
    )?;
    let mut children = Vec::with_capacity(students.len());
    for student in students {
        let pending_orders = or_internal(
            "Failed to count pending orders",
            storage.count_pending_orders_of_student(student.id).await,
        )?;
        children.push(ChildSummary {
            student_id: student.id,
            full_name: student.full_name,
            xp: student.xp,
            atoms: student.atoms,
            pending_orders: pending_orders as i64,
        });
    }

    Ok(GuardianDashboard {
        guardian_id: guardian.id,
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profiles::entities::ProfileStatus;
    use crate::storage::sea_orm_storage::test_support;
    use crate::storage::{GamificationStorage, PeopleStorage};

    fn profile_of(id: i64, user_type: UserType) -> Profile {
        Profile {
            id,
            email: "x@escola.test".to_string(),
            password_hash: String::new(),
            full_name: "X".to_string(),
            user_type,
            status: ProfileStatus::Active,
            school_id: None,
            avatar_url: None,
            last_login: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[actix_web::test]
    async fn test_student_dashboard_lists_recent_activity() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Central").await;
        let student = test_support::student(&storage, school.id, "2025-01").await;
        storage
            .adjust_atoms(student.id, 7, "bonus".to_string(), 1)
            .await
            .unwrap()
            .unwrap();

        let profile = profile_of(student.profile_id, UserType::Student);
        let dashboard = student_dashboard(&storage, &profile).await.unwrap();
        assert_eq!(dashboard.student.id, student.id);
        assert_eq!(dashboard.recent_transactions.len(), 1);
        assert!(dashboard.recent_orders.is_empty());
        assert!(dashboard.avatar.is_none());
    }

    #[actix_web::test]
    async fn test_teacher_without_assignments_counts_zero() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Central").await;
        let teacher = storage
            .create_teacher(
                crate::models::people::entities::NewLogin {
                    email: "prof@escola.test".to_string(),
                    password_hash: "hash".to_string(),
                    full_name: "Prof".to_string(),
                    school_id: school.id,
                },
                crate::models::people::requests::CreateTeacherRequest {
                    school_id: Some(school.id),
                    full_name: "Prof".to_string(),
                    email: "prof@escola.test".to_string(),
                    password: None,
                    phone: None,
                    specialization: None,
                },
            )
            .await
            .unwrap();

        let profile = profile_of(teacher.profile_id, UserType::Teacher);
        let dashboard = teacher_dashboard(&storage, &profile).await.unwrap();
        assert_eq!(dashboard.teacher_id, teacher.id);
        assert!(dashboard.assignments.is_empty());
        assert_eq!(dashboard.student_count, 0);
    }
}
