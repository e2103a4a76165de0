use serde::Serialize;
use ts_rs::TS;

use crate::models::{
    assignments::entities::AssignmentDetail,
    avatars::entities::Avatar,
    catalog::entities::Class,
    gamification::entities::AtomTransaction,
    people::entities::Student,
    store::entities::Order,
};

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "portal/dashboard.ts")]
pub struct UserTypeCount {
    pub user_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "portal/dashboard.ts")]
pub struct AdminDashboard {
    pub schools: i64,
    pub profiles: i64,
    pub profiles_by_type: Vec<UserTypeCount>,
    pub students: i64,
    pub pending_orders: i64,
}

/// 学校排行榜条目
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "portal/dashboard.ts")]
pub struct LeaderboardEntry {
    pub student_id: i64,
    pub full_name: String,
    pub class_id: Option<i64>,
    pub xp: i64,
    pub atoms: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "portal/dashboard.ts")]
pub struct SchoolDashboard {
    pub school_id: i64,
    pub courses: i64,
    pub classes: i64,
    pub subjects: i64,
    pub teachers: i64,
    pub students: i64,
    pub guardians: i64,
    pub pending_orders: i64,
    /// 学生当前持有的原子币总数
    pub atoms_in_circulation: i64,
    pub top_students: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "portal/dashboard.ts")]
pub struct TeacherDashboard {
    pub teacher_id: i64,
    pub assignments: Vec<AssignmentDetail>,
    pub student_count: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "portal/dashboard.ts")]
pub struct StudentDashboard {
    pub student: Student,
    pub avatar: Option<Avatar>,
    pub class: Option<Class>,
    pub recent_transactions: Vec<AtomTransaction>,
    pub recent_orders: Vec<Order>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "portal/dashboard.ts")]
pub struct ChildSummary {
    pub student_id: i64,
    pub full_name: String,
    pub xp: i64,
    pub atoms: i64,
    pub pending_orders: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "portal/dashboard.ts")]
pub struct GuardianDashboard {
    pub guardian_id: i64,
    pub children: Vec<ChildSummary>,
}

/// 按角色返回的面板
#[derive(Debug, Clone, Serialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "portal/dashboard.ts")]
pub enum Dashboard {
    Admin(AdminDashboard),
    School(SchoolDashboard),
    Teacher(TeacherDashboard),
    Student(StudentDashboard),
    Guardian(GuardianDashboard),
}
