use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::define_wire_enum;

define_wire_enum! {
    /// 账户类型
    #[ts(export, export_to = "portal/profile.ts")]
    pub enum UserType {
        Admin => "admin",
        School => "escola",
        Teacher => "professor",
        Guardian => "responsavel",
        Student => "aluno",
    }
}

impl UserType {
    pub fn admin_roles() -> &'static [UserType] {
        &[UserType::Admin]
    }
    /// 可管理学校数据的角色
    pub fn manager_roles() -> &'static [UserType] {
        &[UserType::Admin, UserType::School]
    }
    /// 教职人员
    pub fn staff_roles() -> &'static [UserType] {
        &[UserType::Admin, UserType::School, UserType::Teacher]
    }
    pub fn student_roles() -> &'static [UserType] {
        &[UserType::Student]
    }
    pub fn guardian_roles() -> &'static [UserType] {
        &[UserType::Guardian]
    }
    pub fn is_staff(&self) -> bool {
        Self::staff_roles().contains(self)
    }
}

define_wire_enum! {
    /// 账户状态
    #[ts(export, export_to = "portal/profile.ts")]
    pub enum ProfileStatus {
        Active => "active",
        Inactive => "inactive",
        Suspended => "suspended",
    }
}

// 账户实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/profile.ts")]
pub struct Profile {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    #[ts(skip)]
    pub password_hash: String,
    pub full_name: String,
    pub user_type: UserType,
    pub status: ProfileStatus,
    pub school_id: Option<i64>,
    pub avatar_url: Option<String>,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Profile {
    pub fn is_active(&self) -> bool {
        self.status == ProfileStatus::Active
    }

    // 生成 token 对（access + refresh）
    pub fn generate_token_pair(
        &self,
        refresh_token_expiry: Option<chrono::TimeDelta>,
    ) -> Result<crate::utils::jwt::TokenPair, String> {
        crate::utils::jwt::JwtUtils::generate_token_pair(
            self.id,
            self.user_type.as_str(),
            refresh_token_expiry,
        )
        .map_err(|e| format!("生成 token 对失败: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_type_wire_names() {
        assert_eq!(UserType::School.as_str(), "escola");
        assert_eq!("responsavel".parse::<UserType>(), Ok(UserType::Guardian));
        assert!("teacher".parse::<UserType>().is_err());
        assert_eq!(
            serde_json::to_string(&UserType::Student).unwrap(),
            "\"aluno\""
        );
        let parsed: UserType = serde_json::from_str("\"professor\"").unwrap();
        assert_eq!(parsed, UserType::Teacher);
    }

    #[test]
    fn test_staff_roles() {
        assert!(UserType::Teacher.is_staff());
        assert!(!UserType::Guardian.is_staff());
        assert!(!UserType::Student.is_staff());
    }
}
