use crate::models::profiles::entities::Profile;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/auth.ts")]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub profile: Profile,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/auth.ts")]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/auth.ts")]
pub struct MeResponse {
    pub profile: Profile,
    /// 解析出的所属学校（管理员为空）
    pub school_id: Option<i64>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/auth.ts")]
pub struct TokenVerificationResponse {
    pub is_valid: bool,
}

/// 忘记密码响应，`reset_token` 仅在开发环境返回
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/auth.ts")]
pub struct ForgotPasswordResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
}
