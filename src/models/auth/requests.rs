use serde::Deserialize;
use ts_rs::TS;

// 登录请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "portal/auth.ts")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// 是否记住我
    #[serde(default)]
    pub remember_me: bool,
}

// 当前账户自助更新
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "portal/auth.ts")]
pub struct UpdateOwnProfileRequest {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub password: Option<String>,
    /// 修改密码时必填
    pub current_password: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "portal/auth.ts")]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "portal/auth.ts")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}
