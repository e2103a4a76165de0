use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "portal/avatar.ts")]
pub struct CreateAvatarRequest {
    pub name: String,
    pub image_url: String,
    #[serde(default)]
    pub required_xp: i64,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "portal/avatar.ts")]
pub struct UpdateAvatarRequest {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub required_xp: Option<i64>,
    pub active: Option<bool>,
}
