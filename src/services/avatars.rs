//! 头像目录与学生装备

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::info;

use crate::models::{
    ApiResponse, ErrorCode,
    avatars::requests::{CreateAvatarRequest, UpdateAvatarRequest},
    profiles::entities::UserType,
};
use crate::services::{
    current_profile, error_response, internal_error, people::own_student, rejection_response,
    write_failure,
};
use crate::utils::validate::validate_name;

define_service!(AvatarService);

const AVATAR_EXISTS: &str = "An avatar with this name already exists";

fn avatar_not_found() -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::AvatarNotFound,
        "Avatar not found",
    )
}

fn check_avatar_fields(
    name: Option<&String>,
    image_url: Option<&String>,
    required_xp: Option<i64>,
) -> Option<HttpResponse> {
    let msg = if let Some(Err(msg)) = name.map(|n| validate_name(n)) {
        msg
    } else if image_url.is_some_and(|u| u.trim().is_empty()) {
        "image_url is required"
    } else if required_xp.is_some_and(|xp| xp < 0) {
        "required_xp cannot be negative"
    } else {
        return None;
    };
    Some(error_response(
        StatusCode::BAD_REQUEST,
        ErrorCode::BadRequest,
        msg,
    ))
}

impl AvatarService {
    /// 未启用的头像只对管理员可见
    pub async fn list_avatars(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let storage = self.get_storage(request)?;

        let include_inactive = profile.user_type == UserType::Admin;
        match storage.list_avatars(include_inactive).await {
            Ok(avatars) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                avatars,
                "Avatars retrieved successfully",
            ))),
            Err(e) => Ok(internal_error("Failed to retrieve avatars", e)),
        }
    }

    pub async fn create_avatar(
        &self,
        avatar: CreateAvatarRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        if let Some(resp) = check_avatar_fields(
            Some(&avatar.name),
            Some(&avatar.image_url),
            Some(avatar.required_xp),
        ) {
            return Ok(resp);
        }

        let storage = self.get_storage(request)?;
        match storage.create_avatar(avatar).await {
            Ok(avatar) => {
                Ok(HttpResponse::Created().json(ApiResponse::success(avatar, "Avatar created")))
            }
            Err(e) => Ok(write_failure(
                "Avatar creation failed",
                e,
                ErrorCode::AvatarAlreadyExists,
                AVATAR_EXISTS,
            )),
        }
    }

    pub async fn update_avatar(
        &self,
        id: i64,
        update: UpdateAvatarRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        if let Some(resp) = check_avatar_fields(
            update.name.as_ref(),
            update.image_url.as_ref(),
            update.required_xp,
        ) {
            return Ok(resp);
        }

        let storage = self.get_storage(request)?;
        match storage.update_avatar(id, update).await {
            Ok(Some(avatar)) => {
                Ok(HttpResponse::Ok().json(ApiResponse::success(avatar, "Avatar updated")))
            }
            Ok(None) => Ok(avatar_not_found()),
            Err(e) => Ok(write_failure(
                "Avatar update failed",
                e,
                ErrorCode::AvatarAlreadyExists,
                AVATAR_EXISTS,
            )),
        }
    }

    pub async fn delete_avatar(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        match storage.delete_avatar(id).await {
            Ok(true) => {
                Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("Avatar deleted")))
            }
            Ok(false) => Ok(avatar_not_found()),
            Err(e) => Ok(internal_error("Avatar deletion failed", e)),
        }
    }

    /// 学生装备已解锁的头像
    pub async fn equip_avatar(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let storage = self.get_storage(request)?;
        let student = own_student(&*storage, &profile).await?;

        match storage.equip_avatar(student.id, id).await {
            Ok(Ok(student)) => {
                info!("Student {} equipped avatar {}", student.id, id);
                Ok(HttpResponse::Ok().json(ApiResponse::success(student, "Avatar equipped")))
            }
            Ok(Err(rejection)) => Ok(rejection_response(rejection)),
            Err(e) => Ok(internal_error("Avatar equip failed", e)),
        }
    }
}
