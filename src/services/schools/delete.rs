use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::warn;

use super::{SchoolService, school_not_found};
use crate::middlewares::require_jwt::forget_cached_profile;
use crate::models::ApiResponse;
use crate::services::{cache_from, current_profile, internal_error, tenancy::forget_school_of};

/// 删除学校，级联删除其全部数据与成员账户
pub async fn delete_school(
    service: &SchoolService,
    school_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let profile = current_profile(request)?;
    let storage = service.get_storage(request)?;

    let school = match storage.get_school_by_id(school_id).await {
        Ok(Some(school)) => school,
        Ok(None) => return Ok(school_not_found()),
        Err(e) => return Ok(internal_error("Failed to retrieve school", e)),
    };

    match storage.delete_school(school_id).await {
        Ok(Some(removed)) => {
            let cache = cache_from(request)?;
            forget_school_of(cache.as_ref(), &[school.director_id, school.owner_id]).await;
            for profile_id in removed {
                forget_cached_profile(cache.as_ref(), profile_id).await;
                forget_school_of(cache.as_ref(), &[Some(profile_id)]).await;
            }
            warn!(
                "School {} ({}) deleted by profile {}",
                school.id, school.name, profile.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("School deleted")))
        }
        Ok(None) => Ok(school_not_found()),
        Err(e) => Ok(internal_error("School deletion failed", e)),
    }
}
