use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{SchoolService, ensure_own_school, school_not_found};
use crate::models::ApiResponse;
use crate::services::{current_profile, internal_error, tenancy, tenancy::ScopeDenied};

pub async fn get_school(
    service: &SchoolService,
    school_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let profile = current_profile(request)?;
    if let Some(denied) = ensure_own_school(request, &profile, school_id).await? {
        return Ok(denied);
    }

    let storage = service.get_storage(request)?;
    match storage.get_school_by_id(school_id).await {
        Ok(Some(school)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            school,
            "School retrieved successfully",
        ))),
        Ok(None) => Ok(school_not_found()),
        Err(e) => Ok(internal_error("Failed to retrieve school", e)),
    }
}

/// 调用者解析出的学校
pub async fn current_school(
    service: &SchoolService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let profile = current_profile(request)?;
    let Some(school_id) = tenancy::caller_school(request, &profile).await? else {
        return Err(ScopeDenied::NoSchool.into_error());
    };

    let storage = service.get_storage(request)?;
    match storage.get_school_by_id(school_id).await {
        Ok(Some(school)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            school,
            "School retrieved successfully",
        ))),
        Ok(None) => Ok(school_not_found()),
        Err(e) => Ok(internal_error("Failed to retrieve school", e)),
    }
}
