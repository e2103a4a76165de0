use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ProfileService;
use crate::models::{
    ApiResponse,
    profiles::requests::{ProfileListParams, ProfileListQuery},
};
use crate::services::internal_error;

pub async fn list_profiles(
    service: &ProfileService,
    query: ProfileListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.list_profiles(ProfileListQuery::from(query)).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Profile list retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve profile list", e)),
    }
}
