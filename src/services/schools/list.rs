use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SchoolService;
use crate::models::{
    ApiResponse,
    schools::requests::{SchoolListParams, SchoolListQuery},
};
use crate::services::internal_error;

pub async fn list_schools(
    service: &SchoolService,
    query: SchoolListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.list_schools(SchoolListQuery::from(query)).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "School list retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve school list", e)),
    }
}
