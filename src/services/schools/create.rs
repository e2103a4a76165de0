use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::info;

use super::SchoolService;
use crate::models::{ApiResponse, ErrorCode, schools::requests::CreateSchoolRequest};
use crate::services::{cache_from, error_response, tenancy::forget_school_of, write_failure};
use crate::utils::validate::{validate_cnpj, validate_name};

pub async fn create_school(
    service: &SchoolService,
    school_data: CreateSchoolRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_name(&school_data.name) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            msg,
        ));
    }
    if let Some(ref cnpj) = school_data.cnpj
        && let Err(msg) = validate_cnpj(cnpj)
    {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            msg,
        ));
    }

    let storage = service.get_storage(request)?;
    match storage.create_school(school_data).await {
        Ok(school) => {
            forget_school_of(
                cache_from(request)?.as_ref(),
                &[school.director_id, school.owner_id],
            )
            .await;
            info!("School {} created: {}", school.id, school.name);
            Ok(HttpResponse::Created().json(ApiResponse::success(school, "School created")))
        }
        Err(e) => Ok(write_failure(
            "School creation failed",
            e,
            ErrorCode::SchoolAlreadyExists,
            "A school with this name or CNPJ already exists",
        )),
    }
}
