use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::{SchoolService, ensure_own_school, school_not_found};
use crate::models::{
    ApiResponse, ErrorCode, profiles::entities::UserType, schools::requests::UpdateSchoolRequest,
};
use crate::services::{
    cache_from, current_profile, error_response, internal_error, tenancy::forget_school_of,
    write_failure,
};
use crate::utils::validate::{validate_cnpj, validate_name};

pub async fn update_school(
    service: &SchoolService,
    school_id: i64,
    update_data: UpdateSchoolRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let profile = current_profile(request)?;
    if let Some(denied) = ensure_own_school(request, &profile, school_id).await? {
        return Ok(denied);
    }
    if profile.user_type != UserType::Admin && update_data.touches_admin_fields() {
        return Ok(error_response(
            StatusCode::FORBIDDEN,
            ErrorCode::Forbidden,
            "Only administrators may change director, owner or active",
        ));
    }

    if let Some(ref name) = update_data.name
        && let Err(msg) = validate_name(name)
    {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            msg,
        ));
    }
    if let Some(ref cnpj) = update_data.cnpj
        && let Err(msg) = validate_cnpj(cnpj)
    {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            msg,
        ));
    }

    let storage = service.get_storage(request)?;
    let before = match storage.get_school_by_id(school_id).await {
        Ok(Some(school)) => school,
        Ok(None) => return Ok(school_not_found()),
        Err(e) => return Ok(internal_error("Failed to retrieve school", e)),
    };

    match storage.update_school(school_id, update_data).await {
        Ok(Some(school)) => {
            forget_school_of(
                cache_from(request)?.as_ref(),
                &[
                    before.director_id,
                    before.owner_id,
                    school.director_id,
                    school.owner_id,
                ],
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(school, "School updated")))
        }
        Ok(None) => Ok(school_not_found()),
        Err(e) => Ok(write_failure(
            "School update failed",
            e,
            ErrorCode::SchoolAlreadyExists,
            "A school with this name or CNPJ already exists",
        )),
    }
}
