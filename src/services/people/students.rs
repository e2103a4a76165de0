use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::info;

use super::{PeopleService, check_identity_update, draft_login, forget_login};
use crate::models::{
    ApiResponse, ErrorCode,
    people::{
        entities::Student,
        requests::{CreateStudentRequest, PeopleListParams, PeopleListQuery, UpdateStudentRequest},
        responses::CreatedPersonResponse,
    },
    profiles::entities::{Profile, UserType},
};
use crate::services::{
    current_profile, error_response, internal_error, or_internal,
    tenancy::{Access, SchoolScope, request_scope, write_school},
    write_failure,
};
use crate::storage::Storage;
use crate::utils::validate::{validate_birth_date, validate_registration};

const REGISTRATION_EXISTS: &str = "Registration already exists in this school";

fn student_not_found() -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::StudentNotFound,
        "Student not found",
    )
}

fn cross_school(what: &str, id: i64) -> HttpResponse {
    error_response(
        StatusCode::BAD_REQUEST,
        ErrorCode::CrossSchoolReference,
        format!("{what} {id} does not belong to this school"),
    )
}

fn check_student_fields(
    registration: Option<&String>,
    birth_date: Option<&String>,
) -> Option<HttpResponse> {
    let invalid = registration
        .and_then(|r| validate_registration(r).err())
        .or_else(|| birth_date.and_then(|d| validate_birth_date(d).err()));
    invalid.map(|msg| error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, msg))
}

/// 班级和监护人必须与学生同校
async fn check_references(
    storage: &dyn Storage,
    school_id: i64,
    class_id: Option<i64>,
    guardian_id: Option<i64>,
) -> ActixResult<Option<HttpResponse>> {
    if let Some(class_id) = class_id {
        let class = or_internal(
            "Failed to retrieve class",
            storage.get_class_by_id(class_id).await,
        )?;
        if class.is_none_or(|c| c.school_id != school_id) {
            return Ok(Some(cross_school("Class", class_id)));
        }
    }
    if let Some(guardian_id) = guardian_id {
        let guardian = or_internal(
            "Failed to retrieve guardian",
            storage.get_guardian_by_id(guardian_id).await,
        )?;
        if guardian.is_none_or(|g| g.school_id != school_id) {
            return Ok(Some(cross_school("Guardian", guardian_id)));
        }
    }
    Ok(None)
}

async fn student_in_scope(
    storage: &dyn Storage,
    id: i64,
    scope: SchoolScope,
) -> ActixResult<Option<Student>> {
    let student = or_internal(
        "Failed to retrieve student",
        storage.get_student_by_id(id).await,
    )?;
    Ok(student.filter(|s| scope.permits(s.school_id)))
}

/// 学生本人只能看到自己
fn visible_to(profile: &Profile, student: &Student) -> bool {
    profile.user_type != UserType::Student || student.profile_id == profile.id
}

impl PeopleService {
    pub async fn list_students(
        &self,
        query: PeopleListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, query.school_id, Access::Read).await?;
        let storage = self.get_storage(request)?;

        match storage
            .list_students(PeopleListQuery::from_params(query, scope.school_id()))
            .await
        {
            Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Student list retrieved successfully",
            ))),
            Err(e) => Ok(internal_error("Failed to retrieve student list", e)),
        }
    }

    pub async fn create_student(
        &self,
        mut student: CreateStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let school_id = write_school(request, &profile, student.school_id).await?;
        let storage = self.get_storage(request)?;

        student.registration = student.registration.trim().to_string();
        if let Some(resp) =
            check_student_fields(Some(&student.registration), student.birth_date.as_ref())
        {
            return Ok(resp);
        }
        if let Some(resp) =
            check_references(&*storage, school_id, student.class_id, student.guardian_id).await?
        {
            return Ok(resp);
        }

        let draft = match draft_login(
            &*storage,
            school_id,
            &student.email,
            &student.full_name,
            student.password.take(),
        )
        .await?
        {
            Ok(draft) => draft,
            Err(resp) => return Ok(resp),
        };
        student.email = draft.login.email.clone();
        student.full_name = draft.login.full_name.clone();

        match storage.create_student(draft.login, student).await {
            Ok(person) => {
                info!("Student {} created in school {}", person.id, school_id);
                Ok(HttpResponse::Created().json(ApiResponse::success(
                    CreatedPersonResponse {
                        person,
                        initial_password: draft.initial_password,
                    },
                    "Student created",
                )))
            }
            Err(e) => Ok(write_failure(
                "Student creation failed",
                e,
                ErrorCode::RegistrationAlreadyExists,
                REGISTRATION_EXISTS,
            )),
        }
    }

    pub async fn get_student(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        match student_in_scope(&*storage, id, scope).await? {
            Some(student) if visible_to(&profile, &student) => Ok(HttpResponse::Ok().json(
                ApiResponse::success(student, "Student retrieved successfully"),
            )),
            _ => Ok(student_not_found()),
        }
    }

    pub async fn update_student(
        &self,
        id: i64,
        mut update: UpdateStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        let Some(existing) = student_in_scope(&*storage, id, scope).await? else {
            return Ok(student_not_found());
        };
        update.email = update.email.map(|e| e.trim().to_lowercase());
        update.registration = update.registration.map(|r| r.trim().to_string());
        if let Some(resp) = check_identity_update(update.email.as_ref(), update.full_name.as_ref())
            .or_else(|| check_student_fields(update.registration.as_ref(), update.birth_date.as_ref()))
        {
            return Ok(resp);
        }
        if let Some(resp) =
            check_references(&*storage, existing.school_id, update.class_id, update.guardian_id)
                .await?
        {
            return Ok(resp);
        }

        match storage.update_student(id, update).await {
            Ok(Some(student)) => {
                forget_login(request, student.profile_id).await?;
                Ok(HttpResponse::Ok().json(ApiResponse::success(student, "Student updated")))
            }
            Ok(None) => Ok(student_not_found()),
            Err(e) => Ok(write_failure(
                "Student update failed",
                e,
                ErrorCode::RegistrationAlreadyExists,
                "Email or registration already exists",
            )),
        }
    }

    pub async fn delete_student(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        let Some(student) = student_in_scope(&*storage, id, scope).await? else {
            return Ok(student_not_found());
        };
        match storage.delete_student(id).await {
            Ok(true) => {
                forget_login(request, student.profile_id).await?;
                info!("Student {} deleted by {}", id, profile.id);
                Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("Student deleted")))
            }
            Ok(false) => Ok(student_not_found()),
            Err(e) => Ok(internal_error("Student deletion failed", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CatalogStorage;
    use crate::storage::sea_orm_storage::test_support;

    #[test]
    fn test_student_fields() {
        assert!(check_student_fields(Some(&"2024/001".to_string()), None).is_none());
        assert!(check_student_fields(Some(&"bad registration".to_string()), None).is_some());
        assert!(check_student_fields(None, Some(&"2015-13-40".to_string())).is_some());
    }

    #[actix_web::test]
    async fn test_references_must_share_school() {
        let storage = test_support::storage().await;
        let a = test_support::school(&storage, "Escola A").await;
        let b = test_support::school(&storage, "Escola B").await;
        let class = storage
            .create_class(
                a.id,
                crate::models::catalog::requests::CreateClassRequest {
                    school_id: None,
                    course_id: None,
                    name: "1A".to_string(),
                    school_year: 2025,
                    shift: crate::models::catalog::entities::ClassShift::Morning,
                },
            )
            .await
            .unwrap();

        assert!(check_references(&storage, a.id, Some(class.id), None)
            .await
            .unwrap()
            .is_none());
        let resp = check_references(&storage, b.id, Some(class.id), None)
            .await
            .unwrap()
            .expect("cross school");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(check_references(&storage, a.id, None, Some(999))
            .await
            .unwrap()
            .is_some());
    }
}
