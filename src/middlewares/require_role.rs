/*!
 * 基于账户类型的访问控制中间件
 *
 * 必须在 RequireJWT 之后使用。
 *
 * ```rust,ignore
 * web::scope("/api/v1/profiles")
 *     .wrap(RequireRole::new_any(UserType::admin_roles()))
 *     .wrap(RequireJWT)
 * ```
 *
 * actix 中后 `wrap` 的中间件先执行，因此 RequireJWT 写在外层。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::{
    middlewares::RequireJWT,
    models::{ErrorCode, profiles::entities::UserType},
};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireRole {
    allowed: Vec<UserType>,
}

impl RequireRole {
    pub fn new(user_type: UserType) -> Self {
        Self {
            allowed: vec![user_type],
        }
    }

    /// 任一账户类型即可
    pub fn new_any(user_types: &[UserType]) -> Self {
        Self {
            allowed: user_types.to_vec(),
        }
    }

    fn permits(&self, user_type: UserType) -> bool {
        self.allowed.contains(&user_type)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            rule: self.clone(),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    rule: RequireRole,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let rule = self.rule.clone();

        Box::pin(async move {
            if req.method() == actix_web::http::Method::OPTIONS {
                let res = srv.call(req).await?.map_into_left_body();
                return Ok(res);
            }

            match RequireJWT::extract_user_type(req.request()) {
                Some(user_type) if rule.permits(user_type) => {
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Some(user_type) => {
                    info!(
                        "Access denied for {} to {} (allowed: {:?})",
                        user_type,
                        req.path(),
                        rule.allowed
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::FORBIDDEN,
                            ErrorCode::Forbidden,
                            "Access denied.",
                        )
                        .map_into_right_body(),
                    ))
                }
                None => {
                    info!("Role check without authenticated profile; RequireJWT missing?");
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            "Authentication required",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profiles::entities::{Profile, ProfileStatus};
    use actix_web::{App, HttpMessage, HttpResponse, test, web};

    fn profile(user_type: UserType) -> Profile {
        let now = chrono::Utc::now();
        Profile {
            id: 1,
            email: "x@escola.test".to_string(),
            password_hash: String::new(),
            full_name: "X".to_string(),
            user_type,
            status: ProfileStatus::Active,
            school_id: None,
            avatar_url: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[::core::prelude::v1::test]
    fn test_permits() {
        let rule = RequireRole::new_any(UserType::manager_roles());
        assert!(rule.permits(UserType::Admin));
        assert!(rule.permits(UserType::School));
        assert!(!rule.permits(UserType::Teacher));
    }

    #[actix_web::test]
    async fn test_forbidden_for_other_roles() {
        let app = test::init_service(
            App::new().service(
                web::scope("/admin")
                    .wrap(RequireRole::new(UserType::Admin))
                    .route("", web::get().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/admin").to_request();
        req.extensions_mut().insert(profile(UserType::Student));
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get().uri("/admin").to_request();
        req.extensions_mut().insert(profile(UserType::Admin));
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/admin").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
