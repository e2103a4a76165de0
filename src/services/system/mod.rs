//! 健康检查

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use tracing::warn;

use crate::models::{ApiResponse, AppStartTime, system::responses::HealthResponse};

define_service!(SystemService);

fn uptime_secs(request: &HttpRequest) -> i64 {
    request
        .app_data::<web::Data<AppStartTime>>()
        .map(|start| (chrono::Utc::now() - start.start_datetime).num_seconds())
        .unwrap_or_default()
}

impl SystemService {
    /// 数据库可达时 200，否则 503
    pub async fn health(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let database_up = match storage.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Health check: database unreachable: {}", e);
                false
            }
        };

        let health = HealthResponse {
            status: if database_up { "ok" } else { "degraded" }.to_string(),
            database: if database_up { "up" } else { "down" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: uptime_secs(request),
        };

        let mut builder = if database_up {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };
        Ok(builder.json(ApiResponse::success(health, "Health check completed")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::test_support;
    use actix_web::{App, http::StatusCode, test};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_health_reports_database_up() {
        let storage: Arc<dyn Storage> = Arc::new(test_support::storage().await);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .app_data(web::Data::new(AppStartTime {
                    start_datetime: chrono::Utc::now(),
                }))
                .route(
                    "/health",
                    web::get().to(|req: HttpRequest| async move {
                        SystemService::new_lazy().health(&req).await
                    }),
                ),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request())
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["database"], "up");
    }
}
