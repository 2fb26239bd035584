use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::AppState;

pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

/// Proof that the request carried valid admin credentials.
///
/// Accepts the static `X-Admin-Key` or `Authorization: Bearer <jwt>`.
#[derive(Debug)]
pub struct AdminAuth;

impl FromRequest for AdminAuth {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            return ready(Err(AppError::Internal("Application state missing".to_string())));
        };

        let header = |name: &str| req.headers().get(name).and_then(|v| v.to_str().ok());
        let api_key = header(ADMIN_KEY_HEADER);
        let bearer = header("Authorization").and_then(|v| v.strip_prefix("Bearer "));

        let result = state.auth.authorize(api_key, bearer).map(|_| AdminAuth).map_err(|e| {
            log::warn!("Unauthorized admin request to {}", req.path());
            AppError::from(e)
        });
        ready(result)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// HS256 JWT valid for 24 hours
    pub token: String,
}

/// POST /admin/auth/login
#[utoipa::path(
    post,
    path = "/admin/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Admin token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "admin"
)]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let token = state.auth.login(&body.username, &body.password)?;
    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    use crate::handlers::test_support::{app, state};

    #[actix_web::test]
    async fn login_token_opens_admin_routes() {
        let (state, _) = state();
        let app = test::init_service(app(state)).await;

        let body: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/admin/auth/login")
                .set_json(json!({ "username": "admin", "password": "hunter2" }))
                .to_request(),
        )
        .await;
        let token = body["token"].as_str().expect("token should be a string");

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/admin/products")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorized() {
        let (state, _) = state();
        let app = test::init_service(app(state)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/admin/auth/login")
                .set_json(json!({ "username": "admin", "password": "letmein" }))
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Unauthorized" }));
    }

    #[actix_web::test]
    async fn garbage_bearer_token_is_unauthorized() {
        let (state, _) = state();
        let app = test::init_service(app(state)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/admin/products")
                .insert_header(("Authorization", "Bearer not.a.jwt"))
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
