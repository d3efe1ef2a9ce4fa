//! Users API handlers.
//!
//! ```text
//! GET /user/{email}
//! ```

use actix_web::{get, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EmailAddress, Error, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Public view of a user. The access token is never exposed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub is_manager: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            email: user.email().to_string(),
            is_manager: user.is_manager(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

/// Fetch a user by email address.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use approvals::inbound::http::users::get_user;
///
/// let app = App::new().service(get_user);
/// ```
#[utoipa::path(
    get,
    path = "/user/{email}",
    params(("email" = String, Path, description = "User email address")),
    responses(
        (status = 200, description = "User", body = UserView),
        (status = 404, description = "User not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/{email}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserView>> {
    let email = EmailAddress::new(path.into_inner())
        .map_err(|_| Error::not_found("User not found"))?;
    let user = state.identity.lookup_by_email(&email).await?;
    Ok(web::Json(UserView::from(&user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccessToken;
    use crate::inbound::http::test_utils::{TestPorts, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[actix_web::test]
    async fn returns_user_without_token() {
        let now = Utc::now();
        let token = AccessToken::issue();
        let secret = token.expose().to_owned();
        let user = User::from_parts(
            EmailAddress::new("boss@example.com").expect("email"),
            token,
            true,
            now,
            now,
        );
        let mut ports = TestPorts::default();
        ports
            .identity
            .expect_lookup_by_email()
            .withf(|email| email.as_str() == "boss@example.com")
            .times(1)
            .return_once(move |_| Ok(user));

        let app = actix_test::init_service(test_app(ports)).await;
        let request = actix_test::TestRequest::get()
            .uri("/user/boss@example.com")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = actix_test::read_body(response).await;
        let text = std::str::from_utf8(&body).expect("utf8 body");
        assert!(!text.contains(&secret));
        let value: Value = serde_json::from_str(text).expect("user JSON");
        assert_eq!(value["email"], "boss@example.com");
        assert_eq!(value["isManager"], true);
        assert!(value.get("token").is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn blank_email_is_404_without_lookup() {
        let mut ports = TestPorts::default();
        ports.identity.expect_lookup_by_email().never();

        let app = actix_test::init_service(test_app(ports)).await;
        let request = actix_test::TestRequest::get().uri("/user/%20").to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[case("/user/nobody@example.com")]
    #[case("/user/alice")]
    #[actix_web::test]
    async fn unknown_user_is_404(#[case] uri: &str) {
        let mut ports = TestPorts::default();
        ports
            .identity
            .expect_lookup_by_email()
            .times(1)
            .return_once(|_| Err(Error::not_found("User not found")));

        let app = actix_test::init_service(test_app(ports)).await;
        let request = actix_test::TestRequest::get().uri(uri).to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
