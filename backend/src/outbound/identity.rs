//! Google OAuth2 identity provider adapter.
//!
//! Only the authorisation-code exchange is handled here: the code is traded
//! for an access token, which is then used once to read the userinfo email.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::ExternalAssertion;
use crate::domain::ports::{IdentityProvider, IdentityProviderError};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const SCOPES: &str = "openid email profile";

/// OAuth2 endpoints; overridable so tests can point at a local server.
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub authorize: Url,
    pub token: Url,
    pub userinfo: Url,
}

impl GoogleEndpoints {
    /// Google's public endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityProviderError::Misconfigured`] if a constant fails to parse.
    pub fn google() -> Result<Self, IdentityProviderError> {
        let parse = |raw: &str| {
            Url::parse(raw).map_err(|err| IdentityProviderError::misconfigured(err.to_string()))
        };
        Ok(Self {
            authorize: parse(GOOGLE_AUTH_URL)?,
            token: parse(GOOGLE_TOKEN_URL)?,
            userinfo: parse(GOOGLE_USERINFO_URL)?,
        })
    }
}

/// Client credentials registered with Google.
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: Zeroizing<String>,
    pub redirect_url: Url,
}

/// Identity provider backed by Google's OAuth2 endpoints.
pub struct GoogleIdentityProvider {
    client: Client,
    endpoints: GoogleEndpoints,
    credentials: GoogleCredentials,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct UserInfo {
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
}

impl GoogleIdentityProvider {
    /// Build a provider with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoints: GoogleEndpoints,
        credentials: GoogleCredentials,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoints,
            credentials,
        })
    }

    async fn fetch_access_token(&self, code: &str) -> Result<String, IdentityProviderError> {
        let form = [
            ("code", code),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("redirect_uri", self.credentials.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ];
        let response = self
            .client
            .post(self.endpoints.token.clone())
            .form(&form)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status_error(status, &body));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| IdentityProviderError::invalid_response(err.to_string()))?;
        Ok(token.access_token)
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<UserInfo, IdentityProviderError> {
        let response = self
            .client
            .get(self.endpoints.userinfo.clone())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status_error(status, &body));
        }
        response
            .json()
            .await
            .map_err(|err| IdentityProviderError::invalid_response(err.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorization_url(&self) -> Result<Url, IdentityProviderError> {
        let mut url = self.endpoints.authorize.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.credentials.client_id)
            .append_pair("redirect_uri", self.credentials.redirect_url.as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPES)
            .append_pair("access_type", "online")
            .append_pair("prompt", "select_account");
        Ok(url)
    }

    async fn exchange(&self, code: &str) -> Result<ExternalAssertion, IdentityProviderError> {
        let access_token = Zeroizing::new(self.fetch_access_token(code).await?);
        let info = self.fetch_user_info(&access_token).await?;
        if info.email_verified == Some(false) {
            return Err(IdentityProviderError::denied("email address is not verified"));
        }
        Ok(ExternalAssertion::new(info.email))
    }
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    IdentityProviderError::unavailable(error.to_string())
}

fn map_status_error(status: StatusCode, body: &str) -> IdentityProviderError {
    let message = format!("status {}: {}", status.as_u16(), body.trim());
    if status.is_client_error() {
        IdentityProviderError::denied(message)
    } else {
        IdentityProviderError::unavailable(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpRequest, HttpResponse, HttpServer, get, post, web};
    use rstest::rstest;
    use serde_json::json;

    #[derive(Deserialize)]
    struct TokenForm {
        code: String,
        grant_type: String,
        client_secret: String,
    }

    #[post("/token")]
    async fn token(form: web::Form<TokenForm>) -> HttpResponse {
        if form.grant_type != "authorization_code" || form.client_secret != "shh" {
            return HttpResponse::BadRequest().json(json!({ "error": "invalid_client" }));
        }
        match form.code.as_str() {
            "good" => HttpResponse::Ok().json(json!({ "access_token": "at-good" })),
            "unverified" => HttpResponse::Ok().json(json!({ "access_token": "at-unverified" })),
            "garbled" => HttpResponse::Ok().body("not json"),
            "outage" => HttpResponse::ServiceUnavailable().finish(),
            _ => HttpResponse::BadRequest().json(json!({ "error": "invalid_grant" })),
        }
    }

    #[get("/userinfo")]
    async fn userinfo(req: HttpRequest) -> HttpResponse {
        let auth = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        match auth {
            "Bearer at-good" => HttpResponse::Ok()
                .json(json!({ "email": "ada@example.com", "email_verified": true })),
            "Bearer at-unverified" => HttpResponse::Ok()
                .json(json!({ "email": "ada@example.com", "email_verified": false })),
            _ => HttpResponse::Unauthorized().finish(),
        }
    }

    fn start_google() -> Url {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        let server = HttpServer::new(|| App::new().service(token).service(userinfo))
            .workers(1)
            .listen(listener)
            .expect("listen")
            .run();
        actix_web::rt::spawn(server);
        Url::parse(&format!("http://{addr}/")).expect("base url")
    }

    fn provider(base: &Url) -> GoogleIdentityProvider {
        GoogleIdentityProvider::new(
            GoogleEndpoints {
                authorize: Url::parse(GOOGLE_AUTH_URL).expect("auth url"),
                token: base.join("token").expect("token url"),
                userinfo: base.join("userinfo").expect("userinfo url"),
            },
            GoogleCredentials {
                client_id: "client-1".into(),
                client_secret: Zeroizing::new("shh".into()),
                redirect_url: Url::parse("http://localhost:8080/auth/google/callback")
                    .expect("redirect url"),
            },
            Duration::from_secs(5),
        )
        .expect("client")
    }

    #[rstest]
    fn authorization_url_carries_client_and_redirect() {
        let base = Url::parse("http://127.0.0.1:1/").expect("base");
        let url = provider(&base).authorization_url().expect("url");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(url.as_str().starts_with(GOOGLE_AUTH_URL));
        assert!(pairs.contains(&("client_id".into(), "client-1".into())));
        assert!(pairs.contains(&(
            "redirect_uri".into(),
            "http://localhost:8080/auth/google/callback".into()
        )));
        assert!(pairs.contains(&("response_type".into(), "code".into())));
    }

    #[rstest]
    #[actix_web::test]
    async fn good_code_yields_email() {
        let base = start_google();
        let assertion = provider(&base).exchange("good").await.expect("exchange");
        assert_eq!(assertion.email(), Some("ada@example.com"));
    }

    #[rstest]
    #[case("expired", "denied")]
    #[case("unverified", "denied")]
    #[case("outage", "unavailable")]
    #[case("garbled", "invalid")]
    #[actix_web::test]
    async fn failures_map_to_port_errors(#[case] code: &str, #[case] expected: &str) {
        let base = start_google();
        let err = provider(&base).exchange(code).await.expect_err("failure");
        let matched = match expected {
            "denied" => matches!(err, IdentityProviderError::Denied { .. }),
            "unavailable" => matches!(err, IdentityProviderError::Unavailable { .. }),
            "invalid" => matches!(err, IdentityProviderError::InvalidResponse { .. }),
            _ => false,
        };
        assert!(matched, "unexpected error for {code}: {err:?}");
    }
}
