//! Tests for the identity service.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockNotificationDispatcher, MockUserRepository};
use crate::domain::{DispatchReport, ErrorCode};

const ADMIN: &str = "boss@example.com";

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn email(raw: &str) -> EmailAddress {
    EmailAddress::new(raw).expect("fixture email")
}

fn assertion(raw: &str) -> ExternalAssertion {
    ExternalAssertion::new(Some(raw.to_owned()))
}

fn make_service(
    repo: MockUserRepository,
    dispatcher: MockNotificationDispatcher,
    now: DateTime<Utc>,
) -> IdentityService<MockUserRepository> {
    IdentityService::new(
        Arc::new(repo),
        Arc::new(dispatcher),
        Arc::new(FixtureClock { utc_now: now }),
        IdentitySettings {
            admin_email: Some(email(ADMIN)),
        },
    )
}

fn login_dispatcher() -> MockNotificationDispatcher {
    let mut dispatcher = MockNotificationDispatcher::new();
    dispatcher
        .expect_dispatch()
        .withf(|event| matches!(event, NotificationEvent::Login { .. }))
        .times(1)
        .return_once(|_| DispatchReport::default());
    dispatcher
}

#[rstest]
#[case(None)]
#[case(Some(""))]
#[case(Some("   "))]
#[tokio::test]
async fn assertion_without_email_is_unauthorised(now: DateTime<Utc>, #[case] raw: Option<&str>) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email().never();
    let mut dispatcher = MockNotificationDispatcher::new();
    dispatcher.expect_dispatch().never();

    let service = make_service(repo, dispatcher, now);
    let err = service
        .resolve_login(ExternalAssertion::new(raw.map(str::to_owned)))
        .await
        .expect_err("missing email");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[case(ADMIN, true)]
#[case("ada@example.com", false)]
#[tokio::test]
async fn first_login_creates_user_with_manager_flag(
    now: DateTime<Utc>,
    #[case] raw: &str,
    #[case] expected_manager: bool,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_insert()
        .withf(move |user| user.is_manager() == expected_manager)
        .times(1)
        .return_once(|_| Ok(()));
    repo.expect_update_token().never();

    let service = make_service(repo, login_dispatcher(), now);
    let outcome = service
        .resolve_login(assertion(raw))
        .await
        .expect("login succeeds");

    assert!(outcome.created);
    assert_eq!(outcome.user.email().as_str(), raw);
    assert_eq!(outcome.user.is_manager(), expected_manager);
    assert_eq!(outcome.user.created_at(), now);
}

#[rstest]
#[tokio::test]
async fn repeat_login_replaces_token_and_keeps_manager_flag(now: DateTime<Utc>) {
    let created = now - chrono::Duration::days(3);
    let old_token = AccessToken::issue();
    // Stored before the admin email was configured, so not a manager.
    let existing = User::from_parts(email(ADMIN), old_token.clone(), false, created, created);
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    repo.expect_insert().never();
    repo.expect_update_token()
        .withf(move |user| !user.is_manager() && user.updated_at() == now)
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(repo, login_dispatcher(), now);
    let outcome = service
        .resolve_login(assertion(ADMIN))
        .await
        .expect("login succeeds");

    assert!(!outcome.created);
    assert!(!outcome.user.is_manager());
    assert_ne!(outcome.user.token(), &old_token);
    assert_eq!(outcome.user.created_at(), created);
}

#[rstest]
#[tokio::test]
async fn concurrent_first_login_falls_back_to_refresh(now: DateTime<Utc>) {
    let winner = User::from_parts(email("ada@example.com"), AccessToken::issue(), false, now, now);
    let mut repo = MockUserRepository::new();
    let mut lookups = vec![Ok(Some(winner)), Ok(None)];
    repo.expect_find_by_email()
        .times(2)
        .returning(move |_| lookups.pop().expect("two lookups"));
    repo.expect_insert()
        .times(1)
        .return_once(|user| Err(UserPersistenceError::duplicate(user.email().as_str())));
    repo.expect_update_token().times(1).return_once(|_| Ok(()));

    let service = make_service(repo, login_dispatcher(), now);
    let outcome = service
        .resolve_login(assertion("ada@example.com"))
        .await
        .expect("login succeeds");
    assert!(!outcome.created);
}

#[rstest]
#[tokio::test]
async fn store_outage_surfaces_as_unavailable(now: DateTime<Utc>) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::connection("refused")));
    let mut dispatcher = MockNotificationDispatcher::new();
    dispatcher.expect_dispatch().never();

    let service = make_service(repo, dispatcher, now);
    let err = service
        .resolve_login(assertion("ada@example.com"))
        .await
        .expect_err("store down");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn lookup_of_unknown_user_is_not_found(now: DateTime<Utc>) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    let mut dispatcher = MockNotificationDispatcher::new();
    dispatcher.expect_dispatch().never();

    let service = make_service(repo, dispatcher, now);
    let err = service
        .lookup_by_email(&email("nobody@example.com"))
        .await
        .expect_err("unknown user");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn logout_announces_to_user(now: DateTime<Utc>) {
    let repo = MockUserRepository::new();
    let mut dispatcher = MockNotificationDispatcher::new();
    dispatcher
        .expect_dispatch()
        .withf(|event| {
            matches!(event, NotificationEvent::Logout { email } if email.as_str() == "ada@example.com")
        })
        .times(1)
        .return_once(|_| DispatchReport::deferred());

    let service = make_service(repo, dispatcher, now);
    service
        .logout(&email("ada@example.com"))
        .await
        .expect("logout succeeds");
}
