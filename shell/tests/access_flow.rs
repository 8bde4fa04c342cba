//! End-to-end access flows against the in-memory adapters.
use std::sync::Arc;
use std::time::Duration;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test as actix_test, web};
use async_trait::async_trait;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use url::form_urlencoded;

use marketplace_shell::Trace;
use marketplace_shell::domain::ports::{ProfileStore, ProfileStoreError, ServiceProviderRecord};
use marketplace_shell::domain::{
    GuardDecision, Identity, IdentityId, LoginCredentials, Navigation, Registration,
    RegistrationForm, RegistrationStep, Role, RoleRequirement, ServiceCategory, SessionError,
    SessionState, SessionStore, decide_for, navigate,
};
use marketplace_shell::inbound::http::configure;
use marketplace_shell::inbound::http::health::HealthState;
use marketplace_shell::inbound::http::state::HttpState;
use marketplace_shell::outbound::memory::{
    DEMO_PASSWORD, InMemoryAuthService, InMemoryProfileStore, seed_demo_accounts,
};

struct Shell {
    auth: Arc<InMemoryAuthService>,
    profiles: Arc<InMemoryProfileStore>,
    store: Arc<SessionStore>,
}

#[fixture]
fn shell() -> Shell {
    let auth = Arc::new(InMemoryAuthService::new());
    let profiles = Arc::new(InMemoryProfileStore::new());
    seed_demo_accounts(&auth, &profiles).expect("seed demo accounts");
    let store = Arc::new(SessionStore::new(auth.clone(), profiles.clone()));
    Shell {
        auth,
        profiles,
        store,
    }
}

fn demo_credentials(email: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(email, DEMO_PASSWORD).expect("credentials")
}

fn provider_registration() -> Registration {
    Registration::try_from_form(RegistrationForm {
        email: "tunde@test.com".to_owned(),
        first_name: "Tunde".to_owned(),
        last_name: "Bakare".to_owned(),
        phone: "+2348022222222".to_owned(),
        state: "Oyo".to_owned(),
        lga: "Ibadan North".to_owned(),
        address: None,
        role: Some(Role::ServiceProvider),
        password: "secret1".to_owned(),
        confirm_password: "secret1".to_owned(),
        service_categories: vec![ServiceCategory::Carpentry],
        accepted_terms: true,
    })
    .expect("valid registration")
}

#[rstest]
#[tokio::test]
async fn startup_without_session_sends_profile_to_login(shell: Shell) {
    let state = shell.store.initialize().await;
    assert_eq!(state, SessionState::Anonymous);
    assert!(!state.is_loading());
    assert_eq!(
        decide_for(&state, "/profile", None),
        GuardDecision::RedirectToLogin {
            from: "/profile".to_owned()
        }
    );
}

#[rstest]
#[tokio::test]
async fn customer_login_is_bounced_from_admin_dashboard(shell: Shell) {
    shell.store.initialize().await;
    let identity = shell
        .store
        .login(&demo_credentials("customer@test.com"))
        .await
        .expect("login");
    assert_eq!(identity.role, Role::Customer);

    let state = shell.store.snapshot();
    assert!(!state.is_loading());
    assert_eq!(
        decide_for(&state, "/admin/dashboard", Some(RoleRequirement::for_role(Role::Admin))),
        GuardDecision::RedirectHome {
            to: "/customer/dashboard"
        }
    );
}

#[rstest]
#[case("customer@test.com", "/customer/bookings")]
#[case("handyman@test.com", "/service-provider/jobs")]
#[case("handyman@test.com", "/handyman/jobs")]
#[case("admin@test.com", "/admin/disputes")]
#[tokio::test]
async fn login_then_own_route_renders_directly(
    shell: Shell,
    #[case] email: &str,
    #[case] path: &str,
) {
    shell.store.initialize().await;
    shell
        .store
        .login(&demo_credentials(email))
        .await
        .expect("login");
    assert!(matches!(
        navigate(path, &shell.store.snapshot()),
        Navigation::Render(_)
    ));
}

struct FailingProviderRecords {
    inner: Arc<InMemoryProfileStore>,
}

#[async_trait]
impl ProfileStore for FailingProviderRecords {
    async fn get_profile(&self, id: &IdentityId) -> Result<Option<Identity>, ProfileStoreError> {
        self.inner.get_profile(id).await
    }

    async fn create_profile(&self, identity: &Identity) -> Result<(), ProfileStoreError> {
        self.inner.create_profile(identity).await
    }

    async fn create_service_provider_record(
        &self,
        _id: &IdentityId,
        _record: &ServiceProviderRecord,
    ) -> Result<(), ProfileStoreError> {
        Err(ProfileStoreError::unavailable("provider table offline"))
    }
}

#[rstest]
#[tokio::test]
async fn failed_provider_record_is_partial_registration(shell: Shell) {
    let store = SessionStore::new(
        shell.auth.clone(),
        Arc::new(FailingProviderRecords {
            inner: shell.profiles.clone(),
        }),
    );
    store.initialize().await;

    let err = store
        .register(&provider_registration())
        .await
        .expect_err("partial registration");
    let (identity_id, step) = match err {
        SessionError::PartialRegistration {
            identity_id, step, ..
        } => (identity_id, step),
        other => panic!("expected partial registration, got {other:?}"),
    };
    assert_eq!(step, RegistrationStep::ServiceProviderRecord);
    assert!(shell.profiles.get_profile(&identity_id).await.expect("get").is_some());
    assert_eq!(store.snapshot(), SessionState::Anonymous);
}

#[rstest]
#[tokio::test]
async fn provider_registration_publishes_identity(shell: Shell) {
    shell.store.initialize().await;
    let identity = shell
        .store
        .register(&provider_registration())
        .await
        .expect("register");
    assert_eq!(shell.store.snapshot().identity(), Some(&identity));
    let record = shell
        .profiles
        .service_provider_record(&identity.id)
        .expect("provider record");
    assert_eq!(record.service_categories, vec![ServiceCategory::Carpentry]);
}

#[rstest]
#[tokio::test]
async fn external_sign_out_reaches_the_guard(shell: Shell) {
    shell.store.initialize().await;
    shell
        .store
        .login(&demo_credentials("admin@test.com"))
        .await
        .expect("login");
    shell.store.subscribe_to_auth_changes();
    let mut changes = shell.store.subscribe();

    shell.auth.expire_session();
    tokio::time::timeout(
        Duration::from_secs(1),
        changes.wait_for(|state| *state == SessionState::Anonymous),
    )
    .await
    .expect("sign-out observed in time")
    .expect("store alive");

    assert_eq!(
        navigate("/admin/users", &shell.store.snapshot()),
        Navigation::Redirect {
            location: "/auth/login?from=%2Fadmin%2Fusers".to_owned()
        }
    );
    shell.store.shutdown();
}

#[rstest]
#[actix_web::test]
async fn http_round_trip_from_login_redirect_back_to_page(shell: Shell) {
    shell.store.initialize().await;
    let health = HealthState::new();
    health.record_initialized(&shell.store.snapshot());
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(HttpState::new(shell.store.clone())))
            .app_data(web::Data::new(health))
            .wrap(Trace)
            .configure(configure),
    )
    .await;

    let bounced =
        actix_test::call_service(&app, actix_test::TestRequest::get().uri("/wallet").to_request()).await;
    assert_eq!(bounced.status(), StatusCode::SEE_OTHER);
    let login_location = bounced
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("location")
        .to_owned();
    let (_, query) = login_location.split_once('?').expect("query string");
    let from = form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "from")
        .map(|(_, from)| from.into_owned())
        .expect("return path");
    assert_eq!(from, "/wallet");

    let signed_in = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({
                "email": "handyman@test.com",
                "password": DEMO_PASSWORD,
                "from": from,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(signed_in.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        signed_in
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some("/wallet")
    );

    let page =
        actix_test::call_service(&app, actix_test::TestRequest::get().uri("/wallet").to_request()).await;
    assert_eq!(page.status(), StatusCode::OK);
    assert!(page.headers().contains_key("trace-id"));
    let body: Value = actix_test::read_body_json(page).await;
    assert_eq!(body["title"], "Wallet");
    assert_eq!(body["session"]["panelTitle"], "Service Provider Panel");

    let ready =
        actix_test::call_service(&app, actix_test::TestRequest::get().uri("/health/ready").to_request())
            .await;
    assert_eq!(ready.status(), StatusCode::OK);
}

/// Profile store whose reads suspend, like a remote table would.
struct SlowProfiles {
    inner: Arc<InMemoryProfileStore>,
}

#[async_trait]
impl ProfileStore for SlowProfiles {
    async fn get_profile(&self, id: &IdentityId) -> Result<Option<Identity>, ProfileStoreError> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.inner.get_profile(id).await
    }

    async fn create_profile(&self, identity: &Identity) -> Result<(), ProfileStoreError> {
        self.inner.create_profile(identity).await
    }

    async fn create_service_provider_record(
        &self,
        id: &IdentityId,
        record: &ServiceProviderRecord,
    ) -> Result<(), ProfileStoreError> {
        self.inner.create_service_provider_record(id, record).await
    }
}

fn listening_slow_store(shell: &Shell) -> Arc<SessionStore> {
    let store = Arc::new(SessionStore::new(
        shell.auth.clone(),
        Arc::new(SlowProfiles {
            inner: shell.profiles.clone(),
        }),
    ));
    store.subscribe_to_auth_changes();
    store
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn login_succeeds_while_listening_for_auth_events(shell: Shell) {
    let store = listening_slow_store(&shell);
    store.initialize().await;

    let identity = store
        .login(&demo_credentials("customer@test.com"))
        .await
        .expect("login with listener running");
    assert_eq!(identity.role, Role::Customer);
    assert_eq!(store.snapshot(), SessionState::Authenticated(identity));

    let registered = store
        .register(&provider_registration())
        .await
        .expect("register with listener running");
    assert_eq!(store.snapshot().identity(), Some(&registered));
    store.shutdown();
}

#[rstest]
#[actix_web::test]
async fn http_login_succeeds_while_listening_for_auth_events(shell: Shell) {
    let store = listening_slow_store(&shell);
    store.initialize().await;
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(HttpState::new(store.clone())))
            .app_data(web::Data::new(HealthState::new()))
            .wrap(Trace)
            .configure(configure),
    )
    .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({
                "email": "admin@test.com",
                "password": DEMO_PASSWORD,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        res.headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some("/admin/dashboard")
    );
    assert_eq!(
        store.snapshot().identity().map(|identity| identity.role),
        Some(Role::Admin)
    );
    store.shutdown();
}
