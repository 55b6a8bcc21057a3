//! Test helpers for inbound HTTP components.
//!
//! Handler tests run the real workflow services on top of the in-memory
//! adapters, log in through `POST /api/v1/login` and replay the session
//! cookie on later requests.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use crate::Trace;
use crate::domain::{
    Actor, ContactDetails, LoginPolicy, NewTechnician, NewUserAccount, Technician, UserAccount,
};
use crate::outbound::credentials::{Argon2PasswordHasher, HashCost};
use crate::outbound::memory::MemoryStore;

use super::state::HttpState;

/// Password shared by every seeded account.
pub const PASSWORD: &str = "correct-horse";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The session cookie set by `res`.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// Fresh in-memory store plus handler state wired on top of it. The minimal
/// Argon2 cost keeps the tests fast.
pub fn memory_state() -> (MemoryStore, HttpState) {
    memory_state_with_policy(LoginPolicy::default())
}

pub fn memory_state_with_policy(policy: LoginPolicy) -> (MemoryStore, HttpState) {
    let store = MemoryStore::new();
    let hasher = Argon2PasswordHasher::new(HashCost::MINIMAL).expect("minimal cost is valid");
    let ports = store.driven_ports(Arc::new(hasher));
    (store, HttpState::from_driven(ports, policy))
}

/// Application with every `/api/v1` route, mirroring the production layout.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(
            web::scope("/api/v1")
                .wrap(test_session_middleware())
                .configure(super::configure),
        )
}

/// Initialised service under test.
pub trait TestService:
    Service<Request, Response = ServiceResponse, Error = actix_web::Error>
{
}

impl<S> TestService for S where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>
{
}

/// Send `req`, attaching `cookie` when given, and decode the JSON body.
/// Empty bodies decode as `Value::Null`.
pub async fn send(
    app: &impl TestService,
    req: test::TestRequest,
    cookie: Option<&Cookie<'static>>,
) -> (StatusCode, Value) {
    let req = match cookie {
        Some(cookie) => req.cookie(cookie.clone()),
        None => req,
    };
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

/// Log in through the HTTP surface and return the session cookie.
pub async fn login(app: &impl TestService, email: &str) -> Cookie<'static> {
    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::OK, "login as {email}");
    session_cookie(&res)
}

fn new_account(name: &str, email: &str) -> NewUserAccount {
    NewUserAccount::try_new(name, email, PASSWORD, ContactDetails::default())
        .expect("valid account")
}

pub async fn seed_user(state: &HttpState, email: &str) -> UserAccount {
    state
        .accounts
        .register(new_account("Test User", email))
        .await
        .expect("register user")
}

/// First administrator, created through the anonymous bootstrap path.
pub async fn seed_admin(state: &HttpState, email: &str) -> UserAccount {
    state
        .accounts
        .create_admin(None, new_account("Test Admin", email))
        .await
        .expect("bootstrap admin")
}

pub async fn seed_technician(state: &HttpState, admin: &UserAccount, email: &str) -> Technician {
    let actor = Actor::admin(admin.id);
    state
        .technicians
        .create(
            &actor,
            NewTechnician {
                account: new_account("Test Technician", email),
                availability_date: None,
            },
        )
        .await
        .expect("create technician")
}

/// Accounts for each role, seeded into one store.
pub struct Cast {
    pub admin: UserAccount,
    pub user: UserAccount,
    pub other_user: UserAccount,
    pub technician: Technician,
    pub other_technician: Technician,
}

pub async fn seed_cast(state: &HttpState) -> Cast {
    let admin = seed_admin(state, "admin@example.com").await;
    let user = seed_user(state, "user@example.com").await;
    let other_user = seed_user(state, "other@example.com").await;
    let technician = seed_technician(state, &admin, "tech@example.com").await;
    let other_technician = seed_technician(state, &admin, "tech2@example.com").await;
    Cast {
        admin,
        user,
        other_user,
        technician,
        other_technician,
    }
}

/// JSON body for a valid service request in `category_id`.
pub fn request_payload(category_id: i64) -> Value {
    json!({
        "categoryId": category_id,
        "subject": "Boiler makes noise",
        "description": "Loud banging when the heating starts",
        "wantedDateStart": "2026-01-10",
        "wantedDateEnd": "2026-01-12",
        "timeShift": "morning"
    })
}
