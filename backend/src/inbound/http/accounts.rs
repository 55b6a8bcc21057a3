//! Account handlers: registration, login, logout and admin bootstrap.
//!
//! ```text
//! POST /api/v1/register {"name":"Ana","email":"ana@example.com","password":"..."}
//! POST /api/v1/login {"email":"ana@example.com","password":"..."}
//! POST /api/v1/login/technician {"email":"tech@example.com","password":"..."}
//! POST /api/v1/logout
//! GET  /api/v1/user
//! POST /api/v1/create-admin {"name":"Root","email":"root@example.com","password":"..."}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{ContactDetails, Error, LoginCredentials, NewUserAccount, Role, UserAccount};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, map_login_validation_error, map_user_validation_error, parse_role, required,
};

/// Account details for `POST /register` and `POST /create-admin`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(flatten)]
    pub contact: ContactDetails,
}

impl AccountRequest {
    pub(crate) fn into_account(self) -> Result<NewUserAccount, Error> {
        let name = required(self.name, FieldName::new("name"))?;
        let email = required(self.email, FieldName::new("email"))?;
        let password = required(self.password, FieldName::new("password"))?;
        NewUserAccount::try_new(&name, &email, &password, self.contact)
            .map_err(map_user_validation_error)
    }
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password).map_err(map_login_validation_error)
    }
}

/// Register a new account with the `user` role.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = AccountRequest,
    responses(
        (status = 201, description = "Account created", body = UserAccount),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<AccountRequest>,
) -> ApiResult<HttpResponse> {
    let account = payload.into_inner().into_account()?;
    let created = state.accounts.register(account).await?;
    Ok(HttpResponse::Created().json(created))
}

async fn establish_session(
    state: &HttpState,
    session: &SessionContext,
    payload: LoginRequest,
    required_role: Option<Role>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from(payload)?;
    let account = state.accounts.login(&credentials, required_role).await?;
    session.persist_user(account.id)?;
    Ok(HttpResponse::Ok().json(account))
}

/// Authenticate with any role accepted by the login policy.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserAccount,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 403, description = "Role not accepted by the login policy", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    establish_session(&state, &session, payload.into_inner(), None).await
}

/// Authenticate and additionally require the account to hold `role`.
#[utoipa::path(
    post,
    path = "/api/v1/login/{role}",
    request_body = LoginRequest,
    params(("role" = String, Path, description = "Required role: user, technician or admin")),
    responses(
        (status = 200, description = "Login success", body = UserAccount),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 403, description = "Account does not hold the role", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "loginWithRole",
    security([])
)]
#[post("/login/{role}")]
pub async fn login_with_role(
    state: web::Data<HttpState>,
    session: SessionContext,
    role: web::Path<String>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let role = parse_role(&role)?;
    establish_session(&state, &session, payload.into_inner(), Some(role)).await
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["accounts"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// The authenticated account.
#[utoipa::path(
    get,
    path = "/api/v1/user",
    responses(
        (status = 200, description = "Current account", body = UserAccount),
        (status = 401, description = "Login required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "currentUser"
)]
#[get("/user")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserAccount>> {
    let user_id = session.require_user_id()?;
    let account = state.identity.account(user_id).await?;
    Ok(web::Json(account))
}

/// Create an administrator. Open to anonymous callers only until the first
/// administrator exists.
#[utoipa::path(
    post,
    path = "/api/v1/create-admin",
    request_body = AccountRequest,
    responses(
        (status = 201, description = "Administrator created", body = UserAccount),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "An administrator exists; login required", body = Error),
        (status = 403, description = "Caller is not an administrator", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "createAdmin"
)]
#[post("/create-admin")]
pub async fn create_admin(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AccountRequest>,
) -> ApiResult<HttpResponse> {
    let account = payload.into_inner().into_account()?;
    let caller = session.user_id()?;
    let created = state.accounts.create_admin(caller, account).await?;
    Ok(HttpResponse::Created().json(created))
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
