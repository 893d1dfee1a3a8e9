//! Login, logout and console account handlers.
//!
//! ```text
//! POST /api/v1/login {"username":"admin","password":"s3cret"}
//! POST /api/v1/logout
//! GET  /api/v1/users
//! POST /api/v1/users {"username":"ana","password":"pw","role":"client","groupId":"..."}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::ports::CreateUserRequest;
use crate::domain::{
    ConsoleSession, Error, LoginCredentials, LoginValidationError, Principal, Role, UserAccount,
    UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_group_id};

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let (field, code) = match err {
        LoginValidationError::EmptyUsername => ("username", "empty_username"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

/// Authenticate and start a console session.
///
/// Unknown users, wrong passwords and inactive accounts all produce the same
/// `401` response.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = ConsoleSession,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "User store unavailable", body = Error)
    ),
    tags = ["session"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<ConsoleSession>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let account = state.login.authenticate(&credentials).await?;
    let principal = Principal::from(&account);
    info!(username = %principal.username, role = %principal.role, "console login");
    let console = session.sign_in(principal)?;
    Ok(web::Json(console))
}

/// End the session and clear every piece of console state.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["session"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.sign_out();
    HttpResponse::NoContent().finish()
}

/// List console accounts.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [UserAccount]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 503, description = "User store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UserAccount>>> {
    session.require_admin()?;
    Ok(web::Json(state.users.list_users().await?))
}

/// Body for `POST /api/v1/users`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
    /// Login name.
    pub username: String,
    /// Initial password.
    pub password: String,
    /// `admin` or `client`.
    pub role: String,
    /// Required for client-role users, rejected for admins.
    #[serde(default)]
    pub group_id: Option<String>,
}

impl CreateUserBody {
    fn into_request(self) -> Result<CreateUserRequest, Error> {
        let role: Role = self.role.parse().map_err(|err: UserValidationError| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "role", "code": "unknown_role" }))
        })?;
        let group_id = self
            .group_id
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| parse_group_id(raw, FieldName::new("groupId")))
            .transpose()?;
        Ok(CreateUserRequest {
            username: self.username,
            password: self.password,
            role,
            group_id,
        })
    }
}

/// Create a console account.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserBody,
    responses(
        (status = 201, description = "User created", body = UserAccount),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "Group not found", body = Error),
        (status = 409, description = "Username taken", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateUserBody>,
) -> ApiResult<HttpResponse> {
    let admin = session.require_admin()?;
    let request = payload.into_inner().into_request()?;
    let account = state.users.create_user(request).await?;
    info!(created_by = %admin.username, username = %account.username, "console user created");
    Ok(HttpResponse::Created().json(account))
}
