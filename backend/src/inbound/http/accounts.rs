//! Account API handlers.
//!
//! ```text
//! POST /api/auth/register {"name":"Ada","phone":"0781234567","password":"..."}
//! POST /api/auth/login {"identifier":"+250 78 123 4567","password":"..."}
//! GET /api/auth/exists?identifier=ada@example.com
//! GET /api/auth/me
//! PUT /api/profile {"avatar":"https://cdn.example/ada.png","bio":"..."}
//! ```
//!
//! Handlers only translate JSON into domain requests; identifier
//! normalization and credential checks live behind [`AccountService`].
//!
//! [`AccountService`]: crate::domain::ports::AccountService

use actix_web::{get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::identity::{AuthSession, ExistenceCheck, IdentityError, InputField};
use crate::domain::{
    AccountView, AvatarRef, Bio, Error, LoginRequest, Password, ProfileUpdate,
    RegistrationRequest,
};
use crate::inbound::http::auth::AuthenticatedAccount;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Registration body for `POST /api/auth/register`.
///
/// Every field is optional on the wire so that missing values surface as
/// field-tagged validation errors instead of JSON parse failures.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[schema(example = "078 123 4567")]
    pub phone: Option<String>,
    pub password: Option<String>,
}

impl From<RegisterBody> for RegistrationRequest {
    fn from(body: RegisterBody) -> Self {
        Self {
            name: body.name,
            email: body.email,
            phone: body.phone,
            password: body.password.map(Password::new),
        }
    }
}

/// Login body for `POST /api/auth/login`.
///
/// `identifier` accepts either an email or a phone number. The explicit
/// `email` and `phone` fields are consulted only when it is absent.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    #[schema(example = "+250 78 123 4567")]
    pub identifier: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

impl From<LoginBody> for LoginRequest {
    fn from(body: LoginBody) -> Self {
        Self {
            identifier: body.identifier,
            email: body.email,
            phone: body.phone,
            password: body.password.map(Password::new),
        }
    }
}

/// Query for `GET /api/auth/exists`.
#[derive(Debug, Deserialize, Serialize, IntoParams)]
pub struct ExistsQuery {
    /// Email address or phone number in any accepted format.
    #[serde(default)]
    pub identifier: String,
}

/// Profile completion body for `PUT /api/profile`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBody {
    /// Absolute `http` or `https` avatar URL. Omit to clear.
    #[schema(example = "https://cdn.example.com/ada.png")]
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

impl TryFrom<ProfileBody> for ProfileUpdate {
    type Error = IdentityError;

    fn try_from(body: ProfileBody) -> Result<Self, Self::Error> {
        let avatar = non_blank(body.avatar)
            .map(|raw| AvatarRef::parse(&raw))
            .transpose()
            .map_err(|_| IdentityError::InvalidFormat {
                field: InputField::Avatar,
            })?;
        let bio = non_blank(body.bio)
            .map(Bio::new)
            .transpose()
            .map_err(|_| IdentityError::InvalidFormat {
                field: InputField::Bio,
            })?;
        Ok(Self { avatar, bio })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

/// Token plus account view returned by register and login.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
    pub user: AccountView,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: AccountView::from(&session.account),
            token: session.token,
        }
    }
}

/// Register a new account identified by an email, a phone number or both.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterBody,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing or malformed field", body = Error),
        (status = 409, description = "Identifier already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Account store unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterBody>,
) -> ApiResult<HttpResponse> {
    let session = state.accounts.register(payload.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(AuthResponse::from(session)))
}

/// Sign in with an email or phone number and a password.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Login success", body = AuthResponse),
        (status = 400, description = "Missing credentials", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginBody>,
) -> ApiResult<web::Json<AuthResponse>> {
    let session = state.accounts.login(payload.into_inner().into()).await?;
    Ok(web::Json(AuthResponse::from(session)))
}

/// Check whether an identifier is already registered.
#[utoipa::path(
    get,
    path = "/api/auth/exists",
    params(ExistsQuery),
    responses(
        (status = 200, description = "Lookup result", body = ExistenceCheck),
        (status = 400, description = "Missing or malformed identifier", body = Error)
    ),
    tags = ["auth"],
    operation_id = "identifierExists",
    security([])
)]
#[get("/auth/exists")]
pub async fn exists(
    state: web::Data<HttpState>,
    query: web::Query<ExistsQuery>,
) -> ApiResult<web::Json<ExistenceCheck>> {
    let check = state.accounts.exists(&query.identifier).await?;
    Ok(web::Json(check))
}

/// Return the account behind the bearer token.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current account", body = AccountView),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentAccount"
)]
#[get("/auth/me")]
pub async fn me(
    state: web::Data<HttpState>,
    caller: AuthenticatedAccount,
) -> ApiResult<web::Json<AccountView>> {
    let account = state.accounts.current_account(caller.id()).await?;
    Ok(web::Json(AccountView::from(&account)))
}

/// Complete the caller's profile with an avatar and bio.
#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = ProfileBody,
    responses(
        (status = 200, description = "Updated account", body = AccountView),
        (status = 400, description = "Malformed avatar or bio", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["profile"],
    operation_id = "completeProfile"
)]
#[put("/profile")]
pub async fn complete_profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedAccount,
    payload: web::Json<ProfileBody>,
) -> ApiResult<web::Json<AccountView>> {
    let update = ProfileUpdate::try_from(payload.into_inner())?;
    let account = state
        .accounts
        .complete_profile(caller.id(), update)
        .await?;
    Ok(web::Json(AccountView::from(&account)))
}
