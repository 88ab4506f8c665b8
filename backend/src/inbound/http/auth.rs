//! Bearer-token authentication for HTTP handlers.
//!
//! Handlers that need a signed-in caller take [`AuthenticatedAccount`] as an
//! argument; extraction fails with `401` before the handler body runs.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::domain::identity::IdentityError;
use crate::domain::{AccountId, Error};

use super::state::HttpState;

/// Account id resolved from the `Authorization: Bearer` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedAccount(AccountId);

impl AuthenticatedAccount {
    /// Authenticated account id.
    #[must_use]
    pub fn id(&self) -> &AccountId {
        &self.0
    }
}

/// Extract the token from a `Bearer` authorization value.
fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_owned())
}

impl FromRequest for AuthenticatedAccount {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let state =
                state.ok_or_else(|| Error::internal("http state missing from application data"))?;
            let token = token.ok_or(IdentityError::InvalidToken)?;
            let id = state.accounts.authenticate(&token).await?;
            Ok(Self(id))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::MockAccountService;
    use actix_web::http::StatusCode;
    use actix_web::{get, test as actix_test, App, HttpResponse};
    use rstest::rstest;

    #[get("/whoami")]
    async fn whoami(caller: AuthenticatedAccount) -> HttpResponse {
        HttpResponse::Ok().body(caller.id().to_string())
    }

    fn state_accepting(token: &'static str, id: AccountId) -> web::Data<HttpState> {
        let mut accounts = MockAccountService::new();
        accounts.expect_authenticate().returning(move |presented| {
            if presented == token {
                Ok(id)
            } else {
                Err(IdentityError::InvalidToken)
            }
        });
        web::Data::new(HttpState::new(Arc::new(accounts)))
    }

    #[rstest]
    #[case(Some("Bearer good"), StatusCode::OK)]
    #[case(Some("bearer   good "), StatusCode::OK)]
    #[case(Some("Bearer bad"), StatusCode::UNAUTHORIZED)]
    #[case(Some("Basic Z29vZA=="), StatusCode::UNAUTHORIZED)]
    #[case(Some("Bearer"), StatusCode::UNAUTHORIZED)]
    #[case(None, StatusCode::UNAUTHORIZED)]
    #[actix_web::test]
    async fn bearer_header_gates_access(
        #[case] header: Option<&'static str>,
        #[case] expected: StatusCode,
    ) {
        let id = AccountId::random();
        let app = actix_test::init_service(
            App::new()
                .app_data(state_accepting("good", id))
                .service(whoami),
        )
        .await;

        let mut request = actix_test::TestRequest::get().uri("/whoami");
        if let Some(value) = header {
            request = request.insert_header((AUTHORIZATION, value));
        }
        let response = actix_test::call_service(&app, request.to_request()).await;
        assert_eq!(response.status(), expected);
        if expected == StatusCode::OK {
            let body = actix_test::read_body(response).await;
            assert_eq!(body, id.to_string().as_bytes());
        }
    }
}
