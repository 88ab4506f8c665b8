//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer together
//! with the request and response schemas and the bearer token security
//! scheme. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::identity::ExistenceCheck;
use crate::domain::{AccountView, Error, ErrorCode, IdentifierKind};
use crate::inbound::http::accounts::{AuthResponse, LoginBody, ProfileBody, RegisterBody};
use crate::inbound::http::health::PingResponse;

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Token returned by POST /api/auth/register or POST /api/auth/login.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Forum backend API",
        description = "Account registration, sign-in and profile completion for the forum."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::exists,
        crate::inbound::http::accounts::me,
        crate::inbound::http::accounts::complete_profile,
        crate::inbound::http::health::ping,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        RegisterBody,
        LoginBody,
        ProfileBody,
        AuthResponse,
        AccountView,
        ExistenceCheck,
        IdentifierKind,
        PingResponse,
        Error,
        ErrorCode
    )),
    tags(
        (name = "auth", description = "Registration, sign-in and identifier lookup"),
        (name = "profile", description = "Profile completion"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::schema::Schema;
    use utoipa::openapi::RefOr;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "message")]
    #[case("AccountView", "displayName")]
    #[case("AccountView", "profileComplete")]
    #[case("AuthResponse", "token")]
    #[case("ExistenceCheck", "field")]
    fn schemas_expose_wire_fields(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let found = schemas.get(schema).expect("schema registered");
        assert_object_schema_has_field(found, field);
    }

    #[rstest]
    #[case("/api/auth/register")]
    #[case("/api/auth/login")]
    #[case("/api/auth/exists")]
    #[case("/api/auth/me")]
    #[case("/api/profile")]
    #[case("/ping")]
    fn paths_are_registered(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerToken"));
    }
}
