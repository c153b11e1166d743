//! OpenAPI/Utoipa configuration.

use crate::api::{admin::ADMIN_TAG, health::MISC_TAG, status_page::STATUS_PAGE_TAG};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Security addon for OpenAPI documentation.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let bearer = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .description(Some("The `admin_token` from the server configuration."))
                .build();
            components.add_security_scheme("admin_token", SecurityScheme::Http(bearer));
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Status Page API",
        version = "1.0.0",
        description = "Public status pages, domain assignment and notification testing for an uptime monitor."
    ),
    tags(
        (name = MISC_TAG, description = "Miscellaneous endpoints"),
        (name = STATUS_PAGE_TAG, description = "Public status page data"),
        (name = ADMIN_TAG, description = "Administration endpoints")
    )
)]
pub struct ApiDoc;
