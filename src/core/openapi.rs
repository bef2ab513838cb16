use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Files
        files_handlers::upload_file,
        files_handlers::list_files,
        files_handlers::get_file,
        files_handlers::list_messages,
        files_handlers::delete_file,
    ),
    components(
        schemas(
            // Shared
            Meta,
            ApiResponse<String>,
            // Auth
            auth::model::AuthenticatedUser,
            // Files
            files_dtos::UploadFileDto,
            files_dtos::FileRecordSummaryDto,
            files_dtos::MessageDto,
            ApiResponse<files_dtos::FileRecordSummaryDto>,
            ApiResponse<Vec<files_dtos::FileRecordSummaryDto>>,
            ApiResponse<Vec<files_dtos::MessageDto>>,
        )
    ),
    tags(
        (name = "files", description = "File upload, processing results and management"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "File Processor API",
        version = "0.1.0",
        description = "Upload text, CSV, JSON and spreadsheet files and read the messages extracted from them",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_file_routes() {
        let mut openapi = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Files".to_string(),
            version: "1.2.3".to_string(),
            description: "test".to_string(),
        }
        .modify(&mut openapi);

        assert_eq!(openapi.info.title, "Files");
        assert!(openapi.paths.paths.contains_key("/api/files/upload"));
        assert!(openapi.paths.paths.contains_key("/api/files/{id}/messages"));

        let components = openapi.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
