/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// STORAGE
// =============================================================================

/// Upload directory used when `UPLOAD_DIR` is unset or blank
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Extensions accepted for upload when `ALLOWED_EXTENSIONS` is unset
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] =
    &["txt", "log", "csv", "json", "xlsx", "xls", "ods"];

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Stored role name for administrators; every other value is a standard user
pub const ROLE_ADMIN: &str = "ADMIN";
