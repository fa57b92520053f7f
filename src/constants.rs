//! Constants used throughout the application
//!
//! This module centralizes endpoint paths, cookie and header names, and the
//! other fixed strings shared between the API client and the sagas.

// Backend endpoints
pub const JOBS_ENDPOINT: &str = "/api/workspace/jobs";
pub const DATAFILES_ENDPOINT: &str = "/api/datafiles";
pub const SYSTEMS_LIST_ENDPOINT: &str = "/api/datafiles/systems/list/";
pub const ALLOCATIONS_ENDPOINT: &str = "/api/users/allocations/";
pub const SYSTEM_KEYS_ENDPOINT: &str = "/api/accounts/systems";

// Session
pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const COOKIE_ENV_DEFAULT: &str = "PORTAL_COOKIE";

/// Payload of the single record placed in a jobs listing when the fetch failed.
pub const LIST_ERROR_SENTINEL: &str = "err!";

// Listing defaults
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const MAX_PAGE_SIZE: u32 = 1000;

// Data files
pub const SCHEME_PRIVATE: &str = "private";
pub const FORMAT_FOLDER: &str = "folder";
pub const INVALID_FILE_NAME_CHARS: [char; 4] = ['"', '\'', '/', '\\'];

// Config
pub const CONFIG_FILE_NAME: &str = "portal.toml";
pub const CONFIG_DIR_NAME: &str = "portal";
pub const CONFIG_GENERATED: &str = "✅ Configuration file generated";
pub const LOG_FILE_NAME: &str = "portal.log";
