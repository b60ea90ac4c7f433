use std::time::Duration;

/// Path of the transaction init endpoint, relative to the service host.
pub const INIT_UPLOAD_PATH: &str = "/upload/init";

/// Path of the transaction commit endpoint, relative to the service host.
pub const COMMIT_UPLOAD_PATH: &str = "/upload/commit";

/// Default timeout for metadata calls (init and commit).
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for a single artifact upload.
///
/// Application archives routinely run to several hundred megabytes, so
/// this is deliberately generous compared to [`METADATA_TIMEOUT`].
pub const TRANSFER_TIMEOUT: Duration = Duration::from_secs(900);

/// Maximum number of characters of a response body kept for diagnostics.
pub const ERROR_BODY_LIMIT: usize = 500;

/// Joins the service host and an endpoint path, tolerating a trailing `/`
/// on the host.
pub fn endpoint_url(host: &str, path: &str) -> String {
    format!("{}{}", host.trim_end_matches('/'), path)
}
