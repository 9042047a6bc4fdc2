/// Name of the YAML sidecar holding the current handle of an attachment.
pub const HANDLE_FILE_NAME: &str = "handle.yaml";

/// Hash algorithm used to address attachment content.
pub const HASH_ALGORITHM: &str = "sha256";
