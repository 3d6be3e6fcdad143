/// Application name
pub const APP_NAME: &str = "Vigil";

/// Prefix for human-presentable complaint identifiers
pub const COMPLAINT_ID_PREFIX: &str = "CR-";

/// Number of random characters after the prefix
pub const COMPLAINT_ID_LEN: usize = 6;

/// Alphabet for generated identifiers (uppercase alphanumerics)
pub const COMPLAINT_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Maximum raw size for the two complaint-creation documents in bytes.
/// Inline attachments live inside the record, and the store caps record
/// size around 1 MB total.
pub const MAX_DOCUMENT_BYTES: usize = 500_000;

/// Maximum raw size for a chat attachment in bytes (2 MB)
pub const MAX_CHAT_ATTACHMENT_BYTES: usize = 2_000_000;

/// Name of the collection that holds every complaint record
pub const COMPLAINTS_COLLECTION: &str = "complaints";

/// Quiet window for coalescing collection deliveries into one heatmap
/// re-render, in milliseconds
pub const HEATMAP_DEBOUNCE_MS: u64 = 200;

/// Default map center (latitude, longitude)
pub const DEFAULT_MAP_CENTER: (f64, f64) = (20.5937, 78.9629);

/// Default map zoom level
pub const DEFAULT_MAP_ZOOM: u8 = 5;
