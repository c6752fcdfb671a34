//! Names shared by producers and consumers.
//!
//! Topics, subscriptions and collections are addressed by name only, so both sides
//! of every pipeline must agree on these values.

/// Fields every grocery record must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 9] = [
    "productname",
    "price",
    "category",
    "weight",
    "brand",
    "itempackagequantity",
    "packageinformation",
    "manufacturer",
    "countryoforigin",
];

// Record store collections
pub const GROCERIES_COLLECTION: &str = "Groceries";
pub const BULK_DATA_COLLECTION: &str = "bulk_data";
pub const AUDIT_LOG_COLLECTION: &str = "Audit_Logs";

// Notification topics and subscriptions
pub const BULK_CREATE_TOPIC: &str = "Bulk_Create_Topic";
pub const BULK_CREATE_SUBSCRIPTION: &str = "Bulk_Create_Subscription";
pub const THUMBNAIL_TOPIC: &str = "Thumbnail_topic";
pub const THUMBNAIL_SUBSCRIPTION: &str = "Thumbnail_Subscription";
pub const AUDIT_TOPIC: &str = "Audit-Topic";
pub const AUDIT_SUBSCRIPTION: &str = "Audit_Subscription";

// Push endpoint paths, resolved against the public base URL
pub const BULK_CONSUMER_PATH: &str = "/api/downloadcsv";
pub const THUMBNAIL_CONSUMER_PATH: &str = "/api/thumbnail";
pub const AUDIT_CONSUMER_PATH: &str = "/api/auditlog";

// Artifact store key prefixes
pub const BULK_PREFIX: &str = "bulk";
pub const IMAGE_PREFIX: &str = "images";
pub const THUMBNAIL_PREFIX: &str = "thumbnails";

pub const THUMBNAIL_WIDTH: u32 = 200;
pub const THUMBNAIL_HEIGHT: u32 = 200;
pub const THUMBNAIL_JPEG_QUALITY: u8 = 75;

/// Page size for catalog listing.
pub const CATALOG_PAGE_SIZE: usize = 4;

/// Catalog ids are drawn from `0..=MAX_CATALOG_ID`.
pub const MAX_CATALOG_ID: i64 = 999_999;

/// Audit timestamps use a 12-hour clock, e.g. `2024-03-01 02:15:09 PM`.
pub const AUDIT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %I:%M:%S %p";
