//! Object naming for staged artifacts.
//!
//! Every name carries a time component so re-uploading the same file never
//! overwrites an earlier artifact.

use chrono::{DateTime, Utc};
use pantry_core::constants::{BULK_PREFIX, IMAGE_PREFIX, THUMBNAIL_PREFIX};

/// `bulk/{%Y%m%d%H%M%S%f}_{filename}`, with the timestamp in UTC.
pub fn bulk_key(filename: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}/{}_{}",
        BULK_PREFIX,
        now.format("%Y%m%d%H%M%S%f"),
        sanitize_filename(filename)
    )
}

/// `images/{unix_nanos}_{filename}` with spaces replaced by underscores.
pub fn image_key(filename: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}/{}_{}",
        IMAGE_PREFIX,
        unix_nanos(now),
        sanitize_filename(filename).replace(' ', "_")
    )
}

/// `thumbnails/{unix_nanos}_thumbnail_{id}`.
pub fn thumbnail_key(id: i64, now: DateTime<Utc>) -> String {
    format!("{}/{}_thumbnail_{}", THUMBNAIL_PREFIX, unix_nanos(now), id)
}

fn unix_nanos(now: DateTime<Utc>) -> i64 {
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros() * 1000)
}

/// Keep only the final path component of a client-supplied filename.
///
/// `?`, `#` and `%` become `_` so the key survives the trip through its URL.
fn sanitize_filename(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .replace("..", "_")
        .replace(['?', '#', '%'], "_");
    if name.is_empty() {
        "upload".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 14, 5, 9).unwrap() + chrono::Duration::nanoseconds(42)
    }

    #[test]
    fn bulk_key_carries_utc_timestamp_and_filename() {
        assert_eq!(
            bulk_key("groceries.csv", fixed_time()),
            "bulk/20240301140509000000042_groceries.csv"
        );
    }

    #[test]
    fn image_key_replaces_spaces() {
        let key = image_key("red apple.png", fixed_time());
        assert!(key.starts_with("images/"));
        assert!(key.ends_with("_red_apple.png"));
    }

    #[test]
    fn thumbnail_key_embeds_id() {
        let key = thumbnail_key(123456, fixed_time());
        assert_eq!(key, "thumbnails/1709301909000000042_thumbnail_123456");
    }

    #[test]
    fn client_paths_are_stripped() {
        assert_eq!(
            bulk_key("../../etc/passwd", fixed_time()),
            "bulk/20240301140509000000042_passwd"
        );
        assert!(!image_key("", fixed_time()).ends_with('_'));
    }

    #[test]
    fn url_delimiters_in_filenames_are_replaced() {
        assert_eq!(
            bulk_key("groceries#2024?v=1%.csv", fixed_time()),
            "bulk/20240301140509000000042_groceries_2024_v=1_.csv"
        );
        assert!(image_key("a#b.png", fixed_time()).ends_with("_a_b.png"));
    }
}
