use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Administrative region code (kode wilayah)
    /// Digits, optionally dot-separated per level
    /// - Valid: "11", "1101", "11.01", "11.01.01.2001"
    /// - Invalid: "", "11.", ".11", "11..01", "A1"
    pub static ref KODE_WILAYAH_REGEX: Regex = Regex::new(r"^[0-9]+(?:\.[0-9]+)*$").unwrap();

    /// Report image URL, must be http or https
    pub static ref IMAGE_URL_REGEX: Regex = Regex::new(r"^https?://\S+$").unwrap();
}

/// Validator hook for `imageUrls` lists
pub fn validate_image_urls(urls: &[String]) -> Result<(), ValidationError> {
    if urls.iter().all(|url| IMAGE_URL_REGEX.is_match(url)) {
        Ok(())
    } else {
        let mut err = ValidationError::new("image_url");
        err.message = Some("Image URL must be http or https".into());
        Err(err)
    }
}

/// Validator hook for `[lng, lat]` coordinate pairs
pub fn validate_coordinates(coordinates: &[f64]) -> Result<(), ValidationError> {
    match coordinates {
        [lng, lat] if (-180.0..=180.0).contains(lng) && (-90.0..=90.0).contains(lat) => Ok(()),
        _ => {
            let mut err = ValidationError::new("coordinates");
            err.message = Some("Coordinates must be [longitude, latitude]".into());
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kode_wilayah_regex_valid() {
        assert!(KODE_WILAYAH_REGEX.is_match("11"));
        assert!(KODE_WILAYAH_REGEX.is_match("1101"));
        assert!(KODE_WILAYAH_REGEX.is_match("11.01"));
        assert!(KODE_WILAYAH_REGEX.is_match("11.01.01.2001"));
    }

    #[test]
    fn test_kode_wilayah_regex_invalid() {
        assert!(!KODE_WILAYAH_REGEX.is_match(""));
        assert!(!KODE_WILAYAH_REGEX.is_match("11."));
        assert!(!KODE_WILAYAH_REGEX.is_match(".11"));
        assert!(!KODE_WILAYAH_REGEX.is_match("11..01"));
        assert!(!KODE_WILAYAH_REGEX.is_match("A1"));
    }

    #[test]
    fn test_image_urls() {
        assert!(validate_image_urls(&["https://example.com/a.jpg".to_string()]).is_ok());
        assert!(validate_image_urls(&[]).is_ok());
        assert!(validate_image_urls(&["ftp://example.com/a.jpg".to_string()]).is_err());
        assert!(validate_image_urls(&["not a url".to_string()]).is_err());
    }

    #[test]
    fn test_coordinates() {
        assert!(validate_coordinates(&[98.67, 3.59]).is_ok());
        assert!(validate_coordinates(&[98.67]).is_err());
        assert!(validate_coordinates(&[3.59, 98.67, 0.0]).is_err());
        assert!(validate_coordinates(&[181.0, 3.59]).is_err());
    }
}
