use serde::{Deserialize, Serialize};

/// Red-light infraction with its license-plate detection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    #[serde(alias = "_id", default)]
    pub id: String,
    #[serde(rename = "car_ID")]
    pub car_id: String,
    #[serde(default)]
    pub plate_text: String,
    /// Base64 JPEG crop of the plate.
    #[serde(rename = "plate_detected", default)]
    pub plate_image: Option<String>,
}

impl Violation {
    pub fn plate_bytes(&self) -> Option<Vec<u8>> {
        use base64::Engine;
        let encoded = self.plate_image.as_deref()?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_mongo_style_id() {
        let json = r#"{"_id": "a1", "car_ID": "12", "plate_text": "KL-123", "plate_detected": null}"#;
        let violation: Violation = serde_json::from_str(json).unwrap();
        assert_eq!(violation.id, "a1");
        assert_eq!(violation.car_id, "12");
        assert!(violation.plate_bytes().is_none());
    }
}
