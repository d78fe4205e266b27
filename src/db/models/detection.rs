use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use super::user::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinType {
    General,
    Recycling,
    Organic,
    Hazardous,
}

/// One classified object in a scanned image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedItem {
    pub item: String,
    pub confidence: f64,
    pub disposal_method: String,
    pub bin_type: BinType,
}

impl DetectedItem {
    /// Stand-in result whenever the vision model can't give us anything usable.
    pub fn unknown() -> Self {
        Self {
            item: String::from("Unknown Item"),
            confidence: 0.5,
            disposal_method: String::from("General Waste"),
            bin_type: BinType::General,
        }
    }
}

/// Base waste_detections table model
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WasteDetection {
    pub id: i64,
    pub user_id: UserId,
    pub image_path: String,
    pub detected_items: Json<Vec<DetectedItem>>,
    pub confidence_scores: Json<BTreeMap<String, f64>>,
    pub disposal_recommendations: Json<Vec<String>>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewDetection {
    pub user_id: UserId,
    pub image_path: String,
    pub detected_items: Vec<DetectedItem>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
}

impl NewDetection {
    pub fn confidence_scores(&self) -> BTreeMap<String, f64> {
        self.detected_items
            .iter()
            .map(|item| (item.item.clone(), item.confidence))
            .collect()
    }

    pub fn disposal_methods(&self) -> Vec<String> {
        self.detected_items
            .iter()
            .map(|item| item.disposal_method.clone())
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bin_type_wire_names() {
        let item: DetectedItem = serde_json::from_str(
            r#"{"item":"Plastic Bottle","confidence":0.92,"disposal_method":"Recycling","bin_type":"recycling"}"#,
        )
        .unwrap();

        assert_eq!(item.bin_type, BinType::Recycling);
        assert!(serde_json::from_str::<BinType>(r#""landfill""#).is_err());
    }

    #[test]
    fn test_new_detection_derived_columns() {
        let detection = NewDetection {
            user_id: UserId(3),
            image_path: String::from("uploads/x.jpg"),
            detected_items: vec![
                DetectedItem {
                    item: String::from("Can"),
                    confidence: 0.9,
                    disposal_method: String::from("Recycling"),
                    bin_type: BinType::Recycling,
                },
                DetectedItem::unknown(),
            ],
            location_lat: None,
            location_lng: None,
        };

        assert_eq!(detection.confidence_scores().get("Can"), Some(&0.9));
        assert_eq!(
            detection.disposal_methods(),
            vec!["Recycling".to_string(), "General Waste".to_string()]
        );
    }
}
