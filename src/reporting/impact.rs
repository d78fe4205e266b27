use serde::Serialize;

use crate::constants::{CO2_PER_RECYCLED_ITEM, CONFIDENCE_SCORE_WEIGHT, YEARLY_PROJECTION_FACTOR};
use crate::db::models::detection::{BinType, DetectedItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Material {
    Plastic,
    Paper,
    Metal,
    Glass,
}

impl Material {
    /// First match wins, so "plastic can" counts as plastic.
    fn classify(item_name: &str) -> Option<Self> {
        let name = item_name.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| name.contains(n));

        if has(&["plastic", "bottle"]) {
            Some(Material::Plastic)
        } else if has(&["paper", "cardboard"]) {
            Some(Material::Paper)
        } else if has(&["metal", "can"]) {
            Some(Material::Metal)
        } else if has(&["glass"]) {
            Some(Material::Glass)
        } else {
            None
        }
    }
}

/// Lifetime impact across every scanned item.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnvironmentalImpact {
    pub co2_saved: f64,
    pub total_recycled: i64,
    pub environmental_score: f64,
    pub plastic_items: i64,
    pub paper_items: i64,
    pub metal_items: i64,
    pub glass_items: i64,
}

impl EnvironmentalImpact {
    pub fn tally<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a DetectedItem>,
    {
        let mut impact = Self::default();
        for item in items {
            if item.bin_type == BinType::Recycling {
                impact.total_recycled += 1;
                impact.co2_saved += CO2_PER_RECYCLED_ITEM;

                match Material::classify(&item.item) {
                    Some(Material::Plastic) => impact.plastic_items += 1,
                    Some(Material::Paper) => impact.paper_items += 1,
                    Some(Material::Metal) => impact.metal_items += 1,
                    Some(Material::Glass) => impact.glass_items += 1,
                    None => (),
                }
            }

            impact.environmental_score += item.confidence * CONFIDENCE_SCORE_WEIGHT;
        }

        impact
    }

    pub fn into_report(self) -> ImpactReport {
        ImpactReport {
            breakdown: MaterialBreakdown {
                plastic_recycled: self.plastic_items,
                paper_recycled: self.paper_items,
                metal_recycled: self.metal_items,
                glass_recycled: self.glass_items,
            },
            yearly_projection: YearlyProjection {
                co2_saved: self.co2_saved * YEARLY_PROJECTION_FACTOR,
                items_recycled: self.total_recycled * YEARLY_PROJECTION_FACTOR as i64,
                environmental_score: self.environmental_score * YEARLY_PROJECTION_FACTOR,
            },
            impact: self,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactReport {
    #[serde(flatten)]
    pub impact: EnvironmentalImpact,
    pub breakdown: MaterialBreakdown,
    pub yearly_projection: YearlyProjection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialBreakdown {
    pub plastic_recycled: i64,
    pub paper_recycled: i64,
    pub metal_recycled: i64,
    pub glass_recycled: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyProjection {
    pub co2_saved: f64,
    pub items_recycled: i64,
    pub environmental_score: f64,
}

/// Impact of a single scan, returned with the detection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanImpact {
    pub co2_saved: f64,
    pub recycling_potential: i64,
    pub environmental_score: f64,
}

impl ScanImpact {
    pub fn of(items: &[DetectedItem]) -> Self {
        let mut impact = Self::default();
        for item in items {
            if item.bin_type == BinType::Recycling {
                impact.co2_saved += CO2_PER_RECYCLED_ITEM;
                impact.recycling_potential += 1;
            }
            impact.environmental_score += item.confidence * CONFIDENCE_SCORE_WEIGHT;
        }

        impact
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn item(name: &str, confidence: f64, bin_type: BinType) -> DetectedItem {
        DetectedItem {
            item: name.to_string(),
            confidence,
            disposal_method: String::from("Recycling"),
            bin_type,
        }
    }

    #[test]
    fn test_material_classification() {
        assert_eq!(Material::classify("Plastic Bottle"), Some(Material::Plastic));
        assert_eq!(Material::classify("Water BOTTLE"), Some(Material::Plastic));
        assert_eq!(Material::classify("Cardboard box"), Some(Material::Paper));
        assert_eq!(Material::classify("Soda Can"), Some(Material::Metal));
        assert_eq!(Material::classify("Glass jar"), Some(Material::Glass));
        assert_eq!(Material::classify("Plastic can"), Some(Material::Plastic));
        assert_eq!(Material::classify("Banana peel"), None);
    }

    #[test]
    fn test_tally_counts_only_recycling_but_scores_everything() {
        let items = vec![
            item("Plastic Bottle", 0.9, BinType::Recycling),
            item("Newspaper", 0.5, BinType::Recycling),
            item("Banana peel", 0.8, BinType::Organic),
            item("Glass bottle shard", 0.2, BinType::Hazardous),
        ];

        let impact = EnvironmentalImpact::tally(&items);
        assert_eq!(impact.total_recycled, 2);
        assert_eq!(impact.co2_saved, 1.0);
        assert_eq!(impact.plastic_items, 1);
        assert_eq!(impact.paper_items, 1);
        assert_eq!(impact.glass_items, 0);
        assert!((impact.environmental_score - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_projection_and_flattening() {
        let items = vec![item("Tin can", 1.0, BinType::Recycling)];
        let report = EnvironmentalImpact::tally(&items).into_report();

        assert_eq!(report.breakdown.metal_recycled, 1);
        assert_eq!(report.yearly_projection.items_recycled, 12);
        assert_eq!(report.yearly_projection.co2_saved, 6.0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_recycled"], 1);
        assert_eq!(json["breakdown"]["metal_recycled"], 1);
    }

    #[test]
    fn test_scan_impact() {
        let impact = ScanImpact::of(&[
            item("Can", 0.5, BinType::Recycling),
            DetectedItem::unknown(),
        ]);

        assert_eq!(impact.recycling_potential, 1);
        assert_eq!(impact.co2_saved, 0.5);
        assert!((impact.environmental_score - 10.0).abs() < 1e-9);
    }
}
