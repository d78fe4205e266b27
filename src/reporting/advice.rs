use crate::db::models::detection::{BinType, DetectedItem};

/// One line per bin category present in the scan, falling back to general waste.
pub fn recommendations(items: &[DetectedItem]) -> Vec<String> {
    let count = |bin_type: BinType| items.iter().filter(|i| i.bin_type == bin_type).count();
    let mut lines = Vec::new();

    let recyclable = count(BinType::Recycling);
    if recyclable > 0 {
        lines.push(format!(
            "Great! {recyclable} items can be recycled. Look for blue recycling bins."
        ));
    }
    if count(BinType::Hazardous) > 0 {
        lines.push(String::from(
            "Some items require special disposal. Find hazardous waste collection points.",
        ));
    }
    if count(BinType::Organic) > 0 {
        lines.push(String::from(
            "Organic waste detected. Use green compost bins if available.",
        ));
    }
    if lines.is_empty() {
        lines.push(String::from("Items can be disposed of in general waste bins."));
    }

    lines
}

/// Points offered for a scan, bucketed on the confidence of the first recyclable item.
pub fn suggested_points(items: &[DetectedItem]) -> i64 {
    let Some(item) = items.iter().find(|i| i.bin_type == BinType::Recycling) else {
        return 0;
    };

    match item.confidence {
        c if c >= 0.95 => 20,
        c if c >= 0.85 => 15,
        c if c >= 0.60 => 10,
        _ => 5,
    }
}
