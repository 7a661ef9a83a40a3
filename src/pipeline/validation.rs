//! Input validation: structural completeness and basic semantic checks.
//!
//! Pure function, no side effects. The three structured payloads
//! (stratigraphy, fluid/pressure profile, wellbore structure) are only
//! checked for presence; their inner shape belongs to the plotting tool.

use super::PipelineError;
use crate::types::{WellRecord, WellType};
use serde_json::Value;

/// Top-level keys every well record must carry.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "wellName",
    "totalDepth_m",
    "wellType",
    "stratigraphy",
    "drillingFluidAndPressure",
    "wellboreStructure",
];

/// Validate raw well data and convert it into a [`WellRecord`].
///
/// Every problem is reported, not just the first.
pub fn validate_well_data(data: &Value) -> Result<WellRecord, PipelineError> {
    let Some(obj) = data.as_object() else {
        return Err(PipelineError::Validation(vec![
            "well data must be a JSON object".to_string(),
        ]));
    };

    let mut errors: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|f| !obj.contains_key(**f))
        .map(|f| format!("missing required field '{f}'"))
        .collect();

    if let Some(name) = obj.get("wellName") {
        if !name.is_string() {
            errors.push("wellName must be a string".to_string());
        }
    }

    if let Some(kind) = obj.get("wellType") {
        if kind.as_str().and_then(WellType::parse).is_none() {
            errors.push(format!(
                "wellType must be '{}' or '{}', got {kind}",
                WellType::Straight,
                WellType::Horizontal
            ));
        }
    }

    if let Some(depth) = obj.get("totalDepth_m") {
        match depth.as_f64() {
            Some(d) if d.is_finite() && d > 0.0 => {}
            Some(d) => errors.push(format!("totalDepth_m must be greater than 0, got {d}")),
            None => errors.push(format!("totalDepth_m must be a number, got {depth}")),
        }
    }

    if !errors.is_empty() {
        return Err(PipelineError::Validation(errors));
    }

    serde_json::from_value(data.clone())
        .map_err(|e| PipelineError::Validation(vec![format!("malformed well data: {e}")]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "wellName": "顺北-1",
            "totalDepth_m": 3500,
            "wellType": "horizontal well",
            "stratigraphy": [{"name": "Q", "bottom_m": 120}],
            "drillingFluidAndPressure": [],
            "wellboreStructure": {"casings": []}
        })
    }

    fn reasons(data: &Value) -> Vec<String> {
        match validate_well_data(data) {
            Err(PipelineError::Validation(r)) => r,
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_accepts_valid_record() {
        let record = validate_well_data(&valid()).unwrap();
        assert_eq!(record.well_name, "顺北-1");
        assert_eq!(record.well_type, WellType::Horizontal);
        assert_eq!(record.total_depth_m, serde_json::Number::from(3500));
    }

    #[test]
    fn test_rejects_each_missing_field() {
        for field in REQUIRED_FIELDS {
            let mut data = valid();
            data.as_object_mut().unwrap().remove(field);
            let r = reasons(&data);
            assert!(r.iter().any(|m| m.contains(field)), "{field}: {r:?}");
        }
    }

    #[test]
    fn test_rejects_unknown_well_type() {
        let mut data = valid();
        data["wellType"] = json!("deviated well");
        assert_eq!(reasons(&data).len(), 1);

        data["wellType"] = json!(1);
        assert_eq!(reasons(&data).len(), 1);
    }

    #[test]
    fn test_depth_must_be_strictly_positive_number() {
        for bad in [json!(0), json!(0.0), json!(-10.5), json!("3500"), json!(null), json!(true)] {
            let mut data = valid();
            data["totalDepth_m"] = bad.clone();
            assert_eq!(reasons(&data).len(), 1, "depth {bad} should be rejected");
        }

        let mut data = valid();
        data["totalDepth_m"] = json!(0.001);
        assert!(validate_well_data(&data).is_ok());
    }

    #[test]
    fn test_opaque_payloads_not_inspected() {
        let mut data = valid();
        data["stratigraphy"] = json!("anything");
        data["wellboreStructure"] = json!(42);
        data["drillingFluidAndPressure"] = json!(null);
        assert!(validate_well_data(&data).is_ok());
    }

    #[test]
    fn test_non_object_rejected() {
        assert_eq!(reasons(&json!([1, 2, 3])).len(), 1);
    }

    #[test]
    fn test_reports_all_problems() {
        let data = json!({ "wellType": "vertical", "totalDepth_m": 0 });
        // four missing fields + bad type + bad depth
        assert_eq!(reasons(&data).len(), 6);
    }
}
