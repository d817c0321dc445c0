//! U.S. Navy circumference method.
//!
//! The published constants are defined for inches, so measurements are
//! converted from centimeters on entry and all arithmetic happens in inches.

use crate::{
    models::{Gender, MeasurementRecord},
    units::{cm_to_inches, round_to_tenth},
};

mod male {
    pub const DIFF_COEF: f64 = 86.010;
    pub const HEIGHT_COEF: f64 = 70.041;
    pub const OFFSET: f64 = 36.76;
}

mod female {
    pub const SUM_COEF: f64 = 163.205;
    pub const HEIGHT_COEF: f64 = 97.684;
    pub const OFFSET: f64 = 78.387;
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| is_positive(*v))
}

fn finite_tenth(value: f64) -> Option<f64> {
    value.is_finite().then(|| round_to_tenth(value))
}

/// Body fat percentage for men.
///
/// ```text
/// BF% = 86.010 × log10(abdomen − neck) − 70.041 × log10(height) + 36.76   (inches)
/// ```
///
/// Returns None when height is not positive or abdomen ≤ neck, since the
/// logarithm is undefined there.
pub fn body_fat_percent_male(height_cm: f64, abdomen_cm: f64, neck_cm: f64) -> Option<f64> {
    let height_in = cm_to_inches(height_cm);
    let diff = cm_to_inches(abdomen_cm) - cm_to_inches(neck_cm);
    if !is_positive(height_in) || !is_positive(diff) {
        return None;
    }

    let bf = male::DIFF_COEF * diff.log10() - male::HEIGHT_COEF * height_in.log10() + male::OFFSET;
    finite_tenth(bf)
}

/// Body fat percentage for women.
///
/// ```text
/// BF% = 163.205 × log10(waist + hip − neck) − 97.684 × log10(height) − 78.387   (inches)
/// ```
///
/// Returns None when height is not positive or waist + hip ≤ neck.
pub fn body_fat_percent_female(
    height_cm: f64,
    waist_cm: f64,
    hip_cm: f64,
    neck_cm: f64,
) -> Option<f64> {
    let height_in = cm_to_inches(height_cm);
    let sum = cm_to_inches(waist_cm) + cm_to_inches(hip_cm) - cm_to_inches(neck_cm);
    if !is_positive(height_in) || !is_positive(sum) {
        return None;
    }

    let bf = female::SUM_COEF * sum.log10() - female::HEIGHT_COEF * height_in.log10()
        - female::OFFSET;
    finite_tenth(bf)
}

/// Body fat percentage for a record, picking the formula by gender.
///
/// Every field the chosen formula needs must be present, finite and
/// strictly positive; otherwise there is no result.
pub fn body_fat_percent(record: &MeasurementRecord) -> Option<f64> {
    let height = positive(record.height_cm)?;
    let neck = positive(record.neck_cm)?;

    match record.gender {
        Gender::Male => {
            let abdomen = positive(record.abdomen_cm)?;
            body_fat_percent_male(height, abdomen, neck)
        }
        Gender::Female => {
            let waist = positive(record.waist_cm)?;
            let hip = positive(record.hip_cm)?;
            body_fat_percent_female(height, waist, hip, neck)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_one_decimal(value: f64) -> bool {
        ((value * 10.0).round() - value * 10.0).abs() < 1e-9
    }

    fn male_record(height: f64, abdomen: f64, neck: f64) -> MeasurementRecord {
        MeasurementRecord {
            height_cm: Some(height),
            abdomen_cm: Some(abdomen),
            neck_cm: Some(neck),
            ..MeasurementRecord::new(Gender::Male)
        }
    }

    fn female_record(height: f64, waist: f64, hip: f64, neck: f64) -> MeasurementRecord {
        MeasurementRecord {
            height_cm: Some(height),
            waist_cm: Some(waist),
            hip_cm: Some(hip),
            neck_cm: Some(neck),
            ..MeasurementRecord::new(Gender::Female)
        }
    }

    #[test]
    fn test_male_reference_value() {
        // 86.010×log10(52/2.54) − 70.041×log10(180/2.54) + 36.76 = 19.927...
        assert_eq!(body_fat_percent_male(180.0, 90.0, 38.0), Some(19.9));
        assert_eq!(body_fat_percent_male(175.0, 85.0, 37.0), Some(17.8));
    }

    #[test]
    fn test_female_reference_value() {
        // 163.205×log10(137/2.54) − 97.684×log10(165/2.54) − 78.387 = 27.198...
        assert_eq!(body_fat_percent_female(165.0, 75.0, 95.0, 33.0), Some(27.2));
    }

    #[test]
    fn test_male_results_are_rounded_to_one_decimal() {
        for height in [150.0, 165.5, 180.0, 201.3] {
            for abdomen in [70.0, 84.4, 99.9, 130.0] {
                for neck in [30.0, 37.7, 45.0] {
                    let bf = body_fat_percent_male(height, abdomen, neck)
                        .expect("abdomen above neck is valid");
                    assert!(bf.is_finite());
                    assert!(has_one_decimal(bf), "{bf} has more than one decimal");
                }
            }
        }
    }

    #[test]
    fn test_male_abdomen_not_above_neck_is_undefined() {
        assert_eq!(body_fat_percent_male(180.0, 38.0, 38.0), None);
        assert_eq!(body_fat_percent_male(180.0, 30.0, 38.0), None);
    }

    #[test]
    fn test_non_positive_height_is_undefined() {
        assert_eq!(body_fat_percent_male(0.0, 90.0, 38.0), None);
        assert_eq!(body_fat_percent_male(-170.0, 90.0, 38.0), None);
        assert_eq!(body_fat_percent_female(0.0, 75.0, 95.0, 33.0), None);
    }

    #[test]
    fn test_non_finite_inputs_are_trapped() {
        assert_eq!(body_fat_percent_male(f64::NAN, 90.0, 38.0), None);
        assert_eq!(body_fat_percent_male(180.0, f64::INFINITY, 38.0), None);
        assert_eq!(body_fat_percent_female(165.0, 75.0, f64::INFINITY, 33.0), None);
    }

    #[test]
    fn test_female_sum_not_positive_is_undefined() {
        assert_eq!(body_fat_percent_female(165.0, 10.0, 10.0, 20.0), None);
        assert_eq!(body_fat_percent_female(165.0, 10.0, 10.0, 25.0), None);
    }

    #[test]
    fn test_dispatch_uses_gender_specific_fields() {
        assert_eq!(body_fat_percent(&male_record(180.0, 90.0, 38.0)), Some(19.9));
        assert_eq!(
            body_fat_percent(&female_record(165.0, 75.0, 95.0, 33.0)),
            Some(27.2)
        );

        // Female fields are ignored for men and vice versa.
        let mut record = female_record(165.0, 75.0, 95.0, 33.0);
        record.abdomen_cm = Some(90.0);
        record.gender = Gender::Male;
        assert_eq!(body_fat_percent(&record), body_fat_percent_male(165.0, 90.0, 33.0));
    }

    #[test]
    fn test_female_missing_hip_is_undefined() {
        let mut record = female_record(165.0, 75.0, 95.0, 33.0);
        record.hip_cm = None;
        assert_eq!(body_fat_percent(&record), None);
    }

    #[test]
    fn test_missing_or_invalid_shared_fields_are_undefined() {
        let mut record = male_record(180.0, 90.0, 38.0);
        record.neck_cm = None;
        assert_eq!(body_fat_percent(&record), None);

        let mut record = male_record(180.0, 90.0, 38.0);
        record.height_cm = Some(0.0);
        assert_eq!(body_fat_percent(&record), None);

        let mut record = male_record(180.0, 90.0, 38.0);
        record.abdomen_cm = Some(-90.0);
        assert_eq!(body_fat_percent(&record), None);

        let mut record = male_record(180.0, 90.0, 38.0);
        record.neck_cm = Some(f64::NAN);
        assert_eq!(body_fat_percent(&record), None);
    }

    #[test]
    fn test_age_never_changes_the_formula() {
        let mut record = male_record(180.0, 90.0, 38.0);
        let without_age = body_fat_percent(&record);
        record.age = Some(55);
        assert_eq!(body_fat_percent(&record), without_age);
    }
}
