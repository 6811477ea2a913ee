//! Range checks applied at the input boundary, before a request reaches the
//! pipeline. Bounds are inclusive.
use serde::{Deserialize, Serialize};

use crate::error::{PredictionError, Result};
use crate::features::PredictionRequest;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RequestLimits {
    pub age_min: u32,
    pub age_max: u32,
    pub admission_grade_min: f64,
    pub admission_grade_max: f64,
    pub max_curricular_units: u32,
}

impl Default for RequestLimits {
    fn default() -> Self {
        RequestLimits {
            age_min: 15,
            age_max: 70,
            admission_grade_min: 0.0,
            admission_grade_max: 20.0,
            max_curricular_units: 20,
        }
    }
}

impl RequestLimits {
    pub fn validate(&self, request: &PredictionRequest) -> Result<()> {
        let age = request.age_at_enrollment;
        if age < self.age_min || age > self.age_max {
            return Err(out_of_range("age_at_enrollment", age, self.age_min, self.age_max));
        }

        let grade = request.admission_grade;
        if !grade.is_finite() || grade < self.admission_grade_min || grade > self.admission_grade_max {
            return Err(out_of_range(
                "admission_grade",
                grade,
                self.admission_grade_min,
                self.admission_grade_max,
            ));
        }

        let units = request.curricular_units_enrolled;
        if units == 0 || units > self.max_curricular_units {
            return Err(out_of_range(
                "curricular_units_enrolled",
                units,
                1,
                self.max_curricular_units,
            ));
        }
        Ok(())
    }
}

fn out_of_range<V, B>(field: &'static str, value: V, min: B, max: B) -> PredictionError
where
    V: ToString,
    B: ToString,
{
    PredictionError::OutOfRange {
        field,
        value: value.to_string(),
        min: min.to_string(),
        max: max.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn request(age: u32, grade: f64, units: u32) -> PredictionRequest {
        PredictionRequest::new("single", age, grade, units, "female")
    }

    #[test]
    fn age_bounds_are_inclusive() {
        let limits = RequestLimits::default();
        assert!(limits.validate(&request(15, 14.5, 6)).is_ok());
        assert!(limits.validate(&request(70, 14.5, 6)).is_ok());

        for age in [14, 71] {
            let err = limits.validate(&request(age, 14.5, 6)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
            match err {
                PredictionError::OutOfRange { field, .. } => assert_eq!(field, "age_at_enrollment"),
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn admission_grade_bounds() {
        let limits = RequestLimits::default();
        assert!(limits.validate(&request(20, 0.0, 6)).is_ok());
        assert!(limits.validate(&request(20, 20.0, 6)).is_ok());
        assert!(limits.validate(&request(20, 20.1, 6)).is_err());
        assert!(limits.validate(&request(20, -0.1, 6)).is_err());
        assert!(limits.validate(&request(20, f64::NAN, 6)).is_err());
    }

    #[test]
    fn curricular_units_must_be_positive_and_bounded() {
        let limits = RequestLimits {
            max_curricular_units: 15,
            ..RequestLimits::default()
        };
        assert!(limits.validate(&request(20, 14.5, 1)).is_ok());
        assert!(limits.validate(&request(20, 14.5, 15)).is_ok());
        assert!(limits.validate(&request(20, 14.5, 0)).is_err());
        assert!(limits.validate(&request(20, 14.5, 16)).is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let limits: RequestLimits = serde_json::from_str(r#"{"max_curricular_units": 15}"#).unwrap();
        assert_eq!(limits.max_curricular_units, 15);
        assert_eq!(limits.age_min, 15);
        assert_eq!(limits.age_max, 70);
    }
}
