use crate::utils::error::{AdvisoryError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(AdvisoryError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(AdvisoryError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(AdvisoryError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AdvisoryError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN 不滿足任何比較，需另外排除
    if !(value >= min && value <= max) {
        return Err(AdvisoryError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 權重必須非負且總和為 1.0（容許浮點誤差）
pub fn validate_weights(field_name: &str, weights: &[f64]) -> Result<()> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(AdvisoryError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("{:?}", weights),
            reason: "Weights must be finite and non-negative".to_string(),
        });
    }

    let total: f64 = weights.iter().sum();
    if (total - 1.0).abs() > 1e-6 {
        return Err(AdvisoryError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("{:?}", weights),
            reason: format!("Weights must sum to 1.0 (got {:.4})", total),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output.output_path", "./reports").is_ok());
        assert!(validate_path("output.output_path", "").is_err());
        assert!(validate_path("output.output_path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("sampling.simulations", 100, 1).is_ok());
        assert!(validate_positive_number("sampling.simulations", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range_rejects_nan() {
        assert!(validate_range("confidence", 0.8, 0.0, 1.0).is_ok());
        assert!(validate_range("confidence", 1.2, 0.0, 1.0).is_err());
        assert!(validate_range("confidence", f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_validate_weights() {
        assert!(validate_weights("weights", &[0.4, 0.35, 0.25]).is_ok());
        assert!(validate_weights("weights", &[0.5, 0.6]).is_err());
        assert!(validate_weights("weights", &[1.5, -0.5]).is_err());
    }
}
