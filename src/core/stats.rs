//! 小型統計工具：平均、樣本標準差、百分位索引。

/// 空集合回傳 0.0
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 樣本標準差（n - 1），少於兩筆時回傳 0.0
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// 已排序資料在百分位 `p` 的值，索引為 `floor(len * p)`，超出範圍時取邊界
pub fn percentile_of_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let idx = (sorted.len() as f64 * p).floor();
    if idx < 0.0 {
        return sorted.first().copied();
    }
    let idx = idx as usize;
    if idx < sorted.len() {
        Some(sorted[idx])
    } else {
        sorted.last().copied()
    }
}

/// 除數為 0 時回傳 `fallback`
pub fn safe_ratio(numerator: f64, denominator: f64, fallback: f64) -> f64 {
    if denominator != 0.0 {
        numerator / denominator
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std_dev() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0, 6.0]), 4.0);
        assert_eq!(sample_std_dev(&[5.0]), 0.0);
        assert!((sample_std_dev(&[2.0, 4.0, 6.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_index_is_floored_and_clamped() {
        let sorted: Vec<f64> = (0..100).map(|v| v as f64).collect();
        assert_eq!(percentile_of_sorted(&sorted, 0.1), Some(10.0));
        assert_eq!(percentile_of_sorted(&sorted, 0.9), Some(90.0));
        assert_eq!(percentile_of_sorted(&sorted, 1.0), Some(99.0));
        assert_eq!(percentile_of_sorted(&[], 0.5), None);
    }

    #[test]
    fn test_safe_ratio() {
        assert_eq!(safe_ratio(10.0, 4.0, 0.0), 2.5);
        assert_eq!(safe_ratio(10.0, 0.0, 0.0), 0.0);
        assert!(safe_ratio(10.0, 0.0, f64::INFINITY).is_infinite());
    }
}
