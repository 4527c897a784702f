//! 關鍵字比對：以小寫子字串計算出現的詞彙數。

/// `terms` 中有幾個出現在 `text`（不分大小寫）
pub fn count_matches(text: &str, terms: &[&str]) -> usize {
    let lower = text.to_lowercase();
    terms
        .iter()
        .filter(|term| lower.contains(&term.to_lowercase()))
        .count()
}

pub fn mentions_any(text: &str, terms: &[&str]) -> bool {
    count_matches(text, terms) > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_distinct_terms_case_insensitively() {
        assert_eq!(count_matches("Great ROI, great team", &["great", "roi", "risk"]), 2);
        assert!(mentions_any("Quarterly REVENUE", &["revenue"]));
        assert!(!mentions_any("", &["revenue"]));
    }
}
