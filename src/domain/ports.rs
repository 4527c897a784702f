use crate::domain::model::AnalysisKind;
use crate::utils::error::Result;
use serde::Serialize;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    /// 未設定時使用系統熵
    fn seed(&self) -> Option<u64>;
    fn simulations(&self) -> usize;
    /// 缺少評分元件時直接報錯而非補中性分數
    fn strict_scoring(&self) -> bool;
}

/// 可匯出為 JSON 的分析報告
pub trait Report: Serialize {
    fn kind(&self) -> AnalysisKind;

    /// 匯出檔名前綴（不含時間戳與副檔名）
    fn export_stem(&self) -> String;

    /// 主控台顯示用的摘要
    fn summary(&self) -> Vec<String>;

    /// 附帶的 CSV 表格（如預算儀表板），預設沒有
    fn csv_export(&self) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}
