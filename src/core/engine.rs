use crate::analysis::customer_insight::synthesize_insights;
use crate::analysis::{
    AnalysisInputs, BenchmarkAnalyzer, BudgetOptimizer, CostBenefitAssessor, DueDiligenceAnalyzer,
    ForecastAnalyzer, TransformationPlanner,
};
use crate::core::sampler::rng_from_seed;
use crate::core::scoring::MissingComponentPolicy;
use crate::domain::model::{AnalysisKind, AnalysisOutcome, ExportEnvelope};
use crate::domain::ports::{ConfigProvider, Report, Storage};
use crate::utils::error::{AdvisoryError, Result};
use chrono::{DateTime, Local};
use rand::rngs::StdRng;

/// 將報告寫成 `<stem>_<YYYYmmdd_HHMMSS>.json`，有表格時另寫同名 CSV
pub struct ReportExporter<S: Storage> {
    storage: S,
}

impl<S: Storage> ReportExporter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn file_name(stem: &str, at: &DateTime<Local>, extension: &str) -> String {
        format!("{}_{}.{}", stem, at.format("%Y%m%d_%H%M%S"), extension)
    }

    /// 回傳寫入的檔名（相對於 storage 根目錄）
    pub fn export<R: Report>(&self, report: &R, at: DateTime<Local>) -> Result<Vec<String>> {
        let stem = report.export_stem();
        let envelope = ExportEnvelope {
            analysis_date: at.to_rfc3339(),
            report,
        };

        let json_name = Self::file_name(&stem, &at, "json");
        let json = serde_json::to_string_pretty(&envelope)?;
        self.storage.write_file(&json_name, json.as_bytes())?;
        tracing::debug!("Wrote {} ({} bytes)", json_name, json.len());

        let mut files = vec![json_name];
        if let Some(csv) = report.csv_export()? {
            let csv_name = Self::file_name(&stem, &at, "csv");
            self.storage.write_file(&csv_name, &csv)?;
            files.push(csv_name);
        }

        Ok(files)
    }
}

/// 依設定依序執行各項分析並匯出結果
pub struct AdvisoryEngine<S: Storage, C: ConfigProvider> {
    exporter: ReportExporter<S>,
    config: C,
    inputs: AnalysisInputs,
    dry_run: bool,
}

impl<S: Storage, C: ConfigProvider> AdvisoryEngine<S, C> {
    pub fn new(storage: S, config: C, inputs: AnalysisInputs) -> Self {
        Self {
            exporter: ReportExporter::new(storage),
            config,
            inputs,
            dry_run: false,
        }
    }

    /// 只計算與顯示摘要，不寫檔
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn inputs(&self) -> &AnalysisInputs {
        &self.inputs
    }

    fn policy(&self) -> MissingComponentPolicy {
        if self.config.strict_scoring() {
            MissingComponentPolicy::Reject
        } else {
            MissingComponentPolicy::Neutral
        }
    }

    /// `only` 指定的分析缺少輸入時回傳錯誤；未指定時略過沒有輸入的分析
    pub fn run(&self, only: Option<AnalysisKind>) -> Result<Vec<AnalysisOutcome>> {
        let kinds: Vec<AnalysisKind> = match only {
            Some(kind) => {
                if !self.inputs.has(kind) {
                    return Err(AdvisoryError::MissingConfigError {
                        field: kind.as_str().to_string(),
                    });
                }
                vec![kind]
            }
            None => AnalysisKind::ALL
                .into_iter()
                .filter(|kind| self.inputs.has(*kind))
                .collect(),
        };

        if kinds.is_empty() {
            tracing::warn!("⚠️ No analysis inputs configured, nothing to run");
            return Ok(Vec::new());
        }

        let now = Local::now();
        let mut rng = rng_from_seed(self.config.seed());
        let mut outcomes = Vec::with_capacity(kinds.len());

        for kind in kinds {
            tracing::info!("▶️ Running {} analysis", kind);
            let outcome = self.run_kind(kind, now, &mut rng)?;
            tracing::info!(
                "✅ {} analysis finished ({} files)",
                kind,
                outcome.exported_files.len()
            );
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    fn run_kind(
        &self,
        kind: AnalysisKind,
        now: DateTime<Local>,
        rng: &mut StdRng,
    ) -> Result<AnalysisOutcome> {
        let missing = || AdvisoryError::MissingConfigError {
            field: kind.as_str().to_string(),
        };
        let today = now.date_naive();

        match kind {
            AnalysisKind::DueDiligence => {
                let input = self.inputs.due_diligence.as_ref().ok_or_else(missing)?;
                let report = DueDiligenceAnalyzer::new(self.policy()).generate_report(input)?;
                self.finish(&report, now)
            }
            AnalysisKind::Budget => {
                let input = self.inputs.budget.as_ref().ok_or_else(missing)?;
                let report = BudgetOptimizer::new().optimize(&input.categories, input.total_budget)?;
                self.finish(&report, now)
            }
            AnalysisKind::CostBenefit => {
                let input = self.inputs.cost_benefit.as_ref().ok_or_else(missing)?;
                let report = CostBenefitAssessor::new(input.discount_rate, input.analysis_period_years)
                    .assess_project(&input.project_name, &input.costs, &input.benefits)?;
                self.finish(&report, now)
            }
            AnalysisKind::Forecast => {
                let input = self.inputs.forecast.as_ref().ok_or_else(missing)?;
                let report = ForecastAnalyzer::new(self.config.simulations()).generate_forecast(
                    &input.company_name,
                    &input.history,
                    &input.assumptions,
                    input.base_date.unwrap_or(today),
                    rng,
                )?;
                self.finish(&report, now)
            }
            AnalysisKind::Benchmark => {
                let input = self.inputs.benchmark.as_ref().ok_or_else(missing)?;
                let report = BenchmarkAnalyzer::new(self.policy()).analyze(input)?;
                self.finish(&report, now)
            }
            AnalysisKind::CustomerInsight => {
                let input = self.inputs.customer_insight.as_ref().ok_or_else(missing)?;
                let report = synthesize_insights(&input.segments, &input.feedback);
                self.finish(&report, now)
            }
            AnalysisKind::Transformation => {
                let input = self.inputs.transformation.as_ref().ok_or_else(missing)?;
                let report = TransformationPlanner::new(self.policy())
                    .create_transformation_roadmap(input, input.start_date.unwrap_or(today))?;
                self.finish(&report, now)
            }
        }
    }

    fn finish<R: Report>(&self, report: &R, now: DateTime<Local>) -> Result<AnalysisOutcome> {
        let exported_files = if self.dry_run {
            tracing::info!("🧪 Dry run: skipping export of {}", report.export_stem());
            Vec::new()
        } else {
            self.exporter
                .export(report, now)?
                .into_iter()
                .map(|name| format!("{}/{}", self.config.output_path(), name))
                .collect()
        };

        Ok(AnalysisOutcome {
            kind: report.kind(),
            summary: report.summary(),
            exported_files,
        })
    }
}
