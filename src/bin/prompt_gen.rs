use clap::{Parser, ValueEnum};
use exec_advisory::analysis::benchmark::{BenchmarkConfig, BenchmarkScope};
use exec_advisory::analysis::BenchmarkAnalyzer;
use exec_advisory::prompt::model::{
    CompanySize, Confidentiality, ExecutiveRole, IndustryType, PromptContext, UrgencyLevel,
};
use exec_advisory::prompt::quality::QualityContext;
use exec_advisory::prompt::QualityValidator;
use exec_advisory::utils::logger;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TemplateKind {
    Comprehensive,
    Industry,
    Improvement,
}

#[derive(Parser)]
#[command(name = "prompt-gen")]
#[command(about = "Render a performance benchmark prompt for an executive context")]
struct Args {
    /// Which benchmark template to render
    #[arg(short, long, value_enum, default_value = "comprehensive")]
    template: TemplateKind,

    #[arg(long, default_value = "general")]
    industry: IndustryType,

    #[arg(long, default_value = "ceo")]
    role: ExecutiveRole,

    #[arg(long, default_value = "mid_market")]
    size: CompanySize,

    #[arg(long, default_value = "normal")]
    urgency: UrgencyLevel,

    #[arg(long, default_value = "internal")]
    confidentiality: Confidentiality,

    #[arg(long)]
    focus: Option<String>,

    /// Focus areas for the improvement planning template
    #[arg(long, default_value = "operational efficiency and customer satisfaction")]
    improvement_areas: String,

    /// Append investor communication guidance to the comprehensive template
    #[arg(long)]
    investor: bool,

    /// Score the rendered prompt with the quality validator
    #[arg(long)]
    assess: bool,

    /// Show the adaptation summary instead of the prompt
    #[arg(long)]
    summary: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let mut context = PromptContext::new(args.industry, args.role, args.size)
        .with_urgency(args.urgency)
        .with_confidentiality(args.confidentiality);
    if let Some(focus) = &args.focus {
        context = context.with_focus(focus);
    }

    let analyzer = BenchmarkAnalyzer::default();

    if args.summary {
        let summary = analyzer.registry().adapter().adaptation_summary(&context);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let prompt = match args.template {
        TemplateKind::Comprehensive => {
            let config = BenchmarkConfig {
                benchmark_scope: BenchmarkScope::Industry,
                investor_communication: args.investor,
                ..BenchmarkConfig::default()
            };
            analyzer.generate_benchmark_analysis_prompt(&config, &context)?
        }
        TemplateKind::Industry => analyzer.generate_industry_benchmark_prompt(&context)?,
        TemplateKind::Improvement => {
            analyzer.generate_improvement_planning_prompt(&args.improvement_areas, &context)?
        }
    };

    println!("{}", prompt);

    if args.assess {
        let mut validator = QualityValidator::new();
        let quality_context = QualityContext {
            industry: Some(args.industry),
        };
        let assessment = validator.validate_content(&prompt, &quality_context, Some("prompt-gen"));
        eprintln!("\n{}", serde_json::to_string_pretty(assessment)?);
    }

    Ok(())
}
