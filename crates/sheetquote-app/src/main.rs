//! SheetQuote 命令行入口
//! 读取 DXF 图纸与订单参数，输出 JSON 格式的分析结果或报价

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sheetquote_app::{
    EstimatedPart, OrderParameters, OrderRequest, PipelineConfig, QuoteJob, QuotePipeline,
};
use sheetquote_pricing::{BendComplexity, PricingError};

#[derive(Parser)]
#[command(name = "sheetquote")]
#[command(about = "Sheet-metal cost estimation from DXF drawings")]
#[command(version)]
struct Cli {
    /// Pipeline configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print single-line JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure a drawing and score its cut path
    Analyze {
        /// DXF file
        file: PathBuf,
    },

    /// Price one or more drawings
    Quote {
        /// DXF files; several files are priced in parallel
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        order: OrderArgs,
    },

    /// Price a part from estimated dimensions without a drawing
    Estimate {
        /// Part area in square inches
        #[arg(long)]
        area: f64,

        /// Cut length in inches
        #[arg(long)]
        cut_length: f64,

        /// Number of holes
        #[arg(long, default_value = "0")]
        holes: u32,

        /// Number of bends
        #[arg(long, default_value = "0")]
        bends: u32,

        /// Declared bend complexity: none, simple, moderate, complex
        #[arg(long, default_value = "none")]
        bend_complexity: String,

        #[command(flatten)]
        order: OrderArgs,
    },

    /// List the material catalog
    Materials,
}

#[derive(Args)]
struct OrderArgs {
    /// Material id (see `sheetquote materials`)
    #[arg(short, long)]
    material: String,

    /// Sheet thickness in inches
    #[arg(short, long)]
    thickness: f64,

    /// Number of parts
    #[arg(short, long, default_value = "1")]
    quantity: i64,

    /// none, powder_coat, anodize, galvanize, paint
    #[arg(long)]
    finish: Option<String>,

    /// standard, precision, tight
    #[arg(long)]
    tolerance: Option<String>,

    /// standard, rush, emergency
    #[arg(long)]
    urgency: Option<String>,

    /// Free-form notes echoed into the quote
    #[arg(long)]
    notes: Option<String>,
}

impl OrderArgs {
    /// 走与服务端相同的校验路径，错误信息带字段名
    fn into_order(self) -> Result<OrderParameters, PricingError> {
        OrderParameters::try_from(OrderRequest {
            material: self.material,
            thickness: self.thickness,
            quantity: self.quantity,
            finish_type: self.finish,
            tolerance_level: self.tolerance,
            urgency: self.urgency,
            notes: self.notes,
        })
    }
}

/// 批量报价的单项输出
#[derive(Serialize)]
struct BatchEntry<'a, T: Serialize> {
    file: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    quote: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{text}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志，标准输出留给 JSON
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .finish(),
    )?;

    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    let pipeline = QuotePipeline::from_config(config);

    match cli.command {
        Commands::Analyze { file } => {
            info!("Analyzing {}", file.display());
            let part = pipeline
                .analyze_file(&file)
                .with_context(|| format!("failed to analyze {}", file.display()))?;
            print_json(&part, cli.compact)?;
        }

        Commands::Quote { files, order } => {
            let order = order.into_order()?;
            if let [file] = files.as_slice() {
                info!("Quoting {}", file.display());
                let quote = pipeline
                    .quote_file(file, &order)
                    .with_context(|| format!("failed to quote {}", file.display()))?;
                print_json(&quote, cli.compact)?;
            } else {
                let jobs = files
                    .iter()
                    .map(|file| {
                        let bytes = std::fs::read(file)
                            .with_context(|| format!("failed to read {}", file.display()))?;
                        Ok(QuoteJob {
                            name: file.display().to_string(),
                            bytes,
                            order: order.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;

                let results = pipeline.quote_batch(&jobs);
                let failed = results.iter().filter(|r| r.is_err()).count();
                let entries: Vec<_> = files
                    .iter()
                    .zip(results)
                    .map(|(file, result)| match result {
                        Ok(quote) => BatchEntry {
                            file: file.as_path(),
                            quote: Some(quote),
                            error: None,
                        },
                        Err(e) => BatchEntry {
                            file: file.as_path(),
                            quote: None,
                            error: Some(e.to_string()),
                        },
                    })
                    .collect();
                print_json(&entries, cli.compact)?;

                if failed > 0 {
                    bail!("{failed} of {} documents could not be quoted", files.len());
                }
            }
        }

        Commands::Estimate {
            area,
            cut_length,
            holes,
            bends,
            bend_complexity,
            order,
        } => {
            let order = order.into_order()?;
            let bend_complexity: BendComplexity = bend_complexity.parse()?;
            let part = EstimatedPart::new(area, cut_length)
                .with_holes(holes)
                .with_bends(bends, bend_complexity);
            let pricing = pipeline.quote_estimated(&part, &order)?;
            print_json(&pricing, cli.compact)?;
        }

        Commands::Materials => {
            let materials: Vec<_> = pipeline.engine().config().materials.iter().collect();
            print_json(&materials, cli.compact)?;
        }
    }

    Ok(())
}
