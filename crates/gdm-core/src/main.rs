//! gdm-risk - gestational diabetes risk scoring CLI
//!
//! Collects raw field values, scores them with the configured models and
//! prints the category and probability. All logic lives in the library.

use clap::{Args, Parser, Subcommand};
use gdm_common::{OutputFormat, Result, RiskCategory, RiskSource};
use gdm_config::preset::features;
use gdm_config::{list_presets, load_catalog, ConfigSnapshot, LoadedCatalog, PresetName};
use gdm_core::exit_codes::ExitCode;
use gdm_core::input::{parse_field, parse_flag};
use gdm_core::logging::{event_names, generate_run_id, init_logging, LogConfig};
use gdm_core::output::Renderer;
use gdm_core::{
    assessment_schema, combine, score_csv, Assessment, BatchSummary, EngineOptions, FeatureSet,
    RangePolicy, RiskModel, RowErrorPolicy,
};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Gestational diabetes risk scoring
#[derive(Parser)]
#[command(name = "gdm-risk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Models file overriding built-in presets
    #[arg(long, global = true)]
    models: Option<PathBuf>,

    /// Preset used for the metabolomic source (metabolomic5 or metabolomic4)
    #[arg(long, global = true, default_value = "metabolomic5")]
    metabolomic_preset: PresetName,

    /// Clamp out-of-range clinical and lipid inputs instead of rejecting them
    #[arg(long, global = true)]
    clamp_ranges: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

impl GlobalOpts {
    fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            metabolomic_preset: self.metabolomic_preset,
            range_policy: if self.clamp_ranges {
                RangePolicy::Clamp
            } else {
                RangePolicy::Reject
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Baseline GDM risk from BMI and family history
    Clinical(ClinicalArgs),

    /// Complication risk from the lipid panel
    Lipid(LipidArgs),

    /// Risk from urinary amino-acid metabolites
    Metabolomic(MetabolomicArgs),

    /// Score every supplied source and combine into an overall verdict
    Assess(AssessArgs),

    /// Combine category labels (English or Russian) into the most severe one
    Combine(CombineArgs),

    /// Score a CSV table, one subject per row
    Batch(BatchArgs),

    /// List built-in presets
    Presets,

    /// Inspect or validate model configuration
    Config(ConfigArgs),

    /// Print the JSON schema of the assessment document
    Schema,
}

#[derive(Args, Debug)]
struct ClinicalArgs {
    /// Body-mass index, kg/m2 (',' or '.' decimal)
    #[arg(long)]
    bmi: String,

    /// Diabetes in first-degree relatives (yes/no, 1/0)
    #[arg(long)]
    family_history: String,
}

#[derive(Args, Debug)]
struct LipidArgs {
    /// Triglycerides, mmol/L
    #[arg(long)]
    triglycerides: String,

    /// HDL cholesterol, mmol/L
    #[arg(long)]
    hdl: String,
}

/// Metabolite concentrations, mmol/mol creatinine. Which are required depends
/// on the metabolomic preset.
#[derive(Args, Debug)]
struct MetabolomicArgs {
    #[arg(long)]
    tyrosine: Option<String>,

    #[arg(long)]
    alpha_aminoadipic_acid: Option<String>,

    #[arg(long)]
    mh3: Option<String>,

    #[arg(long)]
    phosphoethanolamine: Option<String>,

    #[arg(long)]
    phosphoserine: Option<String>,
}

impl MetabolomicArgs {
    fn fields(&self) -> [(&'static str, Option<&str>); 5] {
        [
            (features::TYROSINE, self.tyrosine.as_deref()),
            (
                features::ALPHA_AMINOADIPIC_ACID,
                self.alpha_aminoadipic_acid.as_deref(),
            ),
            (features::MH3, self.mh3.as_deref()),
            (features::PHOSPHOETHANOLAMINE, self.phosphoethanolamine.as_deref()),
            (features::PHOSPHOSERINE, self.phosphoserine.as_deref()),
        ]
    }

    fn any_given(&self) -> bool {
        self.fields().iter().any(|(_, v)| v.is_some())
    }

    fn feature_set(&self) -> Result<FeatureSet> {
        let mut set = FeatureSet::new();
        for (name, raw) in self.fields() {
            if let Some(raw) = raw {
                set.insert(name, parse_field(name, raw)?);
            }
        }
        Ok(set)
    }
}

#[derive(Args, Debug)]
struct AssessArgs {
    #[arg(long)]
    bmi: Option<String>,

    #[arg(long)]
    family_history: Option<String>,

    #[arg(long)]
    triglycerides: Option<String>,

    #[arg(long)]
    hdl: Option<String>,

    #[command(flatten)]
    metabolomic: MetabolomicArgs,
}

#[derive(Args, Debug)]
struct CombineArgs {
    /// Component categories (low, intermediate, high, or Russian labels)
    categories: Vec<RiskCategory>,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Input CSV ('-' for stdin)
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Output CSV ('-' or omitted for stdout)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Preset to score with
    #[arg(long, default_value = "metabolomic5")]
    model: PresetName,

    /// Mark unscorable rows as invalid instead of stopping
    #[arg(long)]
    mark_invalid: bool,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective model configuration
    Show,
    /// Validate a models file
    Validate {
        /// Models file (defaults to the resolved one)
        path: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = LogConfig::level_from_verbosity(cli.global.verbose, cli.global.quiet);
    init_logging(&LogConfig::from_env(level));

    let run_id = generate_run_id();
    let span = tracing::info_span!("run", run_id = %run_id);
    let _guard = span.enter();
    info!(event = event_names::RUN_STARTED, "gdm-risk started");

    let renderer = Renderer::new(cli.global.format, run_id);
    let exit_code = match dispatch(&cli, &renderer) {
        Ok(()) => ExitCode::Ok,
        Err(err) => {
            debug!(code = err.code(), error = %err, "command failed");
            eprintln!("{}", renderer.error(&err));
            ExitCode::from(&err)
        }
    };

    info!(event = event_names::RUN_FINISHED, exit_code = %exit_code, "gdm-risk finished");
    std::process::exit(exit_code.as_i32());
}

fn dispatch(cli: &Cli, renderer: &Renderer) -> Result<()> {
    let global = &cli.global;
    match &cli.command {
        Commands::Clinical(args) => run_clinical(global, renderer, args),
        Commands::Lipid(args) => run_lipid(global, renderer, args),
        Commands::Metabolomic(args) => run_metabolomic(global, renderer, args),
        Commands::Assess(args) => run_assess(global, renderer, args),
        Commands::Combine(args) => run_combine(renderer, args),
        Commands::Batch(args) => run_batch(global, renderer, args),
        Commands::Presets => emit(renderer.presets(&list_presets())?),
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show => {
                let loaded = load(global.models.as_deref())?;
                emit(renderer.snapshot(&ConfigSnapshot::capture(&loaded))?)
            }
            ConfigCommands::Validate { path } => {
                let loaded = load(path.as_deref().or(global.models.as_deref()))?;
                emit(renderer.validated(&ConfigSnapshot::capture(&loaded))?)
            }
        },
        Commands::Schema => emit(serde_json::to_string_pretty(&assessment_schema())?),
    }
}

fn emit(text: String) -> Result<()> {
    println!("{}", text);
    Ok(())
}

/// Resolve and validate the models catalog.
fn load(cli_path: Option<&Path>) -> Result<LoadedCatalog> {
    let loaded = load_catalog(cli_path).map_err(|e| {
        debug!(event = event_names::CONFIG_ERROR, error = %e, "models file rejected");
        e
    })?;
    info!(
        event = event_names::CONFIG_LOADED,
        source = %loaded.resolved.source,
        path = ?loaded.resolved.path,
        overridden = ?loaded.overridden,
        "model catalog loaded"
    );
    Ok(loaded)
}

/// Compile only the model scoring `source`.
fn model(global: &GlobalOpts, source: RiskSource) -> Result<RiskModel> {
    let loaded = load(global.models.as_deref())?;
    RiskModel::for_source(&loaded.catalog, source, &global.engine_options())
}

fn clinical_input(bmi: &str, family_history: &str) -> Result<FeatureSet> {
    Ok(FeatureSet::new()
        .with(features::BMI, parse_field(features::BMI, bmi)?)
        .with(
            features::FAMILY_HISTORY,
            parse_flag(features::FAMILY_HISTORY, family_history)?,
        ))
}

fn lipid_input(triglycerides: &str, hdl: &str) -> Result<FeatureSet> {
    Ok(FeatureSet::new()
        .with(
            features::TRIGLYCERIDES,
            parse_field(features::TRIGLYCERIDES, triglycerides)?,
        )
        .with(features::HDL, parse_field(features::HDL, hdl)?))
}

fn run_clinical(global: &GlobalOpts, renderer: &Renderer, args: &ClinicalArgs) -> Result<()> {
    let input = clinical_input(&args.bmi, &args.family_history)?;
    let result = model(global, RiskSource::Clinical)?.evaluate(&input)?;
    emit(renderer.result(&result)?)
}

fn run_lipid(global: &GlobalOpts, renderer: &Renderer, args: &LipidArgs) -> Result<()> {
    let input = lipid_input(&args.triglycerides, &args.hdl)?;
    let result = model(global, RiskSource::Lipid)?.evaluate(&input)?;
    emit(renderer.result(&result)?)
}

fn run_metabolomic(
    global: &GlobalOpts,
    renderer: &Renderer,
    args: &MetabolomicArgs,
) -> Result<()> {
    let input = args.feature_set()?;
    let result = model(global, RiskSource::Metabolomic)?.evaluate(&input)?;
    emit(renderer.result(&result)?)
}

/// A source is scored when any of its fields was supplied; a partially
/// supplied source is an error naming the missing field.
fn run_assess(global: &GlobalOpts, renderer: &Renderer, args: &AssessArgs) -> Result<()> {
    let loaded = load(global.models.as_deref())?;
    let options = global.engine_options();
    let compile =
        |source: RiskSource| RiskModel::for_source(&loaded.catalog, source, &options);
    let mut assessment = Assessment::new();

    if args.bmi.is_some() || args.family_history.is_some() {
        let input = clinical_input(
            args.bmi.as_deref().unwrap_or_default(),
            args.family_history.as_deref().unwrap_or_default(),
        )?;
        assessment.record(compile(RiskSource::Clinical)?.evaluate(&input)?);
    }

    if args.triglycerides.is_some() || args.hdl.is_some() {
        let input = lipid_input(
            args.triglycerides.as_deref().unwrap_or_default(),
            args.hdl.as_deref().unwrap_or_default(),
        )?;
        assessment.record(compile(RiskSource::Lipid)?.evaluate(&input)?);
    }

    if args.metabolomic.any_given() {
        let input = args.metabolomic.feature_set()?;
        assessment.record(compile(RiskSource::Metabolomic)?.evaluate(&input)?);
    }

    emit(renderer.assessment(&assessment.report())?)
}

fn run_combine(renderer: &Renderer, args: &CombineArgs) -> Result<()> {
    let overall = combine(&args.categories)?;
    emit(renderer.combined(&args.categories, overall)?)
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn run_batch(global: &GlobalOpts, renderer: &Renderer, args: &BatchArgs) -> Result<()> {
    let loaded = load(global.models.as_deref())?;
    let model = RiskModel::compile(
        loaded.catalog.spec(args.model)?,
        global.engine_options().range_policy,
    )?;
    let policy = if args.mark_invalid {
        RowErrorPolicy::Mark
    } else {
        RowErrorPolicy::Abort
    };

    let input: Box<dyn Read> = if is_stdio(&args.input) {
        Box::new(io::stdin().lock())
    } else {
        Box::new(BufReader::new(File::open(&args.input)?))
    };

    match args.output.as_deref().filter(|p| !is_stdio(p)) {
        Some(path) => {
            let summary = score_to_file(&model, input, path, policy)?;
            emit(renderer.batch(&summary)?)
        }
        None => {
            let summary = score_csv(&model, input, io::stdout().lock(), policy)?;
            // The table owns stdout.
            eprintln!("{}", renderer.batch(&summary)?);
            Ok(())
        }
    }
}

/// Write the scored table next to `path` and move it into place only once
/// every row is done; a failed run leaves `path` as it was.
fn score_to_file(
    model: &RiskModel,
    input: impl Read,
    path: &Path,
    policy: RowErrorPolicy,
) -> Result<BatchSummary> {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("batch.csv");
    let tmp_path = path.with_file_name(format!("{}.tmp.{}", file_name, std::process::id()));

    match write_table(model, input, &tmp_path, policy) {
        Ok(summary) => {
            fs::rename(&tmp_path, path)?;
            Ok(summary)
        }
        Err(err) => {
            let _ = fs::remove_file(&tmp_path);
            Err(err)
        }
    }
}

fn write_table(
    model: &RiskModel,
    input: impl Read,
    path: &Path,
    policy: RowErrorPolicy,
) -> Result<BatchSummary> {
    let mut output = BufWriter::new(File::create(path)?);
    let summary = score_csv(model, input, &mut output, policy)?;
    output.flush()?;
    Ok(summary)
}
