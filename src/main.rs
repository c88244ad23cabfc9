use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use heideltime::{
    AnnotationOptions, AnnotationOutput, HeidelTime, MarkupSchema, MissPolicy, Reconciler, Reconciliation,
    HEIDELTIME_PATH_ENV,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "heideltime")]
#[command(about = "Run HeidelTime-standalone and recover character offsets for its TimeML annotations")]
#[command(version)]
struct Args {
    /// Log line format (logs go to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tag a document with HeidelTime
    Annotate(AnnotateArgs),
    /// Convert existing TimeML output into JSON records
    Reconcile(ReconcileArgs),
}

#[derive(ClapArgs, Debug)]
struct AnnotateArgs {
    /// Document to tag; `-` or nothing reads stdin
    input: Option<PathBuf>,

    /// HeidelTime-standalone directory
    #[arg(long, env = HEIDELTIME_PATH_ENV)]
    heideltime_path: PathBuf,

    /// JSON file with default options; flags below override it
    #[arg(long)]
    options_file: Option<PathBuf>,

    /// Document language, e.g. ENGLISH, GERMAN
    #[arg(short, long)]
    language: Option<String>,

    /// NARRATIVES, NEWS, COLLOQUIAL or SCIENTIFIC
    #[arg(short = 't', long)]
    document_type: Option<String>,

    /// XMI, TIMEML or JSON
    #[arg(short, long)]
    output: Option<String>,

    /// Document creation time, YYYY-MM-DD
    #[arg(long)]
    dct: Option<String>,

    /// Encoding of the document and of HeidelTime's output
    #[arg(short, long)]
    encoding: Option<String>,

    /// HeidelTime config.props (defaults to the one in the HeidelTime directory)
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    #[arg(long)]
    locale: Option<String>,

    /// Part-of-speech tagger, e.g. TREETAGGER, STANFORDPOSTAGGER
    #[arg(long)]
    pos_tagger: Option<String>,

    /// Ask HeidelTime for verbose diagnostics
    #[arg(short, long)]
    verbose: bool,

    /// Enable HeidelTime's interval tagger
    #[arg(long)]
    interval_tagger: bool,

    /// Java launcher
    #[arg(long, default_value = "java")]
    java: String,

    /// Abort HeidelTime after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Fail instead of falling back when an annotation cannot be located
    #[arg(long)]
    strict: bool,
}

#[derive(ClapArgs, Debug)]
struct ReconcileArgs {
    /// TimeML file; `-` or nothing reads stdin
    input: Option<PathBuf>,

    /// Fail instead of falling back when an annotation cannot be located
    #[arg(long)]
    strict: bool,

    /// Container element name
    #[arg(long, default_value = "TimeML")]
    container: String,

    /// Annotation element name
    #[arg(long, default_value = "TIMEX3")]
    tag: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn miss_policy(strict: bool) -> MissPolicy {
    if strict {
        MissPolicy::Strict
    } else {
        MissPolicy::Lenient
    }
}

async fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read stdin")?;
            Ok(content)
        }
    }
}

fn build_options(args: &AnnotateArgs) -> Result<AnnotationOptions> {
    let mut options = match args.options_file {
        Some(ref path) => AnnotationOptions::from_json_file(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => AnnotationOptions::default(),
    };

    if let Some(ref language) = args.language {
        options.set_language(language)?;
    }
    if let Some(ref document_type) = args.document_type {
        options.set_document_type(document_type)?;
    }
    if let Some(ref output) = args.output {
        options.set_output(output)?;
    }
    if let Some(ref dct) = args.dct {
        options.set_document_time(dct)?;
    }
    if let Some(ref encoding) = args.encoding {
        options.set_encoding(encoding)?;
    }
    if args.config_file.is_some() {
        options.config_file = args.config_file.clone();
    }
    if args.locale.is_some() {
        options.locale = args.locale.clone();
    }
    if args.pos_tagger.is_some() {
        options.pos_tagger = args.pos_tagger.clone();
    }
    if let Some(secs) = args.timeout_secs {
        options.timeout = Some(Duration::from_secs(secs));
    }
    options.verbose |= args.verbose;
    options.interval_tagger |= args.interval_tagger;
    if args.strict {
        options.miss_policy = MissPolicy::Strict;
    }
    Ok(options)
}

fn print_records(reconciliation: &Reconciliation) -> Result<()> {
    let json = serde_json::to_string_pretty(&reconciliation.records)?;
    println!("{json}");
    Ok(())
}

async fn annotate(args: AnnotateArgs) -> Result<()> {
    // WHY: validate every option before the document is read or the JVM started
    let options = build_options(&args)?;
    let heideltime = HeidelTime::new(&args.heideltime_path)?
        .with_java(&args.java)
        .with_options(options);

    let document = read_input(args.input.as_deref()).await?;
    info!(chars = document.chars().count(), "Annotating document");

    match heideltime.parse(&document).await? {
        AnnotationOutput::Markup(markup) => print!("{markup}"),
        AnnotationOutput::Records(reconciliation) => print_records(&reconciliation)?,
    }
    Ok(())
}

async fn reconcile(args: ReconcileArgs) -> Result<()> {
    let markup = read_input(args.input.as_deref()).await?;
    let reconciler = Reconciler::new()
        .policy(miss_policy(args.strict))
        .schema(MarkupSchema {
            container: args.container,
            tag: args.tag,
        });

    let reconciliation = reconciler.reconcile(&markup)?;
    print_records(&reconciliation)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_format);

    info!(?args, "Parsed CLI arguments");

    match args.command {
        Command::Annotate(annotate_args) => annotate(annotate_args).await,
        Command::Reconcile(reconcile_args) => reconcile(reconcile_args).await,
    }
}
