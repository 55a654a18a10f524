mod render;
mod xml;

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use yangsmith_core::{collect_complexity, load_path, Error as CoreError};
use yangsmith_generate::{
    annotate_pattern_bounds, generate_all, generate_at, run_descriptor, Descriptor,
    GenerationContext, GenerationError, GeneratorOptions, OutputNode, StatefulSources, TreeBackend,
};

use render::{ComplexitySections, TreeOptions};
use xml::OutputFormat;

#[derive(Debug, Error)]
enum CliError {
    #[error("schema error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("path not found: {0}")]
    InvalidPath(String),
    #[error("render error: {0}")]
    Render(String),
}

#[derive(Parser, Debug)]
#[command(name = "yangsmith", version, about = "Sample config generation from compiled YANG schemas")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the schema tree.
    Tree(TreeArgs),
    /// Generate a random configuration for the whole schema or a branch.
    Genconfig(GenconfigArgs),
    /// Generate a configuration driven by a JSON descriptor.
    Rundesc(RundescArgs),
    /// Print a descriptor scaffold for the schema.
    Gendesc(GendescArgs),
    /// Schema complexity analysis.
    Complex(ComplexArgs),
}

#[derive(Args, Debug)]
struct ModelArg {
    /// Compiled schema document (pyang pmod JSON).
    #[arg(value_name = "MODEL")]
    model: PathBuf,
}

#[derive(Args, Debug)]
struct TreeArgs {
    #[command(flatten)]
    model: ModelArg,
    /// Include leafs and leaf-lists in the view.
    #[arg(short, long)]
    leafs: bool,
    /// Show one level only.
    #[arg(short = '1', long)]
    one_level: bool,
    /// Hide choice and case markers.
    #[arg(long)]
    hide_choice: bool,
    /// Start at this path instead of the schema root.
    #[arg(long)]
    path: Option<String>,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Random seed; a fresh one is drawn and logged when omitted.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Document framing for the generated XML.
    #[arg(short, long, value_enum, default_value = "default")]
    format: OutputFormat,
    /// Device name for the nso-device framing.
    #[arg(short, long, default_value = "ce0")]
    name: String,
    /// Write the document here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GenconfigArgs {
    #[command(flatten)]
    model: ModelArg,
    #[command(flatten)]
    output: OutputArgs,
    /// Generate this branch only, with its enclosing levels.
    #[arg(long)]
    path: Option<String>,
    /// Synthesize from the model's patterns as written, without overrides.
    #[arg(long)]
    use_unaltered_patterns: bool,
}

#[derive(Args, Debug)]
struct RundescArgs {
    #[command(flatten)]
    model: ModelArg,
    /// JSON descriptor driving the traversal.
    #[arg(short, long, value_name = "FILE")]
    descriptor: PathBuf,
    #[command(flatten)]
    output: OutputArgs,
    /// Synthesize from the model's patterns as written, without overrides.
    #[arg(long)]
    use_unaltered_patterns: bool,
}

#[derive(Args, Debug)]
struct GendescArgs {
    #[command(flatten)]
    model: ModelArg,
    /// Scaffold this branch only, wrapped in its enclosing levels.
    #[arg(long)]
    path: Option<String>,
}

#[derive(Args, Debug)]
struct ComplexArgs {
    #[command(flatten)]
    model: ModelArg,
    /// Show lists.
    #[arg(short, long)]
    lists: bool,
    /// Show leafrefs.
    #[arg(short = 'r', long)]
    leafrefs: bool,
    /// Show non-strict leafrefs.
    #[arg(short = 'n', long)]
    ns_leafrefs: bool,
    /// Show when statements.
    #[arg(short, long)]
    whens: bool,
    /// Show must statements.
    #[arg(short, long)]
    musts: bool,
    /// Show patterns.
    #[arg(short, long)]
    patterns: bool,
    /// Stay on the first level instead of walking the whole branch.
    #[arg(short = '1', long)]
    one_level: bool,
    /// Analyze this branch only.
    #[arg(long)]
    path: Option<String>,
    /// Emit the report as JSON instead of text tables.
    #[arg(long)]
    json: bool,
    /// Print the JSON Schema of the report format and exit.
    #[arg(long)]
    contract: bool,
}

fn main() -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Tree(args) => run_tree(args),
        Command::Genconfig(args) => run_genconfig(args),
        Command::Rundesc(args) => run_rundesc(args),
        Command::Gendesc(args) => run_gendesc(args),
        Command::Complex(args) => run_complex(args),
    }
}

fn run_tree(args: TreeArgs) -> Result<(), CliError> {
    let tree = load_path(&args.model.model)?;
    let options = TreeOptions {
        leafs: args.leafs,
        one_level: args.one_level,
        hide_choice: args.hide_choice,
    };
    let view = render::tree_view(&tree, options, args.path.as_deref())?;
    print!("{view}");
    Ok(())
}

fn run_genconfig(args: GenconfigArgs) -> Result<(), CliError> {
    let tree = load_path(&args.model.model)?;
    let seed = pick_seed(args.output.seed);
    let options = GeneratorOptions {
        use_unaltered_patterns: args.use_unaltered_patterns,
    };
    let mut ctx = GenerationContext::new(&tree, seed).with_options(options);
    let mut generated = OutputNode::root("data");
    {
        let mut backend = TreeBackend::new(&tree.modules, &mut generated);
        match args.path.as_deref() {
            Some(path) => generate_at(&mut ctx, &mut backend, path)?,
            None => generate_all(&mut ctx, &mut backend)?,
        }
    }
    report_exhaustion(&ctx);
    emit(&generated, &args.output)
}

fn run_rundesc(args: RundescArgs) -> Result<(), CliError> {
    let tree = load_path(&args.model.model)?;
    let text = fs::read_to_string(&args.descriptor)?;
    let descriptor = Descriptor::from_json_str(&text)?;
    let seed = pick_seed(args.output.seed);
    let options = GeneratorOptions {
        use_unaltered_patterns: args.use_unaltered_patterns,
    };
    let mut ctx = GenerationContext::new(&tree, seed).with_options(options);
    let mut state = StatefulSources::default();
    let mut generated = OutputNode::root("data");
    {
        let mut backend = TreeBackend::new(&tree.modules, &mut generated);
        run_descriptor(&mut ctx, &mut backend, &descriptor, &mut state)?;
    }
    report_exhaustion(&ctx);
    emit(&generated, &args.output)
}

fn run_gendesc(args: GendescArgs) -> Result<(), CliError> {
    let tree = load_path(&args.model.model)?;
    let scaffold = render::descriptor_scaffold(&tree, args.path.as_deref())?;
    let text = serde_json::to_string_pretty(&scaffold)
        .map_err(|err| CliError::Render(err.to_string()))?;
    println!("{text}");
    Ok(())
}

fn run_complex(args: ComplexArgs) -> Result<(), CliError> {
    if args.contract {
        let schema = schemars::schema_for!(yangsmith_core::ComplexityReport);
        let text = serde_json::to_string_pretty(&schema)
            .map_err(|err| CliError::Render(err.to_string()))?;
        println!("{text}");
        return Ok(());
    }
    let tree = load_path(&args.model.model)?;
    let start = match args.path.as_deref() {
        Some(path) => {
            let segments = yangsmith_core::parse_key_path(path)
                .map_err(|_| CliError::InvalidPath(path.to_string()))?;
            Some(
                tree.find_key_path(&segments)
                    .ok_or_else(|| CliError::InvalidPath(path.to_string()))?,
            )
        }
        None => None,
    };
    let mut report = collect_complexity(&tree, start, args.one_level);
    annotate_pattern_bounds(&mut report);
    if args.json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|err| CliError::Render(err.to_string()))?;
        println!("{text}");
        return Ok(());
    }
    let mut sections = ComplexitySections {
        lists: args.lists,
        leafrefs: args.leafrefs,
        ns_leafrefs: args.ns_leafrefs,
        whens: args.whens,
        musts: args.musts,
        patterns: args.patterns,
    };
    if !sections.any() {
        sections = ComplexitySections::all();
    }
    print!("{}", render::complexity_text(&report, sections));
    Ok(())
}

fn pick_seed(seed: Option<u64>) -> u64 {
    match seed {
        Some(seed) => seed,
        None => {
            let seed = rand::random::<u64>();
            info!(seed, "no seed given, drew one");
            seed
        }
    }
}

fn report_exhaustion(ctx: &GenerationContext) {
    if ctx.exhausted_patterns > 0 {
        warn!(
            count = ctx.exhausted_patterns,
            "some patterns hit the synthesis attempt budget"
        );
    }
}

fn emit(generated: &OutputNode, output: &OutputArgs) -> Result<(), CliError> {
    let xml = xml::serialize(generated, output.format, &output.name)?;
    write_output(output.output.as_deref(), &xml)
}

fn write_output(target: Option<&Path>, xml: &str) -> Result<(), CliError> {
    match target {
        Some(path) => {
            let mut file = fs::File::create(path)?;
            file.write_all(xml.as_bytes())?;
            file.write_all(b"\n")?;
            info!(path = %path.display(), "wrote configuration");
        }
        None => println!("{xml}"),
    }
    Ok(())
}
