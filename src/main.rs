use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use workdoc::config::{init_default_config, load_replacement_map, resolve_config};
use workdoc::docx::DocxDocument;
use workdoc::progress::ConsoleProgress;
use workdoc::table::{parse_assignment, Delimiters, ReplacementTable};

#[derive(Parser, Debug)]
#[command(name = "workdoc")]
#[command(about = "Fill {placeholders} in .docx templates without losing formatting", long_about = None)]
struct Args {
    /// Generate a default workdoc.toml, then exit
    #[arg(long)]
    init_config: bool,

    /// Directory to write the config file to (default: current directory)
    #[arg(long, value_name = "DIR")]
    init_config_dir: Option<PathBuf>,

    /// Overwrite an existing config when used with --init-config
    #[arg(long)]
    force: bool,

    /// Input .docx
    #[arg(value_name = "DOCX")]
    input: Option<PathBuf>,

    /// Output .docx (default: overwrite the input)
    #[arg(short, long, value_name = "DOCX")]
    output: Option<PathBuf>,

    /// Substitution, repeatable (e.g. -s name=Ada -s date=2024-01-01)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// Substitutions from a JSON object or TOML table of strings
    #[arg(long, value_name = "FILE")]
    map: Option<PathBuf>,

    /// Placeholder start delimiter (overrides config)
    #[arg(long, value_name = "STR")]
    start: Option<String>,

    /// Placeholder end delimiter (overrides config)
    #[arg(long, value_name = "STR")]
    end: Option<String>,

    /// Print the document text (after substitution, if any) to stdout
    #[arg(long)]
    print_text: bool,

    /// Write paragraph texts as a JSON array
    #[arg(long, value_name = "JSON")]
    text_json: Option<PathBuf>,

    /// Config file path (default: search for workdoc.toml upwards, or WORKDOC_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Suppress status lines on stderr
    #[arg(short, long)]
    quiet: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let progress = ConsoleProgress::new(!args.quiet);

    if args.init_config {
        let dir = args
            .init_config_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let cfg_path = init_default_config(&dir, args.force).context("init default config")?;
        eprintln!("Wrote config: {}", cfg_path.display());
        return Ok(());
    }

    let input = match args.input {
        Some(p) => p,
        None => {
            let mut cmd = Args::command();
            cmd.print_help().context("print help")?;
            eprintln!(
                "\n\nUSAGE:\n  workdoc template.docx -s name=Ada -s date=2024-01-01 -o letter.docx\n  workdoc template.docx --print-text\n"
            );
            return Ok(());
        }
    };

    let workdir = input
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    let (cfg, cfg_path) = resolve_config(args.config.as_deref(), &workdir)?;
    if let Some(p) = cfg_path.as_ref() {
        progress.info(format!("config: {}", p.display()));
    }

    let mut pairs: Vec<(String, String)> = Vec::new();
    if let Some(map_path) = args.map.as_ref() {
        pairs.extend(load_replacement_map(map_path)?);
    }
    for assignment in &args.set {
        pairs.push(parse_assignment(assignment).context("parse --set")?);
    }

    let cfg_delims = cfg.delimiters()?;
    let delimiters = Delimiters::new(
        args.start.clone().unwrap_or(cfg_delims.start),
        args.end.clone().unwrap_or(cfg_delims.end),
    )
    .context("placeholder delimiters")?;
    let table = ReplacementTable::from_pairs(pairs)
        .context("build replacement table")?
        .with_delimiters(delimiters);

    if table.is_empty() && !args.print_text && args.text_json.is_none() {
        return Err(anyhow!(
            "nothing to do: pass substitutions with -s/--set or --map, or use --print-text/--text-json"
        ));
    }

    let engine = cfg.engine();
    let mut doc = DocxDocument::open_with(&input, &cfg.document_options())
        .with_context(|| format!("open {}", input.display()))?;
    progress.info(format!(
        "opened {} ({} text part(s))",
        input.display(),
        doc.part_names().count()
    ));

    if !table.is_empty() {
        let report = engine.replace(&mut doc, &table).context("replace placeholders")?;
        progress.replace_summary(&report);

        let target = args.output.as_deref();
        engine
            .save(&doc, target)
            .with_context(|| format!("save {}", target.unwrap_or(&input).display()))?;
        progress.info(format!("saved {}", target.unwrap_or(&input).display()));
    }

    if let Some(json_path) = args.text_json.as_ref() {
        let texts = engine.paragraph_texts(&doc)?;
        let body = serde_json::to_vec_pretty(&texts).context("serialize paragraph texts")?;
        std::fs::write(json_path, body)
            .with_context(|| format!("write {}", json_path.display()))?;
        progress.info(format!("wrote {} paragraph(s) to {}", texts.len(), json_path.display()));
    }

    if args.print_text {
        println!("{}", engine.read_text(&doc)?);
    }

    Ok(())
}
