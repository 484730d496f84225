use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::fs;
use std::process;
use tabline::{CompileOptions, GroupingLocation};
use tracing::Level;

fn print_usage() {
    eprintln!("Usage: tabline [OPTIONS] <input.json|input.yaml> [output.json]");
    eprintln!("       tabline --demo <name> [output.json]");
    eprintln!("       tabline --list-demos");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --preview <S[:SUB[:SEQ]]>  Compile one section, subsection or chord sequence");
    eprintln!("  --lint                     Report suspicious content instead of compiling");
    eprintln!("  --options <file.yaml>      Compile options (defaultBpm, maxPlayableUnits)");
    eprintln!("  -v, --verbose              Log diagnostics while compiling");
    eprintln!("  -h, --help                 Show this help message");
}

#[derive(Debug, Default)]
struct Args {
    input: Option<String>,
    output: Option<String>,
    demo: Option<String>,
    preview: Option<GroupingLocation>,
    options: Option<String>,
    lint: bool,
    list_demos: bool,
    verbose: bool,
}

/// Parse a preview address such as `1`, `1:0` or `1:0:2`.
fn parse_location(address: &str) -> Result<GroupingLocation> {
    let indices = address
        .split(':')
        .map(|part| part.parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| anyhow!("Invalid preview address: {}", address))?;

    match indices[..] {
        [section] => Ok(GroupingLocation::section(section)),
        [section, subsection] => Ok(GroupingLocation::subsection(section, subsection)),
        [section, subsection, sequence] => Ok(GroupingLocation::chord_sequence(
            section, subsection, sequence,
        )),
        _ => bail!("Invalid preview address: {}", address),
    }
}

fn parse_args(raw: &[String]) -> Result<Args> {
    let mut args = Args::default();
    let mut positional = Vec::new();
    let mut iter = raw.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--preview" => {
                let address = iter.next().context("--preview requires an address")?;
                args.preview = Some(parse_location(address)?);
            }
            "--options" => {
                args.options = Some(iter.next().context("--options requires a file")?.clone());
            }
            "--demo" => {
                args.demo = Some(iter.next().context("--demo requires a tab name")?.clone());
            }
            "--lint" => args.lint = true,
            "--list-demos" => args.list_demos = true,
            "-v" | "--verbose" => args.verbose = true,
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            flag if flag.starts_with('-') => bail!("Unknown option: {}", flag),
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    if args.demo.is_none() {
        args.input = positional.next();
    }
    args.output = positional.next();
    if let Some(extra) = positional.next() {
        bail!("Unexpected argument: {}", extra);
    }

    Ok(args)
}

fn load_source(args: &Args) -> Result<String> {
    if let Some(name) = &args.demo {
        let tab = tabline_library::get_tab(name)
            .with_context(|| format!("No demo tab named '{}' (see --list-demos)", name))?;
        return Ok(tab.content);
    }
    let path = args.input.as_ref().context("No input file given")?;
    fs::read_to_string(path).with_context(|| format!("Error reading file '{}'", path))
}

fn load_options(args: &Args) -> Result<CompileOptions> {
    match &args.options {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("Error reading options '{}'", path))?;
            Ok(CompileOptions::from_yaml(&source)?)
        }
        None => Ok(CompileOptions::default()),
    }
}

fn run(args: &Args) -> Result<()> {
    if args.list_demos {
        for name in tabline_library::list_tabs() {
            println!("{}", name);
        }
        return Ok(());
    }

    let source = load_source(args)?;
    let options = load_options(args)?;

    let json = if args.lint {
        let document = tabline::parse(&source)?;
        serde_json::to_string_pretty(&tabline::lint(&document))?
    } else {
        let compiled = match &args.preview {
            Some(location) => tabline::preview_with_options(&source, location, &options)?,
            None => tabline::compile_with_options(&source, &options)?,
        };
        tracing::info!(
            entries = compiled.metadata.len(),
            playable = compiled.playable_count(),
            seconds = compiled.duration_seconds(),
            "compiled"
        );
        serde_json::to_string_pretty(&compiled)?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &json).with_context(|| format!("Error writing to '{}'", path))?;
            eprintln!("Wrote {} to {}", if args.lint { "diagnostics" } else { "timeline" }, path);
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let raw: Vec<String> = env::args().skip(1).collect();

    if raw.is_empty() {
        print_usage();
        process::exit(1);
    }

    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    run(&args)
}
