// Command-line interface for notes
//
// This binary converts note content between formats, shows what the library makes of a file,
// and imports files into a directory of note records.
//
// The core capabilities use the note-babel crate; this crate only deals with files, flags,
// configuration and logging.
//
// Usage:
//  notes <input> --to <format> [--from <format>] [--output <file>]  - Convert between formats (default)
//  notes convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above (explicit)
//  notes inspect <path> [<transform>] [--from <format>]  - Execute a transform (defaults to "tree-treeviz")
//  notes import <files...> --store <dir>                 - Split files into notes and store them
//  notes --list-transforms                                - List available transforms
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix and passes the parameters to the format/transform.
// Example:
//  notes convert note.md --to markdown --extra-replace-data-url-images

mod logging;
mod store;
mod transforms;

use chrono::{DateTime, Utc};
use clap::{Arg, ArgAction, Command, ValueHint};
use note_babel::formats::markdown::REPLACE_DATA_URL_IMAGES;
use note_babel::import::{import_files, ImportFile, SplitRules};
use note_babel::FormatRegistry;
use note_config::{Loader, NotesConfig};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::store::JsonDirStore;

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = if let Some(key) = arg.strip_prefix("--extra-") {
            Some(key)
        } else {
            arg.strip_prefix("--extras-")
        };

        if let Some(key) = key_opt {
            let has_value = args
                .get(i + 1)
                .is_some_and(|next| !next.starts_with('-'));

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("notes")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for converting, inspecting and importing notes")
        .long_about(
            "notes works with note content in HTML, Markdown and plain text.\n\n\
            Commands:\n  \
            - convert: Transform between formats (html, markdown, text, json, treeviz)\n  \
            - inspect: View the normalized tree or the note record for a file\n  \
            - import:  Split text/Markdown files into notes and store them as JSON\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass format-specific options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            notes inspect note.md                    # View tree visualization\n  \
            notes note.html --to markdown            # Convert to markdown (stdout)\n  \
            notes import journal.txt --store notes/  # Import a multi-note file",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-transforms")
                .long("list-transforms")
                .help("List available transforms")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a notes.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log debug output to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level or filter directives (overrides --verbose)")
                .global(true),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect how a file is understood")
                .long_about(
                    "View the normalized tree or the note record produced for a file.\n\n\
                    Transforms:\n  \
                    - tree-treeviz: tree visualization (default)\n  \
                    - tree-json:    tree as JSON\n  \
                    - note-json:    note record with title and keywords\n\n\
                    Extra Parameters:\n  \
                    --extra-ast-full      List every text leaf with its marks\n\n\
                    Examples:\n  \
                    notes inspect note.md                    # Tree visualization (default)\n  \
                    notes inspect note.html note-json        # Record the store would receive",
                )
                .arg(
                    Arg::new("path")
                        .help("Path to the input file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply. Defaults to 'tree-treeviz'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between formats (default command)")
                .long_about(
                    "Convert note content between formats.\n\n\
                    Supported formats:\n  \
                    - html:     Sanitized HTML fragment (.html)\n  \
                    - markdown: CommonMark with GitHub extensions (.md)\n  \
                    - text:     Plain text, one paragraph per line (.txt)\n  \
                    - json:     Document tree as JSON (.json)\n  \
                    - treeviz:  Tree visualization (output only)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Split files into notes and store them")
                .long_about(
                    "Import text, Markdown and HTML files as notes.\n\n\
                    Text and Markdown files are split into several notes at runs of three or\n\
                    more blank lines; a trailing ISO date line becomes the note's date. HTML\n\
                    files become one note each. Every note is written to the store directory\n\
                    as <id>.json. Press Ctrl-C to stop after the current file.",
                )
                .arg(
                    Arg::new("files")
                        .help("Files to import")
                        .required(true)
                        .num_args(1..)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("store")
                        .long("store")
                        .help("Directory receiving the note records")
                        .required(true)
                        .value_hint(ValueHint::DirPath),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Parse extra-* arguments before clap processing
    let (cleaned_args, extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A bare file as first argument means "convert"
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !["inspect", "convert", "import", "help"].contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    let log_level = matches.get_one::<String>("log-level").map(|s| s.as_str());
    if let Err(err) = logging::init_tracing(matches.get_flag("verbose"), log_level) {
        eprintln!("Failed to initialize logging: {err}");
    }

    if matches.get_flag("list-transforms") {
        handle_list_transforms_command();
        return;
    }

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));

    match matches.subcommand() {
        Some(("inspect", sub_matches)) => {
            let Some(path) = sub_matches.get_one::<String>("path") else {
                exit_with("path is required");
            };
            let transform = sub_matches
                .get_one::<String>("transform")
                .map(|s| s.as_str())
                .unwrap_or("tree-treeviz");
            let from = resolve_from(path, sub_matches.get_one::<String>("from"));
            handle_inspect_command(path, &from, transform, &extra_params);
        }
        Some(("convert", sub_matches)) => {
            let (Some(input), Some(to)) = (
                sub_matches.get_one::<String>("input"),
                sub_matches.get_one::<String>("to"),
            ) else {
                exit_with("input and --to are required");
            };
            let from = resolve_from(input, sub_matches.get_one::<String>("from"));
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(input, &from, to, output, &extra_params, &config);
        }
        Some(("import", sub_matches)) => {
            let files: Vec<&String> = sub_matches
                .get_many::<String>("files")
                .map(|values| values.collect())
                .unwrap_or_default();
            let Some(store_dir) = sub_matches.get_one::<String>("store") else {
                exit_with("--store is required");
            };
            handle_import_command(&files, store_dir, &config);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn exit_with(message: &str) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

/// Explicit `--from`, or the format detected from the file extension
fn resolve_from(input: &str, from_arg: Option<&String>) -> String {
    if let Some(f) = from_arg {
        return f.to_string();
    }
    let registry = FormatRegistry::default();
    match registry.detect_format_from_filename(input) {
        Some(detected) => detected,
        None => {
            eprintln!("Error: Could not detect format from filename '{input}'");
            eprintln!("Please specify --from explicitly");
            std::process::exit(1);
        }
    }
}

fn read_input(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    })
}

/// Modification time of a file, or now when the platform does not report one
fn modified_date(path: &Path) -> DateTime<Utc> {
    match fs::metadata(path).and_then(|meta| meta.modified()) {
        Ok(time) => DateTime::<Utc>::from(time),
        Err(err) => {
            debug!(path = %path.display(), %err, "no modification time");
            Utc::now()
        }
    }
}

/// Handle the inspect command
fn handle_inspect_command(
    path: &str,
    from: &str,
    transform: &str,
    extra_params: &HashMap<String, String>,
) {
    let source = read_input(path);
    let date = modified_date(Path::new(path));

    let output = transforms::execute_transform(&source, from, transform, extra_params, date)
        .unwrap_or_else(|e| {
            eprintln!("Execution error: {e}");
            std::process::exit(1);
        });

    println!("{}", output.trim_end());
}

/// Handle the convert command
fn handle_convert_command(
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    extra_params: &HashMap<String, String>,
    config: &NotesConfig,
) {
    let registry = FormatRegistry::default();

    // Validate formats exist
    if let Err(e) = registry.get(from) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    if let Err(e) = registry.get(to) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let source = read_input(input);

    let nodes = registry.parse(&source, from).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    });

    let format_options = format_options_from_config(to, config, extra_params);
    let result = registry
        .serialize_with_options(&nodes, to, &format_options)
        .unwrap_or_else(|e| {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        });

    match output {
        Some(path) => {
            fs::write(path, result).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        None => print!("{result}"),
    }
}

/// Handle the import command
fn handle_import_command(files: &[&String], store_dir: &str, config: &NotesConfig) {
    let mut store = JsonDirStore::open(store_dir).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&cancel);
    if let Err(err) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed)) {
        warn!(%err, "cannot install Ctrl-C handler");
    }

    let mut inputs = Vec::with_capacity(files.len());
    for path in files {
        let path = Path::new(path.as_str());
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Skipping '{}': {e}", path.display());
                continue;
            }
        };
        inputs.push(ImportFile {
            name,
            mime_type: String::new(),
            last_modified: modified_date(path).timestamp_millis(),
            content,
        });
    }

    let rules = SplitRules::from(&config.import);
    let summary = import_files(&inputs, &rules, &mut store, &cancel);

    for message in &summary.messages {
        eprintln!("{message}");
    }
    for id in &summary.note_ids {
        println!("{id}");
    }
    if summary.cancelled {
        eprintln!("Import cancelled");
        std::process::exit(130);
    }
}

/// Handle the list-transforms command
fn handle_list_transforms_command() {
    println!("Available transforms:\n");
    for transform_name in transforms::AVAILABLE_TRANSFORMS {
        println!("  {transform_name}");
    }

    println!("\nConversion formats:");
    let registry = FormatRegistry::default();
    for format_name in registry.list_formats() {
        println!("  {format_name}");
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> NotesConfig {
    let loader = Loader::new().with_optional_file("notes.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

/// Configured defaults for the target format, overridden by `--extra-*` parameters
fn format_options_from_config(
    to: &str,
    config: &NotesConfig,
    extra_params: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut options = HashMap::new();
    if to == "markdown" && config.markdown.replace_data_url_images {
        options.insert(REPLACE_DATA_URL_IMAGES.to_string(), "true".to_string());
    }
    for (key, value) in extra_params {
        options.insert(key.clone(), value.clone());
    }
    options
}
