use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the transforms from src/transforms.rs
// We need to duplicate this here since build scripts can't access src/ modules
const AVAILABLE_TRANSFORMS: &[&str] = &["tree-json", "tree-treeviz", "note-json"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("notes")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert, inspect and import notes")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("convert")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(Arg::new("to").long("to").required(true))
                .arg(Arg::new("from").long("from"))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            AVAILABLE_TRANSFORMS,
                        ))
                        .index(2),
                )
                .arg(Arg::new("from").long("from")),
        )
        .subcommand(
            Command::new("import")
                .arg(
                    Arg::new("files")
                        .required(true)
                        .num_args(1..)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("store")
                        .long("store")
                        .required(true)
                        .value_hint(ValueHint::DirPath),
                ),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue),
        )
        .arg(Arg::new("config").long("config").value_hint(ValueHint::FilePath));

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "notes", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "notes", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "notes", &outdir)?;

    Ok(())
}
