//! Command-line interface for gillette
//! This binary compiles templates into render routine source and inspects how they parse.
//!
//! Usage:
//!   gillette compile `<path>` [--format `<format>`] [--model `<type>`] [--config `<file>`] [--namespaces]
//!   gillette check `<path>`                                   - Parse only, report the first error
//!   gillette list-formats                                   - List all output formats

use clap::{Arg, ArgAction, ArgMatches, Command};
use gillette::config::{GilletteConfig, Loader};
use gillette::pipeline::TemplateCompiler;

fn main() {
    init_tracing();

    let matches = Command::new("gillette")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A compiler for sigil-delimited text and RTF templates")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("compile")
                .about("Compile a template and print it in the chosen format")
                .arg(
                    Arg::new("path")
                        .help("Path to the template file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (e.g., 'treeviz', 'csharp'); see list-formats"),
                )
                .arg(
                    Arg::new("model")
                        .long("model")
                        .short('m')
                        .help("Qualified type name of the model (e.g., 'Shop.Order')"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("Configuration file layered over the defaults"),
                )
                .arg(
                    Arg::new("namespaces")
                        .long("namespaces")
                        .action(ArgAction::SetTrue)
                        .help("Prepend the target's usual imports to generated source"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Parse a template and report whether it is well formed")
                .arg(
                    Arg::new("path")
                        .help("Path to the template file")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(Command::new("list-formats").about("List available output formats"))
        .get_matches();

    match matches.subcommand() {
        Some(("compile", compile_matches)) => handle_compile_command(compile_matches),
        Some(("check", check_matches)) => {
            handle_check_command(string_arg(check_matches, "path").unwrap_or_default())
        }
        Some(("list-formats", _)) => handle_list_formats_command(),
        _ => unreachable!(),
    }
}

#[cfg(feature = "tracing")]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(not(feature = "tracing"))]
fn init_tracing() {}

fn string_arg<'a>(matches: &'a ArgMatches, name: &str) -> Option<&'a str> {
    matches.get_one::<String>(name).map(String::as_str)
}

fn load_config(matches: &ArgMatches) -> Result<GilletteConfig, config::ConfigError> {
    let mut loader = Loader::new();
    if let Some(path) = string_arg(matches, "config") {
        loader = loader.with_file(path);
    }
    if let Some(model) = string_arg(matches, "model") {
        loader = loader.set_override("model.type_name", model)?;
    }
    if matches.get_flag("namespaces") {
        loader = loader.set_override("emit.include_namespaces", true)?;
    }
    loader.build()
}

/// Handle the compile command
fn handle_compile_command(matches: &ArgMatches) {
    let path = string_arg(matches, "path").unwrap_or_default();
    let config = load_config(matches).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });
    let format = string_arg(matches, "format").unwrap_or(&config.output.format);

    let compiler = TemplateCompiler::from_config(&config);
    let output = compiler
        .load_and_serialize(path, format)
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    print!("{}", output);
}

/// Handle the check command
fn handle_check_command(path: &str) {
    let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    });

    match gillette::parse(&source) {
        Ok(_) => println!("ok"),
        Err(e) => {
            match e.location(&source) {
                Some((line, column)) => eprintln!("{}:{}:{}: {}", path, line, column, e),
                None => eprintln!("{}: {}", path, e),
            }
            std::process::exit(1);
        }
    }
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    let compiler = TemplateCompiler::new();
    let registry = compiler.registry();

    println!("Available output formats:\n");
    for (name, description) in registry.entries() {
        println!("  {:<14}{}", name, description);
    }
}
