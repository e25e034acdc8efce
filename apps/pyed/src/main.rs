use clap::Parser;
use colored::Colorize;
use log::debug;
use pyed_core::{ModuleCache, SearchPaths};
use std::path::PathBuf;
use std::process;

/// Open Python modules in your text editor.
///
/// Example: pyed django.urls
#[derive(Debug, Parser)]
#[command(name = "pyed", version, verbatim_doc_comment)]
struct Cli {
    /// Import path to module, function, or class. May be a partial name,
    /// in which case the closest match is opened.
    #[arg(required_unless_present = "install_completion")]
    module: Option<String>,

    /// Editor program (defaults to $PYED_EDITOR, $VISUAL or $EDITOR)
    #[arg(short, long)]
    editor: Option<String>,

    /// Output name, file path, and line number (if applicable) of module
    #[arg(short, long)]
    info: bool,

    /// Extra search roots, tried before the environment's paths
    #[arg(short, long = "path", value_name = "DIR")]
    path: Vec<PathBuf>,

    #[arg(long, hide = true)]
    complete: bool,

    /// Print the shell completion script for $SHELL
    #[arg(long)]
    install_completion: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli);
    process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    if cli.install_completion {
        return match pyed_edit::completion_script() {
            Ok(script) => {
                print!("{script}");
                0
            }
            Err(err) => {
                print_error(&err.to_string());
                1
            }
        };
    }

    // clap guarantees the positional is present past this point
    let Some(module) = cli.module.as_deref() else {
        print_error("missing import path");
        return 2;
    };

    let paths = SearchPaths::from_environment(&cli.path);
    let cache = ModuleCache::new();

    if cli.complete {
        for name in pyed_core::names_with_prefix(&paths, module, &cache) {
            println!("{name}");
        }
        return 0;
    }

    let info = match pyed_core::get_info(&paths, &cache, module) {
        Ok(info) => info,
        Err(err) => {
            debug!("Resolution failed: {}", err);
            print_error(&err.to_string());
            return 1;
        }
    };

    if cli.info {
        let mut out = format!("{} {}", info.name, info.file.display());
        if let Some(line) = info.line {
            out.push_str(&format!(" {line}"));
        }
        println!("{out}");
        return 0;
    }

    println!("Editing {}...", info.name.bold());
    match pyed_edit::edit_file(&info.file, info.line, cli.editor.as_deref()) {
        Ok(0) => {
            println!("{}", "Done!".green());
            0
        }
        Ok(code) => {
            debug!("Editor exited with code {}", code);
            print_error("Editing failed!");
            1
        }
        Err(err) => {
            print_error(&format!("Editing failed: {err}"));
            1
        }
    }
}

fn print_error(message: &str) {
    eprintln!("{}: {}", "ERROR".red(), message);
}
