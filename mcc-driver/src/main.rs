//! MIPS C Compiler Driver
//!
//! Runs the built-in demo programs through the statement translator and the
//! backend, or lowers a serialized `{ symbols, program }` unit.

mod demos;

use clap::{Parser, Subcommand};
use demos::Demo;
use log::{info, LevelFilter};
use mcc_backend::{compile, generate_assembly, CompilationUnit, LoweringOptions};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mcc")]
#[command(about = "MIPS C Compiler")]
#[command(version = "0.1.0")]
struct Cli {
    /// Log allocation decisions (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile one of the built-in demo programs
    Demo {
        /// Which demo to compile
        #[arg(value_enum)]
        name: Demo,

        /// Output assembly file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the TAC listing before lowering
        #[arg(long)]
        print_tac: bool,

        /// Interleave each TAC instruction as a comment
        #[arg(long)]
        annotate: bool,

        /// Also write the translated unit as JSON
        #[arg(long)]
        save_unit: Option<PathBuf>,
    },

    /// Generate assembly from a serialized unit
    GenerateAsm {
        /// Input unit (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output assembly file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Interleave each TAC instruction as a comment
        #[arg(long)]
        annotate: bool,

        /// Report every spill at info level
        #[arg(long)]
        trace_spills: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Demo {
            name,
            output,
            print_tac,
            annotate,
            save_unit,
        } => {
            let options = LoweringOptions {
                annotate,
                ..LoweringOptions::default()
            };
            if let Err(e) = run_demo(name, output.as_deref(), print_tac, save_unit.as_deref(), &options) {
                eprintln!("Error compiling demo: {}", e);
                std::process::exit(1);
            }
        }
        Commands::GenerateAsm {
            input,
            output,
            annotate,
            trace_spills,
        } => {
            let options = LoweringOptions { annotate, trace_spills };
            if let Err(e) = generate_asm_command(&input, output.as_deref(), &options) {
                eprintln!("Error generating assembly: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// `RUST_LOG` applies unless `--verbose` asks for debug output
fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn run_demo(
    demo: Demo,
    output_path: Option<&Path>,
    print_tac: bool,
    unit_path: Option<&Path>,
    options: &LoweringOptions,
) -> Result<(), Box<dyn Error>> {
    let program = demos::build(demo)?;
    let translation = &program.translation;

    if print_tac {
        println!("TAC:");
        print!("{}", translation.program);
        println!();
    }
    if translation.has_errors() {
        translation.reporter.print_diagnostics();
    }

    let asm_text = compile(translation, &program.symbols, options)?;

    if let Some(path) = unit_path {
        let unit = CompilationUnit {
            symbols: program.symbols.clone(),
            program: translation.program.clone(),
        };
        fs::write(path, unit.to_json()?)?;
        info!("unit written to {}", path.display());
    }

    write_output(&asm_text, output_path)
}

fn generate_asm_command(
    input_path: &Path,
    output_path: Option<&Path>,
    options: &LoweringOptions,
) -> Result<(), Box<dyn Error>> {
    let text = fs::read_to_string(input_path)?;
    let asm_text = lower_unit(&text, options)?;
    write_output(&asm_text, output_path)
}

/// Parse a JSON unit and lower it
fn lower_unit(text: &str, options: &LoweringOptions) -> Result<String, Box<dyn Error>> {
    let unit = CompilationUnit::from_json(text)?;
    let unresolved = unit.program.unresolved();
    if !unresolved.is_empty() {
        return Err(format!("unit has {} unpatched jump(s)", unresolved.len()).into());
    }
    Ok(generate_assembly(&unit.program, &unit.symbols, options)?)
}

fn write_output(asm_text: &str, output_path: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match output_path {
        Some(path) => {
            fs::write(path, asm_text)?;
            println!("Assembly written to: {}", path.display());
        }
        None => print!("{}", asm_text),
    }
    Ok(())
}
