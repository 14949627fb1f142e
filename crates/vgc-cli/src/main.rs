use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::{Context, IntoDiagnostic};

use vgc_codegen::CppCodeGenerator;
use vgc_compiler::{CompileContext, CompilerManager};
use vgc_ir::Severity;

/// vgc — voxel graph compiler
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Input graph JSON file
    input: PathBuf,

    /// Optimization level: 0 or 1
    #[arg(long, default_value = "1", value_parser = parse_opt_level)]
    opt_level: u8,

    /// Dump the compiled step lists to stdout
    #[arg(long)]
    dump: bool,

    /// Emit C++ translation next to the output path (basename, no extension)
    #[arg(long)]
    cpp: Option<String>,

    /// Output directory for emitted files (default: current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Evaluate the Value output at a position, e.g. --sample 1,2,3
    #[arg(long, value_parser = parse_position)]
    sample: Option<[f32; 3]>,

    /// Parameter overrides as name=value (repeatable)
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Compile and report diagnostics without producing output
    #[arg(long)]
    dry_run: bool,
}

fn parse_opt_level(s: &str) -> Result<u8, String> {
    match s {
        "0" => Ok(0),
        "1" => Ok(1),
        _ => Err(format!("invalid optimization level '{s}', expected 0 or 1")),
    }
}

fn parse_position(s: &str) -> Result<[f32; 3], String> {
    let parts: Result<Vec<f32>, _> = s.split(',').map(|p| p.trim().parse::<f32>()).collect();
    match parts.as_deref() {
        Ok([x, y, z]) => Ok([*x, *y, *z]),
        _ => Err(format!("invalid position '{s}', expected x,y,z")),
    }
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("invalid parameter '{s}', expected name=value"))
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> miette::Result<()> {
    let cli = Cli::parse();

    // 1. Read and parse the authored graph.
    let source = std::fs::read_to_string(&cli.input)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", cli.input.display()))?;
    let graph = vgc_graph::parse(&source)
        .map_err(|e| miette::miette!("{e}"))
        .wrap_err("graph parse failed")?;

    // 2. Compile every permutation, with fallback when optimizing.
    let mut context = CompileContext::default();
    for (name, value) in &cli.params {
        context.parameters.insert(name.clone(), value.clone());
    }
    let manager = CompilerManager::new(&graph, &context);
    let outcome = if cli.opt_level == 0 {
        manager.compile(false)
    } else {
        manager.compile_with_fallback()
    };

    // 3. Report diagnostics.
    for diagnostic in &outcome.diagnostics {
        match diagnostic.severity {
            Severity::Info => log::info!("{diagnostic}"),
            _ => eprintln!("{diagnostic}"),
        }
    }
    let Some(bundle) = outcome.bundle else {
        return Err(miette::miette!(
            "graph {} failed to compile ({} targets requested)",
            graph.name,
            graph.permutations().len()
        ));
    };

    log::info!(
        "compiled {} targets for graph {}",
        bundle.len(),
        graph.name
    );

    if cli.dry_run {
        return Ok(());
    }

    // 4. Optional outputs.
    if cli.dump {
        print!("{}", vgc_ir::dump_bundle(&bundle));
    }

    if let Some([x, y, z]) = cli.sample {
        let instance = vgc_generator::GraphInstance::new(std::sync::Arc::new(bundle.clone()));
        match instance.sample_target("Value", 0, x, y, z) {
            Some(value) => println!("Value({x}, {y}, {z}) = {value:?}"),
            None => eprintln!("Value target missing from bundle"),
        }
    }

    if let Some(basename) = &cli.cpp {
        let header_name = format!("{basename}.h");
        let generated = CppCodeGenerator::new(&bundle, &graph.name)
            .generate(&header_name)
            .map_err(|e| miette::miette!("{e}"))
            .wrap_err("C++ translation failed")?;

        let directory = cli.output.clone().unwrap_or_else(|| PathBuf::from("."));
        let header_path = directory.join(&header_name);
        let body_path = directory.join(format!("{basename}.cpp"));
        std::fs::write(&header_path, &generated.header)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to write {}", header_path.display()))?;
        std::fs::write(&body_path, &generated.body)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to write {}", body_path.display()))?;
        println!("wrote {} and {}", header_path.display(), body_path.display());
    }

    Ok(())
}
