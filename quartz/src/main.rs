use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use mica::errors::render_parse_error;
use quartz::interp::Interpreter;
use quartz::ir::cfg;
use quartz::ir::printer::print_ir;
use quartz::{CompileError, Compiler};
use tracing::{debug, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emit {
    Ir,
    Cfg,
}

#[derive(Debug)]
struct Options {
    source_path: PathBuf,
    emit: Emit,
    strict: bool,
    verbose: bool,
    run_args: Option<Vec<i32>>,
}

fn main() {
    let options = match parse_cli(env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("{}", usage());
            std::process::exit(1);
        }
    };

    init_logging(options.verbose);

    if let Err(err) = run(&options) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn usage() -> String {
    "usage: quartz [--strict] [--emit=ir|cfg] [--run=N,N,...] [-v|--verbose] <source-file>"
        .to_string()
}

fn parse_cli(args: impl Iterator<Item = String>) -> Result<Options> {
    let mut source_path: Option<PathBuf> = None;
    let mut emit = Emit::Ir;
    let mut strict = false;
    let mut verbose = false;
    let mut run_args = None;

    for arg in args {
        match arg.as_str() {
            "--strict" => strict = true,
            "-v" | "--verbose" => verbose = true,
            "--emit=ir" => emit = Emit::Ir,
            "--emit=cfg" => emit = Emit::Cfg,
            _ if arg.starts_with("--run=") => {
                let list = arg.trim_start_matches("--run=");
                run_args = Some(parse_run_args(list)?);
            }
            _ if arg.starts_with('-') => bail!("unknown option '{}'", arg),
            _ => {
                if source_path.is_some() {
                    bail!("expected exactly one source file");
                }
                source_path = Some(PathBuf::from(arg));
            }
        }
    }

    let Some(source_path) = source_path else {
        bail!("missing source file");
    };

    Ok(Options {
        source_path,
        emit,
        strict,
        verbose,
        run_args,
    })
}

fn parse_run_args(list: &str) -> Result<Vec<i32>> {
    if list.trim().is_empty() {
        return Ok(Vec::new());
    }
    list.split(',')
        .map(|item| {
            item.trim()
                .parse::<i32>()
                .with_context(|| format!("invalid --run argument '{}'", item))
        })
        .collect()
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .init();
}

fn run(options: &Options) -> Result<()> {
    let source = fs::read_to_string(&options.source_path)
        .with_context(|| format!("failed to read '{}'", options.source_path.display()))?;

    let module_name = module_name(&options.source_path);
    let compiler = Compiler::new().strict(options.strict);
    let module = compiler
        .compile_source(&source, &module_name)
        .map_err(|err| match err {
            CompileError::Parse(parse) => anyhow!(render_parse_error(&source, &parse)),
            other => anyhow!(other),
        })?;
    debug!(module = %module.name, functions = module.functions.len(), "compiled");

    if let Some(args) = &options.run_args {
        let function = module
            .functions
            .first()
            .ok_or_else(|| anyhow!("module has no functions"))?;
        let result = Interpreter::new()
            .run(function, args)
            .with_context(|| format!("running '{}'", function.name))?;
        println!("{}", result);
        return Ok(());
    }

    match options.emit {
        Emit::Ir => print_ir(&module),
        Emit::Cfg => {
            for function in &module.functions {
                print!("{}", cfg::to_dot(function));
            }
        }
    }
    Ok(())
}

fn module_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "main".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_single_path() {
        let options = parse_cli(args(&["prog.mc"])).unwrap();
        assert_eq!(options.source_path, PathBuf::from("prog.mc"));
        assert_eq!(options.emit, Emit::Ir);
        assert!(!options.strict);
    }

    #[test]
    fn rejects_missing_and_extra_paths() {
        assert!(parse_cli(args(&[])).is_err());
        assert!(parse_cli(args(&["a.mc", "b.mc"])).is_err());
    }

    #[test]
    fn parses_flags() {
        let options = parse_cli(args(&["--strict", "--emit=cfg", "--run=2, 3", "x.mc"])).unwrap();
        assert!(options.strict);
        assert_eq!(options.emit, Emit::Cfg);
        assert_eq!(options.run_args, Some(vec![2, 3]));
    }

    #[test]
    fn rejects_bad_run_args() {
        assert!(parse_cli(args(&["--run=1,x", "x.mc"])).is_err());
    }

    fn temp_source(tag: &str, contents: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be valid")
            .as_nanos();
        let mut path = env::temp_dir();
        path.push(format!("quartz_{}_{}.mc", tag, stamp));
        fs::write(&path, contents).expect("temp file should be writable");
        path
    }

    fn options_for(path: PathBuf) -> Options {
        Options {
            source_path: path,
            emit: Emit::Ir,
            strict: false,
            verbose: false,
            run_args: None,
        }
    }

    #[test]
    fn run_reports_missing_file() {
        let mut path = env::temp_dir();
        path.push("quartz_missing_source_does_not_exist.mc");
        let err = run(&options_for(path)).unwrap_err();
        assert!(format!("{:#}", err).starts_with("failed to read"), "{:#}", err);
    }

    #[test]
    fn run_renders_parse_error_with_caret() {
        let path = temp_source("parse_error", "f() {\n  return @\n}");
        let result = run(&options_for(path.clone()));
        fs::remove_file(&path).expect("temp file should be removable");

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.starts_with("parse error at line 2, column 10"), "{}", message);
        assert!(message.ends_with("  return @\n         ^"), "{}", message);
    }

    #[test]
    fn run_reports_strict_generation_failure() {
        let path = temp_source("strict", "f() { return y }");
        let mut options = options_for(path.clone());
        options.strict = true;
        let result = run(&options);
        fs::remove_file(&path).expect("temp file should be removable");

        let message = format!("{:#}", result.unwrap_err());
        assert_eq!(message, "use of undeclared variable 'y'");
    }

    #[test]
    fn run_succeeds_on_valid_source() {
        let path = temp_source("valid", "f(a, b) { return a + b }");
        let mut options = options_for(path.clone());
        options.run_args = Some(vec![2, 3]);
        let result = run(&options);
        fs::remove_file(&path).expect("temp file should be removable");
        assert!(result.is_ok());
    }

    #[test]
    fn module_name_uses_file_stem() {
        assert_eq!(module_name(Path::new("dir/loop.mc")), "loop");
    }
}
