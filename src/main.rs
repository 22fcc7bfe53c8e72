use clap::Parser;
use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tether::compiler::cps::trampoline;
use tether::{
    compile_all, eval_all, register_primitives, CompileOptions, ScopeCheck, SymbolTable,
    TrampolineConfig, VM,
};
use tracing_subscriber::EnvFilter;

/// Run tether programs
#[derive(Debug, Parser)]
#[command(name = "tether", version, about)]
struct Cli {
    /// Source file to run; reads stdin when omitted
    file: Option<PathBuf>,

    /// Print the transformed tree of each top-level form instead of running it
    #[arg(long)]
    expand: bool,

    /// Compile breakpoint calls in nested functions and fail at run time
    #[arg(long)]
    defer_scope_checks: bool,

    /// Fail a trampoline level after this many steps
    #[arg(long, value_name = "N")]
    step_limit: Option<u64>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    trampoline::set_config(TrampolineConfig {
        step_limit: cli.step_limit,
    });

    let symbols = SymbolTable::new();
    let mut vm = VM::new(&symbols);
    vm.set_options(CompileOptions {
        scope_check: if cli.defer_scope_checks {
            ScopeCheck::Defer
        } else {
            ScopeCheck::Reject
        },
    });
    register_primitives(&vm);

    let source = match &cli.file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("error: cannot read {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None if io::stdin().is_terminal() && !cli.expand => return repl(&vm),
        None => {
            let mut source = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut source) {
                eprintln!("error: cannot read stdin: {}", e);
                return ExitCode::FAILURE;
            }
            source
        }
    };

    if cli.expand {
        return match compile_all(&source, &vm) {
            Ok(exprs) => {
                for expr in &exprs {
                    println!("{}", expr.display(vm.symbols()));
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        };
    }

    match eval_all(&source, &vm) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn repl(vm: &VM) -> ExitCode {
    println!("tether {}", env!("CARGO_PKG_VERSION"));
    println!("Type (exit) to quit");
    println!();

    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "(exit)" || input == "exit" {
            break;
        }

        match eval_all(input, vm) {
            Ok(result) if !result.is_nil() => println!("{}", result),
            Ok(_) => {}
            Err(e) => eprintln!("{}", e),
        }
    }

    ExitCode::SUCCESS
}
