use std::fs::read_to_string;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser as ClapParser};
use itertools::Itertools;
use thiserror::Error;

use codegen::{CodegenError, CodegenOptions, CompileContext};
use emission::output;
use lexer::{LexError, Lexer};
use parser::{ParseError, Parser};

#[derive(ClapParser, Debug)]
#[command(
    version,
    about,
    long_about = "Compiles C-style expressions into a register machine listing"
)]
struct CLI {
    /// Path to source file
    path: PathBuf,

    /// Where to write the listing, defaults to the source path with a .lst extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of general purpose registers available to variables
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(2..=4))]
    registers: u8,

    /// Specifies a point in the compilation process to stop, only one option can be given
    #[command(flatten)]
    stage_options: StageOptions,
}

#[derive(Args, Debug)]
#[group(required = false, multiple = false)]
struct StageOptions {
    /// Stop after lexer and print the tokens
    #[arg(long)]
    lex: bool,

    /// Stop after parser and print the tree of every item
    #[arg(long)]
    parse: bool,

    /// Print the listing instead of writing it to a file
    #[arg(long)]
    codegen: bool,
}

/// Which stage the compiler should stop at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopStage {
    Lexer,
    Parser,
    CodeGen,
}

impl StopStage {
    fn from_args(options: &StageOptions) -> Option<StopStage> {
        if options.lex {
            Some(StopStage::Lexer)
        } else if options.parse {
            Some(StopStage::Parser)
        } else if options.codegen {
            Some(StopStage::CodeGen)
        } else {
            None
        }
    }
}

/// What a compilation produced before it stopped
#[derive(Debug)]
enum Output {
    /// Human readable dump of an intermediate stage
    Text(String),
    Listing(CompileContext),
}

pub fn main() -> Result<()> {
    env_logger::init();

    let args = CLI::parse();
    let stop_stage = StopStage::from_args(&args.stage_options);
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| listing_path(&args.path));
    let options = CodegenOptions {
        register_count: args.registers as usize,
    };

    run_driver(&args.path, stop_stage, &output_path, options)
}

fn run_driver(
    path: &Path,
    stop_stage: Option<StopStage>,
    output_path: &Path,
    options: CodegenOptions,
) -> Result<()> {
    let source = read_to_string(path)
        .with_context(|| format!("Unable to read source file: {}", path.display()))?;

    let compiled = compile(&source, stop_stage, options)
        .with_context(|| format!("Failed to compile {}", path.display()))?;

    match compiled {
        Output::Text(text) => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", text)?;
        }
        Output::Listing(ctx) => {
            let frame_words = ctx.frame_words();
            let stream = ctx.finish();
            log::debug!(
                "writing {} instructions to {}",
                stream.len(),
                output_path.display()
            );

            output(output_path, &stream, frame_words)
                .with_context(|| format!("Unable to write listing: {}", output_path.display()))?;
        }
    }

    Ok(())
}

/// Run the compiler stages: Lexer, Parser, Codegen.
/// Stages before the stop stage hand their dump back as text.
fn compile(
    source: &str,
    stop_stage: Option<StopStage>,
    options: CodegenOptions,
) -> Result<Output, CompileErr> {
    let tokens = Lexer::new(source).tokenize()?;
    log::debug!("lexed {} tokens", tokens.len());

    if let Some(StopStage::Lexer) = stop_stage {
        let dump = tokens
            .iter()
            .map(|t| format!("{}\t{:?}\t{}", t.line, t.kind, t))
            .join("\n");
        return Ok(Output::Text(dump));
    }

    let program = Parser::new(&tokens).parse()?;
    log::debug!("parsed {} items", program.items.len());

    if let Some(StopStage::Parser) = stop_stage {
        let dump = program.items.iter().map(|item| item.pretty()).join("\n");
        return Ok(Output::Text(dump));
    }

    let mut ctx = CompileContext::new(options);
    ctx.compile_program(&program)?;

    if let Some(StopStage::CodeGen) = stop_stage {
        return Ok(Output::Text(ctx.stream().to_string()));
    }

    Ok(Output::Listing(ctx))
}

fn listing_path(source: &Path) -> PathBuf {
    source.with_extension("lst")
}

#[derive(Error, Debug)]
enum CompileErr {
    #[error("Lexer encountered an error: {0}")]
    Lexer(#[from] LexError),
    #[error("Parser encountered an error: {0}")]
    Parser(#[from] ParseError),
    #[error("Codegen encountered an error: {0}")]
    CodeGen(#[from] CodegenError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(source: &str, stop_stage: StopStage) -> String {
        match compile(source, Some(stop_stage), CodegenOptions::default()).unwrap() {
            Output::Text(text) => text,
            Output::Listing(_) => panic!("expected a text dump"),
        }
    }

    #[test]
    fn lex_stage_dumps_tokens() {
        let dump = text("int a;\na = 1;", StopStage::Lexer);

        assert_eq!(
            dump.lines().collect::<Vec<_>>(),
            [
                "1\tTypeSpecifier\tint",
                "1\tIdentifier\ta",
                "1\tPunctuator\t;",
                "2\tIdentifier\ta",
                "2\tPunctuator\t=",
                "2\tIntLiteral\t1",
                "2\tPunctuator\t;",
            ]
        );
    }

    #[test]
    fn parse_stage_dumps_trees() {
        let dump = text("int a = 2; a * (a + 1);", StopStage::Parser);

        assert_eq!(
            dump,
            "decl a\n  2\nexpr\n  *\n    a\n    + [paren]\n      a\n      1"
        );
    }

    #[test]
    fn codegen_stage_prints_listing() {
        let dump = text("int a; a = a + 1;", StopStage::CodeGen);

        assert_eq!(
            dump,
            "mov r4, r0\nmovi r5, #1\nadd r4, r5\npush r4\n\
             mov r4, bp\nsubi r4, #1\nload r4, [r4]\nmov r0, r4"
        );
    }

    #[test]
    fn full_run_yields_context() {
        let options = CodegenOptions { register_count: 2 };

        match compile("int a, b, c; c = a * b;", None, options).unwrap() {
            Output::Listing(ctx) => {
                assert_eq!(ctx.frame_words(), 2);
                assert_eq!(ctx.symbols().len(), 3);
            }
            Output::Text(_) => panic!("expected a listing"),
        }
    }

    #[test]
    fn stage_errors_are_wrapped() {
        let lex = compile("a @ b;", None, CodegenOptions::default()).unwrap_err();
        let parse = compile("(1 + 2;", None, CodegenOptions::default()).unwrap_err();
        let codegen = compile("x = 1;", None, CodegenOptions::default()).unwrap_err();

        assert!(matches!(lex, CompileErr::Lexer(LexError::UnexpectedChar { .. })));
        assert!(matches!(parse, CompileErr::Parser(ParseError::UnmatchedParen { .. })));
        assert!(matches!(
            codegen,
            CompileErr::CodeGen(CodegenError::UndefinedIdentifier { .. })
        ));
        assert_eq!(
            codegen.to_string(),
            "Codegen encountered an error: line 1: 'x' is not defined"
        );
    }

    #[test]
    fn run_driver_writes_listing() {
        let dir = std::env::temp_dir();
        let source = dir.join(format!("regc-driver-{}.c", std::process::id()));
        let listing = listing_path(&source);
        std::fs::write(&source, "int a = 3;").unwrap();

        run_driver(&source, None, &listing, CodegenOptions::default()).unwrap();
        let written = std::fs::read_to_string(&listing).unwrap();
        std::fs::remove_file(&source).unwrap();
        std::fs::remove_file(&listing).unwrap();

        assert_eq!(written, "; frame: 0 words\n\tmovi r4, #3\n\tmov r0, r4\n");
    }

    #[test]
    fn missing_source_is_reported() {
        let err = run_driver(
            Path::new("/nonexistent/regc/input.c"),
            None,
            Path::new("/nonexistent/regc/input.lst"),
            CodegenOptions::default(),
        )
        .unwrap_err();

        assert!(err.to_string().starts_with("Unable to read source file"));
    }

    #[test]
    fn default_listing_path() {
        assert_eq!(
            listing_path(Path::new("dir/prog.c")),
            PathBuf::from("dir/prog.lst")
        );
    }

    #[test]
    fn cli_parses_options() {
        let args = CLI::parse_from(["regc", "prog.c", "--registers", "2", "--parse"]);

        assert_eq!(args.registers, 2);
        assert_eq!(
            StopStage::from_args(&args.stage_options),
            Some(StopStage::Parser)
        );
        assert!(CLI::try_parse_from(["regc", "prog.c", "--registers", "5"]).is_err());
        assert!(CLI::try_parse_from(["regc", "prog.c", "--lex", "--parse"]).is_err());
    }
}
