mod debug_report;

use clap::Parser;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use thiserror::Error;
use timexer::{Context, Options, Token, ValueError, tag};

/// Tag temporal expressions in analysed Estonian text.
///
/// Input is a JSON array of tokens (`{"text": "homme", "analyses": [{"lemma":
/// "homme", "pos": "D"}]}`), or plain text, which is split on whitespace and
/// tagged without morphology.
#[derive(Debug, Parser)]
#[command(name = "timexer", version)]
struct Cli {
    /// Input file; stdin when omitted.
    input: Option<PathBuf>,

    /// Document reference time, `YYYY-MM-DD[THH:MM]`. Defaults to now.
    #[arg(long)]
    reference: Option<String>,

    /// Print the TIMEX3 annotations as JSON.
    #[arg(long)]
    json: bool,

    /// Also list every candidate, pruned ones included.
    #[arg(short, long)]
    verbose: bool,

    /// Keep ranges as one expression instead of a duration with endpoints.
    #[arg(long)]
    no_split: bool,

    #[arg(long)]
    no_color: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid --reference: {0}")]
    Reference(#[from] ValueError),
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("error: {err}");
        std::process::exit(match err {
            CliError::Io(_) => 1,
            _ => 2,
        });
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let source = match &cli.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let tokens = read_tokens(&source)?;

    let context = match &cli.reference {
        Some(text) => Context::parse(text)?,
        None => Context::default(),
    };
    let options = Options { split_ranges: !cli.no_split, ..Options::default() };
    let out = tag(tokens, &context, &options);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&out.timexes)?);
    } else {
        let color = !cli.no_color && io::stdout().is_terminal();
        debug_report::print_run(&out, cli.verbose, color);
    }
    Ok(())
}

fn read_tokens(source: &str) -> Result<Vec<Token>, CliError> {
    if source.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(source)?);
    }
    let mut tokens = Vec::new();
    let mut offset = 0;
    for word in source.split_whitespace() {
        let at = source[offset..].find(word).map_or(offset, |i| offset + i);
        tokens.push(Token::new(word).at(at));
        offset = at + word.len();
    }
    Ok(tokens)
}
