use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use invoice_review::{
    init_logging, load_config, Config, Outcome, ReviewError, ReviewSession, SelectedFile,
};

const USAGE: &str = "\
Usage: invoice-review [OPTIONS] IMAGE

Extracts an invoice image, prints the record as JSON and optionally stores
or deletes the order.

Options:
  --config FILE                    JSON configuration file
  --set SECTION[:KEY][@INDEX]=VAL  Edit a field before saving (repeatable)
  --save                           Store the (edited) record
  --delete                         Delete the stored order
  --yes                            Do not ask before deleting
  -h, --help                       Show this help";

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    edits: Vec<EditArg>,
    save: bool,
    delete: bool,
    assume_yes: bool,
    image: PathBuf,
}

#[derive(Debug, PartialEq)]
struct EditArg {
    section: String,
    key: String,
    index: Option<usize>,
    value: String,
}

impl EditArg {
    fn parse(raw: &str) -> Result<Self, String> {
        let (address, value) = raw
            .split_once('=')
            .ok_or_else(|| format!("expected SECTION[:KEY][@INDEX]=VALUE, got '{}'", raw))?;
        let (address, index) = match address.split_once('@') {
            Some((address, index)) => {
                let index = index
                    .parse()
                    .map_err(|_| format!("invalid line item index '{}'", index))?;
                (address, Some(index))
            }
            None => (address, None),
        };
        let (section, key) = address.split_once(':').unwrap_or((address, ""));
        if section.is_empty() {
            return Err(format!("missing section in '{}'", raw));
        }

        Ok(Self {
            section: section.to_string(),
            key: key.to_string(),
            index,
            value: value.to_string(),
        })
    }
}

enum Command {
    Run(Args),
    Help,
}

fn parse_args<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = Args::default();
    let mut image = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--config" => {
                let path = args.next().ok_or("--config needs a file")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--set" => {
                let edit = args.next().ok_or("--set needs an assignment")?;
                parsed.edits.push(EditArg::parse(&edit)?);
            }
            "--save" => parsed.save = true,
            "--delete" => parsed.delete = true,
            "--yes" => parsed.assume_yes = true,
            flag if flag.starts_with('-') => return Err(format!("unknown option '{}'", flag)),
            other if image.is_some() => {
                return Err(format!("unexpected argument '{}'", other))
            }
            other => image = Some(PathBuf::from(other)),
        }
    }

    if parsed.save && parsed.delete {
        return Err("--save and --delete cannot be combined".to_string());
    }
    parsed.image = image.ok_or("missing IMAGE")?;
    Ok(Command::Run(parsed))
}

fn confirm_on_stdin(message: &str) -> bool {
    print!("{} [y/N] ", message);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn report<E: std::fmt::Display>(action: &str, outcome: Outcome<E>) -> bool {
    match outcome {
        Outcome::Applied => true,
        Outcome::Skipped(reason) => {
            eprintln!("{} skipped: {}", action, reason);
            false
        }
        Outcome::Failed(e) => {
            eprintln!("{} failed: {}", action, e);
            false
        }
    }
}

async fn run(args: Args) -> Result<bool, ReviewError> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    init_logging(&config.logging)?;

    let mut session = ReviewSession::from_config(&config)?;
    session.select_file(SelectedFile::from_path(&args.image).await?);
    if !report("Extraction", session.extract().await) {
        return Ok(false);
    }

    if !args.edits.is_empty() {
        session.enter_edit()?;
        for edit in &args.edits {
            session.set_field(&edit.section, &edit.key, edit.value.as_str(), edit.index)?;
        }
    }

    if let Some(record) = session.record() {
        println!("{}", serde_json::to_string_pretty(record)?);
    }

    let ok = if args.save {
        report("Save", session.save().await)
    } else if args.delete {
        let outcome = if args.assume_yes {
            session.delete(&|_: &str| true).await
        } else {
            session.delete(&confirm_on_stdin).await
        };
        report("Delete", outcome)
    } else {
        true
    };
    Ok(ok)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("error: {}\n\n{}", message, USAGE);
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
