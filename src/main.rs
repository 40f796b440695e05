use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "argot - Browse a feed of posts from the terminal.

Usage: argot [OPTIONS]

  --url <URL>          Fetch posts from URL instead of the configured feed
  --config <PATH>      Read configuration from PATH
  --version, -V        Show version and exit
  --help,    -h        Show this help message

Keys: ↑/↓ or j/k move, ←/→ page, / filter, enter open, q or ctrl+c quit";

enum Flags {
    Run(argot::app::Options),
    Exit,
}

fn main() -> ExitCode {
    let options = match parse_flags(std::env::args().skip(1)) {
        Ok(Flags::Run(options)) => options,
        Ok(Flags::Exit) => return ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    if let Err(err) = argot::run(options) {
        eprintln!("error: {err:?}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn parse_flags<I: Iterator<Item = String>>(mut args: I) -> Result<Flags, String> {
    let mut options = argot::app::Options::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("argot {}", argot::VERSION);
                return Ok(Flags::Exit);
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                return Ok(Flags::Exit);
            }
            "--url" => {
                let value = args.next().ok_or("--url needs a value")?;
                options.feed_url = Some(value);
            }
            "--config" => {
                let value = args.next().ok_or("--config needs a value")?;
                options.config_file = Some(PathBuf::from(value));
            }
            other => {
                if let Some(value) = other.strip_prefix("--url=") {
                    options.feed_url = Some(value.to_string());
                } else if let Some(value) = other.strip_prefix("--config=") {
                    options.config_file = Some(PathBuf::from(value));
                } else {
                    return Err(format!("unknown argument {other:?}"));
                }
            }
        }
    }
    Ok(Flags::Run(options))
}
