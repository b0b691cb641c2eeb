use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::Once;
use vexpr::prelude::*;

static TRACING_INIT: Once = Once::new();

///
/// Install a subscriber, only if `RUST_LOG` asks for one.
///
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_writer(io::stderr))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

///
/// A line of input: either a session command or an expression.
///
enum Command<'a> {
    Set(&'a str, &'a str),
    Unset(&'a str),
    Vars,
    Quit,
    Eval(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return Some(Self::Eval(line));
        };

        let (head, rest) = command.split_once(' ').unwrap_or((command, ""));
        match head {
            "set" => rest
                .split_once('=')
                .map(|(name, value)| Self::Set(name.trim(), value.trim())),
            "unset" => Some(Self::Unset(rest.trim())),
            "vars" => Some(Self::Vars),
            "quit" | "q" => Some(Self::Quit),
            _ => None,
        }
    }
}

fn evaluate(src: &str, session: &MapSource, env: &EnvSource) -> Result<Constant, Error> {
    let mut expr = Expression::parse(src)?;
    expr.resolve(session);
    expr.resolve(env);
    Ok(expr.evaluate()?)
}

fn main() -> Result<(), io::Error> {
    init_tracing();

    let env = std::env::var("VEXPR_PREFIX")
        .map_or_else(|_| EnvSource::new(), EnvSource::with_prefix);
    let mut session = MapSource::new();
    let mut stdout = io::stdout().lock();

    loop {
        write!(stdout, "{} ", ">".green())?;
        stdout.flush()?;

        let Some(Ok(input)) = io::stdin().lines().next() else {
            writeln!(stdout, "{}", "exiting...".yellow())?;
            std::process::exit(0);
        };
        if input.trim().is_empty() {
            continue;
        }

        match Command::parse(&input) {
            Some(Command::Set(name, value)) => session.set(name, value),
            Some(Command::Unset(name)) => {
                session.remove(name);
            }
            Some(Command::Vars) => {
                for (name, value) in session.iter() {
                    writeln!(stdout, "{} = {value}", name.cyan())?;
                }
            }
            Some(Command::Quit) => {
                writeln!(stdout, "{}", "exiting...".yellow())?;
                return Ok(());
            }
            Some(Command::Eval(src)) => match evaluate(src, &session, &env) {
                Ok(value) => writeln!(
                    stdout,
                    "{} {} {}",
                    "=".green(),
                    value.literal(),
                    format!("({})", value.family()).dimmed()
                )?,
                Err(err) => writeln!(stdout, "{} {err}", "error:".red())?,
            },
            None => writeln!(stdout, "{} unknown command", "error:".red())?,
        }
    }
}
