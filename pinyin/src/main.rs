use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use hintjump_core::EffectKind;
use hintjump_pinyin::{pinyin_engine, GridHost, InputEvent, Key, KeyInput, PinyinConfig, SessionState};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hintjump")]
#[command(about = "Jump to on-screen text by label, matching Han text through pinyin")]
#[command(version)]
struct Cli {
    /// Text units, one per line (defaults to stdin)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Query to search for, e.g. "nihao" or "nh"
    #[arg(short, long)]
    query: String,

    /// Label keystrokes typed after the hints appear
    #[arg(short, long, default_value = "")]
    keys: String,

    /// Only the first N lines are on screen
    #[arg(long)]
    rows: Option<usize>,

    /// PinyinConfig TOML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the overlay snapshot and outcome as JSON
    #[arg(long)]
    json: bool,
}

fn read_lines(file: Option<&PathBuf>) -> anyhow::Result<Vec<String>> {
    let mut content = String::new();
    match file {
        Some(path) => {
            content = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        }
        None => {
            io::stdin().read_to_string(&mut content).context("failed to read stdin")?;
        }
    }
    Ok(content.lines().map(str::to_string).collect())
}

fn excerpt(host: &GridHost, row: usize, start: usize, len: usize) -> String {
    host.line(row)
        .map(|line| line.chars().skip(start).take(len).collect())
        .unwrap_or_default()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PinyinConfig::load_toml(path)?,
        None => PinyinConfig::default(),
    };
    let lines = read_lines(cli.file.as_ref())?;
    debug!(units = lines.len(), "loaded text");

    let mut host = GridHost::new(lines);
    if let Some(rows) = cli.rows {
        host = host.with_visible_rows(rows);
    }
    let mut engine = pinyin_engine(host, config)?;

    // Double-press the activation key, then submit.
    let activation = engine.config().activation_key();
    engine.process_event(InputEvent::Key(KeyInput::at_ms(activation, 0)));
    engine.process_event(InputEvent::Key(KeyInput::at_ms(activation, 1)));
    engine.process_event(InputEvent::SubmitQuery(cli.query.clone()));

    if engine.state() == SessionState::AwaitingQuery {
        anyhow::bail!("query {:?} has no searchable text", cli.query);
    }

    let hints = engine.context().clone();
    if !cli.json {
        for hint in &hints.hints {
            let span = &hint.span;
            println!(
                "{}\t{}:{}\t{:?}\t{}",
                hint.label,
                span.handle,
                span.start,
                hint.strategy,
                excerpt(engine.host(), span.handle, span.start, span.len)
            );
        }
    }

    for (i, ch) in cli.keys.chars().enumerate() {
        if engine.state() != SessionState::Active {
            break;
        }
        engine.process_event(InputEvent::Key(KeyInput::at_ms(Key::Char(ch), 1_000 + i as u64)));
    }

    let notices: Vec<String> = engine
        .host()
        .effects()
        .iter()
        .filter_map(|e| match &e.kind {
            EffectKind::Notice { message } => Some(message.clone()),
            _ => None,
        })
        .collect();
    let caret = engine.host().caret().cloned();

    if cli.json {
        let overlay = serde_json::to_value(&hints)?;
        let report = serde_json::json!({
            "query": cli.query,
            "overlay": overlay,
            "state": format!("{:?}", engine.state()),
            "caret": caret.as_ref().map(|c| serde_json::json!({
                "row": c.handle,
                "offset": c.offset,
                "at_unit_end": c.at_unit_end,
            })),
            "notices": notices,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for notice in &notices {
            println!("{}", notice);
        }
        match (&caret, engine.state()) {
            (Some(c), _) => println!("jump -> {}:{}", c.handle, c.offset),
            (None, SessionState::Active) => println!("waiting for label ({})", engine.session().buffer().text()),
            (None, _) => {}
        }
    }

    engine.destroy();
    Ok(())
}
