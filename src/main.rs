use std::fs;
use std::io::{self, Write};
use std::path::Path;

use age_counter::animate::{Outcome, TokioClock};
use age_counter::config::Config;
use age_counter::form::{self, Session};
use age_counter::notify::{LineCounter, Tray};
use age_counter::render::{self, Card, RenderConfig};
use age_counter::svg::{self, CardStyle, Theme};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use crossterm::tty::IsTty;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    let lines = LineCounter::new();

    let log_lines = lines.clone();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(move || log_lines.writer(io::stderr()))
        .with_target(false)
        .init();

    let today = config.today();
    match config.birthdate {
        Some(birthdate) => run_once(&config, birthdate, today).await,
        None => run_interactive(&config, today, lines).await,
    }
}

async fn run_once(config: &Config, birthdate: NaiveDate, today: NaiveDate) -> Result<()> {
    let age = form::submit(Some(birthdate), today)?;
    let card = Card {
        birthdate,
        today,
        age,
    };

    if let Some(dir) = &config.svg {
        write_svgs(dir, &card, config)?;
    }
    show(card, config.render(), config.json, CancellationToken::new(), io::stdout()).await?;
    Ok(())
}

/// Reads one date per line from stdin, like a form resubmitted until closed.
///
/// Everything written to the terminal goes through `lines` so notifications
/// can find their way back to the line they were shown on.
async fn run_interactive(config: &Config, today: NaiveDate, lines: LineCounter) -> Result<()> {
    let rows = crossterm::terminal::size().map(|(_, rows)| rows).unwrap_or(24);
    let echoes = io::stdin().is_tty();
    let mut tray = Tray::new(lines.clone(), rows);
    let mut session = Session::new();
    let mut playing: Option<JoinHandle<Result<Outcome>>> = None;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    prompt(today, &lines)?;
    loop {
        let deadline = tray.next_dismissal();
        let line = tokio::select! {
            line = input.next_line() => line.context("Failed to read from stdin")?,
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                tray.sweep(Instant::now(), &mut io::stderr())?;
                continue;
            }
        };
        let Some(line) = line else {
            break;
        };
        if echoes {
            // The terminal echoed the Enter key.
            lines.advance(1);
        }

        let entry = match form::parse_entry(&line) {
            Ok(entry) => entry,
            Err(e) => {
                let mut err = lines.writer(io::stderr());
                writeln!(err, "'{}' is not a date ({e}), use YYYY-MM-DD", line.trim())?;
                prompt(today, &lines)?;
                continue;
            }
        };

        let age = match form::submit(entry, today) {
            Ok(age) => age,
            Err(e) => {
                tray.show(e.to_string(), Instant::now(), &mut io::stderr())?;
                prompt(today, &lines)?;
                continue;
            }
        };
        let Some(birthdate) = entry else {
            continue;
        };
        let card = Card {
            birthdate,
            today,
            age,
        };

        let cancel = session.begin();
        if let Some(previous) = playing.take() {
            match previous.await {
                Ok(Ok(outcome)) => debug!(?outcome, "previous submission stopped"),
                Ok(Err(e)) => warn!(error = %e, "previous submission failed"),
                Err(e) => warn!(error = %e, "previous submission panicked"),
            }
        }

        if let Some(dir) = &config.svg {
            if let Err(e) = write_svgs(dir, &card, config) {
                warn!(error = %e, "failed to write SVG cards");
            }
        }

        let render = config.render();
        let json = config.json;
        let lines = lines.clone();
        playing = Some(tokio::spawn(async move {
            let outcome = show(card, render, json, cancel, lines.writer(io::stdout())).await?;
            if outcome == Outcome::Completed {
                prompt(today, &lines)?;
            }
            Ok(outcome)
        }));
    }

    // End of input: let the last card finish counting and the last
    // notification leave the screen.
    if let Some(last) = playing {
        last.await.context("Animation task panicked")??;
    }
    tray.drain(&mut io::stderr())
        .await
        .context("Failed to clear notifications")?;
    Ok(())
}

fn prompt(today: NaiveDate, lines: &LineCounter) -> io::Result<()> {
    let mut out = lines.writer(io::stdout());
    write!(out, "Birth date (YYYY-MM-DD, up to {}): ", form::max_date(today))?;
    out.flush()
}

async fn show(
    card: Card,
    render: RenderConfig,
    json: bool,
    cancel: CancellationToken,
    mut out: impl Write + Send,
) -> Result<Outcome> {
    if json {
        serde_json::to_writer_pretty(&mut out, &card.age).context("Failed to write JSON")?;
        writeln!(out)?;
        return Ok(Outcome::Completed);
    }
    let outcome = render::play(&card, &render, &TokioClock, &cancel, &mut out)
        .await
        .context("Failed to draw the result card")?;
    Ok(outcome)
}

fn write_svgs(dir: &Path, card: &Card, config: &Config) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    for theme in [Theme::Dark, Theme::Light] {
        let style = CardStyle {
            theme,
            separator: config.separator,
            pointer: config.pointer,
        };
        let path = dir.join(format!("age_{}.svg", theme.name()));
        fs::write(&path, svg::generate_svg(card, &style))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote SVG card");
    }

    Ok(())
}
