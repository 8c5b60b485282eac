mod api;
mod config;
mod core;
mod decision;
mod input;
mod notify;
mod player;
mod scheduler;

#[cfg(test)]
mod mock;

use anyhow::{Context, Result};
use api::{SegmentProvider, SponsorBlockClient, VoteApi, YoutubeResolver};
use config::SettingsStore;
use decision::VoteReporter;
use input::LocalSegmentStore;
use notify::{ConsoleNotifier, ConsolePrompt};
use player::{PlaybackState, SimulatedPlayer};
use scheduler::{session_channel, Collaborators, SchedulerTiming, SessionEvent, SkipSession};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// How often the simulated player reports its position
const POSITION_INTERVAL: Duration = Duration::from_millis(250);

const USAGE: &str = "usage: sponsorskip <file-or-url> [--segments FILE] [--duration SECS] [--speed X] [--config FILE]";

/// Command line options
#[derive(Debug)]
struct Args {
    file_path: String,
    segments: Option<String>,
    config: Option<String>,
    duration: f64,
    speed: f64,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut file_path = None;
        let mut segments = None;
        let mut config = None;
        let mut duration = 600.0;
        let mut speed = 1.0;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--segments" => segments = Some(args.next().context("--segments needs a file")?),
                "--config" => config = Some(args.next().context("--config needs a file")?),
                "--duration" => {
                    duration = args
                        .next()
                        .context("--duration needs a value")?
                        .parse()
                        .context("--duration must be a number of seconds")?
                }
                "--speed" => {
                    speed = args
                        .next()
                        .context("--speed needs a value")?
                        .parse()
                        .context("--speed must be a number")?
                }
                "-h" | "--help" => anyhow::bail!(USAGE),
                _ if file_path.is_none() => file_path = Some(arg),
                other => anyhow::bail!("unexpected argument {:?}\n{}", other, USAGE),
            }
        }

        Ok(Self {
            file_path: file_path.context(USAGE)?,
            segments,
            config,
            duration,
            speed,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sponsorskip=info")))
        .init();

    let args = Args::parse(std::env::args().skip(1))?;

    let settings_path = match &args.config {
        Some(path) => path.into(),
        None => SettingsStore::default_path().context("no config directory available")?,
    };
    let store = SettingsStore::new(settings_path);
    let settings = store.load_or_init()?;

    let (provider, votes): (Arc<dyn SegmentProvider>, Arc<dyn VoteApi>) = match &args.segments {
        Some(path) => {
            let local = Arc::new(LocalSegmentStore::open(path)?);
            (local.clone() as Arc<dyn SegmentProvider>, local as Arc<dyn VoteApi>)
        }
        None => {
            let client = Arc::new(SponsorBlockClient::new(
                &settings.api_server,
                &settings.user_id,
                settings.categories.clone(),
            )?);
            (client.clone() as Arc<dyn SegmentProvider>, client as Arc<dyn VoteApi>)
        }
    };

    let (tx, rx) = session_channel();
    let player = Arc::new(SimulatedPlayer::new(args.duration, tx.clone()));
    player.set_speed(args.speed);

    let collaborators = Collaborators {
        player: player.clone(),
        prompt: ConsolePrompt::spawn(),
        config: Arc::new(store),
        reporter: VoteReporter::new(votes, Arc::new(ConsoleNotifier)),
    };
    let session = SkipSession::new(
        collaborators,
        Arc::new(YoutubeResolver::new()),
        provider,
        SchedulerTiming::from(&settings).with_report_rate(POSITION_INTERVAL, player.speed()),
        (tx.clone(), rx),
    );
    let session_task = tokio::spawn(session.run());

    info!("playing {} for {:.0}s at {}x", args.file_path, args.duration, player.speed());
    tx.send(SessionEvent::Started {
        file_path: args.file_path.clone(),
    })
    .context("session closed")?;
    player.play();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut ticker = tokio::time::interval(POSITION_INTERVAL);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let position = player.update();
                if player.state() == PlaybackState::Stopped {
                    info!("playback finished at {:.1}s", position);
                    break;
                }
                tx.send(SessionEvent::Position { position }).context("session closed")?;
            }
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
        }
    }

    player.stop();
    let _ = tx.send(SessionEvent::Stopped);
    let _ = tx.send(SessionEvent::Shutdown);
    session_task.await?;

    Ok(())
}
