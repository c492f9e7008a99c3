//! Headless event loop: stdin commands, periodic price refresh, Ctrl-C.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use trendline_api::{ApiClient, BackendApi};
use trendline_config::{Config, DataSourceKind};
use trendline_data::{
    fetch_or_empty, BackendSource, BinanceSource, FallbackSource, MarketSource, OhlcSource,
    SyntheticSource,
};

use crate::display::{describe, header, ConsoleObserver, UpdateClock};
use crate::events::Command;
use crate::input::{parse_command, Input, HELP};
use crate::persist::{FileBackend, MemoryBackend, PersistenceBridge};
use crate::remote::RemoteMirror;
use crate::session::{Session, SessionSettings};

/// How long to wait for queued remote operations on shutdown.
const MIRROR_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Command-line overrides on top of the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub symbol: Option<String>,
    /// Use synthetic bars only and skip the backend.
    pub offline: bool,
    /// Keep trendlines in memory instead of on disk.
    pub memory: bool,
}

type Source = FallbackSource<MarketSource, SyntheticSource>;

/// Run until `quit`, end of input or Ctrl-C.
pub fn run(config: Config, opts: RunOptions) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;
    runtime.block_on(run_loop(config, opts))
}

async fn run_loop(config: Config, opts: RunOptions) -> Result<()> {
    let symbol = opts
        .symbol
        .clone()
        .unwrap_or_else(|| config.general.default_symbol.clone())
        .to_ascii_uppercase();
    let source = build_source(&config, opts.offline)?;
    log::info!("price data from {}", source.name());

    let mut session = Session::new(&symbol, open_store(&config, opts.memory), SessionSettings::from(&config.chart));
    let mut mirror_task = None;
    if config.api.remote_sync && !opts.offline {
        let (mirror, handle) = RemoteMirror::spawn(BackendApi::new(api_client(&config)?));
        session = session.with_mirror(mirror);
        mirror_task = Some(handle);
    }
    session.add_observer(ConsoleObserver::new(&symbol));

    println!("{HELP}");
    if !config.general.symbols.is_empty() {
        println!("symbols: {}", config.general.symbols.join(" "));
    }
    let mut clock = UpdateClock::new();
    load(&source, &mut session, &symbol, &mut clock).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut refresh = tokio::time::interval(config.data.refresh_interval());
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately; the initial load already happened.
    refresh.tick().await;
    let mut label_tick = tokio::time::interval(Duration::from_secs(1));
    label_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut status = clock.label(Instant::now());

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(Input::Help)) => println!("{HELP}"),
                    Ok(Some(Input::List)) => print_list(&session, &status),
                    Ok(Some(Input::Command(Command::Quit))) => break,
                    Ok(Some(Input::Command(Command::SwitchSymbol(next)))) => {
                        if config.general.is_known_symbol(&next) {
                            load(&source, &mut session, &next, &mut clock).await;
                        } else {
                            eprintln!("unknown symbol {next}; available: {}", config.general.symbols.join(" "));
                        }
                    }
                    Ok(Some(Input::Command(Command::Refresh))) => {
                        let current = session.symbol().to_string();
                        load(&source, &mut session, &current, &mut clock).await;
                    }
                    Ok(Some(Input::Command(cmd))) => session.execute(cmd),
                    Err(e) => eprintln!("{e}"),
                },
                Ok(None) => {
                    log::info!("input closed");
                    break;
                }
                Err(e) => {
                    log::warn!("failed to read input: {e}");
                    break;
                }
            },
            _ = refresh.tick() => {
                let current = session.symbol().to_string();
                load(&source, &mut session, &current, &mut clock).await;
            }
            _ = label_tick.tick() => {
                status = clock.label(Instant::now());
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupted");
                break;
            }
        }
    }

    // Dropping the session closes the mirror channel.
    drop(session);
    if let Some(handle) = mirror_task {
        if tokio::time::timeout(MIRROR_DRAIN_TIMEOUT, handle).await.is_err() {
            log::warn!("remote sync did not finish before shutdown");
        }
    }
    Ok(())
}

async fn load(source: &Source, session: &mut Session, symbol: &str, clock: &mut UpdateClock) {
    let candles = fetch_or_empty(source, symbol).await;
    if session.apply_data(symbol, candles) {
        clock.mark(Instant::now());
    }
}

fn print_list(session: &Session, status: &str) {
    println!("{}", header(session.symbol(), session.trendlines().len(), session.last_close()));
    println!("updated: {status}");
    for line in session.trendlines() {
        println!("  {}", describe(line));
    }
    if let Some(selected) = session.selected() {
        println!("selected {}", describe(selected));
    }
}

fn api_client(config: &Config) -> Result<ApiClient> {
    let api_config = trendline_api::Config::new(config.api.base_url.as_str()).with_timeout(config.api.timeout());
    ApiClient::new(api_config).context("failed to create backend client")
}

fn build_source(config: &Config, offline: bool) -> Result<Source> {
    if offline {
        return Ok(FallbackSource::primary_only(MarketSource::Synthetic(SyntheticSource::new())));
    }

    let data = &config.data;
    let primary = match data.source {
        DataSourceKind::Binance => {
            MarketSource::Binance(BinanceSource::new(&data.binance_url, &data.interval, data.limit)?)
        }
        DataSourceKind::Backend => MarketSource::Backend(BackendSource::new(api_client(config)?)),
        DataSourceKind::Synthetic => MarketSource::Synthetic(SyntheticSource::new()),
    };

    let fallback = data.synthetic_fallback && data.source != DataSourceKind::Synthetic;
    Ok(if fallback {
        FallbackSource::new(primary, SyntheticSource::new())
    } else {
        FallbackSource::primary_only(primary)
    })
}

fn open_store(config: &Config, memory: bool) -> PersistenceBridge {
    let key = config.storage.key.as_str();
    if memory {
        return PersistenceBridge::new(MemoryBackend::new(), key);
    }
    let dir = config.storage.get_dir();
    log::info!("trendlines stored under {}", dir.display());
    PersistenceBridge::new(FileBackend::new(dir), key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_source_is_synthetic() {
        let source = build_source(&Config::default(), true).unwrap();
        assert_eq!(source.name(), "synthetic");
    }

    #[test]
    fn test_binance_source_from_config() {
        let source = build_source(&Config::default(), false).unwrap();
        assert_eq!(source.name(), "binance");
    }

    #[test]
    fn test_file_store_uses_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.dir = Some(dir.path().to_path_buf());

        let store = open_store(&config, false);
        assert_eq!(store.key(), "tradingTrendlines");
        store.save(&[]).unwrap();
        assert!(dir.path().join("tradingTrendlines.json").exists());
    }
}
