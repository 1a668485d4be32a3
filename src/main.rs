//! Main entry point for the drama-watcher CLI application.

use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use drama_watcher::api::DramaApi;
use drama_watcher::config::Config;
use drama_watcher::player::Player;
use drama_watcher::preference::{FileQualityStore, QualityStore};
use drama_watcher::tui::{Action, App, draw, poll_event};
use log::{debug, info, warn};
use ratatui::prelude::*;
use std::io::{self, stdout};
use std::time::Duration;

/// Command-line arguments for the drama-watcher application.
#[derive(Parser, Debug)]
#[command(
    name = "drama-watcher",
    version,
    about = "A terminal short-drama browser and player",
    long_about = "Browse, search, and watch DramaBox short dramas using a TUI interface."
)]
struct Args {
    /// Log verbosity level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short, long, default_value_t = 1)]
    log: u8,

    /// Preferred video quality in pixels (e.g. 540, 720, 1080)
    #[arg(short, long)]
    quality: Option<u32>,

    /// Video player to use (overrides config and platform default)
    #[arg(short, long)]
    player: Option<String>,

    /// Base URL of the drama API (overrides config)
    #[arg(long)]
    api_url: Option<String>,
}

/// Initialize the terminal for TUI rendering.
fn init_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to its original state.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.log {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    debug!("Log level set to {:?}", log_level);

    // Write a default config on first run
    match Config::create_default_if_missing() {
        Ok(path) => debug!("Config file: {}", path.display()),
        Err(e) => warn!("Could not create default config: {}", e),
    }

    // Load config
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config: {}. Using defaults.", e);
        Config::new()
    });

    // Stored quality preference
    let mut store = match FileQualityStore::open_default() {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("Quality preference unavailable: {}", e);
            None
        }
    };

    let quality = args
        .quality
        .or_else(|| store.as_ref().and_then(|s| s.load()))
        .unwrap_or(config.quality);

    info!("Using quality: {}p", quality);

    // Get player
    let player = match Player::resolve(
        args.player.as_deref(),
        config.player.as_deref(),
        config.player_args.clone(),
    )
    .and_then(|player| player.ensure_installed().map(|_| player))
    {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let base_url = args.api_url.as_deref().unwrap_or(&config.api_base_url);
    let api = match DramaApi::new(base_url, Duration::from_secs(config.request_timeout_secs)) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    info!("Using API: {}", api.base_url());

    // Initialize terminal
    let mut terminal = init_terminal()?;

    // Create app state
    let mut app = App::new(quality, config.episodes_per_page, config.keybindings.clone());

    // Main event loop
    let result = run_app(&mut terminal, &mut app, &api, &player, store.as_mut()).await;

    // Restore terminal
    restore_terminal()?;

    result
}

/// Load the home feed and popular search terms into the app.
async fn load_home(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    api: &DramaApi,
) -> io::Result<()> {
    app.set_loading("Loading dramas...");
    terminal.draw(|f| draw(f, app))?;

    let (feed, popular) = tokio::join!(api.fetch_home_feed(), api.fetch_popular_search());
    app.set_feed(feed);

    match popular {
        Ok(terms) => app.set_popular_searches(terms),
        Err(e) => warn!("Failed to load popular searches: {}", e),
    }

    Ok(())
}

/// Play the current episode and record the outcome on screen.
fn play_current(app: &mut App, player: &Player) {
    let url = app.video_url().map(str::to_string);
    match url {
        Some(url) => match player.play(&url) {
            Ok(()) => app.set_status(&format!("Playing episode {}", app.current_episode)),
            Err(e) => {
                warn!("{}", e);
                app.set_video_error(&e.to_string());
            }
        },
        None => app.set_status("Episode not available"),
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    api: &DramaApi,
    player: &Player,
    mut store: Option<&mut FileQualityStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    load_home(terminal, app, api).await?;

    loop {
        // Draw UI
        terminal.draw(|f| draw(f, app))?;

        // Poll for events
        if let Some(Event::Key(key)) = poll_event(Duration::from_millis(100))? {
            // Any key dismisses the error popup
            app.clear_error();
            let action = app.handle_input(key);

            match action {
                Action::None => {}
                Action::Quit => break,
                Action::Search(ref query) => {
                    app.set_loading(&format!("Searching for '{}'...", query));
                    terminal.draw(|f| draw(f, app))?;

                    match api.search(query).await {
                        Ok(results) => {
                            if results.is_empty() {
                                app.cancel_loading();
                                app.set_error("No results found");
                            } else {
                                app.set_search_results(query, results);
                            }
                        }
                        Err(e) => {
                            app.cancel_loading();
                            app.set_error(&e.to_string());
                        }
                    }
                }
                Action::OpenDrama(ref book_id) => {
                    app.set_loading("Loading drama...");
                    terminal.draw(|f| draw(f, app))?;

                    let (detail, episodes) = tokio::join!(
                        api.fetch_detail(book_id),
                        api.fetch_all_episodes(book_id)
                    );

                    match detail {
                        Ok(drama) => {
                            debug!(
                                "Opened {} with {} episodes",
                                drama.book_name,
                                episodes.len()
                            );
                            app.set_drama(drama, episodes);
                        }
                        Err(e) => {
                            app.cancel_loading();
                            app.set_error(&e.to_string());
                        }
                    }
                }
                Action::Play(_) => play_current(app, player),
                Action::ChangeQuality(quality) => {
                    if let Some(store) = store.as_deref_mut() {
                        if let Err(e) = store.save(quality) {
                            warn!("Failed to save quality preference: {}", e);
                        }
                    }
                    play_current(app, player);
                }
                Action::Refresh => load_home(terminal, app, api).await?,
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
