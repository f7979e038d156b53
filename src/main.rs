// src/main.rs
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    terminal,
};
use ratatui::prelude::*;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

mod config;
mod filters;
mod input;
mod loading;
mod models;
mod network;
mod theme;
mod ui;

use crate::config::Settings;
use crate::filters::{FILTER_SLOT, FilterStore};
use crate::loading::LoadingState;
use crate::models::{DashboardPanel, FocusArea, LaunchesPanel, StarlinkPanel, View};
use crate::network::SpacexClient;
use crate::theme::Theme;

#[derive(Parser)]
#[command(
    name = "spacedash",
    version,
    about = "SpaceX launches, rockets and Starlink in the terminal"
)]
struct Cli {
    /// View to open at startup
    #[arg(long, value_enum)]
    view: Option<View>,

    /// Start with default filters; nothing is restored or persisted this run
    #[arg(long)]
    no_restore: bool,

    /// Override the API base URL from the config
    #[arg(long)]
    api_base: Option<String>,
}

/// Everything the event loop owns: the current view, the filter store, the
/// loading flag and the per-view panels the fetch tasks write into.
pub struct App {
    pub view: View,
    pub focus: FocusArea,
    pub filters: FilterStore,
    pub loading: LoadingState,
    pub client: SpacexClient,
    pub dashboard: Arc<Mutex<DashboardPanel>>,
    pub launches: Arc<Mutex<LaunchesPanel>>,
    pub starlink: Arc<Mutex<StarlinkPanel>>,
    pub selected_rocket: Option<usize>,
    pub selected_launch: Option<usize>,
    pub selected_sat: Option<usize>,
    pub show_details: bool,
    pub detail_scroll: u16,
    pub status: Option<String>,
    pub tick: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::new()?;
    let data_dir = settings.data_dir();
    init_logging(&data_dir)?;

    let base_url = cli.api_base.as_deref().unwrap_or(&settings.api_base_url);
    let client = SpacexClient::new(base_url, Duration::from_secs(settings.request_timeout_secs))?;

    let mut filters = FilterStore::new(data_dir.join(FILTER_SLOT));
    if !cli.no_restore {
        filters.init();
    }

    let rt = Runtime::new()?;
    let mut app = App {
        view: cli.view.unwrap_or(View::Dashboard),
        focus: FocusArea::Sidebar,
        filters,
        loading: LoadingState::new(),
        client,
        dashboard: Arc::new(Mutex::new(DashboardPanel::default())),
        launches: Arc::new(Mutex::new(LaunchesPanel::default())),
        starlink: Arc::new(Mutex::new(StarlinkPanel::default())),
        selected_rocket: None,
        selected_launch: None,
        selected_sat: None,
        show_details: false,
        detail_scroll: 0,
        status: None,
        tick: 0,
    };
    input::spawn_view_fetch(&app, &rt, true);

    terminal::enable_raw_mode()?;
    let stdout = std::io::stdout();
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let theme = Theme::default();

    loop {
        app.tick = app.tick.wrapping_add(1);
        terminal.draw(|f| ui::render(f, &app, &theme))?;

        if event::poll(std::time::Duration::from_millis(200))? {
            if let Event::Key(key_event) = event::read()? {
                if !input::handle_key(key_event.code, &mut app, &rt)? {
                    break;
                }
            }
        }
    }

    terminal::disable_raw_mode()?;
    Ok(())
}

/// Log to a file in the data directory; stderr would tear up the UI.
fn init_logging(data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir)?;
    let log_file = fs::File::create(data_dir.join("spacedash.log"))?;
    let filter = EnvFilter::try_from_env("SPACEDASH_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}
