use clap::Parser;
use log::info;
use sidetoc::runtime::SyncRuntime;
use sidetoc::{InMemoryDocument, LoadState, RuntimeError, SettingsStore, SyncConfig, TabId, WindowId};
use sidetoc_core::settings::settings_to_map;
use sidetoc_storage::{InMemorySettingsBackend, JsonFileSettingsBackend};
use sidetoc_traits::SettingsBackend;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Prints the live table of contents of an XHTML page.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Options {
    /// The XHTML page to load
    page: PathBuf,

    /// Include h1 headings in the outline
    #[arg(long, default_value_t = false)]
    include_h1: bool,

    /// Deepest heading level to include (clamped to 2..=6)
    #[arg(long)]
    max_depth: Option<u8>,

    /// JSON file holding saved settings
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn main() -> Result<(), RuntimeError> {
    env_logger::init();

    let options = Options::parse();

    let source = fs::read_to_string(&options.page)?;
    let url = format!("file://{}", options.page.display());
    let document = InMemoryDocument::from_xhtml(&source, url)?;

    let backend: Arc<dyn SettingsBackend> = match &options.settings {
        Some(path) => Arc::new(JsonFileSettingsBackend::new(path)),
        None => Arc::new(InMemorySettingsBackend::new()),
    };
    let mut settings = SettingsStore::new(backend).load()?;
    settings.include_h1 |= options.include_h1;
    if let Some(depth) = options.max_depth {
        settings.max_depth = depth;
    }
    // Command-line overrides are not written back to the settings file.
    let store = SettingsStore::new(Arc::new(InMemorySettingsBackend::with_values(
        settings_to_map(&settings.normalized()),
    )));

    let config = SyncConfig::default();
    let settle = config.debounce * 3;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        let mut sync = SyncRuntime::new(store, config);

        let (tab, window) = (TabId(1), WindowId(1));
        sync.open_tab(tab, window, document).await?;
        sync.activate_tab(tab, window).await?;
        sync.open_panel(Some(tab)).await?;
        tokio::time::sleep(settle).await;

        let view = sync.panel_view().await?;
        info!("Panel settled in state {:?}", view.status);
        match view.status {
            LoadState::Ready => {
                println!("{}", view.title);
                println!("{}", view.outline());
            }
            LoadState::Empty => {
                println!("{}", view.title);
                println!("(no headings)");
            }
            LoadState::Error => {
                eprintln!("{}", view.error_message.unwrap_or("Unknown error"));
            }
            LoadState::Loading => eprintln!("Timed out waiting for the page"),
        }

        sync.shutdown().await;
        Ok::<(), RuntimeError>(())
    })
}
