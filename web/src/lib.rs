use clap::Parser;
use wasm_bindgen::prelude::*;

mod app;
mod emoji;
mod forehead;
mod home;
mod leaderboard;
mod notice;
mod puzzle;
mod remote;
mod routes;
mod services;
mod storage;
mod team;
mod utils;

#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::WarnLevel>,

    /// Base URL of the remote store, overrides the build-time default
    #[arg(long)]
    remote_url: Option<String>,

    /// Public API key of the remote store, overrides the build-time default
    #[arg(long)]
    remote_key: Option<String>,
}

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::{document, window};

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window()
        .location()
        .hash()
        .unwrap_or_else(|_| "".to_string());

    let (args, rejected) = match Args::try_parse_from(location_hash.split(['#', '&'])) {
        Ok(args) => (args, None),
        Err(err) => (Args::default(), Some(err)),
    };
    if let Some(log_level) = args.verbose.log_level() {
        if let Err(err) = console_log::init_with_level(log_level) {
            gloo::console::error!(format!("Error initializing logger: {}", err));
        }
    }
    if let Some(err) = rejected {
        log::warn!("Ignoring invalid hash arguments: {}", err);
    }

    let config = remote::RemoteConfig::resolve(args.remote_url, args.remote_key);
    match &config {
        Some(config) => log::debug!("remote store: {}", config.url),
        None => log::warn!("No remote store configured, leaderboards are disabled"),
    }

    let root = document()
        .get_element_by_id("app")
        .expect("Could not find id=\"app\" element");

    log::debug!("App started");
    yew::Renderer::<app::App>::with_root_and_props(root, app::AppProps { config }).render();
}
