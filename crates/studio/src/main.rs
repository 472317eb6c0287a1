use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelsmith_studio::api::StudioApi;
use reelsmith_studio::config::StudioConfig;
use reelsmith_studio::session::Session;

const USAGE: &str = "usage: reelsmith-studio <output-dir> <prompt>...";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelsmith_studio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Arguments ---
    let mut args = std::env::args().skip(1);
    let Some(output_dir) = args.next().map(PathBuf::from) else {
        tracing::error!("{USAGE}");
        std::process::exit(1);
    };
    let prompts: Vec<String> = args.collect();
    if prompts.is_empty() {
        tracing::error!("{USAGE}");
        std::process::exit(1);
    }

    // --- Configuration ---
    let mut config = StudioConfig::from_env();
    config.download_dir = output_dir;
    tracing::info!(
        api_url = %config.api_url,
        download_dir = %config.download_dir.display(),
        "Loaded studio configuration"
    );

    // --- Service ---
    let api = StudioApi::new(config.api_url.clone());
    match api.status().await {
        Ok(status) => tracing::info!(status = %status.status, "Service is up"),
        Err(e) => {
            tracing::error!(error = %e, api_url = %config.api_url, "Service is not reachable");
            std::process::exit(1);
        }
    }

    let mut session = Session::new(api, config.download_dir);

    // --- Scenes ---
    for prompt in prompts {
        let before = session.state().scenes().len();
        session.submit_prompt(prompt).await;
        if session.state().scenes().len() == before {
            continue;
        }
        if let Some(scene_id) = session.state().scenes().last().map(|s| s.id) {
            session.add_to_timeline(scene_id).await;
        }
    }

    // --- Export ---
    let saved = session.export_story().await;

    let state = session.end().await;
    for entry in state.log().entries() {
        println!("{entry}");
    }

    match saved {
        Some(path) => tracing::info!(path = %path.display(), "Story ready"),
        None => {
            tracing::error!("No story was exported");
            std::process::exit(1);
        }
    }
}
