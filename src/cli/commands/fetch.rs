//! One-shot fetch command handler

use anyhow::Context;

use crate::api::ResultsResponse;
use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_fetch(config: Config, page: u32, collections: bool) -> anyhow::Result<()> {
    if page == 0 {
        anyhow::bail!("Page must be a positive integer");
    }

    let state = SharedState::new(config)?;
    let service = &state.photo_service;

    let json = if collections {
        let collections = service
            .collections(page)
            .await
            .with_context(|| format!("Failed to fetch collections page {page}"))?;
        serde_json::to_string_pretty(&ResultsResponse {
            results: collections.items.as_slice(),
        })?
    } else {
        let photos = service
            .photos(page)
            .await
            .with_context(|| format!("Failed to fetch photos page {page}"))?;
        serde_json::to_string_pretty(&ResultsResponse {
            results: photos.items.as_slice(),
        })?
    };

    println!("{json}");
    Ok(())
}
