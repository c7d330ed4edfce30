use anyhow::Context;

use crate::{
    configuration::{Credentials, Settings},
    services::{HarvestStats, Harvester, NotionClient, PlacesClient},
};

/// Runs one full harvest. Errors returned from here are fatal; per-place
/// failures are logged and counted in the returned stats instead.
pub async fn run(settings: &Settings, credentials: &Credentials) -> anyhow::Result<HarvestStats> {
    let mut notion_client = NotionClient::new(&settings.notion, credentials)
        .context("Failed to create Notion client")?;
    notion_client.ensure_database().await?;
    log::info!("Using Notion database {}", notion_client.database_id());

    let places_client = PlacesClient::new(
        credentials.google_places_api_key.clone(),
        &settings.google_places.base_url,
    )
    .context("Failed to create Google Places client")?;

    let harvester = Harvester::new(
        &places_client,
        &notion_client,
        settings.search.area(),
        settings.search.page_delay(),
    );
    let stats = harvester.run(&settings.search.place_types()).await;

    log::info!("Finished harvest: {}", stats);
    Ok(stats)
}
