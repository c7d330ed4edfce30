use std::{fmt, time::Duration};

use crate::domain::{business::Business, place::SearchArea};

use super::{BusinessStore, InsertOutcome, NearbyPages, PlaceSearch};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HarvestStats {
    pub pages: u32,
    pub inserted: u32,
    pub duplicates: u32,
    pub detail_failures: u32,
    pub insert_failures: u32,
    pub search_failures: u32,
}

impl fmt::Display for HarvestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pages: {}, inserted: {}, duplicates: {}, detail failures: {}, insert failures: {}, search failures: {}",
            self.pages,
            self.inserted,
            self.duplicates,
            self.detail_failures,
            self.insert_failures,
            self.search_failures
        )
    }
}

pub struct Harvester<'a, S: ?Sized, D: ?Sized> {
    search: &'a S,
    store: &'a D,
    area: SearchArea,
    page_delay: Duration,
}

impl<'a, S, D> Harvester<'a, S, D>
where
    S: PlaceSearch + ?Sized,
    D: BusinessStore + ?Sized,
{
    pub fn new(search: &'a S, store: &'a D, area: SearchArea, page_delay: Duration) -> Self {
        Harvester {
            search,
            store,
            area,
            page_delay,
        }
    }

    pub async fn run(&self, place_types: &[String]) -> HarvestStats {
        let mut stats = HarvestStats::default();

        for place_type in place_types {
            log::info!("Searching for places of type: {}", place_type);
            self.harvest_place_type(place_type, &mut stats).await;
        }

        stats
    }

    async fn harvest_place_type(&self, place_type: &str, stats: &mut HarvestStats) {
        let mut pages = NearbyPages::new(self.search, self.area, place_type, self.page_delay);

        while let Some(page) = pages.next_page().await {
            let page = match page {
                Ok(page) => page,
                Err(e) => {
                    log::error!(
                        "Failed to perform nearby search for {}: {:?}",
                        place_type,
                        e
                    );
                    stats.search_failures += 1;
                    break;
                }
            };

            stats.pages += 1;
            log::info!("Found {} results on this page", page.results.len());

            for place in page.results {
                let details = match self.search.place_details(&place.place_id).await {
                    Ok(details) => details,
                    Err(e) => {
                        log::error!("Failed to get place details for {}: {:?}", place.name, e);
                        stats.detail_failures += 1;
                        continue;
                    }
                };

                let business = Business::from_place(&place, &details);

                match self.store.insert_business(&business).await {
                    Ok(InsertOutcome::Inserted) => {
                        log::info!(
                            "Inserted: Name: {}, Address: {}, Types: {:?}, WebsiteStatus: {}, Urgency: {}",
                            business.name,
                            business.address,
                            business.categories,
                            business.website_status,
                            business.urgency
                        );
                        stats.inserted += 1;
                    }
                    Ok(InsertOutcome::Skipped) => stats.duplicates += 1,
                    Err(e) => {
                        log::error!("Failed to insert {} into Notion: {:?}", business.name, e);
                        stats.insert_failures += 1;
                    }
                }
            }
        }
    }
}
