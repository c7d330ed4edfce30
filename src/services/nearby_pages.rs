use std::time::Duration;

use crate::domain::place::{NearbySearchPage, NearbySearchRequest, SearchArea};

use super::PlaceSearch;

enum PageState {
    First,
    Next(String),
    Done,
}

/// Walks the result pages of one nearby search.
///
/// The provider only accepts a `next_page_token` a short while after issuing it,
/// so every follow-up fetch waits `delay` first. A fetch error is yielded once
/// and then the walk ends.
pub struct NearbyPages<'a, S: ?Sized> {
    search: &'a S,
    request: NearbySearchRequest,
    delay: Duration,
    state: PageState,
    pages_fetched: u32,
}

impl<'a, S: PlaceSearch + ?Sized> NearbyPages<'a, S> {
    pub fn new(search: &'a S, area: SearchArea, place_type: &str, delay: Duration) -> Self {
        NearbyPages {
            search,
            request: NearbySearchRequest::new(area, place_type),
            delay,
            state: PageState::First,
            pages_fetched: 0,
        }
    }

    pub async fn next_page(&mut self) -> Option<anyhow::Result<NearbySearchPage>> {
        match std::mem::replace(&mut self.state, PageState::Done) {
            PageState::Done => return None,
            PageState::First => {}
            PageState::Next(token) => {
                log::info!("Waiting before fetching next page...");
                tokio::time::sleep(self.delay).await;
                self.request.page_token = Some(token);
            }
        }

        self.pages_fetched += 1;
        log::info!(
            "Fetching page {} for {}",
            self.pages_fetched,
            self.request.place_type
        );

        let page = match self.search.nearby_search(&self.request).await {
            Ok(page) => page,
            Err(e) => return Some(Err(e)),
        };

        match page.next_page_token.clone().filter(|t| !t.is_empty()) {
            Some(token) => self.state = PageState::Next(token),
            None => log::info!("No more pages for {}", self.request.place_type),
        }

        Some(Ok(page))
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, sync::Mutex, time::Duration};

    use anyhow::anyhow;
    use async_trait::async_trait;

    use crate::{
        domain::place::{
            Coordinates, NearbySearchPage, NearbySearchRequest, PlaceDetails, SearchArea,
        },
        services::PlaceSearch,
    };

    use super::NearbyPages;

    struct ScriptedSearch {
        pages: Mutex<VecDeque<anyhow::Result<NearbySearchPage>>>,
        requests: Mutex<Vec<NearbySearchRequest>>,
    }

    impl ScriptedSearch {
        fn new(pages: Vec<anyhow::Result<NearbySearchPage>>) -> Self {
            ScriptedSearch {
                pages: Mutex::new(pages.into()),
                requests: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl PlaceSearch for ScriptedSearch {
        async fn nearby_search(
            &self,
            request: &NearbySearchRequest,
        ) -> anyhow::Result<NearbySearchPage> {
            self.requests.lock().unwrap().push(request.clone());
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow!("no more scripted pages")))
        }

        async fn place_details(&self, _place_id: &str) -> anyhow::Result<PlaceDetails> {
            Ok(PlaceDetails::default())
        }
    }

    fn area() -> SearchArea {
        SearchArea {
            center: Coordinates {
                latitude: 0.0,
                longitude: 0.0,
            },
            radius_meters: 100,
        }
    }

    fn page(token: &str) -> anyhow::Result<NearbySearchPage> {
        Ok(NearbySearchPage {
            results: vec![],
            next_page_token: Some(token.to_string()),
        })
    }

    #[tokio::test]
    async fn stops_when_token_is_empty() {
        let search = ScriptedSearch::new(vec![page("A"), page(""), page("B")]);
        let mut pages = NearbyPages::new(&search, area(), "cafe", Duration::ZERO);

        let mut count = 0;
        while let Some(result) = pages.next_page().await {
            result.unwrap();
            count += 1;
        }

        assert_eq!(count, 2);

        let requests = search.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].page_token, None);
        assert_eq!(requests[1].page_token.as_deref(), Some("A"));
        assert_eq!(requests[1].place_type, "cafe");
    }

    #[tokio::test]
    async fn error_ends_the_walk() {
        let search = ScriptedSearch::new(vec![page("A"), Err(anyhow!("boom")), page("")]);
        let mut pages = NearbyPages::new(&search, area(), "bar", Duration::ZERO);

        assert!(pages.next_page().await.unwrap().is_ok());
        assert!(pages.next_page().await.unwrap().is_err());
        assert!(pages.next_page().await.is_none());
        assert_eq!(search.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_before_follow_up_pages() {
        let search = ScriptedSearch::new(vec![page("A"), page("")]);
        let mut pages = NearbyPages::new(&search, area(), "spa", Duration::from_secs(5));

        let start = tokio::time::Instant::now();
        pages.next_page().await.unwrap().unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));

        pages.next_page().await.unwrap().unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
