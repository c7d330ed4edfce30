use std::fmt;

use super::place::{PlaceDetails, PlaceSummary};

pub const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";
pub const FALLBACK_CATEGORY: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebsiteStatus {
    HasWebsite,
    NoWebsite,
}

impl WebsiteStatus {
    pub const ALL: [WebsiteStatus; 2] = [WebsiteStatus::HasWebsite, WebsiteStatus::NoWebsite];

    pub fn as_str(&self) -> &'static str {
        match self {
            WebsiteStatus::HasWebsite => "Has Website",
            WebsiteStatus::NoWebsite => "No Website",
        }
    }

    /// Businesses without a website are the most worth reaching out to.
    pub fn urgency(&self) -> Urgency {
        match self {
            WebsiteStatus::HasWebsite => Urgency::Medium,
            WebsiteStatus::NoWebsite => Urgency::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    pub const ALL: [Urgency; 3] = [Urgency::High, Urgency::Medium, Urgency::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::High => "High",
            Urgency::Medium => "Medium",
            Urgency::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactStatus {
    NotContacted,
    Contacted,
}

impl ContactStatus {
    pub const ALL: [ContactStatus; 2] = [ContactStatus::NotContacted, ContactStatus::Contacted];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::NotContacted => "Not Contacted",
            ContactStatus::Contacted => "Contacted",
        }
    }
}

macro_rules! display_as_str {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(WebsiteStatus, Urgency, ContactStatus);

#[derive(Debug, Clone, PartialEq)]
pub struct Business {
    pub name: String,
    pub address: String,
    pub place_id: String,
    pub categories: Vec<String>,
    pub website_status: WebsiteStatus,
    pub urgency: Urgency,
    pub contact_status: ContactStatus,
    pub url: String,
}

impl Business {
    pub fn from_place(place: &PlaceSummary, details: &PlaceDetails) -> Self {
        let address = place.address().to_string();

        let (website_status, url) = match details.website() {
            Some(website) => (WebsiteStatus::HasWebsite, website.to_string()),
            None => (WebsiteStatus::NoWebsite, maps_search_url(&address)),
        };

        let categories = match place.types.is_empty() {
            true => vec![FALLBACK_CATEGORY.to_string()],
            false => place.types.clone(),
        };

        Business {
            name: place.name.clone(),
            address,
            place_id: place.place_id.clone(),
            categories,
            website_status,
            urgency: website_status.urgency(),
            contact_status: ContactStatus::NotContacted,
            url,
        }
    }
}

/// The address goes in unencoded.
pub fn maps_search_url(address: &str) -> String {
    format!("{}{}", MAPS_SEARCH_URL, address)
}
