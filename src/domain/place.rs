use serde::Deserialize;

/// Categories searched when the configuration does not list any.
pub const DEFAULT_PLACE_TYPES: [&str; 47] = [
    "art_gallery",
    "bakery",
    "bank",
    "bar",
    "beauty_salon",
    "bicycle_store",
    "book_store",
    "bowling_alley",
    "cafe",
    "campground",
    "clothing_store",
    "convenience_store",
    "department_store",
    "electrician",
    "electronics_store",
    "florist",
    "funeral_home",
    "gym",
    "hair_care",
    "home_goods_store",
    "jewelry_store",
    "laundry",
    "library",
    "liquor_store",
    "locksmith",
    "lodging",
    "meal_delivery",
    "meal_takeaway",
    "movie_rental",
    "moving_company",
    "museum",
    "night_club",
    "painter",
    "pet_store",
    "physiotherapist",
    "plumber",
    "restaurant",
    "roofing_contractor",
    "rv_park",
    "shoe_store",
    "shopping_mall",
    "spa",
    "storage",
    "store",
    "supermarket",
    "travel_agency",
    "veterinary_care",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// `lat,lng` as the places api expects it in the `location` parameter.
    pub fn to_query_value(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Center and radius shared by every category search in a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchArea {
    pub center: Coordinates,
    pub radius_meters: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbySearchRequest {
    pub area: SearchArea,
    pub place_type: String,
    pub page_token: Option<String>,
}

impl NearbySearchRequest {
    pub fn new(area: SearchArea, place_type: &str) -> Self {
        NearbySearchRequest {
            area,
            place_type: place_type.to_string(),
            page_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceSummary {
    pub place_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl PlaceSummary {
    /// Nearby search only fills `vicinity`, text search fills `formatted_address`.
    pub fn address(&self) -> &str {
        self.formatted_address
            .as_deref()
            .filter(|a| !a.is_empty())
            .or(self.vicinity.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub website: Option<String>,
}

impl PlaceDetails {
    pub fn website(&self) -> Option<&str> {
        self.website.as_deref().filter(|w| !w.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NearbySearchPage {
    pub results: Vec<PlaceSummary>,
    pub next_page_token: Option<String>,
}
