use std::{fmt, path::Path, time::Duration};

use anyhow::{anyhow, bail, Context};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::place::{Coordinates, SearchArea, DEFAULT_PLACE_TYPES};

pub const ENV_PREFIX: &str = "CANVASS";
const MAX_RADIUS_METERS: u32 = 50_000;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub search: SearchSettings,
    pub google_places: GooglePlacesSettings,
    pub notion: NotionSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SearchSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub latitude: f64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub longitude: f64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub radius_meters: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub page_delay_secs: u64,
    #[serde(default)]
    pub place_types: Vec<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GooglePlacesSettings {
    pub base_url: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct NotionSettings {
    pub base_url: String,
    pub version: String,
    pub database_title: String,
}

impl SearchSettings {
    pub fn area(&self) -> SearchArea {
        SearchArea {
            center: Coordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            radius_meters: self.radius_meters,
        }
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_secs(self.page_delay_secs)
    }

    pub fn place_types(&self) -> Vec<String> {
        match self.place_types.is_empty() {
            true => DEFAULT_PLACE_TYPES.iter().map(|t| t.to_string()).collect(),
            false => self.place_types.clone(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> anyhow::Result<()> {
        let search = &self.search;
        if !(-90.0..=90.0).contains(&search.latitude) {
            bail!("search.latitude {} is out of range", search.latitude);
        }
        if !(-180.0..=180.0).contains(&search.longitude) {
            bail!("search.longitude {} is out of range", search.longitude);
        }
        if search.radius_meters == 0 || search.radius_meters > MAX_RADIUS_METERS {
            bail!(
                "search.radius_meters must be between 1 and {}, got {}",
                MAX_RADIUS_METERS,
                search.radius_meters
            );
        }
        Ok(())
    }
}

/// Secrets and identifiers, read from the plain environment variable names.
#[derive(Clone)]
pub struct Credentials {
    pub google_places_api_key: String,
    pub notion_api_key: String,
    pub notion_database_id: String,
    pub notion_page_id: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("google_places_api_key", &"<redacted>")
            .field("notion_api_key", &"<redacted>")
            .field("notion_database_id", &self.notion_database_id)
            .field("notion_page_id", &self.notion_page_id)
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let optional = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |key: &str| optional(key).ok_or_else(|| anyhow!("{} must be set", key));

        Ok(Credentials {
            google_places_api_key: required("GOOGLE_PLACES_API_KEY")?,
            notion_api_key: required("NOTION_API_KEY")?,
            notion_database_id: required("NOTION_DATABASE_ID")?,
            notion_page_id: optional("NOTION_PAGE_ID"),
        })
    }
}

pub fn get_configuration() -> anyhow::Result<Settings> {
    let base_path = std::env::current_dir().context("Failed to determine the current directory")?;
    let settings = load_settings(&base_path.join("configuration"))
        .context("Failed to read configuration")?;
    settings.validate()?;

    Ok(settings)
}

pub fn load_settings(configuration_directory: &Path) -> Result<Settings, config::ConfigError> {
    load_settings_with_env(configuration_directory, None)
}

/// `env` replaces the process environment when set.
pub fn load_settings_with_env(
    configuration_directory: &Path,
    env: Option<config::Map<String, String>>,
) -> Result<Settings, config::ConfigError> {
    config::Config::builder()
        .set_default("search.latitude", 50.152573)?
        .set_default("search.longitude", -5.066270)?
        .set_default("search.radius_meters", 50_000_i64)?
        .set_default("search.page_delay_secs", 5_i64)?
        .set_default(
            "google_places.base_url",
            "https://maps.googleapis.com/maps/api/place/",
        )?
        .set_default("notion.base_url", "https://api.notion.com/v1/")?
        .set_default("notion.version", "2022-06-28")?
        .set_default("notion.database_title", "Businesses")?
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("search.place_types")
                .source(env),
        )
        .build()?
        .try_deserialize::<Settings>()
}
