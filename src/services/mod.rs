pub mod harvester;
pub mod nearby_pages;
pub mod notion_client;
pub mod places_client;

pub use harvester::*;
pub use nearby_pages::*;
pub use notion_client::*;
pub use places_client::*;
