use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PoiCategory {
    // Primary attractions
    Monument,
    Castle,
    Historic,

    // Cultural
    Museum,
    Viewpoint,
    Theatre,

    // Architectural
    Church,
    Bridge,
    Tower,

    // Urban interest
    Plaza,
    Market,
    Fountain,
    Artwork,

    // Natural
    Park,
    Waterfront,
    NatureReserve,
}

impl PoiCategory {
    /// Fixed attractiveness weight used by the selection engine.
    /// Primary attractions score 1.0; minor natural features bottom out at 0.4.
    pub fn weight(&self) -> f64 {
        match self {
            PoiCategory::Monument | PoiCategory::Castle => 1.0,
            PoiCategory::Historic => 0.95,
            PoiCategory::Museum | PoiCategory::Viewpoint => 0.9,
            PoiCategory::Church | PoiCategory::Bridge | PoiCategory::Tower => 0.8,
            PoiCategory::Plaza | PoiCategory::Market | PoiCategory::Theatre => 0.7,
            PoiCategory::Fountain | PoiCategory::Artwork | PoiCategory::Park => 0.6,
            PoiCategory::Waterfront => 0.5,
            PoiCategory::NatureReserve => 0.4,
        }
    }

    /// Estimated dwell time (minutes) a visitor spends at a stop of this
    /// category. Feeds the route's visit-time estimate.
    pub fn visit_minutes(&self) -> u32 {
        match self {
            PoiCategory::Museum => 60,
            PoiCategory::Castle => 45,
            PoiCategory::NatureReserve => 40,
            PoiCategory::Market | PoiCategory::Park | PoiCategory::Theatre => 30,
            PoiCategory::Historic | PoiCategory::Tower => 25,
            PoiCategory::Monument | PoiCategory::Church | PoiCategory::Waterfront => 20,
            PoiCategory::Viewpoint | PoiCategory::Plaza => 15,
            PoiCategory::Bridge | PoiCategory::Fountain | PoiCategory::Artwork => 10,
        }
    }

    pub fn all() -> &'static [PoiCategory] {
        &[
            PoiCategory::Monument,
            PoiCategory::Castle,
            PoiCategory::Historic,
            PoiCategory::Museum,
            PoiCategory::Viewpoint,
            PoiCategory::Theatre,
            PoiCategory::Church,
            PoiCategory::Bridge,
            PoiCategory::Tower,
            PoiCategory::Plaza,
            PoiCategory::Market,
            PoiCategory::Fountain,
            PoiCategory::Artwork,
            PoiCategory::Park,
            PoiCategory::Waterfront,
            PoiCategory::NatureReserve,
        ]
    }
}

impl fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PoiCategory::Monument => "monument",
            PoiCategory::Castle => "castle",
            PoiCategory::Historic => "historic",
            PoiCategory::Museum => "museum",
            PoiCategory::Viewpoint => "viewpoint",
            PoiCategory::Theatre => "theatre",
            PoiCategory::Church => "church",
            PoiCategory::Bridge => "bridge",
            PoiCategory::Tower => "tower",
            PoiCategory::Plaza => "plaza",
            PoiCategory::Market => "market",
            PoiCategory::Fountain => "fountain",
            PoiCategory::Artwork => "artwork",
            PoiCategory::Park => "park",
            PoiCategory::Waterfront => "waterfront",
            PoiCategory::NatureReserve => "nature_reserve",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PoiCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monument" => Ok(PoiCategory::Monument),
            "castle" => Ok(PoiCategory::Castle),
            "historic" => Ok(PoiCategory::Historic),
            "museum" => Ok(PoiCategory::Museum),
            "viewpoint" => Ok(PoiCategory::Viewpoint),
            "theatre" => Ok(PoiCategory::Theatre),
            "church" => Ok(PoiCategory::Church),
            "bridge" => Ok(PoiCategory::Bridge),
            "tower" => Ok(PoiCategory::Tower),
            "plaza" => Ok(PoiCategory::Plaza),
            "market" => Ok(PoiCategory::Market),
            "fountain" => Ok(PoiCategory::Fountain),
            "artwork" => Ok(PoiCategory::Artwork),
            "park" => Ok(PoiCategory::Park),
            "waterfront" => Ok(PoiCategory::Waterfront),
            "nature_reserve" => Ok(PoiCategory::NatureReserve),
            _ => Err(format!("Invalid POI category: {}", s)),
        }
    }
}

/// A named place with a coordinate and category. Immutable once fetched;
/// owned by the POI cache until evicted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poi {
    pub id: Uuid,
    pub name: String,
    pub category: PoiCategory,
    pub coordinates: Coordinates,
    pub description: Option<String>,
    pub address: Option<String>,
    /// Raw source tags (e.g. OSM key/value pairs). Quality signals like
    /// `wikipedia` or `heritage` keys are read from here.
    #[serde(default)]
    pub tags: HashMap<String, String>,
    /// Encyclopedia article reference, when the source carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wikipedia_ref: Option<String>,
}

impl Poi {
    pub fn new(name: String, category: PoiCategory, coordinates: Coordinates) -> Self {
        Poi {
            id: Uuid::new_v4(),
            name,
            category,
            coordinates,
            description: None,
            address: None,
            tags: HashMap::new(),
            wikipedia_ref: None,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_address(mut self, address: String) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_tags(mut self, tags: HashMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    /// A generic name carries no information beyond the category ("Museum",
    /// "Unnamed fountain") and earns no name-quality bonus.
    pub fn has_generic_name(&self) -> bool {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            return true;
        }
        let lowered = trimmed.to_lowercase();
        lowered.starts_with("unnamed") || lowered == self.category.to_string().replace('_', " ")
    }

    /// Whether the tag map carries signals that mark a notable place.
    pub fn has_quality_tags(&self) -> bool {
        self.wikipedia_ref.is_some()
            || self.tags.contains_key("wikipedia")
            || self.tags.contains_key("wikidata")
            || self.tags.contains_key("heritage")
    }
}
