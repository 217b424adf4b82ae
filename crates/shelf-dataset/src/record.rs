use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Column names of the persisted datasets, in record field order.
pub const HEADERS: [&str; 5] = ["Category", "Title", "Price", "Availability", "Star Rating"];

pub const PRICE: &str = "Price";
pub const TITLE: &str = "Title";

/// One catalog item as extracted from a listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Availability")]
    pub availability: String,
    #[serde(rename = "Star Rating")]
    pub star_rating: StarRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StarRating {
    One,
    Two,
    Three,
    Four,
    Five,
    #[default]
    Unrated,
}

impl StarRating {
    /// Maps the class token used by the catalog markup (`One`..`Five`).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "One" => Some(Self::One),
            "Two" => Some(Self::Two),
            "Three" => Some(Self::Three),
            "Four" => Some(Self::Four),
            "Five" => Some(Self::Five),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::One => "1 Star",
            Self::Two => "2 Stars",
            Self::Three => "3 Stars",
            Self::Four => "4 Stars",
            Self::Five => "5 Stars",
            Self::Unrated => "No rating",
        }
    }
}

impl fmt::Display for StarRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
#[error("unknown star rating {0:?}")]
pub struct UnknownRating(pub String);

impl FromStr for StarRating {
    type Err = UnknownRating;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::One,
            Self::Two,
            Self::Three,
            Self::Four,
            Self::Five,
            Self::Unrated,
        ]
        .into_iter()
        .find(|rating| rating.label() == s)
        .ok_or_else(|| UnknownRating(s.to_string()))
    }
}

impl Serialize for StarRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for StarRating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(de::Error::custom)
    }
}
