use lazy_static::lazy_static;
use scraper::{ElementRef, Selector};
use shelf_dataset::{Record, StarRating};

use crate::error::{Skip, StructureError};

lazy_static! {
    static ref HEADING: Selector = Selector::parse("h3").unwrap();
    static ref LINK: Selector = Selector::parse("a").unwrap();
    static ref PRICE: Selector = Selector::parse(".price_color").unwrap();
    static ref AVAILABILITY: Selector = Selector::parse(".instock.availability").unwrap();
    static ref RATING: Selector = Selector::parse(".star-rating").unwrap();
}

// Pages served without a charset show the pound sign decoded as latin-1
const CURRENCY_PREFIXES: [&str; 2] = ["Â£", "£"];

const NOT_AVAILABLE: &str = "N/A";

pub type Extraction = Result<Record, Skip>;

/// Extracts the record of one item tile.
pub fn extract(tile: ElementRef, category: &str) -> Extraction {
    extract_record(tile, category).map_err(|reason| Skip {
        reason,
        fragment: tile.html(),
    })
}

fn extract_record(tile: ElementRef, category: &str) -> Result<Record, StructureError> {
    let heading = tile
        .select(&HEADING)
        .next()
        .ok_or(StructureError::MissingElement("h3"))?;
    let title = heading
        .select(&LINK)
        .next()
        .and_then(|link| link.value().attr("title"))
        .map(|title| title.trim().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let price = tile
        .select(&PRICE)
        .next()
        .ok_or(StructureError::MissingElement(".price_color"))?;
    let price = parse_price(&text_of(price))?;

    let availability = tile
        .select(&AVAILABILITY)
        .next()
        .map(text_of)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let star_rating = tile
        .select(&RATING)
        .next()
        .map(star_rating)
        .unwrap_or_default();

    Ok(Record {
        category: category.to_string(),
        title,
        price,
        availability,
        star_rating,
    })
}

/// Parses a displayed price such as `£51.77`.
pub fn parse_price(text: &str) -> Result<f64, StructureError> {
    let text = text.trim();
    let amount = CURRENCY_PREFIXES
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .unwrap_or(text)
        .trim();

    amount
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
        .ok_or_else(|| StructureError::InvalidPrice(text.to_string()))
}

fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn star_rating(element: ElementRef) -> StarRating {
    element
        .value()
        .attr("class")
        .into_iter()
        .flat_map(str::split_whitespace)
        .find_map(StarRating::from_token)
        .unwrap_or_default()
}
