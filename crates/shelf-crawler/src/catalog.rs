use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::StructureError;

lazy_static! {
    static ref CATEGORY_LINKS: Selector =
        Selector::parse("div.side_categories ul.nav-list li a").unwrap();
}

/// Navigation labels that aren't categories: the all-items entry and a
/// header artifact.
pub const RESERVED_LABELS: [&str; 2] = ["Books", "Category"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLink {
    pub name: String,
    pub url: Url,
}

impl CatalogLink {
    pub fn is_reserved(&self) -> bool {
        RESERVED_LABELS.contains(&self.name.as_str())
    }
}

/// Category navigation links of the root page, in document order.
pub fn category_links(page: &str, base: &Url) -> Vec<CatalogLink> {
    let document = Html::parse_document(page);
    document
        .select(&CATEGORY_LINKS)
        .filter_map(|link| {
            let name = link.text().collect::<String>().trim().to_string();
            match resolve_href(link, base) {
                Ok(url) => Some(CatalogLink { name, url }),
                Err(e) => {
                    log::warn!("Skipping category link '{name}': {e}");
                    None
                }
            }
        })
        .collect()
}

pub(crate) fn resolve_href(element: ElementRef, base: &Url) -> Result<Url, StructureError> {
    let href = element
        .value()
        .attr("href")
        .ok_or(StructureError::MissingAttribute {
            element: "a",
            attribute: "href",
        })?;
    base.join(href).map_err(|e| StructureError::InvalidLink {
        href: href.to_string(),
        reason: e.to_string(),
    })
}
