//! Catalog browsing.

use tracing::info;

use keynest_core::Price;
use keynest_storefront::Storefront;
use keynest_storefront::models::CatalogItem;

fn log_item(item: &CatalogItem) {
    info!(
        id = %item.id,
        store = %item.store,
        badge = %item.featured,
        "{} - {}",
        item.name,
        Price::usd(item.price).display()
    );
}

/// List every catalog item.
pub fn list(shop: &Storefront) {
    let items = shop.catalog().items();
    items.iter().for_each(log_item);
    info!(count = items.len(), "Catalog listed");
}

/// List items matching `term`.
pub fn search(shop: &Storefront, term: &str) {
    let results = shop.search(term);
    results.iter().copied().for_each(log_item);
    info!(term, count = results.len(), "Search complete");
}
