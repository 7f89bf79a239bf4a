//! Catalog ordering helpers shared by the listing and home views.

use crate::product::Product;

/// How many products the home page shows.
pub const FEATURED_COUNT: usize = 4;

/// Order products newest first by their full publication timestamp.
///
/// Products published at the same instant keep a stable order by id.
pub fn sort_newest_first(products: &mut [Product]) {
  products.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
}

/// The newest [`FEATURED_COUNT`] products, newest first.
pub fn featured(mut products: Vec<Product>) -> Vec<Product> {
  sort_newest_first(&mut products);
  products.truncate(FEATURED_COUNT);
  products
}
