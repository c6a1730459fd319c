//! Pure text transformations applied to every matched row.

pub mod diff;
pub mod normalize;
pub mod prices;

pub use diff::{DIFF_ERROR_SENTINEL, word_diff};
pub use normalize::{collapse_whitespace, normalize};
pub use prices::{PRICE_SEPARATOR, extract_prices, price_tokens};
