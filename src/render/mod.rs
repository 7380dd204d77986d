//! Pure rendering of search results.
//!
//! ```text
//! render/
//! ├── mod.rs       # facade (this file)
//! ├── escape.rs    # SafeMarkup and html_escape
//! ├── display.rs   # ResultItem -> DisplayItem through the field map
//! ├── price.rs     # sale/regular selection, locale formatting
//! ├── stock.rs     # quantity / status semantics
//! ├── ean.rs       # barcode clean-up
//! └── html.rs      # DisplayItem -> SafeMarkup
//! ```
//!
//! Nothing here touches the network or a DOM; rendering is testable with
//! plain values.

pub mod display;
pub mod ean;
pub mod escape;
pub mod html;
pub mod price;
pub mod stock;

pub use display::{DisplayItem, TitleSegment, highlight_segments, resolve};
pub use escape::{SafeMarkup, html_escape};
pub use html::{render_dropdown, render_item};
pub use price::{CurrencyPosition, PriceChoice, PriceFormat, PriceLabel, choose_price};
pub use stock::{StockStatus, stock_status};
