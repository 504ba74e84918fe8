pub mod check;
pub mod debug;
pub mod embed;
pub mod error;
pub mod fetch;
pub mod locate;
pub mod stock;

pub use check::{check_product, evaluate_html, status_message, ProductCheck};
pub use debug::DebugSink;
pub use embed::{extract_state_blob, try_extract_state_blob, EmbedConvention, EmbeddedState};
pub use error::{CheckError, ExtractionError, FailureKind, FetchError};
pub use fetch::{PageFetcher, RenderClient};
pub use locate::{find_sequence, find_size_options, DISPLAY_SIZE_KEY};
pub use stock::{available_sizes, evaluate_stock, StockResult, IN_STOCK_STATUS};
