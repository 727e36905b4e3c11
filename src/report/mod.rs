// =============================================================================
// Report Module
// =============================================================================
//
// Presentation boundary of the pipeline.  Display defaults for undefined
// metrics are substituted here and nowhere upstream.

pub mod quant;
pub mod sentiment;
pub mod writer;

pub use quant::{QuantSummary, DEFAULT_RSI_FALLBACK};
pub use sentiment::SentimentBundle;
pub use writer::{render_text_report, write_report, ReportInput};
