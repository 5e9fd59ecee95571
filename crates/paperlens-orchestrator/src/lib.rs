//! Pipelines that tie the analysis crates together
//!
//! - [`FigurePipeline`]: extraction → visual analysis → authenticity, with a
//!   content-keyed [`ResultCache`] and an HTML report
//! - [`TextPipeline`]: document dump → perplexity, burstiness, detector →
//!   fact checking, with a console report
//!
//! Services are loaded once by [`FigureServices`] / [`TextServices`] and
//! borrowed by the pipelines.

pub mod cache;
pub mod figures;
pub mod report;
pub mod services;
pub mod text;

pub use cache::ResultCache;
pub use figures::FigurePipeline;
pub use report::{render_console, render_html};
pub use services::{load_model, FigureServices, TextServices};
pub use text::TextPipeline;
