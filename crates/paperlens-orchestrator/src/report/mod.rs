pub mod console;
pub mod html;

pub use console::render_console;
pub use html::{escape_html, pie_chart_svg, render_html};
