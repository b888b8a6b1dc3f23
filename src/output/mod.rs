pub mod pdf;

pub use pdf::{render_plan_pdf, DEFAULT_REPORT_TITLE};
