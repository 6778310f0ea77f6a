//! @acp:module "Summary"
//! @acp:summary "Posterior summary tables and their HTML rendering"
//! @acp:domain stats
//! @acp:layer api

pub mod html;
pub mod table;

pub use html::{expand_true, side_by_side, style_table, DEFAULT_TITLE_LEFT, DEFAULT_TITLE_RIGHT};
pub use table::{extract_numeric_index, summarize_predictor, SummaryRow, SummaryTable, PREDICTOR_COLUMNS};
