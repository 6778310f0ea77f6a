//! @acp:module "Summary HTML"
//! @acp:summary "HTML fragments for summary tables in the case study notebook"
//! @acp:domain stats
//! @acp:layer output

use std::fmt::Write;

use handlebars::{html_escape, Handlebars};
use serde_json::json;

use super::table::SummaryTable;
use crate::error::Result;

/// Divider drawn under every `modulus`-th row
pub const ROW_DIVIDER: &str = "border-bottom: 3px double black";

pub const DEFAULT_TITLE_LEFT: &str = "Small Dataset";
pub const DEFAULT_TITLE_RIGHT: &str = "Large Dataset";

/// Rows per true value in `expand_true` (one per model variant)
const MODELS_PER_VALUE: usize = 3;

const SIDE_BY_SIDE_TEMPLATE: &str = r#"
    <div style="display: flex; justify-content: space-between; gap: 10px;">
        <div style="width: 10%; border: 1px solid #ddd; padding: 3px;">
            <b><i>&nbsp;</i></b>
            {{{labels}}}
        </div>
        <div style="width: 45%; border: 1px solid #ddd; padding: 5px;">
            <b><i>{{title_left}}</i></b>
            {{{left}}}
        </div>
        <div style="width: 45%; border: 1px solid #ddd; padding: 5px;">
            <b><i>{{title_right}}</i></b>
            {{{right}}}
        </div>
    </div>
    "#;

/// @acp:summary "Render a summary table with a divider every `modulus` rows"
///
/// Numbers are shown with two decimals. A `modulus` of zero draws no dividers.
pub fn style_table(table: &SummaryTable, modulus: usize) -> String {
    let mut out = String::from("<table border='1' class='dataframe'>\n<thead>\n<tr><th></th>");
    for column in &table.columns {
        let _ = write!(out, "<th>{}</th>", html_escape(column));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");

    for (i, row) in table.rows.iter().enumerate() {
        let divided = modulus > 0 && (i + 1) % modulus == 0;
        let cell_style = if divided {
            format!(" style=\"{}\"", ROW_DIVIDER)
        } else {
            String::new()
        };

        let _ = write!(out, "<tr><th{}>{}</th>", cell_style, html_escape(&row.name));
        for value in &row.values {
            let _ = write!(out, "<td{}>{:.2}</td>", cell_style, value);
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>");
    out
}

/// @acp:summary "Lay out a label column and two tables next to each other"
pub fn side_by_side(
    html_left: &str,
    html_right: &str,
    labels: &str,
    title_left: &str,
    title_right: &str,
) -> Result<String> {
    let hb = Handlebars::new();
    let rendered = hb.render_template(
        SIDE_BY_SIDE_TEMPLATE,
        &json!({
            "labels": labels,
            "left": html_left,
            "right": html_right,
            "title_left": title_left,
            "title_right": title_right,
        }),
    )?;
    Ok(rendered)
}

/// One-column table of true values, each followed by blank rows so it lines
/// up with a summary that has one row per model variant
pub fn expand_true(values: &[f64], header: &str) -> String {
    let mut out = format!(
        "<table border='1' class='dataframe'><thead><tr><th>{}</th></tr></thead><tbody>",
        html_escape(header)
    );
    for value in values {
        let _ = write!(out, "<tr><td>{:.2}</td></tr>", value);
        for _ in 1..MODELS_PER_VALUE {
            out.push_str("<tr><td>&nbsp;</td></tr>");
        }
    }
    out.push_str("</tbody></table>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: usize) -> SummaryTable {
        let mut t = SummaryTable::new(vec!["Mean".into(), "R_hat".into()]);
        for i in 0..rows {
            t.push_row(format!("beta[{}]", i + 1), vec![i as f64 / 3.0, 1.0]).unwrap();
        }
        t
    }

    #[test]
    fn test_dividers_every_nth_row() {
        let html = style_table(&table(6), 3);
        assert_eq!(html.matches(ROW_DIVIDER).count(), 2 * 3);
        let rows: Vec<_> = html.lines().filter(|l| l.contains("<td")).collect();
        assert!(rows[2].contains(ROW_DIVIDER));
        assert!(!rows[3].contains(ROW_DIVIDER));
        assert!(rows[5].contains(ROW_DIVIDER));
    }

    #[test]
    fn test_two_decimal_format() {
        let html = style_table(&table(2), 0);
        assert!(html.contains("<td>0.33</td>"));
        assert!(html.contains("<td>1.00</td>"));
        assert!(!html.contains(ROW_DIVIDER));
    }

    #[test]
    fn test_side_by_side_keeps_raw_tables() {
        let out = side_by_side("<table>L</table>", "<table>R</table>", "", DEFAULT_TITLE_LEFT, DEFAULT_TITLE_RIGHT)
            .unwrap();
        assert!(out.contains("<table>L</table>"));
        assert!(out.contains("<table>R</table>"));
        assert!(out.contains("<b><i>Small Dataset</i></b>"));
        assert!(out.contains("width: 45%"));
    }

    #[test]
    fn test_expand_true_pads_rows() {
        let out = expand_true(&[1.234, -0.5], "true");
        assert!(out.starts_with("<table border='1' class='dataframe'><thead><tr><th>true</th>"));
        assert_eq!(out.matches("<tr><td>&nbsp;</td></tr>").count(), 4);
        assert!(out.contains("<tr><td>1.23</td></tr>"));
        assert!(out.contains("<tr><td>-0.50</td></tr>"));
    }
}
