//! Table layout: the graph beside one row per commit.

use super::svg::{draw_svg, escape_xml};
use crate::layout::{Diagram, Row, format_date};
use crate::options::{Column, Theme};

/// Render `diagram` as an HTML table. The SVG cell spans every commit row.
pub fn draw_table(id: &str, diagram: &Diagram, theme: &Theme) -> String {
    let mut out = String::from(r#"<table class="gg-table"><tbody><tr class="gg-td-svg"><td rowspan=""#);
    out.push_str(&(diagram.rows.len() + 1).to_string());
    out.push_str(r#"">"#);
    out.push_str(&draw_svg(id, diagram, theme));
    out.push_str("</td></tr>");
    for row in &diagram.rows {
        out.push_str("<tr>");
        for column in &theme.columns {
            out.push_str("<td>");
            out.push_str(&escape_xml(&cell(row, *column, &theme.date_format)));
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}

fn cell(row: &Row, column: Column, date_format: &str) -> String {
    match column {
        Column::Hash => row.hash.clone(),
        Column::Message => row.message.clone(),
        Column::Date => row
            .date
            .map(|date| format_date(&date, date_format))
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::parse_date;

    fn row(hash: &str, message: &str, date: Option<&str>) -> Row {
        Row {
            hash: hash.to_string(),
            message: message.to_string(),
            date: date.and_then(parse_date),
            color: "#e6194b".to_string(),
        }
    }

    #[test]
    fn test_table_has_one_row_per_commit() {
        let diagram = Diagram {
            width: 20.0,
            height: 75.0,
            drawables: Vec::new(),
            rows: vec![row("2", "second", None), row("1", "a < b", Some("2020-01-01"))],
            dropped: 0,
        };
        let theme = Theme {
            columns: vec![Column::Hash, Column::Message, Column::Date],
            date_format: "%Y-%m-%d".to_string(),
            ..Theme::default()
        };
        let html = draw_table("gg-0", &diagram, &theme);
        assert!(html.starts_with(r#"<table class="gg-table"><tbody><tr class="gg-td-svg"><td rowspan="3"><svg"#));
        assert!(html.contains("<tr><td>2</td><td>second</td><td></td></tr>"));
        assert!(html.contains("<tr><td>1</td><td>a &lt; b</td><td>2020-01-01</td></tr>"));
        assert!(html.ends_with("</tbody></table>"));
    }
}
