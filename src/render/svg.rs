//! SVG markup for drawables.

use crate::layout::{Diagram, Drawable};
use crate::options::Theme;

const STROKE_WIDTH: &str = "2";
const FONT: &str = "font-family=\"monospace\" font-size=\"12\"";

/// Markup for one drawable. `id` namespaces generated element ids.
pub fn draw(id: &str, drawable: &Drawable, theme: &Theme) -> String {
    match drawable {
        Drawable::Point(point) => format!(
            r#"<circle id="{id}-p-{}" cx="{}" cy="{}" r="{}" fill="{}" />"#,
            escape_attr(&point.hash),
            fmt(point.at.x),
            fmt(point.at.y),
            fmt(theme.point_radius),
            escape_attr(&point.color),
        ),
        Drawable::Line(line) => format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{STROKE_WIDTH}" />"#,
            fmt(line.from.x),
            fmt(line.from.y),
            fmt(line.to.x),
            fmt(line.to.y),
            escape_attr(&line.color),
        ),
        Drawable::MergeLine(line) => {
            let (from, to) = (line.from, line.to);
            // Bend over at most one row; anything longer gets a straight lead-in.
            let lead_in = (to.y - from.y).abs() > theme.point_space;
            let x1 = from.x;
            let y1 = if to.y > from.y {
                to.y - theme.point_space
            } else {
                to.y + theme.point_space
            };
            let (x2, y2) = (to.x, to.y);
            let lead = if lead_in {
                format!(" {} {}", fmt(x1), fmt(y1))
            } else {
                String::new()
            };
            format!(
                r#"<path d="M {} {}{lead} C {} {} {} {} {} {}" stroke="{}" stroke-width="{STROKE_WIDTH}" fill="none" />"#,
                fmt(from.x),
                fmt(from.y),
                fmt(0.8 * x1 + 0.2 * x2),
                fmt(0.2 * y1 + 0.8 * y2),
                fmt(0.2 * x1 + 0.8 * x2),
                fmt(0.8 * y1 + 0.2 * y2),
                fmt(x2),
                fmt(y2),
                escape_attr(&line.color),
            )
        }
        Drawable::Label(label) => format!(
            r#"<text x="{}" y="{}" dominant-baseline="middle" fill="{}" {FONT}>{}</text>"#,
            fmt(label.at.x),
            fmt(label.at.y),
            escape_attr(&label.color),
            escape_xml(&label.text),
        ),
        Drawable::Divider(divider) => format!(
            r#"<line x1="0" y1="{y}" x2="{}" y2="{y}" stroke="{}" stroke-width="1" />"#,
            fmt(divider.width),
            escape_attr(&divider.color),
            y = fmt(divider.y),
        ),
        Drawable::LegendEntry(entry) => format!(
            r#"<g id="{id}-b-{}"><circle cx="{}" cy="{y}" r="{}" fill="{color}" /><text x="{}" y="{y}" dominant-baseline="middle" fill="{color}" {FONT}>{}</text></g>"#,
            escape_attr(&entry.name),
            fmt(entry.at.x),
            fmt(theme.point_radius),
            fmt(entry.at.x + theme.line_space),
            escape_xml(&entry.name),
            y = fmt(entry.at.y),
            color = escape_attr(&entry.color),
        ),
        Drawable::ErrorMarker(marker) => format!(
            r#"<text x="{}" y="{}" {FONT}><tspan font-weight="bold" fill="red">{}</tspan></text>"#,
            fmt(marker.at.x),
            fmt(marker.at.y),
            escape_xml(&marker.message),
        ),
    }
}

/// Wrap every drawable of `diagram` in an `<svg>` root.
pub fn draw_svg(id: &str, diagram: &Diagram, theme: &Theme) -> String {
    let mut out = format!(
        r#"<svg id="{id}" xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = fmt(diagram.width),
        h = fmt(diagram.height),
    );
    for drawable in &diagram.drawables {
        out.push_str(&draw(id, drawable, theme));
    }
    out.push_str("</svg>");
    out
}

/// Print a coordinate rounded to three decimals: integers without a
/// fraction, no `-0`.
pub fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let v = (v * 1000.0).round() / 1000.0;
    if v == 0.0 { "0".to_string() } else { v.to_string() }
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(text: &str) -> String {
    escape_xml(text)
}
