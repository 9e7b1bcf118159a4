//! Minimal SVG quick-look of a result.
//!
//! Map coordinates have y pointing up, SVG has y pointing down, so every y is
//! negated on the way out.

use furrow::{BoundingBox, Point};

/// One thing to draw.
pub enum Mark<'a> {
    /// Source polygon ring or preview box, gray outline.
    Outline(&'a [Point]),
    /// Row or line, black; `highlight` draws it red.
    Path { points: &'a [Point], highlight: bool },
    Dot(Point),
}

impl Mark<'_> {
    fn points(&self) -> &[Point] {
        match self {
            Mark::Outline(points) | Mark::Path { points, .. } => *points,
            Mark::Dot(p) => std::slice::from_ref(p),
        }
    }
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, -p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render marks into a standalone SVG document.
pub fn marks_to_svg(marks: &[Mark]) -> String {
    let bounds = BoundingBox::from_points(marks.iter().flat_map(|m| m.points().iter()))
        .unwrap_or(BoundingBox { min_x: 0.0, min_y: 0.0, max_x: 1.0, max_y: 1.0 });
    let pad = (bounds.width().max(bounds.height()) * 0.05).max(1e-9);
    let stroke = pad / 10.0;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">
<g fill="none" stroke-width="{}" stroke-linecap="round">
"#,
        bounds.min_x - pad,
        -bounds.max_y - pad,
        bounds.width() + 2.0 * pad,
        bounds.height() + 2.0 * pad,
        stroke
    ));

    for mark in marks {
        match mark {
            Mark::Outline(points) => {
                svg.push_str(&format!(
                    "  <polygon points=\"{}\" stroke=\"#999999\"/>\n",
                    points_attr(points)
                ));
            }
            Mark::Path { points, highlight } => {
                let color = if *highlight { "#ff0000" } else { "#000000" };
                svg.push_str(&format!(
                    "  <polyline points=\"{}\" stroke=\"{}\"/>\n",
                    points_attr(points),
                    color
                ));
            }
            Mark::Dot(p) => {
                svg.push_str(&format!(
                    "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{}\" fill=\"#0000ff\"/>\n",
                    p.x,
                    -p.y,
                    stroke * 3.0
                ));
            }
        }
    }

    svg.push_str("</g>\n</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flips_y_and_marks_first_row() {
        let row = [Point::new(0.0, 0.0), Point::new(0.0, 10.0)];
        let svg = marks_to_svg(&[Mark::Path { points: &row, highlight: true }, Mark::Dot(Point::new(5.0, 5.0))]);
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("0.00,-10.00"));
        assert!(svg.contains("#ff0000"));
        assert!(svg.contains("<circle cx=\"5.00\" cy=\"-5.00\""));
    }

    #[test]
    fn empty_drawing_is_still_valid() {
        let svg = marks_to_svg(&[]);
        assert!(svg.contains("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
