use geo::{Coord, Line, LineString, MultiPolygon};
use palette::Srgba;
use rotary::geometry::Label;
use rotary::{HexColor, LineCap, Painter, TextAlign};
use std::convert::Infallible;
use std::fmt::Write;

/// Collects painted primitives into a standalone SVG document.
#[derive(Debug, Clone)]
pub struct SvgPainter {
    width: f64,
    height: f64,
    origin: Coord<f64>,
    body: String,
}

impl SvgPainter {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            origin: Coord { x: 0.0, y: 0.0 },
            body: String::new(),
        }
    }

    /// Shifts everything painted from now on by `origin`.
    pub fn with_origin(mut self, origin: Coord<f64>) -> Self {
        self.origin = origin;
        self
    }

    /// Paints a flat backdrop over the whole canvas.
    pub fn background(&mut self, color: Srgba<f64>) {
        let (fill, opacity) = color_to_svg(color);
        let _ = write!(
            self.body,
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{fill}\"{opacity}/>",
            fmt_f64(self.width),
            fmt_f64(self.height),
        );
    }

    pub fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">{}</svg>\n",
            self.body,
            w = fmt_f64(self.width),
            h = fmt_f64(self.height),
        )
    }

    fn point(&self, c: Coord<f64>) -> (String, String) {
        (fmt_f64(c.x + self.origin.x), fmt_f64(c.y + self.origin.y))
    }

    fn write_ring(&self, d: &mut String, ring: &LineString<f64>) {
        for (i, c) in ring.coords().enumerate() {
            let (x, y) = self.point(*c);
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{cmd}{x} {y}");
        }
        d.push('Z');
    }
}

impl Painter for SvgPainter {
    type Error = Infallible;

    fn fill(&mut self, shape: &MultiPolygon<f64>, color: Srgba<f64>) -> Result<(), Infallible> {
        let mut d = String::new();
        for polygon in shape {
            self.write_ring(&mut d, polygon.exterior());
            for hole in polygon.interiors() {
                self.write_ring(&mut d, hole);
            }
        }
        if d.is_empty() {
            return Ok(());
        }
        let (fill, opacity) = color_to_svg(color);
        let _ = write!(
            self.body,
            "<path d=\"{d}\" fill=\"{fill}\"{opacity} fill-rule=\"evenodd\"/>"
        );
        Ok(())
    }

    fn stroke(
        &mut self,
        line: &Line<f64>,
        width: f64,
        cap: LineCap,
        color: Srgba<f64>,
    ) -> Result<(), Infallible> {
        let (x1, y1) = self.point(line.start);
        let (x2, y2) = self.point(line.end);
        let (stroke, opacity) = color_to_svg(color);
        let _ = write!(
            self.body,
            "<line x1=\"{x1}\" y1=\"{y1}\" x2=\"{x2}\" y2=\"{y2}\" stroke=\"{stroke}\"{opacity} stroke-width=\"{}\" stroke-linecap=\"{cap}\"/>",
            fmt_f64(width),
        );
        Ok(())
    }

    fn text(&mut self, label: &Label, color: Srgba<f64>) -> Result<(), Infallible> {
        let (x, y) = self.point(label.anchor.position);
        let anchor = match label.anchor.align {
            TextAlign::Left => "start",
            TextAlign::Center => "middle",
            TextAlign::Right => "end",
        };
        let (fill, opacity) = color_to_svg(color);
        let _ = write!(
            self.body,
            "<text x=\"{x}\" y=\"{y}\" font-family=\"sans-serif\" font-size=\"{}\" text-anchor=\"{anchor}\" fill=\"{fill}\"{opacity}>{}</text>",
            fmt_f64(label.size),
            escape(&label.text),
        );
        Ok(())
    }
}

fn color_to_svg(color: Srgba<f64>) -> (String, String) {
    let hex = HexColor(color.color.into_format::<u8>()).to_string();
    let opacity = if color.alpha < 1.0 {
        format!(" opacity=\"{}\"", fmt_f64(color.alpha))
    } else {
        String::new()
    };
    (hex, opacity)
}

fn fmt_f64(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        // avoid "-0"
        "0".to_string()
    } else {
        format!("{rounded}")
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
