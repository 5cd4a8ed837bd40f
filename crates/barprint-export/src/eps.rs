//! Encapsulated PostScript serializer.
//!
//! The program is plain ASCII: DSC header comments, four short path
//! operator macros, an optional full-page background fill, the foreground
//! color, the path, and a single `fill`.  Coordinates are PostScript
//! points with the origin at the bottom left.
//!
//! See [`crate::preview`] for the binary variant carrying a TIFF preview.

use std::fmt::Write;

use barprint_core::{DualColor, Segment};

use crate::number::format_number as n;
use crate::page::Page;
use crate::settings::ColorModel;

/// First line of every EPS file.
pub const EPS_HEADER: &str = "%!PS-Adobe-3.0 EPSF-3.0";

/// PostScript color-setting command for `color`.
#[must_use]
pub fn color_command(color: DualColor, model: ColorModel) -> String {
    match model {
        ColorModel::Rgb => {
            let (r, g, b) = color.rgb();
            format!(
                "{} {} {} setrgbcolor",
                n(f64::from(r) / 255.0),
                n(f64::from(g) / 255.0),
                n(f64::from(b) / 255.0),
            )
        }
        ColorModel::Cmyk => {
            let (c, m, y, k) = color.cmyk();
            format!(
                "{} {} {} {} setcmykcolor",
                n(f64::from(c) / 100.0),
                n(f64::from(m) / 100.0),
                n(f64::from(y) / 100.0),
                n(f64::from(k) / 100.0),
            )
        }
    }
}

/// DSC comment values must stay on one line.
fn comment_text(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Integer bounding box edge: rounded up, ignoring float noise from the
/// millimetre conversion.
fn bounding_ceil(pt: f64) -> String {
    n((pt - 1e-6).ceil())
}

/// Serialize `page` as an EPS program.
#[must_use]
pub fn to_eps(page: &Page) -> String {
    let (w, h) = (page.width_pt(), page.height_pt());
    let mut out = String::new();

    let _ = writeln!(out, "{EPS_HEADER}");
    let _ = writeln!(out, "%%Creator: {}", comment_text(&page.creator));
    if let Some(title) = &page.title {
        let _ = writeln!(out, "%%Title: {}", comment_text(title));
    }
    let _ = writeln!(
        out,
        "%%BoundingBox: 0 0 {} {}",
        bounding_ceil(w),
        bounding_ceil(h)
    );
    let _ = writeln!(out, "%%HiResBoundingBox: 0 0 {} {}", n(w), n(h));
    let _ = writeln!(out, "%%Pages: 0");
    let _ = writeln!(out, "%%EndComments");

    let _ = writeln!(out, "/m {{ moveto }} bind def");
    let _ = writeln!(out, "/l {{ lineto }} bind def");
    let _ = writeln!(out, "/c {{ curveto }} bind def");
    let _ = writeln!(out, "/z {{ closepath }} bind def");

    if let Some(background) = page.painted_background() {
        let _ = writeln!(out, "{}", color_command(background, page.color_model));
        let _ = writeln!(out, "0 0 {} {} rectfill", n(w), n(h));
    }

    let path = page.geometry.combined().transformed(&page.to_points());
    if !path.is_empty() {
        let _ = writeln!(out, "{}", color_command(page.foreground, page.color_model));
        let _ = writeln!(out, "newpath");
        for segment in path.cubic_segments() {
            let _ = match segment {
                Segment::MoveTo(p) => writeln!(out, "{} {} m", n(p.x), n(p.y)),
                Segment::LineTo(p) => writeln!(out, "{} {} l", n(p.x), n(p.y)),
                Segment::CubicTo(c1, c2, p) => writeln!(
                    out,
                    "{} {} {} {} {} {} c",
                    n(c1.x),
                    n(c1.y),
                    n(c2.x),
                    n(c2.y),
                    n(p.x),
                    n(p.y)
                ),
                Segment::Close => writeln!(out, "z"),
            };
        }
        let _ = writeln!(out, "fill");
    }

    let _ = writeln!(out, "showpage");
    let _ = writeln!(out, "%%EOF");
    out
}
