//! SVG serializer.
//!
//! Builds the document with the [`svg`] crate.  It is sized in
//! millimetres with a `viewBox` carrying the same numbers, so one user
//! unit is one millimetre.  The background is a `<rect>` (fully
//! transparent when the page has no background) and all marks and text
//! form a single `<path>`.
//!
//! Fills are always `#rrggbb`.  Under the CMYK model the CMYK values are
//! kept in a namespaced `<metadata>` element for prepress tools.
//!
//! This is a pure function with no I/O: it returns a `String`.

use std::fmt::Write;

use barprint_core::{DualColor, Path, Segment};
use svg::Document;
use svg::node::Node;
use svg::node::element::{Element, Path as PathElement, Rectangle, Title};

use crate::number::format_number as n;
use crate::page::Page;
use crate::settings::ColorModel;

/// Namespace of the `<barprint:colors>` metadata element.
pub const COLORS_NAMESPACE: &str = "https://github.com/altendky/barprint/ns/colors/1";

/// `cmyk(c,m,y,k)` in percent, the same form `DualColor` parses.
fn cmyk_text(color: DualColor) -> String {
    let (c, m, y, k) = color.cmyk();
    format!("cmyk({c},{m},{y},{k})")
}

/// Build an SVG path `d` attribute string.
///
/// Quadratics are written as their exact cubic equivalents, like the
/// EPS and PDF writers do.  Numbers go through [`format_number`], so the
/// precision matches the other vector formats.
///
/// [`format_number`]: crate::number::format_number
#[must_use]
pub fn path_data(path: &Path) -> String {
    let mut d = String::new();
    for segment in path.cubic_segments() {
        if !d.is_empty() {
            d.push(' ');
        }
        let _ = match segment {
            Segment::MoveTo(p) => write!(d, "M{},{}", n(p.x), n(p.y)),
            Segment::LineTo(p) => write!(d, "L{},{}", n(p.x), n(p.y)),
            Segment::CubicTo(c1, c2, p) => write!(
                d,
                "C{},{} {},{} {},{}",
                n(c1.x),
                n(c1.y),
                n(c2.x),
                n(c2.y),
                n(p.x),
                n(p.y)
            ),
            Segment::Close => write!(d, "Z"),
        };
    }
    d
}

/// Serialize `page` as a standalone SVG document.
///
/// The title text is XML-escaped by the `svg` crate.
#[must_use]
pub fn to_svg(page: &Page) -> String {
    let (w, h) = (n(page.width_mm), n(page.height_mm));

    let mut doc = Document::new()
        .set("version", "1.1")
        .set("width", format!("{w}mm"))
        .set("height", format!("{h}mm"))
        .set("viewBox", format!("0 0 {w} {h}"));

    if let Some(title) = &page.title {
        doc = doc.add(Title::new(title.as_str()));
    }

    if page.color_model == ColorModel::Cmyk {
        let mut colors = Element::new("barprint:colors");
        colors.assign("xmlns:barprint", COLORS_NAMESPACE);
        colors.assign("foreground", cmyk_text(page.foreground));
        colors.assign("background", cmyk_text(page.background));
        let mut metadata = Element::new("metadata");
        metadata.append(colors);
        doc = doc.add(metadata);
    }

    let background = Rectangle::new()
        .set("x", 0)
        .set("y", 0)
        .set("width", w)
        .set("height", h);
    doc = doc.add(match page.painted_background() {
        Some(color) => background.set("fill", color.to_hex()),
        None => background.set("fill", "none").set("fill-opacity", 0),
    });

    let all = page.geometry.combined();
    if !all.is_empty() {
        doc = doc.add(
            PathElement::new()
                .set("fill", page.foreground.to_hex())
                .set("fill-rule", "nonzero")
                .set("d", path_data(&all)),
        );
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
