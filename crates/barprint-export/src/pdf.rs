//! PDF document backend built on `lopdf`.
//!
//! Produces a single uncompressed page: an optional background `re f`,
//! the foreground color, and one filled path.  The catalog disables
//! print scaling and opens the page at 100% zoom.
//!
//! Real numbers are rounded according to a process-wide precision flag:
//! six decimals when set, two otherwise.

use std::sync::atomic::{AtomicBool, Ordering};

use barprint_core::{DualColor, Point, Segment};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::backend::{BACKEND_API_VERSION, BackendError, DocumentBackend, DocumentRequest};
use crate::settings::ColorModel;

/// Six-decimal rounding while set, two otherwise.
///
/// `lopdf` stores reals as `f32`, which keeps about seven significant
/// digits.  Page-scale coordinates (hundreds of points) therefore keep
/// four or five decimals, not six.
static HIGH_PRECISION: AtomicBool = AtomicBool::new(false);

/// The `lopdf` document backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfBackend;

impl LopdfBackend {
    pub const NAME: &'static str = "lopdf";
}

/// Round to six decimals (`high`) or two, and wrap as a PDF real.
///
/// The `f32` narrowing caps the kept precision; see [`HIGH_PRECISION`].
#[allow(clippy::cast_possible_truncation)]
fn rounded_real(value: f64, high: bool) -> Object {
    let scale = if high { 1e6 } else { 1e2 };
    Object::Real(((value * scale).round() / scale) as f32)
}

fn real(value: f64) -> Object {
    rounded_real(value, HIGH_PRECISION.load(Ordering::SeqCst))
}

fn point(p: Point) -> Vec<Object> {
    vec![real(p.x), real(p.y)]
}

fn color_operation(color: DualColor, model: ColorModel) -> Operation {
    match model {
        ColorModel::Rgb => {
            let (r, g, b) = color.rgb();
            Operation::new(
                "rg",
                [r, g, b]
                    .into_iter()
                    .map(|v| real(f64::from(v) / 255.0))
                    .collect(),
            )
        }
        ColorModel::Cmyk => {
            let (c, m, y, k) = color.cmyk();
            Operation::new(
                "k",
                [c, m, y, k]
                    .into_iter()
                    .map(|v| real(f64::from(v) / 100.0))
                    .collect(),
            )
        }
    }
}

fn page_operations(request: &DocumentRequest<'_>) -> Vec<Operation> {
    let mut ops = Vec::new();

    if let Some(background) = request.background {
        ops.push(color_operation(background, request.color_model));
        ops.push(Operation::new(
            "re",
            vec![
                real(0.0),
                real(0.0),
                real(request.width_pt),
                real(request.height_pt),
            ],
        ));
        ops.push(Operation::new("f", vec![]));
    }

    if !request.path.is_empty() {
        ops.push(color_operation(request.foreground, request.color_model));
        for segment in request.path {
            ops.push(match *segment {
                Segment::MoveTo(p) => Operation::new("m", point(p)),
                Segment::LineTo(p) => Operation::new("l", point(p)),
                Segment::CubicTo(c1, c2, p) => {
                    let mut operands = point(c1);
                    operands.extend(point(c2));
                    operands.extend(point(p));
                    Operation::new("c", operands)
                }
                Segment::Close => Operation::new("h", vec![]),
            });
        }
        ops.push(Operation::new("f", vec![]));
    }

    ops
}

fn fail(err: impl std::fmt::Display) -> BackendError {
    BackendError(err.to_string())
}

impl DocumentBackend for LopdfBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn api_version(&self) -> u32 {
        BACKEND_API_VERSION
    }

    fn high_precision(&self) -> bool {
        HIGH_PRECISION.load(Ordering::SeqCst)
    }

    fn set_high_precision(&self, enabled: bool) {
        HIGH_PRECISION.store(enabled, Ordering::SeqCst);
    }

    fn render(&self, request: &DocumentRequest<'_>) -> Result<Vec<u8>, BackendError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let content = Content {
            operations: page_operations(request),
        };
        let content_id =
            doc.add_object(Stream::new(dictionary! {}, content.encode().map_err(fail)?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                real(0.0),
                real(0.0),
                real(request.width_pt),
                real(request.height_pt),
            ],
            "Contents" => content_id,
        });

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
            "ViewerPreferences" => dictionary! {
                "PrintScaling" => "None",
            },
            "OpenAction" => vec![
                Object::Reference(page_id),
                Object::Name(b"XYZ".to_vec()),
                Object::Integer(0),
                real(request.height_pt),
                Object::Integer(1),
            ],
        });

        let mut info = dictionary! {
            "Producer" => Object::string_literal(request.producer),
        };
        if let Some(title) = request.title {
            info.set("Title", Object::string_literal(title));
        }
        if let Some(creator) = request.creator {
            info.set("Creator", Object::string_literal(creator));
        }
        let info_id = doc.add_object(info);

        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).map_err(fail)?;
        log::debug!(
            "lopdf wrote {} bytes ({} path segments)",
            bytes.len(),
            request.path.len()
        );
        Ok(bytes)
    }
}
