//! PDF and image fixtures for unit tests

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Build a PDF with one page per `(width, height)` entry
///
/// Each page carries a black bar near the top so rendered output is not blank.
pub fn blank_pdf(sizes: &[(f64, f64)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for &(width, height) in sizes {
        let content = Content {
            operations: vec![
                Operation::new("g", vec![0.into()]),
                Operation::new(
                    "re",
                    vec![
                        Object::Real((width * 0.1) as f32),
                        Object::Real((height * 0.8) as f32),
                        Object::Real((width * 0.8) as f32),
                        Object::Real((height * 0.1) as f32),
                    ],
                ),
                Operation::new("f", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            lopdf::Dictionary::new(),
            content.encode().expect("encode content"),
        ));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width as f32),
                Object::Real(height as f32),
            ],
            "Contents" => content_id,
            "Resources" => lopdf::Dictionary::new(),
        });
        page_ids.push(page_id);
    }

    finish(doc, pages_id, page_ids, lopdf::Dictionary::new())
}

/// One page whose MediaBox and Resources live on the parent `/Pages` node
pub fn inherited_box_pdf(width: i64, height: i64) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
    });

    let inherited = dictionary! {
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(width),
            Object::Integer(height),
        ],
        "Resources" => dictionary! {
            "Font" => dictionary! {
                "F1" => dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica",
                },
            },
        },
    };

    finish(doc, pages_id, vec![page_id], inherited)
}

fn finish(
    mut doc: Document,
    pages_id: lopdf::ObjectId,
    page_ids: Vec<lopdf::ObjectId>,
    extra: lopdf::Dictionary,
) -> Vec<u8> {
    let mut pages = dictionary! {
        "Type" => "Pages",
        "Count" => page_ids.len() as i64,
        "Kids" => page_ids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
    };
    for (key, value) in extra.iter() {
        pages.set(key.clone(), value.clone());
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("save test pdf");
    buffer
}

/// Point `startxref` into the middle of the file so the xref table cannot be
/// found where the trailer says it is
pub fn with_bad_startxref(mut pdf: Vec<u8>) -> Vec<u8> {
    let marker = b"startxref";
    let at = pdf
        .windows(marker.len())
        .rposition(|window| window == marker)
        .expect("pdf has startxref");
    pdf.truncate(at + marker.len());
    pdf.extend_from_slice(b"\n17\n%%EOF\n");
    pdf
}

/// A small PNG signature with a transparent background
pub fn signature_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        if (x + y) % 3 == 0 {
            Rgba([20, 20, 120, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode signature");
    bytes
}
