//! # PDF Serializer
//!
//! Takes the laid-out pages from the layout engine and writes a PDF file.
//!
//! This is a from-scratch PDF 1.7 writer covering the small subset the
//! exporter draws: filled and stroked rectangles, lines, text in the
//! standard Type1 fonts, and raster images.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, pages, content streams, etc.)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Layout works in millimetres from the top-left corner; PDF user space is
//! points from the bottom-left. Every coordinate is flipped and scaled here
//! and nowhere else.

use std::collections::BTreeSet;
use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::{Error, Result};
use crate::font::metrics::win_ansi_byte;
use crate::font::StandardFont;
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::layout::{DrawCommand, LayoutElement, LayoutPage};
use crate::model::{Color, PT_PER_MM};

const PRODUCER: &str = "cornell-notes";

/// Document Info dictionary contents.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
}

pub struct PdfWriter;

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Each font in use and its object id, referenced as /F0, /F1, ...
    font_objects: Vec<(StandardFont, usize)>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn new() -> Self {
        // Object 0 is the free-list head; 1 and 2 are reserved for the
        // catalog and the page tree.
        Self {
            objects: (0..3).map(|_| PdfObject { data: Vec::new() }).collect(),
            font_objects: Vec::new(),
        }
    }

    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }

    fn push_stream(&mut self, dict: &str, payload: &[u8]) -> usize {
        let mut data = Vec::with_capacity(payload.len() + dict.len() + 32);
        let _ = write!(data, "<< {} /Length {} >>\nstream\n", dict, payload.len());
        data.extend_from_slice(payload);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }

    fn font_index(&self, font: StandardFont) -> usize {
        self.font_objects
            .iter()
            .position(|(f, _)| *f == font)
            .unwrap_or(0)
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write laid-out pages to a PDF byte vector.
    pub fn write(&self, pages: &[LayoutPage], metadata: &Metadata) -> Result<Vec<u8>> {
        if pages.is_empty() {
            return Err(Error::Render("document has no pages".to_string()));
        }

        let mut builder = PdfBuilder::new();
        self.register_fonts(&mut builder, pages);
        let font_resources = self.build_font_resource_dict(&builder);

        let mut page_obj_ids = Vec::with_capacity(pages.len());
        for page in pages {
            let image_ids = self.register_images(&mut builder, page);
            let content = self.build_content_stream(page, &builder);
            let compressed = compress_to_vec_zlib(&content, 6);
            let content_obj_id = builder.push_stream("/Filter /FlateDecode", &compressed);

            let xobjects = image_ids
                .iter()
                .enumerate()
                .map(|(i, id)| format!("/Im{} {} 0 R", i, id))
                .collect::<Vec<_>>()
                .join(" ");
            let resources = if xobjects.is_empty() {
                format!("/Font << {} >>", font_resources)
            } else {
                format!("/Font << {} >> /XObject << {} >>", font_resources, xobjects)
            };

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width * PT_PER_MM,
                page.height * PT_PER_MM,
                content_obj_id,
                resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let mut info: Vec<u8> = b"<< ".to_vec();
        if let Some(ref title) = metadata.title {
            write_pdf_string_entry(&mut info, "Title", title);
        }
        if let Some(ref author) = metadata.author {
            write_pdf_string_entry(&mut info, "Author", author);
        }
        let _ = write!(info, "/Producer ({}) >>", PRODUCER);
        let info_obj_id = builder.push(info);
        log::debug!(
            "serializing {} pages, {} fonts, {} objects",
            pages.len(),
            builder.font_objects.len(),
            builder.objects.len()
        );

        Ok(self.serialize(&builder, info_obj_id))
    }

    /// One font object per standard face drawn anywhere in the document,
    /// in a stable order.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        let mut fonts: BTreeSet<StandardFont> = pages
            .iter()
            .flat_map(|p| &p.elements)
            .filter_map(|e| match &e.draw {
                DrawCommand::Text { font, .. } => Some(*font),
                _ => None,
            })
            .collect();
        if fonts.is_empty() {
            fonts.insert(StandardFont::Helvetica);
        }

        for font in fonts {
            let dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            let id = builder.push(dict.into_bytes());
            builder.font_objects.push((font, id));
        }
    }

    fn build_font_resource_dict(&self, builder: &PdfBuilder) -> String {
        builder
            .font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Image XObjects for one page, in drawing order; the n-th image
    /// element is `/Im<n>` in that page's content stream.
    fn register_images(&self, builder: &mut PdfBuilder, page: &LayoutPage) -> Vec<usize> {
        page.elements
            .iter()
            .filter_map(|e| match &e.draw {
                DrawCommand::Image { image_data } => Some(image_data),
                _ => None,
            })
            .map(|image| Self::write_image_xobject(builder, image))
            .collect()
    }

    /// Write a single image as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode",
                    image.width_px, image.height_px, color_space
                );
                builder.push_stream(&dict, data)
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                let smask_ref = alpha
                    .as_ref()
                    .map(|alpha| {
                        let dict = format!(
                            "/Type /XObject /Subtype /Image /Width {} /Height {} \
                             /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode",
                            image.width_px, image.height_px
                        );
                        let id = builder.push_stream(&dict, &compress_to_vec_zlib(alpha, 6));
                        format!(" /SMask {} 0 R", id)
                    })
                    .unwrap_or_default();

                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode{}",
                    image.width_px, image.height_px, smask_ref
                );
                builder.push_stream(&dict, &compress_to_vec_zlib(rgb, 6))
            }
        }
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(&self, page: &LayoutPage, builder: &PdfBuilder) -> Vec<u8> {
        let mut stream = Vec::new();
        let mut image_index = 0;
        for element in &page.elements {
            self.write_element(&mut stream, element, page.height, builder, &mut image_index);
        }
        stream
    }

    /// Write a single layout element as PDF operators.
    fn write_element(
        &self,
        stream: &mut Vec<u8>,
        element: &LayoutElement,
        page_height: f64,
        builder: &PdfBuilder,
        image_index: &mut usize,
    ) {
        let x = element.x * PT_PER_MM;
        let w = element.width * PT_PER_MM;
        let h = element.height * PT_PER_MM;

        match &element.draw {
            DrawCommand::Rect {
                fill,
                stroke,
                line_width,
            } => {
                let y = (page_height - element.y - element.height) * PT_PER_MM;
                let _ = write!(stream, "q\n");
                if let Some(c) = fill {
                    let _ = write!(stream, "{} rg\n", rgb(c));
                }
                if let Some(c) = stroke {
                    let _ = write!(stream, "{} RG\n{:.2} w\n", rgb(c), line_width * PT_PER_MM);
                }
                let op = match (fill, stroke) {
                    (Some(_), Some(_)) => "B",
                    (None, Some(_)) => "S",
                    _ => "f",
                };
                let _ = write!(stream, "{:.2} {:.2} {:.2} {:.2} re\n{}\nQ\n", x, y, w, h, op);
            }

            DrawCommand::Line { color, line_width } => {
                let y1 = (page_height - element.y) * PT_PER_MM;
                let y2 = (page_height - element.y - element.height) * PT_PER_MM;
                let _ = write!(
                    stream,
                    "q\n{} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                    rgb(color),
                    line_width * PT_PER_MM,
                    x,
                    y1,
                    x + w,
                    y2
                );
            }

            DrawCommand::Text {
                text,
                font,
                size,
                color,
            } => {
                let y = (page_height - element.y) * PT_PER_MM;
                let _ = write!(
                    stream,
                    "BT\n{} rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n(",
                    rgb(color),
                    builder.font_index(*font),
                    size,
                    x,
                    y
                );
                stream.extend_from_slice(&encode_pdf_string(text));
                let _ = write!(stream, ") Tj\nET\n");
            }

            DrawCommand::Image { .. } => {
                let y = (page_height - element.y - element.height) * PT_PER_MM;
                let _ = write!(
                    stream,
                    "q\n{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                    w, h, x, y, image_index
                );
                *image_index += 1;
            }
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

fn rgb(c: &Color) -> String {
    format!("{:.3} {:.3} {:.3}", c.r, c.g, c.b)
}

fn write_pdf_string_entry(out: &mut Vec<u8>, key: &str, value: &str) {
    let _ = write!(out, "/{} (", key);
    out.extend_from_slice(&encode_pdf_string(value));
    out.extend_from_slice(b") ");
}

/// Encode text as the body of a PDF literal string in WinAnsiEncoding.
///
/// Characters outside the encoding become `?`.
fn encode_pdf_string(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for c in s.chars() {
        match win_ansi_byte(c) {
            Some(b @ (b'\\' | b'(' | b')')) => {
                out.push(b'\\');
                out.push(b);
            }
            Some(b) => out.push(b),
            None => out.push(b'?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(elements: Vec<LayoutElement>) -> LayoutPage {
        LayoutPage {
            width: 210.0,
            height: 297.0,
            elements,
        }
    }

    fn text(x: f64, y: f64, s: &str, font: StandardFont) -> LayoutElement {
        LayoutElement {
            x,
            y,
            width: 0.0,
            height: 4.0,
            draw: DrawCommand::Text {
                text: s.to_string(),
                font,
                size: 11.0,
                color: Color::BLACK,
            },
        }
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(encode_pdf_string("Hello (World)"), b"Hello \\(World\\)".to_vec());
        assert_eq!(encode_pdf_string("back\\slash"), b"back\\\\slash".to_vec());
    }

    #[test]
    fn test_win_ansi_mapping() {
        assert_eq!(encode_pdf_string("• a – b — c"), vec![0x95, b' ', b'a', b' ', 0x96, b' ', b'b', b' ', 0x97, b' ', b'c']);
        assert_eq!(encode_pdf_string("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_pdf_string("日本"), b"??".to_vec());
    }

    #[test]
    fn test_empty_document_produces_valid_pdf() {
        let bytes = PdfWriter::new().write(&[page(vec![])], &Metadata::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(contains(&bytes, b"%%EOF"));
        assert!(contains(&bytes, b"xref"));
        assert!(contains(&bytes, b"trailer"));
        assert!(contains(&bytes, b"/Count 1"));
        assert!(contains(&bytes, b"/MediaBox [0 0 595.28 841.89]"));
    }

    #[test]
    fn test_no_pages_is_an_error() {
        let err = PdfWriter::new().write(&[], &Metadata::default()).unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }

    #[test]
    fn test_metadata_in_pdf() {
        let metadata = Metadata {
            title: Some("Test Document".to_string()),
            author: Some("Ada (Lovelace)".to_string()),
        };
        let bytes = PdfWriter::new().write(&[page(vec![])], &metadata).unwrap();
        assert!(contains(&bytes, b"/Title (Test Document)"));
        assert!(contains(&bytes, b"/Author (Ada \\(Lovelace\\))"));
        assert!(contains(&bytes, b"/Producer (cornell-notes)"));
    }

    #[test]
    fn test_bold_font_registered_separately() {
        let pages = vec![page(vec![
            text(15.0, 20.0, "A", StandardFont::Helvetica),
            text(15.0, 30.0, "B", StandardFont::HelveticaBold),
            text(15.0, 40.0, "C", StandardFont::Helvetica),
        ])];
        let bytes = PdfWriter::new().write(&pages, &Metadata::default()).unwrap();
        assert!(contains(&bytes, b"/BaseFont /Helvetica "));
        assert!(contains(&bytes, b"/BaseFont /Helvetica-Bold "));
        assert_eq!(bytes.windows(9).filter(|w| *w == b"/BaseFont").count(), 2);
    }

    #[test]
    fn test_content_stream_flips_coordinates() {
        let writer = PdfWriter::new();
        let mut builder = PdfBuilder::new();
        let p = page(vec![
            text(10.0, 20.0, "Hi", StandardFont::Helvetica),
            LayoutElement {
                x: 10.0,
                y: 100.0,
                width: 50.0,
                height: 0.0,
                draw: DrawCommand::Line {
                    color: Color::BLACK,
                    line_width: 0.2,
                },
            },
        ]);
        writer.register_fonts(&mut builder, std::slice::from_ref(&p));
        let stream = String::from_utf8(writer.build_content_stream(&p, &builder)).unwrap();

        // 10mm = 28.35pt, 297 - 20 = 277mm = 785.20pt
        assert!(stream.contains("28.35 785.20 Td\n(Hi) Tj"), "{}", stream);
        assert!(stream.contains("28.35 558.43 m\n170.08 558.43 l\nS"), "{}", stream);
    }

    #[test]
    fn test_images_become_xobjects() {
        let image = LoadedImage {
            pixel_data: ImagePixelData::Decoded {
                rgb: vec![255; 2 * 2 * 3],
                alpha: Some(vec![128; 4]),
            },
            width_px: 2,
            height_px: 2,
        };
        let pages = vec![page(vec![LayoutElement {
            x: 65.0,
            y: 40.0,
            width: 20.0,
            height: 20.0,
            draw: DrawCommand::Image { image_data: image },
        }])];
        let bytes = PdfWriter::new().write(&pages, &Metadata::default()).unwrap();
        assert!(contains(&bytes, b"/SMask"));
        assert!(contains(&bytes, b"/XObject << /Im0"));
    }
}
