//! Backend tests: paged documents, SVG and JSON export, and raster output.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use xlrender::render::DrawCommand;
use xlrender::{Fill, Measurer, RenderOptions, Rgb, SheetRenderer, Worksheet};

#[test]
fn test_document_has_one_paper_sized_page_per_layout_page() {
    let ws = common::grid(70, 3);
    let measurer = Measurer::default();
    let mut renderer = SheetRenderer::new(&ws, &measurer);
    let (doc, reports) = renderer.render_document().unwrap();

    assert_eq!(doc.page_count(), 3);
    assert_eq!(reports.len(), 3);
    for page in doc.pages() {
        assert_eq!((page.width, page.height), (595.28, 841.89));
    }
    // Left margin 0.75in, top margin plus header 1.5in.
    let first = doc.pages()[0].commands.iter().find_map(|c| match c {
        DrawCommand::Text { x, text, .. } => Some((text.clone(), *x)),
        _ => None,
    });
    assert_eq!(first, Some(("r1c1".to_string(), 54.0 + 2.0)));
}

#[test]
fn test_svg_export_escapes_text_and_stops_after_last_page() {
    let mut ws = Worksheet::new("S");
    ws.set_value(1, 1, "a<b & \"c\"");
    ws.set_style(1, 1, common::filled(Fill::solid(Rgb::new(0x12, 0xAB, 0x34))));
    let measurer = Measurer::default();
    let mut renderer = SheetRenderer::new(&ws, &measurer);
    let (doc, _) = renderer.render_document().unwrap();

    let svg = doc.to_svg(0).unwrap();
    assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
    assert!(svg.contains(r#"width="595.28""#));
    assert!(svg.contains("a&lt;b &amp; &quot;c&quot;"));
    assert!(svg.contains(r##"fill="#12AB34""##));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert!(doc.to_svg(1).is_none());
}

#[test]
fn test_implicit_page_svg_uses_drawn_extent() {
    let mut ws = Worksheet::new("S");
    ws.set_style(2, 2, common::filled(Fill::solid(Rgb::BLACK)));
    let doc = common::record(&ws);
    let svg = doc.to_svg(0).unwrap();
    assert!(svg.contains(r#"width="128" height="40""#), "{svg}");
}

#[test]
fn test_json_export_is_tagged_per_command() {
    let mut ws = Worksheet::new("S");
    ws.set_value(1, 1, "x");
    ws.set_style(1, 1, common::filled(Fill::solid(Rgb::RED)));
    let measurer = Measurer::default();
    let mut renderer = SheetRenderer::new(&ws, &measurer);
    let (doc, _) = renderer.render_document().unwrap();

    let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
    let pages = json.as_array().unwrap();
    assert_eq!(pages.len(), 1);
    let ops: Vec<&str> = pages[0]["commands"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["op"].as_str().unwrap())
        .collect();
    assert_eq!(ops, ["fillRect", "text"]);
    assert_eq!(pages[0]["commands"][0]["color"], "#FF0000");
}

#[test]
fn test_raster_sheet_scales_points_to_pixels() {
    let mut ws = Worksheet::new("S");
    ws.set_style(1, 1, common::filled(Fill::solid(Rgb::RED)));
    let measurer = Measurer::default();
    let mut renderer = SheetRenderer::new(&ws, &measurer);
    let (surface, report) = renderer.raster_sheet().unwrap();

    // 64 x 20 points at 96 dpi.
    assert_eq!((surface.width(), surface.height()), (86, 27));
    assert_eq!(report.cells_rendered, 1);
    assert_eq!(surface.pixel(10, 10), Some(Rgb::RED));
    assert_eq!(surface.pixel(85, 10), Some(Rgb::WHITE));
    assert_eq!(surface.pixel(86, 10), None);
}

#[test]
fn test_raster_at_72_dpi_is_one_pixel_per_point() {
    let mut ws = Worksheet::new("S");
    ws.set_style(1, 2, common::filled(Fill::solid(Rgb::BLACK)));
    let measurer = Measurer::default();
    let options = RenderOptions {
        dpi: 72.0,
        background: Rgb::new(200, 200, 255),
        ..RenderOptions::default()
    };
    let mut renderer = SheetRenderer::with_options(&ws, &measurer, options);
    let (surface, _) = renderer.raster_sheet().unwrap();
    assert_eq!((surface.width(), surface.height()), (128, 20));
    assert_eq!(surface.pixel(10, 10), Some(Rgb::new(200, 200, 255)));
    assert_eq!(surface.pixel(70, 10), Some(Rgb::BLACK));
}

#[test]
fn test_raster_pages_match_pagination() {
    let ws = common::grid(40, 9);
    let measurer = Measurer::default();
    let mut renderer = SheetRenderer::new(&ws, &measurer);
    let pages = renderer.paginate().unwrap();
    let rasters = renderer.raster_pages(None).unwrap();
    assert_eq!(rasters.len(), pages.len());
    let px = RenderOptions::default().pixel_scale();
    for ((surface, report), page) in rasters.iter().zip(&pages) {
        assert_eq!(report.page_number, page.page_number);
        assert_eq!(f64::from(surface.width()), (page.width * px).ceil());
        assert_eq!(f64::from(surface.height()), (page.height * px).ceil());
    }
}

#[test]
fn test_raster_png_round_trips_through_disk() {
    let mut ws = Worksheet::new("S");
    ws.set_style(1, 1, common::filled(Fill::solid(Rgb::new(0, 0, 255))));
    let measurer = Measurer::default();
    let mut renderer = SheetRenderer::new(&ws, &measurer);
    let (surface, _) = renderer.raster_sheet().unwrap();

    let path = std::env::temp_dir().join(format!("xlrender-{}.png", std::process::id()));
    surface.save_png(&path).unwrap();
    let read = image::open(&path).unwrap().to_rgb8();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(read.dimensions(), (surface.width(), surface.height()));
    assert_eq!(read.get_pixel(5, 5).0, [0, 0, 255]);
}
