//! CLI tool for xlrender - lays out a worksheet and writes rendered output
//!
//! Usage:
//!   xlrender_cli <sheet.json>                      # Print the page breakdown
//!   xlrender_cli <sheet.json> --pages out/         # One PNG per page
//!   xlrender_cli <sheet.json> --png sheet.png      # Whole sheet as one PNG
//!   xlrender_cli <sheet.json> --svg out/           # One SVG per printed page
//!   xlrender_cli <sheet.json> --json doc.json      # Paged display list as JSON
//!   xlrender_cli <sheet.json> --options opts.json  # RenderOptions (scale, dpi, ...)
//!
//! `RUST_LOG=debug` shows per-page progress.

#![allow(clippy::exit)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use xlrender::{Measurer, RenderOptions, SheetRenderer, Worksheet};

const USAGE: &str = "Usage: xlrender_cli <sheet.json> [--pages DIR] [--png FILE] [--svg DIR] [--json FILE] [--options FILE]";

#[derive(Debug, Default)]
struct Args {
    input: PathBuf,
    pages_dir: Option<PathBuf>,
    png: Option<PathBuf>,
    svg_dir: Option<PathBuf>,
    json: Option<PathBuf>,
    options: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = env::args().skip(1);
    let mut parsed = Args::default();
    let mut input = None;

    while let Some(arg) = args.next() {
        let slot = match arg.as_str() {
            "--pages" => &mut parsed.pages_dir,
            "--png" => &mut parsed.png,
            "--svg" => &mut parsed.svg_dir,
            "--json" => &mut parsed.json,
            "--options" => &mut parsed.options,
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with("--") => return Err(format!("Unknown option {flag}\n{USAGE}")),
            _ => {
                if input.replace(PathBuf::from(&arg)).is_some() {
                    return Err(format!("Unexpected argument {arg}\n{USAGE}"));
                }
                continue;
            }
        };
        let value = args
            .next()
            .ok_or_else(|| format!("{arg} needs a value\n{USAGE}"))?;
        *slot = Some(PathBuf::from(value));
    }

    parsed.input = input.ok_or_else(|| USAGE.to_string())?;
    Ok(parsed)
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("Error {context}: {err}");
    process::exit(1);
}

fn ensure_dir(dir: &Path) {
    if let Err(e) = fs::create_dir_all(dir) {
        fail(&format!("creating {}", dir.display()), e);
    }
}

fn main() {
    env_logger::init();

    let args = match parse_args() {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("{msg}");
            process::exit(1);
        }
    };

    let options = match &args.options {
        Some(path) => {
            let text = fs::read_to_string(path)
                .unwrap_or_else(|e| fail(&format!("reading {}", path.display()), e));
            serde_json::from_str::<RenderOptions>(&text)
                .unwrap_or_else(|e| fail(&format!("parsing {}", path.display()), e))
        }
        None => RenderOptions::default(),
    };

    let text = fs::read_to_string(&args.input)
        .unwrap_or_else(|e| fail(&format!("reading {}", args.input.display()), e));
    let sheet: Worksheet = serde_json::from_str(&text)
        .unwrap_or_else(|e| fail(&format!("parsing {}", args.input.display()), e));

    let measurer = Measurer::default();
    let mut renderer = SheetRenderer::with_options(&sheet, &measurer, options);

    let (width, height) = renderer.calculate_worksheet_size();
    let pages = renderer
        .paginate()
        .unwrap_or_else(|e| fail("paginating", e));
    println!(
        "'{}': {} x {} cells, {width:.1} x {height:.1} pt, {} page(s)",
        sheet.name,
        sheet.max_row(),
        sheet.max_col(),
        pages.len()
    );
    for page in &pages {
        println!(
            "  page {}: rows {}-{}, cols {}-{}",
            page.page_number, page.row_start, page.row_end, page.col_start, page.col_end
        );
    }

    if let Some(dir) = &args.pages_dir {
        ensure_dir(dir);
        let rendered = renderer
            .raster_pages(None)
            .unwrap_or_else(|e| fail("rendering pages", e));
        for (surface, report) in rendered {
            let path = dir.join(format!("page_{:03}.png", report.page_number));
            if let Err(e) = surface.save_png(&path) {
                fail(&format!("writing {}", path.display()), e);
            }
            if report.degraded_text {
                eprintln!("Warning: page {} used approximate text metrics", report.page_number);
            }
            eprintln!("Written: {}", path.display());
        }
    }

    if let Some(path) = &args.png {
        let (surface, report) = renderer
            .raster_sheet()
            .unwrap_or_else(|e| fail("rendering sheet", e));
        if let Err(e) = surface.save_png(path) {
            fail(&format!("writing {}", path.display()), e);
        }
        if report.degraded_text {
            eprintln!("Warning: approximate text metrics were used");
        }
        eprintln!("Written: {}", path.display());
    }

    if args.svg_dir.is_some() || args.json.is_some() {
        let (document, _reports) = renderer
            .render_document()
            .unwrap_or_else(|e| fail("rendering document", e));

        if let Some(dir) = &args.svg_dir {
            ensure_dir(dir);
            for index in 0..document.page_count() {
                let Some(svg) = document.to_svg(index) else {
                    continue;
                };
                let path = dir.join(format!("page_{:03}.svg", index + 1));
                if let Err(e) = fs::write(&path, svg) {
                    fail(&format!("writing {}", path.display()), e);
                }
                eprintln!("Written: {}", path.display());
            }
        }

        if let Some(path) = &args.json {
            let json = document
                .to_json()
                .unwrap_or_else(|e| fail("serializing document", e));
            if let Err(e) = fs::write(path, json) {
                fail(&format!("writing {}", path.display()), e);
            }
            eprintln!("Written: {}", path.display());
        }
    }
}
