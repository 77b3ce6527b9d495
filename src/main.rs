use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use scancrop::geometry::ViewSize;
use scancrop::{config, logging, CropRequest};

/// Crop a photographed page and write an enhanced, sharpened JPEG next to it.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Photo to crop.
    input: PathBuf,

    /// Size of the view the photo is displayed in, as "WxH".
    /// Defaults to the photo's own size.
    #[arg(long, value_name = "WxH", value_parser = parse_view)]
    view: Option<ViewSize>,

    /// Crop rectangle in view coordinates, as "LEFT,TOP,RIGHT,BOTTOM".
    /// Defaults to the whole image.
    #[arg(long, value_name = "L,T,R,B", value_parser = parse_rect)]
    rect: Option<[i32; 4]>,

    /// Override the configured worker count.
    #[arg(long)]
    workers: Option<usize>,
}

fn parse_view(value: &str) -> Result<ViewSize, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("view must be 'WxH', got: '{value}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<i32>()
            .map_err(|e| format!("invalid view dimension '{part}': {e}"))
    };
    Ok(ViewSize::new(parse(width)?, parse(height)?))
}

fn parse_rect(value: &str) -> Result<[i32; 4], String> {
    let parts = value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<i32>()
                .map_err(|e| format!("invalid rect coordinate '{part}': {e}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    <[i32; 4]>::try_from(parts).map_err(|_| format!("rect must be 'L,T,R,B', got: '{value}'"))
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let mut config = config::load_app_config();
    if let Some(workers) = args.workers {
        config.workers = Some(workers);
    }

    let request = CropRequest {
        source: args.input,
        view: args.view,
        rect: args.rect,
    };
    let report = scancrop::run(&request, &config)
        .with_context(|| format!("failed to crop {}", request.source.display()))?;

    println!(
        "{} ({}x{})",
        report.output.display(),
        report.final_size.0,
        report.final_size.1
    );
    Ok(())
}
