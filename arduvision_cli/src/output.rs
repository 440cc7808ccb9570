use arduvision::{
    config::{DRAW_SCALE, F_H, F_W, SCR_H, SCR_W},
    FrameBuffer,
};
use clap::{Args, ValueEnum};
use plotters::prelude::*;
use simple_eyre::{eyre::eyre, Result};
use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

#[derive(Args)]
pub struct Output {
    /// Path to a file where the frame should be stored
    #[clap(short, long, value_parser = unique_path_parser, value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,

    /// File format for frame output
    #[clap(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

fn unique_path_parser(p: &str) -> Result<PathBuf> {
    let p = Path::new(p);
    if p.try_exists()? {
        Err(eyre!("Path {p:?} already exists"))
    } else {
        Ok(p.to_path_buf())
    }
}

#[derive(ValueEnum, Clone, Default)]
pub enum OutputFormat {
    #[default]
    Image,
    Csv,
}

/// One line of luma values per row. Tracking frames become their coordinate.
fn frame_to_csv(frame: &FrameBuffer) -> String {
    log::trace!("Formatting frame as CSV");
    if let Some(coordinate) = frame.coordinate() {
        return coordinate.to_string();
    }
    (0..F_H)
        .map(|y| {
            (0..F_W)
                .filter_map(|x| frame.luma(x, y))
                .map(|luma| luma.to_string())
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn draw_frame<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    frame: &FrameBuffer,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&BLACK)?;

    log::trace!("Drawing {} pixels scaled by {}", F_W * F_H, DRAW_SCALE);
    let scale = DRAW_SCALE as i32;
    for y in 0..F_H {
        for x in 0..F_W {
            let luma = frame.luma(x, y).unwrap_or_default();
            let (left, top) = (x as i32 * scale, y as i32 * scale);
            root.draw(&Rectangle::new(
                [(left, top), (left + scale, top + scale)],
                RGBColor(luma, luma, luma).filled(),
            ))?;
        }
    }

    log::trace!("Pushing frame to rendering backend");
    root.present()?;

    Ok(())
}

impl Output {
    pub fn write_frame(&self, frame: &FrameBuffer) -> Result<()> {
        log::debug!("Saving {} frame to {:?}", frame.mode(), self.output);
        match self.format {
            OutputFormat::Image => {
                if !frame.mode().is_streaming() {
                    return Err(eyre!("Only streamed frames can be stored as an image"));
                }
                let root = BitMapBackend::new(self.output.as_path(), (SCR_W as u32, SCR_H as u32))
                    .into_drawing_area();
                draw_frame(&root, frame)?;
            }
            OutputFormat::Csv => {
                let mut out = File::create(self.output.as_path())?;
                let data = frame_to_csv(frame);
                out.write_all(data.as_bytes())?;
            }
        };
        Ok(())
    }
}
