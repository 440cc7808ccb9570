mod cli;
mod output;
mod serial;

use arduvision::{hex_parser::decode_from_string, EstimatorConfig};
use clap::Parser;
use simple_eyre::{eyre::WrapErr, Result};
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use cli::*;

fn main() -> Result<()> {
    simple_eyre::install()?;
    let cli = Cli::parse();
    env_logger::init();

    match &cli.command {
        Commands::List => list_serial(),
        Commands::Grab(conf) => grab_frame(conf),
        Commands::Track(conf) => track(conf),
        Commands::Replay(conf) => replay(conf),
    }
}

/// Returns std::io::Write stream with coloring enabled if program is run interactively
fn get_stdout() -> StandardStream {
    StandardStream::stdout(if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    })
}

fn list_serial() -> Result<()> {
    let mut stdout = get_stdout();
    let paths = serialport::available_ports()?;
    if paths.is_empty() {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        writeln!(&mut stdout, "No connected serial ports found.")?;
    } else {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        writeln!(&mut stdout, "Connected serial ports:")?;
    }
    stdout.reset()?;
    paths.iter().for_each(|p| println!("{}", p.port_name));

    Ok(())
}

fn grab_frame(conf: &GrabConf) -> Result<()> {
    let mut camera = conf.serial.open_camera(EstimatorConfig::default())?;
    let acquisition = camera
        .run_with_retries(conf.mode, conf.attempts)
        .wrap_err_with(|| format!("Could not grab a {} frame", conf.mode))?;
    conf.output.write_frame(&acquisition.frame)
}

fn track(conf: &TrackConf) -> Result<()> {
    let mut camera = conf.serial.open_camera(conf.estimator())?;
    let mut stdout = get_stdout();
    let mut taken = 0;
    while conf.count.map_or(true, |count| taken < count) {
        match camera.run_with_retries(conf.mode, conf.attempts) {
            Ok(acquisition) => {
                let raw = acquisition.frame.coordinate().unwrap_or_default();
                let smoothed = acquisition.smoothed.unwrap_or(raw);
                writeln!(&mut stdout, "{raw:>5}\t{smoothed:>9.3}")?;
                taken += 1;
            }
            // Tracking goes on after a lost coordinate
            Err(e) if e.is_recoverable() => {
                stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
                writeln!(&mut stdout, "Skipped coordinate: {e}")?;
                stdout.reset()?;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn replay(conf: &ReplayConf) -> Result<()> {
    let dump = std::fs::read_to_string(&conf.input)
        .wrap_err_with(|| format!("Could not read {:?}", conf.input))?;
    let acquisition = decode_from_string(&dump, conf.mode)?;
    if let Some(smoothed) = acquisition.smoothed {
        log::info!("Smoothed coordinate: {}", smoothed);
    }
    conf.output.write_frame(&acquisition.frame)
}
