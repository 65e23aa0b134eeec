use std::path::PathBuf;

use clap::Parser;
use glam::IVec3;
use relief_config::CliArgs;

/// Build a colored relief from an image, one batch of blocks per tick.
#[derive(Parser, Debug)]
#[command(name = "relief", version)]
pub struct Cli {
    /// Relief width in cells.
    #[arg(required_unless_present = "list")]
    pub width: Option<u32>,

    /// Relief depth in cells.
    #[arg(required_unless_present = "list")]
    pub height: Option<u32>,

    /// Generator name: v1, v2, v3, v4, game or wave_noise.
    #[arg(required_unless_present = "list")]
    pub generator: Option<String>,

    /// Source image name inside the image directory.
    #[arg(required_unless_present = "list")]
    pub image: Option<String>,

    /// Seed for the randomized generators.
    #[arg(long)]
    pub seed: Option<u64>,

    /// World position of the first cell at height 0.
    #[arg(long, value_name = "X,Y,Z", value_parser = parse_origin, allow_hyphen_values = true)]
    pub origin: Option<IVec3>,

    /// Also write a top-down PNG preview of the relief.
    #[arg(long, value_name = "PNG")]
    pub preview: Option<PathBuf>,

    /// List generators and available images, then exit.
    #[arg(long)]
    pub list: bool,

    #[command(flatten)]
    pub overrides: CliArgs,
}

/// Parse `x,y,z` into a block position.
pub fn parse_origin(value: &str) -> Result<IVec3, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("invalid coordinate in `{value}`: {err}"))?;

    match parts[..] {
        [x, y, z] => Ok(IVec3::new(x, y, z)),
        _ => Err(format!("expected three coordinates as x,y,z, got `{value}`")),
    }
}
