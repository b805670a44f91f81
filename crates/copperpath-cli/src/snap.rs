use anyhow::Result;
use clap::Args;
use copperpath_geom::{snap_angle, snap_direction, Point, SnapAngle};

#[derive(Args, Debug, Clone)]
#[command(about = "Snap a segment to the nearest 0°, 45° or 90° direction")]
pub struct SnapArgs {
    /// Segment start, as `X,Y`.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub from: Point,

    /// Cursor position, as `X,Y`.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub to: Point,
}

pub fn execute(args: SnapArgs) -> Result<()> {
    let end = snap_direction(args.from, args.to);
    let angle = match snap_angle(args.from, args.to) {
        SnapAngle::Horizontal => "0°",
        SnapAngle::Diagonal => "45°",
        SnapAngle::Vertical => "90°",
    };
    println!("{},{} {angle}", end.x, end.y);
    Ok(())
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<i32>()
            .map_err(|e| format!("bad coordinate '{v}': {e}"))
    };
    Ok(Point::new(coord(x)?, coord(y)?))
}
