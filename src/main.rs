// SPDX-License-Identifier: MPL-2.0
use layer_lens::config;
use layer_lens::diagnostics::Severity;
use layer_lens::domain::Point;
use layer_lens::io::CodecRegistry;
use layer_lens::paths;
use layer_lens::stack::LayerStack;
use std::path::PathBuf;
use std::process::ExitCode;

const HELP: &str = "\
layer_lens: stack raster and vector layers and query them

USAGE:
  layer_lens [OPTIONS] [FILES]...

OPTIONS:
  --config-dir DIR      Read settings.toml from DIR
  --display-config FILE Rebuild layers from a display configuration
  --zoom FACTOR         Zoom every layer around the view origin
  --zoom-in             One configured zoom-in step (repeatable)
  --zoom-out            One configured zoom-out step (repeatable)
  --step SX,SY          Pan by whole configured pan steps
  --fast                Use the fast pan step with --step
  --pan DX,DY           Pan every layer by a view delta
  --query X,Y           Print layer values at a view point (repeatable)
  --write-config FILE   Save the display configuration of the loaded layers
  -h, --help            Print this help
";

struct Args {
    config_dir: Option<String>,
    display_config: Option<PathBuf>,
    zoom: Option<f64>,
    zoom_steps: i32,
    steps: Option<(i32, i32)>,
    fast: bool,
    pan: Option<Point>,
    queries: Vec<Point>,
    write_config: Option<PathBuf>,
    files: Vec<PathBuf>,
}

fn parse_point(raw: &str) -> Result<Point, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {}", raw))?;
    let x = x.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok(Point::new(x, y))
}

fn parse_steps(raw: &str) -> Result<(i32, i32), String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected SX,SY, got {}", raw))?;
    let x = x.trim().parse::<i32>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<i32>().map_err(|e| e.to_string())?;
    Ok((x, y))
}

fn count_flag(args: &mut pico_args::Arguments, flag: &'static str) -> i32 {
    let mut count = 0;
    while args.contains(flag) {
        count += 1;
    }
    count
}

fn parse_args() -> Result<Option<Args>, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }
    let zoom_steps = count_flag(&mut args, "--zoom-in") - count_flag(&mut args, "--zoom-out");
    let fast = args.contains("--fast");
    let parsed = Args {
        config_dir: args.opt_value_from_str("--config-dir")?,
        display_config: args.opt_value_from_str("--display-config")?,
        zoom: args.opt_value_from_str("--zoom")?,
        zoom_steps,
        steps: args.opt_value_from_fn("--step", parse_steps)?,
        fast,
        pan: args.opt_value_from_fn("--pan", parse_point)?,
        queries: args.values_from_fn("--query", parse_point)?,
        write_config: args.opt_value_from_str("--write-config")?,
        files: args.finish().into_iter().map(PathBuf::from).collect(),
    };
    Ok(Some(parsed))
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            print!("{}", HELP);
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("Error: {}\n\n{}", err, HELP);
            return ExitCode::FAILURE;
        }
    };

    paths::init_cli_override(args.config_dir);
    let (settings, warning) = config::load();
    if let Some(key) = warning {
        eprintln!("Warning: {}", key);
    }

    let registry = CodecRegistry::with_defaults();
    let mut stack = LayerStack::new(&settings);

    let mut failed = false;
    if let Some(path) = &args.display_config {
        match stack.load_display_config(path, &registry) {
            Ok(report) => failed |= !report.is_complete(),
            Err(_) => failed = true,
        }
    }
    let report = stack.add_layers_from_files(&args.files, &registry);
    failed |= !report.is_complete();

    let origin = Point::new(0.0, 0.0);
    if let Some(factor) = args.zoom {
        stack.zoom_at(factor, origin);
    }
    for _ in 0..args.zoom_steps {
        stack.zoom_in_at(origin);
    }
    for _ in args.zoom_steps..0 {
        stack.zoom_out_at(origin);
    }
    if let Some(delta) = args.pan {
        stack.pan(delta.x, delta.y);
    }
    if let Some((sx, sy)) = args.steps {
        stack.pan_by_steps(sx, sy, args.fast);
    }

    for event in stack.events().iter() {
        if event.severity() >= Severity::Warning {
            eprintln!("{}", event);
        }
    }

    for (index, row) in stack.rows().iter().enumerate() {
        let t = row.layer().transform();
        println!(
            "[{}] {} (zoom {}%, translation {}, {})",
            index,
            row.label(),
            100.0 / t.zoom_factor(),
            t.translation_x(),
            t.translation_y()
        );
    }

    for point in &args.queries {
        println!("@ {}, {}", point.x, point.y);
        if let Some(status) = stack.status_at(*point) {
            print!("  image ({}, {})", status.pixel.x, status.pixel.y);
            if let Some(carto) = status.cartographic {
                print!("  carto ({:.3}, {:.3})", carto.x, carto.y);
            }
            println!();
        }
        for readout in stack.query_pixel(*point) {
            println!("  {}: {}", readout.layer, readout.value);
        }
    }

    if let Some(path) = &args.write_config {
        match stack.write_display_config(path) {
            Ok(written) => println!("Display configuration written to {}", written.display()),
            Err(err) => {
                eprintln!("{}", err);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
