use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use photocycle::{
    DaypartBoost, FrameStreamer, PlaybackClock, WriterSink, load_recipe, sample, summarize,
};

#[derive(Parser, Debug)]
#[command(name = "photocycle", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print recipe metadata and a per-day keyframe summary.
    Info(InfoArgs),
    /// Resolve the grid at a given day and time, print its spectral summary.
    Sample(SampleArgs),
    /// Simulate playback and stream encoded device frames to a file.
    Stream(StreamArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input recipe JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    /// Input recipe JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Day index (0-based).
    #[arg(long, default_value_t = 0)]
    day: usize,

    /// Minute of the cycle in [0, 1440).
    #[arg(long, default_value_t = 720)]
    time: u32,

    /// Enable the red-channel morning/midday boost bands.
    #[arg(long, default_value_t = false)]
    boost_red_day: bool,
}

#[derive(Parser, Debug)]
struct StreamArgs {
    /// Input recipe JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output file for the raw frame stream.
    #[arg(long)]
    out: PathBuf,

    /// Animation speed knob in [1, 10000] (10 = realtime).
    #[arg(long, default_value_t = 10_000)]
    speed: u32,

    /// Simulated wall-clock duration in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    duration_ms: u64,

    /// Master brightness percentage.
    #[arg(long, default_value_t = 100)]
    brightness: u8,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Sample(args) => cmd_sample(args),
        Command::Stream(args) => cmd_stream(args),
    }
}

fn load(path: &PathBuf) -> anyhow::Result<photocycle::LoadedRecipe> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read recipe '{}'", path.display()))?;
    Ok(load_recipe(&json)?)
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let loaded = load(&args.in_path)?;
    let s = &loaded.schedule;
    println!("recipe:     {}", loaded.name);
    if let Some(created) = loaded.created_at {
        println!("created:    {}", created.to_rfc3339());
    }
    println!("grid:       {0}x{0}", s.grid_dim());
    println!("days:       {}", s.total_days());
    for (idx, day) in s.days().iter().enumerate() {
        let names: Vec<String> = day
            .keyframes()
            .iter()
            .map(|k| format!("{} @ {:02}:{:02}", k.name, k.time / 60, k.time % 60))
            .collect();
        println!("day {idx}: {}", names.join(", "));
    }
    Ok(())
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    let loaded = load(&args.in_path)?;
    let s = &loaded.schedule;
    let day = s
        .day(args.day)
        .with_context(|| format!("day {} out of range", args.day))?;

    let mut grid = sample(day.keyframes(), args.time, s.grid_dim());
    if args.boost_red_day {
        let boost = DaypartBoost {
            r: photocycle::BoostBands {
                morning: true,
                midday: true,
                ..Default::default()
            },
            ..Default::default()
        };
        grid = boost.apply(&grid, args.time);
    }

    let summary = summarize(&grid);
    println!(
        "avg R/G/B:  {:.1} / {:.1} / {:.1}",
        summary.avg[0], summary.avg[1], summary.avg[2]
    );
    println!("class:      {}", summary.class.label());
    for row in 0..usize::from(s.grid_dim()) {
        let cells: Vec<String> = (0..usize::from(s.grid_dim()))
            .map(|col| {
                let c = grid.cell_or_off(row * usize::from(s.grid_dim()) + col);
                if c.active {
                    format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
                } else {
                    "   .   ".to_string()
                }
            })
            .collect();
        println!("{}", cells.join(" "));
    }
    Ok(())
}

fn cmd_stream(args: StreamArgs) -> anyhow::Result<()> {
    let loaded = load(&args.in_path)?;
    let s = &loaded.schedule;

    let file = std::fs::File::create(&args.out)
        .with_context(|| format!("create output '{}'", args.out.display()))?;
    let mut streamer = FrameStreamer::new();
    streamer.connect(Box::new(WriterSink::new(std::io::BufWriter::new(file))));

    let mut clock = PlaybackClock::new(s.total_days());
    clock.set_animation_speed(args.speed);
    clock.play();

    // Fixed 50ms simulation steps: each step is eligible for one frame.
    let step_ms = 50u64;
    let mut sent = 0usize;
    let mut now_ms = 0u64;
    while now_ms < args.duration_ms {
        clock.tick(step_ms as f64);
        now_ms += step_ms;

        let day = clock.current_day();
        let minute = clock.current_time() as u32;
        let Some(keyframes) = s.day(day).map(|d| d.keyframes()) else {
            continue;
        };
        let grid = sample(keyframes, minute, s.grid_dim());
        match streamer.send(&grid, args.brightness, now_ms) {
            Ok(photocycle::SendOutcome::Sent) => sent += 1,
            Ok(_) => {}
            Err(err) => {
                // Transport failures disconnect; report and stop.
                eprintln!("stream stopped: {err}");
                break;
            }
        }
    }
    streamer.disconnect();
    eprintln!("wrote {sent} frames to {}", args.out.display());
    Ok(())
}
