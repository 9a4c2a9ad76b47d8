mod blur;
mod distance;
mod grid;
mod light;
mod scene;


// Re-export public API
pub use blur::blur_light_field;
pub use distance::{
    DistanceField, DistanceFieldBuilder, FloodSchedule, FloodStats, NearestSeedField, build_distance_field,
};
pub use grid::{GridError, OccupancyGrid};
pub use light::{LightConfig, LightField, clamp_light_position, falloff, field_to_string, render_light_field};
pub use scene::{RebuildOutcome, ShadowScene};

use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Room with a few pillars, used by `--demo` and the benchmark.
const DEMO_MAP: &str = "
    ################################
    #..............................#
    #..............................#
    #.....###..............###.....#
    #.....###..............###.....#
    #..............................#
    #..............##..............#
    #..............##..............#
    #..............................#
    #.....###..............###.....#
    #.....###..............###.....#
    #..............................#
    #..............................#
    ################################
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Usage,
    Demo,
    Benchmark,
}

#[derive(Debug, Clone)]
struct CliOptions {
    mode: Mode,
    config: LightConfig,
    schedule: FloodSchedule,
    seed: u64,
}

impl CliOptions {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut options = CliOptions {
            mode: Mode::Usage,
            config: LightConfig::default(),
            schedule: FloodSchedule::TwoSweep,
            seed: 0,
        };

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--demo" => options.mode = Mode::Demo,
                "--benchmark" => options.mode = Mode::Benchmark,
                "--cone" => options.config.use_cone = true,
                "--surface" => options.config.surface_check = true,
                "--blur" => options.config.blur = true,
                "--jitter" => {
                    options.config.jitter_start = true;
                    options.config.jitter_step = true;
                }
                "--jump-flood" => options.schedule = FloodSchedule::JumpFlood,
                "--seed" => {
                    let value = iter.next().ok_or("--seed needs a value")?;
                    options.seed = value
                        .parse()
                        .map_err(|e| format!("bad --seed value {:?}: {}", value, e))?;
                }
                other => log::warn!("ignoring unknown argument {:?}", other),
            }
        }

        Ok(options)
    }
}

fn main() {
    // try_init: test_main calls main() again in the same process
    let _ = env_logger::try_init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match CliOptions::parse(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };

    match options.mode {
        Mode::Demo => {
            if let Err(e) = run_demo(&options) {
                eprintln!("Error: {}", e);
            }
        }
        Mode::Benchmark => {
            if let Err(e) = run_benchmark(&options) {
                eprintln!("Error: {}", e);
            }
        }
        Mode::Usage => {
            println!("Shadow Field");
            println!("Run with --demo to print a lit demo room");
            println!("Run with --benchmark to test performance");
            println!("Flags: --cone --surface --blur --jitter --jump-flood --seed N");
        }
    }
}

fn run_demo(options: &CliOptions) -> Result<(), String> {
    let grid = OccupancyGrid::from_ascii(DEMO_MAP).map_err(|e| e.to_string())?;
    let light = (grid.width() as isize / 2 - 6, grid.height() as isize / 2);
    let mut scene = ShadowScene::new(grid, options.config.clone(), light);
    scene.set_schedule(options.schedule);

    let mut rng = Pcg32::seed_from_u64(options.seed);
    scene.rebuild(&mut rng);

    let stats = scene.flood_stats();
    println!(
        "{}x{}. {} merges. {:.2} samples per cell",
        scene.grid().width(),
        scene.grid().height(),
        stats.merges,
        stats.samples_per_cell
    );
    println!("Light at {:?}, config {:?}", scene.light(), scene.config());
    println!();
    print!("{}", field_to_string(scene.light_field().values(), scene.grid().width()));

    Ok(())
}

/// Tile the demo room to reach roughly `width` x `height` cells.
fn benchmark_grid(width: usize, height: usize) -> Result<OccupancyGrid, String> {
    let room = OccupancyGrid::from_ascii(DEMO_MAP).map_err(|e| e.to_string())?;
    let mut grid = OccupancyGrid::new(width, height).map_err(|e| e.to_string())?;
    for y in 0..height {
        for x in 0..width {
            grid.set(x, y, room.is_solid(x % room.width(), y % room.height()));
        }
    }
    Ok(grid)
}

fn run_benchmark(options: &CliOptions) -> Result<(), String> {
    use std::time::Instant;

    println!("=== Shadow Field Benchmark ===\n");

    let sizes = [(128, 128), (256, 256), (512, 512)];
    let iterations = 10;

    for (width, height) in sizes {
        println!("Grid size: {}x{}", width, height);
        println!("-----------------------");

        let grid = benchmark_grid(width, height)?;

        let two_sweep = DistanceFieldBuilder::with_schedule(FloodSchedule::TwoSweep);
        let start = Instant::now();
        for _ in 0..iterations {
            let _ = two_sweep.build(&grid);
        }
        let avg_two_sweep_ms = start.elapsed().as_secs_f64() * 1000.0 / iterations as f64;

        let jump = DistanceFieldBuilder::with_schedule(FloodSchedule::JumpFlood);
        let start = Instant::now();
        for _ in 0..iterations {
            let _ = jump.build(&grid);
        }
        let avg_jump_ms = start.elapsed().as_secs_f64() * 1000.0 / iterations as f64;

        let (_, field) = DistanceFieldBuilder::with_schedule(options.schedule).build(&grid);
        let light = (width as isize / 2 + 3, height as isize / 2 + 3);
        let mut rng = Pcg32::seed_from_u64(options.seed);

        let start = Instant::now();
        for _ in 0..iterations {
            let mut lit = render_light_field(&field, light, &options.config, &mut rng);
            if options.config.blur {
                blur_light_field(&mut lit);
            }
        }
        let avg_render_ms = start.elapsed().as_secs_f64() * 1000.0 / iterations as f64;

        println!("  Distance (two sweep): {:.3} ms/iter", avg_two_sweep_ms);
        println!("  Distance (jump flood): {:.3} ms/iter", avg_jump_ms);
        println!("  Light render:          {:.3} ms/iter", avg_render_ms);
        println!(
            "  Estimated max FPS (full rebuild): {:.1}",
            1000.0 / (avg_two_sweep_ms + avg_render_ms)
        );
        println!();
    }

    Ok(())
}
