use clap::Parser;
use tracing_subscriber::EnvFilter;
use wind_sim_core::{
    bake_with_report, Aabb, BakeConfig, BoxObstacles, DeltaField, SolverParams, Vec3, WindConfig,
    WindSimulation,
};

/// Wind simulation demo: blow air down a channel past a block, bake and validate
#[derive(Parser, Debug)]
#[command(name = "wind-sim-demo")]
#[command(about = "Stable-fluids wind simulation and streamline bake demo", long_about = None)]
struct Args {
    /// Channel length in meters (x axis)
    #[arg(long, default_value_t = 32.0)]
    length: f32,

    /// Channel height in meters (y axis)
    #[arg(long, default_value_t = 12.0)]
    height: f32,

    /// Channel width in meters (z axis)
    #[arg(long, default_value_t = 12.0)]
    width: f32,

    /// Cell size in meters
    #[arg(short, long, default_value_t = 1.0)]
    cell_size: f32,

    /// Inflow force applied on the upwind face
    #[arg(short, long, default_value_t = 20.0)]
    inflow: f32,

    /// Number of fixed ticks to simulate
    #[arg(short, long, default_value_t = 60)]
    steps: usize,

    /// Tick rate in Hz
    #[arg(long, default_value_t = 30.0)]
    tick_rate: f32,

    /// Viscosity for velocity diffusion
    #[arg(long, default_value_t = 0.0001)]
    viscosity: f32,

    /// Seed lattice spacing in cells
    #[arg(long, default_value_t = 2)]
    stride: usize,

    /// Maximum steps per streamline
    #[arg(long, default_value_t = 100)]
    max_steps: usize,

    /// Skip the obstacle in the middle of the channel
    #[arg(long)]
    no_block: bool,

    /// Report interval in ticks
    #[arg(short, long, default_value_t = 15)]
    report_interval: usize,
}

/// Inflow across the whole upwind face, smoke through its middle
fn paint_inflow(sim: &mut WindSimulation, inflow: f32) {
    let dim = sim.dim();
    for k in 1..=dim.depth {
        for j in 1..=dim.height {
            sim.add_velocity_source(1, j, k, Vec3::new(inflow, 0.0, 0.0));
        }
    }
    sim.add_density_source(1, dim.height / 2 + 1, dim.depth / 2 + 1, 50.0);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if !(args.cell_size > 0.0) || args.tick_rate <= 0.0 {
        eprintln!("Cell size and tick rate must be positive");
        std::process::exit(2);
    }

    println!("=== Wind Simulation Demo ===\n");

    let mut sim = WindSimulation::new(args.length, args.height, args.width, args.cell_size)
        .with_params(SolverParams {
            viscosity: args.viscosity,
            ..SolverParams::default()
        });
    let dim = sim.dim();
    println!(
        "Created {}x{}x{} cells at {:.2}m ({:.0}x{:.0}x{:.0}m)",
        dim.width, dim.height, dim.depth, args.cell_size, args.length, args.height, args.width
    );

    // Block standing on the floor halfway down the channel
    let mut scene = BoxObstacles::new();
    if !args.no_block {
        let block = Aabb::from_center_size(
            Vec3::new(args.length * 0.5, args.height * 0.25, args.width * 0.5),
            Vec3::new(args.length * 0.1, args.height * 0.5, args.width * 0.3),
        );
        println!(
            "Block from ({:.1}, {:.1}, {:.1}) to ({:.1}, {:.1}, {:.1})",
            block.min.x, block.min.y, block.min.z, block.max.x, block.max.y, block.max.z
        );
        scene.push(block);
    }
    sim.build_for_scene(&scene, Vec3::zeros());
    println!("Obstructed cells: {}\n", sim.obstruction().solid_count());

    let config = WindConfig::default();
    let delta = 1.0 / args.tick_rate;
    let interval = args.report_interval.max(1);

    println!("Simulating {} ticks at {:.0} Hz...", args.steps, args.tick_rate);
    for tick in 1..=args.steps {
        // The source buffers double as solver scratch, so repaint them every tick
        sim.clear_sources();
        paint_inflow(&mut sim, args.inflow);
        sim.step(delta, &config);
        if tick % interval == 0 || tick == args.steps {
            println!(
                "[t={:6.2}s] max speed: {:7.3} m/s | density: {:8.3} | divergence rms: {:.5} | step: {:.2}ms",
                sim.simulated_time(),
                sim.max_speed(),
                sim.total_density(),
                sim.divergence_rms(),
                sim.last_step_ms()
            );
        }
    }

    let timing = sim.step_timing();
    println!(
        "Step cost: mean {:.2}ms, max {:.2}ms over {} steps",
        timing.mean_frame_time_ms(),
        timing.max_frame_time_ms(),
        timing.frames()
    );

    let bake_config = BakeConfig {
        stride: args.stride,
        max_steps: args.max_steps,
        ..BakeConfig::default()
    };
    println!("\nBaking streamlines (stride {})...", bake_config.stride);
    let (source, report) = bake_with_report(&sim, &scene, &bake_config);
    println!(
        "Seeds: {} traced, {} obstructed | accepted: {} | discarded: {} | collisions: {}",
        report.seeds, report.obstructed_seeds, report.accepted, report.discarded, report.collisions
    );
    if let Some(lengths) = report.trace_length {
        println!(
            "Trace length (points): Q1 {:.0} | median {:.0} | Q3 {:.0}",
            lengths.q1, lengths.median, lengths.q3
        );
    }

    match source.to_bytes() {
        Ok(bytes) => println!("Encoded wind source: {} functions, {} bytes", source.len(), bytes.len()),
        Err(error) => eprintln!("Failed to encode wind source: {error}"),
    }

    println!("\n=== Validation ===");
    let delta_field = DeltaField::build(&sim, &source);
    let Some(plot) = delta_field.box_plot() else {
        println!("Every cell is solid, nothing to validate");
        return;
    };

    println!("Cells compared:   {}", plot.count);
    println!("Min:              {:.4}", plot.min);
    println!("Lower whisker:    {:.4}", plot.lower_whisker);
    println!("Q1:               {:.4}", plot.q1);
    println!("Median:           {:.4}", plot.median);
    println!("Q3:               {:.4}", plot.q3);
    println!("Upper whisker:    {:.4}", plot.upper_whisker);
    println!("Max:              {:.4}", plot.max);
    println!("Outliers:         {}", plot.outliers);
    println!("Mean error:       {:.4} m/s", delta_field.error());
}
