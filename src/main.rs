//! Headless maze generator.
//!
//! ```bash
//! cargo run --release -- --width 20 --height 15 --rooms 3 --ascii --render
//! RUST_LOG=debug cargo run -- --algorithm prim --seed 7 --solve
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::info;

use amaze_rs::{
    engine::{Engine, Screen, painted_spans},
    generator::{Algorithm, BuildEvent, BuildHandle, GenerationRequest, Maze},
    renderer::{
        Software,
        software::{CEILING, FLOOR},
    },
    sim::{BasicRobot, Walker},
};

#[derive(Parser, Debug)]
#[command(version, about = "Generate a maze and inspect it from the command line")]
struct Args {
    /// Maze width in cells.
    #[arg(long, default_value_t = 12)]
    width: i32,

    /// Maze height in cells.
    #[arg(long, default_value_t = 12)]
    height: i32,

    /// Rooms to place before carving.
    #[arg(long, default_value_t = 2)]
    rooms: u32,

    #[arg(long, value_enum, default_value_t = Algorithm::Backtrack)]
    algorithm: Algorithm,

    /// Fixed seed for a reproducible maze.
    #[arg(long)]
    seed: Option<u64>,

    /// Expected partition iterations, only used to scale progress.
    #[arg(long, default_value_t = 600)]
    partition_iterations: u32,

    /// Print the grid as ASCII art.
    #[arg(long)]
    ascii: bool,

    /// Render one first-person frame from the start cell and report coverage.
    #[arg(long)]
    render: bool,

    /// Heading for `--render`, in degrees.
    #[arg(long, default_value_t = 0)]
    angle: i32,

    /// Let a robot follow the solution and report its battery.
    #[arg(long)]
    solve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // ─────────── parse CLI ────────────
    let args = Args::parse();
    let req = GenerationRequest {
        width: args.width,
        height: args.height,
        rooms: args.rooms,
        algorithm: args.algorithm,
        expected_partition_iterations: args.partition_iterations,
        seed: args.seed,
    };

    // ─────────── generate on the worker ───────
    let maze = generate(req)?;
    println!(
        "{}x{} maze, {} rooms, start {:?}, exit {:?} ({:?}), solution {} steps",
        maze.width(),
        maze.height(),
        maze.rooms.len(),
        maze.start,
        maze.exit,
        maze.exit_dir,
        maze.dists.get(maze.start.0, maze.start.1),
    );
    println!(
        "{} walls, {} segments after splitting, {} BSP nodes, depth {}",
        maze.segments.len(),
        maze.bsp.segs().len(),
        maze.bsp.node_count(),
        maze.bsp.depth()
    );

    if args.ascii {
        print!("{}", maze.grid);
    }

    // ─────────── one frame ────────────
    if args.render {
        render_once(&maze, args.angle);
    }

    // ─────────── robot run ────────────
    if args.solve {
        let mut robot = BasicRobot::new(&maze);
        let mut steps = 0;
        while !robot.walker().is_finished() {
            robot
                .solve_step()
                .with_context(|| format!("robot stuck at {:?}", robot.position()))?;
            steps += 1;
        }
        println!("robot escaped in {steps} steps, battery left {}", robot.battery());
    }

    Ok(())
}

/// Run the build on the worker thread, printing progress as it comes.
fn generate(req: GenerationRequest) -> anyhow::Result<Arc<Maze>> {
    let handle = BuildHandle::spawn(req).context("spawning generation worker")?;
    let mut last = 0;
    loop {
        match handle.recv() {
            Some(BuildEvent::Progress(pct)) => {
                if pct >= last + 10 {
                    info!("generating: {pct}%");
                    last = pct;
                }
            }
            Some(BuildEvent::Done(maze)) => return Ok(maze),
            Some(BuildEvent::Failed(e)) => return Err(e).context("generation failed"),
            // channel closed without a maze; `wait` says why
            None => return handle.wait().context("generation failed"),
        }
    }
}

fn render_once(maze: &Arc<Maze>, angle: i32) {
    let mut walker = Walker::new(maze.start.0, maze.start.1);
    let quarter_turns = angle.rem_euclid(360) / 90;
    walker.rotate(&maze.grid, quarter_turns);

    let screen = Screen::default();
    let mut engine = Engine::new(Software::default(), Arc::clone(maze), screen);
    let cam = walker.camera();
    let mut walls = 0;
    let stats = engine.render_frame(&cam, |fb, _, _| {
        walls = fb.iter().filter(|&&p| p != CEILING && p != FLOOR).count();
    });

    let covered: i32 = painted_spans(engine.last_quads()).iter().map(|(a, b)| b - a + 1).sum();
    println!(
        "frame at {:?} facing {}: {} quads, {}/{} columns, {} wall pixels, {} nodes, {} leaves",
        walker.position(),
        walker.angle(),
        stats.quads,
        covered,
        screen.w,
        walls,
        stats.nodes,
        stats.leaves
    );
}
