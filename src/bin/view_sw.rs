//! Interactive first-person maze viewer.
//!
//! ```bash
//! cargo run --release --bin view_sw -- --width 16 --height 16 --rooms 3
//! ```
//!
//! Arrows or WASD walk and turn, Space toggles auto-solve, N builds a new
//! maze, Escape quits.

use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use amaze_rs::{
    engine::{Engine, Screen},
    generator::{Algorithm, BuildEvent, BuildHandle, GenerationRequest, Maze},
    renderer::{Rgba, Software},
    sim::Walker,
};

const W: usize = 400;
const H: usize = 400;
/// Frames between two auto-solve steps.
const SOLVE_EVERY: u32 = 6;

#[derive(Parser, Debug)]
#[command(about = "Walk through a generated maze")]
struct Args {
    #[arg(long, default_value_t = 12)]
    width: i32,

    #[arg(long, default_value_t = 12)]
    height: i32,

    #[arg(long, default_value_t = 2)]
    rooms: u32,

    #[arg(long, value_enum, default_value_t = Algorithm::Backtrack)]
    algorithm: Algorithm,

    /// Seed of the first maze; later mazes draw fresh seeds.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut req = GenerationRequest {
        width: args.width,
        height: args.height,
        rooms: args.rooms,
        algorithm: args.algorithm,
        seed: args.seed,
        ..GenerationRequest::default()
    };

    let mut win = Window::new(
        "amaze",
        W,
        H,
        WindowOptions {
            scale: Scale::X2,
            ..WindowOptions::default()
        },
    )?;
    win.set_target_fps(35);

    let mut pending = Some(BuildHandle::spawn(req.clone()).context("spawning generation worker")?);
    let mut progress = 0u8;
    let mut engine: Option<Engine<Software>> = None;
    let mut walker = Walker::new(0, 0);
    let mut solving = false;
    let mut frame_no = 0u32;
    let mut splash = vec![0 as Rgba; W * H];
    let screen = Screen::new(W as i32, H as i32);

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        /* --------------- pick up worker results --------------------------- */
        while let Some(ev) = pending.as_ref().and_then(BuildHandle::try_event) {
            match ev {
                BuildEvent::Progress(pct) => progress = pct,
                BuildEvent::Done(maze) => {
                    walker = Walker::new(maze.start.0, maze.start.1);
                    solving = false;
                    win.set_title(&title(&maze));
                    engine = Some(match engine.take() {
                        Some(mut e) => {
                            e.set_maze(maze);
                            e
                        }
                        None => Engine::new(Software::default(), maze, screen),
                    });
                    pending = None;
                }
                BuildEvent::Failed(e) => {
                    warn!("generation failed: {e}");
                    pending = None;
                }
            }
        }

        if win.is_key_pressed(Key::N, KeyRepeat::No) {
            // dropping the old handle cancels it
            req.seed = None;
            pending = Some(BuildHandle::spawn(req.clone())?);
            progress = 0;
        }

        /* --------------- still generating: progress bar ------------------- */
        let Some(engine) = engine.as_mut().filter(|_| pending.is_none()) else {
            draw_progress(&mut splash, progress);
            win.update_with_buffer(&splash, W, H)?;
            continue;
        };
        let maze = Arc::clone(engine.maze());
        let grid = &maze.grid;

        /* --------------- input -------------------------------------------- */
        if !walker.is_moving() && !walker.is_finished() {
            let fwd = win.is_key_down(Key::Up) || win.is_key_down(Key::W);
            let back = win.is_key_down(Key::Down) || win.is_key_down(Key::S);
            if fwd || back {
                // bumping into a wall is not worth a log line
                let _ = walker.start_walk(grid, if fwd { 1 } else { -1 });
            } else if win.is_key_down(Key::Left) || win.is_key_down(Key::A) {
                walker.start_rotate(grid, 1);
            } else if win.is_key_down(Key::Right) || win.is_key_down(Key::D) {
                walker.start_rotate(grid, -1);
            }
        }
        if win.is_key_pressed(Key::Space, KeyRepeat::No) {
            solving = !solving;
            info!("auto-solve {}", if solving { "on" } else { "off" });
        }

        frame_no = frame_no.wrapping_add(1);
        if solving && !walker.is_moving() && frame_no % SOLVE_EVERY == 0 {
            if let Err(e) = walker.solve_step(grid, &maze.dists) {
                warn!("auto-solve stopped: {e}");
                solving = false;
            }
        }

        walker.tick(grid);
        if walker.is_finished() && solving {
            solving = false;
            win.set_title("amaze: escaped! N for a new maze");
        }

        /* --------------- draw --------------------------------------------- */
        let t0 = Instant::now();
        let mut shown = Ok(());
        engine.render_frame(&walker.camera(), |fb, w, h| {
            acc_time += t0.elapsed();
            acc_frames += 1;
            shown = win.update_with_buffer(fb, w, h);
        });
        shown?;

        // ─────────── report every ~3 s ────────────────────
        if last_print.elapsed() >= Duration::from_secs(3) && acc_frames > 0 {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            println!(
                "avg render: {:.2} ms  ({:.1} FPS), {} walls seen",
                avg_ms,
                1000.0 / avg_ms,
                engine.explored().seen_seg_count()
            );
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}

fn title(maze: &Maze) -> String {
    format!(
        "amaze: {}x{}, {} steps to the exit",
        maze.width(),
        maze.height(),
        maze.dists.get(maze.start.0, maze.start.1)
    )
}

/// Horizontal bar across the middle of the window.
fn draw_progress(fb: &mut [Rgba], pct: u8) {
    fb.fill(0);
    let filled = W * pct as usize / 100;
    for y in H / 2 - 4..H / 2 + 4 {
        let row = &mut fb[y * W..(y + 1) * W];
        row[..filled].fill(0x00_30_A0_30);
        row[filled..].fill(0x00_20_20_20);
    }
}
