use std::sync::Arc;

use log::debug;

use crate::{
    engine::{
        explored::Explored,
        pipeline::build_quads,
        types::{FrameStats, Screen},
    },
    generator::Maze,
    renderer::{PaintQuad, Renderer, RendererExt, Rgba},
    world::Camera,
};

/// Owns the per-maze view state and drives a [`Renderer`] once per frame.
pub struct Engine<R: Renderer> {
    pub renderer: R,
    pub screen: Screen,
    maze: Arc<Maze>,
    explored: Explored,
    quads: Vec<PaintQuad>,
}

impl<R: Renderer> Engine<R> {
    pub fn new(renderer: R, maze: Arc<Maze>, screen: Screen) -> Self {
        let explored = Explored::new(maze.width(), maze.height(), maze.bsp.segs().len());
        Self {
            renderer,
            screen,
            maze,
            explored,
            quads: Vec::new(),
        }
    }

    /// Swap in a freshly generated maze; the seen overlay starts over.
    pub fn set_maze(&mut self, maze: Arc<Maze>) {
        debug!("engine: new {}x{} maze", maze.width(), maze.height());
        self.explored = Explored::new(maze.width(), maze.height(), maze.bsp.segs().len());
        self.maze = maze;
    }

    pub fn maze(&self) -> &Arc<Maze> {
        &self.maze
    }

    pub fn explored(&self) -> &Explored {
        &self.explored
    }

    /// Compute the visible quads for `cam` without touching the renderer.
    pub fn visible_quads(&mut self, cam: &Camera) -> (&[PaintQuad], FrameStats) {
        let stats = build_quads(
            &self.maze.bsp,
            cam,
            &self.screen,
            &mut self.explored,
            &mut self.quads,
        );
        (&self.quads, stats)
    }

    pub fn render_frame(&mut self, cam: &Camera, submit: impl FnOnce(&[Rgba], usize, usize)) -> FrameStats {
        let stats = build_quads(
            &self.maze.bsp,
            cam,
            &self.screen,
            &mut self.explored,
            &mut self.quads,
        );

        self.renderer
            .draw_frame(self.screen.w as usize, self.screen.h as usize, &self.quads, submit);
        stats
    }

    /// Quads of the most recent frame or [`Engine::visible_quads`] call.
    pub fn last_quads(&self) -> &[PaintQuad] {
        &self.quads
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
