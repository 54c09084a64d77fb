use std::path::{Path, PathBuf};

use anyhow::Result;
use canvas_arcade_shared::ropeswing::RopeSwingGame;
use canvas_arcade_shared::{Direction, FrameClock, RopeSwingSettings};
use ggez::event::{self, EventHandler};
use ggez::input::keyboard::{KeyCode, KeyInput};
use ggez::input::mouse::MouseButton;
use ggez::winit::keyboard::PhysicalKey;
use ggez::{Context, ContextBuilder, GameError, GameResult};
use tracing::info;

mod rendering;

use rendering::Renderer;

const DEFAULT_SETTINGS: &str = "settings/ropeswing.json";

struct MainState {
    game: RopeSwingGame,
    clock: FrameClock,
    renderer: Renderer,
}

impl MainState {
    fn new(game: RopeSwingGame) -> Self {
        Self {
            clock: FrameClock::new(game.settings().fixed_step),
            game,
            renderer: Renderer::new(),
        }
    }
}

/// Settings from the first CLI argument, the default file, or built-in defaults.
fn prepare() -> Result<RopeSwingGame> {
    let explicit = std::env::args().nth(1).map(PathBuf::from);
    let settings: RopeSwingSettings =
        canvas_arcade_shared::resolve(explicit.as_deref(), Path::new(DEFAULT_SETTINGS))?;
    info!(
        "Rope swing world {}x{}, {} ropes",
        settings.world_width,
        settings.world_height,
        settings.ropes.len()
    );
    Ok(RopeSwingGame::new(settings, rand::random())?)
}

fn steering_key(key: KeyCode) -> Option<Direction> {
    match key {
        KeyCode::ArrowLeft | KeyCode::KeyA => Some(Direction::Left),
        KeyCode::ArrowRight | KeyCode::KeyD => Some(Direction::Right),
        _ => None,
    }
}

impl EventHandler for MainState {
    fn update(&mut self, ctx: &mut Context) -> GameResult {
        let dt = self.clock.tick(ctx.time.delta());
        self.game.update(dt);
        Ok(())
    }

    fn draw(&mut self, ctx: &mut Context) -> GameResult {
        self.renderer.draw(ctx, &self.game)
    }

    fn mouse_button_down_event(
        &mut self,
        _ctx: &mut Context,
        button: MouseButton,
        _x: f32,
        _y: f32,
    ) -> Result<(), GameError> {
        if button == MouseButton::Left {
            self.game.pointer_down();
        }
        Ok(())
    }

    fn mouse_button_up_event(
        &mut self,
        _ctx: &mut Context,
        button: MouseButton,
        _x: f32,
        _y: f32,
    ) -> Result<(), GameError> {
        if button == MouseButton::Left {
            self.game.pointer_up();
        }
        Ok(())
    }

    fn key_down_event(
        &mut self,
        ctx: &mut Context,
        input: KeyInput,
        repeat: bool,
    ) -> Result<(), GameError> {
        let Some(keycode) = (match input.event.physical_key {
            PhysicalKey::Code(code) => Some(code),
            PhysicalKey::Unidentified(_) => None,
        }) else {
            return Ok(());
        };
        if let Some(dir) = steering_key(keycode) {
            self.game.key_down(dir);
            return Ok(());
        }
        match keycode {
            KeyCode::Space if !repeat => self.game.pointer_down(),
            KeyCode::KeyR => self.game.reset_player(),
            KeyCode::Escape => ctx.request_quit(),
            _ => {}
        }
        Ok(())
    }

    fn key_up_event(&mut self, _ctx: &mut Context, input: KeyInput) -> Result<(), GameError> {
        let Some(keycode) = (match input.event.physical_key {
            PhysicalKey::Code(code) => Some(code),
            PhysicalKey::Unidentified(_) => None,
        }) else {
            return Ok(());
        };
        if let Some(dir) = steering_key(keycode) {
            self.game.key_up(dir);
        } else if keycode == KeyCode::Space {
            self.game.pointer_up();
        }
        Ok(())
    }
}

pub fn main() -> GameResult {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let game = prepare().map_err(|e| GameError::CustomError(format!("{e:#}")))?;
    let settings = game.settings();
    let (ctx, event_loop) = ContextBuilder::new("dune_swing", "canvas-arcade")
        .window_setup(ggez::conf::WindowSetup::default().title("Dune Swing"))
        .window_mode(
            ggez::conf::WindowMode::default().dimensions(settings.view_width, settings.view_height),
        )
        .build()?;

    event::run(ctx, event_loop, MainState::new(game))
}
