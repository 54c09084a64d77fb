use canvas_arcade_shared::platformer::{BalanceMinigame, Climber, Phase, PlatformerGame};
use ggez::{
    Context, GameResult,
    glam::Vec2,
    graphics::{self, Color, DrawMode, MeshBuilder, Text},
};

const SKY: Color = Color::new(0.53, 0.81, 0.92, 1.0);

fn pt(v: glam::Vec2) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Corners of a `size` box centred on `centre`, rotated by `angle`.
fn rotated_box(centre: Vec2, size: Vec2, angle: f32) -> [Vec2; 4] {
    let half = size / 2.0;
    let rot = Vec2::from_angle(angle);
    [
        Vec2::new(-half.x, -half.y),
        Vec2::new(half.x, -half.y),
        Vec2::new(half.x, half.y),
        Vec2::new(-half.x, half.y),
    ]
    .map(|corner| centre + rot.rotate(corner))
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn draw(&self, ctx: &mut Context, game: &PlatformerGame) -> GameResult {
        let mut canvas = graphics::Canvas::from_frame(ctx, SKY);
        let mut mb = MeshBuilder::new();

        if let Some(minigame) = game.minigame() {
            self.build_minigame(&mut mb, minigame)?;
        } else {
            self.build_world(&mut mb, game)?;
        }

        let mesh = graphics::Mesh::from_data(&ctx.gfx, mb.build());
        canvas.draw(&mesh, graphics::DrawParam::default());

        let settings = game.settings();
        if let Some(minigame) = game.minigame() {
            let mut text = Text::new(format!(
                "Time: {:.1}s",
                minigame.time_left(&settings.minigame)
            ));
            text.set_scale(24.0);
            canvas.draw(
                &text,
                graphics::DrawParam::default()
                    .dest(Vec2::new(10.0, 10.0))
                    .color(Color::from_rgb(51, 51, 51)),
            );
        } else {
            let text = Text::new(format!("Score: {}", game.score()));
            canvas.draw(
                &text,
                graphics::DrawParam::default()
                    .dest(Vec2::new(10.0, 10.0))
                    .color(Color::BLACK),
            );
        }

        if game.is_game_over() {
            let mut text = Text::new(format!(
                "Game over! Score: {}\nPress R to restart",
                game.score()
            ));
            text.set_scale(26.0);
            canvas.draw(
                &text,
                graphics::DrawParam::default()
                    .dest(Vec2::new(60.0, settings.canvas_height / 2.0 - 30.0))
                    .color(Color::from_rgb(160, 20, 20)),
            );
        }

        canvas.finish(ctx)
    }

    fn build_world(&self, mb: &mut MeshBuilder, game: &PlatformerGame) -> GameResult {
        let settings = game.settings();
        for platform in game.platforms() {
            if platform.is_special {
                let centre = pt(platform.pos)
                    + Vec2::new(settings.platform_width, settings.platform_height) / 2.0;
                mb.circle(
                    DrawMode::fill(),
                    centre,
                    settings.platform_width / 1.5,
                    0.5,
                    Color::new(0.54, 0.17, 0.89, 0.35),
                )?;
                mb.circle(
                    DrawMode::fill(),
                    centre,
                    settings.platform_height,
                    0.5,
                    Color::BLACK,
                )?;
            } else {
                mb.rectangle(
                    DrawMode::fill(),
                    graphics::Rect::new(
                        platform.pos.x,
                        platform.pos.y,
                        settings.platform_width,
                        settings.platform_height,
                    ),
                    Color::from_rgb(76, 175, 80),
                )?;
            }
        }

        for particle in game.exhaust().iter() {
            mb.circle(
                DrawMode::fill(),
                pt(particle.pos),
                5.0,
                0.5,
                Color::new(1.0, 0.4, 0.0, particle.fade()),
            )?;
        }

        let climber = game.climber();
        if matches!(game.phase(), Phase::RocketBoost { .. }) {
            let base = pt(climber.exhaust_origin());
            mb.polygon(
                DrawMode::fill(),
                &[
                    base + Vec2::new(-5.0, 0.0),
                    base + Vec2::new(5.0, 0.0),
                    base + Vec2::new(0.0, 20.0),
                ],
                Color::from_rgb(255, 69, 0),
            )?;
        }
        self.build_climber(mb, climber, game.entering_progress())
    }

    fn build_climber(
        &self,
        mb: &mut MeshBuilder,
        climber: &Climber,
        entering: Option<f32>,
    ) -> GameResult {
        let centre = pt(climber.pos) + pt(climber.size) / 2.0;
        // Shrinks to 30% and spins twice on the way into a black hole.
        let (scale, angle) = match entering {
            Some(p) => (1.0 - p * 0.7, p * std::f32::consts::PI * 4.0),
            None => (1.0, 0.0),
        };
        let corners = rotated_box(centre, pt(climber.size) * scale, angle);
        mb.polygon(DrawMode::fill(), &corners, Color::from_rgb(255, 107, 107))?;
        Ok(())
    }

    fn build_minigame(&self, mb: &mut MeshBuilder, minigame: &BalanceMinigame) -> GameResult {
        let beam = minigame.beam();
        let rot = Vec2::from_angle(beam.angle);
        // The pivot sits on the beam's top edge.
        let centre = pt(beam.pivot) + rot.rotate(Vec2::new(0.0, beam.height / 2.0));
        let size = Vec2::new(beam.width, beam.height);
        mb.polygon(
            DrawMode::fill(),
            &rotated_box(centre + Vec2::new(5.0, 5.0), size, beam.angle),
            Color::new(0.0, 0.0, 0.0, 0.2),
        )?;
        mb.polygon(
            DrawMode::fill(),
            &rotated_box(centre, size, beam.angle),
            Color::from_rgb(255, 215, 0),
        )?;

        let ball = minigame.ball();
        mb.circle(
            DrawMode::fill(),
            pt(ball.pos) + Vec2::new(2.0, 2.0),
            ball.radius,
            0.5,
            Color::new(0.0, 0.0, 0.0, 0.2),
        )?;
        mb.circle(
            DrawMode::fill(),
            pt(ball.pos),
            ball.radius,
            0.5,
            Color::from_rgb(135, 206, 235),
        )?;
        Ok(())
    }
}
