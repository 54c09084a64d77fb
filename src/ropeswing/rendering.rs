use canvas_arcade_shared::ropeswing::{RopeSwingGame, Scenery};
use ggez::{
    Context, GameResult,
    glam::Vec2,
    graphics::{self, Color, DrawMode, MeshBuilder, Text},
};

const SKY: Color = Color::new(0.53, 0.81, 0.98, 1.0);
const SAND: Color = Color::new(0.93, 0.79, 0.49, 1.0);
const SEA: Color = Color::new(0.11, 0.42, 0.75, 1.0);
const ROPE: Color = Color::new(0.55, 0.35, 0.17, 1.0);

/// World to screen: shift by the camera.
struct View {
    camera_x: f32,
    width: f32,
}

impl View {
    fn pt(&self, v: glam::Vec2) -> Vec2 {
        Vec2::new(v.x - self.camera_x, v.y)
    }

    fn visible(&self, x: f32, margin: f32) -> bool {
        x + margin >= self.camera_x && x - margin <= self.camera_x + self.width
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn draw(&self, ctx: &mut Context, game: &RopeSwingGame) -> GameResult {
        let settings = game.settings();
        let view = View {
            camera_x: game.camera_x(),
            width: settings.view_width,
        };
        let mut canvas = graphics::Canvas::from_frame(ctx, SKY);
        let mut mb = MeshBuilder::new();

        self.build_scenery(&mut mb, &view, game.scenery(), settings.view_height)?;
        self.build_sea(
            &mut mb,
            &view,
            game.scenery().wave_phase,
            settings.sea_level,
            settings.view_height,
        )?;
        self.build_dune(&mut mb, &view, game, settings.view_height)?;

        // Finish line and podium.
        let finish = settings.finish_x - view.camera_x;
        mb.line(
            &[
                Vec2::new(finish, 0.0),
                Vec2::new(finish, settings.sea_level),
            ],
            4.0,
            Color::WHITE,
        )?;
        mb.rectangle(
            DrawMode::fill(),
            graphics::Rect::new(
                settings.podium_x - 40.0 - view.camera_x,
                settings.podium_y + 15.0,
                80.0,
                settings.sea_level - settings.podium_y - 15.0,
            ),
            Color::from_rgb(212, 175, 55),
        )?;

        for rope in game.ropes() {
            if !view.visible(rope.anchor().x, rope.total_length()) {
                continue;
            }
            let mut line = vec![view.pt(rope.anchor())];
            line.extend(rope.segments().iter().map(|s| view.pt(s.pos)));
            mb.line(&line, 3.0, ROPE)?;
            mb.circle(
                DrawMode::fill(),
                view.pt(rope.anchor()),
                5.0,
                0.5,
                Color::from_rgb(80, 80, 80),
            )?;
        }

        let player = game.player();
        let radius = player.radius * player.scale();
        if radius > 0.5 {
            mb.circle(
                DrawMode::fill(),
                view.pt(player.pos),
                radius,
                0.5,
                Color::new(0.91, 0.3, 0.24, player.opacity()),
            )?;
        }

        for particle in game.explosion().iter() {
            mb.circle(
                DrawMode::fill(),
                view.pt(particle.pos),
                3.0,
                0.5,
                Color::new(1.0, 0.8, 0.2, particle.fade()),
            )?;
        }

        let mesh = graphics::Mesh::from_data(&ctx.gfx, mb.build());
        canvas.draw(&mesh, graphics::DrawParam::default());

        let hud = Text::new(format!(
            "Attempt {}   Wins {}\nHold mouse or Space near a rope to grab, release to let go",
            game.attempts(),
            game.victories()
        ));
        canvas.draw(
            &hud,
            graphics::DrawParam::default()
                .dest(Vec2::new(12.0, 12.0))
                .color(Color::BLACK),
        );
        if game.is_celebrating() {
            let mut text = Text::new("You made it!");
            text.set_scale(36.0);
            canvas.draw(
                &text,
                graphics::DrawParam::default()
                    .dest(Vec2::new(settings.view_width / 2.0 - 110.0, 120.0))
                    .color(Color::WHITE),
            );
        }

        canvas.finish(ctx)
    }

    fn build_scenery(
        &self,
        mb: &mut MeshBuilder,
        view: &View,
        scenery: &Scenery,
        height: f32,
    ) -> GameResult {
        mb.circle(
            DrawMode::fill(),
            Vec2::new(scenery.sun.x, scenery.sun.y),
            40.0,
            0.5,
            Color::from_rgb(255, 221, 87),
        )?;

        for cloud in &scenery.clouds {
            if !view.visible(cloud.pos.x, 80.0) {
                continue;
            }
            let centre = view.pt(cloud.pos);
            for (dx, r) in [(-25.0, 18.0), (0.0, 26.0), (25.0, 18.0)] {
                mb.circle(
                    DrawMode::fill(),
                    centre + Vec2::new(dx * cloud.scale, 0.0),
                    r * cloud.scale,
                    0.5,
                    Color::new(1.0, 1.0, 1.0, 0.9),
                )?;
            }
        }

        for bird in &scenery.birds {
            if !view.visible(bird.pos.x, 20.0) || bird.pos.y > height {
                continue;
            }
            let centre = view.pt(bird.pos);
            let wing = 4.0 * bird.flap.sin();
            mb.line(
                &[
                    centre + Vec2::new(-8.0, -wing),
                    centre,
                    centre + Vec2::new(8.0, -wing),
                ],
                2.0,
                Color::from_rgb(40, 40, 40),
            )?;
        }
        Ok(())
    }

    fn build_sea(
        &self,
        mb: &mut MeshBuilder,
        view: &View,
        phase: f32,
        sea_level: f32,
        height: f32,
    ) -> GameResult {
        mb.rectangle(
            DrawMode::fill(),
            graphics::Rect::new(0.0, sea_level, view.width, height - sea_level),
            SEA,
        )?;
        let waves: Vec<Vec2> = (0..=(view.width as usize / 20))
            .map(|i| {
                let x = i as f32 * 20.0;
                let world_x = x + view.camera_x;
                Vec2::new(x, sea_level + (world_x * 0.02 + phase).sin() * 4.0)
            })
            .collect();
        mb.line(&waves, 3.0, Color::new(1.0, 1.0, 1.0, 0.6))?;
        Ok(())
    }

    fn build_dune(
        &self,
        mb: &mut MeshBuilder,
        view: &View,
        game: &RopeSwingGame,
        height: f32,
    ) -> GameResult {
        let dune = game.dune();
        let (start, finish) = dune.span();
        if finish < view.camera_x || start > view.camera_x + view.width {
            return Ok(());
        }

        let mut outline: Vec<Vec2> = dune.points().iter().map(|p| view.pt(*p)).collect();
        outline.push(Vec2::new(finish - view.camera_x, height));
        outline.push(Vec2::new(start - view.camera_x, height));
        mb.polygon(DrawMode::fill(), &outline, SAND)?;

        let pipe = dune.pipe();
        for mouth in [pipe.entry, pipe.exit] {
            mb.circle(
                DrawMode::fill(),
                view.pt(mouth),
                pipe.radius,
                0.5,
                Color::from_rgb(60, 60, 60),
            )?;
        }
        Ok(())
    }
}
