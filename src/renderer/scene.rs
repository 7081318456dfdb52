//! Frame composition
//!
//! Draws one frame from the current game state. Reads state only; the
//! simulation is never affected by what is drawn.

use glam::Vec2;

use super::surface::{Color, ColorStop, Fill, Surface};
use crate::assets::AssetBundle;
use crate::consts::PROJECTILE_LENGTH;
use crate::sim::{GameState, Rect};

const SPACE_COLOR: Color = [0.016, 0.118, 0.184, 1.0];
const SHIP_FALLBACK_COLOR: Color = [0.302, 0.878, 1.0, 1.0];
const ASTEROID_FALLBACK_COLOR: Color = [1.0, 0.42, 0.42, 1.0];
const PROJECTILE_COLOR: Color = [1.0, 0.82, 0.4, 1.0];

/// Per-frame values that are not part of the simulation
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameContext {
    /// Host clock in milliseconds, drives purely visual animation
    pub wall_ms: f64,
    /// Fire intent currently held
    pub firing: bool,
    /// A shot left the cannons recently; shows the firing pose
    pub fire_flash: bool,
    /// Hold animated overlays steady
    pub reduced_motion: bool,
}

impl FrameContext {
    fn anim_ms(&self) -> f64 {
        if self.reduced_motion { 0.0 } else { self.wall_ms }
    }
}

/// Scale `image` to cover `target` completely, centered
pub fn cover_fit(image: Vec2, target: Vec2) -> Rect {
    if image.x <= 0.0 || image.y <= 0.0 {
        return Rect::new(Vec2::ZERO, target);
    }
    let scale = (target.x / image.x).max(target.y / image.y);
    let size = image * scale;
    Rect::new((target - size) * 0.5, size)
}

pub fn render<S: Surface>(
    surface: &mut S,
    state: &GameState,
    assets: &AssetBundle<S::Image>,
    frame: &FrameContext,
) {
    surface.clear();
    draw_background(surface, state, assets);
    draw_overlay(surface, frame);
    draw_projectiles(surface, state);
    draw_asteroids(surface, state, assets);
    draw_thruster(surface, state, frame);
    draw_ship(surface, state, assets, frame);
}

fn draw_background<S: Surface>(surface: &mut S, state: &GameState, assets: &AssetBundle<S::Image>) {
    let target = surface.size();
    let preferred = if state.playfield.is_portrait() {
        assets.background_mobile.as_ref()
    } else {
        assets.background_desktop.as_ref()
    };

    let chosen = preferred
        .and_then(|img| surface.image_size(img).map(|size| (img, size)))
        .or_else(|| {
            surface
                .image_size(&assets.background_fallback)
                .map(|size| (&assets.background_fallback, size))
        });

    match chosen {
        Some((image, size)) => surface.draw_image(image, cover_fit(size, target)),
        None => surface.fill_rect(Rect::new(Vec2::ZERO, target), &Fill::Solid(SPACE_COLOR)),
    }
}

/// Slowly breathing vertical shade for depth
fn draw_overlay<S: Surface>(surface: &mut S, frame: &FrameContext) {
    let size = surface.size();
    let t = frame.anim_ms();
    let top = 0.32 + 0.08 * (t * 0.0006).sin() as f32;
    let bottom = 0.5 + 0.06 * (t * 0.00045 + 1.3).sin() as f32;
    let stops = [
        ColorStop {
            offset: 0.0,
            color: [0.0, 0.02, 0.08, top],
        },
        ColorStop {
            offset: 0.55,
            color: [0.0, 0.0, 0.0, 0.05],
        },
        ColorStop {
            offset: 1.0,
            color: [0.0, 0.03, 0.1, bottom],
        },
    ];
    surface.fill_rect(
        Rect::new(Vec2::ZERO, size),
        &Fill::Linear {
            from: Vec2::ZERO,
            to: Vec2::new(0.0, size.y),
            stops: &stops,
        },
    );
}

fn draw_projectiles<S: Surface>(surface: &mut S, state: &GameState) {
    for projectile in &state.projectiles {
        let tail = projectile.pos + Vec2::new(0.0, PROJECTILE_LENGTH);
        surface.glow_line(projectile.pos, tail, 3.0, PROJECTILE_COLOR, 8.0);
    }
}

fn draw_asteroids<S: Surface>(surface: &mut S, state: &GameState, assets: &AssetBundle<S::Image>) {
    for asteroid in &state.asteroids {
        let r = asteroid.radius;
        match assets.asteroid_sprite(asteroid.sprite) {
            Some(sprite) => {
                surface.save();
                surface.translate(asteroid.pos);
                surface.rotate(asteroid.rotation);
                surface.draw_image(sprite, Rect::new(Vec2::splat(-r), Vec2::splat(r * 2.0)));
                surface.restore();
            }
            None => surface.fill_ellipse(
                asteroid.pos,
                Vec2::splat(r),
                &Fill::Solid(ASTEROID_FALLBACK_COLOR),
            ),
        }
    }
}

/// Engine glow under the ship, pulsing with wall-clock time
fn draw_thruster<S: Surface>(surface: &mut S, state: &GameState, frame: &FrameContext) {
    let ship = &state.ship;
    let pulse = 0.5 + 0.5 * (frame.anim_ms() * 0.018).sin() as f32;
    let boost = if frame.firing { 0.3 } else { 0.0 };
    let alpha = (0.35 + 0.25 * pulse + boost).min(1.0);

    let center = Vec2::new(ship.center_x(), ship.pos.y + ship.size.y - 4.0);
    let radii = Vec2::new(ship.size.x * 0.18, 10.0 + 4.0 * pulse + boost * 10.0);
    let stops = [
        ColorStop {
            offset: 0.0,
            color: [0.65, 0.92, 1.0, alpha],
        },
        ColorStop {
            offset: 1.0,
            color: [0.2, 0.45, 1.0, 0.0],
        },
    ];
    surface.fill_ellipse(
        center,
        radii,
        &Fill::Linear {
            from: center - Vec2::new(0.0, radii.y),
            to: center + Vec2::new(0.0, radii.y),
            stops: &stops,
        },
    );
}

fn draw_ship<S: Surface>(
    surface: &mut S,
    state: &GameState,
    assets: &AssetBundle<S::Image>,
    frame: &FrameContext,
) {
    let sprite = if frame.fire_flash {
        &assets.ship_fire
    } else {
        &assets.ship_idle
    };
    let bounds = state.ship.bounds();
    if surface.image_size(sprite).is_some() {
        surface.draw_image(sprite, bounds);
    } else {
        surface.fill_rect(bounds, &Fill::Solid(SHIP_FALLBACK_COLOR));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetManifest;
    use crate::input::ControlIntent;
    use crate::renderer::headless::{DrawCommand, HeadlessImage, HeadlessSurface};
    use crate::sim::{Playfield, tick};
    use crate::tuning::{Difficulty, DifficultyTable};

    fn setup(width: f32, height: f32) -> (HeadlessSurface, GameState, AssetBundle<HeadlessImage>) {
        let profile = DifficultyTable::default().profile(Difficulty::Normal);
        let state = GameState::new(Playfield::new(width, height), profile, 3).with_sprite_count(10);
        (
            HeadlessSurface::new(width, height),
            state,
            AssetBundle::headless(&AssetManifest::default()),
        )
    }

    #[test]
    fn test_cover_fit_fills_target() {
        let rect = cover_fit(Vec2::new(1920.0, 1080.0), Vec2::new(390.0, 640.0));
        assert!(rect.min.x <= 0.0 && rect.max.x >= 390.0);
        assert!((rect.min.y - 0.0).abs() < 1e-3 && (rect.max.y - 640.0).abs() < 1e-3);
        assert!((rect.center() - Vec2::new(195.0, 320.0)).length() < 1e-3);
    }

    #[test]
    fn test_background_picks_by_aspect() {
        let (mut surface, state, assets) = setup(390.0, 640.0);
        render(&mut surface, &state, &assets, &FrameContext::default());
        assert_eq!(surface.images_drawn()[0], "background_mobile_9x16_1080x1920.png");

        let (mut surface, state, assets) = setup(960.0, 540.0);
        render(&mut surface, &state, &assets, &FrameContext::default());
        assert_eq!(surface.images_drawn()[0], "background_desktop_16x9_1920x1080.png");
    }

    #[test]
    fn test_background_falls_back() {
        let (mut surface, state, mut assets) = setup(390.0, 640.0);
        assets.background_mobile = Some(HeadlessImage::broken("mobile"));
        render(&mut surface, &state, &assets, &FrameContext::default());
        assert_eq!(surface.images_drawn()[0], "background_full.png");

        assets.background_mobile = None;
        assets.background_fallback = HeadlessImage::broken("fallback");
        render(&mut surface, &state, &assets, &FrameContext::default());
        assert!(matches!(
            surface.last_frame()[1],
            DrawCommand::FillRect { gradient: false, .. }
        ));
    }

    #[test]
    fn test_asteroid_drawn_rotated_about_center() {
        let (mut surface, mut state, assets) = setup(390.0, 640.0);
        state.spawn_asteroid_at(Vec2::new(100.0, 120.0), 20.0, 0.0);
        state.asteroids.iter_mut().for_each(|a| a.rotation = 0.7);
        render(&mut surface, &state, &assets, &FrameContext::default());

        let frame = surface.last_frame();
        let at = frame
            .iter()
            .position(|c| *c == DrawCommand::Translate(Vec2::new(100.0, 120.0)))
            .unwrap();
        assert_eq!(frame[at - 1], DrawCommand::Save);
        assert_eq!(frame[at + 1], DrawCommand::Rotate(0.7));
        assert_eq!(
            frame[at + 2],
            DrawCommand::Image {
                name: "asteroid_01.png".to_string(),
                dest: Rect::new(Vec2::splat(-20.0), Vec2::splat(40.0)),
            }
        );
        assert_eq!(frame[at + 3], DrawCommand::Restore);
    }

    #[test]
    fn test_ship_pose_follows_fire_flash() {
        let (mut surface, mut state, assets) = setup(390.0, 640.0);
        state.last_spawn_ms = Some(0.0);
        render(&mut surface, &state, &assets, &FrameContext::default());
        assert_eq!(*surface.images_drawn().last().unwrap(), "ship_idle.png");

        tick(&mut state, &ControlIntent::new(0.0, true), 16.0);
        let flash = FrameContext {
            fire_flash: true,
            ..FrameContext::default()
        };
        render(&mut surface, &state, &assets, &flash);
        assert_eq!(*surface.images_drawn().last().unwrap(), "ship_fire.png");
        assert_eq!(
            surface
                .last_frame()
                .iter()
                .filter(|c| matches!(c, DrawCommand::GlowLine { .. }))
                .count(),
            2
        );

        tick(&mut state, &ControlIntent::default(), 16.0);
        render(&mut surface, &state, &assets, &FrameContext::default());
        assert_eq!(*surface.images_drawn().last().unwrap(), "ship_idle.png");
    }

    #[test]
    fn test_thruster_brightens_while_firing() {
        let (mut surface, state, assets) = setup(390.0, 640.0);
        let thruster_alpha = |surface: &HeadlessSurface| {
            surface
                .last_frame()
                .iter()
                .find_map(|c| match c {
                    DrawCommand::FillEllipse { alpha, .. } => Some(*alpha),
                    _ => None,
                })
                .unwrap()
        };
        let idle = FrameContext {
            wall_ms: 1234.0,
            firing: false,
            fire_flash: false,
            reduced_motion: false,
        };
        render(&mut surface, &state, &assets, &idle);
        let idle_alpha = thruster_alpha(&surface);
        render(&mut surface, &state, &assets, &FrameContext { firing: true, ..idle });
        assert!(thruster_alpha(&surface) > idle_alpha);
    }

    #[test]
    fn test_reduced_motion_is_steady() {
        let (mut surface, state, assets) = setup(390.0, 640.0);
        let steady = |wall_ms| FrameContext {
            wall_ms,
            firing: false,
            fire_flash: false,
            reduced_motion: true,
        };
        render(&mut surface, &state, &assets, &steady(100.0));
        let a = surface.last_frame().to_vec();
        render(&mut surface, &state, &assets, &steady(5_000.0));
        assert_eq!(surface.last_frame(), a.as_slice());
    }
}
