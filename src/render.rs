use crate::creature::Creature;
use crate::population::{CreatureId, Population};
use crate::species::Species;
use crate::zoo::Canvas;
use bevy::prelude::*;
use bevy::sprite::AlphaMode2d;
use std::collections::{HashMap, HashSet};

/// Depth added per creature so later creatures draw on top
const DEPTH_STEP: f32 = 0.001;

/// How strongly a disappearing creature is pushed towards red
const DISTRESS_TINT: f32 = 0.5;

/// Links a drawn disc to the creature it shows
#[derive(Component)]
pub struct CreatureSprite {
    pub id: CreatureId,
}

/// What the renderer needs to know about a species
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeciesStyle {
    pub rgb: [f32; 3],
}

impl SpeciesStyle {
    pub fn of(species: Species) -> Self {
        let [r, g, b] = match species {
            Species::Dog => [0x8B, 0x45, 0x13],
            Species::Cat => [0x80, 0x80, 0x80],
            Species::Rabbit => [0xF5, 0xF5, 0xF5],
            Species::Bear => [0x65, 0x43, 0x21],
            Species::Panda => [0x00, 0x00, 0x00],
            Species::Pig => [0xFF, 0xB6, 0xC1],
            Species::Unicorn => [0xFF, 0x69, 0xB4],
            Species::Frog => [0x32, 0xCD, 0x32],
            Species::Penguin => [0x1A, 0x1A, 0x26],
            Species::Tiger => [0xFF, 0x8C, 0x00],
            Species::Fish => [0x00, 0xCE, 0xD1],
        };
        Self {
            rgb: [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0],
        }
    }

    /// Body colour with life as opacity, reddened while disappearing
    pub fn color_for(&self, creature: &Creature) -> Color {
        let life = creature.life.clamp(0.0, 1.0);
        let [mut r, mut g, mut b] = self.rgb;
        if creature.disappearing {
            let t = (1.0 - life) * DISTRESS_TINT;
            r += (1.0 - r) * t;
            g -= g * t;
            b -= b * t;
        }
        Color::srgba(r, g, b, life)
    }
}

/// Blended material so opacity keeps tracking life after a full-life spawn
pub fn creature_material(creature: &Creature) -> ColorMaterial {
    ColorMaterial {
        color: SpeciesStyle::of(creature.species).color_for(creature),
        alpha_mode: AlphaMode2d::Blend,
        ..default()
    }
}

/// Drawn scale: pop-in scale, shrinking towards half size as life runs out
pub fn visual_scale(creature: &Creature) -> f32 {
    creature.scale * (0.5 + creature.life.clamp(0.0, 1.0) * 0.5)
}

pub fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// System to add discs for new creatures and remove discs of culled ones
pub fn sync_creature_sprites(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    population: Res<Population>,
    sprites: Query<(Entity, &CreatureSprite)>,
) {
    let mut drawn = HashSet::new();
    for (entity, sprite) in sprites.iter() {
        if population.contains(sprite.id) {
            drawn.insert(sprite.id);
        } else {
            commands.entity(entity).despawn();
        }
    }

    for (id, creature) in population.iter() {
        if drawn.contains(&id) {
            continue;
        }
        commands.spawn((
            CreatureSprite { id },
            Mesh2d(meshes.add(Circle::new(creature.size * 0.5))),
            MeshMaterial2d(materials.add(creature_material(creature))),
            Transform::from_scale(Vec3::ZERO),
        ));
    }
}

/// System to move, turn, scale and fade each disc to match its creature
pub fn update_creature_sprites(
    population: Res<Population>,
    canvas: Res<Canvas>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut sprites: Query<(&CreatureSprite, &mut Transform, &MeshMaterial2d<ColorMaterial>)>,
) {
    let depth: HashMap<CreatureId, usize> = population
        .iter()
        .enumerate()
        .map(|(index, (id, _))| (id, index))
        .collect();

    for (sprite, mut transform, material) in sprites.iter_mut() {
        let Some(creature) = population.get(sprite.id) else {
            continue;
        };
        let z = depth.get(&sprite.id).copied().unwrap_or(0) as f32 * DEPTH_STEP;
        transform.translation = canvas.to_world(creature.position).extend(z);
        // canvas y points down, so a positive canvas angle is clockwise on screen
        transform.rotation = Quat::from_rotation_z(-creature.rotation);
        transform.scale = Vec3::splat(visual_scale(creature));

        if let Some(mat) = materials.get_mut(&material.0) {
            mat.color = SpeciesStyle::of(creature.species).color_for(creature);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creature(life: f32, disappearing: bool) -> Creature {
        let mut c = Creature::new(Species::Frog, Vec2::new(100.0, 100.0), Vec2::ZERO, 0.0, 0.0);
        c.life = life;
        c.disappearing = disappearing;
        c.scale = 1.0;
        c
    }

    #[test]
    fn opacity_follows_life() {
        let style = SpeciesStyle::of(Species::Frog);
        let color = style.color_for(&creature(0.25, false)).to_srgba();
        assert!((color.alpha - 0.25).abs() < 1e-5);
        assert!((color.green - 0xCD as f32 / 255.0).abs() < 1e-5);
    }

    #[test]
    fn distress_reddens() {
        let style = SpeciesStyle::of(Species::Frog);
        let calm = style.color_for(&creature(0.2, false)).to_srgba();
        let scared = style.color_for(&creature(0.2, true)).to_srgba();
        assert!(scared.red > calm.red);
        assert!(scared.green < calm.green);
    }

    #[test]
    fn newborn_material_still_blends() {
        let material = creature_material(&creature(1.0, false));
        assert_eq!(material.color.to_srgba().alpha, 1.0);
        assert!(matches!(material.alpha_mode, AlphaMode2d::Blend));
    }

    #[test]
    fn fading_creatures_shrink_to_half() {
        assert_eq!(visual_scale(&creature(1.0, false)), 1.0);
        assert_eq!(visual_scale(&creature(0.0, true)), 0.5);
        let mut popping = creature(1.0, false);
        popping.scale = 0.3;
        assert!((visual_scale(&popping) - 0.3).abs() < 1e-6);
    }
}
