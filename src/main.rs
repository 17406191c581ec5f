use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPlugin};
use clap::Parser;
use morning_zoo::audio::{sample_volume, SoundInput, VolumeMeter};
use morning_zoo::config::*;
use morning_zoo::population::Population;
use morning_zoo::render::{setup_camera, sync_creature_sprites, update_creature_sprites};
use morning_zoo::settings::{load_settings, SettingsStore, ZooSettings};
use morning_zoo::species::Species;
use morning_zoo::zoo::{
    advance_zoo, clear_zoo, fit_canvas_to_window, select_speed, Canvas, ReadingSession, SessionState,
};
use std::path::PathBuf;

/// Read aloud to fill the zoo; go quiet and the animals fade away
#[derive(Parser, Debug)]
#[command(name = "morning-zoo", version)]
struct Cli {
    /// Where settings are loaded from and saved to
    #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
    settings: PathBuf,

    /// Seed for spawn positions and species, for repeatable runs
    #[arg(long)]
    seed: Option<u64>,

    /// Raw volume (0-100) produced while the shout key is held
    #[arg(long, default_value_t = DEFAULT_SHOUT_LEVEL)]
    shout_level: f32,
}

fn main() {
    let cli = Cli::parse();

    let population = match cli.seed {
        Some(seed) => Population::with_seed(seed),
        None => Population::new(),
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Morning Reading Zoo".to_string(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .insert_resource(ClearColor(Color::srgb(0.36, 0.55, 0.42)))
        .insert_resource(population)
        .insert_resource(SettingsStore::new(cli.settings, ZooSettings::default()))
        .insert_resource(SoundInput {
            shout_level: cli.shout_level.clamp(0.0, 100.0),
            ..default()
        })
        .init_resource::<VolumeMeter>()
        .init_resource::<ReadingSession>()
        .init_resource::<Canvas>()
        .add_systems(Startup, (setup_camera, load_settings))
        .add_systems(
            Update,
            (
                fit_canvas_to_window,
                sample_volume,
                advance_zoo,
                sync_creature_sprites,
                update_creature_sprites,
            )
                .chain(),
        )
        .add_systems(Update, ui_system)
        .run();
}

fn ui_system(
    mut contexts: EguiContexts,
    time: Res<Time>,
    mut session: ResMut<ReadingSession>,
    mut population: ResMut<Population>,
    mut meter: ResMut<VolumeMeter>,
    mut input: ResMut<SoundInput>,
    mut store: ResMut<SettingsStore>,
    mut show_settings: Local<bool>,
) {
    let now = time.elapsed_secs();
    let ctx = contexts.ctx_mut();

    egui::Window::new("Morning Reading Zoo")
        .default_pos(egui::pos2(10.0, 10.0))
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                let idle = session.state() == SessionState::Idle;
                if ui.add_enabled(idle, egui::Button::new("▶ Start reading")).clicked()
                    && session.start(now)
                {
                    info!("Reading session started");
                }

                let pause_text = if session.state() == SessionState::Paused {
                    "▶ Resume"
                } else {
                    "⏸ Pause"
                };
                if ui.add_enabled(!idle, egui::Button::new(pause_text)).clicked() {
                    match session.toggle_pause() {
                        Some(SessionState::Paused) => info!("Reading paused"),
                        Some(_) => info!("Reading resumed"),
                        None => {}
                    }
                }

                if ui.button("🧹 Clear").clicked() {
                    clear_zoo(&mut session, &mut population);
                }
                if ui.button("⚙ Settings").clicked() {
                    store.revert_draft();
                    *show_settings = true;
                }
            });

            ui.separator();
            ui.heading("Volume");
            ui.separator();

            let level = meter.level();
            ui.add(
                egui::ProgressBar::new(level / 100.0)
                    .text(format!("{:.0} ({})", level, meter.intensity().label())),
            );
            ui.label(format!(
                "Average: {:.0}   Threshold: {:.0}",
                meter.average(),
                meter.threshold()
            ));
            ui.add(egui::Slider::new(&mut input.manual_level, 0.0..=100.0).text("Room level"));
            ui.label("Hold Space to read aloud");

            ui.separator();
            ui.heading("Spawn Speed");
            ui.separator();

            ui.horizontal(|ui| {
                for (label, speed) in SPEED_PRESETS {
                    let selected = (session.speed() - speed).abs() < f32::EPSILON;
                    if ui.selectable_label(selected, label).clicked() && !selected {
                        if let Err(err) = select_speed(&mut session, &mut population, speed) {
                            warn!("{}", err);
                        }
                    }
                }
            });

            ui.separator();
            ui.heading("Zoo Stats");
            ui.separator();

            ui.label(format!(
                "Creatures: {} / {}",
                population.len(),
                population.max_population()
            ));
            ui.label(format!("Spawned this session: {}", session.total_spawned()));
            let elapsed = session.elapsed(now) as u32;
            ui.label(format!("Reading time: {:02}:{:02}", elapsed / 60, elapsed % 60));
            for (species, count) in population.census() {
                ui.label(format!("  {}: {}", species, count));
            }
        });

    if !*show_settings {
        return;
    }

    let mut open = true;
    let mut saved = false;
    egui::Window::new("Settings")
        .open(&mut open)
        .default_pos(egui::pos2(330.0, 10.0))
        .show(ctx, |ui| {
            let draft = &mut store.draft;

            ui.add(
                egui::Slider::new(
                    &mut draft.spawn_interval,
                    SPAWN_INTERVAL_BOUNDS.0..=SPAWN_INTERVAL_BOUNDS.1,
                )
                .text("seconds per creature"),
            );

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Select all").clicked() {
                    draft.set_all_enabled(true);
                }
                if ui.button("Select none").clicked() {
                    draft.set_all_enabled(false);
                }
            });
            for species in Species::ALL {
                let mut enabled = draft.is_enabled(species);
                if ui.checkbox(&mut enabled, species.name()).changed() {
                    draft.set_enabled(species, enabled);
                }
            }

            ui.separator();
            ui.add(
                egui::DragValue::new(&mut draft.max_population)
                    .range(MAX_POPULATION_BOUNDS.0..=MAX_POPULATION_BOUNDS.1)
                    .prefix("Max creatures: "),
            );
            ui.add(egui::Slider::new(&mut draft.volume_threshold, 0.0..=100.0).text("volume threshold"));

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("💾 Save").clicked() {
                    saved = store.commit(&mut population, &mut meter).is_ok();
                }
                if ui.button("↺ Defaults").clicked() {
                    store.reset_draft();
                }
            });
            if let Some(status) = &store.status {
                ui.label(status.as_str());
            }
        });

    *show_settings = open && !saved;
}
