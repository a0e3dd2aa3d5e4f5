//! Stage
//!
//! One terrain, the racers on it and the chase camera following the player
//! racer. The stage owns everything; bodies never reference the terrain, the
//! terrain is only handed bodies to query.
//!
//! Tick order:
//! 1. every racer: control + integrate, then terrain query
//! 2. camera: follow the player racer, ease, then terrain query

use glam::Vec3;
use tracing::{debug, info, warn};

use crate::camera::ChaseCamera;
use crate::config::StageConfig;
use crate::error::{StageError, TerrainError};
use crate::input::RacerIntents;
use crate::player::{ControlMode, Racer, RacerSnapshot};
use crate::world::heightfield::PixelGrid;
use crate::world::terrain::Terrain;
use crate::world::terrain_mesh::generate_heightmap_pixels;

/// Index of the intent-driven racer the camera follows.
pub const PLAYER: usize = 0;

pub struct Stage {
    config: StageConfig,
    terrain: Terrain,
    racers: Vec<Racer>,
    camera: ChaseCamera,
    ticks: u64,
}

impl Stage {
    /// Builds a stage on `terrain` with the player racer at the spawn point.
    pub fn new(config: StageConfig, terrain: Terrain) -> Result<Self, StageError> {
        config.validate()?;

        let player = Racer::new(config.spawn_position, config.racer.clone(), ControlMode::Manual);
        let camera = ChaseCamera::behind(&player, config.camera.clone());

        Ok(Self {
            config,
            terrain,
            racers: vec![player],
            camera,
            ticks: 0,
        })
    }

    /// Builds a stage on terrain generated from the config's noise parameters.
    pub fn procedural(config: StageConfig) -> Result<Self, StageError> {
        let size = config.heightmap_size;
        let pixels = generate_heightmap_pixels(size, size, &config.noise);
        let terrain = Terrain::from_pixels(&pixels, config.terrain_scale)?;
        Self::new(config, terrain)
    }

    /// Adds an AI racer at `position`. Returns its index.
    pub fn add_ai_racer(&mut self, position: Vec3) -> usize {
        self.racers
            .push(Racer::new(position, self.config.racer.clone(), ControlMode::Ai));
        self.racers.len() - 1
    }

    /// Runs one fixed simulation step.
    ///
    /// Intents only drive the player racer; AI racers keep their targets.
    /// A negative or non-finite `time_scale` skips the tick.
    pub fn update(&mut self, intents: &RacerIntents, time_scale: f32) {
        if !time_scale.is_finite() || time_scale < 0.0 {
            warn!(time_scale, "ignoring tick with invalid time scale");
            return;
        }

        for racer in &mut self.racers {
            racer.update(intents, time_scale);
            if !self.terrain.get_collisions(racer) {
                let p = racer.position();
                if let Some(ground) = self.terrain.height_at(p.x, p.z) {
                    racer.set_shadow_ground(ground);
                }
            }
        }

        self.camera.follow_racer(&self.racers[PLAYER]);
        self.camera.update_animation(time_scale);
        self.terrain.get_collisions(&mut self.camera);

        self.ticks += 1;
    }

    /// Indices of racers below the respawn depth.
    pub fn fallen_racers(&self) -> Vec<usize> {
        let depth = self.config.respawn_depth;
        self.racers
            .iter()
            .enumerate()
            .filter(|(_, r)| r.position().y < depth)
            .map(|(i, _)| i)
            .collect()
    }

    /// Puts racer `index` back at the spawn point. Returns `false` for an
    /// unknown index.
    pub fn respawn(&mut self, index: usize) -> bool {
        let spawn = self.config.spawn_position;
        let Some(racer) = self.racers.get_mut(index) else {
            return false;
        };

        debug!(index, from = ?racer.position(), "respawning racer");
        racer.respawn(spawn);
        if index == PLAYER {
            self.camera = ChaseCamera::behind(racer, self.config.camera.clone());
        }
        true
    }

    /// Respawns every fallen racer. Returns how many were reset.
    pub fn respawn_fallen(&mut self) -> usize {
        let fallen = self.fallen_racers();
        for &index in &fallen {
            self.respawn(index);
        }
        fallen.len()
    }

    /// Replaces the terrain with one built from `source`, keeping the scale.
    ///
    /// On error the current terrain stays in place.
    pub fn rebuild_terrain(&mut self, source: &PixelGrid) -> Result<(), TerrainError> {
        self.terrain.rebuild(source)?;
        info!(ticks = self.ticks, "stage terrain replaced");
        Ok(())
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn racers(&self) -> &[Racer] {
        &self.racers
    }

    pub fn racer_mut(&mut self, index: usize) -> Option<&mut Racer> {
        self.racers.get_mut(index)
    }

    pub fn player(&self) -> &Racer {
        &self.racers[PLAYER]
    }

    pub fn camera(&self) -> &ChaseCamera {
        &self.camera
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn snapshots(&self) -> Vec<RacerSnapshot> {
        self.racers.iter().map(Racer::snapshot).collect()
    }
}
