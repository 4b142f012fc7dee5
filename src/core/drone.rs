use super::constants::*;
use super::sections::{SectionConfig, SectionTable};
use smallvec::SmallVec;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("audio synthesis is not available in this environment")]
    Unavailable,
    #[error("audio context is suspended and could not be resumed")]
    Suspended,
    #[error("failed to create {0} node")]
    Node(&'static str),
    #[error("no section config for index {0}")]
    NoSection(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerRole {
    Base,
    Harmonic,
    Sub,
}

impl LayerRole {
    /// Build order; the active layer set is stored in this order.
    pub const ALL: [LayerRole; 3] = [LayerRole::Base, LayerRole::Harmonic, LayerRole::Sub];

    pub fn frequency_ratio(self) -> f32 {
        match self {
            LayerRole::Base => 1.0,
            LayerRole::Harmonic => HARMONIC_RATIO,
            LayerRole::Sub => SUB_RATIO,
        }
    }

    pub fn level(self) -> f32 {
        match self {
            LayerRole::Base => BASE_LEVEL,
            LayerRole::Harmonic => HARMONIC_LEVEL,
            LayerRole::Sub => SUB_LEVEL,
        }
    }

    /// Only the harmonic layer is detuned.
    pub fn detune_for(self, section: &SectionConfig) -> f32 {
        match self {
            LayerRole::Harmonic => section.detune_cents,
            _ => 0.0,
        }
    }

    pub fn frequency_for(self, section: &SectionConfig) -> f32 {
        section.base_frequency * self.frequency_ratio()
    }

    pub fn name(self) -> &'static str {
        match self {
            LayerRole::Base => "base",
            LayerRole::Harmonic => "harmonic",
            LayerRole::Sub => "sub",
        }
    }
}

/// Everything needed to build one oscillator + gain pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerSpec {
    pub role: LayerRole,
    pub frequency_hz: f32,
    pub detune_cents: f32,
    pub level: f32,
}

impl LayerSpec {
    pub fn for_section(role: LayerRole, section: &SectionConfig) -> Self {
        Self {
            role,
            frequency_hz: role.frequency_for(section),
            detune_cents: role.detune_for(section),
            level: role.level(),
        }
    }
}

/// Host synthesis graph as seen by the drone engine.
///
/// Times are in the context's own clock. Every `ramp_*` call replaces any ramp still
/// in flight on that parameter, starting from the value it holds at the current time.
pub trait SynthContext {
    type Layer;

    fn current_time(&self) -> f64;
    fn is_suspended(&self) -> bool;
    fn resume(&mut self) -> Result<(), AudioError>;
    /// Build a running oscillator layer wired into the master gain.
    fn create_layer(&mut self, spec: LayerSpec) -> Result<Self::Layer, AudioError>;
    fn ramp_master(&mut self, target: f32, end_time: f64);
    fn ramp_frequency(&mut self, layer: &mut Self::Layer, target_hz: f32, end_time: f64);
    fn ramp_detune(&mut self, layer: &mut Self::Layer, target_cents: f32, end_time: f64);
    fn stop_layer(&mut self, layer: &mut Self::Layer, when: f64);
    /// Disconnect a stopped layer from the graph.
    fn release_layer(&mut self, layer: Self::Layer);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Active,
}

type Layers<L> = SmallVec<[L; 3]>;
type Connector<C> = Box<dyn FnMut() -> Result<C, AudioError>>;

struct Retiring<L> {
    layers: Layers<L>,
    release_at: f64,
}

/// Three-layer ambient drone whose timbre follows the current section.
pub struct DroneEngine<C: SynthContext> {
    sections: SectionTable,
    connector: Option<Connector<C>>,
    ctx: Option<C>,
    layers: Layers<C::Layer>,
    retiring: Vec<Retiring<C::Layer>>,
    current: usize,
    state: PlaybackState,
}

impl<C: SynthContext> DroneEngine<C> {
    /// The context is not created here; `connect` runs on the first `start`.
    pub fn new(
        sections: SectionTable,
        connect: impl FnMut() -> Result<C, AudioError> + 'static,
    ) -> Self {
        Self {
            sections,
            connector: Some(Box::new(connect)),
            ctx: None,
            layers: Layers::new(),
            retiring: Vec::new(),
            current: 0,
            state: PlaybackState::Idle,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == PlaybackState::Active
    }

    /// False once the host has reported that no synthesis capability exists.
    pub fn is_available(&self) -> bool {
        self.ctx.is_some() || self.connector.is_some()
    }

    pub fn current_section(&self) -> usize {
        self.current
    }

    pub fn sections(&self) -> &SectionTable {
        &self.sections
    }

    pub fn context(&self) -> Option<&C> {
        self.ctx.as_ref()
    }

    pub fn context_mut(&mut self) -> Option<&mut C> {
        self.ctx.as_mut()
    }

    /// Active layers in `LayerRole::ALL` order; empty while idle.
    pub fn layers(&self) -> &[C::Layer] {
        &self.layers
    }

    /// Layer sets that are fading out and not yet released.
    pub fn retiring_sets(&self) -> usize {
        self.retiring.len()
    }

    pub fn toggle(&mut self) -> Result<PlaybackState, AudioError> {
        match self.state {
            PlaybackState::Active => {
                self.stop();
                Ok(PlaybackState::Idle)
            }
            PlaybackState::Idle => {
                self.start()?;
                Ok(PlaybackState::Active)
            }
        }
    }

    pub fn start(&mut self) -> Result<(), AudioError> {
        if self.state == PlaybackState::Active {
            return Ok(());
        }
        let section = *self
            .sections
            .get(self.current)
            .ok_or(AudioError::NoSection(self.current))?;
        self.connect()?;
        let Some(ctx) = self.ctx.as_mut() else {
            return Err(AudioError::Unavailable);
        };
        if ctx.is_suspended() {
            ctx.resume()?;
        }

        let now = ctx.current_time();
        // A restart cuts whatever is still fading out.
        for old in self.retiring.drain(..) {
            discard(ctx, old.layers, now);
        }
        let stale = std::mem::take(&mut self.layers);
        discard(ctx, stale, now);

        let mut fresh = Layers::new();
        for role in LayerRole::ALL {
            match ctx.create_layer(LayerSpec::for_section(role, &section)) {
                Ok(layer) => fresh.push(layer),
                Err(e) => {
                    discard(ctx, fresh, now);
                    return Err(e);
                }
            }
        }
        self.layers = fresh;
        ctx.ramp_master(section.volume, now + START_RAMP_SEC);
        self.state = PlaybackState::Active;
        log::info!(
            "[drone] start section={} ({}) volume={:.2}",
            section.index,
            section.name,
            section.volume
        );
        Ok(())
    }

    /// Fade out; the state flips to idle at once while the layers keep sounding
    /// until the fade has finished.
    pub fn stop(&mut self) {
        if self.state != PlaybackState::Active {
            return;
        }
        self.state = PlaybackState::Idle;
        let Some(ctx) = self.ctx.as_mut() else {
            return;
        };
        let now = ctx.current_time();
        ctx.ramp_master(0.0, now + STOP_RAMP_SEC);
        let release_at = now + TEARDOWN_DELAY_SEC;
        let mut layers = std::mem::take(&mut self.layers);
        for layer in layers.iter_mut() {
            ctx.stop_layer(layer, release_at);
        }
        self.retiring.push(Retiring { layers, release_at });
        log::info!("[drone] stop, layers released at t={:.2}", release_at);
    }

    /// Cross-fade to another section's timbre. Returns whether anything was scheduled.
    pub fn transition_to(&mut self, index: usize) -> bool {
        if self.state != PlaybackState::Active || index == self.current {
            return false;
        }
        let Some(section) = self.sections.get(index).copied() else {
            log::warn!("[drone] ignoring transition to unknown section {}", index);
            return false;
        };
        let Some(ctx) = self.ctx.as_mut() else {
            return false;
        };
        self.current = index;
        let now = ctx.current_time();
        let timbre_end = now + TIMBRE_RAMP_SEC;
        for (role, layer) in LayerRole::ALL.iter().zip(self.layers.iter_mut()) {
            ctx.ramp_frequency(layer, role.frequency_for(&section), timbre_end);
            if *role == LayerRole::Harmonic {
                ctx.ramp_detune(layer, section.detune_cents, timbre_end);
            }
        }
        ctx.ramp_master(section.volume, now + VOLUME_RAMP_SEC);
        log::info!(
            "[drone] transition -> {} ({}) base={:.1}Hz",
            section.index,
            section.name,
            section.base_frequency
        );
        true
    }

    /// Disconnect layer sets whose fade-out deadline has passed. Returns the number of
    /// layers released.
    pub fn collect_retired(&mut self) -> usize {
        if self.retiring.is_empty() {
            return 0;
        }
        let Some(ctx) = self.ctx.as_mut() else {
            return 0;
        };
        let now = ctx.current_time();
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.retiring)
            .into_iter()
            .partition(|r| r.release_at <= now);
        self.retiring = pending;
        let mut released = 0;
        for set in due {
            for layer in set.layers {
                ctx.release_layer(layer);
                released += 1;
            }
        }
        released
    }

    fn connect(&mut self) -> Result<(), AudioError> {
        if self.ctx.is_some() {
            return Ok(());
        }
        let connect = self.connector.as_mut().ok_or(AudioError::Unavailable)?;
        match connect() {
            Ok(ctx) => {
                self.ctx = Some(ctx);
                self.connector = None;
                Ok(())
            }
            Err(AudioError::Unavailable) => {
                log::warn!("[drone] audio synthesis unavailable; toggle disabled");
                self.connector = None;
                Err(AudioError::Unavailable)
            }
            Err(e) => Err(e),
        }
    }
}

fn discard<C: SynthContext>(ctx: &mut C, layers: Layers<C::Layer>, when: f64) {
    for mut layer in layers {
        ctx.stop_layer(&mut layer, when);
        ctx.release_layer(layer);
    }
}
