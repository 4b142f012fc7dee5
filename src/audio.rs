use crate::core::{AudioError, DroneEngine, LayerSpec, ParamTimeline, SynthContext};
use web_sys as web;

pub type WebDrone = DroneEngine<WebSynth>;

/// WebAudio graph: master gain into the destination, drone layers into the master.
pub struct WebSynth {
    ctx: web::AudioContext,
    master: web::GainNode,
    master_level: ParamTimeline,
    pending_resume: Option<js_sys::Promise>,
}

pub struct WebLayer {
    osc: web::OscillatorNode,
    gain: web::GainNode,
    frequency: ParamTimeline,
    detune: ParamTimeline,
}

fn create_gain(
    audio_ctx: &web::AudioContext,
    value: f32,
    label: &str,
) -> Result<web::GainNode, AudioError> {
    match web::GainNode::new(audio_ctx) {
        Ok(g) => {
            g.gain().set_value(value);
            Ok(g)
        }
        Err(e) => {
            log::error!("{} GainNode error: {:?}", label, e);
            Err(AudioError::Node("gain"))
        }
    }
}

// Cancel whatever is queued on `param`, pin it to the value it holds now and ramp
// from there, so the newest ramp always wins.
fn schedule_ramp(
    param: &web::AudioParam,
    timeline: &mut ParamTimeline,
    now: f64,
    target: f32,
    end_time: f64,
) {
    let held = timeline.ramp_to(now, target, end_time);
    _ = param.cancel_scheduled_values(now);
    _ = param.set_value_at_time(held, now);
    _ = param.linear_ramp_to_value_at_time(target, end_time);
}

impl WebSynth {
    /// Create the context and a silent master gain. Fails with `Unavailable` when the
    /// host has no WebAudio.
    pub fn connect() -> Result<Self, AudioError> {
        let ctx = web::AudioContext::new().map_err(|e| {
            log::warn!("AudioContext unavailable: {:?}", e);
            AudioError::Unavailable
        })?;
        let master = create_gain(&ctx, 0.0, "Master")?;
        master
            .connect_with_audio_node(&ctx.destination())
            .map_err(|e| {
                log::error!("master connect error: {:?}", e);
                AudioError::Node("master")
            })?;
        log::info!("[drone] audio context created, sample rate {}", ctx.sample_rate());
        Ok(Self {
            ctx,
            master,
            master_level: ParamTimeline::new(0.0),
            pending_resume: None,
        })
    }

    /// Promise from the last `resume()`, for the caller to await.
    pub fn take_pending_resume(&mut self) -> Option<js_sys::Promise> {
        self.pending_resume.take()
    }
}

impl SynthContext for WebSynth {
    type Layer = WebLayer;

    fn current_time(&self) -> f64 {
        self.ctx.current_time()
    }

    fn is_suspended(&self) -> bool {
        self.ctx.state() == web::AudioContextState::Suspended
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        let promise = self.ctx.resume().map_err(|e| {
            log::warn!("AudioContext resume refused: {:?}", e);
            AudioError::Suspended
        })?;
        self.pending_resume = Some(promise);
        Ok(())
    }

    fn create_layer(&mut self, spec: LayerSpec) -> Result<WebLayer, AudioError> {
        let osc = web::OscillatorNode::new(&self.ctx).map_err(|e| {
            log::error!("{} OscillatorNode error: {:?}", spec.role.name(), e);
            AudioError::Node("oscillator")
        })?;
        osc.set_type(web::OscillatorType::Sine);
        osc.frequency().set_value(spec.frequency_hz);
        osc.detune().set_value(spec.detune_cents);
        let gain = create_gain(&self.ctx, spec.level, spec.role.name())?;
        _ = osc.connect_with_audio_node(&gain);
        _ = gain.connect_with_audio_node(&self.master);
        if let Err(e) = osc.start() {
            log::error!("{} oscillator start error: {:?}", spec.role.name(), e);
            _ = gain.disconnect();
            return Err(AudioError::Node("oscillator"));
        }
        Ok(WebLayer {
            osc,
            gain,
            frequency: ParamTimeline::new(spec.frequency_hz),
            detune: ParamTimeline::new(spec.detune_cents),
        })
    }

    fn ramp_master(&mut self, target: f32, end_time: f64) {
        let now = self.ctx.current_time();
        schedule_ramp(
            &self.master.gain(),
            &mut self.master_level,
            now,
            target,
            end_time,
        );
    }

    fn ramp_frequency(&mut self, layer: &mut WebLayer, target_hz: f32, end_time: f64) {
        let now = self.ctx.current_time();
        schedule_ramp(
            &layer.osc.frequency(),
            &mut layer.frequency,
            now,
            target_hz,
            end_time,
        );
    }

    fn ramp_detune(&mut self, layer: &mut WebLayer, target_cents: f32, end_time: f64) {
        let now = self.ctx.current_time();
        schedule_ramp(
            &layer.osc.detune(),
            &mut layer.detune,
            now,
            target_cents,
            end_time,
        );
    }

    fn stop_layer(&mut self, layer: &mut WebLayer, when: f64) {
        _ = layer.osc.stop_with_when(when);
    }

    fn release_layer(&mut self, layer: WebLayer) {
        _ = layer.osc.disconnect();
        _ = layer.gain.disconnect();
    }
}
