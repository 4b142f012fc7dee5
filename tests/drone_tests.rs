// Host-side tests for the section table, parameter ramps and the drone engine.
// The main crate is wasm-only, so we include the pure-Rust modules directly and
// drive the engine through a simulated synthesis context.

#![allow(dead_code)]
mod pure {
    pub mod constants {
        include!("../src/core/constants.rs");
    }
    pub mod sections {
        include!("../src/core/sections.rs");
    }
    pub mod ramp {
        include!("../src/core/ramp.rs");
    }
    pub mod drone {
        include!("../src/core/drone.rs");
    }
}

use pure::constants::*;
use pure::drone::*;
use pure::ramp::ParamTimeline;
use pure::sections::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
enum Ramp {
    Master { target: f32, end: f64 },
    Frequency { layer: usize, target: f32, end: f64 },
    Detune { layer: usize, target: f32, end: f64 },
}

/// Shared view into the simulated context, kept by the test after the engine takes
/// ownership of the context itself.
#[derive(Default)]
struct Probe {
    now: Cell<f64>,
    connects: Cell<usize>,
    unavailable: Cell<bool>,
    suspended: Cell<bool>,
    refuse_resume: Cell<bool>,
    fail_role: Cell<Option<LayerRole>>,
    next_layer: Cell<usize>,
    ramps: RefCell<Vec<Ramp>>,
    released: RefCell<Vec<(usize, Option<f64>)>>,
}

impl Probe {
    fn at(&self, t: f64) {
        self.now.set(t);
    }
    fn take_ramps(&self) -> Vec<Ramp> {
        std::mem::take(&mut *self.ramps.borrow_mut())
    }
}

#[derive(Debug)]
struct SimLayer {
    id: usize,
    role: LayerRole,
    level: f32,
    frequency: ParamTimeline,
    detune: ParamTimeline,
    stop_at: Option<f64>,
}

struct SimSynth {
    probe: Rc<Probe>,
    master: ParamTimeline,
}

impl SynthContext for SimSynth {
    type Layer = SimLayer;

    fn current_time(&self) -> f64 {
        self.probe.now.get()
    }

    fn is_suspended(&self) -> bool {
        self.probe.suspended.get()
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        if self.probe.refuse_resume.get() {
            return Err(AudioError::Suspended);
        }
        self.probe.suspended.set(false);
        Ok(())
    }

    fn create_layer(&mut self, spec: LayerSpec) -> Result<SimLayer, AudioError> {
        if self.probe.fail_role.get() == Some(spec.role) {
            return Err(AudioError::Node("oscillator"));
        }
        let id = self.probe.next_layer.get();
        self.probe.next_layer.set(id + 1);
        Ok(SimLayer {
            id,
            role: spec.role,
            level: spec.level,
            frequency: ParamTimeline::new(spec.frequency_hz),
            detune: ParamTimeline::new(spec.detune_cents),
            stop_at: None,
        })
    }

    fn ramp_master(&mut self, target: f32, end_time: f64) {
        self.master.ramp_to(self.current_time(), target, end_time);
        self.probe.ramps.borrow_mut().push(Ramp::Master {
            target,
            end: end_time,
        });
    }

    fn ramp_frequency(&mut self, layer: &mut SimLayer, target_hz: f32, end_time: f64) {
        layer.frequency.ramp_to(self.current_time(), target_hz, end_time);
        self.probe.ramps.borrow_mut().push(Ramp::Frequency {
            layer: layer.id,
            target: target_hz,
            end: end_time,
        });
    }

    fn ramp_detune(&mut self, layer: &mut SimLayer, target_cents: f32, end_time: f64) {
        layer.detune.ramp_to(self.current_time(), target_cents, end_time);
        self.probe.ramps.borrow_mut().push(Ramp::Detune {
            layer: layer.id,
            target: target_cents,
            end: end_time,
        });
    }

    fn stop_layer(&mut self, layer: &mut SimLayer, when: f64) {
        layer.stop_at = Some(when);
    }

    fn release_layer(&mut self, layer: SimLayer) {
        self.probe.released.borrow_mut().push((layer.id, layer.stop_at));
    }
}

fn make_engine(probe: &Rc<Probe>) -> DroneEngine<SimSynth> {
    let p = probe.clone();
    DroneEngine::new(SectionTable::default(), move || {
        p.connects.set(p.connects.get() + 1);
        if p.unavailable.get() {
            return Err(AudioError::Unavailable);
        }
        Ok(SimSynth {
            probe: p.clone(),
            master: ParamTimeline::new(0.0),
        })
    })
}

fn master(engine: &DroneEngine<SimSynth>) -> ParamTimeline {
    engine.context().expect("context").master
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

// ---------------- Section table ----------------

#[test]
fn default_table_matches_the_six_sections() {
    let table = SectionTable::default();
    assert_eq!(table.len(), 6);
    assert!(SectionTable::new(DEFAULT_SECTIONS.to_vec()).is_ok());
    let first = table.get(0).unwrap();
    assert_eq!((first.base_frequency, first.volume, first.detune_cents), (55.0, 0.12, 0.0));
    let second = table.get(1).unwrap();
    assert_eq!((second.base_frequency, second.volume, second.detune_cents), (65.0, 0.14, 5.0));
    assert!(table.get(6).is_none());
}

#[test]
fn table_validation_rejects_bad_entries() {
    assert_eq!(SectionTable::new(Vec::new()), Err(SectionTableError::Empty));

    let mut shuffled = DEFAULT_SECTIONS.to_vec();
    shuffled.swap(1, 2);
    assert_eq!(
        SectionTable::new(shuffled),
        Err(SectionTableError::OutOfOrder {
            position: 1,
            index: 2
        })
    );

    let mut silent = DEFAULT_SECTIONS.to_vec();
    silent[3].base_frequency = 0.0;
    assert_eq!(SectionTable::new(silent), Err(SectionTableError::BadFrequency(3)));

    let mut loud = DEFAULT_SECTIONS.to_vec();
    loud[4].volume = 1.5;
    assert_eq!(SectionTable::new(loud), Err(SectionTableError::BadVolume(4)));
}

#[test]
fn usable_count_is_the_smallest_consumer() {
    assert_eq!(usable_section_count(6, 6, 6), 6);
    assert_eq!(usable_section_count(6, 5, 6), 5);
    assert_eq!(usable_section_count(7, 6, 6), 6);
}

// ---------------- Ramps ----------------

#[test]
fn ramp_interpolates_linearly_between_anchors() {
    let mut p = ParamTimeline::new(0.0);
    p.ramp_to(0.0, 1.0, 2.0);
    assert!(approx(p.value_at(0.0), 0.0));
    assert!(approx(p.value_at(0.5), 0.25));
    assert!(approx(p.value_at(1.0), 0.5));
    assert!(approx(p.value_at(2.0), 1.0));
    assert!(approx(p.value_at(10.0), 1.0));
    assert!(!p.is_settled(1.9));
    assert!(p.is_settled(2.0));
}

#[test]
fn newer_ramp_starts_from_held_value_and_replaces_end_point() {
    let mut p = ParamTimeline::new(0.0);
    p.ramp_to(0.0, 1.0, 2.0);
    let held = p.ramp_to(1.0, 0.0, 2.0);
    assert!(approx(held, 0.5));
    assert!(approx(p.value_at(1.5), 0.25));
    // The first ramp's target never comes back
    assert!(approx(p.value_at(2.0), 0.0));
    assert!(approx(p.value_at(5.0), 0.0));
    assert_eq!(p.target(), 0.0);
    assert_eq!(p.end_time(), 2.0);
}

#[test]
fn ramp_ending_in_the_past_jumps() {
    let mut p = ParamTimeline::new(3.0);
    p.ramp_to(5.0, 7.0, 4.0);
    assert_eq!(p.value_at(5.0), 7.0);
    p.set(6.0, 1.0);
    assert_eq!(p.value_at(6.0), 1.0);
}

// ---------------- Engine lifecycle ----------------

#[test]
fn construction_does_not_touch_audio() {
    let probe = Rc::new(Probe::default());
    let engine = make_engine(&probe);
    assert_eq!(probe.connects.get(), 0);
    assert_eq!(engine.state(), PlaybackState::Idle);
    assert!(engine.context().is_none());
    assert!(engine.layers().is_empty());
    assert_eq!(engine.current_section(), 0);
}

#[test]
fn start_builds_three_layers_and_fades_in_section_zero() {
    let probe = Rc::new(Probe::default());
    let mut engine = make_engine(&probe);
    engine.start().unwrap();

    assert_eq!(engine.state(), PlaybackState::Active);
    assert_eq!(probe.connects.get(), 1);
    assert_eq!(probe.take_ramps(), vec![Ramp::Master { target: 0.12, end: 2.0 }]);

    let m = master(&engine);
    assert!(approx(m.value_at(0.0), 0.0));
    assert!(approx(m.value_at(1.0), 0.06));
    assert!(approx(m.value_at(2.0), 0.12));

    let layers = engine.layers();
    assert_eq!(layers.len(), 3);
    let roles: Vec<_> = layers.iter().map(|l| l.role).collect();
    assert_eq!(roles, LayerRole::ALL.to_vec());
    assert!(approx(layers[0].frequency.value_at(0.0), 55.0));
    assert!(approx(layers[1].frequency.value_at(0.0), 82.5));
    assert!(approx(layers[2].frequency.value_at(0.0), 27.5));
    assert_eq!(layers[1].detune.value_at(0.0), 0.0);
    let levels: Vec<_> = layers.iter().map(|l| l.level).collect();
    assert_eq!(levels, vec![BASE_LEVEL, HARMONIC_LEVEL, SUB_LEVEL]);
}

#[test]
fn transition_while_idle_schedules_nothing() {
    let probe = Rc::new(Probe::default());
    let mut engine = make_engine(&probe);
    assert!(!engine.transition_to(3));
    assert_eq!(engine.current_section(), 0);
    assert!(probe.ramps.borrow().is_empty());

    // Also after a stop
    engine.start().unwrap();
    engine.stop();
    probe.take_ramps();
    assert!(!engine.transition_to(3));
    assert!(probe.ramps.borrow().is_empty());
}

#[test]
fn transition_ramps_timbre_and_volume_in_audio_time() {
    let probe = Rc::new(Probe::default());
    let mut engine = make_engine(&probe);
    engine.start().unwrap();
    probe.take_ramps();

    probe.at(0.5);
    assert!(engine.transition_to(1));
    assert_eq!(engine.current_section(), 1);

    let ids: Vec<usize> = engine.layers().iter().map(|l| l.id).collect();
    assert_eq!(
        probe.take_ramps(),
        vec![
            Ramp::Frequency { layer: ids[0], target: 65.0, end: 2.5 },
            Ramp::Frequency { layer: ids[1], target: 97.5, end: 2.5 },
            Ramp::Detune { layer: ids[1], target: 5.0, end: 2.5 },
            Ramp::Frequency { layer: ids[2], target: 32.5, end: 2.5 },
            Ramp::Master { target: 0.14, end: 2.0 },
        ]
    );

    // Values depend only on the context clock
    let layers = engine.layers();
    assert!(approx(layers[0].frequency.value_at(1.5), 60.0));
    assert!(approx(layers[0].frequency.value_at(2.5), 65.0));
    assert!(approx(layers[1].frequency.value_at(2.5), 97.5));
    assert!(approx(layers[2].frequency.value_at(2.5), 32.5));
    assert!(approx(layers[1].detune.value_at(2.5), 5.0));
    assert_eq!(layers[0].detune.value_at(2.5), 0.0);
    assert!(approx(master(&engine).value_at(2.0), 0.14));
}

#[test]
fn transition_to_current_or_unknown_section_is_a_no_op() {
    let probe = Rc::new(Probe::default());
    let mut engine = make_engine(&probe);
    engine.start().unwrap();
    probe.take_ramps();

    assert!(!engine.transition_to(0));
    assert!(!engine.transition_to(42));
    assert_eq!(engine.current_section(), 0);
    assert!(probe.ramps.borrow().is_empty());
}

#[test]
fn stop_during_transition_tears_down_after_the_fade() {
    let probe = Rc::new(Probe::default());
    let mut engine = make_engine(&probe);
    engine.start().unwrap();
    probe.at(0.5);
    engine.transition_to(1);
    probe.take_ramps();

    probe.at(1.1);
    engine.stop();
    assert_eq!(engine.state(), PlaybackState::Idle);
    assert!(engine.layers().is_empty());
    assert_eq!(engine.retiring_sets(), 1);
    assert_eq!(probe.take_ramps(), vec![Ramp::Master { target: 0.0, end: 2.1 }]);

    // Fade starts from where the transition ramp had got to and ends silent
    let m = master(&engine);
    assert!(m.value_at(1.1) > 0.0);
    assert_eq!(m.value_at(2.1), 0.0);
    assert_eq!(m.value_at(2.5), 0.0);

    probe.at(2.0);
    assert_eq!(engine.collect_retired(), 0);
    assert!(probe.released.borrow().is_empty());

    probe.at(2.2);
    assert_eq!(engine.collect_retired(), 3);
    assert_eq!(engine.retiring_sets(), 0);
    let released = probe.released.borrow();
    assert_eq!(released.len(), 3);
    assert!(released.iter().all(|(_, stop_at)| *stop_at == Some(2.2)));
}

#[test]
fn restart_cuts_the_fading_set() {
    let probe = Rc::new(Probe::default());
    let mut engine = make_engine(&probe);
    engine.start().unwrap();
    probe.at(3.0);
    engine.stop();

    probe.at(3.5);
    engine.start().unwrap();
    let released = probe.released.borrow().clone();
    assert_eq!(released, vec![(0, Some(3.5)), (1, Some(3.5)), (2, Some(3.5))]);
    assert_eq!(engine.retiring_sets(), 0);
    let ids: Vec<usize> = engine.layers().iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![3, 4, 5]);
    assert!(engine.layers().iter().all(|l| l.stop_at.is_none()));
}

#[test]
fn toggle_flips_state_and_reuses_the_context() {
    let probe = Rc::new(Probe::default());
    let mut engine = make_engine(&probe);
    assert_eq!(engine.toggle(), Ok(PlaybackState::Active));
    assert_eq!(engine.toggle(), Ok(PlaybackState::Idle));
    probe.at(5.0);
    assert_eq!(engine.toggle(), Ok(PlaybackState::Active));
    assert_eq!(probe.connects.get(), 1);
    assert_eq!(engine.layers().len(), 3);
}

#[test]
fn redundant_start_and_stop_are_no_ops() {
    let probe = Rc::new(Probe::default());
    let mut engine = make_engine(&probe);
    engine.stop();
    assert!(engine.context().is_none());

    engine.start().unwrap();
    probe.take_ramps();
    engine.start().unwrap();
    assert!(probe.ramps.borrow().is_empty());
    assert_eq!(probe.next_layer.get(), 3);

    engine.stop();
    probe.take_ramps();
    engine.stop();
    assert!(probe.ramps.borrow().is_empty());
    assert_eq!(engine.retiring_sets(), 1);
}

#[test]
fn restart_after_transition_uses_the_latest_section() {
    let probe = Rc::new(Probe::default());
    let mut engine = make_engine(&probe);
    engine.start().unwrap();
    engine.transition_to(4);
    engine.stop();
    probe.at(3.0);
    engine.start().unwrap();
    let layers = engine.layers();
    assert!(approx(layers[0].frequency.value_at(3.0), 50.0));
    assert_eq!(
        probe.ramps.borrow().last(),
        Some(&Ramp::Master { target: 0.16, end: 5.0 })
    );
}

// ---------------- Degradation ----------------

#[test]
fn missing_audio_makes_start_an_inert_no_op() {
    let probe = Rc::new(Probe::default());
    probe.unavailable.set(true);
    let mut engine = make_engine(&probe);
    assert!(engine.is_available());

    assert_eq!(engine.start(), Err(AudioError::Unavailable));
    assert_eq!(engine.state(), PlaybackState::Idle);
    assert!(!engine.is_available());

    // No second attempt at building a context
    assert_eq!(engine.toggle(), Err(AudioError::Unavailable));
    assert_eq!(probe.connects.get(), 1);
    assert!(!engine.transition_to(2));
}

#[test]
fn suspended_context_is_resumed_before_starting() {
    let probe = Rc::new(Probe::default());
    probe.suspended.set(true);
    let mut engine = make_engine(&probe);
    engine.start().unwrap();
    assert!(!probe.suspended.get());
    assert!(engine.is_active());
}

#[test]
fn refused_resume_leaves_the_engine_idle() {
    let probe = Rc::new(Probe::default());
    probe.suspended.set(true);
    probe.refuse_resume.set(true);
    let mut engine = make_engine(&probe);

    assert_eq!(engine.start(), Err(AudioError::Suspended));
    assert_eq!(engine.state(), PlaybackState::Idle);
    assert!(engine.layers().is_empty());
    assert!(probe.ramps.borrow().is_empty());

    // Policy lifted: the same context starts fine
    probe.refuse_resume.set(false);
    engine.start().unwrap();
    assert_eq!(probe.connects.get(), 1);
}

#[test]
fn failed_layer_build_releases_partial_set() {
    let probe = Rc::new(Probe::default());
    probe.fail_role.set(Some(LayerRole::Sub));
    let mut engine = make_engine(&probe);

    assert_eq!(engine.start(), Err(AudioError::Node("oscillator")));
    assert_eq!(engine.state(), PlaybackState::Idle);
    assert!(engine.layers().is_empty());
    assert_eq!(*probe.released.borrow(), vec![(0, Some(0.0)), (1, Some(0.0))]);
}
