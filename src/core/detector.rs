use fnv::FnvHashMap;
use smallvec::SmallVec;

/// Scroll range of one narrative section, in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerRegion {
    pub index: usize,
    pub start: f32,
    pub end: f32,
}

impl TriggerRegion {
    /// Fraction of the region the trigger line has travelled through.
    pub fn progress(&self, line: f32) -> f32 {
        let span = self.end - self.start;
        if span <= 0.0 {
            return if line >= self.end { 1.0 } else { 0.0 };
        }
        ((line - self.start) / span).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Crossing {
    /// Line moved down past the region start.
    Enter,
    /// Line moved up past the region end.
    EnterBack,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerEvent {
    pub index: usize,
    pub crossing: Crossing,
}

pub type TriggerEvents = SmallVec<[TriggerEvent; 4]>;

/// Turns successive trigger-line positions into boundary crossings.
#[derive(Default)]
pub struct ScrollTracker {
    regions: Vec<TriggerRegion>,
    last_line: Option<f32>,
    published: FnvHashMap<usize, f32>,
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_regions(&mut self, regions: Vec<TriggerRegion>) {
        self.regions = regions;
        self.published.clear();
    }

    pub fn regions(&self) -> &[TriggerRegion] {
        &self.regions
    }

    pub fn last_line(&self) -> Option<f32> {
        self.last_line
    }

    /// Record a new line position and report every boundary it crossed, in scroll
    /// direction order. The very first observation counts as a scroll down from the
    /// top of the document.
    pub fn observe(&mut self, line: f32) -> TriggerEvents {
        let prev = self.last_line.replace(line).unwrap_or(f32::NEG_INFINITY);
        let mut events = TriggerEvents::new();
        if line > prev {
            for r in &self.regions {
                if prev < r.start && line >= r.start {
                    events.push(TriggerEvent {
                        index: r.index,
                        crossing: Crossing::Enter,
                    });
                }
            }
        } else if line < prev {
            for r in self.regions.iter().rev() {
                if prev > r.end && line <= r.end {
                    events.push(TriggerEvent {
                        index: r.index,
                        crossing: Crossing::EnterBack,
                    });
                }
            }
        }
        events
    }

    /// Regions whose progress at `line` differs from the last published value.
    pub fn progress_updates(&mut self, line: f32) -> SmallVec<[(usize, f32); 8]> {
        let mut updates = SmallVec::new();
        for r in &self.regions {
            let p = r.progress(line);
            let changed = self
                .published
                .get(&r.index)
                .map_or(true, |last| (last - p).abs() > 1e-4);
            if changed {
                self.published.insert(r.index, p);
                updates.push((r.index, p));
            }
        }
        updates
    }
}

/// Side effects of a section change.
pub trait SectionSink {
    fn switch_panel(&mut self, index: usize);
    fn set_scroll_hint_visible(&mut self, visible: bool);
    fn transition_audio(&mut self, index: usize);
}

/// Scroll position → de-duplicated section index stream.
///
/// Region triggers may fire in any order and any number of times; downstream effects
/// run once per actual index change.
pub struct SectionDetector<S: SectionSink> {
    tracker: ScrollTracker,
    cursor: Option<usize>,
    sink: S,
}

impl<S: SectionSink> SectionDetector<S> {
    pub fn new(sink: S) -> Self {
        Self {
            tracker: ScrollTracker::new(),
            cursor: None,
            sink,
        }
    }

    /// Install the trigger regions, one per section, in scroll order.
    pub fn register(&mut self, regions: Vec<TriggerRegion>) {
        log::info!("[sections] registered {} trigger regions", regions.len());
        self.tracker.set_regions(regions);
    }

    /// Replace region boundaries after a layout change and re-evaluate the last line.
    pub fn refresh(&mut self, regions: Vec<TriggerRegion>) -> usize {
        let line = self.tracker.last_line();
        self.tracker.set_regions(regions);
        match line {
            Some(line) => {
                let target = self
                    .tracker
                    .regions()
                    .iter()
                    .filter(|r| r.start <= line && line <= r.end)
                    .map(|r| r.index)
                    .last();
                match target {
                    Some(index) => usize::from(self.set_active_section(index)),
                    None => 0,
                }
            }
            None => 0,
        }
    }

    /// Feed a trigger-line position. Returns how many section changes it caused.
    pub fn observe(&mut self, line: f32) -> usize {
        let events = self.tracker.observe(line);
        events
            .into_iter()
            .filter(|ev| self.handle(*ev))
            .count()
    }

    pub fn handle(&mut self, event: TriggerEvent) -> bool {
        log::debug!("[sections] {:?} region {}", event.crossing, event.index);
        self.set_active_section(event.index)
    }

    pub fn set_active_section(&mut self, index: usize) -> bool {
        if self.cursor == Some(index) {
            return false;
        }
        self.cursor = Some(index);
        log::info!("[sections] active section -> {}", index);
        self.sink.switch_panel(index);
        self.sink.set_scroll_hint_visible(index == 0);
        self.sink.transition_audio(index);
        true
    }

    pub fn progress_updates(&mut self) -> SmallVec<[(usize, f32); 8]> {
        match self.tracker.last_line() {
            Some(line) => self.tracker.progress_updates(line),
            None => SmallVec::new(),
        }
    }

    pub fn current(&self) -> Option<usize> {
        self.cursor
    }

    pub fn tracker(&self) -> &ScrollTracker {
        &self.tracker
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
