use thiserror::Error;

/// Audio timbre for one narrative section.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionConfig {
    pub index: usize,
    pub name: &'static str,
    pub base_frequency: f32,
    pub volume: f32,
    pub detune_cents: f32,
}

pub const DEFAULT_SECTIONS: [SectionConfig; 6] = [
    SectionConfig {
        index: 0,
        name: "Opening",
        base_frequency: 55.0,
        volume: 0.12,
        detune_cents: 0.0,
    },
    SectionConfig {
        index: 1,
        name: "Encounter",
        base_frequency: 65.0,
        volume: 0.14,
        detune_cents: 5.0,
    },
    SectionConfig {
        index: 2,
        name: "Waiting",
        base_frequency: 60.0,
        volume: 0.13,
        detune_cents: -5.0,
    },
    SectionConfig {
        index: 3,
        name: "Near",
        base_frequency: 70.0,
        volume: 0.15,
        detune_cents: 10.0,
    },
    SectionConfig {
        index: 4,
        name: "Embrace",
        base_frequency: 50.0,
        volume: 0.16,
        detune_cents: 0.0,
    },
    SectionConfig {
        index: 5,
        name: "Reflection",
        base_frequency: 80.0,
        volume: 0.10,
        detune_cents: 15.0,
    },
];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SectionTableError {
    #[error("section table is empty")]
    Empty,
    #[error("section at position {position} carries index {index}")]
    OutOfOrder { position: usize, index: usize },
    #[error("section {0} has a non-positive base frequency")]
    BadFrequency(usize),
    #[error("section {0} volume is outside 0..=1")]
    BadVolume(usize),
}

/// Ordered, immutable section table. Position in the table is the section index.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionTable {
    entries: Vec<SectionConfig>,
}

impl SectionTable {
    pub fn new(entries: Vec<SectionConfig>) -> Result<Self, SectionTableError> {
        if entries.is_empty() {
            return Err(SectionTableError::Empty);
        }
        for (position, s) in entries.iter().enumerate() {
            if s.index != position {
                return Err(SectionTableError::OutOfOrder {
                    position,
                    index: s.index,
                });
            }
            if !(s.base_frequency > 0.0) {
                return Err(SectionTableError::BadFrequency(position));
            }
            if !(0.0..=1.0).contains(&s.volume) {
                return Err(SectionTableError::BadVolume(position));
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, index: usize) -> Option<&SectionConfig> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionConfig> {
        self.entries.iter()
    }
}

impl Default for SectionTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_SECTIONS.to_vec(),
        }
    }
}

/// Number of sections every consumer can serve. Scenes, panels and audio configs are
/// counted independently on the page; indices past the smallest count are ignored by
/// whichever consumer lacks them.
pub fn usable_section_count(scenes: usize, panels: usize, configs: usize) -> usize {
    scenes.min(panels).min(configs)
}
