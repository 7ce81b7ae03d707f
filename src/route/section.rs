/// How a section interprets its aspect list when driven at runtime.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SectionType {
    #[default]
    IndexBased,
    ValueBased,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SectionAspect {
    pub number: i32,
    /// Permitted speed in meters per second; infinite when unmapped.
    pub speed: f64,
}

/// A signalling block created from a section declaration, linked to its neighbours.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub track_position: f64,
    pub aspects: Vec<SectionAspect>,
    pub section_type: SectionType,
    pub current_aspect: Option<usize>,
    pub previous: Option<usize>,
    pub next: Option<usize>,
    pub station: Option<usize>,
    pub invisible: bool,
}

impl Section {
    /// Builds a section, looking each aspect number up in the speed table.
    pub fn from_aspects(
        track_position: f64,
        aspects: &[i32],
        section_type: SectionType,
        signal_speeds: &[f64],
    ) -> Self {
        let aspects = aspects
            .iter()
            .map(|&number| SectionAspect {
                number,
                speed: usize::try_from(number)
                    .ok()
                    .and_then(|i| signal_speeds.get(i).copied())
                    .unwrap_or(f64::INFINITY),
            })
            .collect();
        Self {
            track_position,
            aspects,
            section_type,
            current_aspect: None,
            previous: None,
            next: None,
            station: None,
            invisible: false,
        }
    }
}
