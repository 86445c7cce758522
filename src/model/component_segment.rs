//! Componentsegmenten: een aaneengesloten reeks segmenten met één
//! genormaliseerde eta/xsi-ruimte, en de stuurvlakken die daarin verankerd
//! zijn.

use super::device::ControlSurfaceDevice;
use super::segment::Segment;
use super::ModelError;

/// Overspant een aaneengesloten segmentreeks van een component.
///
/// De globale eta wordt bij queries herverdeeld over de onderliggende
/// segmenten naar rato van hun spanwijdte; de reeks zelf wordt bij
/// constructie opgelost en vastgelegd als segmentindices.
#[derive(Debug, Clone)]
pub struct ComponentSegment {
    uid: String,
    name: String,
    from_section_uid: String,
    to_section_uid: String,
    devices: Vec<ControlSurfaceDevice>,
    segment_indices: Vec<usize>,
}

impl ComponentSegment {
    #[must_use]
    pub fn new(
        uid: &str,
        name: &str,
        from_section_uid: &str,
        to_section_uid: &str,
        devices: Vec<ControlSurfaceDevice>,
    ) -> Self {
        Self {
            uid: uid.to_owned(),
            name: name.to_owned(),
            from_section_uid: from_section_uid.to_owned(),
            to_section_uid: to_section_uid.to_owned(),
            devices,
            segment_indices: Vec::new(),
        }
    }

    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn from_section_uid(&self) -> &str {
        &self.from_section_uid
    }

    #[must_use]
    pub fn to_section_uid(&self) -> &str {
        &self.to_section_uid
    }

    #[must_use]
    pub fn devices(&self) -> &[ControlSurfaceDevice] {
        &self.devices
    }

    pub(crate) fn devices_mut(&mut self) -> &mut [ControlSurfaceDevice] {
        &mut self.devices
    }

    pub fn device(&self, index: usize) -> Result<&ControlSurfaceDevice, ModelError> {
        self.devices.get(index).ok_or(ModelError::NotFound {
            entity: "stuurvlak",
            key: index.to_string(),
        })
    }

    /// De opgeloste, aaneengesloten segmentindices (van → naar).
    #[must_use]
    pub fn segment_indices(&self) -> &[usize] {
        &self.segment_indices
    }

    /// Zoekt de aaneengesloten segmentreeks van `from_section_uid` naar
    /// `to_section_uid`. Faalt wanneer de reeks niet bestaat of een gat heeft.
    pub(crate) fn resolve_segments(&mut self, segments: &[Segment]) -> Result<(), ModelError> {
        let mut run = Vec::new();
        let mut cursor: &str = &self.from_section_uid;

        while cursor != self.to_section_uid {
            let next = segments
                .iter()
                .position(|seg| seg.from_section_uid() == cursor)
                .ok_or_else(|| ModelError::NonContiguousRun {
                    uid: self.uid.clone(),
                })?;
            if run.contains(&next) {
                // beschermt tegen segmentlussen die nooit het einde bereiken
                return Err(ModelError::NonContiguousRun {
                    uid: self.uid.clone(),
                });
            }
            run.push(next);
            cursor = segments[next].to_section_uid();
        }

        if run.is_empty() {
            return Err(ModelError::NonContiguousRun {
                uid: self.uid.clone(),
            });
        }
        self.segment_indices = run;
        Ok(())
    }
}
