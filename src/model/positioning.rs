//! Positioneringen: plaatsing van secties via lengte-, pijl- en
//! dihedraalhoeken in een gerichte, acyclische keten.

use std::collections::HashMap;

use crate::geom::{Transform, Vec3};

use super::ModelError;

/// Plaatst de `to`-sectie relatief ten opzichte van een eerder geplaatste
/// `from`-sectie. Zonder `from` werkt de verschuiving vanaf de oorsprong van
/// de component.
#[derive(Debug, Clone, PartialEq)]
pub struct Positioning {
    uid: String,
    from_section_uid: Option<String>,
    to_section_uid: String,
    length: f64,
    sweep_deg: f64,
    dihedral_deg: f64,
}

impl Positioning {
    #[must_use]
    pub fn new(
        uid: &str,
        from_section_uid: Option<&str>,
        to_section_uid: &str,
        length: f64,
        sweep_deg: f64,
        dihedral_deg: f64,
    ) -> Self {
        Self {
            uid: uid.to_owned(),
            from_section_uid: from_section_uid.map(str::to_owned),
            to_section_uid: to_section_uid.to_owned(),
            length,
            sweep_deg,
            dihedral_deg,
        }
    }

    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    #[must_use]
    pub fn from_section_uid(&self) -> Option<&str> {
        self.from_section_uid.as_deref()
    }

    #[must_use]
    pub fn to_section_uid(&self) -> &str {
        &self.to_section_uid
    }

    #[must_use]
    pub const fn length(&self) -> f64 {
        self.length
    }

    #[must_use]
    pub const fn sweep(&self) -> f64 {
        self.sweep_deg
    }

    #[must_use]
    pub const fn dihedral(&self) -> f64 {
        self.dihedral_deg
    }

    pub(crate) fn set_parameters(&mut self, length: f64, sweep_deg: f64, dihedral_deg: f64) {
        self.length = length;
        self.sweep_deg = sweep_deg;
        self.dihedral_deg = dihedral_deg;
    }

    /// Verschuivingsvector van deze stap: lengte `l`, pijlhoek `φ` en
    /// dihedraal `ν` geven `(l·sin φ, l·cos φ·cos ν, l·cos φ·sin ν)`.
    #[must_use]
    pub fn offset(&self) -> Vec3 {
        let sweep = self.sweep_deg.to_radians();
        let dihedral = self.dihedral_deg.to_radians();
        Vec3::new(
            self.length * sweep.sin(),
            self.length * sweep.cos() * dihedral.cos(),
            self.length * sweep.cos() * dihedral.sin(),
        )
    }
}

/// De positioneringsketen van een component.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Positionings {
    items: Vec<Positioning>,
}

impl Positionings {
    /// Valideert dat elke sectie hoogstens één inkomende positionering heeft
    /// en dat de keten geen cyclus bevat.
    pub fn new(items: Vec<Positioning>) -> Result<Self, ModelError> {
        let mut incoming: HashMap<&str, &Positioning> = HashMap::new();
        for p in &items {
            if incoming.insert(p.to_section_uid(), p).is_some() {
                return Err(ModelError::DuplicatePositioning {
                    uid: p.to_section_uid().to_owned(),
                });
            }
        }

        // ketenwandeling vanaf elke sectie; een bezochte sectie opnieuw
        // tegenkomen betekent een cyclus
        for start in incoming.keys() {
            let mut seen: Vec<&str> = Vec::new();
            let mut current: Option<&str> = Some(start);
            while let Some(uid) = current {
                if seen.contains(&uid) {
                    return Err(ModelError::PositioningCycle {
                        uid: uid.to_owned(),
                    });
                }
                seen.push(uid);
                current = incoming.get(uid).and_then(|p| p.from_section_uid());
            }
        }

        Ok(Self { items })
    }

    #[must_use]
    pub fn items(&self) -> &[Positioning] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn items_mut(&mut self) -> &mut [Positioning] {
        &mut self.items
    }

    /// Geaccumuleerde verschuiving voor `section_uid` langs de keten naar de
    /// wortel. Secties zonder positionering liggen op de oorsprong.
    #[must_use]
    pub fn section_translation(&self, section_uid: &str) -> Vec3 {
        let mut total = Vec3::ZERO;
        let mut current = Some(section_uid);
        while let Some(uid) = current {
            let Some(p) = self.items.iter().find(|p| p.to_section_uid() == uid) else {
                break;
            };
            total = total + p.offset();
            current = p.from_section_uid();
        }
        total
    }

    /// Positioneringstransformatie (zuivere translatie) voor een sectie.
    #[must_use]
    pub fn transformation_for(&self, section_uid: &str) -> Transform {
        Transform::translate(self.section_translation(section_uid))
    }
}
