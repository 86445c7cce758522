//! UID-registry: modelbrede, getypeerde opzoektabel voor kruisverwijzingen.
//!
//! Het register bezit de geregistreerde objecten niet; het slaat uitsluitend
//! getypeerde indexpaden op (relatie + opzoeking). Registratie dwingt
//! uniciteit af; resolutie faalt expliciet wanneer een uid ontbreekt of het
//! doel niet de verwachte soort heeft.

use std::collections::HashMap;

use levenshtein::levenshtein;
use thiserror::Error;
use wildmatch::WildMatch;

/// Getypeerd indexpad naar een modelobject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UidTarget {
    Profile {
        profile: usize,
    },
    Component {
        component: usize,
    },
    Section {
        component: usize,
        section: usize,
    },
    Element {
        component: usize,
        section: usize,
        element: usize,
    },
    Segment {
        component: usize,
        segment: usize,
    },
    ComponentSegment {
        component: usize,
        component_segment: usize,
    },
    Device {
        component: usize,
        component_segment: usize,
        device: usize,
    },
}

impl UidTarget {
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Profile { .. } => "profiel",
            Self::Component { .. } => "component",
            Self::Section { .. } => "sectie",
            Self::Element { .. } => "element",
            Self::Segment { .. } => "segment",
            Self::ComponentSegment { .. } => "componentsegment",
            Self::Device { .. } => "stuurvlak",
        }
    }
}

/// Fouten bij registratie en resolutie.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("uid `{uid}` is al geregistreerd")]
    DuplicateIdentifier { uid: String },
    #[error("onopgeloste referentie `{uid}`: {expected} verwacht{}", suggestion_text(.suggestion))]
    UnresolvedReference {
        uid: String,
        expected: &'static str,
        suggestion: Option<String>,
    },
}

fn suggestion_text(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (bedoelde u `{s}`?)"),
        None => String::new(),
    }
}

/// Maximale bewerkingsafstand waarvoor nog een suggestie wordt gedaan.
const SUGGESTION_DISTANCE: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct UidRegistry {
    entries: HashMap<String, UidTarget>,
}

impl UidRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registreert `uid`. Faalt wanneer de uid al bestaat.
    pub fn register(&mut self, uid: &str, target: UidTarget) -> Result<(), RegistryError> {
        if self.entries.contains_key(uid) {
            return Err(RegistryError::DuplicateIdentifier {
                uid: uid.to_owned(),
            });
        }
        self.entries.insert(uid.to_owned(), target);
        Ok(())
    }

    /// Verwijdert een registratie. Retourneert of de uid aanwezig was.
    pub fn unregister(&mut self, uid: &str) -> bool {
        self.entries.remove(uid).is_some()
    }

    #[must_use]
    pub fn contains(&self, uid: &str) -> bool {
        self.entries.contains_key(uid)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ongetypeerde opzoeking.
    #[must_use]
    pub fn lookup(&self, uid: &str) -> Option<UidTarget> {
        self.entries.get(uid).copied()
    }

    /// Alle uids die het glob-patroon matchen, gesorteerd.
    #[must_use]
    pub fn find_uids(&self, pattern: &str) -> Vec<&str> {
        let matcher = WildMatch::new(pattern);
        let mut hits: Vec<&str> = self
            .entries
            .keys()
            .filter(|uid| matcher.matches(uid))
            .map(String::as_str)
            .collect();
        hits.sort_unstable();
        hits
    }

    fn unresolved(&self, uid: &str, expected: &'static str) -> RegistryError {
        RegistryError::UnresolvedReference {
            uid: uid.to_owned(),
            expected,
            suggestion: self.suggest(uid),
        }
    }

    /// De dichtstbijzijnde bekende uid, als die dichtbij genoeg ligt.
    fn suggest(&self, uid: &str) -> Option<String> {
        self.entries
            .keys()
            .map(|known| (levenshtein(uid, known), known))
            .filter(|(dist, _)| *dist <= SUGGESTION_DISTANCE)
            .min_by_key(|(dist, known)| (*dist, known.clone()))
            .map(|(_, known)| known.clone())
    }

    pub fn resolve_profile(&self, uid: &str) -> Result<usize, RegistryError> {
        match self.lookup(uid) {
            Some(UidTarget::Profile { profile }) => Ok(profile),
            _ => Err(self.unresolved(uid, "profiel")),
        }
    }

    pub fn resolve_component(&self, uid: &str) -> Result<usize, RegistryError> {
        match self.lookup(uid) {
            Some(UidTarget::Component { component }) => Ok(component),
            _ => Err(self.unresolved(uid, "component")),
        }
    }

    pub fn resolve_section(&self, uid: &str) -> Result<(usize, usize), RegistryError> {
        match self.lookup(uid) {
            Some(UidTarget::Section { component, section }) => Ok((component, section)),
            _ => Err(self.unresolved(uid, "sectie")),
        }
    }

    pub fn resolve_segment(&self, uid: &str) -> Result<(usize, usize), RegistryError> {
        match self.lookup(uid) {
            Some(UidTarget::Segment { component, segment }) => Ok((component, segment)),
            _ => Err(self.unresolved(uid, "segment")),
        }
    }

    pub fn resolve_element(&self, uid: &str) -> Result<(usize, usize, usize), RegistryError> {
        match self.lookup(uid) {
            Some(UidTarget::Element {
                component,
                section,
                element,
            }) => Ok((component, section, element)),
            _ => Err(self.unresolved(uid, "element")),
        }
    }

    pub fn resolve_device(&self, uid: &str) -> Result<(usize, usize, usize), RegistryError> {
        match self.lookup(uid) {
            Some(UidTarget::Device {
                component,
                component_segment,
                device,
            }) => Ok((component, component_segment, device)),
            _ => Err(self.unresolved(uid, "stuurvlak")),
        }
    }

    pub fn resolve_component_segment(&self, uid: &str) -> Result<(usize, usize), RegistryError> {
        match self.lookup(uid) {
            Some(UidTarget::ComponentSegment {
                component,
                component_segment,
            }) => Ok((component, component_segment)),
            _ => Err(self.unresolved(uid, "componentsegment")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_wing() -> UidRegistry {
        let mut registry = UidRegistry::new();
        registry
            .register("wing", UidTarget::Component { component: 0 })
            .unwrap();
        registry
            .register(
                "wing_sec1",
                UidTarget::Section {
                    component: 0,
                    section: 0,
                },
            )
            .unwrap();
        registry
            .register(
                "wing_seg1",
                UidTarget::Segment {
                    component: 0,
                    segment: 0,
                },
            )
            .unwrap();
        registry
    }

    #[test]
    fn duplicate_registration_errors() {
        let mut registry = registry_with_wing();
        let err = registry
            .register("wing", UidTarget::Component { component: 1 })
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateIdentifier {
                uid: "wing".to_owned()
            }
        );
    }

    #[test]
    fn typed_resolution_succeeds() {
        let registry = registry_with_wing();
        assert_eq!(registry.resolve_component("wing").unwrap(), 0);
        assert_eq!(registry.resolve_section("wing_sec1").unwrap(), (0, 0));
        assert_eq!(registry.resolve_segment("wing_seg1").unwrap(), (0, 0));
    }

    #[test]
    fn wrong_kind_counts_as_unresolved() {
        let registry = registry_with_wing();
        let err = registry.resolve_segment("wing_sec1").unwrap_err();
        assert!(matches!(
            err,
            RegistryError::UnresolvedReference { expected: "segment", .. }
        ));
    }

    #[test]
    fn missing_uid_suggests_nearest() {
        let registry = registry_with_wing();
        let err = registry.resolve_section("wing_sec2").unwrap_err();
        match err {
            RegistryError::UnresolvedReference { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("wing_sec1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn distant_uid_gets_no_suggestion() {
        let registry = registry_with_wing();
        let err = registry.resolve_profile("fuselage_profile_naca").unwrap_err();
        assert!(matches!(
            err,
            RegistryError::UnresolvedReference {
                suggestion: None,
                ..
            }
        ));
    }

    #[test]
    fn unregister_frees_the_uid() {
        let mut registry = registry_with_wing();
        assert!(registry.unregister("wing_seg1"));
        assert!(!registry.unregister("wing_seg1"));
        assert!(
            registry
                .register("wing_seg1", UidTarget::Segment { component: 0, segment: 3 })
                .is_ok()
        );
    }

    #[test]
    fn glob_lookup_is_sorted() {
        let registry = registry_with_wing();
        assert_eq!(registry.find_uids("wing_*"), vec!["wing_sec1", "wing_seg1"]);
        assert!(registry.find_uids("tail*").is_empty());
    }
}
