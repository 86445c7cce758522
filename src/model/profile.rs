//! Profielbibliotheek: genormaliseerde, gesloten doorsnedecurves.
//!
//! Een profiel komt binnen als puntenlus (achterrand → onderzijde →
//! voorrand → bovenzijde → achterrand) en wordt bij constructie gesplitst en
//! opnieuw bemonsterd op cosinus-verdeelde koordestations. Beide zijden delen
//! daardoor exact dezelfde stations, wat verderop regeloppervlakken met
//! gelijke rails mogelijk maakt.

use log::warn;

use crate::geom::{Point3, Tolerance, Wire};

use super::ModelError;

/// Aantal koordestations waarop profielzijden bemonsterd worden.
pub const CHORD_STATIONS: usize = 33;

/// Cosinus-verdeelde stations over `[0, 1]`, dichter bemonsterd bij voor- en
/// achterrand.
#[must_use]
pub fn chord_stations() -> Vec<f64> {
    (0..CHORD_STATIONS)
        .map(|i| {
            let t = i as f64 / (CHORD_STATIONS - 1) as f64;
            (1.0 - (std::f64::consts::PI * t).cos()) / 2.0
        })
        .collect()
}

/// Een genormaliseerd doorsnedeprofiel.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    uid: String,
    name: String,
    points: Vec<Point3>,
    stations: Vec<f64>,
    upper: Vec<Point3>,
    lower: Vec<Point3>,
}

impl Profile {
    /// Bouwt een profiel uit de ruwe puntenlus.
    pub fn new(uid: &str, name: &str, points: Vec<Point3>) -> Result<Self, ModelError> {
        if points.len() < 4 {
            return Err(ModelError::InvalidProfile {
                uid: uid.to_owned(),
                reason: "minimaal vier punten vereist".to_owned(),
            });
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(ModelError::InvalidProfile {
                uid: uid.to_owned(),
                reason: "punten moeten eindig zijn".to_owned(),
            });
        }

        let (le_idx, _) = points
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap_or((0, &points[0]));
        let x_le = points[le_idx].x;
        let x_te = points
            .iter()
            .map(|p| p.x)
            .fold(f64::NEG_INFINITY, f64::max);
        if x_te - x_le <= Tolerance::ZERO_LENGTH.eps {
            return Err(ModelError::InvalidProfile {
                uid: uid.to_owned(),
                reason: "koorde heeft geen lengte".to_owned(),
            });
        }

        // splitsen bij de voorrand; beide zijden lopen daarna voorrand → achterrand
        let mut side_a: Vec<Point3> = points[..=le_idx].to_vec();
        side_a.reverse();
        let mut side_b: Vec<Point3> = points[le_idx..].to_vec();
        side_b.push(points[0]);

        if side_a.len() < 2 || side_b.len() < 2 {
            return Err(ModelError::InvalidProfile {
                uid: uid.to_owned(),
                reason: "voorrand ligt op het eerste of laatste punt".to_owned(),
            });
        }
        if side_b.len() >= 2 {
            let n = side_b.len();
            if side_b[n - 1].distance(side_b[n - 2]) <= Tolerance::WELD.eps {
                side_b.pop();
            }
        }

        let stations = chord_stations();
        let sampled_a = resample_side(&side_a, &stations, x_le, x_te);
        let sampled_b = resample_side(&side_b, &stations, x_le, x_te);

        // de zijde met de hogere gemiddelde z is de bovenzijde
        let mean = |pts: &[Point3]| pts.iter().map(|p| p.z).sum::<f64>() / pts.len() as f64;
        let (upper, lower) = if mean(&sampled_a) >= mean(&sampled_b) {
            (sampled_a, sampled_b)
        } else {
            (sampled_b, sampled_a)
        };

        Ok(Self {
            uid: uid.to_owned(),
            name: name.to_owned(),
            points,
            stations,
            upper,
            lower,
        })
    }

    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// De ruwe puntenlus zoals ingelezen.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn stations(&self) -> &[f64] {
        &self.stations
    }

    #[must_use]
    pub fn sampled_upper(&self) -> &[Point3] {
        &self.upper
    }

    #[must_use]
    pub fn sampled_lower(&self) -> &[Point3] {
        &self.lower
    }

    /// Punt op de bovenzijde bij koordefractie `xsi ∈ [0, 1]`.
    #[must_use]
    pub fn upper_point(&self, xsi: f64) -> Point3 {
        interpolate_side(&self.stations, &self.upper, clamp_param(xsi, "xsi"))
    }

    /// Punt op de onderzijde bij koordefractie `xsi ∈ [0, 1]`.
    #[must_use]
    pub fn lower_point(&self, xsi: f64) -> Point3 {
        interpolate_side(&self.stations, &self.lower, clamp_param(xsi, "xsi"))
    }

    /// Punt op de koordelijn (midden tussen boven- en onderzijde).
    #[must_use]
    pub fn chord_point(&self, xsi: f64) -> Point3 {
        self.upper_point(xsi).lerp(self.lower_point(xsi), 0.5)
    }

    /// Gesloten profieldraad uit de bemonsterde zijden: achterrand langs de
    /// onderzijde naar de voorrand en over de bovenzijde terug.
    pub fn wire(&self) -> Result<Wire, ModelError> {
        let mut loop_points: Vec<Point3> = self.lower.iter().rev().copied().collect();
        loop_points.extend(self.upper.iter().skip(1));
        Wire::closed(loop_points).map_err(|source| ModelError::Geometry {
            context: format!("profiel `{}`", self.uid),
            source,
        })
    }
}

/// Klemt een parameter op `[0, 1]` met een waarschuwing buiten de tolerantie.
pub(crate) fn clamp_param(value: f64, name: &str) -> f64 {
    if value < -Tolerance::PARAM.eps || value > 1.0 + Tolerance::PARAM.eps {
        warn!("{name} = {value} ligt buiten [0,1] en wordt geklemd");
    }
    value.clamp(0.0, 1.0)
}

/// Bemonstert een zijde (voorrand → achterrand) op de gegeven stations.
fn resample_side(side: &[Point3], stations: &[f64], x_le: f64, x_te: f64) -> Vec<Point3> {
    // zijde zo oriënteren dat x toeneemt
    let mut pts: Vec<Point3> = side.to_vec();
    if pts.first().map(|p| p.x) > pts.last().map(|p| p.x) {
        pts.reverse();
    }

    stations
        .iter()
        .map(|&s| {
            let target = x_le + s * (x_te - x_le);
            sample_at_x(&pts, target)
        })
        .collect()
}

/// Eerste snijpunt van de polylijn met de verticale lijn `x = target`.
fn sample_at_x(pts: &[Point3], target: f64) -> Point3 {
    if target <= pts[0].x {
        return pts[0];
    }
    for w in pts.windows(2) {
        let (a, b) = (w[0], w[1]);
        if (a.x <= target && target <= b.x) || (b.x <= target && target <= a.x) {
            let span = b.x - a.x;
            if span.abs() <= Tolerance::ZERO_LENGTH.eps {
                return a;
            }
            return a.lerp(b, (target - a.x) / span);
        }
    }
    *pts.last().unwrap_or(&pts[0])
}

/// Lineaire interpolatie van bemonsterde zijdepunten op station `xsi`.
fn interpolate_side(stations: &[f64], samples: &[Point3], xsi: f64) -> Point3 {
    let mut idx = match stations
        .binary_search_by(|s| s.partial_cmp(&xsi).unwrap_or(std::cmp::Ordering::Less))
    {
        Ok(i) => i,
        Err(i) => i.saturating_sub(1),
    };
    idx = idx.min(stations.len() - 2);
    let s0 = stations[idx];
    let s1 = stations[idx + 1];
    let local = if s1 > s0 { (xsi - s0) / (s1 - s0) } else { 0.0 };
    samples[idx].lerp(samples[idx + 1], local.clamp(0.0, 1.0))
}

/// Geordende verzameling profielen, opgezocht via uid.
#[derive(Debug, Clone, Default)]
pub struct ProfileLibrary {
    items: Vec<Profile>,
}

impl ProfileLibrary {
    #[must_use]
    pub fn new(items: Vec<Profile>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn items(&self) -> &[Profile] {
        &self.items
    }

    pub fn by_uid(&self, uid: &str) -> Result<&Profile, ModelError> {
        self.items
            .iter()
            .find(|p| p.uid() == uid)
            .ok_or_else(|| ModelError::NotFound {
                entity: "profiel",
                key: uid.to_owned(),
            })
    }

    pub fn by_index(&self, index: usize) -> Result<&Profile, ModelError> {
        self.items.get(index).ok_or(ModelError::NotFound {
            entity: "profiel",
            key: index.to_string(),
        })
    }

    /// Vervangt de puntenlus van een profiel.
    pub fn replace_points(&mut self, uid: &str, points: Vec<Point3>) -> Result<(), ModelError> {
        let idx = self
            .items
            .iter()
            .position(|p| p.uid() == uid)
            .ok_or_else(|| ModelError::NotFound {
                entity: "profiel",
                key: uid.to_owned(),
            })?;
        let name = self.items[idx].name().to_owned();
        self.items[idx] = Profile::new(uid, &name, points)?;
        Ok(())
    }
}

/// Vierpunts-diamantprofiel voor tests: scherpe voor- en achterrand.
#[cfg(test)]
pub(crate) fn diamond_profile(uid: &str) -> Profile {
    Profile::new(
        uid,
        "diamant",
        vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 0.0, -0.1),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.5, 0.0, 0.1),
        ],
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stations_cover_unit_interval() {
        let stations = chord_stations();
        assert_eq!(stations.len(), CHORD_STATIONS);
        assert_eq!(stations[0], 0.0);
        assert!((stations[CHORD_STATIONS - 1] - 1.0).abs() < 1e-12);
        assert!(stations.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn diamond_splits_into_upper_and_lower() {
        let profile = diamond_profile("prof");
        assert!(profile.upper_point(0.5).z > 0.0);
        assert!(profile.lower_point(0.5).z < 0.0);
        // voor- en achterrand zijn scherp
        assert_eq!(profile.upper_point(0.0), profile.lower_point(0.0));
        assert!(
            profile
                .upper_point(1.0)
                .distance(profile.lower_point(1.0))
                < 1e-12
        );
    }

    #[test]
    fn chord_point_is_midway() {
        let profile = diamond_profile("prof");
        let mid = profile.chord_point(0.5);
        assert!((mid.z - 0.0).abs() < 1e-12);
        assert!((mid.x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn interpolation_matches_raw_geometry() {
        // de diamant is lineair per zijde: z = 0.2·xsi onder xsi=0.5, daarboven gespiegeld
        let profile = diamond_profile("prof");
        let p = profile.upper_point(0.25);
        assert!((p.z - 0.05).abs() < 1e-9);
        let p = profile.upper_point(0.75);
        assert!((p.z - 0.05).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_xsi_clamps() {
        let profile = diamond_profile("prof");
        assert_eq!(profile.upper_point(-0.2), profile.upper_point(0.0));
        assert_eq!(profile.upper_point(1.7), profile.upper_point(1.0));
    }

    #[test]
    fn too_few_points_rejected() {
        let err = Profile::new("p", "kapot", vec![Point3::ORIGIN; 3]);
        assert!(matches!(err, Err(ModelError::InvalidProfile { .. })));
    }

    #[test]
    fn zero_chord_rejected() {
        let err = Profile::new(
            "p",
            "kapot",
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(0.0, 0.0, 2.0),
                Point3::new(0.0, 0.0, 3.0),
            ],
        );
        assert!(matches!(err, Err(ModelError::InvalidProfile { .. })));
    }

    #[test]
    fn profile_wire_is_closed() {
        let profile = diamond_profile("prof");
        let wire = profile.wire().unwrap();
        assert!(wire.is_closed());
        // onderzijde achteraan, bovenzijde terug: 2·N − 2 unieke punten als
        // beide randen scherp zijn, maar de bemonstering deelt alleen de
        // voorrand expliciet
        assert!(wire.point_count() >= CHORD_STATIONS);
    }
}
