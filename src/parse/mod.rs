//! Inlezen en wegschrijven van de XML-beschrijving.
//!
//! Dit is de attribuutboomlaag: het modelniveau raakt nooit rauwe markup
//! aan. Lezen levert een [`crate::model::Configuration`]; schrijven zet het
//! model terug om naar dezelfde documentvorm.

mod cpacs_xml;

pub use cpacs_xml::{read_configuration, write_configuration, ParseError, ParseResult};
