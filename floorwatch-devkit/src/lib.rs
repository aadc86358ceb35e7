/*!
# Floorwatch DevKit - Doubles de test

Bibliothèque facilitant les tests du kernel Floorwatch avec:
- Mock HTTP du machines API (port éphémère, réponses forcées, délais)
- Builders d'entrées JSON et de fixtures CSV
- Harness de test avec logs
*/

pub mod builders;
pub mod mock_api;
pub mod test_utils;

pub use builders::{machines_payload, FixtureCsvBuilder, RecordBuilder};
pub use mock_api::{MockMachinesApi, RecordedRequest};
pub use test_utils::{write_fixture, TestHarness};
