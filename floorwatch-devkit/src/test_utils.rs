/*!
Test Harness Floorwatch

Démarre un mock du machines API, initialise les logs et fournit de quoi
écrire la fixture CSV sur disque pour les tests d'intégration du kernel.
*/

use crate::builders::{machines_payload, FixtureCsvBuilder};
use crate::mock_api::MockMachinesApi;
use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct TestHarness {
    pub api: MockMachinesApi,
}

impl TestHarness {
    /// Mock vide, logs initialisés
    pub async fn start() -> Result<Self> {
        env_logger::try_init().ok();
        let api = MockMachinesApi::start().await?;
        Ok(Self { api })
    }

    /// Mock préchargé avec `machines`
    pub async fn with_machines(machines: Vec<Value>) -> Result<Self> {
        let harness = Self::start().await?;
        log::info!("[HARNESS] loading {} machines", machines.len());
        harness.api.set_machines(machines);
        Ok(harness)
    }

    pub fn base_url(&self) -> String {
        self.api.base_url()
    }

    /// Force une réponse malformée (JSON invalide, status 200)
    pub fn serve_malformed(&self) {
        self.api.respond_with(200, "[{\"productId\":");
    }

    /// Force un status d'erreur
    pub fn serve_status(&self, status: u16) {
        self.api.respond_with(status, "{\"error\":\"simulated\"}");
    }

    pub fn serve_payload(&self, machines: &[Value]) {
        self.api.respond_with(200, machines_payload(machines));
    }

    /// Attend que le mock ait reçu au moins `count` requêtes
    pub async fn wait_for_requests(&self, count: usize, timeout_ms: u64) -> bool {
        let start = std::time::Instant::now();
        while start.elapsed() < Duration::from_millis(timeout_ms) {
            if self.api.request_count() >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        log::warn!("[HARNESS] timeout waiting for {} requests", count);
        false
    }
}

/// Écrit la fixture dans `dir` et renvoie son chemin
pub fn write_fixture(dir: &Path, fixture: &FixtureCsvBuilder) -> Result<PathBuf> {
    let path = dir.join("machine_data.csv");
    std::fs::write(&path, fixture.build())?;
    log::info!("[HARNESS] fixture written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_harness_starts_mock() {
        let harness = TestHarness::start().await.unwrap();
        assert!(harness.base_url().starts_with("http://127.0.0.1:"));
        assert!(!harness.wait_for_requests(1, 30).await);
    }

    #[test]
    fn test_write_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = FixtureCsvBuilder::new().raw_row(&["1", "M1"]);
        let path = write_fixture(dir.path(), &fixture).unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.ends_with("1,M1\n"));
    }
}
