use miette::Result;

use crate::Meilisearch;

impl Meilisearch {
    pub fn healthcheck(&self) -> Result<()> {
        let health = self.send(
            self.get(format!("{}/health", self.addr)),
            "Getting server status...",
        )?;
        self.display("Health", &health)
    }

    pub fn version(&self) -> Result<()> {
        let version = self.send(
            self.get(format!("{}/version", self.addr)),
            "Getting version...",
        )?;
        self.display("Version Information", &version)
    }

    pub fn get_keys(&self) -> Result<()> {
        let keys = self.send(self.get(format!("{}/keys", self.addr)), "Getting keys...")?;
        match keys.get("results") {
            Some(results) if !self.raw => self.display("Keys", results),
            _ => self.display("Keys", &keys),
        }
    }

    pub fn stats(&self) -> Result<()> {
        let stats = self.send(self.get(format!("{}/stats", self.addr)), "Getting stats...")?;
        self.display("All Stats", &stats)
    }
}
