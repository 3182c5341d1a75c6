use clap::Subcommand;
use miette::Result;

use crate::{
    meilisearch::{task_uid, TaskId},
    Meilisearch,
};

#[derive(Debug, Subcommand)]
pub enum DumpCommand {
    /// Trigger the creation of a dump.
    Create,
    /// Gets the status of a dump creation.
    GetStatus {
        /// The uid of the task of the dump creation
        uid: TaskId,
    },
}

impl DumpCommand {
    pub fn execute(self, meili: Meilisearch) -> Result<()> {
        match self {
            DumpCommand::Create => meili.create_dump(),
            DumpCommand::GetStatus { uid } => meili.dump_status(uid),
        }
    }
}

impl Meilisearch {
    fn create_dump(&self) -> Result<()> {
        let task = self.send(self.post(format!("{}/dumps", self.addr)), "Creating dump...")?;
        match task_uid(&task) {
            Some(uid) if self.wait => {
                let task = self.wait_for_task(uid)?;
                self.display("Dump", &task)
            }
            _ => self.display("Dump", &task),
        }
    }

    fn dump_status(&self, uid: TaskId) -> Result<()> {
        let status = self.send(
            self.get(format!("{}/tasks/{}", self.addr, uid)),
            "Getting dump status...",
        )?;
        self.display("Dump Status", &status)
    }
}
