//! One-time provisioning of the remote assistant resource.

use std::path::Path;

use tracing::info;

use wabridge_types::assistant::{Assistant, AssistantDefinition, AssistantError, UploadedFile};

use crate::assistant::api::AssistantAdmin;

/// Uploads knowledge files and creates or inspects assistant resources.
pub struct Provisioner<A: AssistantAdmin> {
    admin: A,
}

impl<A: AssistantAdmin> Provisioner<A> {
    pub fn new(admin: A) -> Self {
        Self { admin }
    }

    pub async fn upload_knowledge_file(&self, path: &Path) -> Result<UploadedFile, AssistantError> {
        let file = self.admin.upload_file(path).await?;
        info!(file_id = %file.id, filename = %file.filename, bytes = file.bytes, "Uploaded knowledge file");
        Ok(file)
    }

    pub async fn create_assistant(
        &self,
        definition: &AssistantDefinition,
    ) -> Result<Assistant, AssistantError> {
        let assistant = self.admin.create_assistant(definition).await?;
        info!(
            assistant_id = %assistant.id,
            model = %assistant.model,
            knowledge_files = definition.knowledge_file_ids.len(),
            "Created assistant"
        );
        Ok(assistant)
    }

    /// Upload `knowledge_file` if given, then create the assistant with it attached.
    pub async fn provision(
        &self,
        definition: AssistantDefinition,
        knowledge_file: Option<&Path>,
    ) -> Result<Assistant, AssistantError> {
        let mut definition = definition;
        if let Some(path) = knowledge_file {
            let file = self.upload_knowledge_file(path).await?;
            definition.knowledge_file_ids.push(file.id);
        }
        self.create_assistant(&definition).await
    }

    pub async fn retrieve_assistant(&self, assistant_id: &str) -> Result<Assistant, AssistantError> {
        self.admin.retrieve_assistant(assistant_id).await
    }
}
