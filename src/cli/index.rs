//! RAG index administration
//!
//! Thin wrappers that call the index endpoints and print the outcome.

use std::error::Error;

use crate::api::rag::RagClient;

pub async fn create_index(
    base_url: &str,
    textbook_id: &str,
    embedding_model: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let client = RagClient::new(base_url);
    let ack = client.create_index(textbook_id, embedding_model).await?;

    println!("✅ Index creation requested for textbook '{}'", ack.textbook_id);
    println!("  Index id: {}", ack.id);
    println!("  Status: {}", ack.status);
    println!("  Embedding model: {}", ack.embedding_model);
    Ok(())
}

pub async fn index_status(base_url: &str, textbook_id: &str) -> Result<(), Box<dyn Error>> {
    let client = RagClient::new(base_url);
    let status = client.index_status(textbook_id).await?;

    println!("Index status for textbook '{textbook_id}': {}", status.status);
    if !status.is_authoritative() {
        println!("⚠️  The backend does not expose a status endpoint yet; this value is a placeholder.");
    }
    Ok(())
}
