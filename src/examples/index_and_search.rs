//! Index and Search Example
//!
//! Adds a few documents, commits, and queries them back.
//!
//! Run with: SOLR_URL=http://localhost:8983/solr/<core> cargo run --example index_and_search

use solrkit_rs::{escape_term, Client, ClientConfig, Document, Query};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("solrkit_rs=debug,solrkit_core=debug")),
        )
        .init();

    let config = ClientConfig::load("solrkit.json").unwrap_or_else(|_| {
        tracing::warn!("Failed to load solrkit.json, using SOLR_URL or defaults");
        ClientConfig::from_env()
    });
    let client = Client::with_config(config)?;

    client.ping().await?;
    println!("✅ Connected to {}\n", client.config().base_url);

    let docs = vec![
        Document::new()
            .with_field("id", "naruto")
            .with_field("title_s", "Naruto")
            .with_field("popularity_i", 10)
            .with_field("category_ss", vec!["action", "comedy", "drama"]),
        Document::new()
            .with_field("id", "bleach")
            .with_field("title_s", "Bleach")
            .with_field("popularity_i", 7)
            .with_field("category_ss", vec!["action", "supernatural"]),
        Document::new()
            .with_field("id", "death-note")
            .with_field("title_s", "Death Note")
            .with_field("popularity_i", 8)
            .with_field("category_ss", vec!["mystery", "thriller"]),
    ];

    client.add_all(docs).await?;
    client.commit().await?;
    println!("📝 Added and committed 3 documents\n");

    let query = Query::new("category_ss:action")
        .sort("popularity_i desc")
        .fields("id,title_s,popularity_i");
    let result = client.search(query).await?;

    println!("🔍 {} match(es) for 'category_ss:action':", result.results.num_found);
    for (i, doc) in result.results.docs.iter().enumerate() {
        println!(
            "   {}. {} (popularity: {})",
            i + 1,
            doc.get_str("title_s").unwrap_or("?"),
            doc.get_i64("popularity_i").unwrap_or_default()
        );
    }

    // Literal text containing query syntax must be escaped
    let result = client
        .search(format!("id:{}", escape_term("death-note")))
        .await?;
    println!("\n🔎 Exact id lookup found {} document(s)", result.results.num_found);

    client.delete(["naruto", "bleach", "death-note"]).await?;
    client.commit().await?;
    println!("🧹 Cleaned up");

    Ok(())
}
