//! Facets and Highlighting Example
//!
//! Run with: SOLR_URL=http://localhost:8983/solr/<core> cargo run --example facets_and_highlighting

use serde_json::json;
use solrkit_rs::{AddOptions, Client, ClientConfig, Query};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let client = Client::with_config(ClientConfig::from_env())?;

    client
        .add_json(
            json!([
                {"id": "fh-1", "category_ss": ["drama", "fantasy"], "info_t": "an ongoing manga series about a ninja"},
                {"id": "fh-2", "category_ss": ["drama", "supernatural"], "info_t": "a manga about a Soul Reaper"},
                {"id": "fh-3", "category_ss": ["mystery"], "info_t": "a manga about a notebook", "note_s": null}
            ]),
            AddOptions::default().commit_within(500),
        )
        .await?;
    client.commit().await?;

    let query = Query::new("info_t:manga")
        .facet_field("category_ss")
        .facet_query("id:fh-1 OR id:fh-2")
        .highlight_fields("info_t");
    let result = client.search(query).await?;

    if let Some(facets) = &result.facet_counts {
        for (field, counts) in &facets.facet_fields {
            println!("📊 {}", field);
            for count in counts {
                println!("   {:<14} {}", count.value, count.count);
            }
        }
        for (query, count) in &facets.facet_queries {
            println!("📊 {} → {}", query, count);
        }
    }

    match &result.highlighting {
        Some(highlighting) => {
            for (id, fields) in highlighting {
                for (field, snippets) in fields {
                    println!("✨ {} [{}]: {}", id, field, snippets.join(" … "));
                }
            }
        }
        None => println!("No highlighting section returned"),
    }

    client.delete_by_query("id:fh-*").await?;
    client.commit().await?;

    Ok(())
}
