//! Chapter listing functionality
//!
//! Prints the chapter catalog for a textbook, optionally filtered by the
//! user's saved focus preferences.

use std::error::Error;

use crate::api::preferences::PreferenceClient;
use crate::api::textbook::fetch_chapters;
use crate::api::Chapter;

pub async fn list_chapters(
    base_url: &str,
    textbook_id: &str,
    user_id: Option<&str>,
    focused: bool,
) -> Result<(), Box<dyn Error>> {
    let client = reqwest::Client::new();

    let mut chapters: Vec<Chapter> = if focused {
        let Some(user_id) = user_id else {
            return Err(
                "❌ --focused requires a user. Pass --user or run 'ragbook set user <id>'.".into(),
            );
        };
        PreferenceClient::with_client(client, base_url)
            .filtered_chapters(user_id, textbook_id)
            .await?
    } else {
        fetch_chapters(&client, base_url, textbook_id).await?
    };

    let heading = if focused {
        format!("📖 Focus Chapters for {textbook_id}")
    } else {
        format!("📖 Chapters for {textbook_id}")
    };
    println!("{heading}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    if chapters.is_empty() {
        println!("No chapters found for this textbook.");
        return Ok(());
    }

    chapters.sort_by_key(|chapter| chapter.chapter_number);
    for chapter in chapters {
        println!("  {}. {}", chapter.chapter_number, chapter.title);
    }

    Ok(())
}
