//! Todo command handlers
//!
//! Each command is one round against the server: mutations load the stored
//! list, change it locally and save the result back.

use anyhow::{Context, Result};

use snaplist_core::client::AddOutcome;
use snaplist_core::{TodoList, TodoSession};

use crate::output::Output;

/// Print the stored list
pub async fn load(session: &mut TodoSession, output: &Output) -> Result<()> {
    session.load().await.context("Failed to load todos")?;
    output.print_items(&session.list().snapshot());
    Ok(())
}

/// Replace the stored list with `items`
pub async fn save(session: &mut TodoSession, items: Vec<String>, output: &Output) -> Result<()> {
    let snapshot = snapshot_from_args(&items)?;
    session.list_mut().replace_all(snapshot);

    let response = session.save().await.context("Save failed")?;
    output.success(&format!(
        "Saved {} item(s) (store: {})",
        response.saved.len(),
        response.store_status
    ));
    Ok(())
}

/// Validate command-line items the way the interactive list does
///
/// Items are trimmed; a blank item rejects the whole save.
fn snapshot_from_args(items: &[String]) -> Result<Vec<String>> {
    let mut list = TodoList::new();
    for (i, item) in items.iter().enumerate() {
        list.add(item)
            .with_context(|| format!("Invalid item #{}: {:?}", i + 1, item))?;
    }
    Ok(list.snapshot())
}

/// Append one item
pub async fn add(session: &mut TodoSession, text: String, output: &Output) -> Result<()> {
    session.load().await.context("Failed to load todos")?;

    let position = match session.list_mut().add(&text)? {
        AddOutcome::Appended { position } | AddOutcome::Replaced { position, .. } => position,
    };

    session.save().await.context("Save failed")?;
    output.success(&format!("Added #{}: {}", position + 1, text.trim()));
    Ok(())
}

/// Remove the item at a 1-based position
pub async fn remove(session: &mut TodoSession, position: usize, output: &Output) -> Result<()> {
    session.load().await.context("Failed to load todos")?;

    let index = position
        .checked_sub(1)
        .context("Positions start at 1")?;
    let removed = session.list_mut().remove(index)?;

    session.save().await.context("Save failed")?;
    output.success(&format!("Removed #{}: {}", position, removed));
    Ok(())
}

/// Empty the stored list
pub async fn clear(session: &mut TodoSession, output: &Output) -> Result<()> {
    session.clear().await.context("Clear failed")?;
    output.success("Cleared all todos");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use snaplist_core::SyncClient;

    use crate::output::OutputFormat;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_items_are_trimmed() {
        let snapshot = snapshot_from_args(&args(&["  milk ", "eggs"])).unwrap();
        assert_eq!(snapshot, args(&["milk", "eggs"]));
    }

    #[test]
    fn test_blank_item_is_rejected() {
        let err = snapshot_from_args(&args(&["milk", "   "])).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid item #2"));
    }

    #[test]
    fn test_no_items_is_empty_list() {
        assert!(snapshot_from_args(&[]).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_with_blank_item_fails_before_sending() {
        let client = SyncClient::new("http://127.0.0.1:1").unwrap();
        let mut session = TodoSession::new(client);
        session.list_mut().replace_all(args(&["keep"]));
        let output = Output::new(OutputFormat::Quiet);

        let err = save(&mut session, args(&["a", ""]), &output)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid item #2"));
        assert_eq!(session.list().snapshot(), args(&["keep"]));
    }
}
