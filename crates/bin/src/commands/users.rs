//! User commands - list, get, add, update and delete against a REST backend.

use std::sync::Arc;

use serde_json::Value;
use userbase::{Pagination, User};

use crate::cli::{AddArgs, ClientArgs, IdArgs, ListArgs, UpdateArgs};
use crate::client::Client;
use crate::output::{OutputFormat, print_users};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Run the list command
pub async fn list(client: &ClientArgs, args: &ListArgs, format: OutputFormat) -> CommandResult {
    let client = Client::connect(client)?;
    let pagination = pagination(args);
    client.service.load(pagination.as_ref()).await?;
    client.settle().await;

    let snapshot = client.service.snapshot();
    match format {
        OutputFormat::Human => print_users(snapshot.iter().map(|u| u.as_ref())),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&snapshot.to_users())?)
        }
    }
    Ok(())
}

fn pagination(args: &ListArgs) -> Option<Pagination> {
    if args.page.is_none() && args.per_page.is_none() && args.sort.is_none() {
        return None;
    }
    Some(Pagination {
        page: args.page,
        per_page: args.per_page,
        sort: args.sort.clone(),
    })
}

/// Run the get command
pub async fn get(client: &ClientArgs, args: &IdArgs, format: OutputFormat) -> CommandResult {
    let client = Client::connect(client)?;
    let raw = Value::Object(client.service.get(&args.id).await?);

    match format {
        OutputFormat::Human => print_users([&User::from_raw(&raw)]),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&raw)?),
    }
    Ok(())
}

/// Run the add command
pub async fn add(client: &ClientArgs, args: &AddArgs, format: OutputFormat) -> CommandResult {
    let client = Client::connect(client)?;
    let user = User::new(&args.username, &args.email, &args.password);
    let created = client.service.add(&user).await?.into_json()?;

    match format {
        OutputFormat::Human => {
            let id = created.get("id").and_then(Value::as_str).unwrap_or("-");
            println!("Created user {} ({id})", args.username);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&created)?),
    }
    Ok(())
}

/// Run the update command
///
/// Fetches the current record first so unchanged fields are sent back as-is.
pub async fn update(client: &ClientArgs, args: &UpdateArgs, format: OutputFormat) -> CommandResult {
    if !args.has_changes() {
        return Err("Nothing to update: pass at least one field flag".into());
    }

    let client = Client::connect(client)?;
    let current = Value::Object(client.service.get(&args.id).await?);
    let mut user = User::from_raw(&current);
    apply_changes(&mut user, args);
    client.service.update(&user).await?;
    client.settle().await;

    match format {
        OutputFormat::Human => println!("Updated user {user}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
    }
    Ok(())
}

fn apply_changes(user: &mut User, args: &UpdateArgs) {
    if let Some(email) = &args.email {
        user.email = email.clone();
    }
    if let Some(username) = &args.username {
        user.username = username.clone();
    }
    if let Some(role) = &args.role {
        user.role = Some(role.clone());
    }
    if let Some(active) = args.active {
        user.active = active;
    }
    if let Some(verified) = args.verified {
        user.verified = verified;
    }
}

/// Run the delete command
pub async fn delete(client: &ClientArgs, args: &IdArgs, format: OutputFormat) -> CommandResult {
    let client = Client::connect(client)?;
    let current = Value::Object(client.service.get(&args.id).await?);
    let user = Arc::new(User::from_raw(&current));
    let deleted = client.service.delete(&user).await?;
    client.settle().await;

    match format {
        OutputFormat::Human => println!("Deleted user {deleted}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&deleted)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_only_when_requested() {
        let none = ListArgs {
            page: None,
            per_page: None,
            sort: None,
        };
        assert_eq!(pagination(&none), None);

        let sorted = ListArgs {
            page: None,
            per_page: None,
            sort: Some("email".to_string()),
        };
        assert_eq!(
            pagination(&sorted).and_then(|p| p.sort),
            Some("email".to_string())
        );
    }

    #[test]
    fn test_apply_changes_touches_only_given_fields() {
        let mut user = User::new("ana", "ana@example.com", "pw").with_id("u1");
        let args = UpdateArgs {
            id: "u1".to_string(),
            email: None,
            username: None,
            role: Some("admin".to_string()),
            active: Some(true),
            verified: None,
        };

        apply_changes(&mut user, &args);

        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.role.as_deref(), Some("admin"));
        assert!(user.active);
        assert!(!user.verified);
    }
}
