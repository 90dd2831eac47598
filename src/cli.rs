use clap::{Parser, Subcommand};
use std::time::Instant;
use thiserror::Error;

use crate::archive::AutoArchiver;
use crate::models::{Group, GroupFilter, GroupStatus, SectionData};
use crate::store::{Store, StoreError};

#[derive(Parser)]
#[command(name = "relist")]
#[command(about = "Reusable checklist templates and working checklists")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/store)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new template
    AddTemplate {
        /// Template title
        title: String,
        /// Section spec, repeatable: "Title: item, item"
        #[arg(long = "section")]
        sections: Vec<String>,
    },
    /// List all templates
    ListTemplates,
    /// Show one template with its sections and items
    ShowTemplate {
        /// Template ID
        id: String,
    },
    /// Replace a template's title and/or sections
    EditTemplate {
        /// Template ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// Replacement section spec, repeatable: "Title: item, item"
        #[arg(long = "section")]
        sections: Vec<String>,
    },
    /// Delete a template (groups made from it are untouched)
    DeleteTemplate {
        /// Template ID
        id: String,
    },
    /// Duplicate a template under a "(copy)" title
    DuplicateTemplate {
        /// Template ID
        id: String,
    },
    /// Start a working group from a template
    StartGroup {
        /// Template ID
        template_id: String,
    },
    /// Create an ad hoc group not tied to a template
    AddGroup {
        /// Group title
        title: String,
        /// Section spec, repeatable: "Title: item, item"
        #[arg(long = "section")]
        sections: Vec<String>,
    },
    /// List groups
    ListGroups {
        /// Filter: all, active or archived
        #[arg(long, default_value = "active")]
        filter: String,
    },
    /// Toggle one item's completion; archives the group once everything
    /// is done and the confirmation window has elapsed
    Toggle {
        /// Group ID
        group_id: String,
        /// Item ID
        item_id: String,
    },
    /// Archive a group
    ArchiveGroup {
        /// Group ID
        id: String,
    },
    /// Move an archived group back to active
    UnarchiveGroup {
        /// Group ID
        id: String,
    },
    /// Delete a group
    DeleteGroup {
        /// Group ID
        id: String,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid section spec '{0}': expected \"Title: item, item\"")]
    SectionParseError(String),
    #[error("Invalid filter '{0}': expected all, active or archived")]
    FilterParseError(String),
}

/// Parse repeated `--section "Title: item, item"` arguments.
pub fn parse_section_specs(specs: &[String]) -> Result<Vec<SectionData>, CliError> {
    specs
        .iter()
        .map(|spec| {
            let (title, rest) = spec
                .split_once(':')
                .ok_or_else(|| CliError::SectionParseError(spec.clone()))?;
            let title = title.trim();
            if title.is_empty() {
                return Err(CliError::SectionParseError(spec.clone()));
            }
            let items = rest
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            Ok(SectionData::new(title, items))
        })
        .collect()
}

fn print_group_summary(group: &Group) {
    let total = group.todos().count();
    let done = group.todos().filter(|t| t.completed).count();
    let status = match group.status {
        GroupStatus::Active => "active",
        GroupStatus::Archived => "archived",
    };
    println!(
        "[{}/{}] {} ({}) - {}",
        done, total, group.title, status, group.id
    );
}

/// Handle the add-template command
pub fn handle_add_template(
    title: String,
    sections: Vec<String>,
    store: &mut Store,
) -> Result<(), CliError> {
    let sections = parse_section_specs(&sections)?;
    let template = store.create_template(title, sections)?;
    println!("Template created successfully (ID: {})", template.id);
    Ok(())
}

/// Handle the list-templates command
pub fn handle_list_templates(store: &Store) -> Result<(), CliError> {
    for template in store.get_templates() {
        let sections = template.section_data();
        let items: usize = sections.iter().map(|s| s.items.len()).sum();
        println!(
            "{} ({} sections, {} items) - {}",
            template.title,
            sections.len(),
            items,
            template.id
        );
    }
    Ok(())
}

/// Handle the show-template command
pub fn handle_show_template(id: String, store: &Store) -> Result<(), CliError> {
    let template = store
        .get_template(&id)
        .ok_or_else(|| CliError::NotFound(format!("template {}", id)))?;
    println!("{} (ID: {})", template.title, template.id);
    for section in template.section_data() {
        println!("  {}", section.title);
        for item in &section.items {
            println!("    - {}", item);
        }
    }
    Ok(())
}

/// Handle the edit-template command
pub fn handle_edit_template(
    id: String,
    title: Option<String>,
    sections: Vec<String>,
    store: &mut Store,
) -> Result<(), CliError> {
    let sections = if sections.is_empty() {
        None
    } else {
        Some(parse_section_specs(&sections)?)
    };
    let updated = store
        .update_template(&id, title, sections)?
        .ok_or_else(|| CliError::NotFound(format!("template {}", id)))?;
    println!("Template updated successfully (ID: {})", updated.id);
    Ok(())
}

/// Handle the delete-template command
pub fn handle_delete_template(id: String, store: &mut Store) -> Result<(), CliError> {
    store.delete_template(&id)?;
    println!("Template deleted (ID: {})", id);
    Ok(())
}

/// Handle the duplicate-template command
pub fn handle_duplicate_template(id: String, store: &mut Store) -> Result<(), CliError> {
    let copy = store
        .duplicate_template(&id)?
        .ok_or_else(|| CliError::NotFound(format!("template {}", id)))?;
    println!("Template duplicated successfully (ID: {})", copy.id);
    Ok(())
}

/// Handle the start-group command
pub fn handle_start_group(template_id: String, store: &mut Store) -> Result<(), CliError> {
    let group = store
        .create_group_from_template(&template_id)?
        .ok_or_else(|| CliError::NotFound(format!("template {}", template_id)))?;
    println!("Group created successfully (ID: {})", group.id);
    Ok(())
}

/// Handle the add-group command
pub fn handle_add_group(
    title: String,
    sections: Vec<String>,
    store: &mut Store,
) -> Result<(), CliError> {
    let sections = parse_section_specs(&sections)?;
    let group = store.create_group(title, sections)?;
    println!("Group created successfully (ID: {})", group.id);
    Ok(())
}

/// Handle the list-groups command
pub fn handle_list_groups(filter: String, store: &Store) -> Result<(), CliError> {
    let filter =
        GroupFilter::parse(&filter).ok_or_else(|| CliError::FilterParseError(filter.clone()))?;
    for group in store.get_groups(filter) {
        print_group_summary(group);
    }
    Ok(())
}

/// Handle the toggle command.
///
/// Completing the last open item arms the auto-archiver; since a one-shot
/// command cannot be interrupted, the confirmation window is waited out
/// here and the group is archived if it is still fully completed. A toggle
/// that re-opens an item cancels any pending archive instead.
pub fn handle_toggle(
    group_id: String,
    item_id: String,
    store: &mut Store,
    archiver: &mut AutoArchiver,
) -> Result<(), CliError> {
    let group = store
        .toggle_todo(&group_id, &item_id)?
        .ok_or_else(|| CliError::NotFound(format!("item {} in group {}", item_id, group_id)))?;
    print_group_summary(&group);

    if !store.all_completed(&group_id) {
        archiver.cancel(&group_id);
        return Ok(());
    }

    println!(
        "All items completed - archiving in {}ms",
        archiver.delay().as_millis()
    );
    archiver.schedule(&group_id);
    std::thread::sleep(archiver.delay());
    for id in archiver.due(Instant::now()) {
        // Re-check: the window exists so a completion can be backed out.
        if store.all_completed(&id) {
            if let Some(archived) = store.archive_group(&id)? {
                println!("Group archived (ID: {})", archived.id);
            }
        }
    }
    Ok(())
}

/// Handle the archive-group command
pub fn handle_archive_group(id: String, store: &mut Store) -> Result<(), CliError> {
    store
        .archive_group(&id)?
        .ok_or_else(|| CliError::NotFound(format!("group {}", id)))?;
    println!("Group archived (ID: {})", id);
    Ok(())
}

/// Handle the unarchive-group command
pub fn handle_unarchive_group(id: String, store: &mut Store) -> Result<(), CliError> {
    store
        .unarchive_group(&id)?
        .ok_or_else(|| CliError::NotFound(format!("group {}", id)))?;
    println!("Group unarchived (ID: {})", id);
    Ok(())
}

/// Handle the delete-group command
pub fn handle_delete_group(id: String, store: &mut Store) -> Result<(), CliError> {
    store.delete_group(&id)?;
    println!("Group deleted (ID: {})", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_section_specs() {
        let specs = vec!["Clothes: Shirt, Pants".to_string(), "Gear:Tent".to_string()];
        let sections = parse_section_specs(&specs).unwrap();
        assert_eq!(
            sections,
            vec![
                SectionData::new("Clothes", vec!["Shirt".to_string(), "Pants".to_string()]),
                SectionData::new("Gear", vec!["Tent".to_string()]),
            ]
        );
    }

    #[test]
    fn section_spec_without_colon_is_rejected() {
        let err = parse_section_specs(&["no colon here".to_string()]).unwrap_err();
        assert!(matches!(err, CliError::SectionParseError(_)));
    }

    #[test]
    fn empty_items_are_dropped_from_spec() {
        let sections = parse_section_specs(&["Clothes: Shirt, , ".to_string()]).unwrap();
        assert_eq!(sections[0].items, vec!["Shirt".to_string()]);
    }
}
