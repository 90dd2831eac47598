use clap::Parser;
use color_eyre::Result;
use relist::{
    AutoArchiver, Config, Profile, Store,
    cli::{self, Cli, Commands},
};
use std::time::Duration;

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    // Load configuration with the determined profile
    // Note: --config option is parsed but not yet used to override config path
    let config = Config::load_with_profile(profile)?;

    // Open the store
    let mut store = Store::open(config.get_store_path())?;
    let mut archiver = AutoArchiver::new(Duration::from_millis(config.auto_archive_delay_ms));

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::AddTemplate { title, sections } => {
            cli::handle_add_template(title, sections, &mut store)?;
        }
        Commands::ListTemplates => {
            cli::handle_list_templates(&store)?;
        }
        Commands::ShowTemplate { id } => {
            cli::handle_show_template(id, &store)?;
        }
        Commands::EditTemplate {
            id,
            title,
            sections,
        } => {
            cli::handle_edit_template(id, title, sections, &mut store)?;
        }
        Commands::DeleteTemplate { id } => {
            cli::handle_delete_template(id, &mut store)?;
        }
        Commands::DuplicateTemplate { id } => {
            cli::handle_duplicate_template(id, &mut store)?;
        }
        Commands::StartGroup { template_id } => {
            cli::handle_start_group(template_id, &mut store)?;
        }
        Commands::AddGroup { title, sections } => {
            cli::handle_add_group(title, sections, &mut store)?;
        }
        Commands::ListGroups { filter } => {
            cli::handle_list_groups(filter, &store)?;
        }
        Commands::Toggle { group_id, item_id } => {
            cli::handle_toggle(group_id, item_id, &mut store, &mut archiver)?;
        }
        Commands::ArchiveGroup { id } => {
            cli::handle_archive_group(id, &mut store)?;
        }
        Commands::UnarchiveGroup { id } => {
            cli::handle_unarchive_group(id, &mut store)?;
        }
        Commands::DeleteGroup { id } => {
            cli::handle_delete_group(id, &mut store)?;
        }
    }

    Ok(())
}
