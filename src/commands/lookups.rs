//! Lookup command - reference data maintenance.

use crate::cli::args::{LookupAction, LookupArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::services::ServiceContainer;

pub async fn execute(args: LookupArgs, config: Config) -> AppResult<()> {
    let services = super::management_services(&config).await?;
    let catalog = services.catalog();

    match args.action {
        LookupAction::Add { kind, name } => {
            let row = catalog.add_lookup(kind, &name).await?;
            println!("Added {} {}: {}", kind.label().to_lowercase(), row.id, row.name);
        }
        LookupAction::List { kind } => {
            let rows = catalog.list_lookups(kind).await?;
            if rows.is_empty() {
                println!("No {} rows", kind.label().to_lowercase());
            }
            for row in rows {
                println!("{:>5}  {}", row.id, row.name);
            }
        }
        LookupAction::Remove { kind, id } => {
            catalog.remove_lookup(kind, id).await?;
            println!("Removed {} {}", kind.label().to_lowercase(), id);
        }
    }

    Ok(())
}
