//! User command - account creation from the command line.

use crate::cli::args::{UserAction, UserArgs};
use crate::config::Config;
use crate::domain::Role;
use crate::errors::AppResult;
use crate::services::ServiceContainer;

pub async fn execute(args: UserArgs, config: Config) -> AppResult<()> {
    let services = super::management_services(&config).await?;

    match args.action {
        UserAction::Create {
            username,
            password,
            role,
            full_name,
        } => {
            let role: Role = role.parse()?;
            let profile = services
                .auth()
                .create_user(&username, &password, role, &full_name)
                .await?;
            println!(
                "Created {} \"{}\" ({})",
                profile.role.label(),
                username.trim(),
                profile.full_name
            );
        }
    }

    Ok(())
}
