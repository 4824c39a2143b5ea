use serde_json::json;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::hierarchy::AdminLevel;
use crate::services::{AdminError, AdminService, NewAdministrator};

/// `census bootstrap <email> <password>` - create the first nationwide
/// administrator. Every other account is then created through the API
/// by an administrator that already exists.
pub async fn handle(
    email: String,
    password: String,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let service = AdminService::new().await?;

    let new = NewAdministrator {
        email,
        password,
        level: AdminLevel::Nationwide,
        region_id: None,
        division_id: None,
        district_id: None,
        unit_id: None,
    };

    match service.create(&new, None).await {
        Ok(admin) => output_success(
            &output_format,
            "Nationwide administrator created",
            Some(json!({
                "id": admin.id,
                "email": admin.email,
                "level": admin.level,
            })),
        ),
        Err(AdminError::AlreadyExists(email)) => {
            output_error(
                &output_format,
                &format!("An administrator with email {} already exists", email),
            )?;
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
