use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::error::{LiveroomError, Result};
use crate::session::{HomeView, Session, SessionContext};
use crate::ui::{self, toast, MessageSeverity};
use colored::Colorize;

pub async fn login(
    config: &AppConfig,
    ctx: &mut SessionContext,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => ui::read_password("Password:")?,
    };

    let api = ApiClient::new(&config.api_url, None)?;
    let response = api.login(email, &password).await?;
    let session = Session::new(response.user, response.token);
    ctx.sign_in(session)?;

    let user = ctx.user()?;
    tracing::info!(user = %user.id, role = %user.role, "Signed in");
    toast(
        MessageSeverity::Success,
        format!("Signed in as {} ({})", user.name, user.role),
    );
    print_home(ctx.home_view());
    Ok(())
}

pub fn logout(ctx: &mut SessionContext) -> Result<()> {
    if ctx.sign_out()? {
        toast(MessageSeverity::Success, "Signed out.");
    } else {
        toast(MessageSeverity::Info, "No stored session.");
    }
    Ok(())
}

/// Print the restored session and route to the role's home view. With
/// `refresh`, the profile is re-fetched so role changes on the backend apply.
pub async fn whoami(config: &AppConfig, ctx: &mut SessionContext, refresh: bool) -> Result<()> {
    if refresh {
        refresh_profile(config, ctx).await?;
    }

    let Some(session) = ctx.session() else {
        toast(MessageSeverity::Info, "Not signed in.");
        print_home(HomeView::Login);
        return Ok(());
    };

    let user = &session.user;
    println!("{} {}", "Name:".bright_cyan(), user.name);
    println!("{} {}", "Email:".bright_cyan(), user.email);
    println!("{} {}", "Role:".bright_cyan(), user.role);
    if session.saved_at > 0 {
        println!(
            "{} {}",
            "Signed in:".bright_cyan(),
            ui::format_timestamp(session.saved_at).dimmed()
        );
    }
    print_home(ctx.home_view());
    Ok(())
}

async fn refresh_profile(config: &AppConfig, ctx: &mut SessionContext) -> Result<()> {
    let api = ctx.api_client(&config.api_url)?;
    match api.current_user().await {
        Ok(user) => {
            let token = ctx.token()?.to_string();
            ctx.sign_in(Session::new(user, token))
        }
        Err(LiveroomError::Api { status: 401, .. }) => {
            tracing::warn!("Stored token rejected");
            ctx.sign_out()?;
            Err(LiveroomError::NotLoggedIn)
        }
        Err(e) => {
            // Keep showing the cached profile.
            toast(
                MessageSeverity::Warning,
                format!("Could not refresh profile: {}", e),
            );
            Ok(())
        }
    }
}

fn print_home(view: HomeView) {
    ui::heading(view.title());
    for command in view.commands() {
        println!("  {} {}", "liveroom".dimmed(), command.bright_green());
    }
}
