use super::ui;
use crate::core::session::Session;
use crate::providers::ApiClient;
use anyhow::Result;

pub async fn login(client: &ApiClient, email: &str, password: &str) -> Result<()> {
    let current = client.login(email, password).await?;
    println!(
        "Logged in as {} <{}>. Session valid until {}.",
        current.user.name,
        current.user.email,
        current.expires_at.format("%Y-%m-%d %H:%M UTC")
    );
    Ok(())
}

pub async fn logout(session: &Session) -> Result<()> {
    session.logout().await;
    println!("Logged out.");
    Ok(())
}

pub async fn whoami(session: &Session) -> Result<()> {
    match session.current_user().await {
        Some(current) => {
            println!(
                "{} <{}>",
                ui::style_text(&current.user.name, ui::StyleType::TotalLabel),
                current.user.email
            );
            if let Some(role) = &current.user.role {
                println!("Role: {role}");
            }
            println!(
                "{}",
                ui::style_text(
                    &format!(
                        "Session valid until {}",
                        current.expires_at.format("%Y-%m-%d %H:%M UTC")
                    ),
                    ui::StyleType::Subtle
                )
            );
        }
        None => println!("Not logged in."),
    }
    Ok(())
}
