//! Subcommand implementations.

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use dialoguer::{Confirm, Input};

use gymkit_api::{MemberProfile, PhotoUpload, RegisterRequest};
use gymkit_auth::{AuthError, VerifyOutcome};

use crate::App;

fn require_identity(identity: Option<MemberProfile>) -> Result<MemberProfile> {
    identity.ok_or_else(|| anyhow!("not signed in, run `gymkit login` first"))
}

pub async fn login(app: &App) -> Result<()> {
    if let Some(profile) = app.auth.identity().await {
        println!(
            "{} {}",
            "Already signed in as".green(),
            profile.full_name.bold()
        );
        return Ok(());
    }

    let phone: String = Input::new()
        .with_prompt("Phone number (with country code)")
        .interact_text()?;

    let mut challenge = app
        .auth
        .send_otp(&phone)
        .await
        .map_err(|e| anyhow!(e.to_string()))?;
    println!("{}", "Code sent.".cyan());

    loop {
        let code: String = Input::new()
            .with_prompt("One-time code (or 'r' to resend)")
            .interact_text()?;

        if code.eq_ignore_ascii_case("r") {
            challenge = app
                .auth
                .resend_otp()
                .await
                .map_err(|e| anyhow!(e.to_string()))?;
            println!("{}", "New code sent.".cyan());
            continue;
        }

        match app.auth.verify_otp(&challenge.session_id, &code).await {
            Ok(VerifyOutcome::Authenticated(profile)) => {
                println!("{} {}", "Welcome,".green(), profile.full_name.bold());
                return Ok(());
            }
            Ok(VerifyOutcome::NewUser { phone_number }) => {
                println!(
                    "{}",
                    format!(
                        "No account for {}. Run `gymkit register` to create one.",
                        phone_number
                    )
                    .yellow()
                );
                return Ok(());
            }
            Err(AuthError::Verification(message)) => {
                println!("{} {}", "Verification failed:".red(), message);
                if !Confirm::new()
                    .with_prompt("Try again?")
                    .default(true)
                    .interact()?
                {
                    return Ok(());
                }
            }
            Err(e) => return Err(anyhow!(e.to_string())),
        }
    }
}

pub async fn register(app: &App) -> Result<()> {
    let full_name: String = Input::new().with_prompt("Full name").interact_text()?;
    let email: String = Input::new().with_prompt("Email").interact_text()?;
    let phone_number: String = Input::new()
        .with_prompt("Phone number (with country code)")
        .interact_text()?;
    let gym_code: String = Input::new()
        .with_prompt("Gym code (optional)")
        .allow_empty(true)
        .interact_text()?;
    let photo_path: String = Input::new()
        .with_prompt("Photo path (optional)")
        .allow_empty(true)
        .interact_text()?;

    let photo = if photo_path.is_empty() {
        None
    } else {
        let bytes = std::fs::read(&photo_path)
            .with_context(|| format!("could not read photo at {}", photo_path))?;
        let file_name = std::path::Path::new(&photo_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        Some(PhotoUpload { file_name, bytes })
    };

    let request = RegisterRequest {
        full_name,
        email,
        phone_number,
        gym_code: (!gym_code.is_empty()).then_some(gym_code),
        plan_id: None,
        photo,
    };

    let response = app
        .gateway
        .register(request)
        .await
        .map_err(|e| anyhow!(e.message()))?;
    // Registration hands back a token + user pair; adopt it directly,
    // bypassing the OTP path.
    app.auth.login(&response.token, response.user.clone()).await;

    println!(
        "{} {} ({})",
        "Registered".green(),
        response.user.full_name.bold(),
        response.user.membership_id
    );
    Ok(())
}

pub async fn profile(app: &App) -> Result<()> {
    require_identity(app.auth.identity().await)?;

    let profile = app
        .gateway
        .get_profile()
        .await
        .map_err(|e| anyhow!(e.message()))?;
    // Keep the persisted copy in step with the server.
    app.auth.update_identity(profile.clone()).await;

    println!("{}", profile.full_name.bold());
    println!("  membership  {}", profile.membership_id);
    println!("  email       {}", profile.email);
    println!("  phone       {}", profile.phone_number);
    if let Some(url) = &profile.photo_url {
        println!("  photo       {}", url);
    }
    Ok(())
}

pub async fn edit_profile(app: &App) -> Result<()> {
    let current = require_identity(app.auth.identity().await)?;

    let full_name: String = Input::new()
        .with_prompt("Full name")
        .default(current.full_name.clone())
        .interact_text()?;
    let email: String = Input::new()
        .with_prompt("Email")
        .default(current.email.clone())
        .interact_text()?;

    let updated = MemberProfile {
        full_name,
        email,
        ..current
    };
    let saved = app
        .gateway
        .update_profile(&updated)
        .await
        .map_err(|e| anyhow!(e.message()))?;
    app.auth.update_identity(saved).await;

    println!("{}", "Profile updated.".green());
    Ok(())
}

pub async fn dashboard(app: &App) -> Result<()> {
    require_identity(app.auth.identity().await)?;

    let summary = app
        .gateway
        .get_dashboard()
        .await
        .map_err(|e| anyhow!(e.message()))?;

    println!("{}", "Dashboard".bold());
    println!("  visits this month  {}", summary.visits_this_month);
    if let Some(plan) = &summary.active_plan {
        println!("  active plan        {}", plan);
    }
    if let Some(expires) = &summary.plan_expires_on {
        println!("  plan expires       {}", expires);
    }
    if let Some(last) = &summary.last_check_in {
        println!("  last check-in      {}", last.format("%Y-%m-%d %H:%M"));
    }
    for note in &summary.announcements {
        println!("  {} {}", "•".cyan(), note);
    }
    Ok(())
}

pub async fn plans(app: &App) -> Result<()> {
    let plans = app
        .gateway
        .get_membership_plans()
        .await
        .map_err(|e| anyhow!(e.message()))?;

    for plan in plans {
        println!(
            "{}  {} {} / {} days",
            plan.name.bold(),
            plan.price,
            plan.currency,
            plan.duration_days
        );
        if let Some(description) = &plan.description {
            println!("  {}", description);
        }
        for feature in &plan.features {
            println!("  {} {}", "✓".green(), feature);
        }
    }
    Ok(())
}

pub async fn payments(app: &App) -> Result<()> {
    require_identity(app.auth.identity().await)?;

    let history = app
        .gateway
        .get_payment_history()
        .await
        .map_err(|e| anyhow!(e.message()))?;

    if history.is_empty() {
        println!("{}", "No payments yet.".yellow());
        return Ok(());
    }
    for record in history {
        println!(
            "{}  {:>8.2} {}  {}  {}",
            record.paid_at.format("%Y-%m-%d"),
            record.amount,
            record.currency,
            record.plan_name.as_deref().unwrap_or("-"),
            record.status
        );
    }
    Ok(())
}

pub async fn trainer(app: &App) -> Result<()> {
    require_identity(app.auth.identity().await)?;

    let trainer = app
        .gateway
        .get_assigned_trainer()
        .await
        .map_err(|e| anyhow!(e.message()))?;

    println!("{}", trainer.full_name.bold());
    if let Some(specialty) = &trainer.specialty {
        println!("  specialty  {}", specialty);
    }
    if let Some(phone) = &trainer.phone_number {
        println!("  phone      {}", phone);
    }
    Ok(())
}

pub async fn check_in(app: &App, code: Option<&str>) -> Result<()> {
    require_identity(app.auth.identity().await)?;

    let record = app
        .gateway
        .check_in(code)
        .await
        .map_err(|e| anyhow!(e.message()))?;
    println!(
        "{} {} at {}",
        "Checked in".green(),
        record.gym_name.as_deref().unwrap_or("the gym"),
        record.checked_in_at.format("%H:%M")
    );
    Ok(())
}

pub async fn check_out(app: &App) -> Result<()> {
    require_identity(app.auth.identity().await)?;

    let record = app
        .gateway
        .check_out()
        .await
        .map_err(|e| anyhow!(e.message()))?;
    match record.checked_out_at {
        Some(at) => println!("{} at {}", "Checked out".green(), at.format("%H:%M")),
        None => println!("{}", "Checked out.".green()),
    }
    Ok(())
}

pub async fn validate(app: &App, qr: bool, value: &str) -> Result<()> {
    let result = if qr {
        app.gateway.validate_qr_code(value).await
    } else {
        app.gateway.validate_gym_code(value).await
    }
    .map_err(|e| anyhow!(e.message()))?;

    if result.valid {
        println!(
            "{} {}",
            "Valid:".green(),
            result.gym_name.as_deref().unwrap_or("unknown gym")
        );
    } else {
        println!(
            "{} {}",
            "Invalid:".red(),
            result.message.as_deref().unwrap_or("code not recognized")
        );
    }
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    app.auth.logout().await;
    println!("{}", "Signed out.".green());
    Ok(())
}

pub async fn whoami(app: &App) -> Result<()> {
    match app.auth.identity().await {
        Some(profile) => println!(
            "{} ({}, {})",
            profile.full_name.bold(),
            profile.membership_id,
            profile.phone_number
        ),
        None => println!("{}", "Not signed in.".yellow()),
    }
    Ok(())
}
