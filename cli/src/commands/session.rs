use condo_cli::pages::session as page;
use condo_cli::{CLIError, OutputFormatter, Result};
use condo_link::{SessionContext, SignInOutcome};
use std::io::{self, Write};

fn prompt_email() -> Result<String> {
    print!("Email: ");
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .map_err(|e| CLIError::FileError(format!("Failed to read email: {}", e)))?;
    if read == 0 {
        return Err(CLIError::Cancelled);
    }
    Ok(input.trim().to_string())
}

pub async fn login(
    ctx: &mut SessionContext,
    formatter: &OutputFormatter,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    // Skip the prompts when the stored session is still good
    if let Some(identity) = page::already_signed_in(ctx).await {
        println!(
            "{}",
            formatter.success(&format!("Already authenticated as {}", identity.email))
        );
        return Ok(());
    }

    let email = match email {
        Some(email) => email,
        None => prompt_email()?,
    };
    let password = match password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")
            .map_err(|e| CLIError::FileError(format!("Failed to read password: {}", e)))?,
    };

    let message = match page::login(ctx, &email, &password).await? {
        SignInOutcome::SignedIn(session) => format!("Signed in as {}", session.user.email),
        SignInOutcome::AlreadyAuthenticated(identity) => {
            format!("Already authenticated as {}", identity.email)
        },
    };
    println!("{}", formatter.success(&message));
    Ok(())
}

pub async fn logout(ctx: &mut SessionContext, formatter: &OutputFormatter) -> Result<()> {
    page::logout(ctx).await;
    println!("{}", formatter.success("Signed out"));
    Ok(())
}

pub async fn whoami(ctx: &mut SessionContext, formatter: &OutputFormatter) -> Result<()> {
    let me = page::whoami(ctx).await?;
    println!("{}", formatter.format_value(&me, &me.lines())?);
    Ok(())
}
