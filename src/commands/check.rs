// ABOUTME: Configuration check command
// ABOUTME: Confirms the environment is complete without contacting any source

use anyhow::Result;

use crate::config::Config;

/// Print the resolved configuration with secrets redacted.
///
/// Loading the config already failed fast on missing variables, so
/// reaching this point means the environment is complete.
pub fn check(config: &Config) -> Result<()> {
    println!("Configuration OK");
    println!("  Output:        {}", config.output_location());
    println!("  CRM user:      {}", config.crm.username);
    println!("  CRM login URL: {}", config.crm.login_url);
    println!("  CRM password:  {}", redact(&config.crm.password));
    println!("  CRM token:     {}", redact(&config.crm.security_token));
    println!(
        "  Warehouse:     {}:{}/{} (TLS required)",
        config.warehouse.host, config.warehouse.port, config.warehouse.database
    );
    println!("  Warehouse user: {}", config.warehouse.user);
    println!("  Warehouse password: {}", redact(&config.warehouse.password));
    Ok(())
}

fn redact(secret: &str) -> String {
    "*".repeat(secret.chars().count().min(8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_hides_content() {
        assert_eq!(redact("hunter2"), "*******");
        assert_eq!(redact("a-much-longer-secret"), "********");
        assert!(!redact("hunter2").contains("hunter"));
    }
}
