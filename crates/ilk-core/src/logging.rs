use tracing_subscriber::{fmt, EnvFilter};

use crate::{errors::Error, Result};

/// Initialize logging/tracing for the linker.
///
/// Output goes to stderr: stdout belongs to the host protocol.
pub fn init(service_name: &str) -> Result<()> {
    // Can be overridden with `RUST_LOG`.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(service_name)));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| Error::Config(format!("failed to install tracing subscriber: {e}")))
}

fn default_directives(service_name: &str) -> String {
    format!("info,ilk=info,ilk_core=info,ilk_host=info,ilk_jira=info,{service_name}=info")
}

/// Mask a secret for log output, keeping at most the last four characters.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return "<empty>".to_string();
    }
    if count <= 8 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{tail}", "*".repeat(count - 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_level_is_info() {
        let directives = default_directives("ilk");
        assert!(directives.starts_with("info,"));
        assert!(!directives.contains("warn"));
    }

    #[test]
    fn masks_short_secrets_entirely() {
        assert_eq!(mask_secret(""), "<empty>");
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret("12345678"), "********");
    }

    #[test]
    fn keeps_only_tail_of_long_secrets() {
        let masked = mask_secret("ATATT3xFfGF0secretTAIL");
        assert!(masked.ends_with("TAIL"));
        assert!(!masked.contains("secret"));
        assert_eq!(masked.chars().count(), "ATATT3xFfGF0secretTAIL".len());
    }
}
