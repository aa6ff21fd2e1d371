//! TLS command - validate a certificate / private key pair from files

use chartwright_core::tls;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::Path;

use crate::display::print_tls_validation;
use crate::error::CliError;

pub fn run(cert_path: &Path, key_path: &Path, json: bool) -> Result<()> {
    let certificate =
        fs::read_to_string(cert_path).map_err(|e| CliError::io(cert_path.display(), e))?;
    let key = fs::read_to_string(key_path).map_err(|e| CliError::io(key_path.display(), e))?;

    let result = tls::validate(&certificate, &key);

    if json {
        println!("{}", serde_json::to_string_pretty(&result).into_diagnostic()?);
    } else {
        print_tls_validation(&cert_path.display().to_string(), &result);
    }

    if !result.is_valid() {
        return Err(CliError::validation(result.messages().join("; ")).into());
    }

    Ok(())
}
