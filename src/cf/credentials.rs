//! Credential extraction from `cf env` output
//!
//! `cf env` interleaves prose with pretty-printed JSON blocks:
//!
//! ```text
//! Getting env variables for app bridge_app...
//! OK
//!
//! System-Provided:
//! {
//!  "VCAP_SERVICES": { ... }
//! }
//!
//! {
//!  "VCAP_APPLICATION": { ... }
//! }
//! ```
//!
//! The blocks are collected by brace-line scanning (a line starting with
//! `{` opens a block, a line starting with `}` closes it), merged into one
//! JSON object, and the service credentials are pulled out of
//! `VCAP_SERVICES`.

use serde_json::Value;

use super::CredentialError;

/// Connection credentials for the analysis service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Binding id, used as the login user
    pub user_id: String,
    pub password: String,
}

/// Collect the top-level JSON blocks out of `cf env` output.
fn extract_json_blocks(output: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<String> = None;

    for line in output.lines() {
        match current.as_mut() {
            Some(block) => {
                block.push_str(line);
                if line.starts_with('}') {
                    blocks.push(current.take().unwrap_or_default());
                }
            }
            None => {
                if line.starts_with('{') {
                    current = Some(line.to_string());
                }
            }
        }
    }

    blocks
}

/// Extract service credentials from `cf env` output.
pub fn credentials_from_env_output(
    output: &str,
    service: &str,
) -> Result<Credentials, CredentialError> {
    let mut env = serde_json::Map::new();
    for block in extract_json_blocks(output) {
        let value: Value = serde_json::from_str(&block)?;
        if let Value::Object(map) = value {
            env.extend(map);
        }
    }

    let credentials = env
        .get("VCAP_SERVICES")
        .and_then(|services| services.get(service))
        .and_then(|instances| instances.get(0))
        .and_then(|instance| instance.get("credentials"));

    let user_id = credentials
        .and_then(|c| c.get("bindingid"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let password = credentials
        .and_then(|c| c.get("password"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    if user_id.is_empty() || password.is_empty() {
        return Err(CredentialError::MissingCredentials);
    }

    Ok(Credentials {
        user_id: user_id.to_string(),
        password: password.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_OUTPUT: &str = "\
Getting env variables for app pipeline_bridge_app in org my-org / space dev...
OK

System-Provided:
{
 \"VCAP_SERVICES\": {
  \"Static Analyzer\": [
   {
    \"credentials\": {
     \"bindingid\": \"bind-123\",
     \"password\": \"s3cret\"
    },
    \"label\": \"Static Analyzer\",
    \"plan\": \"free\"
   }
  ]
 }
}

{
 \"VCAP_APPLICATION\": {
  \"application_name\": \"pipeline_bridge_app\"
 }
}

No user-defined env variables have been set
";

    #[test]
    fn test_extract_credentials() {
        let creds = credentials_from_env_output(ENV_OUTPUT, "Static Analyzer").unwrap();
        assert_eq!(creds.user_id, "bind-123");
        assert_eq!(creds.password, "s3cret");
    }

    #[test]
    fn test_missing_service_is_error() {
        assert!(matches!(
            credentials_from_env_output(ENV_OUTPUT, "Globalization"),
            Err(CredentialError::MissingCredentials)
        ));
    }

    #[test]
    fn test_missing_password_is_error() {
        let output = "\
{
 \"VCAP_SERVICES\": {
  \"Static Analyzer\": [
   {
    \"credentials\": {
     \"bindingid\": \"bind-123\"
    }
   }
  ]
 }
}
";
        assert!(matches!(
            credentials_from_env_output(output, "Static Analyzer"),
            Err(CredentialError::MissingCredentials)
        ));
    }

    #[test]
    fn test_malformed_block_is_error() {
        let output = "{\n \"VCAP_SERVICES\": oops\n}\n";
        assert!(matches!(
            credentials_from_env_output(output, "Static Analyzer"),
            Err(CredentialError::MalformedEnv(_))
        ));
    }

    #[test]
    fn test_no_blocks_is_missing_credentials() {
        assert!(matches!(
            credentials_from_env_output("nothing here\n", "Static Analyzer"),
            Err(CredentialError::MissingCredentials)
        ));
    }

    #[test]
    fn test_block_extraction_joins_lines() {
        let blocks = extract_json_blocks("noise\n{\n \"a\": 1\n}\ntrailing\n{\n}\n");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], "{ \"a\": 1}");
    }
}
