use std::env::var;
use std::path::PathBuf;

use super::EnvError;

pub fn get_env_var(key: &str) -> Result<String, EnvError> {
    var(key).map_err(|e| EnvError::EnvVar(e, key.to_owned()))
}

/// Home directory of the current user, taken from `HOME`.
pub fn home_dir() -> Result<PathBuf, EnvError> {
    let home = get_env_var("HOME")?;
    if home.is_empty() {
        return Err(EnvError::Empty("HOME".to_owned()));
    }
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_var_missing() {
        let err = get_env_var("SHARED_TEST_SURELY_UNSET_VARIABLE").unwrap_err();
        assert!(matches!(err, EnvError::EnvVar(_, ref key) if key == "SHARED_TEST_SURELY_UNSET_VARIABLE"));
        assert!(err.to_string().contains("SHARED_TEST_SURELY_UNSET_VARIABLE"));
    }

    #[test]
    fn test_get_env_var_present() {
        // PATH is set for every test process
        assert!(get_env_var("PATH").is_ok());
    }
}
