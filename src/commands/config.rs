use anyhow::Result;

use crate::config::{ConfigKey, ConfigStore, Scope};
use crate::git::GitRepo;

/// Opens the store a `config` command works on. With `--global` no
/// repository is needed.
///
/// # Errors
/// Returns an error if:
/// - Without `global`, the current directory is not inside a repository
/// - Config cannot be opened
pub fn open_store(global: bool) -> Result<ConfigStore> {
    if global {
        return ConfigStore::open_global();
    }
    let cwd = std::env::current_dir()?;
    let git = GitRepo::discover(&cwd)?;
    ConfigStore::open(git.raw(), git.root())
}

/// Prints the value(s) of `key`. Returns `false` when it is unset.
///
/// Without `--global` this is the effective value across all layers.
///
/// # Errors
/// Returns an error if git config cannot be read
pub fn get(store: &ConfigStore, key: ConfigKey, global: bool) -> Result<bool> {
    let values = if global {
        store.get_scoped(key, Scope::Global)?
    } else if key.is_multi() {
        store.get_all(key)?
    } else {
        store.get(key)?.into_iter().collect()
    };

    for value in &values {
        println!("{}", value);
    }
    Ok(!values.is_empty())
}

/// # Errors
/// Returns an error if git config cannot be written
pub fn set(store: &mut ConfigStore, key: ConfigKey, value: &str, global: bool) -> Result<()> {
    store.set(key, value, Scope::from_global_flag(global))
}

/// # Errors
/// Returns an error if `key` is single-valued or git config cannot be
/// written
pub fn add(store: &mut ConfigStore, key: ConfigKey, value: &str, global: bool) -> Result<()> {
    store.add(key, value, Scope::from_global_flag(global))
}

/// # Errors
/// Returns an error if git config cannot be written
pub fn unset(store: &mut ConfigStore, key: ConfigKey, global: bool) -> Result<()> {
    if !store.unset(key, Scope::from_global_flag(global))? {
        tracing::info!(key = key.as_str(), "nothing to unset");
    }
    Ok(())
}

/// Prints `key=value` for every value that is set
///
/// # Errors
/// Returns an error if git config cannot be read
pub fn list(store: &ConfigStore, global: bool) -> Result<()> {
    let scope = global.then_some(Scope::Global);
    for (key, values) in store.list(scope)? {
        for value in values {
            println!("{}={}", key, value);
        }
    }
    Ok(())
}

/// Prints every recognised key with its kind and meaning
pub fn list_keys() {
    for key in ConfigKey::ALL {
        let kind = if key.is_multi() { "multi" } else { "single" };
        println!("{:<30} {:<7} {}", key.as_str(), kind, key.description());
    }
}
