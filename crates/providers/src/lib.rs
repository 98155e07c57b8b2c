//! Platform adapters.
//!
//! Each adapter knows one platform's storage convention and turns it into
//! [`Game`](gsm_games::Game)s. Use [`registry`] to get all of them under
//! their command-line names.

mod catalog;
pub mod error;
mod fs;
pub mod minecraft;
pub mod playstation5;
pub mod retroarch;
pub mod steam;
pub mod switch;
mod timestamp;
pub mod wow;

use exn::OptionExt;
use gsm_cache::CacheHandle;
use gsm_fetch::HttpClient;
use gsm_games::Registry;
use gsm_games::error::ErrorKind;
use std::path::PathBuf;

pub use crate::minecraft::MinecraftProvider;
pub use crate::playstation5::PlayStation5Provider;
pub use crate::retroarch::RetroArchProvider;
pub use crate::steam::SteamProvider;
pub use crate::switch::SwitchProvider;
pub use crate::wow::WorldOfWarcraftProvider;

/// Provider selected when none is given.
pub const DEFAULT_PROVIDER: &str = steam::NAME;

/// Registry holding every adapter in this crate.
///
/// `cache` and `http` are shared by the adapters that resolve names from a
/// remote catalog.
pub fn registry(cache: CacheHandle, http: HttpClient) -> gsm_games::registry::error::Result<Registry> {
    let mut registry = Registry::new();
    registry.register(minecraft::NAME, MinecraftProvider::new)?;
    registry.register(playstation5::NAME, PlayStation5Provider::new)?;
    registry.register(retroarch::NAME, RetroArchProvider::new)?;
    registry.register(steam::NAME, {
        let (cache, http) = (cache.clone(), http.clone());
        move || SteamProvider::new(cache, http)
    })?;
    registry.register(switch::NAME, move || SwitchProvider::new(cache, http))?;
    registry.register(wow::NAME, WorldOfWarcraftProvider::new)?;
    Ok(registry)
}

pub(crate) fn home_dir() -> gsm_games::error::Result<PathBuf> {
    let dirs = directories::BaseDirs::new().ok_or_raise(|| ErrorKind::NoHomeDirectory)?;
    Ok(dirs.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsm_cache::MemoryCache;
    use std::sync::Arc;

    #[test]
    fn test_registry_contains_every_adapter() {
        let registry = registry(Arc::new(MemoryCache::new()), HttpClient::new().unwrap()).unwrap();
        assert_eq!(
            registry.names(),
            vec!["minecraft", "nintendo-switch", "playstation-5", "retroarch", "steam", "worldofwarcraft"]
        );
        for name in registry.names() {
            assert_eq!(registry.get(name).unwrap().name(), name);
        }
        assert!(registry.get(DEFAULT_PROVIDER).is_ok());
    }
}
