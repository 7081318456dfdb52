//! Sprite asset bundle
//!
//! The bundle is generic over the drawing backend's image type. Loading is
//! backend-specific (see `web` on wasm32) and memoized through `AssetCache`.

pub mod extract;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::AssetError;
use crate::renderer::headless::HeadlessImage;

/// Where the bundle's images live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub base_url: String,
    pub background_mobile: String,
    pub background_desktop: String,
    pub background_fallback: String,
    pub ship_idle: String,
    pub ship_fire: String,
    pub asteroids: Vec<String>,
    /// Cut each asteroid out of a larger sheet at load time
    #[serde(default)]
    pub extract_sprites: bool,
}

/// Number of asteroid sprites shipped with the game
pub const ASTEROID_SPRITE_COUNT: usize = 10;

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            base_url: "/game-assets".to_string(),
            background_mobile: "background_mobile_9x16_1080x1920.png".to_string(),
            background_desktop: "background_desktop_16x9_1920x1080.png".to_string(),
            background_fallback: "background_full.png".to_string(),
            ship_idle: "ship_idle.png".to_string(),
            ship_fire: "ship_fire.png".to_string(),
            asteroids: (1..=ASTEROID_SPRITE_COUNT)
                .map(|i| format!("asteroid_{:02}.png", i))
                .collect(),
            extract_sprites: false,
        }
    }
}

impl AssetManifest {
    /// Full URL for a file in the manifest
    pub fn url(&self, file: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), file)
    }

    /// Every URL the bundle needs, backgrounds first
    pub fn urls(&self) -> Vec<String> {
        [
            &self.background_mobile,
            &self.background_desktop,
            &self.background_fallback,
            &self.ship_idle,
            &self.ship_fire,
        ]
        .into_iter()
        .chain(&self.asteroids)
        .map(|file| self.url(file))
        .collect()
    }
}

/// Build a bundle from `manifest`, fetching each image through `load`
///
/// Background variants are optional: a failure is logged and leaves the field
/// empty. Any other failure aborts with that image's error.
pub fn assemble_bundle<I>(
    manifest: &AssetManifest,
    mut load: impl FnMut(&str) -> Result<I, AssetError>,
) -> Result<AssetBundle<I>, AssetError> {
    let mut optional = |file: &str| match load(&manifest.url(file)) {
        Ok(image) => Some(image),
        Err(err) => {
            log::warn!("{}, using fallback background", err);
            None
        }
    };
    let background_mobile = optional(&manifest.background_mobile);
    let background_desktop = optional(&manifest.background_desktop);

    let background_fallback = load(&manifest.url(&manifest.background_fallback))?;
    let ship_idle = load(&manifest.url(&manifest.ship_idle))?;
    let ship_fire = load(&manifest.url(&manifest.ship_fire))?;
    let asteroids = manifest
        .asteroids
        .iter()
        .map(|file| load(&manifest.url(file)))
        .collect::<Result<Vec<_>, _>>()?;

    let bundle = AssetBundle {
        background_mobile,
        background_desktop,
        background_fallback,
        ship_idle,
        ship_fire,
        asteroids,
    };
    bundle.validate()?;
    log::info!("Loaded {} asteroid sprites", bundle.asteroids.len());
    Ok(bundle)
}

/// Immutable set of drawable images
#[derive(Debug, Clone)]
pub struct AssetBundle<I> {
    /// Portrait art (optional, falls back to `background_fallback`)
    pub background_mobile: Option<I>,
    /// Landscape art (optional, falls back to `background_fallback`)
    pub background_desktop: Option<I>,
    pub background_fallback: I,
    pub ship_idle: I,
    pub ship_fire: I,
    pub asteroids: Vec<I>,
}

impl<I> AssetBundle<I> {
    pub fn validate(&self) -> Result<(), AssetError> {
        if self.asteroids.is_empty() {
            return Err(AssetError::MissingAsteroidSprites);
        }
        Ok(())
    }

    pub fn asteroid_sprite(&self, index: usize) -> Option<&I> {
        self.asteroids
            .get(index)
            .or_else(|| self.asteroids.first())
    }
}

impl AssetBundle<HeadlessImage> {
    /// Placeholder bundle with the manifest's names and typical art sizes
    pub fn headless(manifest: &AssetManifest) -> Self {
        Self {
            background_mobile: Some(HeadlessImage::new(
                manifest.background_mobile.as_str(),
                1080.0,
                1920.0,
            )),
            background_desktop: Some(HeadlessImage::new(
                manifest.background_desktop.as_str(),
                1920.0,
                1080.0,
            )),
            background_fallback: HeadlessImage::new(
                manifest.background_fallback.as_str(),
                1024.0,
                1024.0,
            ),
            ship_idle: HeadlessImage::new(manifest.ship_idle.as_str(), 256.0, 256.0),
            ship_fire: HeadlessImage::new(manifest.ship_fire.as_str(), 256.0, 256.0),
            asteroids: manifest
                .asteroids
                .iter()
                .map(|name| HeadlessImage::new(name.as_str(), 128.0, 128.0))
                .collect(),
        }
    }
}

/// Load-once cache for a bundle
///
/// The first successfully stored value wins; later loads reuse it.
#[derive(Debug)]
pub struct AssetCache<T> {
    slot: RefCell<Option<Rc<T>>>,
}

impl<T> Default for AssetCache<T> {
    fn default() -> Self {
        Self {
            slot: RefCell::new(None),
        }
    }
}

impl<T> AssetCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Rc<T>> {
        self.slot.borrow().clone()
    }

    /// Store a loaded value unless one is already present; returns the cached value
    pub fn insert(&self, value: T) -> Rc<T> {
        let mut slot = self.slot.borrow_mut();
        slot.get_or_insert_with(|| Rc::new(value)).clone()
    }

    /// Return the cached value or run the loader once
    ///
    /// A failed load leaves the cache empty so the next call retries.
    pub fn get_or_try_load<E>(&self, load: impl FnOnce() -> Result<T, E>) -> Result<Rc<T>, E> {
        if let Some(value) = self.get() {
            return Ok(value);
        }
        let value = load()?;
        Ok(self.insert(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest_urls() {
        let manifest = AssetManifest::default();
        assert_eq!(manifest.asteroids.len(), ASTEROID_SPRITE_COUNT);
        assert_eq!(manifest.asteroids[0], "asteroid_01.png");
        assert_eq!(manifest.asteroids[9], "asteroid_10.png");
        assert_eq!(
            manifest.url(&manifest.ship_idle),
            "/game-assets/ship_idle.png"
        );
        let custom = AssetManifest {
            base_url: "https://cdn.example/pack/".to_string(),
            ..AssetManifest::default()
        };
        assert_eq!(custom.url("a.png"), "https://cdn.example/pack/a.png");
    }

    #[test]
    fn test_manifest_json_defaults_extraction_off() {
        let mut value = serde_json::to_value(AssetManifest::default()).unwrap();
        value.as_object_mut().unwrap().remove("extract_sprites");
        let manifest: AssetManifest = serde_json::from_value(value).unwrap();
        assert!(!manifest.extract_sprites);
    }

    #[test]
    fn test_bundle_requires_asteroids() {
        let mut bundle = AssetBundle::headless(&AssetManifest::default());
        assert!(bundle.validate().is_ok());
        bundle.asteroids.clear();
        assert_eq!(bundle.validate(), Err(AssetError::MissingAsteroidSprites));
    }

    fn fake_loader(fail: &'static str) -> impl FnMut(&str) -> Result<String, AssetError> {
        move |path: &str| {
            if path.ends_with(fail) {
                Err(AssetError::Load {
                    path: path.to_string(),
                })
            } else {
                Ok(path.to_string())
            }
        }
    }

    #[test]
    fn test_assemble_fails_on_required_image() {
        let manifest = AssetManifest::default();
        let result = assemble_bundle(&manifest, fake_loader("ship_fire.png"));
        assert_eq!(
            result.unwrap_err(),
            AssetError::Load {
                path: "/game-assets/ship_fire.png".to_string()
            }
        );

        let result = assemble_bundle(&manifest, fake_loader("asteroid_07.png"));
        assert_eq!(
            result.unwrap_err(),
            AssetError::Load {
                path: "/game-assets/asteroid_07.png".to_string()
            }
        );
    }

    #[test]
    fn test_assemble_skips_failed_variant() {
        let manifest = AssetManifest::default();
        let bundle = assemble_bundle(&manifest, fake_loader("background_mobile_9x16_1080x1920.png"))
            .unwrap();
        assert!(bundle.background_mobile.is_none());
        assert_eq!(
            bundle.background_desktop.as_deref(),
            Some("/game-assets/background_desktop_16x9_1920x1080.png")
        );
        assert_eq!(bundle.ship_idle, "/game-assets/ship_idle.png");
        assert_eq!(bundle.asteroids.len(), ASTEROID_SPRITE_COUNT);
    }

    #[test]
    fn test_assemble_rejects_empty_asteroid_list() {
        let manifest = AssetManifest {
            asteroids: Vec::new(),
            ..AssetManifest::default()
        };
        let mut requested = Vec::new();
        let result = assemble_bundle(&manifest, |path: &str| {
            requested.push(path.to_string());
            Ok::<_, AssetError>(())
        });
        assert_eq!(result.unwrap_err(), AssetError::MissingAsteroidSprites);
        assert_eq!(requested, manifest.urls());
    }

    #[test]
    fn test_asteroid_sprite_falls_back_to_first() {
        let bundle = AssetBundle::headless(&AssetManifest::default());
        assert_eq!(bundle.asteroid_sprite(3).unwrap().name, "asteroid_04.png");
        assert_eq!(bundle.asteroid_sprite(99).unwrap().name, "asteroid_01.png");
    }

    #[test]
    fn test_cache_loads_once() {
        let cache = AssetCache::new();
        let mut loads = 0;
        let first = cache
            .get_or_try_load(|| {
                loads += 1;
                Ok::<_, AssetError>(AssetBundle::headless(&AssetManifest::default()))
            })
            .unwrap();
        let second = cache
            .get_or_try_load(|| {
                loads += 1;
                Ok::<_, AssetError>(AssetBundle::headless(&AssetManifest::default()))
            })
            .unwrap();
        assert_eq!(loads, 1);
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_cache_retries_after_failure() {
        let cache: AssetCache<u32> = AssetCache::new();
        let err = cache.get_or_try_load(|| {
            Err(AssetError::Load {
                path: "x.png".to_string(),
            })
        });
        assert!(err.is_err());
        assert!(cache.get().is_none());
        assert_eq!(*cache.get_or_try_load(|| Ok::<_, AssetError>(7)).unwrap(), 7);
        // First stored value wins
        assert_eq!(*cache.insert(9), 7);
    }
}
