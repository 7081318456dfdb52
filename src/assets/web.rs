//! Browser asset loading
//!
//! Images are fetched once per page. Concurrent callers share the in-flight
//! load and every later call gets the cached bundle.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use js_sys::Promise;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::extract::{DEFAULT_ALPHA_THRESHOLD, DEFAULT_PADDING, primary_component};
use super::{AssetBundle, AssetCache, AssetManifest, assemble_bundle};
use crate::error::AssetError;
use crate::renderer::canvas::WebImage;

thread_local! {
    static CACHE: AssetCache<AssetBundle<WebImage>> = AssetCache::new();
    static IN_FLIGHT: RefCell<Option<Promise>> = const { RefCell::new(None) };
    static LAST_ERROR: RefCell<Option<AssetError>> = const { RefCell::new(None) };
}

/// Load (or reuse) the sprite bundle described by `manifest`
///
/// A failed load is not cached; the next call tries again.
pub async fn load_bundle(manifest: &AssetManifest) -> Result<Rc<AssetBundle<WebImage>>, AssetError> {
    if let Some(bundle) = CACHE.with(AssetCache::get) {
        return Ok(bundle);
    }

    let pending = IN_FLIGHT.with(|slot| slot.borrow().clone());
    let promise = match pending {
        Some(promise) => promise,
        None => {
            let owned = manifest.clone();
            let promise = future_to_promise(async move {
                let result = fetch_bundle(&owned).await;
                IN_FLIGHT.with(|slot| slot.borrow_mut().take());
                match result {
                    Ok(bundle) => {
                        CACHE.with(|cache| cache.insert(bundle));
                        Ok(JsValue::UNDEFINED)
                    }
                    Err(err) => {
                        let message = err.to_string();
                        LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(err));
                        Err(JsValue::from_str(&message))
                    }
                }
            });
            IN_FLIGHT.with(|slot| *slot.borrow_mut() = Some(promise.clone()));
            promise
        }
    };

    let fallback = || AssetError::Load {
        path: manifest.base_url.clone(),
    };
    match JsFuture::from(promise).await {
        Ok(_) => CACHE.with(AssetCache::get).ok_or_else(fallback),
        Err(_) => Err(LAST_ERROR
            .with(|slot| slot.borrow().clone())
            .unwrap_or_else(fallback)),
    }
}

/// Fetch every image up front, then assemble in manifest order
async fn fetch_bundle(manifest: &AssetManifest) -> Result<AssetBundle<WebImage>, AssetError> {
    let asteroid_urls: HashSet<String> = manifest.asteroids.iter().map(|f| manifest.url(f)).collect();
    let mut fetched = HashMap::new();
    for url in manifest.urls() {
        if fetched.contains_key(&url) {
            continue;
        }
        let extract = manifest.extract_sprites && asteroid_urls.contains(&url);
        let image = fetch_image(&url, manifest.extract_sprites, extract).await;
        fetched.insert(url, image);
    }

    assemble_bundle(manifest, |url: &str| {
        fetched.get(url).cloned().unwrap_or_else(|| {
            Err(AssetError::Load {
                path: url.to_string(),
            })
        })
    })
}

async fn fetch_image(url: &str, cors: bool, extract: bool) -> Result<WebImage, AssetError> {
    let image = load_image(url, cors).await?;
    if extract {
        extract_sprite(&image, url)
    } else {
        Ok(WebImage::Element(image))
    }
}

/// Resolve once the element has decoded `url`
async fn load_image(url: &str, cors: bool) -> Result<HtmlImageElement, AssetError> {
    let failed = || AssetError::Load {
        path: url.to_string(),
    };
    let image = HtmlImageElement::new().map_err(|_| failed())?;
    if cors {
        // Pixel readback needs an untainted canvas
        image.set_cross_origin(Some("anonymous"));
    }

    let target = image.clone();
    let source = url.to_string();
    let loaded = Promise::new(&mut |resolve, reject| {
        target.set_onload(Some(&resolve));
        target.set_onerror(Some(&reject));
        target.set_src(&source);
    });
    let result = JsFuture::from(loaded).await;
    image.set_onload(None);
    image.set_onerror(None);
    result.map_err(|_| failed())?;
    Ok(image)
}

/// Cut the dominant blob out of `image` into a square canvas
///
/// Images with no opaque pixels are used as-is.
fn extract_sprite(image: &HtmlImageElement, path: &str) -> Result<WebImage, AssetError> {
    let (width, height) = (image.natural_width(), image.natural_height());
    let (_, ctx) = scratch_canvas(width, height, path)?;
    let failed = || AssetError::Extraction {
        path: path.to_string(),
    };

    ctx.draw_image_with_html_image_element(image, 0.0, 0.0)
        .map_err(|_| failed())?;
    let pixels = ctx
        .get_image_data(0.0, 0.0, width as f64, height as f64)
        .map_err(|_| failed())?
        .data();

    let Some(crop) = primary_component(
        &pixels.0,
        width as usize,
        height as usize,
        DEFAULT_ALPHA_THRESHOLD,
        DEFAULT_PADDING,
    ) else {
        return Ok(WebImage::Element(image.clone()));
    };

    let side = crop.square_side();
    let (offset_x, offset_y) = crop.square_offset();
    let (sprite, sprite_ctx) = scratch_canvas(side, side, path)?;
    sprite_ctx
        .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
            image,
            crop.x as f64,
            crop.y as f64,
            crop.width as f64,
            crop.height as f64,
            offset_x as f64,
            offset_y as f64,
            crop.width as f64,
            crop.height as f64,
        )
        .map_err(|_| failed())?;
    Ok(WebImage::Canvas(sprite))
}

fn scratch_canvas(
    width: u32,
    height: u32,
    path: &str,
) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), AssetError> {
    let failed = || AssetError::Extraction {
        path: path.to_string(),
    };
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(failed)?;
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|_| failed())?
        .dyn_into()
        .map_err(|_| failed())?;
    canvas.set_width(width.max(1));
    canvas.set_height(height.max(1));
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .ok()
        .flatten()
        .ok_or_else(failed)?
        .dyn_into()
        .map_err(|_| failed())?;
    Ok((canvas, ctx))
}
