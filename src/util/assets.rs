use std::{borrow::Cow, sync::OnceLock};

use rust_embed::RustEmbed;
use tracing::error;

/// Embed the `assets/` directory into the binary.
#[derive(RustEmbed)]
#[folder = "assets"]
struct EmbeddedAssets;

static MAIN_CSS: OnceLock<String> = OnceLock::new();
static FAVICON_DATA_URI: OnceLock<String> = OnceLock::new();

pub fn main_css() -> &'static str {
    MAIN_CSS.get_or_init(|| load_text("main.css")).as_str()
}

pub fn favicon_data_uri() -> &'static str {
    FAVICON_DATA_URI
        .get_or_init(|| load_data_uri("favicon.svg"))
        .as_str()
}

fn load_text(name: &str) -> String {
    let Some(asset) = load_asset(name) else {
        return String::new();
    };
    String::from_utf8(asset.into_owned()).unwrap_or_else(|_| {
        error!(asset = name, "embedded asset is not valid UTF-8");
        String::new()
    })
}

fn load_data_uri(name: &str) -> String {
    let Some(asset) = load_asset(name) else {
        return String::new();
    };
    format!("data:{};base64,{}", mime_for(name), encode_base64(&asset))
}

fn load_asset(name: &str) -> Option<Cow<'static, [u8]>> {
    let asset = EmbeddedAssets::get(name.trim_start_matches('/')).map(|file| file.data);
    if asset.is_none() {
        error!(asset = name, "embedded asset missing");
    }
    asset
}

fn mime_for(name: &str) -> &'static str {
    match name.rsplit_once('.').map(|(_, ext)| ext) {
        Some("css") => "text/css",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

fn encode_base64(input: &[u8]) -> String {
    const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut output = String::with_capacity(input.len().div_ceil(3) * 4);

    for chunk in input.chunks(3) {
        let mut block = [0u8; 3];
        block[..chunk.len()].copy_from_slice(chunk);
        let bits = u32::from_be_bytes([0, block[0], block[1], block[2]]);
        for idx in 0..4 {
            if idx <= chunk.len() {
                let sextet = (bits >> (18 - 6 * idx)) & 0x3f;
                output.push(ALPHABET[sextet as usize] as char);
            } else {
                output.push('=');
            }
        }
    }

    output
}
