//! OpenEXR header reading: channel list -> channel layers.
//!
//! Only the header is read (no pixels). Channel names are folded into
//! compositor-style layers:
//!
//! ```text
//! R, G, B, A             -> rgba.{red,green,blue,alpha}
//! Z                      -> depth.Z
//! diffuse.R ...          -> diffuse.{red,...}
//! crypto.a.b.R           -> crypto.a.b.red
//! (part "spec") R, G, B  -> spec.{red,green,blue}
//! ```

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;
use std::path::Path;

use crate::entities::ChannelLayer;
use crate::entities::keys::{CH_ALPHA, CH_BLUE, CH_GREEN, CH_RED, LAYER_RGBA};

/// Read the channel layers of an EXR file, in order of first appearance.
pub fn read_channel_layers(path: &Path) -> Result<Vec<ChannelLayer>> {
    debug!("Reading EXR header: {}", path.display());

    let meta = ::exr::meta::MetaData::read_from_file(path, false)
        .with_context(|| format!("Failed to read EXR header: {}", path.display()))?;

    let mut names = Vec::new();
    for header in meta.headers.iter() {
        let part = header.own_attributes.layer_name.as_ref().map(|t| t.to_string());
        for channel in header.channels.list.iter() {
            let name = channel.name.to_string();
            names.push(match &part {
                Some(part) if !name.contains('.') => format!("{}.{}", part, name),
                _ => name,
            });
        }
    }

    let layers = group_channels(names.iter().map(String::as_str));
    debug!("{} channel layers in {}", layers.len(), path.display());
    Ok(layers)
}

/// Group full channel names into layers.
pub fn group_channels<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<ChannelLayer> {
    let mut layers: IndexMap<String, Vec<String>> = IndexMap::new();

    for name in names {
        let (layer, channel) = split_channel(name);
        let channels = layers.entry(layer).or_default();
        if !channels.contains(&channel) {
            channels.push(channel);
        }
    }

    layers
        .into_iter()
        .map(|(name, channels)| ChannelLayer { name, channels })
        .collect()
}

fn split_channel(name: &str) -> (String, String) {
    match name.rsplit_once('.') {
        Some((layer, channel)) => (layer.to_string(), long_channel_name(channel)),
        None => match long_channel_name(name).as_str() {
            c @ (CH_RED | CH_GREEN | CH_BLUE | CH_ALPHA) => (LAYER_RGBA.to_string(), c.to_string()),
            "Z" => ("depth".to_string(), "Z".to_string()),
            other => ("other".to_string(), other.to_string()),
        },
    }
}

fn long_channel_name(channel: &str) -> String {
    match channel {
        "R" | "r" => CH_RED.to_string(),
        "G" | "g" => CH_GREEN.to_string(),
        "B" | "b" => CH_BLUE.to_string(),
        "A" | "a" => CH_ALPHA.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_channels() {
        let layers = group_channels([
            "A", "B", "G", "R", "Z",
            "diffuse.B", "diffuse.G", "diffuse.R",
            "metadata.id",
            "crypto.a.b.R",
        ]);

        assert_eq!(layers[0], ChannelLayer::new("rgba", &["alpha", "blue", "green", "red"]));
        assert_eq!(layers[1], ChannelLayer::new("depth", &["Z"]));
        assert_eq!(layers[2], ChannelLayer::new("diffuse", &["blue", "green", "red"]));
        assert_eq!(layers[3], ChannelLayer::new("metadata", &["id"]));
        assert_eq!(layers[4], ChannelLayer::new("crypto.a.b", &["red"]));
        assert!(!layers[3].has_color());
    }

    #[test]
    fn test_long_names_pass_through() {
        let layers = group_channels(["specular.red", "specular.green", "specular.red"]);
        assert_eq!(layers, vec![ChannelLayer::new("specular", &["red", "green"])]);
    }

    fn flat_layer(
        part: Option<&str>,
        channels: &[&str],
    ) -> ::exr::prelude::Layer<::exr::prelude::AnyChannels<::exr::prelude::FlatSamples>> {
        use ::exr::prelude::*;

        let size = Vec2(2, 2);
        let list: Vec<AnyChannel<FlatSamples>> = channels
            .iter()
            .map(|name| AnyChannel::new(*name, FlatSamples::F32(vec![0.5; 4])))
            .collect();
        let attributes = match part {
            Some(name) => LayerAttributes::named(name),
            None => LayerAttributes::default(),
        };
        Layer::new(size, attributes, Encoding::FAST_LOSSLESS, AnyChannels::sort(list.into()))
    }

    #[test]
    fn test_read_layered_file() {
        use ::exr::prelude::*;

        let path = std::env::temp_dir().join("aov_compositor_test_layered.exr");
        let layer = flat_layer(
            None,
            &[
                "R", "G", "B",
                "diffuse.R", "diffuse.G", "diffuse.B",
                "specular.R", "specular.G", "specular.B",
                "metadata.id",
            ],
        );
        Image::from_layer(layer).write().to_file(&path).unwrap();

        let layers = read_channel_layers(&path).unwrap();
        let names: Vec<_> = layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["rgba", "diffuse", "metadata", "specular"]);
        assert_eq!(layers[0], ChannelLayer::new("rgba", &["blue", "green", "red"]));
        assert_eq!(layers[1], ChannelLayer::new("diffuse", &["blue", "green", "red"]));
        assert!(!layers[2].has_color());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_read_multi_part_file() {
        use ::exr::prelude::*;

        let path = std::env::temp_dir().join("aov_compositor_test_multi_part.exr");
        let layers = [
            flat_layer(Some("diffuse"), &["R", "G", "B"]),
            flat_layer(Some("specular"), &["R", "G", "B", "A"]),
            flat_layer(Some("extra"), &["coat.R", "coat.G", "coat.B"]),
        ];
        Image::from_layers(ImageAttributes::new(IntegerBounds::from_dimensions(Vec2(2, 2))), layers.to_vec())
            .write()
            .to_file(&path)
            .unwrap();

        let layers = read_channel_layers(&path).unwrap();
        assert_eq!(
            layers,
            vec![
                ChannelLayer::new("diffuse", &["blue", "green", "red"]),
                ChannelLayer::new("specular", &["alpha", "blue", "green", "red"]),
                // Already-prefixed channels keep their own layer
                ChannelLayer::new("coat", &["blue", "green", "red"]),
            ]
        );

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_error() {
        let missing = std::env::temp_dir().join("aov_compositor_missing_header.exr");
        assert!(read_channel_layers(&missing).is_err());
    }
}
