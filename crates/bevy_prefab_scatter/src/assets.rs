use core::result::Result;

use bevy::asset::io::Reader;
use bevy::asset::{AssetLoader, LoadContext};
use bevy::prelude::*;
use bevy::reflect::TypePath;
use bevy::tasks::ConditionalSendFuture;
use prefab_scatter::prelude::ScatterConfig;
use serde::{Deserialize, Serialize};

use crate::PrefabScatter;

/// Asset holding a complete [`ScatterConfig`].
#[derive(Asset, TypePath, Clone, Debug, Serialize, Deserialize)]
pub struct PrefabScatterAsset {
    pub config: ScatterConfig,
}

/// Points a [`PrefabScatter`] at a config asset. The component's config follows the asset,
/// including hot reloads.
#[derive(Component, Debug, Clone)]
#[require(PrefabScatter)]
pub struct PrefabScatterSource(pub Handle<PrefabScatterAsset>);

/// Registers [`PrefabScatterAsset`] and its loader. Requires `AssetPlugin`.
pub struct PrefabScatterAssetPlugin;

impl Plugin for PrefabScatterAssetPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<PrefabScatterAsset>()
            .init_asset_loader::<PrefabScatterAssetLoader>()
            .add_systems(PreUpdate, apply_scatter_assets);
    }
}

/// Asset loader for [`PrefabScatterAsset`] using RON files with `.prefab_scatter` extension.
#[derive(TypePath)]
pub struct PrefabScatterAssetLoader;

impl AssetLoader for PrefabScatterAssetLoader {
    type Asset = PrefabScatterAsset;
    type Settings = ();
    type Error = anyhow::Error;

    fn extensions(&self) -> &[&str] {
        &["prefab_scatter"]
    }

    fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _context: &mut LoadContext,
    ) -> impl ConditionalSendFuture<Output = Result<Self::Asset, Self::Error>> {
        Box::pin(async move {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).await?;
            let asset: PrefabScatterAsset =
                ron::de::from_bytes(&bytes).map_err(|e| anyhow::anyhow!(e))?;
            if let Err(err) = asset.config.validate() {
                warn!("Loaded prefab scatter config is invalid: {}.", err);
            }
            Ok(asset)
        })
    }
}

impl FromWorld for PrefabScatterAssetLoader {
    fn from_world(_: &mut World) -> Self {
        PrefabScatterAssetLoader
    }
}

/// Copies loaded or modified asset configs into the components that reference them.
fn apply_scatter_assets(
    mut asset_events: MessageReader<AssetEvent<PrefabScatterAsset>>,
    assets: Res<Assets<PrefabScatterAsset>>,
    mut scatters: Query<(Ref<PrefabScatterSource>, &mut PrefabScatter)>,
) {
    let changed: Vec<AssetId<PrefabScatterAsset>> = asset_events
        .read()
        .filter_map(|event| match event {
            AssetEvent::Added { id } | AssetEvent::Modified { id } => Some(*id),
            _ => None,
        })
        .collect();

    for (source, mut scatter) in scatters.iter_mut() {
        let id = source.0.id();
        if !source.is_changed() && !changed.contains(&id) {
            continue;
        }
        if let Some(asset) = assets.get(id) {
            if scatter.config != asset.config {
                scatter.config = asset.config.clone();
            }
        }
    }
}
