//! Category colours and theme read from the ActivityWatch settings

use std::collections::HashMap;
use tracing::{debug, error};

use crate::aw_client::AwClient;
use crate::error::Result;
use crate::models::{CategoryClass, Theme, CATEGORY_SEPARATOR};

/// Colour map keyed by joined category label, plus the page theme
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSettings {
    pub colors: HashMap<String, String>,
    pub theme: Theme,
}

/// Fetches classes and theme. Any failure degrades to no colours and the
/// light theme instead of aborting the run.
pub async fn load_settings(client: &AwClient) -> ResolvedSettings {
    match try_load_settings(client).await {
        Ok(settings) => {
            debug!(
                colors = settings.colors.len(),
                theme = ?settings.theme,
                "Resolved category colours and theme"
            );
            settings
        }
        Err(e) => {
            error!("Error loading categories and theme from server: {}", e);
            ResolvedSettings::default()
        }
    }
}

async fn try_load_settings(client: &AwClient) -> Result<ResolvedSettings> {
    let classes = client.get_classes().await?;
    let theme = client.get_theme().await?;

    Ok(ResolvedSettings {
        colors: resolve_colors(&classes),
        theme,
    })
}

/// Maps every class label to its own colour or the nearest ancestor's.
///
/// Classes with no coloured ancestor are left out so callers can apply
/// their own fallback.
pub fn resolve_colors(classes: &[CategoryClass]) -> HashMap<String, String> {
    // First definition of a label wins
    let mut own_colors: HashMap<String, Option<&str>> = HashMap::new();
    for class in classes {
        own_colors.entry(class.label()).or_insert_with(|| class.color());
    }

    classes
        .iter()
        .filter_map(|class| {
            find_color_in_hierarchy(&class.name, &own_colors)
                .map(|color| (class.label(), color.to_string()))
        })
        .collect()
}

fn find_color_in_hierarchy<'a>(
    name_path: &[String],
    own_colors: &HashMap<String, Option<&'a str>>,
) -> Option<&'a str> {
    (1..=name_path.len()).rev().find_map(|depth| {
        let ancestor = name_path[..depth].join(CATEGORY_SEPARATOR);
        own_colors.get(&ancestor).copied().flatten()
    })
}
