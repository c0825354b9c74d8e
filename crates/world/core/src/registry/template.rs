use super::component::{ComponentConfig, ComponentOverride};

/// Construction parameters for a new entity.
#[derive(Clone, Debug)]
pub struct EntityConfig {
    pub tags: Vec<String>,
    pub z_index: i32,
    pub active: bool,
    pub components: Vec<ComponentConfig>,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityConfig {
    pub fn new() -> Self {
        Self {
            tags: Vec::new(),
            z_index: 0,
            active: true,
            components: Vec::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_component(mut self, component: ComponentConfig) -> Self {
        self.components.push(component);
        self
    }
}

/// Named, reusable entity blueprint cloned at instantiation time.
#[derive(Clone, Debug)]
pub struct EntityTemplate {
    pub kind: String,
    pub config: EntityConfig,
}

impl EntityTemplate {
    pub fn new(kind: impl Into<String>, config: EntityConfig) -> Self {
        Self {
            kind: kind.into(),
            config,
        }
    }

    /// Deep-clones the template and merges `overrides`:
    ///
    /// - component configs merge per kind, override winning per key; kinds
    ///   present on either side are kept;
    /// - tags concatenate without de-duplication (later `add_tag` calls are
    ///   the de-duplication point);
    /// - scalar fields are plainly overwritten when set.
    pub fn instantiate(&self, overrides: EntityOverrides) -> (String, EntityConfig) {
        let mut config = self.config.clone();
        let kind = overrides.kind.unwrap_or_else(|| self.kind.clone());

        config.tags.extend(overrides.tags);
        if let Some(z_index) = overrides.z_index {
            config.z_index = z_index;
        }
        if let Some(active) = overrides.active {
            config.active = active;
        }

        for component_override in overrides.components {
            match config
                .components
                .iter_mut()
                .find(|component| component.kind() == component_override.kind())
            {
                Some(component) => component_override.apply(component),
                None => config.components.push(component_override.into_config()),
            }
        }

        (kind, config)
    }
}

/// Per-instantiation adjustments layered over a template.
#[derive(Clone, Debug, Default)]
pub struct EntityOverrides {
    pub kind: Option<String>,
    pub tags: Vec<String>,
    pub z_index: Option<i32>,
    pub active: Option<bool>,
    pub components: Vec<ComponentOverride>,
}

impl EntityOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_component(mut self, component: ComponentOverride) -> Self {
        self.components.push(component);
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::registry::component::{InteractableConfig, InteractableOverride, TileConfig};

    use super::*;

    fn template() -> EntityTemplate {
        EntityTemplate::new(
            "portal",
            EntityConfig::new()
                .with_tag("interactable")
                .with_component(ComponentConfig::Tile(TileConfig::new("portal")))
                .with_component(ComponentConfig::Interactable(InteractableConfig::teleport(
                    "hub", 0, 0,
                ))),
        )
    }

    #[test]
    fn override_wins_per_key_within_a_component() {
        let overrides = EntityOverrides::none().with_component(ComponentOverride::Interactable(
            InteractableOverride {
                target_zone: Some("cave".into()),
                target_x: Some(5),
                target_y: Some(5),
                ..InteractableOverride::default()
            },
        ));
        let (_, config) = template().instantiate(overrides);

        let interactable = config
            .components
            .iter()
            .find_map(|component| match component {
                ComponentConfig::Interactable(c) => Some(c),
                _ => None,
            })
            .expect("interactable kept");
        assert_eq!(interactable.target_zone, Some("cave".into()));
        // Untouched keys keep the template's values.
        assert!(interactable.text.is_none());

        // The tile component was not disturbed.
        assert!(
            config
                .components
                .iter()
                .any(|component| matches!(component, ComponentConfig::Tile(_)))
        );
    }

    #[test]
    fn tags_concatenate_without_dedup() {
        let overrides = EntityOverrides::none()
            .with_tag("interactable")
            .with_tag("quest");
        let (_, config) = template().instantiate(overrides);
        assert_eq!(config.tags, vec!["interactable", "interactable", "quest"]);
    }

    #[test]
    fn new_component_kinds_from_overrides_are_kept() {
        let overrides = EntityOverrides::none().with_component(ComponentOverride::Actor(
            crate::registry::component::ActorOverride {
                controlled: Some(true),
                ..Default::default()
            },
        ));
        let (_, config) = template().instantiate(overrides);
        assert_eq!(config.components.len(), 3);
    }
}
