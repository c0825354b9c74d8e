use std::fmt;
use std::rc::Rc;

use crate::common::{DirectionSet, GridPos, Tick};
use crate::grid::ZoneId;
use crate::interaction::{EffectScope, InteractionRequest};

/// Effect executed when an interaction request is accepted.
#[derive(Clone, Debug)]
pub enum InteractionKind {
    Dialog { text: String },
    Pickup,
    Teleport { zone: ZoneId, position: GridPos },
    Toggle { state: bool },
    Custom(CustomHandler),
}

/// Caller-supplied effect invoked for `custom` interactions.
///
/// Handlers see the request plus an [`EffectScope`] over the store and the
/// bus; they never get direct access to grid or registry internals.
#[derive(Clone)]
pub struct CustomHandler(Rc<dyn Fn(&InteractionRequest, &mut EffectScope<'_>)>);

impl CustomHandler {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&InteractionRequest, &mut EffectScope<'_>) + 'static,
    {
        Self(Rc::new(handler))
    }

    pub fn invoke(&self, request: &InteractionRequest, scope: &mut EffectScope<'_>) {
        (self.0)(request, scope);
    }
}

impl fmt::Debug for CustomHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomHandler(..)")
    }
}

/// Direction-filtered interaction responder.
#[derive(Clone, Debug)]
pub struct InteractableComponent {
    kind: InteractionKind,
    valid_directions: DirectionSet,
    highlight_until: Option<Tick>,
}

impl InteractableComponent {
    pub fn kind(&self) -> &InteractionKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut InteractionKind {
        &mut self.kind
    }

    pub fn valid_directions(&self) -> DirectionSet {
        self.valid_directions
    }

    /// Whether a request arriving from `direction` is eligible.
    pub fn accepts(&self, direction: crate::common::Direction) -> bool {
        self.valid_directions.accepts(direction)
    }

    /// Turns the transient highlight on until `until`. Replacing a pending
    /// highlight cancels it; only the newest expiry counts.
    pub fn set_highlight(&mut self, until: Tick) {
        self.highlight_until = Some(until);
    }

    /// Clears the highlight once its expiry has passed.
    pub fn expire_highlight(&mut self, tick: Tick) {
        if self.highlight_until.is_some_and(|until| tick >= until) {
            self.highlight_until = None;
        }
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlight_until.is_some()
    }

    pub(crate) fn cleanup(&mut self) {
        self.highlight_until = None;
    }
}

/// Interaction type selector for [`InteractableConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionType {
    Dialog,
    Pickup,
    Teleport,
    Toggle,
    Custom,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InteractableConfigError {
    #[error("teleport interaction requires target zone and coordinates")]
    MissingTeleportTarget,

    #[error("custom interaction requires a handler")]
    MissingCustomHandler,
}

/// Construction parameters for [`InteractableComponent`].
///
/// Kept flat (one field per interaction-data key) so template overrides can
/// replace a single key, e.g. a per-placement teleport destination.
#[derive(Clone, Debug, Default)]
pub struct InteractableConfig {
    pub interaction_type: Option<InteractionType>,
    pub text: Option<String>,
    pub target_zone: Option<ZoneId>,
    pub target_x: Option<i32>,
    pub target_y: Option<i32>,
    pub state: Option<bool>,
    pub valid_directions: Option<DirectionSet>,
    pub custom: Option<CustomHandler>,
}

impl InteractableConfig {
    pub fn dialog(text: impl Into<String>) -> Self {
        Self {
            interaction_type: Some(InteractionType::Dialog),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn pickup() -> Self {
        Self {
            interaction_type: Some(InteractionType::Pickup),
            ..Self::default()
        }
    }

    pub fn teleport(zone: impl Into<ZoneId>, x: i32, y: i32) -> Self {
        Self {
            interaction_type: Some(InteractionType::Teleport),
            target_zone: Some(zone.into()),
            target_x: Some(x),
            target_y: Some(y),
            ..Self::default()
        }
    }

    pub fn toggle(initial: bool) -> Self {
        Self {
            interaction_type: Some(InteractionType::Toggle),
            state: Some(initial),
            ..Self::default()
        }
    }

    pub fn custom(handler: CustomHandler) -> Self {
        Self {
            interaction_type: Some(InteractionType::Custom),
            custom: Some(handler),
            ..Self::default()
        }
    }

    pub fn with_valid_directions(mut self, directions: DirectionSet) -> Self {
        self.valid_directions = Some(directions);
        self
    }

    pub(crate) fn build(self) -> Result<InteractableComponent, InteractableConfigError> {
        let kind = match self.interaction_type.unwrap_or(InteractionType::Dialog) {
            InteractionType::Dialog => InteractionKind::Dialog {
                text: self.text.unwrap_or_default(),
            },
            InteractionType::Pickup => InteractionKind::Pickup,
            InteractionType::Teleport => {
                let (Some(zone), Some(x), Some(y)) =
                    (self.target_zone, self.target_x, self.target_y)
                else {
                    return Err(InteractableConfigError::MissingTeleportTarget);
                };
                InteractionKind::Teleport {
                    zone,
                    position: GridPos::new(x, y),
                }
            }
            InteractionType::Toggle => InteractionKind::Toggle {
                state: self.state.unwrap_or(false),
            },
            InteractionType::Custom => {
                let Some(handler) = self.custom else {
                    return Err(InteractableConfigError::MissingCustomHandler);
                };
                InteractionKind::Custom(handler)
            }
        };
        Ok(InteractableComponent {
            kind,
            valid_directions: self.valid_directions.unwrap_or_default(),
            highlight_until: None,
        })
    }
}

/// Per-field template override for [`InteractableConfig`].
#[derive(Clone, Debug, Default)]
pub struct InteractableOverride {
    pub interaction_type: Option<InteractionType>,
    pub text: Option<String>,
    pub target_zone: Option<ZoneId>,
    pub target_x: Option<i32>,
    pub target_y: Option<i32>,
    pub state: Option<bool>,
    pub valid_directions: Option<DirectionSet>,
    pub custom: Option<CustomHandler>,
}

impl InteractableOverride {
    pub fn apply_to(self, config: &mut InteractableConfig) {
        if self.interaction_type.is_some() {
            config.interaction_type = self.interaction_type;
        }
        if self.text.is_some() {
            config.text = self.text;
        }
        if self.target_zone.is_some() {
            config.target_zone = self.target_zone;
        }
        if self.target_x.is_some() {
            config.target_x = self.target_x;
        }
        if self.target_y.is_some() {
            config.target_y = self.target_y;
        }
        if self.state.is_some() {
            config.state = self.state;
        }
        if self.valid_directions.is_some() {
            config.valid_directions = self.valid_directions;
        }
        if self.custom.is_some() {
            config.custom = self.custom;
        }
    }
}
