use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// Fixed draw/occupancy strata within a cell.
///
/// Iteration order (via [`strum::IntoEnumIterator`]) is the canonical
/// bottom-to-top order used when a query spans all layers.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Layer {
    Ground = 0,
    Object = 1,
    Actor = 2,
    Ui = 3,
}

impl Default for Layer {
    fn default() -> Self {
        Layer::Object
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn iteration_order_is_bottom_to_top() {
        let order: Vec<Layer> = Layer::iter().collect();
        assert_eq!(
            order,
            vec![Layer::Ground, Layer::Object, Layer::Actor, Layer::Ui]
        );
    }
}
