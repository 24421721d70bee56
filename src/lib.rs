//! # Block Render
//!
//! Sizing constants and connection-shape geometry for rendering blocks in a
//! node-based visual programming editor. The crate centers on the
//! [`ConstantProvider`]: one instance per rendering context that
//! - owns the grid-derived constant table governing block layout,
//! - builds the connection-shape descriptors (hexagonal, rounded, squared,
//!   notch) and the inside-corner geometry for statement mouths,
//! - selects a shape for any connection via [`ConstantProvider::shape_for`],
//! - materializes reusable glow filters into a drawing surface, and
//! - emits renderer-scoped stylesheet fragments.
//!
//! A layout engine asks `shape_for` for a descriptor, then calls the
//! descriptor's path functions with the block's content height and concatenates
//! the returned fragments into a closed outline path.
//!
//! ## Example
//!
//! ```
//! use block_render::{Connection, ConnectionKind, ConstantProvider, ShapeKind};
//!
//! let provider = ConstantProvider::new();
//! let socket = Connection::with_checks(ConnectionKind::InputValue, vec!["Number".into()]);
//!
//! let shape = provider.shape_for(&socket).unwrap();
//! assert_eq!(shape.kind(), ShapeKind::Round);
//!
//! let edge = shape.as_dynamic().unwrap().path_down(24.0);
//! assert_eq!(edge, "a 12 12 0 0 0 0,24 ");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod colours;
mod constants;
mod dom;
pub mod paths;
mod shapes;
mod types;

pub use constants::{ConstantOverrides, ConstantProvider, FIELD_SHAPE_TAG};
pub use dom::{create_svg_element, Element};
pub use shapes::{
    make_hexagonal, make_inside_corners, make_notch, make_rounded, make_squared, make_start_hat,
    ConnectionShape, DynamicShape, InsideCorners, Notch, StartHat,
};
pub use types::{Connection, ConnectionKind, ShapeError, ShapeKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_socket_end_to_end() {
        let provider = ConstantProvider::new();
        assert_eq!(provider.grid_unit, 4.0);

        let socket =
            Connection::with_checks(ConnectionKind::InputValue, vec!["Number".to_string()]);
        let shape = provider.shape_for(&socket).unwrap();
        assert_eq!(shape.kind(), ShapeKind::Round);
        assert!(shape.is_dynamic());

        let dynamic = shape.as_dynamic().unwrap();
        assert_eq!(dynamic.width(24.0), 12.0);
        assert_eq!(dynamic.path_down(24.0), "a 12 12 0 0 0 0,24 ");
    }

    #[test]
    fn test_outline_assembly_from_fragments() {
        let provider = ConstantProvider::new();
        let notch = provider.notch.as_notch().unwrap();
        let corners = &provider.inside_corners;

        // A top edge for a statement block: corner, lead-in, notch, run-out.
        let top = format!(
            "{}{}{}{}",
            paths::move_to(0.0, 0.0),
            paths::line_on_axis('h', provider.notch_offset_left),
            notch.path_left.clone(),
            paths::line_on_axis('h', provider.min_block_width)
        );
        assert!(top.starts_with("M 0,0 "));
        assert!(top.contains(&notch.path_left));
        assert!(!corners.path_top.is_empty());
    }

    #[test]
    fn test_provider_lifecycle() {
        let mut provider = ConstantProvider::new();
        let surface = Element::new("svg");

        provider.create_dom(&surface);
        let id = provider.selected_glow_filter_id.clone();
        assert!(surface.find_by_id(&id).is_some());

        provider.dispose();
        assert!(surface.find_by_id(&id).is_none());
    }
}
