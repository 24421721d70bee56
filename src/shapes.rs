//! Connection-shape descriptors and their factories.
//!
//! A shape descriptor is the geometry contract for one connection-shape family:
//! how wide the shape wants to be for a given content height, where the mating
//! connection point sits, and the relative path fragments tracing its edge. The
//! dynamic families (hexagonal, rounded, squared) scale with the connected block's
//! height at render time; the notch and the inside corners are fixed.
//!
//! Descriptors are plain immutable values. Factories take every constant they
//! depend on as an explicit parameter, so a descriptor can only be built after the
//! provider's base constants are finalized.
//!
//! All sizing and path functions assume a validated positive height; this is a
//! documented precondition, not a runtime check.

use crate::paths;
use crate::types::ShapeKind;

/// Edge geometry of a dynamic connection shape.
///
/// Each profile knows how to trace one edge segment of the shape between two
/// endpoints `height` apart, in any of the four orientations.
#[derive(Debug, Clone, PartialEq)]
enum EdgeProfile {
    /// Two straight segments forming a chevron; horizontal excursion `height / 2`.
    Chevron,
    /// A single circular arc of radius `height / 2`.
    Arc,
    /// Two fixed-radius quarter-circle corners joined by a straight run.
    SquareCorners {
        /// Corner radius shared with the block outline.
        radius: f64,
    },
}

impl EdgeProfile {
    /// Traces one edge segment of the shape.
    ///
    /// The `up` flag flips the vertical direction of travel; `right` selects the
    /// right-hand side of the block, mirroring the horizontal excursion. Arc sweep
    /// flags are chosen so the curve bulges away from the block body in every
    /// orientation.
    fn main_path(&self, height: f64, up: bool, right: bool) -> String {
        let dy = if up { -1.0 } else { 1.0 };
        match *self {
            EdgeProfile::Chevron => {
                let width = height / 2.0;
                let direction = if right { -1.0 } else { 1.0 };
                let excursion = dy * height / 2.0;
                format!(
                    "{}{}",
                    paths::line_to(-direction * width, excursion),
                    paths::line_to(direction * width, excursion)
                )
            }
            EdgeProfile::Arc => {
                let edge_width = height / 2.0;
                let flags = if up || right { "0 0 1" } else { "0 0 0" };
                paths::arc('a', flags, edge_width, &paths::point(0.0, dy * edge_width * 2.0))
            }
            EdgeProfile::SquareCorners { radius } => {
                let inner_height = height - radius * 2.0;
                let dx = if right { 1.0 } else { -1.0 };
                let flags = if up || right { "0 0 1" } else { "0 0 0" };
                format!(
                    "{}{}{}",
                    paths::arc('a', flags, radius, &paths::point(dx * radius, dy * radius)),
                    paths::line_on_axis('v', dy * inner_height),
                    paths::arc('a', flags, radius, &paths::point(-dx * radius, dy * radius))
                )
            }
        }
    }
}

/// A connection shape whose dimensions follow the connected block's content
/// height at render time.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicShape {
    kind: ShapeKind,
    profile: EdgeProfile,
}

impl DynamicShape {
    /// The shape family tag of this descriptor.
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// The companion width the shape proposes for a block of the given height.
    pub fn width(&self, height: f64) -> f64 {
        match self.profile {
            EdgeProfile::Chevron | EdgeProfile::Arc => height / 2.0,
            // Width is the corner radius no matter how tall the block grows.
            EdgeProfile::SquareCorners { radius } => radius,
        }
    }

    /// The shape never changes a block's height; identity by design.
    pub fn height(&self, height: f64) -> f64 {
        height
    }

    /// Horizontal offset of the mating connection point: one descriptor width
    /// inward from the block edge.
    pub fn connection_offset_x(&self, connection_width: f64) -> f64 {
        -connection_width
    }

    /// Vertical offset of the mating connection point: centered on the shape.
    pub fn connection_offset_y(&self, connection_height: f64) -> f64 {
        connection_height / 2.0
    }

    /// Edge fragment drawn downward on the left-hand side of the block.
    pub fn path_down(&self, height: f64) -> String {
        self.profile.main_path(height, false, false)
    }

    /// Edge fragment drawn upward on the left-hand side of the block.
    pub fn path_up(&self, height: f64) -> String {
        self.profile.main_path(height, true, false)
    }

    /// Edge fragment drawn downward on the right-hand side of the block.
    pub fn path_right_down(&self, height: f64) -> String {
        self.profile.main_path(height, false, true)
    }

    /// Edge fragment drawn upward on the right-hand side of the block.
    pub fn path_right_up(&self, height: f64) -> String {
        self.profile.main_path(height, true, true)
    }
}

/// The fixed tab/socket pair connecting sequential statement blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Notch {
    /// Total width of the notch.
    pub width: f64,
    /// Total height of the notch.
    pub height: f64,
    /// Path fragment drawn left to right.
    pub path_left: String,
    /// Path fragment drawn right to left.
    pub path_right: String,
}

/// Quarter-circle fragments for the inside corners of statement mouths.
#[derive(Debug, Clone, PartialEq)]
pub struct InsideCorners {
    /// Width consumed by the left-side corners.
    pub width: f64,
    /// Height consumed by the left-side corners.
    pub height: f64,
    /// Inner top-left corner fragment.
    pub path_top: String,
    /// Inner bottom-left corner fragment.
    pub path_bottom: String,
    /// Width consumed by the right-side corners.
    pub right_width: f64,
    /// Height consumed by the right-side corners.
    pub right_height: f64,
    /// Inner top-right corner fragment.
    pub path_top_right: String,
    /// Inner bottom-right corner fragment.
    pub path_bottom_right: String,
}

/// The decorative cap drawn on top of event/start blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct StartHat {
    /// Total width of the hat.
    pub width: f64,
    /// Rise of the hat above the block's top edge.
    pub height: f64,
    /// Path fragment for the hat curve, drawn left to right.
    pub path: String,
}

/// A descriptor returned by shape selection: either one of the dynamic value
/// shapes or the fixed statement notch.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionShape {
    /// Hexagonal, rounded or squared value shape.
    Dynamic(DynamicShape),
    /// Statement notch.
    Notch(Notch),
}

impl ConnectionShape {
    /// The shape family tag of this descriptor.
    pub fn kind(&self) -> ShapeKind {
        match self {
            ConnectionShape::Dynamic(shape) => shape.kind(),
            ConnectionShape::Notch(_) => ShapeKind::Notch,
        }
    }

    /// Whether the shape's dimensions depend on the connected block's height.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, ConnectionShape::Dynamic(_))
    }

    /// The shape's width for a block of the given content height.
    pub fn width(&self, height: f64) -> f64 {
        match self {
            ConnectionShape::Dynamic(shape) => shape.width(height),
            ConnectionShape::Notch(notch) => notch.width,
        }
    }

    /// The shape's height for a block of the given content height.
    pub fn height(&self, height: f64) -> f64 {
        match self {
            ConnectionShape::Dynamic(shape) => shape.height(height),
            ConnectionShape::Notch(notch) => notch.height,
        }
    }

    /// The dynamic descriptor, if this shape scales with content height.
    pub fn as_dynamic(&self) -> Option<&DynamicShape> {
        match self {
            ConnectionShape::Dynamic(shape) => Some(shape),
            ConnectionShape::Notch(_) => None,
        }
    }

    /// The notch descriptor, if this is the fixed statement shape.
    pub fn as_notch(&self) -> Option<&Notch> {
        match self {
            ConnectionShape::Dynamic(_) => None,
            ConnectionShape::Notch(notch) => Some(notch),
        }
    }
}

/// Builds the hexagonal (boolean) value shape.
pub fn make_hexagonal() -> ConnectionShape {
    ConnectionShape::Dynamic(DynamicShape {
        kind: ShapeKind::Hexagonal,
        profile: EdgeProfile::Chevron,
    })
}

/// Builds the rounded (reporter) value shape.
pub fn make_rounded() -> ConnectionShape {
    ConnectionShape::Dynamic(DynamicShape {
        kind: ShapeKind::Round,
        profile: EdgeProfile::Arc,
    })
}

/// Builds the squared value shape with the given corner radius.
pub fn make_squared(corner_radius: f64) -> ConnectionShape {
    ConnectionShape::Dynamic(DynamicShape {
        kind: ShapeKind::Square,
        profile: EdgeProfile::SquareCorners {
            radius: corner_radius,
        },
    })
}

/// Builds the statement notch for the given fixed dimensions.
///
/// Each side is three cubic curves and two straight runs; the right-hand variant
/// mirrors the left by negating the horizontal control-point direction.
pub fn make_notch(width: f64, height: f64) -> Notch {
    let inner_width = width / 3.0;
    let curve_width = inner_width / 3.0;

    let half_height = height / 2.0;
    let quarter_height = half_height / 2.0;

    let main_path = |dir: f64| -> String {
        format!(
            "{}{}{}{}{}{}{}",
            paths::curve(
                'c',
                &[
                    paths::point(dir * curve_width / 2.0, 0.0),
                    paths::point(dir * curve_width * 3.0 / 4.0, quarter_height / 2.0),
                    paths::point(dir * curve_width, quarter_height),
                ],
            ),
            paths::line(&[paths::point(dir * curve_width, half_height)]),
            paths::curve(
                'c',
                &[
                    paths::point(dir * curve_width / 4.0, quarter_height / 2.0),
                    paths::point(dir * curve_width / 2.0, quarter_height),
                    paths::point(dir * curve_width, quarter_height),
                ],
            ),
            paths::line_on_axis('h', dir * inner_width),
            paths::curve(
                'c',
                &[
                    paths::point(dir * curve_width / 2.0, 0.0),
                    paths::point(dir * curve_width * 3.0 / 4.0, -(quarter_height / 2.0)),
                    paths::point(dir * curve_width, -quarter_height),
                ],
            ),
            paths::line(&[paths::point(dir * curve_width, -half_height)]),
            paths::curve(
                'c',
                &[
                    paths::point(dir * curve_width / 4.0, -(quarter_height / 2.0)),
                    paths::point(dir * curve_width / 2.0, -quarter_height),
                    paths::point(dir * curve_width, -quarter_height),
                ],
            ),
        )
    };

    Notch {
        width,
        height,
        path_left: main_path(1.0),
        path_right: main_path(-1.0),
    }
}

/// Builds the inside-corner fragments for statement mouths.
///
/// Large-arc flags are fixed at 0; the sweep flag alternates by corner so the
/// curvature stays consistent with the block's outward boundary.
pub fn make_inside_corners(radius: f64) -> InsideCorners {
    let inner_top_left = paths::arc('a', "0 0 0", radius, &paths::point(-radius, radius));
    let inner_top_right = paths::arc('a', "0 0 1", radius, &paths::point(-radius, radius));
    let inner_bottom_left = paths::arc('a', "0 0 0", radius, &paths::point(radius, radius));
    let inner_bottom_right = paths::arc('a', "0 0 1", radius, &paths::point(radius, radius));

    InsideCorners {
        width: radius,
        height: radius,
        path_top: inner_top_left,
        path_bottom: inner_bottom_left,
        right_width: radius,
        right_height: radius,
        path_top_right: inner_top_right,
        path_bottom_right: inner_bottom_right,
    }
}

/// Builds the start-hat cap for the given fixed dimensions.
pub fn make_start_hat(width: f64, height: f64) -> StartHat {
    let path = paths::curve(
        'c',
        &[
            paths::point(25.0, -height),
            paths::point(71.0, -height),
            paths::point(width, 0.0),
        ],
    );
    StartHat {
        width,
        height,
        path,
    }
}
