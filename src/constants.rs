//! The shape constant provider.
//!
//! [`ConstantProvider`] owns every sizing constant governing block layout, the
//! built shape descriptors, the shape-in-shape padding table, shape selection and
//! the renderer-scoped stylesheet fragments. All values derive from a single base
//! unit (`grid_unit`), so most constants are integer multiples of it and the whole
//! layout sits on one coherent visual grid.
//!
//! Constants are computed once at construction and immutable afterwards. Theme
//! variants are expressed as a sparse [`ConstantOverrides`] diff applied between
//! computing the grid-derived defaults and building the shape descriptors.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::colours;
use crate::dom::Element;
use crate::shapes::{
    make_hexagonal, make_inside_corners, make_notch, make_rounded, make_squared, make_start_hat,
    ConnectionShape, InsideCorners, StartHat,
};
use crate::types::{Connection, ConnectionKind, ShapeError, ShapeKind};

/// Padding-table key for a plain field nested in a shape (no connection shape of
/// its own).
pub const FIELD_SHAPE_TAG: i32 = 0;

static NEXT_IDENTIFIER: AtomicU64 = AtomicU64::new(0);

/// A sparse diff over the provider's default constants.
///
/// Every field is optional; absent fields keep their grid-derived default. An
/// overridden `grid_unit` re-derives every dependent constant before the targeted
/// overrides are applied, so a theme can rescale the whole grid and still pin
/// individual entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstantOverrides {
    /// Base length unit for the layout grid.
    pub grid_unit: Option<f64>,
    /// Radius of block outline corners.
    pub corner_radius: Option<f64>,
    /// Width of the statement notch.
    pub notch_width: Option<f64>,
    /// Height of the statement notch.
    pub notch_height: Option<f64>,
    /// Field label font size, in points.
    pub field_text_fontsize: Option<f64>,
    /// Field label font weight.
    pub field_text_fontweight: Option<String>,
    /// Field label font family.
    pub field_text_fontfamily: Option<String>,
    /// Keyboard-navigation cursor colour.
    pub cursor_colour: Option<String>,
    /// Glow colour for the selected block.
    pub selected_glow_colour: Option<String>,
    /// Blur radius of the selected-block glow.
    pub selected_glow_size: Option<f64>,
    /// Glow colour shown when a block is about to be replaced.
    pub replacement_glow_colour: Option<String>,
    /// Blur radius of the replacement glow.
    pub replacement_glow_size: Option<f64>,
}

impl ConstantOverrides {
    /// Serialize the override set to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize an override set from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Owns all sizing constants and shape descriptors for one rendering context.
pub struct ConstantProvider {
    /// Base length unit from which most constants are derived.
    pub grid_unit: f64,
    /// Smallest padding step.
    pub small_padding: f64,
    /// Medium padding step.
    pub medium_padding: f64,
    /// Medium-large padding step.
    pub medium_large_padding: f64,
    /// Largest padding step.
    pub large_padding: f64,
    /// Radius of block outline corners.
    pub corner_radius: f64,
    /// Width of the statement notch.
    pub notch_width: f64,
    /// Height of the statement notch.
    pub notch_height: f64,
    /// Distance from a block's left edge to the start of the notch.
    pub notch_offset_left: f64,
    /// Distance from a statement input's left edge to its notch, including the
    /// inside-corner width.
    pub statement_input_notch_offset: f64,
    /// Minimum width of a block.
    pub min_block_width: f64,
    /// Minimum height of a block.
    pub min_block_height: f64,
    /// Height of an empty statement input mouth.
    pub empty_statement_input_height: f64,
    /// Vertical offset of the output tab from the block top.
    pub tab_offset_from_top: f64,
    /// Minimum height of a block's top row.
    pub top_row_min_height: f64,
    /// Minimum top-row height when the row precedes a statement input.
    pub top_row_precedes_statement_min_height: f64,
    /// Minimum height of a block's bottom row.
    pub bottom_row_min_height: f64,
    /// Minimum bottom-row height when the row follows a statement input.
    pub bottom_row_after_statement_min_height: f64,
    /// Vertical spacer below a statement input (negative: the next row overlaps
    /// the notch).
    pub statement_bottom_spacer: f64,
    /// Minimum width of the spacer row inside a statement input.
    pub statement_input_spacer_min_width: f64,
    /// Left padding applied inside a statement input.
    pub statement_input_padding_left: f64,
    /// Horizontal padding of an empty inline input.
    pub empty_inline_input_padding: f64,
    /// Height of an empty inline input.
    pub empty_inline_input_height: f64,
    /// Minimum height of a dummy input row.
    pub dummy_input_min_height: f64,
    /// Minimum height of a dummy input row on a shadow block.
    pub dummy_input_shadow_min_height: f64,
    /// Width of the keyboard-navigation cursor on the workspace.
    pub cursor_ws_width: f64,
    /// Keyboard-navigation cursor colour.
    pub cursor_colour: String,
    /// Radius of the cursor marking input and output connections.
    pub cursor_radius: f64,
    /// Height of jagged collapsed-block teeth (unused by this renderer).
    pub jagged_teeth_height: f64,
    /// Width of jagged collapsed-block teeth (unused by this renderer).
    pub jagged_teeth_width: f64,
    /// Rise of the start hat above the block's top edge.
    pub start_hat_height: f64,
    /// Width of the start hat.
    pub start_hat_width: f64,
    /// Whether fields fill the full block height.
    pub full_block_fields: bool,
    /// Field label font size, in points.
    pub field_text_fontsize: f64,
    /// Field label font weight.
    pub field_text_fontweight: String,
    /// Field label font family.
    pub field_text_fontfamily: String,
    /// Measured field text height, in px.
    pub field_text_height: f64,
    /// Baseline offset used where dominant-baseline centring is unavailable.
    pub field_text_baseline_y: f64,
    /// Fine vertical adjustment applied to field text.
    pub field_text_y_offset: f64,
    /// Corner radius of field border rectangles.
    pub field_border_rect_radius: f64,
    /// Horizontal padding inside field border rectangles.
    pub field_border_rect_x_padding: f64,
    /// Vertical padding inside field border rectangles.
    pub field_border_rect_y_padding: f64,
    /// Height of field border rectangles.
    pub field_border_rect_height: f64,
    /// Fill colour of field border rectangles.
    pub field_border_rect_colour: String,
    /// Height of dropdown field border rectangles.
    pub field_dropdown_border_rect_height: f64,
    /// Whether borderless dropdowns render with a shadow.
    pub field_dropdown_no_border_rect_shadow: bool,
    /// Whether the dropdown menu inherits the block colour.
    pub field_dropdown_coloured_div: bool,
    /// Whether dropdowns render an SVG arrow.
    pub field_dropdown_svg_arrow: bool,
    /// Padding around the dropdown SVG arrow.
    pub field_dropdown_svg_arrow_padding: f64,
    /// Whether text-input fields render a box shadow while editing.
    pub field_textinput_box_shadow: bool,
    /// Whether colour fields fill the full block.
    pub field_colour_full_block: bool,
    /// Default width of a colour field swatch.
    pub field_colour_default_width: f64,
    /// Default height of a colour field swatch.
    pub field_colour_default_height: f64,
    /// Horizontal offset of checkbox fields.
    pub field_checkbox_x_offset: f64,
    /// Vertical offset of checkbox fields.
    pub field_checkbox_y_offset: f64,
    /// Default width of a checkbox field.
    pub field_checkbox_default_width: f64,
    /// Glow colour for the selected block.
    pub selected_glow_colour: String,
    /// Blur radius of the selected-block glow.
    pub selected_glow_size: f64,
    /// Glow colour shown when a block is about to be replaced.
    pub replacement_glow_colour: String,
    /// Blur radius of the replacement glow.
    pub replacement_glow_size: f64,
    /// Padding between an outer shape and a nested inner shape, keyed by the
    /// outer shape tag, then the inner shape tag ([`FIELD_SHAPE_TAG`] for plain
    /// fields). Lookups outside the populated pairs are a contract violation.
    pub shape_in_shape_padding: HashMap<i32, HashMap<i32, f64>>,
    /// The hexagonal (boolean) value shape.
    pub hexagonal: ConnectionShape,
    /// The rounded (reporter) value shape.
    pub rounded: ConnectionShape,
    /// The squared value shape.
    pub squared: ConnectionShape,
    /// The statement notch shape.
    pub notch: ConnectionShape,
    /// Inside-corner fragments for statement mouths.
    pub inside_corners: InsideCorners,
    /// The start-hat cap for event blocks.
    pub start_hat: StartHat,
    /// Id of the selected-glow filter once built, or the empty string.
    pub selected_glow_filter_id: String,
    /// Id of the replacement-glow filter once built, or the empty string.
    pub replacement_glow_filter_id: String,
    pub(crate) identifier: u64,
    pub(crate) selected_glow_filter: Option<Element>,
    pub(crate) replacement_glow_filter: Option<Element>,
}

impl ConstantProvider {
    /// Builds a provider with the default constant set (`grid_unit = 4`).
    pub fn new() -> Self {
        Self::with_overrides(&ConstantOverrides::default())
    }

    /// Builds a provider with the given theme diff applied over the defaults.
    ///
    /// The grid-derived constants are computed first, the diff is applied, and
    /// only then are the shape descriptors built, so every descriptor sees the
    /// finalized constants.
    pub fn with_overrides(overrides: &ConstantOverrides) -> Self {
        let grid_unit = overrides.grid_unit.unwrap_or(4.0);

        let corner_radius = overrides.corner_radius.unwrap_or(grid_unit);
        let notch_width = overrides.notch_width.unwrap_or(9.0 * grid_unit);
        let notch_height = overrides.notch_height.unwrap_or(2.0 * grid_unit);
        let notch_offset_left = 3.0 * grid_unit;
        let start_hat_height = 22.0;
        let start_hat_width = 96.0;

        let inside_corners = make_inside_corners(corner_radius);
        let statement_input_notch_offset = notch_offset_left + inside_corners.right_width;

        let field_border_rect_x_padding = 2.0 * grid_unit;

        Self {
            grid_unit,
            small_padding: grid_unit,
            medium_padding: 2.0 * grid_unit,
            medium_large_padding: 3.0 * grid_unit,
            large_padding: 4.0 * grid_unit,
            corner_radius,
            notch_width,
            notch_height,
            notch_offset_left,
            statement_input_notch_offset,
            min_block_width: 2.0 * grid_unit,
            min_block_height: 12.0 * grid_unit,
            empty_statement_input_height: 6.0 * grid_unit,
            tab_offset_from_top: 0.0,
            top_row_min_height: grid_unit,
            top_row_precedes_statement_min_height: 4.0 * grid_unit,
            bottom_row_min_height: grid_unit,
            bottom_row_after_statement_min_height: 6.0 * grid_unit,
            statement_bottom_spacer: -notch_height,
            statement_input_spacer_min_width: 40.0 * grid_unit,
            statement_input_padding_left: 4.0 * grid_unit,
            empty_inline_input_padding: 4.0 * grid_unit,
            empty_inline_input_height: 8.0 * grid_unit,
            dummy_input_min_height: 8.0 * grid_unit,
            dummy_input_shadow_min_height: 6.0 * grid_unit,
            cursor_ws_width: 20.0 * grid_unit,
            cursor_colour: overrides
                .cursor_colour
                .clone()
                .unwrap_or_else(|| "#ffa200".to_string()),
            cursor_radius: 5.0,
            jagged_teeth_height: 0.0,
            jagged_teeth_width: 0.0,
            start_hat_height,
            start_hat_width,
            full_block_fields: true,
            field_text_fontsize: overrides.field_text_fontsize.unwrap_or(3.0 * grid_unit),
            field_text_fontweight: overrides
                .field_text_fontweight
                .clone()
                .unwrap_or_else(|| "bold".to_string()),
            field_text_fontfamily: overrides.field_text_fontfamily.clone().unwrap_or_else(|| {
                "\"Helvetica Neue\", \"Segoe UI\", Helvetica, sans-serif".to_string()
            }),
            field_text_height: 13.1,
            field_text_baseline_y: 13.1,
            field_text_y_offset: 0.0,
            field_border_rect_radius: corner_radius,
            field_border_rect_x_padding,
            field_border_rect_y_padding: grid_unit,
            field_border_rect_height: 8.0 * grid_unit,
            field_border_rect_colour: "#fff".to_string(),
            field_dropdown_border_rect_height: 8.0 * grid_unit,
            field_dropdown_no_border_rect_shadow: true,
            field_dropdown_coloured_div: true,
            field_dropdown_svg_arrow: true,
            field_dropdown_svg_arrow_padding: field_border_rect_x_padding,
            field_textinput_box_shadow: true,
            field_colour_full_block: true,
            field_colour_default_width: 2.0 * grid_unit,
            field_colour_default_height: 4.0 * grid_unit,
            field_checkbox_x_offset: field_border_rect_x_padding - 3.0,
            field_checkbox_y_offset: 22.0,
            field_checkbox_default_width: 6.0 * grid_unit,
            selected_glow_colour: overrides
                .selected_glow_colour
                .clone()
                .unwrap_or_else(|| "#fff200".to_string()),
            selected_glow_size: overrides.selected_glow_size.unwrap_or(0.5),
            replacement_glow_colour: overrides
                .replacement_glow_colour
                .clone()
                .unwrap_or_else(|| "#fff200".to_string()),
            replacement_glow_size: overrides.replacement_glow_size.unwrap_or(2.0),
            shape_in_shape_padding: build_shape_in_shape_padding(grid_unit),
            hexagonal: make_hexagonal(),
            rounded: make_rounded(),
            squared: make_squared(corner_radius),
            notch: ConnectionShape::Notch(make_notch(notch_width, notch_height)),
            inside_corners,
            start_hat: make_start_hat(start_hat_width, start_hat_height),
            selected_glow_filter_id: String::new(),
            replacement_glow_filter_id: String::new(),
            identifier: NEXT_IDENTIFIER.fetch_add(1, Ordering::Relaxed),
            selected_glow_filter: None,
            replacement_glow_filter: None,
        }
    }

    /// Selects the shape descriptor for a connection.
    ///
    /// Value connections honour the owning block's explicit output-shape override
    /// first, then inspect the effective check list in priority order: `"Boolean"`
    /// selects the hexagon, `"Number"` and `"String"` select the rounded shape,
    /// and anything else falls back to rounded. Statement connections always map
    /// to the one shared notch descriptor.
    ///
    /// # Returns
    ///
    /// A reference to the matching descriptor, or
    /// [`ShapeError::UnknownConnectionType`] when the connection carries a kind
    /// tag outside the known set.
    pub fn shape_for(&self, connection: &Connection) -> Result<&ConnectionShape, ShapeError> {
        let checks = connection.effective_checks();
        match ConnectionKind::try_from(connection.kind)? {
            ConnectionKind::InputValue | ConnectionKind::OutputValue => {
                if let Some(shape) = connection.output_shape {
                    match shape {
                        ShapeKind::Hexagonal => return Ok(&self.hexagonal),
                        ShapeKind::Round => return Ok(&self.rounded),
                        ShapeKind::Square => return Ok(&self.squared),
                        // Other tags are not valid output overrides; fall through
                        // to the check list.
                        _ => {}
                    }
                }
                if let Some(checks) = checks {
                    if checks.iter().any(|c| c == "Boolean") {
                        return Ok(&self.hexagonal);
                    }
                    if checks.iter().any(|c| c == "Number") {
                        return Ok(&self.rounded);
                    }
                    if checks.iter().any(|c| c == "String") {
                        return Ok(&self.rounded);
                    }
                }
                Ok(&self.rounded)
            }
            ConnectionKind::PreviousStatement | ConnectionKind::NextStatement => Ok(&self.notch),
        }
    }

    /// Padding between an outer shape and an inner shape nested against its edge;
    /// `None` stands for a plain field.
    ///
    /// # Panics
    ///
    /// Panics when the pair is not in the table. Only the three dynamic shapes
    /// are valid outer keys; asking for anything else is a caller contract
    /// violation.
    pub fn padding_between(&self, outer: ShapeKind, inner: Option<ShapeKind>) -> f64 {
        let inner_tag = inner.map_or(FIELD_SHAPE_TAG, ShapeKind::tag);
        self.shape_in_shape_padding[&outer.tag()][&inner_tag]
    }

    /// Derives the border tone of a block colour: 15% black.
    pub fn generate_secondary_colour(&self, colour: &str) -> String {
        colours::blend("#000", colour, 0.15).unwrap_or_else(|| colour.to_string())
    }

    /// Derives the shadow tone of a block colour: 25% black.
    pub fn generate_tertiary_colour(&self, colour: &str) -> String {
        colours::blend("#000", colour, 0.25).unwrap_or_else(|| colour.to_string())
    }

    /// Produces the style rules scoped to the given renderer class name.
    ///
    /// Rules reference the provider's font and colour constants; callers inject
    /// them into the active stylesheet in order. The disabled-block rule paints
    /// with `#blockDisabledPattern{identifier}`, a pattern the host installs
    /// among the surface's base resources; this crate only scopes the reference.
    pub fn css_rules(&self, name: &str) -> Vec<String> {
        let selector = format!(".{}-renderer", name);
        vec![
            format!(
                "{selector} .blockText {{ cursor: default; fill: #fff; font-family: {}; font-size: {}pt; font-weight: {}; }}",
                self.field_text_fontfamily, self.field_text_fontsize, self.field_text_fontweight
            ),
            format!(
                "{selector} .blockNonEditableText>rect:not(.blockDropdownRect), {selector} .blockEditableText>rect:not(.blockDropdownRect) {{ fill: {}; }}",
                self.field_border_rect_colour
            ),
            format!(
                "{selector} .blockNonEditableText>text, {selector} .blockEditableText>text, {selector} .blockNonEditableText>g>text, {selector} .blockEditableText>g>text {{ fill: #575E75; }}"
            ),
            format!(
                "{selector} .blockDraggable:not(.blockDisabled) .blockEditableText:not(.editing):hover>rect, {selector} .blockDraggable:not(.blockDisabled) .blockEditableText:not(.editing):hover>.blockPath {{ stroke: #fff; stroke-width: 2; }}"
            ),
            format!(
                "{selector} .blockHtmlInput {{ font-family: {}; font-weight: {}; color: #575E75; }}",
                self.field_text_fontfamily, self.field_text_fontweight
            ),
            format!("{selector} .blockDropdownText {{ fill: #fff !important; }}"),
            format!(
                "{selector}.blockWidgetDiv .blockMenuItem, {selector}.blockDropDownDiv .blockMenuItem {{ font-family: {}; }}",
                self.field_text_fontfamily
            ),
            format!("{selector}.blockDropDownDiv .blockMenuItemContent {{ color: #fff; }}"),
            format!(
                "{selector} .blockHighlightedConnectionPath {{ stroke: {}; }}",
                self.selected_glow_colour
            ),
            format!(
                "{selector} .blockDisabled > .blockOutlinePath {{ fill: url(#blockDisabledPattern{}); }}",
                self.identifier
            ),
        ]
    }
}

impl Default for ConstantProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn build_shape_in_shape_padding(grid_unit: f64) -> HashMap<i32, HashMap<i32, f64>> {
    let hexagonal_tag = ShapeKind::Hexagonal.tag();
    let round_tag = ShapeKind::Round.tag();
    let square_tag = ShapeKind::Square.tag();

    let mut padding = HashMap::new();
    padding.insert(
        hexagonal_tag,
        HashMap::from([
            (FIELD_SHAPE_TAG, 5.0 * grid_unit),
            (hexagonal_tag, 2.0 * grid_unit),
            (round_tag, 5.0 * grid_unit),
            (square_tag, 5.0 * grid_unit),
        ]),
    );
    padding.insert(
        round_tag,
        HashMap::from([
            (FIELD_SHAPE_TAG, 3.0 * grid_unit),
            (hexagonal_tag, 3.0 * grid_unit),
            (round_tag, grid_unit),
            (square_tag, 2.0 * grid_unit),
        ]),
    );
    padding.insert(
        square_tag,
        HashMap::from([
            (FIELD_SHAPE_TAG, 2.0 * grid_unit),
            (hexagonal_tag, 2.0 * grid_unit),
            (round_tag, 2.0 * grid_unit),
            (square_tag, 2.0 * grid_unit),
        ]),
    );
    padding
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_derived_constants() {
        let provider = ConstantProvider::new();
        assert_eq!(provider.grid_unit, 4.0);
        assert_eq!(provider.small_padding, 4.0);
        assert_eq!(provider.medium_padding, 8.0);
        assert_eq!(provider.medium_large_padding, 12.0);
        assert_eq!(provider.large_padding, 16.0);
        assert_eq!(provider.corner_radius, 4.0);
        assert_eq!(provider.notch_width, 36.0);
        assert_eq!(provider.notch_height, 8.0);
        assert_eq!(provider.min_block_height, 48.0);
        assert_eq!(provider.statement_bottom_spacer, -8.0);
        assert_eq!(provider.field_text_fontsize, 12.0);
        assert_eq!(provider.cursor_colour, "#ffa200");
    }

    #[test]
    fn test_statement_input_notch_offset_includes_inside_corner() {
        let provider = ConstantProvider::new();
        assert_eq!(
            provider.statement_input_notch_offset,
            provider.notch_offset_left + provider.inside_corners.right_width
        );
        assert_eq!(provider.statement_input_notch_offset, 16.0);
    }

    #[test]
    fn test_construction_is_value_identical_and_independent() {
        let a = ConstantProvider::new();
        let b = ConstantProvider::new();
        assert_eq!(a.grid_unit, b.grid_unit);
        assert_eq!(a.shape_in_shape_padding, b.shape_in_shape_padding);
        assert_eq!(a.hexagonal, b.hexagonal);
        assert_eq!(a.notch, b.notch);
        assert_eq!(a.css_rules("crisp")[0], b.css_rules("crisp")[0]);
        // Instance identifiers are the one deliberate difference.
        assert_ne!(a.identifier, b.identifier);
    }

    #[test]
    fn test_shape_in_shape_padding_regression_values() {
        let provider = ConstantProvider::new();
        assert_eq!(
            provider.shape_in_shape_padding[&ShapeKind::Hexagonal.tag()][&ShapeKind::Round.tag()],
            20.0
        );
        assert_eq!(
            provider.shape_in_shape_padding[&ShapeKind::Round.tag()][&ShapeKind::Round.tag()],
            4.0
        );
        assert_eq!(
            provider.padding_between(ShapeKind::Hexagonal, Some(ShapeKind::Round)),
            20.0
        );
        assert_eq!(provider.padding_between(ShapeKind::Round, None), 12.0);
    }

    #[test]
    fn test_padding_table_covers_all_required_pairs() {
        let provider = ConstantProvider::new();
        let outers = [ShapeKind::Hexagonal, ShapeKind::Round, ShapeKind::Square];
        for outer in outers {
            let row = &provider.shape_in_shape_padding[&outer.tag()];
            assert!(row[&FIELD_SHAPE_TAG] >= 0.0);
            for inner in outers {
                assert!(row[&inner.tag()] >= 0.0);
            }
        }
    }

    #[test]
    fn test_shape_for_boolean_check_selects_hexagon() {
        let provider = ConstantProvider::new();
        for checks in [
            vec!["Boolean".to_string()],
            vec!["String".to_string(), "Boolean".to_string()],
            vec!["Boolean".to_string(), "Number".to_string()],
        ] {
            let conn = Connection::with_checks(ConnectionKind::InputValue, checks);
            let shape = provider.shape_for(&conn).unwrap();
            assert_eq!(shape.kind(), ShapeKind::Hexagonal);
        }
    }

    #[test]
    fn test_shape_for_number_and_string_select_rounded() {
        let provider = ConstantProvider::new();
        for check in ["Number", "String", "Array"] {
            let conn =
                Connection::with_checks(ConnectionKind::OutputValue, vec![check.to_string()]);
            let shape = provider.shape_for(&conn).unwrap();
            assert_eq!(shape.kind(), ShapeKind::Round);
        }
    }

    #[test]
    fn test_shape_for_defaults_to_rounded_without_checks() {
        let provider = ConstantProvider::new();
        let conn = Connection::new(ConnectionKind::InputValue);
        assert_eq!(provider.shape_for(&conn).unwrap().kind(), ShapeKind::Round);
    }

    #[test]
    fn test_shape_for_output_shape_override_wins() {
        let provider = ConstantProvider::new();
        let mut conn =
            Connection::with_checks(ConnectionKind::InputValue, vec!["Boolean".to_string()]);
        conn.output_shape = Some(ShapeKind::Square);
        assert_eq!(provider.shape_for(&conn).unwrap().kind(), ShapeKind::Square);
    }

    #[test]
    fn test_shape_for_invalid_override_falls_back_to_checks() {
        let provider = ConstantProvider::new();
        let mut conn =
            Connection::with_checks(ConnectionKind::InputValue, vec!["Boolean".to_string()]);
        conn.output_shape = Some(ShapeKind::Notch);
        assert_eq!(
            provider.shape_for(&conn).unwrap().kind(),
            ShapeKind::Hexagonal
        );
    }

    #[test]
    fn test_shape_for_uses_target_checks_as_fallback() {
        let provider = ConstantProvider::new();
        let mut conn = Connection::new(ConnectionKind::InputValue);
        conn.target = Some(Box::new(Connection::with_checks(
            ConnectionKind::OutputValue,
            vec!["Boolean".to_string()],
        )));
        assert_eq!(
            provider.shape_for(&conn).unwrap().kind(),
            ShapeKind::Hexagonal
        );
    }

    #[test]
    fn test_shape_for_statements_share_one_notch() {
        let provider = ConstantProvider::new();
        let previous = Connection::new(ConnectionKind::PreviousStatement);
        let next = Connection::new(ConnectionKind::NextStatement);

        let a = provider.shape_for(&previous).unwrap();
        let b = provider.shape_for(&next).unwrap();
        assert_eq!(a.kind(), ShapeKind::Notch);
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_shape_for_unknown_kind_errors() {
        let provider = ConstantProvider::new();
        let conn = Connection {
            kind: 99,
            checks: None,
            target: None,
            output_shape: None,
        };
        assert_eq!(
            provider.shape_for(&conn),
            Err(ShapeError::UnknownConnectionType(99))
        );
    }

    #[test]
    fn test_overrides_rescale_the_grid() {
        let overrides = ConstantOverrides {
            grid_unit: Some(8.0),
            ..Default::default()
        };
        let provider = ConstantProvider::with_overrides(&overrides);
        assert_eq!(provider.large_padding, 32.0);
        assert_eq!(provider.notch_width, 72.0);
        assert_eq!(provider.corner_radius, 8.0);
        assert_eq!(
            provider.shape_in_shape_padding[&ShapeKind::Round.tag()][&ShapeKind::Round.tag()],
            8.0
        );
        // Descriptors are built from the finalized constants.
        assert_eq!(provider.squared.width(100.0), 8.0);
        assert_eq!(provider.notch.width(0.0), 72.0);
    }

    #[test]
    fn test_targeted_overrides_pin_individual_entries() {
        let overrides = ConstantOverrides {
            corner_radius: Some(2.0),
            selected_glow_colour: Some("#00ff00".to_string()),
            field_text_fontweight: Some("normal".to_string()),
            ..Default::default()
        };
        let provider = ConstantProvider::with_overrides(&overrides);
        assert_eq!(provider.grid_unit, 4.0);
        assert_eq!(provider.corner_radius, 2.0);
        assert_eq!(provider.field_border_rect_radius, 2.0);
        assert_eq!(provider.squared.width(24.0), 2.0);
        assert_eq!(provider.selected_glow_colour, "#00ff00");
        assert_eq!(provider.field_text_fontweight, "normal");
    }

    #[test]
    fn test_overrides_json_roundtrip() {
        let overrides = ConstantOverrides {
            grid_unit: Some(6.0),
            cursor_colour: Some("#123456".to_string()),
            ..Default::default()
        };
        let json = overrides.to_json().unwrap();
        let restored = ConstantOverrides::from_json(&json).unwrap();
        assert_eq!(restored, overrides);

        // A sparse diff: absent fields stay absent.
        let empty = ConstantOverrides::from_json("{}").unwrap();
        assert_eq!(empty, ConstantOverrides::default());
    }

    #[test]
    fn test_secondary_and_tertiary_colours() {
        let provider = ConstantProvider::new();
        assert_eq!(provider.generate_secondary_colour("#4c97ff"), "#4180d9");
        assert_eq!(provider.generate_tertiary_colour("#ffffff"), "#bfbfbf");
        // Unparseable colours pass through unchanged, multi-byte ones included.
        assert_eq!(provider.generate_secondary_colour("teal"), "teal");
        assert_eq!(provider.generate_secondary_colour("#aΩΩb"), "#aΩΩb");
        assert_eq!(provider.generate_tertiary_colour("#aΩΩb"), "#aΩΩb");
    }

    #[test]
    fn test_css_rules_are_scoped_and_reference_constants() {
        let provider = ConstantProvider::new();
        let rules = provider.css_rules("crisp");
        assert!(!rules.is_empty());
        assert!(rules.iter().all(|r| r.contains(".crisp-renderer")));
        assert!(rules[0].contains("font-size: 12pt"));
        assert!(rules[0].contains(&provider.field_text_fontfamily));
        let last = rules.last().unwrap();
        assert!(last.contains(&format!("blockDisabledPattern{}", provider.identifier)));
    }

    #[test]
    fn test_css_rules_are_deterministic() {
        let provider = ConstantProvider::new();
        assert_eq!(provider.css_rules("crisp"), provider.css_rules("crisp"));
    }
}
