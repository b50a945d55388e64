//! Operator dispatch table for the content-stream interpreter.

pub mod graphics_state;
pub mod text;

use super::interpreter::Interpreter;
use crate::error::Result;
use crate::model::objects::Object;

/// Executes one operator against `interp`'s state. Unknown operators
/// (path painting, color, shading, XObjects — none of which affect text
/// extraction) are silently ignored, per spec.md §1's focus on the text
/// and structure path.
pub fn dispatch(interp: &mut Interpreter<'_>, op: &str, operands: &[Object]) -> Result<()> {
    match op {
        "q" => graphics_state::push(interp),
        "Q" => graphics_state::pop(interp),
        "cm" => graphics_state::concat_matrix(interp, operands)?,

        "Tf" => text::set_font(interp, operands)?,
        "Tc" => text::set_char_spacing(interp, operands)?,
        "Tw" => text::set_word_spacing(interp, operands)?,
        "Tz" => text::set_h_scale(interp, operands)?,
        "TL" => text::set_leading(interp, operands)?,
        "Ts" => text::set_rise(interp, operands)?,
        "Tr" => text::set_render_mode(interp, operands)?,

        "BT" => text::begin_text(interp),
        "ET" => text::end_text(interp),
        "Td" => text::move_text_pos(interp, operands)?,
        "TD" => text::move_text_pos_set_leading(interp, operands)?,
        "Tm" => text::set_text_matrix(interp, operands)?,
        "T*" => text::next_line(interp),

        "Tj" => text::show_string(interp, operands)?,
        "'" => text::next_line_show_string(interp, operands)?,
        "\"" => text::set_spacing_next_line_show_string(interp, operands)?,
        "TJ" => text::show_text_adjusted(interp, operands)?,

        "BMC" => interp.enter_marked_content(None),
        "BDC" => interp.enter_marked_content(mcid_of(operands)),
        "EMC" => interp.exit_marked_content(),

        _ => {}
    }
    Ok(())
}

fn mcid_of(operands: &[Object]) -> Option<u32> {
    let props = operands.last()?;
    let dict = props.as_dict().ok()?;
    dict.get("MCID").and_then(|o| o.as_int().ok()).map(|n| n as u32)
}
