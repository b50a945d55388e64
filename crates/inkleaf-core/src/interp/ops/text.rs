//! Text state, positioning, and showing operators (spec.md §4.3).

use super::super::interpreter::Interpreter;
use crate::error::{PdfError, Result};
use crate::model::geometry::{mult_matrix, IDENTITY};
use crate::model::objects::Object;

pub fn set_font(interp: &mut Interpreter<'_>, operands: &[Object]) -> Result<()> {
    let [name_op, size_op] = last_two(operands)?;
    let name = name_op.as_name()?;
    interp.text.font = interp.font_by_name(name);
    interp.text.font_size = size_op.as_num()?;
    Ok(())
}

pub fn set_char_spacing(interp: &mut Interpreter<'_>, operands: &[Object]) -> Result<()> {
    interp.text.char_spacing = last(operands)?.as_num()?;
    Ok(())
}

pub fn set_word_spacing(interp: &mut Interpreter<'_>, operands: &[Object]) -> Result<()> {
    interp.text.word_spacing = last(operands)?.as_num()?;
    Ok(())
}

pub fn set_h_scale(interp: &mut Interpreter<'_>, operands: &[Object]) -> Result<()> {
    interp.text.h_scale = last(operands)?.as_num()?;
    Ok(())
}

pub fn set_leading(interp: &mut Interpreter<'_>, operands: &[Object]) -> Result<()> {
    interp.text.leading = last(operands)?.as_num()?;
    Ok(())
}

pub fn set_rise(interp: &mut Interpreter<'_>, operands: &[Object]) -> Result<()> {
    interp.text.rise = last(operands)?.as_num()?;
    Ok(())
}

pub fn set_render_mode(interp: &mut Interpreter<'_>, operands: &[Object]) -> Result<()> {
    interp.text.render_mode = last(operands)?.as_int()?;
    Ok(())
}

pub fn begin_text(interp: &mut Interpreter<'_>) {
    interp.text.tm = IDENTITY;
    interp.text.tlm = IDENTITY;
}

pub fn end_text(interp: &mut Interpreter<'_>) {
    interp.flush_pending();
}

pub fn move_text_pos(interp: &mut Interpreter<'_>, operands: &[Object]) -> Result<()> {
    let [tx, ty] = last_two_nums(operands)?;
    interp.text.tlm = mult_matrix(interp.text.tlm, (1.0, 0.0, 0.0, 1.0, tx, ty));
    interp.text.tm = interp.text.tlm;
    Ok(())
}

pub fn move_text_pos_set_leading(interp: &mut Interpreter<'_>, operands: &[Object]) -> Result<()> {
    let [tx, ty] = last_two_nums(operands)?;
    interp.text.leading = -ty;
    interp.text.tlm = mult_matrix(interp.text.tlm, (1.0, 0.0, 0.0, 1.0, tx, ty));
    interp.text.tm = interp.text.tlm;
    Ok(())
}

pub fn set_text_matrix(interp: &mut Interpreter<'_>, operands: &[Object]) -> Result<()> {
    let m = super::graphics_state::num6(operands)?;
    interp.text.tlm = m;
    interp.text.tm = m;
    Ok(())
}

pub fn next_line(interp: &mut Interpreter<'_>) {
    let leading = interp.text.leading;
    interp.text.tlm = mult_matrix(interp.text.tlm, (1.0, 0.0, 0.0, 1.0, 0.0, -leading));
    interp.text.tm = interp.text.tlm;
}

pub fn show_string(interp: &mut Interpreter<'_>, operands: &[Object]) -> Result<()> {
    let bytes = last(operands)?.as_string_bytes()?;
    interp.show_text(bytes);
    Ok(())
}

pub fn next_line_show_string(interp: &mut Interpreter<'_>, operands: &[Object]) -> Result<()> {
    next_line(interp);
    show_string(interp, operands)
}

pub fn set_spacing_next_line_show_string(interp: &mut Interpreter<'_>, operands: &[Object]) -> Result<()> {
    if operands.len() < 3 {
        return Err(PdfError::Extraction("\" requires 3 operands".into()));
    }
    let n = operands.len();
    interp.text.word_spacing = operands[n - 3].as_num()?;
    interp.text.char_spacing = operands[n - 2].as_num()?;
    next_line(interp);
    interp.show_text(operands[n - 1].as_string_bytes()?);
    Ok(())
}

pub fn show_text_adjusted(interp: &mut Interpreter<'_>, operands: &[Object]) -> Result<()> {
    let arr = last(operands)?.as_array()?;
    for item in arr {
        match item {
            Object::String(bytes) => interp.show_text(bytes),
            Object::Int(_) | Object::Real(_) => interp.adjust_tj(item.as_num()?),
            _ => {}
        }
    }
    Ok(())
}

fn last(operands: &[Object]) -> Result<&Object> {
    operands
        .last()
        .ok_or_else(|| PdfError::Extraction("operator missing operand".into()))
}

fn last_two(operands: &[Object]) -> Result<[&Object; 2]> {
    if operands.len() < 2 {
        return Err(PdfError::Extraction("operator requires 2 operands".into()));
    }
    let n = operands.len();
    Ok([&operands[n - 2], &operands[n - 1]])
}

fn last_two_nums(operands: &[Object]) -> Result<(f64, f64)> {
    let [a, b] = last_two(operands)?;
    Ok((a.as_num()?, b.as_num()?))
}
