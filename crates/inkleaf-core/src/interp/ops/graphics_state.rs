//! `q`/`Q`/`cm`: the graphics-state stack and CTM concatenation.

use super::super::interpreter::{Interpreter, SavedState};
use crate::error::Result;
use crate::model::geometry::mult_matrix;
use crate::model::objects::Object;

pub fn push(interp: &mut Interpreter<'_>) {
    interp.gstack.push(SavedState {
        ctm: interp.ctm,
        char_spacing: interp.text.char_spacing,
        word_spacing: interp.text.word_spacing,
        h_scale: interp.text.h_scale,
        leading: interp.text.leading,
        font: interp.text.font.clone(),
        font_size: interp.text.font_size,
        rise: interp.text.rise,
        render_mode: interp.text.render_mode,
    });
}

pub fn pop(interp: &mut Interpreter<'_>) {
    if let Some(s) = interp.gstack.pop() {
        interp.ctm = s.ctm;
        interp.text.char_spacing = s.char_spacing;
        interp.text.word_spacing = s.word_spacing;
        interp.text.h_scale = s.h_scale;
        interp.text.leading = s.leading;
        interp.text.font = s.font;
        interp.text.font_size = s.font_size;
        interp.text.rise = s.rise;
        interp.text.render_mode = s.render_mode;
    }
}

pub fn concat_matrix(interp: &mut Interpreter<'_>, operands: &[Object]) -> Result<()> {
    let m = num6(operands)?;
    interp.ctm = mult_matrix(interp.ctm, m);
    Ok(())
}

pub(super) fn num6(operands: &[Object]) -> Result<(f64, f64, f64, f64, f64, f64)> {
    if operands.len() < 6 {
        return Ok((1.0, 0.0, 0.0, 1.0, 0.0, 0.0));
    }
    let n = operands.len();
    Ok((
        operands[n - 6].as_num()?,
        operands[n - 5].as_num()?,
        operands[n - 4].as_num()?,
        operands[n - 3].as_num()?,
        operands[n - 2].as_num()?,
        operands[n - 1].as_num()?,
    ))
}
