//! 二进制读取与旧式文本编码

mod cursor;
mod sjis;

pub use cursor::{Axis, BinaryCursor};
pub use sjis::{decode_shift_jis, decode_shift_jis_strict};
