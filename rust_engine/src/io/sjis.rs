//! Shift-JIS 文本解码
//!
//! 两级查表：单字节表（ASCII 可打印字符与半角片假名），
//! 双字节表（由连续两个字节组成的 16 位编码，查 `encoding_rs` 的 Shift_JIS 表）。
//! 遇到 NUL 结束；遇到无法映射的字节序列时停止。

use encoding_rs::SHIFT_JIS;

use crate::{MmdError, Result};

/// 解码结果：文本以及停止解码的位置（如果因无法映射而提前停止）
struct Scan {
    text: String,
    stopped_at: Option<usize>,
}

/// 解码 Shift-JIS 字节块，遇到无法映射的字节序列时截断
pub fn decode_shift_jis(bytes: &[u8]) -> String {
    let scan = scan(bytes);
    if let Some(offset) = scan.stopped_at {
        log::debug!(
            "Shift-JIS 解码在第 {} 字节处截断 (0x{:02X})，保留 {:?}",
            offset,
            bytes[offset],
            scan.text
        );
    }
    scan.text
}

/// 严格解码：遇到无法映射的字节序列时返回错误
pub fn decode_shift_jis_strict(bytes: &[u8]) -> Result<String> {
    let scan = scan(bytes);
    match scan.stopped_at {
        Some(offset) => Err(MmdError::Text { offset }),
        None => Ok(scan.text),
    }
}

/// 单字节表
fn single_byte(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E => Some(code as char),
        // 半角片假名 U+FF61..U+FF9F
        0xA1..=0xDF => char::from_u32(0xFF61 + (code - 0xA1) as u32),
        _ => None,
    }
}

/// 是否为双字节编码的首字节
fn is_lead_byte(code: u8) -> bool {
    matches!(code, 0x81..=0x9F | 0xE0..=0xFC)
}

/// 双字节表
fn double_byte(lead: u8, trail: u8) -> Option<char> {
    if !is_lead_byte(lead) {
        return None;
    }
    let pair = [lead, trail];
    let decoded = SHIFT_JIS.decode_without_bom_handling_and_without_replacement(&pair)?;
    let mut chars = decoded.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn scan(bytes: &[u8]) -> Scan {
    let mut text = String::new();
    let mut i = 0;

    while i < bytes.len() {
        let code = bytes[i];
        if code == 0 {
            break;
        }
        if let Some(c) = single_byte(code) {
            text.push(c);
            i += 1;
            continue;
        }
        let mapped = bytes.get(i + 1).and_then(|&trail| double_byte(code, trail));
        match mapped {
            Some(c) => {
                text.push(c);
                i += 2;
            }
            None => {
                return Scan {
                    text,
                    stopped_at: Some(i),
                };
            }
        }
    }

    Scan {
        text,
        stopped_at: None,
    }
}
