//! 小端二进制游标
//!
//! 在固定字节缓冲区上按偏移读取定宽整数/浮点数与定长文本块，
//! 每次读取都做越界检查，越界时返回带偏移的格式错误。

use byteorder::{ByteOrder, LittleEndian};
use glam::Vec3;

use crate::{FileFormat, FormatError, FormatErrorKind, MmdError, Result};

use super::sjis::decode_shift_jis;

/// 坐标系转换方式（左手系 -> 右手系）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// 原样读取
    Raw,
    /// 位置类：Z 取反
    Position,
    /// 旋转类：X、Y 取反
    Rotation,
}

/// 小端二进制游标
pub struct BinaryCursor<'a> {
    data: &'a [u8],
    offset: usize,
    format: FileFormat,
}

impl<'a> BinaryCursor<'a> {
    pub fn new(data: &'a [u8], format: FileFormat) -> Self {
        Self {
            data,
            offset: 0,
            format,
        }
    }

    /// 当前偏移
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 剩余字节数
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// 是否已读到末尾
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// 在当前偏移处构造格式错误
    pub fn error(&self, kind: FormatErrorKind) -> MmdError {
        self.error_at(kind, self.offset)
    }

    /// 在指定偏移处构造格式错误
    pub fn error_at(&self, kind: FormatErrorKind, offset: usize) -> MmdError {
        MmdError::Format(FormatError::new(self.format, kind, offset))
    }

    /// 检查声明的记录数量是否超过剩余字节
    pub fn ensure_records(&self, count: usize, record_size: usize) -> Result<()> {
        let remaining = self.remaining();
        let fits = count
            .checked_mul(record_size)
            .is_some_and(|needed| needed <= remaining);
        if fits {
            Ok(())
        } else {
            Err(self.error(FormatErrorKind::DeclaredLengthExceedsData {
                count,
                record_size,
                remaining,
            }))
        }
    }

    /// 读取定长原始字节块
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(self.error(FormatErrorKind::UnexpectedEof {
                needed: len,
                remaining,
            }));
        }
        let start = self.offset;
        self.offset += len;
        Ok(&self.data[start..self.offset])
    }

    /// 跳过若干字节
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.read_bytes(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.read_bytes(4)?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.read_bytes(4)?))
    }

    /// 读取三个 f32 并按坐标系转换
    pub fn read_vec3(&mut self, axis: Axis) -> Result<Vec3> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        let z = self.read_f32()?;
        Ok(match axis {
            Axis::Raw => Vec3::new(x, y, z),
            Axis::Position => Vec3::new(x, y, -z),
            Axis::Rotation => Vec3::new(-x, -y, z),
        })
    }

    /// 读取定长 Shift-JIS 文本块
    pub fn read_text(&mut self, len: usize) -> Result<String> {
        Ok(decode_shift_jis(self.read_bytes(len)?))
    }

    /// 读取 u32 数量并检查对应的定长记录是否都在缓冲区内
    pub fn read_count_u32(&mut self, record_size: usize) -> Result<usize> {
        let count = self.read_u32()? as usize;
        self.ensure_records(count, record_size)?;
        Ok(count)
    }

    /// 读取 u16 数量并检查最小记录长度
    pub fn read_count_u16(&mut self, min_record_size: usize) -> Result<usize> {
        let count = self.read_u16()? as usize;
        self.ensure_records(count, min_record_size)?;
        Ok(count)
    }

    /// 读取 u8 数量并检查对应的定长记录
    pub fn read_count_u8(&mut self, record_size: usize) -> Result<usize> {
        let count = self.read_u8()? as usize;
        self.ensure_records(count, record_size)?;
        Ok(count)
    }
}
