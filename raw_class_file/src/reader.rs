use std::io::Cursor;
use crate::error::LoadError;

/// Big-endian reading of the class file primitives.
///
/// Running out of input is reported as [`LoadError::Truncated`], with the offset at which the read started.
pub(crate) trait ClassRead {
	fn remaining(&self) -> usize;

	fn read_n<const N: usize>(&mut self) -> Result<[u8; N], LoadError>;
	fn read_u8_vec(&mut self, size: usize) -> Result<Vec<u8>, LoadError>;

	fn read_u8(&mut self) -> Result<u8, LoadError> {
		Ok(u8::from_be_bytes(self.read_n()?))
	}
	fn read_u16(&mut self) -> Result<u16, LoadError> {
		Ok(u16::from_be_bytes(self.read_n()?))
	}
	fn read_u32(&mut self) -> Result<u32, LoadError> {
		Ok(u32::from_be_bytes(self.read_n()?))
	}
	fn read_u64(&mut self) -> Result<u64, LoadError> {
		Ok(u64::from_be_bytes(self.read_n()?))
	}
	fn read_i32(&mut self) -> Result<i32, LoadError> {
		Ok(i32::from_be_bytes(self.read_n()?))
	}
	fn read_i64(&mut self) -> Result<i64, LoadError> {
		Ok(i64::from_be_bytes(self.read_n()?))
	}

	fn read_u16_as_usize(&mut self) -> Result<usize, LoadError> {
		Ok(self.read_u16()? as usize)
	}
	fn read_u32_as_usize(&mut self) -> Result<usize, LoadError> {
		Ok(self.read_u32()? as usize)
	}

	fn read_vec<T, S, E>(&mut self, get_size: S, mut get_element: E) -> Result<Vec<T>, LoadError>
		where
			S: FnOnce(&mut Self) -> Result<usize, LoadError>,
			E: FnMut(&mut Self) -> Result<T, LoadError>
	{
		let size = get_size(self)?;
		// don't trust the size for the allocation, a truncated file could claim any length
		let mut vec = Vec::with_capacity(size.min(self.remaining()));
		for _ in 0..size {
			vec.push(get_element(self)?);
		}
		Ok(vec)
	}
}

impl<T: AsRef<[u8]>> ClassRead for Cursor<T> {
	fn remaining(&self) -> usize {
		let len = self.get_ref().as_ref().len();
		len.saturating_sub(Cursor::position(self) as usize)
	}

	fn read_n<const N: usize>(&mut self) -> Result<[u8; N], LoadError> {
		let slice = self.read_u8_vec(N)?;
		let mut buf = [0u8; N];
		buf.copy_from_slice(&slice);
		Ok(buf)
	}

	fn read_u8_vec(&mut self, size: usize) -> Result<Vec<u8>, LoadError> {
		let offset = Cursor::position(self);
		if self.remaining() < size {
			return Err(LoadError::Truncated { offset, needed: size });
		}
		let start = offset as usize;
		let vec = self.get_ref().as_ref()[start..start + size].to_vec();
		self.set_position(offset + size as u64);
		Ok(vec)
	}
}
